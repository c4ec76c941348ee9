pub mod instrumented;
pub mod manager;
pub mod pg;
pub mod store;

pub use instrumented::InstrumentedStore;
pub use manager::DatabaseManager;
pub use pg::PgStore;
pub use store::{Filter, Store, StoreError};
