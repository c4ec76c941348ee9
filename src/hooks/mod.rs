pub mod executor;

pub use executor::{CustomLogicExecutor, HookError, HttpCustomLogicExecutor, Phase};
