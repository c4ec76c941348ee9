pub mod identity;
pub mod policy;

pub use identity::{Authenticator, Claims, IdentityError, JwtAuthenticator, ParseAuthenticator};
pub use policy::{evaluate, retain_authorized, Decision};
