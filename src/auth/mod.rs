/// Authentication module
///
/// JWT token generation/validation, password hashing, and the session
/// lifecycle orchestrator.

mod claims;
mod password;
mod service;
mod token;

pub use claims::UserClaims;
pub use password::hash_password;
pub use password::verify_password;
pub use service::{AuthService, LoginTokens, RenewedAccessToken};
pub use token::TokenMaker;
