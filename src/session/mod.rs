/// Session module
///
/// Server-side records anchoring refresh tokens: one session per login
/// event, keyed by the refresh token's unique token id, revocable and
/// deletable. Access tokens have no session record.

mod memory;
mod postgres;
mod store;

pub use memory::InMemorySessionStore;
pub use postgres::PgSessionStore;
pub use store::{Session, SessionStore};
