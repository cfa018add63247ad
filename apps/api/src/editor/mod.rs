// Editor sessions and the persistence boundary.
// The document module stays pure; everything async lives here.

pub mod handlers;
pub mod memory_store;
pub mod pg_store;
pub mod session;
pub mod store;
