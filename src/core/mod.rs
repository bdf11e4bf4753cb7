//! Pure domain logic, independent of the database and the HTTP layer.
//!
//! Everything in here is a total function over explicit value types: the
//! handlers read the prior state inside a transaction, call into this module,
//! and persist whatever comes back. Nothing here touches a connection pool.

pub mod reactions;
pub mod streak;
