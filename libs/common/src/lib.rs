//! Common library for the Gossip forum
//!
//! This crate provides the storage plumbing shared by the services:
//! connection pooling and migrations, the storage error taxonomy, and the
//! scoped transaction every mutating domain operation runs inside.

pub mod database;
pub mod error;
pub mod transaction;

pub use database::StorageHealth;
pub use error::{DatabaseError, DatabaseResult};
pub use transaction::{TransactionHandle, TransactionProvider, TransactionScope};
