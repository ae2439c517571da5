//! Infrastructure layer - External systems integration
//!
//! - Database connection, migrations and repositories
//! - Redis cache, rate limiting and distributed locks
//! - Unit of Work for transaction management

pub mod cache;
pub mod db;
pub mod repositories;
pub mod unit_of_work;

pub use cache::{Cache, DistributedLock, LockGuard, RateLimitStore};
pub use db::{Database, Migrator};
pub use repositories::*;
pub use unit_of_work::{Persistence, TransactionContext, TxFuture, UnitOfWork};

#[cfg(any(test, feature = "test-utils"))]
pub use cache::{MockDistributedLock, MockRateLimitStore};
