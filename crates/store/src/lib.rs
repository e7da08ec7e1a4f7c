//! In-process store of record.
//!
//! One arena per record kind behind a single `RwLock`; the lock is the only
//! serialization point in the system. Uniqueness checks run inside the write
//! lock, so a duplicate email or name surfaces as a validation failure at
//! commit time rather than a corrupted index.

pub mod arena;
pub mod memory;
pub mod seed;

pub use arena::Arena;
pub use memory::AppStore;
pub use seed::{ADMIN_EMAIL, ADMIN_NAME, ADMIN_PASSWORD, seed};
