//! Sync Layer
//!
//! Reconciliation between optimistic local state and authoritative
//! server-pushed state.

mod session;
mod subscription;


pub use session::{SharedStore, SyncAction, SyncNotice, TodoSession};
pub use subscription::SubscriptionHandle;
