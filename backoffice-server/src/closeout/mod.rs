//! Close-out domain — business day lifecycle + access guard
//!
//! The guard decides whether a close may begin; the lifecycle governs
//! what happens once it does. Both are store-scoped and hold no state
//! beyond the connection pool: every decision is re-derived from
//! current data.

pub mod guard;
pub mod lifecycle;

pub use guard::AccessGuard;
pub use lifecycle::DayCloseService;
