//! Incident status progression.
//!
//! `OPEN -> ACKNOWLEDGED -> MITIGATING -> RESOLVED -> CLOSED`, strictly one
//! step at a time. `CLOSED` is terminal. Re-applying the current status is
//! always accepted.

mod guard;

pub use guard::LifecycleGuard;
