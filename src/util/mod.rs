//! Small shared utilities: the latch-and-spin reader-writer lock used by
//! [`pool::Pool`](crate::pool::Pool) to guard its hash-index-backed
//! interning state.

pub mod spinlock;

pub use spinlock::Spinlock;
