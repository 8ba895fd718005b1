//! Rolls the append-only time log up into per-project weekly totals. This is
//! the one piece of the application that is more than plumbing, so it stays a
//! pure function over loaded snapshots.

pub mod matching;
pub mod summary;
