//! Read-only projections of `AppState` for display.
//!
//! Views borrow from the cached collections and hold no state of their own,
//! except the assignment picker flow in `schedule`.

pub mod inbox;
pub mod matrix;
pub mod schedule;
