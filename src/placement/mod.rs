//! Circle layout generation

mod engine;

pub use engine::{check_gaps, place, GapViolation, Layout};
