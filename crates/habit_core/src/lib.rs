pub mod consistency;
pub mod dates;
pub mod due;
pub mod error;
pub mod frequency;
pub mod habit;
pub mod range;
pub mod stats;
pub mod store;
pub mod streak;

pub use crate::error::{HabitError, Result};
pub use crate::frequency::Frequency;
pub use crate::habit::{HabitEdit, HabitRecord, PerformOutcome, Rejection};
pub use crate::store::HabitStore;
