pub mod error;
pub mod memory;

pub use error::StoreError;
pub use memory::{AppointmentDraft, RangeReplacement, SchedulingStore};
