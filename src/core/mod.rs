pub mod export;
pub mod registry;
pub mod sheet;

pub use crate::domain::model::{AttendeeRecord, AttendeeRow, NewAttendee};
pub use crate::domain::ports::Storage;
pub use crate::utils::error::Result;
