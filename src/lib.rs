pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod http;
pub mod utils;

pub use adapters::storage::LocalStorage;
pub use config::{CliConfig, ServerConfig};
pub use crate::core::registry::{Registry, SharedRegistry};
pub use domain::model::{AttendeeRecord, AttendeeRow, NewAttendee};
pub use http::{build_router, start_server, State};
pub use utils::error::{CheckinError, Result};
