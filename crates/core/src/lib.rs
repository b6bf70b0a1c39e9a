pub mod config;
pub mod error;
pub mod job;
pub mod notification;
pub mod params;
pub mod status;

pub use config::Config;
pub use error::*;
pub use job::*;
pub use notification::*;
pub use params::{ParameterStore, StaticParameters};
pub use status::JobStatus;
