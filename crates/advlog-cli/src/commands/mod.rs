//! Command implementations for the CLI.

mod config;
mod devices;
mod frames;
mod reports;
mod text;

pub use config::cmd_config;
pub use devices::{cmd_devices, format_devices};
pub use frames::cmd_frames;
pub use reports::cmd_reports;
pub use text::cmd_text;
