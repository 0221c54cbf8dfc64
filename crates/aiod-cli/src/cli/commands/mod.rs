//! CLI command handlers, one file per command.

mod check;
mod config;
mod fetch;
mod interactive;

pub use check::run_check;
pub use config::run_config;
pub use fetch::{run_fetch, FetchArgs};
pub use interactive::run_interactive;
