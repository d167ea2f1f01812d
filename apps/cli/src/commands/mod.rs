//! Command implementations for the Kiln CLI.

pub mod deploy;
pub mod evaluate;
pub mod fetch;
pub mod status;
pub mod teardown;
pub mod train;
pub mod upload;
