mod cli;
mod runner;
mod settings;

pub use cli::{Cli, Command};
pub use runner::{StreamReport, render, stream, think};
pub use settings::load as load_settings;
