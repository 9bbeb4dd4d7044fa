//! CLI argument parsing and command handling.

mod args;

pub use args::{ActivityArgs, Cli, Command, ConfigAction, DetectionsArgs, GroupArg, MonthlyArgs};
