pub mod report_commands;

pub use report_commands::*;
