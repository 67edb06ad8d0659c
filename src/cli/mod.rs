pub mod args;
pub mod commands;

pub use args::{Cli, Commands, EtlArgs, ServeArgs};
pub use commands::{init_logging, run};
