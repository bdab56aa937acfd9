mod cli;
mod controller;

pub use cli::{parse_capacity, Cli, Invocation};
pub use controller::{Controller, ExitOutcome};
