//! Command modules for the `spellc` CLI, one file per subcommand.

pub mod common;

pub mod check;
pub mod emit;

pub use check::{run_check, CheckArgs};
pub use emit::{run_emit, EmitArgs};
