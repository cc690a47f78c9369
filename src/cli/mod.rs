//! CLI module for hubquery
//!
//! Provides command-line interface for:
//! - validate: Print the validation result for a filter object
//! - compile: Print the compiled query plan
//! - explain: Print the plan's explain output
//! - query: Run the plan against a JSON data file

mod args;
mod commands;
mod errors;
mod io;

pub use args::{Cli, Command, Entity};
pub use commands::{
    compile, compile_plan, explain, load_config, query, run, run_command, validate,
    validate_filters,
};
pub use errors::{CliError, CliErrorCode, CliResult};
pub use io::{parse_request, read_request, write_response};
