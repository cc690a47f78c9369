//! CLI argument definitions using clap
//!
//! Commands:
//! - hubquery validate --entity <entity>
//! - hubquery compile --entity <entity>
//! - hubquery explain --entity <entity>
//! - hubquery query --entity <entity> --data <path>
//!
//! Every command reads one JSON filter object from stdin.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// hubquery - validate marketplace filters and compile them into query plans
#[derive(Parser, Debug)]
#[command(name = "hubquery")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to a QueryConfig JSON file (defaults apply when omitted)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Searchable marketplace entities
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entity {
    Provider,
    Request,
    Review,
    User,
    Chat,
}

impl Entity {
    /// Collection holding this entity's documents
    pub fn collection(&self) -> &'static str {
        match self {
            Entity::Provider => "providers",
            Entity::Request => "requests",
            Entity::Review => "reviews",
            Entity::User => "users",
            Entity::Chat => "chats",
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Validate filters and print the validation result
    Validate {
        #[arg(long, value_enum)]
        entity: Entity,
    },

    /// Validate filters and print the compiled query plan
    Compile {
        #[arg(long, value_enum)]
        entity: Entity,
    },

    /// Validate filters and print the plan's explain output
    Explain {
        #[arg(long, value_enum)]
        entity: Entity,
    },

    /// Run the compiled plan against documents loaded from a JSON file
    Query {
        #[arg(long, value_enum)]
        entity: Entity,

        /// JSON file of the form {"collection": [documents]}
        #[arg(long)]
        data: PathBuf,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
