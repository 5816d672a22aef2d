use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "thoughtboard")]
#[command(version, about = "A shared thought board with live updates")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Path to a TOML config file (default: ./thoughtboard.toml)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the HTTP and WebSocket server
    Serve {
        /// Address to bind
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on
        #[arg(long, short)]
        port: Option<u16>,

        /// SQLite database file
        #[arg(long, value_name = "PATH")]
        database: Option<PathBuf>,

        /// Allow running without SECRET_KEY (local development only)
        #[arg(long)]
        dev: bool,
    },

    /// Create the database schema if it does not exist
    Init {
        /// SQLite database file
        #[arg(long, value_name = "PATH")]
        database: Option<PathBuf>,
    },

    /// Add a note to a board directly in the database
    Post {
        /// Board identifier
        board_id: String,

        /// Note text
        content: String,

        /// SQLite database file
        #[arg(long, value_name = "PATH")]
        database: Option<PathBuf>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print every note on a board, oldest first
    List {
        /// Board identifier
        board_id: String,

        /// SQLite database file
        #[arg(long, value_name = "PATH")]
        database: Option<PathBuf>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_serve_flags() {
        let cli = Cli::parse_from(["thoughtboard", "-v", "serve", "--port", "8080", "--dev"]);
        assert_eq!(cli.verbose, 1);
        match cli.command {
            Commands::Serve { port, dev, host, .. } => {
                assert_eq!(port, Some(8080));
                assert!(dev);
                assert!(host.is_none());
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_post() {
        let cli = Cli::parse_from(["thoughtboard", "post", "team-x", "ship it", "--json"]);
        match cli.command {
            Commands::Post {
                board_id,
                content,
                json,
                ..
            } => {
                assert_eq!(board_id, "team-x");
                assert_eq!(content, "ship it");
                assert!(json);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }
}
