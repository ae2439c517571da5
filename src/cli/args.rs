//! CLI argument definitions.
//!
//! Uses clap derive macros for type-safe argument parsing.

use clap::{Parser, Subcommand};
use uuid::Uuid;

/// Hostel Manager - hostel, room and allocation management API
#[derive(Parser, Debug)]
#[command(name = "hostel-manager")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the HTTP server
    Serve(ServeArgs),

    /// Run database migrations
    Migrate(MigrateArgs),

    /// Manage background jobs
    Jobs(JobsArgs),

    /// Act on room requests through the HTTP API
    Requests(RequestsArgs),
}

/// Arguments for the serve command. Unset values come from
/// `SERVER_HOST` / `SERVER_PORT`.
#[derive(Parser, Debug)]
pub struct ServeArgs {
    /// Host to bind to
    #[arg(short = 'H', long)]
    pub host: Option<String>,

    /// Port to listen on
    #[arg(short, long)]
    pub port: Option<u16>,
}

/// Arguments for the migrate command
#[derive(Parser, Debug)]
pub struct MigrateArgs {
    #[command(subcommand)]
    pub action: MigrateAction,
}

/// Migration actions
#[derive(Subcommand, Debug)]
pub enum MigrateAction {
    /// Run pending migrations
    Up,
    /// Rollback last migration
    Down,
    /// Show migration status
    Status,
    /// Reset and re-run all migrations
    Fresh,
}

/// Arguments for the jobs command
#[derive(Parser, Debug)]
pub struct JobsArgs {
    #[command(subcommand)]
    pub action: JobsAction,
}

/// Job management actions
#[derive(Subcommand, Debug)]
pub enum JobsAction {
    /// Start background job worker
    Work,
    /// List pending jobs
    List,
    /// Clear failed jobs
    Clear,
}

/// Arguments for the requests command
#[derive(Parser, Debug)]
pub struct RequestsArgs {
    /// Bearer token of an admin (or of the requesting student for cancel)
    #[arg(long, env = "HOSTEL_API_TOKEN", hide_env_values = true)]
    pub token: String,

    /// API base URL, overrides HOSTEL_API_URL
    #[arg(long)]
    pub api_url: Option<String>,

    #[command(subcommand)]
    pub action: RequestsAction,
}

/// Room request actions
#[derive(Subcommand, Debug)]
pub enum RequestsAction {
    /// Approve a request into a room after re-checking its status
    Approve {
        request_id: Uuid,
        #[arg(long)]
        room_id: Uuid,
    },
    /// Cancel a request
    Cancel {
        request_id: Uuid,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_approve() {
        let request_id = Uuid::new_v4();
        let room_id = Uuid::new_v4();
        let cli = Cli::try_parse_from([
            "hostel-manager",
            "requests",
            "--token",
            "t",
            "approve",
            &request_id.to_string(),
            "--room-id",
            &room_id.to_string(),
        ])
        .unwrap();

        match cli.command {
            Commands::Requests(args) => match args.action {
                RequestsAction::Approve {
                    request_id: r,
                    room_id: room,
                } => {
                    assert_eq!(r, request_id);
                    assert_eq!(room, room_id);
                }
                other => panic!("unexpected action {other:?}"),
            },
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_parse_cancel_yes() {
        let cli = Cli::try_parse_from([
            "hostel-manager",
            "requests",
            "--token",
            "t",
            "cancel",
            &Uuid::new_v4().to_string(),
            "--yes",
        ])
        .unwrap();
        assert!(matches!(
            cli.command,
            Commands::Requests(RequestsArgs {
                action: RequestsAction::Cancel { yes: true, .. },
                ..
            })
        ));
    }

    #[test]
    fn test_serve_overrides() {
        let cli = Cli::try_parse_from(["hostel-manager", "serve", "--port", "8080"]).unwrap();
        match cli.command {
            Commands::Serve(args) => {
                assert_eq!(args.port, Some(8080));
                assert!(args.host.is_none());
            }
            other => panic!("unexpected command {other:?}"),
        }
    }
}
