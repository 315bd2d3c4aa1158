//! PitLog CLI Client
//!
//! Command-line interface for operating a PitLog server.

use clap::{Parser, Subcommand};
use pitlog::controller::Activity;
use pitlog::network::Client;

/// PitLog CLI
#[derive(Parser, Debug)]
#[command(name = "pitlog-cli")]
#[command(about = "CLI for the PitLog race recorder")]
#[command(version)]
struct Args {
    /// Server address
    #[arg(short, long, default_value = "127.0.0.1:7878")]
    server: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List recorded sessions
    List,

    /// Add a comment to a session
    Comment {
        /// Session tag
        tag: String,

        /// Comment text
        text: String,
    },

    /// Replace the labels of a session
    Tags {
        /// Session tag
        tag: String,

        /// New labels (replaces all existing ones)
        labels: Vec<String>,
    },

    /// Replay a recorded session
    Replay {
        /// Session tag
        tag: String,
    },

    /// Cancel the running replay
    StopReplay,

    /// Close the current recording
    StopSession,

    /// Show what the recorder is doing
    Status,

    /// Ping the server
    Ping,
}

fn main() {
    let args = Args::parse();

    if let Err(e) = run(args) {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}

fn run(args: Args) -> pitlog::Result<()> {
    let mut client = Client::connect(&args.server)?;

    match args.command {
        Commands::List => {
            let sessions = client.list_sessions()?;
            if sessions.is_empty() {
                println!("no sessions recorded");
            }
            for session in sessions {
                let tags: Vec<&str> = session.metadata.tags.iter().map(String::as_str).collect();
                println!(
                    "{}  created {}  tags [{}]",
                    session.tag,
                    session.created.format("%Y-%m-%d %H:%M:%S"),
                    tags.join(", ")
                );
                for comment in &session.metadata.comments {
                    println!("    - {}", comment);
                }
            }
        }
        Commands::Comment { tag, text } => {
            let metadata = client.add_comment(&tag, &text)?;
            println!("{} now has {} comment(s)", tag, metadata.comments.len());
        }
        Commands::Tags { tag, labels } => {
            let metadata = client.replace_tags(&tag, labels)?;
            let tags: Vec<&str> = metadata.tags.iter().map(String::as_str).collect();
            println!("{} tags: [{}]", tag, tags.join(", "));
        }
        Commands::Replay { tag } => {
            client.start_replay(&tag)?;
            println!("replaying {}", tag);
        }
        Commands::StopReplay => {
            if client.stop_replay()? {
                println!("replay stopped");
            } else {
                println!("no replay running");
            }
        }
        Commands::StopSession => {
            client.stop_session()?;
            println!("session closed");
        }
        Commands::Status => {
            let status = client.status()?;
            match status.activity {
                Activity::Idle => println!("{}: idle", status.car_id),
                Activity::Recording { tag } => println!("{}: recording {}", status.car_id, tag),
                Activity::Replaying { tag } => println!("{}: replaying {}", status.car_id, tag),
            }
        }
        Commands::Ping => {
            println!("{}", client.ping()?);
        }
    }

    Ok(())
}
