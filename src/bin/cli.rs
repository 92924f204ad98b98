//! qapwire CLI Client
//!
//! Command-line interface for driving a QAP1 server.

use std::fs::File;
use std::io::Write;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use qapwire::{Config, Result, Session};
use tracing_subscriber::{fmt, EnvFilter};

/// qapwire CLI
#[derive(Parser, Debug)]
#[command(name = "qapwire-cli")]
#[command(about = "CLI for QAP1 computation servers")]
#[command(version)]
struct Args {
    /// Server host
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// Server port
    #[arg(short, long, default_value = "6311")]
    port: u16,

    /// Login user, used when the server requires authentication
    #[arg(short, long, default_value = "")]
    user: String,

    /// Login password
    #[arg(long, default_value = "")]
    password: String,

    /// Bytes per packet for file uploads
    #[arg(long, default_value = "128")]
    chunk_size: usize,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Evaluate an expression and print the result
    Eval {
        /// Source text to evaluate
        expr: String,
    },

    /// Evaluate an expression, ignoring the result
    Exec {
        /// Source text to evaluate
        expr: String,
    },

    /// Upload a local file
    Put {
        /// Local source path
        local: PathBuf,

        /// Server-side file name
        remote: String,
    },

    /// Download a server-side file to stdout
    Get {
        /// Server-side file name
        remote: String,

        /// Max bytes requested per read
        #[arg(long, default_value = "8192")]
        size: i32,
    },

    /// Remove a server-side file
    Rm {
        /// Server-side file name
        remote: String,
    },

    /// Shut the server down
    Shutdown,
}

fn main() {
    // Initialize tracing/logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,qapwire=debug"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    if let Err(e) = run(args) {
        tracing::error!("{}", e);
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<()> {
    let config = Config::builder()
        .host(&args.host)
        .port(args.port)
        .file_chunk_size(args.chunk_size)
        .build();

    let mut session = Session::connect(&config)?;
    tracing::info!(
        "Connected to {} (protocol version {})",
        config.address(),
        session.server_version()
    );

    if session.needs_login() {
        session.login(&args.user, &args.password)?;
    }

    match args.command {
        Commands::Eval { expr } => {
            let result = session.eval(&expr)?;
            println!("{}", result);
        }
        Commands::Exec { expr } => session.void_eval(&expr)?,
        Commands::Put { local, remote } => {
            let source = File::open(&local)?;
            session.create_file(&remote)?;
            let written = session.write_file_from(source)?;
            session.close_file()?;
            tracing::info!("Uploaded {} bytes to {}", written, remote);
        }
        Commands::Get { remote, size } => {
            session.open_file(&remote)?;
            let mut stdout = std::io::stdout().lock();
            loop {
                let chunk = session.read_file(size)?;
                if chunk.is_empty() {
                    break;
                }
                stdout.write_all(&chunk)?;
            }
            stdout.flush()?;
            session.close_file()?;
        }
        Commands::Rm { remote } => session.remove_file(&remote)?,
        Commands::Shutdown => {
            session.shutdown()?;
            tracing::info!("Shutdown requested");
        }
    }

    session.close()
}
