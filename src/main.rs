use std::error::Error;
use std::io::{self, Read};
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use quizgen::config::{ConnectArgs, ServeArgs, ServerConfig};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the quiz server
    Serve(ServeArgs),
    /// Open the terminal client
    Connect(ConnectArgs),
    /// Turn raw model output into validated questions
    Normalize {
        /// File holding the model output; stdin when omitted
        file: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let result = match cli.command {
        Command::Serve(args) => quizgen::server::run(ServerConfig::from(args)).await,
        Command::Connect(args) => quizgen::client::run(args.host, args.port).await,
        Command::Normalize { file } => normalize(file),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn normalize(file: Option<PathBuf>) -> Result<(), Box<dyn Error>> {
    let text = match file {
        Some(path) => std::fs::read_to_string(path)?,
        None => {
            let mut text = String::new();
            io::stdin().read_to_string(&mut text)?;
            text
        }
    };

    let questions = quizgen::mcq::normalize_resolved(&text)?;
    println!("{}", serde_json::to_string_pretty(&questions)?);
    Ok(())
}
