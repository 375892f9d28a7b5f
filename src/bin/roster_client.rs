use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use school_roster::client::RosterClient;
use school_roster::config;
use school_roster::view;

#[derive(Debug, Parser)]
#[command(author, version, about = "Fetch and print the school roster from the API")]
struct Args {
    /// Path to YAML config file (reads `client`; defaults to ./config.yaml when present)
    #[arg(long)]
    config: Option<PathBuf>,

    /// API base URL, overriding the config file and API_BASE_URL
    #[arg(long)]
    base_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Probe GET /health
    Health,
    /// List classrooms with their students
    Classes,
    /// List students, optionally narrowed by a search string
    Students {
        /// Match against name (case-insensitive), id or classroom id
        #[arg(long, default_value = "")]
        search: String,
    },
    /// Count classrooms and students, fetching both at once
    Summary,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .compact()
        .init();

    let args = Args::parse();
    let mut cfg = config::load(args.config.as_deref())?;
    if let Some(base_url) = args.base_url {
        cfg.client.base_url = base_url;
    }
    let api = RosterClient::from_config(&cfg)?;

    match args.command {
        Command::Health => {
            println!("{}", view::connection_status(&api).await);
        }
        Command::Classes => {
            let loaded = view::load_classes(&api).await;
            if let Some(notice) = loaded.notice {
                eprintln!("Error: {}", notice);
            }
            print!("{}", view::render_classes(&loaded.items));
        }
        Command::Students { search } => {
            let loaded = view::load_students(&api).await;
            if let Some(notice) = loaded.notice {
                eprintln!("Error: {}", notice);
            }
            let shown = view::filter_students(&loaded.items, &search);
            print!("{}", view::render_students(shown));
        }
        Command::Summary => {
            let (classes, students) = view::load_overview(&api).await;
            for notice in [classes.notice, students.notice].into_iter().flatten() {
                eprintln!("Error: {}", notice);
            }
            println!(
                "{} classes, {} students",
                classes.items.len(),
                students.items.len()
            );
        }
    }

    Ok(())
}
