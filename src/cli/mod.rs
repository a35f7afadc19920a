use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::config;
use crate::service::TrackService;
use crate::storage::operations::Storage;
use crate::storage::seed::{self, SeedOutcome};

#[derive(Parser)]
#[command(name = "music-library")]
#[command(version = "0.1")]
#[command(about = "Music library track API")]
pub struct Cli {
    /// Path to the config TOML file
    #[arg(short, long, default_value = "config.toml")]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create the database and tables if they do not exist
    Setup,
    /// Insert sample tracks
    Seed {
        /// Insert even if the library already has tracks
        #[arg(short, long)]
        force: bool,
    },
    /// Run http server hosting the track API
    Serve,
    /// List stored tracks
    List,
}

/// `m:ss`, or raw seconds when the stored value is negative
fn format_duration(secs: i64) -> String {
    if secs < 0 {
        format!("{secs}s")
    } else {
        format!("{}:{:02}", secs / 60, secs % 60)
    }
}

/// Entrypoint for CLI
pub fn run() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let cfg = config::Config::load(&cli.config)?;

    let mut storage = Storage::new(&cfg.database).context("Failed to initialize storage")?;
    storage.ensure_schema()?;

    match &cli.command {
        Commands::Setup => {
            println!("Database and tables are ready.");
        }

        Commands::Seed { force } => match seed::seed(&mut storage, *force)? {
            SeedOutcome::Inserted(tracks) => {
                println!("Seeding complete, inserted {} tracks:", tracks.len());
                for track in &tracks {
                    println!("    - [{}] {}", track.track_id, track.song_title);
                }
            }
            SeedOutcome::Skipped(existing) => {
                println!(
                    "Library already contains {existing} tracks, nothing seeded. Use --force to seed anyway."
                );
            }
        },

        Commands::Serve => {
            let service = TrackService::new(storage);
            let http_server = crate::http::server::HttpServer::new(service, cfg.http);

            println!(
                "Server running on http://{}:{}",
                http_server.config.bind_addr, http_server.config.port
            );
            http_server.run();
        }

        Commands::List => {
            let tracks = storage.find_all()?;
            if tracks.is_empty() {
                println!("No tracks in the library.");
            }

            for track in tracks {
                let duration = track
                    .duration
                    .map(format_duration)
                    .unwrap_or_else(|| "-".to_string());
                let year = track
                    .release_year
                    .map(|y| y.to_string())
                    .unwrap_or_else(|| "-".to_string());

                println!(
                    "[{}] {} - {} ({}, {}) {} {}",
                    track.track_id,
                    track.artist_name,
                    track.song_title,
                    track.album_name,
                    year,
                    track.genre,
                    duration
                );
            }
        }
    }

    Ok(())
}
