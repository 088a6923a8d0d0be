use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use shelf_kernel::settings::Settings;
use shelf_store::JsonFileStore;

/// Books CRUD service backed by a JSON file
#[derive(Debug, Parser)]
#[command(name = "shelf", version, about)]
struct Cli {
    /// Configuration directory (defaults to $SHELF_CONFIG_DIR or ./config)
    #[arg(long, global = true)]
    config_dir: Option<PathBuf>,

    /// Environment overlay to load: local, staging or production
    #[arg(long, global = true)]
    env: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the HTTP service until Ctrl-C
    Serve {
        /// Override the configured listen port
        #[arg(long)]
        port: Option<u16>,
    },
    /// Create empty books and users files if missing
    InitStore,
    /// Print the resolved settings
    ShowConfig,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut settings = Settings::load_with(cli.config_dir, cli.env)
        .with_context(|| "failed to load Shelf settings")?;

    shelf_telemetry::init(&settings.telemetry)?;

    match cli.command {
        Command::Serve { port } => {
            if let Some(port) = port {
                settings.server.port = port;
            }
            shelf_app::run(settings).await
        }
        Command::InitStore => {
            for (name, path) in settings.storage.collection_paths() {
                let store = JsonFileStore::new(path);
                let created = store
                    .ensure_exists()
                    .await
                    .with_context(|| format!("failed to create the {name} collection"))?;
                if created {
                    println!("created {}", store.path().display());
                } else {
                    println!("{} already exists", store.path().display());
                }
            }
            Ok(())
        }
        Command::ShowConfig => {
            println!("{:#?}", settings);
            Ok(())
        }
    }
}
