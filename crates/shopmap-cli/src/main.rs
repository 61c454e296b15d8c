mod load;
mod schema;
mod simulate;
mod summary;

use clap::{CommandFactory, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "shopmap-cli")]
#[command(about = "Shop visit map command line interface")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Load and normalize the shop table, then print totals
    Summary {
        /// Path or URL of the shop table (overrides `SHOPMAP_DATA_SOURCE`)
        #[arg(long)]
        source: Option<String>,
    },
    /// Replay zoom events through a headless map session
    Simulate {
        /// Path or URL of the shop table (overrides `SHOPMAP_DATA_SOURCE`)
        #[arg(long)]
        source: Option<String>,
        /// Zoom levels to apply, in order
        #[arg(long = "zoom", required = true, num_args = 1..)]
        zooms: Vec<f64>,
    },
    /// Print the active column mapping as YAML
    Schema,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = shopmap_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Some(Commands::Summary { source }) => {
            summary::run_summary(&config, source.as_deref()).await?;
        }
        Some(Commands::Simulate { source, zooms }) => {
            simulate::run_simulate(&config, source.as_deref(), &zooms).await?;
        }
        Some(Commands::Schema) => schema::run_schema(&config)?,
        None => Cli::command().print_help()?,
    }

    Ok(())
}
