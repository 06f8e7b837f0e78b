mod db;
mod query;

use clap::{Args, Parser, Subcommand};
use fieldmap_core::{CarrierSelector, LocationFilter, ViewportBounds};

#[derive(Debug, Parser)]
#[command(name = "fieldmap-cli")]
#[command(about = "Field equipment map command line interface")]
struct Cli {
    /// Base URL of the fieldmap server
    #[arg(
        long,
        global = true,
        env = "FIELDMAP_SERVER_URL",
        default_value = "http://localhost:8070"
    )]
    server: String,
    /// HTTP timeout in seconds
    #[arg(long, global = true, default_value = "30")]
    timeout_secs: u64,
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// List locations matching a viewport and carrier
    Locations {
        #[command(flatten)]
        filter: FilterArgs,
        /// Print the raw JSON array instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Build the node/leaf connection graph for a query and print it as JSON
    Graph {
        #[command(flatten)]
        filter: FilterArgs,
    },
    /// Classify a customer name offline
    Classify {
        /// Free-text customer name
        name: String,
    },
    /// Show the map-provider settings served by the server
    Config,
    /// Delete one stored location by id
    Delete {
        /// Location id as returned by `locations`
        id: String,
    },
    /// Database management commands
    Db {
        #[command(subcommand)]
        command: db::DbCommands,
    },
}

/// Viewport and carrier selection shared by the query commands.
#[derive(Debug, Clone, Default, Args)]
struct FilterArgs {
    /// Carrier to keep (Dialog, Mobitel, Hutch, Etisalat, Other, or All)
    #[arg(long)]
    carrier: Option<String>,
    /// Northern edge of the viewport
    #[arg(long, allow_negative_numbers = true, requires_all = ["south", "east", "west"])]
    north: Option<f64>,
    /// Southern edge of the viewport
    #[arg(long, allow_negative_numbers = true, requires_all = ["north", "east", "west"])]
    south: Option<f64>,
    /// Eastern edge of the viewport
    #[arg(long, allow_negative_numbers = true, requires_all = ["north", "south", "west"])]
    east: Option<f64>,
    /// Western edge of the viewport
    #[arg(long, allow_negative_numbers = true, requires_all = ["north", "south", "east"])]
    west: Option<f64>,
}

impl FilterArgs {
    fn to_filter(&self) -> anyhow::Result<LocationFilter> {
        let carrier = CarrierSelector::parse(self.carrier.as_deref())?;
        let bounds = match (self.north, self.south, self.east, self.west) {
            (Some(north), Some(south), Some(east), Some(west)) => {
                Some(ViewportBounds::new(north, south, east, west)?)
            }
            (None, None, None, None) => None,
            _ => anyhow::bail!("viewport bounds require all of --north, --south, --east, and --west"),
        };
        Ok(LocationFilter::new(bounds, carrier))
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let Some(command) = cli.command else {
        println!("fieldmap-cli ready; run with --help for commands");
        return Ok(());
    };

    match command {
        Commands::Classify { name } => query::run_classify(&name),
        Commands::Db { command } => db::run(command).await,
        Commands::Locations { filter, json } => {
            let client = fieldmap_client::MapClient::with_base_url(&cli.server, cli.timeout_secs)?;
            query::run_locations(&client, &filter.to_filter()?, json).await
        }
        Commands::Graph { filter } => {
            let client = fieldmap_client::MapClient::with_base_url(&cli.server, cli.timeout_secs)?;
            query::run_graph(&client, &filter.to_filter()?).await
        }
        Commands::Config => {
            let client = fieldmap_client::MapClient::with_base_url(&cli.server, cli.timeout_secs)?;
            query::run_config(&client).await
        }
        Commands::Delete { id } => {
            let client = fieldmap_client::MapClient::with_base_url(&cli.server, cli.timeout_secs)?;
            query::run_delete(&client, &id).await
        }
    }
}
