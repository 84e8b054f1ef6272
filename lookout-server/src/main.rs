use clap::{Parser, Subcommand};
use std::process::ExitCode;
use tracing::{error, info};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use lookout_core::{init_database, run_linode_ingest, LookoutConfig};

mod routes;
mod state;

use state::AppState;

const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Parser)]
#[command(name = "lookoutd")]
#[command(version = VERSION)]
#[command(about = "lookout - infrastructure metrics ingestion and monitoring backend")]
#[command(long_about = r#"
lookoutd ingests per-instance statistics from the Linode API into the
metrics time series and serves them back over HTTP.

Use 'lookoutd migrate' to bring the database schema up to date,
'lookoutd ingest' to run a single ingestion invocation, and
'lookoutd serve' to run the HTTP server with the POST /ingest/linode
trigger and the dashboard read endpoints.
"#)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    #[command(about = "Run the HTTP server")]
    Serve {
        #[arg(short, long)]
        bind: Option<String>,
    },

    #[command(about = "Run one ingestion invocation and exit")]
    Ingest,

    #[command(about = "Run database migrations and exit")]
    Migrate,
}

fn init_tracing(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer())
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli.command).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(command: Commands) -> anyhow::Result<()> {
    match command {
        Commands::Migrate => {
            let db = init_database().await?;
            db.close().await;
            Ok(())
        }
        Commands::Ingest => {
            let db = init_database().await?;
            let report = run_linode_ingest(&db).await?;
            info!("{}", report.summary());
            println!("{}", serde_json::to_string_pretty(&report)?);
            db.close().await;
            Ok(())
        }
        Commands::Serve { bind } => {
            let config = LookoutConfig::from_env()?;
            let db = init_database().await?;

            let addr = bind.unwrap_or_else(|| config.server.bind);
            let state = AppState::new(db);
            let app = routes::router(state);

            info!(addr = %addr, "lookoutd listening");
            let listener = tokio::net::TcpListener::bind(&addr).await?;
            axum::serve(listener, app).await?;
            Ok(())
        }
    }
}
