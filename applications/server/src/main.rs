/// Atelier Server - Range-addressable media delivery
use atelier_server::{
    api,
    config::ServerConfig,
    services::SessionService,
    state::AppState,
};
use atelier_store::{FsObjectStore, ObjectStore};
use clap::{Parser, Subcommand};
use std::{net::SocketAddr, sync::Arc};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "atelier-server")]
#[command(about = "Atelier media delivery server", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server
    Serve {
        /// Configuration file path
        #[arg(short, long)]
        config: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "atelier_server=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { config } => {
            serve(config.as_deref()).await?;
        }
    }

    Ok(())
}

async fn serve(config_path: Option<&str>) -> anyhow::Result<()> {
    // Load configuration
    let config = ServerConfig::load(config_path)?;
    config.validate()?;

    tracing::info!("Starting Atelier Server");
    tracing::info!("Host: {}", config.server.host);
    tracing::info!("Port: {}", config.server.port);

    // Initialize the object store
    let store = FsObjectStore::new(config.storage.object_store_path.clone());
    store.initialize().await?;
    let store: Arc<dyn ObjectStore> = Arc::new(store);
    tracing::info!("Object store initialized");

    // Initialize session verification
    let sessions = Arc::new(SessionService::new(config.auth.admin_token.clone()));

    // Build application state and router
    let app_state = AppState::new(store, sessions);
    let app = api::create_router(app_state);

    // Create server address
    let addr = SocketAddr::from((
        config.server.host.parse::<std::net::IpAddr>()?,
        config.server.port,
    ));

    tracing::info!("Server listening on {}", addr);

    // Start server
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
