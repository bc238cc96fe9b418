use clap::{Parser, Subcommand};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{Level, info};
use tracing_subscriber::FmtSubscriber;

use hotel_gallery::{
    AppState, Config, app_router,
    gallery::{GalleryManager, SeedOutcome},
    startup_checks,
};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Global options that apply to all commands
    #[arg(short, long, default_value = "config.toml", global = true)]
    config: PathBuf,

    #[arg(short, long, default_value = "info", global = true)]
    log_level: String,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the web server (default if no command specified)
    Serve {
        #[arg(short, long)]
        port: Option<u16>,

        #[arg(long)]
        host: Option<String>,

        /// Automatically quit after specified number of seconds (useful for testing)
        #[arg(long)]
        quit_after: Option<u64>,
    },

    /// Insert the default hotel photos if the gallery is empty
    Seed,

    /// Print the gallery contents, newest first
    List {
        /// Only show one category (rooms, events, dining, amenities, uploaded)
        #[arg(long)]
        category: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Set up logging first
    let level = match cli.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config = load_config(&cli.config)?;

    match cli.command {
        Some(Commands::Seed) => seed_command(&config).await,
        Some(Commands::List { category }) => list_command(&config, category).await,
        Some(Commands::Serve {
            port,
            host,
            quit_after,
        }) => run_server(config, port, host, quit_after).await,
        None => {
            // Default to serve command if no subcommand specified
            run_server(config, None, None, None).await
        }
    }
}

fn load_config(config_path: &Path) -> Result<Config, Box<dyn std::error::Error>> {
    if config_path.exists() {
        let config_content = std::fs::read_to_string(config_path)?;
        let config = toml_edit::de::from_str::<Config>(&config_content)?;
        info!("Configuration loaded from: {:?}", config_path);
        Ok(config)
    } else {
        info!("Config file not found at {:?}, using defaults", config_path);
        Ok(Config::default())
    }
}

async fn seed_command(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let gallery = GalleryManager::from_config(config).await?;

    match gallery.seed_defaults().await? {
        SeedOutcome::Seeded(items) => {
            println!("Seeded {} gallery items:", items.len());
            for item in items {
                println!("  {} [{}] {}", item.id, item.category, item.title);
            }
        }
        SeedOutcome::Skipped { existing } => {
            println!("Gallery already has {} items, nothing to seed", existing);
        }
    }

    Ok(())
}

async fn list_command(
    config: &Config,
    category: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let gallery = GalleryManager::from_config(config).await?;
    let items = gallery.list_items(category.as_deref()).await?;

    if items.is_empty() {
        println!("No gallery items");
        return Ok(());
    }

    for item in &items {
        println!(
            "{}  {:<9} {:<5} {}  {}",
            item.uploaded_at.format("%Y-%m-%d %H:%M:%S"),
            item.category.as_str(),
            item.media_type.as_str(),
            item.id,
            item.title
        );
    }
    println!("{} items", items.len());

    Ok(())
}

async fn run_server(
    config: Config,
    port: Option<u16>,
    host: Option<String>,
    quit_after: Option<u64>,
) -> Result<(), Box<dyn std::error::Error>> {
    let host = host.unwrap_or(config.server.host.clone());
    let port = port.unwrap_or(config.server.port);

    info!("Starting {} server", config.app.name);

    // Perform startup checks
    match startup_checks::perform_startup_checks(&config).await {
        Ok(()) => info!("All startup checks passed"),
        Err(errors) => {
            for error in &errors {
                tracing::error!("Startup check failed: {}", error);
            }

            if errors.iter().any(startup_checks::StartupCheckError::is_critical) {
                tracing::error!("Critical startup check failed, exiting");
                return Err("Critical startup check failed".into());
            } else {
                tracing::warn!("Non-critical startup checks failed, continuing");
            }
        }
    }

    let gallery = Arc::new(GalleryManager::from_config(&config).await?);

    if config.gallery.seed_on_startup {
        match gallery.seed_defaults().await {
            Ok(SeedOutcome::Seeded(items)) => {
                info!("Seeded {} default items on startup", items.len())
            }
            Ok(SeedOutcome::Skipped { existing }) => {
                info!("Startup seed skipped, gallery has {} items", existing)
            }
            Err(e) => tracing::error!("Failed to seed gallery on startup: {}", e),
        }
    }

    match gallery.total_items().await {
        Ok(total) => info!("Gallery holds {} items", total),
        Err(e) => tracing::warn!("Could not count gallery items: {}", e),
    }

    let app = app_router(AppState {
        gallery,
        config: config.clone(),
    });

    let addr = SocketAddr::from((host.parse::<std::net::IpAddr>()?, port));
    info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    // Set up graceful shutdown
    let server = axum::serve(listener, app);
    let graceful = server.with_graceful_shutdown(shutdown_signal(quit_after));

    // Start the server
    if let Err(e) = graceful.await {
        tracing::error!("Server error: {}", e);
    }

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal(quit_after: Option<u64>) {
    use tokio::signal;
    use tokio::time::{Duration, sleep};

    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    let quit_timer = async {
        if let Some(seconds) = quit_after {
            info!(
                "Server will automatically shut down after {} seconds",
                seconds
            );
            sleep(Duration::from_secs(seconds)).await;
            info!("Quit timer expired, shutting down");
        } else {
            std::future::pending::<()>().await
        }
    };

    tokio::select! {
        _ = ctrl_c => {
            info!("Shutdown signal received (Ctrl+C)");
        },
        _ = terminate => {
            info!("Shutdown signal received (SIGTERM)");
        },
        _ = quit_timer => {},
    }
}
