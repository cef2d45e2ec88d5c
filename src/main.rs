use clap::{Parser, Subcommand};
use colored::Colorize;
use eyre::{Context, Result};
use resource_store::{BlogPost, Config, Fruit, Record, ResourceConfig, Stores, Task, build_router, cors_layer};
use std::path::PathBuf;
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "resource-store")]
#[command(about = "Resource store - in-memory CRUD service for blog posts, fruits and tasks")]
#[command(version = env!("GIT_DESCRIBE"))]
struct Cli {
    /// Path to a YAML config file (default: <config dir>/resource-store/config.yaml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Override the configured log level (trace, debug, info, warn, error)
    #[arg(short, long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP server
    Serve {
        /// Address to listen on, overriding the config file
        #[arg(short, long)]
        bind: Option<String>,
    },

    /// Print the effective configuration as YAML
    Config,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_path = Config::resolve_path(cli.config.as_deref());
    let mut config = match &config_path {
        Some(path) => Config::from_file(path)?,
        None => Config::default(),
    };
    if let Some(level) = cli.log_level {
        config.log_level = level;
    }

    // Setup tracing; stdout is reserved for `config` output
    tracing_subscriber::fmt()
        .with_max_level(config.log_level()?)
        .with_writer(std::io::stderr)
        .init();

    match &config_path {
        Some(path) => info!(path = %path.display(), "Loaded config"),
        None => info!("No config file found, using defaults"),
    }

    match cli.command {
        Commands::Serve { bind } => {
            if let Some(bind) = bind {
                config.bind = bind;
            }
            serve(config).await?;
        }
        Commands::Config => {
            print!("{}", config.to_yaml()?);
        }
    }

    Ok(())
}

async fn serve(config: Config) -> Result<()> {
    let stores = Stores::new(&config.resources);
    let mut app = build_router(&stores, &config.resources);
    if let Some(cors) = cors_layer(config.cors_origins()?) {
        info!(origins = ?config.cors_origins, "CORS enabled");
        app = app.layer(cors);
    }

    let listener = tokio::net::TcpListener::bind(&config.bind)
        .await
        .with_context(|| format!("Failed to bind {}", config.bind))?;
    let addr = listener.local_addr().context("Failed to read listener address")?;

    print_banner(&addr.to_string(), &config);
    info!(%addr, "HTTP server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server failed")?;

    info!(
        blogposts = stores.blogposts.len(),
        fruits = stores.fruits.len(),
        tasks = stores.tasks.len(),
        "Server stopped, discarding in-memory records"
    );
    Ok(())
}

fn print_banner(addr: &str, config: &Config) {
    let resources = &config.resources;
    println!("{}", "Resource store running".green().bold());
    println!("  {} http://{}", "Listening:".bold(), addr);
    print_resource(BlogPost::collection_name(), &resources.blogposts);
    print_resource(Fruit::collection_name(), &resources.fruits);
    print_resource(Task::collection_name(), &resources.tasks);
    println!();
}

fn print_resource(collection: &str, resource: &ResourceConfig) {
    println!(
        "  {:<12} id={} put={} envelope={}",
        format!("/{}", collection).cyan(),
        resource.id_policy,
        resource.put,
        resource.envelope
    );
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = ?e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
