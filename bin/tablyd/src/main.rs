//! `tablyd` — the Tably server binary.
//!
//! Usage:
//!   tablyd [-c <context-name-or-path>] [--listen <addr>] [--data-dir <dir>]
//!
//! The context name resolves to `/etc/tably/<name>.toml`.
//! If a path with `/` or `.` is given, it's used directly.
//! Without `-c`, built-in defaults apply.

mod config;
mod routes;

use std::sync::Arc;

use clap::Parser;
use tably_core::Module;
use tracing::info;

use config::ServerConfig;
use menu::suggest::{HttpSuggester, Suggester};
use menu::MenuModule;
use order::OrderModule;
use routes::AppState;

/// Tably server.
#[derive(Parser, Debug)]
#[command(name = "tablyd", about = "Tably menu & table-ordering server")]
struct Cli {
    /// Context name or path to config file.
    #[arg(short = 'c', long = "config")]
    config: Option<String>,

    /// Listen address (overrides the configured value).
    #[arg(long = "listen")]
    listen: Option<String>,

    /// Data directory (overrides the configured value).
    #[arg(long = "data-dir")]
    data_dir: Option<std::path::PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let cli = Cli::parse();

    // Load server configuration.
    let mut server_config = match &cli.config {
        Some(name) => {
            let config_path = ServerConfig::resolve_path(name);
            info!("Loading configuration from {}", config_path.display());
            ServerConfig::load(&config_path)?
        }
        None => ServerConfig::default(),
    };
    if let Some(listen) = cli.listen {
        server_config.server.listen = listen;
    }
    if let Some(data_dir) = cli.data_dir {
        server_config.storage.data_dir = data_dir;
    }

    // Initialize storage.
    let data_dir = server_config.storage.data_dir.clone();
    std::fs::create_dir_all(&data_dir)?;
    let kv: Arc<dyn tably_kv::KVStore> = Arc::new(
        tably_kv::RedbStore::open(&data_dir.join("data.redb"))
            .map_err(|e| anyhow::anyhow!("failed to open KV store: {}", e))?,
    );

    // Description suggestions are optional; without a configured backend the
    // endpoint answers empty and editing carries on unaffected.
    let suggester: Option<Arc<dyn Suggester>> = server_config
        .suggest
        .clone()
        .map(|cfg| Arc::new(HttpSuggester::new(cfg)) as Arc<dyn Suggester>);
    if suggester.is_some() {
        info!("Description suggestion backend configured");
    }

    // Initialize modules. The order module resolves carts against the menu
    // store, so it receives it as the read-only catalog view.
    let menu_module = MenuModule::new(Arc::clone(&kv), suggester)?;
    info!("Menu module initialized");

    let catalog: Arc<dyn menu::store::Catalog> = menu_module.store().clone();
    let order_module = OrderModule::new(Arc::clone(&kv), catalog)?;
    info!(
        "Order module initialized ({} orders on record)",
        order_module.store().count()
    );

    let module_routes = vec![
        (menu_module.name(), menu_module.routes()),
        (order_module.name(), order_module.routes()),
    ];

    // Build application state.
    let app_state = AppState {
        menu: Arc::clone(menu_module.store()),
        orders: Arc::clone(order_module.store()),
        config: Arc::new(server_config.clone()),
    };

    // Build router.
    let app = routes::build_router(app_state, module_routes);

    // Start server.
    let listener = tokio::net::TcpListener::bind(&server_config.server.listen).await?;
    info!("Tably server listening on {}", server_config.server.listen);
    axum::serve(listener, app).await?;

    Ok(())
}
