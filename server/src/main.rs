use std::net::SocketAddr;
use tokio::net::TcpListener;

use eventboard_server::config::{generate_config_template, Config};
use eventboard_server::{db, routes, state, users};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load config with layered precedence: defaults < TOML < env < CLI
    let config = Config::load()?;

    // Handle --generate-config: print template and exit
    if config.generate_config {
        print!("{}", generate_config_template());
        return Ok(());
    }

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("eventboard_server=info"));
    if config.json_logs {
        tracing_subscriber::fmt().json().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt().pretty().with_env_filter(filter).init();
    }

    tracing::info!("Event board server v{} starting", env!("CARGO_PKG_VERSION"));

    let db = db::init_db(&config.data_dir)?;

    if config.seed_admin {
        let conn = db.lock().map_err(|_| "database lock poisoned")?;
        match users::seed::seed_admin(&conn)? {
            Some(admin) => tracing::info!(user_id = admin.id, "Seeded first-boot admin user"),
            None => tracing::debug!("Users present, skipping admin seed"),
        }
    }

    let app_state = state::AppState::new(db, config.broadcast.clone());
    let app = routes::build_router(app_state);

    let addr = format!("{}:{}", config.bind_address, config.port);
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!("Listening on {}", addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
