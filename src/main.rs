use axum::Router;
use clap::Parser;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use vigencias::auth::hash_password;
use vigencias::config::Config;
use vigencias::db::{AppState, create_pool, init_db, queries};
use vigencias::handlers;
use vigencias::models::{
    CreateClient, CreateClientProduct, CreateProduct, CreateUser, CreateVigencia, Role,
};
use vigencias::semaforo::Thresholds;

#[derive(Parser, Debug)]
#[command(name = "vigencias")]
#[command(about = "License-validity tracking with traffic-light expiration status")]
struct Cli {
    /// Seed the database with dev data (users, client, product, vigencias)
    #[arg(long)]
    seed: bool,

    /// Delete the database on exit (dev mode only, useful for fresh starts)
    #[arg(long)]
    ephemeral: bool,
}

fn bootstrap_admin(state: &AppState, email: &str, password: &str) {
    let conn = state
        .db
        .get()
        .expect("Failed to get db connection for bootstrap");

    let count = queries::count_users(&conn).expect("Failed to count users");
    if count > 0 {
        tracing::info!("Users already exist, skipping bootstrap");
        return;
    }

    let input = CreateUser {
        email: email.to_string(),
        password: password.to_string(),
        name: "Bootstrap Admin".to_string(),
        role: Role::Stac,
    };
    input.validate().expect("Invalid bootstrap admin credentials");

    let password_hash = hash_password(password).expect("Failed to hash bootstrap password");
    let user =
        queries::create_user(&conn, &input, &password_hash).expect("Failed to create admin");

    tracing::info!("============================================");
    tracing::info!("BOOTSTRAP ADMIN CREATED");
    tracing::info!("Email: {}", user.email);
    tracing::info!("============================================");
}

/// Seeds the database with dev data for testing.
/// Creates one user per role, a client, a product, their link and a few
/// vigencias at different distances from expiration.
/// Only runs in dev mode and when the database is empty.
fn seed_dev_data(state: &AppState) {
    const DAY: i64 = 86_400;

    let conn = state
        .db
        .get()
        .expect("Failed to get db connection for seeding");

    let count = queries::count_users(&conn).expect("Failed to count users");
    if count > 0 {
        tracing::info!("Database already has data, skipping seed");
        return;
    }

    tracing::info!("============================================");
    tracing::info!("SEEDING DEV DATA");
    tracing::info!("============================================");

    let password_hash = hash_password("vigencias-dev").expect("Failed to hash seed password");
    let mut admin_id = String::new();
    for (email, name, role) in [
        ("stac@vigencias.local", "Dev STAC", Role::Stac),
        ("proyecto@vigencias.local", "Dev Proyecto", Role::Proyecto),
        ("comercial@vigencias.local", "Dev Comercial", Role::Comercial),
    ] {
        let user = queries::create_user(
            &conn,
            &CreateUser {
                email: email.to_string(),
                password: String::new(), // hash passed separately
                name: name.to_string(),
                role,
            },
            &password_hash,
        )
        .expect("Failed to create seed user");
        tracing::info!("User: {} ({})", user.email, user.role);
        if role == Role::Stac {
            admin_id = user.id;
        }
    }
    tracing::info!("Password for all seed users: vigencias-dev");

    let client = queries::create_client(
        &conn,
        &CreateClient {
            name: "Dev Client SA".to_string(),
            email: Some("contact@devclient.local".to_string()),
            phone: None,
            address: None,
            primary_contact: Some("Dev Contact".to_string()),
            description: None,
            system_information_url: None,
        },
        Some(&admin_id),
    )
    .expect("Failed to create seed client");
    tracing::info!("Client: {} (id: {})", client.name, client.id);

    let product = queries::create_product(
        &conn,
        &CreateProduct {
            name: "Dev Suite".to_string(),
            description: Some("Seed product".to_string()),
            product_type: Some("saas".to_string()),
        },
    )
    .expect("Failed to create seed product");
    tracing::info!("Product: {} (id: {})", product.name, product.id);

    let link = queries::create_client_product(
        &conn,
        &client.id,
        &CreateClientProduct {
            product_id: product.id.clone(),
            license_quantity: Some(10),
            acquired_at: None,
            notes: None,
        },
    )
    .expect("Failed to create seed link");

    let now = chrono::Utc::now().timestamp();
    let thresholds = Thresholds::default();
    for (label, days_left) in [("critical", 10), ("warning", 25), ("ok", 60), ("far", 200)] {
        let vigencia = queries::create_vigencia(
            &conn,
            &CreateVigencia {
                client_product_id: link.id.clone(),
                starts_at: now - 30 * DAY,
                expires_at: now + days_left * DAY,
                period: Some("annual".to_string()),
                threshold_green: None,
                threshold_yellow: None,
                threshold_red: None,
                status: None,
                notifications_enabled: None,
                notes: Some(format!("seed: {}", label)),
            },
            thresholds,
            &admin_id,
        )
        .expect("Failed to create seed vigencia");
        tracing::info!("Vigencia ({}): {}", label, vigencia.id);
    }

    tracing::info!("============================================");
    tracing::info!("DEV DATA SEEDED SUCCESSFULLY");
    tracing::info!("============================================");
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "vigencias=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env();

    if config.dev_mode {
        tracing::info!("Running in DEVELOPMENT mode");
    }

    let db_pool = create_pool(&config.database_path).expect("Failed to create database pool");
    {
        let conn = db_pool.get().expect("Failed to get connection");
        init_db(&conn).expect("Failed to initialize database");
    }

    let state = AppState {
        db: db_pool,
        session_ttl_secs: config.session_ttl_secs,
    };

    // Drop stale sessions on startup
    {
        let conn = state.db.get().expect("Failed to get connection");
        match queries::purge_expired_sessions(&conn, chrono::Utc::now().timestamp()) {
            Ok(count) if count > 0 => {
                tracing::info!("Purged {} expired sessions", count);
            }
            Ok(_) => {}
            Err(e) => {
                tracing::warn!("Failed to purge expired sessions: {}", e);
            }
        }
    }

    if cli.seed {
        if !config.dev_mode {
            tracing::warn!("--seed flag ignored: not in dev mode (set VIGENCIAS_ENV=dev)");
        } else {
            seed_dev_data(&state);
        }
    }

    if let (Some(email), Some(password)) = (
        config.bootstrap_admin_email.as_ref(),
        config.bootstrap_admin_password.as_ref(),
    ) {
        bootstrap_admin(&state, email, password);
    }

    let app: Router = handlers::router(state.clone())
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let addr = config.addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("Failed to bind to address");

    let cleanup_on_exit = cli.ephemeral && config.dev_mode;
    let db_path = config.database_path.clone();

    if cleanup_on_exit {
        tracing::info!("EPHEMERAL MODE: database will be deleted on exit");
    }

    tracing::info!("Vigencias server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Failed to start server");

    if cleanup_on_exit {
        tracing::info!("Cleaning up ephemeral database...");
        if let Err(e) = std::fs::remove_file(&db_path) {
            tracing::warn!("Failed to remove {}: {}", db_path, e);
        } else {
            tracing::info!("Removed {}", db_path);
        }
        let _ = std::fs::remove_file(format!("{}-wal", db_path));
        let _ = std::fs::remove_file(format!("{}-shm", db_path));
        tracing::info!("Ephemeral cleanup complete");
    }
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install Ctrl+C handler");
    tracing::info!("Shutdown signal received, stopping server...");
}
