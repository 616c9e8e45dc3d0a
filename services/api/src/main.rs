use anyhow::Result;
use std::{net::SocketAddr, sync::Arc, time::Duration};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use civic_api::{
    issues::IssueService,
    middleware::{CookieSettings, cors_layer},
    repositories::{InMemoryIssueRepository, IssueRepository, IssueStore, migrate_when_ready},
    routes,
    state::AppState,
    upload::UploadStore,
};
use civic_auth::{
    AuthService, InMemorySessionStore, RedisSessionStore, SessionManager, SessionStore,
    VerificationCodes,
    repositories::{InMemoryUserRepository, UserRepository, UserStore},
};
use civic_common::{
    cache::RedisPool,
    database::init_pool,
    settings::AppSettings,
};

const MIGRATION_RETRY_INTERVAL: Duration = Duration::from_secs(5);

/// User and issue stores: PostgreSQL when configured, in-memory otherwise
async fn build_stores(settings: &AppSettings) -> Result<(Arc<dyn UserStore>, Arc<dyn IssueStore>)> {
    let Some(db_config) = settings.database_config() else {
        warn!("DATABASE_URL is not set; using in-memory stores, data will not persist");
        let users: Arc<dyn UserStore> = Arc::new(InMemoryUserRepository::new());
        let issues: Arc<dyn IssueStore> = Arc::new(InMemoryIssueRepository::new());
        return Ok((users, issues));
    };

    let pool = init_pool(&db_config)?;

    // Serve immediately; requests fail until the database comes up and the
    // schema is in place.
    tokio::spawn(migrate_when_ready(pool.clone(), MIGRATION_RETRY_INTERVAL));

    let users: Arc<dyn UserStore> = Arc::new(UserRepository::new(pool.clone()));
    let issues: Arc<dyn IssueStore> = Arc::new(IssueRepository::new(pool));
    Ok((users, issues))
}

async fn build_session_store(settings: &AppSettings) -> Result<Arc<dyn SessionStore>> {
    match settings.redis_config() {
        Some(redis_config) => {
            let redis_pool = RedisPool::new(&redis_config).await?;
            info!("Using Redis session store");
            Ok(Arc::new(RedisSessionStore::new(redis_pool)))
        }
        None => {
            warn!("REDIS_URL is not set; sessions are kept in memory");
            Ok(Arc::new(InMemorySessionStore::new()))
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    info!("Starting Civic Connect API");

    let settings = AppSettings::from_env()?;

    let (users, issues) = build_stores(&settings).await?;
    let session_ttl = Duration::from_secs(settings.session_ttl_seconds);
    let sessions = SessionManager::new(
        build_session_store(&settings).await?,
        &settings.session_secret,
        session_ttl,
    );
    let codes = VerificationCodes {
        admin: settings.admin_verification_code.clone(),
        authority: settings.authority_verification_code.clone(),
    };

    let app_state = AppState {
        auth: AuthService::new(users, sessions, codes),
        issues: IssueService::new(issues),
        uploads: UploadStore::new(&settings.upload_dir),
        cookies: CookieSettings {
            secure: settings.cookie_secure,
            max_age: session_ttl,
        },
    };

    let app = routes::create_router(app_state)
        .layer(cors_layer(&settings.frontend_url)?)
        .layer(TraceLayer::new_for_http());

    let addr = SocketAddr::from(([0, 0, 0, 0], settings.port));
    let listener = TcpListener::bind(addr).await?;
    info!("Civic Connect API listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
