//! Reusable EVPulse server runtime.
//!
//! [`ServerHandle`] owns the whole lifecycle: database connection,
//! migrations, seeding, the REST API, metrics and graceful shutdown.

use std::net::SocketAddr;
use std::sync::{Arc, OnceLock};
use std::time::Instant;

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use sea_orm::DatabaseConnection;
use sea_orm_migration::MigratorTrait;
use tracing::{error, info, warn};

use crate::application::{repair_charging, seed_default_users, RepairReport};
use crate::config::AppConfig;
use crate::domain::RepositoryProvider;
use crate::infrastructure::database::migrator::Migrator;
use crate::infrastructure::database::mask_url;
use crate::infrastructure::{init_database, SeaOrmRepositoryProvider};
use crate::interfaces::http::modules::health::HealthState;
use crate::interfaces::http::modules::metrics::MetricsState;
use crate::interfaces::http::{create_api_router, AppState};
use crate::shared::errors::AppError;
use crate::shared::shutdown::{listen_for_shutdown_signals, ShutdownSignal};

/// Options for starting the server.
pub struct ServerOptions {
    pub config: AppConfig,
    /// Run database migrations on startup (default: true).
    pub auto_migrate: bool,
    /// Seed the default accounts into an empty database (default: from config).
    pub seed: bool,
}

impl Default for ServerOptions {
    fn default() -> Self {
        let config = AppConfig::default();
        Self {
            seed: config.seed.enabled,
            config,
            auto_migrate: true,
        }
    }
}

impl From<AppConfig> for ServerOptions {
    fn from(config: AppConfig) -> Self {
        Self {
            seed: config.seed.enabled,
            config,
            auto_migrate: true,
        }
    }
}

/// The global recorder can only be installed once per process; later
/// starts reuse it.
fn prometheus_handle() -> Option<PrometheusHandle> {
    static HANDLE: OnceLock<Option<PrometheusHandle>> = OnceLock::new();
    HANDLE
        .get_or_init(|| match PrometheusBuilder::new().install_recorder() {
            Ok(handle) => {
                info!("Prometheus metrics recorder installed");
                Some(handle)
            }
            Err(e) => {
                warn!(error = %e, "Metrics disabled: could not install Prometheus recorder");
                None
            }
        })
        .clone()
}

async fn connect(config: &AppConfig, migrate: bool) -> Result<DatabaseConnection, AppError> {
    let db = init_database(&config.database_config()).await?;
    if migrate {
        info!("Running database migrations");
        Migrator::up(&db, None).await?;
        info!("Migrations completed");
    }
    Ok(db)
}

/// Handle to a running server.
pub struct ServerHandle {
    pub repos: Arc<dyn RepositoryProvider>,
    pub config: AppConfig,
    /// Address the API is bound to; differs from the config when port 0 was requested.
    pub local_addr: SocketAddr,

    db: DatabaseConnection,
    shutdown: ShutdownSignal,
    api_task: tokio::task::JoinHandle<()>,
}

impl ServerHandle {
    pub async fn start(opts: ServerOptions) -> Result<Self, AppError> {
        let config = opts.config;
        info!("Starting EVPulse service");

        let config_issues = config.validate();
        for issue in &config_issues {
            warn!(issue = %issue, "Configuration problem");
        }

        let metrics = prometheus_handle().map(|handle| MetricsState { handle });

        let db_config = config.database_config();
        info!(url = %mask_url(&db_config.url), "Database configured");
        let db = connect(&config, opts.auto_migrate).await?;

        let repos: Arc<dyn RepositoryProvider> =
            Arc::new(SeaOrmRepositoryProvider::new(db.clone()));

        if opts.seed {
            match seed_default_users(repos.as_ref()).await {
                Ok(0) => {}
                Ok(created) => info!(created, "Default accounts seeded"),
                Err(e) => error!(error = %e, "Seeding default accounts failed"),
            }
        }

        let health = HealthState {
            db: db.clone(),
            db_config,
            started_at: Arc::new(Instant::now()),
            config_issues: Arc::new(config_issues),
        };
        let ai_config = config.ai_config();
        if ai_config.api_key.is_none() {
            warn!("AI API key not configured; /api/ai/optimize will fail");
        }
        let state = AppState::new(repos.clone(), config.jwt_config(), ai_config, health);
        let router = create_api_router(state, &config.server.cors_origins, metrics);

        let listener = tokio::net::TcpListener::bind(config.server.address()).await?;
        let local_addr = listener.local_addr()?;
        info!("REST API listening on http://{}", local_addr);
        info!("Swagger UI available at http://{}/docs/", local_addr);

        let shutdown = ShutdownSignal::new();
        let api_shutdown = shutdown.clone();
        let api_task = tokio::spawn(async move {
            let server = axum::serve(listener, router.into_make_service())
                .with_graceful_shutdown(async move {
                    api_shutdown.wait().await;
                    info!("REST API received shutdown signal");
                });
            if let Err(e) = server.await {
                error!(error = %e, "REST API server error");
            }
        });

        Ok(Self {
            repos,
            config,
            local_addr,
            db,
            shutdown,
            api_task,
        })
    }

    pub fn shutdown_signal(&self) -> ShutdownSignal {
        self.shutdown.clone()
    }

    /// Trigger shutdown on SIGTERM/SIGINT.
    pub fn install_signal_handler(&self) {
        tokio::spawn(listen_for_shutdown_signals(self.shutdown.clone()));
    }

    pub fn trigger_shutdown(&self) {
        self.shutdown.trigger();
    }

    pub fn is_running(&self) -> bool {
        !self.api_task.is_finished()
    }

    /// Wait for the API to stop, then close the database.
    pub async fn wait(self) {
        if let Err(e) = self.api_task.await {
            error!(error = %e, "REST API task panicked");
        }
        match self.db.close().await {
            Ok(()) => info!("Database connection closed"),
            Err(e) => warn!(error = %e, "Error closing database connection"),
        }
        info!("EVPulse shutdown complete");
    }

    pub async fn shutdown(self) {
        self.trigger_shutdown();
        self.wait().await;
    }
}

/// One-off billing repair against the configured database.
pub async fn run_repair(config: &AppConfig, dry_run: bool) -> Result<RepairReport, AppError> {
    let db = connect(config, true).await?;
    let repos = SeaOrmRepositoryProvider::new(db.clone());
    let report = repair_charging(&repos, dry_run).await;
    if let Err(e) = db.close().await {
        warn!(error = %e, "Error closing database connection");
    }
    Ok(report?)
}

/// Initialize tracing from the config. `RUST_LOG` wins over the configured level.
pub fn init_tracing(config: &AppConfig) {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.logging.level));

    let result = match config.logging.format.to_lowercase().as_str() {
        "json" => tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json())
            .try_init(),
        _ => tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer())
            .try_init(),
    };
    if result.is_err() {
        warn!("Tracing subscriber already installed");
    }
}
