//! Server runtime.
//!
//! [`ServerHandle`] owns the whole lifecycle: metrics recorder, in-memory
//! store, services, admin bootstrap, the HTTP listener and graceful
//! shutdown. The binaries only parse arguments and call into it.

use std::net::SocketAddr;
use std::sync::{Arc, OnceLock};

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};
use tracing::{error, info};

use crate::application::AccountPolicy;
use crate::config::AppConfig;
use crate::domain::RepositoryProvider;
use crate::infrastructure::crypto::JwtConfig;
use crate::infrastructure::InMemoryRepositoryProvider;
use crate::interfaces::http::modules::metrics::describe_metrics;
use crate::interfaces::http::router::AppState;
use crate::interfaces::http::create_api_router;
use crate::shared::{ShutdownCoordinator, ShutdownSignal, SystemClock};

pub struct ServerOptions {
    pub config: AppConfig,
    /// Create the configured admin when no admin exists (default: true).
    pub create_default_admin: bool,
}

impl Default for ServerOptions {
    fn default() -> Self {
        Self {
            config: AppConfig::default(),
            create_default_admin: true,
        }
    }
}

/// Handle to a running VoltEdge server.
///
/// ```rust,no_run
/// use voltedge::server::{ServerHandle, ServerOptions};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let handle = ServerHandle::start(ServerOptions::default()).await?;
///     handle.shutdown().await;
///     Ok(())
/// }
/// ```
pub struct ServerHandle {
    pub repos: Arc<dyn RepositoryProvider>,
    pub config: AppConfig,
    /// Address actually bound; differs from the config when port 0 was used.
    pub local_addr: SocketAddr,

    shutdown: ShutdownCoordinator,
    api_task: tokio::task::JoinHandle<()>,
}

/// The global recorder can be installed once per process, so restarts
/// within one process reuse the first handle.
fn prometheus_handle() -> Result<PrometheusHandle, BuildError> {
    static HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

    if let Some(handle) = HANDLE.get() {
        return Ok(handle.clone());
    }
    let handle = PrometheusBuilder::new().install_recorder()?;
    describe_metrics();
    info!("Prometheus metrics recorder installed");
    Ok(HANDLE.get_or_init(|| handle).clone())
}

impl ServerHandle {
    pub async fn start(opts: ServerOptions) -> Result<Self, Box<dyn std::error::Error>> {
        let config = opts.config;
        config.validate()?;

        info!(version = env!("CARGO_PKG_VERSION"), "Starting VoltEdge");

        let prometheus = prometheus_handle()?;

        let jwt_config = JwtConfig::from(&config.security);
        info!(
            expiration_minutes = jwt_config.expiration_minutes,
            issuer = %jwt_config.issuer,
            "JWT configured"
        );

        let repos = InMemoryRepositoryProvider::shared();
        let policy = AccountPolicy::new(&config.accounts, config.security.bcrypt_cost);
        let state = AppState::new(repos.clone(), jwt_config, policy, Arc::new(SystemClock));

        if opts.create_default_admin && config.admin.enabled {
            if let Some(admin) = state.users.bootstrap_admin(&config.admin).await? {
                info!(user_id = %admin.id, email = %admin.email, "Default admin ready");
            }
        }

        let shutdown = ShutdownCoordinator::new(config.server.shutdown_timeout);
        let router = create_api_router(state, Some(prometheus));

        let listener = tokio::net::TcpListener::bind(config.listen_address()).await?;
        let local_addr = listener.local_addr()?;
        info!("REST API listening on http://{}", local_addr);
        info!("Swagger UI available at http://{}/docs/", local_addr);

        let api_shutdown = shutdown.signal();
        let api_server = axum::serve(
            listener,
            router.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(async move {
            api_shutdown.wait().await;
            info!("REST API received shutdown signal");
        });

        let api_task = tokio::spawn(async move {
            if let Err(e) = api_server.await {
                error!(error = %e, "REST API server error");
            }
        });

        Ok(Self {
            repos,
            config,
            local_addr,
            shutdown,
            api_task,
        })
    }

    pub fn shutdown_signal(&self) -> ShutdownSignal {
        self.shutdown.signal()
    }

    /// Listen for SIGINT/SIGTERM and trigger shutdown on either.
    pub fn install_signal_handler(&self) {
        self.shutdown.start_signal_listener();
    }

    pub fn trigger_shutdown(&self) {
        self.shutdown.signal().trigger();
    }

    /// Wait for in-flight requests to finish, bounded by
    /// `server.shutdown_timeout`.
    pub async fn wait(self) {
        let Self {
            shutdown, api_task, ..
        } = self;

        let finished = shutdown
            .drain(async move {
                if let Err(e) = api_task.await {
                    error!(error = %e, "REST API task panicked");
                }
            })
            .await;

        if finished {
            info!("VoltEdge shutdown complete");
        }
    }

    pub async fn shutdown(self) {
        info!("Shutting down VoltEdge");
        self.trigger_shutdown();
        self.wait().await;
    }

    pub fn is_running(&self) -> bool {
        !self.api_task.is_finished()
    }
}

/// Install the global tracing subscriber. `RUST_LOG` takes precedence over
/// `logging.level`; `logging.format = "json"` switches to JSON lines.
pub fn init_tracing(config: &AppConfig) {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.logging.level));

    match config.logging.format.to_lowercase().as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
        "pretty" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().pretty())
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer())
                .init();
        }
    }
}
