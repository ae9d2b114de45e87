use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Once, OnceLock};
use std::time::Duration;

use arc_swap::ArcSwap;
use sqlx::AnyPool;
use sqlx::any::{AnyPoolOptions, install_default_drivers};
use tracing::{error, info, warn};
use url::Url;

use crate::config::Config;
use crate::error::RolodexError;

/// Registers the sqlx `Any` drivers globally (once per process).
/// Must run before any pool is constructed.
static DRIVERS: Once = Once::new();

fn ensure_drivers_registered() {
    DRIVERS.call_once(install_default_drivers);
}

/// How the engine ended up being constructed. `LocalFallback` means the
/// managed path was configured but failed, and the local engine took over.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineChoice {
    Managed,
    Local,
    LocalFallback,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    Sqlite,
    MySql,
}

/// Storage backend handle: a bounded connection pool plus the URL it was
/// built from and the typed construction outcome.
pub struct Engine {
    pub pool: AnyPool,
    url: String,
    choice: EngineChoice,
}

impl Engine {
    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn choice(&self) -> EngineChoice {
        self.choice
    }

    pub fn backend(&self) -> Backend {
        if self.url.starts_with("sqlite") {
            Backend::Sqlite
        } else {
            Backend::MySql
        }
    }
}

/// Which network path the managed instance is dialed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum IpType {
    Private,
    Public,
}

/// Managed-database connection details resolved from configuration.
/// Physical connections reach the named instance through the Cloud SQL
/// Auth Proxy unix socket at `/cloudsql/<instance>`; the proxy owns the
/// actual private/public dial, the flag here is recorded and logged.
#[derive(Debug)]
struct Connector {
    instance: String,
    user: String,
    pass: String,
    db_name: String,
    ip_type: IpType,
}

impl Connector {
    fn from_config(cfg: &Config) -> Option<Self> {
        let managed = cfg.managed()?;
        let ip_type = if cfg.private_ip() {
            IpType::Private
        } else {
            IpType::Public
        };
        Some(Self {
            instance: managed.instance_connection_name.to_string(),
            user: managed.db_user.to_string(),
            pass: managed.db_pass.to_string(),
            db_name: managed.db_name.to_string(),
            ip_type,
        })
    }

    /// Build the pool URL. Credentials and the socket path go through `Url`
    /// so reserved characters are escaped correctly.
    fn engine_url(&self) -> Result<String, RolodexError> {
        let mut url = Url::parse("mysql://localhost")?;
        if url.set_username(&self.user).is_err() || url.set_password(Some(&self.pass)).is_err() {
            return Err(RolodexError::EngineUrl(
                "credentials are not representable in a connection URL".to_string(),
            ));
        }
        url.set_path(&self.db_name);
        url.query_pairs_mut()
            .append_pair("socket", &format!("/cloudsql/{}", self.instance));
        Ok(url.into())
    }
}

/// Bounded pool: size 5 with an overflow margin, 30 minute recycle age,
/// and checkout/idle timeouts. Shared by both backends.
fn pool_options(cfg: &Config) -> AnyPoolOptions {
    AnyPoolOptions::new()
        .max_connections(7)
        .min_connections(0)
        .acquire_timeout(Duration::from_secs(cfg.acquire_timeout_secs))
        .idle_timeout(Duration::from_secs(600))
        .max_lifetime(Duration::from_secs(1800))
}

fn managed_engine(cfg: &Config, connector: &Connector) -> Result<Engine, RolodexError> {
    let url = connector.engine_url()?;
    let pool = pool_options(cfg).connect_lazy(&url)?;
    Ok(Engine {
        pool,
        url,
        choice: EngineChoice::Managed,
    })
}

fn local_engine(cfg: &Config, choice: EngineChoice) -> Result<Engine, RolodexError> {
    let url = cfg.database_url.clone();
    let pool = pool_options(cfg).connect_lazy(&url)?;
    info!(url = %url, "using local-file database engine");
    Ok(Engine { pool, url, choice })
}

/// Construct a storage engine per configuration.
///
/// The managed path never propagates its own failure; it logs and falls back
/// to the local engine. Pools are created lazily, so connectivity problems
/// surface at session-acquire time, not here. The only `Err` is a local URL
/// that cannot be parsed at all.
pub fn get_engine(cfg: &Config) -> Result<Engine, RolodexError> {
    Db::build_engine(cfg, &OnceLock::new())
}

/// Process-wide engine container.
///
/// The engine reference is shared read-only by all requests; the session
/// retry path replaces it through `rebuild`. The swap is unsynchronized by
/// design: readers holding the old engine complete or fail independently.
/// The managed connector is constructed lazily on first use and survives
/// engine rebuilds; only `close` tears it down.
pub struct Db {
    cfg: Config,
    engine: ArcSwap<Engine>,
    connector: OnceLock<Option<Connector>>,
    rebuilds: AtomicU64,
    closed: AtomicBool,
}

impl Db {
    pub fn connect(cfg: &Config) -> Result<Self, RolodexError> {
        let connector = OnceLock::new();
        let engine = Self::build_engine(cfg, &connector)?;
        Ok(Self {
            cfg: cfg.clone(),
            engine: ArcSwap::from_pointee(engine),
            connector,
            rebuilds: AtomicU64::new(0),
            closed: AtomicBool::new(false),
        })
    }

    fn build_engine(
        cfg: &Config,
        connector: &OnceLock<Option<Connector>>,
    ) -> Result<Engine, RolodexError> {
        ensure_drivers_registered();
        let connector = connector
            .get_or_init(|| Connector::from_config(cfg))
            .as_ref();
        if let Some(connector) = connector {
            match managed_engine(cfg, connector) {
                Ok(engine) => {
                    info!(
                        instance = %connector.instance,
                        ip_type = ?connector.ip_type,
                        "using managed database engine"
                    );
                    return Ok(engine);
                }
                Err(e) => {
                    warn!(error = %e, "managed engine construction failed, falling back to local storage");
                }
            }
            return local_engine(cfg, EngineChoice::LocalFallback);
        }
        local_engine(cfg, EngineChoice::Local)
    }

    pub fn engine(&self) -> Arc<Engine> {
        self.engine.load_full()
    }

    /// Number of dispose-and-rebuild cycles performed so far.
    pub fn rebuild_count(&self) -> u64 {
        self.rebuilds.load(Ordering::Relaxed)
    }

    /// Dispose the shared engine and reconstruct it from configuration,
    /// clearing a pool stuck on stale connections. Keeps the current engine
    /// if reconstruction fails fatally.
    pub(crate) fn rebuild(&self) {
        match Self::build_engine(&self.cfg, &self.connector) {
            Ok(fresh) => {
                let old = self.engine.swap(Arc::new(fresh));
                self.rebuilds.fetch_add(1, Ordering::Relaxed);
                warn!("database engine rebuilt");
                // Dispose the old pool off the request path; in-flight users
                // of it finish or fail on their own.
                tokio::spawn(async move {
                    old.pool.close().await;
                });
            }
            Err(e) => {
                error!(error = %e, "engine rebuild failed, keeping current engine");
            }
        }
    }

    /// Shutdown hook: close the pool and the managed connector exactly once.
    pub async fn close(&self) {
        if self.closed.swap(true, Ordering::SeqCst) {
            return;
        }
        self.engine.load().pool.close().await;
        if let Some(Some(connector)) = self.connector.get() {
            info!(instance = %connector.instance, "managed connector closed");
        }
        info!("database engine closed");
    }
}
