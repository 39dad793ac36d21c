//! Where a setup gets its connection from.

use crate::connection::Connection;
use crate::error::{SetupError, SetupResult};
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use tokio_postgres::NoTls;

/// Provides the connection a [`DbSetup`](crate::DbSetup) runs on.
///
/// The connection is dropped when the launch is over, whatever its outcome.
pub trait Destination: Send + Sync {
    type Connection: Connection;

    fn connection(&self) -> impl Future<Output = SetupResult<Self::Connection>> + Send;
}

/// An already-open client, shared with the caller.
///
/// Every launch runs on the same client. Two destinations are equal when they
/// wrap the same client.
#[derive(Clone)]
pub struct ClientDestination {
    client: Arc<tokio_postgres::Client>,
}

impl ClientDestination {
    pub fn new(client: Arc<tokio_postgres::Client>) -> Self {
        Self { client }
    }
}

impl From<tokio_postgres::Client> for ClientDestination {
    fn from(client: tokio_postgres::Client) -> Self {
        Self::new(Arc::new(client))
    }
}

impl Destination for ClientDestination {
    type Connection = Arc<tokio_postgres::Client>;

    async fn connection(&self) -> SetupResult<Arc<tokio_postgres::Client>> {
        Ok(Arc::clone(&self.client))
    }
}

impl PartialEq for ClientDestination {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.client, &other.client)
    }
}

impl Eq for ClientDestination {}

impl fmt::Debug for ClientDestination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientDestination")
            .field("client", &Arc::as_ptr(&self.client))
            .finish()
    }
}

/// Opens a new connection from a URL for every launch, without TLS.
///
/// ```ignore
/// let destination = UrlDestination::new("postgres://localhost/app_test")
///     .user("app")
///     .password("secret");
/// ```
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct UrlDestination {
    url: String,
    user: Option<String>,
    password: Option<String>,
}

impl UrlDestination {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            user: None,
            password: None,
        }
    }

    /// Destination read from the `DATABASE_URL` environment variable.
    pub fn from_env() -> SetupResult<Self> {
        std::env::var("DATABASE_URL")
            .map(Self::new)
            .map_err(|e| SetupError::Connection(format!("DATABASE_URL: {e}")))
    }

    /// Override the user of the URL.
    pub fn user(mut self, user: impl Into<String>) -> Self {
        self.user = Some(user.into());
        self
    }

    /// Override the password of the URL.
    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    fn config(&self) -> SetupResult<tokio_postgres::Config> {
        let mut config: tokio_postgres::Config = self
            .url
            .parse()
            .map_err(|e: tokio_postgres::Error| SetupError::Connection(e.to_string()))?;
        if let Some(user) = &self.user {
            config.user(user);
        }
        if let Some(password) = &self.password {
            config.password(password);
        }
        Ok(config)
    }
}

impl Destination for UrlDestination {
    type Connection = tokio_postgres::Client;

    async fn connection(&self) -> SetupResult<tokio_postgres::Client> {
        let config = self.config()?;
        let (client, connection) = config
            .connect(NoTls)
            .await
            .map_err(|e| SetupError::Connection(e.to_string()))?;
        tokio::spawn(async move {
            if let Err(err) = connection.await {
                tracing::warn!(target: "pgfixture.setup", error = %err, "connection closed with error");
            }
        });
        Ok(client)
    }
}

impl fmt::Debug for UrlDestination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UrlDestination")
            .field("url", &self.url)
            .field("user", &self.user)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Takes a pooled connection for every launch and returns it to the pool afterwards.
///
/// Two destinations are equal when they share the same pool handle, i.e. one
/// was cloned from the other.
#[cfg(feature = "pool")]
#[derive(Clone)]
pub struct PoolDestination {
    pool: Arc<deadpool_postgres::Pool>,
}

#[cfg(feature = "pool")]
impl PoolDestination {
    pub fn new(pool: deadpool_postgres::Pool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }

    /// Pool of at most `max_size` `NoTls` connections to `url`. Nothing is
    /// connected until the first launch.
    pub fn from_url(url: &str, max_size: usize) -> SetupResult<Self> {
        use deadpool_postgres::{Manager, ManagerConfig, Pool, RecyclingMethod};

        let config: tokio_postgres::Config = url
            .parse()
            .map_err(|e: tokio_postgres::Error| SetupError::Connection(e.to_string()))?;
        let manager = Manager::from_config(
            config,
            NoTls,
            ManagerConfig {
                recycling_method: RecyclingMethod::Fast,
            },
        );
        let pool = Pool::builder(manager)
            .max_size(max_size)
            .build()
            .map_err(|e| SetupError::Pool(e.to_string()))?;
        Ok(Self::new(pool))
    }

    pub fn pool(&self) -> &deadpool_postgres::Pool {
        &self.pool
    }
}

#[cfg(feature = "pool")]
impl Destination for PoolDestination {
    type Connection = deadpool_postgres::Client;

    async fn connection(&self) -> SetupResult<deadpool_postgres::Client> {
        Ok(self.pool.get().await?)
    }
}

#[cfg(feature = "pool")]
impl PartialEq for PoolDestination {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.pool, &other.pool)
    }
}

#[cfg(feature = "pool")]
impl Eq for PoolDestination {}

#[cfg(feature = "pool")]
impl fmt::Debug for PoolDestination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PoolDestination")
            .field("status", &self.pool.status())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_destination_applies_credential_overrides() {
        let destination = UrlDestination::new("postgres://localhost:5433/fixtures")
            .user("tester")
            .password("secret");
        let config = destination.config().unwrap();
        assert_eq!(config.get_user(), Some("tester"));
        assert_eq!(config.get_password(), Some(&b"secret"[..]));
        assert_eq!(config.get_dbname(), Some("fixtures"));
    }

    #[test]
    fn url_destination_rejects_malformed_url() {
        let err = UrlDestination::new("postgres://localhost:notaport/db")
            .config()
            .unwrap_err();
        assert!(matches!(err, SetupError::Connection(_)));
    }

    #[test]
    fn url_destination_debug_hides_password() {
        let destination = UrlDestination::new("postgres://localhost/db").password("hunter2");
        let rendered = format!("{destination:?}");
        assert!(!rendered.contains("hunter2"));
        assert!(rendered.contains("<redacted>"));
    }

    #[test]
    fn url_destinations_compare_by_url_and_credentials() {
        let a = UrlDestination::new("postgres://localhost/db").user("u");
        assert_eq!(a, UrlDestination::new("postgres://localhost/db").user("u"));
        assert_ne!(a, UrlDestination::new("postgres://localhost/db").user("v"));
        assert_ne!(a, UrlDestination::new("postgres://localhost/db"));
    }

    #[cfg(feature = "pool")]
    #[test]
    fn pool_destination_rejects_malformed_url() {
        let err = PoolDestination::from_url("postgres://localhost:notaport/db", 2).unwrap_err();
        assert!(matches!(err, SetupError::Connection(_)));
    }

    #[cfg(feature = "pool")]
    #[test]
    fn pool_destinations_compare_by_pool_handle() {
        let a = PoolDestination::from_url("postgres://localhost/db", 2).unwrap();
        assert_eq!(a, a.clone());
        assert_ne!(a, PoolDestination::from_url("postgres://localhost/db", 2).unwrap());
    }
}
