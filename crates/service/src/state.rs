use std::sync::Arc;

use axum::extract::FromRef;
use url::Url;

use common::prelude::Registry;

use super::config::Config;
use super::database::{Database, DatabaseSetupError};

/// Main service state, shared by every request handler
#[derive(Clone)]
pub struct State {
    database: Database,
    registry: Arc<Registry>,
    gateway_url: Option<Url>,
}

impl State {
    pub async fn from_config(config: &Config) -> Result<Self, StateSetupError> {
        // 1. Setup database
        let sqlite_database_url = match config.sqlite_path {
            Some(ref path) => {
                // the file itself may be created, but its directory must exist
                if let Some(parent) = path.parent() {
                    if !parent.as_os_str().is_empty() && !parent.exists() {
                        return Err(StateSetupError::DatabasePathDoesNotExist);
                    }
                }
                Url::parse(&format!("sqlite://{}", path.display()))
                    .map_err(|_| StateSetupError::InvalidDatabaseUrl)
            }
            // otherwise just set up an in-memory database
            None => Url::parse("sqlite::memory:").map_err(|_| StateSetupError::InvalidDatabaseUrl),
        }?;
        tracing::info!("Database URL: {:?}", sqlite_database_url);
        let database = Database::connect(&sqlite_database_url).await?;

        // 2. Setup component registry
        let registry = Arc::new(Registry::networked());
        tracing::debug!(?registry, "component registry ready");

        Ok(Self::new(database, registry, config.gateway_url.clone()))
    }

    pub fn new(database: Database, registry: Arc<Registry>, gateway_url: Option<Url>) -> Self {
        Self {
            database,
            registry,
            gateway_url,
        }
    }

    pub fn database(&self) -> &Database {
        &self.database
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn gateway_url(&self) -> Option<&Url> {
        self.gateway_url.as_ref()
    }

    /// Full download link for a shadow URL, if a gateway URL is configured
    pub fn gateway_link(&self, shadow_url: &str) -> Option<String> {
        self.gateway_url
            .as_ref()
            .map(|base| format!("{}/{}", base.as_str().trim_end_matches('/'), shadow_url))
    }
}

impl AsRef<Database> for State {
    fn as_ref(&self) -> &Database {
        &self.database
    }
}

impl FromRef<State> for Database {
    fn from_ref(state: &State) -> Self {
        state.database.clone()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StateSetupError {
    #[error("Database path does not exist")]
    DatabasePathDoesNotExist,
    #[error("Database setup error: {0}")]
    DatabaseSetupError(#[from] DatabaseSetupError),
    #[error("Invalid database URL")]
    InvalidDatabaseUrl,
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::prelude::Role;

    #[tokio::test]
    async fn test_from_default_config() {
        let state = State::from_config(&Config::default()).await.unwrap();
        state.database().ping().await.unwrap();
        assert!(state.gateway_url().is_none());
        assert!(state.gateway_link("abc").is_none());
    }

    #[tokio::test]
    async fn test_served_registry_has_no_memory_backend() {
        let state = State::from_config(&Config::default()).await.unwrap();
        assert!(!state.registry().names(Role::Sink).contains(&"mem"));
        assert!(!state.registry().names(Role::Source).contains(&"mem"));
        assert!(state.registry().names(Role::Sink).contains(&"pastebin"));
    }

    #[tokio::test]
    async fn test_gateway_link() {
        let database = Database::in_memory().await.unwrap();
        let gateway = Url::parse("https://shadow.example.com/").unwrap();
        let state = State::new(database, Arc::new(Registry::builtin()), Some(gateway));
        assert_eq!(
            state.gateway_link("abc.def").unwrap(),
            "https://shadow.example.com/abc.def"
        );
    }

    #[tokio::test]
    async fn test_missing_database_directory() {
        let config = Config {
            sqlite_path: Some("/definitely/not/here/db.sqlite".into()),
            ..Config::default()
        };
        assert!(matches!(
            State::from_config(&config).await,
            Err(StateSetupError::DatabasePathDoesNotExist)
        ));
    }

    #[tokio::test]
    async fn test_on_disk_database() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config {
            sqlite_path: Some(dir.path().join("shadownet.sqlite")),
            ..Config::default()
        };
        let state = State::from_config(&config).await.unwrap();
        state.database().ping().await.unwrap();
        assert!(dir.path().join("shadownet.sqlite").exists());
    }
}
