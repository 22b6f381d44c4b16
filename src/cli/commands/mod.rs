//! Command implementations.

pub mod index;
pub mod query;
pub mod status;
pub mod version;

use std::path::{Path, PathBuf};

use crate::config::{self, NoteChatConfig, env_var};
use crate::corpus::JoplinClient;
use crate::embeddings::ConfiguredProviders;
use crate::error::{Error, Result};
use crate::index::{IndexCache, IndexService};

/// The service as wired up for the command line.
pub type CliService = IndexService<JoplinClient, ConfiguredProviders>;

/// Resolved data directory plus the config file as it is right now.
pub struct Workspace {
    pub data_dir: PathBuf,
    pub config: NoteChatConfig,
}

impl Workspace {
    /// Resolve the data directory and read its config file.
    ///
    /// # Errors
    ///
    /// Returns an error if no data directory can be determined or the
    /// config file exists but cannot be parsed.
    pub fn open(data_dir: Option<&Path>) -> Result<Self> {
        let data_dir = config::resolve_data_dir(data_dir)?;
        let config = config::load_config(&config::config_path(&data_dir))?;
        Ok(Self { data_dir, config })
    }

    #[must_use]
    pub fn config_path(&self) -> PathBuf {
        config::config_path(&self.data_dir)
    }

    #[must_use]
    pub fn cache(&self) -> IndexCache {
        IndexCache::new(config::cache_path(&self.data_dir))
    }

    #[must_use]
    pub fn joplin(&self) -> JoplinClient {
        JoplinClient::from_settings(&self.config.joplin, env_var)
    }

    /// Build the index service against Joplin and the configured providers.
    #[must_use]
    pub fn service(&self) -> CliService {
        IndexService::new(
            self.joplin(),
            ConfiguredProviders::new(self.config_path()),
            self.cache(),
        )
        .with_page_size(self.config.page_size())
    }
}

/// Run an async command body to completion.
///
/// # Errors
///
/// Returns an error if the runtime cannot be created, or whatever `fut` returns.
pub fn block_on<F, T>(fut: F) -> Result<T>
where
    F: std::future::Future<Output = Result<T>>,
{
    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| Error::Other(format!("Failed to create async runtime: {e}")))?;
    rt.block_on(fut)
}
