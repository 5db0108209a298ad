use std::sync::Arc;

use anyhow::Result;

use msme_core::gazetteer::Gazetteer;
use msme_core::narrative::NarrativeProvider;
use msme_core::store::Store;

use crate::config::Config;
use crate::narrative::create_provider;
use crate::sqlite_store::SqliteStore;

/// Shared, read-only services for every request.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub store: Arc<dyn Store>,
    pub narrator: Arc<dyn NarrativeProvider>,
    pub gazetteer: Arc<Gazetteer>,
}

impl AppState {
    /// Open the SQLite store and narrative provider named by `config`.
    pub async fn new(config: Config) -> Result<Self> {
        let store = SqliteStore::open(&config).await?;
        let narrator = create_provider(&config.narrative)?;
        Ok(Self::with_parts(config, Arc::new(store), narrator))
    }

    /// Assemble state from explicit parts.
    pub fn with_parts(
        config: Config,
        store: Arc<dyn Store>,
        narrator: Arc<dyn NarrativeProvider>,
    ) -> Self {
        let gazetteer = Gazetteer::builtin().with_extra(
            &config.gazetteer.extra_locations,
            &config.gazetteer.extra_sectors,
        );
        Self {
            config: Arc::new(config),
            store,
            narrator,
            gazetteer: Arc::new(gazetteer),
        }
    }
}
