use scrap_config::ScrapConfig;
use scrap_lifecycle::{LifecycleError, Scrapbook};

/// Shared application resources initialized once at startup.
pub struct AppContext {
    pub scrapbook: Scrapbook,
    pub config: ScrapConfig,
}

impl AppContext {
    /// Open the metadata store and, when configured, the object store.
    pub async fn init(config: ScrapConfig) -> Result<Self, LifecycleError> {
        let scrapbook = Scrapbook::from_config(&config).await?;
        if scrapbook.is_degraded() {
            tracing::info!("object storage unavailable; asset upload and serving are disabled");
        }
        Ok(Self { scrapbook, config })
    }
}
