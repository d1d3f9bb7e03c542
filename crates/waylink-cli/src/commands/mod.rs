pub mod resolve;
pub mod routes;
pub mod serialize;

use anyhow::{Context, Result};
use std::path::Path;
use tracing::{debug, info};
use waylink::{LinkingConfig, NavigationStore};

/// Builds a store from `config` and navigates through `links`
///
/// A link that cannot be applied aborts with the link named in the error.
pub fn navigate_all(config: &Path, links: &[String]) -> Result<NavigationStore> {
    let config = LinkingConfig::load(config)?;
    let mut store = config.build_store()?;
    debug!(routes = store.table().patterns().len(), "route table built");

    for link in links {
        let state = store
            .navigate(link)
            .with_context(|| format!("Failed to apply link: {}", link))?;
        info!(link = %link, revision = state.revision, "link resolved");
    }

    Ok(store)
}
