//! Façade composing every automation use case over one default index,
//! so callers needing the common case don't have to wire five structs.

use std::sync::Arc;

use codeindex_domain::ports::RestClient;
use codeindex_providers::search::SearchOperations;

use crate::automation::data::DataAutomation;
use crate::automation::health::HealthMonitor;
use crate::automation::indexer::IndexerAutomation;
use crate::automation::reindex::ReindexAutomation;

/// Bundles `DataAutomation`, `IndexerAutomation`, `ReindexAutomation`,
/// and `HealthMonitor` over one default index name.
pub struct UnifiedAutomation<C: RestClient> {
    /// The index every operation without an explicit index name targets.
    pub default_index: String,
    /// Bulk upload, cleanup, cross-index reindex, and export.
    pub data: DataAutomation<C>,
    /// Datasource/skillset/indexer pipeline management.
    pub indexer: IndexerAutomation<C>,
    /// Drop-rebuild, clear, repository reindex, backup/restore.
    pub reindex: ReindexAutomation<C>,
    /// Service/index/indexer health rollups.
    pub health: HealthMonitor<C>,
}

impl<C: RestClient> UnifiedAutomation<C> {
    /// Build a `UnifiedAutomation` targeting `default_index` by default,
    /// validating vector fields against `expected_vector_dimensions`.
    pub fn new(search_ops: Arc<SearchOperations<C>>, default_index: impl Into<String>, expected_vector_dimensions: usize) -> Self {
        Self {
            default_index: default_index.into(),
            data: DataAutomation::new(Arc::clone(&search_ops)),
            indexer: IndexerAutomation::new(Arc::clone(&search_ops)),
            reindex: ReindexAutomation::new(Arc::clone(&search_ops), expected_vector_dimensions),
            health: HealthMonitor::new(search_ops),
        }
    }
}
