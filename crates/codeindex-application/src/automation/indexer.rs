//! Builds and manages an end-to-end indexing pipeline: datasource,
//! optional skillset, indexer, schedule, and health/scheduling analysis.

use std::sync::Arc;
use std::time::Duration;

use codeindex_domain::error::{Error, Result};
use codeindex_domain::ports::RestClient;
use codeindex_providers::search::SearchOperations;
use serde_json::{json, Value};
use tokio_util::sync::CancellationToken;

/// Health classification produced by `IndexerAutomation::monitor_indexer_health`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HealthClass {
    /// `score >= 90`.
    Healthy,
    /// `70 <= score < 90`.
    Warning,
    /// `score < 70`.
    Critical,
}

/// Result of `IndexerAutomation::monitor_indexer_health`.
#[derive(Debug, Clone)]
pub struct IndexerHealthReport {
    /// Successful executions within the lookback window.
    pub successes: u64,
    /// Total executions within the lookback window.
    pub total: u64,
    /// `successes / total * 100`, `100.0` if there were no executions.
    pub score: f64,
    /// Classification derived from `score`.
    pub class: HealthClass,
}

/// Recommendation produced by `IndexerAutomation::optimize_indexer_schedule`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScheduleRecommendation {
    /// Average execution time exceeds half the schedule interval.
    IncreaseInterval,
    /// Average items per run is small and the current interval is sub-daily.
    DecreaseFrequency,
    /// Current interval exceeds the requested freshness target.
    IncreaseFrequency,
    /// No change recommended.
    Keep,
}

/// Pipeline resources created in one `create_blob_indexer_pipeline` call,
/// tracked so they can be rolled back on failure.
struct CreatedResources {
    datasource: Option<String>,
    skillset: Option<String>,
}

/// Manages datasource/skillset/indexer pipelines atop one managed-service
/// index.
pub struct IndexerAutomation<C: RestClient> {
    search_ops: Arc<SearchOperations<C>>,
}

impl<C: RestClient> IndexerAutomation<C> {
    /// Build an `IndexerAutomation` over `search_ops`.
    pub fn new(search_ops: Arc<SearchOperations<C>>) -> Self {
        Self { search_ops }
    }

    /// Create a datasource, optional skillset, and an indexer named
    /// `"{prefix}-indexer"` targeting `index`, scheduled every
    /// `schedule_hours` hours, then trigger an immediate run.
    ///
    /// On any failure, deletes whatever resources this call already
    /// created before surfacing the error.
    pub async fn create_blob_indexer_pipeline(
        &self,
        prefix: &str,
        index: &str,
        connection_string: &str,
        container: &str,
        schedule_hours: u32,
        skillset: Option<&Value>,
        cancel: &CancellationToken,
    ) -> Result<Value> {
        let mut created = CreatedResources { datasource: None, skillset: None };

        let result = self
            .build_pipeline(prefix, index, connection_string, container, schedule_hours, skillset, &mut created, cancel)
            .await;

        if let Err(e) = result {
            self.rollback(&created, cancel).await;
            return Err(e);
        }
        result
    }

    #[allow(clippy::too_many_arguments)]
    async fn build_pipeline(
        &self,
        prefix: &str,
        index: &str,
        connection_string: &str,
        container: &str,
        schedule_hours: u32,
        skillset: Option<&Value>,
        created: &mut CreatedResources,
        cancel: &CancellationToken,
    ) -> Result<Value> {
        let datasource_name = format!("{prefix}-datasource");
        self.search_ops
            .create_datasource(
                &json!({
                    "name": datasource_name,
                    "type": "azureblob",
                    "connectionString": connection_string,
                    "container": { "name": container },
                }),
                cancel,
            )
            .await?;
        created.datasource = Some(datasource_name.clone());

        let skillset_name = if let Some(definition) = skillset {
            self.search_ops.create_skillset(definition, cancel).await?;
            let name = definition["name"]
                .as_str()
                .ok_or_else(|| Error::validation("skillset definition missing \"name\""))?
                .to_string();
            created.skillset = Some(name.clone());
            Some(name)
        } else {
            None
        };

        let indexer_name = format!("{prefix}-indexer");
        let mut indexer = json!({
            "name": indexer_name,
            "dataSourceName": datasource_name,
            "targetIndexName": index,
            "parsingMode": "default",
            "maxFailedItems": 0,
            "maxFailedItemsPerBatch": 0,
            "schedule": { "interval": format!("PT{schedule_hours}H") },
        });
        if let Some(name) = &skillset_name {
            indexer["skillsetName"] = json!(name);
        }
        self.search_ops.create_indexer(&indexer, cancel).await?;
        self.search_ops
            .run_indexer(&indexer_name, false, Duration::from_secs(5), Duration::from_secs(0), cancel)
            .await
    }

    async fn rollback(&self, created: &CreatedResources, cancel: &CancellationToken) {
        if let Some(name) = &created.skillset {
            let _ = self.search_ops.delete_skillset(name, cancel).await;
        }
        if let Some(name) = &created.datasource {
            let _ = self.search_ops.delete_datasource(name, cancel).await;
        }
    }

    /// Compute a health score over the last `lookback_hours` of
    /// `name`'s execution history.
    pub async fn monitor_indexer_health(
        &self,
        name: &str,
        lookback_hours: i64,
        cancel: &CancellationToken,
    ) -> Result<IndexerHealthReport> {
        let status = self.search_ops.get_indexer_status(name, cancel).await?;
        let cutoff = chrono::Utc::now() - chrono::Duration::hours(lookback_hours);

        let history = status["executionHistory"].as_array().cloned().unwrap_or_default();
        let in_window: Vec<&Value> = history
            .iter()
            .filter(|execution| {
                execution["startTime"]
                    .as_str()
                    .and_then(|s| chrono::DateTime::parse_from_rfc3339(s).ok())
                    .is_some_and(|t| t >= cutoff)
            })
            .collect();

        let total = in_window.len() as u64;
        let successes =
            in_window.iter().filter(|e| e["status"].as_str().unwrap_or_default().eq_ignore_ascii_case("success")).count() as u64;

        let score = if total == 0 { 100.0 } else { successes as f64 / total as f64 * 100.0 };
        let class = if score >= 90.0 {
            HealthClass::Healthy
        } else if score >= 70.0 {
            HealthClass::Warning
        } else {
            HealthClass::Critical
        };

        Ok(IndexerHealthReport { successes, total, score, class })
    }

    /// Recommend a schedule change for `name` based on its last 20
    /// executions, to hit `target_freshness_minutes`.
    pub async fn optimize_indexer_schedule(
        &self,
        name: &str,
        current_interval_hours: u32,
        target_freshness_minutes: u32,
        cancel: &CancellationToken,
    ) -> Result<ScheduleRecommendation> {
        let status = self.search_ops.get_indexer_status(name, cancel).await?;
        let history = status["executionHistory"].as_array().cloned().unwrap_or_default();
        let recent: Vec<&Value> = history.iter().rev().take(20).collect();

        if recent.is_empty() {
            return Ok(ScheduleRecommendation::Keep);
        }

        let avg_seconds = recent
            .iter()
            .filter_map(|e| {
                let start = e["startTime"].as_str().and_then(|s| chrono::DateTime::parse_from_rfc3339(s).ok());
                let end = e["endTime"].as_str().and_then(|s| chrono::DateTime::parse_from_rfc3339(s).ok());
                start.zip(end).map(|(s, e)| (e - s).num_seconds() as f64)
            })
            .sum::<f64>()
            / recent.len() as f64;
        let avg_items = recent.iter().filter_map(|e| e["itemCount"].as_u64()).sum::<u64>() as f64 / recent.len() as f64;

        let schedule_seconds = f64::from(current_interval_hours) * 3600.0;

        if avg_seconds > schedule_seconds * 0.5 {
            Ok(ScheduleRecommendation::IncreaseInterval)
        } else if avg_items < 10.0 && current_interval_hours < 24 {
            Ok(ScheduleRecommendation::DecreaseFrequency)
        } else if u32::from(current_interval_hours) * 60 > target_freshness_minutes {
            Ok(ScheduleRecommendation::IncreaseFrequency)
        } else {
            Ok(ScheduleRecommendation::Keep)
        }
    }

    /// Reset `name`'s change-tracking state, then run it, optionally
    /// waiting up to `timeout_minutes` for a terminal status.
    pub async fn reset_and_run(
        &self,
        name: &str,
        wait: bool,
        timeout_minutes: u64,
        cancel: &CancellationToken,
    ) -> Result<Value> {
        self.search_ops.reset_indexer(name, cancel).await?;
        self.search_ops
            .run_indexer(name, wait, Duration::from_secs(5), Duration::from_secs(timeout_minutes * 60), cancel)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn health_class_boundaries() {
        assert_eq!(classify(90.0), HealthClass::Healthy);
        assert_eq!(classify(89.9), HealthClass::Warning);
        assert_eq!(classify(70.0), HealthClass::Warning);
        assert_eq!(classify(69.9), HealthClass::Critical);
    }

    fn classify(score: f64) -> HealthClass {
        if score >= 90.0 {
            HealthClass::Healthy
        } else if score >= 70.0 {
            HealthClass::Warning
        } else {
            HealthClass::Critical
        }
    }
}
