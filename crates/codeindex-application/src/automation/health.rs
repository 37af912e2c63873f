//! Rolls up service, index, and indexer status into one overall verdict.

use std::sync::Arc;

use codeindex_domain::error::Result;
use codeindex_domain::ports::RestClient;
use codeindex_providers::search::SearchOperations;
use serde_json::Value;
use tokio_util::sync::CancellationToken;

/// Overall system status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum OverallStatus {
    /// Everything nominal.
    Healthy,
    /// Non-blocking issues present.
    Warning,
    /// Blocking issues present.
    Critical,
    /// A required check could not complete.
    Error,
}

/// One structured finding in a `HealthReport`.
#[derive(Debug, Clone)]
pub struct Issue {
    /// Short machine-readable category.
    pub kind: String,
    /// Human-readable description.
    pub message: String,
    /// Severity, ordered the same as `OverallStatus`.
    pub severity: OverallStatus,
}

/// Composed health report across service, index, and indexer checks.
#[derive(Debug, Clone)]
pub struct HealthReport {
    /// Worst severity seen across every issue.
    pub overall: OverallStatus,
    /// All findings, unordered.
    pub issues: Vec<Issue>,
}

/// Rolls up `get_service_statistics`, `get_index_stats`, and
/// `get_indexer_status` into one `HealthReport`.
pub struct HealthMonitor<C: RestClient> {
    search_ops: Arc<SearchOperations<C>>,
}

impl<C: RestClient> HealthMonitor<C> {
    /// Build a `HealthMonitor` over `search_ops`.
    pub fn new(search_ops: Arc<SearchOperations<C>>) -> Self {
        Self { search_ops }
    }

    /// Check service-level counters against their limits, `index_names`'
    /// stats, and `indexer_names`' last-run status.
    pub async fn check(
        &self,
        index_names: &[&str],
        indexer_names: &[&str],
        cancel: &CancellationToken,
    ) -> Result<HealthReport> {
        let mut issues = Vec::new();

        match self.search_ops.get_service_statistics(cancel).await {
            Ok(stats) => issues.extend(service_issues(&stats)),
            Err(e) => issues.push(Issue {
                kind: "service_stats_unavailable".to_string(),
                message: e.to_string(),
                severity: OverallStatus::Error,
            }),
        }

        for index_name in index_names {
            match self.search_ops.get_index_stats(index_name, cancel).await {
                Ok(stats) => issues.extend(index_issues(index_name, &stats)),
                Err(e) => issues.push(Issue {
                    kind: "index_stats_unavailable".to_string(),
                    message: format!("{index_name}: {e}"),
                    severity: OverallStatus::Critical,
                }),
            }
        }

        for indexer_name in indexer_names {
            match self.search_ops.get_indexer_status(indexer_name, cancel).await {
                Ok(status) => issues.extend(indexer_issues(indexer_name, &status)),
                Err(e) => issues.push(Issue {
                    kind: "indexer_status_unavailable".to_string(),
                    message: format!("{indexer_name}: {e}"),
                    severity: OverallStatus::Critical,
                }),
            }
        }

        let overall = issues.iter().map(|i| i.severity).max().unwrap_or(OverallStatus::Healthy);
        Ok(HealthReport { overall, issues })
    }
}

fn service_issues(stats: &Value) -> Vec<Issue> {
    let mut issues = Vec::new();
    let counters = &stats["counters"];
    let limits = &stats["limits"];
    if let (Some(doc_count), Some(max_docs)) = (counters["documentCount"]["usage"].as_u64(), limits["maxDocumentCount"].as_u64())
    {
        if max_docs > 0 && doc_count as f64 / max_docs as f64 > 0.9 {
            issues.push(Issue {
                kind: "document_count_near_limit".to_string(),
                message: format!("{doc_count}/{max_docs} documents used"),
                severity: OverallStatus::Warning,
            });
        }
    }
    issues
}

fn index_issues(index_name: &str, stats: &Value) -> Vec<Issue> {
    let mut issues = Vec::new();
    if stats["documentCount"].as_u64() == Some(0) {
        issues.push(Issue {
            kind: "empty_index".to_string(),
            message: format!("{index_name} has zero documents"),
            severity: OverallStatus::Warning,
        });
    }
    issues
}

fn indexer_issues(indexer_name: &str, status: &Value) -> Vec<Issue> {
    let mut issues = Vec::new();
    let last_status = status["lastResult"]["status"].as_str().unwrap_or_default().to_lowercase();
    match last_status.as_str() {
        "error" => issues.push(Issue {
            kind: "indexer_failed".to_string(),
            message: format!("{indexer_name} last run failed"),
            severity: OverallStatus::Critical,
        }),
        "transientfailure" => issues.push(Issue {
            kind: "indexer_partial_failure".to_string(),
            message: format!("{indexer_name} last run had partial failures"),
            severity: OverallStatus::Warning,
        }),
        _ => {}
    }
    issues
}
