//! Schema backup files: the core's only persisted artifact. Written
//! atomically (temp file + rename) so a crash mid-write never leaves a
//! truncated backup behind.

use std::path::{Path, PathBuf};

use codeindex_domain::error::Result;
use codeindex_domain::value_objects::IndexSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error_ext::IoErrorContext;

/// Header written alongside the schema definition in every backup file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackupMetadata {
    /// RFC 3339 timestamp of when the backup was taken.
    pub timestamp: String,
    /// Index the schema was fetched from.
    pub index_name: String,
    /// Document count at backup time, when known.
    pub document_count: Option<u64>,
}

/// A schema backup file's full contents: the index definition plus its
/// `_backup_metadata` header.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchemaBackup {
    /// The index definition as it existed at backup time.
    #[serde(flatten)]
    pub schema: IndexSchema,
    /// Backup provenance.
    #[serde(rename = "_backup_metadata")]
    pub metadata: BackupMetadata,
}

/// Build a unique backup file path under `dir`, named
/// `{index_name}-{iso_timestamp}.json`.
pub fn backup_path(dir: &Path, index_name: &str, timestamp: chrono::DateTime<chrono::Utc>) -> PathBuf {
    let stamp = timestamp.format("%Y%m%dT%H%M%S%.3fZ");
    dir.join(format!("{index_name}-{stamp}.json"))
}

/// Serialize `schema` plus `document_count` into `path`, writing to a
/// sibling temp file first and renaming into place so readers never see
/// a partial file.
pub async fn write_backup(path: &Path, index_name: &str, schema: &IndexSchema, document_count: Option<u64>) -> Result<()> {
    let metadata = BackupMetadata { timestamp: chrono::Utc::now().to_rfc3339(), index_name: index_name.to_string(), document_count };
    let body = serde_json::to_vec_pretty(&SchemaBackup { schema: schema.clone(), metadata })?;

    let tmp_path = path.with_extension("json.tmp");
    tokio::fs::write(&tmp_path, &body).await.io_context(format!("writing backup temp file {}", tmp_path.display()))?;
    tokio::fs::rename(&tmp_path, path).await.io_context(format!("renaming backup into place at {}", path.display()))?;
    Ok(())
}

/// Read a backup file back into its schema and metadata.
pub async fn read_backup(path: &Path) -> Result<SchemaBackup> {
    let body = tokio::fs::read(path).await.io_context(format!("reading backup file {}", path.display()))?;
    let value: Value = serde_json::from_slice(&body)?;
    Ok(serde_json::from_value(value)?)
}

#[cfg(test)]
mod tests {
    use codeindex_domain::value_objects::IndexSchema;

    use super::*;

    fn sample_schema() -> IndexSchema {
        IndexSchema {
            name: "code-index".to_string(),
            fields: Vec::new(),
            vector_search: None,
            semantic: None,
            scoring_profiles: Vec::new(),
            suggesters: Vec::new(),
            cors_options: None,
        }
    }

    #[tokio::test]
    async fn a_written_backup_round_trips_through_read_backup() {
        let dir = tempfile::tempdir().unwrap();
        let path = backup_path(dir.path(), "code-index", chrono::Utc::now());

        write_backup(&path, "code-index", &sample_schema(), Some(42)).await.unwrap();
        let restored = read_backup(&path).await.unwrap();

        assert_eq!(restored.schema.name, "code-index");
        assert_eq!(restored.metadata.index_name, "code-index");
        assert_eq!(restored.metadata.document_count, Some(42));
    }

    #[tokio::test]
    async fn no_temp_file_is_left_behind_after_a_successful_write() {
        let dir = tempfile::tempdir().unwrap();
        let path = backup_path(dir.path(), "code-index", chrono::Utc::now());

        write_backup(&path, "code-index", &sample_schema(), None).await.unwrap();

        assert!(path.exists());
        assert!(!path.with_extension("json.tmp").exists());
    }
}
