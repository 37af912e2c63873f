//! Validates a desired schema against the service and applies
//! compatibility adjustments when validation fails, recording every
//! change for observability.

use std::sync::Arc;

use codeindex_domain::error::Result;
use codeindex_domain::ports::RestClient;
use codeindex_domain::value_objects::{FieldType, IndexSchema};
use tokio_util::sync::CancellationToken;

use crate::search::SearchOperations;

/// Outcome of `Negotiator::negotiate`.
#[derive(Debug, Clone)]
pub struct NegotiationResult {
    /// Whether the negotiated schema was ultimately accepted.
    pub success: bool,
    /// The schema actually applied (adjusted, if adjustments were needed).
    pub negotiated: IndexSchema,
    /// Human-readable description of each adjustment made.
    pub changes: Vec<String>,
    /// Non-fatal observations (e.g. an unknown analyzer was replaced).
    pub warnings: Vec<String>,
}

/// Field-level diff entry produced by `Negotiator::update_existing`.
#[derive(Debug, Clone)]
pub struct SchemaDiff {
    /// Field name that changed.
    pub field: String,
    /// Human description of the change.
    pub description: String,
    /// Whether applying this change requires a drop-rebuild.
    pub requires_reindex: bool,
}

/// Validates and, if necessary, adjusts a schema so the service accepts
/// it, without ever silently dropping a feature the caller asked for.
pub struct Negotiator<C: RestClient> {
    search_ops: Arc<SearchOperations<C>>,
}

impl<C: RestClient> Negotiator<C> {
    /// Build a negotiator against `search_ops`.
    pub fn new(search_ops: Arc<SearchOperations<C>>) -> Self {
        Self { search_ops }
    }

    /// Apply every compatibility adjustment to `schema` that would be
    /// needed for the service to accept it, without making a network
    /// call. Always succeeds; the caller's subsequent `create_index` call
    /// is the actual validation against the live service.
    fn apply_adjustments(schema: &IndexSchema) -> (IndexSchema, Vec<String>, Vec<String>) {
        let mut adjusted = schema.clone();
        let mut changes = Vec::new();
        let mut warnings = Vec::new();

        for field in &mut adjusted.fields {
            if field.searchable && field.field_type != FieldType::String {
                field.searchable = false;
                changes.push(format!("{}: searchable disabled for non-string type", field.name));
            }

            let is_vector_field = field.dimensions.is_some();
            if is_vector_field {
                let mut changed = false;
                if field.filterable {
                    field.filterable = false;
                    changed = true;
                }
                if field.sortable {
                    field.sortable = false;
                    changed = true;
                }
                if field.facetable {
                    field.facetable = false;
                    changed = true;
                }
                if field.retrievable {
                    field.retrievable = false;
                    changed = true;
                }
                if !field.searchable {
                    field.searchable = true;
                    changed = true;
                }
                if changed {
                    changes.push(format!("{}: vector field flags normalized", field.name));
                }
            }

            if let Some(analyzer) = &field.analyzer {
                if !is_known_analyzer(analyzer) {
                    warnings.push(format!("{}: unknown analyzer '{}' replaced with standard.lucene", field.name, analyzer));
                    field.analyzer = Some("standard.lucene".to_string());
                }
            }
        }

        (adjusted, changes, warnings)
    }

    /// Attempt to create `desired` as-is; on failure, apply compatibility
    /// adjustments and try once more.
    pub async fn negotiate(&self, desired: &IndexSchema, cancel: &CancellationToken) -> Result<NegotiationResult> {
        let desired_value = serde_json::to_value(desired)?;
        match self.search_ops.create_index(&desired_value, cancel).await {
            Ok(_) => Ok(NegotiationResult {
                success: true,
                negotiated: desired.clone(),
                changes: Vec::new(),
                warnings: Vec::new(),
            }),
            Err(first_error) => {
                let (adjusted, changes, warnings) = Self::apply_adjustments(desired);
                if changes.is_empty() {
                    return Err(first_error);
                }
                let adjusted_value = serde_json::to_value(&adjusted)?;
                match self.search_ops.create_index(&adjusted_value, cancel).await {
                    Ok(_) => Ok(NegotiationResult { success: true, negotiated: adjusted, changes, warnings }),
                    Err(e) => Err(e),
                }
            }
        }
    }

    /// Diff `existing` against `desired`, classifying each change as a
    /// safe addition or one that forces a drop-rebuild.
    pub fn update_existing(existing: &IndexSchema, desired: &IndexSchema) -> Vec<SchemaDiff> {
        let mut diffs = Vec::new();

        for field in &desired.fields {
            match existing.field(&field.name) {
                None => diffs.push(SchemaDiff {
                    field: field.name.clone(),
                    description: "field addition".to_string(),
                    requires_reindex: false,
                }),
                Some(current) => {
                    if current.field_type != field.field_type {
                        diffs.push(SchemaDiff {
                            field: field.name.clone(),
                            description: format!(
                                "type change from {:?} to {:?}",
                                current.field_type, field.field_type
                            ),
                            requires_reindex: true,
                        });
                    }
                    if current.key != field.key {
                        diffs.push(SchemaDiff {
                            field: field.name.clone(),
                            description: "key status change".to_string(),
                            requires_reindex: true,
                        });
                    }
                }
            }
        }

        diffs
    }
}

fn is_known_analyzer(name: &str) -> bool {
    matches!(
        name,
        "standard.lucene" | "en.microsoft" | "en.lucene" | "keyword" | "simple" | "whitespace" | "pattern"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use codeindex_domain::value_objects::Field;

    #[test]
    fn non_string_searchable_field_is_disabled() {
        let schema = IndexSchema {
            name: "idx".to_string(),
            fields: vec![Field {
                searchable: true,
                field_type: FieldType::Int32,
                ..Field::key_field("count")
            }],
            vector_search: None,
            semantic: None,
            scoring_profiles: Vec::new(),
            suggesters: Vec::new(),
            cors_options: None,
        };
        let (adjusted, changes, _) = Negotiator::<crate::http::ReqwestRestClient>::apply_adjustments(&schema);
        assert!(!adjusted.fields[0].searchable);
        assert_eq!(changes.len(), 1);
    }

    #[test]
    fn vector_field_flags_are_normalized() {
        let schema = IndexSchema {
            name: "idx".to_string(),
            fields: vec![Field {
                key: false,
                dimensions: Some(1536),
                filterable: true,
                sortable: true,
                facetable: true,
                retrievable: true,
                searchable: false,
                ..Field::key_field("content_vector")
            }],
            vector_search: None,
            semantic: None,
            scoring_profiles: Vec::new(),
            suggesters: Vec::new(),
            cors_options: None,
        };
        let (adjusted, changes, _) = Negotiator::<crate::http::ReqwestRestClient>::apply_adjustments(&schema);
        let field = &adjusted.fields[0];
        assert!(!field.filterable && !field.sortable && !field.facetable && !field.retrievable);
        assert!(field.searchable);
        assert_eq!(changes.len(), 1);
    }

    #[test]
    fn type_change_requires_reindex() {
        let existing = IndexSchema {
            name: "idx".to_string(),
            fields: vec![Field::key_field("id")],
            vector_search: None,
            semantic: None,
            scoring_profiles: Vec::new(),
            suggesters: Vec::new(),
            cors_options: None,
        };
        let mut desired = existing.clone();
        desired.fields[0].field_type = FieldType::Int64;
        let diffs = Negotiator::<crate::http::ReqwestRestClient>::update_existing(&existing, &desired);
        assert!(diffs.iter().any(|d| d.requires_reindex));
    }

    #[test]
    fn new_field_is_a_safe_addition() {
        let existing = IndexSchema {
            name: "idx".to_string(),
            fields: vec![Field::key_field("id")],
            vector_search: None,
            semantic: None,
            scoring_profiles: Vec::new(),
            suggesters: Vec::new(),
            cors_options: None,
        };
        let mut desired = existing.clone();
        desired.fields.push(Field::key_field("tags"));
        let diffs = Negotiator::<crate::http::ReqwestRestClient>::update_existing(&existing, &desired);
        assert_eq!(diffs.len(), 1);
        assert!(!diffs[0].requires_reindex);
    }
}
