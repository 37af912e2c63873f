//! Builds index schemas from an explicit feature set, replacing what the
//! original treated as heterogeneous free-form config with a closed enum
//! plus a builder that merges field sets by name.

use codeindex_domain::value_objects::{
    CorsOptions, Field, FieldType, HnswAlgorithm, IndexSchema, ScoringProfile, SemanticConfig,
    SemanticConfiguration, SemanticPrioritizedFields, VectorMetric, VectorSearchConfig,
    VectorSearchProfile,
};

/// Vector dimensions to probe, in priority order, when detecting service
/// capabilities before falling back to the default.
pub const PROBE_DIMENSIONS: [usize; 4] = [3072, 1536, 1024, 512];

/// Default vector dimensionality used when capability probing is
/// unavailable or every probe fails.
pub const DEFAULT_DIMENSIONS: usize = 1536;

/// Optional index capabilities `SchemaBuilder::generate` can compose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Feature {
    /// Adds `content_vector` and an HNSW vector search profile.
    VectorSearch,
    /// Adds a semantic configuration over `content`/`docstring`.
    SemanticSearch,
    /// Marks language/repository/file_extension as facetable.
    FacetedSearch,
    /// Adds a default scoring profile weighting `function_name`/`class_name`.
    ScoringProfiles,
}

fn searchable_field(name: &str) -> Field {
    Field { key: false, searchable: true, ..Field::key_field(name) }
}

fn filterable_field(name: &str) -> Field {
    Field { key: false, filterable: true, ..Field::key_field(name) }
}

/// Builds `IndexSchema`s from a base key field plus a requested feature
/// set, merging each feature's fields by name (later features never
/// duplicate a field the base or an earlier feature already added).
pub struct SchemaBuilder {
    vector_dimensions: usize,
}

impl SchemaBuilder {
    /// Build a schema builder using `vector_dimensions` for any
    /// `VectorSearch` feature (use `PROBE_DIMENSIONS` results or
    /// `DEFAULT_DIMENSIONS`).
    pub fn new(vector_dimensions: usize) -> Self {
        Self { vector_dimensions }
    }

    fn base_fields() -> Vec<Field> {
        vec![
            Field::key_field("id"),
            searchable_field("content"),
            filterable_field("repository"),
            Field { filterable: true, ..searchable_field("file_path") },
            filterable_field("language"),
            filterable_field("chunk_type"),
            searchable_field("function_name"),
            searchable_field("class_name"),
            searchable_field("docstring"),
        ]
    }

    fn merge_field(fields: &mut Vec<Field>, field: Field) {
        if !fields.iter().any(|f| f.name == field.name) {
            fields.push(field);
        }
    }

    /// Generate an `IndexSchema` named `index_name` with `base_fields()`
    /// plus every requested feature's fields and sections merged in,
    /// plus any caller-supplied `custom_fields` (also deduplicated).
    pub fn generate(&self, index_name: &str, features: &[Feature], custom_fields: &[Field]) -> IndexSchema {
        let mut fields = Self::base_fields();
        let mut vector_search = None;
        let mut semantic = None;
        let mut scoring_profiles = Vec::new();

        for feature in features {
            match feature {
                Feature::VectorSearch => {
                    Self::merge_field(
                        &mut fields,
                        Field {
                            name: "content_vector".to_string(),
                            field_type: FieldType::SingleCollection,
                            key: false,
                            searchable: true,
                            retrievable: false,
                            dimensions: Some(self.vector_dimensions),
                            vector_search_profile: Some("vector-profile".to_string()),
                            ..Field::key_field("content_vector")
                        },
                    );
                    vector_search = Some(VectorSearchConfig {
                        algorithms: vec![HnswAlgorithm {
                            name: "hnsw-config".to_string(),
                            m: 4,
                            ef_construction: 400,
                            ef_search: 500,
                            metric: VectorMetric::Cosine,
                        }],
                        profiles: vec![VectorSearchProfile {
                            name: "vector-profile".to_string(),
                            algorithm: "hnsw-config".to_string(),
                        }],
                    });
                }
                Feature::SemanticSearch => {
                    semantic = Some(SemanticConfig {
                        configurations: vec![SemanticConfiguration {
                            name: "semantic-config".to_string(),
                            prioritized_fields: SemanticPrioritizedFields {
                                title_field: Some("function_name".to_string()),
                                content_fields: vec!["content".to_string(), "docstring".to_string()],
                                keywords_fields: vec!["class_name".to_string()],
                            },
                        }],
                    });
                }
                Feature::FacetedSearch => {
                    for name in ["language", "repository", "file_extension"] {
                        if let Some(existing) = fields.iter_mut().find(|f| f.name == name) {
                            existing.facetable = true;
                        } else {
                            Self::merge_field(
                                &mut fields,
                                Field { key: false, filterable: true, facetable: true, ..Field::key_field(name) },
                            );
                        }
                    }
                }
                Feature::ScoringProfiles => {
                    scoring_profiles.push(ScoringProfile {
                        name: "function-boost".to_string(),
                        functions: serde_json::json!({
                            "function_name": 2.0,
                            "class_name": 1.5,
                        }),
                    });
                }
            }
        }

        for custom in custom_fields {
            Self::merge_field(&mut fields, custom.clone());
        }

        IndexSchema {
            name: index_name.to_string(),
            fields,
            vector_search,
            semantic,
            scoring_profiles,
            suggesters: Vec::new(),
            cors_options: Some(CorsOptions { allowed_origins: vec!["*".to_string()] }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_schema_has_exactly_one_key_field() {
        let schema = SchemaBuilder::new(DEFAULT_DIMENSIONS).generate("idx", &[], &[]);
        assert_eq!(schema.fields.iter().filter(|f| f.key).count(), 1);
    }

    #[test]
    fn vector_search_feature_adds_vector_field_and_profile() {
        let schema = SchemaBuilder::new(1536).generate("idx", &[Feature::VectorSearch], &[]);
        let field = schema.field("content_vector").unwrap();
        assert_eq!(field.dimensions, Some(1536));
        assert!(schema.vector_search.is_some());
    }

    #[test]
    fn features_do_not_duplicate_base_fields() {
        let schema = SchemaBuilder::new(1536).generate("idx", &[Feature::FacetedSearch], &[]);
        assert_eq!(schema.fields.iter().filter(|f| f.name == "language").count(), 1);
    }

    #[test]
    fn custom_fields_are_merged_and_deduplicated() {
        let custom = vec![searchable_field("tags"), searchable_field("content")];
        let schema = SchemaBuilder::new(1536).generate("idx", &[], &custom);
        assert_eq!(schema.fields.iter().filter(|f| f.name == "content").count(), 1);
        assert!(schema.field("tags").is_some());
    }
}
