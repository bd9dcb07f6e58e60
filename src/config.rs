use std::path::Path;
use std::sync::Arc;

use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::{FolioError, Result};
use crate::models::Document;
use crate::modules::{Metadata, Module, ValueProvider};

/// A pipeline definition loaded from JSON
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PipelineConfig {
    /// Modules to run, in order
    #[serde(default)]
    pub modules: Vec<ModuleSpec>,
}

/// One configured module
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModuleSpec {
    Metadata(MetadataSpec),
}

/// Configuration for a metadata stage
#[derive(Debug, Clone, Deserialize)]
#[serde(try_from = "RawMetadataSpec")]
pub enum MetadataSpec {
    /// `{ "key": ..., "value": ... }` or `{ "key": ..., "computed": ... }`
    PerValue {
        key: String,
        value: Option<Value>,
        computed: Option<Computation>,
    },
    /// `{ "modules": [...], "for_each_document": bool }`
    SubPipeline {
        modules: Vec<ModuleSpec>,
        for_each_document: bool,
    },
}

/// Every field a metadata entry may carry, before the mode is decided
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawMetadataSpec {
    key: Option<String>,
    value: Option<Value>,
    computed: Option<Computation>,
    modules: Option<Vec<ModuleSpec>>,
    for_each_document: Option<bool>,
}

impl TryFrom<RawMetadataSpec> for MetadataSpec {
    type Error = FolioError;

    fn try_from(raw: RawMetadataSpec) -> Result<Self> {
        match (raw.key, raw.modules) {
            (Some(_), Some(_)) => Err(FolioError::Config(
                "metadata sets both `key` and `modules`".to_string(),
            )),
            (Some(key), None) => {
                if raw.for_each_document.is_some() {
                    return Err(FolioError::Config(format!(
                        "metadata `{}` sets `for_each_document` without `modules`",
                        key
                    )));
                }
                Ok(MetadataSpec::PerValue {
                    key,
                    value: raw.value,
                    computed: raw.computed,
                })
            }
            (None, Some(modules)) => {
                if raw.value.is_some() || raw.computed.is_some() {
                    return Err(FolioError::Config(
                        "metadata sets `value` or `computed` without `key`".to_string(),
                    ));
                }
                Ok(MetadataSpec::SubPipeline {
                    modules,
                    for_each_document: raw.for_each_document.unwrap_or(false),
                })
            }
            (None, None) => Err(FolioError::Config(
                "metadata needs either `key` or `modules`".to_string(),
            )),
        }
    }
}

/// Built-in values computed from each document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Computation {
    /// The document's identifier
    DocumentId,
    /// Content length in bytes
    ContentLength,
    /// Number of whitespace-separated words in the content
    WordCount,
    /// RFC 3339 UTC time at which the value was computed
    Timestamp,
}

impl Computation {
    pub fn evaluate(self, document: &Document) -> Value {
        match self {
            Computation::DocumentId => json!(document.id()),
            Computation::ContentLength => json!(document.content().len()),
            Computation::WordCount => json!(document.content().split_whitespace().count()),
            Computation::Timestamp => json!(chrono::Utc::now().to_rfc3339()),
        }
    }
}

impl PipelineConfig {
    /// Load a pipeline definition from a JSON file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Parse a pipeline definition from a JSON string
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Build the configured modules
    pub fn build(&self) -> Result<Vec<Arc<dyn Module>>> {
        build_modules(&self.modules)
    }
}

fn build_modules(specs: &[ModuleSpec]) -> Result<Vec<Arc<dyn Module>>> {
    specs.iter().map(ModuleSpec::build).collect()
}

impl ModuleSpec {
    pub fn build(&self) -> Result<Arc<dyn Module>> {
        match self {
            ModuleSpec::Metadata(spec) => Ok(Arc::new(spec.build()?)),
        }
    }
}

impl MetadataSpec {
    pub fn build(&self) -> Result<Metadata> {
        match self {
            MetadataSpec::PerValue {
                key,
                value,
                computed,
            } => {
                let provider = match (value, computed) {
                    (Some(_), Some(_)) => {
                        return Err(FolioError::Config(format!(
                            "metadata `{}` sets both `value` and `computed`",
                            key
                        )));
                    }
                    (Some(value), None) => Some(ValueProvider::Constant(value.clone())),
                    (None, Some(computation)) => {
                        let computation = *computation;
                        Some(ValueProvider::computed(move |doc| {
                            Ok(computation.evaluate(doc))
                        }))
                    }
                    (None, None) => None,
                };
                Metadata::new(key.clone(), provider)
            }
            MetadataSpec::SubPipeline {
                modules,
                for_each_document,
            } => {
                let stage = Metadata::from_modules(build_modules(modules)?);
                Ok(if *for_each_document {
                    stage.for_each_document()
                } else {
                    stage
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::Engine;
    use crate::modules::MetadataMode;

    #[test]
    fn test_parse_all_shapes() {
        let json = r#"{
            "modules": [
                { "metadata": { "key": "title", "value": "Hello" } },
                { "metadata": { "key": "words", "computed": "word_count" } },
                { "metadata": { "key": "draft" } },
                { "metadata": {
                    "modules": [ { "metadata": { "key": "site", "value": "docs" } } ],
                    "for_each_document": true
                } }
            ]
        }"#;

        let config = PipelineConfig::from_json(json).unwrap();
        assert_eq!(config.modules.len(), 4);

        let modules = config.build().unwrap();
        assert_eq!(modules.len(), 4);
        assert!(modules.iter().all(|m| m.name() == "Metadata"));

        match &config.modules[3] {
            ModuleSpec::Metadata(MetadataSpec::SubPipeline {
                modules,
                for_each_document,
            }) => {
                assert_eq!(modules.len(), 1);
                assert!(*for_each_document);
            }
            other => panic!("expected sub-pipeline, got {:?}", other),
        }
    }

    #[test]
    fn test_sub_pipeline_defaults_to_shared() {
        let spec: MetadataSpec = serde_json::from_str(r#"{ "modules": [] }"#).unwrap();
        let stage = spec.build().unwrap();
        assert!(matches!(
            stage.mode(),
            MetadataMode::SubPipeline {
                for_each_document: false,
                ..
            }
        ));
    }

    #[test]
    fn test_value_and_computed_conflict() {
        let spec: MetadataSpec =
            serde_json::from_str(r#"{ "key": "k", "value": 1, "computed": "word_count" }"#)
                .unwrap();
        assert!(matches!(spec.build(), Err(FolioError::Config(_))));
    }

    #[test]
    fn test_empty_key_rejected() {
        let config =
            PipelineConfig::from_json(r#"{ "modules": [ { "metadata": { "key": "" } } ] }"#)
                .unwrap();
        assert!(matches!(
            config.build(),
            Err(FolioError::InvalidArgument { name: "key", .. })
        ));
    }

    #[test]
    fn test_unknown_module_is_json_error() {
        let result = PipelineConfig::from_json(r#"{ "modules": [ { "render": {} } ] }"#);
        assert!(matches!(result, Err(FolioError::Json(_))));
    }

    #[test]
    fn test_key_and_modules_conflict() {
        let result = serde_json::from_str::<MetadataSpec>(
            r#"{ "key": "k", "modules": [ { "metadata": { "key": "x", "value": 1 } } ] }"#,
        );
        let err = result.unwrap_err().to_string();
        assert!(err.contains("both `key` and `modules`"), "{}", err);
    }

    #[test]
    fn test_misspelled_fields_rejected() {
        assert!(serde_json::from_str::<MetadataSpec>(r#"{ "key": "k", "vaule": 1 }"#).is_err());
        assert!(
            serde_json::from_str::<MetadataSpec>(r#"{ "modules": [], "for_each_documnt": true }"#)
                .is_err()
        );

        // Nested entries are checked the same way
        let result = PipelineConfig::from_json(
            r#"{ "modules": [ { "metadata": { "modules": [
                { "metadata": { "key": "x", "computd": "word_count" } }
            ] } } ] }"#,
        );
        assert!(matches!(result, Err(FolioError::Json(_))));

        assert!(PipelineConfig::from_json(r#"{ "modles": [] }"#).is_err());
    }

    #[test]
    fn test_incomplete_or_mismatched_shapes_rejected() {
        for json in [
            r#"{}"#,
            r#"{ "value": 1 }"#,
            r#"{ "modules": [], "value": 1 }"#,
            r#"{ "key": "k", "for_each_document": true }"#,
        ] {
            assert!(
                serde_json::from_str::<MetadataSpec>(json).is_err(),
                "accepted {}",
                json
            );
        }
    }

    #[test]
    fn test_computations() {
        let doc = Document::new("the quick  brown fox");
        assert_eq!(Computation::DocumentId.evaluate(&doc), json!(doc.id()));
        assert_eq!(Computation::ContentLength.evaluate(&doc), json!(20));
        assert_eq!(Computation::WordCount.evaluate(&doc), json!(4));

        let stamp = Computation::Timestamp.evaluate(&doc);
        let stamp = stamp.as_str().unwrap();
        assert!(chrono::DateTime::parse_from_rfc3339(stamp).is_ok());
    }

    #[test]
    fn test_configured_pipeline_runs() {
        let json = r#"{
            "modules": [
                { "metadata": { "key": "title", "value": "Hello" } },
                { "metadata": { "modules": [
                    { "metadata": { "key": "words", "computed": "word_count" } }
                ], "for_each_document": true } },
                { "metadata": { "modules": [
                    { "metadata": { "key": "site", "value": "docs" } }
                ] } }
            ]
        }"#;
        let modules = PipelineConfig::from_json(json).unwrap().build().unwrap();

        let output = Engine::new()
            .run(
                &modules,
                vec![Document::new("one two"), Document::new("three")],
            )
            .unwrap();

        assert_eq!(output[0].get("title"), Some(&json!("Hello")));
        assert_eq!(output[0].get("words"), Some(&json!(2)));
        assert_eq!(output[1].get("words"), Some(&json!(1)));
        assert!(output.iter().all(|d| d.get("site") == Some(&json!("docs"))));
    }
}
