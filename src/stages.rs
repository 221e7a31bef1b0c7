//! Pipeline results: stage texts and pass descriptors
//!
//! A [`StageStore`] is an immutable snapshot of one pipeline run. Stage 0 is
//! the initial text and stage `k` is the text after the first `k` passes, so
//! there is always exactly one more stage than there are passes. The store is
//! never edited in place; a re-run builds a fresh one and the session swaps it
//! in wholesale.
//!
//! Stores can also be read from a pipeline-result document:
//!
//! ```text
//! passes: [canonicalize, cse]
//! stages: ["<initial>", "<after canonicalize>", "<after cse>"]
//! ```
//!
//! JSON and YAML are both accepted; the file extension picks the decoder.

use crate::labels;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors building or loading a stage store
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("expected {expected} stages for {passes} passes, got {stages}")]
    LengthMismatch {
        passes: usize,
        stages: usize,
        expected: usize,
    },
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid JSON pipeline result: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid YAML pipeline result: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// One snapshot of the program text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stage {
    pub index: usize,
    pub text: String,
}

/// A pass as shown to the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PassDescriptor {
    /// 1-based position in the pass list
    pub ordinal: usize,
    /// Pass identifier as given to the pipeline
    pub raw_name: String,
    /// Unique display label, see [`labels::uniquify`]
    pub label: String,
}

/// Serialized form of a pipeline run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineResult {
    pub passes: Vec<String>,
    pub stages: Vec<String>,
}

/// Immutable stages and pass descriptors of one pipeline run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageStore {
    stages: Vec<Stage>,
    passes: Vec<PassDescriptor>,
}

impl StageStore {
    /// Build a store from stage texts and the pass names that produced them.
    pub fn new<S, P>(stages: Vec<S>, pass_names: Vec<P>) -> Result<Self, StoreError>
    where
        S: Into<String>,
        P: Into<String>,
    {
        let pass_names: Vec<String> = pass_names.into_iter().map(Into::into).collect();
        if stages.len() != pass_names.len() + 1 {
            return Err(StoreError::LengthMismatch {
                passes: pass_names.len(),
                stages: stages.len(),
                expected: pass_names.len() + 1,
            });
        }

        let unique = labels::uniquify(&pass_names);
        let passes = pass_names
            .into_iter()
            .zip(unique)
            .enumerate()
            .map(|(i, (raw_name, label))| PassDescriptor {
                ordinal: i + 1,
                raw_name,
                label,
            })
            .collect();
        let stages = stages
            .into_iter()
            .enumerate()
            .map(|(index, text)| Stage {
                index,
                text: text.into(),
            })
            .collect();

        Ok(StageStore { stages, passes })
    }

    /// A store with only the initial text and no passes
    pub fn initial_only(text: impl Into<String>) -> Self {
        StageStore {
            stages: vec![Stage {
                index: 0,
                text: text.into(),
            }],
            passes: Vec::new(),
        }
    }

    pub fn from_result(result: PipelineResult) -> Result<Self, StoreError> {
        Self::new(result.stages, result.passes)
    }

    pub fn to_result(&self) -> PipelineResult {
        PipelineResult {
            passes: self.passes.iter().map(|p| p.raw_name.clone()).collect(),
            stages: self.stages.iter().map(|s| s.text.clone()).collect(),
        }
    }

    pub fn from_json(source: &str) -> Result<Self, StoreError> {
        Self::from_result(serde_json::from_str(source)?)
    }

    pub fn from_yaml(source: &str) -> Result<Self, StoreError> {
        Self::from_result(serde_yaml::from_str(source)?)
    }

    /// Load a pipeline-result file; `.yaml`/`.yml` are read as YAML,
    /// everything else as JSON.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| StoreError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        match path.extension().and_then(|ext| ext.to_str()) {
            Some("yaml") | Some("yml") => Self::from_yaml(&source),
            _ => Self::from_json(&source),
        }
    }

    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    pub fn passes(&self) -> &[PassDescriptor] {
        &self.passes
    }

    pub fn stage(&self, index: usize) -> Option<&Stage> {
        self.stages.get(index)
    }

    pub fn stage_text(&self, index: usize) -> Option<&str> {
        self.stage(index).map(|s| s.text.as_str())
    }

    /// The text before any pass ran
    pub fn initial_text(&self) -> &str {
        &self.stages[0].text
    }

    pub fn pass_count(&self) -> usize {
        self.passes.len()
    }

    pub fn stage_count(&self) -> usize {
        self.stages.len()
    }

    /// Sentinel label for stage 0; never equal to a pass label
    pub fn initial_label(&self) -> String {
        labels::initial_label(self.pass_count())
    }

    /// Ordinal display label for a stage index (`"[k/N] name"`)
    pub fn display_label(&self, index: usize) -> Option<String> {
        match index {
            0 => Some(self.initial_label()),
            k => self
                .passes
                .get(k - 1)
                .map(|p| labels::ordinal_label(p.ordinal, self.pass_count(), &p.raw_name)),
        }
    }

    /// Display labels for a pass picker, optionally led by the initial sentinel
    pub fn option_labels(&self, include_initial: bool) -> Vec<String> {
        let first = if include_initial { 0 } else { 1 };
        (first..self.stage_count())
            .filter_map(|index| self.display_label(index))
            .collect()
    }

    /// Resolve a label to a stage index.
    ///
    /// Accepts the initial sentinel, a pass's unique label, or the ordinal
    /// display form of either.
    pub fn resolve(&self, label: &str) -> Option<usize> {
        if label == self.initial_label() {
            return Some(0);
        }
        if let Some(pass) = self.passes.iter().find(|p| p.label == label) {
            return Some(pass.ordinal);
        }

        let (ordinal, count, name) = labels::parse_ordinal_label(label)?;
        if count != self.pass_count() {
            return None;
        }
        match ordinal {
            0 => None,
            k => self
                .passes
                .get(k - 1)
                .filter(|p| p.raw_name == name)
                .map(|p| p.ordinal),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> StageStore {
        StageStore::new(vec!["s0", "s1", "s2"], vec!["canon", "canon"]).unwrap()
    }

    #[test]
    fn test_descriptors_are_labelled() {
        let store = store();
        let labels: Vec<_> = store.passes().iter().map(|p| p.label.as_str()).collect();
        assert_eq!(labels, vec!["--canon", "--canon "]);
        assert_eq!(store.passes()[1].ordinal, 2);
        assert_eq!(store.stage_count(), store.pass_count() + 1);
    }

    #[test]
    fn test_length_mismatch_is_rejected() {
        let err = StageStore::new(vec!["s0"], vec!["canon"]).unwrap_err();
        assert!(matches!(
            err,
            StoreError::LengthMismatch {
                passes: 1,
                stages: 1,
                expected: 2
            }
        ));
    }

    #[test]
    fn test_resolve_forms() {
        let store = store();
        assert_eq!(store.resolve("[0/2] Initial"), Some(0));
        assert_eq!(store.resolve("--canon"), Some(1));
        assert_eq!(store.resolve("--canon "), Some(2));
        assert_eq!(store.resolve("[2/2] canon"), Some(2));
        assert_eq!(store.resolve("[2/3] canon"), None);
        assert_eq!(store.resolve("[3/2] canon"), None);
        assert_eq!(store.resolve("--cse"), None);
    }

    #[test]
    fn test_option_labels() {
        let store = store();
        assert_eq!(
            store.option_labels(true),
            vec!["[0/2] Initial", "[1/2] canon", "[2/2] canon"]
        );
        assert_eq!(store.option_labels(false).len(), 2);
    }

    #[test]
    fn test_initial_only() {
        let store = StageStore::initial_only("module {}");
        assert_eq!(store.pass_count(), 0);
        assert_eq!(store.initial_text(), "module {}");
        assert!(store.option_labels(false).is_empty());
    }

    #[test]
    fn test_json_and_yaml_decode() {
        let json = r#"{"passes": ["cse"], "stages": ["a", "b"]}"#;
        let from_json = StageStore::from_json(json).unwrap();
        let yaml = "passes: [cse]\nstages: [a, b]\n";
        let from_yaml = StageStore::from_yaml(yaml).unwrap();
        assert_eq!(from_json, from_yaml);
        assert_eq!(from_json.to_result().stages, vec!["a", "b"]);
    }
}
