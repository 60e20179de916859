// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Disease catalog: healthy classes, advisory registry and fallback class names
//!
//! The catalog is static configuration data handed to the diagnosis layer.
//! A default catalog is embedded in the binary; deployments can point
//! `DISEASE_CATALOG_PATH` at their own TOML file with the same layout.

use serde::Deserialize;
use serde_json::{Map, Value};
use std::collections::{BTreeMap, HashSet};
use std::path::Path;
use thiserror::Error;
use tracing::info;

use crate::vision::ClassNames;

/// Advisory payload attached to disease detections (opaque key/value map)
pub type Advice = Map<String, Value>;

const BUILTIN_CATALOG: &str = include_str!("../../data/disease_catalog.toml");

/// Substring (case-insensitive) marking a label as not a disease
const NON_DISEASE_MARKER: &str = "non";

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Failed to read catalog {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid catalog TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid class index '{0}' in class_names")]
    InvalidClassIndex(String),
}

#[derive(Debug, Deserialize)]
struct CatalogFile {
    #[serde(default)]
    healthy_classes: Vec<String>,
    #[serde(default)]
    class_names: BTreeMap<String, String>,
    #[serde(default)]
    advice: BTreeMap<String, Advice>,
}

/// Static disease knowledge used to classify labels and attach advice
#[derive(Debug, Clone, Default)]
pub struct DiseaseCatalog {
    healthy: HashSet<String>,
    advice: BTreeMap<String, Advice>,
    class_names: ClassNames,
}

impl DiseaseCatalog {
    pub fn new(
        healthy: impl IntoIterator<Item = String>,
        advice: BTreeMap<String, Advice>,
        class_names: ClassNames,
    ) -> Self {
        Self {
            healthy: healthy.into_iter().collect(),
            advice,
            class_names,
        }
    }

    /// Catalog embedded at build time
    pub fn builtin() -> Result<Self, CatalogError> {
        Self::from_toml_str(BUILTIN_CATALOG)
    }

    /// Load a catalog from a TOML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let catalog = Self::from_toml_str(&text)?;
        info!(
            "Loaded disease catalog from {} ({} advisories, {} healthy classes)",
            path.display(),
            catalog.advice.len(),
            catalog.healthy.len()
        );
        Ok(catalog)
    }

    pub fn from_toml_str(text: &str) -> Result<Self, CatalogError> {
        let file: CatalogFile = toml::from_str(text)?;

        let class_names = file
            .class_names
            .into_iter()
            .map(|(index, label)| {
                index
                    .trim()
                    .parse::<u32>()
                    .map(|i| (i, label))
                    .map_err(|_| CatalogError::InvalidClassIndex(index))
            })
            .collect::<Result<ClassNames, _>>()?;

        Ok(Self::new(file.healthy_classes, file.advice, class_names))
    }

    /// Whether a label denotes a disease
    ///
    /// False for labels in the healthy set (exact match) and for any label
    /// containing "non" in any letter case.
    pub fn is_disease(&self, label: &str) -> bool {
        !self.healthy.contains(label) && !label.to_lowercase().contains(NON_DISEASE_MARKER)
    }

    /// Registered advisory for a label, if any
    pub fn advice_for(&self, label: &str) -> Option<&Advice> {
        self.advice.get(label)
    }

    /// Labels that have an advisory entry, sorted
    pub fn advice_keys(&self) -> Vec<String> {
        self.advice.keys().cloned().collect()
    }

    /// Fallback class table for models without class metadata
    pub fn class_names(&self) -> &ClassNames {
        &self.class_names
    }
}
