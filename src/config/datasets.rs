//! Dataset profiles.
//!
//! ANAC publishes private and public aerodromes as separate CSV files with no
//! ownership column. A profile recognizes such a file by its name and supplies
//! the ownership text the records themselves lack.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::normalize::text::normalize_name;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetProfile {
    pub key: String,
    pub label: String,
    /// Matched against the normalized file stem (substring).
    #[serde(default)]
    pub filename_hints: Vec<String>,
    /// Ownership text used when a record has none of its own.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ownership: Option<String>,
}

impl DatasetProfile {
    pub fn matches_path(&self, path: &Path) -> bool {
        let stem = path
            .file_stem()
            .map(|s| normalize_name(&s.to_string_lossy()))
            .unwrap_or_default();
        if stem.is_empty() {
            return false;
        }
        self.filename_hints
            .iter()
            .map(|h| normalize_name(h))
            .any(|h| !h.is_empty() && stem.contains(&h))
    }
}

pub fn builtin_profiles() -> Vec<DatasetProfile> {
    vec![
        DatasetProfile {
            key: "privados".to_string(),
            label: "Aeródromos Privados".to_string(),
            filename_hints: vec!["AerodromosPrivados".to_string(), "Privados".to_string()],
            ownership: Some("Privado".to_string()),
        },
        DatasetProfile {
            key: "publicos".to_string(),
            label: "Aeródromos Públicos".to_string(),
            filename_hints: vec!["AerodromosPublicos".to_string(), "Publicos".to_string()],
            ownership: Some("Público".to_string()),
        },
    ]
}

/// First profile whose hints match the file name.
pub fn match_profile<'a>(profiles: &'a [DatasetProfile], path: &Path) -> Option<&'a DatasetProfile> {
    profiles.iter().find(|p| p.matches_path(path))
}
