// Theme and Taxonomy — the structured output of one extraction run.
//
// A taxonomy is immutable once built: classification reads it, the
// repository persists it, and reloading a project replaces it wholesale.
// Insertion order is discovery order, which doubles as the deterministic
// tie-break order for classification.

use serde::{Deserialize, Serialize};

use crate::params::ExtractionMethod;

/// A named cluster of semantically related keywords.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Theme {
    pub name: String,
    /// Keywords ranked by relevance, highest first. Never empty.
    pub keywords: Vec<String>,
    /// Assigned by the project repository on save; None until persisted.
    pub id: Option<i64>,
}

impl Theme {
    pub fn new(name: &str, keywords: Vec<String>) -> Self {
        debug_assert!(!keywords.is_empty(), "theme '{name}' has no keywords");
        Self {
            name: name.to_string(),
            keywords,
            id: None,
        }
    }
}

/// The full set of themes discovered in one analysis run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Taxonomy {
    themes: Vec<Theme>,
    pub method: ExtractionMethod,
    /// Number of records the extraction ran over
    pub record_count: u32,
}

impl Taxonomy {
    pub fn new(method: ExtractionMethod, record_count: u32) -> Self {
        Self {
            themes: Vec::new(),
            method,
            record_count,
        }
    }

    /// Append a theme. Names are unique within a taxonomy; the extraction
    /// dispatcher enforces that before pushing.
    pub fn push(&mut self, theme: Theme) {
        debug_assert!(
            self.get(&theme.name).is_none(),
            "duplicate theme name '{}'",
            theme.name
        );
        self.themes.push(theme);
    }

    pub fn themes(&self) -> &[Theme] {
        &self.themes
    }

    pub fn get(&self, name: &str) -> Option<&Theme> {
        self.themes.iter().find(|t| t.name == name)
    }

    /// Discovery-order position of a theme, used for stable tie-breaking.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.themes.iter().position(|t| t.name == name)
    }

    pub fn names(&self) -> Vec<&str> {
        self.themes.iter().map(|t| t.name.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.themes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.themes.is_empty()
    }

    /// Attach repository-assigned ids after a save.
    pub fn set_ids(&mut self, ids: &std::collections::HashMap<String, i64>) {
        for theme in &mut self.themes {
            theme.id = ids.get(&theme.name).copied();
        }
    }
}
