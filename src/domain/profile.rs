//! Build profile selection.

use serde::{Deserialize, Serialize};

/// Which generator configuration a build uses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BuildProfile {
    /// Local preview: relative URLs, no feeds, no analytics
    Development,
    /// Publishable site: absolute URLs, feeds, analytics
    Production,
}

impl BuildProfile {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Development => "development",
            Self::Production => "production",
        }
    }
}

impl std::fmt::Display for BuildProfile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}
