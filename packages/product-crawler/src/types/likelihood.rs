use serde::{Deserialize, Serialize};
use std::fmt;

/// Extraction is only attempted above this score.
pub const EXTRACTION_THRESHOLD: u8 = 51;

/// Markup convention a product page was detected through, in decreasing trust.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceType {
    OpenGraph,
    JsonLdProduct,
    GenericJson,
    Unknown,
}

impl fmt::Display for SourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::OpenGraph => "og",
            Self::JsonLdProduct => "application/ld+json",
            Self::GenericJson => "application/json",
            Self::Unknown => "unknown",
        };
        f.write_str(name)
    }
}

/// Heuristic product score (0..=100) for one rendered page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductLikelihood {
    pub score: u8,
    pub source_type: SourceType,
}

impl ProductLikelihood {
    pub fn certain(source_type: SourceType) -> Self {
        Self {
            score: 100,
            source_type,
        }
    }

    pub fn unknown() -> Self {
        Self {
            score: 0,
            source_type: SourceType::Unknown,
        }
    }

    pub fn should_extract(&self) -> bool {
        self.score > EXTRACTION_THRESHOLD
    }
}

impl Default for ProductLikelihood {
    fn default() -> Self {
        Self::unknown()
    }
}
