use crate::domain::location::Bedrooms;
use thiserror::Error;

/// Input rejected before any lookup or computation runs.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("zip must be 5 digits (got {0:?})")]
    Zip(String),
    #[error("bedrooms must be 0-4 (got {0})")]
    Bedrooms(i64),
    #[error("compare needs 2 to 4 deals (got {0})")]
    ComparisonSize(usize),
}

#[derive(Error, Debug)]
pub enum RentLookupError {
    #[error("HUD lookup failed during {stage}: {source:#}")]
    Upstream {
        stage: &'static str,
        #[source]
        source: anyhow::Error,
    },
    #[error("no rent found for zip {zip} ({bedrooms} bedrooms)")]
    NotFound { zip: String, bedrooms: Bedrooms },
}

impl RentLookupError {
    pub fn upstream(stage: &'static str, source: anyhow::Error) -> Self {
        Self::Upstream { stage, source }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}
