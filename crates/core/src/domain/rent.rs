use crate::domain::location::{Bedrooms, Zip};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Geography granularity requested from the ZIP crosswalk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GeoKind {
    Metro,
    County,
}

impl GeoKind {
    /// Entity id the rent schedule feed expects for a geography id of this kind.
    pub fn entity_id(self, geo_id: &str) -> String {
        match self {
            GeoKind::Metro => format!("METRO{geo_id}M{geo_id}"),
            GeoKind::County => format!("{geo_id}99999"),
        }
    }
}

impl fmt::Display for GeoKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GeoKind::Metro => f.write_str("metro"),
            GeoKind::County => f.write_str("county"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeoCandidate {
    pub geo_id: String,
    pub match_confidence: f64,
}

impl GeoCandidate {
    /// Highest `match_confidence` wins; ties keep the first candidate seen.
    /// NaN confidences rank as 0.
    pub fn select_best(candidates: &[GeoCandidate]) -> Option<&GeoCandidate> {
        let score = |c: &GeoCandidate| {
            if c.match_confidence.is_nan() {
                0.0
            } else {
                c.match_confidence
            }
        };

        let mut best: Option<&GeoCandidate> = None;
        for c in candidates {
            match best {
                Some(b) if score(c) <= score(b) => {}
                _ => best = Some(c),
            }
        }
        best
    }
}

/// Per-bedroom rents from one schedule row. `None` means missing or non-numeric upstream.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BedroomRents([Option<f64>; 5]);

impl BedroomRents {
    pub fn get(&self, bedrooms: Bedrooms) -> Option<f64> {
        self.0[bedrooms.count() as usize]
    }

    pub fn set(&mut self, bedrooms: Bedrooms, rent: Option<f64>) {
        self.0[bedrooms.count() as usize] = rent.filter(|v| v.is_finite());
    }

    pub fn from_fn(mut f: impl FnMut(Bedrooms) -> Option<f64>) -> Self {
        let mut out = Self::default();
        for b in Bedrooms::ALL {
            out.set(b, f(b));
        }
        out
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ZipRentRow {
    /// Usually a ZIP; the metro-wide default row carries an "MSA" marker here instead.
    pub zip_code: String,
    pub rents: BedroomRents,
}

impl ZipRentRow {
    // Upstream encodes the metro-wide row by putting "MSA" in the zip column. Unverified
    // against every feed revision; keep the check narrow.
    pub fn is_msa_default(&self) -> bool {
        self.zip_code.to_ascii_lowercase().contains("msa")
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RentTable {
    Flat(BedroomRents),
    ByZip(Vec<ZipRentRow>),
    Missing,
}

impl RentTable {
    pub fn flat_rent(&self, bedrooms: Bedrooms) -> Option<f64> {
        match self {
            RentTable::Flat(rents) => rents.get(bedrooms),
            _ => None,
        }
    }

    /// Exact ZIP row first, then the metro-wide default row.
    pub fn small_area_row(&self, zip: &Zip) -> Option<&ZipRentRow> {
        let RentTable::ByZip(rows) = self else {
            return None;
        };
        rows.iter()
            .find(|r| r.zip_code.trim() == zip.as_str())
            .or_else(|| rows.iter().find(|r| r.is_msa_default()))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RentSchedule {
    pub area_name: Option<String>,
    pub small_area_active: bool,
    pub table: RentTable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RentSource {
    #[serde(rename = "SAFMR")]
    Safmr,
    #[serde(rename = "FMR_METRO")]
    FmrMetro,
    #[serde(rename = "FMR_COUNTY")]
    FmrCounty,
}

impl RentSource {
    pub fn as_str(self) -> &'static str {
        match self {
            RentSource::Safmr => "SAFMR",
            RentSource::FmrMetro => "FMR_METRO",
            RentSource::FmrCounty => "FMR_COUNTY",
        }
    }
}

impl fmt::Display for RentSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RentQuoteResult {
    pub zip: Zip,
    pub bedrooms: Bedrooms,
    pub rent: f64,
    pub source: RentSource,
    pub area_name: Option<String>,
}
