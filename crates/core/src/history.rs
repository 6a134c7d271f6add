use crate::domain::location::{Bedrooms, Zip};
use crate::domain::rent::{RentQuoteResult, RentSource};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const GLOBAL_PARTITION: &str = "LOOKUP";

/// One resolved quote as written to the lookup logs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LookupRecord {
    pub zip: Zip,
    pub bedrooms: Bedrooms,
    pub rent: f64,
    pub source: RentSource,
    pub area_name: Option<String>,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PartitionKeys {
    pub global: String,
    pub by_zip: String,
    pub sort_key: String,
}

impl LookupRecord {
    pub fn from_quote(quote: &RentQuoteResult, timestamp: DateTime<Utc>) -> Self {
        Self {
            zip: quote.zip.clone(),
            bedrooms: quote.bedrooms,
            rent: quote.rent,
            source: quote.source,
            area_name: quote.area_name.clone(),
            timestamp,
        }
    }

    pub fn partition_keys(&self) -> PartitionKeys {
        PartitionKeys {
            global: GLOBAL_PARTITION.to_string(),
            by_zip: zip_partition(&self.zip),
            sort_key: self.timestamp.to_rfc3339(),
        }
    }
}

pub fn zip_partition(zip: &Zip) -> String {
    format!("ZIP#{zip}")
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BedroomRentStats {
    pub bedrooms: Bedrooms,
    pub latest_rent: f64,
    /// Mean rounded to whole dollars.
    pub avg_rent: f64,
    pub samples: usize,
}

/// Per-bedroom summary of newest-first records, ascending by bedroom count.
pub fn zip_rent_stats<'a>(
    records: impl IntoIterator<Item = &'a LookupRecord>,
) -> Vec<BedroomRentStats> {
    let mut by_beds: BTreeMap<Bedrooms, Vec<f64>> = BTreeMap::new();
    for r in records {
        by_beds.entry(r.bedrooms).or_default().push(r.rent);
    }

    by_beds
        .into_iter()
        .map(|(bedrooms, rents)| {
            let sum: f64 = rents.iter().sum();
            BedroomRentStats {
                bedrooms,
                latest_rent: rents[0],
                avg_rent: (sum / rents.len() as f64).round(),
                samples: rents.len(),
            }
        })
        .collect()
}
