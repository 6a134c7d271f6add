pub mod client;
pub mod resolver;

use crate::domain::location::Zip;
use crate::domain::rent::{GeoCandidate, GeoKind, RentSchedule};
use anyhow::Result;

/// ZIP crosswalk and rent schedule lookups backing the rent cascade.
#[async_trait::async_trait]
pub trait HudDataSource: Send + Sync {
    fn source_name(&self) -> &'static str;

    async fn lookup_geography(&self, zip: &Zip, kind: GeoKind) -> Result<Vec<GeoCandidate>>;

    async fn lookup_rent_schedule(&self, entity_id: &str) -> Result<RentSchedule>;
}
