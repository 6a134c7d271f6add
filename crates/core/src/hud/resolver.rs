use crate::domain::location::{Bedrooms, RentQuery, Zip};
use crate::domain::rent::{GeoCandidate, GeoKind, RentQuoteResult, RentSource, RentTable};
use crate::error::RentLookupError;
use crate::hud::HudDataSource;
use std::sync::Arc;

/// One step of the rent cascade.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RentTier {
    /// CBSA schedule: SAFMR when the metro publishes ZIP rows, otherwise the metro FMR.
    Metro,
    County,
}

impl RentTier {
    pub const CASCADE: [RentTier; 2] = [RentTier::Metro, RentTier::County];

    fn name(self) -> &'static str {
        match self {
            RentTier::Metro => "metro",
            RentTier::County => "county",
        }
    }
}

/// Stateless; safe to share across concurrent requests.
#[derive(Clone)]
pub struct RentResolver {
    source: Arc<dyn HudDataSource>,
}

impl RentResolver {
    pub fn new(source: Arc<dyn HudDataSource>) -> Self {
        Self { source }
    }

    pub async fn resolve(&self, query: &RentQuery) -> Result<RentQuoteResult, RentLookupError> {
        for tier in RentTier::CASCADE {
            if let Some(quote) = self.resolve_tier(tier, query).await? {
                tracing::info!(
                    zip = %query.zip,
                    bedrooms = %query.bedrooms,
                    rent = quote.rent,
                    source = %quote.source,
                    lookup_source = self.source.source_name(),
                    "resolved HUD rent"
                );
                return Ok(quote);
            }
        }

        Err(RentLookupError::NotFound {
            zip: query.zip.to_string(),
            bedrooms: query.bedrooms,
        })
    }

    /// `Ok(None)` hands the query to the next tier.
    pub async fn resolve_tier(
        &self,
        tier: RentTier,
        query: &RentQuery,
    ) -> Result<Option<RentQuoteResult>, RentLookupError> {
        tracing::debug!(
            zip = %query.zip,
            bedrooms = %query.bedrooms,
            tier = tier.name(),
            "trying rent tier"
        );
        match tier {
            RentTier::Metro => self.metro(&query.zip, query.bedrooms).await,
            RentTier::County => self.county(&query.zip, query.bedrooms).await,
        }
    }

    async fn metro(
        &self,
        zip: &Zip,
        bedrooms: Bedrooms,
    ) -> Result<Option<RentQuoteResult>, RentLookupError> {
        let candidates = self
            .source
            .lookup_geography(zip, GeoKind::Metro)
            .await
            .map_err(|e| RentLookupError::upstream("metro crosswalk lookup", e))?;
        let Some(best) = GeoCandidate::select_best(&candidates) else {
            tracing::debug!(%zip, "no metro geography for zip");
            return Ok(None);
        };

        let entity_id = GeoKind::Metro.entity_id(&best.geo_id);
        // Schedule failures hand the query to the county tier.
        let schedule = match self.source.lookup_rent_schedule(&entity_id).await {
            Ok(schedule) => schedule,
            Err(err) => {
                let detail = format!("{err:#}");
                tracing::warn!(
                    %zip,
                    %entity_id,
                    error = %detail,
                    "metro rent schedule lookup failed; falling back to county"
                );
                return Ok(None);
            }
        };

        // A small-area flag without ZIP rows still reads the metro summary record.
        let (source, rent) = match &schedule.table {
            RentTable::ByZip(_) if schedule.small_area_active => (
                RentSource::Safmr,
                schedule
                    .table
                    .small_area_row(zip)
                    .and_then(|row| row.rents.get(bedrooms)),
            ),
            table => (RentSource::FmrMetro, table.flat_rent(bedrooms)),
        };

        tracing::debug!(%zip, %entity_id, %source, ?rent, "metro rent schedule read");
        Ok(positive(rent).map(|rent| RentQuoteResult {
            zip: zip.clone(),
            bedrooms,
            rent,
            source,
            area_name: schedule.area_name,
        }))
    }

    async fn county(
        &self,
        zip: &Zip,
        bedrooms: Bedrooms,
    ) -> Result<Option<RentQuoteResult>, RentLookupError> {
        let candidates = self
            .source
            .lookup_geography(zip, GeoKind::County)
            .await
            .map_err(|e| RentLookupError::upstream("county crosswalk lookup", e))?;
        let Some(best) = GeoCandidate::select_best(&candidates) else {
            return Err(RentLookupError::NotFound {
                zip: zip.to_string(),
                bedrooms,
            });
        };

        let entity_id = GeoKind::County.entity_id(&best.geo_id);
        let schedule = self
            .source
            .lookup_rent_schedule(&entity_id)
            .await
            .map_err(|e| RentLookupError::upstream("county rent schedule lookup", e))?;

        let rent = schedule.table.flat_rent(bedrooms);
        tracing::debug!(%zip, %entity_id, ?rent, "county rent schedule read");
        Ok(positive(rent).map(|rent| RentQuoteResult {
            zip: zip.clone(),
            bedrooms,
            rent,
            source: RentSource::FmrCounty,
            area_name: schedule.area_name,
        }))
    }
}

fn positive(rent: Option<f64>) -> Option<f64> {
    rent.filter(|r| r.is_finite() && *r > 0.0)
}
