use crate::config::Settings;
use crate::domain::deal::coerce::value_to_number;
use crate::domain::location::Zip;
use crate::domain::rent::{
    BedroomRents, GeoCandidate, GeoKind, RentSchedule, RentTable, ZipRentRow,
};
use crate::hud::HudDataSource;
use anyhow::{Context, Result};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};
use serde_json::Value;
use std::time::Duration;

const USPS_PATH: &str = "/usps";
const FMR_DATA_PATH: &str = "/fmr/data";

// Crosswalk `type` values for ZIP -> CBSA and ZIP -> county.
const USPS_TYPE_METRO: &str = "3";
const USPS_TYPE_COUNTY: &str = "2";

/// HUD USER API client. No retries; callers decide whether to re-issue a lookup.
#[derive(Debug, Clone)]
pub struct HudUserClient {
    http: reqwest::Client,
    base_url: String,
    token: String,
}

impl HudUserClient {
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let token = settings.require_hud_token()?.to_string();

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.hud_timeout_secs))
            .build()
            .context("failed to build HUD http client")?;

        Ok(Self {
            http,
            base_url: settings.hud_api_base_url.clone(),
            token,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }

    fn headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", self.token))
                .context("HUDUSER_TOKEN is not a valid header value")?,
        );
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        Ok(headers)
    }

    async fn get_json(&self, url: String, query: &[(&str, &str)]) -> Result<Value> {
        let res = self
            .http
            .get(&url)
            .headers(self.headers()?)
            .query(query)
            .send()
            .await
            .with_context(|| format!("HUD request failed: {url}"))?;

        let status = res.status();
        let text = res
            .text()
            .await
            .context("failed to read HUD response")?;
        if !status.is_success() {
            anyhow::bail!("HUD API HTTP {status}: {text}");
        }

        serde_json::from_str::<Value>(&text)
            .with_context(|| format!("HUD response is not valid JSON: {text}"))
    }
}

#[async_trait::async_trait]
impl HudDataSource for HudUserClient {
    fn source_name(&self) -> &'static str {
        "huduser"
    }

    async fn lookup_geography(&self, zip: &Zip, kind: GeoKind) -> Result<Vec<GeoCandidate>> {
        let kind_param = match kind {
            GeoKind::Metro => USPS_TYPE_METRO,
            GeoKind::County => USPS_TYPE_COUNTY,
        };
        let body = self
            .get_json(
                self.url(USPS_PATH),
                &[("type", kind_param), ("query", zip.as_str())],
            )
            .await?;

        let candidates = parse_geo_candidates(&body);
        tracing::debug!(%zip, %kind, candidates = candidates.len(), "HUD crosswalk lookup");
        Ok(candidates)
    }

    async fn lookup_rent_schedule(&self, entity_id: &str) -> Result<RentSchedule> {
        let url = self.url(&format!("{FMR_DATA_PATH}/{entity_id}"));
        let body = self.get_json(url, &[]).await?;
        Ok(parse_rent_schedule(&body))
    }
}

/// Reads `data.results`, or `data[0].results` for the array-wrapped variant.
pub fn parse_geo_candidates(body: &Value) -> Vec<GeoCandidate> {
    let data = &body["data"];
    let results = match data.get("results") {
        Some(r) => r,
        None => &data[0]["results"],
    };
    let Some(rows) = results.as_array() else {
        return Vec::new();
    };

    rows.iter()
        .filter_map(|row| {
            let geo_id = match &row["geoid"] {
                Value::String(s) if !s.trim().is_empty() => s.trim().to_string(),
                Value::Number(n) => n.to_string(),
                _ => return None,
            };
            Some(GeoCandidate {
                geo_id,
                match_confidence: value_to_number(&row["res_ratio"]).unwrap_or(0.0),
            })
        })
        .collect()
}

pub fn parse_rent_schedule(body: &Value) -> RentSchedule {
    let data = &body["data"];

    let area_name = ["area_name", "metro_name", "county_name"]
        .iter()
        .find_map(|k| data[*k].as_str())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string);

    let small_area_active = match &data["smallarea_status"] {
        Value::String(s) => s.trim() == "1",
        Value::Number(n) => n.as_f64() == Some(1.0),
        _ => false,
    };

    let table = match &data["basicdata"] {
        Value::Object(_) => RentTable::Flat(parse_bedroom_rents(&data["basicdata"])),
        Value::Array(rows) => RentTable::ByZip(
            rows.iter()
                .map(|row| ZipRentRow {
                    zip_code: match &row["zip_code"] {
                        Value::String(s) => s.clone(),
                        Value::Number(n) => n.to_string(),
                        _ => String::new(),
                    },
                    rents: parse_bedroom_rents(row),
                })
                .collect(),
        ),
        _ => RentTable::Missing,
    };

    RentSchedule {
        area_name,
        small_area_active,
        table,
    }
}

fn parse_bedroom_rents(row: &Value) -> BedroomRents {
    BedroomRents::from_fn(|b| value_to_number(&row[b.field_name()]))
}
