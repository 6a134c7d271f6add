use crate::domain::location::Bedrooms;
use serde::{Deserialize, Serialize};

/// Investor-entered deal facts. Numeric fields tolerate missing, null, and malformed input,
/// all of which read as 0.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Deal {
    #[serde(deserialize_with = "coerce::text")]
    pub zip: Option<String>,
    #[serde(deserialize_with = "coerce::bedrooms")]
    pub bedrooms: Option<Bedrooms>,
    #[serde(deserialize_with = "coerce::number")]
    pub purchase_price: f64,
    #[serde(deserialize_with = "coerce::number")]
    pub rehab_cost: f64,
    #[serde(deserialize_with = "coerce::number")]
    pub arv: f64,
    #[serde(deserialize_with = "coerce::number")]
    pub hud_rent: f64,
    #[serde(deserialize_with = "coerce::record")]
    pub assumptions: Option<Assumptions>,
    #[serde(deserialize_with = "coerce::record")]
    pub loan: Option<Loan>,
}

/// Percentages are 0-100 of annual gross rent; fixed costs are monthly.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Assumptions {
    #[serde(deserialize_with = "coerce::number")]
    pub vacancy_pct: f64,
    #[serde(deserialize_with = "coerce::number")]
    pub repairs_pct: f64,
    #[serde(deserialize_with = "coerce::number")]
    pub management_pct: f64,
    #[serde(deserialize_with = "coerce::number")]
    pub capex_pct: f64,
    #[serde(deserialize_with = "coerce::number")]
    pub taxes_monthly: f64,
    #[serde(deserialize_with = "coerce::number")]
    pub insurance_monthly: f64,
    #[serde(deserialize_with = "coerce::number")]
    pub hoa_monthly: f64,
    #[serde(deserialize_with = "coerce::number")]
    pub debt_service_monthly: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Loan {
    #[serde(deserialize_with = "coerce::number")]
    pub down_pct: f64,
    /// Nominal annual rate, percent.
    #[serde(deserialize_with = "coerce::number")]
    pub rate_pct: f64,
    #[serde(deserialize_with = "coerce::number")]
    pub term_years: f64,
    #[serde(deserialize_with = "coerce::flag")]
    pub include_rehab_in_loan: bool,
    /// Used as the loan amount when > 0.
    #[serde(deserialize_with = "coerce::number")]
    pub loan_amount_override: f64,
}

pub(crate) mod coerce {
    use crate::domain::location::Bedrooms;
    use serde::de::DeserializeOwned;
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;

    pub fn finite_or_zero(v: f64) -> f64 {
        if v.is_finite() {
            v
        } else {
            0.0
        }
    }

    pub fn value_to_number(v: &Value) -> Option<f64> {
        let n = match v {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        };
        n.filter(|n| n.is_finite())
    }

    pub fn number<'de, D: Deserializer<'de>>(d: D) -> Result<f64, D::Error> {
        let v = Value::deserialize(d)?;
        Ok(value_to_number(&v).unwrap_or(0.0))
    }

    pub fn flag<'de, D: Deserializer<'de>>(d: D) -> Result<bool, D::Error> {
        let v = Value::deserialize(d)?;
        Ok(match v {
            Value::Bool(b) => b,
            Value::String(s) => s.trim().eq_ignore_ascii_case("true"),
            other => value_to_number(&other).is_some_and(|n| n != 0.0),
        })
    }

    pub fn text<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
        let v = Value::deserialize(d)?;
        Ok(match v {
            Value::String(s) => Some(s.trim().to_string()).filter(|s| !s.is_empty()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        })
    }

    pub fn bedrooms<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Bedrooms>, D::Error> {
        let v = Value::deserialize(d)?;
        Ok(value_to_number(&v)
            .filter(|n| n.fract() == 0.0)
            .and_then(|n| Bedrooms::try_from(n as i64).ok()))
    }

    /// Non-object values read as absent rather than failing the whole deal.
    pub fn record<'de, D, T>(d: D) -> Result<Option<T>, D::Error>
    where
        D: Deserializer<'de>,
        T: DeserializeOwned,
    {
        let v = Value::deserialize(d)?;
        if !v.is_object() {
            return Ok(None);
        }
        Ok(serde_json::from_value(v).ok())
    }
}
