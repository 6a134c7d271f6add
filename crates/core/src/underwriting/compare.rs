use crate::domain::deal::Deal;
use crate::error::ValidationError;
use crate::underwriting::{evaluate, Metrics};
use serde::Serialize;
use std::ops::RangeInclusive;

pub const COMPARE_DEALS: RangeInclusive<usize> = 2..=4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum RowFormat {
    Money,
    Percent,
    Ratio,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareMetric {
    Purchase,
    Rehab,
    TotalCost,
    MonthlyRent,
    NoiAnnual,
    CapRate,
    DebtServiceMonthly,
    CashflowMonthly,
    Arv,
    Equity,
    Roi,
    Dscr,
}

impl CompareMetric {
    pub const ROWS: [CompareMetric; 12] = [
        CompareMetric::Purchase,
        CompareMetric::Rehab,
        CompareMetric::TotalCost,
        CompareMetric::MonthlyRent,
        CompareMetric::NoiAnnual,
        CompareMetric::CapRate,
        CompareMetric::DebtServiceMonthly,
        CompareMetric::CashflowMonthly,
        CompareMetric::Arv,
        CompareMetric::Equity,
        CompareMetric::Roi,
        CompareMetric::Dscr,
    ];

    pub fn label(self) -> &'static str {
        match self {
            CompareMetric::Purchase => "Purchase",
            CompareMetric::Rehab => "Rehab",
            CompareMetric::TotalCost => "Total Cost",
            CompareMetric::MonthlyRent => "HUD Rent (mo)",
            CompareMetric::NoiAnnual => "NOI (annual)",
            CompareMetric::CapRate => "Cap Rate",
            CompareMetric::DebtServiceMonthly => "Debt Service (mo)",
            CompareMetric::CashflowMonthly => "Cashflow (mo)",
            CompareMetric::Arv => "ARV",
            CompareMetric::Equity => "Equity",
            CompareMetric::Roi => "ROI",
            CompareMetric::Dscr => "DSCR",
        }
    }

    pub fn format(self) -> RowFormat {
        match self {
            CompareMetric::CapRate | CompareMetric::Roi => RowFormat::Percent,
            CompareMetric::Dscr => RowFormat::Ratio,
            _ => RowFormat::Money,
        }
    }

    pub fn value(self, m: &Metrics) -> Option<f64> {
        Some(match self {
            CompareMetric::Purchase => m.purchase_price,
            CompareMetric::Rehab => m.rehab_cost,
            CompareMetric::TotalCost => m.total_cost,
            CompareMetric::MonthlyRent => m.monthly_rent,
            CompareMetric::NoiAnnual => m.noi_annual,
            CompareMetric::CapRate => m.cap_rate,
            CompareMetric::DebtServiceMonthly => m.debt_service_monthly,
            CompareMetric::CashflowMonthly => m.cashflow_monthly,
            CompareMetric::Arv => m.arv,
            CompareMetric::Equity => m.equity,
            CompareMetric::Roi => m.roi,
            CompareMetric::Dscr => return m.dscr,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonRow {
    pub label: &'static str,
    pub format: RowFormat,
    pub values: Vec<Option<f64>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Comparison {
    pub metrics: Vec<Metrics>,
    pub rows: Vec<ComparisonRow>,
}

impl Comparison {
    /// Index of the deal with the highest value; earlier deals win ties and `None` ranks last.
    pub fn best_by(&self, metric: CompareMetric) -> Option<usize> {
        let mut best: Option<(usize, f64)> = None;
        for (idx, m) in self.metrics.iter().enumerate() {
            let Some(v) = metric.value(m) else {
                continue;
            };
            match best {
                Some((_, b)) if v <= b => {}
                _ => best = Some((idx, v)),
            }
        }
        best.map(|(idx, _)| idx)
    }
}

pub fn compare_deals(deals: &[Deal]) -> Result<Comparison, ValidationError> {
    if !COMPARE_DEALS.contains(&deals.len()) {
        return Err(ValidationError::ComparisonSize(deals.len()));
    }

    let metrics: Vec<Metrics> = deals.iter().map(evaluate).collect();
    let rows = CompareMetric::ROWS
        .iter()
        .map(|metric| ComparisonRow {
            label: metric.label(),
            format: metric.format(),
            values: metrics.iter().map(|m| metric.value(m)).collect(),
        })
        .collect();

    Ok(Comparison { metrics, rows })
}
