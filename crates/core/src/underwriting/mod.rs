pub mod amortization;
pub mod compare;

use crate::domain::deal::coerce::finite_or_zero;
use crate::domain::deal::{Assumptions, Deal, Loan};
use serde::{Deserialize, Serialize};

/// Annual operating expenses, each derived from annual gross rent except `fixed`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpExBreakdown {
    pub vacancy: f64,
    pub repairs: f64,
    pub management: f64,
    pub capex: f64,
    /// Taxes, insurance and HOA, annualized.
    pub fixed: f64,
    pub total: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoanMetrics {
    pub loan_amount: f64,
    pub down_payment: f64,
    /// Computed principal and interest. Not fed into cash flow; see `debt_service_monthly`.
    pub monthly_payment: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Metrics {
    pub purchase_price: f64,
    pub rehab_cost: f64,
    pub total_cost: f64,
    pub monthly_rent: f64,
    pub annual_rent: f64,
    pub op_ex: OpExBreakdown,
    pub noi_annual: f64,
    pub noi_monthly: f64,
    pub cap_rate: f64,
    pub debt_service_monthly: f64,
    pub debt_service_annual: f64,
    pub cashflow_annual: f64,
    pub cashflow_monthly: f64,
    /// `None` when there is no debt service.
    pub dscr: Option<f64>,
    pub loan: LoanMetrics,
    pub arv: f64,
    pub equity: f64,
    pub roi: f64,
    pub one_percent_rule_pass: bool,
    pub rehab_pct: f64,
    pub rent_to_price_pct: f64,
    pub simple_roi_pct: f64,
}

/// Single-pass underwriting of a deal. Never fails; non-finite inputs and any derived value
/// that overflows read as 0.
pub fn evaluate(deal: &Deal) -> Metrics {
    let purchase_price = finite_or_zero(deal.purchase_price);
    let rehab_cost = finite_or_zero(deal.rehab_cost);
    let arv = finite_or_zero(deal.arv);
    let monthly_rent = finite_or_zero(deal.hud_rent);

    let total_cost = finite_or_zero(purchase_price + rehab_cost);
    let annual_rent = finite_or_zero(monthly_rent * 12.0);

    let assumptions = deal.assumptions.as_ref().map(sanitize_assumptions).unwrap_or_default();
    let op_ex = operating_expenses(annual_rent, &assumptions);

    let noi_annual = finite_or_zero(annual_rent - op_ex.total);
    let noi_monthly = noi_annual / 12.0;
    let cap_rate = pct_of(noi_annual, total_cost);

    let loan = match &deal.loan {
        Some(loan) => size_loan(&sanitize_loan(loan), purchase_price, total_cost),
        None => LoanMetrics::default(),
    };

    let debt_service_monthly = assumptions.debt_service_monthly;
    let debt_service_annual = finite_or_zero(debt_service_monthly * 12.0);
    let cashflow_annual = finite_or_zero(noi_annual - debt_service_annual);
    let cashflow_monthly = cashflow_annual / 12.0;
    let dscr = (debt_service_annual > 0.0).then(|| finite_or_zero(noi_annual / debt_service_annual));

    let equity = finite_or_zero(arv - total_cost);
    let roi = pct_of(equity, total_cost);

    Metrics {
        purchase_price,
        rehab_cost,
        total_cost,
        monthly_rent,
        annual_rent,
        op_ex,
        noi_annual,
        noi_monthly,
        cap_rate,
        debt_service_monthly,
        debt_service_annual,
        cashflow_annual,
        cashflow_monthly,
        dscr,
        loan,
        arv,
        equity,
        roi,
        one_percent_rule_pass: total_cost > 0.0 && monthly_rent / total_cost >= 0.01,
        rehab_pct: pct_of(rehab_cost, purchase_price),
        rent_to_price_pct: pct_of(monthly_rent, purchase_price),
        simple_roi_pct: pct_of(annual_rent, total_cost),
    }
}

fn operating_expenses(annual_rent: f64, a: &Assumptions) -> OpExBreakdown {
    let share = |pct: f64| finite_or_zero(annual_rent * pct / 100.0);
    let vacancy = share(a.vacancy_pct);
    let repairs = share(a.repairs_pct);
    let management = share(a.management_pct);
    let capex = share(a.capex_pct);
    let fixed = finite_or_zero((a.taxes_monthly + a.insurance_monthly + a.hoa_monthly) * 12.0);

    OpExBreakdown {
        vacancy,
        repairs,
        management,
        capex,
        fixed,
        total: finite_or_zero(vacancy + repairs + management + capex + fixed),
    }
}

fn size_loan(loan: &Loan, purchase_price: f64, total_cost: f64) -> LoanMetrics {
    let base = if loan.include_rehab_in_loan {
        total_cost
    } else {
        purchase_price
    };
    let down_payment = finite_or_zero(base * loan.down_pct / 100.0);
    let computed = finite_or_zero(base - down_payment).max(0.0);
    let loan_amount = if loan.loan_amount_override > 0.0 {
        loan.loan_amount_override
    } else {
        computed
    };

    LoanMetrics {
        loan_amount,
        down_payment,
        monthly_payment: amortization::monthly_payment(loan_amount, loan.rate_pct, loan.term_years),
    }
}

/// `numerator / denominator * 100`, or 0 when the denominator is not positive or the
/// result is not finite.
fn pct_of(numerator: f64, denominator: f64) -> f64 {
    if denominator > 0.0 {
        finite_or_zero(numerator / denominator * 100.0)
    } else {
        0.0
    }
}

fn sanitize_assumptions(a: &Assumptions) -> Assumptions {
    Assumptions {
        vacancy_pct: finite_or_zero(a.vacancy_pct),
        repairs_pct: finite_or_zero(a.repairs_pct),
        management_pct: finite_or_zero(a.management_pct),
        capex_pct: finite_or_zero(a.capex_pct),
        taxes_monthly: finite_or_zero(a.taxes_monthly),
        insurance_monthly: finite_or_zero(a.insurance_monthly),
        hoa_monthly: finite_or_zero(a.hoa_monthly),
        debt_service_monthly: finite_or_zero(a.debt_service_monthly),
    }
}

fn sanitize_loan(l: &Loan) -> Loan {
    Loan {
        down_pct: finite_or_zero(l.down_pct),
        rate_pct: finite_or_zero(l.rate_pct),
        term_years: finite_or_zero(l.term_years),
        include_rehab_in_loan: l.include_rehab_in_loan,
        loan_amount_override: finite_or_zero(l.loan_amount_override),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    // serde_json writes NaN and infinities as null, so a null anywhere but `dscr` is a leak.
    fn walk_numbers(path: &str, v: &serde_json::Value) {
        match v {
            serde_json::Value::Null => assert!(path.ends_with("dscr"), "{path} is not finite"),
            serde_json::Value::Number(n) => {
                let n = n.as_f64().unwrap();
                assert!(n.is_finite(), "{path} = {n}");
            }
            serde_json::Value::Object(map) => {
                for (k, x) in map {
                    walk_numbers(&format!("{path}.{k}"), x);
                }
            }
            _ => {}
        }
    }

    fn assert_all_finite(m: &Metrics) {
        walk_numbers("metrics", &serde_json::to_value(m).unwrap());
        for (name, n) in [
            ("vacancy", m.op_ex.vacancy),
            ("repairs", m.op_ex.repairs),
            ("management", m.op_ex.management),
            ("capex", m.op_ex.capex),
            ("fixed", m.op_ex.fixed),
            ("opEx", m.op_ex.total),
            ("loanAmount", m.loan.loan_amount),
            ("downPayment", m.loan.down_payment),
            ("monthlyPayment", m.loan.monthly_payment),
            ("noiAnnual", m.noi_annual),
            ("capRate", m.cap_rate),
            ("cashflowAnnual", m.cashflow_annual),
            ("roi", m.roi),
            ("simpleRoiPct", m.simple_roi_pct),
        ] {
            assert!(n.is_finite(), "{name} = {n}");
        }
        if let Some(d) = m.dscr {
            assert!(d.is_finite(), "dscr = {d}");
        }
    }

    fn scenario_deal() -> Deal {
        serde_json::from_value(json!({
            "zip": "39339",
            "bedrooms": 3,
            "purchasePrice": 80000,
            "rehabCost": 20000,
            "arv": 140000,
            "hudRent": 1100,
            "assumptions": {
                "vacancyPct": 8,
                "repairsPct": 8,
                "managementPct": 10,
                "capexPct": 5,
                "taxesMonthly": 100,
                "insuranceMonthly": 60,
                "hoaMonthly": 0,
                "debtServiceMonthly": 500
            }
        }))
        .unwrap()
    }

    #[test]
    fn end_to_end_scenario() {
        let m = evaluate(&scenario_deal());

        assert_eq!(m.total_cost, 100_000.0);
        assert_eq!(m.annual_rent, 13_200.0);
        assert!(close(m.op_ex.vacancy + m.op_ex.repairs + m.op_ex.management + m.op_ex.capex, 4092.0));
        assert_eq!(m.op_ex.fixed, 1920.0);
        assert!(close(m.op_ex.total, 6012.0));
        assert!(close(m.noi_annual, 7188.0));
        assert!(close(m.noi_monthly, 599.0));
        assert!(close(m.cap_rate, 7.188));
        assert_eq!(m.debt_service_annual, 6000.0);
        assert!(close(m.cashflow_annual, 1188.0));
        assert!(close(m.cashflow_monthly, 99.0));
        assert!(close(m.dscr.unwrap(), 1.198));
        assert_eq!(m.equity, 40_000.0);
        assert!(close(m.roi, 40.0));
        assert!(m.one_percent_rule_pass);
        assert!(close(m.rehab_pct, 25.0));
        assert!(close(m.rent_to_price_pct, 1.375));
        assert!(close(m.simple_roi_pct, 13.2));
        assert_eq!(m.loan, LoanMetrics::default());
    }

    #[test]
    fn evaluation_is_idempotent() {
        let mut deal = scenario_deal();
        deal.loan = Some(Loan {
            down_pct: 20.0,
            rate_pct: 7.25,
            term_years: 30.0,
            include_rehab_in_loan: true,
            loan_amount_override: 0.0,
        });
        let a = evaluate(&deal);
        let b = evaluate(&deal);
        assert_eq!(
            serde_json::to_string(&a).unwrap(),
            serde_json::to_string(&b).unwrap()
        );
        assert_eq!(a.noi_annual.to_bits(), b.noi_annual.to_bits());
        assert_eq!(a.loan.monthly_payment.to_bits(), b.loan.monthly_payment.to_bits());
    }

    #[test]
    fn zero_total_cost_yields_zero_ratios() {
        let deal = Deal {
            hud_rent: 900.0,
            arv: 50_000.0,
            ..Default::default()
        };
        let m = evaluate(&deal);
        assert_eq!(m.cap_rate, 0.0);
        assert_eq!(m.roi, 0.0);
        assert_eq!(m.simple_roi_pct, 0.0);
        assert_eq!(m.rehab_pct, 0.0);
        assert_eq!(m.rent_to_price_pct, 0.0);
        assert!(!m.one_percent_rule_pass);
    }

    #[test]
    fn dscr_is_none_without_debt_service_regardless_of_noi() {
        let mut deal = scenario_deal();
        deal.assumptions.as_mut().unwrap().debt_service_monthly = 0.0;
        assert_eq!(evaluate(&deal).dscr, None);

        // Expenses exceed rent, NOI negative.
        deal.assumptions.as_mut().unwrap().taxes_monthly = 5000.0;
        let m = evaluate(&deal);
        assert!(m.noi_annual < 0.0);
        assert_eq!(m.dscr, None);
    }

    #[test]
    fn missing_assumptions_mean_no_expenses() {
        let mut deal = scenario_deal();
        deal.assumptions = None;
        let m = evaluate(&deal);
        assert_eq!(m.op_ex, OpExBreakdown::default());
        assert_eq!(m.noi_annual, 13_200.0);
        assert_eq!(m.cashflow_annual, 13_200.0);
        assert_eq!(m.dscr, None);
    }

    #[test]
    fn loan_sizing_respects_rehab_flag_and_override() {
        let mut deal = scenario_deal();
        deal.loan = Some(Loan {
            down_pct: 25.0,
            rate_pct: 0.0,
            term_years: 30.0,
            include_rehab_in_loan: false,
            loan_amount_override: 0.0,
        });
        let m = evaluate(&deal);
        assert_eq!(m.loan.down_payment, 20_000.0);
        assert_eq!(m.loan.loan_amount, 60_000.0);
        assert!(close(m.loan.monthly_payment, 60_000.0 / 360.0));
        // P&I is reported but the assumption-supplied debt service drives cash flow.
        assert_eq!(m.debt_service_annual, 6000.0);

        deal.loan.as_mut().unwrap().include_rehab_in_loan = true;
        let m = evaluate(&deal);
        assert_eq!(m.loan.down_payment, 25_000.0);
        assert_eq!(m.loan.loan_amount, 75_000.0);

        deal.loan.as_mut().unwrap().loan_amount_override = 120_000.0;
        let m = evaluate(&deal);
        assert_eq!(m.loan.loan_amount, 120_000.0);
        assert!(close(m.loan.monthly_payment, 120_000.0 / 360.0));
    }

    #[test]
    fn down_payment_above_base_never_goes_negative() {
        let deal = Deal {
            purchase_price: 50_000.0,
            loan: Some(Loan {
                down_pct: 150.0,
                rate_pct: 6.0,
                term_years: 30.0,
                ..Default::default()
            }),
            ..Default::default()
        };
        let m = evaluate(&deal);
        assert_eq!(m.loan.loan_amount, 0.0);
        assert_eq!(m.loan.monthly_payment, 0.0);
    }

    #[test]
    fn non_finite_inputs_never_leak_nan() {
        let deal = Deal {
            purchase_price: f64::NAN,
            rehab_cost: f64::INFINITY,
            hud_rent: f64::NEG_INFINITY,
            assumptions: Some(Assumptions {
                vacancy_pct: f64::NAN,
                debt_service_monthly: f64::NAN,
                ..Default::default()
            }),
            ..Default::default()
        };
        let m = evaluate(&deal);
        assert_all_finite(&m);
        assert_eq!(m.total_cost, 0.0);
        assert_eq!(m.dscr, None);
    }

    #[test]
    fn overflowing_intermediates_read_as_zero() {
        let deal = Deal {
            hud_rent: 1e308,
            purchase_price: 1.0,
            assumptions: Some(Assumptions {
                vacancy_pct: 8.0,
                ..Default::default()
            }),
            ..Default::default()
        };
        let m = evaluate(&deal);
        assert_all_finite(&m);
        assert_eq!(m.annual_rent, 0.0);
        assert_eq!(m.op_ex.vacancy, 0.0);
        assert_eq!(m.noi_annual, 0.0);

        let deal = Deal {
            purchase_price: 1.7e308,
            rehab_cost: 1.7e308,
            arv: -1.7e308,
            hud_rent: 1000.0,
            loan: Some(Loan {
                down_pct: 20.0,
                rate_pct: 6.0,
                term_years: 30.0,
                include_rehab_in_loan: true,
                loan_amount_override: 0.0,
            }),
            assumptions: Some(Assumptions {
                management_pct: 1e306,
                debt_service_monthly: 1e308,
                ..Default::default()
            }),
            ..Default::default()
        };
        let m = evaluate(&deal);
        assert_all_finite(&m);
        assert_eq!(m.total_cost, 0.0);
        assert_eq!(m.cap_rate, 0.0);
        assert_eq!(m.roi, 0.0);
        assert_eq!(m.op_ex.management, 0.0);
    }
}
