/// Fixed-rate monthly principal and interest.
///
/// Zero rate degrades to straight-line `loan_amount / n`; a non-positive amount or term pays 0.
pub fn monthly_payment(loan_amount: f64, rate_pct: f64, term_years: f64) -> f64 {
    if loan_amount.is_nan() || loan_amount <= 0.0 || term_years.is_nan() || term_years <= 0.0 {
        return 0.0;
    }

    let n = term_years * 12.0;
    let r = rate_pct / 100.0 / 12.0;
    if r == 0.0 {
        return loan_amount / n;
    }

    let growth = (1.0 + r).powf(n);
    let payment = loan_amount * (r * growth) / (growth - 1.0);
    if payment.is_finite() {
        payment
    } else {
        0.0
    }
}
