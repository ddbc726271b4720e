/// tax breakdown - IVA itemization of a loan plus a late-payment charge
use prestamo_engine::chrono::NaiveDate;
use prestamo_engine::{
    build_schedule, fiscal_legend, is_border_municipality, validate_rfc, LatePaymentCalculator, LoanTerms, Money,
    Rate, TaxBreakdownCalculator,
};
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let municipality = "Tijuana";
    let border_zone = is_border_municipality(municipality);

    let terms = LoanTerms::builder()
        .principal(Money::from_major(12_000))
        .monthly_rate(Rate::from_percentage(3))
        .term(6)
        .origination_fee(Money::from_major(300))
        .insurance_per_period(Money::from_major(25))
        .border_zone(border_zone)
        .start_date(NaiveDate::from_ymd_opt(2024, 3, 1).ok_or("invalid start date")?)
        .build()?;

    let table = build_schedule(&terms)?;
    let breakdown = TaxBreakdownCalculator::default().build_for_loan(&terms, &table.summary);

    println!("{municipality} (border zone: {border_zone})");
    for item in &breakdown.items {
        println!(
            "  {:<24} {:>12} {:>6}% {:>10} {:>12}{}",
            item.label,
            item.subtotal.format_mxn(),
            item.tax_rate,
            item.tax_amount.format_mxn(),
            item.total.format_mxn(),
            if item.exempt { "  (exempt)" } else { "" },
        );
    }
    println!("  total IVA:   {}", breakdown.total_tax.format_mxn());
    println!("  grand total: {}", breakdown.grand_total.format_mxn());
    println!("  {}", breakdown.legend);

    let issuer_rfc = "FNO120315AB7";
    let check = validate_rfc(issuer_rfc);
    println!("issuer RFC {issuer_rfc}: {:?}", check.kind);
    if check.is_valid {
        println!("  {}", fiscal_legend(issuer_rfc, "Financiera del Norte SA de CV"));
    }

    // first installment paid 12 days late
    let first = table.get_row(1).ok_or("empty schedule")?;
    let cutoff = first.due_date + prestamo_engine::chrono::Days::new(12);
    if let Some(charge) = LatePaymentCalculator::default().charge_for_row(first, cutoff, border_zone) {
        println!();
        println!("late by {} days", charge.days_overdue);
        println!("  penalty:     {}", charge.penalty.format_mxn());
        println!("  penalty IVA: {}", charge.penalty_tax.format_mxn());
        println!("  total due:   {}", charge.total_due.format_mxn());
    }

    Ok(())
}
