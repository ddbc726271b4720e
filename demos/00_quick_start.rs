/// quick start - build a repayment schedule and print it
use prestamo_engine::chrono::NaiveDate;
use prestamo_engine::{build_schedule, AmortizationSystem, LoanTerms, Money, PaymentFrequency, Rate};
use rust_decimal_macros::dec;
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    // $10,000 personal loan at 4.5% monthly, 12 monthly installments
    let terms = LoanTerms::builder()
        .principal(Money::from_major(10_000))
        .monthly_rate(Rate::from_percent(dec!(4.5)))
        .term(12)
        .frequency(PaymentFrequency::Monthly)
        .system(AmortizationSystem::EqualInstallment)
        .start_date(NaiveDate::from_ymd_opt(2024, 1, 31).ok_or("invalid start date")?)
        .build()?;

    let table = build_schedule(&terms)?;

    println!(
        "{:>3} {:>10} {:>12} {:>12} {:>10} {:>10} {:>12}",
        "#", "due", "installment", "principal", "interest", "iva", "balance"
    );
    for row in &table.rows {
        println!(
            "{:>3} {:>10} {:>12} {:>12} {:>10} {:>10} {:>12}",
            row.period,
            row.due_date,
            row.installment.format_mxn(),
            row.principal.format_mxn(),
            row.interest.format_mxn(),
            row.interest_tax.format_mxn(),
            row.closing_balance.format_mxn(),
        );
    }

    println!();
    println!("{}", serde_json::to_string_pretty(&table.summary)?);

    Ok(())
}
