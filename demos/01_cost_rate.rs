/// cost rate - CAT of the same loan with and without fees, checked against its product band
use prestamo_engine::{CostRateCalculator, CostRateInput, EngineConfig, FlatCostRateInput, LoanCategory, Money, Rate};
use rust_decimal_macros::dec;
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let calculator = CostRateCalculator::new(EngineConfig::default());

    let plain = CostRateInput::new(Money::from_major(20_000), Rate::from_percent(dec!(3.5)), 24);
    let loaded = plain
        .clone()
        .with_origination_fee(Money::from_major(600))
        .with_insurance(Money::from_major(45));

    for (name, input) in [("no fees", &plain), ("fee + insurance", &loaded)] {
        let result = calculator.compute(input)?;
        let check = calculator.check_range(result.cat, LoanCategory::Personal);

        println!("{name}");
        println!("  CAT:                {}", result.cat_label);
        println!("  effective annual:   {}%", result.effective_annual_rate);
        println!("  installment:        {}", result.installment.format_mxn());
        println!("  total payable:      {}", result.total_payable.format_mxn());
        println!("  solver:             {:?} after {} iterations", result.solver.termination, result.solver.iterations);
        if let Some(warning) = check.warning {
            println!("  warning:            {warning}");
        }
    }

    // flat loans have no periodic contract rate; the CAT comes from the uniform installments
    let flat = calculator.compute_flat(&FlatCostRateInput::new(
        Money::from_major(15_000),
        Rate::from_percentage(10),
        3,
    ))?;
    println!("flat");
    println!("  CAT:                {}", flat.cat_label);
    println!("  installment:        {}", flat.installment.format_mxn());

    Ok(())
}
