// demos/error_handling_demo.rs
use payoff_algebra::payoff::{
    Annuity, AnnuityTerms, CallA, CallE, PutE, Stack, Time, TimeRestriction, UpAndOut,
};
use payoff_algebra::PayoffError;

fn report<T>(label: &str, result: Result<T, PayoffError>) {
    match result {
        Ok(_) => println!("   Unexpected: {} should have failed!", label),
        Err(e) => println!("   ✓ Caught error: {}", e),
    }
}

fn main() {
    println!("Error Handling Demo for payoff-algebra");
    println!("======================================\n");

    println!("1. Testing non-positive maturity...");
    report("CallE", CallE::new(0.0, 100.0));

    println!("\n2. Testing non-finite strike...");
    report("PutE", PutE::new(1.0, f64::NAN));

    println!("\n3. Testing recovery rate above one...");
    report(
        "Annuity",
        Annuity::new(AnnuityTerms {
            maturity: 3.0,
            nominal: 100.0,
            recovery: 1.2,
            ..Default::default()
        }),
    );

    println!("\n4. Testing coupon scheduled after maturity...");
    report(
        "Annuity",
        Annuity::new(AnnuityTerms {
            maturity: 3.0,
            times: vec![1.0, 2.0, 3.5],
            coupon: 5.0,
            nominal: 100.0,
            ..Default::default()
        }),
    );

    println!("\n5. Testing an empty stack...");
    report("Stack", Stack::new(Vec::new()));

    println!("\n6. Testing stacked payoffs with different maturities...");
    let mismatched = (|| {
        Stack::new(vec![
            Box::new(CallA::new(5.0, 100.0)?),
            Box::new(PutE::new(4.0, 100.0)?),
        ])
    })();
    report("Stack", mismatched);

    println!("\n7. Testing a three-component time restriction...");
    let raw: &[f64] = &[1.0, 2.0, 3.0];
    report("TimeRestriction", TimeRestriction::try_from(raw));

    println!("\n8. Testing an inverted interval...");
    report(
        "Time",
        CallA::new(5.0, 100.0).and_then(|call| Time::new(call, [(4.0, 2.0)])),
    );

    println!("\n9. Testing an infinite barrier...");
    report(
        "UpAndOut",
        CallE::new(1.0, 100.0).and_then(|call| UpAndOut::new(call, f64::INFINITY)),
    );

    println!("\n10. Testing a valid configuration...");
    match CallA::new(5.0, 100.0).and_then(|call| Time::new(call, [(2.0, 5.0)])) {
        Ok(timed) => println!("   ✓ Created restriction {:?}", timed.restrictions()),
        Err(e) => println!("   Error: {}", e),
    }
}
