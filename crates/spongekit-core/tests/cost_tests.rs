use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use spongekit_core::costing::lifecycle::{evaluate, evaluate_with_basis, VolumeBasis};
use spongekit_core::measures::catalog::MeasureCatalog;
use spongekit_core::SpongeKitError;

#[test]
fn test_npv_zero_discount_exact() {
    let catalog = MeasureCatalog::standard();
    for name in catalog.names() {
        let mut measure = catalog.spec(&name).unwrap();
        measure.discount_rate = Decimal::ZERO;
        let cost = evaluate(dec!(437.25), &measure, dec!(10)).unwrap();
        assert_eq!(
            cost.npv,
            cost.capex + cost.annual_opex * Decimal::from(measure.lifetime_years)
        );
    }
}

#[test]
fn test_discounting_lowers_npv() {
    let mut measure = MeasureCatalog::standard().spec("INTENSIVE").unwrap();
    measure.discount_rate = Decimal::ZERO;
    let flat = evaluate(dec!(100), &measure, dec!(5)).unwrap();
    measure.discount_rate = dec!(0.05);
    let discounted = evaluate(dec!(100), &measure, dec!(5)).unwrap();

    assert_eq!(flat.capex, discounted.capex);
    assert!(discounted.npv < flat.npv);
    assert!(discounted.cost_per_m3 < flat.cost_per_m3);
}

#[test]
fn test_unit_cost_division_rules() {
    let measure = MeasureCatalog::standard().spec("PERMEABLE_PAVEMENT").unwrap();

    let err = evaluate(dec!(50), &measure, Decimal::ZERO).unwrap_err();
    assert!(matches!(err, SpongeKitError::DivisionUndefined { .. }));

    let free = evaluate(Decimal::ZERO, &measure, Decimal::ZERO).unwrap();
    assert_eq!(free.cost_per_m3, Decimal::ZERO);

    let basis = VolumeBasis::AnnualEvents {
        events_per_year: dec!(2),
    };
    let err = evaluate_with_basis(dec!(50), &measure, Decimal::ZERO, basis).unwrap_err();
    assert!(matches!(err, SpongeKitError::DivisionUndefined { .. }));
}

#[test]
fn test_invalid_discount_rate_rejected() {
    let mut measure = MeasureCatalog::standard().spec("EXTENSIVE").unwrap();
    measure.discount_rate = dec!(-0.01);
    let err = evaluate(dec!(10), &measure, dec!(1)).unwrap_err();
    assert!(matches!(err, SpongeKitError::InvalidInput { .. }));
}
