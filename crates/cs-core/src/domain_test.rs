use super::*;

#[test]
fn test_geography_round_trips_through_display() {
    for geo in [
        Geography::OnCampus,
        Geography::ResidenceHalls,
        Geography::NonCampus,
        Geography::PublicProperty,
        Geography::All,
    ] {
        assert_eq!(geo.as_str().parse::<Geography>().unwrap(), geo);
    }
}

#[test]
fn test_residence_halls_do_not_roll_up() {
    assert!(!Geography::ResidenceHalls.rolls_up());
    assert!(!Geography::All.rolls_up());
    assert!(Geography::OnCampus.rolls_up());
    assert!(Geography::NonCampus.rolls_up());
    assert!(Geography::PublicProperty.rolls_up());
}

#[test]
fn test_unknown_geography_is_rejected() {
    assert!("Campus".parse::<Geography>().is_err());
}

#[test]
fn test_family_serializes_with_source_labels() {
    let json = serde_json::to_string(&OffenseFamily::Vawa).unwrap();
    assert_eq!(json, "\"VAWA\"");
    assert_eq!("VAWA".parse::<OffenseFamily>().unwrap(), OffenseFamily::Vawa);
}

#[test]
fn test_offense_code() {
    assert_eq!(offense_code("Motor Vehicle Theft"), "motor_vehicle_theft");
    assert_eq!(OffenseName::new("Rape").code(), "rape");
}

#[test]
fn test_state_code_is_normalized() {
    let code = StateCode::new(" ma ");
    assert_eq!(code, "MA");
    assert!(StateCode::try_new("   ").is_none());
}

#[test]
fn test_newtype_rejects_empty_on_deserialize() {
    let result: Result<OffenseName, _> = serde_json::from_str("\"\"");
    assert!(result.is_err());
}

#[test]
fn test_rate_is_rounded_to_two_decimals() {
    assert_eq!(rate_per_10k(3, Some(7000)), Some(4.29));
    assert_eq!(rate_per_10k(50, Some(10_000)), Some(50.0));
}

#[test]
fn test_rate_is_none_without_positive_fte() {
    assert_eq!(rate_per_10k(3, None), None);
    assert_eq!(rate_per_10k(3, Some(0)), None);
}

#[test]
fn test_round_to_ties_even() {
    assert_eq!(round_to(1437.5, 0), 1438.0);
    assert_eq!(round_to(1436.5, 0), 1436.0);
    assert_eq!(round_to(12.344, 2), 12.34);
}
