//! Tests for the record layout tables

use crate::app::services::console_parser::layout::{
    Decoder, FailurePolicy, FieldSpec, battery, furthest_end, power,
};

#[test]
fn test_min_tokens_match_furthest_field() {
    assert_eq!(furthest_end(battery::FIELDS), battery::MIN_TOKENS);
    assert_eq!(furthest_end(power::FIELDS), power::MIN_TOKENS);
    assert_eq!(battery::MIN_TOKENS, 12);
    assert_eq!(power::MIN_TOKENS, 19);
}

#[test]
fn test_positions_are_ordered_and_disjoint() {
    for fields in [battery::FIELDS, power::FIELDS] {
        for pair in fields.windows(2) {
            assert!(pair[0].end() <= pair[1].position, "{:?} overlaps {:?}", pair[0], pair[1]);
        }
    }
}

#[test]
fn test_critical_fields() {
    for fields in [battery::FIELDS, power::FIELDS] {
        let critical: Vec<usize> = fields
            .iter()
            .filter(|f| f.policy == FailurePolicy::DropRecord)
            .map(|f| f.position)
            .collect();
        assert_eq!(critical, vec![0, 1, 2, 3]);
    }
}

#[test]
fn test_sentinel_fields() {
    let sentinel = |fields: &[FieldSpec]| -> Vec<&'static str> {
        fields
            .iter()
            .filter(|f| f.policy == FailurePolicy::Sentinel)
            .map(|f| f.name)
            .collect()
    };

    assert_eq!(sentinel(battery::FIELDS), vec!["BAT SOC", "BAT Coulomb"]);
    assert_eq!(sentinel(power::FIELDS), vec!["PWR Coulomb"]);
}

#[test]
fn test_power_coulomb_uses_percentage_decoder() {
    assert_eq!(power::COULOMB.position, 12);
    assert_eq!(power::COULOMB.decoder, Decoder::Percentage);
    assert_eq!(power::COULOMB.policy, FailurePolicy::Sentinel);
    assert_eq!(battery::SOC.decoder, Decoder::Percentage);
    assert_eq!(battery::COULOMB.decoder, Decoder::Capacity);
}

#[test]
fn test_power_mos_temp_is_not_decoded() {
    assert_eq!(power::MOS_TEMP.position, 17);
    assert_eq!(power::MOS_TEMP.decoder, Decoder::PassThrough);
}
