//! Golden tests for the backend wire format.
//!
//! These pin the exact JSON shape and the lossy condition mapping the
//! backend relies on.

use odontogram_core::models::{Condition, Surface, ToothCondition, ToothState};
use odontogram_core::taxonomy::ToothNumber;
use odontogram_core::wire::{
    parse_records, parse_shorthand, read_record, record_from_shorthand, CanonicalSerializer,
    LegacySerializer, ToothStateSerializer,
};

/// Legacy shorthand in, wire surfaces out, canonical state back.
struct GoldenCase {
    id: &'static str,
    shorthand: &'static str,
    expected_wire: &'static [(&'static str, &'static str)],
    expected_read: &'static [(Surface, Condition)],
}

fn get_golden_cases() -> Vec<GoldenCase> {
    vec![
        GoldenCase {
            id: "single-caries",
            shorthand: r#"{"O": "caries"}"#,
            expected_wire: &[("oclusal", "caries")],
            expected_read: &[(Surface::Occlusal, Condition::Caries)],
        },
        GoldenCase {
            id: "none-dropped",
            shorthand: r#"{"O": "caries", "V": "none", "L": "none"}"#,
            expected_wire: &[("oclusal", "caries")],
            expected_read: &[(Surface::Occlusal, Condition::Caries)],
        },
        GoldenCase {
            id: "completed-collapses",
            shorthand: r#"{"O": "completed"}"#,
            expected_wire: &[("oclusal", "filled")],
            expected_read: &[(Surface::Occlusal, Condition::Restored)],
        },
        GoldenCase {
            id: "restored-is-filled",
            shorthand: r#"{"M": "restored", "D": "caries"}"#,
            expected_wire: &[("mesial", "filled"), ("distal", "caries")],
            expected_read: &[
                (Surface::Mesial, Condition::Restored),
                (Surface::Distal, Condition::Caries),
            ],
        },
        GoldenCase {
            id: "chart-order",
            shorthand: r#"{"D": "caries", "V": "caries", "O": "restored"}"#,
            expected_wire: &[
                ("oclusal", "filled"),
                ("vestibular", "caries"),
                ("distal", "caries"),
            ],
            expected_read: &[
                (Surface::Occlusal, Condition::Restored),
                (Surface::Vestibular, Condition::Caries),
                (Surface::Distal, Condition::Caries),
            ],
        },
        GoldenCase {
            id: "unknown-condition-healthy",
            shorthand: r#"{"L": "fractured"}"#,
            expected_wire: &[("lingual", "healthy")],
            expected_read: &[],
        },
    ]
}

#[test]
fn test_golden_cases() {
    let tooth = ToothNumber::new(16).unwrap();

    for case in get_golden_cases() {
        let shorthand = serde_json::from_str(case.shorthand).unwrap();
        let record = record_from_shorthand(tooth, &shorthand, true, "").unwrap();

        let wire: Vec<(&str, &str)> = record
            .surfaces
            .iter()
            .map(|s| (s.surface.as_str(), s.condition.as_str()))
            .collect();
        assert_eq!(wire, case.expected_wire, "Case {}: wire mismatch", case.id);
        assert!(
            record.surfaces.iter().all(|s| s.severity == 1),
            "Case {}: severity must be 1",
            case.id
        );

        let state = read_record(&record);
        for surface in Surface::ALL {
            let expected = case
                .expected_read
                .iter()
                .find(|(s, _)| *s == surface)
                .map(|(_, c)| *c)
                .unwrap_or(Condition::Healthy);
            assert_eq!(
                state.surface(surface),
                expected,
                "Case {}: {} read back wrong",
                case.id,
                surface
            );
        }
    }
}

#[test]
fn test_exact_record_json() {
    let tooth = ToothNumber::new(36).unwrap();
    let state = ToothState::new().with_surface(Surface::Occlusal, Condition::Caries);
    let record = LegacySerializer.serialize_tooth(tooth, &state, "watch").unwrap();

    let json = serde_json::to_value(&record).unwrap();
    assert_eq!(
        json,
        serde_json::json!({
            "toothNumber": 36,
            "isPresent": true,
            "surfaces": [
                { "surface": "oclusal", "condition": "caries", "severity": 1, "notes": "" }
            ],
            "generalNotes": "watch"
        })
    );
}

#[test]
fn test_canonical_writes_all_surfaces() {
    let tooth = ToothNumber::new(21).unwrap();
    let state = ToothState::new().with_surface(Surface::Vestibular, Condition::Completed);
    let record = CanonicalSerializer.serialize_tooth(tooth, &state, "").unwrap();

    let conditions: Vec<&str> = record.surfaces.iter().map(|s| s.condition.as_str()).collect();
    assert_eq!(
        conditions,
        vec!["healthy", "filled", "healthy", "healthy", "healthy"]
    );
}

#[test]
fn test_default_teeth_are_omitted() {
    let tooth = ToothNumber::new(11).unwrap();
    assert!(CanonicalSerializer
        .serialize_tooth(tooth, &ToothState::new(), "")
        .is_none());
    assert!(LegacySerializer
        .serialize_tooth(tooth, &ToothState::new(), "")
        .is_none());
}

#[test]
fn test_extracted_reads_from_presence_flag() {
    let json = r#"[
        { "toothNumber": 48, "isPresent": false, "surfaces": [], "generalNotes": "" },
        { "toothNumber": 85, "isPresent": true,
          "surfaces": [{ "surface": "Distal", "condition": "filled", "severity": 3, "notes": "" }] }
    ]"#;
    let records = parse_records(json).unwrap();

    let extracted = read_record(&records[0]);
    assert_eq!(extracted.tooth_condition(), Some(ToothCondition::Extracted));

    let primary = read_record(&records[1]);
    assert_eq!(primary.surface(Surface::Distal), Condition::Restored);
    assert_eq!(records[1].general_notes, "");
}

#[test]
fn test_invalid_tooth_number_rejected() {
    let json = r#"[{ "toothNumber": 19, "isPresent": true }]"#;
    assert!(parse_records(json).is_err());
}

#[test]
fn test_legacy_shorthand_parse() {
    let state = parse_shorthand(r#"{"O": "caries", "V": "completed", "M": "none"}"#).unwrap();
    assert_eq!(state.surface(Surface::Occlusal), Condition::Caries);
    assert_eq!(state.surface(Surface::Vestibular), Condition::Completed);
    assert_eq!(state.surface(Surface::Mesial), Condition::Healthy);

    assert!(parse_shorthand(r#"{"X": "caries"}"#).is_err());
}
