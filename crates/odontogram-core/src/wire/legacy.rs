//! Legacy shorthand format.
//!
//! Older clients chart a tooth as a letter-keyed object such as
//! `{"O": "caries", "V": "none", "M": "restored"}`. Surfaces left at `none`
//! are dropped from the wire record instead of being sent as `healthy`.

use std::collections::BTreeMap;

use super::{SurfaceRecord, ToothRecord, ToothStateSerializer, WireError, WireResult};
use super::{WIRE_CARIES, WIRE_FILLED, WIRE_HEALTHY};
use crate::models::{Condition, Surface, ToothState};
use crate::taxonomy::ToothNumber;

/// Letter-keyed surface conditions (`O`, `V`, `L`, `M`, `D`).
pub type LegacyShorthand = BTreeMap<String, String>;

const LEGACY_NONE: &str = "none";

/// Map a legacy condition name onto the wire vocabulary.
pub fn legacy_wire_condition(name: &str) -> &'static str {
    match name {
        "caries" => WIRE_CARIES,
        "restored" | "completed" => WIRE_FILLED,
        _ => WIRE_HEALTHY,
    }
}

fn parse_surface_key(key: &str) -> WireResult<Surface> {
    let mut chars = key.chars();
    match (chars.next(), chars.next()) {
        (Some(letter), None) => {
            Surface::from_letter(letter).ok_or_else(|| WireError::UnknownSurface(key.to_string()))
        }
        _ => Err(WireError::UnknownSurface(key.to_string())),
    }
}

/// Shorthand for a tooth state; every surface is listed.
pub fn to_shorthand(state: &ToothState) -> LegacyShorthand {
    state
        .surfaces()
        .map(|(surface, condition)| {
            (
                surface.letter().to_string(),
                condition.legacy_name().to_string(),
            )
        })
        .collect()
}

/// Shorthand → tooth state. Unrecognised condition names read as `none`.
pub fn shorthand_to_state(shorthand: &LegacyShorthand) -> WireResult<ToothState> {
    let mut state = ToothState::new();
    for (key, name) in shorthand {
        let surface = parse_surface_key(key)?;
        let condition = Condition::from_legacy_name(name).unwrap_or_default();
        state = state.with_surface(surface, condition);
    }
    Ok(state)
}

/// Parse a shorthand JSON object into a tooth state.
pub fn parse_shorthand(json: &str) -> WireResult<ToothState> {
    let shorthand: LegacyShorthand = serde_json::from_str(json)?;
    shorthand_to_state(&shorthand)
}

/// Build a wire record from shorthand, dropping `none` surfaces.
///
/// Surfaces are emitted in chart order regardless of key order.
pub fn record_from_shorthand(
    tooth: ToothNumber,
    shorthand: &LegacyShorthand,
    is_present: bool,
    notes: &str,
) -> WireResult<ToothRecord> {
    let mut entries = Vec::with_capacity(shorthand.len());
    for (key, name) in shorthand {
        let surface = parse_surface_key(key)?;
        if name == LEGACY_NONE {
            continue;
        }
        entries.push((surface, legacy_wire_condition(name)));
    }
    entries.sort_by_key(|(surface, _)| surface.index());

    Ok(ToothRecord {
        tooth_number: tooth,
        is_present,
        surfaces: entries
            .into_iter()
            .map(|(surface, condition)| SurfaceRecord::new(surface, condition))
            .collect(),
        general_notes: notes.to_string(),
        last_updated: None,
    })
}

/// Serializer that applies the legacy `none` filter.
#[derive(Debug, Clone, Copy, Default)]
pub struct LegacySerializer;

impl ToothStateSerializer for LegacySerializer {
    fn serialize_tooth(
        &self,
        tooth: ToothNumber,
        state: &ToothState,
        notes: &str,
    ) -> Option<ToothRecord> {
        if state.is_default() && notes.is_empty() {
            return None;
        }
        // Shorthand built from a ToothState only carries valid letters.
        record_from_shorthand(tooth, &to_shorthand(state), state.is_present(), notes).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wire::read_record;

    fn tooth(code: u32) -> ToothNumber {
        ToothNumber::new(code).unwrap()
    }

    fn shorthand(pairs: &[(&str, &str)]) -> LegacyShorthand {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_none_surfaces_dropped() {
        let sh = shorthand(&[("O", "caries"), ("V", "none"), ("M", "restored")]);
        let record = record_from_shorthand(tooth(16), &sh, true, "").unwrap();
        let pairs: Vec<(&str, &str)> = record
            .surfaces
            .iter()
            .map(|s| (s.surface.as_str(), s.condition.as_str()))
            .collect();
        assert_eq!(pairs, vec![("oclusal", "caries"), ("mesial", "filled")]);
    }

    #[test]
    fn test_condition_name_mapping() {
        assert_eq!(legacy_wire_condition("caries"), "caries");
        assert_eq!(legacy_wire_condition("restored"), "filled");
        assert_eq!(legacy_wire_condition("completed"), "filled");
        assert_eq!(legacy_wire_condition("sealant"), "healthy");
    }

    #[test]
    fn test_unknown_condition_sent_as_healthy() {
        let sh = shorthand(&[("D", "sealant")]);
        let record = record_from_shorthand(tooth(26), &sh, true, "").unwrap();
        assert_eq!(record.surfaces.len(), 1);
        assert_eq!(record.surfaces[0].condition, "healthy");
    }

    #[test]
    fn test_unknown_surface_key_rejected() {
        let sh = shorthand(&[("B", "caries")]);
        assert!(matches!(
            record_from_shorthand(tooth(26), &sh, true, ""),
            Err(WireError::UnknownSurface(_))
        ));
        let sh = shorthand(&[("OC", "caries")]);
        assert!(shorthand_to_state(&sh).is_err());
    }

    #[test]
    fn test_round_trip_caries() {
        let state = parse_shorthand(r#"{"O": "caries"}"#).unwrap();
        let record = LegacySerializer.serialize_tooth(tooth(16), &state, "").unwrap();
        let back = read_record(&record);
        assert_eq!(back.surface(Surface::Occlusal), Condition::Caries);
        assert_eq!(to_shorthand(&back)["O"], "caries");
    }

    #[test]
    fn test_round_trip_completed_is_lossy() {
        let state = parse_shorthand(r#"{"O": "completed"}"#).unwrap();
        let record = LegacySerializer.serialize_tooth(tooth(16), &state, "").unwrap();
        assert_eq!(record.surfaces[0].condition, "filled");
        let back = read_record(&record);
        assert_eq!(back.surface(Surface::Occlusal), Condition::Restored);
    }

    #[test]
    fn test_healthy_tooth_omitted() {
        assert!(LegacySerializer
            .serialize_tooth(tooth(11), &ToothState::new(), "")
            .is_none());
    }
}
