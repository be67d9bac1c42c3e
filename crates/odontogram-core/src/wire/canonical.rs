//! Canonical serializer: full surface list for every charted tooth.

use super::{SurfaceRecord, ToothRecord, ToothStateSerializer, WIRE_CARIES, WIRE_FILLED, WIRE_HEALTHY};
use crate::models::{Condition, ToothState};
use crate::taxonomy::ToothNumber;

/// Map a chart condition onto the backend's three-valued vocabulary.
pub fn wire_condition(condition: Condition) -> &'static str {
    match condition {
        Condition::Healthy => WIRE_HEALTHY,
        Condition::Caries => WIRE_CARIES,
        Condition::Restored | Condition::Completed => WIRE_FILLED,
    }
}

/// Writes all five surfaces (healthy ones included) for any tooth with a
/// surface finding. Teeth in their default state with no notes are omitted.
#[derive(Debug, Clone, Copy, Default)]
pub struct CanonicalSerializer;

impl ToothStateSerializer for CanonicalSerializer {
    fn serialize_tooth(
        &self,
        tooth: ToothNumber,
        state: &ToothState,
        notes: &str,
    ) -> Option<ToothRecord> {
        if state.is_default() && notes.is_empty() {
            return None;
        }

        let surfaces = if state.has_surface_findings() {
            state
                .surfaces()
                .map(|(surface, condition)| SurfaceRecord::new(surface, wire_condition(condition)))
                .collect()
        } else {
            Vec::new()
        };

        Some(ToothRecord {
            tooth_number: tooth,
            is_present: state.is_present(),
            surfaces,
            general_notes: notes.to_string(),
            last_updated: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Surface, ToothCondition};
    use crate::wire::read_record;

    fn tooth(code: u32) -> ToothNumber {
        ToothNumber::new(code).unwrap()
    }

    #[test]
    fn test_default_tooth_omitted() {
        let record = CanonicalSerializer.serialize_tooth(tooth(11), &ToothState::new(), "");
        assert!(record.is_none());
    }

    #[test]
    fn test_notes_only_tooth_has_empty_surfaces() {
        let record = CanonicalSerializer
            .serialize_tooth(tooth(11), &ToothState::new(), "sensitive to cold")
            .unwrap();
        assert!(record.surfaces.is_empty());
        assert_eq!(record.general_notes, "sensitive to cold");
        assert!(record.is_present);
    }

    #[test]
    fn test_all_surfaces_written() {
        let state = ToothState::new()
            .with_surface(Surface::Occlusal, Condition::Caries)
            .with_surface(Surface::Distal, Condition::Completed);
        let record = CanonicalSerializer.serialize_tooth(tooth(16), &state, "").unwrap();

        let pairs: Vec<(&str, &str)> = record
            .surfaces
            .iter()
            .map(|s| (s.surface.as_str(), s.condition.as_str()))
            .collect();
        assert_eq!(
            pairs,
            vec![
                ("oclusal", "caries"),
                ("vestibular", "healthy"),
                ("lingual", "healthy"),
                ("mesial", "healthy"),
                ("distal", "filled"),
            ]
        );
        assert!(record.surfaces.iter().all(|s| s.severity == 1 && s.notes.is_empty()));
    }

    #[test]
    fn test_extracted_written_as_absent() {
        let state = ToothState::with_tooth_condition(ToothCondition::Extracted);
        let record = CanonicalSerializer.serialize_tooth(tooth(48), &state, "").unwrap();
        assert!(!record.is_present);
        assert!(record.surfaces.is_empty());
        assert_eq!(read_record(&record), state);
    }

    #[test]
    fn test_completed_reads_back_restored() {
        let state = ToothState::new().with_surface(Surface::Lingual, Condition::Completed);
        let record = CanonicalSerializer.serialize_tooth(tooth(24), &state, "").unwrap();
        let back = read_record(&record);
        assert_eq!(back.surface(Surface::Lingual), Condition::Restored);
    }
}
