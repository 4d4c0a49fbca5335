//! The project description a rules engine run is evaluated against.

use serde::{Deserialize, Serialize};

/// Flat description of a planned survey project, as produced by the wizard.
///
/// Every field is optional. Accessors treat an absent value as "not
/// applicable" so rule predicates stay total.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GeologicalInput {
    pub object_type: Option<String>,
    pub object_name: Option<String>,
    pub survey_stage: Option<String>,
    pub floors: Option<u32>,
    pub underground_floors: Option<u32>,
    /// Building footprint length, m.
    pub building_length: Option<f64>,
    /// Building footprint width, m.
    pub building_width: Option<f64>,
    /// Site area, m². Takes precedence over length × width.
    pub site_area: Option<f64>,
    pub foundation_type: Option<String>,
    /// Foundation base depth below ground, m.
    pub foundation_depth: Option<f64>,
    pub pile_length: Option<f64>,
    pub soil_types: Vec<String>,
    pub special_soils: Vec<String>,
    pub hazards: Vec<String>,
    /// Design seismicity, MSK-64 points.
    pub seismicity: Option<u8>,
    pub has_groundwater: Option<bool>,
    /// Groundwater level below ground, m.
    pub groundwater_depth: Option<f64>,
    pub geotechnical_category: Option<u8>,
    pub responsibility_level: Option<String>,
    pub expected_stratigraphic_units: Option<u32>,
    pub has_underground_metal: Option<bool>,
}

/// A typed view of one input field, used by the condition expression language.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(String),
    Number(f64),
    Flag(bool),
    List(Vec<String>),
}

fn normalize(s: &str) -> String {
    s.trim().to_lowercase()
}

fn list_contains(list: &[String], needle: &str) -> bool {
    let needle = normalize(needle);
    list.iter().any(|s| normalize(s) == needle)
}

impl GeologicalInput {
    pub fn has_groundwater(&self) -> bool {
        self.has_groundwater.unwrap_or(false)
    }

    pub fn has_underground_metal(&self) -> bool {
        self.has_underground_metal.unwrap_or(false)
    }

    /// Case-insensitive match on the declared foundation type.
    pub fn foundation_is(&self, kind: &str) -> bool {
        self.foundation_type
            .as_deref()
            .is_some_and(|f| normalize(f) == normalize(kind))
    }

    /// Pile foundations of any flavour ("свайный", "свайно-плитный", ...).
    pub fn is_pile_foundation(&self) -> bool {
        self.foundation_type
            .as_deref()
            .is_some_and(|f| normalize(f).starts_with("свай"))
    }

    pub fn has_soil(&self, soil: &str) -> bool {
        list_contains(&self.soil_types, soil)
    }

    pub fn has_special_soil(&self, soil: &str) -> bool {
        list_contains(&self.special_soils, soil)
    }

    pub fn has_hazard(&self, hazard: &str) -> bool {
        list_contains(&self.hazards, hazard)
    }

    /// Design seismicity, zero when not declared.
    pub fn seismicity(&self) -> u8 {
        self.seismicity.unwrap_or(0)
    }

    /// Geotechnical category, defaulting to II when the wizard left it blank.
    pub fn geotechnical_category(&self) -> u8 {
        self.geotechnical_category.unwrap_or(2).clamp(1, 3)
    }

    pub fn is_high_responsibility(&self) -> bool {
        self.responsibility_level
            .as_deref()
            .is_some_and(|r| normalize(r) == "повышенный")
    }

    /// Site area in m², from `site_area` or the building footprint.
    pub fn footprint_area(&self) -> Option<f64> {
        let positive = |v: &f64| v.is_finite() && *v > 0.0;
        self.site_area
            .filter(positive)
            .or_else(|| {
                Some(self.building_length.filter(positive)? * self.building_width.filter(positive)?)
            })
            .filter(|a| a.is_finite())
    }

    /// Stratigraphic units expected on site, at least one.
    pub fn stratigraphic_units(&self) -> u32 {
        self.expected_stratigraphic_units.unwrap_or(1).max(1)
    }

    /// Resolve a camelCase field name to its value. Absent fields and unknown
    /// names resolve to `None`.
    pub fn field(&self, key: &str) -> Option<FieldValue> {
        let text = |v: &Option<String>| v.clone().map(FieldValue::Text);
        let num = |v: Option<f64>| v.map(FieldValue::Number);
        match key {
            "objectType" => text(&self.object_type),
            "objectName" => text(&self.object_name),
            "surveyStage" => text(&self.survey_stage),
            "foundationType" => text(&self.foundation_type),
            "responsibilityLevel" => text(&self.responsibility_level),
            "floors" => num(self.floors.map(f64::from)),
            "undergroundFloors" => num(self.underground_floors.map(f64::from)),
            "buildingLength" => num(self.building_length),
            "buildingWidth" => num(self.building_width),
            "siteArea" => num(self.footprint_area()),
            "foundationDepth" => num(self.foundation_depth),
            "pileLength" => num(self.pile_length),
            "seismicity" => num(self.seismicity.map(f64::from)),
            "groundwaterDepth" => num(self.groundwater_depth),
            "geotechnicalCategory" => num(self.geotechnical_category.map(f64::from)),
            "expectedStratigraphicUnits" => {
                num(self.expected_stratigraphic_units.map(f64::from))
            }
            "hasGroundwater" => self.has_groundwater.map(FieldValue::Flag),
            "hasUndergroundMetal" => self.has_underground_metal.map(FieldValue::Flag),
            "soilTypes" => Some(FieldValue::List(self.soil_types.clone())),
            "specialSoils" => Some(FieldValue::List(self.special_soils.clone())),
            "hazards" => Some(FieldValue::List(self.hazards.clone())),
            _ => None,
        }
    }

    /// Whether `key` names a field known to [`field`](Self::field).
    pub fn is_known_field(key: &str) -> bool {
        const KNOWN: &[&str] = &[
            "objectType",
            "objectName",
            "surveyStage",
            "foundationType",
            "responsibilityLevel",
            "floors",
            "undergroundFloors",
            "buildingLength",
            "buildingWidth",
            "siteArea",
            "foundationDepth",
            "pileLength",
            "seismicity",
            "groundwaterDepth",
            "geotechnicalCategory",
            "expectedStratigraphicUnits",
            "hasGroundwater",
            "hasUndergroundMetal",
            "soilTypes",
            "specialSoils",
            "hazards",
        ];
        KNOWN.contains(&key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_camel_case_with_missing_fields() {
        let input: GeologicalInput =
            serde_json::from_str(r#"{"hasGroundwater": true, "foundationType": "свайный"}"#)
                .unwrap();
        assert!(input.has_groundwater());
        assert!(input.is_pile_foundation());
        assert!(input.soil_types.is_empty());
        assert_eq!(input.seismicity(), 0);
    }

    #[test]
    fn absent_flags_read_false() {
        let input = GeologicalInput::default();
        assert!(!input.has_groundwater());
        assert!(!input.has_underground_metal());
        assert!(!input.is_pile_foundation());
        assert!(!input.has_hazard("карст"));
    }

    #[test]
    fn list_membership_ignores_case_and_whitespace() {
        let input = GeologicalInput {
            hazards: vec![" Карст ".into()],
            ..Default::default()
        };
        assert!(input.has_hazard("карст"));
    }

    #[test]
    fn footprint_area_prefers_site_area() {
        let input = GeologicalInput {
            building_length: Some(30.0),
            building_width: Some(12.0),
            ..Default::default()
        };
        assert_eq!(input.footprint_area(), Some(360.0));

        let input = GeologicalInput {
            site_area: Some(1000.0),
            building_length: Some(30.0),
            building_width: Some(12.0),
            ..Default::default()
        };
        assert_eq!(input.footprint_area(), Some(1000.0));

        assert_eq!(GeologicalInput::default().footprint_area(), None);
    }

    #[test]
    fn negative_dimensions_give_no_footprint() {
        let input = GeologicalInput {
            building_length: Some(-30.0),
            building_width: Some(-12.0),
            ..Default::default()
        };
        assert_eq!(input.footprint_area(), None);

        let input = GeologicalInput {
            site_area: Some(-5.0),
            building_length: Some(30.0),
            building_width: Some(12.0),
            ..Default::default()
        };
        assert_eq!(input.footprint_area(), Some(360.0));
    }

    #[test]
    fn field_resolves_typed_values() {
        let input = GeologicalInput {
            floors: Some(9),
            has_groundwater: Some(false),
            soil_types: vec!["песчаный".into()],
            ..Default::default()
        };
        assert_eq!(input.field("floors"), Some(FieldValue::Number(9.0)));
        assert_eq!(input.field("hasGroundwater"), Some(FieldValue::Flag(false)));
        assert_eq!(
            input.field("soilTypes"),
            Some(FieldValue::List(vec!["песчаный".into()]))
        );
        assert_eq!(input.field("pileLength"), None);
        assert_eq!(input.field("nonsense"), None);
    }

    #[test]
    fn known_fields_cover_resolver() {
        assert!(GeologicalInput::is_known_field("hasGroundwater"));
        assert!(GeologicalInput::is_known_field("hazards"));
        assert!(!GeologicalInput::is_known_field("has_groundwater"));
    }

    #[test]
    fn geotechnical_category_defaults_to_two() {
        assert_eq!(GeologicalInput::default().geotechnical_category(), 2);
        let input = GeologicalInput {
            geotechnical_category: Some(7),
            ..Default::default()
        };
        assert_eq!(input.geotechnical_category(), 3);
    }
}
