//! Shared sizing rules: how many exploration points, how deep, how many samples.

use survey_types::{CalculatedValue, GeologicalInput};

/// Foundation base depth assumed when the project does not declare one, m.
const DEFAULT_FOUNDATION_DEPTH: f64 = 2.0;
/// Pile length assumed for pile foundations without a declared length, m.
const DEFAULT_PILE_LENGTH: f64 = 12.0;
/// Depth boreholes reach below the pile tip, m.
const BELOW_PILE_TIP: f64 = 5.0;

/// Grid spacing between exploration points, m.
pub(crate) fn point_spacing(category: u8) -> f64 {
    match category {
        1 => 75.0,
        2 => 50.0,
        _ => 30.0,
    }
}

fn minimum_points(category: u8) -> u32 {
    match category {
        1 => 3,
        2 => 4,
        _ => 5,
    }
}

/// Exploration points for the footprint, never below the category minimum.
pub(crate) fn exploration_points(input: &GeologicalInput) -> u32 {
    let category = input.geotechnical_category();
    let min = minimum_points(category);
    let Some(area) = input.footprint_area() else {
        return min;
    };
    let spacing = point_spacing(category);
    let by_grid = ((area / (spacing * spacing)).ceil() as u32).saturating_add(1);
    by_grid.max(min)
}

/// Compressible thickness explored below a shallow foundation base, m.
fn depth_below_base(input: &GeologicalInput) -> f64 {
    match input.floors.unwrap_or(1) {
        0..=2 => 6.0,
        3..=5 => 10.0,
        6..=9 => 15.0,
        _ => 20.0,
    }
}

/// Borehole depth from ground surface, m.
pub(crate) fn exploration_depth(input: &GeologicalInput) -> f64 {
    let base = input.foundation_depth.unwrap_or(DEFAULT_FOUNDATION_DEPTH);
    if input.is_pile_foundation() {
        base + input.pile_length.unwrap_or(DEFAULT_PILE_LENGTH) + BELOW_PILE_TIP
    } else {
        base + depth_below_base(input)
    }
}

/// Samples needed across all engineering-geological elements.
pub(crate) fn samples_per_element(input: &GeologicalInput, per_element: u32) -> f64 {
    f64::from(input.stratigraphic_units()) * f64::from(per_element)
}

/// Point count and depth as explanatory values. Confidence drops when the
/// figures rest on assumed dimensions.
pub(crate) fn exploration_values(input: &GeologicalInput) -> Vec<CalculatedValue> {
    let points = exploration_points(input);
    let depth = exploration_depth(input);

    let points_confidence = if input.footprint_area().is_some() { 0.9 } else { 0.5 };
    let assumed_depth = input.foundation_depth.is_none()
        || (input.is_pile_foundation() && input.pile_length.is_none());
    let depth_confidence = if assumed_depth { 0.6 } else { 0.9 };

    vec![
        CalculatedValue::new("explorationPoints", f64::from(points), "шт")
            .confidence(points_confidence)
            .because(format!(
                "Сетка {} м для {} категории сложности, не менее {} точек",
                point_spacing(input.geotechnical_category()),
                input.geotechnical_category(),
                minimum_points(input.geotechnical_category())
            )),
        CalculatedValue::new("explorationDepth", depth, "м")
            .confidence(depth_confidence)
            .because(if input.is_pile_foundation() {
                "Ниже острия свай не менее чем на 5 м"
            } else {
                "На глубину сжимаемой толщи ниже подошвы фундамента"
            }),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimum_points_without_footprint() {
        let input = GeologicalInput::default();
        assert_eq!(exploration_points(&input), 4);
        let input = GeologicalInput {
            geotechnical_category: Some(3),
            ..Default::default()
        };
        assert_eq!(exploration_points(&input), 5);
    }

    #[test]
    fn grid_points_for_large_site() {
        let input = GeologicalInput {
            site_area: Some(20_000.0),
            ..Default::default()
        };
        // 20000 / 2500 = 8 cells, plus one.
        assert_eq!(exploration_points(&input), 9);
    }

    #[test]
    fn pile_depth_reaches_below_tip() {
        let input = GeologicalInput {
            foundation_type: Some("свайный".into()),
            foundation_depth: Some(3.0),
            pile_length: Some(10.0),
            ..Default::default()
        };
        assert_eq!(exploration_depth(&input), 18.0);
    }

    #[test]
    fn shallow_depth_scales_with_floors() {
        let low = GeologicalInput {
            floors: Some(2),
            ..Default::default()
        };
        let tall = GeologicalInput {
            floors: Some(16),
            ..Default::default()
        };
        assert_eq!(exploration_depth(&low), 8.0);
        assert_eq!(exploration_depth(&tall), 22.0);
    }

    #[test]
    fn assumed_dimensions_lower_confidence() {
        let values = exploration_values(&GeologicalInput::default());
        assert_eq!(values.len(), 2);
        assert_eq!(values[0].confidence, 0.5);
        assert_eq!(values[1].confidence, 0.6);
    }

    #[test]
    fn huge_unit_count_does_not_wrap() {
        let input = GeologicalInput {
            expected_stratigraphic_units: Some(u32::MAX),
            ..Default::default()
        };
        assert_eq!(samples_per_element(&input, 10), f64::from(u32::MAX) * 10.0);
    }

    #[test]
    fn huge_site_saturates_point_count() {
        let input = GeologicalInput {
            site_area: Some(1e15),
            ..Default::default()
        };
        assert_eq!(exploration_points(&input), u32::MAX);
    }
}
