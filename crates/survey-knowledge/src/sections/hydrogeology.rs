//! Groundwater: level observations and the chemical water extract used to
//! judge aggressiveness to concrete and steel.

use survey_rules::{Condition, InstructionBlock, InstructionVariant};
use survey_types::{CalculatedValue, SurveyModule, WorkCategory, WorkItem};

use crate::measure::exploration_points;
use crate::norms::{gost, sp11_105, sp47};
use crate::sections::drilling;

pub const SECTION: &str = "hydrogeology";

pub const WATER_CHEMISTRY: &str = "hydrogeology.water-chemistry";

/// Water samples per aquifer, never fewer than this.
const MIN_WATER_SAMPLES: u32 = 3;

pub fn blocks() -> Vec<InstructionBlock> {
    vec![
        InstructionBlock::new("hydrogeology.groundwater-level", SECTION, "Наблюдения за уровнем подземных вод")
            .priority(40)
            .tag("hydrogeology")
            .depends_on(drilling::EXPLORATION)
            .when(Condition::expr("hasGroundwater=true"))
            .variant(
                InstructionVariant::mandatory("hydrogeology.groundwater-level.sp47", sp47("6.3.9"))
                    .recommend("Замер появившегося и установившегося уровня в каждой скважине"),
            )
            .calculate(|input| {
                Ok(input
                    .groundwater_depth
                    .map(|depth| {
                        vec![CalculatedValue::new("groundwaterDepth", depth, "м")
                            .confidence(0.7)
                            .because("По данным задания на изыскания")]
                    })
                    .unwrap_or_default())
            })
            .generate(|input| {
                Ok(vec![WorkItem::new(
                    "hydro.level-measurements",
                    "Замеры уровня подземных вод в скважинах",
                    "замер",
                    f64::from(exploration_points(input)) * 2.0,
                    WorkCategory::Mandatory,
                    SurveyModule::Hydrogeology,
                )])
            }),
        InstructionBlock::new(WATER_CHEMISTRY, SECTION, "Химический анализ воды и водной вытяжки")
            .describe("Оценка агрессивности подземных вод и грунтов к бетону и металлу")
            .priority(45)
            .tag("hydrogeology")
            .tag("aggressiveness")
            .when(Condition::expr("hasGroundwater=true"))
            .variant(
                InstructionVariant::mandatory("hydrogeology.water-chemistry.sp47", sp47("6.3.13"))
                    .recommend("Не менее трёх проб воды из каждого водоносного горизонта")
                    .hint("minSamples", MIN_WATER_SAMPLES.to_string()),
            )
            .variant(
                InstructionVariant::recommended(
                    "hydrogeology.water-chemistry.sp11",
                    sp11_105("Ч. I, 7.20"),
                )
                .recommend("Стандартный химический анализ по ГОСТ 31861"),
            )
            .generate(|input| {
                let samples = f64::from(input.stratigraphic_units().max(MIN_WATER_SAMPLES));
                Ok(vec![
                    WorkItem::new(
                        "lab.water-chemistry",
                        "Стандартный химический анализ подземных вод",
                        "проба",
                        samples,
                        WorkCategory::Mandatory,
                        SurveyModule::Laboratory,
                    )
                    .cite(gost("ГОСТ 31861-2012"))
                    .tag("aggressiveness")
                    .price_code("СБЦ-1999 т.73 §1"),
                    WorkItem::new(
                        "lab.soil-water-extract",
                        "Анализ водной вытяжки из грунтов",
                        "проба",
                        samples,
                        WorkCategory::Mandatory,
                        SurveyModule::Laboratory,
                    )
                    .tag("aggressiveness")
                    .price_code("СБЦ-1999 т.73 §12"),
                ])
            }),
    ]
}
