//! Corrosion aggressiveness of soils to steel piles and buried metal.

use survey_rules::{Condition, InstructionBlock, InstructionVariant};
use survey_types::{Normative, SurveyModule, WorkCategory, WorkItem};

use crate::measure::exploration_points;
use crate::norms::gost;
use crate::sections::hydrogeology;

pub const SECTION: &str = "corrosion";

pub fn blocks() -> Vec<InstructionBlock> {
    vec![InstructionBlock::new("corrosion.metal", SECTION, "Коррозионная агрессивность грунтов к металлу")
        .describe("Удельное электрическое сопротивление, блуждающие токи, агрессивность к стали")
        .priority(50)
        .tag("corrosion")
        .depends_on(hydrogeology::WATER_CHEMISTRY)
        .applies_if(|i| i.is_pile_foundation() || i.has_underground_metal())
        .variant(
            InstructionVariant::mandatory("corrosion.metal.gost9602", gost("ГОСТ 9.602-2016"))
                .recommend("Определить коррозионную агрессивность грунтов к углеродистой стали"),
        )
        .variant(
            InstructionVariant::recommended(
                "corrosion.metal.sp28",
                Normative::new("СП 28.13330.2017", "5.5"),
            )
            .recommend("Учесть степень агрессивности при назначении защиты свай"),
        )
        .generate(|input| {
            let points = f64::from(exploration_points(input).max(3));
            let mut works = vec![
                WorkItem::new(
                    "lab.corrosion-steel",
                    "Коррозионная агрессивность грунтов к стали",
                    "проба",
                    points,
                    WorkCategory::Mandatory,
                    SurveyModule::Laboratory,
                )
                .tag("corrosion")
                .price_code("СБЦ-1999 т.73 §20"),
                WorkItem::new(
                    "field.soil-resistivity",
                    "Измерение удельного электрического сопротивления грунтов",
                    "точка",
                    points,
                    WorkCategory::Mandatory,
                    SurveyModule::FieldTests,
                )
                .tag("corrosion"),
            ];
            if input.has_underground_metal() {
                works.push(
                    WorkItem::new(
                        "field.stray-currents",
                        "Измерение блуждающих токов",
                        "точка",
                        points,
                        WorkCategory::Mandatory,
                        SurveyModule::FieldTests,
                    )
                    .tag("corrosion"),
                );
            }
            if input.has_groundwater() {
                // Shares the id with the groundwater analysis so the two merge.
                works.push(
                    WorkItem::new(
                        "lab.water-chemistry",
                        "Стандартный химический анализ подземных вод",
                        "проба",
                        1.0,
                        WorkCategory::Recommended,
                        SurveyModule::Laboratory,
                    )
                    .describe("Агрессивность воды к свинцовым и алюминиевым оболочкам")
                    .tag("corrosion"),
                );
            }
            Ok(works)
        })]
}
