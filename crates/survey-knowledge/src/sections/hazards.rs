//! Hazardous geological processes: karst and landslides.

use survey_rules::{Condition, InstructionBlock, InstructionVariant};
use survey_types::{SurveyModule, WorkCategory, WorkItem};

use crate::measure::{exploration_depth, exploration_points};
use crate::norms::{sp11_105, sp47};
use crate::sections::drilling;

pub const SECTION: &str = "hazards";

/// Karst boreholes go this far below the ordinary exploration depth, m.
const KARST_EXTRA_DEPTH: f64 = 10.0;

pub fn blocks() -> Vec<InstructionBlock> {
    vec![
        InstructionBlock::new("hazards.karst", SECTION, "Карстово-суффозионные процессы")
            .describe("Оценка карстовой опасности территории")
            .priority(80)
            .tag("hazards")
            .depends_on(drilling::EXPLORATION)
            .when(Condition::expr("hazards~карст"))
            .variant(
                InstructionVariant::mandatory("hazards.karst.sp47", sp47("6.3.17"))
                    .recommend("Геофизика по всей площадке и глубокие скважины до карстующихся пород"),
            )
            .variant(InstructionVariant::recommended(
                "hazards.karst.sp11",
                sp11_105("Ч. II, 5"),
            ))
            .generate(|input| {
                let depth = exploration_depth(input) + KARST_EXTRA_DEPTH;
                let wells = (exploration_points(input) / 2).max(2);
                Ok(vec![
                    WorkItem::new(
                        "drill.karst-boreholes",
                        "Бурение скважин на карстующиеся породы",
                        "м",
                        f64::from(wells) * depth,
                        WorkCategory::Mandatory,
                        SurveyModule::Drilling,
                    )
                    .tag("karst"),
                    WorkItem::new(
                        "geophysics.karst-survey",
                        "Электроразведка для выявления карстовых полостей",
                        "пог. м",
                        input.footprint_area().map_or(500.0, |a| (a.sqrt() * 4.0).ceil()),
                        WorkCategory::Mandatory,
                        SurveyModule::Geophysics,
                    )
                    .tag("karst")
                    .price_code("СБЦ-1999 т.55 §1"),
                ])
            }),
        InstructionBlock::new("hazards.landslide", SECTION, "Оползневые процессы")
            .priority(81)
            .tag("hazards")
            .when(Condition::expr("hazards~оползень"))
            .variant(
                InstructionVariant::mandatory("hazards.landslide.sp47", sp47("6.3.18"))
                    .recommend("Расчёт устойчивости склона по наиболее неблагоприятным сечениям"),
            )
            .variant(InstructionVariant::recommended(
                "hazards.landslide.sp11",
                sp11_105("Ч. II, 6"),
            ))
            .generate(|_| {
                Ok(vec![
                    WorkItem::new(
                        "hazards.slope-stability",
                        "Расчёт устойчивости склона",
                        "расчёт",
                        1.0,
                        WorkCategory::Mandatory,
                        SurveyModule::Hazards,
                    ),
                    WorkItem::new(
                        "field.inclinometer-monitoring",
                        "Инклинометрические наблюдения",
                        "цикл",
                        4.0,
                        WorkCategory::Recommended,
                        SurveyModule::Hazards,
                    ),
                ])
            }),
    ]
}
