//! Exploration drilling: number of points, borehole depth, sampling.

use survey_rules::{Condition, InstructionBlock, InstructionVariant};
use survey_types::{SurveyModule, WorkCategory, WorkItem};

use crate::measure::{exploration_depth, exploration_points, exploration_values};
use crate::norms::{sp446, sp47};

pub const SECTION: &str = "drilling";

pub const EXPLORATION: &str = "drilling.exploration";

pub fn blocks() -> Vec<InstructionBlock> {
    vec![InstructionBlock::new(EXPLORATION, SECTION, "Горные выработки")
        .describe("Колонковое бурение скважин с отбором образцов грунта")
        .priority(10)
        .tag("drilling")
        .variant(
            InstructionVariant::mandatory("drilling.exploration.sp446", sp446("6.3.5"))
                .when(Condition::test(|i| i.geotechnical_category() >= 2))
                .recommend("Размещать скважины по контуру и в центре сооружения")
                .hint("minPoints", "4")
                .hint("gridSpacing", "50 м"),
        )
        .variant(
            InstructionVariant::mandatory("drilling.exploration.sp47", sp47("6.3.2"))
                .recommend("Не менее трёх выработок в пределах контура сооружения")
                .hint("minPoints", "3"),
        )
        .calculate(|input| Ok(exploration_values(input)))
        .generate(|input| {
            let points = exploration_points(input);
            let depth = exploration_depth(input);
            Ok(vec![
                WorkItem::new(
                    "drill.boreholes",
                    "Колонковое бурение скважин",
                    "м",
                    f64::from(points) * depth,
                    WorkCategory::Mandatory,
                    SurveyModule::Drilling,
                )
                .describe(format!("{points} скв. глубиной {depth} м"))
                .tag("drilling")
                .price_code("СБЦ-1999 т.9 §1"),
                WorkItem::new(
                    "drill.monoliths",
                    "Отбор монолитов грунта",
                    "шт",
                    f64::from(points) * 2.0,
                    WorkCategory::Mandatory,
                    SurveyModule::Drilling,
                )
                .tag("sampling")
                .price_code("СБЦ-1999 т.57 §1"),
                WorkItem::new(
                    "office.borehole-survey",
                    "Планово-высотная привязка выработок",
                    "точка",
                    f64::from(points),
                    WorkCategory::Mandatory,
                    SurveyModule::Office,
                )
                .price_code("СБЦ-1999 т.93 §1"),
            ])
        })]
}
