//! Field testing: static cone penetration.

use survey_rules::{Condition, InstructionBlock, InstructionVariant};
use survey_types::{Normative, SurveyModule, WorkCategory, WorkItem};

use crate::measure::exploration_points;
use crate::norms::{gost, sp446};
use crate::sections::drilling;

pub const SECTION: &str = "field";

pub fn blocks() -> Vec<InstructionBlock> {
    vec![
        InstructionBlock::new("field.static-probing", SECTION, "Статическое зондирование")
            .describe("Испытания грунтов статическим зондированием по ГОСТ 19912")
            .priority(20)
            .tag("field-tests")
            .depends_on(drilling::EXPLORATION)
            .variant(
                InstructionVariant::mandatory(
                    "field.static-probing.sp24",
                    Normative::new("СП 24.13330.2021", "7.3.6"),
                )
                .when(Condition::test(|i| i.is_pile_foundation()))
                .recommend("Зондирование в каждой точке для расчёта несущей способности свай"),
            )
            .variant(
                InstructionVariant::recommended("field.static-probing.sp446", sp446("6.4.3"))
                    .when(Condition::test(|i| i.geotechnical_category() >= 2))
                    .recommend("Зондирование между скважинами для уточнения границ ИГЭ"),
            )
            .variant(InstructionVariant::reference(
                "field.static-probing.gost",
                gost("ГОСТ 19912-2012"),
            ))
            .generate(|input| {
                let points = exploration_points(input);
                Ok(vec![WorkItem::new(
                    "field.cpt",
                    "Статическое зондирование",
                    "испытание",
                    f64::from(points),
                    WorkCategory::Mandatory,
                    SurveyModule::FieldTests,
                )
                .cite(gost("ГОСТ 19912-2012"))
                .price_code("СБЦ-1999 т.36 §1")])
            }),
    ]
}
