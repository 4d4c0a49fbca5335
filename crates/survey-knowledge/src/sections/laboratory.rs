//! Laboratory soil tests per engineering-geological element.

use survey_rules::{Condition, InstructionBlock, InstructionVariant};
use survey_types::{CalculatedValue, SurveyModule, WorkCategory, WorkItem};

use crate::measure::samples_per_element;
use crate::norms::{gost, sp446};
use crate::sections::drilling;

pub const SECTION: &str = "laboratory";

pub const SOIL_PROPERTIES: &str = "laboratory.soil-properties";

/// Determinations of physical properties per element.
const PHYSICAL_PER_ELEMENT: u32 = 10;
/// Determinations of strength and deformation per element.
const MECHANICAL_PER_ELEMENT: u32 = 6;

pub fn blocks() -> Vec<InstructionBlock> {
    vec![InstructionBlock::new(SOIL_PROPERTIES, SECTION, "Лабораторные исследования грунтов")
        .describe("Физические, прочностные и деформационные характеристики грунтов")
        .priority(30)
        .tag("laboratory")
        .depends_on(drilling::EXPLORATION)
        .variant(
            InstructionVariant::mandatory("laboratory.soil-properties.sp446", sp446("6.7.2"))
                .when(Condition::test(|i| i.geotechnical_category() >= 2))
                .recommend("Не менее 10 определений физических и 6 механических характеристик на ИГЭ")
                .hint("physicalPerElement", PHYSICAL_PER_ELEMENT.to_string())
                .hint("mechanicalPerElement", MECHANICAL_PER_ELEMENT.to_string()),
        )
        .variant(
            InstructionVariant::recommended(
                "laboratory.soil-properties.gost",
                gost("ГОСТ 30416-2020"),
            )
            .recommend("Объём определений по ГОСТ 30416 для простых условий"),
        )
        .calculate(|input| {
            Ok(vec![CalculatedValue::new(
                "engineeringGeologicalElements",
                f64::from(input.stratigraphic_units()),
                "шт",
            )
            .confidence(if input.expected_stratigraphic_units.is_some() {
                0.8
            } else {
                0.4
            })
            .because("Ожидаемое число ИГЭ по данным прошлых лет")])
        })
        .generate(|input| {
            Ok(vec![
                WorkItem::new(
                    "lab.physical-properties",
                    "Комплекс определений физических свойств грунтов",
                    "опр.",
                    samples_per_element(input, PHYSICAL_PER_ELEMENT),
                    WorkCategory::Mandatory,
                    SurveyModule::Laboratory,
                )
                .cite(gost("ГОСТ 5180-2015"))
                .price_code("СБЦ-1999 т.63 §3"),
                WorkItem::new(
                    "lab.mechanical-properties",
                    "Компрессионные и сдвиговые испытания грунтов",
                    "опр.",
                    samples_per_element(input, MECHANICAL_PER_ELEMENT),
                    WorkCategory::Mandatory,
                    SurveyModule::Laboratory,
                )
                .cite(gost("ГОСТ 12248.1-2020"))
                .price_code("СБЦ-1999 т.63 §28"),
            ])
        })]
}
