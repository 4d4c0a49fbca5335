//! Specific soils that need dedicated laboratory programmes.

use survey_rules::{Condition, InstructionBlock, InstructionVariant};
use survey_types::{SurveyModule, WorkCategory, WorkItem};

use crate::measure::samples_per_element;
use crate::norms::{gost, sp11_105, sp47};
use crate::sections::laboratory;

pub const SECTION: &str = "special_soils";

/// Specific-property determinations per element.
const TESTS_PER_ELEMENT: u32 = 6;

struct SpecialSoil {
    id: &'static str,
    soil: &'static str,
    title: &'static str,
    sp47_section: &'static str,
    sp11_section: &'static str,
    work_id: &'static str,
    work_name: &'static str,
    standard: &'static str,
}

const SOILS: &[SpecialSoil] = &[
    SpecialSoil {
        id: "special_soils.subsiding",
        soil: "просадочные",
        title: "Просадочные грунты",
        sp47_section: "6.6.2",
        sp11_section: "Ч. III, 5",
        work_id: "lab.subsidence",
        work_name: "Определение относительной просадочности",
        standard: "ГОСТ 23161-2012",
    },
    SpecialSoil {
        id: "special_soils.swelling",
        soil: "набухающие",
        title: "Набухающие грунты",
        sp47_section: "6.6.3",
        sp11_section: "Ч. III, 6",
        work_id: "lab.swelling",
        work_name: "Определение давления и относительной деформации набухания",
        standard: "ГОСТ 24143-80",
    },
    SpecialSoil {
        id: "special_soils.organic",
        soil: "органические",
        title: "Органоминеральные и органические грунты",
        sp47_section: "6.6.4",
        sp11_section: "Ч. III, 7",
        work_id: "lab.organic-content",
        work_name: "Определение содержания органических веществ",
        standard: "ГОСТ 23740-2016",
    },
];

fn block(soil: &'static SpecialSoil) -> InstructionBlock {
    InstructionBlock::new(soil.id, SECTION, soil.title)
        .priority(60)
        .tag("special-soils")
        .depends_on(laboratory::SOIL_PROPERTIES)
        .when(Condition::expr(format!("specialSoils~{}", soil.soil)))
        .variant(
            InstructionVariant::mandatory(format!("{}.sp47", soil.id), sp47(soil.sp47_section))
                .recommend(format!("Специальные испытания: {}", soil.work_name.to_lowercase())),
        )
        .variant(InstructionVariant::recommended(
            format!("{}.sp11", soil.id),
            sp11_105(soil.sp11_section),
        ))
        .generate(move |input| {
            Ok(vec![WorkItem::new(
                soil.work_id,
                soil.work_name,
                "опр.",
                samples_per_element(input, TESTS_PER_ELEMENT),
                WorkCategory::Mandatory,
                SurveyModule::Laboratory,
            )
            .cite(gost(soil.standard))
            .tag("special-soils")])
        })
}

pub fn blocks() -> Vec<InstructionBlock> {
    SOILS.iter().map(block).collect()
}
