//! Office processing and the technical report.

use survey_rules::{InstructionBlock, InstructionVariant};
use survey_types::{SurveyModule, WorkCategory, WorkItem};

use crate::norms::sp47;
use crate::sections::drilling;

pub const SECTION: &str = "office";

pub fn blocks() -> Vec<InstructionBlock> {
    vec![InstructionBlock::new("office.report", SECTION, "Технический отчёт")
        .priority(100)
        .tag("office")
        .depends_on(drilling::EXPLORATION)
        .variant(
            InstructionVariant::mandatory("office.report.sp47", sp47("6.3.21"))
                .recommend("Отчёт с инженерно-геологическими разрезами и таблицами характеристик"),
        )
        .generate(|input| {
            let mut works = vec![WorkItem::new(
                "office.technical-report",
                "Составление технического отчёта",
                "отчёт",
                1.0,
                WorkCategory::Mandatory,
                SurveyModule::Office,
            )
            .price_code("СБЦ-1999 т.86 §1")];
            if input.is_high_responsibility() {
                works.push(WorkItem::new(
                    "office.geotechnical-forecast",
                    "Прогноз изменения инженерно-геологических условий",
                    "отчёт",
                    1.0,
                    WorkCategory::Recommended,
                    SurveyModule::Office,
                ));
            }
            Ok(works)
        })]
}
