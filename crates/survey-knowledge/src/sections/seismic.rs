//! Seismic microzoning for sites of design seismicity 7 and above.

use survey_rules::{Condition, InstructionBlock, InstructionVariant};
use survey_types::{CalculatedValue, GeologicalInput, Normative, SurveyModule, WorkCategory, WorkItem};

use crate::measure::exploration_points;

pub const SECTION: &str = "seismic";

/// Shallow groundwater raises site seismicity by one point.
const SHALLOW_WATER_DEPTH: f64 = 4.0;
/// Minimum length of seismic profiling lines, m.
const MIN_PROFILE_LENGTH: f64 = 200.0;

fn profile_length(input: &GeologicalInput) -> f64 {
    input
        .footprint_area()
        .map(|area| (area.sqrt() * 2.0).ceil())
        .unwrap_or(MIN_PROFILE_LENGTH)
        .max(MIN_PROFILE_LENGTH)
}

fn site_seismicity(input: &GeologicalInput) -> CalculatedValue {
    let base = f64::from(input.seismicity());
    let shallow = input.has_groundwater()
        && input
            .groundwater_depth
            .is_some_and(|d| d < SHALLOW_WATER_DEPTH);
    if shallow {
        CalculatedValue::new("siteSeismicity", base + 1.0, "балл")
            .confidence(0.6)
            .because("Уровень подземных вод выше 4 м повышает сейсмичность площадки")
    } else {
        CalculatedValue::new("siteSeismicity", base, "балл")
            .confidence(0.8)
            .because("Исходная сейсмичность района по картам ОСР")
    }
}

pub fn blocks() -> Vec<InstructionBlock> {
    vec![InstructionBlock::new("seismic.microzoning", SECTION, "Сейсмическое микрорайонирование")
        .describe("Уточнение исходной сейсмичности площадки")
        .priority(70)
        .tag("seismic")
        .tag("geophysics")
        .when(Condition::expr("seismicity>=7"))
        .variant(
            InstructionVariant::mandatory(
                "seismic.microzoning.sp14",
                Normative::new("СП 14.13330.2018", "4.3"),
            )
            .recommend("Выполнить сейсмическое микрорайонирование площадки"),
        )
        .variant(
            InstructionVariant::recommended(
                "seismic.microzoning.sp283",
                Normative::new("СП 283.1325800.2016", "5.1"),
            )
            .recommend("Инструментальные методы: сейсморазведка и регистрация микросейсм"),
        )
        .calculate(|input| Ok(vec![site_seismicity(input)]))
        .generate(|input| {
            Ok(vec![
                WorkItem::new(
                    "geophysics.seismic-profiling",
                    "Сейсморазведка методом преломлённых волн",
                    "пог. м",
                    profile_length(input),
                    WorkCategory::Mandatory,
                    SurveyModule::Geophysics,
                )
                .price_code("СБЦ-1999 т.61 §3"),
                WorkItem::new(
                    "geophysics.microtremor",
                    "Регистрация микросейсм",
                    "точка",
                    f64::from(exploration_points(input)),
                    WorkCategory::Mandatory,
                    SurveyModule::Geophysics,
                ),
                WorkItem::new(
                    "office.microzoning-report",
                    "Отчёт по сейсмическому микрорайонированию",
                    "отчёт",
                    1.0,
                    WorkCategory::Mandatory,
                    SurveyModule::Office,
                ),
            ])
        })]
}
