//! Procedural provisions. Explanatory only: they show up in the audit trail
//! and never produce work.

use survey_rules::{InstructionBlock, InstructionVariant};

use crate::norms::{sp446, sp47};

pub const SECTION: &str = "procedure";

pub fn blocks() -> Vec<InstructionBlock> {
    vec![
        InstructionBlock::new("procedure.program", SECTION, "Программа изысканий")
            .describe("Состав и объёмы работ обосновываются в программе инженерных изысканий")
            .priority(1)
            .tag("procedure")
            .variant(
                InstructionVariant::reference("procedure.program.sp47", sp47("4.15"))
                    .recommend("Согласовать программу с заказчиком до начала полевых работ"),
            ),
        InstructionBlock::new("procedure.safety", SECTION, "Охрана труда при полевых работах")
            .describe("Требования безопасности при бурении и полевых испытаниях")
            .priority(2)
            .tag("procedure")
            .tag("safety")
            .variant(
                InstructionVariant::reference("procedure.safety.sp446", sp446("4.10"))
                    .recommend("Проверить наличие подземных коммуникаций в точках бурения"),
            )
            .variant(
                InstructionVariant::reference("procedure.safety.sp47", sp47("4.20"))
                    .recommend("Оформить наряд-допуск на производство полевых работ"),
            ),
    ]
}
