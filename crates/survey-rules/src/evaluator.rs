//! Applicability: which blocks apply to a project, and which of a block's
//! variants qualify.
//!
//! A rule that fails while being evaluated is treated as "not applicable" and
//! reported as a [`RuleDiagnostic`]; it never aborts the run.

use survey_types::{GeologicalInput, RuleDiagnostic, RuleStage};

use crate::block::{InstructionBlock, InstructionVariant};

/// Keep every block whose top-level condition holds for `input`.
pub fn filter_applicable_blocks<'a>(
    blocks: &'a [InstructionBlock],
    input: &GeologicalInput,
) -> (Vec<&'a InstructionBlock>, Vec<RuleDiagnostic>) {
    let mut applicable = Vec::new();
    let mut diagnostics = Vec::new();

    for block in blocks {
        match block.condition.evaluate(input) {
            Ok(true) => applicable.push(block),
            Ok(false) => {
                tracing::trace!(block = %block.id, "Condition not met");
            }
            Err(e) => {
                tracing::warn!(block = %block.id, error = %e, "Condition failed, block skipped");
                diagnostics.push(RuleDiagnostic {
                    block_id: block.id.clone(),
                    variant_id: None,
                    stage: RuleStage::Condition,
                    message: e.to_string(),
                });
            }
        }
    }

    (applicable, diagnostics)
}

/// Variants of `block` whose own eligibility holds, in declaration order.
///
/// An empty result means the block is excluded from the run.
pub fn get_applicable_variants<'a>(
    block: &'a InstructionBlock,
    input: &GeologicalInput,
) -> (Vec<&'a InstructionVariant>, Vec<RuleDiagnostic>) {
    let mut eligible = Vec::new();
    let mut diagnostics = Vec::new();

    for variant in &block.variants {
        match variant.eligibility.evaluate(input) {
            Ok(true) => eligible.push(variant),
            Ok(false) => {}
            Err(e) => {
                tracing::warn!(
                    block = %block.id,
                    variant = %variant.id,
                    error = %e,
                    "Variant eligibility failed, variant skipped"
                );
                diagnostics.push(RuleDiagnostic {
                    block_id: block.id.clone(),
                    variant_id: Some(variant.id.clone()),
                    stage: RuleStage::VariantEligibility,
                    message: e.to_string(),
                });
            }
        }
    }

    (eligible, diagnostics)
}
