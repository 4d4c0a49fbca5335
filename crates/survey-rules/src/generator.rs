//! Work generation and aggregation.
//!
//! A selected block turns the project input into work items; the items of all
//! blocks are then merged by work id, sorted, and summarised.

use std::collections::HashMap;

use survey_types::{
    CalculatedValue, GeologicalInput, Result, Statistics, WorkCategory, WorkItem,
};

use crate::block::{InstructionBlock, InstructionVariant};

/// Run the block's calculate function, if it has one.
pub fn calculate_block_values(
    block: &InstructionBlock,
    input: &GeologicalInput,
) -> Result<Vec<CalculatedValue>> {
    match &block.calculate {
        Some(f) => f(input),
        None => Ok(Vec::new()),
    }
}

/// Emit the work items of a selected block.
///
/// Items with a non-positive or non-finite quantity are dropped. Each item is
/// stamped with the block id and, if it has none, the variant's citation; its
/// category is capped at the variant tier's ceiling.
pub fn generate_works_from_block(
    block: &InstructionBlock,
    variant: &InstructionVariant,
    input: &GeologicalInput,
) -> Result<Vec<WorkItem>> {
    generate_works(block, variant, input, false)
}

/// As [`generate_works_from_block`], optionally letting a non-emitting
/// reference variant produce (optional-category) works.
pub(crate) fn generate_works(
    block: &InstructionBlock,
    variant: &InstructionVariant,
    input: &GeologicalInput,
    include_reference: bool,
) -> Result<Vec<WorkItem>> {
    let Some(generate) = &block.generate else {
        return Ok(Vec::new());
    };
    if !variant.emits_works && !include_reference {
        tracing::debug!(block = %block.id, variant = %variant.id, "Variant does not emit works");
        return Ok(Vec::new());
    }

    let ceiling = variant.tier.category_ceiling();
    let mut works = Vec::new();
    for mut item in generate(input)? {
        if !item.has_billable_quantity() {
            tracing::debug!(
                block = %block.id,
                work = %item.id,
                quantity = item.quantity,
                "Dropping work item without a billable quantity"
            );
            continue;
        }
        item.category = item.category.max(ceiling);
        if item.normative.is_none() {
            item.normative = Some(variant.normative.clone());
        }
        if !item.source_blocks.contains(&block.id) {
            item.source_blocks.push(block.id.clone());
        }
        works.push(item);
    }
    Ok(works)
}

/// Merge items that share a work id. Quantities add and the stricter category
/// wins; first-appearance order is kept. Idempotent.
pub fn deduplicate_works(items: Vec<WorkItem>) -> Vec<WorkItem> {
    let mut merged: Vec<WorkItem> = Vec::with_capacity(items.len());
    let mut index: HashMap<String, usize> = HashMap::new();

    for item in items {
        match index.get(&item.id) {
            Some(&i) => {
                tracing::debug!(work = %item.id, "Merging duplicate work item");
                merged[i].absorb(item);
            }
            None => {
                index.insert(item.id.clone(), merged.len());
                merged.push(item);
            }
        }
    }
    merged
}

/// Order by category, then module, then work id.
pub fn sort_works(mut items: Vec<WorkItem>) -> Vec<WorkItem> {
    items.sort_by(|a, b| {
        a.category
            .cmp(&b.category)
            .then(a.module.cmp(&b.module))
            .then_with(|| a.id.cmp(&b.id))
    });
    items
}

/// Single pass over the final work list.
pub fn calculate_works_statistics(items: &[WorkItem], blocks_applied: usize) -> Statistics {
    let mut stats = Statistics {
        blocks_applied,
        ..Statistics::default()
    };

    for item in items {
        stats.total_works += 1;
        match item.category {
            WorkCategory::Mandatory => stats.mandatory_works += 1,
            WorkCategory::Recommended => stats.recommended_works += 1,
            WorkCategory::Optional => stats.optional_works += 1,
        }
        *stats.works_by_module.entry(item.module).or_default() += 1;
        *stats
            .quantities_by_module
            .entry(item.module)
            .or_default()
            .entry(item.unit.clone())
            .or_default() += item.quantity;
    }
    stats
}
