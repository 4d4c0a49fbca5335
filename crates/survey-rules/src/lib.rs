//! Rule evaluation, variant selection, and work generation for survey scoping.
//!
//! This crate implements the survey rules engine: block applicability,
//! dependency ordering, priority resolution among competing variants, work
//! generation with deduplication and statistics, and structural validation of
//! the block registry.

pub mod block;
pub mod condition;
pub mod engine;
pub mod evaluator;
pub mod generator;
pub mod ordering;
pub mod priority;
pub mod registry;
pub mod validation;

pub use block::{
    CalculateFn, Condition, GenerateFn, InstructionBlock, InstructionVariant, PredicateFn,
};
pub use condition::{evaluate_condition, parse_condition, Clause, ConditionExpr, Operator};
pub use engine::{run, run_with_config, EngineConfig, EngineState, RulesEngine};
pub use evaluator::{filter_applicable_blocks, get_applicable_variants};
pub use generator::{
    calculate_block_values, calculate_works_statistics, deduplicate_works,
    generate_works_from_block, sort_works,
};
pub use ordering::sort_blocks_with_dependencies;
pub use priority::select_best_variant;
pub use registry::BlockRegistry;
pub use validation::{validate, validate_or_raise, Diagnostic, LintRule, Severity};
