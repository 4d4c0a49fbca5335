//! Rules engine: the single synchronous pass from project input to work list.
//!
//! `Idle → Filtering → Ordering → Resolving → Generating → Aggregating → Done`,
//! with `Error` reachable on configuration faults. Each stage's output is the
//! next stage's only input.

use serde::{Deserialize, Serialize};

use survey_types::{
    AppliedBlock, GeologicalInput, Result, RuleDiagnostic, RuleStage, RulesEngineResult,
    SurveyError, Tier, WorkItem,
};

use crate::block::{InstructionBlock, InstructionVariant};
use crate::evaluator::{filter_applicable_blocks, get_applicable_variants};
use crate::generator::{
    calculate_block_values, calculate_works_statistics, deduplicate_works, generate_works,
    sort_works,
};
use crate::ordering::sort_blocks_with_dependencies;
use crate::priority::select_best_variant;
use crate::registry::BlockRegistry;
use crate::validation::validate_or_raise;

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

/// Tunables for a run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EngineConfig {
    /// Treat rule evaluation failures as fatal instead of recording diagnostics.
    pub strict: bool,
    /// Let reference-tier winners emit works (capped at optional) even when
    /// the variant is not marked as emitting.
    pub include_reference_works: bool,
}

impl EngineConfig {
    pub fn from_json(source: &str) -> Result<Self> {
        Ok(serde_json::from_str(source)?)
    }
}

/// Stages of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    Idle,
    Filtering,
    Ordering,
    Resolving,
    Generating,
    Aggregating,
    Done,
    Error,
}

impl EngineState {
    /// The successor on the success path; `None` for terminal states.
    pub fn next(self) -> Option<EngineState> {
        match self {
            EngineState::Idle => Some(EngineState::Filtering),
            EngineState::Filtering => Some(EngineState::Ordering),
            EngineState::Ordering => Some(EngineState::Resolving),
            EngineState::Resolving => Some(EngineState::Generating),
            EngineState::Generating => Some(EngineState::Aggregating),
            EngineState::Aggregating => Some(EngineState::Done),
            EngineState::Done | EngineState::Error => None,
        }
    }

    pub fn is_terminal(self) -> bool {
        self.next().is_none()
    }
}

/// A registry bound to a configuration. Cheap to share; runs never mutate it.
#[derive(Debug, Clone, Default)]
pub struct RulesEngine {
    registry: BlockRegistry,
    config: EngineConfig,
}

// ---------------------------------------------------------------------------
// Stage records
// ---------------------------------------------------------------------------

struct Resolution<'a> {
    block: &'a InstructionBlock,
    variant: &'a InstructionVariant,
    tier: Tier,
}

struct Generated {
    applied: Vec<AppliedBlock>,
    works: Vec<WorkItem>,
}

struct Machine {
    state: EngineState,
}

impl Machine {
    fn new() -> Self {
        Self {
            state: EngineState::Idle,
        }
    }

    fn advance(&mut self) {
        if let Some(next) = self.state.next() {
            tracing::debug!(from = ?self.state, to = ?next, "Engine state transition");
            self.state = next;
        }
    }

    fn fail(&mut self, err: SurveyError) -> SurveyError {
        tracing::error!(state = ?self.state, error = %err, "Rules engine run aborted");
        self.state = EngineState::Error;
        err
    }
}

// ---------------------------------------------------------------------------
// Stages
// ---------------------------------------------------------------------------

fn check_registry(registry: &BlockRegistry) -> Result<()> {
    validate_or_raise(registry).map(|_| ())
}

fn resolve_all<'a>(
    ordered: &[&'a InstructionBlock],
    input: &GeologicalInput,
) -> (Vec<Resolution<'a>>, Vec<RuleDiagnostic>) {
    let mut resolutions = Vec::with_capacity(ordered.len());
    let mut diagnostics = Vec::new();

    for &block in ordered {
        let (variants, diags) = get_applicable_variants(block, input);
        diagnostics.extend(diags);
        match select_best_variant(&variants) {
            Some((variant, tier)) => {
                tracing::debug!(block = %block.id, variant = %variant.id, %tier, "Variant selected");
                resolutions.push(Resolution {
                    block,
                    variant,
                    tier,
                });
            }
            None => {
                tracing::debug!(block = %block.id, "No applicable variants, block dropped");
            }
        }
    }

    (resolutions, diagnostics)
}

fn generate_all(
    resolutions: &[Resolution<'_>],
    input: &GeologicalInput,
    config: &EngineConfig,
) -> (Generated, Vec<RuleDiagnostic>) {
    let mut applied = Vec::with_capacity(resolutions.len());
    let mut works = Vec::new();
    let mut diagnostics = Vec::new();

    for r in resolutions {
        let failed = |stage: RuleStage, err: SurveyError| {
            tracing::warn!(block = %r.block.id, %stage, error = %err, "Rule failed, block excluded");
            RuleDiagnostic {
                block_id: r.block.id.clone(),
                variant_id: Some(r.variant.id.clone()),
                stage,
                message: err.to_string(),
            }
        };

        let values = match calculate_block_values(r.block, input) {
            Ok(values) => values,
            Err(err) => {
                diagnostics.push(failed(RuleStage::Calculation, err));
                continue;
            }
        };

        let include_reference = config.include_reference_works && r.tier == Tier::Reference;
        let items = match generate_works(r.block, r.variant, input, include_reference) {
            Ok(items) => items,
            Err(err) => {
                diagnostics.push(failed(RuleStage::Generation, err));
                continue;
            }
        };

        applied.push(AppliedBlock {
            block_id: r.block.id.clone(),
            section: r.block.section.clone(),
            title: r.block.title.clone(),
            variant_id: r.variant.id.clone(),
            tier: r.tier,
            normative: r.variant.normative.clone(),
            recommendation: r.variant.recommendation.clone(),
            calculated_values: values,
            works_generated: items.len(),
        });
        works.extend(items);
    }

    (Generated { applied, works }, diagnostics)
}

fn aggregate(generated: Generated, diagnostics: Vec<RuleDiagnostic>) -> RulesEngineResult {
    let works = sort_works(deduplicate_works(generated.works));
    let statistics = calculate_works_statistics(&works, generated.applied.len());
    RulesEngineResult {
        works,
        applied_blocks: generated.applied,
        statistics,
        diagnostics,
    }
}

/// In strict mode the first recovered rule failure becomes fatal.
fn enforce_strict(config: &EngineConfig, diagnostics: &[RuleDiagnostic]) -> Result<()> {
    match diagnostics.first() {
        Some(d) if config.strict => Err(SurveyError::RuleEvaluation {
            block: d.block_id.clone(),
            stage: d.stage,
            message: d.message.clone(),
        }),
        _ => Ok(()),
    }
}

// ---------------------------------------------------------------------------
// Entry points
// ---------------------------------------------------------------------------

/// Evaluate `registry` against `input` with the default configuration.
pub fn run(input: &GeologicalInput, registry: &BlockRegistry) -> Result<RulesEngineResult> {
    run_with_config(input, registry, &EngineConfig::default())
}

/// Evaluate `registry` against `input`.
///
/// Structural faults in the registry abort with an error naming the block.
/// Failing rules, malformed conditions included, are excluded and reported in
/// `diagnostics`.
pub fn run_with_config(
    input: &GeologicalInput,
    registry: &BlockRegistry,
    config: &EngineConfig,
) -> Result<RulesEngineResult> {
    let mut machine = Machine::new();
    tracing::info!(blocks = registry.len(), "Rules engine run started");

    check_registry(registry).map_err(|e| machine.fail(e))?;
    let mut diagnostics = Vec::new();

    machine.advance(); // Filtering
    let (candidates, diags) = filter_applicable_blocks(registry.blocks(), input);
    diagnostics.extend(diags);
    enforce_strict(config, &diagnostics).map_err(|e| machine.fail(e))?;

    machine.advance(); // Ordering
    let ordered = sort_blocks_with_dependencies(&candidates).map_err(|e| machine.fail(e))?;

    machine.advance(); // Resolving
    let (resolutions, diags) = resolve_all(&ordered, input);
    diagnostics.extend(diags);
    enforce_strict(config, &diagnostics).map_err(|e| machine.fail(e))?;

    machine.advance(); // Generating
    let (generated, diags) = generate_all(&resolutions, input, config);
    diagnostics.extend(diags);
    enforce_strict(config, &diagnostics).map_err(|e| machine.fail(e))?;

    machine.advance(); // Aggregating
    let result = aggregate(generated, diagnostics);

    machine.advance(); // Done
    tracing::info!(
        applicable = candidates.len(),
        applied = result.applied_blocks.len(),
        works = result.works.len(),
        diagnostics = result.diagnostics.len(),
        "Rules engine run completed"
    );
    Ok(result)
}

impl RulesEngine {
    pub fn new(registry: BlockRegistry) -> Self {
        Self {
            registry,
            config: EngineConfig::default(),
        }
    }

    pub fn with_config(registry: BlockRegistry, config: EngineConfig) -> Self {
        Self { registry, config }
    }

    pub fn registry(&self) -> &BlockRegistry {
        &self.registry
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn run(&self, input: &GeologicalInput) -> Result<RulesEngineResult> {
        run_with_config(input, &self.registry, &self.config)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::Condition;
    use survey_types::{Normative, SurveyModule, WorkCategory};

    fn sp47() -> Normative {
        Normative::new("СП 47.13330.2016", "6.3")
    }

    fn emitting(id: &str, work_id: &str, qty: f64) -> InstructionBlock {
        let work_id = work_id.to_string();
        InstructionBlock::new(id, "6", id)
            .variant(InstructionVariant::mandatory(format!("{id}.sp"), sp47()))
            .generate(move |_| {
                Ok(vec![WorkItem::new(
                    work_id.clone(),
                    "Work",
                    "шт",
                    qty,
                    WorkCategory::Mandatory,
                    SurveyModule::Laboratory,
                )])
            })
    }

    #[test]
    fn state_table_is_linear() {
        let mut state = EngineState::Idle;
        let mut visited = vec![state];
        while let Some(next) = state.next() {
            state = next;
            visited.push(state);
        }
        assert_eq!(
            visited,
            vec![
                EngineState::Idle,
                EngineState::Filtering,
                EngineState::Ordering,
                EngineState::Resolving,
                EngineState::Generating,
                EngineState::Aggregating,
                EngineState::Done,
            ]
        );
        assert!(EngineState::Error.is_terminal());
    }

    #[test]
    fn empty_registry_yields_empty_result() {
        let result = run(&GeologicalInput::default(), &BlockRegistry::default()).unwrap();
        assert!(result.works.is_empty());
        assert!(result.applied_blocks.is_empty());
        assert_eq!(result.statistics.blocks_applied, 0);
    }

    #[test]
    fn zero_variant_block_aborts_run() {
        let reg = BlockRegistry::new(vec![
            emitting("fine", "w", 1.0),
            InstructionBlock::new("hollow", "6", "Hollow"),
        ]);
        match run(&GeologicalInput::default(), &reg).unwrap_err() {
            SurveyError::EmptyVariants { block } => assert_eq!(block, "hollow"),
            other => panic!("Expected EmptyVariants, got: {other:?}"),
        }
    }

    #[test]
    fn failing_generator_is_recorded_and_run_continues() {
        let reg = BlockRegistry::new(vec![
            InstructionBlock::new("broken", "6", "Broken")
                .variant(InstructionVariant::mandatory("broken.sp", sp47()))
                .generate(|_| Err(SurveyError::missing("foundationDepth"))),
            emitting("fine", "w", 2.0),
        ]);
        let result = run(&GeologicalInput::default(), &reg).unwrap();
        assert_eq!(result.applied_blocks.len(), 1);
        assert_eq!(result.applied_blocks[0].block_id, "fine");
        assert_eq!(result.diagnostics.len(), 1);
        assert_eq!(result.diagnostics[0].block_id, "broken");
        assert_eq!(result.diagnostics[0].stage, RuleStage::Generation);
    }

    #[test]
    fn strict_mode_promotes_rule_failures() {
        let reg = BlockRegistry::new(vec![InstructionBlock::new("broken", "6", "Broken")
            .when(Condition::predicate(|_| Err(SurveyError::Other("boom".into()))))
            .variant(InstructionVariant::mandatory("broken.sp", sp47()))]);
        let config = EngineConfig {
            strict: true,
            ..Default::default()
        };
        let err = run_with_config(&GeologicalInput::default(), &reg, &config).unwrap_err();
        match err {
            SurveyError::RuleEvaluation { block, stage, .. } => {
                assert_eq!(block, "broken");
                assert_eq!(stage, RuleStage::Condition);
            }
            other => panic!("Expected RuleEvaluation, got: {other:?}"),
        }
    }

    #[test]
    fn malformed_block_condition_is_recorded_and_run_continues() {
        let reg = BlockRegistry::new(vec![
            emitting("bad", "w1", 1.0).when(Condition::expr("floors>many")),
            emitting("ok", "w2", 1.0),
        ]);
        let result = run(&GeologicalInput::default(), &reg).unwrap();
        assert_eq!(result.applied_blocks.len(), 1);
        assert_eq!(result.applied_blocks[0].block_id, "ok");
        assert_eq!(result.diagnostics.len(), 1);

        let diag = &result.diagnostics[0];
        assert_eq!(diag.block_id, "bad");
        assert_eq!(diag.stage, RuleStage::Condition);
        assert!(diag.message.starts_with("Malformed condition 'floors>many'"));
        assert!(!diag.message.contains("Registry validation failed"));
    }

    #[test]
    fn malformed_variant_condition_is_recorded_and_run_continues() {
        let reg = BlockRegistry::new(vec![
            InstructionBlock::new("bad", "6", "Bad")
                .variant(
                    InstructionVariant::mandatory("bad.sp", sp47())
                        .when(Condition::expr("site.area>=1")),
                )
                .variant(InstructionVariant::reference("bad.ref", sp47())),
            emitting("ok", "w", 1.0),
        ]);
        let result = run(&GeologicalInput::default(), &reg).unwrap();

        let bad = result.applied("bad").unwrap();
        assert_eq!(bad.variant_id, "bad.ref");
        assert!(result.applied("ok").is_some());
        assert_eq!(result.diagnostics.len(), 1);
        assert_eq!(result.diagnostics[0].stage, RuleStage::VariantEligibility);
        assert_eq!(result.diagnostics[0].variant_id.as_deref(), Some("bad.sp"));
    }

    #[test]
    fn strict_mode_promotes_malformed_condition() {
        let reg = BlockRegistry::new(vec![
            emitting("bad", "w1", 1.0).when(Condition::expr("hasGroundwater")),
            emitting("ok", "w2", 1.0),
        ]);
        let config = EngineConfig {
            strict: true,
            ..Default::default()
        };
        match run_with_config(&GeologicalInput::default(), &reg, &config).unwrap_err() {
            SurveyError::RuleEvaluation { block, stage, message } => {
                assert_eq!(block, "bad");
                assert_eq!(stage, RuleStage::Condition);
                assert!(message.contains("no operator found"));
            }
            other => panic!("Expected RuleEvaluation, got: {other:?}"),
        }
    }

    #[test]
    fn failing_calculation_excludes_block() {
        let reg = BlockRegistry::new(vec![emitting("calc", "w", 1.0)
            .calculate(|_| Err(SurveyError::Other("bad math".into())))]);
        let result = run(&GeologicalInput::default(), &reg).unwrap();
        assert!(result.applied_blocks.is_empty());
        assert!(result.works.is_empty());
        assert_eq!(result.diagnostics[0].stage, RuleStage::Calculation);
    }

    #[test]
    fn explanatory_block_applies_without_works() {
        let reg = BlockRegistry::new(vec![InstructionBlock::new("safety", "4", "Safety")
            .variant(InstructionVariant::reference(
                "safety.ref",
                Normative::new("СП 446.1325800.2019", "4.1"),
            ))]);
        let result = run(&GeologicalInput::default(), &reg).unwrap();
        assert_eq!(result.applied_blocks.len(), 1);
        assert_eq!(result.applied_blocks[0].tier, Tier::Reference);
        assert_eq!(result.applied_blocks[0].works_generated, 0);
        assert!(result.works.is_empty());
    }

    #[test]
    fn include_reference_works_config() {
        let reg = BlockRegistry::new(vec![InstructionBlock::new("ref", "4", "Ref")
            .variant(InstructionVariant::reference("ref.x", sp47()))
            .generate(|_| {
                Ok(vec![WorkItem::new(
                    "extra",
                    "Extra",
                    "шт",
                    1.0,
                    WorkCategory::Mandatory,
                    SurveyModule::Office,
                )])
            })]);
        let input = GeologicalInput::default();
        assert!(run(&input, &reg).unwrap().works.is_empty());

        let engine = RulesEngine::with_config(
            reg,
            EngineConfig {
                include_reference_works: true,
                ..Default::default()
            },
        );
        let result = engine.run(&input).unwrap();
        assert_eq!(result.works.len(), 1);
        assert_eq!(result.works[0].category, WorkCategory::Optional);
    }

    #[test]
    fn shared_work_ids_merge_across_blocks() {
        let reg = BlockRegistry::new(vec![emitting("a", "water", 2.0), emitting("b", "water", 3.0)]);
        let result = run(&GeologicalInput::default(), &reg).unwrap();
        assert_eq!(result.works.len(), 1);
        assert_eq!(result.works[0].quantity, 5.0);
        assert_eq!(result.works[0].source_blocks, vec!["a", "b"]);
        assert_eq!(result.applied_blocks[0].works_generated, 1);
        assert_eq!(result.applied_blocks[1].works_generated, 1);
    }

    #[test]
    fn block_with_no_eligible_variant_dropped_silently() {
        let reg = BlockRegistry::new(vec![InstructionBlock::new("piles", "6", "Piles").variant(
            InstructionVariant::mandatory("piles.sp", sp47())
                .when(Condition::test(|i| i.is_pile_foundation())),
        )]);
        let result = run(&GeologicalInput::default(), &reg).unwrap();
        assert!(result.applied_blocks.is_empty());
        assert!(result.diagnostics.is_empty());
    }

    #[test]
    fn config_from_json_defaults() {
        let config = EngineConfig::from_json(r#"{"strict": true}"#).unwrap();
        assert!(config.strict);
        assert!(!config.include_reference_works);
        assert!(EngineConfig::from_json("nope").is_err());
    }
}
