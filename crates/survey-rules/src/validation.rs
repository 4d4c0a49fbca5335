//! Registry validation: lint rules and diagnostics.
//!
//! Structural checks over a [`BlockRegistry`]. Call [`validate`] for advisory
//! diagnostics or [`validate_or_raise`] to fail on the first structural error
//! with the matching configuration error. Malformed conditions are reported as
//! errors but never abort a run: the engine records them per block instead.

use std::collections::HashSet;

use survey_types::{GeologicalInput, SurveyError};

use crate::block::Condition;
use crate::condition::parse_condition;
use crate::ordering::sort_blocks_with_dependencies;
use crate::registry::BlockRegistry;

// ---------------------------------------------------------------------------
// Diagnostic types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub rule: String,
    pub severity: Severity,
    pub message: String,
    pub block_id: Option<String>,
    pub fix: Option<String>,
    /// Configuration error this finding maps to. Only set for structural
    /// errors that make the registry unusable.
    kind: Option<ErrorKind>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
    Info,
}

#[derive(Debug, Clone)]
enum ErrorKind {
    EmptyVariants,
    DuplicateBlock,
    UnknownDependency(String),
    DependencyCycle,
    Invalid,
}

impl Diagnostic {
    /// Whether this finding stops the engine before any block is evaluated.
    pub fn aborts_run(&self) -> bool {
        self.kind.is_some()
    }


    fn into_error(self) -> SurveyError {
        let block = self.block_id.unwrap_or_default();
        match self.kind {
            Some(ErrorKind::EmptyVariants) => SurveyError::EmptyVariants { block },
            Some(ErrorKind::DuplicateBlock) => SurveyError::DuplicateBlock { block },
            Some(ErrorKind::UnknownDependency(dependency)) => {
                SurveyError::UnknownDependency { block, dependency }
            }
            Some(ErrorKind::DependencyCycle) => SurveyError::DependencyCycle { block },
            Some(ErrorKind::Invalid) | None => SurveyError::ValidationError(self.message),
        }
    }
}

// ---------------------------------------------------------------------------
// LintRule trait
// ---------------------------------------------------------------------------

pub trait LintRule: Send + Sync {
    fn name(&self) -> &str;
    fn apply(&self, registry: &BlockRegistry) -> Vec<Diagnostic>;
}

fn error(rule: &dyn LintRule, block: &str, message: String, fix: String, kind: ErrorKind) -> Diagnostic {
    Diagnostic {
        rule: rule.name().into(),
        severity: Severity::Error,
        message,
        block_id: Some(block.to_string()),
        fix: Some(fix),
        kind: Some(kind),
    }
}

/// Error-severity finding the engine recovers from at run time.
fn recoverable_error(rule: &dyn LintRule, block: &str, message: String, fix: String) -> Diagnostic {
    Diagnostic {
        rule: rule.name().into(),
        severity: Severity::Error,
        message,
        block_id: Some(block.to_string()),
        fix: Some(fix),
        kind: None,
    }
}

fn warning(rule: &dyn LintRule, block: &str, message: String, fix: String) -> Diagnostic {
    Diagnostic {
        rule: rule.name().into(),
        severity: Severity::Warning,
        message,
        block_id: Some(block.to_string()),
        fix: Some(fix),
        kind: None,
    }
}

// ---------------------------------------------------------------------------
// Rules
// ---------------------------------------------------------------------------

struct VariantsPresentRule;
impl LintRule for VariantsPresentRule {
    fn name(&self) -> &str { "variants_present" }
    fn apply(&self, registry: &BlockRegistry) -> Vec<Diagnostic> {
        registry
            .blocks()
            .iter()
            .filter(|b| b.variants.is_empty())
            .map(|b| {
                error(
                    self,
                    &b.id,
                    format!("Block '{}' declares no variants", b.id),
                    "Declare at least one variant with a normative citation".into(),
                    ErrorKind::EmptyVariants,
                )
            })
            .collect()
    }
}

struct UniqueBlockIdsRule;
impl LintRule for UniqueBlockIdsRule {
    fn name(&self) -> &str { "unique_block_ids" }
    fn apply(&self, registry: &BlockRegistry) -> Vec<Diagnostic> {
        let mut seen = HashSet::new();
        registry
            .blocks()
            .iter()
            .filter(|b| !seen.insert(b.id.as_str()))
            .map(|b| {
                error(
                    self,
                    &b.id,
                    format!("Block id '{}' is declared more than once", b.id),
                    format!("Rename one of the '{}' blocks", b.id),
                    ErrorKind::DuplicateBlock,
                )
            })
            .collect()
    }
}

struct UniqueVariantIdsRule;
impl LintRule for UniqueVariantIdsRule {
    fn name(&self) -> &str { "unique_variant_ids" }
    fn apply(&self, registry: &BlockRegistry) -> Vec<Diagnostic> {
        let mut diags = Vec::new();
        for block in registry.blocks() {
            let mut seen = HashSet::new();
            for variant in &block.variants {
                if !seen.insert(variant.id.as_str()) {
                    diags.push(warning(
                        self,
                        &block.id,
                        format!(
                            "Block '{}' declares variant '{}' more than once",
                            block.id, variant.id
                        ),
                        "Give every variant of a block a distinct id".into(),
                    ));
                }
            }
        }
        diags
    }
}

struct DependencyExistsRule;
impl LintRule for DependencyExistsRule {
    fn name(&self) -> &str { "dependency_exists" }
    fn apply(&self, registry: &BlockRegistry) -> Vec<Diagnostic> {
        let mut diags = Vec::new();
        for block in registry.blocks() {
            for dep in &block.depends_on {
                if !registry.contains(dep) {
                    diags.push(error(
                        self,
                        &block.id,
                        format!("Block '{}' depends on unknown block '{dep}'", block.id),
                        format!("Add block '{dep}' or remove the dependency"),
                        ErrorKind::UnknownDependency(dep.clone()),
                    ));
                }
            }
        }
        diags
    }
}

struct DependencyAcyclicRule;
impl LintRule for DependencyAcyclicRule {
    fn name(&self) -> &str { "dependency_acyclic" }
    fn apply(&self, registry: &BlockRegistry) -> Vec<Diagnostic> {
        let all: Vec<_> = registry.blocks().iter().collect();
        match sort_blocks_with_dependencies(&all) {
            Ok(_) => vec![],
            Err(SurveyError::DependencyCycle { block }) => vec![error(
                self,
                &block,
                format!("Block '{block}' is part of a dependency cycle"),
                "Dependencies must point to blocks with a lower priority number".into(),
                ErrorKind::DependencyCycle,
            )],
            Err(other) => vec![Diagnostic {
                rule: self.name().into(),
                severity: Severity::Error,
                message: other.to_string(),
                block_id: None,
                fix: None,
                kind: Some(ErrorKind::Invalid),
            }],
        }
    }
}

struct DependencyPriorityRule;
impl LintRule for DependencyPriorityRule {
    fn name(&self) -> &str { "dependency_priority" }
    fn apply(&self, registry: &BlockRegistry) -> Vec<Diagnostic> {
        let mut diags = Vec::new();
        for block in registry.blocks() {
            for dep in &block.depends_on {
                let Some(target) = registry.block(dep) else {
                    continue; // DependencyExistsRule reports this
                };
                if target.priority > block.priority {
                    diags.push(warning(
                        self,
                        &block.id,
                        format!(
                            "Block '{}' (priority {}) depends on '{}' with higher priority number {}",
                            block.id, block.priority, dep, target.priority
                        ),
                        format!("Lower the priority number of '{dep}'"),
                    ));
                }
            }
        }
        diags
    }
}

struct ConditionSyntaxRule;
impl LintRule for ConditionSyntaxRule {
    fn name(&self) -> &str { "condition_syntax" }
    fn apply(&self, registry: &BlockRegistry) -> Vec<Diagnostic> {
        let mut diags = Vec::new();
        for block in registry.blocks() {
            let conditions = std::iter::once((None, &block.condition)).chain(
                block
                    .variants
                    .iter()
                    .map(|v| (Some(v.id.as_str()), &v.eligibility)),
            );
            for (variant, condition) in conditions {
                let Condition::Expr(source) = condition else {
                    continue;
                };
                let owner = match variant {
                    Some(v) => format!("variant '{v}' of block '{}'", block.id),
                    None => format!("block '{}'", block.id),
                };
                match parse_condition(source) {
                    Err(err) => {
                        let reason = match err {
                            SurveyError::ConditionParse { message, .. } => message,
                            other => other.to_string(),
                        };
                        diags.push(recoverable_error(
                            self,
                            &block.id,
                            format!("Condition '{source}' on {owner} is malformed: {reason}"),
                            "Fix the condition expression syntax".into(),
                        ));
                    }
                    Ok(expr) => {
                        for clause in expr
                            .clauses
                            .iter()
                            .filter(|c| !GeologicalInput::is_known_field(&c.key))
                        {
                            diags.push(warning(
                                self,
                                &block.id,
                                format!(
                                    "Condition on {owner} references unknown field '{}'",
                                    clause.key
                                ),
                                "Use a camelCase GeologicalInput field name".into(),
                            ));
                        }
                    }
                }
            }
        }
        diags
    }
}

struct WorkSourceRule;
impl LintRule for WorkSourceRule {
    fn name(&self) -> &str { "work_source" }
    fn apply(&self, registry: &BlockRegistry) -> Vec<Diagnostic> {
        registry
            .blocks()
            .iter()
            .filter(|b| b.generate.is_some())
            .filter(|b| !b.variants.is_empty() && b.variants.iter().all(|v| !v.emits_works))
            .map(|b| Diagnostic {
                rule: self.name().into(),
                severity: Severity::Info,
                message: format!(
                    "Block '{}' has a work generator but no variant emits works",
                    b.id
                ),
                block_id: Some(b.id.clone()),
                fix: None,
                kind: None,
            })
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Run all built-in lint rules and return collected diagnostics.
pub fn validate(registry: &BlockRegistry) -> Vec<Diagnostic> {
    let rules: Vec<Box<dyn LintRule>> = vec![
        Box::new(VariantsPresentRule),
        Box::new(UniqueBlockIdsRule),
        Box::new(UniqueVariantIdsRule),
        Box::new(DependencyExistsRule),
        Box::new(DependencyAcyclicRule),
        Box::new(DependencyPriorityRule),
        Box::new(ConditionSyntaxRule),
        Box::new(WorkSourceRule),
    ];

    let mut diagnostics = Vec::new();
    for rule in &rules {
        diagnostics.extend(rule.apply(registry));
    }
    diagnostics
}

/// Run all lint rules; return the first structural error as the matching
/// configuration error. Recoverable errors are logged and returned with the
/// other diagnostics.
pub fn validate_or_raise(registry: &BlockRegistry) -> survey_types::Result<Vec<Diagnostic>> {
    let diagnostics = validate(registry);
    if let Some(first) = diagnostics.iter().find(|d| d.aborts_run()).cloned() {
        tracing::error!(rule = %first.rule, "{}", first.message);
        return Err(first.into_error());
    }
    for d in &diagnostics {
        match d.severity {
            Severity::Error => tracing::warn!(rule = %d.rule, "{}", d.message),
            Severity::Warning => tracing::debug!(rule = %d.rule, "{}", d.message),
            Severity::Info => {}
        }
    }
    Ok(diagnostics)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
