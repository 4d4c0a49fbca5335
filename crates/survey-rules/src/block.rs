//! Instruction blocks and their variants: the unit of regulatory knowledge
//! the engine evaluates.
//!
//! A block is a plain record holding injected pure functions. Knowledge-base
//! sections build blocks with the builder methods below and concatenate them
//! into a [`BlockRegistry`](crate::registry::BlockRegistry).

use std::fmt;
use std::sync::Arc;

use survey_types::{CalculatedValue, GeologicalInput, Normative, Result, Tier, WorkItem};

use crate::condition::{evaluate_condition, parse_condition};

pub type PredicateFn = Arc<dyn Fn(&GeologicalInput) -> Result<bool> + Send + Sync>;
pub type CalculateFn = Arc<dyn Fn(&GeologicalInput) -> Result<Vec<CalculatedValue>> + Send + Sync>;
pub type GenerateFn = Arc<dyn Fn(&GeologicalInput) -> Result<Vec<WorkItem>> + Send + Sync>;

// ---------------------------------------------------------------------------
// Condition
// ---------------------------------------------------------------------------

/// Applicability test for a block or a variant.
#[derive(Clone, Default)]
pub enum Condition {
    #[default]
    Always,
    /// Declarative expression in the [condition language](crate::condition).
    Expr(String),
    Predicate(PredicateFn),
}

impl Condition {
    pub fn expr(source: impl Into<String>) -> Self {
        Condition::Expr(source.into())
    }

    pub fn predicate(f: impl Fn(&GeologicalInput) -> Result<bool> + Send + Sync + 'static) -> Self {
        Condition::Predicate(Arc::new(f))
    }

    /// Infallible predicate shorthand.
    pub fn test(f: impl Fn(&GeologicalInput) -> bool + Send + Sync + 'static) -> Self {
        Condition::Predicate(Arc::new(move |input| Ok(f(input))))
    }

    /// Evaluate against `input`. `Err` means the rule itself is broken.
    pub fn evaluate(&self, input: &GeologicalInput) -> Result<bool> {
        match self {
            Condition::Always => Ok(true),
            Condition::Expr(source) => {
                let expr = parse_condition(source)?;
                Ok(evaluate_condition(&expr, &|key| input.field(key)))
            }
            Condition::Predicate(f) => f(input),
        }
    }

    pub fn is_always(&self) -> bool {
        matches!(self, Condition::Always)
    }
}

impl fmt::Debug for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Condition::Always => f.write_str("Always"),
            Condition::Expr(source) => f.debug_tuple("Expr").field(source).finish(),
            Condition::Predicate(_) => f.write_str("Predicate(<fn>)"),
        }
    }
}

// ---------------------------------------------------------------------------
// InstructionVariant
// ---------------------------------------------------------------------------

/// One normative-source-specific way of satisfying a block.
#[derive(Debug, Clone)]
pub struct InstructionVariant {
    pub id: String,
    pub tier: Tier,
    pub normative: Normative,
    pub recommendation: String,
    /// Recommended-value hints, e.g. `("minDepth", "15 м")`.
    pub recommended_values: Vec<(String, String)>,
    /// Narrower applicability than the parent block.
    pub eligibility: Condition,
    /// Whether this variant, when it wins, produces billable work.
    pub emits_works: bool,
}

impl InstructionVariant {
    /// Create a variant. Reference-tier variants do not emit works unless
    /// [`emitting_works`](Self::emitting_works) says otherwise.
    pub fn new(id: impl Into<String>, tier: Tier, normative: Normative) -> Self {
        Self {
            id: id.into(),
            tier,
            normative,
            recommendation: String::new(),
            recommended_values: Vec::new(),
            eligibility: Condition::Always,
            emits_works: tier != Tier::Reference,
        }
    }

    pub fn mandatory(id: impl Into<String>, normative: Normative) -> Self {
        Self::new(id, Tier::Mandatory, normative)
    }

    pub fn recommended(id: impl Into<String>, normative: Normative) -> Self {
        Self::new(id, Tier::Recommended, normative)
    }

    pub fn reference(id: impl Into<String>, normative: Normative) -> Self {
        Self::new(id, Tier::Reference, normative)
    }

    pub fn recommend(mut self, text: impl Into<String>) -> Self {
        self.recommendation = text.into();
        self
    }

    pub fn hint(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.recommended_values.push((name.into(), value.into()));
        self
    }

    pub fn when(mut self, eligibility: Condition) -> Self {
        self.eligibility = eligibility;
        self
    }

    pub fn emitting_works(mut self, emits: bool) -> Self {
        self.emits_works = emits;
        self
    }
}

// ---------------------------------------------------------------------------
// InstructionBlock
// ---------------------------------------------------------------------------

/// One regulatory provision: a condition, candidate variants, and the
/// functions that turn a selection into quantities and work items.
#[derive(Clone)]
pub struct InstructionBlock {
    pub id: String,
    pub section: String,
    pub title: String,
    pub description: String,
    /// Ordering hint; lower numbers are resolved first.
    pub priority: i32,
    pub tags: Vec<String>,
    /// Blocks that must be resolved before this one when both apply.
    pub depends_on: Vec<String>,
    pub condition: Condition,
    pub variants: Vec<InstructionVariant>,
    pub calculate: Option<CalculateFn>,
    pub generate: Option<GenerateFn>,
}

impl InstructionBlock {
    pub fn new(
        id: impl Into<String>,
        section: impl Into<String>,
        title: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            section: section.into(),
            title: title.into(),
            description: String::new(),
            priority: 100,
            tags: Vec::new(),
            depends_on: Vec::new(),
            condition: Condition::Always,
            variants: Vec::new(),
            calculate: None,
            generate: None,
        }
    }

    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    pub fn depends_on(mut self, block_id: impl Into<String>) -> Self {
        self.depends_on.push(block_id.into());
        self
    }

    pub fn when(mut self, condition: Condition) -> Self {
        self.condition = condition;
        self
    }

    /// Infallible predicate shorthand for [`when`](Self::when).
    pub fn applies_if(
        self,
        f: impl Fn(&GeologicalInput) -> bool + Send + Sync + 'static,
    ) -> Self {
        self.when(Condition::test(f))
    }

    pub fn variant(mut self, variant: InstructionVariant) -> Self {
        self.variants.push(variant);
        self
    }

    pub fn calculate(
        mut self,
        f: impl Fn(&GeologicalInput) -> Result<Vec<CalculatedValue>> + Send + Sync + 'static,
    ) -> Self {
        self.calculate = Some(Arc::new(f));
        self
    }

    pub fn generate(
        mut self,
        f: impl Fn(&GeologicalInput) -> Result<Vec<WorkItem>> + Send + Sync + 'static,
    ) -> Self {
        self.generate = Some(Arc::new(f));
        self
    }

    pub fn variant_by_id(&self, id: &str) -> Option<&InstructionVariant> {
        self.variants.iter().find(|v| v.id == id)
    }
}

impl fmt::Debug for InstructionBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InstructionBlock")
            .field("id", &self.id)
            .field("section", &self.section)
            .field("priority", &self.priority)
            .field("depends_on", &self.depends_on)
            .field("condition", &self.condition)
            .field("variants", &self.variants)
            .field("calculate", &self.calculate.is_some())
            .field("generate", &self.generate.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use survey_types::SurveyError;

    fn sp47() -> Normative {
        Normative::new("СП 47.13330.2016", "6.3")
    }

    #[test]
    fn reference_variants_do_not_emit_by_default() {
        assert!(InstructionVariant::mandatory("m", sp47()).emits_works);
        assert!(InstructionVariant::recommended("r", sp47()).emits_works);
        assert!(!InstructionVariant::reference("x", sp47()).emits_works);
        assert!(
            InstructionVariant::reference("x", sp47())
                .emitting_works(true)
                .emits_works
        );
    }

    #[test]
    fn condition_always_and_expr() {
        let input = GeologicalInput {
            has_groundwater: Some(true),
            ..Default::default()
        };
        assert!(Condition::Always.evaluate(&input).unwrap());
        assert!(Condition::expr("hasGroundwater=true").evaluate(&input).unwrap());
        assert!(!Condition::expr("hasGroundwater=false").evaluate(&input).unwrap());
    }

    #[test]
    fn malformed_expression_is_an_error() {
        let err = Condition::expr("hasGroundwater")
            .evaluate(&GeologicalInput::default())
            .unwrap_err();
        assert!(err.to_string().starts_with("Malformed condition 'hasGroundwater'"));
    }

    #[test]
    fn predicate_errors_propagate() {
        let cond = Condition::predicate(|_| Err(SurveyError::missing("floors")));
        assert!(cond.evaluate(&GeologicalInput::default()).is_err());
    }

    #[test]
    fn builder_collects_parts() {
        let block = InstructionBlock::new("b", "6", "Block")
            .priority(10)
            .depends_on("a")
            .tag("drilling")
            .applies_if(|i| i.has_groundwater())
            .variant(InstructionVariant::mandatory("b.sp", sp47()))
            .generate(|_| Ok(Vec::new()));
        assert_eq!(block.priority, 10);
        assert_eq!(block.depends_on, vec!["a"]);
        assert!(block.generate.is_some());
        assert!(block.calculate.is_none());
        assert!(block.variant_by_id("b.sp").is_some());
        assert!(!block.condition.is_always());
        assert!(format!("{block:?}").contains("Predicate(<fn>)"));
    }
}
