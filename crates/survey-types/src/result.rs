//! Records produced by a rules engine run.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::normative::{Normative, Tier};
use crate::work::{SurveyModule, WorkItem};

/// A named quantity a block computed for explanation or recommendation display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculatedValue {
    pub name: String,
    pub value: f64,
    pub unit: String,
    /// 0.0 ..= 1.0
    pub confidence: f64,
    pub rationale: String,
}

impl CalculatedValue {
    pub fn new(name: impl Into<String>, value: f64, unit: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value,
            unit: unit.into(),
            confidence: 1.0,
            rationale: String::new(),
        }
    }

    pub fn confidence(mut self, confidence: f64) -> Self {
        self.confidence = confidence.clamp(0.0, 1.0);
        self
    }

    pub fn because(mut self, rationale: impl Into<String>) -> Self {
        self.rationale = rationale.into();
        self
    }
}

/// Audit record of a selected block and its winning variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppliedBlock {
    pub block_id: String,
    pub section: String,
    pub title: String,
    pub variant_id: String,
    pub tier: Tier,
    pub normative: Normative,
    pub recommendation: String,
    pub calculated_values: Vec<CalculatedValue>,
    /// Work items the block emitted before deduplication. Zero is legitimate.
    pub works_generated: usize,
}

/// Where in a block's evaluation a rule failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleStage {
    Condition,
    VariantEligibility,
    Calculation,
    Generation,
}

impl fmt::Display for RuleStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RuleStage::Condition => "condition",
            RuleStage::VariantEligibility => "variant eligibility",
            RuleStage::Calculation => "calculation",
            RuleStage::Generation => "generation",
        };
        f.write_str(s)
    }
}

/// A recovered rule failure. The block was excluded; the run continued.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleDiagnostic {
    pub block_id: String,
    pub variant_id: Option<String>,
    pub stage: RuleStage,
    pub message: String,
}

/// Summary counts over the final work list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Statistics {
    pub total_works: usize,
    pub mandatory_works: usize,
    pub recommended_works: usize,
    pub optional_works: usize,
    pub blocks_applied: usize,
    pub works_by_module: BTreeMap<SurveyModule, usize>,
    /// Module → unit → summed quantity.
    pub quantities_by_module: BTreeMap<SurveyModule, BTreeMap<String, f64>>,
}

impl Statistics {
    /// Total quantity for one module and unit, e.g. drilling metres.
    pub fn quantity(&self, module: SurveyModule, unit: &str) -> f64 {
        self.quantities_by_module
            .get(&module)
            .and_then(|units| units.get(unit))
            .copied()
            .unwrap_or(0.0)
    }
}

/// The aggregate output of one engine run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RulesEngineResult {
    pub works: Vec<WorkItem>,
    pub applied_blocks: Vec<AppliedBlock>,
    pub statistics: Statistics,
    pub diagnostics: Vec<RuleDiagnostic>,
}

impl RulesEngineResult {
    pub fn work(&self, id: &str) -> Option<&WorkItem> {
        self.works.iter().find(|w| w.id == id)
    }

    pub fn applied(&self, block_id: &str) -> Option<&AppliedBlock> {
        self.applied_blocks.iter().find(|b| b.block_id == block_id)
    }

    /// Works that the given block contributed to.
    pub fn works_from<'a>(&'a self, block_id: &'a str) -> impl Iterator<Item = &'a WorkItem> + 'a {
        self.works
            .iter()
            .filter(move |w| w.source_blocks.iter().any(|b| b == block_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn calculated_value_confidence_clamped() {
        let v = CalculatedValue::new("depth", 12.0, "м").confidence(1.7);
        assert_eq!(v.confidence, 1.0);
        let v = CalculatedValue::new("depth", 12.0, "м").confidence(-0.5);
        assert_eq!(v.confidence, 0.0);
    }

    #[test]
    fn statistics_serialize_module_keys() {
        let mut stats = Statistics::default();
        stats
            .quantities_by_module
            .entry(SurveyModule::Drilling)
            .or_default()
            .insert("м".into(), 42.0);
        let json = serde_json::to_value(&stats).unwrap();
        assert_eq!(json["quantitiesByModule"]["drilling"]["м"], 42.0);
        assert_eq!(stats.quantity(SurveyModule::Drilling, "м"), 42.0);
        assert_eq!(stats.quantity(SurveyModule::Laboratory, "шт"), 0.0);
    }

    #[test]
    fn rule_stage_display() {
        assert_eq!(RuleStage::VariantEligibility.to_string(), "variant eligibility");
    }
}
