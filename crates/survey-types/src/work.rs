//! Work items: the billable output of a rules engine run.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::normative::Normative;

/// How strongly a work item is required. Declaration order is strictness
/// order, so the stricter of two categories is the minimum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkCategory {
    Mandatory,
    Recommended,
    Optional,
}

impl fmt::Display for WorkCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            WorkCategory::Mandatory => "mandatory",
            WorkCategory::Recommended => "recommended",
            WorkCategory::Optional => "optional",
        };
        f.write_str(s)
    }
}

/// Survey discipline a work item belongs to. Declaration order is report order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SurveyModule {
    Drilling,
    FieldTests,
    Laboratory,
    Hydrogeology,
    Geophysics,
    Hazards,
    Office,
}

impl fmt::Display for SurveyModule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SurveyModule::Drilling => "drilling",
            SurveyModule::FieldTests => "field_tests",
            SurveyModule::Laboratory => "laboratory",
            SurveyModule::Hydrogeology => "hydrogeology",
            SurveyModule::Geophysics => "geophysics",
            SurveyModule::Hazards => "hazards",
            SurveyModule::Office => "office",
        };
        f.write_str(s)
    }
}

/// One concrete unit of survey work.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkItem {
    pub id: String,
    pub name: String,
    pub description: String,
    pub unit: String,
    pub quantity: f64,
    pub category: WorkCategory,
    pub module: SurveyModule,
    pub normative: Option<Normative>,
    pub tags: Vec<String>,
    pub price_table_code: Option<String>,
    /// Ids of the instruction blocks that contributed this item.
    pub source_blocks: Vec<String>,
}

impl WorkItem {
    /// Create a work item with empty description, tags and provenance.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        unit: impl Into<String>,
        quantity: f64,
        category: WorkCategory,
        module: SurveyModule,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            unit: unit.into(),
            quantity,
            category,
            module,
            normative: None,
            tags: Vec::new(),
            price_table_code: None,
            source_blocks: Vec::new(),
        }
    }

    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn cite(mut self, normative: Normative) -> Self {
        self.normative = Some(normative);
        self
    }

    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    pub fn price_code(mut self, code: impl Into<String>) -> Self {
        self.price_table_code = Some(code.into());
        self
    }

    /// `true` when the quantity is positive and finite, i.e. the item is billable.
    pub fn has_billable_quantity(&self) -> bool {
        self.quantity.is_finite() && self.quantity > 0.0
    }

    /// Fold `other` (same id) into `self`: quantities add, the stricter
    /// category wins and brings its citation, tags and sources are unioned.
    pub fn absorb(&mut self, other: WorkItem) {
        debug_assert_eq!(self.id, other.id);
        if self.unit != other.unit {
            tracing::warn!(
                work = %self.id,
                kept = %self.unit,
                dropped = %other.unit,
                "Merging work items with different units"
            );
        }
        self.quantity += other.quantity;
        if other.category < self.category {
            self.category = other.category;
            if other.normative.is_some() {
                self.normative = other.normative;
            }
        } else if self.normative.is_none() {
            self.normative = other.normative;
        }
        if self.price_table_code.is_none() {
            self.price_table_code = other.price_table_code;
        }
        for tag in other.tags {
            if !self.tags.contains(&tag) {
                self.tags.push(tag);
            }
        }
        for block in other.source_blocks {
            if !self.source_blocks.contains(&block) {
                self.source_blocks.push(block);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: &str, qty: f64, category: WorkCategory) -> WorkItem {
        WorkItem::new(id, "Test work", "шт", qty, category, SurveyModule::Laboratory)
    }

    #[test]
    fn category_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&WorkCategory::Mandatory).unwrap(),
            "\"mandatory\""
        );
        let c: WorkCategory = serde_json::from_str("\"optional\"").unwrap();
        assert_eq!(c, WorkCategory::Optional);
    }

    #[test]
    fn module_serializes_snake_case() {
        assert_eq!(
            serde_json::to_string(&SurveyModule::FieldTests).unwrap(),
            "\"field_tests\""
        );
    }

    #[test]
    fn billable_quantity() {
        assert!(item("a", 1.5, WorkCategory::Optional).has_billable_quantity());
        assert!(!item("a", 0.0, WorkCategory::Optional).has_billable_quantity());
        assert!(!item("a", -2.0, WorkCategory::Optional).has_billable_quantity());
        assert!(!item("a", f64::NAN, WorkCategory::Optional).has_billable_quantity());
        assert!(!item("a", f64::INFINITY, WorkCategory::Optional).has_billable_quantity());
    }

    #[test]
    fn absorb_sums_and_escalates() {
        let mut a = item("water", 2.0, WorkCategory::Recommended)
            .cite(Normative::new("ГОСТ 31861-2012", ""))
            .tag("water");
        a.source_blocks.push("b1".into());
        let mut b = item("water", 3.0, WorkCategory::Mandatory)
            .cite(Normative::new("СП 28.13330.2017", "5.1"))
            .tag("water")
            .tag("corrosion");
        b.source_blocks.push("b2".into());

        a.absorb(b);
        assert_eq!(a.quantity, 5.0);
        assert_eq!(a.category, WorkCategory::Mandatory);
        assert_eq!(a.normative.unwrap().document, "СП 28.13330.2017");
        assert_eq!(a.tags, vec!["water", "corrosion"]);
        assert_eq!(a.source_blocks, vec!["b1", "b2"]);
    }

    #[test]
    fn absorb_keeps_stricter_existing_category() {
        let mut a = item("x", 1.0, WorkCategory::Mandatory);
        a.absorb(item("x", 1.0, WorkCategory::Optional));
        assert_eq!(a.category, WorkCategory::Mandatory);
        assert_eq!(a.quantity, 2.0);
    }
}
