//! Regulatory precedence: variant tiers, normative document classes, and
//! citations.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::work::WorkCategory;

// ---------------------------------------------------------------------------
// Tier — how binding a variant is
// ---------------------------------------------------------------------------

/// Priority tier of an instruction variant.
///
/// Declaration order is precedence order: `Mandatory < Recommended < Reference`
/// under `Ord`, so the strongest tier is the minimum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Tier {
    Mandatory,
    Recommended,
    Reference,
}

impl Tier {
    /// The strictest work category a variant of this tier may emit.
    pub fn category_ceiling(self) -> WorkCategory {
        match self {
            Tier::Mandatory => WorkCategory::Mandatory,
            Tier::Recommended => WorkCategory::Recommended,
            Tier::Reference => WorkCategory::Optional,
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Tier::Mandatory => "MANDATORY",
            Tier::Recommended => "RECOMMENDED",
            Tier::Reference => "REFERENCE",
        };
        f.write_str(s)
    }
}

// ---------------------------------------------------------------------------
// DocumentClass — which kind of normative document governs
// ---------------------------------------------------------------------------

/// Class of a normative document. Declaration order is precedence order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentClass {
    /// Свод правил (СП).
    Rules,
    /// Санитарные и государственные нормы (СН, ГН, СанПиН).
    StateNorms,
    /// Строительные нормы и правила (СНиП).
    BuildingCode,
    /// ГОСТ Р.
    StateStandard,
    /// Межгосударственный ГОСТ.
    NationalStandard,
    /// Ведомственные строительные нормы (ВСН).
    Departmental,
    Other,
}

impl DocumentClass {
    /// Infer the class from a document designation such as `"СП 47.13330.2016"`.
    pub fn from_designation(designation: &str) -> Self {
        let upper = designation.trim().to_uppercase();
        let starts = |prefix: &str| {
            upper.starts_with(prefix)
                && upper[prefix.len()..]
                    .chars()
                    .next()
                    .map_or(true, |c| !c.is_alphabetic())
        };
        if starts("СП") {
            DocumentClass::Rules
        } else if starts("СН") || starts("ГН") || starts("САНПИН") {
            DocumentClass::StateNorms
        } else if starts("СНИП") {
            DocumentClass::BuildingCode
        } else if upper.starts_with("ГОСТ Р") {
            DocumentClass::StateStandard
        } else if starts("ГОСТ") {
            DocumentClass::NationalStandard
        } else if starts("ВСН") {
            DocumentClass::Departmental
        } else {
            DocumentClass::Other
        }
    }
}

// ---------------------------------------------------------------------------
// Normative — a citation
// ---------------------------------------------------------------------------

/// A normative citation: document, optional clause, and document class.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Normative {
    pub document: String,
    pub section: Option<String>,
    pub class: DocumentClass,
}

impl Normative {
    /// Build a citation, inferring the document class from its designation.
    pub fn new(document: impl Into<String>, section: impl Into<String>) -> Self {
        let document = document.into();
        let section = section.into();
        Self {
            class: DocumentClass::from_designation(&document),
            section: (!section.trim().is_empty()).then_some(section),
            document,
        }
    }

    /// Override the inferred class.
    pub fn with_class(mut self, class: DocumentClass) -> Self {
        self.class = class;
        self
    }
}

impl fmt::Display for Normative {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.section {
            Some(section) => write!(f, "{}, п. {}", self.document, section),
            None => f.write_str(&self.document),
        }
    }
}
