//! Citations shared across sections.

use survey_types::Normative;

/// Инженерные изыскания для строительства. Основные положения.
pub(crate) fn sp47(section: &str) -> Normative {
    Normative::new("СП 47.13330.2016", section)
}

/// Инженерно-геологические изыскания для строительства.
pub(crate) fn sp446(section: &str) -> Normative {
    Normative::new("СП 446.1325800.2019", section)
}

/// Инженерно-геологические изыскания. Части I–VI.
pub(crate) fn sp11_105(section: &str) -> Normative {
    Normative::new("СП 11-105-97", section)
}

pub(crate) fn gost(designation: &str) -> Normative {
    Normative::new(designation, "")
}
