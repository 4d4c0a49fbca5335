//! Built-in regulatory knowledge for engineering-geological survey scoping.
//!
//! Each module under [`sections`] contributes the instruction blocks of one
//! discipline. [`builtin_registry`] concatenates them in a fixed order, so the
//! registry is the same on every call.

mod measure;
mod norms;
pub mod sections;

use survey_rules::BlockRegistry;

use sections::{
    corrosion, drilling, field, hazards, hydrogeology, laboratory, office, procedure, seismic,
    special_soils,
};

/// Assemble the reference registry.
pub fn builtin_registry() -> BlockRegistry {
    let registry = BlockRegistry::from_sections([
        procedure::blocks(),
        drilling::blocks(),
        field::blocks(),
        laboratory::blocks(),
        hydrogeology::blocks(),
        corrosion::blocks(),
        special_soils::blocks(),
        seismic::blocks(),
        hazards::blocks(),
        office::blocks(),
    ]);
    tracing::debug!(
        blocks = registry.len(),
        sections = registry.sections().len(),
        "Built-in registry assembled"
    );
    registry
}
