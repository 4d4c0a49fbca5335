//! Section modules of the built-in registry. Each exposes `SECTION` and a
//! `blocks()` constructor; [`crate::builtin_registry`] concatenates them.

pub mod corrosion;
pub mod drilling;
pub mod field;
pub mod hazards;
pub mod hydrogeology;
pub mod laboratory;
pub mod office;
pub mod procedure;
pub mod seismic;
pub mod special_soils;
