//! Scoring model, report snapshot and document rendering for guard duty personal
//! evaluation reports ("Informe Personal de la Guardia").

pub mod config;
pub mod error;
pub mod evaluation;
pub mod render;
pub mod session;
pub mod telemetry;
