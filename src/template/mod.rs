//! Marker scanning and fixed-point rendering
//!
//! The scanner finds `{{ ... }}` expression regions; the engine evaluates
//! them against the shared data context and substitutes their output,
//! repeating until a scan pass finds no markers.

mod engine;
pub mod scanner;

pub use engine::{RenderLimits, TemplateRenderer};
pub use scanner::{scan, Marker};
