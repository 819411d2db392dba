//! Step body parsing for method statement rendering.
//!
//! The generation service returns each installation step with a free-text
//! `content` body. This crate turns that text into a structured view
//! (overview, numbered sub-steps with bullet items, regulation citations)
//! and splits text into measurement-aware display segments.

mod measure;
mod parser;
mod result;

pub use measure::highlight_measurements;
pub use parser::parse_step_content;
pub use result::{ParsedStepContent, Segment, SubStep};
