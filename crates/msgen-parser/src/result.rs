//! Parser result types.

use serde::Serialize;

/// A titled group of instruction items extracted from step content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubStep {
    pub title: String,
    pub items: Vec<String>,
}

/// Structured view of a step's free-text body.
///
/// Derived on demand from `content`; never stored back.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ParsedStepContent {
    /// Prose before the first numbered heading, space-joined.
    pub overview: String,
    /// Numbered headings with their bullet items.
    pub sub_steps: Vec<SubStep>,
    /// Regulation citations, deduplicated in first-occurrence order.
    /// Consumers must treat this as an unordered set.
    pub regulations: Vec<String>,
}

impl ParsedStepContent {
    /// True when the body produced no structure at all.
    pub fn is_empty(&self) -> bool {
        self.overview.is_empty() && self.sub_steps.is_empty() && self.regulations.is_empty()
    }
}

/// One span of text, classified for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "text", rename_all = "lowercase")]
pub enum Segment {
    Plain(String),
    Measurement(String),
}

impl Segment {
    /// The raw text of this span.
    pub fn text(&self) -> &str {
        match self {
            Segment::Plain(text) | Segment::Measurement(text) => text,
        }
    }

    /// True for spans that should be emphasised as quantities.
    pub fn is_measurement(&self) -> bool {
        matches!(self, Segment::Measurement(_))
    }
}
