//! Canonical method statement model.
//!
//! [`InstallationStep`] is the post-mapping shape every raw service step
//! is normalized into; [`MethodStatement`] is a completed generation with
//! its optional pass-through sections.

pub mod editor;
pub mod export;
pub mod mapper;

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Risk banding for a single step.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    #[default]
    Medium,
    High,
}

impl RiskLevel {
    /// Parse a loose wire value; unrecognized values yield `None`.
    pub fn parse(value: &str) -> Option<RiskLevel> {
        match value.trim().to_ascii_lowercase().as_str() {
            "low" => Some(RiskLevel::Low),
            "medium" => Some(RiskLevel::Medium),
            "high" => Some(RiskLevel::High),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "low",
            RiskLevel::Medium => "medium",
            RiskLevel::High => "high",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One procedural step of a method statement.
///
/// `step_number` values form a dense 1..N sequence matching list position;
/// the editor re-establishes this after every mutation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstallationStep {
    pub step_number: u32,

    pub title: String,

    /// Free-text body; parsed into sub-steps on demand, never stored
    /// back in parsed form.
    #[serde(default)]
    pub content: String,

    #[serde(default)]
    pub safety: Vec<String>,

    #[serde(default)]
    pub tools_required: Vec<String>,

    #[serde(default)]
    pub materials_needed: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_duration: Option<String>,

    #[serde(default)]
    pub risk_level: RiskLevel,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub linked_hazards: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub bs_references: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub inspection_checkpoints: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub qualifications: Vec<String>,
}

impl InstallationStep {
    /// Structured view of the free-text body, recomputed on demand and
    /// never stored back.
    pub fn parsed_content(&self) -> msgen_parser::ParsedStepContent {
        msgen_parser::parse_step_content(&self.content)
    }

    /// Blank step appended by the editor's add action.
    pub fn placeholder(step_number: u32) -> Self {
        Self {
            step_number,
            title: format!("Step {}", step_number),
            content: String::new(),
            safety: Vec::new(),
            tools_required: Vec::new(),
            materials_needed: Vec::new(),
            estimated_duration: None,
            risk_level: RiskLevel::Medium,
            linked_hazards: Vec::new(),
            bs_references: Vec::new(),
            inspection_checkpoints: Vec::new(),
            qualifications: Vec::new(),
        }
    }
}

/// A completed generation result.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MethodStatement {
    #[serde(default)]
    pub steps: Vec<InstallationStep>,

    /// Opaque pass-through sections; validated only by presence checks.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_metadata: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub executive_summary: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub materials_list: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub testing_requirements: Option<Value>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub regulatory_references: Vec<String>,
}

impl MethodStatement {
    /// Presence check used before rendering the summary section.
    pub fn has_executive_summary(&self) -> bool {
        self.executive_summary
            .as_deref()
            .is_some_and(|s| !s.trim().is_empty())
    }

    /// Presence check for an opaque section: non-null and non-empty.
    pub fn has_section(section: &Option<Value>) -> bool {
        match section {
            Some(Value::Object(map)) => !map.is_empty(),
            Some(Value::Array(items)) => !items.is_empty(),
            Some(Value::String(s)) => !s.trim().is_empty(),
            Some(Value::Null) | None => false,
            Some(_) => true,
        }
    }

    /// Serialize to JSON (pretty printed).
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Parse from JSON.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
