//! Export payload for the PDF rendering service.
//!
//! The published render schema requires every field to be present:
//! optional sections are projected with empty defaults (empty string,
//! empty list, `{}`), never null.

use std::fs;
use std::io;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::{InstallationStep, MethodStatement, RiskLevel};

/// One step as the PDF service expects it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportStep {
    pub step_number: u32,
    pub title: String,
    pub content: String,
    pub safety: Vec<String>,
    pub tools_required: Vec<String>,
    pub materials_needed: Vec<String>,
    pub estimated_duration: String,
    pub risk_level: RiskLevel,
    pub linked_hazards: Vec<String>,
    pub bs_references: Vec<String>,
    pub inspection_checkpoints: Vec<String>,
    pub qualifications: Vec<String>,
}

impl From<&InstallationStep> for ExportStep {
    fn from(step: &InstallationStep) -> Self {
        Self {
            step_number: step.step_number,
            title: step.title.clone(),
            content: step.content.clone(),
            safety: step.safety.clone(),
            tools_required: step.tools_required.clone(),
            materials_needed: step.materials_needed.clone(),
            estimated_duration: step.estimated_duration.clone().unwrap_or_default(),
            risk_level: step.risk_level,
            linked_hazards: step.linked_hazards.clone(),
            bs_references: step.bs_references.clone(),
            inspection_checkpoints: step.inspection_checkpoints.clone(),
            qualifications: step.qualifications.clone(),
        }
    }
}

/// Fully-assembled document body for the render endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportPayload {
    pub project_metadata: Value,
    pub executive_summary: String,
    pub materials_list: Value,
    pub steps: Vec<ExportStep>,
    pub testing_requirements: Value,
    pub regulatory_references: Vec<String>,
    pub generated_at: String,
}

/// Opaque section with its schema default when absent or null.
fn section_or(section: &Option<Value>, default: Value) -> Value {
    match section {
        Some(value) if !value.is_null() => value.clone(),
        _ => default,
    }
}

/// Project the statement into the export schema.
///
/// Pure: the same statement and timestamp always produce the same
/// payload.
pub fn build_export_payload(
    statement: &MethodStatement,
    generated_at: DateTime<Utc>,
) -> ExportPayload {
    ExportPayload {
        project_metadata: section_or(&statement.project_metadata, json!({})),
        executive_summary: statement.executive_summary.clone().unwrap_or_default(),
        materials_list: section_or(&statement.materials_list, json!([])),
        steps: statement.steps.iter().map(ExportStep::from).collect(),
        testing_requirements: section_or(&statement.testing_requirements, json!({})),
        regulatory_references: statement.regulatory_references.clone(),
        generated_at: generated_at.to_rfc3339(),
    }
}

impl ExportPayload {
    /// Serialize to JSON (pretty printed).
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Write to file.
    pub fn write_to_file(&self, path: &Path) -> io::Result<()> {
        let json = self.to_json().map_err(|e| {
            io::Error::new(io::ErrorKind::InvalidData, format!("JSON error: {}", e))
        })?;
        fs::write(path, json)
    }
}
