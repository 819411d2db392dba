//! Normalization of raw service step payloads.
//!
//! The generation pipeline has shipped several step shapes over time
//! (`step` vs `stepNumber`, `tools` vs `toolsRequired`, ...). Each
//! canonical field takes the first present entry of an ordered alias
//! list, kept as data so the mapping is testable on its own. Mapping is
//! total: any JSON value produces a well-formed step, with missing or
//! malformed fields defaulting instead of failing.

use serde_json::Value;

use super::{InstallationStep, MethodStatement, RiskLevel};

const STEP_NUMBER_KEYS: &[&str] = &["stepNumber", "step"];
const TITLE_KEYS: &[&str] = &["title", "stepTitle", "name"];
const CONTENT_KEYS: &[&str] = &["content", "description"];
const SAFETY_KEYS: &[&str] = &["safety", "safetyNotes"];
const TOOLS_KEYS: &[&str] = &["toolsRequired", "tools", "equipmentNeeded"];
const MATERIALS_KEYS: &[&str] = &["materialsNeeded", "materials"];
const HAZARD_KEYS: &[&str] = &["linkedHazards", "hazards"];
const BS_REFERENCE_KEYS: &[&str] = &["bsReferences", "regulations"];
const CHECKPOINT_KEYS: &[&str] = &["inspectionCheckpoints", "checkpoints"];
const QUALIFICATION_KEYS: &[&str] = &["qualifications"];
const RISK_KEYS: &[&str] = &["riskLevel"];
const DURATION_KEYS: &[&str] = &["estimatedDuration"];

const STEPS_KEYS: &[&str] = &["steps", "installationSteps"];
const STATEMENT_REGULATION_KEYS: &[&str] = &["regulatoryReferences", "regulations"];

/// First alias that is present and non-null.
fn first_value<'a>(raw: &'a Value, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|key| raw.get(key))
        .find(|value| !value.is_null())
}

fn string_field(raw: &Value, keys: &[&str]) -> Option<String> {
    first_value(raw, keys)
        .and_then(Value::as_str)
        .map(str::to_string)
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// A list field accepts an array of scalars or a bare string; anything
/// else is the empty list.
fn list_field(raw: &Value, keys: &[&str]) -> Vec<String> {
    match first_value(raw, keys) {
        Some(Value::Array(items)) => items.iter().filter_map(scalar_to_string).collect(),
        Some(Value::String(s)) if !s.is_empty() => vec![s.clone()],
        _ => Vec::new(),
    }
}

fn number_field(raw: &Value, keys: &[&str]) -> Option<u32> {
    first_value(raw, keys)
        .and_then(|value| match value {
            Value::Number(n) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        })
        .filter(|n| *n > 0)
}

/// `estimatedDuration` wins; otherwise a numeric `estimatedTime` in
/// minutes is rendered as `"N mins"`.
fn duration_field(raw: &Value) -> Option<String> {
    if let Some(duration) = string_field(raw, DURATION_KEYS).filter(|s| !s.trim().is_empty()) {
        return Some(duration);
    }
    match raw.get("estimatedTime") {
        Some(Value::Number(n)) => Some(format!("{} mins", n)),
        _ => None,
    }
}

/// Map one raw step into the canonical shape.
///
/// `position` is the step's 0-based list index, used as the fallback
/// number when the payload carries none.
pub fn map_step(raw: &Value, position: usize) -> InstallationStep {
    let step_number = number_field(raw, STEP_NUMBER_KEYS).unwrap_or(position as u32 + 1);
    let title = string_field(raw, TITLE_KEYS)
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| format!("Step {}", step_number));
    let risk_level = string_field(raw, RISK_KEYS)
        .and_then(|s| RiskLevel::parse(&s))
        .unwrap_or_default();

    InstallationStep {
        step_number,
        title,
        content: string_field(raw, CONTENT_KEYS).unwrap_or_default(),
        safety: list_field(raw, SAFETY_KEYS),
        tools_required: list_field(raw, TOOLS_KEYS),
        materials_needed: list_field(raw, MATERIALS_KEYS),
        estimated_duration: duration_field(raw),
        risk_level,
        linked_hazards: list_field(raw, HAZARD_KEYS),
        bs_references: list_field(raw, BS_REFERENCE_KEYS),
        inspection_checkpoints: list_field(raw, CHECKPOINT_KEYS),
        qualifications: list_field(raw, QUALIFICATION_KEYS),
    }
}

/// Map a full `methodData` payload into a statement.
pub fn map_statement(raw: &Value) -> MethodStatement {
    let steps = match first_value(raw, STEPS_KEYS) {
        Some(Value::Array(items)) => items
            .iter()
            .enumerate()
            .map(|(position, step)| map_step(step, position))
            .collect(),
        _ => Vec::new(),
    };

    MethodStatement {
        steps,
        project_metadata: first_value(raw, &["projectMetadata"]).cloned(),
        executive_summary: string_field(raw, &["executiveSummary"]),
        materials_list: first_value(raw, &["materialsList"]).cloned(),
        testing_requirements: first_value(raw, &["testingRequirements"]).cloned(),
        regulatory_references: list_field(raw, STATEMENT_REGULATION_KEYS),
    }
}
