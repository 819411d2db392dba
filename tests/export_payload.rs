//! Mapper, editor, and export schema tests.

use chrono::{TimeZone, Utc};
use msgen::statement::editor::{EditError, MoveDirection, StatementEditor};
use msgen::statement::export::build_export_payload;
use msgen::statement::{mapper, InstallationStep, MethodStatement, RiskLevel};
use serde_json::{json, Value};

fn fixed_timestamp() -> chrono::DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 14, 9, 30, 0).unwrap()
}

// =============================================================================
// Mapper totality and determinism
// =============================================================================

#[test]
fn test_mapper_total_over_arbitrary_values() {
    let inputs = [
        json!({}),
        json!(null),
        json!("a bare string"),
        json!(42),
        json!([{"step": 1}]),
        json!({"safety": {"not": "a list"}}),
        json!({"stepNumber": "not a number"}),
        json!({"riskLevel": 17}),
    ];

    for (position, raw) in inputs.iter().enumerate() {
        let step = mapper::map_step(raw, position);
        assert_eq!(step.step_number, position as u32 + 1, "for {:?}", raw);
        assert!(!step.title.is_empty(), "for {:?}", raw);
        assert!(
            matches!(
                step.risk_level,
                RiskLevel::Low | RiskLevel::Medium | RiskLevel::High
            ),
            "for {:?}",
            raw
        );
    }
}

#[test]
fn test_mapper_deterministic_deep_equality() {
    let raw = json!({
        "step": 4,
        "description": "Terminate at the distribution board",
        "safetyNotes": ["isolate first"],
        "equipmentNeeded": ["torque screwdriver"],
        "estimatedTime": 30,
        "riskLevel": "high"
    });

    let first = mapper::map_step(&raw, 0);
    let second = mapper::map_step(&raw, 0);
    assert_eq!(first, second);
    assert_eq!(first.step_number, 4);
    assert_eq!(first.content, "Terminate at the distribution board");
    assert_eq!(first.tools_required, vec!["torque screwdriver"]);
    assert_eq!(first.estimated_duration.as_deref(), Some("30 mins"));
    assert_eq!(first.risk_level, RiskLevel::High);
}

#[test]
fn test_mapper_spec_example() {
    let step = mapper::map_step(
        &json!({"step": 2, "description": "Fit socket", "tools": ["screwdriver"]}),
        0,
    );

    assert_eq!(step.step_number, 2);
    assert_eq!(step.content, "Fit socket");
    assert_eq!(step.tools_required, vec!["screwdriver"]);
    assert_eq!(step.risk_level, RiskLevel::Medium);
    assert!(step.safety.is_empty());
    assert!(step.materials_needed.is_empty());
}

// =============================================================================
// Renumbering invariant
// =============================================================================

fn statement_with_titles(titles: &[&str]) -> Vec<InstallationStep> {
    titles
        .iter()
        .map(|title| {
            let mut step = InstallationStep::placeholder(0);
            step.title = title.to_string();
            step
        })
        .collect()
}

fn assert_dense(editor: &StatementEditor) {
    for (position, step) in editor.steps().iter().enumerate() {
        assert_eq!(step.step_number, position as u32 + 1);
    }
}

#[test]
fn test_delete_first_of_three() {
    let mut editor = StatementEditor::from_steps(statement_with_titles(&["one", "two", "three"]));

    editor.delete_step(0).unwrap();

    assert_eq!(editor.len(), 2);
    assert_eq!(editor.steps()[0].title, "two");
    assert_eq!(editor.steps()[0].step_number, 1);
    assert_eq!(editor.steps()[1].title, "three");
    assert_eq!(editor.steps()[1].step_number, 2);
}

#[test]
fn test_invariant_after_arbitrary_edit_sequences() {
    let mut editor =
        StatementEditor::from_steps(statement_with_titles(&["a", "b", "c", "d", "e"]));

    editor.move_step(0, MoveDirection::Down).unwrap();
    editor.delete_step(3).unwrap();
    editor.add_step();
    editor.move_step(4, MoveDirection::Up).unwrap();
    assert_dense(&editor);

    editor.delete_step(0).unwrap();
    editor.delete_step(editor.len() - 1).unwrap();
    editor.add_step();
    assert_dense(&editor);

    // boundary no-ops leave the invariant intact
    assert!(!editor.move_step(0, MoveDirection::Up).unwrap());
    assert!(!editor
        .move_step(editor.len() - 1, MoveDirection::Down)
        .unwrap());
    assert_dense(&editor);
}

#[test]
fn test_update_is_position_stable() {
    let mut editor = StatementEditor::from_steps(statement_with_titles(&["one", "two"]));

    let mut replacement = InstallationStep::placeholder(0);
    replacement.title = "rewritten".to_string();
    replacement.step_number = 41;
    editor.update_step(0, replacement).unwrap();

    assert_eq!(editor.steps()[0].title, "rewritten");
    assert_dense(&editor);
}

#[test]
fn test_out_of_bounds_is_an_error_not_a_panic() {
    let mut editor = StatementEditor::from_steps(statement_with_titles(&["one"]));
    assert_eq!(
        editor.move_step(5, MoveDirection::Down),
        Err(EditError::OutOfBounds { index: 5, len: 1 })
    );
}

// =============================================================================
// Export schema
// =============================================================================

#[test]
fn test_export_payload_has_no_nulls_for_sparse_statement() {
    let statement = MethodStatement {
        steps: vec![InstallationStep::placeholder(1)],
        ..Default::default()
    };

    let payload = build_export_payload(&statement, fixed_timestamp());
    let value = serde_json::to_value(&payload).unwrap();

    fn assert_no_nulls(value: &Value, path: &str) {
        match value {
            Value::Null => panic!("null at {}", path),
            Value::Object(map) => {
                for (key, child) in map {
                    assert_no_nulls(child, &format!("{}.{}", path, key));
                }
            }
            Value::Array(items) => {
                for (index, child) in items.iter().enumerate() {
                    assert_no_nulls(child, &format!("{}[{}]", path, index));
                }
            }
            _ => {}
        }
    }
    assert_no_nulls(&value, "$");

    assert_eq!(value["projectMetadata"], json!({}));
    assert_eq!(value["materialsList"], json!([]));
    assert_eq!(value["executiveSummary"], "");
    assert_eq!(value["steps"][0]["estimatedDuration"], "");
}

#[test]
fn test_export_payload_preserves_edited_steps() {
    let data = json!({
        "steps": [
            {"step": 1, "description": "Isolate"},
            {"step": 2, "description": "First fix"},
            {"step": 3, "description": "Second fix"}
        ]
    });
    let mut editor = StatementEditor::new(mapper::map_statement(&data));
    editor.delete_step(0).unwrap();
    editor.move_step(0, MoveDirection::Down).unwrap();

    let payload = build_export_payload(editor.statement(), fixed_timestamp());

    assert_eq!(payload.steps.len(), 2);
    assert_eq!(payload.steps[0].content, "Second fix");
    assert_eq!(payload.steps[0].step_number, 1);
    assert_eq!(payload.steps[1].content, "First fix");
    assert_eq!(payload.steps[1].step_number, 2);
}

#[test]
fn test_export_payload_written_to_file() {
    let statement = MethodStatement {
        steps: vec![InstallationStep::placeholder(1)],
        executive_summary: Some("Scope of works".to_string()),
        ..Default::default()
    };
    let payload = build_export_payload(&statement, fixed_timestamp());

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("payload.json");
    payload.write_to_file(&path).unwrap();

    let read_back: Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(read_back["executiveSummary"], "Scope of works");
    assert_eq!(read_back["steps"].as_array().unwrap().len(), 1);
    assert!(read_back["generatedAt"].as_str().unwrap().starts_with("2026-03-14"));
}
