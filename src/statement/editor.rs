//! In-memory editing of a generated statement.
//!
//! Numbering invariant: after every mutation, `steps[i].step_number ==
//! i + 1` for all `i`. Content edits keep their position's number; insert,
//! delete and reorder renumber the whole list.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::{InstallationStep, MethodStatement};

/// Direction for [`StatementEditor::move_step`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MoveDirection {
    Up,
    Down,
}

/// Errors from editing operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EditError {
    #[error("step index {index} out of bounds (statement has {len} steps)")]
    OutOfBounds { index: usize, len: usize },
}

/// CRUD over the step list of one generation result.
pub struct StatementEditor {
    statement: MethodStatement,
}

impl StatementEditor {
    /// Wrap a statement, normalizing step numbers to list positions.
    pub fn new(mut statement: MethodStatement) -> Self {
        renumber(&mut statement.steps);
        Self { statement }
    }

    /// Editor over bare steps with no attached sections.
    pub fn from_steps(steps: Vec<InstallationStep>) -> Self {
        Self::new(MethodStatement {
            steps,
            ..Default::default()
        })
    }

    pub fn steps(&self) -> &[InstallationStep] {
        &self.statement.steps
    }

    pub fn statement(&self) -> &MethodStatement {
        &self.statement
    }

    pub fn into_statement(self) -> MethodStatement {
        self.statement
    }

    pub fn len(&self) -> usize {
        self.statement.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.statement.steps.is_empty()
    }

    /// Replace the step at `index`. The stored step keeps the position's
    /// number; content edits never renumber.
    pub fn update_step(&mut self, index: usize, mut step: InstallationStep) -> Result<(), EditError> {
        self.check_index(index)?;
        step.step_number = index as u32 + 1;
        self.statement.steps[index] = step;
        Ok(())
    }

    /// Remove and return the step at `index`, renumbering the remainder.
    pub fn delete_step(&mut self, index: usize) -> Result<InstallationStep, EditError> {
        self.check_index(index)?;
        let removed = self.statement.steps.remove(index);
        renumber(&mut self.statement.steps);
        Ok(removed)
    }

    /// Swap the step at `index` with its neighbour. Returns `Ok(false)`
    /// for a boundary move (already first/last), leaving the list
    /// unchanged.
    pub fn move_step(&mut self, index: usize, direction: MoveDirection) -> Result<bool, EditError> {
        self.check_index(index)?;
        let target = match direction {
            MoveDirection::Up if index == 0 => return Ok(false),
            MoveDirection::Up => index - 1,
            MoveDirection::Down if index + 1 == self.statement.steps.len() => return Ok(false),
            MoveDirection::Down => index + 1,
        };
        self.statement.steps.swap(index, target);
        renumber(&mut self.statement.steps);
        Ok(true)
    }

    /// Append a placeholder step; returns its number (`len + 1` before the
    /// append).
    pub fn add_step(&mut self) -> u32 {
        let number = self.statement.steps.len() as u32 + 1;
        self.statement
            .steps
            .push(InstallationStep::placeholder(number));
        number
    }

    fn check_index(&self, index: usize) -> Result<(), EditError> {
        let len = self.statement.steps.len();
        if index >= len {
            Err(EditError::OutOfBounds { index, len })
        } else {
            Ok(())
        }
    }
}

fn renumber(steps: &mut [InstallationStep]) {
    for (position, step) in steps.iter_mut().enumerate() {
        step.step_number = position as u32 + 1;
    }
}
