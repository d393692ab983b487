use crate::command::{EditCommand, EditContext};
use crate::error::EditResult;

/// Several commands applied as one atomic history entry.
///
/// Apply runs members in order; if one fails, the members that already
/// ran are reverted in reverse so the scene is left untouched. Revert
/// runs the whole group in reverse order.
#[derive(Debug)]
pub struct CommandGroup {
    description: String,
    commands: Vec<EditCommand>,
}

impl CommandGroup {
    pub fn new(description: impl Into<String>, commands: Vec<EditCommand>) -> Self {
        Self {
            description: description.into(),
            commands,
        }
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// Members in apply order.
    pub fn commands(&self) -> &[EditCommand] {
        &self.commands
    }

    pub fn apply(&mut self, ctx: &mut EditContext<'_>) -> EditResult {
        for i in 0..self.commands.len() {
            if let Err(err) = self.commands[i].apply(ctx) {
                for j in (0..i).rev() {
                    if let Err(rollback) = self.commands[j].revert(ctx) {
                        log::warn!(
                            "rollback of '{}' failed after group '{}' aborted: {}",
                            self.commands[j].description(),
                            self.description,
                            rollback
                        );
                    }
                }
                return Err(err);
            }
        }
        Ok(())
    }

    pub fn revert(&mut self, ctx: &mut EditContext<'_>) -> EditResult {
        for command in self.commands.iter_mut().rev() {
            command.revert(ctx)?;
        }
        Ok(())
    }
}
