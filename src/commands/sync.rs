use serenity::{builder::CreateCommand, model::id::UserId};

use crate::error::CommandError;

pub(super) const NAME: &str = "sync_command_tree";
pub(super) const DESCRIPTION: &str = "Re-publishes the slash commands (owner only)";

pub(super) fn definition() -> CreateCommand {
    CreateCommand::new(NAME).description(DESCRIPTION)
}

/// Only checks the caller, the runtime does the actual re-registration.
pub(super) fn run(owner: Option<UserId>, caller: UserId) -> Result<(), CommandError> {
    match owner {
        Some(owner) if owner == caller => Ok(()),
        _ => Err(CommandError::Permission(NAME)),
    }
}
