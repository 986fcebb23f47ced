use serenity::builder::CreateCommand;

use crate::commands::{album, capture, stop, sync};

pub(super) const NAME: &str = "help";
pub(super) const DESCRIPTION: &str = "Lists the available commands";

pub(super) fn definition() -> CreateCommand {
    CreateCommand::new(NAME).description(DESCRIPTION)
}

pub(super) fn run(prefix: &str) -> String {
    let commands = [
        (album::NAME, " <name>", album::DESCRIPTION),
        (capture::NAME, "", capture::DESCRIPTION),
        (stop::NAME, "", stop::DESCRIPTION),
        (NAME, "", DESCRIPTION),
        (sync::NAME, "", sync::DESCRIPTION),
    ];

    let mut usage = String::from("**Commands**\n");
    for (name, args, description) in commands {
        usage.push_str(&format!("`{prefix}{name}{args}` - {description}\n"));
    }
    usage.push_str("All commands are also available as slash commands.");
    usage
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lists_every_command_with_prefix() {
        let usage = run("?");
        for name in ["?album <name>", "?capture", "?stop", "?help", "?sync_command_tree"] {
            assert!(usage.contains(name), "{name} missing from help");
        }
    }
}
