use serenity::{
    all::{CommandDataOptionValue, CommandInteraction, CommandOptionType},
    builder::{CreateCommand, CreateCommandOption},
    model::id::ChannelId,
};

use crate::{error::CommandError, registry::CaptureRegistry};

pub(super) const NAME: &str = "album";
pub(super) const DESCRIPTION: &str = "Sets the album name attached to this channel's uploads";
const OPTION: &str = "name";

pub(super) fn definition() -> CreateCommand {
    CreateCommand::new(NAME).description(DESCRIPTION).add_option(
        CreateCommandOption::new(CommandOptionType::String, OPTION, "The album to file uploads under").required(true),
    )
}

/// Reads the album name from `!album "Summer 2024"`, dropping one pair of surrounding quotes.
pub(super) fn parse_text(args: &str) -> Option<String> {
    let args = args.trim();
    if args.is_empty() {
        return None;
    }
    let unquoted = args.strip_prefix('"').and_then(|a| a.strip_suffix('"')).unwrap_or(args);
    Some(unquoted.to_string())
}

pub(super) fn parse_interaction(cmd: &CommandInteraction) -> Option<String> {
    cmd.data.options.iter().find(|o| o.name == OPTION).and_then(|o| match &o.value {
        CommandDataOptionValue::String(name) => Some(name.clone()),
        _ => None,
    })
}

pub(super) fn run(registry: &CaptureRegistry, channel: ChannelId, name: Option<&str>) -> Result<String, CommandError> {
    let Some(name) = name else { return Err(CommandError::InvalidArgument(OPTION)) };
    registry.set_album(channel, name)?;

    let config = registry.get(channel);
    let album = config.album.unwrap_or_default();
    Ok(if config.capturing {
        format!("Uploads in this channel now go to the album **{album}**.")
    } else {
        format!("Album set to **{album}**. Use `capture` to start relaying uploads.")
    })
}
