use serenity::{builder::CreateCommand, model::id::ChannelId};

use crate::registry::CaptureRegistry;

pub(super) const NAME: &str = "capture";
pub(super) const DESCRIPTION: &str = "Starts relaying image uploads from this channel";

pub(super) fn definition() -> CreateCommand {
    CreateCommand::new(NAME).description(DESCRIPTION)
}

pub(super) fn run(registry: &CaptureRegistry, channel: ChannelId) -> String {
    let was_capturing = registry.set_capturing(channel, true);

    let album = match registry.get(channel).album {
        Some(album) => format!(" into the album **{album}**"),
        None => String::new(),
    };
    if was_capturing {
        format!("Already capturing uploads in this channel{album}.")
    } else {
        format!("Capturing image uploads in this channel{album}.")
    }
}
