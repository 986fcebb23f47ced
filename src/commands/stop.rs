use serenity::{builder::CreateCommand, model::id::ChannelId};

use crate::registry::CaptureRegistry;

pub(super) const NAME: &str = "stop";
pub(super) const DESCRIPTION: &str = "Stops relaying image uploads from this channel";

pub(super) fn definition() -> CreateCommand {
    CreateCommand::new(NAME).description(DESCRIPTION)
}

pub(super) fn run(registry: &CaptureRegistry, channel: ChannelId) -> String {
    let was_capturing = registry.set_capturing(channel, false);

    if was_capturing {
        "Stopped capturing image uploads in this channel.".to_string()
    } else {
        "This channel was not being captured.".to_string()
    }
}
