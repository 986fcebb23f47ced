use dashmap::DashMap;
use serenity::model::id::ChannelId;

use crate::error::CommandError;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct ChannelCaptureConfig {
    pub capturing: bool,
    pub album: Option<String>,
}

/// Per-channel capture state. Writes to one channel are serialized by the map's shard lock,
/// other channels are not blocked.
#[derive(Default)]
pub(crate) struct CaptureRegistry {
    channels: DashMap<ChannelId, ChannelCaptureConfig>,
}

impl CaptureRegistry {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn get(&self, channel: ChannelId) -> ChannelCaptureConfig {
        self.channels.get(&channel).map(|config| config.clone()).unwrap_or_default()
    }

    pub(crate) fn set_album(&self, channel: ChannelId, name: &str) -> Result<(), CommandError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(CommandError::Validation { field: "album name", reason: "cannot be empty" });
        }

        self.channels.entry(channel).or_default().album = Some(name.to_string());
        Ok(())
    }

    /// Returns the previous flag, read under the same lock as the write.
    pub(crate) fn set_capturing(&self, channel: ChannelId, enabled: bool) -> bool {
        let mut config = self.channels.entry(channel).or_default();
        std::mem::replace(&mut config.capturing, enabled)
    }
}
