use std::sync::Arc;

use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Serialize;
use serenity::model::{
    channel::{Attachment, Message},
    id::{ChannelId, GuildId, UserId},
};

use crate::{config::StorageConfig, error::DeliveryError, registry::CaptureRegistry};

const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "webp", "bmp", "tif", "tiff", "heic", "heif", "avif"];

/// The parts of a Discord message the relay looks at.
pub(crate) struct IncomingMessage {
    pub channel_id: ChannelId,
    pub channel_name: Option<String>,
    pub guild_id: Option<GuildId>,
    pub author_id: UserId,
    pub author_is_bot: bool,
    pub timestamp: DateTime<Utc>,
    pub attachments: Vec<IncomingAttachment>,
}

pub(crate) struct IncomingAttachment {
    pub url: String,
    pub filename: String,
    pub content_type: Option<String>,
}

impl IncomingMessage {
    pub(crate) fn from_message(msg: &Message, channel_name: Option<String>) -> Self {
        Self {
            channel_id: msg.channel_id,
            channel_name,
            guild_id: msg.guild_id,
            author_id: msg.author.id,
            author_is_bot: msg.author.bot,
            timestamp: msg.timestamp.with_timezone(&Utc),
            attachments: msg.attachments.iter().map(IncomingAttachment::from).collect(),
        }
    }
}

impl From<&Attachment> for IncomingAttachment {
    fn from(attachment: &Attachment) -> Self {
        Self {
            url: attachment.url.clone(),
            filename: attachment.filename.clone(),
            content_type: attachment.content_type.clone(),
        }
    }
}

impl IncomingAttachment {
    /// An `image/*` content type or an image filename extension. The extension is ignored when the declared
    /// type names some other specific kind of media, e.g. `video/mp4`.
    pub(crate) fn is_image(&self) -> bool {
        let content_type = self.content_type.as_deref().map(|t| t.trim().to_ascii_lowercase());
        match content_type.as_deref() {
            Some(t) if t.starts_with("image/") => true,
            None | Some("") | Some("application/octet-stream") => self.has_image_extension(),
            Some(t) if t.starts_with("binary/") => self.has_image_extension(),
            Some(_) => false,
        }
    }

    fn has_image_extension(&self) -> bool {
        match self.filename.rsplit_once('.') {
            Some((_, extension)) => IMAGE_EXTENSIONS.contains(&extension.to_ascii_lowercase().as_str()),
            None => false,
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct UploadEvent {
    #[serde(serialize_with = "as_string")]
    pub channel_id: u64,
    pub channel_name: Option<String>,
    #[serde(serialize_with = "option_as_string")]
    pub guild_id: Option<u64>,
    pub album: Option<String>,
    pub url: String,
    pub filename: String,
    #[serde(serialize_with = "as_string")]
    pub uploader_id: u64,
    pub timestamp: DateTime<Utc>,
}

// Snowflakes exceed the integer precision of most JSON consumers.
fn as_string<S: serde::Serializer>(id: &u64, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(id)
}

fn option_as_string<S: serde::Serializer>(id: &Option<u64>, serializer: S) -> Result<S::Ok, S::Error> {
    match id {
        Some(id) => serializer.collect_str(id),
        None => serializer.serialize_none(),
    }
}

#[derive(Debug)]
pub(crate) enum RelayOutcome {
    Delivered { url: String },
    Failed { url: String, error: DeliveryError },
}

impl RelayOutcome {
    pub(crate) fn is_delivered(&self) -> bool {
        matches!(self, RelayOutcome::Delivered { .. })
    }
}

pub(crate) struct Relay {
    registry: Arc<CaptureRegistry>,
    client: Client,
    storage: StorageConfig,
}

impl Relay {
    pub(crate) fn new(registry: Arc<CaptureRegistry>, storage: StorageConfig) -> Self {
        Self { registry, client: Client::new(), storage }
    }

    pub(crate) fn is_capturing(&self, channel: ChannelId) -> bool {
        self.registry.get(channel).capturing
    }

    /// Forwards every image in the message if its channel is capturing. Failures are logged and returned,
    /// the uploader is never told about them.
    pub(crate) async fn handle_message(&self, msg: &IncomingMessage) -> Vec<RelayOutcome> {
        if msg.author_is_bot {
            return Vec::new();
        }

        let config = self.registry.get(msg.channel_id);
        if !config.capturing {
            return Vec::new();
        }

        let mut outcomes = Vec::new();
        for attachment in msg.attachments.iter().filter(|a| a.is_image()) {
            let event = UploadEvent {
                channel_id: msg.channel_id.get(),
                channel_name: msg.channel_name.clone(),
                guild_id: msg.guild_id.map(|id| id.get()),
                album: config.album.clone(),
                url: attachment.url.clone(),
                filename: attachment.filename.clone(),
                uploader_id: msg.author_id.get(),
                timestamp: msg.timestamp,
            };

            let outcome = match self.submit(&event).await {
                Ok(()) => {
                    debug!("Relayed {} from channel {} to storage", event.url, msg.channel_id);
                    RelayOutcome::Delivered { url: event.url }
                }
                Err(e) => {
                    warn!("Could not relay {} from channel {}: {}", event.url, msg.channel_id, e);
                    RelayOutcome::Failed { url: event.url, error: e }
                }
            };
            outcomes.push(outcome);
        }
        outcomes
    }

    async fn submit(&self, event: &UploadEvent) -> Result<(), DeliveryError> {
        let mut request = self.client.post(self.storage.endpoint.clone()).json(event);
        if let Some(token) = &self.storage.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(DeliveryError::Status(status));
        }
        Ok(())
    }
}
