use std::sync::{Arc, OnceLock};

use anyhow::Result;
use serenity::{
    all::{Command, CommandDataOption, CommandInteraction, CreateInteractionResponse},
    builder::{CreateCommand, CreateInteractionResponseMessage},
    client::Context,
    model::id::{ChannelId, UserId},
};

use crate::{error::CommandError, registry::CaptureRegistry};

mod album;
mod capture;
mod help;
mod stop;
mod sync;

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum CommandKind {
    Album(Option<String>),
    Capture,
    Stop,
    Help,
    SyncCommandTree,
    Unknown(String),
}

impl CommandKind {
    /// Parses a prefixed text command. Returns `None` for messages that are not commands.
    pub(crate) fn parse_text(prefix: &str, content: &str) -> Option<Self> {
        let rest = content.trim_start().strip_prefix(prefix)?;
        let (word, args) = match rest.split_once(char::is_whitespace) {
            Some((word, args)) => (word, args),
            None => (rest, ""),
        };
        if word.is_empty() {
            return None;
        }

        Some(match word.to_lowercase().as_str() {
            album::NAME => CommandKind::Album(album::parse_text(args)),
            capture::NAME => CommandKind::Capture,
            stop::NAME => CommandKind::Stop,
            help::NAME => CommandKind::Help,
            sync::NAME => CommandKind::SyncCommandTree,
            _ => CommandKind::Unknown(word.to_string()),
        })
    }

    pub(crate) fn from_interaction(cmd: &CommandInteraction) -> Self {
        match cmd.data.name.as_str() {
            album::NAME => CommandKind::Album(album::parse_interaction(cmd)),
            capture::NAME => CommandKind::Capture,
            stop::NAME => CommandKind::Stop,
            help::NAME => CommandKind::Help,
            sync::NAME => CommandKind::SyncCommandTree,
            other => CommandKind::Unknown(other.to_string()),
        }
    }
}

pub(crate) struct Invocation {
    pub channel: ChannelId,
    pub caller: UserId,
    pub command: CommandKind,
}

/// Work the dispatcher cannot do itself and hands back to the Discord runtime.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum RuntimeAction {
    SyncCommandTree,
}

#[derive(Debug, PartialEq, Eq)]
pub(crate) struct Reply {
    pub content: String,
    pub ephemeral: bool,
    pub action: Option<RuntimeAction>,
}

impl Reply {
    fn text(content: impl Into<String>) -> Self {
        Self { content: content.into(), ephemeral: false, action: None }
    }

    fn error(content: impl Into<String>) -> Self {
        Self { content: content.into(), ephemeral: true, action: None }
    }
}

pub(crate) struct Dispatcher {
    registry: Arc<CaptureRegistry>,
    prefix: String,
    owner: OnceLock<UserId>,
}

impl Dispatcher {
    pub(crate) fn new(registry: Arc<CaptureRegistry>, prefix: impl Into<String>, owner: Option<UserId>) -> Self {
        Self { registry, prefix: prefix.into(), owner: owner.map(OnceLock::from).unwrap_or_default() }
    }

    pub(crate) fn prefix(&self) -> &str {
        &self.prefix
    }

    pub(crate) fn owner(&self) -> Option<UserId> {
        self.owner.get().copied()
    }

    /// Records the owner resolved from the application info. A configured owner is never replaced.
    pub(crate) fn set_owner(&self, owner: UserId) -> bool {
        self.owner.set(owner).is_ok()
    }

    pub(crate) fn handle_command(&self, invocation: &Invocation) -> Reply {
        match self.run(invocation) {
            Ok(reply) => reply,
            Err(e) => {
                warn!("Command {:?} in channel {} rejected: {}", invocation.command, invocation.channel, e);
                Reply::error(e.user_message(&self.prefix))
            }
        }
    }

    fn run(&self, invocation: &Invocation) -> Result<Reply, CommandError> {
        let channel = invocation.channel;
        Ok(match &invocation.command {
            CommandKind::Album(name) => Reply::text(album::run(&self.registry, channel, name.as_deref())?),
            CommandKind::Capture => Reply::text(capture::run(&self.registry, channel)),
            CommandKind::Stop => Reply::text(stop::run(&self.registry, channel)),
            CommandKind::Help => Reply::text(help::run(&self.prefix)),
            CommandKind::SyncCommandTree => {
                sync::run(self.owner(), invocation.caller)?;
                Reply {
                    content: "Re-publishing the slash commands.".to_string(),
                    ephemeral: true,
                    action: Some(RuntimeAction::SyncCommandTree),
                }
            }
            CommandKind::Unknown(name) => return Err(CommandError::UnknownCommand(name.clone())),
        })
    }
}

fn definitions() -> Vec<CreateCommand> {
    vec![
        album::definition(),
        capture::definition(),
        stop::definition(),
        help::definition(),
        sync::definition(),
    ]
}

/// Replaces the global slash commands with the current definitions.
pub(crate) async fn introduce_commands(ctx: &Context) -> Result<()> {
    let commands = Command::set_global_commands(ctx, definitions()).await?;
    info!("Registered {} global commands", commands.len());
    Ok(())
}

pub(crate) async fn send_reply(ctx: &Context, cmd: &CommandInteraction, reply: &Reply) -> Result<()> {
    let message = CreateInteractionResponseMessage::new().content(&reply.content).ephemeral(reply.ephemeral);
    Ok(cmd.create_response(ctx, CreateInteractionResponse::Message(message)).await?)
}

pub(crate) fn unwrap_options(options: &[CommandDataOption]) -> String {
    options.iter().map(|v| format!("{}={:?}", v.name, v.value)).collect::<Vec<String>>().join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    const OWNER: u64 = 100;
    const STRANGER: u64 = 200;

    fn dispatcher() -> (Arc<CaptureRegistry>, Dispatcher) {
        let registry = Arc::new(CaptureRegistry::new());
        let dispatcher = Dispatcher::new(registry.clone(), "!", Some(UserId::new(OWNER)));
        (registry, dispatcher)
    }

    fn invoke(dispatcher: &Dispatcher, channel: u64, caller: u64, command: CommandKind) -> Reply {
        dispatcher.handle_command(&Invocation {
            channel: ChannelId::new(channel),
            caller: UserId::new(caller),
            command,
        })
    }

    #[test]
    fn parses_text_commands() {
        let parse = |s| CommandKind::parse_text("!", s);
        assert_eq!(parse("!capture"), Some(CommandKind::Capture));
        assert_eq!(parse("  !STOP"), Some(CommandKind::Stop));
        assert_eq!(parse("!help me"), Some(CommandKind::Help));
        assert_eq!(parse("!sync_command_tree"), Some(CommandKind::SyncCommandTree));
        assert_eq!(parse(r#"!album "Summer 2024""#), Some(CommandKind::Album(Some("Summer 2024".to_string()))));
        assert_eq!(parse("!album"), Some(CommandKind::Album(None)));
        assert_eq!(parse("!dance"), Some(CommandKind::Unknown("dance".to_string())));
    }

    #[test]
    fn ignores_non_commands() {
        assert_eq!(CommandKind::parse_text("!", "look at this photo"), None);
        assert_eq!(CommandKind::parse_text("!", "!"), None);
        assert_eq!(CommandKind::parse_text("!", "! capture"), None);
        assert_eq!(CommandKind::parse_text("!", ""), None);
    }

    #[test]
    fn custom_prefix() {
        assert_eq!(CommandKind::parse_text("pb.", "pb.capture"), Some(CommandKind::Capture));
        assert_eq!(CommandKind::parse_text("pb.", "!capture"), None);
    }

    #[test]
    fn capture_and_stop_drive_the_state_machine() {
        let (registry, dispatcher) = dispatcher();
        let channel = ChannelId::new(1);

        invoke(&dispatcher, 1, STRANGER, CommandKind::Capture);
        assert!(registry.get(channel).capturing);
        let again = invoke(&dispatcher, 1, STRANGER, CommandKind::Capture);
        assert!(registry.get(channel).capturing);
        assert!(again.content.starts_with("Already"));

        invoke(&dispatcher, 1, STRANGER, CommandKind::Stop);
        assert!(!registry.get(channel).capturing);
        let again = invoke(&dispatcher, 1, STRANGER, CommandKind::Stop);
        assert!(!registry.get(channel).capturing);
        assert!(!again.ephemeral);
    }

    #[test]
    fn album_keeps_capture_state() {
        let (registry, dispatcher) = dispatcher();
        invoke(&dispatcher, 1, STRANGER, CommandKind::Capture);
        let reply = invoke(&dispatcher, 1, STRANGER, CommandKind::Album(Some("Summer 2024".to_string())));

        assert!(!reply.ephemeral);
        let config = registry.get(ChannelId::new(1));
        assert!(config.capturing);
        assert_eq!(config.album.as_deref(), Some("Summer 2024"));
    }

    #[test]
    fn album_errors_are_replies() {
        let (registry, dispatcher) = dispatcher();

        let missing = invoke(&dispatcher, 1, STRANGER, CommandKind::Album(None));
        assert!(missing.ephemeral);
        assert!(missing.content.contains("missing `name`"));

        let blank = invoke(&dispatcher, 1, STRANGER, CommandKind::Album(Some("  ".to_string())));
        assert!(blank.ephemeral);
        assert!(blank.content.contains("cannot be empty"));

        assert_eq!(registry.get(ChannelId::new(1)).album, None);
    }

    #[test]
    fn help_changes_nothing() {
        let (registry, dispatcher) = dispatcher();
        let reply = invoke(&dispatcher, 1, STRANGER, CommandKind::Help);
        assert!(reply.content.contains("!capture"));
        assert_eq!(reply.action, None);
        assert_eq!(registry.get(ChannelId::new(1)), Default::default());
    }

    #[test]
    fn unknown_command_points_at_help() {
        let (_, dispatcher) = dispatcher();
        let reply = invoke(&dispatcher, 1, STRANGER, CommandKind::Unknown("dance".to_string()));
        assert!(reply.ephemeral);
        assert!(reply.content.contains("`!help`"));
    }

    #[test]
    fn sync_command_tree_requires_owner() {
        let (_, dispatcher) = dispatcher();

        let denied = invoke(&dispatcher, 1, STRANGER, CommandKind::SyncCommandTree);
        assert_eq!(denied.action, None);
        assert!(denied.ephemeral);
        assert!(denied.content.contains("permissions"));

        let allowed = invoke(&dispatcher, 1, OWNER, CommandKind::SyncCommandTree);
        assert_eq!(allowed.action, Some(RuntimeAction::SyncCommandTree));
    }

    #[test]
    fn sync_command_tree_without_known_owner_is_denied() {
        let dispatcher = Dispatcher::new(Arc::new(CaptureRegistry::new()), "!", None);
        let reply = invoke(&dispatcher, 1, OWNER, CommandKind::SyncCommandTree);
        assert_eq!(reply.action, None);

        assert!(dispatcher.set_owner(UserId::new(OWNER)));
        let reply = invoke(&dispatcher, 1, OWNER, CommandKind::SyncCommandTree);
        assert_eq!(reply.action, Some(RuntimeAction::SyncCommandTree));
    }

    #[test]
    fn configured_owner_is_not_replaced() {
        let (_, dispatcher) = dispatcher();
        assert!(!dispatcher.set_owner(UserId::new(STRANGER)));
        assert_eq!(dispatcher.owner(), Some(UserId::new(OWNER)));
    }
}
