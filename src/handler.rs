use std::future::Future;

use anyhow::Result;
use serenity::{
    all::{CommandInteraction, Interaction},
    client::{Context, EventHandler},
    gateway::ActivityData,
    model::{channel::Message, gateway::Ready, id::UserId},
};

use crate::{
    commands::{
        introduce_commands, send_reply, unwrap_options, CommandKind, Dispatcher, Invocation, Reply, RuntimeAction,
    },
    relay::{IncomingMessage, Relay, RelayOutcome},
    util::channel_name,
};

pub(crate) struct Handler {
    dispatcher: Dispatcher,
    relay: Relay,
}

impl Handler {
    pub(crate) fn new(dispatcher: Dispatcher, relay: Relay) -> Self {
        Self { dispatcher, relay }
    }

    async fn handle_text(&self, ctx: &Context, msg: &Message) -> Result<()> {
        // Filter out bot messages, including our own replies
        if msg.author.bot {
            return Ok(());
        }

        let reply = match CommandKind::parse_text(self.dispatcher.prefix(), &msg.content) {
            Some(command) => {
                info!("Received command from {} in {}: {}", msg.author.name, msg.channel_id, msg.content);
                let invocation = Invocation { channel: msg.channel_id, caller: msg.author.id, command };
                Some(self.dispatch(ctx, &invocation).await.content)
            }
            None => None,
        };

        // Only look the channel up when the relay is going to use it
        let name = if !msg.attachments.is_empty() && self.relay.is_capturing(msg.channel_id) {
            match channel_name(ctx, msg.channel_id).await {
                Ok(name) => Some(name),
                Err(e) => {
                    debug!("Could not resolve name of channel {}: {}", msg.channel_id, e);
                    None
                }
            }
        } else {
            None
        };

        let send = |content: String| async move {
            msg.channel_id.say(ctx, content).await?;
            Ok::<(), anyhow::Error>(())
        };
        let outcomes = reply_then_relay(&self.relay, reply, send, &IncomingMessage::from_message(msg, name)).await;
        if !outcomes.is_empty() {
            let delivered = outcomes.iter().filter(|o| o.is_delivered()).count();
            info!("Relayed {}/{} uploads from {} in {}", delivered, outcomes.len(), msg.author.name, msg.channel_id);
        }
        Ok(())
    }

    async fn handle_slash(&self, ctx: &Context, cmd: CommandInteraction) -> Result<()> {
        info!("Received command from {}: /{} {}", cmd.user.name, cmd.data.name, unwrap_options(&cmd.data.options));

        let invocation =
            Invocation { channel: cmd.channel_id, caller: cmd.user.id, command: CommandKind::from_interaction(&cmd) };
        let reply = self.dispatch(ctx, &invocation).await;
        send_reply(ctx, &cmd, &reply).await
    }

    /// Runs the command and carries out any runtime action it asks for.
    async fn dispatch(&self, ctx: &Context, invocation: &Invocation) -> Reply {
        let mut reply = self.dispatcher.handle_command(invocation);
        if let Some(RuntimeAction::SyncCommandTree) = reply.action {
            reply.content = match introduce_commands(ctx).await {
                Ok(()) => "Slash commands re-published.".to_string(),
                Err(e) => {
                    error!("Could not re-publish commands: {}", e);
                    "**Could not re-publish the slash commands, check the logs.**".to_string()
                }
            };
        }
        reply
    }
}

#[serenity::async_trait]
impl EventHandler for Handler {
    async fn message(&self, ctx: Context, msg: Message) {
        if let Err(e) = self.handle_text(&ctx, &msg).await {
            error!("Could not handle message: {}", e);
        }
    }

    async fn ready(&self, ctx: Context, ready: Ready) {
        info!("Bot connected as {}!", ready.user.name);

        if self.dispatcher.owner().is_none() {
            match resolve_owner(&ctx).await {
                Ok(owner) => {
                    self.dispatcher.set_owner(owner);
                    info!("Bot owner is {}", owner);
                }
                Err(e) => error!("Could not resolve bot owner: {}", e),
            }
        }

        if let Err(e) = introduce_commands(&ctx).await {
            error!("Could not register global commands: {}", e);
        }

        ctx.set_activity(Some(ActivityData::watching("for photos")))
    }

    async fn interaction_create(&self, ctx: Context, interaction: Interaction) {
        if let Interaction::Command(cmd) = interaction {
            if let Err(e) = self.handle_slash(&ctx, cmd).await {
                error!("Could not handle command: {}", e);
            }
        }
    }
}

/// Sends the command reply, if any, then relays the message. A reply that fails to send is logged and the
/// relay still runs.
async fn reply_then_relay<F, Fut>(
    relay: &Relay,
    reply: Option<String>,
    send: F,
    msg: &IncomingMessage,
) -> Vec<RelayOutcome>
where
    F: FnOnce(String) -> Fut,
    Fut: Future<Output = Result<()>>,
{
    if let Some(content) = reply {
        if let Err(e) = send(content).await {
            error!("Could not send command reply in {}: {}", msg.channel_id, e);
        }
    }
    relay.handle_message(msg).await
}

async fn resolve_owner(ctx: &Context) -> Result<UserId> {
    let info = ctx.http.get_current_application_info().await?;
    info.team
        .map(|team| team.owner_user_id)
        .or_else(|| info.owner.map(|owner| owner.id))
        .ok_or_else(|| anyhow::anyhow!("Application info has no owner"))
}
