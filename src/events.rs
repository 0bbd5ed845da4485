//! The inbound reaction notification and the enriched wrapper handed to waiter callbacks.

use crate::messaging::{Embed, MessageApiRequest, MessageContent};
use crate::{ChannelId, MessageId, UserId};
use tokio::sync::mpsc::UnboundedSender;
use tokio::sync::oneshot;

/// A raw "reaction added" notification as delivered by the chat platform's event source. The
/// embedding application forwards one of these to the dispatcher for every reaction it observes.
#[derive(Clone, Debug)]
pub struct ReactionAddedEvent {
    /// The emote the reaction was made with. Either a unicode symbol or a platform-specific
    /// emote name. Matched by exact string equality, no normalization.
    pub emote: String,

    /// The channel containing the message that was reacted to
    pub channel_id: ChannelId,

    /// The message that was reacted to
    pub message_id: MessageId,

    /// The user who added the reaction
    pub user_id: UserId,

    /// True when the reacting user is an automated account. Reactions flagged this way are
    /// dropped before matching so a bot replying with its own prompt reactions can't trigger
    /// its own waiters.
    pub added_by_bot: bool,
}

/// A matched reaction as seen by a waiter's callback. Wraps the raw event together with the emote
/// that matched and reply helpers targeting the triggering channel and user. Lives only for the
/// duration of the dispatch that constructed it, unless the callback stores it.
pub struct ReactionEvent {
    raw: ReactionAddedEvent,
    emote: String,
    message_api: UnboundedSender<MessageApiRequest>,
}

impl ReactionEvent {
    pub(crate) fn new(
        raw: ReactionAddedEvent,
        emote: String,
        message_api: UnboundedSender<MessageApiRequest>,
    ) -> Self {
        ReactionEvent {
            raw,
            emote,
            message_api,
        }
    }

    /// The emote the waiter matched on
    pub fn emote(&self) -> &str {
        &self.emote
    }

    pub fn channel_id(&self) -> ChannelId {
        self.raw.channel_id
    }

    pub fn message_id(&self) -> MessageId {
        self.raw.message_id
    }

    /// The user who added the reaction
    pub fn user_id(&self) -> UserId {
        self.raw.user_id
    }

    /// The raw notification this event was constructed from
    pub fn raw(&self) -> &ReactionAddedEvent {
        &self.raw
    }

    /// Sends a response to the channel where the reaction was added
    pub fn reply(&self, message: impl Into<String>) {
        self.send_to_channel(MessageContent::Text(message.into()), None);
    }

    /// Sends a response to the channel where the reaction was added. The returned channel
    /// resolves to the id of the created message once the platform has accepted it.
    pub fn reply_with_confirmation(&self, message: impl Into<String>) -> oneshot::Receiver<MessageId> {
        let (sender, receiver) = oneshot::channel();
        self.send_to_channel(MessageContent::Text(message.into()), Some(sender));
        receiver
    }

    /// Sends rich content to the channel where the reaction was added
    pub fn reply_embed(&self, embed: Embed) {
        self.send_to_channel(MessageContent::Embed(embed), None);
    }

    /// Sends a direct message to the user who added the reaction
    pub fn send_private_message(&self, message: impl Into<String>) {
        self.send_to_user(MessageContent::Text(message.into()));
    }

    /// Sends rich content via direct message to the user who added the reaction
    pub fn send_private_embed(&self, embed: Embed) {
        self.send_to_user(MessageContent::Embed(embed));
    }

    fn send_to_channel(&self, content: MessageContent, response_channel: Option<oneshot::Sender<MessageId>>) {
        let _ = self.message_api.send(MessageApiRequest::SendChannelMessage {
            channel_id: self.raw.channel_id,
            content,
            response_channel,
        });
    }

    fn send_to_user(&self, content: MessageContent) {
        let _ = self.message_api.send(MessageApiRequest::SendDirectMessage {
            user_id: self.raw.user_id,
            content,
        });
    }
}
