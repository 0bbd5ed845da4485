//! Defines the requests this library makes of the chat platform's message API. The dispatcher and
//! the per-dispatch event wrapper only ever *send* these over a channel; actually performing them
//! is the job of whatever collaborator owns the platform connection. All requests are
//! fire-and-forget from this library's point of view.

use crate::{ChannelId, MessageId, UserId};
use std::fmt;
use tokio::sync::oneshot::Sender;

/// Requests that can be made to the message API collaborator
pub enum MessageApiRequest {
    /// Sends a message to the specified channel
    SendChannelMessage {
        channel_id: ChannelId,
        content: MessageContent,

        /// When provided, the collaborator should send the id of the created message once the
        /// platform has accepted it. Callers that don't care pass `None`.
        response_channel: Option<Sender<MessageId>>,
    },

    /// Sends a direct message to the specified user
    SendDirectMessage {
        user_id: UserId,
        content: MessageContent,
    },

    /// Removes all reactions from the specified message
    ClearReactions { message_id: MessageId },
}

impl fmt::Debug for MessageApiRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MessageApiRequest::SendChannelMessage {
                channel_id,
                content,
                response_channel,
            } => f
                .debug_struct("SendChannelMessage")
                .field("channel_id", channel_id)
                .field("content", content)
                .field("has_response_channel", &response_channel.is_some())
                .finish(),

            MessageApiRequest::SendDirectMessage { user_id, content } => f
                .debug_struct("SendDirectMessage")
                .field("user_id", user_id)
                .field("content", content)
                .finish(),

            MessageApiRequest::ClearReactions { message_id } => f
                .debug_struct("ClearReactions")
                .field("message_id", message_id)
                .finish(),
        }
    }
}

/// The body of an outbound message
#[derive(Clone, Debug)]
pub enum MessageContent {
    Text(String),
    Embed(Embed),
}

/// Rich message content. Kept deliberately small; platform-specific decoration is up to the
/// message API collaborator.
#[derive(Clone, Debug, Default)]
pub struct Embed {
    pub title: Option<String>,
    pub description: Option<String>,
    pub fields: Vec<EmbedField>,
}

#[derive(Clone, Debug)]
pub struct EmbedField {
    pub name: String,
    pub value: String,
}
