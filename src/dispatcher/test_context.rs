use crate::dispatcher::{
    start_reaction_dispatcher, ReactionDispatcherConfig, ReactionDispatcherRequest,
};
use crate::events::{ReactionAddedEvent, ReactionEvent};
use crate::messaging::MessageApiRequest;
use crate::{ChannelId, MessageId, UserId};
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};

pub struct TestContext {
    pub dispatcher: UnboundedSender<ReactionDispatcherRequest>,
    pub message_api: UnboundedReceiver<MessageApiRequest>,
}

impl TestContext {
    pub fn new() -> Self {
        Self::with_config(ReactionDispatcherConfig {
            auto_remove_enabled: false,
            ..Default::default()
        })
    }

    pub fn with_config(config: ReactionDispatcherConfig) -> Self {
        let (api_sender, api_receiver) = unbounded_channel();
        let dispatcher = start_reaction_dispatcher(config, api_sender);

        TestContext {
            dispatcher,
            message_api: api_receiver,
        }
    }

    pub fn deliver(&self, event: ReactionAddedEvent) {
        self.dispatcher
            .send(ReactionDispatcherRequest::ReactionAdded { event })
            .expect("Failed to send reaction to the dispatcher");
    }
}

pub fn reaction(emote: &str, message_id: u64, user_id: u64) -> ReactionAddedEvent {
    ReactionAddedEvent {
        emote: emote.to_string(),
        channel_id: ChannelId(100),
        message_id: MessageId(message_id),
        user_id: UserId(user_id),
        added_by_bot: false,
    }
}

/// Returns a callback that records the matched emote of every invocation on a channel
pub fn recording_callback() -> (
    impl Fn(ReactionEvent) + Send + 'static,
    UnboundedReceiver<String>,
) {
    let (sender, receiver) = unbounded_channel();
    // The dispatcher drops the callback (and with it this sender) when the waiter is removed.
    // Keep one sender alive so the expect_mpsc_timeout assertions observe an empty channel
    // rather than a closed one.
    std::mem::forget(sender.clone());
    let callback = move |event: ReactionEvent| {
        let _ = sender.send(event.emote().to_string());
    };

    (callback, receiver)
}
