//! The reaction dispatcher is an actor that owns the collection of active reaction waiters. It
//! checks every incoming "reaction added" notification against each registered waiter and invokes
//! the callbacks of the ones that match. It also owns the timers behind delayed deactivation and
//! the auto-remove policy, so a waiter that is never explicitly deactivated does not linger
//! forever.

#[cfg(test)]
mod test_context;

use crate::events::{ReactionAddedEvent, ReactionEvent};
use crate::messaging::MessageApiRequest;
use crate::{MessageId, UserId, WaiterId};
use futures::future::BoxFuture;
use futures::stream::FuturesUnordered;
use futures::{FutureExt, StreamExt};
use std::collections::HashSet;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::time::Duration;
use thiserror::Error;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};
use tokio::sync::oneshot;
use tracing::{error, info, instrument};
use uuid::Uuid;

/// The function invoked when an incoming reaction matches a waiter. Invocations are isolated
/// from each other; a panicking callback never prevents other waiters from seeing the event.
pub type ReactionCallback = Box<dyn Fn(ReactionEvent) + Send>;

/// Describes which reaction events a caller is interested in. A waiter always carries at least
/// one emote to watch for and may additionally be restricted to a single message and/or a single
/// user. An absent filter matches everything in that dimension; filters combine with AND.
#[derive(Clone, Debug)]
pub struct ReactionWaiter {
    emotes: HashSet<String>,
    message_filter: Option<MessageId>,
    user_filter: Option<UserId>,
}

#[derive(Error, Debug)]
pub enum WaiterCreationError {
    #[error("A reaction waiter requires at least one emote to wait for")]
    NoEmotesSpecified,
}

impl ReactionWaiter {
    /// Creates a waiter accepting the given emotes on any message by any user. At least one
    /// emote must be specified.
    pub fn new<Emotes, Emote>(emotes: Emotes) -> Result<Self, WaiterCreationError>
    where
        Emotes: IntoIterator<Item = Emote>,
        Emote: Into<String>,
    {
        let emotes = emotes
            .into_iter()
            .map(Into::into)
            .collect::<HashSet<String>>();

        if emotes.is_empty() {
            return Err(WaiterCreationError::NoEmotesSpecified);
        }

        Ok(ReactionWaiter {
            emotes,
            message_filter: None,
            user_filter: None,
        })
    }

    /// Restricts the waiter to reactions added to the specified message
    pub fn for_message(mut self, message_id: MessageId) -> Self {
        self.message_filter = Some(message_id);
        self
    }

    /// Restricts the waiter to reactions added by the specified user
    pub fn for_user(mut self, user_id: UserId) -> Self {
        self.user_filter = Some(user_id);
        self
    }

    /// Registers the waiter with the dispatcher and attaches the callback. The waiter is visible
    /// to dispatch as soon as the dispatcher processes the registration; no ordering is promised
    /// relative to events already in flight. If the dispatcher has auto-remove enabled, the
    /// registration is also scheduled for removal after the configured default delay.
    pub fn activate<Callback>(
        self,
        dispatcher: &UnboundedSender<ReactionDispatcherRequest>,
        callback: Callback,
    ) -> ActiveWaiter
    where
        Callback: Fn(ReactionEvent) + Send + 'static,
    {
        self.register(dispatcher, Box::new(callback), None)
    }

    /// Same as [`activate`](ReactionWaiter::activate), but the waiter is automatically
    /// deactivated after the given delay. The explicit delay replaces the dispatcher's default
    /// auto-remove schedule for this registration.
    pub fn activate_with_expiry<Callback>(
        self,
        dispatcher: &UnboundedSender<ReactionDispatcherRequest>,
        callback: Callback,
        delay: Duration,
    ) -> ActiveWaiter
    where
        Callback: Fn(ReactionEvent) + Send + 'static,
    {
        self.register(dispatcher, Box::new(callback), Some(delay))
    }

    fn register(
        self,
        dispatcher: &UnboundedSender<ReactionDispatcherRequest>,
        callback: ReactionCallback,
        expire_after: Option<Duration>,
    ) -> ActiveWaiter {
        let id = WaiterId(Uuid::new_v4());
        let _ = dispatcher.send(ReactionDispatcherRequest::RegisterWaiter {
            id,
            waiter: self,
            callback,
            expire_after,
        });

        ActiveWaiter {
            id,
            dispatcher: dispatcher.clone(),
        }
    }
}

/// Handle to an activated waiter. Dropping the handle does not deactivate the waiter; the
/// registration stays live until it is deactivated explicitly or expires.
pub struct ActiveWaiter {
    id: WaiterId,
    dispatcher: UnboundedSender<ReactionDispatcherRequest>,
}

impl ActiveWaiter {
    pub fn id(&self) -> WaiterId {
        self.id
    }

    /// Removes the waiter from the dispatcher. Safe to call more than once. The returned channel
    /// resolves to true if the waiter was still registered when the request was processed, and
    /// the receiver can be dropped by callers that don't care.
    pub fn deactivate(&self) -> oneshot::Receiver<bool> {
        let (sender, receiver) = oneshot::channel();
        let _ = self
            .dispatcher
            .send(ReactionDispatcherRequest::UnregisterWaiter {
                id: self.id,
                response_channel: Some(sender),
            });

        receiver
    }

    /// Schedules deactivation after the given delay without touching the callback. Multiple
    /// outstanding timers for the same waiter are harmless, as is a timer firing after the
    /// waiter was already deactivated.
    pub fn deactivate_after(&self, delay: Duration) {
        let _ = self
            .dispatcher
            .send(ReactionDispatcherRequest::UnregisterWaiterAfter { id: self.id, delay });
    }
}

/// Configuration for a reaction dispatcher. Read each time a waiter is registered, so updating
/// it only affects registrations from that point on.
#[derive(Clone, Debug)]
pub struct ReactionDispatcherConfig {
    /// When enabled, every registration without an explicit expiry is scheduled for removal
    /// after `auto_remove_delay`
    pub auto_remove_enabled: bool,

    /// How long an auto-removed waiter stays registered
    pub auto_remove_delay: Duration,

    /// When enabled, removing a waiter that is scoped to a specific message also asks the
    /// message API collaborator to clear all reactions from that message
    pub remove_reactions_on_expiry: bool,
}

impl Default for ReactionDispatcherConfig {
    fn default() -> Self {
        ReactionDispatcherConfig {
            auto_remove_enabled: true,
            auto_remove_delay: Duration::from_secs(300),
            remove_reactions_on_expiry: false,
        }
    }
}

/// Requests that can be made to the reaction dispatcher
pub enum ReactionDispatcherRequest {
    /// Adds a waiter to the active set. Normally sent via [`ReactionWaiter::activate`]
    RegisterWaiter {
        id: WaiterId,
        waiter: ReactionWaiter,
        callback: ReactionCallback,

        /// When set, the waiter is removed after this delay instead of following the
        /// dispatcher's auto-remove policy
        expire_after: Option<Duration>,
    },

    /// Removes a waiter from the active set. Idempotent. The response channel, if provided,
    /// receives whether the waiter was still registered.
    UnregisterWaiter {
        id: WaiterId,
        response_channel: Option<oneshot::Sender<bool>>,
    },

    /// Schedules a one-shot removal of the specified waiter after the given delay
    UnregisterWaiterAfter { id: WaiterId, delay: Duration },

    /// Delivers a raw reaction notification for matching against all active waiters. Sent by
    /// the embedding application for every reaction its event source observes.
    ReactionAdded { event: ReactionAddedEvent },

    /// Replaces the dispatcher configuration. Applies to registrations made after this request
    /// is processed; already scheduled removals are unaffected.
    UpdateConfiguration { config: ReactionDispatcherConfig },
}

/// Starts a new reaction dispatcher with the given configuration. Outbound side effects (like
/// clearing reactions on expiry) are sent to the provided message API channel. Multiple
/// dispatchers can run side by side without sharing any state.
pub fn start_reaction_dispatcher(
    config: ReactionDispatcherConfig,
    message_api: UnboundedSender<MessageApiRequest>,
) -> UnboundedSender<ReactionDispatcherRequest> {
    let (sender, receiver) = unbounded_channel();
    let actor = Actor::new(config, receiver, message_api);
    tokio::spawn(actor.run());

    sender
}

enum FutureResult {
    AllConsumersGone,
    RequestReceived(
        ReactionDispatcherRequest,
        UnboundedReceiver<ReactionDispatcherRequest>,
    ),

    UnregisterDelayElapsed {
        id: WaiterId,
    },
}

struct RegisteredWaiter {
    id: WaiterId,
    waiter: ReactionWaiter,
    callback: ReactionCallback,
}

struct Actor {
    config: ReactionDispatcherConfig,
    message_api: UnboundedSender<MessageApiRequest>,
    futures: FuturesUnordered<BoxFuture<'static, FutureResult>>,
    waiters: Vec<RegisteredWaiter>,
}

impl Actor {
    fn new(
        config: ReactionDispatcherConfig,
        receiver: UnboundedReceiver<ReactionDispatcherRequest>,
        message_api: UnboundedSender<MessageApiRequest>,
    ) -> Self {
        let futures = FuturesUnordered::new();
        futures.push(wait_for_request(receiver).boxed());

        Actor {
            config,
            message_api,
            futures,
            waiters: Vec::new(),
        }
    }

    #[instrument(name = "Reaction Dispatcher Execution", skip(self))]
    async fn run(mut self) {
        info!("Starting reaction dispatcher");

        while let Some(result) = self.futures.next().await {
            match result {
                FutureResult::AllConsumersGone => {
                    info!("All consumers gone");
                    break;
                }

                FutureResult::RequestReceived(request, receiver) => {
                    self.futures.push(wait_for_request(receiver).boxed());
                    self.handle_request(request);
                }

                FutureResult::UnregisterDelayElapsed { id } => {
                    self.unregister_waiter(id, None);
                }
            }
        }

        info!("Reaction dispatcher closing");
    }

    fn handle_request(&mut self, request: ReactionDispatcherRequest) {
        match request {
            ReactionDispatcherRequest::RegisterWaiter {
                id,
                waiter,
                callback,
                expire_after,
            } => {
                info!(
                    waiter_id = ?id,
                    emote_count = %waiter.emotes.len(),
                    "Registering reaction waiter",
                );

                self.waiters.push(RegisteredWaiter {
                    id,
                    waiter,
                    callback,
                });

                if let Some(delay) = expire_after {
                    self.futures.push(wait_for_unregister_delay(id, delay).boxed());
                } else if self.config.auto_remove_enabled {
                    self.futures.push(
                        wait_for_unregister_delay(id, self.config.auto_remove_delay).boxed(),
                    );
                }
            }

            ReactionDispatcherRequest::UnregisterWaiter {
                id,
                response_channel,
            } => {
                self.unregister_waiter(id, response_channel);
            }

            ReactionDispatcherRequest::UnregisterWaiterAfter { id, delay } => {
                self.futures.push(wait_for_unregister_delay(id, delay).boxed());
            }

            ReactionDispatcherRequest::ReactionAdded { event } => {
                self.handle_reaction_added(event);
            }

            ReactionDispatcherRequest::UpdateConfiguration { config } => {
                self.config = config;
            }
        }
    }

    fn unregister_waiter(&mut self, id: WaiterId, response_channel: Option<oneshot::Sender<bool>>) {
        // A removal request can reach us after the waiter is already gone, e.g. when an
        // auto-remove timer fires for an explicitly deactivated waiter. Only an actual removal
        // may trigger side effects.
        let removed = match self.waiters.iter().position(|entry| entry.id == id) {
            Some(index) => Some(self.waiters.remove(index)),
            None => None,
        };

        if let Some(entry) = &removed {
            info!(waiter_id = ?id, "Unregistered reaction waiter");

            if self.config.remove_reactions_on_expiry {
                if let Some(message_id) = entry.waiter.message_filter {
                    let _ = self
                        .message_api
                        .send(MessageApiRequest::ClearReactions { message_id });
                }
            }
        }

        if let Some(channel) = response_channel {
            let _ = channel.send(removed.is_some());
        }
    }

    fn handle_reaction_added(&self, event: ReactionAddedEvent) {
        if event.added_by_bot {
            return;
        }

        for entry in &self.waiters {
            if !entry.waiter.emotes.contains(&event.emote) {
                continue;
            }

            if let Some(message_id) = entry.waiter.message_filter {
                if message_id != event.message_id {
                    continue;
                }
            }

            if let Some(user_id) = entry.waiter.user_filter {
                if user_id != event.user_id {
                    continue;
                }
            }

            // One invocation per waiter per event, even when the waiter watches several emotes
            let reaction =
                ReactionEvent::new(event.clone(), event.emote.clone(), self.message_api.clone());

            let invocation = catch_unwind(AssertUnwindSafe(|| (entry.callback)(reaction)));
            if invocation.is_err() {
                error!(
                    waiter_id = ?entry.id,
                    "Reaction waiter callback panicked, continuing with remaining waiters",
                );
            }
        }
    }
}

async fn wait_for_request(
    mut receiver: UnboundedReceiver<ReactionDispatcherRequest>,
) -> FutureResult {
    match receiver.recv().await {
        Some(request) => FutureResult::RequestReceived(request, receiver),
        None => FutureResult::AllConsumersGone,
    }
}

async fn wait_for_unregister_delay(id: WaiterId, delay: Duration) -> FutureResult {
    tokio::time::sleep(delay).await;
    FutureResult::UnregisterDelayElapsed { id }
}
