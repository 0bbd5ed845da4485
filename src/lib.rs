//! Lets callers wait for emote reactions being added to chat messages. A caller builds a
//! [`dispatcher::ReactionWaiter`] describing the emotes it is interested in (optionally scoped to
//! a specific message and/or user), activates it against a running reaction dispatcher, and its
//! callback is invoked for every incoming reaction that matches. Waiters can be deactivated
//! explicitly, after a delay, or automatically by the dispatcher's auto-remove policy.
//!
//! The dispatcher itself performs no network I/O. Inbound reaction notifications are delivered to
//! it by the embedding application (whatever owns the chat platform connection), and outbound
//! operations like replying or clearing reactions are expressed as [`messaging::MessageApiRequest`]
//! values sent over a channel to a message API collaborator, fire-and-forget.

pub mod dispatcher;
pub mod emotes;
pub mod events;
pub mod messaging;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

use uuid::Uuid;

/// Identifies the channel a message lives in. An opaque value assigned by the chat platform.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ChannelId(pub u64);

/// Identifies a single message. An opaque value assigned by the chat platform. Any value
/// (including zero) is a real identity; "no message filter" is expressed with `Option`, never
/// with a sentinel.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MessageId(pub u64);

/// Identifies a user account. An opaque value assigned by the chat platform.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct UserId(pub u64);

/// Identifies one activation of a reaction waiter. Every activation gets a fresh id, so
/// registering the same filter twice produces two independently removable registrations.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct WaiterId(pub Uuid);
