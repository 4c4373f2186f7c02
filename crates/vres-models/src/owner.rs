//! Owner identities.
//!
//! An owner is the unit of concurrency and queueing: either an individual
//! user submitting videos in a private chat, or a channel whose posts are
//! picked up for processing. User and channel IDs come from the same integer
//! domain on the platform side, so they are kept apart with a tagged key.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Platform user ID.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub i64);

impl UserId {
    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Platform channel ID.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChannelId(pub i64);

impl ChannelId {
    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Message ID within a channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageId(pub i64);

impl MessageId {
    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Who submitted a video.
///
/// Channel posts carry the origin message ID because their results are
/// delivered by editing the original post in place, not by replying.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum Owner {
    /// A user in a private chat.
    User { id: UserId },
    /// A post in a subscribed channel.
    ChannelPost { channel: ChannelId, message: MessageId },
}

impl Owner {
    pub fn user(id: i64) -> Self {
        Owner::User { id: UserId(id) }
    }

    pub fn channel_post(channel: i64, message: i64) -> Self {
        Owner::ChannelPost {
            channel: ChannelId(channel),
            message: MessageId(message),
        }
    }

    /// The key used for concurrency accounting and queueing.
    pub fn key(&self) -> OwnerKey {
        match self {
            Owner::User { id } => OwnerKey::User(id.0),
            Owner::ChannelPost { channel, .. } => OwnerKey::Channel(channel.0),
        }
    }

    pub fn is_channel(&self) -> bool {
        matches!(self, Owner::ChannelPost { .. })
    }

    /// User ID for user-owned submissions, None for channels.
    pub fn user_id(&self) -> Option<UserId> {
        match self {
            Owner::User { id } => Some(*id),
            Owner::ChannelPost { .. } => None,
        }
    }
}

impl fmt::Display for Owner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Owner::User { id } => write!(f, "user {}", id),
            Owner::ChannelPost { channel, message } => {
                write!(f, "channel {} (post {})", channel, message)
            }
        }
    }
}

/// Tagged identity key: users and channels never share an entry even when
/// their raw IDs collide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OwnerKey {
    User(i64),
    Channel(i64),
}

impl OwnerKey {
    pub fn is_channel(&self) -> bool {
        matches!(self, OwnerKey::Channel(_))
    }
}

impl fmt::Display for OwnerKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OwnerKey::User(id) => write!(f, "user:{}", id),
            OwnerKey::Channel(id) => write!(f, "channel:{}", id),
        }
    }
}
