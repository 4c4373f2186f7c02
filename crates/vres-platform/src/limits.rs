//! Concurrency ceilings per owner kind.
//!
//! The limit lookup is external policy (plan or role based), so it sits at
//! the platform boundary. The engine only ever asks "how many slots may this
//! owner hold".

use std::collections::HashSet;

use vres_models::{Owner, UserId};

/// External concurrency-limit lookup.
pub trait LimitPolicy: Send + Sync {
    /// Maximum in-flight jobs this owner may hold at once.
    fn limit_for(&self, owner: &Owner) -> u32;
}

/// Per-owner-kind ceilings.
#[derive(Debug, Clone)]
pub struct ConcurrencyLimits {
    /// Plain users.
    pub regular: u32,
    /// Users on a premium plan.
    pub premium: u32,
    /// Channels activated by a premium user.
    pub channel: u32,
}

impl Default for ConcurrencyLimits {
    fn default() -> Self {
        Self {
            regular: 1,
            premium: 5,
            channel: 5,
        }
    }
}

impl ConcurrencyLimits {
    /// Create limits from environment variables.
    pub fn from_env() -> Self {
        Self {
            regular: std::env::var("VRES_MAX_CONCURRENT_REGULAR")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(1),
            premium: std::env::var("VRES_MAX_CONCURRENT_PREMIUM")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(5),
            channel: std::env::var("VRES_MAX_CONCURRENT_CHANNEL")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(5),
        }
    }
}

/// Limit policy backed by a fixed premium-user set.
///
/// Suitable for tests and simple embeddings; deployments with persistent
/// plan storage implement [`LimitPolicy`] against it instead.
#[derive(Debug, Clone)]
pub struct StaticLimits {
    limits: ConcurrencyLimits,
    premium_users: HashSet<UserId>,
}

impl StaticLimits {
    pub fn new(limits: ConcurrencyLimits) -> Self {
        Self {
            limits,
            premium_users: HashSet::new(),
        }
    }

    /// Mark a user as premium.
    pub fn with_premium_user(mut self, user: UserId) -> Self {
        self.premium_users.insert(user);
        self
    }
}

impl Default for StaticLimits {
    fn default() -> Self {
        Self::new(ConcurrencyLimits::default())
    }
}

impl LimitPolicy for StaticLimits {
    fn limit_for(&self, owner: &Owner) -> u32 {
        match owner {
            Owner::User { id } => {
                if self.premium_users.contains(id) {
                    self.limits.premium
                } else {
                    self.limits.regular
                }
            }
            Owner::ChannelPost { .. } => self.limits.channel,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_static_limits_by_owner_kind() {
        let limits = StaticLimits::default().with_premium_user(UserId(7));

        assert_eq!(limits.limit_for(&Owner::user(1)), 1);
        assert_eq!(limits.limit_for(&Owner::user(7)), 5);
        assert_eq!(limits.limit_for(&Owner::channel_post(-100, 1)), 5);
    }
}
