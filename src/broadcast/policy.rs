//! Broadcast coalescing
//!
//! While changes keep arriving faster than they are broadcast, waiting a
//! little lets them be delivered in one cycle. The policy postpones a
//! broadcast in fixed steps while the backlog exceeds a threshold, and
//! gives up waiting once the total delay would pass the maximum.

use crate::config::BroadcastConfig;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BroadcastDecision {
    /// Wait this long, then ask again
    Postpone(Duration),
    /// Broadcast now
    Broadcast,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BroadcastPolicy {
    postpone_threshold: usize,
    postpone_step: Duration,
    max_delay: Duration,
}

impl Default for BroadcastPolicy {
    fn default() -> Self {
        Self::from_config(&BroadcastConfig::default())
    }
}

impl BroadcastPolicy {
    pub fn from_config(config: &BroadcastConfig) -> Self {
        Self {
            postpone_threshold: config.postpone_threshold,
            postpone_step: config.postpone_step(),
            max_delay: config.max_delay(),
        }
    }

    /// Decide for a backlog of `pending` changes after waiting `waited`
    pub fn decide(&self, pending: usize, waited: Duration) -> BroadcastDecision {
        if pending <= self.postpone_threshold || self.postpone_step.is_zero() {
            return BroadcastDecision::Broadcast;
        }
        if waited + self.postpone_step > self.max_delay {
            return BroadcastDecision::Broadcast;
        }
        BroadcastDecision::Postpone(self.postpone_step)
    }
}
