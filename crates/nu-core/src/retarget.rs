//! Deferred tab retargeting
//!
//! Some hosts refuse synchronous request redirects (`addons.mozilla.org`).
//! For those the engine queues the cleaned URL in a single slot; the host
//! waits [`RETARGET_DELAY`], calls [`RetargetSlot::fire`] and updates any tab
//! still showing the original URL, then waits again and calls
//! [`RetargetSlot::expire`].
//!
//! Every `arm` hands out a fresh token. `fire` and `expire` only act when
//! their token is still the current one, so a stale timer can neither
//! retarget to a newer URL nor clear a newer entry.
//!
//! ```text
//! Idle --arm--> Pending --fire--> Fired --expire--> Idle
//!                  |                                  ^
//!                  +-------------expire---------------+
//! ```

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use log::debug;

/// Host whose navigations are retargeted instead of redirected.
pub const DEFERRED_HOST: &str = "addons.mozilla.org";

/// Wait before firing, and again before expiring.
pub const RETARGET_DELAY: Duration = Duration::from_millis(1000);

/// Identifies one `arm` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RetargetToken(pub u64);

/// A queued retarget.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingRetarget {
    pub token: RetargetToken,
    /// Cleaned URL to navigate to
    pub target: String,
    /// URL the tab was navigating to; used to find the tab
    pub origin: String,
    pub tab_id: i32,
}

#[derive(Debug, Default)]
enum SlotState {
    #[default]
    Idle,
    Pending(PendingRetarget),
    Fired(PendingRetarget),
}

/// Single-slot, last-write-wins retarget queue.
#[derive(Debug, Default)]
pub struct RetargetSlot {
    state: Mutex<SlotState>,
    next_token: AtomicU64,
}

impl RetargetSlot {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, SlotState> {
        // a poisoned guard still holds a whole state
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Queue a retarget, replacing whatever was queued before.
    ///
    /// Returns `None` if `target` is already queued or was fired and has not
    /// expired yet.
    pub fn arm(&self, target: &str, origin: &str, tab_id: i32) -> Option<RetargetToken> {
        let mut state = self.lock();
        if let SlotState::Pending(p) | SlotState::Fired(p) = &*state {
            if p.target == target {
                return None;
            }
        }

        let token = RetargetToken(self.next_token.fetch_add(1, Ordering::Relaxed) + 1);
        debug!("retarget {:?} armed: '{}' -> '{}'", token, origin, target);
        *state = SlotState::Pending(PendingRetarget {
            token,
            target: target.to_string(),
            origin: origin.to_string(),
            tab_id,
        });
        Some(token)
    }

    /// Take the queued retarget for `token`.
    ///
    /// Returns the record at most once, and only while `token` is current.
    pub fn fire(&self, token: RetargetToken) -> Option<PendingRetarget> {
        let mut state = self.lock();
        match std::mem::take(&mut *state) {
            SlotState::Pending(p) if p.token == token => {
                *state = SlotState::Fired(p.clone());
                Some(p)
            }
            other => {
                *state = other;
                None
            }
        }
    }

    /// Clear the slot if `token` is still current. Returns true if cleared.
    pub fn expire(&self, token: RetargetToken) -> bool {
        let mut state = self.lock();
        let current = match &*state {
            SlotState::Pending(p) | SlotState::Fired(p) => p.token == token,
            SlotState::Idle => false,
        };
        if current {
            debug!("retarget {:?} expired", token);
            *state = SlotState::Idle;
        }
        current
    }

    /// Target URL currently queued or fired, if any.
    pub fn pending_target(&self) -> Option<String> {
        match &*self.lock() {
            SlotState::Pending(p) | SlotState::Fired(p) => Some(p.target.clone()),
            SlotState::Idle => None,
        }
    }

    pub fn is_idle(&self) -> bool {
        matches!(&*self.lock(), SlotState::Idle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arm_fire_expire() {
        let slot = RetargetSlot::new();
        let token = slot.arm("https://a/clean", "https://a/dirty", 7).unwrap();
        assert_eq!(slot.pending_target().as_deref(), Some("https://a/clean"));

        let fired = slot.fire(token).unwrap();
        assert_eq!(fired.origin, "https://a/dirty");
        assert_eq!(fired.tab_id, 7);
        // only once
        assert!(slot.fire(token).is_none());

        assert!(slot.expire(token));
        assert!(slot.is_idle());
    }

    #[test]
    fn test_same_target_not_rearmed() {
        let slot = RetargetSlot::new();
        let token = slot.arm("https://a/clean", "https://a/dirty", 1).unwrap();
        assert!(slot.arm("https://a/clean", "https://a/dirty", 1).is_none());
        slot.fire(token);
        assert!(slot.arm("https://a/clean", "https://a/dirty", 1).is_none());
        slot.expire(token);
        assert!(slot.arm("https://a/clean", "https://a/dirty", 1).is_some());
    }

    #[test]
    fn test_last_write_wins() {
        let slot = RetargetSlot::new();
        let first = slot.arm("https://a/1", "https://a/1?x", 1).unwrap();
        let second = slot.arm("https://a/2", "https://a/2?x", 2).unwrap();
        assert!(second > first);

        // stale timers do nothing
        assert!(slot.fire(first).is_none());
        assert!(!slot.expire(first));
        assert_eq!(slot.pending_target().as_deref(), Some("https://a/2"));

        assert_eq!(slot.fire(second).unwrap().target, "https://a/2");
    }

    #[test]
    fn test_expire_without_fire() {
        let slot = RetargetSlot::new();
        let token = slot.arm("https://a/1", "https://a/1?x", 1).unwrap();
        assert!(slot.expire(token));
        assert!(slot.fire(token).is_none());
    }
}
