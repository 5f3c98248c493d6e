//! Rewrite orchestration
//!
//! [`clean_url`] is the per-request entry point: blacklist check, host
//! decomposition, rule classification, rewrite, change detection. It reads an
//! immutable [`RuleSnapshot`] and keeps no per-request state, so concurrent
//! calls are independent. The only shared mutable piece is the
//! [`RetargetSlot`] used for hosts that cannot be redirected synchronously.
//!
//! [`Cleaner`] bundles the process-wide pieces: the on/off switch, the
//! current snapshot and the retarget slot.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};

use log::{debug, info};
use url::Url;

use crate::domain::{decompose, DomainParts};
use crate::error::CleanError;
use crate::matcher::{classify, ClassifiedParams};
use crate::retarget::{RetargetSlot, DEFERRED_HOST};
use crate::rewrite::rewrite;
use crate::rule::Rule;
use crate::suffix::SuffixTable;
use crate::types::{ChangeKind, CleanOutcome, CleanRequest, RequestType, SkipReason};

// =============================================================================
// Rule Snapshot
// =============================================================================

/// Immutable configuration used for one or more requests.
///
/// Reloading settings builds a new snapshot; an existing one is never mutated.
#[derive(Debug, Clone)]
pub struct RuleSnapshot {
    rules: Vec<Rule>,
    blacklist: Vec<String>,
    suffixes: Arc<SuffixTable>,
    request_types: RequestType,
}

impl RuleSnapshot {
    /// Create a snapshot. `rules` must already be in effective order
    /// (defaults minus overrides, then user rules).
    pub fn new(
        rules: Vec<Rule>,
        blacklist: Vec<String>,
        suffixes: Arc<SuffixTable>,
        request_types: RequestType,
    ) -> Self {
        Self {
            rules,
            blacklist,
            suffixes,
            request_types,
        }
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn blacklist(&self) -> &[String] {
        &self.blacklist
    }

    pub fn suffixes(&self) -> &SuffixTable {
        &self.suffixes
    }

    pub fn request_types(&self) -> RequestType {
        self.request_types
    }

    /// Check whether `host` ends with any blacklisted suffix.
    pub fn is_blacklisted(&self, host: &str) -> bool {
        self.blacklist
            .iter()
            .any(|suffix| !suffix.is_empty() && host.ends_with(suffix.as_str()))
    }

    /// Decompose `url`'s host and classify the snapshot's rules against it.
    pub fn explain<'s>(&'s self, url: &Url) -> Option<(DomainParts, ClassifiedParams<'s>)> {
        let parts = decompose(url.host_str()?, &self.suffixes)?;
        let params = classify(&self.rules, &parts, url);
        Some((parts, params))
    }
}

// =============================================================================
// Per-request entry point
// =============================================================================

/// Clean one request against `snapshot`.
///
/// Never fails: anything that goes wrong resolves to
/// [`CleanOutcome::Skipped`] and the request passes through unchanged.
pub fn clean_url(
    snapshot: &RuleSnapshot,
    request: &CleanRequest<'_>,
    slot: &RetargetSlot,
) -> CleanOutcome {
    match try_clean(snapshot, request, slot) {
        Ok(outcome) => outcome,
        Err(e) => {
            debug!("not rewriting '{}': {}", request.url, e);
            CleanOutcome::Skipped(e.skip_reason())
        }
    }
}

fn try_clean(
    snapshot: &RuleSnapshot,
    request: &CleanRequest<'_>,
    slot: &RetargetSlot,
) -> Result<CleanOutcome, CleanError> {
    let url = Url::parse(request.url)?;
    let host = url
        .host_str()
        .filter(|host| !host.is_empty())
        .ok_or_else(|| CleanError::MissingHost(request.url.to_string()))?;

    if snapshot.is_blacklisted(host) {
        debug!("not rewriting '{}': blacklisted", url);
        return Ok(CleanOutcome::Skipped(SkipReason::Blacklisted));
    }

    let Some((_, params)) = snapshot.explain(&url) else {
        return Err(CleanError::MissingHost(request.url.to_string()));
    };

    let cleaned = rewrite(&url, &params);
    if cleaned.as_str() == url.as_str() {
        return Ok(CleanOutcome::Skipped(SkipReason::Unchanged));
    }

    info!(
        "(type {:?}): '{}' has been changed to '{}'",
        request.request_type, request.url, cleaned
    );

    if cleaned.host_str() != Some(DEFERRED_HOST) {
        return Ok(CleanOutcome::Rewritten {
            url: cleaned.into(),
            change: ChangeKind::Normal,
        });
    }

    if !request.request_type.contains(RequestType::MAIN_FRAME) {
        return Ok(CleanOutcome::Skipped(SkipReason::DeferredSubresource));
    }

    match slot.arm(cleaned.as_str(), request.url, request.tab_id) {
        Some(token) => Ok(CleanOutcome::Rewritten {
            url: cleaned.into(),
            change: ChangeKind::Deferred(token),
        }),
        None => Ok(CleanOutcome::Skipped(SkipReason::AlreadyPending)),
    }
}

// =============================================================================
// Cleaner
// =============================================================================

/// Process-wide engine state.
#[derive(Debug)]
pub struct Cleaner {
    enabled: AtomicBool,
    snapshot: RwLock<Arc<RuleSnapshot>>,
    retarget: RetargetSlot,
}

impl Cleaner {
    pub fn new(snapshot: RuleSnapshot) -> Self {
        Self {
            enabled: AtomicBool::new(true),
            snapshot: RwLock::new(Arc::new(snapshot)),
            retarget: RetargetSlot::new(),
        }
    }

    /// Current snapshot.
    pub fn snapshot(&self) -> Arc<RuleSnapshot> {
        self.snapshot
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Swap in a new snapshot. Requests already running keep the old one.
    pub fn reload(&self, snapshot: RuleSnapshot) {
        *self.snapshot.write().unwrap_or_else(|e| e.into_inner()) = Arc::new(snapshot);
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Relaxed)
    }

    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::Relaxed);
    }

    /// Flip the on/off switch. Returns the new state.
    pub fn toggle_enabled(&self) -> bool {
        !self.enabled.fetch_xor(true, Ordering::Relaxed)
    }

    pub fn retarget(&self) -> &RetargetSlot {
        &self.retarget
    }

    /// Clean one request with the current snapshot.
    pub fn clean(&self, request: &CleanRequest<'_>) -> CleanOutcome {
        if !self.is_enabled() {
            return CleanOutcome::Skipped(SkipReason::Disabled);
        }
        let snapshot = self.snapshot();
        clean_url(&snapshot, request, &self.retarget)
    }
}
