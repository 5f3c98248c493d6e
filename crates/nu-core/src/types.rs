//! Core type definitions for Neat URL
//!
//! Request descriptors handed in by the host and the outcome handed back.

use crate::retarget::RetargetToken;

// =============================================================================
// Request Types (bit mask for type filtering)
// =============================================================================

bitflags::bitflags! {
    /// Request type bit mask.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct RequestType: u32 {
        const OTHER = 1 << 0;
        const SCRIPT = 1 << 1;
        const IMAGE = 1 << 2;
        const STYLESHEET = 1 << 3;
        const OBJECT = 1 << 4;
        const SUB_FRAME = 1 << 5;
        const MAIN_FRAME = 1 << 6;
        const XMLHTTPREQUEST = 1 << 7;
        const WEBSOCKET = 1 << 8;
        const FONT = 1 << 9;
        const MEDIA = 1 << 10;
        const PING = 1 << 11;
        const CSP_REPORT = 1 << 12;
        const BEACON = 1 << 13;
        const IMAGESET = 1 << 14;
        const XSLT = 1 << 15;

        /// All request types
        const ALL = 0xFFFF;
        /// Document types (main_frame + sub_frame)
        const DOCUMENT = Self::MAIN_FRAME.bits() | Self::SUB_FRAME.bits();
    }
}

impl RequestType {
    /// Parse from a browser request type string.
    pub fn from_type_name(s: &str) -> Self {
        match s {
            "main_frame" => Self::MAIN_FRAME,
            "sub_frame" => Self::SUB_FRAME,
            "stylesheet" => Self::STYLESHEET,
            "script" => Self::SCRIPT,
            "image" => Self::IMAGE,
            "imageset" => Self::IMAGESET,
            "font" => Self::FONT,
            "object" => Self::OBJECT,
            "xmlhttprequest" => Self::XMLHTTPREQUEST,
            "ping" => Self::PING,
            "beacon" => Self::BEACON,
            "csp_report" => Self::CSP_REPORT,
            "media" => Self::MEDIA,
            "websocket" => Self::WEBSOCKET,
            "xslt" => Self::XSLT,
            _ => Self::OTHER,
        }
    }

    /// Parse a list of request type names into a mask.
    pub fn from_type_names<'a, I: IntoIterator<Item = &'a str>>(names: I) -> Self {
        names
            .into_iter()
            .fold(Self::empty(), |mask, name| mask | Self::from_type_name(name))
    }
}

/// Check whether requests of `request_type` should reach the engine at all.
#[inline]
pub fn should_intercept(types: RequestType, request_type: &str) -> bool {
    types.contains(RequestType::from_type_name(request_type))
}

// =============================================================================
// Request / Outcome
// =============================================================================

/// One intercepted request or navigation.
#[derive(Debug, Clone, Copy)]
pub struct CleanRequest<'a> {
    /// Full request URL
    pub url: &'a str,
    /// Request type
    pub request_type: RequestType,
    /// Opaque tab identifier
    pub tab_id: i32,
}

impl<'a> CleanRequest<'a> {
    pub fn main_frame(url: &'a str) -> Self {
        Self {
            url,
            request_type: RequestType::MAIN_FRAME,
            tab_id: -1,
        }
    }
}

/// Why a request passed through untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Rewriting is switched off
    Disabled,
    /// URL could not be parsed
    Unparsable,
    /// URL has no hostname
    NoHost,
    /// Hostname ends with a blacklisted suffix
    Blacklisted,
    /// Rules applied but produced the same URL
    Unchanged,
    /// Deferred host, but not a top-level navigation
    DeferredSubresource,
    /// Deferred host, and this target is already queued
    AlreadyPending,
}

impl SkipReason {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Disabled => "disabled",
            Self::Unparsable => "unparsable",
            Self::NoHost => "no_host",
            Self::Blacklisted => "blacklisted",
            Self::Unchanged => "unchanged",
            Self::DeferredSubresource => "deferred_subresource",
            Self::AlreadyPending => "already_pending",
        }
    }
}

/// How a rewrite reaches the browser.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    /// The replacement URL is returned synchronously
    Normal,
    /// The host cannot redirect this request; the tab must be updated later
    Deferred(RetargetToken),
}

/// Result of cleaning one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CleanOutcome {
    Skipped(SkipReason),
    Rewritten { url: String, change: ChangeKind },
}

impl CleanOutcome {
    /// Replacement URL, if any.
    pub fn redirect_url(&self) -> Option<&str> {
        match self {
            Self::Rewritten { url, .. } => Some(url),
            Self::Skipped(_) => None,
        }
    }

    pub fn is_rewritten(&self) -> bool {
        matches!(self, Self::Rewritten { .. })
    }
}
