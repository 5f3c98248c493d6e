//! Rule text parsing
//!
//! Rule text is the persistence format and is never rewritten:
//!
//! ```text
//! [#|$|$$|!]<name-or-name*>[@[*.]domain[.*]]
//! ```
//!
//! Each rule is parsed once, when a snapshot is built, into a [`Rule`] with a
//! [`RuleKind`] (what the key does) and a [`DomainScope`] (where it applies).

use crate::domain::DomainParts;

/// What a rule key does once its scope matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RuleKind {
    /// Exact query parameter name (`fbclid`)
    Plain,
    /// Query parameter name prefix (`utm_*`)
    Wildcard,
    /// Fragment parameter or fragment pattern (`#xtor`, `#?utm_*`, `#*`)
    HashParam,
    /// Path ending marker (`$/ref=`, `$$/ref=`)
    EndingMarker,
    /// Removes a name from the blocked set (`!q`)
    Exclude,
}

impl RuleKind {
    /// Classify a rule key by its leading sigil.
    pub fn of_key(key: &str) -> Self {
        if key.starts_with('#') {
            Self::HashParam
        } else if key.starts_with('$') {
            Self::EndingMarker
        } else if key.starts_with('!') {
            Self::Exclude
        } else if wildcard_prefix(key).is_some() {
            Self::Wildcard
        } else {
            Self::Plain
        }
    }

    /// True for kinds that end up in the blocked query parameter list.
    #[inline]
    pub fn is_query(self) -> bool {
        matches!(self, Self::Plain | Self::Wildcard)
    }
}

/// Domain qualifier of a rule (the part after `@`).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DomainScope {
    /// No qualifier: applies everywhere
    Global,
    /// `example.com`
    Host(String),
    /// `*.example.com`: any host sharing that root domain
    RootWildcard(String),
    /// `example.*`: any host whose label before the suffix is `example`
    SuffixWildcard(String),
    /// `*.example.*`
    DoubleWildcard(String),
}

impl DomainScope {
    pub fn parse(text: &str) -> Self {
        if text.is_empty() {
            return Self::Global;
        }
        match (text.strip_prefix("*."), text.strip_suffix(".*")) {
            (Some(rest), _) => match rest.strip_suffix(".*") {
                Some(inner) => Self::DoubleWildcard(inner.to_string()),
                None => Self::RootWildcard(rest.to_string()),
            },
            (None, Some(rest)) => Self::SuffixWildcard(rest.to_string()),
            (None, None) => Self::Host(text.to_string()),
        }
    }

    /// Check the scope against a decomposed request host.
    ///
    /// Wildcards are consumed in order: `*.` first, then `.*`, and whatever is
    /// left is finally compared with the host itself. That is why `*.d` also
    /// matches the bare host `d`.
    pub fn matches(&self, parts: &DomainParts) -> bool {
        match self {
            Self::Global => true,
            Self::Host(host) => parts.domain == *host,
            Self::RootWildcard(root) => parts.root_domain == *root || parts.domain == *root,
            Self::SuffixWildcard(label) | Self::DoubleWildcard(label) => {
                parts.minus_suffix == *label || parts.domain == *label
            }
        }
    }
}

/// A parsed rule.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Rule {
    /// Rule text exactly as stored
    pub raw: String,
    /// Key part, sigils included (`#?utm_*`, `$/ref=`, `!q`)
    pub key: String,
    pub kind: RuleKind,
    pub scope: DomainScope,
}

impl Rule {
    /// Parse rule text. Never fails: rules with an unrecognised shape simply
    /// never match.
    pub fn parse(text: &str) -> Self {
        let (key, scope) = match text.split_once('@') {
            Some((key, domain)) => (key, DomainScope::parse(domain)),
            None => (text, DomainScope::Global),
        };
        Self {
            raw: text.to_string(),
            key: key.to_string(),
            kind: RuleKind::of_key(key),
            scope,
        }
    }

    /// True when the rule has an `@` domain qualifier.
    #[inline]
    pub fn is_scoped(&self) -> bool {
        self.raw.contains('@')
    }
}

/// Prefix of a wildcard parameter name (`utm_*` -> `utm_`).
///
/// Only a single trailing `*` after a non-empty prefix makes a wildcard;
/// `a*b`, `a**` and a bare `*` do not.
#[inline]
pub fn wildcard_prefix(name: &str) -> Option<&str> {
    match name.find('*') {
        Some(idx) if idx > 0 && idx == name.len() - 1 => Some(&name[..idx]),
        _ => None,
    }
}

/// Check a parameter name against a blocked entry, exact or wildcard.
#[inline]
pub fn param_matches(entry: &str, name: &str) -> bool {
    entry == name || wildcard_prefix(entry).is_some_and(|prefix| name.starts_with(prefix))
}
