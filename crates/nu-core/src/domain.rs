//! Hostname decomposition
//!
//! Splits a hostname into the three views the rule matcher compares against:
//! the host without a leading `www.`, its registrable root domain, and the
//! label sitting directly in front of the public suffix.
//!
//! The root domain is a heuristic, not a full PSL walk: only two-label
//! suffixes whose first label is at most three characters long (`co.uk`,
//! `com.au`) are looked up in the [`SuffixTable`].

use crate::suffix::SuffixTable;

/// Longest second-to-last label that may still be part of a ccSLD.
const MAX_SLD_LABEL_LEN: usize = 3;

/// A last label shorter than this is treated as a country code when the
/// suffix table has no answer.
const SHORT_LABEL_GAP: usize = 4;

/// Decomposed view of a request hostname. Recomputed per request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainParts {
    /// Hostname with a leading `www.` removed
    pub domain: String,
    /// Registrable domain (`example.co.uk`)
    pub root_domain: String,
    /// Label in front of the public suffix (`example`)
    pub minus_suffix: String,
}

/// Decompose a hostname. Returns `None` for an empty host.
pub fn decompose(host: &str, suffixes: &SuffixTable) -> Option<DomainParts> {
    if host.is_empty() {
        return None;
    }

    let domain = strip_www(host);
    Some(DomainParts {
        domain: domain.to_string(),
        root_domain: root_domain(domain, suffixes),
        minus_suffix: domain_minus_suffix(domain, suffixes).to_string(),
    })
}

/// Remove a case-insensitive leading `www.`.
#[inline]
pub fn strip_www(host: &str) -> &str {
    match host.get(..4) {
        Some(prefix) if prefix.eq_ignore_ascii_case("www.") => &host[4..],
        _ => host,
    }
}

/// Registrable domain of `domain`.
pub fn root_domain(domain: &str, suffixes: &SuffixTable) -> String {
    let labels: Vec<&str> = domain.split('.').collect();
    let n = labels.len();
    if n <= 2 {
        return domain.to_string();
    }

    if labels[n - 2].len() <= MAX_SLD_LABEL_LEN {
        let candidate = format!("{}.{}", labels[n - 2], labels[n - 1]);
        if suffixes.contains(&candidate) {
            return labels[n - 3..].join(".");
        }
    }

    labels[n - 2..].join(".")
}

/// Everything before the public suffix of `domain`.
pub fn domain_minus_suffix<'a>(domain: &'a str, suffixes: &SuffixTable) -> &'a str {
    let (head, ext) = match domain.find('.') {
        Some(idx) => (&domain[..idx], &domain[idx + 1..]),
        None => ("", domain),
    };
    if suffixes.contains(ext) {
        return head;
    }

    let Some(last) = domain.rfind('.') else {
        return "";
    };
    let prev = domain[..last].rfind('.');

    // gap between the last two dots, counting from "before the string" when
    // there is only one dot
    let gap = match prev {
        Some(p) => last - p,
        None => last + 1,
    };

    if gap < SHORT_LABEL_GAP {
        prev.map_or("", |p| &domain[..p])
    } else {
        &domain[..last]
    }
}
