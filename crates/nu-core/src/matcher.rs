//! Rule Matching
//!
//! Walks the effective rule list in order and sorts every rule whose scope
//! matches the request host into one of four lists. Nothing here touches the
//! URL; all classification happens before the rewriter runs.

use log::debug;
use url::Url;

use crate::domain::DomainParts;
use crate::rule::{Rule, RuleKind};

/// Rule text of the one rule with a value-dependent exception.
///
/// `gws_rd=cr` on google.com is a country redirect loop guard; stripping it
/// sends the browser back and forth between google.com and the local site.
const GWS_RD_RULE: &str = "gws_rd@google.*";
const GWS_RD_ROOT: &str = "google.com";
const GWS_RD_PARAM: &str = "gws_rd";
const GWS_RD_KEEP_VALUE: &str = "cr";

/// Per-request rule lists, borrowed from the snapshot's rules.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassifiedParams<'r> {
    /// Query parameter names and `name*` prefixes to delete
    pub blocked: Vec<&'r str>,
    /// Fragment rules, sigil included
    pub hash: Vec<&'r str>,
    /// Path ending markers, sigils included
    pub endings: Vec<&'r str>,
    /// Exclude overrides, sigil included
    pub excludes: Vec<&'r str>,
}

impl ClassifiedParams<'_> {
    pub fn is_empty(&self) -> bool {
        self.blocked.is_empty()
            && self.hash.is_empty()
            && self.endings.is_empty()
            && self.excludes.is_empty()
    }
}

/// Match one rule against a request. Returns the rule key on a match.
pub fn match_rule<'r>(rule: &'r Rule, parts: &DomainParts, url: &Url) -> Option<&'r str> {
    if rule.raw == GWS_RD_RULE && parts.root_domain == GWS_RD_ROOT && keeps_gws_rd(url) {
        return None;
    }

    if rule.key.is_empty() || !rule.scope.matches(parts) {
        return None;
    }

    Some(rule.key.as_str())
}

fn keeps_gws_rd(url: &Url) -> bool {
    url.query_pairs()
        .find(|(key, _)| key == GWS_RD_PARAM)
        .is_some_and(|(_, value)| value == GWS_RD_KEEP_VALUE)
}

/// Run every rule, in list order, and build the four lists.
///
/// Excludes are applied last and only remove entries from `blocked`.
pub fn classify<'r>(rules: &'r [Rule], parts: &DomainParts, url: &Url) -> ClassifiedParams<'r> {
    let mut params = ClassifiedParams::default();

    for rule in rules {
        let Some(key) = match_rule(rule, parts, url) else {
            continue;
        };

        match rule.kind {
            RuleKind::HashParam => {
                debug!("hash param '{}' matches {}", key, parts.domain);
                params.hash.push(key);
            }
            RuleKind::EndingMarker => {
                debug!("ending param '{}' matches {}", key, parts.domain);
                params.endings.push(key);
            }
            RuleKind::Exclude => {
                debug!("exclude param '{}' matches {}", key, parts.domain);
                params.excludes.push(key);
            }
            RuleKind::Plain | RuleKind::Wildcard => params.blocked.push(key),
        }
    }

    for exclude in &params.excludes {
        let name = &exclude[1..];
        params.blocked.retain(|blocked| *blocked != name);
    }

    params
}
