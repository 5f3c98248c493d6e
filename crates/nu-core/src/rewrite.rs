//! URL Rewriting
//!
//! Applies classified rule lists to a parsed URL. Query strings and fragments
//! are filtered segment by segment: kept `key=value` pairs are copied through
//! verbatim instead of being re-serialized, so a rewrite never changes the
//! encoding of parameters it did not remove.

use std::borrow::Cow;

use log::debug;
use url::{form_urlencoded, Url};

use crate::matcher::ClassifiedParams;
use crate::rule::{param_matches, wildcard_prefix};

/// Fragment rules that clear the whole fragment.
const CLEAR_FRAGMENT_RULES: [&str; 2] = ["#*", "#?*"];

/// Path segment that marks a product page, where endings apply even when a
/// query string is present.
const PRODUCT_PAGE_SEGMENT: &str = "/dp/";

/// Apply all four lists to a copy of `url`.
pub fn rewrite(url: &Url, params: &ClassifiedParams<'_>) -> Url {
    let mut out = url.clone();
    strip_query_params(&mut out, &params.blocked);
    rewrite_fragment(&mut out, &params.blocked, &params.hash);
    remove_endings(&mut out, &params.endings);
    out
}

// =============================================================================
// Query
// =============================================================================

/// Delete every query parameter named in `blocked`, exact or by `name*`
/// prefix. Returns true if anything was removed.
pub fn strip_query_params(url: &mut Url, blocked: &[&str]) -> bool {
    if blocked.is_empty() {
        return false;
    }
    let Some(query) = url.query() else {
        return false;
    };

    let Some(kept) = filter_pairs(query, |name| blocked.iter().any(|entry| param_matches(entry, name)))
    else {
        return false;
    };

    url.set_query(non_empty(&kept));
    true
}

// =============================================================================
// Fragment
// =============================================================================

/// Rewrite the fragment when it encodes parameters.
///
/// Wildcard entries of `blocked` and `#?name` rules remove parameters from the
/// fragment read as `key=value&...`. An exact fragment rule, `#*` or `#?*`
/// clears the fragment outright.
pub fn rewrite_fragment(url: &mut Url, blocked: &[&str], hash: &[&str]) {
    if blocked.is_empty() && hash.is_empty() {
        return;
    }
    let Some(fragment) = url.fragment().map(str::to_owned) else {
        return;
    };

    let wildcards: Vec<&str> = blocked
        .iter()
        .copied()
        .filter(|entry| wildcard_prefix(entry).is_some())
        .collect();

    let mut current = fragment.clone();
    if !wildcards.is_empty() {
        if let Some(kept) = filter_pairs(&current, |name| {
            wildcards.iter().any(|entry| param_matches(entry, name))
        }) {
            current = kept;
        }
    }

    for rule in hash {
        let exact = !fragment.is_empty() && rule.strip_prefix('#') == Some(fragment.as_str());
        if exact || CLEAR_FRAGMENT_RULES.contains(rule) {
            debug!("clearing fragment of {} for '{}'", url, rule);
            url.set_fragment(None);
            return;
        }

        if let Some(name) = rule.strip_prefix("#?") {
            if let Some(kept) = filter_pairs(&current, |key| param_matches(name, key)) {
                current = kept;
            }
        }
    }

    // Only take the new fragment when it got shorter; an equal or longer form
    // means nothing was removed.
    if current.len() < fragment.len() {
        url.set_fragment(non_empty(&current));
    }
}

// =============================================================================
// Path endings
// =============================================================================

/// Truncate the path at the last occurrence of each ending marker.
///
/// When the path changes the query string is dropped as well.
pub fn remove_endings(url: &mut Url, endings: &[&str]) -> bool {
    if endings.is_empty() {
        return false;
    }

    let has_query = url.query().is_some_and(|q| !q.is_empty());
    let original = url.path().to_string();
    let mut path = original.clone();

    for marker in endings {
        path = apply_ending(marker, has_query, &path).to_string();
    }

    if path == original {
        return false;
    }

    url.set_path(&path);
    url.set_query(None);
    true
}

/// Cut `path` at the last occurrence of `marker`, if the marker applies.
///
/// `$marker` applies only without a query string (or on product pages);
/// `$$marker` always applies.
pub fn apply_ending<'p>(marker: &str, has_query: bool, path: &'p str) -> &'p str {
    let forced = marker.as_bytes().get(1) == Some(&b'$');
    if has_query && !forced && !path.contains(PRODUCT_PAGE_SEGMENT) {
        return path;
    }

    let mut literal = marker;
    for _ in 0..2 {
        literal = literal.strip_prefix('$').unwrap_or(literal);
    }

    match path.rfind(literal) {
        Some(idx) => &path[..idx],
        None => path,
    }
}

// =============================================================================
// Helpers
// =============================================================================

/// Drop `key=value` segments whose decoded key satisfies `remove`.
///
/// Returns the remaining segments joined by `&`, or `None` if nothing was
/// removed.
fn filter_pairs(input: &str, mut remove: impl FnMut(&str) -> bool) -> Option<String> {
    let mut kept = Vec::new();
    let mut removed = false;

    for segment in input.split('&') {
        if segment.is_empty() {
            continue;
        }
        if remove(&decode_key(segment)) {
            removed = true;
        } else {
            kept.push(segment);
        }
    }

    removed.then(|| kept.join("&"))
}

fn decode_key(segment: &str) -> Cow<'_, str> {
    form_urlencoded::parse(segment.as_bytes())
        .next()
        .map(|(key, _)| key)
        .unwrap_or(Cow::Borrowed(""))
}

#[inline]
fn non_empty(s: &str) -> Option<&str> {
    if s.is_empty() {
        None
    } else {
        Some(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn test_strip_query_exact_and_wildcard() {
        let mut u = url("https://example.com/?utm_source=a&id=1&utm_medium=b&utma=2&fbclid=x");
        assert!(strip_query_params(&mut u, &["utm_*", "fbclid"]));
        assert_eq!(u.as_str(), "https://example.com/?id=1&utma=2");
    }

    #[test]
    fn test_strip_query_duplicate_keys() {
        let mut u = url("https://example.com/?a=1&a=2&b=3&a=4");
        assert!(strip_query_params(&mut u, &["a"]));
        assert_eq!(u.as_str(), "https://example.com/?b=3");
    }

    #[test]
    fn test_strip_query_removes_question_mark() {
        let mut u = url("https://example.com/path?fbclid=1#top");
        assert!(strip_query_params(&mut u, &["fbclid"]));
        assert_eq!(u.as_str(), "https://example.com/path#top");
    }

    #[test]
    fn test_strip_query_keeps_encoding() {
        let mut u = url("https://example.com/?q=a+b%20c&flag&fbclid=1");
        assert!(strip_query_params(&mut u, &["fbclid"]));
        assert_eq!(u.as_str(), "https://example.com/?q=a+b%20c&flag");
    }

    #[test]
    fn test_strip_query_decodes_keys() {
        let mut u = url("https://example.com/?utm%5Fsource=1&id=2");
        assert!(strip_query_params(&mut u, &["utm_source"]));
        assert_eq!(u.as_str(), "https://example.com/?id=2");
    }

    #[test]
    fn test_strip_query_noop() {
        let mut u = url("https://example.com/?id=1");
        assert!(!strip_query_params(&mut u, &["fbclid"]));
        assert_eq!(u.as_str(), "https://example.com/?id=1");
    }

    #[test]
    fn test_fragment_clear_all() {
        let mut u = url("https://example.com/a#utm_source=x&utm_medium=y");
        rewrite_fragment(&mut u, &[], &["#*"]);
        assert_eq!(u.as_str(), "https://example.com/a");
    }

    #[test]
    fn test_fragment_clear_all_params() {
        let mut u = url("https://example.com/a?id=1#utm_source=x&page=2");
        rewrite_fragment(&mut u, &[], &["#?*"]);
        assert_eq!(u.as_str(), "https://example.com/a?id=1");
    }

    #[test]
    fn test_fragment_exact_match() {
        let mut u = url("https://example.com/a#xtor=RSS-1");
        rewrite_fragment(&mut u, &[], &["#xtor=RSS-1"]);
        assert_eq!(u.fragment(), None);

        let mut u = url("https://example.com/a#section");
        rewrite_fragment(&mut u, &[], &["#xtor=RSS-1"]);
        assert_eq!(u.fragment(), Some("section"));
    }

    #[test]
    fn test_fragment_named_param() {
        let mut u = url("https://example.com/r#utm_source=fb&utm_medium=social&page=2");
        rewrite_fragment(&mut u, &[], &["#?utm_source"]);
        assert_eq!(u.fragment(), Some("utm_medium=social&page=2"));

        rewrite_fragment(&mut u, &[], &["#?utm_*"]);
        assert_eq!(u.fragment(), Some("page=2"));
    }

    #[test]
    fn test_fragment_wildcard_blocked_params() {
        let mut u = url("https://example.com/r#utm_source=fb&page=2");
        rewrite_fragment(&mut u, &["utm_*", "fbclid"], &[]);
        assert_eq!(u.fragment(), Some("page=2"));

        // exact blocked names do not reach into the fragment
        let mut u = url("https://example.com/r#fbclid=1");
        rewrite_fragment(&mut u, &["fbclid"], &[]);
        assert_eq!(u.fragment(), Some("fbclid=1"));
    }

    #[test]
    fn test_fragment_untouched_without_match() {
        let mut u = url("https://example.com/app#/route?x=1&flag");
        rewrite_fragment(&mut u, &["utm_*"], &["#?ref"]);
        assert_eq!(u.as_str(), "https://example.com/app#/route?x=1&flag");
    }

    #[test]
    fn test_fragment_all_params_removed() {
        let mut u = url("https://example.com/#utm_source=x");
        rewrite_fragment(&mut u, &[], &["#?utm_source"]);
        assert_eq!(u.as_str(), "https://example.com/");
    }

    #[test]
    fn test_apply_ending() {
        assert_eq!(apply_ending("$/ref=", false, "/dp/B000/ref=sr_1"), "/dp/B000");
        assert_eq!(apply_ending("$/ref=", true, "/gp/B000/ref=sr_1"), "/gp/B000/ref=sr_1");
        assert_eq!(apply_ending("$$/ref=", true, "/gp/B000/ref=sr_1"), "/gp/B000");
        assert_eq!(apply_ending("$/ref=", true, "/x/dp/B000/ref=sr_1"), "/x/dp/B000");
        // last occurrence wins
        assert_eq!(apply_ending("$/ref=", false, "/a/ref=1/b/ref=2"), "/a/ref=1/b");
        assert_eq!(apply_ending("$/nope", false, "/a/b"), "/a/b");
    }

    #[test]
    fn test_ending_marker_repeats() {
        let mut u = url("https://www.amazon.com/a/ref=1/b/ref=2");
        assert!(remove_endings(&mut u, &["$/ref="]));
        assert_eq!(u.path(), "/a/ref=1/b");
        // a second pass cuts at the next occurrence
        assert!(remove_endings(&mut u, &["$/ref="]));
        assert_eq!(u.path(), "/a");
    }

    #[test]
    fn test_remove_endings_clears_query() {
        let mut u = url("https://www.amazon.com/gp/product/B000/dp/B000/ref=abc123xyz?tag=x&psc=1");
        assert!(remove_endings(&mut u, &["$/ref="]));
        assert_eq!(u.as_str(), "https://www.amazon.com/gp/product/B000/dp/B000");
    }

    #[test]
    fn test_remove_endings_no_marker_in_path() {
        let mut u = url("https://www.amazon.com/gp/product/B000/dp/B000?ref=abc123xyz");
        assert!(!remove_endings(&mut u, &["$/ref="]));
        assert_eq!(u.as_str(), "https://www.amazon.com/gp/product/B000/dp/B000?ref=abc123xyz");
    }

    #[test]
    fn test_rewrite_combined() {
        let params = ClassifiedParams {
            blocked: vec!["utm_*"],
            hash: vec!["#?ref"],
            endings: vec![],
            excludes: vec![],
        };
        let u = url("https://example.com/?utm_source=a&id=1#ref=x&tab=2");
        assert_eq!(rewrite(&u, &params).as_str(), "https://example.com/?id=1#tab=2");
    }
}
