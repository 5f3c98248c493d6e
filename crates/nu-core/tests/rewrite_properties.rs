use std::sync::Arc;

use nu_core::domain::root_domain;
use nu_core::{
    clean_url, CleanOutcome, CleanRequest, RequestType, RetargetSlot, Rule, RuleSnapshot,
    SkipReason, SuffixTable,
};

const SUFFIXES: &str = "co.uk\ncom.au\nco.jp\n";

fn snapshot(rules: &[&str], blacklist: &[&str]) -> RuleSnapshot {
    RuleSnapshot::new(
        rules.iter().map(|r| Rule::parse(r)).collect(),
        blacklist.iter().map(|b| b.to_string()).collect(),
        Arc::new(SuffixTable::from_text(SUFFIXES)),
        RequestType::MAIN_FRAME,
    )
}

fn clean(snap: &RuleSnapshot, url: &str) -> CleanOutcome {
    clean_url(snap, &CleanRequest::main_frame(url), &RetargetSlot::new())
}

fn cleaned(snap: &RuleSnapshot, url: &str) -> String {
    match clean(snap, url) {
        CleanOutcome::Rewritten { url, .. } => url,
        CleanOutcome::Skipped(_) => url.to_string(),
    }
}

const DEFAULTS: &[&str] = &[
    "utm_*",
    "#?utm_*",
    "fbclid",
    "gclid@*.google.com",
    "$/ref=@*.amazon.*",
    "tag@amazon.*",
    "#?xtor",
];

#[test]
fn global_wildcard_rule() {
    let snap = snapshot(&["utm_*"], &[]);
    assert_eq!(
        cleaned(&snap, "https://example.com/?utm_source=a&id=1"),
        "https://example.com/?id=1"
    );
}

#[test]
fn wildcard_requires_full_prefix() {
    let snap = snapshot(&["utm_*"], &[]);
    assert_eq!(
        cleaned(&snap, "https://example.com/?utm_campaign=x&utma=1&utm_medium=y"),
        "https://example.com/?utma=1"
    );
}

#[test]
fn rewriting_is_idempotent() {
    let snap = snapshot(DEFAULTS, &[]);
    let inputs = [
        "https://example.com/?utm_source=a&id=1#utm_medium=b&x=1",
        "https://www.amazon.co.uk/Thing/dp/B000/ref=sr_1_1?tag=abc&qid=1",
        "https://mail.google.com/?gclid=1&fbclid=2&q=x",
        "https://news.example.org/story#xtor=RSS-8",
    ];
    for input in inputs {
        let once = cleaned(&snap, input);
        assert_eq!(
            clean(&snap, &once),
            CleanOutcome::Skipped(SkipReason::Unchanged),
            "{input} -> {once}"
        );
    }
}

#[test]
fn root_domain_label_count() {
    let table = SuffixTable::from_text(SUFFIXES);
    for host in ["a.b.c.example.com", "example.com", "x.y.example.co.uk", "localhost", "item.jd.com"] {
        let root = root_domain(host, &table);
        let labels = root.split('.').count();
        let last_two: Vec<&str> = root.rsplitn(3, '.').take(2).collect();
        let suffix = format!("{}.{}", last_two.get(1).unwrap_or(&""), last_two[0]);
        if table.contains(&suffix) {
            assert_eq!(labels, 3, "{host}");
        } else {
            assert!(labels <= 2, "{host}");
        }
    }
}

#[test]
fn blacklist_wins_over_any_rule() {
    let snap = snapshot(&["utm_*", "#*", "$$/"], &["example.com"]);
    for url in [
        "https://example.com/a/b?utm_source=1#x",
        "https://deep.sub.example.com/?utm_source=1",
    ] {
        assert_eq!(clean(&snap, url), CleanOutcome::Skipped(SkipReason::Blacklisted));
    }
}

#[test]
fn exclude_override_is_scoped() {
    let snap = snapshot(&["q", "!q@example.com"], &[]);
    assert_eq!(
        clean(&snap, "https://example.com/search?q=rust"),
        CleanOutcome::Skipped(SkipReason::Unchanged)
    );
    assert_eq!(cleaned(&snap, "https://other.com/search?q=rust"), "https://other.com/search");
}

#[test]
fn root_wildcard_scope() {
    let snap = snapshot(&["gclid@*.google.com"], &[]);
    for host in ["www.google.com", "mail.google.com", "google.com"] {
        assert_eq!(
            cleaned(&snap, &format!("https://{host}/?gclid=1&q=a")),
            format!("https://{host}/?q=a")
        );
    }
    assert_eq!(
        clean(&snap, "https://notgoogle.com/?gclid=1&q=a"),
        CleanOutcome::Skipped(SkipReason::Unchanged)
    );
}

#[test]
fn amazon_ending_marker() {
    let snap = snapshot(&["$/ref=@*.amazon.*"], &[]);

    // marker is not in the path: nothing to cut
    assert_eq!(
        clean(&snap, "https://www.amazon.com/gp/product/B000/dp/B000?ref=abc123xyz"),
        CleanOutcome::Skipped(SkipReason::Unchanged)
    );

    // product page: cut despite the query string, and drop the query
    assert_eq!(
        cleaned(&snap, "https://www.amazon.com/gp/product/B000/dp/B000/ref=abc123xyz?pf_rd_p=1"),
        "https://www.amazon.com/gp/product/B000/dp/B000"
    );

    // not a product page and a query string: left alone
    assert_eq!(
        clean(&snap, "https://www.amazon.com/gp/help/ref=abc?x=1"),
        CleanOutcome::Skipped(SkipReason::Unchanged)
    );
}

#[test]
fn forced_ending_marker() {
    let snap = snapshot(&["$$/ref=@*.amazon.*"], &[]);
    assert_eq!(
        cleaned(&snap, "https://www.amazon.de/gp/help/ref=abc?x=1"),
        "https://www.amazon.de/gp/help"
    );
}

#[test]
fn hash_wildcard_clears_fragment() {
    let snap = snapshot(&["#*@example.com"], &[]);
    assert_eq!(
        cleaned(&snap, "https://example.com/page#utm_source=x&utm_medium=y"),
        "https://example.com/page"
    );
}

#[test]
fn fragment_params_with_query_wildcards() {
    let snap = snapshot(&["utm_*"], &[]);
    assert_eq!(
        cleaned(&snap, "https://example.com/p?id=1#utm_source=fb&section=2"),
        "https://example.com/p?id=1#section=2"
    );
}

#[test]
fn user_rules_follow_defaults() {
    // the exclude comes after the block rule and still wins
    let snap = snapshot(&["fbclid", "!fbclid"], &[]);
    assert_eq!(
        clean(&snap, "https://example.com/?fbclid=1"),
        CleanOutcome::Skipped(SkipReason::Unchanged)
    );
}

#[test]
fn malformed_rules_are_inert() {
    let snap = snapshot(&["", "@", "!", "#", "$", "@@@", "utm_*"], &[]);
    assert_eq!(
        cleaned(&snap, "https://example.com/a?utm_source=1&b=2#frag"),
        "https://example.com/a?b=2#frag"
    );
}

#[test]
fn unparsable_urls_pass_through() {
    let snap = snapshot(DEFAULTS, &[]);
    for url in ["", "://nope", "http://", "about:blank", "file:///tmp/a?utm_source=1"] {
        assert!(!clean(&snap, url).is_rewritten(), "{url}");
    }
}

#[test]
fn concurrent_requests_are_independent() {
    let snap = Arc::new(snapshot(DEFAULTS, &[]));
    let slot = Arc::new(RetargetSlot::new());

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let snap = Arc::clone(&snap);
            let slot = Arc::clone(&slot);
            std::thread::spawn(move || {
                let url = format!("https://site{i}.example/?utm_source={i}&id={i}");
                let outcome = clean_url(&snap, &CleanRequest::main_frame(&url), &slot);
                assert_eq!(
                    outcome.redirect_url(),
                    Some(format!("https://site{i}.example/?id={i}").as_str())
                );
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }
}
