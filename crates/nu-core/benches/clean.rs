use std::hint::black_box;
use std::sync::Arc;

use criterion::{criterion_group, criterion_main, Criterion};

use nu_core::{clean_url, CleanRequest, RequestType, RetargetSlot, Rule, RuleSnapshot, SuffixTable};

const RULES: &[&str] = &[
    "utm_*",
    "#?utm_*",
    "fbclid",
    "gclid",
    "mc_cid",
    "mc_eid",
    "ved@google.*",
    "ei@google.*",
    "gws_rd@google.*",
    "tag@amazon.*",
    "pf_rd_*@amazon.*",
    "$/ref=@*.amazon.*",
    "spm@*.aliexpress.com",
    "!q@example.com",
];

const URLS: &[&str] = &[
    "https://example.com/?utm_source=a&utm_medium=b&id=1",
    "https://www.google.co.uk/search?q=rust&ved=abc&ei=def",
    "https://www.amazon.com/Thing/dp/B000/ref=sr_1_1?tag=x&qid=1",
    "https://news.example.org/story#utm_source=x&section=2",
    "https://docs.rs/url/latest/url/",
];

fn bench_clean(c: &mut Criterion) {
    let snapshot = RuleSnapshot::new(
        RULES.iter().map(|r| Rule::parse(r)).collect(),
        Vec::new(),
        Arc::new(SuffixTable::from_text("co.uk\ncom.au\n")),
        RequestType::MAIN_FRAME,
    );
    let slot = RetargetSlot::new();

    c.bench_function("clean_url_mixed", |b| {
        b.iter(|| {
            for url in URLS {
                black_box(clean_url(&snapshot, &CleanRequest::main_frame(url), &slot));
            }
        })
    });
}

criterion_group!(benches, bench_clean);
criterion_main!(benches);
