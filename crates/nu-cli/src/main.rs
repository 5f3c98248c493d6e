//! Neat URL CLI
//!
//! CLI tool for cleaning URLs and inspecting rule sets.

mod config;
mod report;

use std::io::BufRead;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use env_logger::{Builder, Env};
use serde::Serialize;
use url::Url;

use nu_core::types::should_intercept;
use nu_core::{
    clean_url, ChangeKind, CleanOutcome, CleanRequest, Cleaner, RequestType, RetargetSlot,
    RetargetToken, RETARGET_DELAY,
};
use nu_rules::{build_snapshot, format_rule_list, prune_user_rules};

use config::{load_sources, RuleSources};
use report::{CleanReport, ExplainReport, PruneReport, RetargetReport, RulesReport};

#[derive(Parser)]
#[command(name = "nu-cli")]
#[command(about = "Neat URL tracking parameter remover and tools")]
struct Cli {
    /// Settings JSON (storage keys)
    #[arg(short, long, global = true)]
    settings: Option<PathBuf>,

    /// Default rules JSON, grouped by category
    #[arg(long, global = true)]
    defaults: Option<PathBuf>,

    /// Suffix list, one entry per line
    #[arg(long, global = true)]
    suffixes: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Clean URLs given as arguments, or one per line on stdin
    Clean {
        urls: Vec<String>,

        /// Request type the URLs are handled as
        #[arg(short = 't', long = "type", default_value = "main_frame")]
        request_type: String,

        /// Tab the requests belong to
        #[arg(long, default_value_t = -1, allow_hyphen_values = true)]
        tab: i32,

        /// Print JSON
        #[arg(long)]
        json: bool,
    },

    /// Show host decomposition and matching rules for a URL
    Explain {
        url: String,

        /// Print JSON
        #[arg(long)]
        json: bool,
    },

    /// Dump the effective rule set
    Rules {
        /// Print JSON
        #[arg(long)]
        json: bool,
    },

    /// Drop user rules already covered by the defaults
    Prune {
        /// Print JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() {
    let cli = Cli::parse();

    Builder::from_env(Env::default().default_filter_or(if cli.verbose { "debug" } else { "warn" }))
        .init();

    let result = load_sources(
        cli.settings.as_deref(),
        cli.defaults.as_deref(),
        cli.suffixes.as_deref(),
    )
    .and_then(|sources| match cli.command {
        Commands::Clean {
            urls,
            request_type,
            tab,
            json,
        } => cmd_clean(&sources, urls, &request_type, tab, json),
        Commands::Explain { url, json } => cmd_explain(&sources, &url, json),
        Commands::Rules { json } => cmd_rules(&sources, json),
        Commands::Prune { json } => cmd_prune(&sources, json),
    });

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn cmd_clean(
    sources: &RuleSources,
    urls: Vec<String>,
    request_type: &str,
    tab_id: i32,
    json: bool,
) -> Result<(), String> {
    let urls = if urls.is_empty() { read_stdin_lines()? } else { urls };

    let (snapshot, _) = build_snapshot(&sources.defaults, &sources.settings, sources.suffixes.clone());
    let cleaner = Cleaner::new(snapshot);

    let runtime = tokio::runtime::Runtime::new()
        .map_err(|e| format!("Failed to start tokio runtime: {}", e))?;
    let reports = runtime.block_on(clean_all(&cleaner, &urls, request_type, tab_id));

    if json {
        return print_json(&reports);
    }

    for report in &reports {
        match (&report.output, &report.reason) {
            (Some(output), _) => println!("{}\n  -> {}", report.input, output),
            (None, Some(reason)) => println!("{}\n  (unchanged: {})", report.input, reason),
            (None, None) => println!("{}", report.input),
        }
        if let Some(retarget) = &report.retarget {
            println!("  retargeted tab {} to {}", retarget.tab_id, retarget.target);
        }
    }

    Ok(())
}

async fn clean_all(
    cleaner: &Cleaner,
    urls: &[String],
    request_type: &str,
    tab_id: i32,
) -> Vec<CleanReport> {
    let types = cleaner.snapshot().request_types();
    let mut reports = Vec::with_capacity(urls.len());

    for url in urls {
        if !should_intercept(types, request_type) {
            reports.push(CleanReport::skipped(url, "not_intercepted"));
            continue;
        }

        let request = CleanRequest {
            url,
            request_type: RequestType::from_type_name(request_type),
            tab_id,
        };
        let outcome = cleaner.clean(&request);
        let mut report = CleanReport::from_outcome(url, &outcome);

        if let CleanOutcome::Rewritten {
            change: ChangeKind::Deferred(token),
            ..
        } = outcome
        {
            report.retarget = drive_retarget(cleaner.retarget(), token).await;
        }

        reports.push(report);
    }

    reports
}

/// Wait, fire, wait, expire: what the browser host does with a deferred token.
async fn drive_retarget(slot: &RetargetSlot, token: RetargetToken) -> Option<RetargetReport> {
    tokio::time::sleep(RETARGET_DELAY).await;
    let fired = slot.fire(token);
    tokio::time::sleep(RETARGET_DELAY).await;
    slot.expire(token);

    fired.map(RetargetReport::from)
}

fn cmd_explain(sources: &RuleSources, input: &str, json: bool) -> Result<(), String> {
    let url = Url::parse(input).map_err(|e| format!("Invalid URL '{}': {}", input, e))?;

    let (snapshot, _) = build_snapshot(&sources.defaults, &sources.settings, sources.suffixes.clone());
    let (parts, params) = snapshot
        .explain(&url)
        .ok_or_else(|| format!("URL '{}' has no host", input))?;
    let report = ExplainReport::new(input, &parts, &params);

    if json {
        return print_json(&report);
    }

    let outcome = clean_url(&snapshot, &CleanRequest::main_frame(input), &RetargetSlot::new());

    println!("URL: {}", report.url);
    println!("  Domain:        {}", report.domain);
    println!("  Root domain:   {}", report.root_domain);
    println!("  Minus suffix:  {}", report.domain_minus_suffix);
    println!();
    println!("Matched rules:");
    println!("  Blocked:       {}", format_rule_list(&report.blocked));
    println!("  Hash:          {}", format_rule_list(&report.hash));
    println!("  Endings:       {}", format_rule_list(&report.endings));
    println!("  Excludes:      {}", format_rule_list(&report.excludes));
    println!();
    match outcome {
        CleanOutcome::Rewritten { url, .. } => println!("Result: {}", url),
        CleanOutcome::Skipped(reason) => println!("Result: unchanged ({})", reason.as_str()),
    }

    Ok(())
}

fn cmd_rules(sources: &RuleSources, json: bool) -> Result<(), String> {
    let (snapshot, stats) = build_snapshot(&sources.defaults, &sources.settings, sources.suffixes.clone());
    let report = RulesReport::new(
        stats,
        snapshot.rules().iter().map(|rule| rule.raw.clone()).collect(),
        snapshot.blacklist().to_vec(),
        sources.settings.request_type_names(),
    );

    if json {
        return print_json(&report);
    }

    println!("Rules:");
    println!("  Defaults:    {} ({} overridden)", report.defaults, report.overridden);
    println!("  User:        {}", report.user);
    println!("  Total:       {}", report.total);
    println!("  Blacklist:   {}", format_rule_list(&report.blacklist));
    println!("  Types:       {}", format_rule_list(&report.types));
    println!();
    for rule in &report.rules {
        println!("  {}", rule);
    }

    Ok(())
}

fn cmd_prune(sources: &RuleSources, json: bool) -> Result<(), String> {
    let mut user = sources.settings.user_rules();
    let stats = prune_user_rules(&sources.defaults, &mut user);

    let report = PruneReport {
        before: stats.before as u32,
        after: stats.after as u32,
        changed: stats.changed(),
        blocked_params: format_rule_list(&user),
    };

    if json {
        return print_json(&report);
    }

    println!("User rules: {} -> {}", report.before, report.after);
    if report.changed {
        println!("  neat_url_blocked_params: {}", report.blocked_params);
    } else {
        println!("  nothing to prune");
    }

    Ok(())
}

fn read_stdin_lines() -> Result<Vec<String>, String> {
    let mut urls = Vec::new();
    for line in std::io::stdin().lock().lines() {
        let line = line.map_err(|e| format!("Failed to read stdin: {}", e))?;
        let line = line.trim();
        if !line.is_empty() {
            urls.push(line.to_string());
        }
    }
    Ok(urls)
}

fn print_json<T: Serialize>(value: &T) -> Result<(), String> {
    let text = serde_json::to_string_pretty(value)
        .map_err(|e| format!("Failed to serialize output: {}", e))?;
    println!("{}", text);
    Ok(())
}
