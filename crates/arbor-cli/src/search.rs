#![forbid(unsafe_code)]

//! `arbor search`: type terms into the debounced search and print what lands.
//!
//! Keystrokes are replayed on a virtual clock, `--interval-ms` apart, so a
//! run shows exactly which terms the debounce lets through.

use std::io::Write;

use arbor_core::{TreeConfig, TreeEngine};
use clap::Args;
use serde::Serialize;
use web_time::{Duration, Instant};

use crate::driver::{Driver, open_source};
use crate::error::{CliError, Result};

#[derive(Debug, Clone, Args)]
pub struct SearchArgs {
    /// Terms typed in order, e.g. `n no nod`.
    #[arg(required = true, value_name = "TERM")]
    pub terms: Vec<String>,

    /// Use the generated offline hierarchy instead of the HTTP endpoints.
    #[arg(long)]
    pub mock: bool,

    /// Virtual time between successive terms.
    #[arg(long = "interval-ms", default_value_t = 100)]
    pub interval_ms: u64,

    /// Emit a JSON report instead of text.
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Serialize)]
struct SearchReport<'a> {
    term: &'a str,
    requests: usize,
    results: Vec<ResultReport<'a>>,
}

#[derive(Debug, Serialize)]
struct ResultReport<'a> {
    id: &'a str,
    label: &'a str,
}

pub fn run_search(args: SearchArgs) -> Result<()> {
    let config = TreeConfig::from_env();
    let source = open_source(args.mock, &config)?;
    let mut driver = Driver::new(&config, source);

    type_terms(&mut driver, &args.terms, Duration::from_millis(args.interval_ms))?;
    if let Some(error) = driver.engine().search_error() {
        return Err(CliError::Tree(error.clone()));
    }

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    write_results(&mut out, driver.engine(), driver.issued(), args.json)
}

/// Replay `terms` and settle every request that was issued.
pub fn type_terms(driver: &mut Driver, terms: &[String], interval: Duration) -> Result<()> {
    let start = Instant::now();
    let mut now = start;
    for (i, term) in terms.iter().enumerate() {
        now = start + interval * i as u32;
        let effect = driver.engine_mut().poll(now);
        driver.submit(effect);
        driver.engine_mut().set_search_term(term, now);
    }
    while let Some(deadline) = driver.engine().next_deadline() {
        let effect = driver.engine_mut().poll(deadline.max(now));
        driver.submit(effect);
    }
    driver.settle()
}

pub fn write_results(
    out: &mut impl Write,
    engine: &TreeEngine,
    requests: usize,
    json: bool,
) -> Result<()> {
    let results = engine.search_results();
    if json {
        let report = SearchReport {
            term: engine.search_term().trim(),
            requests,
            results: results
                .iter()
                .map(|node| ResultReport {
                    id: node.id().as_str(),
                    label: node.display_label(),
                })
                .collect(),
        };
        serde_json::to_writer_pretty(&mut *out, &report)?;
        writeln!(out)?;
        return Ok(());
    }

    for node in results {
        writeln!(out, "{}\t{}", node.id(), node.display_label())?;
    }
    writeln!(
        out,
        "{} result(s) for {:?} after {requests} request(s)",
        results.len(),
        engine.search_term().trim(),
    )?;
    Ok(())
}
