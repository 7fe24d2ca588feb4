#![forbid(unsafe_code)]

//! `arbor tree`: bootstrap, expand a path, print one viewport of rows.

use std::io::Write;

use arbor_core::{ChildrenState, RowWindow, TreeConfig, TreeEngine, VisibleRow, WindowConfig};
use clap::Args;
use serde::Serialize;

use crate::driver::{Driver, open_source};
use crate::error::Result;

#[derive(Debug, Clone, Args)]
pub struct TreeArgs {
    /// Use the generated offline hierarchy instead of the HTTP endpoints.
    #[arg(long)]
    pub mock: bool,

    /// Expand this node; repeat to open a path. Applied in order.
    #[arg(long = "expand", value_name = "ID")]
    pub expand: Vec<String>,

    /// Scroll offset into the flattened list, in pixels.
    #[arg(long, default_value_t = 0)]
    pub offset: u64,

    /// Viewport height in pixels.
    #[arg(long, default_value_t = 400)]
    pub height: u32,

    /// Emit a JSON report instead of indented text.
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Serialize)]
struct TreeReport<'a> {
    total_rows: usize,
    total_height_px: u64,
    visible: [usize; 2],
    render: [usize; 2],
    rows: Vec<RowReport<'a>>,
}

#[derive(Debug, Serialize)]
struct RowReport<'a> {
    index: usize,
    id: &'a str,
    label: &'a str,
    depth: usize,
    expanded: bool,
    loading: bool,
    children: ChildrenState,
}

pub fn run_tree(args: TreeArgs) -> Result<()> {
    let config = TreeConfig::from_env();
    let source = open_source(args.mock, &config)?;
    let mut driver = Driver::new(&config, source);

    driver.bootstrap()?;
    for id in &args.expand {
        driver.expand(id)?;
    }

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    write_tree(&mut out, driver.engine(), &args)
}

/// Render the window selected by `args` from `engine`'s rows.
pub fn write_tree(out: &mut impl Write, engine: &TreeEngine, args: &TreeArgs) -> Result<()> {
    let rows = engine.visible_rows();
    let window = RowWindow::compute(rows.len(), args.offset, args.height, WindowConfig::default());

    if args.json {
        let report = TreeReport {
            total_rows: rows.len(),
            total_height_px: window.total_height_px,
            visible: [window.visible.start, window.visible.end],
            render: [window.render.start, window.render.end],
            rows: window
                .render
                .clone()
                .map(|index| row_report(engine, index, &rows[index]))
                .collect(),
        };
        serde_json::to_writer_pretty(&mut *out, &report)?;
        writeln!(out)?;
        return Ok(());
    }

    for index in window.render.clone() {
        let row = &rows[index];
        writeln!(
            out,
            "{index:>6}  {}{} {} ({})",
            "  ".repeat(row.depth),
            marker(engine, row),
            row.node.display_label(),
            row.id(),
        )?;
    }
    writeln!(
        out,
        "rows {}..{} of {} (viewport {}..{})",
        window.render.start,
        window.render.end,
        rows.len(),
        window.visible.start,
        window.visible.end,
    )?;
    Ok(())
}

fn row_report<'a>(engine: &TreeEngine, index: usize, row: &'a VisibleRow) -> RowReport<'a> {
    RowReport {
        index,
        id: row.id(),
        label: row.node.display_label(),
        depth: row.depth,
        expanded: engine.is_expanded(row.id()),
        loading: engine.is_loading(row.id()),
        children: row.node.children_state(),
    }
}

fn marker(engine: &TreeEngine, row: &VisibleRow) -> char {
    let node = &row.node;
    if engine.is_loading(row.id()) {
        '…'
    } else if node.has_children() && engine.is_expanded(row.id()) {
        '▾'
    } else if node.has_children() || node.needs_children() {
        '▸'
    } else {
        '·'
    }
}
