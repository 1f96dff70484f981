use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{Context, anyhow};
use chrono::NaiveDate;
use tracing::{debug, info, instrument, warn};

use crate::cli::Invocation;
use crate::clip::clip_report;
use crate::datetime::parse_month_expr;
use crate::interval::Interval;
use crate::layout::{LayoutOptions, compute_layout};
use crate::month::MonthWindow;
use crate::render::Renderer;
use crate::source::{load_intervals, write_atomic};

pub fn known_command_names() -> Vec<&'static str> {
    vec!["grid", "layout", "show", "check", "help", "version"]
}

pub fn expand_command_abbrev<'a>(token: &str, known: &[&'a str]) -> Option<&'a str> {
    if let Some(exact) = known.iter().copied().find(|name| *name == token) {
        return Some(exact);
    }

    let mut matches = known.iter().copied().filter(|name| name.starts_with(token));
    let first = matches.next()?;
    if matches.next().is_some() { None } else { Some(first) }
}

/// Everything a command needs besides its own arguments.
#[derive(Debug)]
pub struct Session {
    pub options: LayoutOptions,
    pub renderer: Renderer,
    pub input: Option<PathBuf>,
    pub output: Option<PathBuf>,
    pub today: NaiveDate,
}

impl Session {
    fn window(&self, inv: &Invocation) -> anyhow::Result<MonthWindow> {
        let expr = inv.month_expr.as_deref().unwrap_or("this");
        parse_month_expr(expr, self.today).with_context(|| format!("invalid month argument {expr:?}"))
    }

    fn intervals(&self) -> anyhow::Result<Vec<Interval>> {
        match &self.input {
            Some(path) => load_intervals(path),
            None => {
                warn!("no --input given; laying out an empty month");
                Ok(Vec::new())
            }
        }
    }
}

#[instrument(skip(session, inv), fields(command = %inv.command))]
pub fn dispatch(session: &Session, inv: Invocation) -> anyhow::Result<()> {
    debug!(month = ?inv.month_expr, "dispatching command");

    match inv.command.as_str() {
        "grid" => cmd_grid(session, &inv),
        "layout" => cmd_layout(session, &inv),
        "show" => cmd_show(session, &inv),
        "check" => cmd_check(session, &inv),
        "help" => cmd_help(),
        "version" => {
            println!("{}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        other => Err(anyhow!("unknown command: {other}")),
    }
}

fn cmd_grid(session: &Session, inv: &Invocation) -> anyhow::Result<()> {
    let window = session.window(inv)?;
    let layout = compute_layout(&window, &[], &session.options);
    session.renderer.write_grid(io::stdout().lock(), &layout)
}

fn cmd_layout(session: &Session, inv: &Invocation) -> anyhow::Result<()> {
    let window = session.window(inv)?;
    let intervals = session.intervals()?;
    let layout = compute_layout(&window, &intervals, &session.options);
    let mut json = serde_json::to_string_pretty(&layout).context("failed to serialize layout")?;
    json.push('\n');

    match &session.output {
        Some(path) => {
            write_atomic(path, &json)?;
            info!(path = %path.display(), segments = layout.segments.len(), "wrote layout");
        }
        None => io::stdout().lock().write_all(json.as_bytes())?,
    }
    Ok(())
}

fn cmd_show(session: &Session, inv: &Invocation) -> anyhow::Result<()> {
    let window = session.window(inv)?;
    let intervals = session.intervals()?;
    let layout = compute_layout(&window, &intervals, &session.options);
    session
        .renderer
        .write_timeline(io::stdout().lock(), &layout, &intervals)
}

fn cmd_check(session: &Session, inv: &Invocation) -> anyhow::Result<()> {
    let window = session.window(inv)?;
    let intervals = session.intervals()?;
    let report = clip_report(&intervals, &window, &session.options.zone);

    let mut out = io::stdout().lock();
    writeln!(
        out,
        "{}: {} visible, {} skipped",
        window.label(),
        report.clipped.len(),
        report.skipped.len()
    )?;
    if !report.skipped.is_empty() {
        session.renderer.write_skipped(&mut out, &report.skipped)?;
    }
    Ok(())
}

fn cmd_help() -> anyhow::Result<()> {
    println!("trellis [options] <command> [month]");
    println!();
    println!("commands:");
    println!("  show     draw interval bars on the month grid (default)");
    println!("  grid     print the week rows of the month");
    println!("  layout   emit the placed segments as JSON");
    println!("  check    list intervals left out of the month and why");
    println!("  help     show this message");
    println!("  version  print the version");
    println!();
    println!("month: this, next, prev, +Nm, -Nm, YYYY-MM, YYYY/M, or a month name");
    Ok(())
}
