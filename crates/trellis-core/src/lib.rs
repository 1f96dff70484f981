pub mod assign;
pub mod cli;
pub mod clip;
pub mod commands;
pub mod config;
pub mod datetime;
pub mod error;
pub mod grid;
pub mod interval;
pub mod layout;
pub mod memo;
pub mod month;
pub mod pack;
pub mod render;
pub mod source;

use std::ffi::OsString;

use clap::Parser;
use tracing::{
  debug,
  info
};

pub use crate::error::LayoutError;
pub use crate::interval::Interval;
pub use crate::layout::{
  LayoutOptions,
  MonthLayout,
  PlacedSegment,
  compute_layout,
  compute_month_layout
};
pub use crate::month::MonthWindow;

#[tracing::instrument(skip_all)]
pub fn run(
  raw_args: Vec<OsString>
) -> anyhow::Result<()> {
  let pre =
    cli::preprocess_args(&raw_args);
  let cli = cli::GlobalCli::parse_from(
    pre.cleaned_args
  );

  cli::init_tracing(
    cli.verbose,
    cli.quiet
  )?;

  info!(
    verbose = cli.verbose,
    quiet = cli.quiet,
    "starting trellis"
  );
  debug!(?pre.rc_overrides, "preprocessed rc overrides");

  let mut cfg = config::Config::load(
    cli.config.as_deref()
  )?;
  cfg.apply_overrides(
    pre.rc_overrides.into_iter().chain(
      cli
        .rc_overrides
        .into_iter()
        .map(|kv| (kv.key, kv.value))
    )
  )?;

  let options = cfg.layout_options()?;
  let session = commands::Session {
    renderer: render::Renderer::new(
      &cfg
    ),
    today: datetime::today_in_timezone(
      options.zone
    ),
    options,
    input: cli.input,
    output: cli.output
  };

  let inv =
    cli::Invocation::parse(cli.rest)?;
  commands::dispatch(&session, inv)?;

  info!("done");
  Ok(())
}
