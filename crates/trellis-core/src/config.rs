use std::fs;
use std::path::{
  Path,
  PathBuf
};

use anyhow::{
  Context,
  anyhow
};
use chrono::Weekday;
use chrono_tz::Tz;
use serde::{
  Deserialize,
  Serialize
};
use tracing::{
  debug,
  info,
  warn
};

use crate::datetime::{
  parse_timezone,
  parse_weekday_name
};
use crate::layout::LayoutOptions;

const CONFIG_FILE: &str = "trellis.toml";
const CONFIG_ENV_VAR: &str =
  "TRELLIS_CONFIG";

fn default_week_start() -> String {
  "sunday".to_string()
}

fn default_timezone() -> String {
  "UTC".to_string()
}

fn default_label_field() -> String {
  "name".to_string()
}

fn default_max_rows() -> usize {
  4
}

#[derive(
  Debug,
  Clone,
  PartialEq,
  Eq,
  Serialize,
  Deserialize,
)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
  pub week_start:  String,
  pub timezone:    String,
  pub display:     DisplayConfig,
  #[serde(skip)]
  pub loaded_file: Option<PathBuf>
}

#[derive(
  Debug,
  Clone,
  PartialEq,
  Eq,
  Serialize,
  Deserialize,
)]
#[serde(default, deny_unknown_fields)]
pub struct DisplayConfig {
  /// Payload field shown as the bar
  /// label.
  pub label_field: String,
  /// Rows drawn per week before the
  /// rest collapse into `+N more`.
  pub max_rows:    usize,
  pub color:       bool
}

impl Default for Config {
  fn default() -> Self {
    Self {
      week_start:  default_week_start(),
      timezone:    default_timezone(),
      display:     DisplayConfig::default(),
      loaded_file: None
    }
  }
}

impl Default for DisplayConfig {
  fn default() -> Self {
    Self {
      label_field: default_label_field(),
      max_rows:    default_max_rows(),
      color:       true
    }
  }
}

impl Config {
  #[tracing::instrument(skip(
    override_path
  ))]
  pub fn load(
    override_path: Option<&Path>
  ) -> anyhow::Result<Self> {
    let Some(path) =
      resolve_config_path(override_path)
    else {
      debug!(
        "no config file found; using \
         defaults"
      );
      return Ok(Self::default());
    };

    info!(config = %path.display(), "loading config");
    let text = fs::read_to_string(&path)
      .with_context(|| {
        format!(
          "failed to read {}",
          path.display()
        )
      })?;
    let mut cfg = Self::from_toml_str(
      &text,
      &path.display().to_string()
    )?;
    cfg.loaded_file = Some(path);
    Ok(cfg)
  }

  pub fn from_toml_str(
    text: &str,
    origin: &str
  ) -> anyhow::Result<Self> {
    let mut cfg =
      toml::from_str::<Config>(text)
        .with_context(|| {
          format!(
            "failed parsing config \
             {origin}"
          )
        })?;
    cfg.sanitize();
    Ok(cfg)
  }

  /// Applies `key=value` overrides,
  /// with or without an `rc.` prefix.
  #[tracing::instrument(skip(
    self, overrides
  ))]
  pub fn apply_overrides<I>(
    &mut self,
    overrides: I
  ) -> anyhow::Result<()>
  where
    I: IntoIterator<
      Item = (String, String)
    >
  {
    for (k, v) in overrides {
      let key =
        k.strip_prefix("rc.").unwrap_or(&k);
      let value = v.trim();
      debug!(key = %key, value = %value, "applying override");

      match key {
        | "week_start" => {
          self.week_start =
            value.to_string();
        }
        | "timezone" => {
          self.timezone =
            value.to_string();
        }
        | "display.label_field" => {
          self.display.label_field =
            value.to_string();
        }
        | "display.max_rows" => {
          self.display.max_rows = value
            .parse()
            .with_context(|| {
              format!(
                "display.max_rows \
                 must be a number, \
                 got {value}"
              )
            })?;
        }
        | "display.color" => {
          self.display.color =
            parse_bool(value);
        }
        | other => {
          return Err(anyhow!(
            "unknown config key: \
             {other}"
          ));
        }
      }
    }

    self.sanitize();
    Ok(())
  }

  pub fn week_start_day(
    &self
  ) -> anyhow::Result<Weekday> {
    parse_weekday_name(&self.week_start)
      .ok_or_else(|| {
        anyhow!(
          "invalid week_start: {}",
          self.week_start
        )
      })
  }

  pub fn zone(
    &self
  ) -> anyhow::Result<Tz> {
    parse_timezone(
      &self.timezone,
      "config.timezone"
    )
    .ok_or_else(|| {
      anyhow!(
        "invalid timezone: {}",
        self.timezone
      )
    })
  }

  pub fn layout_options(
    &self
  ) -> anyhow::Result<LayoutOptions> {
    Ok(LayoutOptions {
      week_start: self
        .week_start_day()?,
      zone:       self.zone()?
    })
  }

  fn sanitize(&mut self) {
    if self.week_start.trim().is_empty()
    {
      self.week_start =
        default_week_start();
    }
    if self.timezone.trim().is_empty() {
      self.timezone = default_timezone();
    }
    if self
      .display
      .label_field
      .trim()
      .is_empty()
    {
      self.display.label_field =
        default_label_field();
    }
    if self.display.max_rows == 0 {
      warn!(
        "display.max_rows of 0 would \
         hide every bar; using default"
      );
      self.display.max_rows =
        default_max_rows();
    }
  }
}

fn resolve_config_path(
  override_path: Option<&Path>
) -> Option<PathBuf> {
  if let Some(path) = override_path {
    return Some(path.to_path_buf());
  }

  if let Ok(raw) =
    std::env::var(CONFIG_ENV_VAR)
  {
    let trimmed = raw.trim();
    if trimmed == "/dev/null" {
      return None;
    }
    if !trimmed.is_empty() {
      return Some(PathBuf::from(
        trimmed
      ));
    }
  }

  let local = std::env::current_dir()
    .ok()
    .map(|dir| dir.join(CONFIG_FILE))
    .filter(|path| path.exists());
  if local.is_some() {
    return local;
  }

  dirs::config_dir()
    .map(|dir| {
      dir.join("trellis").join(CONFIG_FILE)
    })
    .filter(|path| path.exists())
}

fn parse_bool(s: &str) -> bool {
  matches!(
    s.trim()
      .to_ascii_lowercase()
      .as_str(),
    "1" | "y" | "yes" | "on" | "true"
  )
}
