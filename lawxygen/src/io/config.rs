//! Site configuration stored in `site.toml`.

use std::fs;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::controller::ConsultationTimings;

/// Default config file name, relative to the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "site.toml";

/// Site configuration (TOML).
///
/// Intended to be edited by humans. Missing fields and sections fall back to
/// the values the page was designed around.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct SiteConfig {
    pub page: PageConfig,
    pub carousel: CarouselConfig,
    pub consultation: ConsultationConfig,
    pub server: ServerConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct PageConfig {
    /// Document title.
    pub title: String,

    /// Pixels left above a section when following an in-page anchor, so the
    /// fixed navigation bar does not cover the heading.
    pub scroll_offset_px: u32,
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            title: "LawXygen - Legal, Tax and Compliance Services".to_string(),
            scroll_offset_px: 100,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct CarouselConfig {
    /// Slide transition length; navigation is locked for the same window.
    pub transition_ms: u64,
}

impl Default for CarouselConfig {
    fn default() -> Self {
        Self { transition_ms: 500 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ConsultationConfig {
    /// Latency of the simulated submission.
    pub submit_latency_ms: u64,

    /// How long the acknowledgement stays up before the form resets.
    pub reset_after_ms: u64,

    /// Display window of toast notifications.
    pub notification_ms: u64,
}

impl Default for ConsultationConfig {
    fn default() -> Self {
        Self {
            submit_latency_ms: 1_500,
            reset_after_ms: 3_000,
            notification_ms: 5_000,
        }
    }
}

impl ConsultationConfig {
    pub fn timings(&self) -> ConsultationTimings {
        ConsultationTimings {
            reset_after: Duration::from_millis(self.reset_after_ms),
            notification: Duration::from_millis(self.notification_ms),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ServerConfig {
    /// Tear down page sessions idle for longer than this.
    pub session_idle_secs: u64,

    /// Refuse new page sessions beyond this many live ones.
    pub max_sessions: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            session_idle_secs: 30 * 60,
            max_sessions: 1_024,
        }
    }
}

impl SiteConfig {
    pub fn validate(&self) -> Result<()> {
        if self.page.title.trim().is_empty() {
            return Err(anyhow!("page.title must not be empty"));
        }
        if self.carousel.transition_ms == 0 {
            return Err(anyhow!("carousel.transition_ms must be > 0"));
        }
        if self.consultation.reset_after_ms == 0 {
            return Err(anyhow!("consultation.reset_after_ms must be > 0"));
        }
        if self.consultation.notification_ms == 0 {
            return Err(anyhow!("consultation.notification_ms must be > 0"));
        }
        if self.server.session_idle_secs == 0 {
            return Err(anyhow!("server.session_idle_secs must be > 0"));
        }
        if self.server.max_sessions == 0 {
            return Err(anyhow!("server.max_sessions must be > 0"));
        }
        Ok(())
    }
}

/// Load config from a TOML file.
///
/// If the file is missing, returns `SiteConfig::default()`.
pub fn load_config(path: &Path) -> Result<SiteConfig> {
    if !path.exists() {
        debug!(path = %path.display(), "config missing, using defaults");
        let cfg = SiteConfig::default();
        cfg.validate()?;
        return Ok(cfg);
    }
    let contents = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let cfg: SiteConfig =
        toml::from_str(&contents).with_context(|| format!("parse {}", path.display()))?;
    cfg.validate()
        .with_context(|| format!("validate {}", path.display()))?;
    debug!(path = %path.display(), "config loaded");
    Ok(cfg)
}

/// Atomically write config to disk (temp file + rename).
pub fn write_config(path: &Path, cfg: &SiteConfig) -> Result<()> {
    cfg.validate()?;
    let mut buf = toml::to_string_pretty(cfg).context("serialize config toml")?;
    buf.push('\n');
    write_atomic(path, &buf)
}

fn write_atomic(path: &Path, contents: &str) -> Result<()> {
    let parent = path
        .parent()
        .with_context(|| format!("config path missing parent {}", path.display()))?;
    if !parent.as_os_str().is_empty() {
        fs::create_dir_all(parent)
            .with_context(|| format!("create directory {}", parent.display()))?;
    }
    let tmp_path = path.with_extension("toml.tmp");
    fs::write(&tmp_path, contents)
        .with_context(|| format!("write temp config {}", tmp_path.display()))?;
    fs::rename(&tmp_path, path).with_context(|| format!("replace config {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_missing_returns_default() {
        let temp = tempfile::tempdir().expect("tempdir");
        let cfg = load_config(&temp.path().join("missing.toml")).expect("load");
        assert_eq!(cfg, SiteConfig::default());
    }

    #[test]
    fn write_then_load_round_trips() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("site.toml");
        let mut cfg = SiteConfig::default();
        cfg.carousel.transition_ms = 750;
        write_config(&path, &cfg).expect("write");
        let loaded = load_config(&path).expect("load");
        assert_eq!(loaded, cfg);
    }

    #[test]
    fn partial_file_fills_missing_sections() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("site.toml");
        fs::write(&path, "[consultation]\nsubmit_latency_ms = 10\n").expect("write");

        let cfg = load_config(&path).expect("load");
        assert_eq!(cfg.consultation.submit_latency_ms, 10);
        assert_eq!(cfg.consultation.reset_after_ms, 3_000);
        assert_eq!(cfg.carousel.transition_ms, 500);
        assert_eq!(cfg.page.scroll_offset_px, 100);
    }

    #[test]
    fn zero_transition_is_rejected() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("site.toml");
        fs::write(&path, "[carousel]\ntransition_ms = 0\n").expect("write");

        let err = load_config(&path).expect_err("invalid");
        assert!(format!("{:#}", err).contains("carousel.transition_ms"));
    }
}
