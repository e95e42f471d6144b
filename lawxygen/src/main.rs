//! `lawxygen` command line: manage `site.toml` and render the static page.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use tracing::info;

use lawxygen::content::SiteContent;
use lawxygen::controller::ConsultationSnapshot;
use lawxygen::core::carousel::CarouselState;
use lawxygen::core::invariants::validate_content;
use lawxygen::exit_codes;
use lawxygen::io::config::{DEFAULT_CONFIG_FILE, SiteConfig, load_config, write_config};
use lawxygen::logging;
use lawxygen::render::{PageRenderer, PageView, current_year};

#[derive(Parser)]
#[command(
    name = "lawxygen",
    version,
    about = "LawXygen landing page tooling"
)]
struct Cli {
    /// Path to the site config file.
    #[arg(long, global = true, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Write a default `site.toml`.
    Init {
        /// Overwrite an existing file.
        #[arg(short, long)]
        force: bool,
    },
    /// Check config and content invariants (unique testimonial ids, ratings, anchors).
    Validate,
    /// Render the initial page (first testimonial, empty form).
    Render {
        /// Write HTML here instead of stdout.
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
}

fn main() {
    logging::init(logging::CLI_DEFAULT_FILTER);
    if let Err(err) = run() {
        eprintln!("{:#}", err);
        std::process::exit(exit_codes::INVALID);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Command::Init { force } => cmd_init(&cli.config, force),
        Command::Validate => cmd_validate(&cli.config),
        Command::Render { out } => cmd_render(&cli.config, out.as_deref()),
    }
}

fn cmd_init(path: &Path, force: bool) -> Result<()> {
    if !force && path.exists() {
        info!(path = %path.display(), "config exists, leaving it untouched");
        return Ok(());
    }
    write_config(path, &SiteConfig::default())
        .with_context(|| format!("write {}", path.display()))?;
    info!(path = %path.display(), "config written");
    Ok(())
}

fn cmd_validate(path: &Path) -> Result<()> {
    load_config(path)?;
    let errors = validate_content(&SiteContent::lawxygen());
    if !errors.is_empty() {
        bail!("content violations:\n- {}", errors.join("\n- "));
    }
    println!("ok");
    Ok(())
}

fn cmd_render(path: &Path, out: Option<&Path>) -> Result<()> {
    let config = load_config(path)?;
    let html = render_initial(&config, &SiteContent::lawxygen())?;
    match out {
        Some(out) => {
            fs::write(out, html).with_context(|| format!("write {}", out.display()))?;
            info!(path = %out.display(), "page written");
        }
        None => print!("{}", html),
    }
    Ok(())
}

/// Page as a fresh visitor sees it, without a live session.
fn render_initial(config: &SiteConfig, content: &SiteContent) -> Result<String> {
    let carousel = CarouselState::new(content.testimonials.len())?;
    PageRenderer::new().render_page(&PageView {
        config,
        content,
        carousel,
        consultation: &ConsultationSnapshot::default(),
        session_id: None,
        year: current_year(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_init() {
        let cli = Cli::parse_from(["lawxygen", "init"]);
        assert!(matches!(cli.command, Command::Init { force: false }));
        assert_eq!(cli.config, PathBuf::from(DEFAULT_CONFIG_FILE));
    }

    #[test]
    fn parse_init_force() {
        let cli = Cli::parse_from(["lawxygen", "init", "--force"]);
        assert!(matches!(cli.command, Command::Init { force: true }));
    }

    #[test]
    fn parse_render_with_global_config() {
        let cli = Cli::parse_from(["lawxygen", "render", "--out", "page.html", "--config", "x.toml"]);
        assert_eq!(cli.config, PathBuf::from("x.toml"));
        match cli.command {
            Command::Render { out } => assert_eq!(out, Some(PathBuf::from("page.html"))),
            _ => panic!("expected render"),
        }
    }

    #[test]
    fn initial_render_has_no_session() {
        let html = render_initial(&SiteConfig::default(), &SiteContent::lawxygen()).expect("render");
        assert!(!html.contains("data-session"));
        assert!(html.contains(r#"data-phase="idle""#));
    }

    #[test]
    fn initial_render_rejects_empty_carousel() {
        let mut content = SiteContent::lawxygen();
        content.testimonials.clear();
        let err = render_initial(&SiteConfig::default(), &content).expect_err("empty");
        assert!(err.to_string().contains("testimonial"));
    }
}
