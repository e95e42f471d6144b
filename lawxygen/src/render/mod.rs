//! Server-side rendering of the landing page.
//!
//! Templates are embedded at compile time and auto-escaped as HTML. The
//! renderer is a pure function of config, content, and the two controller
//! snapshots; the client script keeps the page in sync afterwards.

use anyhow::{Context, Result};
use chrono::Datelike;
use minijinja::{Environment, context};
use serde::Serialize;
use tracing::debug;

use crate::content::{MAX_RATING, SiteContent, Testimonial};
use crate::controller::ConsultationSnapshot;
use crate::core::carousel::CarouselState;
use crate::core::types::{FormFields, Notification, Phase};
use crate::io::config::SiteConfig;

const TEMPLATES: [(&str, &str); 7] = [
    ("page.html", include_str!("templates/page.html")),
    ("navbar.html", include_str!("templates/navbar.html")),
    ("hero.html", include_str!("templates/hero.html")),
    ("services.html", include_str!("templates/services.html")),
    ("testimonials.html", include_str!("templates/testimonials.html")),
    ("consultation.html", include_str!("templates/consultation.html")),
    ("footer.html", include_str!("templates/footer.html")),
];

/// Everything one render needs.
pub struct PageView<'a> {
    pub config: &'a SiteConfig,
    pub content: &'a SiteContent,
    pub carousel: CarouselState,
    pub consultation: &'a ConsultationSnapshot,
    /// Session the client script should address its intents to.
    pub session_id: Option<&'a str>,
    pub year: i32,
}

#[derive(Debug, Serialize)]
struct PageContext<'a> {
    title: &'a str,
    scroll_offset_px: u32,
    transition_ms: u64,
    session_id: Option<&'a str>,
    year: i32,
}

#[derive(Debug, Serialize)]
struct SlideContext<'a> {
    testimonial: &'a Testimonial,
    active: bool,
    stars: [bool; MAX_RATING as usize],
}

#[derive(Debug, Serialize)]
struct CarouselContext<'a> {
    active_index: usize,
    locked: bool,
    slides: Vec<SlideContext<'a>>,
}

impl<'a> CarouselContext<'a> {
    fn new(state: CarouselState, testimonials: &'a [Testimonial]) -> Self {
        let slides = testimonials
            .iter()
            .enumerate()
            .map(|(index, testimonial)| SlideContext {
                testimonial,
                active: index == state.active_index(),
                stars: testimonial.stars(),
            })
            .collect();
        Self {
            active_index: state.active_index(),
            locked: state.locked(),
            slides,
        }
    }
}

#[derive(Debug, Serialize)]
struct FormContext<'a> {
    fields: &'a FormFields,
    phase: &'static str,
    reason: Option<&'a str>,
    submitting: bool,
    submitted: bool,
    editable: bool,
    services: Vec<String>,
    notifications: &'a [Notification],
}

impl<'a> FormContext<'a> {
    fn new(snapshot: &'a ConsultationSnapshot, content: &SiteContent) -> Self {
        let reason = match &snapshot.phase {
            Phase::Failed { reason } => Some(reason.as_str()),
            _ => None,
        };
        Self {
            fields: &snapshot.fields,
            phase: snapshot.phase.name(),
            reason,
            submitting: snapshot.is_submitting(),
            submitted: snapshot.is_submitted(),
            editable: matches!(snapshot.phase, Phase::Idle | Phase::Failed { .. }),
            services: content.service_titles(),
            notifications: &snapshot.notifications,
        }
    }
}

/// Template engine wrapper around minijinja.
pub struct PageRenderer {
    env: Environment<'static>,
}

impl Default for PageRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl PageRenderer {
    pub fn new() -> Self {
        let mut env = Environment::new();
        for (name, source) in TEMPLATES {
            env.add_template(name, source)
                .expect("embedded page template should be valid");
        }
        Self { env }
    }

    pub fn render_page(&self, view: &PageView<'_>) -> Result<String> {
        let page = PageContext {
            title: &view.config.page.title,
            scroll_offset_px: view.config.page.scroll_offset_px,
            transition_ms: view.config.carousel.transition_ms,
            session_id: view.session_id,
            year: view.year,
        };
        let carousel = CarouselContext::new(view.carousel, &view.content.testimonials);
        let consultation = FormContext::new(view.consultation, view.content);

        let template = self.env.get_template("page.html")?;
        let rendered = template
            .render(context! {
                page => page,
                content => view.content,
                carousel => carousel,
                consultation => consultation,
            })
            .context("render page")?;
        debug!(bytes = rendered.len(), session = ?view.session_id, "page rendered");
        Ok(rendered)
    }
}

/// Year shown in the footer copyright line.
pub fn current_year() -> i32 {
    chrono::Local::now().year()
}
