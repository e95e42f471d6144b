//! LawXygen site server: renders the landing page and drives each visitor's
//! carousel and consultation form over a small JSON + SSE API.

mod error;
mod routes;
mod sse;
mod state;

use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::bail;
use clap::Parser;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tracing::{info, warn};

use lawxygen::content::SiteContent;
use lawxygen::core::invariants::validate_content;
use lawxygen::io::config::{DEFAULT_CONFIG_FILE, load_config};

use crate::state::AppState;

#[derive(Parser)]
#[command(name = "lawxygen-site")]
#[command(about = "Serve the LawXygen landing page")]
struct Args {
    /// Address to bind the server to
    #[arg(long, default_value = "127.0.0.1")]
    bind: String,

    /// Port to listen on
    #[arg(long, default_value = "3000")]
    port: u16,

    /// Site config file; watched for changes
    #[arg(long, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    /// Directory served under /assets (site.css, site.js)
    #[arg(long, default_value = "./assets")]
    assets_dir: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("lawxygen=info".parse()?)
                .add_directive("lawxygen_site=info".parse()?),
        )
        .init();

    let args = Args::parse();

    let config = load_config(&args.config)?;
    let content = SiteContent::lawxygen();
    let errors = validate_content(&content);
    if !errors.is_empty() {
        bail!("content violations:\n- {}", errors.join("\n- "));
    }
    info!(config = %args.config.display(), "starting lawxygen-site");

    let state = AppState::new(args.config.clone(), config, content);

    sse::start_config_watcher(state.clone());
    state::start_session_reaper(state.clone());

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let mut app = routes::router(state).layer(cors);

    if args.assets_dir.exists() {
        info!(assets_dir = %args.assets_dir.display(), "serving static assets");
        app = app.nest_service("/assets", ServeDir::new(&args.assets_dir));
    } else {
        warn!(assets_dir = %args.assets_dir.display(), "assets directory not found, page will be unstyled");
    }

    let addr: SocketAddr = format!("{}:{}", args.bind, args.port).parse()?;
    info!(addr = %addr, "listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
