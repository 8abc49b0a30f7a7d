//! Site server - renders pages on request from the revalidating cache

use anyhow::Result;
use axum::{
    body::Body,
    extract::{Path, State},
    http::{Request, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::get,
    Router,
};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::cms::CmsError;
use crate::content::{loader::PageLoader, Blog, Page};
use crate::templates::Views;
use crate::Site;

/// Errors surfaced by request handlers
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("content source error: {0}")]
    Cms(#[from] CmsError),
    #[error("render error: {0}")]
    Render(#[from] anyhow::Error),
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = match &self {
            ServerError::Cms(_) => StatusCode::BAD_GATEWAY,
            ServerError::Render(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        tracing::error!("{}", self);
        (status, status.canonical_reason().unwrap_or("Error")).into_response()
    }
}

type HandlerResult = Result<Response, ServerError>;

/// Server state
struct ServerState {
    site: Site,
    views: Views,
    blog: Blog,
    /// Static pages keyed by path, e.g. `about/`
    pages: HashMap<String, Page>,
}

/// Build the router over a blog service
pub fn router(site: &Site, blog: Blog) -> Result<Router> {
    let views = Views::new(&site.config)?;
    let pages = PageLoader::new(&site.source_dir, views.blocks().highlighter())
        .load_pages()?
        .into_iter()
        .map(|p| (p.path.clone(), p))
        .collect();

    let state = Arc::new(ServerState {
        site: site.clone(),
        views,
        blog,
        pages,
    });

    let blog_dir = site.config.blog_dir.trim_matches('/').to_string();
    Ok(Router::new()
        .route(&format!("/{}", blog_dir), get(blog_index))
        .route(&format!("/{}/", blog_dir), get(blog_index))
        .route(&format!("/{}/:slug", blog_dir), get(blog_post))
        .route(&format!("/{}/:slug/", blog_dir), get(blog_post))
        .route("/careers", get(careers))
        .route("/careers/", get(careers))
        .route("/contact", get(contact))
        .route("/contact/", get(contact))
        .fallback(fallback_handler)
        .layer(TraceLayer::new_for_http())
        .with_state(state))
}

/// Start the server
pub async fn start(site: &Site, blog: Blog, ip: &str, port: u16) -> Result<()> {
    let app = router(site, blog)?;

    // Parse address - handle "localhost" specially
    let bind_ip = if ip == "localhost" { "127.0.0.1" } else { ip };
    let addr: SocketAddr = format!("{}:{}", bind_ip, port).parse()?;

    println!("Server running at http://{}:{}", ip, port);
    println!("Press Ctrl+C to stop.");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn blog_index(State(state): State<Arc<ServerState>>) -> HandlerResult {
    let posts = state.blog.posts().await?;
    Ok(Html(state.views.blog_index(&posts)?).into_response())
}

async fn blog_post(
    State(state): State<Arc<ServerState>>,
    Path(slug): Path<String>,
) -> HandlerResult {
    match state.blog.post_detail(&slug).await? {
        Some(detail) => Ok(Html(state.views.post(&detail)?).into_response()),
        None => {
            tracing::debug!("No published post with slug {:?}", slug);
            Ok((StatusCode::NOT_FOUND, Html(state.views.post_not_found()?)).into_response())
        }
    }
}

async fn careers(State(state): State<Arc<ServerState>>) -> HandlerResult {
    Ok(Html(state.views.careers()?).into_response())
}

async fn contact(State(state): State<Arc<ServerState>>) -> HandlerResult {
    Ok(Html(state.views.contact()?).into_response())
}

/// Static pages first, then files in the public directory, then 404
async fn fallback_handler(
    State(state): State<Arc<ServerState>>,
    request: Request<Body>,
) -> HandlerResult {
    let path = request.uri().path().trim_start_matches('/');
    let key = if path.is_empty() || path.ends_with('/') {
        path.to_string()
    } else {
        format!("{}/", path)
    };

    if let Some(page) = state.pages.get(&key) {
        return Ok(Html(state.views.page(page)?).into_response());
    }

    let mut service = ServeDir::new(&state.site.public_dir).append_index_html_on_directories(true);
    let response = match service.try_call(request).await {
        Ok(response) => response.into_response(),
        Err(e) => {
            tracing::warn!("Failed to serve static file: {}", e);
            return Ok((StatusCode::INTERNAL_SERVER_ERROR, "Server error").into_response());
        }
    };

    if response.status() == StatusCode::NOT_FOUND {
        return Ok((StatusCode::NOT_FOUND, Html(state.views.not_found()?)).into_response());
    }
    Ok(response)
}
