//! HTTP front end: every GET path is resolved under the served root.
use axum::Router;
use axum::body::Body;
use axum::extract::State;
use axum::http::Method;
use axum::http::StatusCode;
use axum::http::Uri;
use axum::response::Html;
use axum::response::IntoResponse;
use axum::response::Response;

use crate::Config;
use crate::Error;
use crate::Site;
use crate::render::render_directory;
use crate::site::Resolved;

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = match &self {
            Error::NotFound { .. } => {
                log::info!("{self}");
                StatusCode::NOT_FOUND
            }
            _ => {
                log::error!("{self}");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        let reason = status.canonical_reason().unwrap_or_default();
        (status, reason).into_response()
    }
}

/// Builds the router serving `site`.
pub fn router(site: Site) -> Router {
    Router::new().fallback(serve_path).with_state(site)
}

async fn serve_path(State(site): State<Site>, method: Method, uri: Uri) -> Response {
    log::debug!("{method} {uri}");
    if method != Method::GET && method != Method::HEAD {
        return StatusCode::METHOD_NOT_ALLOWED.into_response();
    }
    match site.resolve(uri.path()).await {
        // Raw bytes go out without a content type.
        Ok(Resolved::File(bytes)) => Response::new(Body::from(bytes)),
        Ok(Resolved::Listing(view)) => Html(render_directory(&view).into_string()).into_response(),
        Err(e) => e.into_response(),
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("failed to listen for ctrl-c: {e}");
        std::future::pending::<()>().await;
    }
    log::info!("shutting down");
}

/// Binds `config.addr` and serves `config.root` until ctrl-c.
pub async fn serve(config: Config) -> Result<(), Error> {
    let listener = tokio::net::TcpListener::bind(config.addr)
        .await
        .map_err(|e| Error::Serve {
            what: config.addr.to_string(),
            how: e.to_string(),
        })?;
    let local_addr = listener.local_addr().map_err(|e| Error::Serve {
        what: config.addr.to_string(),
        how: e.to_string(),
    })?;
    log::info!("serving {} on http://{local_addr}", config.root.display());

    axum::serve(listener, router(Site::new(config.root)))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| Error::Serve {
            what: local_addr.to_string(),
            how: e.to_string(),
        })
}
