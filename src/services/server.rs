//! Local HTTP preview of a built output tree.

use crate::error::ServeError;
use async_trait::async_trait;
use axum::Router;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use tower_http::services::ServeDir;

/// Serves a directory over HTTP until the process is interrupted
#[async_trait]
pub trait PreviewServer {
    async fn serve(&self, root: &Path, host: &str, port: u16) -> Result<(), ServeError>;
}

/// Static file server; directory requests fall back to `index.html`
#[derive(Debug, Clone, Default)]
pub struct StaticServer;

impl StaticServer {
    pub fn new() -> Self {
        Self
    }

    /// Router serving `root`
    pub fn router(root: PathBuf) -> Router {
        let serve_dir = ServeDir::new(root).append_index_html_on_directories(true);
        Router::new().fallback_service(serve_dir)
    }
}

/// Host handed to the resolver; empty means every interface
fn bind_host(host: &str) -> &str {
    let host = host.trim();
    if host.is_empty() {
        return "0.0.0.0";
    }
    host.strip_prefix('[')
        .and_then(|h| h.strip_suffix(']'))
        .unwrap_or(host)
}

/// Resolve a host name or address plus port to the addresses to bind
pub async fn listen_addrs(host: &str, port: u16) -> Result<Vec<SocketAddr>, ServeError> {
    let host = bind_host(host);
    let unresolved = || ServeError::Address(format!("{}:{}", host, port));
    let addrs: Vec<SocketAddr> = tokio::net::lookup_host((host, port))
        .await
        .map_err(|_| unresolved())?
        .collect();
    if addrs.is_empty() {
        return Err(unresolved());
    }
    Ok(addrs)
}

#[async_trait]
impl PreviewServer for StaticServer {
    async fn serve(&self, root: &Path, host: &str, port: u16) -> Result<(), ServeError> {
        if !root.is_dir() {
            return Err(ServeError::MissingRoot(root.to_path_buf()));
        }

        let addrs = listen_addrs(host, port).await?;
        let app = Self::router(root.to_path_buf());

        let listener = tokio::net::TcpListener::bind(addrs.as_slice()).await?;
        let addr = listener.local_addr()?;
        tracing::info!("Serving {} on http://{} ...", root.display(), addr);
        axum::serve(listener, app).await?;

        Ok(())
    }
}
