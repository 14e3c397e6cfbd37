//! Store backed by an HTTP file server.
//!
//! `GET {base}/{dir}/` returns a JSON array of `{"name", "is_dir"}` entries;
//! `GET {base}/{path}` streams the file body.

use super::{RemoteFileStore, RemoteReader};
use crate::error::StoreError;
use crate::types::RemoteEntry;
use async_trait::async_trait;
use futures_util::TryStreamExt;
use reqwest::{RequestBuilder, StatusCode, Url};
use std::time::Duration;
use tokio_util::io::StreamReader;

/// HTTP file server store.
pub struct HttpStore {
    base_url: Url,
    token: Option<String>,
    client: reqwest::Client,
}

impl HttpStore {
    /// Build the client and check the server answers.
    ///
    /// Unreachable servers and rejected credentials are connect errors.
    pub async fn connect(
        base_url: &str,
        token: Option<String>,
        connect_timeout: Duration,
    ) -> Result<Self, StoreError> {
        let connect_err = |message: String| StoreError::Connect {
            endpoint: base_url.to_string(),
            message,
        };

        let base_url = Url::parse(base_url).map_err(|e| connect_err(e.to_string()))?;
        let client = reqwest::Client::builder()
            .connect_timeout(connect_timeout)
            .build()
            .map_err(|e| connect_err(e.to_string()))?;

        let store = Self {
            base_url,
            token,
            client,
        };

        let resp = store
            .get(store.base_url.clone())
            .send()
            .await
            .map_err(|e| connect_err(e.to_string()))?;

        if matches!(
            resp.status(),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN
        ) {
            return Err(connect_err(format!("HTTP {}", resp.status())));
        }

        Ok(store)
    }

    fn get(&self, url: Url) -> RequestBuilder {
        let request = self.client.get(url);
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    /// Build `{base}/{path}`, percent-encoding each segment.
    fn url_for(&self, path: &str, trailing_slash: bool) -> Result<Url, StoreError> {
        let mut url = self.base_url.clone();
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| StoreError::InvalidPath(self.base_url.to_string()))?;
            segments.pop_if_empty();
            for part in path.split('/').filter(|p| !p.is_empty() && *p != ".") {
                if part == ".." {
                    return Err(StoreError::InvalidPath(path.to_string()));
                }
                segments.push(part);
            }
            if trailing_slash {
                segments.push("");
            }
        }
        Ok(url)
    }
}

#[async_trait]
impl RemoteFileStore for HttpStore {
    fn name(&self) -> &str {
        "http"
    }

    async fn list_entries(&self, dir: &str) -> Result<Vec<RemoteEntry>, StoreError> {
        let url = self.url_for(dir, true)?;
        let list_err = |message: String| StoreError::List {
            path: dir.to_string(),
            message,
        };

        let resp = self
            .get(url)
            .send()
            .await
            .map_err(|e| list_err(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(list_err(format!("HTTP {status}")));
        }

        resp.json::<Vec<RemoteEntry>>()
            .await
            .map_err(|e| list_err(format!("Failed to parse listing: {e}")))
    }

    async fn open_read(&self, path: &str) -> Result<RemoteReader, StoreError> {
        let url = self.url_for(path, false)?;
        let open_err = |message: String| StoreError::Open {
            path: path.to_string(),
            message,
        };

        let resp = self
            .get(url)
            .send()
            .await
            .map_err(|e| open_err(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(open_err(format!("HTTP {status}")));
        }

        let stream = resp.bytes_stream().map_err(std::io::Error::other);
        Ok(Box::new(StreamReader::new(Box::pin(stream))))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::extract::Path;
    use axum::http::HeaderMap;
    use axum::routing::get;
    use axum::{Json, Router};
    use tokio::io::AsyncReadExt;

    async fn spawn_server(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}")
    }

    fn file_server() -> Router {
        Router::new()
            .route("/", get(|| async { "ok" }))
            .route(
                "/incoming/",
                get(|| async {
                    Json(vec![
                        RemoteEntry::file("a.jpg"),
                        RemoteEntry::file("b c.jpg"),
                        RemoteEntry::dir("thumbs"),
                    ])
                }),
            )
            .route(
                "/incoming/{name}",
                get(|Path(name): Path<String>| async move {
                    if name == "missing.jpg" {
                        Err(axum::http::StatusCode::NOT_FOUND)
                    } else {
                        Ok(format!("bytes of {name}"))
                    }
                }),
            )
    }

    fn timeout() -> Duration {
        Duration::from_secs(5)
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_list_entries() {
        let base = spawn_server(file_server()).await;
        let store = HttpStore::connect(&base, None, timeout()).await.unwrap();
        let entries = store.list_entries("incoming").await.unwrap();
        assert_eq!(entries.len(), 3);
        assert!(entries[2].is_dir);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_open_read_streams_body() {
        let base = spawn_server(file_server()).await;
        let store = HttpStore::connect(&base, None, timeout()).await.unwrap();
        let mut reader = store.open_read("incoming/b c.jpg").await.unwrap();
        let mut body = String::new();
        reader.read_to_string(&mut body).await.unwrap();
        assert_eq!(body, "bytes of b c.jpg");
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_open_missing_is_open_error() {
        let base = spawn_server(file_server()).await;
        let store = HttpStore::connect(&base, None, timeout()).await.unwrap();
        let err = store.open_read("incoming/missing.jpg").await.err().unwrap();
        assert!(matches!(err, StoreError::Open { ref message, .. } if message.contains("404")));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_list_missing_dir_is_list_error() {
        let base = spawn_server(file_server()).await;
        let store = HttpStore::connect(&base, None, timeout()).await.unwrap();
        let err = store.list_entries("elsewhere").await.unwrap_err();
        assert!(matches!(err, StoreError::List { .. }));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_parent_segments_are_rejected() {
        let base = spawn_server(file_server()).await;
        let store = HttpStore::connect(&base, None, timeout()).await.unwrap();
        let err = store.open_read("incoming/../secret").await.err().unwrap();
        assert!(matches!(err, StoreError::InvalidPath(_)));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_bearer_token_is_sent() {
        let app = Router::new().route(
            "/",
            get(|headers: HeaderMap| async move {
                match headers.get("authorization").and_then(|v| v.to_str().ok()) {
                    Some("Bearer s3cret") => Ok("ok"),
                    _ => Err(axum::http::StatusCode::UNAUTHORIZED),
                }
            }),
        );
        let base = spawn_server(app).await;

        let err = HttpStore::connect(&base, None, timeout()).await.err().unwrap();
        assert!(matches!(err, StoreError::Connect { .. }));

        let store = HttpStore::connect(&base, Some("s3cret".to_string()), timeout()).await;
        assert!(store.is_ok());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_unreachable_server_is_connect_error() {
        // Bind then drop to get a port nothing listens on.
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let err = HttpStore::connect(&format!("http://{addr}"), None, timeout())
            .await
            .err()
            .unwrap();
        assert!(matches!(err, StoreError::Connect { .. }));
    }
}
