// src/services/fetcher.rs

//! Page fetcher service.
//!
//! Retrieves rendered markup from the dynamic server, one locale at a time.

use async_trait::async_trait;
use reqwest::Client;

use crate::error::{AppError, Result};
use crate::models::{HttpConfig, Locale, Route};
use crate::utils::http::create_async_client;
use crate::utils::url::{combine_url, with_culture};

/// Fetches the markup the server renders for a route in a locale.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, base_url: &str, route: &Route, locale: &Locale) -> Result<String>;
}

/// Single GET per page over HTTP. Failures are returned as-is, never
/// retried.
#[derive(Debug, Clone)]
pub struct HttpPageFetcher {
    client: Client,
}

impl HttpPageFetcher {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    pub fn from_config(config: &HttpConfig) -> Result<Self> {
        Ok(Self::new(create_async_client(config)?))
    }

    /// Request URL for a route in a locale.
    pub fn page_url(base_url: &str, route: &Route, locale: &Locale) -> String {
        with_culture(&combine_url(base_url, route.as_str()), locale.as_str())
    }
}

#[async_trait]
impl PageFetcher for HttpPageFetcher {
    async fn fetch(&self, base_url: &str, route: &Route, locale: &Locale) -> Result<String> {
        let url = Self::page_url(base_url, route, locale);
        log::info!("GET {}", url);

        let response = self.client.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(AppError::Status { url, status });
        }
        Ok(response.text().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{Router, http::Uri, routing::get};

    async fn serve(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}")
    }

    fn fetcher() -> HttpPageFetcher {
        HttpPageFetcher::from_config(&HttpConfig::default()).unwrap()
    }

    #[test]
    fn test_page_url() {
        let en = Locale::parse("en-US").unwrap();
        assert_eq!(
            HttpPageFetcher::page_url("http://localhost:5055/", &Route::root(), &en),
            "http://localhost:5055/?culture=en-US"
        );
        let route = Route::parse("/News?page=2").unwrap();
        assert_eq!(
            HttpPageFetcher::page_url("http://localhost:5055", &route, &en),
            "http://localhost:5055/News?page=2&culture=en-US"
        );
    }

    #[tokio::test]
    async fn test_fetch_sends_culture_and_keeps_query() {
        async fn echo(uri: Uri) -> String {
            uri.to_string()
        }
        let base = serve(Router::new().route("/News", get(echo))).await;

        let route = Route::parse("/News?page=2").unwrap();
        let zh = Locale::parse("zh-TW").unwrap();
        let body = fetcher().fetch(&base, &route, &zh).await.unwrap();
        assert_eq!(body, "/News?page=2&culture=zh-TW");
    }

    #[tokio::test]
    async fn test_fetch_non_success_status_is_an_error() {
        let base = serve(Router::new().route("/", get(|| async { "home" }))).await;

        let route = Route::parse("/missing").unwrap();
        let en = Locale::parse("en-US").unwrap();
        let err = fetcher().fetch(&base, &route, &en).await.unwrap_err();
        match err {
            AppError::Status { status, url } => {
                assert_eq!(status, reqwest::StatusCode::NOT_FOUND);
                assert!(url.ends_with("/missing?culture=en-US"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_fetch_connection_refused_is_an_error() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base = format!("http://{}", listener.local_addr().unwrap());
        drop(listener);

        let en = Locale::parse("en-US").unwrap();
        let err = fetcher().fetch(&base, &Route::root(), &en).await.unwrap_err();
        assert!(matches!(err, AppError::Http(_)));
    }
}
