//! reqwest-backed [`AnnotationBackend`].

use crate::backend::AnnotationBackend;
use crate::config::SyncConfig;
use crate::error::BackendError;
use async_trait::async_trait;
use bt_core::id::{ImageId, RemoteId};
use bt_core::model::ImageRecord;
use bt_core::wire::{CreateAnnotationRequest, ImagePage, RemoteAnnotation};
use reqwest::Method;
use serde::de::DeserializeOwned;

/// HTTP client for the annotation REST API.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: reqwest::Client,
    api_url: String,
    token: Option<String>,
}

impl HttpBackend {
    pub fn new(config: &SyncConfig) -> Self {
        Self::with_client(reqwest::Client::new(), config)
    }

    /// Reuse an existing [`reqwest::Client`] (shared connection pool).
    pub fn with_client(client: reqwest::Client, config: &SyncConfig) -> Self {
        Self {
            client,
            api_url: config.api_url.trim_end_matches('/').to_string(),
            token: config.token.clone(),
        }
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.api_url, path)
    }

    fn request(&self, method: Method, path: &str) -> reqwest::RequestBuilder {
        let builder = self.client.request(method, self.url(path));
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    // ---- private helpers ----

    /// Returns the response unchanged on success, or an
    /// [`BackendError::Api`] with the status and body text.
    async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, BackendError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(BackendError::Api {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }

    async fn parse_response<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, BackendError> {
        let response = Self::ensure_success(response).await?;
        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| BackendError::Decode(e.to_string()))
    }

    async fn check_status(response: reqwest::Response) -> Result<(), BackendError> {
        Self::ensure_success(response).await?;
        Ok(())
    }
}

#[async_trait]
impl AnnotationBackend for HttpBackend {
    async fn fetch_image(&self, image_id: ImageId) -> Result<ImageRecord, BackendError> {
        let response = self
            .request(Method::GET, &format!("/images/{image_id}"))
            .send()
            .await?;
        Self::parse_response(response).await
    }

    async fn fetch_annotations(
        &self,
        image_id: ImageId,
    ) -> Result<Vec<RemoteAnnotation>, BackendError> {
        let response = self
            .request(Method::GET, &format!("/annotations/{image_id}"))
            .send()
            .await?;
        Self::parse_response(response).await
    }

    async fn create_annotation(
        &self,
        request: &CreateAnnotationRequest,
    ) -> Result<RemoteAnnotation, BackendError> {
        let response = self
            .request(Method::POST, "/annotations")
            .json(request)
            .send()
            .await?;
        Self::parse_response(response).await
    }

    async fn delete_annotation(
        &self,
        image_id: ImageId,
        annotation_id: RemoteId,
    ) -> Result<(), BackendError> {
        let response = self
            .request(
                Method::DELETE,
                &format!("/annotations/delete/{annotation_id}/{image_id}"),
            )
            .send()
            .await?;
        match Self::check_status(response).await {
            Err(e) if e.is_not_found() => {
                log::debug!("annotation {annotation_id} already deleted");
                Ok(())
            }
            other => other,
        }
    }

    async fn fetch_tags(&self) -> Result<Vec<String>, BackendError> {
        let response = self
            .request(Method::GET, "/annotations/tags")
            .send()
            .await?;
        Self::parse_response(response).await
    }

    async fn fetch_image_page(&self, page: u32, page_size: u32) -> Result<ImagePage, BackendError> {
        let response = self
            .request(Method::GET, "/images/mine")
            .query(&[("page", page), ("page_size", page_size)])
            .send()
            .await?;
        Self::parse_response(response).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trailing_slash_is_trimmed() {
        let backend = HttpBackend::new(&SyncConfig::default().with_api_url("http://api.test/v1/"));
        assert_eq!(backend.api_url(), "http://api.test/v1");
        assert_eq!(backend.url("/annotations/tags"), "http://api.test/v1/annotations/tags");
    }

    #[test]
    fn bearer_token_is_attached() {
        let backend = HttpBackend::new(&SyncConfig::default().with_token("abc"));
        let request = backend
            .request(Method::GET, "/annotations/tags")
            .build()
            .unwrap();
        assert_eq!(
            request.headers()["authorization"].to_str().unwrap(),
            "Bearer abc"
        );

        let anonymous = HttpBackend::new(&SyncConfig::default());
        let request = anonymous.request(Method::GET, "/x").build().unwrap();
        assert!(request.headers().get("authorization").is_none());
    }

    #[test]
    fn delete_path_puts_annotation_first() {
        let backend = HttpBackend::new(&SyncConfig::default());
        let request = backend
            .request(
                Method::DELETE,
                &format!("/annotations/delete/{}/{}", RemoteId(7), ImageId(3)),
            )
            .build()
            .unwrap();
        assert_eq!(request.url().path(), "/annotations/delete/7/3");
    }
}
