use super::{ApiError, HealthReport, SaveReply, error_message};
use crate::{
    domain::{Contact, ContactDraft, Credential},
    errors::AppError,
};
use reqwest::{
    Method, StatusCode,
    blocking::{self, RequestBuilder, Response},
    header::{AUTHORIZATION, CONTENT_TYPE},
};
use std::time::Duration;
use tracing::debug;
use url::Url;

/// Thin client over the contacts REST API.
///
/// Holds no credential of its own: every call is handed the `Credential`
/// it should be made with, so which identity a request carries is always
/// visible at the call site.
#[derive(Debug, Clone)]
pub struct ApiClient {
    base_url: Url,
    http: blocking::Client,
}

impl ApiClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, AppError> {
        let base_url = Url::parse(base_url)?;

        if base_url.cannot_be_a_base() || !matches!(base_url.scheme(), "http" | "https") {
            return Err(AppError::Config(format!(
                "'{}' is not an http(s) base url",
                base_url
            )));
        }

        let http = blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Config(format!("cannot build http client: {}", e)))?;

        Ok(Self { base_url, http })
    }

    /// `GET /api/health`, probing whether `credential` is accepted.
    pub fn health(&self, credential: &Credential) -> Result<HealthReport, ApiError> {
        let url = self.endpoint(&["api", "health"])?;
        let response = self.send(self.http.request(Method::GET, url), credential)?;

        Ok(response.json::<HealthReport>()?)
    }

    /// `GET /api/contacts`
    pub fn list_contacts(&self, credential: &Credential) -> Result<Vec<Contact>, ApiError> {
        let url = self.endpoint(&["api", "contacts"])?;
        let response = self.send(self.http.request(Method::GET, url), credential)?;

        Ok(response.json::<Vec<Contact>>()?)
    }

    /// `POST /api/contacts`
    pub fn create_contact(
        &self,
        credential: &Credential,
        draft: &ContactDraft,
    ) -> Result<SaveReply, ApiError> {
        let url = self.endpoint(&["api", "contacts"])?;
        let request = self
            .http
            .request(Method::POST, url)
            .header(CONTENT_TYPE, "application/json")
            .json(draft);

        SaveReply::from_body(&self.send(request, credential)?.text()?)
    }

    /// `PUT /api/contacts/{id}`
    pub fn update_contact(
        &self,
        credential: &Credential,
        id: &str,
        draft: &ContactDraft,
    ) -> Result<SaveReply, ApiError> {
        let url = self.endpoint(&["api", "contacts", id])?;
        let request = self
            .http
            .request(Method::PUT, url)
            .header(CONTENT_TYPE, "application/json")
            .json(draft);

        SaveReply::from_body(&self.send(request, credential)?.text()?)
    }

    /// `DELETE /api/contacts/{id}`
    pub fn delete_contact(&self, credential: &Credential, id: &str) -> Result<(), ApiError> {
        let url = self.endpoint(&["api", "contacts", id])?;
        self.send(self.http.request(Method::DELETE, url), credential)?;

        Ok(())
    }

    /// Append path segments to the base url. Segments are percent-encoded,
    /// so an id can never escape its own segment.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ApiError::Url(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);

        Ok(url)
    }

    fn send(&self, request: RequestBuilder, credential: &Credential) -> Result<Response, ApiError> {
        let response = request
            .header(AUTHORIZATION, credential.authorization_header())
            .send()?;

        let status = response.status();
        debug!(url = %response.url(), %status, "api response");

        if status == StatusCode::UNAUTHORIZED {
            return Err(ApiError::Unauthorized);
        }

        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(ApiError::Status {
                status,
                message: error_message(status, &body),
            });
        }

        Ok(response)
    }
}
