//! Shared HTTP transport for backend calls.
//!
//! The session store (auth endpoints) and the resource client both go through
//! this layer, so headers, timeouts and response classification are defined
//! once. Pure parsing lives in `parse_body` for testability.

#[cfg(test)]
#[path = "http_test.rs"]
mod http_test;

use reqwest::header::{ACCEPT, AUTHORIZATION};
use reqwest::{Method, RequestBuilder};
use serde::de::DeserializeOwned;

use super::error::{ApiError, classify};
use crate::config::{Config, Timeouts};

#[derive(Clone, Debug)]
pub struct Transport {
    http: reqwest::Client,
    base_url: String,
}

impl Transport {
    /// # Errors
    ///
    /// Returns [`ApiError::ClientBuild`] if the underlying client cannot be constructed.
    pub fn new(api_url: &str, timeouts: Timeouts) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(timeouts.request())
            .connect_timeout(timeouts.connect())
            .build()
            .map_err(|e| ApiError::ClientBuild(e.to_string()))?;
        Ok(Self { http, base_url: api_url.trim_end_matches('/').to_owned() })
    }

    /// # Errors
    ///
    /// Returns [`ApiError::ClientBuild`] if the underlying client cannot be constructed.
    pub fn from_config(config: &Config) -> Result<Self, ApiError> {
        Self::new(&config.api_url, config.timeouts)
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Start a request to `path`, attaching `token` as a bearer credential when present.
    pub(crate) fn request(&self, method: Method, path: &str, token: Option<&str>) -> RequestBuilder {
        let url = format!("{}/{}", self.base_url, path.trim_start_matches('/'));
        let request = self.http.request(method, url).header(ACCEPT, "application/json");
        match token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    /// Send and parse a success body into `T`.
    pub(crate) async fn send_json<T: DeserializeOwned>(&self, request: RequestBuilder, fallback: &str) -> Result<T, ApiError> {
        let body = self.send(request, fallback).await?;
        parse_body(&body, fallback)
    }

    /// Send, returning the raw success body. Non-2xx statuses become errors.
    pub(crate) async fn send(&self, request: RequestBuilder, fallback: &str) -> Result<String, ApiError> {
        let request = request.build().map_err(|e| ApiError::InvalidRequest(e.to_string()))?;
        let method = request.method().clone();
        let path = request.url().path().to_owned();
        let authenticated = request.headers().contains_key(AUTHORIZATION);
        tracing::debug!(%method, %path, authenticated, "backend request");

        let response = match self.http.execute(request).await {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!(%method, %path, error = %e, "backend unreachable");
                return Err(network_error(fallback, &e));
            }
        };
        let status = response.status().as_u16();
        let body = response.text().await.map_err(|e| network_error(fallback, &e))?;

        if !(200..300).contains(&status) {
            let err = classify(status, &body, fallback);
            tracing::warn!(%method, %path, status, code = err.error_code(), "backend request failed");
            return Err(err);
        }
        Ok(body)
    }
}

fn network_error(fallback: &str, error: &reqwest::Error) -> ApiError {
    ApiError::Network { message: fallback.to_owned(), detail: error.to_string() }
}

pub(crate) fn parse_body<T: DeserializeOwned>(body: &str, fallback: &str) -> Result<T, ApiError> {
    serde_json::from_str(body).map_err(|e| ApiError::Malformed { message: fallback.to_owned(), detail: e.to_string() })
}
