//! Raw HTTP transport for the taskdesk API.

use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use serde::de::DeserializeOwned;
use tracing::{debug, instrument, trace};

use taskdesk_core::error::TransportError;
use taskdesk_core::{ApiUrl, Error, Result};

use super::endpoints::{ApiEnvelope, ErrorBody};
use super::request::PendingRequest;
use crate::config::ClientConfig;

fn transport_error(err: reqwest::Error) -> Error {
    let err = if err.is_timeout() {
        TransportError::Timeout
    } else if err.is_connect() {
        TransportError::Connection {
            message: err.to_string(),
        }
    } else {
        TransportError::Http {
            message: err.to_string(),
        }
    };
    Error::Transport(err)
}

/// HTTP client for API requests.
///
/// This layer knows nothing about sessions: it sends exactly the
/// credentials it is handed and maps the response envelope into a
/// [`Result`].
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: reqwest::Client,
    base_url: ApiUrl,
}

impl ApiClient {
    /// Create a new client from configuration.
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let mut builder = reqwest::Client::builder().user_agent(config.user_agent.as_str());
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(transport_error)?;

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
        })
    }

    /// Returns the API base URL this client is configured for.
    pub fn base_url(&self) -> &ApiUrl {
        &self.base_url
    }

    /// Send `request`, authenticating with `authorization` (a complete
    /// `Authorization` header value) when given.
    #[instrument(skip(self, request, authorization), fields(method = %request.method(), path = request.path()))]
    pub async fn execute<R>(
        &self,
        request: &PendingRequest,
        authorization: Option<&str>,
    ) -> Result<ApiEnvelope<R>>
    where
        R: DeserializeOwned,
    {
        let url = self.base_url.endpoint(request.path());
        debug!(authenticated = authorization.is_some(), "API request");
        trace!(query = ?request.query(), "query parameters");

        let headers = Self::build_headers(request, authorization)?;

        let mut builder = self
            .client
            .request(request.method().clone(), &url)
            .headers(headers);

        if !request.query().is_empty() {
            builder = builder.query(request.query());
        }
        if let Some(body) = request.body() {
            builder = builder.json(body);
        }

        let response = builder.send().await.map_err(transport_error)?;

        self.handle_response(response).await
    }

    /// Headers for one send. Built fresh every time so exactly one
    /// `Authorization` header, taken from the caller, is present.
    fn build_headers(request: &PendingRequest, authorization: Option<&str>) -> Result<HeaderMap> {
        let mut headers = request.headers().clone();
        headers.remove(AUTHORIZATION);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        if let Some(value) = authorization {
            let mut value = HeaderValue::from_str(value).map_err(|_| Error::Encode {
                message: "token contains characters not allowed in a header".to_string(),
            })?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        Ok(headers)
    }

    /// Handle an API response, parsing the envelope or error.
    async fn handle_response<R: DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<ApiEnvelope<R>> {
        let status = response.status();
        trace!(status = %status, "API response");

        if !status.is_success() {
            return Err(Self::parse_error_response(response).await);
        }

        let bytes = response.bytes().await.map_err(transport_error)?;

        // A 2xx body that says success:false is still an application error.
        let envelope: ApiEnvelope<R> = match serde_json::from_slice(&bytes) {
            Ok(envelope) => envelope,
            Err(err) => {
                return Err(Error::Decode {
                    message: err.to_string(),
                });
            }
        };

        if envelope.success {
            Ok(envelope)
        } else {
            let body: ErrorBody = serde_json::from_slice(&bytes).unwrap_or_default();
            Err(Error::Api(body.into_api_error(status.as_u16())))
        }
    }

    /// Parse an API error response.
    async fn parse_error_response(response: reqwest::Response) -> Error {
        let status = response.status().as_u16();

        let body = match response.json::<ErrorBody>().await {
            Ok(body) => body,
            Err(_) => ErrorBody::default(),
        };

        Error::Api(body.into_api_error(status))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_creation() {
        let config = ClientConfig::default();
        let client = ApiClient::new(&config).unwrap();
        assert_eq!(client.base_url(), &config.base_url);
    }

    #[test]
    fn headers_carry_single_authorization() {
        let request = PendingRequest::get("/api/tasks");
        let headers = ApiClient::build_headers(&request, Some("Bearer abc")).unwrap();
        assert_eq!(headers.get_all(AUTHORIZATION).iter().count(), 1);
        assert_eq!(headers[AUTHORIZATION], "Bearer abc");
    }

    #[test]
    fn headers_without_token_have_no_authorization() {
        let request = PendingRequest::get("/api/tasks");
        let headers = ApiClient::build_headers(&request, None).unwrap();
        assert!(headers.get(AUTHORIZATION).is_none());
    }

    #[test]
    fn invalid_token_characters_are_an_error() {
        let request = PendingRequest::get("/api/tasks");
        assert!(ApiClient::build_headers(&request, Some("Bearer a\nb")).is_err());
    }
}
