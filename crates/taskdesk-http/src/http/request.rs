//! Replayable request descriptions.

use reqwest::Method;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderName, HeaderValue};
use serde::Serialize;

use taskdesk_core::{Error, Result};

/// A fully captured outbound call.
///
/// Everything needed to send the request again is owned here, so the
/// pipeline can replay it verbatim after a token refresh. The
/// `Authorization` header is never part of a pending request; it is attached
/// from the session at send time.
#[derive(Debug, Clone)]
pub struct PendingRequest {
    method: Method,
    path: String,
    query: Vec<(String, String)>,
    body: Option<serde_json::Value>,
    headers: HeaderMap,
}

impl PendingRequest {
    /// A request with no body.
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
            headers: HeaderMap::new(),
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    pub fn post<B: Serialize + ?Sized>(path: impl Into<String>, body: &B) -> Result<Self> {
        Self::new(Method::POST, path).with_json(body)
    }

    pub fn put<B: Serialize + ?Sized>(path: impl Into<String>, body: &B) -> Result<Self> {
        Self::new(Method::PUT, path).with_json(body)
    }

    /// Attach a JSON body.
    pub fn with_json<B: Serialize + ?Sized>(mut self, body: &B) -> Result<Self> {
        let value = serde_json::to_value(body).map_err(|e| Error::Encode {
            message: e.to_string(),
        })?;
        self.body = Some(value);
        Ok(self)
    }

    /// Append query string pairs.
    pub fn with_query<K, V>(mut self, pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.query
            .extend(pairs.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    /// Add an extra header. `Authorization` is ignored.
    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        if name != AUTHORIZATION {
            self.headers.insert(name, value);
        }
        self
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn query(&self) -> &[(String, String)] {
        &self.query
    }

    pub fn body(&self) -> Option<&serde_json::Value> {
        self.body.as_ref()
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::ACCEPT_LANGUAGE;

    #[test]
    fn authorization_cannot_be_smuggled_in() {
        let request = PendingRequest::get("/api/tasks")
            .with_header(AUTHORIZATION, HeaderValue::from_static("Bearer stale"))
            .with_header(ACCEPT_LANGUAGE, HeaderValue::from_static("en"));
        assert!(request.headers().get(AUTHORIZATION).is_none());
        assert_eq!(request.headers().len(), 1);
    }

    #[test]
    fn post_captures_body() {
        let request =
            PendingRequest::post("/api/projects", &serde_json::json!({"name": "Home"})).unwrap();
        assert_eq!(*request.method(), Method::POST);
        assert_eq!(request.body().unwrap()["name"], "Home");
    }

    #[test]
    fn query_pairs_accumulate() {
        let request = PendingRequest::get("/api/tasks")
            .with_query([("status", "todo")])
            .with_query(vec![("limit".to_string(), "5".to_string())]);
        assert_eq!(request.query().len(), 2);
    }
}
