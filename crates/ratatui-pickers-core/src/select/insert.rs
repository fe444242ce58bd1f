//! Creating new options from the search term, locally or through a remote endpoint.
//!
//! The engine never performs I/O itself. It hands the host an [`InsertRequest`], and the host
//! answers with the endpoint's [`InsertResponse`] (or an error). Hosts that are fine blocking
//! can pass an [`InsertTransport`] to `SelectEngine::insert_with` instead.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use url::Url;

use crate::attrs;
use crate::error::InsertError;
use crate::error::ParseError;
use crate::options::OptionItem;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    #[default]
    Post,
    Put,
    Patch,
}

impl HttpMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
        }
    }
}

impl FromStr for HttpMethod {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "GET" => Ok(HttpMethod::Get),
            "POST" => Ok(HttpMethod::Post),
            "PUT" => Ok(HttpMethod::Put),
            "PATCH" => Ok(HttpMethod::Patch),
            _ => Err(ParseError::InvalidMethod(s.to_string())),
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where and how to create options remotely.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InsertEndpoint {
    pub url: Url,
    pub method: HttpMethod,
    pub headers: BTreeMap<String, String>,
}

impl InsertEndpoint {
    pub fn new(url: &str) -> Result<Self, ParseError> {
        let url = Url::parse(url).map_err(|e| ParseError::InvalidUrl {
            url: url.to_string(),
            reason: e.to_string(),
        })?;
        Ok(Self {
            url,
            method: HttpMethod::default(),
            headers: BTreeMap::new(),
        })
    }

    pub fn with_method(mut self, method: HttpMethod) -> Self {
        self.method = method;
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Reads `insert-url`, `insert-method` and `insert-headers`.
    ///
    /// Returns `None` without a URL. A malformed URL or method is logged; a bad method falls
    /// back to POST.
    pub fn from_attrs(attrs: &attrs::Attrs) -> Option<Self> {
        let raw = attrs::string_attr(attrs, "insert-url")?;
        let endpoint = match Self::new(&raw) {
            Ok(e) => e,
            Err(err) => {
                tracing::warn!(%err, "insert endpoint disabled");
                return None;
            }
        };
        let method = match attrs.get("insert-method") {
            Some(m) => m.parse().unwrap_or_else(|err: ParseError| {
                tracing::warn!(%err, "using POST for insert requests");
                HttpMethod::Post
            }),
            None => HttpMethod::Post,
        };
        let headers = attrs
            .get("insert-headers")
            .map(|h| attrs::map_or_default(h))
            .unwrap_or_default();
        Some(Self {
            method,
            headers,
            ..endpoint
        })
    }

    pub fn request(&self, term: &str) -> InsertRequest {
        InsertRequest {
            method: self.method,
            url: self.url.clone(),
            headers: self.headers.clone(),
            body: serde_json::json!({ "term": term }).to_string(),
            term: term.to_string(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InsertRequest {
    pub method: HttpMethod,
    pub url: Url,
    pub headers: BTreeMap<String, String>,
    /// JSON: `{"term": "..."}`.
    pub body: String,
    pub term: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InsertResponse {
    pub status: u16,
    pub body: String,
}

impl InsertResponse {
    pub fn ok(body: impl Into<String>) -> Self {
        Self {
            status: 200,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Turns an endpoint answer into an option, rejecting non-2xx statuses and malformed bodies.
pub fn resolve(response: InsertResponse) -> Result<OptionItem, InsertError> {
    if !response.is_success() {
        return Err(InsertError::Status(response.status));
    }
    Ok(OptionItem::from_insert_payload(&response.body)?)
}

/// Performs an [`InsertRequest`] synchronously.
pub trait InsertTransport {
    fn send(&mut self, request: &InsertRequest) -> Result<InsertResponse, InsertError>;
}

impl<F> InsertTransport for F
where
    F: FnMut(&InsertRequest) -> Result<InsertResponse, InsertError>,
{
    fn send(&mut self, request: &InsertRequest) -> Result<InsertResponse, InsertError> {
        self(request)
    }
}

/// Blocking HTTP transport.
#[cfg(feature = "http")]
#[derive(Clone, Debug, Default)]
pub struct HttpTransport {
    client: reqwest::blocking::Client,
}

#[cfg(feature = "http")]
impl HttpTransport {
    pub fn new(client: reqwest::blocking::Client) -> Self {
        Self { client }
    }
}

#[cfg(feature = "http")]
impl InsertTransport for HttpTransport {
    fn send(&mut self, request: &InsertRequest) -> Result<InsertResponse, InsertError> {
        let method = match request.method {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
            HttpMethod::Put => reqwest::Method::PUT,
            HttpMethod::Patch => reqwest::Method::PATCH,
        };
        let mut builder = self
            .client
            .request(method, request.url.clone())
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(request.body.clone());
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        let response = builder.send()?;
        let status = response.status().as_u16();
        let body = response.text()?;
        Ok(InsertResponse { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn endpoint_from_attrs() {
        let attrs: attrs::Attrs = [
            ("insert-url", "https://example.test/tags"),
            ("insert-method", "put"),
            ("insert-headers", "x-csrf: abc; accept: application/json"),
        ]
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
        let ep = InsertEndpoint::from_attrs(&attrs).unwrap();
        assert_eq!(ep.method, HttpMethod::Put);
        assert_eq!(ep.headers.get("x-csrf").map(String::as_str), Some("abc"));

        let req = ep.request("rust \"lang\"");
        assert_eq!(req.body, r#"{"term":"rust \"lang\""}"#);
        assert_eq!(req.url.as_str(), "https://example.test/tags");
    }

    #[test]
    fn endpoint_rejects_relative_urls() {
        assert!(InsertEndpoint::new("/tags").is_err());
        let attrs: attrs::Attrs = [("insert-url".to_string(), "::".to_string())].into();
        assert!(InsertEndpoint::from_attrs(&attrs).is_none());
    }

    #[test]
    fn resolve_checks_status_and_shape() {
        let body = r#"{"group": "__", "value": "v", "text": "V", "disabled": false,
                       "selected": false, "data": {"keywords": ["x"]}}"#;
        assert!(resolve(InsertResponse::ok(body)).is_ok());
        assert!(matches!(
            resolve(InsertResponse {
                status: 500,
                body: body.to_string()
            }),
            Err(InsertError::Status(500))
        ));
        assert!(matches!(
            resolve(InsertResponse::ok("{}")),
            Err(InsertError::Payload(_))
        ));
    }
}
