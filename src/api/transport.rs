// Transport primitive: request descriptors and the blocking HTTP client that
// executes them. Knows nothing about JSON or the response envelope.

use reqwest::blocking::{multipart, Client};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::Method;
use secrecy::ExposeSecret;
use tracing::debug;

use crate::config::ClientConfig;
use crate::error::{SetupError, TransportError};

/// String fields of a `multipart/form-data` body, in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormParams {
    fields: Vec<(&'static str, String)>,
}

impl FormParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a field that is always sent, even when empty.
    pub fn field(mut self, name: &'static str, value: impl Into<String>) -> Self {
        self.fields.push((name, value.into()));
        self
    }

    /// Add a field only when a non-empty value is supplied. An absent optional
    /// field never appears in the encoded body.
    pub fn optional<S: Into<String>>(self, name: &'static str, value: Option<S>) -> Self {
        match value.map(Into::into) {
            Some(v) if !v.is_empty() => self.field(name, v),
            _ => self,
        }
    }

    pub fn fields(&self) -> &[(&'static str, String)] {
        &self.fields
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, v)| v.as_str())
    }

    fn to_multipart(&self) -> multipart::Form {
        self.fields
            .iter()
            .fold(multipart::Form::new(), |form, (name, value)| {
                form.text(*name, value.clone())
            })
    }
}

/// Body of a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestBody {
    Empty,
    Form(FormParams),
}

/// One API call: method, path below the base URL, and body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiRequest {
    pub method: Method,
    pub path: &'static str,
    pub body: RequestBody,
}

impl ApiRequest {
    /// Authenticated GET without a body.
    pub fn get(path: &'static str) -> Self {
        Self {
            method: Method::GET,
            path,
            body: RequestBody::Empty,
        }
    }

    /// Authenticated multipart-form POST.
    pub fn form(path: &'static str, params: FormParams) -> Self {
        Self {
            method: Method::POST,
            path,
            body: RequestBody::Form(params),
        }
    }
}

/// Executes a request and returns the raw response body.
pub trait Transport {
    fn execute(&self, request: &ApiRequest) -> Result<Vec<u8>, TransportError>;
}

/// `reqwest` blocking client with bearer authentication and a total timeout.
pub struct HttpTransport {
    client: Client,
    base_url: String,
}

impl HttpTransport {
    pub fn new(config: &ClientConfig) -> Result<Self, SetupError> {
        let mut auth = HeaderValue::from_str(&format!("Bearer {}", config.token.expose_secret()))
            .map_err(SetupError::InvalidToken)?;
        auth.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, auth);

        let client = Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .build()
            .map_err(SetupError::HttpClient)?;

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

impl Transport for HttpTransport {
    fn execute(&self, request: &ApiRequest) -> Result<Vec<u8>, TransportError> {
        let url = self.url(request.path);
        debug!(method = %request.method, path = request.path, "sending request");

        let mut builder = self.client.request(request.method.clone(), &url);
        if let RequestBody::Form(params) = &request.body {
            builder = builder.multipart(params.to_multipart());
        }

        let res = builder.send().map_err(TransportError::Network)?;
        let status = res.status();
        let body = res.bytes().map_err(TransportError::Network)?;
        debug!(status = status.as_u16(), bytes = body.len(), "received response");

        if status.as_u16() >= 400 {
            return Err(TransportError::HttpStatus {
                status: status.as_u16(),
                body: String::from_utf8_lossy(&body).into_owned(),
            });
        }

        Ok(body.to_vec())
    }
}
