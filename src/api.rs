// API client module: a small blocking HTTP client for the MLCave model
// storage. Every call is one request, sent once, with no retries.

use crate::config::ClientConfig;
use crate::error::{ClientError, Result};
use log::{debug, warn};
use reqwest::blocking::{Client, Response};
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Method, StatusCode, Url};
use std::io::{self, Read};

/// Name of the HTTP header carrying the model creation parameters.
pub const MODEL_PARAMS: &str = "ModelParams";

/// Blocking MLCave client. Holds the reqwest client, the base URI of the
/// storage service and the bearer token sent with every request.
///
/// Cloning is cheap and clones share the connection pool, so one instance
/// can serve many threads.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    uri: String,
    token: String,
}

/// Optional headers attached to a pushed model.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ModelHeaders {
    /// Sent verbatim as the `ModelParams` header.
    pub model_params: Option<Vec<u8>>,
    /// Sent verbatim as `Content-Type`; describes how the model is packed.
    pub content_type: Option<String>,
}

impl ModelHeaders {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_model_params(mut self, params: impl Into<Vec<u8>>) -> Self {
        self.model_params = Some(params.into());
        self
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }
}

impl ApiClient {
    /// Create a client from `config`. The timeout is fixed here for every
    /// later call. No network I/O happens.
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|source| ClientError::Init { source })?;
        Ok(ApiClient {
            client,
            uri: config.uri.clone(),
            token: config.token.clone(),
        })
    }

    /// Create an ApiClient configured from the `MLCAVE_*` environment
    /// variables. See `ClientConfig::from_env`.
    pub fn from_env() -> anyhow::Result<Self> {
        let config = ClientConfig::from_env()?;
        Ok(ApiClient::new(&config)?)
    }

    /// Base URI of the storage service.
    pub fn uri(&self) -> &str {
        &self.uri
    }

    /// Push a model to the storage under `service_group`.
    pub fn push_model(
        &self,
        service_group: &str,
        model: &[u8],
        headers: Option<&ModelHeaders>,
    ) -> Result<()> {
        let url = format!("{}/{}", self.uri, service_group);
        self.execute_without_response_body(
            service_group,
            Method::POST,
            &url,
            Some(model.to_vec()),
            headers,
        )
    }

    /// Fetch the model at offset `skip` of `service_group`.
    pub fn get_model(&self, service_group: &str, skip: i64) -> Result<Vec<u8>> {
        let url = format!("{}/{}/{}", self.uri, service_group, skip);
        self.execute(service_group, Method::GET, &url, None, None)
    }

    /// Mark the model at offset `skip` as the current one.
    pub fn update_status_model(&self, service_group: &str, skip: i64) -> Result<()> {
        let url = format!("{}/{}/{}", self.uri, service_group, skip);
        self.execute_without_response_body(service_group, Method::PUT, &url, None, None)
    }

    fn execute_without_response_body(
        &self,
        service_group: &str,
        method: Method,
        url: &str,
        body: Option<Vec<u8>>,
        headers: Option<&ModelHeaders>,
    ) -> Result<()> {
        self.execute(service_group, method, url, body, headers)
            .map(|_| ())
    }

    fn execute(
        &self,
        service_group: &str,
        method: Method,
        url: &str,
        body: Option<Vec<u8>>,
        headers: Option<&ModelHeaders>,
    ) -> Result<Vec<u8>> {
        let mut req = self
            .client
            .request(method.clone(), url)
            .header(AUTHORIZATION, format!("Bearer {}", self.token));

        if let Some(headers) = headers {
            if let Some(params) = &headers.model_params {
                req = req.header(MODEL_PARAMS, params.as_slice());
            }
            if let Some(content_type) = &headers.content_type {
                req = req.header(CONTENT_TYPE, content_type.as_str());
            }
        }
        if let Some(body) = body {
            req = req.body(body);
        }

        let mut request = req.build().map_err(|source| ClientError::RequestBuild {
            method: method.clone(),
            uri: self.uri.clone(),
            source,
        })?;

        // User info in the base URI turns into a basic auth header; the bearer
        // token, appended last, is the only one sent.
        let bearer = request.headers().get_all(AUTHORIZATION).iter().last().cloned();
        if let Some(bearer) = bearer {
            request.headers_mut().insert(AUTHORIZATION, bearer);
        }

        // Rendered before sending since `execute` consumes the request.
        // Neither the Authorization header nor URL credentials end up in it.
        let shown = without_credentials(request.url());
        let summary = format!("{} {}", request.method(), shown);
        debug!("{summary} (service group: {service_group})");

        let response = self
            .client
            .execute(request)
            .map_err(|source| ClientError::Transport {
                method,
                request: summary,
                source: source.with_url(shown),
            })?;

        let mut response = ResponseGuard::new(response);

        let status = response.status();
        if status != StatusCode::OK {
            return Err(ClientError::UnexpectedStatus {
                status: status.as_u16(),
                service_group: service_group.to_string(),
            });
        }

        response
            .read_all()
            .map_err(|source| ClientError::ReadBody {
                service_group: service_group.to_string(),
                source,
            })
    }
}

fn without_credentials(url: &Url) -> Url {
    let mut url = url.clone();
    // Only fails for URLs that cannot carry credentials in the first place.
    let _ = url.set_username("");
    let _ = url.set_password(None);
    url
}

/// Owns a response until the call returns. Dropping it drains whatever is
/// left of the body so the connection goes back to the pool; a failed drain
/// is only logged.
struct ResponseGuard {
    response: Response,
}

impl ResponseGuard {
    fn new(response: Response) -> Self {
        ResponseGuard { response }
    }

    fn status(&self) -> StatusCode {
        self.response.status()
    }

    fn read_all(&mut self) -> io::Result<Vec<u8>> {
        let mut buf = Vec::new();
        self.response.read_to_end(&mut buf)?;
        Ok(buf)
    }
}

impl Drop for ResponseGuard {
    fn drop(&mut self) {
        if let Err(e) = io::copy(&mut self.response, &mut io::sink()) {
            warn!("release response body from {}: {}", self.response.url(), e);
        }
    }
}
