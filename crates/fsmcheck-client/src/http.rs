//! reqwest-backed transport.

use crate::error::{TransportError, TransportErrorKind};
use crate::retry::{RetryPolicy, Retrying};
use crate::transport::{ApiRequest, ApiResponse, Body, Connector, Method, Transport};
use fsmcheck_types::ids;
use reqwest::Url;
use reqwest::blocking::{Client, multipart};
use reqwest::header::CONTENT_TYPE;
use std::error::Error as StdError;
use std::io;
use std::time::Duration;

/// Connection settings for one service instance.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HttpSettings {
    pub base_url: String,
    pub username: Option<String>,
    pub password: Option<String>,
    /// Response timeout per request.
    pub timeout: Duration,
    pub retry: RetryPolicy,
}

impl HttpSettings {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            username: None,
            password: None,
            timeout: Duration::from_secs(300),
            retry: RetryPolicy::default(),
        }
    }
}

/// Builds a retry-wrapped [`HttpTransport`] per check run.
#[derive(Clone, Debug)]
pub struct HttpConnector {
    settings: HttpSettings,
}

impl HttpConnector {
    pub fn new(settings: HttpSettings) -> Self {
        Self { settings }
    }
}

impl Connector for HttpConnector {
    type Transport = Retrying<HttpTransport>;

    fn connect(&self) -> Result<Self::Transport, TransportError> {
        let transport = HttpTransport::new(&self.settings.base_url, self.settings.timeout)?
            .with_basic_auth(
                self.settings.username.clone(),
                self.settings.password.clone(),
            );
        Ok(Retrying::new(transport, self.settings.retry.clone()))
    }
}

/// Executes [`ApiRequest`]s against one base URL.
///
/// Owns its connection pool; dropping the transport releases it.
#[derive(Debug)]
pub struct HttpTransport {
    client: Client,
    base: Url,
    timeout: Duration,
    credentials: Option<(String, Option<String>)>,
}

impl HttpTransport {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, TransportError> {
        let base = Url::parse(base_url.trim())
            .map_err(|e| setup_error(format!("invalid server url '{base_url}': {e}")))?;
        if base.cannot_be_a_base() {
            return Err(setup_error(format!(
                "invalid server url '{base_url}': not a base url"
            )));
        }

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| setup_error(format!("cannot initialize http client: {e}")))?;

        Ok(Self {
            client,
            base,
            timeout,
            credentials: None,
        })
    }

    pub fn with_basic_auth(mut self, username: Option<String>, password: Option<String>) -> Self {
        self.credentials = username.map(|u| (u, password));
        self
    }

    /// Full URL for `request`, with path segments and query values percent-encoded.
    pub fn url_for(&self, request: &ApiRequest) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty();
            segments.extend(request.segments.iter().map(String::as_str));
        }
        if !request.query.is_empty() {
            url.query_pairs_mut()
                .extend_pairs(request.query.iter().map(|(k, v)| (k.as_str(), v.as_str())));
        }
        url
    }

    fn host(&self) -> String {
        match (self.base.host_str(), self.base.port_or_known_default()) {
            (Some(host), Some(port)) => format!("{host}:{port}"),
            (Some(host), None) => host.to_string(),
            _ => self.base.to_string(),
        }
    }

    /// Whether the configured host resolves to at least one address.
    fn host_resolves(&self) -> bool {
        self.base
            .socket_addrs(|| None)
            .is_ok_and(|addrs| !addrs.is_empty())
    }

    /// Map a reqwest failure onto the transport taxonomy.
    ///
    /// Only typed errors in the source chain are inspected. Display text is never matched
    /// because reqwest's own message embeds the request URL.
    fn classify(&self, err: &reqwest::Error) -> TransportError {
        let host = self.host();
        if err.is_timeout() {
            return TransportError::new(
                TransportErrorKind::Timeout,
                format!("no response from {host} within {:?}", self.timeout),
            );
        }

        let mut current: Option<&(dyn StdError + 'static)> = Some(err);
        while let Some(e) = current {
            if let Some(kind) = typed_kind(e) {
                let message = match kind {
                    TransportErrorKind::ConnectionRefused => format!("connection refused by {host}"),
                    TransportErrorKind::ConnectionReset => {
                        format!("connection to {host} closed before the response completed")
                    }
                    TransportErrorKind::Timeout => format!("connection to {host} timed out"),
                    TransportErrorKind::Tls => format!("tls failure talking to {host}: {e}"),
                    _ => format!("request to {host} failed: {e}"),
                };
                return TransportError::new(kind, message);
            }
            current = e.source();
        }

        if err.is_connect() {
            if !self.host_resolves() {
                let name = self.base.host_str().unwrap_or_default();
                return TransportError::new(
                    TransportErrorKind::UnknownHost,
                    format!("unknown host '{name}'"),
                );
            }
            return TransportError::new(
                TransportErrorKind::ConnectionRefused,
                format!("cannot connect to {host}"),
            );
        }
        TransportError::new(TransportErrorKind::Other, format!("request to {host} failed: {err}"))
    }
}

/// Local misconfiguration; never retried.
fn setup_error(message: String) -> TransportError {
    TransportError::new(TransportErrorKind::Other, message)
}

fn typed_kind(e: &(dyn StdError + 'static)) -> Option<TransportErrorKind> {
    if e.is::<rustls::Error>() {
        return Some(TransportErrorKind::Tls);
    }
    if let Some(hyper_err) = e.downcast_ref::<hyper::Error>()
        && hyper_err.is_incomplete_message()
    {
        return Some(TransportErrorKind::ConnectionReset);
    }
    let io_err = e.downcast_ref::<io::Error>()?;
    // io::Error::source skips the wrapped error, so look at it here.
    if io_err
        .get_ref()
        .is_some_and(|inner| inner.is::<rustls::Error>())
    {
        return Some(TransportErrorKind::Tls);
    }
    match io_err.kind() {
        io::ErrorKind::ConnectionRefused => Some(TransportErrorKind::ConnectionRefused),
        io::ErrorKind::ConnectionReset
        | io::ErrorKind::ConnectionAborted
        | io::ErrorKind::BrokenPipe
        | io::ErrorKind::UnexpectedEof => Some(TransportErrorKind::ConnectionReset),
        io::ErrorKind::TimedOut => Some(TransportErrorKind::Timeout),
        _ => None,
    }
}

impl Transport for HttpTransport {
    fn execute(&self, request: &ApiRequest) -> Result<ApiResponse, TransportError> {
        let url = self.url_for(request);
        let mut builder = match request.method {
            Method::Get => self.client.get(url),
            Method::Put => self.client.put(url),
            Method::Post => self.client.post(url),
        };
        if let Some((user, password)) = &self.credentials {
            builder = builder.basic_auth(user, password.as_ref());
        }
        builder = match &request.body {
            Body::Empty => builder,
            Body::Text(text) => builder
                .header(CONTENT_TYPE, "text/plain; charset=utf-8")
                .body(text.clone()),
            Body::Files(paths) => {
                let mut form = multipart::Form::new();
                for path in paths {
                    form = form.file(ids::UPLOAD_PART_NAME, path).map_err(|e| {
                        TransportError::new(
                            TransportErrorKind::Io,
                            format!("cannot attach {path}: {e}"),
                        )
                    })?;
                }
                builder.multipart(form)
            }
        };

        let response = builder.send().map_err(|e| self.classify(&e))?;
        let status = response.status().as_u16();
        let body = response.bytes().map_err(|e| self.classify(&e))?.to_vec();
        Ok(ApiResponse { status, body })
    }
}
