use axum::Router;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, Method, StatusCode, Uri, header};
use axum::response::{IntoResponse, Response};
use percent_encoding::percent_decode_str;
use std::io;
use std::net::{SocketAddr, TcpListener};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use tokio::sync::oneshot;

/// A request as seen by [`StubServer`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RecordedRequest {
    pub method: String,
    /// Percent-encoded path, as sent on the wire.
    pub raw_path: String,
    /// Path with each segment percent-decoded.
    pub path: String,
    pub query: Vec<(String, String)>,
    /// Header names are lowercased.
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl RecordedRequest {
    fn from_parts(method: &Method, uri: &Uri, headers: &HeaderMap, body: Vec<u8>) -> Self {
        let raw_path = uri.path().to_string();
        let path = raw_path
            .split('/')
            .skip(1)
            .map(|segment| format!("/{}", percent_decode_str(segment).decode_utf8_lossy()))
            .collect();
        let query = uri
            .query()
            .and_then(|q| reqwest::Url::parse(&format!("http://stub/?{q}")).ok())
            .map(|url| {
                url.query_pairs()
                    .map(|(k, v)| (k.into_owned(), v.into_owned()))
                    .collect()
            })
            .unwrap_or_default();
        let headers = headers
            .iter()
            .map(|(name, value)| {
                (
                    name.as_str().to_string(),
                    String::from_utf8_lossy(value.as_bytes()).into_owned(),
                )
            })
            .collect();

        Self {
            method: method.as_str().to_string(),
            raw_path,
            path,
            query,
            headers,
            body,
        }
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        let name = name.to_ascii_lowercase();
        self.headers
            .iter()
            .find(|(k, _)| *k == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn query_value(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StubResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl StubResponse {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn json(value: &serde_json::Value) -> Self {
        Self::new(200, value.to_string())
    }
}

type Handler = dyn Fn(&RecordedRequest) -> StubResponse + Send + Sync;

#[derive(Clone)]
struct StubState {
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
    handler: Arc<Handler>,
}

/// Local HTTP server on `127.0.0.1` answering every route through one handler.
///
/// Every request is recorded before the handler runs. Dropping the server stops it.
pub struct StubServer {
    addr: SocketAddr,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
    shutdown: Option<oneshot::Sender<()>>,
    worker: Option<JoinHandle<()>>,
}

impl StubServer {
    pub fn start<F>(handler: F) -> io::Result<Self>
    where
        F: Fn(&RecordedRequest) -> StubResponse + Send + Sync + 'static,
    {
        let listener = TcpListener::bind("127.0.0.1:0")?;
        listener.set_nonblocking(true)?;
        let addr = listener.local_addr()?;
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;

        let requests = Arc::new(Mutex::new(Vec::new()));
        let app = Router::new().fallback(record).with_state(StubState {
            requests: Arc::clone(&requests),
            handler: Arc::new(handler),
        });
        let (shutdown, stop) = oneshot::channel::<()>();

        let worker = thread::spawn(move || {
            runtime.block_on(async move {
                let Ok(listener) = tokio::net::TcpListener::from_std(listener) else {
                    return;
                };
                let _ = axum::serve(listener, app)
                    .with_graceful_shutdown(async {
                        let _ = stop.await;
                    })
                    .await;
            });
        });

        Ok(Self {
            addr,
            requests,
            shutdown: Some(shutdown),
            worker: Some(worker),
        })
    }

    /// Serve a [`crate::ServiceFixture`].
    pub fn for_fixture(fixture: crate::ServiceFixture) -> io::Result<Self> {
        Self::start(move |req| {
            let (status, body) = fixture.respond(&req.method, &req.path, &req.query);
            StubResponse::new(status, body)
        })
    }

    /// Base URL without a trailing slash.
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests
            .lock()
            .map(|r| r.clone())
            .unwrap_or_default()
    }

    /// `"METHOD /path"` for each recorded request, in arrival order.
    pub fn request_lines(&self) -> Vec<String> {
        self.requests()
            .iter()
            .map(|r| format!("{} {}", r.method, r.path))
            .collect()
    }
}

impl Drop for StubServer {
    fn drop(&mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}

async fn record(
    State(state): State<StubState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let request = RecordedRequest::from_parts(&method, &uri, &headers, body.to_vec());
    if let Ok(mut log) = state.requests.lock() {
        log.push(request.clone());
    }

    let response = (state.handler)(&request);
    let status = StatusCode::from_u16(response.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (
        status,
        [(header::CONTENT_TYPE, "application/json")],
        response.body,
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_decoded_path_query_and_streamed_body() {
        let server = StubServer::start(|_| StubResponse::new(503, Vec::new())).expect("server");
        let body = reqwest::blocking::Body::new(io::Cursor::new(b"abcde".to_vec()));
        let response = reqwest::blocking::Client::new()
            .put(format!("{}/rest/ignored-resources/org.example%3Alib%2Fx%201.0?x=1", server.url()))
            .header("X-Trace", "stub")
            .body(body)
            .send()
            .expect("send");
        assert_eq!(response.status().as_u16(), 503);

        let requests = server.requests();
        let req = &requests[0];
        assert_eq!(req.method, "PUT");
        assert_eq!(req.raw_path, "/rest/ignored-resources/org.example%3Alib%2Fx%201.0");
        assert_eq!(req.path, "/rest/ignored-resources/org.example:lib/x 1.0");
        assert_eq!(req.query_value("x"), Some("1"));
        assert_eq!(req.header("x-trace"), Some("stub"));
        assert_eq!(req.body_text(), "abcde");
    }

    #[test]
    fn unrouted_fixture_paths_are_not_found() {
        let server = StubServer::for_fixture(crate::ServiceFixture::default()).expect("server");
        let status = reqwest::blocking::get(format!("{}/rest/unknown", server.url()))
            .expect("send")
            .status();
        assert_eq!(status.as_u16(), 404);
        assert_eq!(server.request_lines(), ["GET /rest/unknown"]);
    }
}
