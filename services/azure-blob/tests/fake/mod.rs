//! In-memory transport that records requests and replays canned responses.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use blobstore_core::{Error, HttpSend, Result};
use bytes::Bytes;
use http::{HeaderMap, Method, Request, Response, Uri};

/// What the fake transport saw of a request.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: Method,
    pub uri: Uri,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl RecordedRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).map(|v| v.to_str().unwrap())
    }
}

#[derive(Debug, Default)]
struct State {
    responses: VecDeque<Result<Response<Bytes>>>,
    requests: Vec<RecordedRequest>,
}

#[derive(Debug, Clone, Default)]
pub struct FakeHttpSend {
    state: Arc<Mutex<State>>,
}

impl FakeHttpSend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a response with `status` and `body`.
    pub fn respond(&self, status: u16, body: impl Into<Bytes>) -> &Self {
        let resp = Response::builder()
            .status(status)
            .body(body.into())
            .unwrap();
        self.state.lock().unwrap().responses.push_back(Ok(resp));
        self
    }

    /// Queue a transport failure: no response at all.
    pub fn fail(&self, message: &str) -> &Self {
        self.state
            .lock()
            .unwrap()
            .responses
            .push_back(Err(Error::communication(message.to_string())));
        self
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.lock().unwrap().requests.clone()
    }

    pub fn last_request(&self) -> RecordedRequest {
        self.requests().pop().expect("no request was sent")
    }
}

#[async_trait]
impl HttpSend for FakeHttpSend {
    async fn http_send(&self, req: Request<Bytes>) -> Result<Response<Bytes>> {
        let (parts, body) = req.into_parts();

        let mut state = self.state.lock().unwrap();
        state.requests.push(RecordedRequest {
            method: parts.method,
            uri: parts.uri,
            headers: parts.headers,
            body,
        });
        state
            .responses
            .pop_front()
            .unwrap_or_else(|| Err(Error::communication("no canned response left")))
    }
}
