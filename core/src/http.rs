//! HTTP transport for the backend clients.
//!
//! # Design
//! Requests and responses are plain data. `HttpService` is the seam the
//! backend clients depend on: an implementation only has to know how to
//! `execute` an `HttpRequest`; `get`, `post` and `put` are built on top of it
//! against the configured base URL. `UreqHttpService` is the blocking
//! implementation used in production and in the integration tests.
//!
//! The transport never interprets status codes. 4xx/5xx responses come back
//! as data and the backend clients decide what they mean.

use std::time::Duration;

use serde::Serialize;

use crate::config::ClientConfig;
use crate::error::BackendError;

/// HTTP method for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
}

impl HttpMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
        }
    }
}

/// An HTTP request described as plain data.
///
/// `path` is the absolute URL. Query parameters are kept apart so the
/// executor can encode them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

/// An HTTP response described as plain data.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

/// Blocking HTTP transport shared by the backend clients.
pub trait HttpService {
    fn base_url(&self) -> &str;

    fn set_base_url(&mut self, url: &str);

    /// Execute a request and return whatever the server answered.
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse, BackendError>;

    fn get(&self, path: &str, params: &[(&str, &str)]) -> Result<HttpResponse, BackendError> {
        self.execute(HttpRequest {
            method: HttpMethod::Get,
            path: join_url(self.base_url(), path),
            query: params
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            headers: Vec::new(),
            body: None,
        })
    }

    fn post<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<HttpResponse, BackendError> {
        self.execute(json_request(HttpMethod::Post, join_url(self.base_url(), path), body)?)
    }

    fn put<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<HttpResponse, BackendError> {
        self.execute(json_request(HttpMethod::Put, join_url(self.base_url(), path), body)?)
    }
}

fn json_request<B: Serialize + ?Sized>(
    method: HttpMethod,
    path: String,
    body: &B,
) -> Result<HttpRequest, BackendError> {
    let body = serde_json::to_string(body).map_err(|e| BackendError::SerializationError(e.to_string()))?;
    Ok(HttpRequest {
        method,
        path,
        query: Vec::new(),
        headers: vec![("content-type".to_string(), "application/json".to_string())],
        body: Some(body),
    })
}

fn join_url(base_url: &str, path: &str) -> String {
    format!("{}/{}", base_url, path.trim_start_matches('/'))
}

/// `HttpService` backed by a `ureq` agent.
#[derive(Clone)]
pub struct UreqHttpService {
    agent: ureq::Agent,
    base_url: String,
}

impl UreqHttpService {
    pub fn new(config: &ClientConfig) -> Self {
        // Status codes are data here; the backend clients interpret them.
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .timeout_global(Some(Duration::from_secs(config.timeout_secs)))
            .build()
            .new_agent();

        Self {
            agent,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        }
    }
}

impl HttpService for UreqHttpService {
    fn base_url(&self) -> &str {
        &self.base_url
    }

    fn set_base_url(&mut self, url: &str) {
        self.base_url = url.trim_end_matches('/').to_string();
    }

    fn execute(&self, request: HttpRequest) -> Result<HttpResponse, BackendError> {
        let HttpRequest {
            method,
            path,
            query,
            headers,
            body,
        } = request;
        tracing::debug!(method = method.as_str(), path = %redact(&path), "executing request");

        let result = match method {
            HttpMethod::Get => {
                let mut builder = self.agent.get(&path);
                for (key, value) in &query {
                    builder = builder.query(key, value);
                }
                for (key, value) in &headers {
                    builder = builder.header(key, value);
                }
                builder.call()
            }
            HttpMethod::Post | HttpMethod::Put => {
                let mut builder = if method == HttpMethod::Post {
                    self.agent.post(&path)
                } else {
                    self.agent.put(&path)
                };
                for (key, value) in &query {
                    builder = builder.query(key, value);
                }
                for (key, value) in &headers {
                    builder = builder.header(key, value);
                }
                match body {
                    Some(body) => builder.send(body.as_bytes()),
                    None => builder.send_empty(),
                }
            }
        };

        let mut response = result.map_err(|e| BackendError::Transport(e.to_string()))?;
        let status = response.status().as_u16();
        let body = response
            .body_mut()
            .read_to_string()
            .map_err(|e| BackendError::Transport(e.to_string()))?;

        Ok(HttpResponse { status, body })
    }
}

/// Map non-success status codes to the appropriate `BackendError` variant.
pub(crate) fn check_status(response: &HttpResponse, expected: &[u16]) -> Result<(), BackendError> {
    if expected.contains(&response.status) {
        return Ok(());
    }
    tracing::warn!(status = response.status, "unexpected backend status");
    if response.status == 404 {
        return Err(BackendError::NotFound);
    }
    Err(BackendError::HttpError {
        status: response.status,
        body: response.body.clone(),
    })
}

pub(crate) fn parse_json<T: serde::de::DeserializeOwned>(response: &HttpResponse) -> Result<T, BackendError> {
    serde_json::from_str(&response.body).map_err(|e| BackendError::DeserializationError(e.to_string()))
}

/// Consumer URLs carry the API key; keep it out of the logs.
pub(crate) fn redact(path: &str) -> String {
    match path.find("/consumers/") {
        Some(idx) => format!("{}/consumers/***", &path[..idx]),
        None => path.to_string(),
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::cell::RefCell;
    use std::collections::VecDeque;

    use super::*;

    /// Transport that records requests and replays canned responses.
    pub struct ScriptedHttp {
        pub base_url: String,
        pub sent: RefCell<Vec<HttpRequest>>,
        pub replies: RefCell<VecDeque<HttpResponse>>,
    }

    impl ScriptedHttp {
        pub fn replying(status: u16, body: &str) -> Self {
            Self {
                base_url: "http://localhost:3000".to_string(),
                sent: RefCell::new(Vec::new()),
                replies: RefCell::new(VecDeque::from([HttpResponse {
                    status,
                    body: body.to_string(),
                }])),
            }
        }

        pub fn last(&self) -> HttpRequest {
            self.sent.borrow().last().cloned().expect("no request sent")
        }
    }

    impl HttpService for ScriptedHttp {
        fn base_url(&self) -> &str {
            &self.base_url
        }

        fn set_base_url(&mut self, url: &str) {
            self.base_url = url.to_string();
        }

        fn execute(&self, request: HttpRequest) -> Result<HttpResponse, BackendError> {
            self.sent.borrow_mut().push(request);
            self.replies
                .borrow_mut()
                .pop_front()
                .ok_or_else(|| BackendError::Transport("no scripted reply".to_string()))
        }
    }
}
