#![allow(dead_code)]
use async_trait::async_trait;
use http_client::{Error, HttpClient, Request, Response};
use http_types::StatusCode;
use lastfm_api::{ClientConfig, LastFmClient, WireFormat};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// A canned transport outcome
#[derive(Debug, Clone)]
pub enum Reply {
    Status(u16, String),
    Failure(String),
}

/// In-memory transport that replays queued replies and records requested URLs.
///
/// Clones share the queue and the request log, so tests can keep a handle
/// after boxing one into the client.
#[derive(Debug, Clone, Default)]
pub struct StubClient {
    replies: Arc<Mutex<VecDeque<Reply>>>,
    requests: Arc<Mutex<Vec<String>>>,
}

impl StubClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reply(self, status: u16, body: &str) -> Self {
        self.replies
            .lock()
            .unwrap()
            .push_back(Reply::Status(status, body.to_string()));
        self
    }

    pub fn fail(self, message: &str) -> Self {
        self.replies
            .lock()
            .unwrap()
            .push_back(Reply::Failure(message.to_string()));
        self
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }

    /// Decoded query parameters of the n-th request
    pub fn query_params(&self, index: usize) -> Vec<(String, String)> {
        let url: http_types::Url = self.requests()[index].parse().unwrap();
        url.query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect()
    }
}

#[async_trait]
impl HttpClient for StubClient {
    async fn send(&self, req: Request) -> Result<Response, Error> {
        self.requests.lock().unwrap().push(req.url().to_string());

        let reply = self
            .replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Reply::Status(404, "no reply queued".to_string()));

        match reply {
            Reply::Status(status, body) => {
                let mut response = Response::new(status);
                response.set_body(body);
                Ok(response)
            }
            Reply::Failure(message) => Err(Error::from_str(StatusCode::InternalServerError, message)),
        }
    }
}

pub fn json_client(stub: &StubClient) -> LastFmClient {
    LastFmClient::new(Box::new(stub.clone()), ClientConfig::new("K"))
}

pub fn xml_client(stub: &StubClient) -> LastFmClient {
    LastFmClient::new(
        Box::new(stub.clone()),
        ClientConfig::new("K").with_format(WireFormat::Xml),
    )
}

pub fn has_param(params: &[(String, String)], key: &str, value: &str) -> bool {
    params.iter().any(|(k, v)| k == key && v == value)
}
