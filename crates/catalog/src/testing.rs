//! In-memory [`ApiTransport`] used by the unit tests of this crate.

use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value;

use crate::{ApiRequest, ApiTransport, Credential, Result, VndbError};

type ErrorFactory = Box<dyn Fn() -> VndbError + Send + Sync>;

enum Reply {
    Json(Value),
    Fail(ErrorFactory),
}

/// Records every request and answers each with the same canned reply.
pub(crate) struct RecordingTransport {
    reply: Reply,
    credential: Option<Credential>,
    requests: Mutex<Vec<ApiRequest>>,
}

impl RecordingTransport {
    pub(crate) fn replying(body: Value) -> Self {
        Self {
            reply: Reply::Json(body),
            credential: None,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn failing(error: impl Fn() -> VndbError + Send + Sync + 'static) -> Self {
        Self {
            reply: Reply::Fail(Box::new(error)),
            credential: None,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn with_credential(mut self, token: &str) -> Self {
        self.credential = Credential::new(token);
        self
    }

    pub(crate) fn requests(&self) -> Vec<ApiRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub(crate) fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl ApiTransport for RecordingTransport {
    async fn execute(&self, request: ApiRequest) -> Result<Value> {
        self.requests.lock().unwrap().push(request);
        match &self.reply {
            Reply::Json(body) => Ok(body.clone()),
            Reply::Fail(error) => Err(error()),
        }
    }

    fn credential(&self) -> Option<&Credential> {
        self.credential.as_ref()
    }
}
