//! In-memory transport fake shared by unit tests

use crate::http::{Transport, TransportClient, TransportError};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::Mutex;

/// One recorded call
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    pub transport: Transport,
    pub method: String,
    pub params: Value,
}

/// Replays queued outcomes per transport and records every call
#[derive(Debug, Default)]
pub struct ScriptedClient {
    direct: Mutex<VecDeque<Result<Value, TransportError>>>,
    proxy: Mutex<VecDeque<Result<Value, TransportError>>>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl ScriptedClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn direct(self, outcome: Result<Value, TransportError>) -> Self {
        self.direct.lock().unwrap().push_back(outcome);
        self
    }

    pub fn proxy(self, outcome: Result<Value, TransportError>) -> Self {
        self.proxy.lock().unwrap().push_back(outcome);
        self
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn transports(&self) -> Vec<Transport> {
        self.calls().into_iter().map(|c| c.transport).collect()
    }

    /// Values the paging parameter took across calls
    pub fn cursors(&self, param: &str) -> Vec<Value> {
        self.calls()
            .into_iter()
            .map(|c| c.params.get(param).cloned().unwrap_or(Value::Null))
            .collect()
    }
}

#[async_trait]
impl TransportClient for ScriptedClient {
    async fn send(
        &self,
        transport: Transport,
        method: &str,
        params: &Value,
    ) -> Result<Value, TransportError> {
        self.calls.lock().unwrap().push(RecordedCall {
            transport,
            method: method.to_string(),
            params: params.clone(),
        });
        let queue = match transport {
            Transport::Direct => &self.direct,
            Transport::Proxy => &self.proxy,
        };
        queue.lock().unwrap().pop_front().unwrap_or_else(|| {
            Err(TransportError::malformed(
                transport,
                format!("no scripted response left for {method}"),
            ))
        })
    }
}

pub fn network(transport: Transport) -> TransportError {
    TransportError::network(transport, format!("{transport} host unreachable"))
}
