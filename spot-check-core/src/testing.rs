//! Test doubles for the UI surface and the transport.

use async_trait::async_trait;
use std::{
    io,
    sync::{Arc, Mutex},
};
use tokio::sync::{Notify, oneshot};

use crate::{
    model::FormFields,
    transport::{Request, Transport, TransportError},
    ui::UiSurface,
};

/// UI surface that remembers everything it was told.
#[derive(Debug, Default)]
pub struct RecordingUi {
    pub fields: FormFields,
    pub submit_enabled: bool,
    pub submit_history: Vec<bool>,
    pub busy: bool,
    pub errors: Vec<(String, String)>,
    pub successes: Vec<(String, String)>,
    pub set_field_calls: usize,
}

impl UiSurface for RecordingUi {
    fn set_submit_enabled(&mut self, enabled: bool) {
        self.submit_enabled = enabled;
        self.submit_history.push(enabled);
    }

    fn set_busy(&mut self, busy: bool) {
        self.busy = busy;
    }

    fn show_error(&mut self, title: &str, message: &str) {
        self.errors.push((title.to_string(), message.to_string()));
    }

    fn show_success(&mut self, title: &str, message: &str) {
        self.successes.push((title.to_string(), message.to_string()));
    }

    fn field_values(&self) -> FormFields {
        self.fields.clone()
    }

    fn set_field_values(&mut self, fields: FormFields) {
        self.set_field_calls += 1;
        self.fields = fields;
    }
}

#[derive(Debug)]
struct PendingCall {
    request: Request,
    reply: Option<oneshot::Sender<Result<Vec<u8>, TransportError>>>,
}

/// Transport whose calls stay pending until the test replies to them.
#[derive(Debug, Default)]
pub struct ScriptedTransport {
    calls: Mutex<Vec<PendingCall>>,
    arrived: Notify,
}

impl ScriptedTransport {
    pub fn requests(&self) -> Vec<Request> {
        self.calls.lock().unwrap().iter().map(|call| call.request.clone()).collect()
    }

    /// Wait until at least `count` requests have reached the transport.
    pub async fn wait_for_calls(&self, count: usize) {
        loop {
            if self.calls.lock().unwrap().len() >= count {
                return;
            }
            self.arrived.notified().await;
        }
    }

    /// Answer call `index`. Returns false if the caller has gone away.
    pub fn reply(&self, index: usize, result: Result<Vec<u8>, TransportError>) -> bool {
        let sender = self.calls.lock().unwrap()[index].reply.take();
        sender.is_some_and(|tx| tx.send(result).is_ok())
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn request(&self, request: &Request) -> Result<Vec<u8>, TransportError> {
        let (tx, rx) = oneshot::channel();
        self.calls.lock().unwrap().push(PendingCall { request: request.clone(), reply: Some(tx) });
        self.arrived.notify_one();

        rx.await.unwrap_or_else(|_| Err(connection_refused()))
    }
}

/// Transport whose every call panics.
#[derive(Debug)]
pub struct PanickingTransport;

#[async_trait]
impl Transport for PanickingTransport {
    async fn request(&self, request: &Request) -> Result<Vec<u8>, TransportError> {
        panic!("transport blew up on {}", request.path);
    }
}

/// Log sink for a test subscriber.
#[derive(Debug, Clone, Default)]
pub struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl CapturedLogs {
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }

    /// Run `f` with warnings and above written to this sink.
    pub fn capture<T>(&self, f: impl FnOnce() -> T) -> T {
        let sink = self.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || sink.clone())
            .with_ansi(false)
            .with_max_level(tracing::Level::WARN)
            .finish();
        tracing::subscriber::with_default(subscriber, f)
    }
}

impl io::Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

pub fn connection_refused() -> TransportError {
    TransportError::Send {
        url: "http://spot-check.local./".to_string(),
        source: Box::new(std::io::Error::from(std::io::ErrorKind::ConnectionRefused)),
    }
}
