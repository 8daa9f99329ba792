use crate::core::kernel::rest::RequestDescriptor;
use crate::core::kernel::transport::ResponseMeta;
use std::io::{Stderr, Write};
use std::sync::Mutex;
use tracing::trace;

/// Receives every raw response body before it is decoded.
pub trait ResponseObserver: Send + Sync {
    fn on_response(&self, request: &RequestDescriptor, response: &ResponseMeta);
}

/// Emits the body as a trace-level event.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl ResponseObserver for TracingObserver {
    fn on_response(&self, request: &RequestDescriptor, response: &ResponseMeta) {
        trace!(
            method = %request.method,
            path = %request.url.path(),
            status = %response.status,
            body = %response.body_text(),
            "Response body"
        );
    }
}

/// Copies each body to a writer, followed by a newline.
#[derive(Debug, Default)]
pub struct WriterObserver<W> {
    writer: Mutex<W>,
}

impl<W: Write + Send> WriterObserver<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }

    pub fn into_inner(self) -> W {
        self.writer
            .into_inner()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

impl<W: Write + Send> ResponseObserver for WriterObserver<W> {
    fn on_response(&self, _request: &RequestDescriptor, response: &ResponseMeta) {
        let Ok(mut writer) = self.writer.lock() else {
            return;
        };
        // diagnostics only, a failed write must not fail the request
        let _ = writer.write_all(&response.body);
        let _ = writer.write_all(b"\n");
        let _ = writer.flush();
    }
}

/// [`WriterObserver`] over the process's stderr.
#[derive(Debug)]
pub struct StderrObserver(WriterObserver<Stderr>);

impl Default for StderrObserver {
    fn default() -> Self {
        Self(WriterObserver::new(std::io::stderr()))
    }
}

impl ResponseObserver for StderrObserver {
    fn on_response(&self, request: &RequestDescriptor, response: &ResponseMeta) {
        self.0.on_response(request, response);
    }
}
