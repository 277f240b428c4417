use std::path::PathBuf;
use std::sync::mpsc;
use std::time::Instant;

use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::client::{LibraryUpload, StatsTransport};
use crate::controller::{Applied, SubmitController, SubmitTicket};
use crate::error::TransportError;
use crate::export::{self, ExportFormat};
use crate::models::StatisticsPayload;

/// A finished request, sent from the request task back to the UI loop.
pub struct Completion {
    ticket: SubmitTicket,
    outcome: Result<StatisticsPayload, TransportError>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Main,
    About,
    Export,
}

pub struct App<T: StatsTransport> {
    pub controller: SubmitController<T>,
    pub upload: LibraryUpload,
    pub server_url: String,
    pub view: View,
    pub should_quit: bool,
    /// Directory exports are written to
    pub path: PathBuf,
    pub export_format: ExportFormat,
    pub export_message: Option<String>,
    /// Task running the current request
    in_flight: Option<JoinHandle<()>>,
}

impl<T: StatsTransport> App<T> {
    pub fn new(
        controller: SubmitController<T>,
        upload: LibraryUpload,
        server_url: String,
        path: PathBuf,
    ) -> Self {
        Self {
            controller,
            upload,
            server_url,
            view: View::Main,
            should_quit: false,
            path,
            export_format: ExportFormat::Text,
            export_message: None,
            in_flight: None,
        }
    }

    pub fn complete(&mut self, completion: Completion) {
        if let Applied::Current(_) = self.controller.complete(completion.ticket, completion.outcome) {
            self.in_flight = None;
        }
    }

    /// Abandon the current request and stop its task.
    pub fn cancel(&mut self) {
        if !self.controller.cancel() {
            return;
        }
        if let Some(task) = self.in_flight.take() {
            task.abort();
        }
    }

    pub fn advance(&mut self) {
        if self.controller.display().advance_armed() {
            self.controller.advance(Instant::now());
        }
    }

    pub fn open_export(&mut self) {
        if self.controller.report().is_some() {
            self.view = View::Export;
            self.export_message = None;
        }
    }

    pub fn cycle_export_format(&mut self) {
        self.export_format = self.export_format.next();
        self.export_message = None;
    }

    pub fn export(&mut self) {
        let Some(report) = self.controller.report() else {
            return;
        };
        self.export_message = Some(match export::save_report(&self.path, report, self.export_format) {
            Ok(path) => format!("Saved to {}", path.display()),
            Err(e) => format!("Error: {}", e),
        });
    }
}

impl<T: StatsTransport + 'static> App<T> {
    /// Start a request on `runtime`. Its outcome arrives on `tx`.
    pub fn submit(&mut self, runtime: &Handle, tx: &mpsc::Sender<Completion>) {
        let ticket = match self.controller.begin_submit() {
            Ok(ticket) => ticket,
            Err(e) => {
                debug!("{}", e);
                return;
            }
        };
        self.export_message = None;

        let transport = self.controller.transport();
        let upload = self.upload.clone();
        let tx = tx.clone();
        self.in_flight = Some(runtime.spawn(async move {
            let outcome = transport.upload(upload).await;
            // The UI may already be gone; nothing to report then.
            let _ = tx.send(Completion { ticket, outcome });
        }));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    use async_trait::async_trait;

    use crate::config::ReportConfig;
    use crate::controller::SubmitState;

    /// Upload that never finishes. Counts how many are still running.
    struct HangingTransport {
        active: Arc<AtomicUsize>,
    }

    struct Running(Arc<AtomicUsize>);

    impl Drop for Running {
        fn drop(&mut self) {
            self.0.fetch_sub(1, Ordering::SeqCst);
        }
    }

    #[async_trait]
    impl StatsTransport for HangingTransport {
        async fn upload(&self, _upload: LibraryUpload) -> Result<StatisticsPayload, TransportError> {
            self.active.fetch_add(1, Ordering::SeqCst);
            let _running = Running(self.active.clone());
            std::future::pending().await
        }
    }

    fn wait_until(condition: impl Fn() -> bool) {
        for _ in 0..200 {
            if condition() {
                return;
            }
            std::thread::sleep(Duration::from_millis(10));
        }
        panic!("condition not reached");
    }

    fn test_app(active: &Arc<AtomicUsize>) -> App<HangingTransport> {
        let transport = HangingTransport {
            active: active.clone(),
        };
        App::new(
            SubmitController::new(transport, ReportConfig::default()),
            LibraryUpload {
                filename: "library.xml".to_string(),
                bytes: b"<Library/>".to_vec(),
            },
            "http://localhost:5000".to_string(),
            PathBuf::from("."),
        )
    }

    #[test]
    fn test_cancel_aborts_request_task() {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        let active = Arc::new(AtomicUsize::new(0));
        let mut app = test_app(&active);
        let (tx, rx) = mpsc::channel();

        app.submit(runtime.handle(), &tx);
        wait_until(|| active.load(Ordering::SeqCst) == 1);

        app.cancel();
        assert_eq!(app.controller.state(), SubmitState::Idle);
        assert!(app.in_flight.is_none());
        wait_until(|| active.load(Ordering::SeqCst) == 0);

        // Resubmitting leaves exactly one request running.
        app.submit(runtime.handle(), &tx);
        wait_until(|| active.load(Ordering::SeqCst) == 1);
        std::thread::sleep(Duration::from_millis(50));
        assert_eq!(active.load(Ordering::SeqCst), 1);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_cancel_without_request_is_noop() {
        let active = Arc::new(AtomicUsize::new(0));
        let mut app = test_app(&active);

        app.cancel();
        assert_eq!(app.controller.state(), SubmitState::Idle);
        assert!(app.in_flight.is_none());
    }
}
