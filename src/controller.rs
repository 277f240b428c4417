//! Submission lifecycle: one request in flight at most, and the trigger is
//! handed back on every way out.

use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info, warn};

use crate::client::{LibraryUpload, StatsTransport};
use crate::config::ReportConfig;
use crate::display::{
    Content, Display, ErrorKind, APPLICATION_ERROR_TITLE, NETWORK_ERROR_MESSAGE,
    NETWORK_ERROR_TITLE, RENDER_ERROR_TITLE,
};
use crate::error::{RenderError, SubmitError, TransportError};
use crate::models::{PageFragment, Results, StatisticsPayload};
use crate::navigator::PageNavigator;
use crate::render;
use crate::sanitize::clean_text;

/// Shown when a failure payload carries no message.
pub const UNKNOWN_ERROR_MESSAGE: &str = "Unknown error";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitState {
    Idle,
    Submitting,
    Success,
    Error(ErrorKind),
}

/// Identifies one submission. Outcomes carrying an older ticket are stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubmitTicket {
    generation: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    Current(SubmitState),
    Stale,
}

/// The report currently on display.
#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    pub filename: String,
    pub payload: StatisticsPayload,
    pub fragments: Vec<PageFragment>,
}

enum Failure {
    Network(TransportError),
    Application(Option<String>),
    Render(RenderError),
}

pub struct SubmitController<T: StatsTransport> {
    transport: Arc<T>,
    config: ReportConfig,
    state: SubmitState,
    generation: u64,
    display: Display,
    navigator: Option<PageNavigator>,
    report: Option<Report>,
}

impl<T: StatsTransport> SubmitController<T> {
    pub fn new(transport: T, config: ReportConfig) -> Self {
        Self {
            transport: Arc::new(transport),
            config,
            state: SubmitState::Idle,
            generation: 0,
            display: Display::default(),
            navigator: None,
            report: None,
        }
    }

    pub fn state(&self) -> SubmitState {
        self.state
    }

    pub fn display(&self) -> &Display {
        &self.display
    }

    pub fn navigator(&self) -> Option<&PageNavigator> {
        self.navigator.as_ref()
    }

    pub fn report(&self) -> Option<&Report> {
        self.report.as_ref()
    }

    /// Shared handle for running the request outside the controller.
    pub fn transport(&self) -> Arc<T> {
        Arc::clone(&self.transport)
    }

    /// Submit one upload and apply the answer.
    pub async fn submit(&mut self, upload: LibraryUpload) -> Result<SubmitState, SubmitError> {
        let ticket = self.begin_submit()?;
        let outcome = self.transport.upload(upload).await;
        Ok(match self.complete(ticket, outcome) {
            Applied::Current(state) => state,
            Applied::Stale => self.state,
        })
    }

    /// Disable the trigger, show the loading state and drop any prior report.
    pub fn begin_submit(&mut self) -> Result<SubmitTicket, SubmitError> {
        if !self.display.trigger.is_enabled() {
            debug!("submission rejected: request already in flight");
            return Err(SubmitError::InFlight);
        }
        self.generation += 1;
        self.state = SubmitState::Submitting;
        self.navigator = None;
        self.report = None;
        self.display.clear();
        self.display.content = Content::Loading;
        self.display.trigger.disable();
        info!(generation = self.generation, "submission started");
        Ok(SubmitTicket {
            generation: self.generation,
        })
    }

    /// Apply a transport outcome for `ticket`. Outcomes of abandoned or
    /// superseded submissions are dropped.
    pub fn complete(
        &mut self,
        ticket: SubmitTicket,
        outcome: Result<StatisticsPayload, TransportError>,
    ) -> Applied {
        if ticket.generation != self.generation || self.state != SubmitState::Submitting {
            debug!(
                ticket = ticket.generation,
                current = self.generation,
                "discarding stale response"
            );
            return Applied::Stale;
        }

        let result = self.resolve(outcome);
        // Released here rather than inside `resolve` so no early return can
        // skip it.
        self.display.trigger.enable();

        self.state = match result {
            Ok(report) => {
                info!(filename = %report.filename, "report ready");
                let navigator =
                    PageNavigator::initialize(report.fragments.clone(), &self.config, &mut self.display);
                self.navigator = Some(navigator);
                self.report = Some(report);
                SubmitState::Success
            }
            Err(failure) => {
                let kind = self.show_failure(failure);
                SubmitState::Error(kind)
            }
        };
        Applied::Current(self.state)
    }

    /// Abandon the in-flight request. Returns false when nothing was in
    /// flight.
    pub fn cancel(&mut self) -> bool {
        if self.state != SubmitState::Submitting {
            return false;
        }
        self.generation += 1;
        self.state = SubmitState::Idle;
        self.display.clear();
        self.display.trigger.enable();
        info!("submission cancelled");
        true
    }

    pub fn advance(&mut self, now: Instant) {
        if let Some(navigator) = self.navigator.as_mut() {
            navigator.advance(&mut self.display, now);
        }
    }

    /// Drive the page transition clock. Returns true when the display changed.
    pub fn tick(&mut self, now: Instant) -> bool {
        match self.navigator.as_mut() {
            Some(navigator) => navigator.tick(&mut self.display, now),
            None => false,
        }
    }

    fn resolve(&self, outcome: Result<StatisticsPayload, TransportError>) -> Result<Report, Failure> {
        let payload = outcome.map_err(Failure::Network)?;
        if !payload.success {
            return Err(Failure::Application(payload.error.clone()));
        }

        let filename = payload.filename.clone().unwrap_or_default();
        let results = match payload.results.as_ref() {
            Some(value) => render::decode_results(value, &self.config),
            None if self.config.strict => Err(RenderError::MissingResults),
            None => {
                warn!("rendering placeholder: {}", RenderError::MissingResults);
                Ok(Results::default())
            }
        }
        .map_err(Failure::Render)?;
        let fragments =
            render::render(&filename, &results, &self.config).map_err(Failure::Render)?;

        Ok(Report {
            filename,
            payload,
            fragments,
        })
    }

    fn show_failure(&mut self, failure: Failure) -> ErrorKind {
        match failure {
            Failure::Network(err) => {
                warn!("network error: {}", err);
                self.display.show_error(
                    ErrorKind::Network,
                    NETWORK_ERROR_TITLE,
                    NETWORK_ERROR_MESSAGE.to_string(),
                );
                ErrorKind::Network
            }
            Failure::Application(message) => {
                let message = message
                    .as_deref()
                    .map(clean_text)
                    .unwrap_or_else(|| UNKNOWN_ERROR_MESSAGE.to_string());
                info!("service reported failure: {}", message);
                self.display
                    .show_error(ErrorKind::Application, APPLICATION_ERROR_TITLE, message);
                ErrorKind::Application
            }
            Failure::Render(err) => {
                warn!("report could not be rendered: {}", err);
                self.display
                    .show_error(ErrorKind::Render, RENDER_ERROR_TITLE, err.to_string());
                ErrorKind::Render
            }
        }
    }
}
