//! The display target the controller and navigator write into.
//!
//! The terminal UI and the one-shot printer only ever read it.

use crate::models::PageFragment;

pub const LOADING_MESSAGE: &str = "Processing your file...";
pub const NETWORK_ERROR_TITLE: &str = "Network Error";
pub const NETWORK_ERROR_MESSAGE: &str = "Please check your connection and try again.";
pub const APPLICATION_ERROR_TITLE: &str = "Error";
pub const RENDER_ERROR_TITLE: &str = "Report Error";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Network,
    Application,
    Render,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Content {
    Empty,
    Loading,
    Error {
        kind: ErrorKind,
        title: String,
        message: String,
    },
    Report {
        /// Fragments visible on the current page.
        page: Vec<PageFragment>,
        index: usize,
        count: usize,
    },
}

/// Fade phase of the content area.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Visibility {
    #[default]
    Visible,
    FadingOut,
    FadingIn,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Trigger {
    enabled: bool,
}

impl Default for Trigger {
    fn default() -> Self {
        Self { enabled: true }
    }
}

impl Trigger {
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn label(&self) -> &'static str {
        if self.enabled {
            "Submit"
        } else {
            "Processing..."
        }
    }

    pub(crate) fn disable(&mut self) {
        self.enabled = false;
    }

    pub(crate) fn enable(&mut self) {
        self.enabled = true;
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Display {
    pub content: Content,
    pub trigger: Trigger,
    pub background: Option<String>,
    pub visibility: Visibility,
}

impl Default for Display {
    fn default() -> Self {
        Self {
            content: Content::Empty,
            trigger: Trigger::default(),
            background: None,
            visibility: Visibility::Visible,
        }
    }
}

impl Display {
    /// Whether the advance control is offered.
    pub fn advance_armed(&self) -> bool {
        matches!(self.content, Content::Report { count, .. } if count > 1)
    }

    pub(crate) fn clear(&mut self) {
        self.content = Content::Empty;
        self.background = None;
        self.visibility = Visibility::Visible;
    }

    pub(crate) fn show_error(&mut self, kind: ErrorKind, title: &str, message: String) {
        self.clear();
        self.content = Content::Error {
            kind,
            title: title.to_string(),
            message,
        };
    }
}
