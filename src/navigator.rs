use std::time::{Duration, Instant};

use tracing::trace;

use crate::config::{PagingMode, ReportConfig, Transition};
use crate::display::{Content, Display, Visibility};
use crate::models::PageFragment;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavigationState {
    pub current_index: usize,
    pub page_count: usize,
}

#[derive(Debug, Clone, Copy)]
struct PendingSwap {
    started: Instant,
    swapped: bool,
}

/// Owns the current page of a rendered report and cycles through it.
///
/// A navigator lives for one render cycle: the controller builds a fresh one
/// from each successful response and drops it when a new submission starts.
#[derive(Debug)]
pub struct PageNavigator {
    state: NavigationState,
    fragments: Vec<PageFragment>,
    paging_mode: PagingMode,
    transition: Transition,
    fade: Duration,
    backgrounds: Vec<String>,
    pending: Option<PendingSwap>,
}

impl PageNavigator {
    /// Take ownership of the fragments and show page 0 immediately.
    pub fn initialize(
        fragments: Vec<PageFragment>,
        config: &ReportConfig,
        display: &mut Display,
    ) -> Self {
        let page_count = match (config.paging_mode, fragments.is_empty()) {
            (_, true) => 0,
            (PagingMode::Single, false) => 1,
            (PagingMode::Carousel, false) => fragments.len(),
        };
        let navigator = Self {
            state: NavigationState {
                current_index: 0,
                page_count,
            },
            fragments,
            paging_mode: config.paging_mode,
            transition: config.transition,
            fade: config.fade_duration(),
            backgrounds: config.backgrounds.clone(),
            pending: None,
        };
        display.visibility = Visibility::Visible;
        display.background = navigator.background();
        navigator.show_current(display);
        navigator
    }

    pub fn state(&self) -> NavigationState {
        self.state
    }

    pub fn is_transitioning(&self) -> bool {
        self.pending.is_some()
    }

    /// Fragments on the current page.
    pub fn current_page(&self) -> &[PageFragment] {
        if self.state.page_count == 0 {
            return &[];
        }
        match self.paging_mode {
            PagingMode::Single => &self.fragments,
            PagingMode::Carousel => std::slice::from_ref(&self.fragments[self.state.current_index]),
        }
    }

    /// Move to the next page, wrapping to the first after the last.
    ///
    /// With the fade transition the background changes at once and the content
    /// swap waits for [`tick`](Self::tick) to report the fade-out as finished.
    /// A single page has nowhere to go, so it neither swaps nor fades.
    pub fn advance(&mut self, display: &mut Display, now: Instant) {
        if self.state.page_count <= 1 {
            return;
        }
        if self.pending.is_some() {
            self.finish_transition(display);
        }

        self.state.current_index = (self.state.current_index + 1) % self.state.page_count;
        trace!(
            index = self.state.current_index,
            count = self.state.page_count,
            "advance"
        );

        match self.transition {
            Transition::None => self.show_current(display),
            Transition::Fade => {
                display.visibility = Visibility::FadingOut;
                display.background = self.background();
                self.pending = Some(PendingSwap {
                    started: now,
                    swapped: false,
                });
            }
        }
    }

    /// Drive a running fade. Returns true when the display changed.
    pub fn tick(&mut self, display: &mut Display, now: Instant) -> bool {
        let Some(mut pending) = self.pending else {
            return false;
        };
        let elapsed = now.saturating_duration_since(pending.started);
        let mut changed = false;

        if !pending.swapped && elapsed >= self.fade {
            self.show_current(display);
            display.visibility = Visibility::FadingIn;
            pending.swapped = true;
            changed = true;
        }
        if pending.swapped && elapsed >= self.fade * 2 {
            display.visibility = Visibility::Visible;
            self.pending = None;
            return true;
        }

        self.pending = Some(pending);
        changed
    }

    fn finish_transition(&mut self, display: &mut Display) {
        if let Some(pending) = self.pending.take() {
            if !pending.swapped {
                self.show_current(display);
            }
            display.visibility = Visibility::Visible;
        }
    }

    fn background(&self) -> Option<String> {
        if self.backgrounds.is_empty() {
            return None;
        }
        let index = self.state.current_index % self.backgrounds.len();
        Some(self.backgrounds[index].clone())
    }

    fn show_current(&self, display: &mut Display) {
        display.content = Content::Report {
            page: self.current_page().to_vec(),
            index: self.state.current_index,
            count: self.state.page_count,
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{PageFragment, PageKind};

    fn fragments(n: usize) -> Vec<PageFragment> {
        (0..n)
            .map(|i| PageFragment {
                kind: PageKind::Summary,
                heading: format!("page {}", i),
                subtitle: None,
                items: vec![],
            })
            .collect()
    }

    fn shown_heading(display: &Display) -> String {
        match &display.content {
            Content::Report { page, .. } => page[0].heading.clone(),
            other => panic!("expected report, got {:?}", other),
        }
    }

    #[test]
    fn test_initialize_shows_first_page() {
        let mut display = Display::default();
        let nav = PageNavigator::initialize(fragments(4), &ReportConfig::default(), &mut display);
        assert_eq!(
            nav.state(),
            NavigationState {
                current_index: 0,
                page_count: 4
            }
        );
        assert_eq!(shown_heading(&display), "page 0");
        assert!(display.advance_armed());
    }

    #[test]
    fn test_advance_cycles_back_to_start() {
        let mut display = Display::default();
        let mut nav =
            PageNavigator::initialize(fragments(4), &ReportConfig::default(), &mut display);
        let initial = display.content.clone();
        let now = Instant::now();

        nav.advance(&mut display, now);
        assert_eq!(shown_heading(&display), "page 1");
        for _ in 1..4 {
            nav.advance(&mut display, now);
        }
        assert_eq!(nav.state().current_index, 0);
        assert_eq!(display.content, initial);
    }

    #[test]
    fn test_advance_without_pages_is_noop() {
        let mut display = Display::default();
        let mut nav = PageNavigator::initialize(vec![], &ReportConfig::default(), &mut display);
        nav.advance(&mut display, Instant::now());
        assert_eq!(nav.state().page_count, 0);
        assert_eq!(nav.state().current_index, 0);
        assert!(!display.advance_armed());
    }

    #[test]
    fn test_single_mode_stacks_every_fragment() {
        let config = ReportConfig {
            paging_mode: PagingMode::Single,
            ..Default::default()
        };
        let mut display = Display::default();
        let mut nav = PageNavigator::initialize(fragments(4), &config, &mut display);
        assert_eq!(nav.state().page_count, 1);
        assert_eq!(nav.current_page().len(), 4);
        assert!(!display.advance_armed());

        let before = display.content.clone();
        nav.advance(&mut display, Instant::now());
        assert_eq!(display.content, before);
    }

    #[test]
    fn test_single_page_does_not_fade() {
        let config = ReportConfig {
            paging_mode: PagingMode::Single,
            transition: Transition::Fade,
            backgrounds: vec!["a".to_string(), "b".to_string()],
            ..Default::default()
        };
        let mut display = Display::default();
        let mut nav = PageNavigator::initialize(fragments(4), &config, &mut display);
        let before = display.clone();

        nav.advance(&mut display, Instant::now());
        assert!(!nav.is_transitioning());
        assert_eq!(display.visibility, Visibility::Visible);
        assert_eq!(display, before);
        assert!(!nav.tick(&mut display, Instant::now() + config.fade_duration() * 2));
    }

    #[test]
    fn test_fade_swaps_after_fade_out() {
        let config = ReportConfig {
            transition: Transition::Fade,
            fade_ms: 300,
            backgrounds: vec!["a".to_string(), "b".to_string(), "c".to_string()],
            ..Default::default()
        };
        let mut display = Display::default();
        let mut nav = PageNavigator::initialize(fragments(4), &config, &mut display);
        assert_eq!(display.background.as_deref(), Some("a"));

        let start = Instant::now();
        nav.advance(&mut display, start);
        assert_eq!(display.visibility, Visibility::FadingOut);
        assert_eq!(display.background.as_deref(), Some("b"));
        assert_eq!(shown_heading(&display), "page 0");

        assert!(!nav.tick(&mut display, start + Duration::from_millis(299)));
        assert_eq!(shown_heading(&display), "page 0");

        assert!(nav.tick(&mut display, start + Duration::from_millis(300)));
        assert_eq!(shown_heading(&display), "page 1");
        assert_eq!(display.visibility, Visibility::FadingIn);

        assert!(nav.tick(&mut display, start + Duration::from_millis(600)));
        assert_eq!(display.visibility, Visibility::Visible);
        assert!(!nav.is_transitioning());
    }

    #[test]
    fn test_backgrounds_cycle_independently_of_pages() {
        let config = ReportConfig {
            transition: Transition::Fade,
            backgrounds: vec!["a".to_string(), "b".to_string(), "c".to_string()],
            ..Default::default()
        };
        let mut display = Display::default();
        let mut nav = PageNavigator::initialize(fragments(4), &config, &mut display);
        let now = Instant::now();

        let mut seen = vec![display.background.clone().unwrap()];
        for _ in 0..4 {
            nav.advance(&mut display, now);
            seen.push(display.background.clone().unwrap());
        }
        // Page indices 0,1,2,3,0 against three backgrounds.
        assert_eq!(seen, vec!["a", "b", "c", "a", "a"]);
    }

    #[test]
    fn test_advance_mid_fade_commits_pending_page() {
        let config = ReportConfig {
            transition: Transition::Fade,
            ..Default::default()
        };
        let mut display = Display::default();
        let mut nav = PageNavigator::initialize(fragments(4), &config, &mut display);
        let now = Instant::now();

        nav.advance(&mut display, now);
        nav.advance(&mut display, now);
        assert_eq!(shown_heading(&display), "page 1");
        assert_eq!(nav.state().current_index, 2);

        nav.tick(&mut display, now + config.fade_duration() * 2);
        assert_eq!(shown_heading(&display), "page 2");
        assert_eq!(display.visibility, Visibility::Visible);
    }
}
