//! Binds the TOC to a page and keeps it in step with scrolling.

use std::sync::Arc;
use std::time::{Duration, Instant};

use quill_cache::{Clock, SystemClock};

use crate::debounce::Debouncer;
use crate::hierarchy::{FlattenMemo, Hierarchy, NodeId};
use crate::nav::TocNav;
use crate::surface::{NavPanel, PageSurface};
use crate::sync::{self, SyncReport};

/// Gap kept between the page header and a heading scrolled to by a click.
pub const CLICK_GAP: f64 = 25.0;

/// Controller settings.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TocConfig {
    /// Quiet period after the last scroll event before syncing.
    pub debounce: Duration,
    /// Visibility slack for headings above the viewport, and the offset of
    /// a link from the panel top after the panel scrolls.
    pub scroll_margin: f64,
}

impl Default for TocConfig {
    fn default() -> Self {
        Self {
            debounce: Duration::from_millis(200),
            scroll_margin: 100.0,
        }
    }
}

/// Where a click on a TOC link should take the page.
#[derive(Clone, Debug, PartialEq)]
pub struct ClickTarget {
    /// Page scroll offset.
    pub top: f64,
    /// Fragment to push to history, when the heading has an id.
    pub hash: Option<String>,
}

/// Per-page TOC state.
#[derive(Debug)]
pub struct TocController {
    config: TocConfig,
    header_height: f64,
    hierarchy: Hierarchy,
    nav: TocNav,
    memo: FlattenMemo,
    debouncer: Debouncer,
}

impl TocController {
    /// Build the TOC for `surface` and run an initial sync.
    ///
    /// Returns `None`, after logging a warning, if the page lacks a header,
    /// main region, side navigation or headings.
    pub fn bind<S: PageSurface>(surface: &mut S, config: TocConfig) -> Option<Self> {
        Self::bind_with_clock(surface, config, Arc::new(SystemClock))
    }

    /// Like [`bind`](Self::bind), with the flattening memo reading `clock`.
    pub fn bind_with_clock<S: PageSurface>(
        surface: &mut S,
        config: TocConfig,
        clock: Arc<dyn Clock>,
    ) -> Option<Self> {
        let mut controller = Self {
            config,
            header_height: 0.0,
            hierarchy: Hierarchy::default(),
            nav: TocNav::build(&Hierarchy::default()),
            memo: FlattenMemo::with_clock(clock),
            debouncer: Debouncer::new(config.debounce),
        };
        controller.regenerate(surface)?;
        Some(controller)
    }

    /// Discard the current TOC and build a new one from the page.
    pub fn regenerate<S: PageSurface>(&mut self, surface: &mut S) -> Option<SyncReport> {
        if let Some(panel) = surface.side_nav_mut() {
            panel.unmount();
        }
        self.hierarchy = Hierarchy::default();
        self.nav = TocNav::build(&self.hierarchy);
        self.debouncer.cancel();

        let (Some(header), Some(headings), true) = (
            surface.header(),
            surface.main_headings(),
            surface.side_nav().is_some(),
        ) else {
            tracing::warn!("TOC: could not find required elements");
            return None;
        };
        if headings.is_empty() {
            tracing::warn!("TOC: no headings found");
            return None;
        }

        self.header_height = header.height();

        let mut hierarchy = Hierarchy::build(&headings);
        let flat = self.memo.flatten(&hierarchy);
        hierarchy.measure(&flat, |key| surface.heading_rect(key), surface.scroll_height());
        self.nav = TocNav::build(&hierarchy);
        self.hierarchy = hierarchy;

        if let Some(panel) = surface.side_nav_mut() {
            panel.mount(&self.nav);
        }
        tracing::debug!(headings = self.hierarchy.len(), "TOC bound");

        self.sync(surface)
    }

    /// Record a scroll event at `now`.
    pub fn on_scroll(&mut self, now: Instant) {
        self.debouncer.schedule(now);
    }

    /// Sync if the debounce period after the last scroll has elapsed.
    pub fn poll<S: PageSurface>(&mut self, surface: &mut S, now: Instant) -> Option<SyncReport> {
        if !self.debouncer.poll(now) {
            return None;
        }
        self.sync(surface)
    }

    /// Re-read the header height and heading offsets after the layout
    /// changed, then sync. The hierarchy and panel are kept.
    pub fn on_resize<S: PageSurface>(&mut self, surface: &mut S) -> Option<SyncReport> {
        if let Some(header) = surface.header() {
            self.header_height = header.height();
        }
        let flat = self.memo.flatten(&self.hierarchy);
        self.hierarchy
            .measure(&flat, |key| surface.heading_rect(key), surface.scroll_height());
        tracing::debug!(header_height = self.header_height, "TOC re-measured");
        self.sync(surface)
    }

    /// Update active marks from the current scroll position and scroll the
    /// panel if the current link is out of view.
    pub fn sync<S: PageSurface>(&mut self, surface: &mut S) -> Option<SyncReport> {
        let flat = self.memo.flatten(&self.hierarchy);
        let report = {
            let Some(panel) = surface.side_nav() else {
                tracing::warn!("TOC: side navigation is gone");
                return None;
            };
            sync::scan(
                &self.hierarchy,
                &flat,
                &mut self.nav,
                &*surface,
                panel,
                self.config.scroll_margin,
            )
        };

        if let Some(panel) = surface.side_nav_mut() {
            panel.refresh(&self.nav);
            if let Some(top) = report.scroll_to {
                panel.scroll_to(top);
            }
        }
        Some(report)
    }

    /// Scroll target for a click on the link of `node`.
    #[must_use]
    pub fn click_target<S: PageSurface>(&self, surface: &S, node: NodeId) -> Option<ClickTarget> {
        let heading = self.hierarchy.get(node)?;
        let rect = surface.heading_rect(heading.key)?;
        Some(ClickTarget {
            top: surface.scroll_y() + rect.top - (self.header_height + CLICK_GAP),
            hash: (!heading.id.is_empty()).then(|| format!("#{}", heading.id)),
        })
    }

    #[must_use]
    pub fn hierarchy(&self) -> &Hierarchy {
        &self.hierarchy
    }

    #[must_use]
    pub fn nav(&self) -> &TocNav {
        &self.nav
    }

    #[must_use]
    pub fn header_height(&self) -> f64 {
        self.header_height
    }
}
