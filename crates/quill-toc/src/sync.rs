//! Scroll position to active TOC entry.

use crate::hierarchy::{Hierarchy, NodeId};
use crate::nav::TocNav;
use crate::surface::{NavPanel, PageSurface};

/// Outcome of one synchronization pass.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SyncReport {
    /// Visible headings, in scan (reverse document) order.
    pub active: Vec<NodeId>,
    /// Last visible heading evaluated, i.e. the first visible one in the document.
    pub current: Option<NodeId>,
    /// Panel scroll offset applied, if a link was out of view.
    pub scroll_to: Option<f64>,
}

/// Returns `true` if a heading at `top` counts as on screen.
///
/// A heading scrolled above the viewport still counts while its section,
/// `distance` long, reaches more than `margin` into the viewport.
#[must_use]
pub fn is_visible(top: f64, distance: f64, viewport_height: f64, margin: f64) -> bool {
    let top = if top < 0.0 { top + distance - margin } else { top };
    (0.0..=viewport_height).contains(&top)
}

/// Recompute the active set of `nav` and the panel scroll target.
///
/// Headings are scanned in reverse document order. The scroll target is the
/// one computed last, and is only set when a matched link is outside the
/// panel's visible region.
pub(crate) fn scan<S: PageSurface>(
    hierarchy: &Hierarchy,
    flat: &[NodeId],
    nav: &mut TocNav,
    surface: &S,
    panel: &S::Panel,
    margin: f64,
) -> SyncReport {
    nav.clear_active();

    let viewport = surface.viewport_height();
    let panel_rect = panel.rect();
    let mut report = SyncReport::default();

    for &id in flat.iter().rev() {
        let Some(node) = hierarchy.get(id) else {
            continue;
        };
        let Some(rect) = surface.heading_rect(node.key) else {
            continue;
        };
        if !is_visible(rect.top, node.distance, viewport, margin) {
            continue;
        }

        nav.activate(id);
        report.active.push(id);
        report.current = Some(id);

        if let Some(link) = panel.link_rect(id)
            && !panel_rect.contains(link)
        {
            report.scroll_to = Some(panel.scroll_top() + link.top - panel_rect.top - margin);
        }
    }

    report
}
