//! Page geometry seams.
//!
//! The TOC logic never touches a document directly. It reads headings and
//! measurements through [`PageSurface`] and drives the side navigation
//! through [`NavPanel`].

use crate::hierarchy::NodeId;
use crate::nav::TocNav;

/// Vertical extent of an element, relative to the viewport.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Rect {
    pub top: f64,
    pub bottom: f64,
}

impl Rect {
    #[must_use]
    pub fn new(top: f64, bottom: f64) -> Self {
        Self { top, bottom }
    }

    #[must_use]
    pub fn height(&self) -> f64 {
        self.bottom - self.top
    }

    /// Returns `true` if `other` lies entirely inside `self`.
    #[must_use]
    pub fn contains(&self, other: Rect) -> bool {
        other.top >= self.top && other.bottom <= self.bottom
    }
}

/// Opaque handle of a heading element on a page.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct HeadingKey(pub usize);

/// A heading element of the main content region.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HeadingElement {
    pub key: HeadingKey,
    /// Level 2 to 6.
    pub level: u8,
    /// Text content.
    pub text: String,
    /// Element id; may be empty.
    pub id: String,
    /// Raw inner markup.
    pub inner_html: String,
    /// Carries the `omit-toc` attribute.
    pub omit_attr: bool,
}

impl HeadingElement {
    /// Returns `true` if the author opted this heading out of the TOC.
    #[must_use]
    pub fn is_omitted(&self) -> bool {
        self.omit_attr
            || self.inner_html.contains("omit-toc")
            || self.inner_html.contains("omit-from-toc")
    }
}

/// Read access to a rendered page.
pub trait PageSurface {
    type Panel: NavPanel;

    /// Bounds of the page header, or `None` if the page has none.
    fn header(&self) -> Option<Rect>;

    /// Level 2-6 headings of the main region in document order, or `None`
    /// if there is no main region.
    fn main_headings(&self) -> Option<Vec<HeadingElement>>;

    fn side_nav(&self) -> Option<&Self::Panel>;

    fn side_nav_mut(&mut self) -> Option<&mut Self::Panel>;

    /// Current bounds of a heading.
    fn heading_rect(&self, key: HeadingKey) -> Option<Rect>;

    /// Current vertical scroll offset of the page.
    fn scroll_y(&self) -> f64;

    /// Total scrollable height of the page.
    fn scroll_height(&self) -> f64;

    fn viewport_height(&self) -> f64;
}

/// The side navigation container holding the TOC.
pub trait NavPanel {
    /// Visible region of the panel.
    fn rect(&self) -> Rect;

    /// Current bounds of the link for `node`, if mounted.
    fn link_rect(&self, node: NodeId) -> Option<Rect>;

    fn scroll_top(&self) -> f64;

    /// Smooth-scroll the panel content to `top`.
    fn scroll_to(&mut self, top: f64);

    /// Insert the TOC, replacing any previous one.
    fn mount(&mut self, nav: &TocNav);

    /// Apply the current active marks of `nav` to the mounted TOC.
    fn refresh(&mut self, nav: &TocNav);

    /// Remove a mounted TOC.
    fn unmount(&mut self);
}
