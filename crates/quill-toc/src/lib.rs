//! Table of contents for rendered Quill pages.
//!
//! - [`Hierarchy`]: nests page headings by level and measures how far each
//!   heading's section extends
//! - [`TocNav`]: the nested list model with active-state propagation and
//!   HTML output
//! - [`sync`]: decides which entries are active for the current scroll
//!   position
//! - [`TocController`]: binds all of the above to a [`PageSurface`]
//!
//! Page access goes through the [`PageSurface`] and [`NavPanel`] traits, so
//! everything here runs against any host able to report element geometry.

mod controller;
mod debounce;
mod hierarchy;
mod nav;
mod surface;
pub mod sync;

pub use controller::{CLICK_GAP, ClickTarget, TocConfig, TocController};
pub use debounce::Debouncer;
pub use hierarchy::{FlattenMemo, HeadingNode, Hierarchy, NodeId};
pub use nav::{ListId, Mark, TocNav};
pub use surface::{HeadingElement, HeadingKey, NavPanel, PageSurface, Rect};
pub use sync::{SyncReport, is_visible};
