//! TOC navigation model.
//!
//! Mirrors the rendered list structure: every heading node owns one item and
//! one link, every node with children owns a nested list. Back-references
//! (node to containing list, list to owning item) live in side-tables so the
//! active state can be propagated upwards without a DOM.

use std::collections::BTreeSet;
use std::fmt::Write;

use quill_renderer::escape_html;

use crate::hierarchy::{Hierarchy, NodeId};

/// Index of a list; the root list is always `ListId(0)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ListId(pub usize);

/// Something that can carry the `active` class.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Mark {
    List(ListId),
    Item(NodeId),
    Link(NodeId),
}

#[derive(Clone, Debug, PartialEq, Eq)]
struct NavList {
    items: Vec<NodeId>,
    /// Item the list is nested in; `None` for the root.
    owner: Option<NodeId>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
struct NavEntry {
    text: String,
    href: String,
    /// List the item sits in.
    parent: ListId,
    /// List nested inside the item.
    child: Option<ListId>,
}

/// Nested TOC lists with active-state tracking.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TocNav {
    lists: Vec<NavList>,
    entries: Vec<NavEntry>,
    active: BTreeSet<Mark>,
}

impl TocNav {
    /// The root list.
    pub const ROOT: ListId = ListId(0);

    /// Build lists, items and links for `hierarchy`.
    #[must_use]
    pub fn build(hierarchy: &Hierarchy) -> Self {
        let mut nav = Self {
            lists: Vec::new(),
            entries: Vec::with_capacity(hierarchy.len()),
            active: BTreeSet::new(),
        };
        for index in 0..hierarchy.len() {
            let node = hierarchy.get(NodeId(index));
            nav.entries.push(NavEntry {
                text: node.map(|n| n.text.clone()).unwrap_or_default(),
                href: node.map(|n| format!("#{}", n.id)).unwrap_or_default(),
                parent: Self::ROOT,
                child: None,
            });
        }
        nav.add_list(hierarchy, hierarchy.roots(), None);
        nav
    }

    fn add_list(&mut self, hierarchy: &Hierarchy, items: &[NodeId], owner: Option<NodeId>) -> ListId {
        let list = ListId(self.lists.len());
        self.lists.push(NavList {
            items: items.to_vec(),
            owner,
        });

        for &item in items {
            self.entries[item.0].parent = list;
            if let Some(node) = hierarchy.get(item)
                && !node.children.is_empty()
            {
                let child = self.add_list(hierarchy, &node.children, Some(item));
                self.entries[item.0].child = Some(child);
            }
        }
        list
    }

    /// Number of items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// List containing the item of `node`.
    #[must_use]
    pub fn parent_list(&self, node: NodeId) -> Option<ListId> {
        self.entries.get(node.0).map(|entry| entry.parent)
    }

    /// Item owning `list`; `None` for the root.
    #[must_use]
    pub fn owner(&self, list: ListId) -> Option<NodeId> {
        self.lists.get(list.0).and_then(|l| l.owner)
    }

    #[must_use]
    pub fn items(&self, list: ListId) -> &[NodeId] {
        self.lists
            .get(list.0)
            .map(|l| l.items.as_slice())
            .unwrap_or_default()
    }

    /// Link target of `node`, e.g. `#setup`.
    #[must_use]
    pub fn href(&self, node: NodeId) -> Option<&str> {
        self.entries.get(node.0).map(|entry| entry.href.as_str())
    }

    /// Mark `node` active along with every list and item above it.
    pub fn activate(&mut self, node: NodeId) {
        let Some(mut list) = self.parent_list(node) else {
            return;
        };
        self.active.insert(Mark::Link(node));
        self.active.insert(Mark::Item(node));

        loop {
            self.active.insert(Mark::List(list));
            let Some(owner) = self.owner(list) else {
                break;
            };
            self.active.insert(Mark::Item(owner));
            self.active.insert(Mark::Link(owner));
            match self.parent_list(owner) {
                Some(parent) => list = parent,
                None => break,
            }
        }
    }

    pub fn clear_active(&mut self) {
        self.active.clear();
    }

    #[must_use]
    pub fn is_active(&self, mark: Mark) -> bool {
        self.active.contains(&mark)
    }

    /// Active marks in a stable order.
    pub fn active(&self) -> impl Iterator<Item = Mark> + '_ {
        self.active.iter().copied()
    }

    /// Render the lists as HTML, including current active classes.
    #[must_use]
    pub fn render_html(&self) -> String {
        let mut html = String::new();
        if !self.is_empty() {
            self.render_list(Self::ROOT, &mut html);
        }
        html
    }

    fn render_list(&self, list: ListId, html: &mut String) {
        let mut classes = vec!["toc"];
        if list == Self::ROOT {
            classes.push("top");
        }
        if self.is_active(Mark::List(list)) {
            classes.push("active");
        }
        let _ = write!(html, r#"<ul class="{}">"#, classes.join(" "));

        for &node in self.items(list) {
            let entry = &self.entries[node.0];

            let mut item_classes = Vec::new();
            if entry.child.is_some() {
                item_classes.push("has-children");
            }
            if self.is_active(Mark::Item(node)) {
                item_classes.push("active");
            }
            if item_classes.is_empty() {
                html.push_str("<li>");
            } else {
                let _ = write!(html, r#"<li class="{}">"#, item_classes.join(" "));
            }

            let link_class = if self.is_active(Mark::Link(node)) {
                r#" class="active""#
            } else {
                ""
            };
            let _ = write!(
                html,
                r#"<a href="{}"{link_class}>{}</a>"#,
                escape_html(&entry.href),
                escape_html(&entry.text)
            );

            if let Some(child) = entry.child {
                self.render_list(child, html);
            }
            html.push_str("</li>");
        }
        html.push_str("</ul>");
    }
}
