//! Heading tree construction and spacing.

use std::sync::Arc;
use std::time::Duration;

use quill_cache::{CachePolicy, Clock, SystemClock, TtlCache};

use crate::surface::{HeadingElement, HeadingKey, Rect};

/// Index of a node in a [`Hierarchy`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(pub usize);

/// One heading in the tree.
#[derive(Clone, Debug, PartialEq)]
pub struct HeadingNode {
    pub key: HeadingKey,
    pub level: u8,
    pub text: String,
    pub id: String,
    /// Scroll distance covered by this heading's section.
    pub distance: f64,
    pub children: Vec<NodeId>,
}

/// Headings nested by level.
///
/// Nodes are stored in document order, so a node's [`NodeId`] is also its
/// position in the depth-first flattening.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Hierarchy {
    nodes: Vec<HeadingNode>,
    roots: Vec<NodeId>,
}

impl Hierarchy {
    /// Nest `headings` by level, skipping opted-out ones.
    ///
    /// A heading becomes a child of the nearest preceding heading with a
    /// strictly lower level, or a root if there is none.
    #[must_use]
    pub fn build(headings: &[HeadingElement]) -> Self {
        let mut hierarchy = Self::default();
        let mut stack: Vec<(u8, NodeId)> = Vec::new();

        for heading in headings {
            if heading.is_omitted() {
                tracing::debug!(id = %heading.id, "Heading omitted from TOC");
                continue;
            }

            while stack.last().is_some_and(|&(level, _)| level >= heading.level) {
                stack.pop();
            }

            let node = NodeId(hierarchy.nodes.len());
            hierarchy.nodes.push(HeadingNode {
                key: heading.key,
                level: heading.level,
                text: heading.text.trim().to_owned(),
                id: heading.id.clone(),
                distance: 0.0,
                children: Vec::new(),
            });

            match stack.last() {
                Some(&(_, parent)) => hierarchy.nodes[parent.0].children.push(node),
                None => hierarchy.roots.push(node),
            }
            stack.push((heading.level, node));
        }

        hierarchy
    }

    #[must_use]
    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    #[must_use]
    pub fn get(&self, id: NodeId) -> Option<&HeadingNode> {
        self.nodes.get(id.0)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Depth-first, pre-order list of all nodes.
    #[must_use]
    pub fn flatten(&self) -> Vec<NodeId> {
        let mut out = Vec::with_capacity(self.nodes.len());
        let mut stack: Vec<NodeId> = self.roots.iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            out.push(id);
            stack.extend(self.nodes[id.0].children.iter().rev().copied());
        }
        out
    }

    /// Comma-joined identities of all headings. A heading without an id is
    /// identified by its element key.
    #[must_use]
    pub fn identity(&self) -> String {
        self.nodes
            .iter()
            .map(|node| {
                if node.id.is_empty() {
                    format!("#{}", node.key.0)
                } else {
                    node.id.clone()
                }
            })
            .collect::<Vec<_>>()
            .join(",")
    }

    /// Compute each node's scroll distance.
    ///
    /// A node's distance is the gap to the next node's top, never negative.
    /// The last node extends from its bottom to `scroll_height`.
    pub fn measure(
        &mut self,
        flat: &[NodeId],
        rect: impl Fn(HeadingKey) -> Option<Rect>,
        scroll_height: f64,
    ) {
        let rects: Vec<Rect> = flat
            .iter()
            .map(|id| rect(self.nodes[id.0].key).unwrap_or_default())
            .collect();

        for (index, id) in flat.iter().enumerate() {
            let current = rects[index];
            self.nodes[id.0].distance = match rects.get(index + 1) {
                Some(next) => (next.top - current.top).max(0.0),
                None => scroll_height - current.bottom,
            };
        }
    }
}

/// Memoized flattening keyed by [`Hierarchy::identity`].
pub struct FlattenMemo {
    cache: TtlCache<String, Vec<NodeId>>,
    misses: usize,
}

impl FlattenMemo {
    /// Entry lifetime.
    pub const TTL: Duration = Duration::from_secs(5 * 60);

    /// Entry bound.
    pub const MAX_ENTRIES: usize = 1000;

    #[must_use]
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    #[must_use]
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        let policy = CachePolicy::new(Self::TTL, Self::MAX_ENTRIES);
        Self {
            cache: TtlCache::with_clock(policy, clock),
            misses: 0,
        }
    }

    /// Flattening of `hierarchy`, computed at most once per identity and TTL.
    pub fn flatten(&mut self, hierarchy: &Hierarchy) -> Vec<NodeId> {
        let key = hierarchy.identity();
        if let Some(flat) = self.cache.get(&key) {
            return flat.clone();
        }

        self.misses += 1;
        let flat = hierarchy.flatten();
        self.cache.put(key, flat.clone());
        flat
    }

    /// Number of flattenings computed.
    #[must_use]
    pub fn misses(&self) -> usize {
        self.misses
    }
}

impl Default for FlattenMemo {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for FlattenMemo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FlattenMemo")
            .field("entries", &self.cache.len())
            .field("misses", &self.misses)
            .finish()
    }
}
