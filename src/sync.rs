//! Cross-view synchronization of selection and hover.
//!
//! Every user-originated change carries a [`SyncToken`]. A view that receives
//! a token it already processed skips the state update and the re-broadcast,
//! so propagation terminates in any link graph (cycles and diamonds included).
//! Tokens are passed by value and never mutated.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::data::points::PointId;
use crate::data::selection::GroupLookup;

static NEXT_TOKEN: AtomicU64 = AtomicU64::new(1);

/// Identifies one logical user event across a chain of linked views.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SyncToken(u64);

impl SyncToken {
    /// A token never handed out before in this process.
    pub fn fresh() -> Self {
        Self(NEXT_TOKEN.fetch_add(1, Ordering::Relaxed))
    }

    pub fn value(self) -> u64 {
        self.0
    }

    /// Use `token` if given, otherwise a fresh one.
    pub fn or_fresh(token: Option<SyncToken>) -> Self {
        token.unwrap_or_else(Self::fresh)
    }
}

impl std::fmt::Display for SyncToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// What a hover broadcast asks the receiving view to show.
#[derive(Debug, Clone, PartialEq)]
pub enum HoverTarget {
    /// Highlight the points carrying these ids; empty clears the hover.
    Ids(Vec<PointId>),
    /// Highlight every point whose group is `key`; `None` clears fading.
    Group {
        key: Option<String>,
        groups: Arc<GroupLookup>,
    },
}

impl HoverTarget {
    pub fn clear() -> Self {
        HoverTarget::Ids(Vec::new())
    }

    pub fn is_clear(&self) -> bool {
        match self {
            HoverTarget::Ids(ids) => ids.is_empty(),
            HoverTarget::Group { key, .. } => key.is_none(),
        }
    }
}

/// A view that can be notified by another view's selection or hover.
///
/// Implementations must tolerate being called re-entrantly from inside their
/// own broadcast (a cycle leads back to the originator with the same token).
pub trait LinkedView: Send + Sync {
    /// Toggle `id` in this view's selection.
    fn linked_select(&self, id: &PointId, token: SyncToken);

    /// Replace this view's hover.
    fn linked_hover(&self, target: &HoverTarget, token: SyncToken);
}

/// Ordered, append-only list of views to notify.
#[derive(Clone, Default)]
pub struct LinkSet {
    views: Vec<Arc<dyn LinkedView>>,
}

impl LinkSet {
    pub fn push(&mut self, view: Arc<dyn LinkedView>) {
        self.views.push(view);
    }

    pub fn len(&self) -> usize {
        self.views.len()
    }

    pub fn is_empty(&self) -> bool {
        self.views.is_empty()
    }

    /// Snapshot for fan-out after the caller released its own lock.
    pub fn snapshot(&self) -> Vec<Arc<dyn LinkedView>> {
        self.views.clone()
    }
}

impl std::fmt::Debug for LinkSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LinkSet").field("len", &self.views.len()).finish()
    }
}

/// Outcome of presenting a token to a view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenCheck {
    /// First arrival: update state, then broadcast.
    Fresh,
    /// Seen before: local visuals only.
    Duplicate,
}

/// The last token a view processed.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokenGate {
    last: Option<SyncToken>,
}

impl TokenGate {
    /// Record `token` and report whether it was new. The gate is updated
    /// before the caller recurses into its links.
    pub fn admit(&mut self, token: SyncToken) -> TokenCheck {
        if self.last == Some(token) {
            TokenCheck::Duplicate
        } else {
            self.last = Some(token);
            TokenCheck::Fresh
        }
    }

    pub fn last(&self) -> Option<SyncToken> {
        self.last
    }
}
