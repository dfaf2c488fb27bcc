//! Observer feed for scatter views.
//!
//! Dashboard code can subscribe to what a view does via [`EventController`]
//! instead of polling it. Each event carries a set of [`EventKind`] flags
//! (bitflags-style) so that a single occurrence can match multiple categories
//! (e.g. a lasso drag that selected points is also a `SELECT`).
//!
//! The caller specifies an [`EventFilter`] to receive only the events they
//! care about. The filter is a simple OR mask: an event is delivered when
//! `(event.kinds & filter) != 0`.

use std::sync::mpsc::{Receiver, Sender};
use std::sync::{Arc, Mutex, PoisonError};

use crate::data::points::PointId;
use crate::sync::SyncToken;

// ─────────────────────────────────────────────────────────────────────────────
// EventKind – bitflags
// ─────────────────────────────────────────────────────────────────────────────

/// Bitflags describing the *categories* an event belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EventKind(pub u64);

impl EventKind {
    // ── Selection ───────────────────────────────────────────────────────
    /// A point was toggled in (or out of) the selection.
    pub const SELECT: Self = Self(1 << 0);
    /// The selection was emptied.
    pub const SELECTION_CLEARED: Self = Self(1 << 1);
    /// A value range was bulk-selected.
    pub const RANGE_SELECTED: Self = Self(1 << 2);

    // ── Hover ───────────────────────────────────────────────────────────
    /// Hovered points changed (including a clear).
    pub const HOVER: Self = Self(1 << 3);
    /// Hover driven by an external group (tree node) changed.
    pub const HOVER_GROUP: Self = Self(1 << 4);

    // ── Lasso ───────────────────────────────────────────────────────────
    pub const LASSO_ENABLED: Self = Self(1 << 5);
    pub const LASSO_DISABLED: Self = Self(1 << 6);
    /// A lasso drag finished.
    pub const LASSO_COMPLETED: Self = Self(1 << 7);

    // ── Data / view ─────────────────────────────────────────────────────
    /// `set_data` replaced the points.
    pub const DATA_LOADED: Self = Self(1 << 8);
    pub const ZOOM: Self = Self(1 << 9);
    pub const PAN: Self = Self(1 << 10);

    /// Wildcard: matches *every* event kind.
    pub const ALL: Self = Self(u64::MAX);

    /// Combine two event kinds (bitwise OR).
    #[inline]
    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    /// Check whether `self` contains all bits in `other`.
    #[inline]
    pub const fn contains(self, other: Self) -> bool {
        (self.0 & other.0) == other.0
    }

    /// Check whether `self` intersects with `other` (at least one bit in common).
    #[inline]
    pub const fn intersects(self, other: Self) -> bool {
        (self.0 & other.0) != 0
    }

    #[inline]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl std::ops::BitOr for EventKind {
    type Output = Self;
    #[inline]
    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl std::ops::BitOrAssign for EventKind {
    #[inline]
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl std::ops::BitAnd for EventKind {
    type Output = Self;
    #[inline]
    fn bitand(self, rhs: Self) -> Self {
        Self(self.0 & rhs.0)
    }
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_empty() {
            return write!(f, "EMPTY");
        }
        if *self == EventKind::ALL {
            return write!(f, "ALL");
        }

        let pairs: &[(EventKind, &str)] = &[
            (EventKind::SELECT, "SELECT"),
            (EventKind::SELECTION_CLEARED, "SELECTION_CLEARED"),
            (EventKind::RANGE_SELECTED, "RANGE_SELECTED"),
            (EventKind::HOVER, "HOVER"),
            (EventKind::HOVER_GROUP, "HOVER_GROUP"),
            (EventKind::LASSO_ENABLED, "LASSO_ENABLED"),
            (EventKind::LASSO_DISABLED, "LASSO_DISABLED"),
            (EventKind::LASSO_COMPLETED, "LASSO_COMPLETED"),
            (EventKind::DATA_LOADED, "DATA_LOADED"),
            (EventKind::ZOOM, "ZOOM"),
            (EventKind::PAN, "PAN"),
        ];

        let mut names = Vec::new();
        let mut known_bits: u64 = 0;
        for (kind, name) in pairs {
            known_bits |= kind.0;
            if self.contains(*kind) {
                names.push((*name).to_string());
            }
        }
        let extra = self.0 & !known_bits;
        if extra != 0 {
            names.push(format!("0x{:x}", extra));
        }
        write!(f, "{}", names.join("|"))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Metadata
// ─────────────────────────────────────────────────────────────────────────────

/// Visible data ranges after a zoom or pan.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewChangeMeta {
    pub x_range: (f64, f64),
    pub y_range: (f64, f64),
    /// Zoom factor after the change.
    pub k: f64,
}

/// Summary of a data load.
#[derive(Debug, Clone, PartialEq)]
pub struct DataLoadMeta {
    pub point_count: usize,
    pub tree_nodes: usize,
    pub tree_edges: usize,
    pub categorical: bool,
    pub radius: f64,
}

// ─────────────────────────────────────────────────────────────────────────────
// ScatterEvent
// ─────────────────────────────────────────────────────────────────────────────

/// An event emitted by a scatter view.
#[derive(Debug, Clone)]
pub struct ScatterEvent {
    pub kinds: EventKind,
    /// Seconds since the controller was created.
    pub timestamp: f64,
    /// Token of the sync chain this event belongs to, if any.
    pub token: Option<SyncToken>,
    /// Ids affected by the event (toggled, range-matched, lasso-enclosed,
    /// hovered).
    pub ids: Vec<PointId>,
    /// Hovered group key for `HOVER_GROUP`.
    pub group: Option<String>,
    pub view_change: Option<ViewChangeMeta>,
    pub data_load: Option<DataLoadMeta>,
}

impl ScatterEvent {
    pub fn new(kinds: EventKind) -> Self {
        Self {
            kinds,
            timestamp: 0.0, // set by the controller
            token: None,
            ids: Vec::new(),
            group: None,
            view_change: None,
            data_load: None,
        }
    }

    pub fn with_token(mut self, token: SyncToken) -> Self {
        self.token = Some(token);
        self
    }

    pub fn with_ids(mut self, ids: Vec<PointId>) -> Self {
        self.ids = ids;
        self
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// EventFilter
// ─────────────────────────────────────────────────────────────────────────────

/// Which event categories a subscriber receives.
#[derive(Debug, Clone, Copy)]
pub struct EventFilter {
    pub mask: EventKind,
}

impl EventFilter {
    pub const fn all() -> Self {
        Self {
            mask: EventKind::ALL,
        }
    }

    pub const fn only(mask: EventKind) -> Self {
        Self { mask }
    }

    #[inline]
    pub fn matches(&self, event: &ScatterEvent) -> bool {
        event.kinds.intersects(self.mask)
    }
}

impl Default for EventFilter {
    fn default() -> Self {
        Self::all()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// EventController
// ─────────────────────────────────────────────────────────────────────────────

struct Subscriber {
    filter: EventFilter,
    sender: Sender<ScatterEvent>,
}

/// Collects and distributes view events to subscribers.
#[derive(Clone)]
pub struct EventController {
    inner: Arc<Mutex<EventCtrlInner>>,
}

struct EventCtrlInner {
    subscribers: Vec<Subscriber>,
    start_instant: std::time::Instant,
}

impl EventController {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(EventCtrlInner {
                subscribers: Vec::new(),
                start_instant: std::time::Instant::now(),
            })),
        }
    }

    /// Subscribe to events matching the given filter.
    pub fn subscribe(&self, filter: EventFilter) -> Receiver<ScatterEvent> {
        let (tx, rx) = std::sync::mpsc::channel();
        let mut inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        inner.subscribers.push(Subscriber { filter, sender: tx });
        rx
    }

    pub fn subscribe_all(&self) -> Receiver<ScatterEvent> {
        self.subscribe(EventFilter::all())
    }

    /// Emit to every matching subscriber. Subscribers whose receiver was
    /// dropped are pruned when an event next matches them.
    pub fn emit(&self, mut event: ScatterEvent) {
        let mut inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        event.timestamp = inner.start_instant.elapsed().as_secs_f64();
        inner.subscribers.retain(|sub| {
            if sub.filter.matches(&event) {
                sub.sender.send(event.clone()).is_ok()
            } else {
                true
            }
        });
    }

    pub fn subscriber_count(&self) -> usize {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .subscribers
            .len()
    }
}

impl Default for EventController {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for EventController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventController")
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Unit tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_kind_union_and_intersection() {
        let combined = EventKind::SELECT | EventKind::LASSO_COMPLETED;
        assert!(combined.contains(EventKind::SELECT));
        assert!(combined.contains(EventKind::LASSO_COMPLETED));
        assert!(!EventKind::ZOOM.intersects(combined));
        assert_eq!(EventKind::ZOOM.union(EventKind::PAN), EventKind::ZOOM | EventKind::PAN);
    }

    #[test]
    fn event_filter_matches() {
        let filter = EventFilter::only(EventKind::SELECT | EventKind::RANGE_SELECTED);
        assert!(filter.matches(&ScatterEvent::new(EventKind::SELECT)));
        assert!(!filter.matches(&ScatterEvent::new(EventKind::HOVER)));
        assert!(filter.matches(&ScatterEvent::new(EventKind::SELECT | EventKind::LASSO_COMPLETED)));
        assert!(EventFilter::all().matches(&ScatterEvent::new(EventKind::DATA_LOADED)));
    }

    #[test]
    fn controller_routes_by_filter() {
        let ctrl = EventController::new();
        let rx_all = ctrl.subscribe_all();
        let rx_select = ctrl.subscribe(EventFilter::only(EventKind::SELECT));
        let rx_zoom = ctrl.subscribe(EventFilter::only(EventKind::ZOOM));

        let token = SyncToken::fresh();
        ctrl.emit(
            ScatterEvent::new(EventKind::SELECT)
                .with_token(token)
                .with_ids(vec!["a".into()]),
        );

        assert!(rx_all.try_recv().is_ok());
        let evt = rx_select.try_recv().unwrap();
        assert_eq!(evt.token, Some(token));
        assert_eq!(evt.ids, vec![PointId::from("a")]);
        assert!(rx_zoom.try_recv().is_err());
    }

    #[test]
    fn timestamp_set_on_emit() {
        let ctrl = EventController::new();
        let rx = ctrl.subscribe_all();
        std::thread::sleep(std::time::Duration::from_millis(10));
        ctrl.emit(ScatterEvent::new(EventKind::PAN));
        assert!(rx.try_recv().unwrap().timestamp > 0.0);
    }

    #[test]
    fn event_kind_display() {
        assert_eq!(format!("{}", EventKind::SELECT), "SELECT");
        let combo = EventKind::SELECT | EventKind::LASSO_COMPLETED;
        assert_eq!(format!("{}", combo), "SELECT|LASSO_COMPLETED");
        assert_eq!(format!("{}", EventKind::ALL), "ALL");
        assert_eq!(format!("{}", EventKind(0)), "EMPTY");
        assert!(format!("{}", EventKind(1 << 63)).starts_with("0x"));
    }

    #[test]
    fn event_kinds_do_not_overlap() {
        let all_kinds = [
            EventKind::SELECT,
            EventKind::SELECTION_CLEARED,
            EventKind::RANGE_SELECTED,
            EventKind::HOVER,
            EventKind::HOVER_GROUP,
            EventKind::LASSO_ENABLED,
            EventKind::LASSO_DISABLED,
            EventKind::LASSO_COMPLETED,
            EventKind::DATA_LOADED,
            EventKind::ZOOM,
            EventKind::PAN,
        ];
        for (i, a) in all_kinds.iter().enumerate() {
            for (j, b) in all_kinds.iter().enumerate() {
                if i != j {
                    assert!(!a.intersects(*b), "EventKind bits {} and {} overlap", i, j);
                }
            }
        }
    }

    #[test]
    fn dropped_receiver_is_pruned() {
        let ctrl = EventController::new();
        let rx1 = ctrl.subscribe_all();
        let rx2 = ctrl.subscribe_all();
        drop(rx1);

        ctrl.emit(ScatterEvent::new(EventKind::HOVER));
        assert!(rx2.try_recv().is_ok());
        assert_eq!(ctrl.subscriber_count(), 1);
    }
}
