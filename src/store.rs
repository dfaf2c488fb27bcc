//! Dashboard status store.
//!
//! The dashboard's shared status lives in one [`DashboardStore`]. Callers
//! submit a partial [`StatusPatch`]; the store writes the fields that actually
//! differ and reports them as a [`StatusChange`]. [`DashboardStore::plan`]
//! turns a change into the data requests it implies and tells each consumer
//! group which of them to wait for. The store never fetches anything itself.

use std::str::FromStr;
use std::sync::mpsc::{Receiver, Sender};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

// ─────────────────────────────────────────────────────────────────────────────
// Status
// ─────────────────────────────────────────────────────────────────────────────

/// Which visualization occupies the main panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MainView {
    #[default]
    SignatureProjection,
    PcAnnotator,
    Tree,
}

/// What kind of item supplies the plotted values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlottedItemKind {
    Signature,
    Meta,
    Gene,
}

impl PlottedItemKind {
    pub fn as_str(self) -> &'static str {
        match self {
            PlottedItemKind::Signature => "signature",
            PlottedItemKind::Meta => "meta",
            PlottedItemKind::Gene => "gene",
        }
    }
}

impl FromStr for PlottedItemKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "signature" => Ok(PlottedItemKind::Signature),
            "meta" => Ok(PlottedItemKind::Meta),
            "gene" => Ok(PlottedItemKind::Gene),
            other => Err(Error::UnknownItemKind(other.to_string())),
        }
    }
}

impl std::fmt::Display for PlottedItemKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardStatus {
    pub main_view: MainView,
    pub plotted_projection: String,
    /// Principal component label, e.g. `"PC 2"`.
    pub plotted_pc: String,
    pub plotted_signature: String,
    /// Name of the signature, meta column or gene whose values are plotted.
    pub plotted_item: String,
    pub plotted_item_kind: Option<PlottedItemKind>,
    pub filter_group: String,
    pub lower_range: Option<f64>,
    pub upper_range: Option<f64>,
    pub subset_criteria: String,
}

impl Default for DashboardStatus {
    fn default() -> Self {
        Self {
            main_view: MainView::default(),
            plotted_projection: String::new(),
            plotted_pc: String::new(),
            plotted_signature: String::new(),
            plotted_item: String::new(),
            plotted_item_kind: None,
            filter_group: "fano".to_string(),
            lower_range: None,
            upper_range: None,
            subset_criteria: "Rank".to_string(),
        }
    }
}

/// Bitflags naming status fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct StatusKeys(pub u32);

impl StatusKeys {
    pub const MAIN_VIEW: Self = Self(1 << 0);
    pub const PLOTTED_PROJECTION: Self = Self(1 << 1);
    pub const PLOTTED_PC: Self = Self(1 << 2);
    pub const PLOTTED_SIGNATURE: Self = Self(1 << 3);
    pub const PLOTTED_ITEM: Self = Self(1 << 4);
    pub const PLOTTED_ITEM_KIND: Self = Self(1 << 5);
    pub const FILTER_GROUP: Self = Self(1 << 6);
    pub const LOWER_RANGE: Self = Self(1 << 7);
    pub const UPPER_RANGE: Self = Self(1 << 8);
    pub const SUBSET_CRITERIA: Self = Self(1 << 9);

    pub const NONE: Self = Self(0);

    #[inline]
    pub const fn contains(self, other: Self) -> bool {
        (self.0 & other.0) == other.0
    }

    #[inline]
    pub const fn intersects(self, other: Self) -> bool {
        (self.0 & other.0) != 0
    }

    #[inline]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl std::ops::BitOr for StatusKeys {
    type Output = Self;
    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl std::ops::BitOrAssign for StatusKeys {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

/// A partial update; `None` leaves the field alone.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatusPatch {
    pub main_view: Option<MainView>,
    pub plotted_projection: Option<String>,
    pub plotted_pc: Option<String>,
    pub plotted_signature: Option<String>,
    pub plotted_item: Option<String>,
    pub plotted_item_kind: Option<PlottedItemKind>,
    pub filter_group: Option<String>,
    pub lower_range: Option<f64>,
    pub upper_range: Option<f64>,
    pub subset_criteria: Option<String>,
}

impl StatusPatch {
    /// Patch plotting `item` of `kind`.
    pub fn item(item: &str, kind: PlottedItemKind) -> Self {
        Self {
            plotted_item: Some(item.to_string()),
            plotted_item_kind: Some(kind),
            ..Self::default()
        }
    }
}

/// The fields a patch actually changed and the status after applying it.
#[derive(Debug, Clone, PartialEq)]
pub struct StatusChange {
    pub keys: StatusKeys,
    pub status: DashboardStatus,
}

impl StatusChange {
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn changed(&self, keys: StatusKeys) -> bool {
        self.keys.intersects(keys)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Planning
// ─────────────────────────────────────────────────────────────────────────────

/// Data the dashboard must fetch before consumers can refresh.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataRequest {
    PcCoordinates {
        filter_group: String,
        signature: String,
        pc: String,
    },
    TreeCoordinates {
        filter_group: String,
        projection: String,
    },
    ProjectionCoordinates {
        filter_group: String,
        projection: String,
    },
    SignatureScores {
        name: String,
    },
    GeneExpression {
        gene: String,
    },
    SignatureInfo {
        name: String,
    },
}

/// Panels that refresh on status changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConsumerGroup {
    Right,
    UpperLeft,
    LowerLeft,
}

impl ConsumerGroup {
    pub const ALL: [ConsumerGroup; 3] = [
        ConsumerGroup::Right,
        ConsumerGroup::UpperLeft,
        ConsumerGroup::LowerLeft,
    ];

    fn slot(self) -> usize {
        match self {
            ConsumerGroup::Right => 0,
            ConsumerGroup::UpperLeft => 1,
            ConsumerGroup::LowerLeft => 2,
        }
    }
}

type ValueRequestFn = fn(&str) -> DataRequest;

fn signature_scores(name: &str) -> DataRequest {
    DataRequest::SignatureScores {
        name: name.to_string(),
    }
}

fn gene_expression(gene: &str) -> DataRequest {
    DataRequest::GeneExpression {
        gene: gene.to_string(),
    }
}

/// How the plotted values of each item kind are fetched.
fn value_request_fn(kind: PlottedItemKind) -> ValueRequestFn {
    match kind {
        PlottedItemKind::Signature | PlottedItemKind::Meta => signature_scores,
        PlottedItemKind::Gene => gene_expression,
    }
}

fn value_request(kind: PlottedItemKind, item: &str) -> DataRequest {
    value_request_fn(kind)(item)
}

/// Requests implied by a change, and which of them each group waits for.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UpdatePlan {
    requests: Vec<DataRequest>,
    waits: [Vec<usize>; 3],
}

impl UpdatePlan {
    fn add(&mut self, request: DataRequest, groups: &[ConsumerGroup]) {
        let idx = self.requests.len();
        self.requests.push(request);
        for g in groups {
            self.waits[g.slot()].push(idx);
        }
    }

    pub fn requests(&self) -> &[DataRequest] {
        &self.requests
    }

    pub fn is_empty(&self) -> bool {
        self.requests.is_empty()
    }

    /// Requests `group` must see resolved before it refreshes.
    pub fn waits_for(&self, group: ConsumerGroup) -> Vec<&DataRequest> {
        self.waits[group.slot()]
            .iter()
            .map(|&i| &self.requests[i])
            .collect()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// DashboardStore
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct DashboardStore {
    status: DashboardStatus,
    history: Vec<DashboardStatus>,
    /// Name of the signature whose info was last resolved.
    signature_info: Option<String>,
    subscribers: [Vec<Sender<StatusChange>>; 3],
}

impl DashboardStore {
    pub fn new(status: DashboardStatus) -> Self {
        Self {
            status,
            ..Self::default()
        }
    }

    pub fn status(&self) -> &DashboardStatus {
        &self.status
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    /// Record that info for signature `name` is now cached.
    pub fn record_signature_info(&mut self, name: &str) {
        self.signature_info = Some(name.to_string());
    }

    /// Receive one [`StatusChange`] per notification of `group`.
    pub fn subscribe(&mut self, group: ConsumerGroup) -> Receiver<StatusChange> {
        let (tx, rx) = std::sync::mpsc::channel();
        self.subscribers[group.slot()].push(tx);
        rx
    }

    /// Write every patch field that differs from the current status.
    /// A non-empty change pushes the previous status onto the history.
    pub fn apply(&mut self, patch: StatusPatch) -> StatusChange {
        let previous = self.status.clone();
        let mut keys = StatusKeys::NONE;

        macro_rules! set {
            ($field:ident, $key:expr) => {
                if let Some(v) = patch.$field {
                    if self.status.$field != v {
                        self.status.$field = v;
                        keys |= $key;
                    }
                }
            };
        }

        set!(main_view, StatusKeys::MAIN_VIEW);
        set!(plotted_projection, StatusKeys::PLOTTED_PROJECTION);
        set!(plotted_pc, StatusKeys::PLOTTED_PC);
        set!(plotted_signature, StatusKeys::PLOTTED_SIGNATURE);
        set!(plotted_item, StatusKeys::PLOTTED_ITEM);
        if let Some(kind) = patch.plotted_item_kind {
            if self.status.plotted_item_kind != Some(kind) {
                self.status.plotted_item_kind = Some(kind);
                keys |= StatusKeys::PLOTTED_ITEM_KIND;
            }
        }
        set!(filter_group, StatusKeys::FILTER_GROUP);
        if let Some(v) = patch.lower_range {
            if self.status.lower_range != Some(v) {
                self.status.lower_range = Some(v);
                keys |= StatusKeys::LOWER_RANGE;
            }
        }
        if let Some(v) = patch.upper_range {
            if self.status.upper_range != Some(v) {
                self.status.upper_range = Some(v);
                keys |= StatusKeys::UPPER_RANGE;
            }
        }
        set!(subset_criteria, StatusKeys::SUBSET_CRITERIA);

        if !keys.is_empty() {
            self.history.push(previous);
            tracing::debug!(keys = keys.0, "Dashboard status changed");
        }
        StatusChange {
            keys,
            status: self.status.clone(),
        }
    }

    /// Data requests implied by `change`.
    ///
    /// Fails when the plotted item changed but no item kind is set.
    pub fn plan(&self, change: &StatusChange) -> Result<UpdatePlan> {
        use ConsumerGroup::*;

        let status = &change.status;
        let mut plan = UpdatePlan::default();

        if change.changed(StatusKeys::PLOTTED_PC)
            || (change.changed(StatusKeys::PLOTTED_SIGNATURE)
                && status.main_view == MainView::PcAnnotator)
        {
            let pc = status
                .plotted_pc
                .split(' ')
                .nth(1)
                .unwrap_or_default()
                .to_string();
            plan.add(
                DataRequest::PcCoordinates {
                    filter_group: status.filter_group.clone(),
                    signature: status.plotted_signature.clone(),
                    pc,
                },
                &[Right],
            );
        }

        if change.changed(StatusKeys::PLOTTED_PROJECTION) {
            let filter_group = status.filter_group.clone();
            let projection = status.plotted_projection.clone();
            match status.main_view {
                MainView::Tree => plan.add(
                    DataRequest::TreeCoordinates {
                        filter_group,
                        projection,
                    },
                    &[Right, UpperLeft],
                ),
                MainView::SignatureProjection => plan.add(
                    DataRequest::ProjectionCoordinates {
                        filter_group,
                        projection,
                    },
                    &[Right, UpperLeft],
                ),
                MainView::PcAnnotator => {}
            }
        }

        if change.changed(StatusKeys::PLOTTED_ITEM | StatusKeys::PLOTTED_ITEM_KIND) {
            let kind = status
                .plotted_item_kind
                .ok_or_else(|| Error::UnknownItemKind(String::new()))?;
            let item = &status.plotted_item;
            plan.add(value_request(kind, item), &[Right, LowerLeft]);

            if kind == PlottedItemKind::Signature
                && self.signature_info.as_deref() != Some(item.as_str())
            {
                plan.add(
                    DataRequest::SignatureInfo { name: item.clone() },
                    &[Right, LowerLeft],
                );
            }
        }

        Ok(plan)
    }

    /// Apply `patch` and plan the follow-up requests.
    pub fn update(&mut self, patch: StatusPatch) -> Result<(StatusChange, UpdatePlan)> {
        let change = self.apply(patch);
        let plan = self.plan(&change)?;
        Ok((change, plan))
    }

    /// Send `change` once to `group`'s subscribers. Empty changes are not
    /// sent.
    pub fn notify_group(&mut self, group: ConsumerGroup, change: &StatusChange) -> usize {
        if change.is_empty() {
            return 0;
        }
        let subs = &mut self.subscribers[group.slot()];
        subs.retain(|tx| tx.send(change.clone()).is_ok());
        subs.len()
    }

    /// Notify every group once.
    pub fn notify(&mut self, change: &StatusChange) {
        for group in ConsumerGroup::ALL {
            self.notify_group(group, change);
        }
    }

    /// Restore the status before the last non-empty change. Returns the
    /// fields that changed by going back, or `None` with no history.
    pub fn go_back(&mut self) -> Option<StatusChange> {
        let previous = self.history.pop()?;
        let keys = diff_keys(&self.status, &previous);
        self.status = previous;
        Some(StatusChange {
            keys,
            status: self.status.clone(),
        })
    }
}

fn diff_keys(a: &DashboardStatus, b: &DashboardStatus) -> StatusKeys {
    let mut keys = StatusKeys::NONE;
    let pairs = [
        (a.main_view != b.main_view, StatusKeys::MAIN_VIEW),
        (a.plotted_projection != b.plotted_projection, StatusKeys::PLOTTED_PROJECTION),
        (a.plotted_pc != b.plotted_pc, StatusKeys::PLOTTED_PC),
        (a.plotted_signature != b.plotted_signature, StatusKeys::PLOTTED_SIGNATURE),
        (a.plotted_item != b.plotted_item, StatusKeys::PLOTTED_ITEM),
        (a.plotted_item_kind != b.plotted_item_kind, StatusKeys::PLOTTED_ITEM_KIND),
        (a.filter_group != b.filter_group, StatusKeys::FILTER_GROUP),
        (a.lower_range != b.lower_range, StatusKeys::LOWER_RANGE),
        (a.upper_range != b.upper_range, StatusKeys::UPPER_RANGE),
        (a.subset_criteria != b.subset_criteria, StatusKeys::SUBSET_CRITERIA),
    ];
    for (differs, key) in pairs {
        if differs {
            keys |= key;
        }
    }
    keys
}
