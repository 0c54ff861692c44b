//! Rectangular brushing across the panes of a scatter-plot matrix.
//!
//! ```text
//!   pointer gesture ──► BrushEvent ──► queue ──► process()
//!                                                  │  DISPATCH[kind]
//!                                                  ▼
//!                                  handler(state, event, ctx) -> Transition
//!                                                  │
//!                              new BrushState ◄────┴────► Vec<Effect>
//!                                                           │ Publish
//!                                                           ▼
//!                                               Observable<Vec<usize>>
//! ```
//!
//! Only one pane holds a region at a time. The hidden mask is global: a
//! record outside the active rectangle is suppressed in every pane.

use std::collections::VecDeque;

use crate::data::model::{Dataset, Record};
use crate::observable::Observable;
use crate::stats::AxisScales;

// ---------------------------------------------------------------------------
// Geometry
// ---------------------------------------------------------------------------

/// Pane `(col, row)`: x feature `col`, y feature `row`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PaneId {
    pub col: usize,
    pub row: usize,
}

impl PaneId {
    pub fn new(col: usize, row: usize) -> Self {
        PaneId { col, row }
    }

    pub fn is_diagonal(self) -> bool {
        self.col == self.row
    }
}

/// Brush rectangle in pane-local pixels, `x0 <= x1`, `y0 <= y1`, non-zero area.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Region {
    pub x0: f64,
    pub y0: f64,
    pub x1: f64,
    pub y1: f64,
}

impl Region {
    /// Normalise two corners; `None` when the rectangle has zero area.
    pub fn from_corners(a: (f64, f64), b: (f64, f64)) -> Option<Region> {
        let region = Region {
            x0: a.0.min(b.0),
            y0: a.1.min(b.1),
            x1: a.0.max(b.0),
            y1: a.1.max(b.1),
        };
        region.has_area().then_some(region)
    }

    pub fn has_area(&self) -> bool {
        self.x1 > self.x0 && self.y1 > self.y0
    }

    /// Intersection with `extent`; `None` if nothing is left.
    pub fn clamp_to(&self, extent: &Region) -> Option<Region> {
        Region::from_corners(
            (self.x0.clamp(extent.x0, extent.x1), self.y0.clamp(extent.y0, extent.y1)),
            (self.x1.clamp(extent.x0, extent.x1), self.y1.clamp(extent.y0, extent.y1)),
        )
    }
}

/// Whether a rectangle edge counts as inside.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeRule {
    /// `lo <= v <= hi`
    Closed,
    /// `lo < v < hi`
    Open,
}

impl EdgeRule {
    pub fn within(self, v: f64, lo: f64, hi: f64) -> bool {
        match self {
            EdgeRule::Closed => lo <= v && v <= hi,
            EdgeRule::Open => lo < v && v < hi,
        }
    }
}

/// Edge rules for the hidden mask and for the published selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BrushRules {
    pub hide: EdgeRule,
    pub select: EdgeRule,
}

impl BrushRules {
    /// Visible and selected agree: boundary points are in.
    pub const CONSISTENT: BrushRules = BrushRules {
        hide: EdgeRule::Closed,
        select: EdgeRule::Closed,
    };

    /// Boundary points stay visible but are left out of the selection.
    pub const LEGACY: BrushRules = BrushRules {
        hide: EdgeRule::Closed,
        select: EdgeRule::Open,
    };
}

impl Default for BrushRules {
    fn default() -> Self {
        BrushRules::CONSISTENT
    }
}

// ---------------------------------------------------------------------------
// Events, effects, state
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BrushEvent {
    /// A drag begins in `pane`.
    Start(PaneId),
    /// The drag moved; `None` when the rectangle has collapsed.
    Brush(PaneId, Option<Region>),
    /// The drag ended with this region.
    End(PaneId, Option<Region>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    Start,
    Brush,
    End,
}

impl BrushEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            BrushEvent::Start(_) => EventKind::Start,
            BrushEvent::Brush(..) => EventKind::Brush,
            BrushEvent::End(..) => EventKind::End,
        }
    }

    pub fn pane(&self) -> PaneId {
        match *self {
            BrushEvent::Start(p) | BrushEvent::Brush(p, _) | BrushEvent::End(p, _) => p,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// The region previously drawn in this pane is gone.
    ClearRegion(PaneId),
    /// New value for the selection observable (record indices, ascending).
    Publish(Vec<usize>),
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct BrushState {
    /// Pane that received the last drag start.
    pub active: Option<PaneId>,
    /// Region of the active pane.
    pub region: Option<Region>,
    /// One flag per record.
    pub hidden: Vec<bool>,
}

impl BrushState {
    pub fn new(records: usize) -> Self {
        BrushState {
            active: None,
            region: None,
            hidden: vec![false; records],
        }
    }

    pub fn region_of(&self, pane: PaneId) -> Option<Region> {
        if self.active == Some(pane) { self.region } else { None }
    }

    #[cfg(test)]
    pub fn hidden_count(&self) -> usize {
        self.hidden.iter().filter(|&&h| h).count()
    }
}

/// Read-only inputs the handlers classify against.
#[derive(Clone, Copy)]
pub struct BrushContext<'a> {
    pub dataset: &'a Dataset,
    pub scales: &'a AxisScales,
    pub rules: BrushRules,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub state: BrushState,
    pub effects: Vec<Effect>,
}

pub type Handler = fn(&BrushState, &BrushEvent, &BrushContext<'_>) -> Transition;

pub const DISPATCH: [(EventKind, Handler); 3] = [
    (EventKind::Start, on_start),
    (EventKind::Brush, on_brush),
    (EventKind::End, on_end),
];

pub fn handler_for(kind: EventKind) -> Option<Handler> {
    DISPATCH.iter().find(|(k, _)| *k == kind).map(|&(_, h)| h)
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// A drag in a different pane clears the previous pane's region, all hidden
/// flags and the published selection.
pub fn on_start(state: &BrushState, event: &BrushEvent, _ctx: &BrushContext<'_>) -> Transition {
    let pane = event.pane();
    if state.active == Some(pane) {
        return Transition {
            state: state.clone(),
            effects: Vec::new(),
        };
    }

    let mut effects = Vec::new();
    if let Some(old) = state.active {
        effects.push(Effect::ClearRegion(old));
        if state.region.is_some() {
            effects.push(Effect::Publish(Vec::new()));
        }
    }
    Transition {
        state: BrushState {
            active: Some(pane),
            region: None,
            hidden: vec![false; state.hidden.len()],
        },
        effects,
    }
}

/// Reclassify every record against the current rectangle.
pub fn on_brush(state: &BrushState, event: &BrushEvent, ctx: &BrushContext<'_>) -> Transition {
    let BrushEvent::Brush(pane, region) = *event else {
        return unchanged(state);
    };
    let mut transition = on_start(state, &BrushEvent::Start(pane), ctx);

    match region {
        Some(region) => {
            let (hidden, selected) = classify(ctx, pane, &region);
            transition.state.region = Some(region);
            transition.state.hidden = hidden;
            transition.effects.push(Effect::Publish(selected));
        }
        None => {
            transition.state.region = None;
            transition.effects.push(Effect::Publish(Vec::new()));
        }
    }
    transition
}

/// An empty region at the end of a drag restores full visibility.
pub fn on_end(state: &BrushState, event: &BrushEvent, ctx: &BrushContext<'_>) -> Transition {
    let BrushEvent::End(pane, region) = *event else {
        return unchanged(state);
    };
    if region.is_some() {
        return on_brush(state, &BrushEvent::Brush(pane, region), ctx);
    }

    let mut transition = on_start(state, &BrushEvent::Start(pane), ctx);
    transition.state.region = None;
    transition.state.hidden = vec![false; state.hidden.len()];
    transition.effects.push(Effect::Publish(Vec::new()));
    transition
}

fn unchanged(state: &BrushState) -> Transition {
    Transition {
        state: state.clone(),
        effects: Vec::new(),
    }
}

/// `(hidden mask, selected indices)` for `region` in `pane`.
///
/// A record without a valid value on either axis cannot be placed: it is
/// hidden and never selected.
pub fn classify(ctx: &BrushContext<'_>, pane: PaneId, region: &Region) -> (Vec<bool>, Vec<usize>) {
    let (Some(sx), Some(sy)) = (ctx.scales.x.get(pane.col), ctx.scales.y.get(pane.row)) else {
        return (vec![true; ctx.dataset.len()], Vec::new());
    };
    let place = |r: &Record| Some((sx.project(r.get(pane.col))?, sy.project(r.get(pane.row))?));

    let mut hidden = Vec::with_capacity(ctx.dataset.len());
    let mut selected = Vec::new();
    for (i, record) in ctx.dataset.records.iter().enumerate() {
        match place(record) {
            Some((px, py)) => {
                let inside = |rule: EdgeRule| {
                    rule.within(px, region.x0, region.x1) && rule.within(py, region.y0, region.y1)
                };
                hidden.push(!inside(ctx.rules.hide));
                if inside(ctx.rules.select) {
                    selected.push(i);
                }
            }
            None => hidden.push(true),
        }
    }
    (hidden, selected)
}

// ---------------------------------------------------------------------------
// Coordinator: event queue + observable selection
// ---------------------------------------------------------------------------

pub struct BrushCoordinator {
    state: BrushState,
    rules: BrushRules,
    queue: VecDeque<BrushEvent>,
    selection: Observable<Vec<usize>>,
}

impl BrushCoordinator {
    pub fn new(records: usize, rules: BrushRules) -> Self {
        BrushCoordinator {
            state: BrushState::new(records),
            rules,
            queue: VecDeque::new(),
            selection: Observable::new(Vec::new()),
        }
    }

    pub fn push(&mut self, event: BrushEvent) {
        self.queue.push_back(event);
    }

    /// Drain the queue in order, applying each transition. Returns every
    /// effect produced.
    pub fn process(&mut self, dataset: &Dataset, scales: &AxisScales) -> Vec<Effect> {
        let ctx = BrushContext {
            dataset,
            scales,
            rules: self.rules,
        };
        let mut applied = Vec::new();
        while let Some(event) = self.queue.pop_front() {
            let Some(handler) = handler_for(event.kind()) else {
                log::warn!("no brush handler for {:?}", event.kind());
                continue;
            };
            let Transition { state, effects } = handler(&self.state, &event, &ctx);
            self.state = state;
            for effect in &effects {
                match effect {
                    Effect::Publish(selected) => self.selection.set(selected.clone()),
                    Effect::ClearRegion(pane) => {
                        log::debug!("brush: cleared pane {pane:?}");
                    }
                }
            }
            applied.extend(effects);
        }
        applied
    }

    /// Push and process a single event.
    pub fn dispatch(&mut self, event: BrushEvent, dataset: &Dataset, scales: &AxisScales) -> Vec<Effect> {
        self.push(event);
        self.process(dataset, scales)
    }

    pub fn state(&self) -> &BrushState {
        &self.state
    }

    #[cfg(test)]
    pub fn rules(&self) -> BrushRules {
        self.rules
    }

    pub fn is_hidden(&self, record: usize) -> bool {
        self.state.hidden.get(record).copied().unwrap_or(false)
    }

    pub fn selection(&self) -> &Observable<Vec<usize>> {
        &self.selection
    }

    pub fn selection_mut(&mut self) -> &mut Observable<Vec<usize>> {
        &mut self.selection
    }
}
