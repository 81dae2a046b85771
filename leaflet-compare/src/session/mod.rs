//! Comparison session.
//!
//! A `ComparisonSession` owns the lifecycle of two tiled models shown against
//! each other: model A (the reference) and model B (the comparison target).
//! It loads B, merges both traversals through a diff iterator, swaps the raw
//! models for the diff scene in the viewer and exposes the controls used
//! while comparing (offset, diff mode, split position, alignment mode).
//!
//! # Lifecycle
//!
//! ```text
//!            compare_*()                 B loaded & valid
//!   Idle ──────────────────► Loading ─────────────────────► Comparing
//!    ▲                          │                               │
//!    │        load failed       │                               │
//!    ├──────────────────────────┘                               │
//!    │                 end_compare_with_current()               │
//!    └──────────────────────────────────────────────────────────┘
//! ```
//!
//! Every start and every end bumps a generation counter. A load of B that
//! completes under an older generation is discarded with
//! [`CompareError::Superseded`], so ending a comparison while B is still
//! loading can never resurrect it.
//!
//! Starting a comparison while another is live keeps the live one on screen
//! until the new B has loaded and validated. A failed start returns the
//! session to the phase it was in.
//!
//! # Deferred effects
//!
//! Hiding A after it was added, fitting the camera after a comparison starts
//! and fitting after A is restored all run through the host's
//! [`Scheduler`](crate::scheduler::Scheduler), after the scene mutation that
//! precedes them has settled.
//!
//! # Example
//!
//! ```ignore
//! use leaflet_compare::{CompareConfig, CompareHost, ComparisonSession, DiffMode};
//!
//! let session = ComparisonSession::load(CompareConfig::default(), host);
//! session.compare_model_with_current("urn:rev-2", None).await?;
//!
//! session.set_diff_mode(DiffMode::SplitView);
//! session.set_change_offset_mode(true);
//!
//! session.end_compare_with_current(true);
//! ```

mod loader;
mod split_line;
mod state;

use std::sync::{Arc, Weak};

use glam::DVec3;
use parking_lot::Mutex;
use tokio::runtime::Handle;

use crate::config::CompareConfig;
use crate::diff::{DiffIterator, DiffIteratorFactory, DiffMode};
use crate::error::{CompareError, CompareResult};
use crate::gestures::{InputEvent, InputListener, InputPhase, InputScheme};
use crate::host::{ModelSource, ProgressState, ToolController, Viewer};
use crate::model::{ModelId, TileModel};
use crate::scheduler::{Scheduler, TokioScheduler};
use crate::tool::{AlignmentTool, OffsetTarget, Tool, ALIGNMENT_TOOL_NAME};

pub use split_line::{left_for_fraction, SplitDrag, SplitUpdate};
pub use state::SessionPhase;

use split_line::{SplitLine, SplitLineListeners};
use state::{Comparison, PendingComparison, SessionInner, SessionState};

/// Callback run after model A has loaded and before model B is requested.
pub type AfterFirstModel = Box<dyn FnOnce() + Send>;

/// Host collaborators a session runs against.
#[derive(Clone)]
pub struct CompareHost {
    pub viewer: Arc<dyn Viewer>,
    pub tools: Arc<dyn ToolController>,
    pub models: Arc<dyn ModelSource>,
    pub diff_factory: Arc<dyn DiffIteratorFactory>,
    pub scheduler: Arc<dyn Scheduler>,
}

impl CompareHost {
    /// Bundle host collaborators, deferring work on the given runtime.
    ///
    /// Deferred hides and fits are spawned on `runtime`, so they settle one
    /// tick after the scene change even when the session is driven from a
    /// thread outside it.
    pub fn new(
        viewer: Arc<dyn Viewer>,
        tools: Arc<dyn ToolController>,
        models: Arc<dyn ModelSource>,
        diff_factory: Arc<dyn DiffIteratorFactory>,
        runtime: Handle,
    ) -> Self {
        Self {
            viewer,
            tools,
            models,
            diff_factory,
            scheduler: Arc::new(TokioScheduler::new(runtime)),
        }
    }

    /// Use a different scheduler for deferred effects.
    pub fn with_scheduler(mut self, scheduler: Arc<dyn Scheduler>) -> Self {
        self.scheduler = scheduler;
        self
    }
}

/// Comparison of two tiled models inside a host viewer.
pub struct ComparisonSession {
    config: CompareConfig,
    host: CompareHost,
    input: InputScheme,
    tool: Arc<AlignmentTool>,
    self_ref: Weak<ComparisonSession>,
    inner: Mutex<SessionInner>,
}

impl std::fmt::Debug for ComparisonSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComparisonSession")
            .field("config", &self.config)
            .field("phase", &self.phase())
            .field("tool", &self.tool)
            .finish_non_exhaustive()
    }
}

impl ComparisonSession {
    /// Create a session and register its alignment tool with the host.
    pub fn load(config: CompareConfig, host: CompareHost) -> Arc<Self> {
        let session = Arc::new_cyclic(|weak: &Weak<ComparisonSession>| {
            let target: Weak<dyn OffsetTarget> = weak.clone();
            let tool = Arc::new(AlignmentTool::new(Arc::clone(&host.viewer), target));
            Self {
                input: InputScheme::detect(config.platform),
                config,
                host,
                tool,
                self_ref: weak.clone(),
                inner: Mutex::new(SessionInner::new()),
            }
        });

        session.host.tools.register_tool(session.tool.clone());
        tracing::debug!("Comparison session loaded");
        session
    }

    /// Deregister the alignment tool and end any comparison, leaving A hidden.
    pub fn unload(&self) {
        self.host.tools.deregister_tool(ALIGNMENT_TOOL_NAME);
        self.end_compare_with_current(false);
        tracing::debug!("Comparison session unloaded");
    }

    /// Load two documents and compare them.
    ///
    /// A is loaded first, added to the scene and hidden one tick later;
    /// `on_after_first_model` then runs and only afterwards is B requested.
    /// If B fails, A stays in the scene and is left visible. A comparison
    /// already running stays live until the new B has loaded and validated.
    pub async fn compare_two_models(
        &self,
        location_a: &str,
        item_a: Option<&str>,
        location_b: &str,
        item_b: Option<&str>,
        on_after_first_model: Option<AfterFirstModel>,
    ) -> CompareResult<()> {
        tracing::info!(location_a, location_b, "Starting comparison of two models");

        let mut first = None;
        self.load_model(location_a, item_a, |model| {
            self.adopt_first_model(&model)?;
            first = Some(model);
            Ok(())
        })
        .await?;
        let Some(model_a) = first else {
            return Err(CompareError::UnsupportedModelKind);
        };

        if let Some(callback) = on_after_first_model {
            callback();
        }

        self.load_second_model(location_b, item_b, model_a, true)
            .await
    }

    /// Compare the model currently shown in the viewer with another document.
    ///
    /// Fails with [`CompareError::UnsupportedModelKind`] before any load is
    /// attempted when no tiled model is displayed. On any failure a running
    /// comparison is left as it was.
    pub async fn compare_model_with_current(
        &self,
        location: &str,
        item_id: Option<&str>,
    ) -> CompareResult<()> {
        let current = self.host.viewer.current_model();
        let Some(model_a) = current.filter(|m| m.is_leaflet()) else {
            tracing::error!("No model loaded to compare to or model is not leaflet");
            return Err(CompareError::UnsupportedModelKind);
        };

        tracing::info!(location, model_a = %model_a.id(), "Starting comparison with current model");
        self.load_second_model(location, item_id, model_a, false)
            .await
    }

    /// End the current comparison.
    ///
    /// Removes B and the diff scene, switches the alignment tool off and, if
    /// `restore_a`, shows A again and fits the camera one tick later. Safe to
    /// call when nothing is being compared.
    pub fn end_compare_with_current(&self, restore_a: bool) {
        let (model_a, previous, discard) = {
            let mut inner = self.inner.lock();
            inner.generation += 1;
            if restore_a {
                inner.pending_hide = None;
            }
            let (previous, discard) = match std::mem::replace(&mut inner.state, SessionState::Idle) {
                SessionState::Comparing(comparison) => (Some(comparison), None),
                SessionState::Loading(mut pending) => {
                    tracing::debug!(location = %pending.location, "Comparison ended while model was loading");
                    match pending.previous.take() {
                        Some(comparison) => (Some(comparison), inner.release_pending_model_a(&pending)),
                        None => {
                            // Nothing was compared yet; the candidate is the A to restore.
                            inner.model_a = Some(pending.model_a);
                            inner.owns_model_a = pending.owns_model_a;
                            (None, None)
                        }
                    }
                }
                SessionState::Idle => (None, None),
            };
            (inner.model_a.clone(), previous, discard)
        };

        if let Some(model_a) = &model_a {
            model_a.iterator().set_aggressive_prefetching(false);
        }
        if let Some(comparison) = previous {
            self.tear_down(comparison);
        }
        if let Some(id) = discard {
            self.host.viewer.unload_model(id);
        }

        if self.tool.is_active() {
            self.set_change_offset_mode(false);
        }

        if restore_a {
            if let Some(model_a) = model_a {
                self.host.viewer.show_model(model_a.id());
                let viewer = Arc::clone(&self.host.viewer);
                self.host
                    .scheduler
                    .defer(Box::new(move || viewer.fit_to_view()));
            }
        }
    }

    /// Translate model B in world space.
    pub fn set_offset(&self, offset: DVec3) {
        let Some(diff) = self.diff_iterator() else {
            tracing::debug!("set_offset ignored, no active comparison");
            return;
        };
        diff.set_offset(offset);
        self.host.viewer.invalidate();
    }

    /// Current offset of model B, `None` when nothing is compared.
    pub fn offset(&self) -> Option<DVec3> {
        self.diff_iterator().map(|d| d.offset())
    }

    /// Move the split between A and B, as a fraction of the canvas width.
    ///
    /// The value is forwarded unchanged and kept across diff mode changes.
    pub fn set_split_position(&self, position: f64) {
        let diff = {
            let mut inner = self.inner.lock();
            let Some(comparison) = inner.state.comparison_mut() else {
                tracing::debug!("set_split_position ignored, no active comparison");
                return;
            };
            comparison.split_position = position;
            Arc::clone(&comparison.diff)
        };
        diff.set_split_position(position);
        self.host.viewer.invalidate();
    }

    /// Switch the visualisation mode.
    ///
    /// Split view shows the split line, creating it on first use; other
    /// modes hide it.
    pub fn set_diff_mode(&self, mode: DiffMode) {
        let diff = {
            let mut inner = self.inner.lock();
            let Some(comparison) = inner.state.comparison_mut() else {
                tracing::debug!(%mode, "set_diff_mode ignored, no active comparison");
                return;
            };
            comparison.diff_mode = mode;
            Arc::clone(&comparison.diff)
        };

        diff.set_diff_mode(mode);
        self.host.viewer.invalidate();
        tracing::debug!(%mode, "Diff mode changed");

        if mode == DiffMode::SplitView {
            self.show_split_line();
        } else {
            self.hide_split_line();
        }
    }

    /// Turn drag-to-align on or off.
    ///
    /// While on, camera navigation is limited to zoom so drags move model B.
    pub fn set_change_offset_mode(&self, enable: bool) {
        if enable {
            if self.inner.lock().state.comparison().is_none() {
                tracing::warn!("Offset mode requested without an active comparison");
                return;
            }
            self.host.tools.activate_tool(ALIGNMENT_TOOL_NAME);
            self.tool.set_offset_setting_mode(true);
        } else {
            self.tool.set_offset_setting_mode(false);
            self.host.tools.deactivate_tool(ALIGNMENT_TOOL_NAME);
        }
    }

    /// Where the session is in its lifecycle.
    pub fn phase(&self) -> SessionPhase {
        self.inner.lock().state.phase()
    }

    /// Configuration the session was loaded with.
    pub fn config(&self) -> &CompareConfig {
        &self.config
    }

    /// Alignment tool registered by this session.
    pub fn tool(&self) -> Arc<AlignmentTool> {
        Arc::clone(&self.tool)
    }

    /// Reference model of the live or most recent comparison.
    pub fn model_a(&self) -> Option<Arc<dyn TileModel>> {
        self.inner.lock().model_a.clone()
    }

    /// Model compared against A, while a comparison is live.
    pub fn model_b(&self) -> Option<Arc<dyn TileModel>> {
        self.inner
            .lock()
            .state
            .comparison()
            .map(|c| Arc::clone(&c.model_b))
    }

    /// Iterator merging the traversals of A and B.
    pub fn diff_iterator(&self) -> Option<Arc<dyn DiffIterator>> {
        self.inner
            .lock()
            .state
            .comparison()
            .map(|c| Arc::clone(&c.diff))
    }

    /// Model the viewer renders the diff scene through.
    pub fn diff_model_id(&self) -> Option<ModelId> {
        self.inner.lock().state.comparison().map(|c| c.diff_model)
    }

    /// Visualisation mode of the live comparison.
    pub fn diff_mode(&self) -> Option<DiffMode> {
        self.inner.lock().state.comparison().map(|c| c.diff_mode)
    }

    /// Split between A and B as a fraction of the canvas width.
    pub fn split_position(&self) -> Option<f64> {
        self.inner
            .lock()
            .state
            .comparison()
            .map(|c| c.split_position)
    }

    /// Whether the split line exists and is shown.
    pub fn is_split_line_visible(&self) -> bool {
        self.inner
            .lock()
            .state
            .comparison()
            .and_then(|c| c.split_line.as_ref())
            .is_some_and(|line| line.visible)
    }

    /// Left edge of the split line in client pixels, once it exists.
    pub fn split_line_left(&self) -> Option<f64> {
        self.inner
            .lock()
            .state
            .comparison()
            .and_then(|c| c.split_line.as_ref())
            .map(|line| line.left)
    }

    // ----- comparison start -----

    /// Validate model A, add it to the scene and hide it on the next tick.
    fn adopt_first_model(&self, model: &Arc<dyn TileModel>) -> CompareResult<()> {
        if !model.is_leaflet() {
            tracing::error!(model = %model.id(), "No model loaded to compare to or model is not leaflet");
            return Err(CompareError::UnsupportedModelKind);
        }

        let id = model.id();
        self.inner.lock().pending_hide = Some(id);
        self.host.viewer.add_model(Arc::clone(model));

        // Hiding in the same tick as the add shows a flash of A.
        let weak = self.self_ref.clone();
        self.host.scheduler.defer(Box::new(move || {
            if let Some(session) = weak.upgrade() {
                session.hide_pending_first_model(id);
            }
        }));

        tracing::debug!(model = %id, "First model added");
        Ok(())
    }

    fn hide_pending_first_model(&self, id: ModelId) {
        let due = {
            let mut inner = self.inner.lock();
            if inner.pending_hide == Some(id) {
                inner.pending_hide = None;
                true
            } else {
                false
            }
        };
        if due {
            self.host.viewer.hide_model(id);
        }
    }

    /// Load B against `model_a`, keeping any live comparison until B is ready.
    async fn load_second_model(
        &self,
        location: &str,
        item_id: Option<&str>,
        model_a: Arc<dyn TileModel>,
        owns_model_a: bool,
    ) -> CompareResult<()> {
        let (generation, displaced) = {
            let mut inner = self.inner.lock();
            inner.generation += 1;
            let (previous, displaced) = match std::mem::replace(&mut inner.state, SessionState::Idle) {
                SessionState::Comparing(comparison) => (Some(comparison), None),
                SessionState::Loading(pending) => {
                    // A newer start replaces a load still in flight.
                    let displaced = if pending.model_a.id() == model_a.id() {
                        None
                    } else {
                        inner.release_pending_model_a(&pending)
                    };
                    (pending.previous, displaced)
                }
                SessionState::Idle => (None, None),
            };
            inner.state = SessionState::Loading(PendingComparison {
                location: location.to_string(),
                model_a,
                owns_model_a,
                previous,
            });
            (inner.generation, displaced)
        };
        if let Some(id) = displaced {
            self.host.viewer.unload_model(id);
        }

        let result = self
            .load_model(location, item_id, |model_b| {
                self.begin_comparison(generation, model_b)
            })
            .await;

        if result.is_err() {
            self.abandon_pending_comparison(generation);
        }
        result
    }

    /// Return to the state before a failed start.
    ///
    /// A replaced comparison becomes active again. Without one, the candidate
    /// A is kept and shown if the session added it.
    fn abandon_pending_comparison(&self, generation: u64) {
        let (show, discard) = {
            let mut inner = self.inner.lock();
            if inner.generation != generation || inner.state.phase() != SessionPhase::Loading {
                return;
            }
            let SessionState::Loading(mut pending) =
                std::mem::replace(&mut inner.state, SessionState::Idle)
            else {
                return;
            };
            match pending.previous.take() {
                Some(comparison) => {
                    let discard = inner.release_pending_model_a(&pending);
                    inner.state = SessionState::Comparing(comparison);
                    (None, discard)
                }
                None => {
                    let id = pending.model_a.id();
                    let show = pending.owns_model_a.then_some(id);
                    if show.is_some() && inner.pending_hide == Some(id) {
                        inner.pending_hide = None;
                    }
                    inner.model_a = Some(pending.model_a);
                    inner.owns_model_a = pending.owns_model_a;
                    (show, None)
                }
            }
        };

        if let Some(id) = discard {
            self.host.viewer.unload_model(id);
            tracing::debug!(model = %id, "Discarded first model of failed comparison");
        }
        if let Some(id) = show {
            self.host.viewer.show_model(id);
        }
    }

    /// Build the diff scene for a freshly loaded model B.
    ///
    /// A comparison being replaced is only torn down once B is valid.
    fn begin_comparison(&self, generation: u64, model_b: Arc<dyn TileModel>) -> CompareResult<()> {
        let (model_a, owns_model_a) = {
            let inner = self.inner.lock();
            match &inner.state {
                SessionState::Loading(pending) if inner.generation == generation => {
                    (Arc::clone(&pending.model_a), pending.owns_model_a)
                }
                _ => {
                    tracing::warn!(model = %model_b.id(), "Discarding model loaded for an ended comparison");
                    return Err(CompareError::Superseded);
                }
            }
        };

        if !model_b.is_leaflet() {
            tracing::error!(model = %model_b.id(), "Second model is not leaflet");
            return Err(CompareError::ModelCallbackFailure);
        }

        let (previous, old_a, owned_old_a) = {
            let mut inner = self.inner.lock();
            if inner.generation != generation {
                return Err(CompareError::Superseded);
            }
            let previous = match &mut inner.state {
                SessionState::Loading(pending) => pending.previous.take(),
                _ => None,
            };
            (previous, inner.model_a.clone(), inner.owns_model_a)
        };

        let viewer = &self.host.viewer;
        if let Some(previous) = previous {
            if let Some(old_a) = &old_a {
                old_a.iterator().set_aggressive_prefetching(false);
            }
            self.tear_down(previous);
            if self.tool.is_active() {
                self.set_change_offset_mode(false);
            }
            if let Some(old_a) = old_a.filter(|a| owned_old_a && a.id() != model_a.id()) {
                viewer.unload_model(old_a.id());
            }
            tracing::info!("Replaced active comparison");
        }

        let iter_a = model_a.iterator();
        let iter_b = model_b.iterator();
        if self.config.prefetch_enabled() {
            iter_a.set_aggressive_prefetching(true);
            iter_b.set_aggressive_prefetching(true);
        }

        viewer.hide_model(model_a.id());

        let diff = self.host.diff_factory.create(iter_a, iter_b);
        self.wire_diff_callbacks(&diff);
        let diff_model = viewer.add_diff_model(&model_a, Arc::clone(&diff));

        let stale = {
            let mut inner = self.inner.lock();
            if inner.generation == generation {
                inner.model_a = Some(Arc::clone(&model_a));
                inner.owns_model_a = owns_model_a;
                inner.pending_hide = None;
                inner.state = SessionState::Comparing(Comparison {
                    model_b: Arc::clone(&model_b),
                    diff,
                    diff_model,
                    diff_mode: DiffMode::default(),
                    split_position: self.config.initial_split_position,
                    split_line: None,
                });
                false
            } else {
                true
            }
        };
        if stale {
            viewer.unload_model(diff_model);
            viewer.unload_model(model_b.id());
            return Err(CompareError::Superseded);
        }

        if self.config.fit_to_view_on_compare {
            let viewer = Arc::clone(viewer);
            self.host
                .scheduler
                .defer(Box::new(move || viewer.fit_to_view()));
        }

        tracing::info!(
            model_a = %model_a.id(),
            model_b = %model_b.id(),
            diff_model = %diff_model,
            "Comparison started"
        );
        Ok(())
    }

    /// Spinner until the first scene is complete, progress while traversing.
    fn wire_diff_callbacks(&self, diff: &Arc<dyn DiffIterator>) {
        let viewer = &self.host.viewer;

        if viewer.has_load_spinner() {
            diff.set_scene_visible(false);
            viewer.set_load_spinner_visible(true);
            viewer.set_navigation_lock(true);

            let viewer = Arc::clone(viewer);
            let tool = Arc::clone(&self.tool);
            let weak_diff = Arc::downgrade(diff);
            diff.on_first_scene_complete(Box::new(move || {
                viewer.set_load_spinner_visible(false);
                if let Some(diff) = weak_diff.upgrade() {
                    diff.set_scene_visible(true);
                }
                // Offset mode owns the zoom-only lock once it is on.
                if !tool.is_setting_offset() {
                    viewer.set_navigation_lock(false);
                }
                tracing::debug!("First diff scene complete");
            }));
        }

        let viewer = Arc::clone(viewer);
        diff.on_progress(Box::new(move |progress| {
            viewer.signal_progress(progress, ProgressState::Rendering);
        }));
    }

    fn tear_down(&self, comparison: Comparison) {
        let Comparison {
            model_b,
            diff_model,
            split_line,
            ..
        } = comparison;

        if let Some(line) = split_line {
            let document = self.host.viewer.document();
            line.destroy(document.as_ref(), &self.input);
        }

        self.host.viewer.unload_model(diff_model);
        self.host.viewer.unload_model(model_b.id());
        tracing::info!(model_b = %model_b.id(), "Comparison ended");
    }

    // ----- split line -----

    fn show_split_line(&self) {
        let needs_line = {
            let inner = self.inner.lock();
            inner
                .state
                .comparison()
                .is_some_and(|c| c.split_line.is_none())
        };
        if needs_line {
            self.create_split_line();
        }
        self.set_split_line_visible(true);
    }

    fn hide_split_line(&self) {
        self.set_split_line_visible(false);
    }

    fn set_split_line_visible(&self, visible: bool) {
        let element = {
            let mut inner = self.inner.lock();
            let Some(line) = inner
                .state
                .comparison_mut()
                .and_then(|c| c.split_line.as_mut())
            else {
                return;
            };
            line.visible = visible;
            Arc::clone(&line.element)
        };
        element.set_visible(visible);
    }

    fn create_split_line(&self) {
        let viewer = &self.host.viewer;
        let layout = self.config.split_line.layout();
        let element = viewer.create_split_line(&layout, self.config.split_line.color.as_deref());
        let position = self.config.initial_split_position;
        let left = left_for_fraction(position, &viewer.canvas_rect(), layout.container_width);
        let line = SplitLine::attach(element, layout, left, self.split_line_listeners(), &self.input);

        let orphan = {
            let mut inner = self.inner.lock();
            match inner.state.comparison_mut() {
                Some(comparison) if comparison.split_line.is_none() => {
                    comparison.split_line = Some(line);
                    None
                }
                _ => Some(line),
            }
        };
        if let Some(line) = orphan {
            line.destroy(viewer.document().as_ref(), &self.input);
            return;
        }

        self.set_split_position(position);
        tracing::debug!(left, "Split line created");
    }

    fn split_line_listeners(&self) -> SplitLineListeners {
        let weak = self.self_ref.clone();
        let down: InputListener = Arc::new(move |event: &InputEvent| {
            weak.upgrade()
                .is_some_and(|session| session.on_split_line_down(event))
        });

        let weak = self.self_ref.clone();
        let moved: InputListener = Arc::new(move |event: &InputEvent| {
            weak.upgrade()
                .is_some_and(|session| session.on_split_line_move(event))
        });

        let weak = self.self_ref.clone();
        let up: InputListener = Arc::new(move |_event: &InputEvent| {
            weak.upgrade()
                .is_some_and(|session| session.on_split_line_up())
        });

        SplitLineListeners { down, moved, up }
    }

    /// Start a split-line drag and follow it on the whole page.
    fn on_split_line_down(&self, event: &InputEvent) -> bool {
        let start_x = self.input.client_coords(event).x;
        let touch = self.input.is_touch_event(event);

        let (moved, up) = {
            let mut inner = self.inner.lock();
            let Some(line) = inner
                .state
                .comparison_mut()
                .and_then(|c| c.split_line.as_mut())
            else {
                return false;
            };
            if line.drag.is_some() {
                return true;
            }
            line.drag = Some(SplitDrag {
                start_x,
                left_at_start: line.left,
                touch,
            });
            (
                Arc::clone(&line.listeners.moved),
                Arc::clone(&line.listeners.up),
            )
        };

        let document = self.host.viewer.document();
        self.input.attach(document.as_ref(), InputPhase::Move, &moved);
        self.input.attach(document.as_ref(), InputPhase::Up, &up);
        true
    }

    fn on_split_line_move(&self, event: &InputEvent) -> bool {
        let dragging = {
            let inner = self.inner.lock();
            inner
                .state
                .comparison()
                .and_then(|c| c.split_line.as_ref())
                .and_then(|line| {
                    line.drag
                        .map(|d| (d, Arc::clone(&line.element), line.layout.container_width))
                })
        };
        let Some((drag, element, container_width)) = dragging else {
            return false;
        };

        // A mouse event arriving during a touch drag is not part of it.
        if drag.touch != self.input.is_touch_event(event) {
            return false;
        }

        let x = self.input.client_coords(event).x;
        let canvas = self.host.viewer.canvas_rect();
        let Some(update) =
            drag.drag_to(x, &canvas, container_width, self.config.split_edge_margin_px)
        else {
            return false;
        };

        element.set_left(update.left);
        {
            let mut inner = self.inner.lock();
            if let Some(line) = inner
                .state
                .comparison_mut()
                .and_then(|c| c.split_line.as_mut())
            {
                line.left = update.left;
            }
        }
        self.set_split_position(update.fraction);
        true
    }

    fn on_split_line_up(&self) -> bool {
        let listeners = {
            let mut inner = self.inner.lock();
            inner
                .state
                .comparison_mut()
                .and_then(|c| c.split_line.as_mut())
                .and_then(|line| {
                    line.drag.take().map(|_| {
                        (
                            Arc::clone(&line.listeners.moved),
                            Arc::clone(&line.listeners.up),
                        )
                    })
                })
        };
        let Some((moved, up)) = listeners else {
            return false;
        };

        let document = self.host.viewer.document();
        self.input.detach(document.as_ref(), InputPhase::Move, &moved);
        self.input.detach(document.as_ref(), InputPhase::Up, &up);
        true
    }
}

impl OffsetTarget for ComparisonSession {
    fn current_offset(&self) -> Option<DVec3> {
        self.offset()
    }

    fn apply_offset(&self, offset: DVec3) {
        self.set_offset(offset);
    }
}
