//! Mock host for integration tests.
//!
//! Every collaborator records what the session did to it so tests can assert
//! on scene membership, navigation locks, listeners and deferred work.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;

use glam::{DMat4, DVec2, DVec3};
use parking_lot::Mutex;
use tokio::sync::Notify;

use leaflet_compare::config::{CompareConfig, SplitLineLayout};
use leaflet_compare::diff::{
    DiffIterator, DiffIteratorFactory, DiffMode, FirstSceneCallback, ProgressCallback, SceneId,
};
use leaflet_compare::gestures::{EventTarget, InputEvent, InputListener};
use leaflet_compare::host::{
    BoxFuture, CanvasRect, Document, LoadOptions, LoaderKind, ModelSource, NavigationLockSettings,
    ProgressState, SplitLineElement, ToolController, Viewer,
};
use leaflet_compare::model::{BoundingBox, ModelId, TileIterator, TileModel};
use leaflet_compare::scheduler::{DeferredTask, Scheduler};
use leaflet_compare::session::{CompareHost, ComparisonSession};
use leaflet_compare::tool::Tool;

// ============================================================================
// Models
// ============================================================================

#[derive(Default)]
pub struct MockIterator {
    prefetch: AtomicBool,
}

impl MockIterator {
    pub fn prefetching(&self) -> bool {
        self.prefetch.load(Ordering::SeqCst)
    }
}

impl TileIterator for MockIterator {
    fn set_aggressive_prefetching(&self, enabled: bool) {
        self.prefetch.store(enabled, Ordering::SeqCst);
    }
}

pub struct MockTileModel {
    pub id: ModelId,
    pub leaflet: bool,
    pub iterator: Arc<MockIterator>,
}

impl MockTileModel {
    pub fn leaflet(id: u32) -> Arc<Self> {
        Arc::new(Self {
            id: ModelId(id),
            leaflet: true,
            iterator: Arc::new(MockIterator::default()),
        })
    }

    pub fn other(id: u32) -> Arc<Self> {
        Arc::new(Self {
            id: ModelId(id),
            leaflet: false,
            iterator: Arc::new(MockIterator::default()),
        })
    }
}

impl TileModel for MockTileModel {
    fn id(&self) -> ModelId {
        self.id
    }

    fn is_leaflet(&self) -> bool {
        self.leaflet
    }

    fn bounding_box(&self) -> BoundingBox {
        BoundingBox {
            min: DVec3::ZERO,
            max: DVec3::new(1024.0, 768.0, 0.0),
        }
    }

    fn iterator(&self) -> Arc<dyn TileIterator> {
        self.iterator.clone()
    }
}

// ============================================================================
// Event targets and split-line element
// ============================================================================

#[derive(Default)]
pub struct MockEventTarget {
    listeners: Mutex<Vec<(&'static str, InputListener)>>,
}

impl MockEventTarget {
    /// Deliver `event` to every listener registered under `name`.
    pub fn dispatch(&self, name: &str, event: &InputEvent) -> bool {
        let matching: Vec<InputListener> = self
            .listeners
            .lock()
            .iter()
            .filter(|(n, _)| *n == name)
            .map(|(_, l)| Arc::clone(l))
            .collect();

        let mut handled = false;
        for listener in matching {
            handled |= listener(event);
        }
        handled
    }

    pub fn listener_count(&self, name: &str) -> usize {
        self.listeners
            .lock()
            .iter()
            .filter(|(n, _)| *n == name)
            .count()
    }

    pub fn total_listeners(&self) -> usize {
        self.listeners.lock().len()
    }
}

impl EventTarget for MockEventTarget {
    fn add_event_listener(&self, name: &'static str, listener: InputListener) {
        self.listeners.lock().push((name, listener));
    }

    fn remove_event_listener(&self, name: &'static str, listener: &InputListener) {
        self.listeners
            .lock()
            .retain(|(n, l)| !(*n == name && Arc::ptr_eq(l, listener)));
    }
}

pub struct MockSplitElement {
    pub target: MockEventTarget,
    pub layout: SplitLineLayout,
    pub color: Option<String>,
    left: Mutex<f64>,
    visible: AtomicBool,
    removed: AtomicBool,
}

impl MockSplitElement {
    pub fn is_visible(&self) -> bool {
        self.visible.load(Ordering::SeqCst)
    }

    pub fn is_removed(&self) -> bool {
        self.removed.load(Ordering::SeqCst)
    }
}

impl EventTarget for MockSplitElement {
    fn add_event_listener(&self, name: &'static str, listener: InputListener) {
        self.target.add_event_listener(name, listener);
    }

    fn remove_event_listener(&self, name: &'static str, listener: &InputListener) {
        self.target.remove_event_listener(name, listener);
    }
}

impl SplitLineElement for MockSplitElement {
    fn set_left(&self, left: f64) {
        *self.left.lock() = left;
    }

    fn left(&self) -> f64 {
        *self.left.lock()
    }

    fn set_visible(&self, visible: bool) {
        self.visible.store(visible, Ordering::SeqCst);
    }

    fn remove(&self) {
        self.removed.store(true, Ordering::SeqCst);
    }
}

// ============================================================================
// Viewer
// ============================================================================

#[derive(Default)]
pub struct ViewerLog {
    /// Models in the scene, including diff models.
    pub scene: Vec<ModelId>,
    pub hidden: HashSet<ModelId>,
    pub unloaded: Vec<ModelId>,
    pub diff_models: Vec<ModelId>,
    pub invalidations: u32,
    pub fits: u32,
    pub navigation_locked: bool,
    pub lock_settings: Option<NavigationLockSettings>,
    pub spinner_visible: bool,
    pub progress: Vec<(f64, ProgressState)>,
}

/// Viewer with a 800x600 canvas at client (100, 0).
///
/// Canvas pixels map one-to-one to viewport coordinates and the camera
/// halves them, so a canvas point unprojects to twice its coordinates.
pub struct MockViewer {
    pub log: Mutex<ViewerLog>,
    pub current: Mutex<Option<Arc<dyn TileModel>>>,
    pub document: Arc<MockEventTarget>,
    pub split_elements: Mutex<Vec<Arc<MockSplitElement>>>,
    pub canvas: CanvasRect,
    has_spinner: bool,
    next_diff_id: AtomicU32,
}

impl MockViewer {
    pub fn new(has_spinner: bool) -> Self {
        Self {
            log: Mutex::new(ViewerLog::default()),
            current: Mutex::new(None),
            document: Arc::new(MockEventTarget::default()),
            split_elements: Mutex::new(Vec::new()),
            canvas: CanvasRect::new(100.0, 0.0, 800.0, 600.0),
            has_spinner,
            next_diff_id: AtomicU32::new(1000),
        }
    }

    pub fn in_scene(&self, id: ModelId) -> bool {
        self.log.lock().scene.contains(&id)
    }

    pub fn is_hidden(&self, id: ModelId) -> bool {
        self.log.lock().hidden.contains(&id)
    }

    /// In the scene and not hidden.
    pub fn is_shown(&self, id: ModelId) -> bool {
        let log = self.log.lock();
        log.scene.contains(&id) && !log.hidden.contains(&id)
    }

    pub fn split_element(&self) -> Option<Arc<MockSplitElement>> {
        self.split_elements.lock().last().cloned()
    }
}

impl Viewer for MockViewer {
    fn current_model(&self) -> Option<Arc<dyn TileModel>> {
        self.current.lock().clone()
    }

    fn add_model(&self, model: Arc<dyn TileModel>) {
        self.log.lock().scene.push(model.id());
    }

    fn unload_model(&self, id: ModelId) {
        let mut log = self.log.lock();
        log.scene.retain(|m| *m != id);
        log.hidden.remove(&id);
        log.unloaded.push(id);
    }

    fn hide_model(&self, id: ModelId) {
        self.log.lock().hidden.insert(id);
    }

    fn show_model(&self, id: ModelId) {
        self.log.lock().hidden.remove(&id);
    }

    fn add_diff_model(&self, _reference: &Arc<dyn TileModel>, _diff: Arc<dyn DiffIterator>) -> ModelId {
        let id = ModelId(self.next_diff_id.fetch_add(1, Ordering::SeqCst));
        let mut log = self.log.lock();
        log.scene.push(id);
        log.diff_models.push(id);
        id
    }

    fn invalidate(&self) {
        self.log.lock().invalidations += 1;
    }

    fn fit_to_view(&self) {
        self.log.lock().fits += 1;
    }

    fn canvas_rect(&self) -> CanvasRect {
        self.canvas
    }

    fn client_to_viewport(&self, canvas: DVec2) -> DVec3 {
        canvas.extend(0.0)
    }

    fn view_projection(&self) -> DMat4 {
        DMat4::from_scale(DVec3::new(0.5, 0.5, 1.0))
    }

    fn set_navigation_lock(&self, locked: bool) {
        self.log.lock().navigation_locked = locked;
    }

    fn set_navigation_lock_settings(&self, settings: NavigationLockSettings) {
        self.log.lock().lock_settings = Some(settings);
    }

    fn signal_progress(&self, progress: f64, state: ProgressState) {
        self.log.lock().progress.push((progress, state));
    }

    fn has_load_spinner(&self) -> bool {
        self.has_spinner
    }

    fn set_load_spinner_visible(&self, visible: bool) {
        self.log.lock().spinner_visible = visible;
    }

    fn document(&self) -> Arc<dyn EventTarget> {
        self.document.clone()
    }

    fn create_split_line(
        &self,
        layout: &SplitLineLayout,
        color: Option<&str>,
    ) -> Arc<dyn SplitLineElement> {
        let element = Arc::new(MockSplitElement {
            target: MockEventTarget::default(),
            layout: *layout,
            color: color.map(str::to_string),
            left: Mutex::new(0.0),
            visible: AtomicBool::new(false),
            removed: AtomicBool::new(false),
        });
        self.split_elements.lock().push(Arc::clone(&element));
        element
    }
}

// ============================================================================
// Tool controller
// ============================================================================

#[derive(Default)]
pub struct MockToolController {
    tools: Mutex<Vec<Arc<dyn Tool>>>,
    active: Mutex<Vec<String>>,
}

impl MockToolController {
    fn find(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools
            .lock()
            .iter()
            .find(|t| t.names().iter().any(|n| *n == name))
            .cloned()
    }

    pub fn is_registered(&self, name: &str) -> bool {
        self.find(name).is_some()
    }

    pub fn is_active(&self, name: &str) -> bool {
        self.active.lock().iter().any(|n| n == name)
    }
}

impl ToolController for MockToolController {
    fn register_tool(&self, tool: Arc<dyn Tool>) {
        self.tools.lock().push(tool);
    }

    fn deregister_tool(&self, name: &str) {
        self.tools
            .lock()
            .retain(|t| !t.names().iter().any(|n| *n == name));
    }

    fn activate_tool(&self, name: &str) {
        if let Some(tool) = self.find(name) {
            tool.activate(name);
            self.active.lock().push(name.to_string());
        }
    }

    fn deactivate_tool(&self, name: &str) {
        if let Some(tool) = self.find(name) {
            tool.deactivate(name);
        }
        self.active.lock().retain(|n| n != name);
    }
}

// ============================================================================
// Model source
// ============================================================================

#[derive(Default)]
pub struct MockModelSource {
    documents: Mutex<HashMap<String, Result<Document, String>>>,
    tiles: Mutex<HashMap<String, Result<Arc<MockTileModel>, String>>>,
    gates: Mutex<HashMap<String, Arc<Notify>>>,
    pub document_requests: Mutex<Vec<String>>,
    pub tile_requests: Mutex<Vec<(String, LoadOptions)>>,
}

/// Manifest with one 2D geometry item backed by `path`.
pub fn manifest(guid: &str, path: &str) -> Document {
    let json = format!(
        r#"{{
            "root": {{
                "guid": "root",
                "children": [{{
                    "guid": "{guid}",
                    "type": "geometry",
                    "role": "2d",
                    "children": [{{ "guid": "{guid}-res", "type": "resource", "urn": "{path}" }}]
                }}]
            }},
            "property_db_path": "db/{guid}",
            "acm_session_id": "acm-{guid}"
        }}"#
    );
    Document::from_json(&json).unwrap()
}

impl MockModelSource {
    /// Serve a tiled model at `location`.
    pub fn add_tiles(&self, location: &str, model: Arc<MockTileModel>) {
        let path = format!("{location}/tiles.json");
        self.documents
            .lock()
            .insert(location.to_string(), Ok(manifest(location, &path)));
        self.tiles.lock().insert(path, Ok(model));
    }

    /// Serve a document whose viewable is a non-tiled file.
    pub fn add_pdf(&self, location: &str) {
        let path = format!("{location}/sheet.pdf");
        self.documents
            .lock()
            .insert(location.to_string(), Ok(manifest(location, &path)));
    }

    /// Serve a document whose tile load fails.
    pub fn add_broken_tiles(&self, location: &str, reason: &str) {
        let path = format!("{location}/tiles.json");
        self.documents
            .lock()
            .insert(location.to_string(), Ok(manifest(location, &path)));
        self.tiles.lock().insert(path, Err(reason.to_string()));
    }

    /// Hold the tile load of `location` until the returned gate is notified.
    pub fn gate(&self, location: &str) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        self.gates
            .lock()
            .insert(format!("{location}/tiles.json"), Arc::clone(&gate));
        gate
    }

    pub fn tile_request_count(&self) -> usize {
        self.tile_requests.lock().len()
    }
}

impl ModelSource for MockModelSource {
    fn load_document<'a>(&'a self, location: &'a str) -> BoxFuture<'a, Result<Document, String>> {
        Box::pin(async move {
            self.document_requests.lock().push(location.to_string());
            self.documents
                .lock()
                .get(location)
                .cloned()
                .unwrap_or_else(|| Err(format!("document not found: {location}")))
        })
    }

    fn loader_for_extension(&self, extension: Option<&str>) -> Option<LoaderKind> {
        match extension {
            Some("json") => Some(LoaderKind::Leaflet),
            Some(other) => Some(LoaderKind::Other(other.to_string())),
            None => None,
        }
    }

    fn load_tiles<'a>(
        &'a self,
        path: &'a str,
        options: &'a LoadOptions,
    ) -> BoxFuture<'a, Result<Arc<dyn TileModel>, String>> {
        Box::pin(async move {
            self.tile_requests
                .lock()
                .push((path.to_string(), options.clone()));

            let gate = self.gates.lock().get(path).cloned();
            if let Some(gate) = gate {
                gate.notified().await;
            }

            let result = self
                .tiles
                .lock()
                .get(path)
                .cloned()
                .unwrap_or_else(|| Err(format!("no tiles at {path}")));
            result.map(|m| m as Arc<dyn TileModel>)
        })
    }
}

// ============================================================================
// Diff iterator
// ============================================================================

pub struct MockDiffIterator {
    pub scene: SceneId,
    offset: Mutex<DVec3>,
    pub split_positions: Mutex<Vec<f64>>,
    pub modes: Mutex<Vec<DiffMode>>,
    scene_visible: AtomicBool,
    first_scene: Mutex<Option<FirstSceneCallback>>,
    progress: Mutex<Option<ProgressCallback>>,
}

impl MockDiffIterator {
    fn new(scene: SceneId) -> Self {
        Self {
            scene,
            offset: Mutex::new(DVec3::ZERO),
            split_positions: Mutex::new(Vec::new()),
            modes: Mutex::new(Vec::new()),
            scene_visible: AtomicBool::new(true),
            first_scene: Mutex::new(None),
            progress: Mutex::new(None),
        }
    }

    pub fn is_scene_visible(&self) -> bool {
        self.scene_visible.load(Ordering::SeqCst)
    }

    pub fn last_split_position(&self) -> Option<f64> {
        self.split_positions.lock().last().copied()
    }

    pub fn last_mode(&self) -> Option<DiffMode> {
        self.modes.lock().last().copied()
    }

    /// Simulate completion of the first traversal.
    pub fn complete_first_scene(&self) {
        let callback = self.first_scene.lock().take();
        if let Some(callback) = callback {
            callback();
        }
    }

    pub fn report_progress(&self, fraction: f64) {
        if let Some(callback) = self.progress.lock().as_ref() {
            callback(fraction);
        }
    }
}

impl DiffIterator for MockDiffIterator {
    fn set_offset(&self, offset: DVec3) {
        *self.offset.lock() = offset;
    }

    fn offset(&self) -> DVec3 {
        *self.offset.lock()
    }

    fn set_split_position(&self, fraction: f64) {
        self.split_positions.lock().push(fraction);
    }

    fn set_diff_mode(&self, mode: DiffMode) {
        self.modes.lock().push(mode);
    }

    fn scene(&self) -> SceneId {
        self.scene
    }

    fn set_scene_visible(&self, visible: bool) {
        self.scene_visible.store(visible, Ordering::SeqCst);
    }

    fn on_first_scene_complete(&self, callback: FirstSceneCallback) {
        *self.first_scene.lock() = Some(callback);
    }

    fn on_progress(&self, callback: ProgressCallback) {
        *self.progress.lock() = Some(callback);
    }
}

#[derive(Default)]
pub struct MockDiffFactory {
    pub created: Mutex<Vec<Arc<MockDiffIterator>>>,
}

impl MockDiffFactory {
    pub fn last(&self) -> Option<Arc<MockDiffIterator>> {
        self.created.lock().last().cloned()
    }
}

impl DiffIteratorFactory for MockDiffFactory {
    fn create(
        &self,
        _iter_a: Arc<dyn TileIterator>,
        _iter_b: Arc<dyn TileIterator>,
    ) -> Arc<dyn DiffIterator> {
        let mut created = self.created.lock();
        let diff = Arc::new(MockDiffIterator::new(SceneId(created.len() as u32 + 1)));
        created.push(Arc::clone(&diff));
        diff
    }
}

// ============================================================================
// Scheduler
// ============================================================================

/// Scheduler that queues tasks until the test runs them.
#[derive(Default)]
pub struct ManualScheduler {
    tasks: Mutex<Vec<DeferredTask>>,
}

impl ManualScheduler {
    pub fn pending(&self) -> usize {
        self.tasks.lock().len()
    }

    /// Run every queued task, including tasks queued while running.
    pub fn run_pending(&self) {
        loop {
            let tasks: Vec<DeferredTask> = std::mem::take(&mut *self.tasks.lock());
            if tasks.is_empty() {
                break;
            }
            for task in tasks {
                task();
            }
        }
    }
}

impl Scheduler for ManualScheduler {
    fn defer(&self, task: DeferredTask) {
        self.tasks.lock().push(task);
    }
}

// ============================================================================
// Harness
// ============================================================================

pub struct Harness {
    pub viewer: Arc<MockViewer>,
    pub tools: Arc<MockToolController>,
    pub models: Arc<MockModelSource>,
    pub diffs: Arc<MockDiffFactory>,
    pub scheduler: Arc<ManualScheduler>,
    pub session: Arc<ComparisonSession>,
}

impl Harness {
    pub fn new(config: CompareConfig) -> Self {
        Self::build(config, false)
    }

    pub fn with_spinner(config: CompareConfig) -> Self {
        Self::build(config, true)
    }

    fn build(config: CompareConfig, has_spinner: bool) -> Self {
        let viewer = Arc::new(MockViewer::new(has_spinner));
        let tools = Arc::new(MockToolController::default());
        let models = Arc::new(MockModelSource::default());
        let diffs = Arc::new(MockDiffFactory::default());
        let scheduler = Arc::new(ManualScheduler::default());

        let host = CompareHost::new(
            viewer.clone(),
            tools.clone(),
            models.clone(),
            diffs.clone(),
            tokio::runtime::Handle::current(),
        )
        .with_scheduler(scheduler.clone());
        let session = ComparisonSession::load(config, host);

        Self {
            viewer,
            tools,
            models,
            diffs,
            scheduler,
            session,
        }
    }

    /// Show `model` as the viewer's current model.
    pub fn display(&self, model: Arc<MockTileModel>) {
        self.viewer.add_model(model.clone());
        *self.viewer.current.lock() = Some(model);
    }

    /// Display a tiled model A and compare it with a tiled model B.
    pub async fn start_with_current(&self) -> (Arc<MockTileModel>, Arc<MockTileModel>) {
        let a = MockTileModel::leaflet(1);
        let b = MockTileModel::leaflet(2);
        self.display(a.clone());
        self.models.add_tiles("urn:b", b.clone());
        self.session
            .compare_model_with_current("urn:b", None)
            .await
            .unwrap();
        (a, b)
    }

    pub fn diff(&self) -> Arc<MockDiffIterator> {
        self.diffs.last().unwrap()
    }
}
