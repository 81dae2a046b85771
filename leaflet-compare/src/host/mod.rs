//! Contracts consumed from the host viewer.
//!
//! The comparison session is embedded in a viewer that owns rendering, the
//! camera, tool dispatch and model loading. Those capabilities are reached
//! through the traits in this module so the session can be driven by any
//! viewer (and by mocks in tests).
//!
//! ```text
//! ┌──────────────────────────── host ────────────────────────────┐
//! │  Viewer          scene membership, camera, navigation lock,  │
//! │                  progress, spinner, split-line element       │
//! │  ToolController  register / activate named tools             │
//! │  ModelSource     document manifests, loader selection,       │
//! │                  tile dataset loading                        │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! All traits are `Send + Sync` and use `&self`; implementations keep their
//! own interior mutability.

mod document;

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use glam::{DMat4, DVec2, DVec3};

use crate::config::SplitLineLayout;
use crate::diff::DiffIterator;
use crate::gestures::EventTarget;
use crate::model::{ModelId, TileModel};
use crate::tool::Tool;

pub use document::{file_extension, Document, DocumentItem, LoadOptions, GEOMETRY_TYPE, ROLE_2D};

/// Boxed future type for dyn-compatible async methods.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Canvas bounds in client (page) pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CanvasRect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl CanvasRect {
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }
}

/// What the viewer's progress indicator is reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressState {
    Loading,
    Rendering,
}

/// Which navigation actions stay enabled while navigation is locked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavigationLockSettings {
    pub pan: bool,
    pub zoom: bool,
}

impl NavigationLockSettings {
    /// Zoom allowed, panning disabled.
    pub fn zoom_only() -> Self {
        Self {
            pan: false,
            zoom: true,
        }
    }
}

/// Loader selected for a file extension.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoaderKind {
    /// Tiled raster (leaflet) loader.
    Leaflet,
    /// Any other 2D or 3D loader.
    Other(String),
}

/// The draggable split-line element shown in split view.
pub trait SplitLineElement: EventTarget {
    /// Move the element's left edge, in client pixels.
    fn set_left(&self, left: f64);

    /// Current left edge, in client pixels.
    fn left(&self) -> f64;

    /// Show or hide the element.
    fn set_visible(&self, visible: bool);

    /// Detach the element from the viewer.
    fn remove(&self);
}

/// Rendering, camera and scene membership of the host viewer.
pub trait Viewer: Send + Sync {
    /// Model currently displayed, if any.
    fn current_model(&self) -> Option<Arc<dyn TileModel>>;

    /// Add a loaded model to the render scene.
    fn add_model(&self, model: Arc<dyn TileModel>);

    /// Remove a model from the scene and release it.
    fn unload_model(&self, id: ModelId);

    fn hide_model(&self, id: ModelId);

    fn show_model(&self, id: ModelId);

    /// Add a model rendered from a diff iterator, sharing `reference`'s data.
    fn add_diff_model(&self, reference: &Arc<dyn TileModel>, diff: Arc<dyn DiffIterator>)
        -> ModelId;

    /// Force a re-render of the scene.
    fn invalidate(&self);

    /// Fit the camera to the visible scene.
    fn fit_to_view(&self);

    /// Canvas bounds in client pixels.
    fn canvas_rect(&self) -> CanvasRect;

    /// Map canvas pixel coordinates to normalized viewport coordinates.
    fn client_to_viewport(&self, canvas: DVec2) -> DVec3;

    /// View-projection matrix of the active camera.
    fn view_projection(&self) -> DMat4;

    fn set_navigation_lock(&self, locked: bool);

    fn set_navigation_lock_settings(&self, settings: NavigationLockSettings);

    /// Report progress to the viewer's progress indicator.
    fn signal_progress(&self, progress: f64, state: ProgressState);

    /// Whether the viewer has a loading spinner.
    fn has_load_spinner(&self) -> bool;

    fn set_load_spinner_visible(&self, visible: bool);

    /// Event target for the whole page, used to follow drags that leave an element.
    fn document(&self) -> Arc<dyn EventTarget>;

    /// Create the split-line element over the canvas, initially hidden.
    fn create_split_line(
        &self,
        layout: &SplitLineLayout,
        color: Option<&str>,
    ) -> Arc<dyn SplitLineElement>;
}

/// Named tool dispatch of the host viewer.
pub trait ToolController: Send + Sync {
    fn register_tool(&self, tool: Arc<dyn Tool>);

    fn deregister_tool(&self, name: &str);

    fn activate_tool(&self, name: &str);

    fn deactivate_tool(&self, name: &str);
}

/// Document resolution and tile dataset loading.
pub trait ModelSource: Send + Sync {
    /// Resolve the manifest of a document location.
    fn load_document<'a>(&'a self, location: &'a str) -> BoxFuture<'a, Result<Document, String>>;

    /// Loader registered for a file extension, if any.
    fn loader_for_extension(&self, extension: Option<&str>) -> Option<LoaderKind>;

    /// Load a tile dataset without adding it to the scene.
    fn load_tiles<'a>(
        &'a self,
        path: &'a str,
        options: &'a LoadOptions,
    ) -> BoxFuture<'a, Result<Arc<dyn TileModel>, String>>;
}
