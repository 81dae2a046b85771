//! Contract of the diff iterator.
//!
//! The diff iterator belongs to the host's tile engine. It merges the
//! traversals of two tile models into one comparison scene. The session only
//! drives it through [`DiffIterator`] and creates it through a
//! [`DiffIteratorFactory`].
//!
//! # Callbacks
//!
//! ```text
//! traversal ──► on_progress(fraction) ──► viewer progress indicator
//!           └─► on_first_scene_complete() (once) ──► hide spinner, show scene
//! ```

use std::fmt;
use std::sync::Arc;

use glam::DVec3;

use crate::model::TileIterator;

/// Callback fired once, after the first full traversal of both models.
pub type FirstSceneCallback = Box<dyn FnOnce() + Send>;

/// Callback fired repeatedly with the traversal progress in `[0, 1]`.
pub type ProgressCallback = Box<dyn Fn(f64) + Send + Sync>;

/// How the two models are visualised against each other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DiffMode {
    /// Both models merged into one image.
    #[default]
    Overlay,
    /// A left of a vertical split line, B right of it.
    SplitView,
    /// Pixels that differ between A and B are highlighted.
    Highlight,
    /// Engine-specific mode, forwarded unchanged.
    Custom(u32),
}

impl fmt::Display for DiffMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiffMode::Overlay => write!(f, "overlay"),
            DiffMode::SplitView => write!(f, "split-view"),
            DiffMode::Highlight => write!(f, "highlight"),
            DiffMode::Custom(n) => write!(f, "custom({})", n),
        }
    }
}

/// Handle to the scene produced by a diff iterator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SceneId(pub u32);

/// Merged traversal of two tile models.
///
/// Implementations use interior mutability; every method takes `&self`.
pub trait DiffIterator: Send + Sync {
    /// World-space translation applied to model B.
    fn set_offset(&self, offset: DVec3);

    /// Current offset of model B.
    fn offset(&self) -> DVec3;

    /// Split fraction from 0 (left edge) to 1 (right edge) of the canvas.
    fn set_split_position(&self, fraction: f64);

    /// Select the visualisation mode.
    fn set_diff_mode(&self, mode: DiffMode);

    /// Scene holding the merged tiles.
    fn scene(&self) -> SceneId;

    /// Show or hide the merged scene.
    fn set_scene_visible(&self, visible: bool);

    /// Register the first-scene-complete callback.
    fn on_first_scene_complete(&self, callback: FirstSceneCallback);

    /// Register the traversal progress callback.
    fn on_progress(&self, callback: ProgressCallback);
}

/// Builds diff iterators from a pair of tile iterators.
pub trait DiffIteratorFactory: Send + Sync {
    /// Merge the traversals of model A and model B.
    fn create(
        &self,
        iter_a: Arc<dyn TileIterator>,
        iter_b: Arc<dyn TileIterator>,
    ) -> Arc<dyn DiffIterator>;
}
