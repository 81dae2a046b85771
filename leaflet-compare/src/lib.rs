//! Leaflet Compare - side-by-side comparison of tiled raster models
//!
//! This library drives a comparison session inside a host viewer: a reference
//! tiled (leaflet) model is compared with a second one through a diff
//! iterator, with controls for offset, diff mode, split position and drag
//! alignment.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                     ComparisonSession                        │
//! │  lifecycle: Idle ─► Loading ─► Comparing ─► Idle             │
//! │  controls:  offset, diff mode, split position, align mode    │
//! └──────┬───────────────┬───────────────┬───────────────┬───────┘
//!        │               │               │               │
//!        ▼               ▼               ▼               ▼
//!   ModelSource    DiffIterator     AlignmentTool    Split line
//!   (documents,    (merged tile     (drag offset     (drag split
//!    tile loads)    traversal)       in world)        fraction)
//!        │               │               │               │
//!        └───────────────┴───── Viewer ──┴───────────────┘
//! ```
//!
//! Host capabilities are consumed through the traits in [`host`]; the
//! session never renders anything itself.

pub mod config;
pub mod diff;
pub mod error;
pub mod gestures;
pub mod host;
pub mod logging;
pub mod model;
pub mod scheduler;
pub mod session;
pub mod tool;

pub use config::{CompareConfig, PlatformCaps, SplitLineStyle};
pub use diff::{DiffIterator, DiffIteratorFactory, DiffMode};
pub use error::{CompareError, CompareResult};
pub use host::{ModelSource, ToolController, Viewer};
pub use model::{ModelId, TileModel};
pub use session::{CompareHost, ComparisonSession, SessionPhase};
pub use tool::{AlignmentTool, ALIGNMENT_TOOL_NAME};
