//! Tiled model handles.
//!
//! A [`TileModel`] is an opaque handle to a loaded, paged raster dataset owned
//! by the host's tile engine. The comparison session never decodes tiles; it
//! only needs the model's identity, its kind, and its [`TileIterator`].

use std::fmt;
use std::sync::Arc;

use glam::DVec3;

/// Identity of a model inside the host viewer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ModelId(pub u32);

impl fmt::Display for ModelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "model#{}", self.0)
    }
}

/// Axis-aligned bounding volume of a model in world space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min: DVec3,
    pub max: DVec3,
}

impl BoundingBox {
    /// Create a bounding box from its corners.
    pub fn new(min: DVec3, max: DVec3) -> Self {
        Self { min, max }
    }

    /// Center of the box.
    pub fn center(&self) -> DVec3 {
        (self.min + self.max) * 0.5
    }

    /// Extent of the box along each axis.
    pub fn size(&self) -> DVec3 {
        self.max - self.min
    }
}

/// Per-model tile traversal.
pub trait TileIterator: Send + Sync {
    /// Toggle aggressive prefetching of neighbouring tiles.
    ///
    /// Used while comparing to reduce popping when one model is dragged
    /// against the other.
    fn set_aggressive_prefetching(&self, enabled: bool);
}

/// A loaded dataset as seen by the comparison session.
pub trait TileModel: Send + Sync {
    /// Identity of the model in the host viewer.
    fn id(&self) -> ModelId;

    /// Whether the dataset is tile based (leaflet).
    fn is_leaflet(&self) -> bool;

    /// World-space bounds of the dataset.
    fn bounding_box(&self) -> BoundingBox;

    /// Traversal object used to render the model.
    fn iterator(&self) -> Arc<dyn TileIterator>;
}

impl fmt::Debug for dyn TileModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TileModel")
            .field("id", &self.id())
            .field("is_leaflet", &self.is_leaflet())
            .finish_non_exhaustive()
    }
}
