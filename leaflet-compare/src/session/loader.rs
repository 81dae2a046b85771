//! Model loading protocol.
//!
//! ```text
//! location ──► Document ──► 2D geometry item ──► viewable path
//!          ──► extension ──► loader (must be leaflet) ──► TileModel
//!          ──► (next tick) ──► on_loaded(model) decides success
//! ```

use std::sync::Arc;

use crate::error::{CompareError, CompareResult};
use crate::host::{file_extension, LoaderKind};
use crate::model::TileModel;

use super::ComparisonSession;

impl ComparisonSession {
    /// Load a tiled model without adding it to the scene.
    ///
    /// The model is handed to `on_loaded` one tick after the loader reports
    /// completion, so the loader's own bookkeeping for the model has settled.
    /// The outcome of `on_loaded` is the outcome of the load.
    pub(crate) async fn load_model<F>(
        &self,
        location: &str,
        item_id: Option<&str>,
        on_loaded: F,
    ) -> CompareResult<()>
    where
        F: FnOnce(Arc<dyn TileModel>) -> CompareResult<()>,
    {
        let models = &self.host.models;

        let document = models.load_document(location).await.map_err(|reason| {
            tracing::error!(location, reason = %reason, "Error loading document");
            CompareError::DocumentLoadFailure {
                location: location.to_string(),
                reason,
            }
        })?;

        let path = document
            .geometry_item(item_id)
            .and_then(|item| document.viewable_path(item))
            .ok_or_else(|| {
                tracing::error!(location, ?item_id, "Can not load geometries");
                CompareError::NoGeometry {
                    location: location.to_string(),
                }
            })?;

        let extension = file_extension(&path);
        if models.loader_for_extension(extension.as_deref()) != Some(LoaderKind::Leaflet) {
            tracing::error!(
                path = %path,
                extension = ?extension,
                "File extension not supported for comparison"
            );
            return Err(CompareError::UnsupportedFileExtension { extension });
        }

        let options = document.load_options();
        tracing::debug!(location, path = %path, "Loading tiled model");

        let model = models.load_tiles(&path, &options).await.map_err(|reason| {
            tracing::error!(path = %path, reason = %reason, "Error loading model for compare");
            CompareError::ModelLoadFailure { reason }
        })?;

        tokio::task::yield_now().await;

        on_loaded(model)
    }
}
