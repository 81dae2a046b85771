//! Session state variants.

use std::sync::Arc;

use crate::diff::{DiffIterator, DiffMode};
use crate::model::{ModelId, TileModel};

use super::split_line::SplitLine;

/// Coarse phase of a comparison session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    /// Single model, nothing compared.
    Idle,
    /// The comparison model is being loaded.
    Loading,
    /// Two models are being compared.
    Comparing,
}

/// An active comparison. Model B and its diff iterator exist together or not at all.
pub(crate) struct Comparison {
    pub model_b: Arc<dyn TileModel>,
    pub diff: Arc<dyn DiffIterator>,
    /// Model the viewer renders the diff scene through.
    pub diff_model: ModelId,
    pub diff_mode: DiffMode,
    /// Kept across mode changes; only used in split view.
    pub split_position: f64,
    /// Created on first entry into split view.
    pub split_line: Option<SplitLine>,
}

/// A comparison being prepared while model B loads.
pub(crate) struct PendingComparison {
    pub location: String,
    /// Reference model the new comparison will use.
    pub model_a: Arc<dyn TileModel>,
    /// A was added to the scene by the session rather than by the host.
    pub owns_model_a: bool,
    /// Comparison that stays live until the new one is ready.
    pub previous: Option<Comparison>,
}

pub(crate) enum SessionState {
    Idle,
    Loading(PendingComparison),
    Comparing(Comparison),
}

impl SessionState {
    pub fn phase(&self) -> SessionPhase {
        match self {
            SessionState::Idle => SessionPhase::Idle,
            SessionState::Loading(_) => SessionPhase::Loading,
            SessionState::Comparing(_) => SessionPhase::Comparing,
        }
    }

    /// The live comparison, including one being replaced by a pending load.
    pub fn comparison(&self) -> Option<&Comparison> {
        match self {
            SessionState::Comparing(c) => Some(c),
            SessionState::Loading(pending) => pending.previous.as_ref(),
            SessionState::Idle => None,
        }
    }

    pub fn comparison_mut(&mut self) -> Option<&mut Comparison> {
        match self {
            SessionState::Comparing(c) => Some(c),
            SessionState::Loading(pending) => pending.previous.as_mut(),
            SessionState::Idle => None,
        }
    }
}

/// Mutable part of a session, guarded by the session's lock.
pub(crate) struct SessionInner {
    /// Reference model; kept after a comparison ends so it can be restored.
    pub model_a: Option<Arc<dyn TileModel>>,
    /// `model_a` was added to the scene by the session.
    pub owns_model_a: bool,
    pub state: SessionState,
    /// Bumped whenever a comparison starts or ends; loads carry the value
    /// they started under and are dropped if it changed.
    pub generation: u64,
    /// Model A waiting for its deferred hide.
    pub pending_hide: Option<ModelId>,
}

impl SessionInner {
    pub fn new() -> Self {
        Self {
            model_a: None,
            owns_model_a: false,
            state: SessionState::Idle,
            generation: 0,
            pending_hide: None,
        }
    }

    /// Whether `id` is the reference model of the live or last comparison.
    pub fn is_model_a(&self, id: ModelId) -> bool {
        self.model_a.as_ref().is_some_and(|a| a.id() == id)
    }

    /// Give up a pending reference model the session added itself.
    ///
    /// Returns the id to unload when nothing else uses the model, cancelling
    /// its deferred hide.
    pub fn release_pending_model_a(&mut self, pending: &PendingComparison) -> Option<ModelId> {
        let id = pending.model_a.id();
        if !pending.owns_model_a || self.is_model_a(id) {
            return None;
        }
        if self.pending_hide == Some(id) {
            self.pending_hide = None;
        }
        Some(id)
    }
}
