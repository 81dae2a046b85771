//! Cross-device input helpers.
//!
//! Mouse, touch and pointer input are normalised here so the alignment tool
//! and the split line share one code path. The set of event families to
//! listen for is chosen once from [`PlatformCaps`] when an [`InputScheme`] is
//! built:
//!
//! | Platform                     | Families         |
//! |------------------------------|------------------|
//! | pointer events only (IE11)   | pointer          |
//! | desktop                      | mouse            |
//! | desktop with touch screen    | mouse, touch     |
//! | mobile                       | touch            |

use std::sync::Arc;

use glam::{DVec2, DVec3};

use crate::config::PlatformCaps;
use crate::host::Viewer;

/// Phase of an input gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputPhase {
    Down,
    Move,
    Up,
}

/// Family of platform input events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputFamily {
    Pointer,
    Mouse,
    Touch,
}

impl InputFamily {
    /// Platform event name for a phase of this family.
    pub fn event_name(self, phase: InputPhase) -> &'static str {
        match (self, phase) {
            (InputFamily::Pointer, InputPhase::Down) => "pointerdown",
            (InputFamily::Pointer, InputPhase::Move) => "pointermove",
            (InputFamily::Pointer, InputPhase::Up) => "pointerup",
            (InputFamily::Mouse, InputPhase::Down) => "mousedown",
            (InputFamily::Mouse, InputPhase::Move) => "mousemove",
            (InputFamily::Mouse, InputPhase::Up) => "mouseup",
            (InputFamily::Touch, InputPhase::Down) => "touchstart",
            (InputFamily::Touch, InputPhase::Move) => "touchmove",
            (InputFamily::Touch, InputPhase::Up) => "touchend",
        }
    }
}

/// Device that produced a pointer event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerType {
    Mouse,
    Pen,
    Touch,
}

/// A platform input event.
#[derive(Debug, Clone, PartialEq)]
pub struct InputEvent {
    pub family: InputFamily,
    pub phase: InputPhase,
    /// Client coordinates for mouse and pointer events.
    pub client: DVec2,
    /// Active touch points, for touch events.
    pub touches: Vec<DVec2>,
    /// Device type, for pointer events.
    pub pointer_type: Option<PointerType>,
}

impl InputEvent {
    pub fn mouse(phase: InputPhase, x: f64, y: f64) -> Self {
        Self {
            family: InputFamily::Mouse,
            phase,
            client: DVec2::new(x, y),
            touches: Vec::new(),
            pointer_type: None,
        }
    }

    pub fn touch(phase: InputPhase, touches: Vec<DVec2>) -> Self {
        Self {
            family: InputFamily::Touch,
            phase,
            client: DVec2::ZERO,
            touches,
            pointer_type: None,
        }
    }

    pub fn pointer(phase: InputPhase, x: f64, y: f64, pointer_type: PointerType) -> Self {
        Self {
            family: InputFamily::Pointer,
            phase,
            client: DVec2::new(x, y),
            touches: Vec::new(),
            pointer_type: Some(pointer_type),
        }
    }
}

/// Listener attached to an [`EventTarget`].
///
/// Returns `true` when the event was handled and its default action should
/// be suppressed.
pub type InputListener = Arc<dyn Fn(&InputEvent) -> bool + Send + Sync>;

/// Something input listeners can be attached to (an element, the page).
///
/// Listeners are identified by `Arc` identity: removing a listener removes the
/// registration that was added with the same `Arc`.
pub trait EventTarget: Send + Sync {
    fn add_event_listener(&self, name: &'static str, listener: InputListener);

    fn remove_event_listener(&self, name: &'static str, listener: &InputListener);
}

/// Input event families selected for a platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputScheme {
    caps: PlatformCaps,
    families: Vec<InputFamily>,
}

impl InputScheme {
    /// Choose the event families to listen for on this platform.
    pub fn detect(caps: PlatformCaps) -> Self {
        let families = if caps.pointer_events_only {
            vec![InputFamily::Pointer]
        } else {
            let mut families = Vec::with_capacity(2);
            if !caps.mobile {
                families.push(InputFamily::Mouse);
            }
            if caps.touch {
                families.push(InputFamily::Touch);
            }
            families
        };

        tracing::debug!(?families, "Input scheme detected");
        Self { caps, families }
    }

    /// Event families listened for.
    pub fn families(&self) -> &[InputFamily] {
        &self.families
    }

    /// Platform event names for a phase.
    pub fn event_names(&self, phase: InputPhase) -> Vec<&'static str> {
        self.families.iter().map(|f| f.event_name(phase)).collect()
    }

    /// Client coordinates of an event; touch events use their first touch point.
    pub fn client_coords(&self, event: &InputEvent) -> DVec2 {
        if self.caps.pointer_events_only {
            return event.client;
        }

        match event.family {
            InputFamily::Touch => event.touches.first().copied().unwrap_or(event.client),
            _ => event.client,
        }
    }

    /// Whether an event comes from touch input.
    pub fn is_touch_event(&self, event: &InputEvent) -> bool {
        if self.caps.pointer_events_only {
            return event.pointer_type == Some(PointerType::Touch);
        }

        event.family == InputFamily::Touch
    }

    /// Attach `listener` to every event name of `phase`.
    pub fn attach<T>(&self, target: &T, phase: InputPhase, listener: &InputListener)
    where
        T: EventTarget + ?Sized,
    {
        for name in self.event_names(phase) {
            target.add_event_listener(name, Arc::clone(listener));
        }
    }

    /// Detach `listener` from every event name of `phase`.
    pub fn detach<T>(&self, target: &T, phase: InputPhase, listener: &InputListener)
    where
        T: EventTarget + ?Sized,
    {
        for name in self.event_names(phase) {
            target.remove_event_listener(name, listener);
        }
    }
}

/// Unproject canvas pixel coordinates to a world-space point.
///
/// Recomputed on every call; the camera may have moved since the last event.
pub fn client_to_world(viewer: &dyn Viewer, canvas: DVec2) -> DVec3 {
    let viewport = viewer.client_to_viewport(canvas);
    viewer.view_projection().inverse().project_point3(viewport)
}
