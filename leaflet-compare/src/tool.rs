//! Pointer tools and the alignment tool.
//!
//! The host viewer dispatches pointer input to registered [`Tool`]s; a tool
//! returns `true` when it consumed the event, `false` to let other tools and
//! camera navigation handle it.
//!
//! # Alignment state machine
//!
//! ```text
//! Inactive ──activate──► Active ──offset mode on──► Setting
//!                                                     │  ▲
//!                                          button down│  │button up
//!                                                     ▼  │
//!                                                   Dragging
//! any state ──deactivate──► Inactive
//! ```
//!
//! While dragging, every move re-applies the full offset from the anchors
//! captured at button down:
//!
//! ```text
//! offset = world_now - world_at_down + offset_at_down
//! ```
//!
//! so dropped or reordered intermediate moves do not change where the drag
//! ends up.

use std::sync::{Arc, Weak};

use glam::{DVec2, DVec3};
use parking_lot::Mutex;

use crate::gestures::client_to_world;
use crate::host::{NavigationLockSettings, Viewer};

/// Name the alignment tool is registered under.
pub const ALIGNMENT_TOOL_NAME: &str = "leafletCompareAlign";

/// Cursor shown while the offset can be dragged.
pub const MOVE_CURSOR: &str = "move";

/// Mouse button of a button event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseButton {
    Left,
    Middle,
    Right,
}

/// Pointer event as dispatched to tools, in canvas pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ToolEvent {
    pub canvas: DVec2,
}

impl ToolEvent {
    pub fn at(x: f64, y: f64) -> Self {
        Self {
            canvas: DVec2::new(x, y),
        }
    }
}

/// Kind of a recognised gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GestureKind {
    DragStart,
    DragMove,
    DragEnd,
    PinchStart,
    PinchMove,
    PinchEnd,
}

/// Gesture event as dispatched to tools.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GestureEvent {
    pub kind: GestureKind,
    pub canvas: DVec2,
}

/// A tool the host viewer dispatches pointer input to.
pub trait Tool: Send + Sync {
    /// Names the tool can be activated under.
    fn names(&self) -> &[&'static str];

    fn activate(&self, name: &str);

    fn deactivate(&self, name: &str);

    fn is_active(&self) -> bool;

    fn handle_button_down(&self, _event: &ToolEvent, _button: MouseButton) -> bool {
        false
    }

    fn handle_button_up(&self, _event: &ToolEvent, _button: MouseButton) -> bool {
        false
    }

    fn handle_mouse_move(&self, _event: &ToolEvent) -> bool {
        false
    }

    fn handle_gesture(&self, _event: &GestureEvent) -> bool {
        false
    }

    /// Cursor to show while the tool is active.
    fn cursor(&self) -> Option<&'static str> {
        None
    }
}

/// Receiver of offsets computed by the alignment tool.
pub trait OffsetTarget: Send + Sync {
    /// Current offset of the comparison model, `None` when nothing is compared.
    fn current_offset(&self) -> Option<DVec3>;

    fn apply_offset(&self, offset: DVec3);
}

/// Anchors captured when a drag starts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragAnchor {
    /// World point under the pointer at button down.
    pub start_world: DVec3,
    /// Offset of the comparison model at button down.
    pub offset_at_start: DVec3,
}

impl DragAnchor {
    /// Offset to apply when the pointer is over `world`.
    pub fn offset_for(&self, world: DVec3) -> DVec3 {
        world - self.start_world + self.offset_at_start
    }
}

#[derive(Debug, Default)]
struct AlignmentState {
    active: bool,
    setting_offset: bool,
    /// Present only while dragging.
    drag: Option<DragAnchor>,
}

/// Drag-to-offset tool used to align the comparison model against the reference.
pub struct AlignmentTool {
    viewer: Arc<dyn Viewer>,
    target: Weak<dyn OffsetTarget>,
    state: Mutex<AlignmentState>,
}

impl std::fmt::Debug for AlignmentTool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AlignmentTool")
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl AlignmentTool {
    /// Create an inactive tool applying offsets to `target`.
    pub fn new(viewer: Arc<dyn Viewer>, target: Weak<dyn OffsetTarget>) -> Self {
        Self {
            viewer,
            target,
            state: Mutex::new(AlignmentState::default()),
        }
    }

    /// Enter or leave offset-setting mode.
    ///
    /// Entering restricts camera navigation to zoom so pointer drags reach
    /// the tool instead of panning the camera.
    pub fn set_offset_setting_mode(&self, enable: bool) {
        {
            let mut state = self.state.lock();
            state.setting_offset = enable;
            if !enable {
                state.drag = None;
            }
        }

        if enable {
            self.viewer
                .set_navigation_lock_settings(NavigationLockSettings::zoom_only());
            self.viewer.set_navigation_lock(true);
        } else {
            self.viewer.set_navigation_lock(false);
        }
        tracing::debug!(enable, "Alignment offset mode changed");
    }

    pub fn is_setting_offset(&self) -> bool {
        self.state.lock().setting_offset
    }

    pub fn is_dragging(&self) -> bool {
        self.state.lock().drag.is_some()
    }

    /// Anchors of the drag in progress.
    pub fn drag_anchor(&self) -> Option<DragAnchor> {
        self.state.lock().drag
    }
}

impl Tool for AlignmentTool {
    fn names(&self) -> &[&'static str] {
        &[ALIGNMENT_TOOL_NAME]
    }

    fn activate(&self, _name: &str) {
        self.state.lock().active = true;
    }

    fn deactivate(&self, _name: &str) {
        let was_setting = {
            let mut state = self.state.lock();
            let was_setting = state.setting_offset;
            *state = AlignmentState::default();
            was_setting
        };

        if was_setting {
            self.viewer.set_navigation_lock(false);
        }
    }

    fn is_active(&self) -> bool {
        self.state.lock().active
    }

    fn handle_button_down(&self, event: &ToolEvent, _button: MouseButton) -> bool {
        if !self.state.lock().setting_offset {
            return false;
        }

        let Some(offset_at_start) = self.target.upgrade().and_then(|t| t.current_offset()) else {
            return false;
        };
        let start_world = client_to_world(self.viewer.as_ref(), event.canvas);

        self.state.lock().drag = Some(DragAnchor {
            start_world,
            offset_at_start,
        });
        tracing::trace!(?start_world, ?offset_at_start, "Alignment drag started");
        true
    }

    fn handle_button_up(&self, _event: &ToolEvent, _button: MouseButton) -> bool {
        self.state.lock().drag = None;
        false
    }

    fn handle_mouse_move(&self, event: &ToolEvent) -> bool {
        let Some(anchor) = self.state.lock().drag else {
            return false;
        };

        let world = client_to_world(self.viewer.as_ref(), event.canvas);
        if let Some(target) = self.target.upgrade() {
            target.apply_offset(anchor.offset_for(world));
        }
        true
    }

    fn handle_gesture(&self, event: &GestureEvent) -> bool {
        let tool_event = ToolEvent {
            canvas: event.canvas,
        };
        match event.kind {
            GestureKind::DragStart => self.handle_button_down(&tool_event, MouseButton::Left),
            GestureKind::DragMove => self.handle_mouse_move(&tool_event),
            GestureKind::DragEnd => self.handle_button_up(&tool_event, MouseButton::Left),
            _ => false,
        }
    }

    fn cursor(&self) -> Option<&'static str> {
        self.state.lock().setting_offset.then_some(MOVE_CURSOR)
    }
}
