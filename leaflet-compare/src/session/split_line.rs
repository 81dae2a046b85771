//! Draggable split line shown in split view.
//!
//! The element is created the first time split view is entered, hidden
//! (never destroyed) when another mode is selected, and removed when the
//! comparison ends.
//!
//! A drag starts on the element and is then followed on the whole page, so
//! it continues when the pointer leaves the narrow element:
//!
//! ```text
//! element: down ──► attach page move/up
//! page:    move ──► new left, split fraction ──► session.set_split_position
//! page:    up   ──► detach page move/up
//! ```

use std::sync::Arc;

use crate::config::SplitLineLayout;
use crate::gestures::{EventTarget, InputListener, InputPhase, InputScheme};
use crate::host::{CanvasRect, SplitLineElement};

/// Anchors of a split-line drag.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SplitDrag {
    /// Client x of the pointer at drag start.
    pub start_x: f64,
    /// Left edge of the element at drag start.
    pub left_at_start: f64,
    /// The drag was started by touch input.
    pub touch: bool,
}

/// Result of moving the split line.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SplitUpdate {
    /// New left edge of the element, in client pixels.
    pub left: f64,
    /// Split fraction of the canvas width at the element's centre.
    pub fraction: f64,
}

impl SplitDrag {
    /// Where the line goes when the pointer is at `client_x`.
    ///
    /// Returns `None` when the line's centre would come within `margin` of
    /// either canvas edge; the line then stays where it is until the pointer
    /// is back in range.
    pub fn drag_to(
        &self,
        client_x: f64,
        canvas: &CanvasRect,
        container_width: f64,
        margin: f64,
    ) -> Option<SplitUpdate> {
        let left = client_x - self.start_x + self.left_at_start;
        let center = left + container_width / 2.0 - canvas.left;

        if margin < center && center < canvas.width - margin {
            Some(SplitUpdate {
                left,
                fraction: center / canvas.width,
            })
        } else {
            None
        }
    }
}

/// Left edge placing the line's centre at `fraction` of the canvas width.
pub fn left_for_fraction(fraction: f64, canvas: &CanvasRect, container_width: f64) -> f64 {
    canvas.left + canvas.width * fraction - container_width / 2.0
}

/// Listeners wired to the element and to the page.
pub(crate) struct SplitLineListeners {
    pub down: InputListener,
    pub moved: InputListener,
    pub up: InputListener,
}

/// Split-line widget of an active comparison.
pub(crate) struct SplitLine {
    pub element: Arc<dyn SplitLineElement>,
    pub layout: SplitLineLayout,
    pub visible: bool,
    pub left: f64,
    pub drag: Option<SplitDrag>,
    pub listeners: SplitLineListeners,
}

impl SplitLine {
    /// Wrap a freshly created element and start listening for drags on it.
    pub fn attach(
        element: Arc<dyn SplitLineElement>,
        layout: SplitLineLayout,
        left: f64,
        listeners: SplitLineListeners,
        input: &InputScheme,
    ) -> Self {
        element.set_left(left);
        input.attach(element.as_ref(), InputPhase::Down, &listeners.down);

        Self {
            element,
            layout,
            visible: false,
            left,
            drag: None,
            listeners,
        }
    }

    /// Detach every listener and remove the element.
    pub fn destroy(self, document: &dyn EventTarget, input: &InputScheme) {
        if self.drag.is_some() {
            input.detach(document, InputPhase::Move, &self.listeners.moved);
            input.detach(document, InputPhase::Up, &self.listeners.up);
        }
        input.detach(self.element.as_ref(), InputPhase::Down, &self.listeners.down);
        self.element.remove();
    }
}
