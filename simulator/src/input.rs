//! Mouse to gesture translation.

use embedded_graphics::prelude::Point;
use page_manager::Gesture;

/// Tracks the mouse button and converts movement into [`Gesture`]s.
///
/// The velocity reported on release is the movement seen during the last
/// frame, so a pointer held still before release does not throw the page.
pub struct DragTracker {
    pressed: bool,
    last: Point,
    velocity: Point,
    moved: bool,
}

impl DragTracker {
    pub const fn new() -> Self {
        Self {
            pressed: false,
            last: Point::zero(),
            velocity: Point::zero(),
            moved: false,
        }
    }

    pub fn press(
        &mut self,
        point: Point,
    ) -> Gesture {
        self.pressed = true;
        self.last = point;
        self.velocity = Point::zero();
        Gesture::Pressed
    }

    pub fn motion(
        &mut self,
        point: Point,
    ) -> Option<Gesture> {
        if !self.pressed {
            return None;
        }
        let delta = point - self.last;
        self.last = point;
        self.velocity = if self.moved { self.velocity + delta } else { delta };
        self.moved = true;
        Some(Gesture::Dragging { delta })
    }

    pub fn release(&mut self) -> Option<Gesture> {
        if !self.pressed {
            return None;
        }
        self.pressed = false;
        Some(Gesture::Released { velocity: self.velocity })
    }

    /// Close the input period of one frame.
    pub fn end_frame(&mut self) {
        if !self.moved {
            self.velocity = Point::zero();
        }
        self.moved = false;
    }
}
