//! Gesture recognition from normalised pointer and touch input.
//!
//! Platform events (mouse buttons, touch points with ids) are reduced to
//! pan and pinch gestures. The recogniser knows nothing about the map; the
//! viewport controller consumes the gestures it emits.

use glam::DVec2;

/// Raw input in screen coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerInput {
    /// Primary mouse button pressed
    Down { pos: DVec2 },
    /// Mouse moved
    Move { pos: DVec2 },
    /// Primary mouse button released or pointer left the canvas
    Up,
    TouchStart { id: u64, pos: DVec2 },
    TouchMove { id: u64, pos: DVec2 },
    TouchEnd { id: u64 },
    TouchCancel { id: u64 },
}

/// A recognised gesture step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GestureEvent {
    PanStart { pos: DVec2 },
    PanMove { pos: DVec2 },
    /// All contacts released
    PanEnd,
    PinchStart { distance: f64, midpoint: DVec2 },
    PinchMove { distance: f64, midpoint: DVec2 },
    /// One finger lifted during a pinch; panning continues from `remaining`
    PinchEnd { remaining: DVec2 },
}

/// Tracks active contacts and turns input into [`GestureEvent`]s.
///
/// Only the first two touches take part in a pinch; further fingers are
/// tracked but otherwise ignored. Mouse input is ignored while any touch is
/// down, since touch platforms also synthesise pointer events.
#[derive(Debug, Default)]
pub struct GestureRecognizer {
    touches: Vec<(u64, DVec2)>,
    mouse_down: bool,
}

impl GestureRecognizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn process(&mut self, input: PointerInput) -> Option<GestureEvent> {
        match input {
            PointerInput::Down { pos } => {
                if !self.touches.is_empty() {
                    return None;
                }
                self.mouse_down = true;
                Some(GestureEvent::PanStart { pos })
            }
            PointerInput::Move { pos } => {
                if !self.touches.is_empty() || !self.mouse_down {
                    return None;
                }
                Some(GestureEvent::PanMove { pos })
            }
            PointerInput::Up => {
                if !self.touches.is_empty() || !self.mouse_down {
                    return None;
                }
                self.mouse_down = false;
                Some(GestureEvent::PanEnd)
            }
            PointerInput::TouchStart { id, pos } => {
                self.mouse_down = false;
                match self.touches.iter_mut().find(|(tid, _)| *tid == id) {
                    Some(touch) => touch.1 = pos,
                    None => self.touches.push((id, pos)),
                }
                match self.touches.len() {
                    1 => Some(GestureEvent::PanStart { pos }),
                    2 => {
                        let (distance, midpoint) = self.pinch_geometry();
                        Some(GestureEvent::PinchStart { distance, midpoint })
                    }
                    _ => None,
                }
            }
            PointerInput::TouchMove { id, pos } => {
                let touch = self.touches.iter_mut().find(|(tid, _)| *tid == id)?;
                touch.1 = pos;
                match self.touches.len() {
                    1 => Some(GestureEvent::PanMove { pos }),
                    _ => {
                        let (distance, midpoint) = self.pinch_geometry();
                        Some(GestureEvent::PinchMove { distance, midpoint })
                    }
                }
            }
            PointerInput::TouchEnd { id } | PointerInput::TouchCancel { id } => {
                let before = self.touches.len();
                self.touches.retain(|(tid, _)| *tid != id);
                match self.touches.len() {
                    0 => Some(GestureEvent::PanEnd),
                    1 if before >= 2 => Some(GestureEvent::PinchEnd {
                        remaining: self.touches[0].1,
                    }),
                    // A third finger lifted; restart the pinch from the remaining pair
                    n if n >= 2 && before > n => {
                        let (distance, midpoint) = self.pinch_geometry();
                        Some(GestureEvent::PinchStart { distance, midpoint })
                    }
                    _ => None,
                }
            }
        }
    }

    /// Distance between and midpoint of the first two touches.
    fn pinch_geometry(&self) -> (f64, DVec2) {
        let a = self.touches[0].1;
        let b = self.touches[1].1;
        (a.distance(b), (a + b) * 0.5)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(x: f64, y: f64) -> DVec2 {
        DVec2::new(x, y)
    }

    #[test]
    fn test_mouse_drag() {
        let mut rec = GestureRecognizer::new();
        assert_eq!(rec.process(PointerInput::Move { pos: p(1.0, 1.0) }), None);
        assert_eq!(
            rec.process(PointerInput::Down { pos: p(5.0, 5.0) }),
            Some(GestureEvent::PanStart { pos: p(5.0, 5.0) })
        );
        assert_eq!(
            rec.process(PointerInput::Move { pos: p(8.0, 5.0) }),
            Some(GestureEvent::PanMove { pos: p(8.0, 5.0) })
        );
        assert_eq!(rec.process(PointerInput::Up), Some(GestureEvent::PanEnd));
        assert_eq!(rec.process(PointerInput::Up), None);
    }

    #[test]
    fn test_two_finger_pinch_then_lift() {
        let mut rec = GestureRecognizer::new();
        assert_eq!(
            rec.process(PointerInput::TouchStart { id: 1, pos: p(0.0, 0.0) }),
            Some(GestureEvent::PanStart { pos: p(0.0, 0.0) })
        );
        assert_eq!(
            rec.process(PointerInput::TouchStart { id: 2, pos: p(10.0, 0.0) }),
            Some(GestureEvent::PinchStart {
                distance: 10.0,
                midpoint: p(5.0, 0.0)
            })
        );
        assert_eq!(
            rec.process(PointerInput::TouchMove { id: 2, pos: p(20.0, 0.0) }),
            Some(GestureEvent::PinchMove {
                distance: 20.0,
                midpoint: p(10.0, 0.0)
            })
        );
        assert_eq!(
            rec.process(PointerInput::TouchEnd { id: 1 }),
            Some(GestureEvent::PinchEnd {
                remaining: p(20.0, 0.0)
            })
        );
        assert_eq!(
            rec.process(PointerInput::TouchMove { id: 2, pos: p(25.0, 0.0) }),
            Some(GestureEvent::PanMove { pos: p(25.0, 0.0) })
        );
        assert_eq!(
            rec.process(PointerInput::TouchEnd { id: 2 }),
            Some(GestureEvent::PanEnd)
        );
        assert!(rec.touches.is_empty());
    }

    #[test]
    fn test_mouse_ignored_during_touch() {
        let mut rec = GestureRecognizer::new();
        rec.process(PointerInput::TouchStart { id: 7, pos: p(1.0, 1.0) });
        assert_eq!(rec.process(PointerInput::Down { pos: p(1.0, 1.0) }), None);
        assert_eq!(rec.process(PointerInput::Move { pos: p(2.0, 1.0) }), None);
        assert_eq!(rec.process(PointerInput::Up), None);
    }

    #[test]
    fn test_unmatched_touch_end_resets() {
        let mut rec = GestureRecognizer::new();
        assert_eq!(
            rec.process(PointerInput::TouchEnd { id: 42 }),
            Some(GestureEvent::PanEnd)
        );
        assert_eq!(rec.process(PointerInput::TouchMove { id: 42, pos: p(0.0, 0.0) }), None);
    }

    #[test]
    fn test_third_finger_ignored_until_lifted() {
        let mut rec = GestureRecognizer::new();
        rec.process(PointerInput::TouchStart { id: 1, pos: p(0.0, 0.0) });
        rec.process(PointerInput::TouchStart { id: 2, pos: p(4.0, 0.0) });
        assert_eq!(
            rec.process(PointerInput::TouchStart { id: 3, pos: p(9.0, 9.0) }),
            None
        );
        assert_eq!(
            rec.process(PointerInput::TouchCancel { id: 1 }),
            Some(GestureEvent::PinchStart {
                distance: p(4.0, 0.0).distance(p(9.0, 9.0)),
                midpoint: p(6.5, 4.5)
            })
        );
    }
}
