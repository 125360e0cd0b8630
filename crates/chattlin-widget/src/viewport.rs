//! Viewport breakpoint for the in-frame close button.

/// Widest viewport, in CSS pixels, on which the frame shows its own close
/// button (`(max-width: 668px)`).
pub const CLOSE_BUTTON_BREAKPOINT_PX: f64 = 668.0;

/// Whether the frame should render a close button at this viewport width.
pub fn shows_close_button(viewport_width: f64) -> bool {
    viewport_width <= CLOSE_BUTTON_BREAKPOINT_PX
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn breakpoint_is_inclusive() {
        assert!(shows_close_button(375.0));
        assert!(shows_close_button(668.0));
        assert!(!shows_close_button(668.5));
        assert!(!shows_close_button(1280.0));
    }
}
