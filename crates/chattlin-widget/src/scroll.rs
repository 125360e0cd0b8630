//! Scroll containment for the widget holder.
//!
//! Wheel events that reach the edge of the widget's own scroll region would
//! otherwise scroll the host page behind it. The holder's wheel listener asks
//! [`ScrollMetrics::should_contain`] and cancels the event when it returns
//! `true`.

/// Scroll geometry of an element, in CSS pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ScrollMetrics {
    /// `scrollTop`: distance scrolled from the top.
    pub scroll_top: f64,
    /// `scrollHeight`: full content height.
    pub scroll_height: f64,
    /// `offsetHeight`: visible height.
    pub offset_height: f64,
}

impl ScrollMetrics {
    /// Exactly at the top. Negative values from an elastic overscroll do not
    /// count.
    pub fn at_top(&self) -> bool {
        self.scroll_top == 0.0
    }

    /// Exactly at the bottom. A bordered holder whose `offsetHeight` exceeds
    /// its content height is not at the bottom.
    pub fn at_bottom(&self) -> bool {
        self.offset_height + self.scroll_top == self.scroll_height
    }

    /// Whether a wheel event with vertical delta `delta_y` must be cancelled:
    /// scrolling up at the top edge or down at the bottom edge.
    pub fn should_contain(&self, delta_y: f64) -> bool {
        (self.at_top() && delta_y < 0.0) || (self.at_bottom() && delta_y > 0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metrics(scroll_top: f64) -> ScrollMetrics {
        ScrollMetrics {
            scroll_top,
            scroll_height: 1000.0,
            offset_height: 600.0,
        }
    }

    #[test]
    fn scrolling_up_at_top_is_contained() {
        assert!(metrics(0.0).should_contain(-30.0));
        assert!(!metrics(0.0).should_contain(30.0));
    }

    #[test]
    fn scrolling_down_at_bottom_is_contained() {
        assert!(metrics(400.0).should_contain(30.0));
        assert!(!metrics(400.0).should_contain(-30.0));
    }

    #[test]
    fn middle_of_content_scrolls_freely() {
        let m = metrics(200.0);
        assert!(!m.should_contain(30.0));
        assert!(!m.should_contain(-30.0));
    }

    #[test]
    fn zero_delta_never_contained() {
        assert!(!metrics(0.0).should_contain(0.0));
        assert!(!metrics(400.0).should_contain(0.0));
    }

    #[test]
    fn edges_require_exact_geometry() {
        // Borders make offsetHeight larger than the content.
        let bordered = ScrollMetrics {
            scroll_top: 0.0,
            scroll_height: 300.0,
            offset_height: 302.0,
        };
        assert!(!bordered.should_contain(10.0));
        assert!(bordered.should_contain(-10.0));

        let overscrolled = metrics(-12.0);
        assert!(!overscrolled.should_contain(-30.0));

        let fitted = ScrollMetrics {
            scroll_top: 0.0,
            scroll_height: 300.0,
            offset_height: 300.0,
        };
        assert!(fitted.should_contain(10.0));
        assert!(fitted.should_contain(-10.0));
    }
}
