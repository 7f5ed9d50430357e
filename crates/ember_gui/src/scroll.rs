//! Numeric state behind a scroll bar, independent of any visuals.
//!
//! Every mutator leaves `position` inside `[0, max(0, range - window)]` and
//! reports whether the position actually moved, so callers can skip
//! re-layout and handler calls for no-op input.

/// Scroll state: total extent, visible extent and the offset of the visible
/// window.  `step` is the snap granularity of drags and arrow clicks;
/// `arrow_step` is the distance of one arrow click or wheel tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScrollModel {
    range: i32,
    window: i32,
    position: i32,
    step: i32,
    arrow_step: i32,
}

impl ScrollModel {
    pub fn new(range: i32, window: i32) -> Self {
        let mut model = Self::default();
        model.set_range(range, window);
        model
    }

    pub fn with_steps(mut self, step: i32, arrow_step: i32) -> Self {
        self.set_step(step);
        self.set_arrow_step(arrow_step);
        self
    }

    pub fn range(&self) -> i32 {
        self.range
    }

    pub fn window(&self) -> i32 {
        self.window
    }

    pub fn position(&self) -> i32 {
        self.position
    }

    pub fn step(&self) -> i32 {
        self.step
    }

    pub fn arrow_step(&self) -> i32 {
        self.arrow_step
    }

    /// Largest valid position.
    pub fn max_position(&self) -> i32 {
        (self.range - self.window).max(0)
    }

    pub fn clip(&self, p: i32) -> i32 {
        p.max(0).min(self.max_position())
    }

    /// Sets both extents at once and re-clips.  Negative extents are
    /// treated as zero.
    pub fn set_range(&mut self, total: i32, window: i32) {
        self.range = total.max(0);
        self.window = window.max(0);
        self.position = self.clip(self.position);
    }

    pub fn set_position(&mut self, p: i32) -> bool {
        self.move_to(i64::from(p))
    }

    pub fn set_step(&mut self, step: i32) {
        self.step = step.max(0);
    }

    pub fn set_arrow_step(&mut self, arrow_step: i32) {
        self.arrow_step = arrow_step.max(0);
    }

    /// Handle placement inside a track of `track_len` pixels, as
    /// `(offset, length)`.  An empty range yields a full-track handle, and
    /// the handle never outgrows the track.
    pub fn handle_span(&self, track_len: i32, min_len: i32) -> (i32, i32) {
        if self.range == 0 {
            return (0, track_len);
        }
        let offset = scale(self.position, track_len, self.range);
        let length = scale(self.window, track_len, self.range)
            .max(i64::from(min_len))
            .min(i64::from(track_len.max(min_len)));
        (narrow(offset), narrow(length))
    }

    /// Up-arrow click: back off by `arrow_step`, then forward to the next
    /// multiple of `step`.
    pub fn arrow_up(&mut self) -> bool {
        let mut p = i64::from(self.position) - i64::from(self.arrow_step);
        if self.step != 0 {
            p += (-p).rem_euclid(i64::from(self.step));
        }
        self.move_to(p)
    }

    /// Down-arrow click: advance by `arrow_step`, then back to the previous
    /// multiple of `step`.
    pub fn arrow_down(&mut self) -> bool {
        let mut p = i64::from(self.position) + i64::from(self.arrow_step);
        if self.step != 0 {
            p -= p.rem_euclid(i64::from(self.step));
        }
        self.move_to(p)
    }

    pub fn page_up(&mut self) -> bool {
        self.move_to(i64::from(self.position) - self.page())
    }

    pub fn page_down(&mut self) -> bool {
        self.move_to(i64::from(self.position) + self.page())
    }

    /// One wheel tick.  Positive `direction` scrolls up.
    pub fn wheel(&mut self, direction: i32) -> bool {
        let tick = i64::from(self.arrow_step);
        if direction > 0 {
            self.move_to(i64::from(self.position) - tick)
        } else {
            self.move_to(i64::from(self.position) + tick)
        }
    }

    /// Position for a handle dragged `pixel_delta` pixels away from where it
    /// was grabbed at `anchor`, snapped down to `step`.
    pub fn drag_to(&mut self, anchor: i32, pixel_delta: i32, track_px: i32) -> bool {
        let mut p = i64::from(anchor) + scale(pixel_delta, self.range, track_px);
        if self.step != 0 {
            p -= p % i64::from(self.step);
        }
        self.move_to(p)
    }

    fn page(&self) -> i64 {
        i64::from(self.window) - i64::from(self.arrow_step)
    }

    // clipping happens in 64 bits so that no intermediate value overflows
    fn move_to(&mut self, p: i64) -> bool {
        let before = self.position;
        self.position = narrow(p.clamp(0, i64::from(self.max_position())));
        self.position != before
    }
}

// a * b / c in 64-bit, truncated toward zero like integer division
fn scale(a: i32, b: i32, c: i32) -> i64 {
    if c == 0 {
        return 0;
    }
    i64::from(a) * i64::from(b) / i64::from(c)
}

fn narrow(v: i64) -> i32 {
    v.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
}
