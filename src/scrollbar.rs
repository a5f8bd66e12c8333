/// Scroll metrics read when the thumb is recomputed.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ScrollMetrics {
    /// Visible extent of the scrolled area.
    pub offset: f32,
    /// Total scrollable extent.
    pub scroll: f32,
    /// Current scroll position.
    pub position: f32,
}

/// Computed scrollbar thumb.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ThumbGeometry {
    pub size: f32,
    pub position: f32,
    /// `false` when everything fits and the scrollbar is hidden.
    pub visible: bool,
}

impl ThumbGeometry {
    pub fn compute(metrics: ScrollMetrics, margin: f32, min_size: f32) -> Self {
        let ScrollMetrics {
            offset,
            scroll,
            position,
        } = metrics;
        if offset >= scroll || scroll <= 0.0 {
            return Self::default();
        }
        let size = (offset * offset / scroll - margin).max(min_size);
        let range = (offset - size - margin).max(0.0);
        let ratio = (position / (scroll - offset)).clamp(0.0, 1.0);
        Self {
            size,
            position: ratio * range,
            visible: true,
        }
    }
}

/// Debounced scrollbar thumb.
///
/// Unforced updates only mark the thumb stale; repeated requests collapse into one
/// recomputation on the next [`flush`](Self::flush).
#[derive(Clone, Debug)]
pub struct ScrollbarThumb {
    margin: f32,
    min_size: f32,
    pending: bool,
    geometry: ThumbGeometry,
    updates: usize,
}

impl Default for ScrollbarThumb {
    fn default() -> Self {
        Self::new()
    }
}

impl ScrollbarThumb {
    pub const DEFAULT_MIN_SIZE: f32 = 30.0;

    pub const fn new() -> Self {
        Self {
            margin: 0.0,
            min_size: Self::DEFAULT_MIN_SIZE,
            pending: false,
            geometry: ThumbGeometry {
                size: 0.0,
                position: 0.0,
                visible: false,
            },
            updates: 0,
        }
    }

    #[must_use]
    pub const fn with_margin(mut self, margin: f32) -> Self {
        self.margin = margin;
        self
    }

    #[must_use]
    pub const fn with_min_size(mut self, min_size: f32) -> Self {
        self.min_size = min_size;
        self
    }

    #[inline]
    pub const fn geometry(&self) -> ThumbGeometry {
        self.geometry
    }

    #[inline]
    pub const fn is_pending(&self) -> bool {
        self.pending
    }

    /// Number of recomputations so far.
    #[inline]
    pub const fn updates(&self) -> usize {
        self.updates
    }

    /// Recomputes now if `force`, otherwise schedules a recomputation.
    pub fn update_thumb(&mut self, force: bool, metrics: ScrollMetrics) {
        if force {
            self.recompute(metrics);
        } else {
            self.pending = true;
        }
    }

    /// Runs the scheduled recomputation, if any. Returns `true` if it ran.
    pub fn flush(&mut self, metrics: ScrollMetrics) -> bool {
        if !self.pending {
            return false;
        }
        self.recompute(metrics);
        true
    }

    fn recompute(&mut self, metrics: ScrollMetrics) {
        self.pending = false;
        self.geometry = ThumbGeometry::compute(metrics, self.margin, self.min_size);
        self.updates += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thumb_is_hidden_when_content_fits() {
        let metrics = ScrollMetrics {
            offset: 100.0,
            scroll: 80.0,
            position: 0.0,
        };
        assert!(!ThumbGeometry::compute(metrics, 0.0, 30.0).visible);
    }

    #[test]
    fn thumb_size_has_a_minimum() {
        let metrics = ScrollMetrics {
            offset: 100.0,
            scroll: 10_000.0,
            position: 9_900.0,
        };
        let thumb = ThumbGeometry::compute(metrics, 0.0, 30.0);
        assert!((thumb.size - 30.0).abs() < f32::EPSILON);
        assert!((thumb.position - 70.0).abs() < 1e-3);

        let metrics = ScrollMetrics {
            offset: 100.0,
            scroll: 200.0,
            position: 50.0,
        };
        let thumb = ThumbGeometry::compute(metrics, 0.0, 30.0);
        assert!((thumb.size - 50.0).abs() < f32::EPSILON);
        assert!((thumb.position - 25.0).abs() < 1e-3);
    }

    #[test]
    fn unforced_updates_collapse() {
        let metrics = ScrollMetrics {
            offset: 10.0,
            scroll: 40.0,
            position: 0.0,
        };
        let mut thumb = ScrollbarThumb::new().with_min_size(1.0);
        thumb.update_thumb(false, metrics);
        thumb.update_thumb(false, metrics);
        assert!(thumb.is_pending());
        assert_eq!(thumb.updates(), 0);
        assert!(thumb.flush(metrics));
        assert!(!thumb.flush(metrics));
        assert_eq!(thumb.updates(), 1);

        thumb.update_thumb(true, metrics);
        assert_eq!(thumb.updates(), 2);
        assert!((thumb.geometry().size - 2.5).abs() < f32::EPSILON);
    }
}
