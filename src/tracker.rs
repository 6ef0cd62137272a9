//! Active-section tracking for table-of-contents highlighting.
//!
//! Mirrors viewport-intersection observation with a root margin that shrinks
//! the viewport to a thin "reading band" near its top: 10% in from the top
//! edge, 80% in from the bottom edge. A heading becomes active once it enters
//! that band, so the heading just scrolled past stays highlighted while its
//! section is being read.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    /// Scroll offset of the viewport's top edge, in document coordinates.
    pub top: f64,
    pub height: f64,
}

/// Rendered extent of one heading, in document coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeadingBox {
    pub id: String,
    pub top: f64,
    pub bottom: f64,
}

/// Insets applied to the viewport, as fractions of its height.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RootMargin {
    pub top: f64,
    pub bottom: f64,
}

impl Default for RootMargin {
    fn default() -> Self {
        Self {
            top: 0.10,
            bottom: 0.80,
        }
    }
}

/// Which heading wins when several enter the band in one observation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ActivePolicy {
    /// The entering heading nearest the top of the document.
    #[default]
    TopmostWins,
    /// The last entering heading in observation order.
    LastWriteWins,
}

#[derive(Debug, Clone, Default)]
pub struct SectionTracker {
    policy: ActivePolicy,
    margin: RootMargin,
    observed: HashSet<String>,
    intersecting: HashSet<String>,
    active: Option<String>,
}

impl SectionTracker {
    pub fn new(policy: ActivePolicy) -> Self {
        Self {
            policy,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_margin(mut self, margin: RootMargin) -> Self {
        self.margin = margin;
        self
    }

    /// Starts observing a new set of headings, discarding all previous state.
    pub fn reset<I>(&mut self, ids: I)
    where
        I: IntoIterator<Item = String>,
    {
        self.observed = ids.into_iter().collect();
        self.intersecting.clear();
        self.active = None;
    }

    /// Stops observing altogether.
    pub fn teardown(&mut self) {
        self.reset(std::iter::empty());
    }

    pub fn active(&self) -> Option<&str> {
        self.active.as_deref()
    }

    /// The `[start, end]` band of document coordinates headings must touch.
    pub fn reading_band(&self, viewport: Viewport) -> (f64, f64) {
        let start = viewport.top + viewport.height * self.margin.top;
        let end = viewport.top + viewport.height * (1.0 - self.margin.bottom);
        (start, end)
    }

    /// Feeds one observation and returns the active heading afterwards.
    ///
    /// Only headings whose intersection state changed since the previous call
    /// take part; a heading leaving the band never clears the active id.
    /// Headings not registered through [`SectionTracker::reset`] are ignored.
    pub fn observe(&mut self, viewport: Viewport, headings: &[HeadingBox]) -> Option<&str> {
        let (band_start, band_end) = self.reading_band(viewport);
        let mut entered: Vec<&HeadingBox> = Vec::new();

        for heading in headings {
            if !self.observed.contains(&heading.id) {
                continue;
            }
            let now = heading.top <= band_end && heading.bottom >= band_start;
            let was = self.intersecting.contains(&heading.id);
            if now == was {
                continue;
            }
            if now {
                self.intersecting.insert(heading.id.clone());
                entered.push(heading);
            } else {
                self.intersecting.remove(&heading.id);
            }
        }

        let winner = match self.policy {
            ActivePolicy::TopmostWins => entered
                .iter()
                .copied()
                .min_by(|a, b| a.top.total_cmp(&b.top)),
            ActivePolicy::LastWriteWins => entered.last().copied(),
        };
        if let Some(winner) = winner {
            tracing::trace!(id = %winner.id, "active section changed");
            self.active = Some(winner.id.clone());
        }
        self.active.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VIEW: Viewport = Viewport {
        top: 0.0,
        height: 1000.0,
    };

    fn heading(id: &str, top: f64) -> HeadingBox {
        HeadingBox {
            id: id.to_owned(),
            top,
            bottom: top + 30.0,
        }
    }

    fn tracker(policy: ActivePolicy, ids: &[&str]) -> SectionTracker {
        let mut tracker = SectionTracker::new(policy);
        tracker.reset(ids.iter().map(|s| (*s).to_owned()));
        tracker
    }

    #[test]
    fn reading_band_is_biased_to_the_top() {
        let tracker = SectionTracker::default();
        let (start, end) = tracker.reading_band(Viewport {
            top: 500.0,
            height: 1000.0,
        });
        assert!((start - 600.0).abs() < 1e-9);
        assert!((end - 700.0).abs() < 1e-9);
    }

    #[test]
    fn heading_in_band_becomes_active() {
        let mut tracker = tracker(ActivePolicy::TopmostWins, &["intro", "usage"]);
        let headings = [heading("intro", 150.0), heading("usage", 600.0)];
        assert_eq!(tracker.observe(VIEW, &headings), Some("intro"));
    }

    #[test]
    fn nothing_in_band_leaves_active_empty() {
        let mut tracker = tracker(ActivePolicy::TopmostWins, &["usage"]);
        assert_eq!(tracker.observe(VIEW, &[heading("usage", 600.0)]), None);
    }

    #[test]
    fn simultaneous_entries_follow_policy() {
        let headings = [heading("a", 110.0), heading("b", 160.0)];

        let mut topmost = tracker(ActivePolicy::TopmostWins, &["a", "b"]);
        assert_eq!(topmost.observe(VIEW, &headings), Some("a"));

        let mut last = tracker(ActivePolicy::LastWriteWins, &["a", "b"]);
        assert_eq!(last.observe(VIEW, &headings), Some("b"));
    }

    #[test]
    fn repeated_observation_is_idempotent() {
        let mut tracker = tracker(ActivePolicy::LastWriteWins, &["a", "b"]);
        let headings = [heading("a", 110.0), heading("b", 160.0)];
        assert_eq!(tracker.observe(VIEW, &headings), Some("b"));
        assert_eq!(tracker.observe(VIEW, &headings), Some("b"));
    }

    #[test]
    fn leaving_band_keeps_last_active_until_next_entry() {
        let mut tracker = tracker(ActivePolicy::TopmostWins, &["a", "b"]);
        let headings = [heading("a", 150.0), heading("b", 900.0)];
        assert_eq!(tracker.observe(VIEW, &headings), Some("a"));

        let scrolled = Viewport {
            top: 400.0,
            height: 1000.0,
        };
        assert_eq!(tracker.observe(scrolled, &headings), Some("a"));

        let further = Viewport {
            top: 760.0,
            height: 1000.0,
        };
        assert_eq!(tracker.observe(further, &headings), Some("b"));
    }

    #[test]
    fn reentering_heading_reactivates() {
        let mut tracker = tracker(ActivePolicy::TopmostWins, &["a", "b"]);
        let headings = [heading("a", 150.0), heading("b", 500.0)];
        assert_eq!(tracker.observe(VIEW, &headings), Some("a"));
        let down = Viewport {
            top: 350.0,
            height: 1000.0,
        };
        assert_eq!(tracker.observe(down, &headings), Some("b"));
        assert_eq!(tracker.observe(VIEW, &headings), Some("a"));
    }

    #[test]
    fn reset_discards_previous_document() {
        let mut tracker = tracker(ActivePolicy::TopmostWins, &["old"]);
        assert_eq!(tracker.observe(VIEW, &[heading("old", 150.0)]), Some("old"));

        tracker.reset(vec!["new".to_owned()]);
        assert_eq!(tracker.active(), None);
        assert_eq!(tracker.observe(VIEW, &[heading("old", 150.0)]), None);
        assert_eq!(tracker.observe(VIEW, &[heading("new", 150.0)]), Some("new"));
    }

    #[test]
    fn teardown_stops_tracking() {
        let mut tracker = tracker(ActivePolicy::TopmostWins, &["a"]);
        tracker.teardown();
        assert_eq!(tracker.observe(VIEW, &[heading("a", 150.0)]), None);
    }
}
