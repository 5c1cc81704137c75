//! Lab exercise: tap the right spot on an image.
//!
//! The learner sees an exercise image scaled to fit the screen and taps
//! where they think the target is. Taps arrive in rendered-space
//! coordinates; the target lives in the image's native pixel space, so each
//! tap is projected through the native/rendered ratio before the distance
//! check. Every tap, hit or miss, is counted and acknowledged with a
//! transient marker; a hit additionally raises a success notice.

use std::time::{Duration, Instant};

use lilt_content::AnswerArea;

/// Hit radius around the target, in native pixels. Exclusive: a tap landing
/// exactly on the boundary is a miss.
pub const HIT_THRESHOLD: f64 = 30.0;

/// How long a tap marker lingers at full opacity before fading out.
pub const FEEDBACK_DWELL: Duration = Duration::from_secs(2);

/// Duration of each feedback animation leg (fade in, pulse down, fade out).
const FEEDBACK_RAMP: Duration = Duration::from_millis(200);

/// Peak scale of the marker pulse.
const MARKER_PULSE_SCALE: f64 = 1.2;

// ============================================================================
// Geometry
// ============================================================================

/// A position in some image coordinate space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    /// Horizontal coordinate.
    pub x: f64,
    /// Vertical coordinate.
    pub y: f64,
}

impl Point {
    /// Creates a point.
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point.
    #[must_use]
    pub fn distance_to(&self, other: Self) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

impl From<AnswerArea> for Point {
    fn from(area: AnswerArea) -> Self {
        Self::new(area.x, area.y)
    }
}

/// Width and height of an image, native or as rendered.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImageSize {
    /// Width in pixels.
    pub width: f64,
    /// Height in pixels.
    pub height: f64,
}

impl ImageSize {
    /// Creates a size.
    #[must_use]
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// A size usable as a projection denominator: finite and positive on
    /// both axes.
    fn is_projectable(self) -> bool {
        self.width.is_finite() && self.width > 0.0 && self.height.is_finite() && self.height > 0.0
    }
}

// ============================================================================
// Tap feedback
// ============================================================================

/// Transient acknowledgment marker placed at the last tap.
///
/// The marker fades in while pulsing up to its peak scale, settles, holds
/// through [`FEEDBACK_DWELL`], then fades out. The host samples
/// [`TapMarker::scale`] and [`TapMarker::opacity`] on its own clock.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TapMarker {
    /// Where the tap landed, in rendered-space coordinates.
    pub position: Point,

    /// Whether this tap was a hit.
    pub hit: bool,

    placed_at: Instant,
}

impl TapMarker {
    fn new(position: Point, hit: bool, placed_at: Instant) -> Self {
        Self {
            position,
            hit,
            placed_at,
        }
    }

    /// When the marker was placed.
    #[must_use]
    pub const fn placed_at(&self) -> Instant {
        self.placed_at
    }

    /// Marker scale at `at`: pulses from 1.0 up to the peak and back during
    /// the first two animation legs, then rests at 1.0.
    #[must_use]
    pub fn scale(&self, at: Instant) -> f64 {
        let t = at.saturating_duration_since(self.placed_at).as_secs_f64();
        let ramp = FEEDBACK_RAMP.as_secs_f64();
        let peak = MARKER_PULSE_SCALE - 1.0;
        if t < ramp {
            1.0 + peak * (t / ramp)
        } else if t < 2.0 * ramp {
            MARKER_PULSE_SCALE - peak * ((t - ramp) / ramp)
        } else {
            1.0
        }
    }

    /// Marker opacity at `at`: fades in, holds through the dwell, fades out
    /// to zero.
    #[must_use]
    pub fn opacity(&self, at: Instant) -> f64 {
        let t = at.saturating_duration_since(self.placed_at).as_secs_f64();
        let ramp = FEEDBACK_RAMP.as_secs_f64();
        let hold_end = 2.0 * ramp + FEEDBACK_DWELL.as_secs_f64();
        if t < ramp {
            t / ramp
        } else if t < hold_end {
            1.0
        } else if t < hold_end + ramp {
            1.0 - (t - hold_end) / ramp
        } else {
            0.0
        }
    }

    /// Whether the marker still shows at `at`.
    #[must_use]
    pub fn is_visible(&self, at: Instant) -> bool {
        self.opacity(at) > 0.0
    }
}

/// Result of one tap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TapOutcome {
    /// The projected tap landed within the hit radius.
    Hit {
        /// Total attempts including this one.
        attempts: u32,
    },
    /// The tap missed (or could not be projected).
    Miss,
}

/// Modal congratulation raised on a hit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuccessNotice {
    /// Attempts taken to find the target.
    pub attempts: u32,

    /// Optional explainer video to offer the learner.
    pub explainer_url: Option<String>,
}

// ============================================================================
// LabSession
// ============================================================================

/// Interactive state of one lab exercise visit.
#[derive(Debug, Clone)]
pub struct LabSession {
    image_url: String,
    prompt: String,
    target: Point,
    explainer_url: Option<String>,
    native_size: Option<ImageSize>,
    attempts: u32,
    solved: bool,
    marker: Option<TapMarker>,
    notice: Option<SuccessNotice>,
}

impl LabSession {
    /// Creates a session for a resolved lab payload.
    #[must_use]
    pub fn new(
        image_url: impl Into<String>,
        prompt: impl Into<String>,
        answer_area: AnswerArea,
        explainer_url: Option<String>,
    ) -> Self {
        Self {
            image_url: image_url.into(),
            prompt: prompt.into(),
            target: answer_area.into(),
            explainer_url,
            native_size: None,
            attempts: 0,
            solved: false,
            marker: None,
            notice: None,
        }
    }

    /// The exercise image URL.
    #[must_use]
    pub fn image_url(&self) -> &str {
        &self.image_url
    }

    /// The prompt shown above the image.
    #[must_use]
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    /// Taps so far, hits and misses alike.
    #[must_use]
    pub const fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Whether the target has been found at least once.
    #[must_use]
    pub const fn is_solved(&self) -> bool {
        self.solved
    }

    /// The acknowledgment marker for the most recent tap.
    #[must_use]
    pub const fn marker(&self) -> Option<&TapMarker> {
        self.marker.as_ref()
    }

    /// The success notice awaiting dismissal, if one is up.
    #[must_use]
    pub const fn notice(&self) -> Option<&SuccessNotice> {
        self.notice.as_ref()
    }

    /// Records the image's native pixel dimensions once the host has
    /// decoded it. Taps cannot hit before this is known.
    pub fn image_loaded(&mut self, native_size: ImageSize) {
        self.native_size = Some(native_size);
    }

    /// Handles a tap at `position` on the image as rendered at
    /// `rendered_size`.
    ///
    /// Every tap counts an attempt and places a feedback marker, including
    /// taps after the exercise is already solved; dismissing the success
    /// notice hands the image back without locking input. Projection needs
    /// positive dimensions on both axes; a degenerate rendered size (or an
    /// image that never loaded) classifies as a miss.
    pub fn tap(&mut self, position: Point, rendered_size: ImageSize) -> TapOutcome {
        self.attempts += 1;
        let hit = self
            .project(position, rendered_size)
            .is_some_and(|native| native.distance_to(self.target) < HIT_THRESHOLD);
        self.marker = Some(TapMarker::new(position, hit, Instant::now()));

        if hit {
            self.solved = true;
            self.notice = Some(SuccessNotice {
                attempts: self.attempts,
                explainer_url: self.explainer_url.clone(),
            });
            TapOutcome::Hit {
                attempts: self.attempts,
            }
        } else {
            TapOutcome::Miss
        }
    }

    /// Dismisses the success notice, returning control to the image.
    pub fn dismiss_notice(&mut self) {
        self.notice = None;
    }

    /// Projects a rendered-space position into native pixel space using the
    /// per-axis native/rendered ratio.
    fn project(&self, position: Point, rendered_size: ImageSize) -> Option<Point> {
        let native = self.native_size?;
        if !native.is_projectable() || !rendered_size.is_projectable() {
            return None;
        }
        Some(Point::new(
            position.x * (native.width / rendered_size.width),
            position.y * (native.height / rendered_size.height),
        ))
    }
}

// ============================================================================
// Tests
// ============================================================================
