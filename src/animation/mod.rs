//! Animation descriptors, the keyframe table, and animation detection.
//!
//! An animation is never stored as a struct inside an icon: only its rendered
//! CSS is embedded. [`AnimationDescriptor`] is the transient form used when
//! embedding, when detecting what an icon already carries, and when storing a
//! per-icon preset next to the color variants.

pub mod detector;
pub mod draw;
pub mod keyframes;

pub use detector::{detect_from_content, detect_native_animation};

use serde::{Deserialize, Serialize};

/// Every animation name that can be embedded.
pub const ANIMATION_NAMES: &[&str] = &[
    "spin",
    "spin-reverse",
    "pulse",
    "pulse-grow",
    "bounce",
    "bounce-horizontal",
    "shake",
    "shake-vertical",
    "fade",
    "fade-in",
    "fade-out",
    "float",
    "blink",
    "glow",
    "swing",
    "wobble",
    "rubber-band",
    "jello",
    "heartbeat",
    "tada",
    "zoom-in",
    "zoom-out",
    "slide-in-up",
    "slide-in-down",
    "slide-in-left",
    "slide-in-right",
    "flip",
    "flip-x",
    "draw",
    "draw-reverse",
    "draw-loop",
];

/// Returns true for the stroke-drawing family (`draw`, `draw-reverse`, `draw-loop`).
pub fn is_draw_animation(name: &str) -> bool {
    matches!(name, "draw" | "draw-reverse" | "draw-loop")
}

/// Returns true if `name` can be embedded.
pub fn is_known_animation(name: &str) -> bool {
    is_draw_animation(name) || keyframes::keyframes_for(name).is_some()
}

// ============================================================================
// AnimationSettings
// ============================================================================

/// Playback settings of an animation.
///
/// Serializes to camelCase JSON:
///
/// ```json
/// { "duration": 1.0, "timing": "linear", "iteration": "infinite", "delay": 0.0, "direction": "normal" }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "jsonschema", derive(schemars::JsonSchema))]
#[serde(rename_all = "camelCase", default)]
pub struct AnimationSettings {
    /// Duration in seconds.
    pub duration: f64,

    /// CSS timing function (`linear`, `ease-in-out`, `cubic-bezier(...)`).
    pub timing: String,

    /// `infinite` or a decimal iteration count.
    pub iteration: String,

    /// Delay in seconds.
    pub delay: f64,

    /// CSS `animation-direction`.
    pub direction: String,
}

impl Default for AnimationSettings {
    fn default() -> Self {
        Self {
            duration: 1.0,
            timing: "ease".into(),
            iteration: "infinite".into(),
            delay: 0.0,
            direction: "normal".into(),
        }
    }
}

impl AnimationSettings {
    /// Creates default settings with the given duration.
    pub fn new(duration: f64) -> Self {
        Self {
            duration,
            ..Self::default()
        }
    }

    pub fn with_timing(mut self, timing: impl Into<String>) -> Self {
        self.timing = timing.into();
        self
    }

    pub fn with_iteration(mut self, iteration: impl Into<String>) -> Self {
        self.iteration = iteration.into();
        self
    }

    pub fn with_delay(mut self, delay: f64) -> Self {
        self.delay = delay;
        self
    }

    pub fn with_direction(mut self, direction: impl Into<String>) -> Self {
        self.direction = direction.into();
        self
    }

    /// Renders the value of an `animation:` shorthand for `name`.
    ///
    /// The delay term is only emitted when positive:
    /// `spin 1s linear infinite normal`, `spin 1s linear 0.5s 3 alternate`.
    pub fn shorthand(&self, name: &str) -> String {
        let delay = if self.delay > 0.0 {
            format!(" {}s", format_seconds(self.delay))
        } else {
            String::new()
        };
        format!(
            "{name} {}s {}{delay} {} {}",
            format_seconds(self.duration),
            self.timing,
            self.iteration,
            self.direction
        )
    }
}

// ============================================================================
// AnimationDescriptor
// ============================================================================

/// An animation type together with its settings.
///
/// `kind` is one of [`ANIMATION_NAMES`] for embedded animations, or a
/// `native-*` label for SMIL animations baked into the source icon.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "jsonschema", derive(schemars::JsonSchema))]
#[serde(rename_all = "camelCase")]
pub struct AnimationDescriptor {
    #[serde(rename = "type")]
    pub kind: String,

    #[serde(default)]
    pub settings: AnimationSettings,
}

impl AnimationDescriptor {
    pub fn new(kind: impl Into<String>, settings: AnimationSettings) -> Self {
        Self {
            kind: kind.into(),
            settings,
        }
    }

    /// Returns true if this describes a SMIL animation from the source icon.
    pub fn is_native(&self) -> bool {
        self.kind.starts_with("native")
    }
}

// ============================================================================
// Number Helpers
// ============================================================================

/// Formats seconds with at most three decimals and no trailing zeros.
pub(crate) fn format_seconds(value: f64) -> String {
    let rounded = (value * 1000.0).round() / 1000.0;
    if rounded == 0.0 {
        return "0".into();
    }
    format!("{rounded}")
}

/// Parses a SMIL/CSS clock value into seconds.
///
/// `ms` values are divided by 1000; unitless and `s` values are seconds.
/// Anything else yields one second.
pub(crate) fn parse_duration(value: &str) -> f64 {
    parse_clock(value).unwrap_or(1.0)
}

/// Parses a clock value into seconds, or `None` if it is not numeric.
pub(crate) fn parse_clock(value: &str) -> Option<f64> {
    let value = value.trim();
    let parsed = if let Some(ms) = value.strip_suffix("ms") {
        ms.trim().parse::<f64>().map(|v| v / 1000.0)
    } else {
        value.strip_suffix('s').unwrap_or(value).trim().parse::<f64>()
    };
    parsed.ok().filter(|v| v.is_finite() && *v >= 0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shorthand_omits_zero_delay() {
        let settings = AnimationSettings::new(1.0)
            .with_timing("linear")
            .with_iteration("infinite");
        assert_eq!(settings.shorthand("spin"), "spin 1s linear infinite normal");
    }

    #[test]
    fn shorthand_includes_delay() {
        let settings = AnimationSettings::new(1.5)
            .with_timing("ease-in")
            .with_delay(0.25)
            .with_iteration("3")
            .with_direction("alternate");
        assert_eq!(
            settings.shorthand("pulse"),
            "pulse 1.5s ease-in 0.25s 3 alternate"
        );
    }

    #[test]
    fn durations() {
        assert_eq!(parse_duration("500ms"), 0.5);
        assert_eq!(parse_duration("2s"), 2.0);
        assert_eq!(parse_duration("3"), 3.0);
        assert_eq!(parse_duration("indefinite"), 1.0);
        assert_eq!(parse_duration(""), 1.0);
    }

    #[test]
    fn seconds_formatting() {
        assert_eq!(format_seconds(1.0), "1");
        assert_eq!(format_seconds(0.1 + 0.2), "0.3");
        assert_eq!(format_seconds(0.0), "0");
    }

    #[test]
    fn vocabulary_is_complete() {
        for name in ANIMATION_NAMES {
            assert!(is_known_animation(name), "{name} has no keyframes");
        }
        assert!(!is_known_animation("teleport"));
    }

    #[test]
    fn descriptor_serializes_type_field() {
        let descriptor = AnimationDescriptor::new("spin", AnimationSettings::default());
        let json = serde_json::to_string(&descriptor).unwrap();
        assert!(json.contains("\"type\":\"spin\""));

        let restored: AnimationDescriptor =
            serde_json::from_str(r#"{"type":"bounce"}"#).unwrap();
        assert_eq!(restored.kind, "bounce");
        assert_eq!(restored.settings, AnimationSettings::default());
    }
}
