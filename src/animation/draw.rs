//! Builders for the stroke-drawing animations.
//!
//! A drawing reveal animates `stroke-dashoffset` from the path length down to
//! zero. The length depends on real geometry, so next to the `<style>` block
//! the builder emits a small `<script>` that measures every shape with
//! `getTotalLength()` and publishes the result as `--icon-path-length`.
//! Without script support the CSS falls back to a fixed length.

use super::{AnimationSettings, format_seconds};

/// Shapes that receive the dash animation.
const SHAPES: &str = "path, line, polyline, polygon, circle, ellipse, rect";

/// Dash length used until the script has measured the shapes.
const FALLBACK_LENGTH: u32 = 1000;

/// Which way the stroke is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawMode {
    /// Reveal the stroke (`draw`).
    Forward,
    /// Erase the stroke (`draw-reverse`).
    Reverse,
    /// Reveal then erase, forever (`draw-loop`).
    Loop,
}

impl DrawMode {
    /// Maps an animation name to its draw mode.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "draw" => Some(Self::Forward),
            "draw-reverse" => Some(Self::Reverse),
            "draw-loop" => Some(Self::Loop),
            _ => None,
        }
    }

    /// The keyframe name emitted for this mode.
    pub fn keyframe_name(self) -> &'static str {
        match self {
            Self::Forward => "draw",
            Self::Reverse => "draw-reverse",
            Self::Loop => "draw-loop",
        }
    }
}

/// The style and script text of a draw animation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DrawAnimation {
    /// Content of the `<style>` element.
    pub style: String,
    /// Content of the `<script>` element.
    pub script: String,
}

/// Builds the draw animation for `mode`.
///
/// `draw-loop` always repeats forever and alternates direction; the other
/// modes honour the iteration count and direction in `settings`.
pub fn build(mode: DrawMode, settings: &AnimationSettings) -> DrawAnimation {
    let name = mode.keyframe_name();
    let length = format!("var(--icon-path-length, {FALLBACK_LENGTH})");

    let keyframes = match mode {
        DrawMode::Forward | DrawMode::Loop => format!(
            "@keyframes {name} {{ from {{ stroke-dashoffset: {length}; }} to {{ stroke-dashoffset: 0; }} }}"
        ),
        DrawMode::Reverse => format!(
            "@keyframes {name} {{ from {{ stroke-dashoffset: 0; }} to {{ stroke-dashoffset: {length}; }} }}"
        ),
    };

    let playback = match mode {
        DrawMode::Loop => AnimationSettings {
            iteration: "infinite".into(),
            direction: "alternate".into(),
            ..settings.clone()
        },
        _ => settings.clone(),
    };

    let start_offset = match mode {
        DrawMode::Reverse => "0".to_string(),
        _ => length.clone(),
    };

    let style = format!(
        "{keyframes}\n{SHAPES} {{\n  stroke-dasharray: {length};\n  stroke-dashoffset: {start_offset};\n  animation: {} forwards;\n}}",
        playback.shorthand(name)
    );

    DrawAnimation {
        style,
        script: measuring_script(mode == DrawMode::Reverse),
    }
}

/// Script that measures each shape and sets its dash length.
///
/// The text avoids `<` and `&` so it can be embedded without CDATA.
fn measuring_script(reverse: bool) -> String {
    let offset = if reverse { "0" } else { "length" };
    format!(
        "(function () {{
  var script = document.currentScript;
  var svg = script ? script.closest('svg') : null;
  if (!svg) {{ return; }}
  svg.querySelectorAll('{SHAPES}').forEach(function (el) {{
    if (typeof el.getTotalLength !== 'function') {{ return; }}
    var length = Math.ceil(el.getTotalLength());
    el.style.setProperty('--icon-path-length', length);
    el.style.strokeDasharray = length;
    el.style.strokeDashoffset = {offset};
  }});
}})();"
    )
}

/// Formats the duration used by the draw family in logs and previews.
pub fn describe(mode: DrawMode, settings: &AnimationSettings) -> String {
    format!(
        "{} over {}s",
        mode.keyframe_name(),
        format_seconds(settings.duration)
    )
}
