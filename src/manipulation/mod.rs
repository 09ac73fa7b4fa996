//! Mutating SVG transforms: namespace repair, animation cleanup, animation
//! embedding, animation detection, and CSS filters.
//!
//! Every operation works on the lenient [`SvgDocument`] first. Only when the
//! markup cannot be tokenized at all, or has no `<svg>` root, does it fall back
//! to the text patches in [`text`]. Fallbacks are logged at `debug` and never
//! reported to the caller.
//!
//! # Example
//!
//! ```
//! use icon_manager::{AnimationSettings, SvgManipulator};
//!
//! let manipulator = SvgManipulator::new();
//! let svg = r#"<svg viewBox="0 0 24 24"><path d="M1 1"/></svg>"#;
//!
//! let settings = AnimationSettings::new(1.0).with_timing("linear");
//! let animated = manipulator.embed_animation_in_svg(svg, "spin", &settings);
//! assert!(animated.contains(r#"<style id="icon-manager-animation">"#));
//!
//! let detected = manipulator.detect_animation_from_svg(&animated).unwrap();
//! assert_eq!(detected.kind, "spin");
//!
//! let cleaned = manipulator.clean_animation_from_svg(&animated);
//! assert!(!cleaned.contains("icon-anim-"));
//! ```

mod text;

use std::cell::Cell;
use std::sync::LazyLock;
use std::time::{SystemTime, UNIX_EPOCH};

use regex::Regex;

use crate::animation::draw::{self, DrawMode};
use crate::animation::keyframes::keyframes_for;
use crate::animation::{
    AnimationDescriptor, AnimationSettings, detector, parse_clock, parse_duration,
};
use crate::svg::{
    ANIMATION_SCRIPT_ID, ANIMATION_STYLE_ID, Element, Node, SMIL_ELEMENTS, SVG_NAMESPACE,
    SvgDocument, WRAPPER_CLASS_PREFIX, is_wrapper_class,
};

/// Marker of the scripts embedded by older releases.
pub(crate) const LEGACY_SCRIPT_MARKER: &str = "document.currentScript.parentElement";

static FULL_RULE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?:^|[\s,;{}>])(?:svg|\.icon-anim-\d+)\s*\{[^}]*?animation\s*:\s*([\w-]+)\s+([\d.]+)s\s+([\w-]+(?:\([^)]*\))?)\s+(?:([\d.]+)s\s+)?(infinite|[\d.]+)\s+([\w-]+)",
    )
    .expect("valid regex")
});
static BARE_ANIMATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"animation\s*:\s*([\w-]+)\s+([\d.]+)(ms|s)").expect("valid regex")
});

// ============================================================================
// SvgManipulator
// ============================================================================

/// SVG transforms.
///
/// The only state is the wrapper class token (`icon-anim-<token>`). Tokens
/// come from the current time in milliseconds and strictly increase per
/// manipulator, so icons embedded in the same millisecond (a batch build)
/// never share a class.
#[derive(Debug, Clone)]
pub struct SvgManipulator {
    wrapper_token: fn() -> u128,
    last_token: Cell<u128>,
}

impl Default for SvgManipulator {
    fn default() -> Self {
        Self {
            wrapper_token: millis_since_epoch,
            last_token: Cell::new(0),
        }
    }
}

impl SvgManipulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Uses `token` as the source of wrapper class tokens.
    pub fn with_wrapper_token(mut self, token: fn() -> u128) -> Self {
        self.wrapper_token = token;
        self
    }

    /// The next wrapper token: the source value, bumped past the last one.
    fn next_wrapper_token(&self) -> u128 {
        let token = (self.wrapper_token)().max(self.last_token.get() + 1);
        self.last_token.set(token);
        token
    }

    /// Guarantees exactly one `xmlns="http://www.w3.org/2000/svg"` on the root.
    ///
    /// Duplicate declarations left by broken edits are collapsed into one.
    pub fn ensure_svg_namespace(&self, svg: &str) -> String {
        transform(svg, "ensure namespace", ensure_namespace, text::ensure_namespace)
    }

    /// Removes every animation artifact this tool (or an older release of it)
    /// embedded, leaving all other content untouched.
    ///
    /// Idempotent; returns the input unchanged when there is nothing to remove.
    pub fn clean_animation_from_svg(&self, svg: &str) -> String {
        transform(svg, "clean animation", clean_animation, text::clean_animation)
    }

    /// Embeds `animation` into a cleaned copy of `svg`.
    ///
    /// Unknown animation names leave the input unchanged.
    pub fn embed_animation_in_svg(
        &self,
        svg: &str,
        animation: &str,
        settings: &AnimationSettings,
    ) -> String {
        let draw_mode = DrawMode::from_name(animation);
        let keyframes = keyframes_for(animation);
        if draw_mode.is_none() && keyframes.is_none() {
            log::debug!("unknown animation '{animation}', leaving icon unchanged");
            return svg.to_string();
        }

        let prepared = self.ensure_svg_namespace(&self.clean_animation_from_svg(svg));

        match (draw_mode, keyframes) {
            (Some(mode), _) => {
                log::debug!("embedding {}", draw::describe(mode, settings));
                let built = draw::build(mode, settings);
                transform(
                    &prepared,
                    "embed draw animation",
                    |root| {
                        embed_draw(root, &built);
                        true
                    },
                    |svg| text::embed_draw(svg, &built),
                )
            }
            (None, Some(keyframes)) => {
                let class = format!("{WRAPPER_CLASS_PREFIX}{}", self.next_wrapper_token());
                let css = animation_css(keyframes, &class, animation, settings);
                transform(
                    &prepared,
                    "embed animation",
                    |root| {
                        wrap_children(root, &class, &css);
                        true
                    },
                    |svg| text::embed_wrapped(svg, &class, &css),
                )
            }
            (None, None) => prepared,
        }
    }

    /// Detects the animation an icon carries.
    ///
    /// SMIL animations baked into the icon take priority over anything this
    /// tool embedded. CSS detection recognizes the draw family by keyframe
    /// name, then the `animation:` shorthand on `svg` or a wrapper class.
    pub fn detect_animation_from_svg(&self, svg: &str) -> Option<AnimationDescriptor> {
        match SvgDocument::parse(svg) {
            Ok(doc) => {
                let elements = doc.elements();
                let smil: Vec<&Element> = elements
                    .iter()
                    .copied()
                    .filter(|el| SMIL_ELEMENTS.contains(&el.local_name()))
                    .collect();
                if let Some(primary) = detector::primary_smil(&smil, |el| el.local_name()) {
                    return Some(AnimationDescriptor::new(
                        detector::native_label(primary.local_name(), primary.attr("type")),
                        smil_settings(
                            primary.attr("dur"),
                            primary.attr("repeatCount"),
                            primary.attr("begin"),
                        ),
                    ));
                }

                let css = elements
                    .iter()
                    .filter(|el| el.is("style"))
                    .map(|el| el.text())
                    .collect::<Vec<_>>()
                    .join("\n");
                detect_css_animation(&css)
            }
            Err(e) => {
                log::debug!("detect animation: falling back to text scan ({e})");
                text::detect_smil(svg).or_else(|| detect_css_animation(svg))
            }
        }
    }

    /// Sets `filter` in the root's inline style, replacing any previous
    /// `filter:` declaration. An empty filter only removes the old one.
    pub fn apply_css_filter(&self, svg: &str, filter: &str) -> String {
        transform(
            svg,
            "apply filter",
            |root| {
                let current = root.attr("style").unwrap_or_default().to_string();
                let merged = merge_filter(&current, filter);
                if merged == current {
                    return false;
                }
                if merged.is_empty() {
                    root.remove_attr("style");
                } else {
                    root.set_attr("style", merged);
                }
                true
            },
            |svg| text::apply_css_filter(svg, filter),
        )
    }
}

fn millis_since_epoch() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or_default()
}

/// Runs `tree_op` on the parsed root, or `fallback` on the raw text.
///
/// `tree_op` returns whether it changed anything; unchanged input is returned
/// as-is so that no-op transforms never reformat markup.
fn transform(
    svg: &str,
    operation: &str,
    tree_op: impl FnOnce(&mut Element) -> bool,
    fallback: impl FnOnce(&str) -> String,
) -> String {
    match SvgDocument::parse(svg) {
        Ok(mut doc) => match doc.root_mut() {
            Some(root) => {
                if tree_op(root) {
                    doc.to_string()
                } else {
                    svg.to_string()
                }
            }
            None => {
                log::debug!("{operation}: no <svg> root, falling back to text patching");
                fallback(svg)
            }
        },
        Err(e) => {
            log::debug!("{operation}: falling back to text patching ({e})");
            fallback(svg)
        }
    }
}

// ============================================================================
// Tree Operations
// ============================================================================

fn ensure_namespace(root: &mut Element) -> bool {
    if root.count_attr("xmlns") == 1 && root.attr("xmlns") == Some(SVG_NAMESPACE) {
        return false;
    }
    root.remove_attr("xmlns");
    root.insert_attr(0, "xmlns", SVG_NAMESPACE);
    true
}

fn clean_animation(root: &mut Element) -> bool {
    let mut changed = 0;

    changed += root.remove_where(&|el: &Element| {
        matches!(el.attr("id"), Some(ANIMATION_STYLE_ID | ANIMATION_SCRIPT_ID))
    });
    changed += root.unwrap_where(&|el: &Element| el.is("g") && el.has_class(is_wrapper_class));
    changed += root.remove_where(&|el: &Element| el.is("style") && is_legacy_style(&el.text()));
    changed += root.remove_where(&|el: &Element| {
        el.is("script") && el.text().contains(LEGACY_SCRIPT_MARKER)
    });

    changed > 0
}

/// Styles written by older releases: wrapper rules, or keyframes plus an
/// `animation:` declaration.
pub(crate) fn is_legacy_style(css: &str) -> bool {
    css.contains(".icon-anim-") || (css.contains("@keyframes") && css.contains("animation:"))
}

fn wrap_children(root: &mut Element, class: &str, css: &str) {
    let mut wrapper = Element::new("g").with_attr("class", class);
    wrapper.children = std::mem::take(&mut root.children);

    let style = Element::new("style")
        .with_attr("id", ANIMATION_STYLE_ID)
        .with_text(format!("\n{css}\n"));

    root.children = vec![Node::Element(style), Node::Element(wrapper)];
}

fn embed_draw(root: &mut Element, built: &draw::DrawAnimation) {
    let style = Element::new("style")
        .with_attr("id", ANIMATION_STYLE_ID)
        .with_text(format!("\n{}\n", built.style));
    let script = Element::new("script")
        .with_attr("id", ANIMATION_SCRIPT_ID)
        .with_text(format!("\n{}\n", built.script));

    root.children.insert(0, Node::Element(style));
    root.children.push(Node::Element(script));
}

/// CSS embedded for a keyframe animation bound to the wrapper class.
pub(crate) fn animation_css(
    keyframes: &str,
    class: &str,
    animation: &str,
    settings: &AnimationSettings,
) -> String {
    format!(
        "{keyframes}\n.{class} {{\n  animation: {};\n  transform-origin: center center;\n}}",
        settings.shorthand(animation)
    )
}

/// Merges a `filter:` declaration into an inline style value.
pub(crate) fn merge_filter(style: &str, filter: &str) -> String {
    let mut declarations: Vec<String> = style
        .split(';')
        .map(str::trim)
        .filter(|decl| !decl.is_empty())
        .filter(|decl| {
            let property = decl.split(':').next().unwrap_or_default().trim();
            !property.eq_ignore_ascii_case("filter")
        })
        .map(str::to_string)
        .collect();

    let filter = filter.trim();
    if !filter.is_empty() {
        declarations.push(format!("filter: {filter}"));
    }
    declarations.join("; ")
}

// ============================================================================
// Detection Helpers
// ============================================================================

/// Settings of a SMIL animation from its `dur`, `repeatCount`, and `begin`.
pub(crate) fn smil_settings(
    dur: Option<&str>,
    repeat_count: Option<&str>,
    begin: Option<&str>,
) -> AnimationSettings {
    let iteration = match repeat_count.map(str::trim) {
        None | Some("") | Some("indefinite") => "infinite".to_string(),
        Some(count) => count.to_string(),
    };

    AnimationSettings {
        duration: dur.map(parse_duration).unwrap_or(1.0),
        timing: "linear".into(),
        iteration,
        delay: begin.and_then(parse_clock).unwrap_or(0.0),
        direction: "normal".into(),
    }
}

/// Detects an embedded CSS animation in style text.
pub(crate) fn detect_css_animation(css: &str) -> Option<AnimationDescriptor> {
    let names = detector::keyframe_names(css);
    let draw_kind = if names.contains(&"draw-loop") {
        Some("draw-loop")
    } else if names.iter().any(|name| matches!(*name, "draw-reverse" | "undraw")) {
        Some("draw-reverse")
    } else if names.contains(&"draw") {
        Some("draw")
    } else {
        None
    };

    if let Some(kind) = draw_kind {
        let iteration = if kind == "draw-loop" { "infinite" } else { "1" };
        let settings = AnimationSettings::new(2.0)
            .with_timing("ease-in-out")
            .with_iteration(iteration)
            .with_delay(0.0)
            .with_direction("normal");
        return Some(AnimationDescriptor::new(kind, settings));
    }

    if let Some(caps) = FULL_RULE.captures(css) {
        let number = |index: usize| {
            caps.get(index)
                .and_then(|m| m.as_str().parse::<f64>().ok())
        };
        let text = |index: usize| caps.get(index).map(|m| m.as_str().to_string());

        let defaults = AnimationSettings::default();
        let settings = AnimationSettings {
            duration: number(2).unwrap_or(defaults.duration),
            timing: text(3).unwrap_or(defaults.timing),
            iteration: text(5).unwrap_or(defaults.iteration),
            delay: number(4).unwrap_or(0.0),
            direction: text(6).unwrap_or(defaults.direction),
        };
        return Some(AnimationDescriptor::new(text(1)?, settings));
    }

    let caps = BARE_ANIMATION.captures(css)?;
    let name = caps.get(1)?.as_str();
    let mut duration = caps.get(2)?.as_str().parse::<f64>().ok()?;
    if caps.get(3).is_some_and(|unit| unit.as_str() == "ms") {
        duration /= 1000.0;
    }
    Some(AnimationDescriptor::new(name, AnimationSettings::new(duration)))
}

// ============================================================================
// Tests
// ============================================================================
