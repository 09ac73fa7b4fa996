//! Color extraction, replacement, and palette transforms.
//!
//! Colors are compared in normalized form: lowercase, with `#rgb` expanded to
//! `#rrggbb`. `currentColor` is tracked separately and never transformed.

pub mod transform;

pub use transform::{
    AutoVariant, AutoVariantKind, FilterEstimate, darken_color, desaturate_color,
    estimate_filters_for_color, generate_auto_variant_colors, invert_color, lighten_color,
    normalize_color, to_hex_color, to_rgb,
};

use std::sync::LazyLock;

use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};

use crate::animation::detector::has_smil;

/// Canonical spelling of the `currentColor` keyword.
pub const CURRENT_COLOR: &str = "currentColor";

/// Properties read when extracting colors.
const EXTRACTED_PROPERTIES: &str = "fill|stroke|stop-color";

/// Properties rewritten when replacing colors.
const REPLACED_PROPERTIES: &str = "fill|stroke|stop-color|flood-color|lighting-color";

static ATTRIBUTE_COLOR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r#"(?i)\s(?:{EXTRACTED_PROPERTIES})\s*=\s*(?:"([^"]*)"|'([^']*)')"#
    ))
    .expect("valid regex")
});
static DECLARATION_COLOR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r#"(?i)(?:^|[\s;{{"'])(?:{EXTRACTED_PROPERTIES})\s*:\s*([^;"'}}<]+)"#
    ))
    .expect("valid regex")
});
static COLOR_VALUE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r#"(?i)(\b(?:{REPLACED_PROPERTIES})(?:\s*=\s*["']|\s*:)\s*)(#[0-9a-f]+|[a-z][\w-]*(?:\([^)]*\))?)(\s*(?:["';}}!<]|$))"#
    ))
    .expect("valid regex")
});
static NEAR_BLACK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^#0[0-2]{5}$").expect("valid regex"));

/// Colors found in an icon.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "jsonschema", derive(schemars::JsonSchema))]
#[serde(rename_all = "camelCase")]
pub struct ColorSet {
    /// Distinct colors in order of first appearance.
    pub colors: Vec<String>,

    /// The icon paints with `currentColor`.
    pub has_current_color: bool,

    /// The icon contains SMIL animation elements.
    pub has_smil: bool,
}

// ============================================================================
// ColorService
// ============================================================================

/// Color operations on SVG text.
#[derive(Debug, Clone, Copy, Default)]
pub struct ColorService;

impl ColorService {
    pub fn new() -> Self {
        Self
    }

    /// Editable colors of an icon.
    ///
    /// Icons with SMIL animation often use near-black (`#000000`..`#000202`)
    /// as an invisible keyframe color. When such an icon has more than one
    /// color those entries are dropped, unless nothing would remain.
    pub fn extract_colors_from_svg(&self, svg: &str) -> ColorSet {
        let mut set = self.extract_all_colors_from_svg(svg);
        if set.has_smil && set.colors.len() > 1 {
            let visible: Vec<String> = set
                .colors
                .iter()
                .filter(|color| !NEAR_BLACK.is_match(color))
                .cloned()
                .collect();
            if !visible.is_empty() {
                set.colors = visible;
            }
        }
        set
    }

    /// Every `fill`, `stroke`, and `stop-color` value, from attributes and
    /// CSS declarations, excluding `none`, `transparent`, and `url(...)`.
    pub fn extract_all_colors_from_svg(&self, svg: &str) -> ColorSet {
        let mut set = ColorSet {
            has_smil: has_smil(svg),
            ..ColorSet::default()
        };

        let attributes = ATTRIBUTE_COLOR
            .captures_iter(svg)
            .filter_map(|caps| caps.get(1).or_else(|| caps.get(2)));
        let declarations = DECLARATION_COLOR
            .captures_iter(svg)
            .filter_map(|caps| caps.get(1));

        for value in attributes.chain(declarations) {
            let value = value.as_str().trim();
            let value = value.strip_suffix("!important").unwrap_or(value).trim();
            let lower = value.to_ascii_lowercase();
            if value.is_empty()
                || lower == "none"
                || lower == "transparent"
                || lower.starts_with("url(")
            {
                continue;
            }

            let color = if value.eq_ignore_ascii_case(CURRENT_COLOR) {
                set.has_current_color = true;
                CURRENT_COLOR.to_string()
            } else {
                normalize_color(value)
            };
            if !set.colors.contains(&color) {
                set.colors.push(color);
            }
        }
        set
    }

    /// Replaces `old` with `new` in every color property.
    ///
    /// Every value that normalizes to the same color as `old` is replaced
    /// (`#f00`, `#FF0000`, `red`, `rgb(255, 0, 0)`), in attribute and CSS
    /// declaration form.
    pub fn replace_color_in_svg(&self, svg: &str, old: &str, new: &str) -> String {
        let target = normalize_color(old);
        if target.is_empty() {
            return svg.to_string();
        }
        COLOR_VALUE
            .replace_all(svg, |caps: &Captures<'_>| {
                if normalize_color(&caps[2]) == target {
                    format!("{}{new}{}", &caps[1], &caps[3])
                } else {
                    caps[0].to_string()
                }
            })
            .into_owned()
    }

    /// Applies a positional palette: the Nth current color becomes the Nth
    /// variant color. Extra entries on either side are ignored.
    pub fn apply_variant_colors(&self, svg: &str, current: &[String], variant: &[String]) -> String {
        let mut out = svg.to_string();
        let mut pending = Vec::new();

        for (index, (from, to)) in current.iter().zip(variant).enumerate() {
            if normalize_color(from) == normalize_color(to) {
                continue;
            }
            let placeholder = format!("icon-manager-color-{index}-");
            out = self.replace_color_in_svg(&out, from, &placeholder);
            pending.push((placeholder, to));
        }

        for (placeholder, to) in pending {
            out = out.replace(&placeholder, to);
        }
        out
    }

    pub fn invert_color(&self, color: &str) -> String {
        invert_color(color)
    }

    pub fn darken_color(&self, color: &str, ratio: f64) -> String {
        darken_color(color, ratio)
    }

    pub fn lighten_color(&self, color: &str, ratio: f64) -> String {
        lighten_color(color, ratio)
    }

    pub fn desaturate_color(&self, color: &str, ratio: f64) -> String {
        desaturate_color(color, ratio)
    }

    pub fn to_hex_color(&self, color: &str) -> String {
        to_hex_color(color)
    }

    pub fn generate_auto_variant_colors(
        &self,
        colors: &[String],
        kind: AutoVariantKind,
    ) -> AutoVariant {
        generate_auto_variant_colors(colors, kind)
    }

    pub fn estimate_filters_for_color(&self, source: &str, target: &str) -> FilterEstimate {
        estimate_filters_for_color(source, target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> ColorService {
        ColorService::new()
    }

    #[test]
    fn extracts_attribute_and_style_colors() {
        let svg = r##"<svg><path fill="#F00" stroke='#00ff00'/><circle style="fill: #0000FF; stroke: none"/><stop stop-color="#f00"/></svg>"##;
        let set = service().extract_all_colors_from_svg(svg);
        assert_eq!(set.colors, vec!["#ff0000", "#00ff00", "#0000ff"]);
        assert!(!set.has_current_color);
        assert!(!set.has_smil);
    }

    #[test]
    fn excludes_non_colors() {
        let svg = r##"<svg><path fill="none"/><path fill="url(#grad)"/><path stroke="transparent"/><path fill="currentcolor"/></svg>"##;
        let set = service().extract_all_colors_from_svg(svg);
        assert_eq!(set.colors, vec!["currentColor"]);
        assert!(set.has_current_color);
    }

    #[test]
    fn smil_near_black_filter() {
        let svg = r##"<svg><circle fill="#000000"><animate attributeName="r" dur="1s"/></circle><path fill="#3366ff"/></svg>"##;
        assert_eq!(service().extract_colors_from_svg(svg).colors, vec!["#3366ff"]);
        assert_eq!(
            service().extract_all_colors_from_svg(svg).colors,
            vec!["#000000", "#3366ff"]
        );
    }

    #[test]
    fn smil_filter_keeps_lone_black() {
        let svg = r##"<svg><path fill="#000"><animate dur="1s"/></path><path fill="#010101"/></svg>"##;
        assert_eq!(
            service().extract_colors_from_svg(svg).colors,
            vec!["#000000", "#010101"]
        );
    }

    #[test]
    fn replaces_every_form() {
        let svg = r##"<svg><path fill="#FF0000"/><path stroke="#f00"/><g style="fill:#ff0000;opacity:1"/><feFlood flood-color="#ff0000"/><path d="M0 0" data-x="#ff0000"/></svg>"##;
        let result = service().replace_color_in_svg(svg, "#ff0000", "#00ff00");
        assert_eq!(
            result,
            r##"<svg><path fill="#00ff00"/><path stroke="#00ff00"/><g style="fill:#00ff00;opacity:1"/><feFlood flood-color="#00ff00"/><path d="M0 0" data-x="#ff0000"/></svg>"##
        );
    }

    #[test]
    fn replacement_respects_value_boundaries() {
        let svg = r##"<svg><path fill="#ff00001"/></svg>"##;
        assert_eq!(service().replace_color_in_svg(svg, "#ff0000", "#000"), svg);
    }

    #[test]
    fn replacement_escapes_input() {
        let svg = r#"<svg><path fill="rgb(1,2,3)"/></svg>"#;
        let result = service().replace_color_in_svg(svg, "rgb(1,2,3)", "#123456");
        assert_eq!(result, r##"<svg><path fill="#123456"/></svg>"##);
        assert_eq!(service().replace_color_in_svg(svg, ".*", "#fff"), svg);
    }

    #[test]
    fn variant_colors_apply_positionally() {
        let svg = r##"<svg><path fill="#ff0000"/><path fill="#00ff00"/></svg>"##;
        let current = vec!["#ff0000".to_string(), "#00ff00".to_string()];
        let swapped = vec!["#00ff00".to_string(), "#ff0000".to_string()];
        let result = service().apply_variant_colors(svg, &current, &swapped);
        assert_eq!(
            result,
            r##"<svg><path fill="#00ff00"/><path fill="#ff0000"/></svg>"##
        );
    }

    #[test]
    fn named_and_functional_colors_are_hex() {
        let svg = r##"<svg><path fill="black"/><path fill="#000000"/><path stroke="rgb(255, 0, 0)"/></svg>"##;
        assert_eq!(
            service().extract_all_colors_from_svg(svg).colors,
            vec!["#000000", "#ff0000"]
        );

        let recolored = service().replace_color_in_svg(svg, "#000", "#112233");
        assert_eq!(
            recolored,
            r##"<svg><path fill="#112233"/><path fill="#112233"/><path stroke="rgb(255, 0, 0)"/></svg>"##
        );
    }

    #[test]
    fn smil_filter_catches_named_black() {
        let svg = r##"<svg><circle fill="black"><animate attributeName="r" dur="1s"/></circle><path fill="#3366ff"/></svg>"##;
        assert_eq!(service().extract_colors_from_svg(svg).colors, vec!["#3366ff"]);
    }
}
