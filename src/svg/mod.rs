//! SVG markup model and the identifiers this crate embeds into icons.

pub mod tree;

pub use tree::{Element, Node, SvgDocument};

/// The SVG namespace URI.
pub const SVG_NAMESPACE: &str = "http://www.w3.org/2000/svg";

/// `id` of the `<style>` element holding an embedded animation.
pub const ANIMATION_STYLE_ID: &str = "icon-manager-animation";

/// `id` of the `<script>` element used by draw animations.
pub const ANIMATION_SCRIPT_ID: &str = "icon-manager-script";

/// Class prefix of the `<g>` wrapper around animated content.
pub const WRAPPER_CLASS_PREFIX: &str = "icon-anim-";

/// Elements that carry SMIL animation.
pub const SMIL_ELEMENTS: &[&str] = &["animate", "animateTransform", "animateMotion", "set"];

/// Returns true if `class` is an animation wrapper class (`icon-anim-<digits>`).
pub fn is_wrapper_class(class: &str) -> bool {
    class
        .strip_prefix(WRAPPER_CLASS_PREFIX)
        .is_some_and(|token| !token.is_empty() && token.bytes().all(|b| b.is_ascii_digit()))
}
