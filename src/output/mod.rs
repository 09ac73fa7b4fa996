//! Build artifacts: the `icons.js` module and the `sprite.svg` sheet.
//!
//! Every icon goes through the same preparation before it is written: stale
//! animation artifacts are cleaned, the configured animation (if any) is
//! embedded, and the root is split into its `viewBox` and inner markup.

mod icons;
mod sprite;

pub use icons::build_icons_module;
pub use sprite::build_sprite;

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::animation::AnimationDescriptor;
use crate::manipulation::SvgManipulator;
use crate::svg::SvgDocument;

/// `viewBox` used when an icon declares neither a `viewBox` nor a size.
pub const DEFAULT_VIEW_BOX: &str = "0 0 24 24";

static ROOT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<svg\b([^>]*)>(.*)</svg\s*>").expect("valid regex"));
static VIEW_BOX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)\sviewBox\s*=\s*(?:"([^"]*)"|'([^']*)')"#).expect("valid regex")
});

/// An icon to include in a build.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "jsonschema", derive(schemars::JsonSchema))]
#[serde(rename_all = "camelCase")]
pub struct IconEntry {
    pub name: String,
    pub svg: String,

    /// Animation to embed; `None` builds the icon static.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub animation: Option<AnimationDescriptor>,
}

impl IconEntry {
    pub fn new(name: impl Into<String>, svg: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            svg: svg.into(),
            animation: None,
        }
    }

    pub fn with_animation(mut self, animation: AnimationDescriptor) -> Self {
        self.animation = Some(animation);
        self
    }
}

/// An icon ready to be written.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct PreparedIcon {
    pub view_box: String,
    pub body: String,
}

/// Cleans, optionally animates, and splits an icon.
pub(crate) fn prepare(manipulator: &SvgManipulator, entry: &IconEntry) -> PreparedIcon {
    let cleaned = manipulator.clean_animation_from_svg(&entry.svg);
    let svg = match &entry.animation {
        Some(animation) if !animation.is_native() => {
            manipulator.embed_animation_in_svg(&cleaned, &animation.kind, &animation.settings)
        }
        _ => cleaned,
    };

    if let Ok(doc) = SvgDocument::parse(&svg) {
        if let Some(root) = doc.root() {
            return PreparedIcon {
                view_box: root
                    .attr("viewBox")
                    .map(str::to_string)
                    .unwrap_or_else(|| size_view_box(root.attr("width"), root.attr("height"))),
                body: root.inner_markup(),
            };
        }
    }

    log::debug!("icon '{}': splitting root by text", entry.name);
    match ROOT.captures(&svg) {
        Some(caps) => {
            let view_box = VIEW_BOX
                .captures(&caps[1])
                .and_then(|vb| vb.get(1).or_else(|| vb.get(2)))
                .map(|m| m.as_str().to_string())
                .unwrap_or_else(|| DEFAULT_VIEW_BOX.to_string());
            PreparedIcon {
                view_box,
                body: caps[2].to_string(),
            }
        }
        None => {
            log::warn!("icon '{}' has no <svg> root, writing it as is", entry.name);
            PreparedIcon {
                view_box: DEFAULT_VIEW_BOX.to_string(),
                body: svg.clone(),
            }
        }
    }
}

/// `0 0 <width> <height>` when both are plain numbers (`px` allowed).
fn size_view_box(width: Option<&str>, height: Option<&str>) -> String {
    let number = |value: Option<&str>| {
        let value = value?.trim();
        let value = value.strip_suffix("px").unwrap_or(value);
        value.parse::<f64>().ok().filter(|v| *v > 0.0)
    };
    match (number(width), number(height)) {
        (Some(w), Some(h)) => format!("0 0 {w} {h}"),
        _ => DEFAULT_VIEW_BOX.to_string(),
    }
}

/// JavaScript reserved words that cannot name an export.
const RESERVED: &[&str] = &[
    "break", "case", "catch", "class", "const", "continue", "debugger", "default", "delete",
    "do", "else", "export", "extends", "false", "finally", "for", "function", "if", "import",
    "in", "instanceof", "new", "null", "return", "super", "switch", "this", "throw", "true",
    "try", "typeof", "var", "void", "while", "with", "yield", "let", "static", "enum", "await",
];

/// Converts an icon name to a camelCase JavaScript identifier.
///
/// `arrow-left` becomes `arrowLeft`. Names starting with a digit, reserved
/// words, and names without any usable character are prefixed with `_`.
pub fn to_identifier(name: &str) -> String {
    let mut ident = String::with_capacity(name.len());
    for (index, word) in name
        .split(|c: char| !c.is_alphanumeric() && c != '_' && c != '$')
        .filter(|word| !word.is_empty())
        .enumerate()
    {
        let mut chars = word.chars();
        let Some(first) = chars.next() else { continue };
        if index == 0 {
            ident.extend(first.to_lowercase());
        } else {
            ident.extend(first.to_uppercase());
        }
        ident.push_str(chars.as_str());
    }

    let needs_prefix = ident.is_empty()
        || ident.starts_with(|c: char| c.is_ascii_digit())
        || RESERVED.contains(&ident.as_str());
    if needs_prefix {
        ident.insert(0, '_');
    }
    ident
}

/// Identifiers for `names`, suffixed with `_2`, `_3`, ... on collision.
pub(crate) fn unique_identifiers<'a>(names: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    let mut taken: Vec<String> = Vec::new();
    for name in names {
        let base = to_identifier(name);
        let mut ident = base.clone();
        let mut counter = 2;
        while taken.contains(&ident) {
            ident = format!("{base}_{counter}");
            counter += 1;
        }
        taken.push(ident);
    }
    taken
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::AnimationSettings;

    #[test]
    fn identifiers() {
        assert_eq!(to_identifier("arrow-left"), "arrowLeft");
        assert_eq!(to_identifier("Arrow Left 2"), "arrowLeft2");
        assert_eq!(to_identifier("mdi:home_outline"), "mdiHome_outline");
        assert_eq!(to_identifier("3d-box"), "_3dBox");
        assert_eq!(to_identifier("delete"), "_delete");
        assert_eq!(to_identifier("--"), "_");
    }

    #[test]
    fn collisions_get_suffixes() {
        assert_eq!(
            unique_identifiers(["arrow-left", "arrow_left", "arrow left"]),
            vec!["arrowLeft", "arrow_left", "arrowLeft_2"]
        );
    }

    #[test]
    fn prepare_splits_root() {
        let entry = IconEntry::new(
            "dot",
            r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 16 16"><circle r="2"/></svg>"#,
        );
        let prepared = prepare(&SvgManipulator::new(), &entry);
        assert_eq!(prepared.view_box, "0 0 16 16");
        assert_eq!(prepared.body, r#"<circle r="2"/>"#);
    }

    #[test]
    fn prepare_derives_view_box_from_size() {
        let entry = IconEntry::new("dot", r#"<svg width="32px" height="16"><g/></svg>"#);
        assert_eq!(prepare(&SvgManipulator::new(), &entry).view_box, "0 0 32 16");
    }

    #[test]
    fn prepare_replaces_stale_animation() {
        let manipulator = SvgManipulator::new();
        let stale = manipulator.embed_animation_in_svg(
            r#"<svg viewBox="0 0 24 24"><path d="M1 1"/></svg>"#,
            "spin",
            &AnimationSettings::default(),
        );
        let entry = IconEntry::new("x", stale)
            .with_animation(AnimationDescriptor::new("pulse", AnimationSettings::default()));
        let prepared = prepare(&manipulator, &entry);
        assert!(prepared.body.contains("@keyframes pulse"));
        assert!(!prepared.body.contains("@keyframes spin"));
    }
}
