//! Classification of the animation an SVG already carries.
//!
//! Pure text inspection: nothing here mutates markup.

use std::sync::LazyLock;

use regex::Regex;

static STYLE_BLOCK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<style\b[^>]*>(.*?)</style\s*>").expect("valid regex"));
static KEYFRAMES_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"@keyframes\s+([\w-]+)").expect("valid regex"));
static ANIMATION_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"animation(?:-name)?\s*:\s*([\w-]+)").expect("valid regex")
});
static INLINE_ANIMATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"animation(?:-name)?\s*:").expect("valid regex"));
static SMIL_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"<(animateTransform|animateMotion|animate|set)\b([^>]*)>").expect("valid regex")
});
static TYPE_ATTR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"\btype\s*=\s*["']([^"']*)["']"#).expect("valid regex"));

/// Semantic categories, in matching priority order.
const CSS_CATEGORIES: &[(&str, &[&str])] = &[
    ("spin", &["spin", "rotate"]),
    ("pulse", &["pulse"]),
    ("fade", &["fade"]),
    ("bounce", &["bounce"]),
    ("shake", &["shake"]),
    ("draw", &["draw"]),
];

/// Classifies the animation present in `svg`.
///
/// CSS animations map to a semantic category (`spin`, `pulse`, `fade`,
/// `bounce`, `shake`, `draw`) or the generic `CSS`; SMIL animations map to
/// `SMIL transform`, `SMIL motion`, or `SMIL`. Returns `None` if the icon is
/// static.
pub fn detect_from_content(svg: &str) -> Option<String> {
    if has_css_animation(svg) {
        return Some(classify_css(svg).to_string());
    }

    let tags = smil_tags(svg);
    if tags.is_empty() {
        return None;
    }
    let label = if tags.iter().any(|(tag, _)| *tag == "animateTransform") {
        "SMIL transform"
    } else if tags.iter().any(|(tag, _)| *tag == "animateMotion") {
        "SMIL motion"
    } else {
        "SMIL"
    };
    Some(label.to_string())
}

/// Labels a SMIL animation baked into the source icon.
///
/// Returns `native-<type>` for `animateTransform` (for example
/// `native-rotate`), `native-motion`, `native-animate`, or `native` for
/// anything else (`<set>`, or a transform without a `type`).
pub fn detect_native_animation(svg: &str) -> Option<String> {
    let tags = smil_tags(svg);
    let (tag, attrs) = primary_smil(&tags, |item| item.0)?;
    let transform_type = TYPE_ATTR
        .captures(attrs)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str());
    Some(native_label(tag, transform_type))
}

/// SMIL tags that name an animation, strongest first.
const SMIL_PRIORITY: &[&str] = &["animateTransform", "animateMotion", "animate"];

/// The SMIL element that labels an icon: the first element of the strongest
/// tag present, or the first element if none has a named tag.
pub(crate) fn primary_smil<T>(items: &[T], tag: impl Fn(&T) -> &str) -> Option<&T> {
    SMIL_PRIORITY
        .iter()
        .find_map(|wanted| items.iter().find(|item| tag(*item) == *wanted))
        .or_else(|| items.first())
}

/// `native-*` label of one SMIL element.
pub(crate) fn native_label(tag: &str, transform_type: Option<&str>) -> String {
    match tag {
        "animateTransform" => match transform_type.map(str::trim).filter(|t| !t.is_empty()) {
            Some(kind) => format!("native-{kind}"),
            None => "native".to_string(),
        },
        "animateMotion" => "native-motion".to_string(),
        "animate" => "native-animate".to_string(),
        _ => "native".to_string(),
    }
}

/// Returns true if the markup contains any SMIL animation element.
pub fn has_smil(svg: &str) -> bool {
    SMIL_TAG.is_match(svg)
}

/// Returns true if a `<style>` block defines keyframes or any `animation:`
/// declaration is present.
pub fn has_css_animation(svg: &str) -> bool {
    let in_style = STYLE_BLOCK
        .captures_iter(svg)
        .filter_map(|caps| caps.get(1))
        .any(|body| body.as_str().contains("@keyframes"));
    in_style || INLINE_ANIMATION.is_match(svg)
}

/// Names of all `@keyframes` rules, in order of appearance.
pub fn keyframe_names(css: &str) -> Vec<&str> {
    KEYFRAMES_NAME
        .captures_iter(css)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str())
        .collect()
}

fn classify_css(svg: &str) -> &'static str {
    let mut names: Vec<String> = keyframe_names(svg)
        .into_iter()
        .map(str::to_ascii_lowercase)
        .collect();
    names.extend(
        ANIMATION_NAME
            .captures_iter(svg)
            .filter_map(|caps| caps.get(1))
            .map(|m| m.as_str().to_ascii_lowercase()),
    );

    CSS_CATEGORIES
        .iter()
        .find(|(_, needles)| {
            names
                .iter()
                .any(|name| needles.iter().any(|needle| name.contains(needle)))
        })
        .map(|(category, _)| *category)
        .unwrap_or("CSS")
}

/// SMIL elements as `(tag, raw attributes)` in document order.
pub(crate) fn smil_tags(svg: &str) -> Vec<(&str, &str)> {
    SMIL_TAG
        .captures_iter(svg)
        .filter_map(|caps| Some((caps.get(1)?.as_str(), caps.get(2)?.as_str())))
        .collect()
}
