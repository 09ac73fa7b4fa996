//! Text patches used when markup cannot be parsed as a tree.
//!
//! These work on the root start tag and on well-known element shapes only.
//! They are deliberately narrow: anything they do not recognize is left as is.

use std::sync::LazyLock;

use regex::{Captures, Regex};

use super::{LEGACY_SCRIPT_MARKER, is_legacy_style, merge_filter, smil_settings};
use crate::animation::draw::DrawAnimation;
use crate::animation::{AnimationDescriptor, detector};
use crate::svg::{ANIMATION_SCRIPT_ID, ANIMATION_STYLE_ID, SVG_NAMESPACE};

static ROOT_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<svg\b[^>]*?(/?)>").expect("valid regex"));
static CLOSE_ROOT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)</svg\s*>").expect("valid regex"));
static XMLNS_DEFAULT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\s+xmlns\s*=\s*(?:"([^"]*)"|'([^']*)')"#).expect("valid regex")
});
static STYLE_ATTR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)\s+style\s*=\s*(?:"([^"]*)"|'([^']*)')"#).expect("valid regex")
});
static ATTRIBUTE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"([\w:.-]+)\s*=\s*(?:"([^"]*)"|'([^']*)')"#).expect("valid regex")
});
static STYLE_BY_ID: LazyLock<Regex> = LazyLock::new(|| element_by_id("style", ANIMATION_STYLE_ID));
static SCRIPT_BY_ID: LazyLock<Regex> =
    LazyLock::new(|| element_by_id("script", ANIMATION_SCRIPT_ID));
static STYLE_ANY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<style\b[^>]*>(.*?)</style\s*>").expect("valid regex"));
static SCRIPT_ANY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<script\b[^>]*>(.*?)</script\s*>").expect("valid regex"));
static WRAPPER_OPEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?i)<g\b[^>]*?\bclass\s*=\s*["'](?:[^"']*\s)?icon-anim-\d+(?:\s[^"']*)?["'][^>]*?(/?)>"#,
    )
    .expect("valid regex")
});
static G_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<(/?)g\b[^>]*?(/?)>").expect("valid regex"));

fn element_by_id(tag: &str, id: &str) -> Regex {
    let pattern = format!(
        r#"(?is)<{tag}\b[^>]*\bid\s*=\s*["']{}["'][^>]*?(?:/>|>.*?</{tag}\s*>)"#,
        regex::escape(id)
    );
    Regex::new(&pattern).expect("valid regex")
}

/// Value of a quoted attribute from either capture alternative.
fn quoted<'a>(caps: &Captures<'a>, double: usize, single: usize) -> &'a str {
    caps.get(double)
        .or_else(|| caps.get(single))
        .map(|m| m.as_str())
        .unwrap_or_default()
}

// ============================================================================
// Root Tag
// ============================================================================

struct RootTag {
    start: usize,
    end: usize,
    /// Offset of the optional `/` before `>`.
    slash: usize,
    self_closing: bool,
}

fn root_tag(svg: &str) -> Option<RootTag> {
    let caps = ROOT_TAG.captures(svg)?;
    let tag = caps.get(0)?;
    let slash = caps.get(1)?;
    Some(RootTag {
        start: tag.start(),
        end: tag.end(),
        slash: slash.start(),
        self_closing: !slash.as_str().is_empty(),
    })
}

/// Rewrites the root start tag with `f`, which receives the tag text without
/// its closing `>` or `/>`.
fn rewrite_root_tag(svg: &str, f: impl FnOnce(&str) -> String) -> Option<String> {
    let root = root_tag(svg)?;
    let head = svg.get(root.start..root.slash)?.trim_end();
    let tail = svg.get(root.slash..root.end)?;
    Some(format!(
        "{}{}{tail}{}",
        &svg[..root.start],
        f(head),
        &svg[root.end..]
    ))
}

/// Replaces the root's content with `f(content)`.
///
/// A self-closing root is expanded; a missing `</svg>` is appended.
fn rewrite_root_content(svg: &str, f: impl FnOnce(&str) -> String) -> Option<String> {
    let root = root_tag(svg)?;

    if root.self_closing {
        let head = svg.get(root.start..root.slash)?.trim_end();
        return Some(format!(
            "{}{head}>{}</svg>{}",
            &svg[..root.start],
            f(""),
            &svg[root.end..]
        ));
    }

    let rest = &svg[root.end..];
    let (content, suffix) = match CLOSE_ROOT.find_iter(rest).last() {
        Some(close) => (&rest[..close.start()], &rest[close.start()..]),
        None => (rest, "</svg>"),
    };
    Some(format!("{}{}{suffix}", &svg[..root.end], f(content)))
}

// ============================================================================
// Patches
// ============================================================================

pub(super) fn ensure_namespace(svg: &str) -> String {
    let Some(root) = root_tag(svg) else {
        log::debug!("ensure namespace: no <svg> tag found");
        return svg.to_string();
    };

    let tag = &svg[root.start..root.end];
    let declared: Vec<&str> = XMLNS_DEFAULT
        .captures_iter(tag)
        .map(|caps| quoted(&caps, 1, 2))
        .collect();
    if declared == [SVG_NAMESPACE] {
        return svg.to_string();
    }

    rewrite_root_tag(svg, |head| {
        let stripped = XMLNS_DEFAULT.replace_all(head, "");
        let name_end = "<svg".len().min(stripped.len());
        format!(
            "{} xmlns=\"{SVG_NAMESPACE}\"{}",
            &stripped[..name_end],
            &stripped[name_end..]
        )
    })
    .unwrap_or_else(|| svg.to_string())
}

pub(super) fn clean_animation(svg: &str) -> String {
    let cleaned = STYLE_BY_ID.replace_all(svg, "");
    let cleaned = SCRIPT_BY_ID.replace_all(&cleaned, "");
    let cleaned = unwrap_wrappers(&cleaned);

    let cleaned = STYLE_ANY.replace_all(&cleaned, |caps: &Captures<'_>| {
        if is_legacy_style(&caps[1]) {
            String::new()
        } else {
            caps[0].to_string()
        }
    });
    let cleaned = SCRIPT_ANY.replace_all(&cleaned, |caps: &Captures<'_>| {
        if caps[1].contains(LEGACY_SCRIPT_MARKER) {
            String::new()
        } else {
            caps[0].to_string()
        }
    });
    cleaned.into_owned()
}

/// Removes each wrapper `<g>` and its balanced `</g>`, keeping the content.
fn unwrap_wrappers(svg: &str) -> String {
    let mut out = svg.to_string();

    while let Some(caps) = WRAPPER_OPEN.captures(&out) {
        let Some(open) = caps.get(0) else { break };
        let self_closing = caps.get(1).is_some_and(|m| !m.as_str().is_empty());
        let (open_start, open_end) = (open.start(), open.end());

        let close = if self_closing {
            None
        } else {
            matching_close(&out[open_end..]).map(|(start, end)| (open_end + start, open_end + end))
        };

        match close {
            Some((close_start, close_end)) => {
                out.replace_range(close_start..close_end, "");
                out.replace_range(open_start..open_end, "");
            }
            None => out.replace_range(open_start..open_end, ""),
        }
    }
    out
}

/// Finds the `</g>` that closes a group opened just before `content`.
fn matching_close(content: &str) -> Option<(usize, usize)> {
    let mut depth = 1usize;
    for caps in G_TAG.captures_iter(content) {
        let tag = caps.get(0)?;
        let closing = caps.get(1).is_some_and(|m| !m.as_str().is_empty());
        let empty = caps.get(2).is_some_and(|m| !m.as_str().is_empty());
        if closing {
            depth -= 1;
            if depth == 0 {
                return Some((tag.start(), tag.end()));
            }
        } else if !empty {
            depth += 1;
        }
    }
    None
}

pub(super) fn embed_wrapped(svg: &str, class: &str, css: &str) -> String {
    rewrite_root_content(svg, |content| {
        format!(
            "<style id=\"{ANIMATION_STYLE_ID}\">\n{css}\n</style><g class=\"{class}\">{content}</g>"
        )
    })
    .unwrap_or_else(|| {
        log::debug!("embed animation: no <svg> tag found");
        svg.to_string()
    })
}

pub(super) fn embed_draw(svg: &str, built: &DrawAnimation) -> String {
    rewrite_root_content(svg, |content| {
        format!(
            "<style id=\"{ANIMATION_STYLE_ID}\">\n{}\n</style>{content}<script id=\"{ANIMATION_SCRIPT_ID}\">\n{}\n</script>",
            built.style, built.script
        )
    })
    .unwrap_or_else(|| {
        log::debug!("embed draw animation: no <svg> tag found");
        svg.to_string()
    })
}

pub(super) fn detect_smil(svg: &str) -> Option<AnimationDescriptor> {
    let tags = detector::smil_tags(svg);
    let (tag, attrs) = detector::primary_smil(&tags, |item| item.0)?;

    let value = |name: &str| {
        ATTRIBUTE
            .captures_iter(attrs)
            .find(|caps| &caps[1] == name)
            .map(|caps| quoted(&caps, 2, 3).to_string())
    };
    let settings = smil_settings(
        value("dur").as_deref(),
        value("repeatCount").as_deref(),
        value("begin").as_deref(),
    );
    let kind = detector::native_label(tag, value("type").as_deref());
    Some(AnimationDescriptor::new(kind, settings))
}

pub(super) fn apply_css_filter(svg: &str, filter: &str) -> String {
    let Some(root) = root_tag(svg) else {
        log::debug!("apply filter: no <svg> tag found");
        return svg.to_string();
    };

    let tag = &svg[root.start..root.end];
    let current = STYLE_ATTR.captures(tag);
    let current_value = current.as_ref().map(|caps| quoted(caps, 1, 2)).unwrap_or_default();
    let merged = merge_filter(current_value, filter);
    if merged == current_value {
        return svg.to_string();
    }

    rewrite_root_tag(svg, |head| {
        let stripped = STYLE_ATTR.replace_all(head, "");
        if merged.is_empty() {
            stripped.into_owned()
        } else {
            format!("{stripped} style=\"{merged}\"")
        }
    })
    .unwrap_or_else(|| svg.to_string())
}
