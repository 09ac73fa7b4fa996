//! The `sprite.svg` symbol sheet.

use super::{IconEntry, prepare};
use crate::manipulation::SvgManipulator;
use crate::svg::SVG_NAMESPACE;

/// Renders a hidden sprite with one `<symbol>` per icon, addressed by name:
/// `<svg><use href="sprite.svg#arrow-left"/></svg>`.
pub fn build_sprite(manipulator: &SvgManipulator, entries: &[IconEntry]) -> String {
    let mut out = format!("<svg xmlns=\"{SVG_NAMESPACE}\" style=\"display: none\">\n");
    for entry in entries {
        let prepared = prepare(manipulator, entry);
        out.push_str(&format!(
            "  <symbol id=\"{}\" viewBox=\"{}\">{}</symbol>\n",
            escape_attribute(&entry.name),
            escape_attribute(&prepared.view_box),
            prepared.body
        ));
    }
    out.push_str("</svg>\n");
    out
}

fn escape_attribute(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('"', "&quot;")
        .replace('<', "&lt;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::{AnimationDescriptor, AnimationSettings};
    use crate::svg::SvgDocument;

    #[test]
    fn one_symbol_per_icon() {
        let entries = vec![
            IconEntry::new("home", r#"<svg viewBox="0 0 24 24"><path d="M1 1"/></svg>"#),
            IconEntry::new("a\"b", r#"<svg width="8" height="8"><rect/></svg>"#),
        ];
        let sprite = build_sprite(&SvgManipulator::new(), &entries);

        assert!(sprite.starts_with(r#"<svg xmlns="http://www.w3.org/2000/svg" style="display: none">"#));
        assert!(sprite.contains(r#"<symbol id="home" viewBox="0 0 24 24"><path d="M1 1"/></symbol>"#));
        assert!(sprite.contains(r#"<symbol id="a&quot;b" viewBox="0 0 8 8"><rect/></symbol>"#));

        let doc = SvgDocument::parse(&sprite).unwrap();
        let symbols = doc.elements().into_iter().filter(|el| el.is("symbol")).count();
        assert_eq!(symbols, 2);
    }

    #[test]
    fn animated_symbols_get_their_own_wrapper() {
        let icon = r#"<svg viewBox="0 0 24 24"><path d="M1 1"/></svg>"#;
        let entries = vec![
            IconEntry::new("a", icon)
                .with_animation(AnimationDescriptor::new("spin", AnimationSettings::default())),
            IconEntry::new("b", icon)
                .with_animation(AnimationDescriptor::new("pulse", AnimationSettings::default())),
        ];
        let sprite = build_sprite(&SvgManipulator::new(), &entries);

        let doc = SvgDocument::parse(&sprite).unwrap();
        let classes: Vec<&str> = doc
            .elements()
            .into_iter()
            .filter(|el| el.is("g"))
            .filter_map(|el| el.attr("class"))
            .collect();
        assert_eq!(classes.len(), 2);
        assert_ne!(classes[0], classes[1]);
    }
}
