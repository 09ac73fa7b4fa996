//! The `icons.js` ES module.

use serde::Serialize;

use super::{IconEntry, prepare, unique_identifiers};
use crate::animation::AnimationDescriptor;
use crate::error::Result;
use crate::manipulation::SvgManipulator;

const HEADER: &str = "// Generated by icon-manager. Do not edit by hand.";

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ModuleIcon<'a> {
    name: &'a str,
    body: String,
    view_box: String,
    animation: Option<&'a AnimationDescriptor>,
}

/// Renders an ES module with one export per icon and an `icons` index:
///
/// ```js
/// export const arrowLeft = {
///   "name": "arrow-left",
///   "body": "<path d=\"...\"/>",
///   "viewBox": "0 0 24 24",
///   "animation": null
/// };
///
/// export const icons = {
///   "arrow-left": arrowLeft
/// };
/// ```
pub fn build_icons_module(manipulator: &SvgManipulator, entries: &[IconEntry]) -> Result<String> {
    let identifiers = unique_identifiers(entries.iter().map(|entry| entry.name.as_str()));
    let mut out = format!("{HEADER}\n");

    for (entry, ident) in entries.iter().zip(&identifiers) {
        let prepared = prepare(manipulator, entry);
        let icon = ModuleIcon {
            name: &entry.name,
            body: prepared.body,
            view_box: prepared.view_box,
            animation: entry.animation.as_ref(),
        };
        let json = serde_json::to_string_pretty(&icon)?;
        out.push_str(&format!("\nexport const {ident} = {json};\n"));
    }

    out.push_str("\nexport const icons = {");
    for (index, (entry, ident)) in entries.iter().zip(&identifiers).enumerate() {
        let separator = if index + 1 < entries.len() { "," } else { "" };
        let key = serde_json::to_string(&entry.name)?;
        out.push_str(&format!("\n  {key}: {ident}{separator}"));
    }
    out.push_str(if entries.is_empty() { "};\n" } else { "\n};\n" });
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::AnimationSettings;

    #[test]
    fn exports_each_icon() {
        let entries = vec![
            IconEntry::new(
                "arrow-left",
                r#"<svg viewBox="0 0 24 24"><path d="M1 1"/></svg>"#,
            ),
            IconEntry::new("loader", r#"<svg viewBox="0 0 16 16"><circle r="4"/></svg>"#)
                .with_animation(AnimationDescriptor::new("spin", AnimationSettings::new(1.0))),
        ];
        let module = build_icons_module(&SvgManipulator::new(), &entries).unwrap();

        assert!(module.contains("export const arrowLeft = {"));
        assert!(module.contains(r#""body": "<path d=\"M1 1\"/>""#));
        assert!(module.contains(r#""viewBox": "0 0 24 24""#));
        assert!(module.contains("export const loader = {"));
        assert!(module.contains("@keyframes spin"));
        assert!(module.contains(r#""type": "spin""#));
        assert!(module.ends_with("export const icons = {\n  \"arrow-left\": arrowLeft,\n  \"loader\": loader\n};\n"));
    }

    #[test]
    fn animated_icons_get_their_own_wrapper() {
        let icon = r#"<svg viewBox="0 0 24 24"><path d="M1 1"/></svg>"#;
        let entries = vec![
            IconEntry::new("a", icon)
                .with_animation(AnimationDescriptor::new("spin", AnimationSettings::default())),
            IconEntry::new("b", icon)
                .with_animation(AnimationDescriptor::new("pulse", AnimationSettings::default())),
        ];
        let module = build_icons_module(&SvgManipulator::new(), &entries).unwrap();

        let class = regex::Regex::new(r"icon-anim-\d+").unwrap();
        let mut classes: Vec<&str> = class.find_iter(&module).map(|m| m.as_str()).collect();
        classes.sort();
        classes.dedup();
        assert_eq!(classes.len(), 2);
    }

    #[test]
    fn empty_module() {
        let module = build_icons_module(&SvgManipulator::new(), &[]).unwrap();
        assert!(module.ends_with("export const icons = {};\n"));
    }
}
