//! The generated `variants.js` module.
//!
//! The file is a JavaScript module so that apps can import the palettes
//! directly, but its round-trip form is the JSON document stored in the
//! `/* icon-manager:data ... */` comment at the top:
//!
//! ```js
//! // Generated by icon-manager. The export blocks are rebuilt on every save.
//! /* icon-manager:data
//! {"variants":{"home":{"_original":["#ff0000"],"Night":["#220000"]}}}
//! */
//!
//! export const Variants = {
//!   "home": {
//!     "_original": ["#ff0000"],
//!     "Night": ["#220000"]
//!   }
//! };
//! ```
//!
//! Files written by hand or by older releases have no data comment; their
//! `export const` blocks are read as strict JSON instead.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use serde_json::Value;

use super::VariantsData;
use crate::error::Result;

const DATA_OPEN: &str = "/* icon-manager:data";
const DATA_CLOSE: &str = "*/";
const HEADER: &str = "// Generated by icon-manager. The export blocks are rebuilt on every save.";

static EXPORT_CONST: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"export\s+const\s+(\w+)\s*=\s*").expect("valid regex"));

/// Renders the whole module.
pub fn render(data: &VariantsData) -> Result<String> {
    // `*/` can only occur inside JSON strings, where `\/` is a valid escape.
    let embedded = serde_json::to_string(data)?.replace("*/", "*\\/");

    let mut out = format!("{HEADER}\n{DATA_OPEN}\n{embedded}\n{DATA_CLOSE}\n");
    push_export(&mut out, "Variants", &data.variants)?;
    push_export(&mut out, "DefaultVariants", &data.default_variants)?;
    push_export(&mut out, "ColorMappings", &data.color_mappings)?;
    push_export(&mut out, "AnimationPresets", &data.animation_presets)?;
    Ok(out)
}

fn push_export(out: &mut String, name: &str, value: &impl Serialize) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    out.push_str(&format!("\nexport const {name} = {json};\n"));
    Ok(())
}

/// Parses a variants module.
///
/// Unreadable content yields empty data and a warning; a broken file must
/// never block editing.
pub fn parse(contents: &str) -> VariantsData {
    if contents.trim().is_empty() {
        return VariantsData::default();
    }

    if let Some(json) = data_block(contents) {
        match serde_json::from_str(json) {
            Ok(data) => return data,
            Err(e) => log::warn!("variants data block is not valid JSON, ignoring it: {e}"),
        }
    }

    match parse_exports(contents) {
        Ok(data) => data,
        Err(e) => {
            log::warn!("cannot read variants file, starting empty: {e}");
            VariantsData::default()
        }
    }
}

fn data_block(contents: &str) -> Option<&str> {
    let start = contents.find(DATA_OPEN)? + DATA_OPEN.len();
    let len = contents[start..].find(DATA_CLOSE)?;
    Some(contents[start..start + len].trim())
}

/// Reads every `export const Name = <json>;` block.
fn parse_exports(contents: &str) -> Result<VariantsData> {
    let mut sections = serde_json::Map::new();

    for caps in EXPORT_CONST.captures_iter(contents) {
        let (Some(name), Some(whole)) = (caps.get(1), caps.get(0)) else {
            continue;
        };
        let section = match name.as_str() {
            "Variants" => "variants",
            "DefaultVariants" => "defaultVariants",
            "ColorMappings" => "colorMappings",
            "AnimationPresets" => "animationPresets",
            other => {
                log::debug!("ignoring unknown export '{other}' in variants file");
                continue;
            }
        };

        let value = serde_json::Deserializer::from_str(&contents[whole.end()..])
            .into_iter::<Value>()
            .next()
            .transpose()?
            .unwrap_or(Value::Null);
        sections.insert(section.to_string(), value);
    }

    Ok(serde_json::from_value(Value::Object(sections))?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::{AnimationDescriptor, AnimationSettings};
    use crate::variants::Variant;

    fn sample() -> VariantsData {
        let mut data = VariantsData::default();
        data.variants.insert(
            "home".into(),
            vec![
                Variant::new("_original", vec!["#ff0000".into()]),
                Variant::new("Night */ Mode", vec!["#220000".into()]),
                Variant::new("Alpha", vec!["#00ff00".into()]),
            ]
            .into(),
        );
        data.default_variants.insert("home".into(), "Alpha".into());
        data.color_mappings
            .entry("home".into())
            .or_default()
            .insert("#ff0000".into(), "#0000ff".into());
        data.animation_presets.insert(
            "home".into(),
            AnimationDescriptor::new("spin", AnimationSettings::new(2.0)),
        );
        data
    }

    #[test]
    fn render_then_parse_preserves_everything() {
        let data = sample();
        let text = render(&data).unwrap();
        assert!(text.contains("export const Variants = {"));
        assert!(text.contains("export const DefaultVariants = {"));
        assert!(text.contains("export const ColorMappings = {"));
        assert!(text.contains("export const AnimationPresets = {"));
        assert_eq!(parse(&text), data);
    }

    #[test]
    fn variant_order_survives() {
        let text = render(&sample()).unwrap();
        let names: Vec<String> = parse(&text).variants["home"]
            .iter()
            .map(|v| v.name.clone())
            .collect();
        assert_eq!(names, vec!["_original", "Night */ Mode", "Alpha"]);
    }

    #[test]
    fn reads_export_blocks_without_data_comment() {
        let text = r##"
export const Variants = {
  "star": { "Gold": ["#ffd700"] }
};
export const DefaultVariants = { "star": "Gold" };
export const Extra = 1;
"##;
        let data = parse(text);
        assert_eq!(data.variants["star"].iter().next().unwrap().name, "Gold");
        assert_eq!(data.default_variants["star"], "Gold");
        assert!(data.color_mappings.is_empty());
    }

    #[test]
    fn garbage_is_empty() {
        assert_eq!(parse("export const Variants = { nope"), VariantsData::default());
        assert_eq!(parse(""), VariantsData::default());
        assert_eq!(parse("console.log('hi')"), VariantsData::default());
    }
}
