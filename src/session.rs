//! Per-workspace editing session.
//!
//! [`IconSession`] owns one instance of every service and is passed to
//! whatever needs them, instead of services being looked up globally. A UI
//! talks to it through [`IconProfile`] snapshots:
//!
//! ```
//! use icon_manager::{Configurable, IconManagerConfig, IconSession, MemoryStore};
//!
//! let mut session = IconSession::new(IconManagerConfig::default(), Box::new(MemoryStore::new()));
//! let svg = r##"<svg viewBox="0 0 24 24"><path fill="#ff0000" d="M1 1"/></svg>"##;
//!
//! let edited = session.edit_color("home", svg, "#ff0000", "#00ff00");
//! assert!(edited.contains("#00ff00"));
//!
//! let profile = session.export_profile("home", &edited);
//! assert_eq!(profile.color_mappings["#ff0000"], "#00ff00");
//! let json = profile.to_json().unwrap();
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::animation::{AnimationDescriptor, detect_from_content};
use crate::color::{ColorService, ColorSet, normalize_color};
use crate::config::{CONFIG_FILE, IconManagerConfig};
use crate::error::Result;
use crate::manipulation::SvgManipulator;
use crate::variants::{
    CUSTOM_VARIANT, FileStore, ORIGINAL_VARIANT, Variant, VariantsService, VariantsStore,
};

/// Trait for exporting and applying serializable icon settings.
pub trait Configurable {
    /// Exports the stored settings of `icon`, with facts read from `svg`.
    fn export_profile(&mut self, icon: &str, svg: &str) -> IconProfile;

    /// Stores the settings of a profile.
    fn apply_profile(&mut self, profile: &IconProfile);
}

// ============================================================================
// IconProfile
// ============================================================================

/// Everything a UI shows about one icon.
///
/// # JSON Format
///
/// ```json
/// {
///   "icon": "home",
///   "colors": { "colors": ["#ff0000"], "hasCurrentColor": false, "hasSmil": false },
///   "variants": [{ "name": "Night", "colors": ["#220000"] }],
///   "defaultVariant": "Night",
///   "colorMappings": { "#ff0000": "#00ff00" },
///   "animation": { "type": "spin", "settings": { "duration": 1.0, ... } }
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "jsonschema", derive(schemars::JsonSchema))]
#[serde(rename_all = "camelCase")]
pub struct IconProfile {
    pub icon: String,

    /// Editable colors of the icon.
    #[serde(default)]
    pub colors: ColorSet,

    /// User-visible variants.
    #[serde(default)]
    pub variants: Vec<Variant>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_variant: Option<String>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub color_mappings: BTreeMap<String, String>,

    /// Stored animation preset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub animation: Option<AnimationDescriptor>,

    /// Animation currently present in the markup. Read-only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detected_animation: Option<AnimationDescriptor>,

    /// Category of the animation present in the markup (`spin`, `SMIL`, ...).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub animation_category: Option<String>,
}

impl IconProfile {
    pub fn new(icon: impl Into<String>) -> Self {
        Self {
            icon: icon.into(),
            ..Self::default()
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

// ============================================================================
// IconSession
// ============================================================================

/// Services of one workspace.
#[derive(Debug)]
pub struct IconSession {
    config: IconManagerConfig,
    manipulator: SvgManipulator,
    colors: ColorService,
    variants: VariantsService,
    active_icon: Option<String>,
}

impl IconSession {
    pub fn new(config: IconManagerConfig, store: Box<dyn VariantsStore>) -> Self {
        Self {
            config,
            manipulator: SvgManipulator::new(),
            colors: ColorService::new(),
            variants: VariantsService::new(store),
            active_icon: None,
        }
    }

    /// Opens a workspace: reads its config file and stores variants at the
    /// configured path.
    pub fn open(workspace: &Path) -> Result<Self> {
        let config = IconManagerConfig::load(workspace.join(CONFIG_FILE))?;
        let store = FileStore::new(config.variants_path(workspace));
        Ok(Self::new(config, Box::new(store)))
    }

    pub fn config(&self) -> &IconManagerConfig {
        &self.config
    }

    pub fn manipulator(&self) -> &SvgManipulator {
        &self.manipulator
    }

    pub fn colors(&self) -> &ColorService {
        &self.colors
    }

    pub fn variants(&mut self) -> &mut VariantsService {
        &mut self.variants
    }

    /// The icon being edited, if any.
    pub fn active_icon(&self) -> Option<&str> {
        self.active_icon.as_deref()
    }

    /// Cleans `svg` and embeds `animation`, as written into build artifacts.
    ///
    /// SMIL animations that came with the icon are kept as they are.
    pub fn prepare_for_build(&self, svg: &str, animation: Option<&AnimationDescriptor>) -> String {
        let cleaned = self.manipulator.clean_animation_from_svg(svg);
        match animation {
            Some(animation) if !animation.is_native() => self.manipulator.embed_animation_in_svg(
                &cleaned,
                &animation.kind,
                &animation.settings,
            ),
            _ => cleaned,
        }
    }

    /// Replaces one color of `icon` and records the edit.
    ///
    /// The first edit snapshots the palette as `_original` and creates the
    /// `custom` variant. The color mapping is keyed by the original color at
    /// the edited position, so repeated edits of one swatch keep one entry.
    pub fn edit_color(&mut self, icon: &str, svg: &str, old: &str, new: &str) -> String {
        let current = self.colors.extract_colors_from_svg(svg).colors;
        let original = self.variants.ensure_custom_variant(icon, &current);

        let target = normalize_color(old);
        let position = current.iter().position(|c| normalize_color(c) == target);
        let original_color = position
            .and_then(|index| original.get(index))
            .cloned()
            .unwrap_or_else(|| old.to_string());
        self.variants.set_color_mapping(icon, &original_color, new);

        if let Some(index) = position {
            let mut custom = self
                .variants
                .get_all_variants(icon)
                .into_iter()
                .find(|v| v.name == CUSTOM_VARIANT)
                .map(|v| v.colors)
                .filter(|colors| colors.len() == current.len())
                .unwrap_or_else(|| current.clone());
            custom[index] = normalize_color(new);
            self.variants.save_variant(icon, CUSTOM_VARIANT, custom);
        }

        self.colors.replace_color_in_svg(svg, old, new)
    }

    /// Applies the stored variant `name` (internal ones included) to `svg`.
    ///
    /// Returns `None` if `icon` has no such variant.
    pub fn apply_variant(&mut self, icon: &str, svg: &str, name: &str) -> Option<String> {
        let variant = self
            .variants
            .get_all_variants(icon)
            .into_iter()
            .find(|v| v.name == name)?;
        let current = self.colors.extract_colors_from_svg(svg).colors;
        Some(
            self.colors
                .apply_variant_colors(svg, &current, &variant.colors),
        )
    }

    /// Restores the `_original` palette and forgets the color mappings.
    pub fn restore_original(&mut self, icon: &str, svg: &str) -> Option<String> {
        let restored = self.apply_variant(icon, svg, ORIGINAL_VARIANT)?;
        self.variants.clear_color_mappings(icon);
        Some(restored)
    }

    /// Makes `icon` the active icon.
    ///
    /// Pending changes are persisted first when `autoPersist` is set and
    /// discarded otherwise; the cache is then reloaded lazily.
    pub fn switch_icon(&mut self, icon: &str) -> Result<()> {
        if self.variants.has_unsaved_changes() {
            if self.config.auto_persist {
                self.variants.persist_to_file()?;
            } else {
                log::warn!("discarding unsaved variant changes while switching to '{icon}'");
            }
        }
        self.variants.reset_cache();
        self.active_icon = Some(icon.to_string());
        Ok(())
    }

    /// Ends the session, persisting pending changes when `autoPersist` is set.
    pub fn dispose(mut self) -> Result<()> {
        if self.config.auto_persist && self.variants.has_unsaved_changes() {
            self.variants.persist_to_file()?;
        }
        self.variants.reset_cache();
        Ok(())
    }
}

impl Configurable for IconSession {
    fn export_profile(&mut self, icon: &str, svg: &str) -> IconProfile {
        IconProfile {
            icon: icon.to_string(),
            colors: self.colors.extract_colors_from_svg(svg),
            variants: self.variants.get_saved_variants(icon),
            default_variant: self.variants.get_default_variant(icon),
            color_mappings: self.variants.get_color_mappings(icon),
            animation: self.variants.get_animation(icon),
            detected_animation: self.manipulator.detect_animation_from_svg(svg),
            animation_category: detect_from_content(svg),
        }
    }

    fn apply_profile(&mut self, profile: &IconProfile) {
        let icon = profile.icon.as_str();
        for variant in &profile.variants {
            self.variants
                .save_variant(icon, &variant.name, variant.colors.clone());
        }
        self.variants
            .set_default_variant(icon, profile.default_variant.as_deref());

        self.variants.clear_color_mappings(icon);
        for (original, replacement) in &profile.color_mappings {
            self.variants.set_color_mapping(icon, original, replacement);
        }

        let animation = profile.animation.clone().filter(|a| !a.is_native());
        self.variants.set_animation(icon, animation);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::AnimationSettings;
    use crate::variants::MemoryStore;

    const ICON: &str = r##"<svg viewBox="0 0 24 24"><path fill="#ff0000"/><path stroke="#0000ff"/></svg>"##;

    fn session(auto_persist: bool) -> (IconSession, MemoryStore) {
        let store = MemoryStore::new();
        let config = IconManagerConfig {
            auto_persist,
            ..IconManagerConfig::default()
        };
        (IconSession::new(config, Box::new(store.clone())), store)
    }

    #[test]
    fn edit_color_bootstraps_variants() {
        let (mut session, _) = session(true);
        let edited = session.edit_color("home", ICON, "#ff0000", "#00ff00");
        assert!(edited.contains(r##"fill="#00ff00""##));

        let all = session.variants().get_all_variants("home");
        assert_eq!(all[0].name, "_original");
        assert_eq!(all[0].colors, vec!["#ff0000", "#0000ff"]);
        assert_eq!(all[1].name, "custom");
        assert_eq!(all[1].colors, vec!["#00ff00", "#0000ff"]);
    }

    #[test]
    fn repeated_edits_keep_one_mapping() {
        let (mut session, _) = session(true);
        let once = session.edit_color("home", ICON, "#ff0000", "#00ff00");
        let _twice = session.edit_color("home", &once, "#00ff00", "#123456");

        let mappings = session.variants().get_color_mappings("home");
        assert_eq!(mappings.len(), 1);
        assert_eq!(mappings["#ff0000"], "#123456");
    }

    #[test]
    fn restore_original_undoes_edits() {
        let (mut session, _) = session(true);
        let edited = session.edit_color("home", ICON, "#ff0000", "#00ff00");
        let restored = session.restore_original("home", &edited).unwrap();
        assert_eq!(restored, ICON);
        assert!(session.variants().get_color_mappings("home").is_empty());
    }

    #[test]
    fn apply_unknown_variant() {
        let (mut session, _) = session(true);
        assert_eq!(session.apply_variant("home", ICON, "Night"), None);
    }

    #[test]
    fn switch_icon_persists_when_configured() {
        let (mut session, store) = session(true);
        session.edit_color("home", ICON, "#ff0000", "#00ff00");
        session.switch_icon("star").unwrap();
        assert_eq!(session.active_icon(), Some("star"));
        assert!(store.contents().unwrap().contains("_original"));
    }

    #[test]
    fn switch_icon_discards_without_auto_persist() {
        let (mut session, store) = session(false);
        session.edit_color("home", ICON, "#ff0000", "#00ff00");
        session.switch_icon("star").unwrap();
        assert!(store.contents().is_none());
        assert!(session.variants().get_all_variants("home").is_empty());
    }

    #[test]
    fn dispose_persists() {
        let (mut session, store) = session(true);
        session
            .variants()
            .save_variant("home", "Night", vec!["#220000".into()]);
        session.dispose().unwrap();
        assert!(store.contents().unwrap().contains("Night"));
    }

    #[test]
    fn prepare_for_build_keeps_native_animation() {
        let (session, _) = session(true);
        let smil = r#"<svg><circle><animate attributeName="r" dur="1s"/></circle></svg>"#;
        let native = AnimationDescriptor::new("native-animate", AnimationSettings::default());
        assert_eq!(session.prepare_for_build(smil, Some(&native)), smil);

        let spin = AnimationDescriptor::new("spin", AnimationSettings::default());
        assert!(session.prepare_for_build(smil, Some(&spin)).contains("@keyframes spin"));
    }

    #[test]
    fn profile_roundtrip() {
        let (mut session, _) = session(true);
        let mut profile = IconProfile::new("home");
        profile.variants.push(Variant::new("Night", vec!["#220000".into()]));
        profile.default_variant = Some("Night".into());
        profile
            .color_mappings
            .insert("#ff0000".into(), "#00ff00".into());
        profile.animation = Some(AnimationDescriptor::new("pulse", AnimationSettings::new(2.0)));

        let json = profile.to_json_pretty().unwrap();
        let restored = IconProfile::from_json(&json).unwrap();
        assert_eq!(restored, profile);

        session.apply_profile(&restored);
        let exported = session.export_profile("home", ICON);
        assert_eq!(exported.variants, profile.variants);
        assert_eq!(exported.default_variant.as_deref(), Some("Night"));
        assert_eq!(exported.color_mappings, profile.color_mappings);
        assert_eq!(exported.animation, profile.animation);
        assert_eq!(exported.colors.colors, vec!["#ff0000", "#0000ff"]);
        assert_eq!(exported.detected_animation, None);
    }
}
