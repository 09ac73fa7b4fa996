//! Named color variants, color mappings, default variants, and animation
//! presets, persisted in a generated `variants.js` module.
//!
//! [`VariantsService`] reads the file once, keeps every change in memory,
//! and only writes when [`VariantsService::persist_to_file`] is called. The
//! whole file is regenerated from the cache on every write.
//!
//! # Example
//!
//! ```
//! use icon_manager::{MemoryStore, VariantsService};
//!
//! let store = MemoryStore::new();
//! let mut variants = VariantsService::new(Box::new(store.clone()));
//!
//! variants.save_variant("home", "Night", vec!["#220000".into()]);
//! assert!(variants.has_unsaved_changes());
//!
//! variants.persist_to_file().unwrap();
//! assert!(store.contents().unwrap().contains("export const Variants"));
//! ```

pub mod file;
pub mod store;

pub use store::{FileStore, MemoryStore, VariantsStore};

use std::collections::BTreeMap;
use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::animation::AnimationDescriptor;
use crate::error::Result;

/// Prefix of internal variants hidden from users.
pub const INTERNAL_PREFIX: &str = "_";

/// Snapshot of the colors an icon had before it was first edited.
pub const ORIGINAL_VARIANT: &str = "_original";

/// Variant that tracks in-progress edits.
pub const CUSTOM_VARIANT: &str = "custom";

// ============================================================================
// Data Model
// ============================================================================

/// A named palette, positionally aligned with the colors of the icon.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "jsonschema", derive(schemars::JsonSchema))]
pub struct Variant {
    pub name: String,
    pub colors: Vec<String>,
}

impl Variant {
    pub fn new(name: impl Into<String>, colors: Vec<String>) -> Self {
        Self {
            name: name.into(),
            colors,
        }
    }

    /// Internal variants (`_original`) are never listed to users.
    pub fn is_internal(&self) -> bool {
        self.name.starts_with(INTERNAL_PREFIX)
    }
}

/// Variants of one icon in storage order.
///
/// Serialized as a JSON object of `name -> colors`, keeping the order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VariantSet(Vec<Variant>);

impl VariantSet {
    pub fn iter(&self) -> std::slice::Iter<'_, Variant> {
        self.0.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&Variant> {
        self.0.iter().find(|v| v.name == name)
    }

    fn get_mut(&mut self, name: &str) -> Option<&mut Variant> {
        self.0.iter_mut().find(|v| v.name == name)
    }

    /// Storage position of the `index`th visible variant.
    fn visible_position(&self, index: usize) -> Option<usize> {
        self.0
            .iter()
            .enumerate()
            .filter(|(_, v)| !v.is_internal())
            .nth(index)
            .map(|(position, _)| position)
    }

    /// Replaces the colors of `name`, or appends a new variant.
    fn upsert(&mut self, name: &str, colors: Vec<String>) {
        match self.get_mut(name) {
            Some(variant) => variant.colors = colors,
            None => self.0.push(Variant::new(name, colors)),
        }
    }
}

impl From<Vec<Variant>> for VariantSet {
    fn from(variants: Vec<Variant>) -> Self {
        Self(variants)
    }
}

impl Serialize for VariantSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for variant in &self.0 {
            map.serialize_entry(&variant.name, &variant.colors)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for VariantSet {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        struct SetVisitor;

        impl<'de> Visitor<'de> for SetVisitor {
            type Value = VariantSet;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of variant names to color lists")
            }

            fn visit_map<A: MapAccess<'de>>(
                self,
                mut access: A,
            ) -> std::result::Result<Self::Value, A::Error> {
                let mut set = VariantSet::default();
                while let Some((name, colors)) = access.next_entry::<String, Vec<String>>()? {
                    set.upsert(&name, colors);
                }
                Ok(set)
            }
        }

        deserializer.deserialize_map(SetVisitor)
    }
}

#[cfg(feature = "jsonschema")]
impl schemars::JsonSchema for VariantSet {
    fn schema_name() -> String {
        "VariantSet".into()
    }

    fn json_schema(generator: &mut schemars::r#gen::SchemaGenerator) -> schemars::schema::Schema {
        <BTreeMap<String, Vec<String>> as schemars::JsonSchema>::json_schema(generator)
    }
}

/// Everything stored in the variants file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "jsonschema", derive(schemars::JsonSchema))]
#[serde(rename_all = "camelCase", default)]
pub struct VariantsData {
    /// `icon -> variants`.
    pub variants: BTreeMap<String, VariantSet>,

    /// `icon -> default variant name`.
    pub default_variants: BTreeMap<String, String>,

    /// `icon -> (original color -> replacement)`, lowercase.
    pub color_mappings: BTreeMap<String, BTreeMap<String, String>>,

    /// `icon -> animation preset`.
    pub animation_presets: BTreeMap<String, AnimationDescriptor>,
}

// ============================================================================
// VariantsService
// ============================================================================

/// Read-through cache over a [`VariantsStore`].
///
/// All mutations stay in memory and set the unsaved flag until
/// [`persist_to_file`](Self::persist_to_file). Indices passed to update and
/// delete operations address the visible list returned by
/// [`get_saved_variants`](Self::get_saved_variants), so hidden entries never
/// shift them.
pub struct VariantsService {
    store: Box<dyn VariantsStore>,
    cache: Option<VariantsData>,
    dirty: bool,
}

impl fmt::Debug for VariantsService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VariantsService")
            .field("loaded", &self.cache.is_some())
            .field("dirty", &self.dirty)
            .finish()
    }
}

impl VariantsService {
    pub fn new(store: Box<dyn VariantsStore>) -> Self {
        Self {
            store,
            cache: None,
            dirty: false,
        }
    }

    fn data(&mut self) -> &mut VariantsData {
        let store = &self.store;
        self.cache.get_or_insert_with(|| match store.load() {
            Ok(Some(contents)) => file::parse(&contents),
            Ok(None) => VariantsData::default(),
            Err(e) => {
                log::warn!("cannot load variants, starting empty: {e}");
                VariantsData::default()
            }
        })
    }

    fn changed(&mut self) {
        self.dirty = true;
    }

    /// User-visible variants of `icon`.
    pub fn get_saved_variants(&mut self, icon: &str) -> Vec<Variant> {
        self.get_all_variants(icon)
            .into_iter()
            .filter(|v| !v.is_internal())
            .collect()
    }

    /// All variants of `icon`, internal ones included.
    pub fn get_all_variants(&mut self, icon: &str) -> Vec<Variant> {
        self.data()
            .variants
            .get(icon)
            .map(|set| set.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Saves `colors` under `name`, replacing a variant of the same name.
    pub fn save_variant(&mut self, icon: &str, name: &str, colors: Vec<String>) {
        self.data()
            .variants
            .entry(icon.to_string())
            .or_default()
            .upsert(name, colors);
        self.changed();
    }

    /// Renames and recolors the `index`th visible variant.
    ///
    /// A default variant pointing at the old name follows the rename.
    /// Returns false if there is no such variant.
    pub fn update_variant(
        &mut self,
        icon: &str,
        index: usize,
        name: &str,
        colors: Vec<String>,
    ) -> bool {
        let data = self.data();
        let Some(set) = data.variants.get_mut(icon) else {
            return false;
        };
        let Some(position) = set.visible_position(index) else {
            return false;
        };

        let old_name = std::mem::replace(&mut set.0[position].name, name.to_string());
        set.0[position].colors = colors;
        if old_name != name {
            // Drop any other entry that already used the new name.
            let mut current = 0;
            set.0.retain(|v| {
                let keep = current == position || v.name != name;
                current += 1;
                keep
            });
            if let Some(default) = data.default_variants.get_mut(icon) {
                if *default == old_name {
                    *default = name.to_string();
                }
            }
        }
        self.changed();
        true
    }

    /// Replaces the colors of the `index`th visible variant.
    pub fn update_variant_colors(&mut self, icon: &str, index: usize, colors: Vec<String>) -> bool {
        let Some(set) = self.data().variants.get_mut(icon) else {
            return false;
        };
        let Some(position) = set.visible_position(index) else {
            return false;
        };
        set.0[position].colors = colors;
        self.changed();
        true
    }

    /// Deletes the `index`th visible variant.
    ///
    /// Internal entries are kept; the icon record is dropped once empty. A
    /// default variant pointing at the deleted name is cleared.
    pub fn delete_variant(&mut self, icon: &str, index: usize) -> bool {
        let data = self.data();
        let Some(set) = data.variants.get_mut(icon) else {
            return false;
        };
        let Some(position) = set.visible_position(index) else {
            return false;
        };

        let removed = set.0.remove(position);
        if set.is_empty() {
            data.variants.remove(icon);
        }
        if data.default_variants.get(icon) == Some(&removed.name) {
            data.default_variants.remove(icon);
        }
        self.changed();
        true
    }

    /// Bootstraps the `_original` and `custom` variants before an edit.
    ///
    /// An existing non-empty `_original` snapshot wins over `current_colors`.
    /// Without one, `current_colors` becomes the snapshot, unless it is empty
    /// (the colors cannot be determined and nothing is recorded). `custom` is
    /// seeded from the resolved original colors if it does not exist.
    ///
    /// Returns the resolved original colors.
    pub fn ensure_custom_variant(&mut self, icon: &str, current_colors: &[String]) -> Vec<String> {
        let snapshot = self
            .data()
            .variants
            .get(icon)
            .and_then(|set| set.get(ORIGINAL_VARIANT))
            .map(|v| v.colors.clone())
            .filter(|colors| !colors.is_empty());

        let original = match snapshot {
            Some(colors) => colors,
            None if current_colors.is_empty() => return Vec::new(),
            None => {
                self.save_variant(icon, ORIGINAL_VARIANT, current_colors.to_vec());
                current_colors.to_vec()
            }
        };

        let has_custom = self
            .data()
            .variants
            .get(icon)
            .is_some_and(|set| set.get(CUSTOM_VARIANT).is_some());
        if !has_custom {
            self.save_variant(icon, CUSTOM_VARIANT, original.clone());
        }
        original
    }

    /// Records that `original` is painted as `replacement` in `icon`.
    ///
    /// Both colors are stored lowercase; mapping a color to itself removes
    /// the entry.
    pub fn set_color_mapping(&mut self, icon: &str, original: &str, replacement: &str) {
        let original = original.trim().to_ascii_lowercase();
        let replacement = replacement.trim().to_ascii_lowercase();

        let mappings = &mut self.data().color_mappings;
        if original == replacement {
            if let Some(map) = mappings.get_mut(icon) {
                map.remove(&original);
                if map.is_empty() {
                    mappings.remove(icon);
                }
            }
        } else {
            mappings
                .entry(icon.to_string())
                .or_default()
                .insert(original, replacement);
        }
        self.changed();
    }

    pub fn get_color_mappings(&mut self, icon: &str) -> BTreeMap<String, String> {
        self.data()
            .color_mappings
            .get(icon)
            .cloned()
            .unwrap_or_default()
    }

    pub fn clear_color_mappings(&mut self, icon: &str) {
        if self.data().color_mappings.remove(icon).is_some() {
            self.changed();
        }
    }

    pub fn get_default_variant(&mut self, icon: &str) -> Option<String> {
        self.data().default_variants.get(icon).cloned()
    }

    /// Sets or clears the variant applied by default when building `icon`.
    pub fn set_default_variant(&mut self, icon: &str, name: Option<&str>) {
        let defaults = &mut self.data().default_variants;
        match name {
            Some(name) => defaults.insert(icon.to_string(), name.to_string()),
            None => defaults.remove(icon),
        };
        self.changed();
    }

    pub fn get_animation(&mut self, icon: &str) -> Option<AnimationDescriptor> {
        self.data().animation_presets.get(icon).cloned()
    }

    /// Sets or clears the animation preset of `icon`.
    pub fn set_animation(&mut self, icon: &str, animation: Option<AnimationDescriptor>) {
        let presets = &mut self.data().animation_presets;
        match animation {
            Some(animation) => presets.insert(icon.to_string(), animation),
            None => presets.remove(icon),
        };
        self.changed();
    }

    pub fn has_unsaved_changes(&self) -> bool {
        self.dirty
    }

    /// Regenerates the variants file from the cache.
    pub fn persist_to_file(&mut self) -> Result<()> {
        let rendered = file::render(self.data())?;
        self.store.save(&rendered)?;
        self.dirty = false;
        log::info!("persisted variants ({} bytes)", rendered.len());
        Ok(())
    }

    /// Discards the cache, including unsaved changes.
    pub fn reset_cache(&mut self) {
        if self.dirty {
            log::debug!("discarding unsaved variant changes");
        }
        self.cache = None;
        self.dirty = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::AnimationSettings;

    fn colors(list: &[&str]) -> Vec<String> {
        list.iter().map(|c| c.to_string()).collect()
    }

    fn service() -> (VariantsService, MemoryStore) {
        let store = MemoryStore::new();
        (VariantsService::new(Box::new(store.clone())), store)
    }

    fn names(variants: &[Variant]) -> Vec<&str> {
        variants.iter().map(|v| v.name.as_str()).collect()
    }

    #[test]
    fn hidden_variants_are_not_listed() {
        let (mut service, _) = service();
        service.save_variant("home", "_original", colors(&["#ff0000"]));
        service.save_variant("home", "Night", colors(&["#220000"]));

        assert_eq!(names(&service.get_saved_variants("home")), vec!["Night"]);
        assert_eq!(names(&service.get_all_variants("home")), vec!["_original", "Night"]);
    }

    #[test]
    fn indices_address_visible_variants() {
        let (mut service, _) = service();
        service.save_variant("home", "A", colors(&["#111111"]));
        service.save_variant("home", "_hidden", colors(&["#222222"]));
        service.save_variant("home", "B", colors(&["#333333"]));

        assert!(service.update_variant_colors("home", 1, colors(&["#444444"])));
        let all = service.get_all_variants("home");
        assert_eq!(all[2].colors, colors(&["#444444"]));
        assert_eq!(all[1].colors, colors(&["#222222"]));

        assert!(service.delete_variant("home", 0));
        assert_eq!(names(&service.get_saved_variants("home")), vec!["B"]);
        assert!(!service.delete_variant("home", 1));
    }

    #[test]
    fn delete_keeps_internal_entries() {
        let (mut service, _) = service();
        service.save_variant("home", "_original", colors(&["#ff0000"]));
        service.save_variant("home", "Night", colors(&["#220000"]));
        service.set_default_variant("home", Some("Night"));

        assert!(service.delete_variant("home", 0));
        assert_eq!(names(&service.get_all_variants("home")), vec!["_original"]);
        assert_eq!(service.get_default_variant("home"), None);
    }

    #[test]
    fn delete_last_variant_drops_record() {
        let (mut service, store) = service();
        service.save_variant("home", "Night", colors(&["#220000"]));
        assert!(service.delete_variant("home", 0));
        service.persist_to_file().unwrap();
        assert!(!store.contents().unwrap().contains("\"home\""));
    }

    #[test]
    fn rename_moves_default() {
        let (mut service, _) = service();
        service.save_variant("home", "Night", colors(&["#220000"]));
        service.set_default_variant("home", Some("Night"));
        assert!(service.update_variant("home", 0, "Midnight", colors(&["#110000"])));
        assert_eq!(service.get_default_variant("home").as_deref(), Some("Midnight"));
        assert_eq!(service.get_saved_variants("home")[0].colors, colors(&["#110000"]));
    }

    #[test]
    fn custom_variant_bootstrap() {
        let (mut service, _) = service();
        let original = service.ensure_custom_variant("home", &colors(&["#ff0000"]));
        assert_eq!(original, colors(&["#ff0000"]));
        assert_eq!(names(&service.get_all_variants("home")), vec!["_original", "custom"]);

        // The first snapshot wins over later edits.
        let again = service.ensure_custom_variant("home", &colors(&["#00ff00"]));
        assert_eq!(again, colors(&["#ff0000"]));
        assert_eq!(service.get_all_variants("home").len(), 2);
    }

    #[test]
    fn custom_variant_without_colors_records_nothing() {
        let (mut service, _) = service();
        assert!(service.ensure_custom_variant("home", &[]).is_empty());
        assert!(service.get_all_variants("home").is_empty());
        assert!(!service.has_unsaved_changes());
    }

    #[test]
    fn identity_mapping_is_removed() {
        let (mut service, _) = service();
        service.set_color_mapping("home", "#FF0000", "#00ff00");
        assert_eq!(service.get_color_mappings("home")["#ff0000"], "#00ff00");

        service.set_color_mapping("home", "#ff0000", "#FF0000");
        assert!(service.get_color_mappings("home").is_empty());
    }

    #[test]
    fn persist_and_reload() {
        let (mut service, store) = service();
        service.save_variant("home", "Night", colors(&["#220000"]));
        service.set_color_mapping("home", "#ff0000", "#00ff00");
        service.set_animation(
            "home",
            Some(AnimationDescriptor::new("pulse", AnimationSettings::new(0.5))),
        );
        service.persist_to_file().unwrap();
        assert!(!service.has_unsaved_changes());

        let mut reloaded = VariantsService::new(Box::new(store));
        assert_eq!(names(&reloaded.get_saved_variants("home")), vec!["Night"]);
        assert_eq!(reloaded.get_animation("home").unwrap().kind, "pulse");
        assert_eq!(reloaded.get_color_mappings("home").len(), 1);
    }

    #[test]
    fn reset_discards_unsaved_changes() {
        let (mut service, _) = service();
        service.save_variant("home", "Night", colors(&["#220000"]));
        service.reset_cache();
        assert!(!service.has_unsaved_changes());
        assert!(service.get_saved_variants("home").is_empty());
    }

    #[test]
    fn unreadable_store_starts_empty() {
        let store = MemoryStore::with_contents("export const Variants = {");
        let mut service = VariantsService::new(Box::new(store));
        assert!(service.get_all_variants("home").is_empty());
    }
}
