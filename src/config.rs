//! Workspace configuration.
//!
//! Stored as camelCase JSON, usually in `icon-manager.json` at the workspace
//! root. Every field is optional:
//!
//! ```json
//! {
//!   "outputDir": "src/icons",
//!   "buildFormat": "sprite",
//!   "defaultAnimation": { "duration": 2.0, "timing": "linear" },
//!   "autoPersist": true
//! }
//! ```

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::animation::AnimationSettings;
use crate::error::{Error, Result};

/// Default configuration file name.
pub const CONFIG_FILE: &str = "icon-manager.json";

/// Which artifact a build produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "jsonschema", derive(schemars::JsonSchema))]
#[serde(rename_all = "kebab-case")]
pub enum BuildFormat {
    /// An ES module exporting every icon.
    #[default]
    IconsJs,
    /// A `<symbol>` sprite sheet.
    Sprite,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "jsonschema", derive(schemars::JsonSchema))]
#[serde(rename_all = "camelCase", default)]
pub struct IconManagerConfig {
    /// Directory receiving the build artifacts, relative to the workspace.
    pub output_dir: PathBuf,

    /// File name of the ES module.
    pub icons_file: String,

    /// File name of the sprite sheet.
    pub sprite_file: String,

    /// File name of the generated variants module.
    pub variants_file: String,

    pub build_format: BuildFormat,

    /// Settings used when an animation is embedded without explicit ones.
    pub default_animation: AnimationSettings,

    /// Persist pending variant changes when switching icons.
    pub auto_persist: bool,
}

impl Default for IconManagerConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("icons"),
            icons_file: "icons.js".into(),
            sprite_file: "sprite.svg".into(),
            variants_file: "variants.js".into(),
            build_format: BuildFormat::default(),
            default_animation: AnimationSettings::default(),
            auto_persist: true,
        }
    }
}

impl IconManagerConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Loads a configuration file. A missing file yields the defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        match fs::read_to_string(path) {
            Ok(json) => Self::from_json(&json),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                log::debug!("no config at '{}', using defaults", path.display());
                Ok(Self::default())
            }
            Err(e) => Err(Error::io(path, e)),
        }
    }

    /// Path of the ES module below `workspace`.
    pub fn icons_path(&self, workspace: &Path) -> PathBuf {
        workspace.join(&self.output_dir).join(&self.icons_file)
    }

    /// Path of the sprite sheet below `workspace`.
    pub fn sprite_path(&self, workspace: &Path) -> PathBuf {
        workspace.join(&self.output_dir).join(&self.sprite_file)
    }

    /// Path of the variants module below `workspace`.
    pub fn variants_path(&self, workspace: &Path) -> PathBuf {
        workspace.join(&self.output_dir).join(&self.variants_file)
    }

    /// Path of the artifact selected by [`build_format`](Self::build_format).
    pub fn output_path(&self, workspace: &Path) -> PathBuf {
        match self.build_format {
            BuildFormat::IconsJs => self.icons_path(workspace),
            BuildFormat::Sprite => self.sprite_path(workspace),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_fills_defaults() {
        let config = IconManagerConfig::from_json(
            r#"{ "buildFormat": "sprite", "defaultAnimation": { "duration": 2.0 } }"#,
        )
        .unwrap();
        assert_eq!(config.build_format, BuildFormat::Sprite);
        assert_eq!(config.default_animation.duration, 2.0);
        assert_eq!(config.default_animation.timing, "ease");
        assert_eq!(config.icons_file, "icons.js");
        assert!(config.auto_persist);
    }

    #[test]
    fn json_roundtrip() {
        let config = IconManagerConfig {
            build_format: BuildFormat::Sprite,
            auto_persist: false,
            ..IconManagerConfig::default()
        };
        let json = config.to_json_pretty().unwrap();
        assert!(json.contains("\"buildFormat\": \"sprite\""));
        assert_eq!(IconManagerConfig::from_json(&json).unwrap(), config);
    }

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = IconManagerConfig::load(dir.path().join(CONFIG_FILE)).unwrap();
        assert_eq!(config, IconManagerConfig::default());
    }

    #[test]
    fn invalid_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        fs::write(&path, "{ nope").unwrap();
        assert!(matches!(IconManagerConfig::load(&path), Err(Error::Json(_))));
    }

    #[test]
    fn output_paths() {
        let config = IconManagerConfig::default();
        let workspace = Path::new("/work");
        assert_eq!(config.output_path(workspace), Path::new("/work/icons/icons.js"));
        assert_eq!(
            config.variants_path(workspace),
            Path::new("/work/icons/variants.js")
        );

        let sprite = IconManagerConfig {
            build_format: BuildFormat::Sprite,
            ..config
        };
        assert_eq!(sprite.output_path(workspace), Path::new("/work/icons/sprite.svg"));
    }
}
