//! icon-manager: SVG icon animation, cleanup, and color variants
//!
//! This crate embeds CSS animations into icons, removes them again, detects
//! what an icon already carries, and manages per-icon color palettes that
//! are persisted in a generated `variants.js` module.
//!
//! # Example
//!
//! ```
//! use icon_manager::{AnimationSettings, ColorService, SvgManipulator};
//!
//! let manipulator = SvgManipulator::new();
//! let svg = r##"<svg viewBox="0 0 24 24"><path fill="#ff0000" d="M2 2h20v20H2z"/></svg>"##;
//!
//! // Embed, detect, and remove an animation
//! let animated = manipulator.embed_animation_in_svg(svg, "spin", &AnimationSettings::new(2.0));
//! let detected = manipulator.detect_animation_from_svg(&animated).unwrap();
//! assert_eq!(detected.kind, "spin");
//! assert!(!manipulator.clean_animation_from_svg(&animated).contains("@keyframes"));
//!
//! // Recolor
//! let colors = ColorService::new();
//! assert_eq!(colors.extract_colors_from_svg(svg).colors, vec!["#ff0000"]);
//! let recolored = colors.replace_color_in_svg(svg, "#f00", "#00ff00");
//! assert!(recolored.contains("#00ff00"));
//! ```
//!
//! # Sessions
//!
//! Editing state lives in an [`IconSession`], which owns one instance of
//! every service and exchanges [`IconProfile`] snapshots through the
//! [`Configurable`] trait.

pub mod animation;
pub mod color;
mod config;
mod error;
mod manipulation;
mod output;
mod preview;
mod session;
pub mod svg;
pub mod variants;

pub use animation::{
    ANIMATION_NAMES, AnimationDescriptor, AnimationSettings, detect_from_content,
    detect_native_animation,
};
pub use color::{
    AutoVariant, AutoVariantKind, ColorService, ColorSet, FilterEstimate, normalize_color,
    to_hex_color,
};
pub use config::{BuildFormat, CONFIG_FILE, IconManagerConfig};
pub use error::{Error, Result};
pub use manipulation::SvgManipulator;
pub use output::{DEFAULT_VIEW_BOX, IconEntry, build_icons_module, build_sprite, to_identifier};
pub use preview::{render_preview, render_preview_png};
pub use session::{Configurable, IconProfile, IconSession};
pub use svg::SvgDocument;
pub use variants::{
    FileStore, MemoryStore, Variant, VariantSet, VariantsData, VariantsService, VariantsStore,
};
