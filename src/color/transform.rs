//! RGB transforms, auto variants, and filter estimation.

use palette::{Hsl, IntoColor, Srgb};
use serde::{Deserialize, Serialize};

use super::CURRENT_COLOR;

// ============================================================================
// Parsing
// ============================================================================

/// Parses `#rgb`, `#rrggbb`, `#rrggbbaa` (alpha ignored), `rgb(r, g, b)`, or
/// a CSS color keyword into 8-bit channels.
pub fn to_rgb(color: &str) -> Option<[u8; 3]> {
    let color = color.trim();

    if let Some(hex) = color.strip_prefix('#') {
        let hex = match hex.len() {
            3 => expand_short_hex(hex)?,
            6 => hex.to_string(),
            8 => hex.get(..6)?.to_string(),
            _ => return None,
        };
        let byte = |index: usize| u8::from_str_radix(hex.get(index..index + 2)?, 16).ok();
        return Some([byte(0)?, byte(2)?, byte(4)?]);
    }

    let lower = color.to_ascii_lowercase();
    if let Some(args) = lower
        .strip_prefix("rgb(")
        .or_else(|| lower.strip_prefix("rgba("))
        .and_then(|rest| rest.strip_suffix(')'))
    {
        let mut channels = args.split([',', ' ']).filter(|part| !part.is_empty());
        let mut next = || -> Option<u8> {
            let value = channels.next()?.trim().parse::<f32>().ok()?;
            Some(value.round().clamp(0.0, 255.0) as u8)
        };
        return Some([next()?, next()?, next()?]);
    }

    palette::named::from_str(&lower).map(|rgb| [rgb.red, rgb.green, rgb.blue])
}

/// Expands the three hex digits of a short color to six.
pub(crate) fn expand_short_hex(hex: &str) -> Option<String> {
    if hex.len() != 3 || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    Some(hex.chars().flat_map(|c| [c, c]).collect())
}

/// Normalizes a color for comparison.
///
/// Hex is lowercased with short forms expanded; `#rrggbbaa` keeps its alpha.
/// Keywords and `rgb()` become `#rrggbb`. Anything else (`rgba()`, `hsl()`,
/// `currentColor`) is only lowercased.
pub fn normalize_color(color: &str) -> String {
    let lower = color.trim().to_ascii_lowercase();
    if let Some(hex) = lower.strip_prefix('#') {
        return match expand_short_hex(hex) {
            Some(expanded) => format!("#{expanded}"),
            None => lower,
        };
    }
    if lower.starts_with("rgba(") {
        return lower;
    }
    to_rgb(&lower).map(hex).unwrap_or(lower)
}

/// Converts any parseable color to lowercase `#rrggbb`, or `#000000`.
pub fn to_hex_color(color: &str) -> String {
    to_rgb(color).map(hex).unwrap_or_else(|| "#000000".into())
}

fn hex([r, g, b]: [u8; 3]) -> String {
    format!("#{r:02x}{g:02x}{b:02x}")
}

fn channel(value: f64) -> u8 {
    value.round().clamp(0.0, 255.0) as u8
}

/// Applies `f` to each channel, passing `currentColor` through untouched.
fn map_channels(color: &str, f: impl Fn(f64) -> f64) -> String {
    if color.eq_ignore_ascii_case(CURRENT_COLOR) {
        return CURRENT_COLOR.to_string();
    }
    let [r, g, b] = to_rgb(color).unwrap_or([0, 0, 0]);
    hex([
        channel(f(r as f64)),
        channel(f(g as f64)),
        channel(f(b as f64)),
    ])
}

// ============================================================================
// Transforms
// ============================================================================

pub fn invert_color(color: &str) -> String {
    map_channels(color, |c| 255.0 - c)
}

/// Moves each channel toward 0 by `ratio`.
pub fn darken_color(color: &str, ratio: f64) -> String {
    map_channels(color, |c| c * (1.0 - ratio))
}

/// Moves each channel toward 255 by `ratio`.
pub fn lighten_color(color: &str, ratio: f64) -> String {
    map_channels(color, |c| c + (255.0 - c) * ratio)
}

/// Moves each channel toward the color's luma by `ratio`; `1.0` is grayscale.
pub fn desaturate_color(color: &str, ratio: f64) -> String {
    if color.eq_ignore_ascii_case(CURRENT_COLOR) {
        return CURRENT_COLOR.to_string();
    }
    let [r, g, b] = to_rgb(color).unwrap_or([0, 0, 0]);
    let gray = 0.299 * r as f64 + 0.587 * g as f64 + 0.114 * b as f64;
    map_channels(color, |c| c + (gray - c) * ratio)
}

// ============================================================================
// Auto Variants
// ============================================================================

/// Kinds of automatically generated palette variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "jsonschema", derive(schemars::JsonSchema))]
#[serde(rename_all = "lowercase")]
pub enum AutoVariantKind {
    Invert,
    Darken,
    Lighten,
    Muted,
    Grayscale,
}

impl AutoVariantKind {
    pub const ALL: [Self; 5] = [
        Self::Invert,
        Self::Darken,
        Self::Lighten,
        Self::Muted,
        Self::Grayscale,
    ];

    /// Display name of the generated variant.
    pub fn variant_name(self) -> &'static str {
        match self {
            Self::Invert => "Inverted",
            Self::Darken => "Dark",
            Self::Lighten => "Light",
            Self::Muted => "Muted",
            Self::Grayscale => "Grayscale",
        }
    }

    fn apply(self, color: &str) -> String {
        match self {
            Self::Invert => invert_color(color),
            Self::Darken => darken_color(color, 0.3),
            Self::Lighten => lighten_color(color, 0.3),
            Self::Muted => desaturate_color(color, 0.5),
            Self::Grayscale => desaturate_color(color, 1.0),
        }
    }
}

impl std::str::FromStr for AutoVariantKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "invert" | "inverted" => Ok(Self::Invert),
            "darken" | "dark" => Ok(Self::Darken),
            "lighten" | "light" => Ok(Self::Lighten),
            "muted" => Ok(Self::Muted),
            "grayscale" => Ok(Self::Grayscale),
            _ => Err(format!("unknown variant kind '{s}'")),
        }
    }
}

/// A generated palette.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "jsonschema", derive(schemars::JsonSchema))]
#[serde(rename_all = "camelCase")]
pub struct AutoVariant {
    pub colors: Vec<String>,
    pub variant_name: String,
}

/// Applies `kind` to every color.
pub fn generate_auto_variant_colors(colors: &[String], kind: AutoVariantKind) -> AutoVariant {
    AutoVariant {
        colors: colors.iter().map(|color| kind.apply(color)).collect(),
        variant_name: kind.variant_name().to_string(),
    }
}

// ============================================================================
// Filter Estimation
// ============================================================================

/// Approximate CSS filter parameters turning one color into another.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "jsonschema", derive(schemars::JsonSchema))]
#[serde(rename_all = "camelCase")]
pub struct FilterEstimate {
    /// Hue rotation in degrees, in `[-180, 180]`.
    pub hue: f64,
    /// Saturation in percent.
    pub saturation: f64,
    /// Brightness in percent.
    pub brightness: f64,
}

impl Default for FilterEstimate {
    fn default() -> Self {
        Self {
            hue: 0.0,
            saturation: 100.0,
            brightness: 100.0,
        }
    }
}

impl FilterEstimate {
    /// Renders the estimate as a CSS filter chain.
    pub fn to_css(&self) -> String {
        format!(
            "hue-rotate({}deg) saturate({}%) brightness({}%)",
            self.hue.round(),
            self.saturation.round(),
            self.brightness.round()
        )
    }

    pub fn is_identity(&self) -> bool {
        *self == Self::default()
    }
}

/// Estimates `hue-rotate`/`saturate`/`brightness` values that move `source`
/// toward `target`.
///
/// Hue is the shortest signed angle between the two hues. Saturation and
/// brightness are target/source ratios of HSL saturation and lightness, 100%
/// when the source component is zero, clamped to `[0, 250]`. CSS filters do
/// not compose this way, so the result is only an approximation. Unparseable
/// colors give the identity estimate.
pub fn estimate_filters_for_color(source: &str, target: &str) -> FilterEstimate {
    let (Some(source), Some(target)) = (to_rgb(source), to_rgb(target)) else {
        return FilterEstimate::default();
    };
    let source = to_hsl(source);
    let target = to_hsl(target);

    let mut hue = (target.hue.into_positive_degrees() - source.hue.into_positive_degrees()) as f64;
    if hue > 180.0 {
        hue -= 360.0;
    } else if hue < -180.0 {
        hue += 360.0;
    }

    FilterEstimate {
        hue: round2(hue),
        saturation: round2(ratio(target.saturation, source.saturation)),
        brightness: round2(ratio(target.lightness, source.lightness)),
    }
}

fn to_hsl([r, g, b]: [u8; 3]) -> Hsl {
    let rgb = Srgb::new(r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0);
    rgb.into_color()
}

fn ratio(target: f32, source: f32) -> f64 {
    if source <= f32::EPSILON {
        return 100.0;
    }
    (target as f64 / source as f64 * 100.0).clamp(0.0, 250.0)
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_color_forms() {
        assert_eq!(to_rgb("#f00"), Some([255, 0, 0]));
        assert_eq!(to_rgb("#3366FF"), Some([0x33, 0x66, 0xff]));
        assert_eq!(to_rgb("#3366ff80"), Some([0x33, 0x66, 0xff]));
        assert_eq!(to_rgb("rgb(10, 20, 30)"), Some([10, 20, 30]));
        assert_eq!(to_rgb("white"), Some([255, 255, 255]));
        assert_eq!(to_rgb("#12"), None);
        assert_eq!(to_rgb("nonsense"), None);
    }

    #[test]
    fn normalizes_to_hex_where_possible() {
        assert_eq!(normalize_color("#ABC"), "#aabbcc");
        assert_eq!(normalize_color(" Black "), "#000000");
        assert_eq!(normalize_color("rgb(255, 0, 0)"), "#ff0000");
        assert_eq!(normalize_color("#3366FF80"), "#3366ff80");
        assert_eq!(normalize_color("rgba(0, 0, 0, 0.5)"), "rgba(0, 0, 0, 0.5)");
        assert_eq!(normalize_color("currentColor"), "currentcolor");
    }

    #[test]
    fn hex_fallback_is_black() {
        assert_eq!(to_hex_color("#ABC"), "#aabbcc");
        assert_eq!(to_hex_color("not a color"), "#000000");
    }

    #[test]
    fn channel_transforms() {
        assert_eq!(invert_color("#ff0000"), "#00ffff");
        assert_eq!(darken_color("#646464", 0.3), "#464646");
        assert_eq!(lighten_color("#9b9b9b", 0.3), "#b9b9b9");
        assert_eq!(desaturate_color("#ff0000", 1.0), "#4c4c4c");
    }

    #[test]
    fn current_color_passes_through() {
        for kind in AutoVariantKind::ALL {
            let variant = generate_auto_variant_colors(&["currentColor".into()], kind);
            assert_eq!(variant.colors, vec!["currentColor"]);
        }
    }

    #[test]
    fn grayscale_scenario() {
        let colors = vec!["#ff0000".to_string(), "#00ff00".to_string()];
        let variant = generate_auto_variant_colors(&colors, AutoVariantKind::Grayscale);
        assert_eq!(variant.variant_name, "Grayscale");
        for color in &variant.colors {
            let [r, g, b] = to_rgb(color).unwrap();
            assert!(r.abs_diff(g) <= 1 && g.abs_diff(b) <= 1, "{color} is not gray");
        }
    }

    #[test]
    fn kind_parsing() {
        assert_eq!("muted".parse::<AutoVariantKind>(), Ok(AutoVariantKind::Muted));
        assert_eq!("Inverted".parse::<AutoVariantKind>(), Ok(AutoVariantKind::Invert));
        assert!("sepia".parse::<AutoVariantKind>().is_err());
    }

    #[test]
    fn identity_filter() {
        let estimate = estimate_filters_for_color("#ff0000", "#ff0000");
        assert_eq!(estimate, FilterEstimate::default());
        assert!(estimate.is_identity());
    }

    #[test]
    fn hue_delta_takes_shortest_path() {
        let estimate = estimate_filters_for_color("#ff0000", "#ff00ff");
        assert!((estimate.hue + 60.0).abs() < 0.5, "{estimate:?}");

        let estimate = estimate_filters_for_color("#ff0000", "#00ff00");
        assert!((estimate.hue - 120.0).abs() < 0.5, "{estimate:?}");
    }

    #[test]
    fn ratios_are_guarded_and_clamped() {
        let estimate = estimate_filters_for_color("#000000", "#ffffff");
        assert_eq!(estimate.brightness, 100.0);

        let estimate = estimate_filters_for_color("#1a0000", "#ff8080");
        assert_eq!(estimate.brightness, 250.0);
    }

    #[test]
    fn unparseable_is_neutral() {
        assert_eq!(
            estimate_filters_for_color("bogus", "#ffffff"),
            FilterEstimate::default()
        );
    }

    #[test]
    fn filter_css() {
        let estimate = FilterEstimate {
            hue: -59.6,
            saturation: 80.0,
            brightness: 120.4,
        };
        assert_eq!(estimate.to_css(), "hue-rotate(-60deg) saturate(80%) brightness(120%)");
    }
}
