//! Enhancement settings, presets and slider ranges.
//!
//! [`Settings`] is a plain value: the transforms read it and never clamp
//! it. Callers that accept user input (the CLI, the HTTP API) use
//! [`Settings::clamped_to_ranges()`] to keep values inside the same bounds
//! the sliders offer.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::RangeInclusive;
use std::str::FromStr;
use thiserror::Error;

/// The six user-facing adjustments.
///
/// Each adjustment knows its default value and its suggested range.
///
/// ```
/// use photo_tone::Adjustment;
///
/// assert_eq!(Adjustment::Clarity.default_value(), 28.0);
/// assert_eq!(Adjustment::Fade.range(), 0.0..=40.0);
/// assert_eq!("warmth".parse::<Adjustment>().unwrap(), Adjustment::Warmth);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Adjustment {
    Brightness,
    Contrast,
    Saturation,
    Warmth,
    Clarity,
    Fade,
}

impl Adjustment {
    /// All adjustments in display order.
    pub const ALL: [Adjustment; 6] = [
        Adjustment::Brightness,
        Adjustment::Contrast,
        Adjustment::Saturation,
        Adjustment::Warmth,
        Adjustment::Clarity,
        Adjustment::Fade,
    ];

    /// Lowercase name, as used in config files and query strings.
    pub fn name(self) -> &'static str {
        match self {
            Adjustment::Brightness => "brightness",
            Adjustment::Contrast => "contrast",
            Adjustment::Saturation => "saturation",
            Adjustment::Warmth => "warmth",
            Adjustment::Clarity => "clarity",
            Adjustment::Fade => "fade",
        }
    }

    /// Suggested slider range.
    pub fn range(self) -> RangeInclusive<f64> {
        match self {
            Adjustment::Brightness => -40.0..=60.0,
            Adjustment::Contrast => -30.0..=60.0,
            Adjustment::Saturation => -20.0..=50.0,
            Adjustment::Warmth => -15.0..=25.0,
            Adjustment::Clarity => 0.0..=60.0,
            Adjustment::Fade => 0.0..=40.0,
        }
    }

    /// Default slider position.
    pub fn default_value(self) -> f64 {
        Settings::DEFAULT.get(self)
    }
}

impl fmt::Display for Adjustment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error for unknown adjustment or preset names.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {kind} '{name}'")]
pub struct UnknownName {
    kind: &'static str,
    name: String,
}

impl FromStr for Adjustment {
    type Err = UnknownName;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Adjustment::ALL
            .into_iter()
            .find(|a| a.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownName {
                kind: "adjustment",
                name: s.to_string(),
            })
    }
}

/// Slider values driving the enhancement pipeline.
///
/// All fields are percentages in the application's slider units. When
/// deserializing, missing fields take their [`Default`] values, so a config
/// block may name only the adjustments it changes.
///
/// # Example
///
/// ```
/// use photo_tone::Settings;
///
/// let settings = Settings::neutral().warmth(10.0).clarity(20.0);
/// assert_eq!(settings.warmth, 10.0);
/// assert_eq!(settings.brightness, 0.0);
///
/// let defaults = Settings::default();
/// assert_eq!(defaults.brightness, 12.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Exposure offset; 100 adds a full 255 to each channel.
    pub brightness: f64,
    /// Contrast around mid-grey; capped internally at 98.
    pub contrast: f64,
    /// Chroma scale around luma; 0 = unchanged, -100 = greyscale.
    pub saturation: f64,
    /// Red/blue balance shift; positive is warmer.
    pub warmth: f64,
    /// Local contrast (sharpening) strength; 0 disables the convolution.
    pub clarity: f64,
    /// Blend toward white; negative values act as 0.
    pub fade: f64,
}

impl Settings {
    /// The application's default slider positions.
    pub const DEFAULT: Settings = Settings {
        brightness: 12.0,
        contrast: 18.0,
        saturation: 16.0,
        warmth: 6.0,
        clarity: 28.0,
        fade: 6.0,
    };

    /// The "auto-enhance" preset.
    pub const AUTO_ENHANCE: Settings = Settings {
        brightness: 18.0,
        contrast: 24.0,
        saturation: 20.0,
        warmth: 8.0,
        clarity: 36.0,
        fade: 4.0,
    };

    /// All adjustments at zero: the pipeline becomes the identity.
    pub const NEUTRAL: Settings = Settings {
        brightness: 0.0,
        contrast: 0.0,
        saturation: 0.0,
        warmth: 0.0,
        clarity: 0.0,
        fade: 0.0,
    };

    /// Auto-enhance preset values.
    #[inline]
    pub fn auto_enhance() -> Self {
        Self::AUTO_ENHANCE
    }

    /// Identity settings.
    #[inline]
    pub fn neutral() -> Self {
        Self::NEUTRAL
    }

    /// Read one adjustment.
    pub fn get(&self, adjustment: Adjustment) -> f64 {
        match adjustment {
            Adjustment::Brightness => self.brightness,
            Adjustment::Contrast => self.contrast,
            Adjustment::Saturation => self.saturation,
            Adjustment::Warmth => self.warmth,
            Adjustment::Clarity => self.clarity,
            Adjustment::Fade => self.fade,
        }
    }

    /// Return a copy with one adjustment replaced.
    pub fn with(mut self, adjustment: Adjustment, value: f64) -> Self {
        let slot = match adjustment {
            Adjustment::Brightness => &mut self.brightness,
            Adjustment::Contrast => &mut self.contrast,
            Adjustment::Saturation => &mut self.saturation,
            Adjustment::Warmth => &mut self.warmth,
            Adjustment::Clarity => &mut self.clarity,
            Adjustment::Fade => &mut self.fade,
        };
        *slot = value;
        self
    }

    /// Set brightness.
    #[inline]
    pub fn brightness(self, value: f64) -> Self {
        self.with(Adjustment::Brightness, value)
    }

    /// Set contrast.
    #[inline]
    pub fn contrast(self, value: f64) -> Self {
        self.with(Adjustment::Contrast, value)
    }

    /// Set saturation.
    #[inline]
    pub fn saturation(self, value: f64) -> Self {
        self.with(Adjustment::Saturation, value)
    }

    /// Set warmth.
    #[inline]
    pub fn warmth(self, value: f64) -> Self {
        self.with(Adjustment::Warmth, value)
    }

    /// Set clarity.
    #[inline]
    pub fn clarity(self, value: f64) -> Self {
        self.with(Adjustment::Clarity, value)
    }

    /// Set fade.
    #[inline]
    pub fn fade(self, value: f64) -> Self {
        self.with(Adjustment::Fade, value)
    }

    /// Adjustments whose value lies outside the suggested range.
    ///
    /// NaN counts as out of range.
    pub fn out_of_range(&self) -> Vec<Adjustment> {
        Adjustment::ALL
            .into_iter()
            .filter(|&a| !a.range().contains(&self.get(a)))
            .collect()
    }

    /// Clamp every adjustment into its suggested range.
    ///
    /// NaN is replaced by the adjustment's default.
    ///
    /// ```
    /// use photo_tone::Settings;
    ///
    /// let wild = Settings::neutral().contrast(500.0).fade(-3.0);
    /// let tame = wild.clamped_to_ranges();
    /// assert_eq!(tame.contrast, 60.0);
    /// assert_eq!(tame.fade, 0.0);
    /// ```
    pub fn clamped_to_ranges(&self) -> Self {
        Adjustment::ALL.into_iter().fold(*self, |acc, a| {
            let value = acc.get(a);
            let range = a.range();
            let clamped = if value.is_nan() {
                a.default_value()
            } else {
                value.clamp(*range.start(), *range.end())
            };
            acc.with(a, clamped)
        })
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Named starting points for the sliders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Preset {
    /// [`Settings::DEFAULT`]
    #[default]
    Default,
    /// [`Settings::AUTO_ENHANCE`]
    #[serde(alias = "auto-enhance")]
    Auto,
    /// [`Settings::NEUTRAL`]
    Neutral,
}

impl Preset {
    /// All presets in display order.
    pub const ALL: [Preset; 3] = [Preset::Default, Preset::Auto, Preset::Neutral];

    /// The settings this preset stands for.
    pub fn settings(self) -> Settings {
        match self {
            Preset::Default => Settings::DEFAULT,
            Preset::Auto => Settings::AUTO_ENHANCE,
            Preset::Neutral => Settings::NEUTRAL,
        }
    }

    /// Lowercase name.
    pub fn name(self) -> &'static str {
        match self {
            Preset::Default => "default",
            Preset::Auto => "auto",
            Preset::Neutral => "neutral",
        }
    }
}

impl fmt::Display for Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Preset {
    type Err = UnknownName;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "default" => Ok(Preset::Default),
            "auto" | "auto-enhance" => Ok(Preset::Auto),
            "neutral" | "none" => Ok(Preset::Neutral),
            _ => Err(UnknownName {
                kind: "preset",
                name: s.to_string(),
            }),
        }
    }
}
