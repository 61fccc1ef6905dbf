//! Color values and channel-space mixing
//!
//! Colors are stored as normalized RGBA with a validity flag. Malformed
//! input produces an invalid color instead of a panic, so animation
//! pipelines keep running on bad data.

use crate::husl;
use thiserror::Error;

/// Channel space used when mixing two colors.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ColorModel {
    /// Straight per-channel mix in sRGB.
    #[default]
    Rgb,
    /// Cylindrical HSL mix with shortest-arc hue travel.
    Hsl,
    /// Perceptual HSLuv mix with shortest-arc hue travel.
    Husl,
}

/// Parse failure for a color string.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ColorError {
    #[error("unrecognized color `{0}`")]
    Unrecognized(String),
    #[error("malformed component `{component}` in `{input}`")]
    MalformedComponent { input: String, component: String },
}

/// RGBA color with normalized f64 components (0.0 to 1.0).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    pub r: f64,
    pub g: f64,
    pub b: f64,
    pub a: f64,
    valid: bool,
}

impl Color {
    pub const WHITE: Color = Color::raw(1.0, 1.0, 1.0, 1.0);
    pub const BLACK: Color = Color::raw(0.0, 0.0, 0.0, 1.0);
    pub const RED: Color = Color::raw(1.0, 0.0, 0.0, 1.0);
    pub const BLUE: Color = Color::raw(0.0, 0.0, 1.0, 1.0);
    pub const TRANSPARENT: Color = Color::raw(0.0, 0.0, 0.0, 0.0);

    /// The sentinel returned for unusable input.
    pub const INVALID: Color = Color {
        r: 0.0,
        g: 0.0,
        b: 0.0,
        a: 0.0,
        valid: false,
    };

    const fn raw(r: f64, g: f64, b: f64, a: f64) -> Self {
        Self {
            r,
            g,
            b,
            a,
            valid: true,
        }
    }

    pub fn new(r: f64, g: f64, b: f64, a: f64) -> Self {
        Self::raw(
            r.clamp(0.0, 1.0),
            g.clamp(0.0, 1.0),
            b.clamp(0.0, 1.0),
            a.clamp(0.0, 1.0),
        )
    }

    pub fn rgb(r: f64, g: f64, b: f64) -> Self {
        Self::new(r, g, b, 1.0)
    }

    /// Create from u8 components (0-255).
    pub fn from_rgb8(r: u8, g: u8, b: u8) -> Self {
        Self::from_rgba8(r, g, b, 255)
    }

    pub fn from_rgba8(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self::raw(
            f64::from(r) / 255.0,
            f64::from(g) / 255.0,
            f64::from(b) / 255.0,
            f64::from(a) / 255.0,
        )
    }

    /// Create from hue (degrees), saturation and lightness (0.0 to 1.0).
    pub fn from_hsl(h: f64, s: f64, l: f64) -> Self {
        let h = h.rem_euclid(360.0) / 360.0;
        let s = s.clamp(0.0, 1.0);
        let l = l.clamp(0.0, 1.0);
        if s == 0.0 {
            return Self::rgb(l, l, l);
        }
        let q = if l < 0.5 { l * (1.0 + s) } else { l + s - l * s };
        let p = 2.0 * l - q;
        Self::rgb(
            hue_to_channel(p, q, h + 1.0 / 3.0),
            hue_to_channel(p, q, h),
            hue_to_channel(p, q, h - 1.0 / 3.0),
        )
    }

    /// Create from hue (degrees), saturation and value (0.0 to 1.0).
    pub fn from_hsv(h: f64, s: f64, v: f64) -> Self {
        let s = s.clamp(0.0, 1.0);
        let v = v.clamp(0.0, 1.0);
        let l = v * (1.0 - s / 2.0);
        let sl = if l == 0.0 || l == 1.0 {
            0.0
        } else {
            (v - l) / l.min(1.0 - l)
        };
        Self::from_hsl(h, sl, l)
    }

    /// Parse a color string: `#rgb`, `#rgba`, `#rrggbb`, `#rrggbbaa`,
    /// `rgb(..)`, `rgba(..)`, `hsl(..)` or a named color.
    pub fn parse(input: &str) -> Result<Self, ColorError> {
        let trimmed = input.trim();
        if let Some(hex) = trimmed.strip_prefix('#') {
            return parse_hex(trimmed, hex);
        }
        let lower = trimmed.to_ascii_lowercase();
        if let Some(args) = function_args(&lower, "rgba").or_else(|| function_args(&lower, "rgb"))
        {
            return parse_rgb_function(trimmed, args);
        }
        if let Some(args) = function_args(&lower, "hsl") {
            return parse_hsl_function(trimmed, args);
        }
        named_color(&lower).ok_or_else(|| ColorError::Unrecognized(trimmed.to_owned()))
    }

    pub fn is_valid(&self) -> bool {
        self.valid
    }

    /// Hue, saturation, lightness (hue in degrees, rest 0.0 to 1.0).
    pub fn to_hsl(&self) -> (f64, f64, f64) {
        let max = self.r.max(self.g).max(self.b);
        let min = self.r.min(self.g).min(self.b);
        let l = (max + min) / 2.0;
        if max == min {
            return (0.0, 0.0, l);
        }
        let d = max - min;
        let s = if l > 0.5 {
            d / (2.0 - max - min)
        } else {
            d / (max + min)
        };
        let h = if max == self.r {
            (self.g - self.b) / d + if self.g < self.b { 6.0 } else { 0.0 }
        } else if max == self.g {
            (self.b - self.r) / d + 2.0
        } else {
            (self.r - self.g) / d + 4.0
        };
        (h * 60.0, s, l)
    }

    /// Hue, saturation, value (hue in degrees, rest 0.0 to 1.0).
    pub fn to_hsv(&self) -> (f64, f64, f64) {
        let (h, _, l) = self.to_hsl();
        let v = l + self.saturation_hsl() * l.min(1.0 - l);
        let s = if v == 0.0 { 0.0 } else { 2.0 * (1.0 - l / v) };
        (h, s, v)
    }

    fn saturation_hsl(&self) -> f64 {
        self.to_hsl().1
    }

    pub fn to_rgb8(&self) -> [u8; 4] {
        [
            (self.r * 255.0).round() as u8,
            (self.g * 255.0).round() as u8,
            (self.b * 255.0).round() as u8,
            (self.a * 255.0).round() as u8,
        ]
    }

    pub fn with_alpha(self, alpha: f64) -> Self {
        Self::new(self.r, self.g, self.b, alpha)
    }

    /// Mix toward `other` by `fraction` in the given channel space.
    ///
    /// Out-of-range fractions extrapolate; channels are clamped back into
    /// range so the result is always a valid color.
    pub fn mix(&self, other: &Color, fraction: f64, model: ColorModel) -> Color {
        let alpha = lerp(self.a, other.a, fraction);
        match model {
            ColorModel::Rgb => Self::new(
                lerp(self.r, other.r, fraction),
                lerp(self.g, other.g, fraction),
                lerp(self.b, other.b, fraction),
                alpha,
            ),
            ColorModel::Hsl => {
                let (h1, s1, l1) = self.to_hsl();
                let (h2, s2, l2) = other.to_hsl();
                let h = lerp_hue(h1, h2, fraction);
                Self::from_hsl(h, lerp(s1, s2, fraction), lerp(l1, l2, fraction))
                    .with_alpha(alpha)
            }
            ColorModel::Husl => {
                let (h1, s1, l1) = husl::rgb_to_husl(self.r, self.g, self.b);
                let (h2, s2, l2) = husl::rgb_to_husl(other.r, other.g, other.b);
                let h = lerp_hue(h1, h2, fraction);
                let (r, g, b) = husl::husl_to_rgb(
                    h.rem_euclid(360.0),
                    lerp(s1, s2, fraction).clamp(0.0, 100.0),
                    lerp(l1, l2, fraction).clamp(0.0, 100.0),
                );
                Self::new(r, g, b, alpha)
            }
        }
    }

    /// Perceptual blend, the default when no channel space is requested.
    pub fn blend(&self, other: &Color, fraction: f64) -> Color {
        self.mix(other, fraction, ColorModel::Husl)
    }
}

fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

/// Hue travels along the shortest arc, in degrees.
fn lerp_hue(a: f64, b: f64, t: f64) -> f64 {
    let mut delta = (b - a).rem_euclid(360.0);
    if delta > 180.0 {
        delta -= 360.0;
    }
    a + delta * t
}

fn hue_to_channel(p: f64, q: f64, t: f64) -> f64 {
    let t = t.rem_euclid(1.0);
    if t < 1.0 / 6.0 {
        p + (q - p) * 6.0 * t
    } else if t < 0.5 {
        q
    } else if t < 2.0 / 3.0 {
        p + (q - p) * (2.0 / 3.0 - t) * 6.0
    } else {
        p
    }
}

fn parse_hex(input: &str, hex: &str) -> Result<Color, ColorError> {
    let nibble = |c: char| -> Result<u8, ColorError> {
        c.to_digit(16)
            .map(|d| d as u8)
            .ok_or_else(|| ColorError::MalformedComponent {
                input: input.to_owned(),
                component: c.to_string(),
            })
    };
    let chars: Vec<char> = hex.chars().collect();
    match chars.len() {
        3 | 4 => {
            let mut parts = [255u8; 4];
            for (i, c) in chars.iter().enumerate() {
                let d = nibble(*c)?;
                parts[i] = d * 16 + d;
            }
            Ok(Color::from_rgba8(parts[0], parts[1], parts[2], parts[3]))
        }
        6 | 8 => {
            let mut parts = [255u8; 4];
            for (i, pair) in chars.chunks(2).enumerate() {
                parts[i] = nibble(pair[0])? * 16 + nibble(pair[1])?;
            }
            Ok(Color::from_rgba8(parts[0], parts[1], parts[2], parts[3]))
        }
        _ => Err(ColorError::Unrecognized(input.to_owned())),
    }
}

fn function_args<'a>(input: &'a str, name: &str) -> Option<&'a str> {
    input
        .strip_prefix(name)?
        .trim()
        .strip_prefix('(')?
        .trim_end()
        .strip_suffix(')')
}

fn parse_rgb_function(input: &str, args: &str) -> Result<Color, ColorError> {
    let parts: Vec<&str> = args.split(',').map(str::trim).collect();
    if parts.len() != 3 && parts.len() != 4 {
        return Err(ColorError::Unrecognized(input.to_owned()));
    }
    let channel = |s: &str| -> Result<f64, ColorError> {
        s.parse::<f64>()
            .map_err(|_| ColorError::MalformedComponent {
                input: input.to_owned(),
                component: s.to_owned(),
            })
    };
    let r = channel(parts[0])? / 255.0;
    let g = channel(parts[1])? / 255.0;
    let b = channel(parts[2])? / 255.0;
    let a = if parts.len() == 4 {
        channel(parts[3])?
    } else {
        1.0
    };
    Ok(Color::new(r, g, b, a))
}

fn parse_hsl_function(input: &str, args: &str) -> Result<Color, ColorError> {
    let parts: Vec<&str> = args.split(',').map(str::trim).collect();
    if parts.len() != 3 {
        return Err(ColorError::Unrecognized(input.to_owned()));
    }
    let number = |s: &str| -> Result<f64, ColorError> {
        s.trim_end_matches('%')
            .parse::<f64>()
            .map_err(|_| ColorError::MalformedComponent {
                input: input.to_owned(),
                component: s.to_owned(),
            })
    };
    let h = number(parts[0])?;
    let s = number(parts[1])? / 100.0;
    let l = number(parts[2])? / 100.0;
    Ok(Color::from_hsl(h, s, l))
}

fn named_color(name: &str) -> Option<Color> {
    // CSS level 1 names plus the handful the engine's own tests lean on.
    let color = match name {
        "black" => Color::BLACK,
        "white" => Color::WHITE,
        "red" => Color::RED,
        "blue" => Color::BLUE,
        "green" => Color::from_rgb8(0, 128, 0),
        "lime" => Color::from_rgb8(0, 255, 0),
        "yellow" => Color::from_rgb8(255, 255, 0),
        "cyan" | "aqua" => Color::from_rgb8(0, 255, 255),
        "magenta" | "fuchsia" => Color::from_rgb8(255, 0, 255),
        "orange" => Color::from_rgb8(255, 165, 0),
        "purple" => Color::from_rgb8(128, 0, 128),
        "gray" | "grey" => Color::from_rgb8(128, 128, 128),
        "transparent" => Color::TRANSPARENT,
        _ => return None,
    };
    Some(color)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(a: f64, b: f64, eps: f64) {
        assert!((a - b).abs() < eps, "{a} vs {b}");
    }

    #[test]
    fn test_parse_hex() {
        assert_eq!(Color::parse("#ff0000"), Ok(Color::RED));
        assert_eq!(Color::parse("#f00"), Ok(Color::RED));
        let half = Color::parse("#00ff0080").unwrap();
        assert_close(half.g, 1.0, 1e-9);
        assert_close(half.a, 128.0 / 255.0, 1e-9);
    }

    #[test]
    fn test_parse_functions_and_names() {
        assert_eq!(Color::parse("rgb(255, 0, 0)"), Ok(Color::RED));
        let c = Color::parse("rgba(0, 0, 255, 0.5)").unwrap();
        assert_close(c.b, 1.0, 1e-9);
        assert_close(c.a, 0.5, 1e-9);
        let c = Color::parse("hsl(120, 100%, 50%)").unwrap();
        assert_close(c.g, 1.0, 1e-9);
        assert_eq!(Color::parse("red"), Ok(Color::RED));
        assert_eq!(Color::parse("green"), Ok(Color::from_rgb8(0, 128, 0)));
        assert!(Color::parse("not-a-color").is_err());
    }

    #[test]
    fn test_hsl_round_trip() {
        let c = Color::from_rgb8(120, 33, 240);
        let (h, s, l) = c.to_hsl();
        let back = Color::from_hsl(h, s, l);
        assert_close(c.r, back.r, 1e-9);
        assert_close(c.g, back.g, 1e-9);
        assert_close(c.b, back.b, 1e-9);
    }

    #[test]
    fn test_rgb_mix_midpoint() {
        let mid = Color::RED.mix(&Color::BLUE, 0.5, ColorModel::Rgb);
        assert_close(mid.r, 0.5, 1e-9);
        assert_close(mid.g, 0.0, 1e-9);
        assert_close(mid.b, 0.5, 1e-9);
        assert!(mid.is_valid());
    }

    #[test]
    fn test_hsl_mix_travels_shortest_arc() {
        // Red (0 deg) to blue (240 deg) goes backward through magenta.
        let mid = Color::RED.mix(&Color::BLUE, 0.5, ColorModel::Hsl);
        let magenta = Color::from_hsl(300.0, 1.0, 0.5);
        assert_close(mid.r, magenta.r, 1e-9);
        assert_close(mid.g, magenta.g, 1e-9);
        assert_close(mid.b, magenta.b, 1e-9);
    }

    #[test]
    fn test_husl_mix_stays_in_gamut() {
        for i in 0..=10 {
            let t = f64::from(i) / 10.0;
            let c = Color::RED.blend(&Color::from_rgb8(0, 128, 0), t);
            assert!(c.is_valid());
            for channel in [c.r, c.g, c.b, c.a] {
                assert!((0.0..=1.0).contains(&channel));
            }
        }
    }

    #[test]
    fn test_mix_endpoints_are_exact() {
        for model in [ColorModel::Rgb, ColorModel::Hsl, ColorModel::Husl] {
            let from = Color::from_rgb8(10, 20, 30);
            let to = Color::from_rgb8(100, 200, 0);
            let start = from.mix(&to, 0.0, model);
            let end = from.mix(&to, 1.0, model);
            assert_close(start.r, from.r, 1e-6);
            assert_close(start.g, from.g, 1e-6);
            assert_close(start.b, from.b, 1e-6);
            assert_close(end.r, to.r, 1e-6);
            assert_close(end.g, to.g, 1e-6);
            assert_close(end.b, to.b, 1e-6);
        }
    }

    #[test]
    fn test_invalid_sentinel() {
        assert!(!Color::INVALID.is_valid());
        assert!(Color::RED.is_valid());
    }
}
