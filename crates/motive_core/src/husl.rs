//! HSLuv color space conversions
//!
//! Backs the perceptual mix model. HSLuv is a human-friendly cylindrical
//! transform of CIELUV: hue in degrees, saturation and lightness in 0..100,
//! with saturation normalized against the maximum in-gamut chroma for the
//! given lightness and hue.

use std::f64::consts::PI;

// sRGB companding matrices (D65).
const M: [[f64; 3]; 3] = [
    [3.240969941904521, -1.537383177570093, -0.498610760293],
    [-0.96924363628087, 1.87596750150772, 0.041555057407175],
    [0.055630079696993, -0.20397695888897, 1.056971514242878],
];
const M_INV: [[f64; 3]; 3] = [
    [0.41239079926595, 0.35758433938387, 0.18048078840183],
    [0.21263900587151, 0.71516867876775, 0.072192315360733],
    [0.019330818715591, 0.11919477979462, 0.95053215224966],
];

const REF_U: f64 = 0.19783000664283;
const REF_V: f64 = 0.46831999493879;
const KAPPA: f64 = 903.2962962;
const EPSILON: f64 = 0.0088564516;

/// Convert normalized sRGB channels to HSLuv (h in degrees, s and l in 0..100).
pub(crate) fn rgb_to_husl(r: f64, g: f64, b: f64) -> (f64, f64, f64) {
    let (x, y, z) = rgb_to_xyz(r, g, b);
    let (l, u, v) = xyz_to_luv(x, y, z);
    let (l, c, h) = luv_to_lch(l, u, v);
    lch_to_husl(l, c, h)
}

/// Convert HSLuv (h in degrees, s and l in 0..100) to normalized sRGB channels.
pub(crate) fn husl_to_rgb(h: f64, s: f64, l: f64) -> (f64, f64, f64) {
    let (l, c, h) = husl_to_lch(h, s, l);
    let (l, u, v) = lch_to_luv(l, c, h);
    let (x, y, z) = luv_to_xyz(l, u, v);
    xyz_to_rgb(x, y, z)
}

fn to_linear(c: f64) -> f64 {
    if c > 0.04045 {
        ((c + 0.055) / 1.055).powf(2.4)
    } else {
        c / 12.92
    }
}

fn from_linear(c: f64) -> f64 {
    if c <= 0.0031308 {
        12.92 * c
    } else {
        1.055 * c.powf(1.0 / 2.4) - 0.055
    }
}

fn rgb_to_xyz(r: f64, g: f64, b: f64) -> (f64, f64, f64) {
    let rl = to_linear(r);
    let gl = to_linear(g);
    let bl = to_linear(b);
    (
        M_INV[0][0] * rl + M_INV[0][1] * gl + M_INV[0][2] * bl,
        M_INV[1][0] * rl + M_INV[1][1] * gl + M_INV[1][2] * bl,
        M_INV[2][0] * rl + M_INV[2][1] * gl + M_INV[2][2] * bl,
    )
}

fn xyz_to_rgb(x: f64, y: f64, z: f64) -> (f64, f64, f64) {
    let r = M[0][0] * x + M[0][1] * y + M[0][2] * z;
    let g = M[1][0] * x + M[1][1] * y + M[1][2] * z;
    let b = M[2][0] * x + M[2][1] * y + M[2][2] * z;
    (from_linear(r), from_linear(g), from_linear(b))
}

fn y_to_l(y: f64) -> f64 {
    if y <= EPSILON {
        y * KAPPA
    } else {
        116.0 * y.cbrt() - 16.0
    }
}

fn l_to_y(l: f64) -> f64 {
    if l <= 8.0 {
        l / KAPPA
    } else {
        ((l + 16.0) / 116.0).powi(3)
    }
}

fn xyz_to_luv(x: f64, y: f64, z: f64) -> (f64, f64, f64) {
    let l = y_to_l(y);
    if l == 0.0 {
        return (0.0, 0.0, 0.0);
    }
    let divider = x + 15.0 * y + 3.0 * z;
    if divider == 0.0 {
        return (l, 0.0, 0.0);
    }
    let var_u = 4.0 * x / divider;
    let var_v = 9.0 * y / divider;
    (l, 13.0 * l * (var_u - REF_U), 13.0 * l * (var_v - REF_V))
}

fn luv_to_xyz(l: f64, u: f64, v: f64) -> (f64, f64, f64) {
    if l == 0.0 {
        return (0.0, 0.0, 0.0);
    }
    let var_u = u / (13.0 * l) + REF_U;
    let var_v = v / (13.0 * l) + REF_V;
    let y = l_to_y(l);
    let x = -(9.0 * y * var_u) / ((var_u - 4.0) * var_v - var_u * var_v);
    let z = (9.0 * y - 15.0 * var_v * y - var_v * x) / (3.0 * var_v);
    (x, y, z)
}

fn luv_to_lch(l: f64, u: f64, v: f64) -> (f64, f64, f64) {
    let c = (u * u + v * v).sqrt();
    if c < 1e-8 {
        return (l, c, 0.0);
    }
    let mut h = v.atan2(u).to_degrees();
    if h < 0.0 {
        h += 360.0;
    }
    (l, c, h)
}

fn lch_to_luv(l: f64, c: f64, h: f64) -> (f64, f64, f64) {
    let hrad = h.to_radians();
    (l, hrad.cos() * c, hrad.sin() * c)
}

fn lch_to_husl(l: f64, c: f64, h: f64) -> (f64, f64, f64) {
    if l > 99.9999999 {
        return (h, 0.0, 100.0);
    }
    if l < 0.00000001 {
        return (h, 0.0, 0.0);
    }
    let max_c = max_chroma_for(l, h);
    (h, c / max_c * 100.0, l)
}

fn husl_to_lch(h: f64, s: f64, l: f64) -> (f64, f64, f64) {
    if l > 99.9999999 {
        return (100.0, 0.0, h);
    }
    if l < 0.00000001 {
        return (0.0, 0.0, h);
    }
    let max_c = max_chroma_for(l, h);
    (l, max_c / 100.0 * s, h)
}

/// Largest chroma that stays inside the sRGB gamut for a lightness and hue.
///
/// Each of the six gamut boundary planes projects to a line in the chroma
/// plane; the answer is the nearest intersection along the hue ray.
fn max_chroma_for(l: f64, h: f64) -> f64 {
    let hrad = h * PI / 180.0;
    let mut min_len = f64::MAX;
    for (slope, intercept) in bounds_for(l) {
        let denom = hrad.sin() - slope * hrad.cos();
        if denom.abs() < 1e-12 {
            continue;
        }
        let len = intercept / denom;
        if len >= 0.0 && len < min_len {
            min_len = len;
        }
    }
    min_len.max(1e-8)
}

fn bounds_for(l: f64) -> [(f64, f64); 6] {
    let sub1 = (l + 16.0).powi(3) / 1560896.0;
    let sub2 = if sub1 > EPSILON { sub1 } else { l / KAPPA };
    let mut bounds = [(0.0, 0.0); 6];
    for (channel, m) in M.iter().enumerate() {
        let (m1, m2, m3) = (m[0], m[1], m[2]);
        for limit in 0..2usize {
            let t = limit as f64;
            let top1 = (284517.0 * m1 - 94839.0 * m3) * sub2;
            let top2 =
                (838422.0 * m3 + 769860.0 * m2 + 731718.0 * m1) * l * sub2 - 769860.0 * t * l;
            let bottom = (632260.0 * m3 - 126452.0 * m2) * sub2 + 126452.0 * t;
            bounds[channel * 2 + limit] = (top1 / bottom, top2 / bottom);
        }
    }
    bounds
}
