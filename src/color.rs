use std::collections::BTreeMap;

use eframe::egui::Color32;
use palette::{Hsl, IntoColor, LinSrgb, Mix, Srgb};

use crate::chart::scatter::ColorEncoding;
use crate::data::model::CellValue;

// ---------------------------------------------------------------------------
// Color palette generator
// ---------------------------------------------------------------------------

/// Generates `n` visually distinct colours using evenly spaced hues.
pub fn generate_palette(n: usize) -> Vec<Color32> {
    if n == 0 {
        return Vec::new();
    }
    (0..n)
        .map(|i| {
            let hue = (i as f32 / n as f32) * 360.0;
            let hsl = Hsl::new(hue, 0.75, 0.55);
            let rgb: Srgb = hsl.into_color();
            Color32::from_rgb(
                (rgb.red * 255.0) as u8,
                (rgb.green * 255.0) as u8,
                (rgb.blue * 255.0) as u8,
            )
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Continuous scale (viridis)
// ---------------------------------------------------------------------------

const VIRIDIS: [(u8, u8, u8); 5] = [
    (68, 1, 84),
    (59, 82, 139),
    (33, 145, 140),
    (94, 201, 98),
    (253, 231, 37),
];

/// Viridis colour at `t` in `[0, 1]`; out-of-range values are clamped.
pub fn viridis(t: f64) -> Color32 {
    if t.is_nan() {
        return Color32::GRAY;
    }
    let t = t.clamp(0.0, 1.0) as f32;
    let scaled = t * (VIRIDIS.len() - 1) as f32;
    let i = (scaled.floor() as usize).min(VIRIDIS.len() - 2);
    let frac = scaled - i as f32;

    let stop = |(r, g, b): (u8, u8, u8)| -> LinSrgb {
        Srgb::new(r, g, b).into_format::<f32>().into_linear()
    };
    let mixed = stop(VIRIDIS[i]).mix(stop(VIRIDIS[i + 1]), frac);
    let rgb: Srgb = Srgb::from_linear(mixed);
    let rgb: Srgb<u8> = rgb.into_format();
    Color32::from_rgb(rgb.red, rgb.green, rgb.blue)
}

/// Colour for a correlation coefficient in `[-1, 1]`; grey for NaN.
pub fn correlation_color(r: f64) -> Color32 {
    viridis((r + 1.0) / 2.0)
}

// ---------------------------------------------------------------------------
// Color mapping: category label → Color32
// ---------------------------------------------------------------------------

/// Maps the distinct values of a text column to distinct colours.
#[derive(Debug, Clone)]
pub struct ColorMap {
    mapping: BTreeMap<String, Color32>,
    default_color: Color32,
}

impl ColorMap {
    /// Build a colour map from the category labels, in order.
    pub fn new(categories: &[String]) -> Self {
        let palette = generate_palette(categories.len());
        let mapping = categories.iter().cloned().zip(palette).collect();

        ColorMap {
            mapping,
            default_color: Color32::GRAY,
        }
    }

    /// Look up the colour for a given label.
    pub fn color_for(&self, label: &str) -> Color32 {
        self.mapping
            .get(label)
            .copied()
            .unwrap_or(self.default_color)
    }

    /// Return the legend entries (value label → colour) for the UI.
    pub fn legend_entries(&self) -> Vec<(String, Color32)> {
        self.mapping.iter().map(|(v, c)| (v.clone(), *c)).collect()
    }
}

// ---------------------------------------------------------------------------
// Scatter colour resolution
// ---------------------------------------------------------------------------

/// Resolves scatter point colours for one [`ColorEncoding`].
pub enum PointColors {
    Continuous { min: f64, max: f64 },
    Categorical(ColorMap),
}

impl PointColors {
    pub fn new(encoding: &ColorEncoding) -> Self {
        match encoding {
            ColorEncoding::Continuous { min, max } => PointColors::Continuous { min: *min, max: *max },
            ColorEncoding::Categorical(categories) => PointColors::Categorical(ColorMap::new(categories)),
        }
    }

    pub fn color_for(&self, value: &CellValue) -> Color32 {
        match self {
            PointColors::Continuous { min, max } => match value.as_f64() {
                Some(v) if max > min => viridis((v - min) / (max - min)),
                Some(_) => viridis(0.5),
                None => Color32::GRAY,
            },
            PointColors::Categorical(map) => map.color_for(&value.to_string()),
        }
    }
}
