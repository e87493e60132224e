use std::collections::{BTreeMap, BTreeSet};

use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Srgb};

use crate::data::model::Text;

// ---------------------------------------------------------------------------
// Fixed chart colours
// ---------------------------------------------------------------------------

pub const TOP_PRODUCTS: Color32 = Color32::from_rgb(0xc9, 0xb3, 0xe6);
pub const CATEGORY_MARGIN: Color32 = Color32::from_rgb(0xff, 0xf9, 0xc4);
pub const REGION_SALES: Color32 = Color32::from_rgb(0xa9, 0xcc, 0xe3);
pub const TOP_CUSTOMERS: Color32 = Color32::from_rgb(0xfb, 0xb4, 0xae);
pub const SHIPPING_TIME: Color32 = Color32::from_rgb(0xa8, 0xd5, 0xba);
pub const MONTHLY_LINE: Color32 = Color32::from_rgb(0x63, 0x6e, 0xfa);

/// Light pink, light green, light blue, light yellow.
pub const PASTELS: [Color32; 4] = [
    Color32::from_rgb(0xf8, 0xbb, 0xd0),
    Color32::from_rgb(0xc8, 0xe6, 0xc9),
    Color32::from_rgb(0xbb, 0xde, 0xfb),
    Color32::from_rgb(0xff, 0xf9, 0xc4),
];

/// Pastel for slice `i`, falling back to generated hues past the fixed set.
pub fn pastel(i: usize, n: usize) -> Color32 {
    if n <= PASTELS.len() {
        PASTELS[i % PASTELS.len()]
    } else {
        generate_palette(n)[i % n]
    }
}

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
// Color mapping: category value → Color32
// ---------------------------------------------------------------------------

/// Maps every value of a categorical column (e.g. Region) to a distinct
/// colour. Built from the full domain so colours stay put while filtering.
#[derive(Debug, Clone, Default)]
pub struct ColorMap {
    mapping: BTreeMap<Text, Color32>,
}

impl ColorMap {
    pub fn new(values: &BTreeSet<Text>) -> Self {
        let palette = generate_palette(values.len());
        ColorMap {
            mapping: values.iter().cloned().zip(palette).collect(),
        }
    }

    /// Look up the colour for a value; unknown values are grey.
    pub fn color_for(&self, value: &str) -> Color32 {
        self.mapping.get(value).copied().unwrap_or(Color32::GRAY)
    }
}
