use std::collections::BTreeMap;

use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Srgb};

/// Hues in one palette cycle; players beyond that reuse colours.
const PALETTE_SIZE: usize = 10;

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
// Color mapping: player → Color32
// ---------------------------------------------------------------------------

/// Stable series colours: a player keeps the colour it got first, so the
/// same player looks the same in every chart and view.
#[derive(Debug, Clone)]
pub struct ColorMap {
    palette: Vec<Color32>,
    mapping: BTreeMap<String, Color32>,
    default_color: Color32,
}

impl Default for ColorMap {
    fn default() -> Self {
        ColorMap {
            palette: generate_palette(PALETTE_SIZE),
            mapping: BTreeMap::new(),
            default_color: Color32::LIGHT_BLUE,
        }
    }
}

impl ColorMap {
    /// Colour map seeded with `players` in order.
    pub fn new(players: &[String]) -> Self {
        let mut map = ColorMap::default();
        map.extend(players);
        map
    }

    /// Give each new player the next palette colour.
    pub fn extend(&mut self, players: &[String]) {
        for player in players {
            if self.mapping.contains_key(player) {
                continue;
            }
            let next = self.palette[self.mapping.len() % self.palette.len()];
            self.mapping.insert(player.clone(), next);
        }
    }

    /// Colour of a player, or the default for players never seen.
    pub fn color_for(&self, player: &str) -> Color32 {
        self.mapping
            .get(player)
            .copied()
            .unwrap_or(self.default_color)
    }

    /// Colour of the `i`-th series when players are not known up front.
    pub fn nth(&self, i: usize) -> Color32 {
        self.palette[i % self.palette.len()]
    }
}
