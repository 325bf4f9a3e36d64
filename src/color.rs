use std::collections::BTreeMap;

use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Srgb};

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
// Team → colour mapping shared by every chart
// ---------------------------------------------------------------------------

/// Maps each team of the dataset to a stable, distinct colour.
///
/// Built from the full team list, so a team keeps its colour while the
/// filter selection changes.
#[derive(Debug, Clone, Default)]
pub struct TeamPalette {
    mapping: BTreeMap<String, Color32>,
}

impl TeamPalette {
    pub fn new(teams: &[String]) -> Self {
        let mapping = teams
            .iter()
            .cloned()
            .zip(generate_palette(teams.len()))
            .collect();
        TeamPalette { mapping }
    }

    /// Look up the colour for a team, grey for unknown names.
    pub fn color_for(&self, team: &str) -> Color32 {
        self.mapping.get(team).copied().unwrap_or(Color32::GRAY)
    }
}

/// Fixed series colours for the two-series charts.
pub const WINS_COLOR: Color32 = Color32::from_rgb(77, 175, 74);
pub const LOSSES_COLOR: Color32 = Color32::from_rgb(228, 26, 28);
pub const RUNS_SCORED_COLOR: Color32 = Color32::from_rgb(55, 126, 184);
pub const RUNS_ALLOWED_COLOR: Color32 = Color32::from_rgb(255, 127, 0);
