use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Srgb};

// ---------------------------------------------------------------------------
// Heat gradient
// ---------------------------------------------------------------------------

const COLD_HUE: f32 = 240.0;
const MIN_ALPHA: f32 = 70.0;
const MAX_ALPHA: f32 = 220.0;

/// Colour for a density in `0.0..=1.0`: transparent blue through green and
/// yellow to opaque red. Out-of-range input is clamped.
pub fn heat_color(intensity: f32) -> Color32 {
    let t = if intensity.is_finite() {
        intensity.clamp(0.0, 1.0)
    } else {
        0.0
    };
    let hue = COLD_HUE * (1.0 - t);
    let hsl = Hsl::new(hue, 0.85, 0.5);
    let rgb: Srgb = hsl.into_color();
    let alpha = MIN_ALPHA + (MAX_ALPHA - MIN_ALPHA) * t;
    Color32::from_rgba_unmultiplied(
        (rgb.red * 255.0) as u8,
        (rgb.green * 255.0) as u8,
        (rgb.blue * 255.0) as u8,
        alpha as u8,
    )
}

/// `n` evenly spaced gradient stops, coldest first. Used for the legend.
pub fn heat_ramp(n: usize) -> Vec<Color32> {
    match n {
        0 => Vec::new(),
        1 => vec![heat_color(1.0)],
        _ => (0..n)
            .map(|i| heat_color(i as f32 / (n - 1) as f32))
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gradient_runs_from_blue_to_red() {
        let cold = heat_color(0.0);
        let hot = heat_color(1.0);
        assert!(cold.b() > cold.r());
        assert!(hot.r() > hot.b());
        assert!(hot.a() > cold.a());
    }

    #[test]
    fn out_of_range_is_clamped() {
        assert_eq!(heat_color(-3.0), heat_color(0.0));
        assert_eq!(heat_color(7.0), heat_color(1.0));
        assert_eq!(heat_color(f32::NAN), heat_color(0.0));
    }

    #[test]
    fn ramp_has_requested_stops() {
        assert!(heat_ramp(0).is_empty());
        assert_eq!(heat_ramp(1), vec![heat_color(1.0)]);
        let ramp = heat_ramp(5);
        assert_eq!(ramp.len(), 5);
        assert_eq!(ramp[0], heat_color(0.0));
        assert_eq!(ramp[4], heat_color(1.0));
    }
}
