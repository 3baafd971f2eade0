use std::collections::BTreeMap;

use crate::data::model::LatLng;

// ---------------------------------------------------------------------------
// Rendering seam
// ---------------------------------------------------------------------------

/// Receives the coordinates to draw after every filter change.
pub trait HeatmapRenderer {
    fn set_points(&mut self, points: Vec<LatLng>);
}

// ---------------------------------------------------------------------------
// Density grid
// ---------------------------------------------------------------------------

/// Largest kernel radius; each point touches `(2r+1)^2` cells.
pub const MAX_RADIUS_CELLS: u32 = 64;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeatmapSettings {
    /// Edge length of a grid cell in degrees.
    pub cell_size_deg: f64,
    /// How many cells a point spreads into around its own.
    pub radius_cells: u32,
}

impl Default for HeatmapSettings {
    fn default() -> Self {
        Self {
            cell_size_deg: 0.002,
            radius_cells: 2,
        }
    }
}

/// One coloured grid cell. Corners are `[lng, lat]`, matching the plot axes.
#[derive(Debug, Clone, PartialEq)]
pub struct HeatCell {
    pub min: [f64; 2],
    pub max: [f64; 2],
    pub weight: f64,
    /// `weight` relative to the heaviest cell, in `(0.0, 1.0]`.
    pub intensity: f32,
}

/// Accumulate points into grid cells with a linear falloff kernel.
pub fn density_grid(points: &[LatLng], settings: &HeatmapSettings) -> Vec<HeatCell> {
    let size = if settings.cell_size_deg.is_finite() && settings.cell_size_deg > 0.0 {
        settings.cell_size_deg
    } else {
        HeatmapSettings::default().cell_size_deg
    };
    let r = i64::from(settings.radius_cells.min(MAX_RADIUS_CELLS));

    let mut weights: BTreeMap<(i64, i64), f64> = BTreeMap::new();
    for p in points {
        let cx = (p.lng / size).floor() as i64;
        let cy = (p.lat / size).floor() as i64;
        for dx in -r..=r {
            for dy in -r..=r {
                let d2 = dx * dx + dy * dy;
                if d2 > r * r {
                    continue;
                }
                let w = 1.0 - (d2 as f64).sqrt() / (r + 1) as f64;
                *weights.entry((cx + dx, cy + dy)).or_default() += w;
            }
        }
    }

    let max = weights.values().copied().fold(0.0_f64, f64::max);
    if max <= 0.0 {
        return Vec::new();
    }
    weights
        .into_iter()
        .map(|((x, y), weight)| HeatCell {
            min: [x as f64 * size, y as f64 * size],
            max: [(x + 1) as f64 * size, (y + 1) as f64 * size],
            weight,
            intensity: (weight / max) as f32,
        })
        .collect()
}

// ---------------------------------------------------------------------------
// HeatmapLayer – the map's heat overlay
// ---------------------------------------------------------------------------

/// Holds the latest points and their density grid for the map plot.
#[derive(Debug, Clone, Default)]
pub struct HeatmapLayer {
    settings: HeatmapSettings,
    points: Vec<LatLng>,
    cells: Vec<HeatCell>,
}

impl HeatmapLayer {
    pub fn new(settings: HeatmapSettings) -> Self {
        Self {
            settings,
            points: Vec::new(),
            cells: Vec::new(),
        }
    }

    pub fn points(&self) -> &[LatLng] {
        &self.points
    }

    pub fn cells(&self) -> &[HeatCell] {
        &self.cells
    }
}

impl HeatmapRenderer for HeatmapLayer {
    fn set_points(&mut self, points: Vec<LatLng>) {
        self.cells = density_grid(&points, &self.settings);
        self.points = points;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(radius_cells: u32) -> HeatmapSettings {
        HeatmapSettings {
            cell_size_deg: 0.5,
            radius_cells,
        }
    }

    #[test]
    fn single_point_fills_its_cell() {
        let cells = density_grid(&[LatLng { lat: 1.2, lng: -0.7 }], &settings(0));
        assert_eq!(cells.len(), 1);
        assert_eq!(cells[0].min, [-1.0, 1.0]);
        assert_eq!(cells[0].max, [-0.5, 1.5]);
        assert_eq!(cells[0].intensity, 1.0);
    }

    #[test]
    fn coincident_points_add_up() {
        let p = LatLng { lat: 0.1, lng: 0.1 };
        let cells = density_grid(&[p, p, LatLng { lat: 3.1, lng: 3.1 }], &settings(0));
        assert_eq!(cells.len(), 2);
        assert_eq!(cells[0].weight, 2.0);
        assert_eq!(cells[1].intensity, 0.5);
    }

    #[test]
    fn radius_spreads_with_falloff() {
        let cells = density_grid(&[LatLng { lat: 0.1, lng: 0.1 }], &settings(1));
        // Centre plus four direct neighbours; diagonals are outside the radius.
        assert_eq!(cells.len(), 5);
        let centre = cells.iter().find(|c| c.min == [0.0, 0.0]).unwrap();
        assert_eq!(centre.intensity, 1.0);
        assert!(cells
            .iter()
            .filter(|c| c.min != [0.0, 0.0])
            .all(|c| c.intensity == 0.5));
    }

    #[test]
    fn empty_input_has_no_cells() {
        assert!(density_grid(&[], &HeatmapSettings::default()).is_empty());
    }

    #[test]
    fn invalid_cell_size_falls_back_to_default() {
        let bad = HeatmapSettings {
            cell_size_deg: 0.0,
            radius_cells: 0,
        };
        let cells = density_grid(&[LatLng { lat: 0.001, lng: 0.001 }], &bad);
        assert_eq!(cells[0].max, [0.002, 0.002]);
    }

    #[test]
    fn huge_radius_is_clamped() {
        let huge = HeatmapSettings {
            cell_size_deg: 0.5,
            radius_cells: 100_000,
        };
        let clamped = density_grid(&[LatLng { lat: 0.1, lng: 0.1 }], &huge);
        let capped = density_grid(&[LatLng { lat: 0.1, lng: 0.1 }], &settings(MAX_RADIUS_CELLS));
        assert_eq!(clamped, capped);
    }

    #[test]
    fn layer_rebuilds_grid_on_new_points() {
        let mut layer = HeatmapLayer::new(settings(0));
        layer.set_points(vec![LatLng { lat: 0.1, lng: 0.1 }]);
        assert_eq!(layer.points().len(), 1);
        assert_eq!(layer.cells().len(), 1);
        layer.set_points(Vec::new());
        assert!(layer.cells().is_empty());
    }
}
