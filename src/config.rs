use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use serde::Deserialize;

use crate::data::loader::FeedSource;
use crate::data::normalize::{NormalizeOptions, DEFAULT_DATE_ATTRIBUTE};
use crate::heatmap::{HeatmapSettings, MAX_RADIUS_CELLS};

/// Looked up in the working directory at start-up.
pub const CONFIG_FILE: &str = "film-heatmap.toml";

// ---------------------------------------------------------------------------
// Viewer configuration
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, Clone, Default, PartialEq)]
#[serde(default)]
pub struct ViewerConfig {
    pub feed: FeedConfig,
    pub map: MapConfig,
    pub heatmap: HeatmapConfig,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct FeedConfig {
    pub path: Option<PathBuf>,
    pub arcgis_url: Option<String>,
    pub date_attribute: String,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            path: None,
            arcgis_url: None,
            date_attribute: DEFAULT_DATE_ATTRIBUTE.to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct MapConfig {
    pub center_lat: f64,
    pub center_lng: f64,
    pub zoom: u8,
}

impl Default for MapConfig {
    fn default() -> Self {
        // Albuquerque
        Self {
            center_lat: 35.1107,
            center_lng: -106.6099,
            zoom: 13,
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct HeatmapConfig {
    pub cell_size_deg: f64,
    pub radius_cells: u32,
}

impl Default for HeatmapConfig {
    fn default() -> Self {
        let settings = HeatmapSettings::default();
        Self {
            cell_size_deg: settings.cell_size_deg,
            radius_cells: settings.radius_cells,
        }
    }
}

impl ViewerConfig {
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: ViewerConfig =
            toml::from_str(&content).with_context(|| "Failed to parse TOML configuration")?;
        config.validate()?;
        Ok(config)
    }

    /// Load `path` if it exists, defaults otherwise.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load_from_file(path)
        } else {
            log::info!("{} not found, using default configuration", path.display());
            Ok(Self::default())
        }
    }

    fn validate(&self) -> Result<()> {
        if self.feed.path.is_some() && self.feed.arcgis_url.is_some() {
            bail!("[feed] sets both `path` and `arcgis_url`; pick one");
        }
        if !(self.heatmap.cell_size_deg.is_finite() && self.heatmap.cell_size_deg > 0.0) {
            bail!("[heatmap] cell_size_deg must be a positive number");
        }
        if self.heatmap.radius_cells > MAX_RADIUS_CELLS {
            bail!("[heatmap] radius_cells must be at most {MAX_RADIUS_CELLS}");
        }
        if !(-90.0..=90.0).contains(&self.map.center_lat)
            || !(-180.0..=180.0).contains(&self.map.center_lng)
        {
            bail!("[map] centre is not a valid coordinate");
        }
        Ok(())
    }

    /// The feed to load; the bundled ABQ export path unless configured.
    pub fn feed_source(&self) -> FeedSource {
        match (&self.feed.arcgis_url, &self.feed.path) {
            (Some(url), _) => FeedSource::ArcGis(url.clone()),
            (None, Some(path)) => FeedSource::Path(path.clone()),
            (None, None) => FeedSource::Path(PathBuf::from("data/filmlocationsJSON_ALL.json")),
        }
    }

    pub fn normalize_options(&self) -> NormalizeOptions {
        NormalizeOptions {
            date_attribute: self.feed.date_attribute.clone(),
        }
    }

    pub fn heatmap_settings(&self) -> HeatmapSettings {
        HeatmapSettings {
            cell_size_deg: self.heatmap.cell_size_deg,
            radius_cells: self.heatmap.radius_cells,
        }
    }
}

impl MapConfig {
    /// Initial view as `([min_lng, min_lat], [max_lng, max_lat])`, roughly four
    /// web-map tiles wide at `zoom`.
    pub fn initial_bounds(&self) -> ([f64; 2], [f64; 2]) {
        let half_lng = 2.0 * 360.0 / 2f64.powi(i32::from(self.zoom.min(22)));
        let half_lat = half_lng * self.center_lat.to_radians().cos().max(0.01);
        (
            [self.center_lng - half_lng, self.center_lat - half_lat],
            [self.center_lng + half_lng, self.center_lat + half_lat],
        )
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn write_config(text: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(text.as_bytes()).unwrap();
        file
    }

    #[test]
    fn empty_file_gives_defaults() {
        let file = write_config("");
        let config = ViewerConfig::load_from_file(file.path()).unwrap();
        assert_eq!(config, ViewerConfig::default());
        assert_eq!(config.feed.date_attribute, "ShootDate");
        assert_eq!(
            config.feed_source(),
            FeedSource::Path(PathBuf::from("data/filmlocationsJSON_ALL.json"))
        );
    }

    #[test]
    fn parses_all_sections() {
        let file = write_config(
            r#"
            [feed]
            arcgis_url = "https://example.com/FeatureServer/0/query"
            date_attribute = "Date"

            [map]
            center_lat = 40.0
            center_lng = -105.0
            zoom = 10

            [heatmap]
            cell_size_deg = 0.01
            radius_cells = 3
            "#,
        );
        let config = ViewerConfig::load_from_file(file.path()).unwrap();
        assert_eq!(
            config.feed_source(),
            FeedSource::ArcGis("https://example.com/FeatureServer/0/query".to_string())
        );
        assert_eq!(config.normalize_options().date_attribute, "Date");
        assert_eq!(config.map.zoom, 10);
        assert_eq!(config.heatmap_settings().radius_cells, 3);
    }

    #[test]
    fn rejects_two_feed_sources() {
        let file = write_config(
            r#"
            [feed]
            path = "a.json"
            arcgis_url = "https://example.com/query"
            "#,
        );
        assert!(ViewerConfig::load_from_file(file.path()).is_err());
    }

    #[test]
    fn rejects_bad_cell_size() {
        let file = write_config("[heatmap]\ncell_size_deg = -1.0\n");
        assert!(ViewerConfig::load_from_file(file.path()).is_err());
    }

    #[test]
    fn rejects_huge_radius() {
        let file = write_config("[heatmap]\nradius_cells = 100000\n");
        let err = ViewerConfig::load_from_file(file.path()).unwrap_err();
        assert!(err.to_string().contains("radius_cells"));

        let file = write_config(&format!("[heatmap]\nradius_cells = {MAX_RADIUS_CELLS}\n"));
        assert!(ViewerConfig::load_from_file(file.path()).is_ok());
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = ViewerConfig::load_or_default(&dir.path().join(CONFIG_FILE)).unwrap();
        assert_eq!(config, ViewerConfig::default());
    }

    #[test]
    fn initial_bounds_centre_on_map_centre() {
        let map = MapConfig::default();
        let (min, max) = map.initial_bounds();
        assert!(((min[0] + max[0]) / 2.0 - map.center_lng).abs() < 1e-9);
        assert!(((min[1] + max[1]) / 2.0 - map.center_lat).abs() < 1e-9);
        assert!(max[0] - min[0] > max[1] - min[1]);
    }
}
