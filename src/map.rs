//! Standalone Leaflet page drawing the map layers over a tile layer.

use crate::lines::Palette;
use crate::Error;
use geojson::FeatureCollection;
use std::collections::HashMap;
use std::path::Path;
use tracing::info;

const PAGE_TEMPLATE: &str = include_str!("map.html");

/// How the map is displayed. Every field can be omitted from the configuration file
#[derive(Derivative, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[derivative(Default)]
#[serde(default)]
pub struct MapConfig {
    /// Title of the page
    #[derivative(Default(value = "\"Metro network\".to_owned()"))]
    pub title: String,
    /// `[latitude, longitude]` of the initial view
    #[derivative(Default(value = "[28.6139, 77.2090]"))]
    pub center: [f64; 2],
    #[derivative(Default(value = "11"))]
    pub zoom: u8,
    #[derivative(Default(
        value = "\"https://{s}.basemaps.cartocdn.com/dark_all/{z}/{x}/{y}{r}.png\".to_owned()"
    ))]
    pub tile_url: String,
    #[derivative(Default(value = "\"&copy; OpenStreetMap &copy; CARTO\".to_owned()"))]
    pub attribution: String,
    /// Colors added to the default palette, by line key, as `#rrggbb`
    pub palette: HashMap<String, String>,
}

impl MapConfig {
    /// Reads the configuration from a json file
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let path = path.as_ref();
        let file_name = path.display().to_string();
        let content = std::fs::read_to_string(path).map_err(|e| Error::NamedFileIO {
            file_name: file_name.clone(),
            source: Box::new(e),
        })?;
        let config: MapConfig = serde_json::from_str(&content)
            .map_err(|source| Error::Config { file_name, source })?;
        info!(path = %path.display(), "map configuration loaded");
        Ok(config)
    }

    /// The default palette with the overrides of the configuration
    pub fn palette(&self) -> Result<Palette, Error> {
        Palette::default().with_overrides(&self.palette)
    }
}

/// Renders a standalone html page drawing `features` with Leaflet
///
/// Lines and paths are drawn as polylines, stations as circle markers with a popup.
pub fn render_html(config: &MapConfig, features: &FeatureCollection) -> Result<String, Error> {
    let settings = serde_json::json!({
        "center": config.center,
        "zoom": config.zoom,
        "tileUrl": config.tile_url,
        "attribution": config.attribution,
    });
    Ok(PAGE_TEMPLATE
        .replace("__TITLE__", &escape_text(&config.title))
        .replace("__SETTINGS__", &script_json(&serde_json::to_string(&settings)?))
        .replace("__FEATURES__", &script_json(&serde_json::to_string(features)?)))
}

fn escape_text(s: &str) -> String {
    s.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}

/// Json embedded in a `<script>` must not close the tag
fn script_json(json: &str) -> String {
    json.replace("</", "<\\/")
}
