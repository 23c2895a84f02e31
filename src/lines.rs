//! Line keys and the colors used to draw each line.
//!
//! A metro feed names its routes `<LINE>_<terminus to terminus>` (e.g. `BLUE_Dwarka to Noida`);
//! all the routes sharing the prefix are drawn with the same color.

use crate::objects::Route;
use crate::serde_helpers::{format_color, parse_color};
use crate::Error;
use rgb::RGB8;
use std::collections::HashMap;

/// Color of a line polyline whose line is unknown
pub const FALLBACK_LINE_COLOR: RGB8 = RGB8 { r: 0x64, g: 0x74, b: 0x8b };
/// Color of a station served by no known line
pub const FALLBACK_STATION_COLOR: RGB8 = RGB8 { r: 0x94, g: 0xa3, b: 0xb8 };

const DEFAULT_COLORS: &[(&str, RGB8)] = &[
    ("BLUE", RGB8 { r: 0x25, g: 0x63, b: 0xeb }),
    ("YELLOW", RGB8 { r: 0xfa, g: 0xcc, b: 0x15 }),
    ("RED", RGB8 { r: 0xef, g: 0x44, b: 0x44 }),
    ("GREEN", RGB8 { r: 0x22, g: 0xc5, b: 0x5e }),
    ("VIOLET", RGB8 { r: 0x8b, g: 0x5c, b: 0xf6 }),
    ("PINK", RGB8 { r: 0xec, g: 0x48, b: 0x99 }),
    ("MAGENTA", RGB8 { r: 0xd9, g: 0x46, b: 0xef }),
    ("AQUA", RGB8 { r: 0x06, g: 0xb6, b: 0xd4 }),
    ("ORANGE", RGB8 { r: 0xf9, g: 0x73, b: 0x16 }),
    ("ORANGE/AIRPORT", RGB8 { r: 0xf9, g: 0x73, b: 0x16 }),
    ("RAPID", RGB8 { r: 0x84, g: 0xcc, b: 0x16 }),
    ("GRAY", RGB8 { r: 0x9c, g: 0xa3, b: 0xaf }),
];

/// The line a route belongs to: the part of `route_long_name` before the first `_`, upper-cased
///
/// ```
/// assert_eq!(Some("BLUE".to_owned()), gtfs_network::lines::line_key("blue_Dwarka to Noida"));
/// assert_eq!(None, gtfs_network::lines::line_key(""));
/// assert_eq!(None, gtfs_network::lines::line_key("_Dwarka"));
/// ```
pub fn line_key(route_long_name: &str) -> Option<String> {
    route_long_name
        .split('_')
        .next()
        .filter(|prefix| !prefix.is_empty())
        .map(|prefix| prefix.to_uppercase())
}

/// Maps line keys to their color
#[derive(Debug, Clone)]
pub struct Palette {
    colors: HashMap<String, RGB8>,
}

impl Default for Palette {
    fn default() -> Self {
        Palette {
            colors: DEFAULT_COLORS
                .iter()
                .map(|(key, color)| (key.to_string(), *color))
                .collect(),
        }
    }
}

impl Palette {
    /// Adds or replaces colors, given as `#rrggbb`. Keys are upper-cased like [line_key] does
    pub fn with_overrides<'a>(
        mut self,
        overrides: impl IntoIterator<Item = (&'a String, &'a String)>,
    ) -> Result<Self, Error> {
        for (key, color) in overrides {
            self.colors.insert(key.to_uppercase(), parse_color(color)?);
        }
        Ok(self)
    }

    /// Color of a line key, if the palette knows it
    pub fn get(&self, key: &str) -> Option<RGB8> {
        self.colors.get(key).copied()
    }

    /// Color used to draw the polylines of a route
    ///
    /// The palette wins, then the `route_color` of the feed, then [FALLBACK_LINE_COLOR]
    pub fn route_color(&self, route: Option<&Route>) -> RGB8 {
        route
            .and_then(|r| {
                line_key(&r.long_name)
                    .and_then(|key| self.get(&key))
                    .or(r.route_color)
            })
            .unwrap_or(FALLBACK_LINE_COLOR)
    }

    /// Color of a station: the color of the first line serving it
    pub fn station_color(&self, lines: &[String]) -> RGB8 {
        lines
            .first()
            .and_then(|key| self.get(key))
            .unwrap_or(FALLBACK_STATION_COLOR)
    }

    /// Same as [Palette::route_color] formatted as `#rrggbb`
    pub fn route_css_color(&self, route: Option<&Route>) -> String {
        format_color(self.route_color(route))
    }
}
