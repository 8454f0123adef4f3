use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Theme {
    #[default]
    #[serde(rename = "theme-dark")]
    Dark,
    #[serde(rename = "theme-light")]
    Light,
}

impl Theme {
    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Dark => "theme-dark",
            Theme::Light => "theme-light",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Theme::Dark => "Dark Mode",
            Theme::Light => "Light Mode",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Theme::Dark => Theme::Light,
            Theme::Light => Theme::Dark,
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim() {
            "theme-dark" => Some(Theme::Dark),
            "theme-light" => Some(Theme::Light),
            _ => None,
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// CSS color strings used by the chart for one theme.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChartPalette {
    pub stroke_start: &'static str,
    pub stroke_mid: &'static str,
    pub stroke_end: &'static str,
    pub fill_top: &'static str,
    pub fill_mid: &'static str,
    pub fill_bottom: &'static str,
    pub grid: &'static str,
    pub label: &'static str,
    pub point: &'static str,
    pub point_stroke: &'static str,
    pub point_opacity: f64,
}

const DARK_PALETTE: ChartPalette = ChartPalette {
    stroke_start: "#c084fc",
    stroke_mid: "#8b5cf6",
    stroke_end: "#6366f1",
    fill_top: "rgba(192,132,252,0.32)",
    fill_mid: "rgba(139,92,246,0.18)",
    fill_bottom: "rgba(99,102,241,0.04)",
    grid: "rgba(255,255,255,0.06)",
    label: "rgba(255,255,255,0.30)",
    point: "#c084fc",
    point_stroke: "#fff",
    point_opacity: 0.9,
};

const LIGHT_PALETTE: ChartPalette = ChartPalette {
    stroke_start: "#8b5cf6",
    stroke_mid: "#7c3aed",
    stroke_end: "#4f46e5",
    fill_top: "rgba(139,92,246,0.22)",
    fill_mid: "rgba(99,102,241,0.12)",
    fill_bottom: "rgba(79,70,229,0.05)",
    grid: "rgba(0,0,0,0.09)",
    label: "rgba(0,0,0,0.55)",
    point: "#7c3aed",
    point_stroke: "#ffffff",
    point_opacity: 0.95,
};

impl ChartPalette {
    pub fn for_theme(theme: Theme) -> Self {
        match theme {
            Theme::Dark => DARK_PALETTE,
            Theme::Light => LIGHT_PALETTE,
        }
    }
}

/// Parses `#rgb`, `#rrggbb` and `rgba(r,g,b,a)` into an RGB triple, dropping
/// alpha.
pub fn css_rgb(color: &str) -> Option<(u8, u8, u8)> {
    let color = color.trim();
    if let Some(hex) = color.strip_prefix('#') {
        return match hex.len() {
            3 => {
                let mut channels = hex.chars().map(|c| c.to_digit(16).map(|d| (d * 17) as u8));
                Some((channels.next()??, channels.next()??, channels.next()??))
            }
            6 => {
                let channel = |idx: usize| u8::from_str_radix(hex.get(idx..idx + 2)?, 16).ok();
                Some((channel(0)?, channel(2)?, channel(4)?))
            }
            _ => None,
        };
    }
    let inner = color
        .strip_prefix("rgba(")
        .or_else(|| color.strip_prefix("rgb("))?
        .strip_suffix(')')?;
    let mut parts = inner.split(',').map(|part| part.trim().parse::<u8>().ok());
    Some((parts.next()??, parts.next()??, parts.next()??))
}
