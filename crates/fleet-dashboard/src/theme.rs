use fleet_core::palette::css_rgb;
use fleet_core::{ChartPalette, Theme};
use ratatui::style::{Color, Modifier, Style};

#[derive(Clone, Copy, Debug)]
pub struct DashTheme {
    pub bg: Color,
    pub surface: Color,
    pub border: Color,
    pub title: Color,
    pub text: Color,
    pub muted: Color,
    pub accent: Color,
    pub ok: Color,
    pub warn: Color,
    pub critical: Color,
    pub highlight_bg: Color,
    pub highlight_fg: Color,
    pub chart_line: Color,
    pub chart_fill: Color,
    pub chart_grid: Color,
    pub chart_label: Color,
    pub chart_point: Color,
}

fn css(color: &str, fallback: Color) -> Color {
    css_rgb(color)
        .map(|(r, g, b)| Color::Rgb(r, g, b))
        .unwrap_or(fallback)
}

pub fn dash_theme(theme: Theme) -> DashTheme {
    let palette = ChartPalette::for_theme(theme);
    match theme {
        Theme::Dark => DashTheme {
            bg: Color::Rgb(11, 18, 32),
            surface: Color::Rgb(17, 26, 46),
            border: Color::Rgb(71, 85, 105),
            title: Color::Rgb(191, 219, 254),
            text: Color::Rgb(226, 232, 240),
            muted: Color::Rgb(148, 163, 184),
            accent: Color::Rgb(56, 189, 248),
            ok: Color::Rgb(34, 197, 94),
            warn: Color::Rgb(245, 158, 11),
            critical: Color::Rgb(239, 68, 68),
            highlight_bg: Color::Rgb(250, 204, 21),
            highlight_fg: Color::Rgb(17, 24, 39),
            chart_line: css(palette.stroke_mid, Color::Magenta),
            chart_fill: css(palette.stroke_end, Color::Blue),
            chart_grid: Color::Rgb(51, 65, 85),
            chart_label: Color::Rgb(100, 116, 139),
            chart_point: css(palette.point, Color::Magenta),
        },
        Theme::Light => DashTheme {
            bg: Color::Rgb(248, 250, 252),
            surface: Color::Rgb(255, 255, 255),
            border: Color::Rgb(203, 213, 225),
            title: Color::Rgb(30, 41, 59),
            text: Color::Rgb(15, 23, 42),
            muted: Color::Rgb(100, 116, 139),
            accent: Color::Rgb(2, 132, 199),
            ok: Color::Rgb(22, 163, 74),
            warn: Color::Rgb(217, 119, 6),
            critical: Color::Rgb(220, 38, 38),
            highlight_bg: Color::Rgb(250, 204, 21),
            highlight_fg: Color::Rgb(17, 24, 39),
            chart_line: css(palette.stroke_mid, Color::Magenta),
            chart_fill: css(palette.stroke_start, Color::LightMagenta),
            chart_grid: Color::Rgb(226, 232, 240),
            chart_label: Color::Rgb(71, 85, 105),
            chart_point: css(palette.point, Color::Magenta),
        },
    }
}

impl DashTheme {
    pub fn base(&self) -> Style {
        Style::new().fg(self.text).bg(self.bg)
    }

    pub fn title_style(&self) -> Style {
        Style::new().fg(self.title).add_modifier(Modifier::BOLD)
    }

    pub fn status_style(&self, up: bool) -> Style {
        let color = if up { self.ok } else { self.critical };
        Style::new().fg(color).add_modifier(Modifier::BOLD)
    }

    pub fn match_style(&self) -> Style {
        Style::new()
            .fg(self.highlight_fg)
            .bg(self.highlight_bg)
            .add_modifier(Modifier::BOLD)
    }

    pub fn selected_style(&self) -> Style {
        Style::new()
            .bg(self.accent)
            .fg(self.bg)
            .add_modifier(Modifier::BOLD)
    }
}

pub mod icons {
    pub const UP: &str = "▲";
    pub const DOWN: &str = "▼";
    pub const ALERT: &str = "!";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chart_point_color_follows_palette() {
        assert_eq!(dash_theme(Theme::Dark).chart_point, Color::Rgb(192, 132, 252));
        assert_eq!(dash_theme(Theme::Light).chart_point, Color::Rgb(124, 58, 237));
    }
}
