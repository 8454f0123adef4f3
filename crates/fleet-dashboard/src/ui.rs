use crate::state::{App, Focus};
use crate::theme::{dash_theme, icons, DashTheme};
use fleet_core::chart::{ChartModel, Tooltip, CHART_PAD_X};
use fleet_core::search::highlight_match;
use fleet_core::{DaemonId, DaemonRecord};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    symbols::Marker,
    text::{Line, Span, Text},
    widgets::{
        canvas::{Canvas, Line as CanvasLine, Points},
        Block, Borders, Cell, Clear, List, ListItem, Paragraph, Row, Table, TableState, Wrap,
    },
    Frame,
};

/// Curve samples per spline segment on the braille canvas.
const CURVE_STEPS: usize = 16;

pub fn render(f: &mut Frame, app: &mut App) {
    let theme = dash_theme(app.theme);
    let area = f.size();
    f.render_widget(Block::default().style(theme.base()), area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(8),
            Constraint::Length(1),
        ])
        .split(area);
    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
        .split(rows[1]);
    let right = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(8), Constraint::Length(8)])
        .split(body[1]);

    render_header(f, app, theme, rows[0]);
    render_table(f, app, theme, body[0]);
    render_chart_panel(f, app, theme, right[0]);
    render_notifications(f, app, theme, right[1]);
    render_footer(f, app, theme, rows[2]);

    if app.focus == Focus::Search {
        render_suggestions(f, app, theme, rows[0], rows[1]);
    }
    if app.show_help {
        render_help(f, theme);
    }
}

fn panel<'a>(title: impl Into<String>, theme: DashTheme, focused: bool) -> Block<'a> {
    let border = if focused { theme.accent } else { theme.border };
    Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border))
        .style(Style::default().bg(theme.bg))
        .title(Span::styled(title.into(), theme.title_style()))
}

fn highlighted_name(name: &str, query: &str, theme: DashTheme) -> Line<'static> {
    match highlight_match(name, query) {
        Some(spans) => Line::from(vec![
            Span::raw(spans.before.to_string()),
            Span::styled(spans.matched.to_string(), theme.match_style()),
            Span::raw(spans.after.to_string()),
        ]),
        None => Line::from(name.to_string()),
    }
}

fn render_header(f: &mut Frame, app: &App, theme: DashTheme, area: Rect) {
    let cursor = if app.focus == Focus::Search { "_" } else { "" };
    let mut spans = vec![
        Span::styled("Search: ", Style::default().fg(theme.muted)),
        Span::styled(
            format!("{}{cursor}", app.search.query()),
            Style::default().fg(theme.text),
        ),
    ];
    if app.search.is_settling() {
        spans.push(Span::styled("  …", Style::default().fg(theme.muted)));
    }
    spans.push(Span::raw("   "));
    spans.push(Span::styled(
        format!("Theme: {}", app.theme.label()),
        Style::default().fg(theme.muted),
    ));
    if app.store.has_changes() {
        spans.push(Span::raw("   "));
        spans.push(Span::styled(
            "● unsaved changes (s to save)",
            Style::default().fg(theme.warn).add_modifier(Modifier::BOLD),
        ));
    }
    let paragraph = Paragraph::new(Line::from(spans)).block(panel(
        "Fleet",
        theme,
        app.focus == Focus::Search,
    ));
    f.render_widget(paragraph, area);
}

fn render_suggestions(f: &mut Frame, app: &App, theme: DashTheme, header: Rect, below: Rect) {
    let suggestions = app.suggestions();
    if suggestions.is_empty() {
        return;
    }
    let height = (suggestions.len() as u16 + 2).min(below.height);
    let area = Rect::new(
        header.x + 9,
        below.y,
        header.width.saturating_sub(10).min(40),
        height,
    );
    let query = app.search.query();
    let items: Vec<ListItem> = suggestions
        .iter()
        .enumerate()
        .map(|(index, entry)| {
            let mut line = highlighted_name(&entry.daemon_name, query, theme);
            line.spans.push(Span::styled(
                format!("  {}", entry.daemon_status),
                theme.status_style(entry.daemon_status.is_up()),
            ));
            let item = ListItem::new(line);
            if app.suggestion_cursor == Some(index) {
                item.style(theme.selected_style())
            } else {
                item
            }
        })
        .collect();
    f.render_widget(Clear, area);
    f.render_widget(
        List::new(items)
            .style(Style::default().fg(theme.text).bg(theme.surface))
            .block(panel("Suggestions", theme, true)),
        area,
    );
}

fn render_table(f: &mut Frame, app: &App, theme: DashTheme, area: Rect) {
    let focused = app.focus == Focus::Grid;
    let visible = app.visible();
    let block = panel(format!("Daemons ({})", visible.len()), theme, focused);

    if let Some(banner) = app.banner() {
        let color = if app.loader.state().error().is_some() {
            theme.critical
        } else {
            theme.muted
        };
        f.render_widget(
            Paragraph::new(Span::styled(banner, Style::default().fg(color)))
                .wrap(Wrap { trim: true })
                .block(block),
            area,
        );
        return;
    }

    let query = app.search.applied_query();
    let editing_id = visible
        .get(app.selected)
        .filter(|_| app.editing)
        .map(|record| &record.daemon_id);
    let rows: Vec<Row> = visible
        .iter()
        .map(|record| daemon_row(app, record, editing_id, query, theme))
        .collect();
    let widths = [
        Constraint::Length(6),
        Constraint::Min(12),
        Constraint::Length(7),
        Constraint::Length(9),
        Constraint::Length(8),
    ];
    let table = Table::new(rows, widths)
        .header(
            Row::new(vec!["ID", "Name", "Status", "Instances", "Edit"])
                .style(Style::default().fg(theme.muted).add_modifier(Modifier::BOLD)),
        )
        .block(block)
        .highlight_style(theme.selected_style());
    let mut state = TableState::default();
    state.select(Some(app.selected));
    f.render_stateful_widget(table, area, &mut state);
}

fn daemon_row<'a>(
    app: &App,
    record: &DaemonRecord,
    editing_id: Option<&DaemonId>,
    query: &str,
    theme: DashTheme,
) -> Row<'a> {
    let up = record.daemon_status.is_up();
    let icon = if up { icons::UP } else { icons::DOWN };
    let pending = app.edits.get(&record.daemon_id).unwrap_or_default();
    let edit = if editing_id == Some(&record.daemon_id) {
        format!("[{pending}_]")
    } else if pending.is_empty() {
        String::new()
    } else {
        format!("[{pending}]")
    };
    Row::new(vec![
        Cell::from(record.daemon_id.to_string()),
        Cell::from(highlighted_name(&record.daemon_name, query, theme)),
        Cell::from(Span::styled(
            format!("{icon} {}", record.daemon_status),
            theme.status_style(up),
        )),
        Cell::from(record.instance.to_string()),
        Cell::from(Span::styled(edit, Style::default().fg(theme.warn))),
    ])
}

fn render_chart_panel(f: &mut Frame, app: &mut App, theme: DashTheme, area: Rect) {
    let block = panel(
        format!("Daemons: {}", app.visible().len()),
        theme,
        app.focus == Focus::Chart,
    );
    let inner = block.inner(area);
    f.render_widget(block, area);
    app.observe_chart_area(inner);

    let Some(chart) = app.chart() else {
        f.render_widget(
            Paragraph::new(Span::styled(
                "Need at least two daemons to draw a chart.",
                Style::default().fg(theme.muted),
            )),
            inner,
        );
        return;
    };
    render_canvas(f, &chart, theme, inner);
    if let Some(tooltip) = app.tooltip(&chart) {
        render_tooltip(f, &chart, &tooltip, theme, inner);
    }
}

fn render_canvas(f: &mut Frame, chart: &ChartModel, theme: DashTheme, area: Rect) {
    let width = chart.width();
    let height = chart.height();
    let flip = |y: f64| height - y;
    let curve = chart.sample_curve(CURVE_STEPS);
    let baseline = flip(chart.baseline_y());
    let canvas = Canvas::default()
        .background_color(theme.bg)
        .marker(Marker::Braille)
        .x_bounds([0.0, width])
        .y_bounds([0.0, height])
        .paint(move |ctx| {
            for grid in &chart.grid {
                ctx.draw(&CanvasLine {
                    x1: chart.scale.x(0.0),
                    y1: flip(grid.y),
                    x2: width - CHART_PAD_X,
                    y2: flip(grid.y),
                    color: theme.chart_grid,
                });
            }
            ctx.layer();
            for pair in curve.windows(2) {
                ctx.draw(&CanvasLine {
                    x1: pair[0].x,
                    y1: flip(pair[0].y),
                    x2: pair[0].x,
                    y2: baseline,
                    color: theme.chart_fill,
                });
            }
            ctx.layer();
            for pair in curve.windows(2) {
                ctx.draw(&CanvasLine {
                    x1: pair[0].x,
                    y1: flip(pair[0].y),
                    x2: pair[1].x,
                    y2: flip(pair[1].y),
                    color: theme.chart_line,
                });
            }
            let coords: Vec<(f64, f64)> = chart
                .points
                .iter()
                .map(|plotted| (plotted.at.x, flip(plotted.at.y)))
                .collect();
            ctx.draw(&Points {
                coords: &coords,
                color: theme.chart_point,
            });
            for grid in &chart.grid {
                ctx.print(
                    0.0,
                    flip(grid.y),
                    Span::styled(grid.label.to_string(), Style::default().fg(theme.chart_label)),
                );
            }
        });
    f.render_widget(canvas, area);
}

fn render_tooltip(f: &mut Frame, chart: &ChartModel, tooltip: &Tooltip, theme: DashTheme, area: Rect) {
    let cols_per_unit = f64::from(area.width) / chart.width();
    let rows_per_unit = f64::from(area.height) / chart.height();
    let body = format!("Instances: {}", tooltip.value);
    let text_width = tooltip.label.chars().count().max(body.chars().count()) as u16 + 2;
    let box_width = text_width.min(area.width);
    let box_height = 4u16.min(area.height);
    let left = (tooltip.placement.left * cols_per_unit).round().max(0.0) as u16;
    let top = (tooltip.placement.top * rows_per_unit).round().max(0.0) as u16;
    let x = area.x + left.min(area.width.saturating_sub(box_width));
    let y = area.y + top.min(area.height.saturating_sub(box_height));
    let rect = Rect::new(x, y, box_width, box_height);

    f.render_widget(Clear, rect);
    f.render_widget(
        Paragraph::new(Text::from(vec![
            Line::from(Span::styled(
                tooltip.label.clone(),
                Style::default().fg(theme.text).add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(body, Style::default().fg(theme.muted))),
        ]))
        .style(Style::default().bg(theme.surface))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(theme.chart_point)),
        ),
        rect,
    );
}

fn render_notifications(f: &mut Frame, app: &App, theme: DashTheme, area: Rect) {
    let items: Vec<ListItem> = app
        .notifications
        .live()
        .iter()
        .rev()
        .map(|event| {
            ListItem::new(Line::from(vec![
                Span::styled(
                    format!("{} ", icons::ALERT),
                    Style::default().fg(theme.critical).add_modifier(Modifier::BOLD),
                ),
                Span::styled(
                    format!("{} ", event.raised_at.format("%H:%M:%S")),
                    Style::default().fg(theme.muted),
                ),
                Span::styled(event.message.clone(), Style::default().fg(theme.text)),
            ]))
        })
        .collect();
    let title = format!("Alerts ({})", app.notifications.len());
    f.render_widget(List::new(items).block(panel(title, theme, false)), area);
}

fn render_footer(f: &mut Frame, app: &App, theme: DashTheme, area: Rect) {
    let text = match app.status_note.as_deref() {
        Some(note) => Span::styled(note.to_string(), Style::default().fg(theme.accent)),
        None => Span::styled(
            "/ search  j/k select  t toggle  0-9 edit  Enter apply  c chart  ? help  q quit",
            Style::default().fg(theme.muted),
        ),
    };
    f.render_widget(Paragraph::new(Line::from(text)), area);
}

fn render_help(f: &mut Frame, theme: DashTheme) {
    let area = centered_rect(60, 70, f.size());
    let section = |title: &'static str| {
        Line::from(Span::styled(
            title,
            Style::default().fg(theme.accent).add_modifier(Modifier::BOLD),
        ))
    };
    let lines = vec![
        section("Daemons"),
        Line::from("  j/k      select daemon"),
        Line::from("  t        toggle UP/DOWN"),
        Line::from("  0-9 / i  edit instance count"),
        Line::from("  Enter    apply pending instance count"),
        Line::from("  s        save local changes"),
        Line::from(""),
        section("Search"),
        Line::from("  /        focus search"),
        Line::from("  Up/Down  pick a suggestion"),
        Line::from("  Enter    apply suggestion or trimmed query"),
        Line::from("  Esc      leave search"),
        Line::from(""),
        section("Chart"),
        Line::from("  c        focus chart points"),
        Line::from("  h/l      previous/next point"),
        Line::from("  x        export chart as SVG"),
        Line::from(""),
        section("General"),
        Line::from("  T        toggle theme"),
        Line::from("  d        dismiss latest alert"),
        Line::from("  ? or F1  toggle this help"),
        Line::from("  q        quit"),
    ];
    f.render_widget(Clear, area);
    f.render_widget(
        Paragraph::new(Text::from(lines))
            .style(Style::default().fg(theme.text).bg(theme.surface))
            .block(panel("Help", theme, true))
            .wrap(Wrap { trim: false }),
        area,
    );
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100u16.saturating_sub(percent_y)) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100u16.saturating_sub(percent_y)) / 2),
        ])
        .split(area);
    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100u16.saturating_sub(percent_x)) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100u16.saturating_sub(percent_x)) / 2),
        ])
        .split(vertical[1])[1]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DashboardConfig;
    use crate::prefs::PreferenceStore;
    use chrono::{TimeZone, Utc};
    use ratatui::{backend::TestBackend, Terminal};
    use reqwest::Url;

    fn app_with(records: Vec<DaemonRecord>, dir: &tempfile::TempDir) -> App {
        let config = DashboardConfig {
            api_base: Url::parse("http://127.0.0.1:5000").expect("url"),
            state_dir: dir.path().to_path_buf(),
            log_stdout: false,
        };
        let prefs = PreferenceStore::new(config.preferences_path());
        let now = Utc.timestamp_millis_opt(1_760_000_000_000).single().expect("ts");
        let mut app = App::new(config, prefs, now);
        app.begin_load();
        app.finish_load(Ok(records));
        app
    }

    fn screen_text(terminal: &Terminal<TestBackend>) -> String {
        let buffer = terminal.backend().buffer();
        buffer
            .content()
            .chunks(buffer.area.width as usize)
            .map(|row| row.iter().map(|cell| cell.symbol()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn renders_table_and_chart_title() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut app = app_with(
            vec![
                DaemonRecord::new("1", "alpha", 3),
                DaemonRecord::new("2", "beta", 0),
            ],
            &dir,
        );
        let mut terminal = Terminal::new(TestBackend::new(120, 40)).expect("terminal");
        terminal.draw(|f| render(f, &mut app)).expect("draw");
        let text = screen_text(&terminal);
        assert!(text.contains("alpha"));
        assert!(text.contains("Daemons: 2"));
        assert!(app.chart_area.is_some());
    }

    #[test]
    fn edit_cursor_marks_only_the_selected_row() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut app = app_with(
            vec![
                DaemonRecord::new("1", "alpha", 3),
                DaemonRecord::new("2", "beta", 0),
            ],
            &dir,
        );
        app.edits.set(&DaemonId::from("1"), "7");
        app.edits.set(&DaemonId::from("2"), "4");
        app.selected = 1;
        app.editing = true;
        let mut terminal = Terminal::new(TestBackend::new(120, 40)).expect("terminal");
        terminal.draw(|f| render(f, &mut app)).expect("draw");
        let text = screen_text(&terminal);
        assert!(text.contains("[4_]"));
        assert!(text.contains("[7]"));
        assert!(!text.contains("[7_]"));
    }

    #[test]
    fn empty_filter_shows_message() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut app = app_with(Vec::new(), &dir);
        let mut terminal = Terminal::new(TestBackend::new(120, 40)).expect("terminal");
        terminal.draw(|f| render(f, &mut app)).expect("draw");
        let text = screen_text(&terminal);
        assert!(text.contains("No daemons match your search."));
        assert!(text.contains("Need at least two daemons"));
    }
}
