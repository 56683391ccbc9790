use ratatui::{
    Frame,
    layout::{Constraint, Flex, Layout, Rect},
    style::{Color, Style, Stylize},
    symbols::Marker,
    text::{Line, Text},
    widgets::{
        Bar, BarChart, BarGroup, Block, Clear, Paragraph, Wrap,
        canvas::{Canvas, Map, MapResolution, Points},
    },
};
use tracing::trace;

use crate::aggregate::HistogramBin;
use crate::model::UIData;
use crate::selection::DetailView;

const PALETTE: [Color; 8] = [
    Color::LightBlue,
    Color::LightRed,
    Color::LightGreen,
    Color::LightYellow,
    Color::LightMagenta,
    Color::LightCyan,
    Color::Blue,
    Color::Green,
];
const UNKNOWN_REGION_COLOR: Color = Color::Gray;

pub const STATUSLINE_HEIGHT: u16 = 1;
pub const DETAIL_HEIGHT: u16 = 7;

// Degrees added around the airports so marks do not sit on the border.
const MAP_MARGIN: f64 = 2.0;
// Largest distance (in cells) between a click and the mark it selects.
const CLICK_RADIUS: f64 = 2.0;

/// Where the map marks ended up on screen during the last draw.
#[derive(Debug, Default, Clone)]
pub struct MapGeometry {
    area: Rect,
    cells: Vec<(u16, u16)>, // Cell of each mark, indexed by mark position.
}

impl MapGeometry {
    pub fn new(area: Rect, x_bounds: [f64; 2], y_bounds: [f64; 2], coords: &[(f64, f64)]) -> Self {
        let x_span = (x_bounds[1] - x_bounds[0]).max(f64::EPSILON);
        let y_span = (y_bounds[1] - y_bounds[0]).max(f64::EPSILON);
        let width = area.width.saturating_sub(1) as f64;
        let height = area.height.saturating_sub(1) as f64;
        let cells = coords
            .iter()
            .map(|&(x, y)| {
                let col = ((x - x_bounds[0]) / x_span * width).round() as u16;
                let row = ((y_bounds[1] - y) / y_span * height).round() as u16;
                (area.x + col, area.y + row)
            })
            .collect();
        MapGeometry { area, cells }
    }

    /// Mark position closest to the clicked cell, if one is close enough.
    pub fn nearest_mark(&self, column: u16, row: u16) -> Option<usize> {
        let inside = column >= self.area.x
            && column < self.area.x + self.area.width
            && row >= self.area.y
            && row < self.area.y + self.area.height;
        if !inside {
            return None;
        }
        self.cells
            .iter()
            .enumerate()
            .map(|(position, &(c, r))| {
                // Terminal cells are about twice as high as wide.
                let dx = (c as f64 - column as f64) / 2.0;
                let dy = r as f64 - row as f64;
                (position, (dx * dx + dy * dy).sqrt())
            })
            .filter(|&(_, distance)| distance <= CLICK_RADIUS)
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(position, _)| position)
    }
}

#[derive(Debug, Default)]
pub struct DashboardUI {
    map_geometry: MapGeometry,
}

impl DashboardUI {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn map_geometry(&self) -> &MapGeometry {
        &self.map_geometry
    }

    pub fn draw(&mut self, uidata: &UIData, frame: &mut Frame) {
        let [title_area, charts_area, histogram_area, detail_area, status_area] =
            Layout::vertical([
                Constraint::Length(1),
                Constraint::Percentage(55),
                Constraint::Fill(1),
                Constraint::Length(DETAIL_HEIGHT),
                Constraint::Length(STATUSLINE_HEIGHT),
            ])
            .areas(frame.area());
        let [map_area, bar_area] =
            Layout::horizontal([Constraint::Percentage(55), Constraint::Fill(1)])
                .areas(charts_area);
        let [latitude_area, longitude_area] =
            Layout::horizontal([Constraint::Percentage(50), Constraint::Percentage(50)])
                .areas(histogram_area);

        frame.render_widget(
            Line::from(" US Airports Data Analysis Dashboard ".bold()).centered(),
            title_area,
        );
        self.draw_map(uidata, frame, map_area);
        draw_top_regions(uidata, frame, bar_area);
        draw_histogram(
            &uidata.views.latitude,
            " Airport Distribution by Latitude ",
            Color::LightBlue,
            frame,
            latitude_area,
        );
        draw_histogram(
            &uidata.views.longitude,
            " Airport Distribution by Longitude ",
            Color::LightGreen,
            frame,
            longitude_area,
        );
        draw_detail(uidata, frame, detail_area);
        draw_statusline(uidata, frame, status_area);

        if uidata.show_popup {
            draw_popup(&uidata.popup_message, frame);
        }
    }

    fn draw_map(&mut self, uidata: &UIData, frame: &mut Frame, area: Rect) {
        let title = match &uidata.map_filter {
            Some(region) => format!(" Airport Geographic Distribution [{region}] "),
            None => " Airport Geographic Distribution ".to_string(),
        };
        let block = Block::bordered().title(Line::from(title.bold()));
        let inner = block.inner(area);

        let coords: Vec<(f64, f64)> = uidata
            .map_rows
            .iter()
            .filter_map(|&row| uidata.dataset.get(row))
            .map(|r| (r.longitude, r.latitude))
            .collect();
        let (x_bounds, y_bounds) = map_bounds(&coords);

        // One layer of points per colour, in mark order.
        let mut layers: Vec<Vec<(f64, f64)>> = vec![Vec::new(); PALETTE.len() + 1];
        for (&row, &coord) in uidata.map_rows.iter().zip(coords.iter()) {
            let color_idx = uidata
                .dataset
                .get(row)
                .and_then(|r| r.region.as_ref())
                .and_then(|region| uidata.region_colors.get(region))
                .map(|idx| idx % PALETTE.len())
                .unwrap_or(PALETTE.len());
            layers[color_idx].push(coord);
        }
        let cursor = coords.get(uidata.map_cursor).copied();
        let selected = uidata
            .selected_row
            .and_then(|row| uidata.dataset.get(row))
            .filter(|r| r.has_coordinates())
            .map(|r| (r.longitude, r.latitude));

        let canvas = Canvas::default()
            .block(block)
            .marker(Marker::Braille)
            .x_bounds(x_bounds)
            .y_bounds(y_bounds)
            .paint(|ctx| {
                ctx.draw(&Map {
                    color: Color::DarkGray,
                    resolution: MapResolution::High,
                });
                ctx.layer();
                for (idx, points) in layers.iter().enumerate() {
                    let color = PALETTE.get(idx).copied().unwrap_or(UNKNOWN_REGION_COLOR);
                    ctx.draw(&Points {
                        coords: points,
                        color,
                    });
                }
                if let Some((x, y)) = cursor {
                    ctx.print(x, y, Line::styled("◆", Style::default().fg(Color::White)));
                }
                if let Some((x, y)) = selected {
                    ctx.print(x, y, Line::styled("✚", Style::default().fg(Color::Yellow)));
                }
            });
        frame.render_widget(canvas, area);

        self.map_geometry = MapGeometry::new(inner, x_bounds, y_bounds, &coords);
        trace!("Map drawn with {} marks into {:?}", coords.len(), inner);
    }
}

fn map_bounds(coords: &[(f64, f64)]) -> ([f64; 2], [f64; 2]) {
    if coords.is_empty() {
        return ([-180.0, 180.0], [-90.0, 90.0]);
    }
    let (mut x_min, mut x_max) = (f64::INFINITY, f64::NEG_INFINITY);
    let (mut y_min, mut y_max) = (f64::INFINITY, f64::NEG_INFINITY);
    for &(x, y) in coords {
        x_min = x_min.min(x);
        x_max = x_max.max(x);
        y_min = y_min.min(y);
        y_max = y_max.max(y);
    }
    (
        [
            (x_min - MAP_MARGIN).max(-180.0),
            (x_max + MAP_MARGIN).min(180.0),
        ],
        [
            (y_min - MAP_MARGIN).max(-90.0),
            (y_max + MAP_MARGIN).min(90.0),
        ],
    )
}

fn bar_width(area: Rect, bars: usize, gap: u16) -> u16 {
    if bars == 0 {
        return 1;
    }
    let inner = area.width.saturating_sub(2);
    (inner / bars as u16).saturating_sub(gap).max(1)
}

fn draw_top_regions(uidata: &UIData, frame: &mut Frame, area: Rect) {
    let regions = &uidata.views.top_regions;
    let bars: Vec<Bar> = regions
        .iter()
        .map(|c| {
            Bar::default()
                .value(c.count as u64)
                .label(Line::from(c.category.clone()))
                .style(Style::default().fg(Color::LightMagenta))
        })
        .collect();
    let title = format!(" Top {} States by Number of Airports ", uidata.top_n.get());
    let chart = BarChart::default()
        .block(Block::bordered().title(Line::from(title.bold())))
        .data(BarGroup::default().bars(&bars))
        .bar_width(bar_width(area, bars.len(), 1))
        .bar_gap(1);
    frame.render_widget(chart, area);
}

fn draw_histogram(
    bins: &[HistogramBin],
    title: &str,
    color: Color,
    frame: &mut Frame,
    area: Rect,
) {
    let bars: Vec<Bar> = bins
        .iter()
        .map(|b| {
            Bar::default()
                .value(b.count as u64)
                .label(Line::from(format!("{:.0}", b.lower)))
                .style(Style::default().fg(color))
        })
        .collect();
    let chart = BarChart::default()
        .block(Block::bordered().title(Line::from(title.bold())))
        .data(BarGroup::default().bars(&bars))
        .bar_width(bar_width(area, bars.len(), 0))
        .bar_gap(0);
    frame.render_widget(chart, area);
}

fn draw_detail(uidata: &UIData, frame: &mut Frame, area: Rect) {
    let block = Block::bordered().title(Line::from(" Airport Details ".bold()));
    let text = match &uidata.detail {
        DetailView::Prompt(prompt) => Text::from(Line::from(prompt.clone().italic())),
        DetailView::Record(summary) => {
            let mut lines = vec![Line::from(summary.title.clone().bold().yellow())];
            lines.extend(summary.lines.iter().map(|l| Line::from(l.clone())));
            Text::from(lines)
        }
    };
    frame.render_widget(
        Paragraph::new(text).block(block).wrap(Wrap { trim: true }),
        area,
    );
}

fn draw_statusline(uidata: &UIData, frame: &mut Frame, area: Rect) {
    let filter = uidata.map_filter.as_deref().unwrap_or("all");
    let line = Line::from(vec![
        format!(" {} ", uidata.name).bold().reversed(),
        format!(
            " map: {filter} ({}/{}) ",
            std::cmp::min(uidata.map_cursor + 1, uidata.map_rows.len()),
            uidata.map_rows.len()
        )
        .into(),
        format!(" top {} ", uidata.top_n.get()).into(),
        " ? ".blue().bold(),
        "help ".into(),
        uidata.status_message.clone().dim(),
    ]);
    frame.render_widget(line, area);
}

fn draw_popup(message: &str, frame: &mut Frame) {
    let lines = message.lines().count() as u16 + 2;
    let width = message.lines().map(|l| l.chars().count()).max().unwrap_or(0) as u16 + 4;
    let [area] = Layout::vertical([Constraint::Length(lines)])
        .flex(Flex::Center)
        .areas(frame.area());
    let [area] = Layout::horizontal([Constraint::Length(width)])
        .flex(Flex::Center)
        .areas(area);

    let block = Block::bordered().title(Line::from(" Help ".bold()).centered());
    frame.render_widget(Clear, area);
    frame.render_widget(Paragraph::new(message.to_string()).block(block), area);
}
