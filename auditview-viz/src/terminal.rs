//! Terminal rendering.
//!
//! A report becomes a flat list of ratatui [`Line`]s that the TUI scrolls
//! through and `auditview show` prints. Colors come straight from the hex
//! values the panels carry.

use auditview_core::panels::pie;
use auditview_core::stats::DayHealth;
use auditview_core::{format, Cell, ColumnWidth, GaugeCard, PieChart, StatusTone};
use chrono::{DateTime, Datelike, Duration, Utc};
use crossterm::style::{Color as AnsiColor, Stylize};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::report::{Block, CalendarBlock, Card, Field, Report, Section, Stat, TableBlock};

const PIE_BAR_WIDTH: usize = 40;
const GAUGE_BAR_WIDTH: usize = 30;
const COLUMN_GAP: &str = "  ";
const INDENT: &str = "  ";

static MISSING: Cell = Cell::Null;

/// Column under the cursor in the interactive view
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableFocus {
    pub table: usize,
    pub column: usize,
}

#[derive(Debug, Clone, Copy)]
pub struct TerminalRenderer {
    width: u16,
    print: bool,
}

impl TerminalRenderer {
    /// Create a new renderer for a terminal `width` columns wide
    pub const fn new(width: u16, print: bool) -> Self {
        Self { width, print }
    }

    /// Render the whole report
    pub fn lines(&self, report: &Report, focus: Option<TableFocus>) -> Vec<Line<'static>> {
        let mut lines = vec![
            Line::from(Span::styled(
                report.title.clone(),
                Style::default().add_modifier(Modifier::BOLD),
            )),
        ];
        if let Some(description) = &report.description {
            lines.push(Line::from(Span::raw(description.clone())));
        }
        lines.push(Line::from(Span::styled(
            format!(
                "Generated {} from {}",
                report.generated_at.format("%Y-%m-%d %H:%M:%S UTC"),
                report.origin
            ),
            dim(),
        )));

        let mut table_index = 0;
        for section in &report.sections {
            lines.push(Line::default());
            self.render_section(&mut lines, section, report.generated_at, focus, &mut table_index);
        }
        lines
    }

    fn render_section(
        &self,
        lines: &mut Vec<Line<'static>>,
        section: &Section,
        now: DateTime<Utc>,
        focus: Option<TableFocus>,
        table_index: &mut usize,
    ) {
        lines.push(Line::from(Span::styled(
            format!("━━ {} ━━", section.title),
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        )));

        for block in &section.blocks {
            match block {
                Block::Fields(fields) => self.render_fields(lines, fields),
                Block::Stats(stats) => render_stats(lines, stats),
                Block::Numbers(cards) => {
                    for card in cards {
                        let unit = card.unit.as_deref().unwrap_or_default();
                        lines.push(Line::from(vec![
                            Span::styled(format!("{INDENT}{}: ", card.title), dim()),
                            Span::styled(
                                format!("{}{unit}", card.value),
                                Style::default().add_modifier(Modifier::BOLD),
                            ),
                        ]));
                    }
                }
                Block::Breakdowns(tables) => {
                    for table in tables {
                        lines.push(Line::from(Span::styled(format!("{INDENT}{}", table.title), dim())));
                        for entry in &table.entries {
                            lines.push(Line::from(format!("{INDENT}{INDENT}{}: {}", entry.label, entry.value)));
                        }
                    }
                }
                Block::Pies(pies) => {
                    for chart in pies.iter().filter(|chart| !chart.is_empty()) {
                        render_pie(lines, chart);
                    }
                }
                Block::Gauges(gauges) => {
                    for gauge in gauges {
                        lines.push(render_gauge(gauge));
                    }
                }
                Block::Cards(cards) => {
                    for card in cards {
                        self.render_card(lines, card);
                    }
                }
                Block::Calendar(calendar) => render_calendar(lines, calendar),
                Block::Table(table) => {
                    let focused = focus
                        .filter(|f| f.table == *table_index)
                        .map(|f| f.column);
                    self.render_table(lines, table, now, focused);
                    *table_index += 1;
                }
            }
        }
    }

    fn render_fields(&self, lines: &mut Vec<Line<'static>>, fields: &[Field]) {
        let label_width = fields.iter().map(|f| f.label.width()).max().unwrap_or(0);
        for field in fields {
            let mut spans = vec![Span::styled(
                format!("{INDENT}{:<label_width$}  ", field.label),
                dim(),
            )];
            match field.tone {
                Some(tone) => spans.extend(self.badge(&field.value, tone)),
                None => spans.push(Span::raw(field.value.clone())),
            }
            lines.push(Line::from(spans));
        }
    }

    fn render_card(&self, lines: &mut Vec<Line<'static>>, card: &Card) {
        let mut title = vec![Span::styled(
            format!("{INDENT}▸ {}", card.title),
            Style::default().add_modifier(Modifier::BOLD),
        )];
        if let Some(subtitle) = &card.subtitle {
            title.push(Span::styled(format!(" ({subtitle})"), dim()));
        }
        lines.push(Line::from(title));
        for field in &card.fields {
            lines.push(Line::from(vec![
                Span::styled(format!("{INDENT}{INDENT}{}: ", field.label), dim()),
                Span::raw(field.value.clone()),
            ]));
        }
        if let Some(link) = &card.link {
            lines.push(Line::from(Span::styled(
                format!("{INDENT}{INDENT}{link}"),
                Style::default().fg(Color::Blue).add_modifier(Modifier::UNDERLINED),
            )));
        }
    }

    /// Status badge: filled pill on screen, colored dot and text in print
    fn badge(&self, text: &str, tone: StatusTone) -> Vec<Span<'static>> {
        if self.print {
            vec![
                Span::styled("● ".to_string(), Style::default().fg(hex_color(tone.hex()))),
                Span::raw(format::capitalize(text)),
            ]
        } else {
            vec![Span::styled(
                format!(" {text} "),
                Style::default()
                    .fg(hex_color(tone.hex()))
                    .bg(hex_color(tone.background_hex())),
            )]
        }
    }

    /// Character widths per column; the fill column takes what is left
    fn column_widths(&self, table: &TableBlock) -> Vec<usize> {
        let widths: Vec<ColumnWidth> = table.model.columns.iter().map(|c| c.width()).collect();
        let fixed: usize = widths
            .iter()
            .filter(|w| !w.is_fill())
            .map(|w| usize::from(w.min_chars()))
            .sum();
        let gaps = COLUMN_GAP.len() * widths.len().saturating_sub(1) + INDENT.len();
        let remaining = usize::from(self.width).saturating_sub(fixed + gaps);

        widths
            .iter()
            .map(|w| {
                let min = usize::from(w.min_chars());
                if w.is_fill() {
                    remaining.max(min)
                } else {
                    min
                }
            })
            .collect()
    }

    fn render_table(
        &self,
        lines: &mut Vec<Line<'static>>,
        table: &TableBlock,
        now: DateTime<Utc>,
        focused: Option<usize>,
    ) {
        if let Some(title) = &table.title {
            lines.push(Line::from(Span::styled(format!("{INDENT}{title}"), dim())));
        }

        let widths = self.column_widths(table);
        let mut header = vec![Span::raw(INDENT.to_string())];
        for (index, width) in widths.iter().enumerate() {
            if index > 0 {
                header.push(Span::raw(COLUMN_GAP.to_string()));
            }
            let mut style = Style::default().add_modifier(Modifier::BOLD);
            if focused == Some(index) {
                style = style.add_modifier(Modifier::REVERSED);
            }
            header.push(Span::styled(fit(&table.header(index), *width), style));
        }
        lines.push(Line::from(header));

        if table.model.is_empty() {
            lines.push(Line::from(Span::styled(
                format!("{INDENT}{}", TableBlock::placeholder()),
                dim(),
            )));
            return;
        }

        for row in table.rows() {
            let mut spans = vec![Span::raw(INDENT.to_string())];
            for (index, (column, width)) in table.model.columns.iter().zip(&widths).enumerate() {
                if index > 0 {
                    spans.push(Span::raw(COLUMN_GAP.to_string()));
                }
                let cell = row.get(index).unwrap_or(&MISSING);
                let text = cell.display(now);
                if column.badge && !cell.is_null() {
                    let badge = self.badge(&text, StatusTone::of(&text));
                    let used: usize = badge.iter().map(|s| s.content.width()).sum();
                    spans.extend(badge);
                    spans.push(Span::raw(" ".repeat(width.saturating_sub(used))));
                } else {
                    spans.push(Span::raw(fit(&text, *width)));
                }
            }
            lines.push(Line::from(spans));
        }
    }
}

fn dim() -> Style {
    Style::default().fg(Color::DarkGray)
}

fn render_stats(lines: &mut Vec<Line<'static>>, stats: &[Stat]) {
    for stat in stats {
        let mut spans = vec![
            Span::styled(format!("{INDENT}{}: ", stat.label), dim()),
            Span::styled(stat.value.clone(), Style::default().add_modifier(Modifier::BOLD)),
        ];
        if let Some(detail) = &stat.detail {
            spans.push(Span::styled(format!("  ({detail})"), dim()));
        }
        lines.push(Line::from(spans));
    }
}

fn render_pie(lines: &mut Vec<Line<'static>>, chart: &PieChart) {
    lines.push(Line::from(Span::styled(format!("{INDENT}{}", chart.title), dim())));

    let shares = pie::shares(&chart.slices);
    let mut bar = vec![Span::raw(INDENT.to_string())];
    let mut drawn = 0;
    for (index, share) in shares.iter().enumerate() {
        let cells = if index + 1 == shares.len() && *share > 0.0 {
            PIE_BAR_WIDTH.saturating_sub(drawn)
        } else {
            ((share / 100.0) * PIE_BAR_WIDTH as f64).round() as usize
        };
        drawn += cells;
        bar.push(Span::styled(
            "█".repeat(cells),
            Style::default().fg(chart.colors.get(index).map_or(Color::Reset, |c| hex_color(c))),
        ));
    }
    lines.push(Line::from(bar));

    for ((slice, color), share) in chart.slices.iter().zip(&chart.colors).zip(&shares) {
        let mut spans = vec![
            Span::raw(INDENT.to_string()),
            Span::styled("■ ".to_string(), Style::default().fg(hex_color(color))),
            Span::raw(slice.label()),
        ];
        if chart.show_labels {
            spans.push(Span::styled(
                format!("  {} ({share:.1}%)", format::format_number(slice.value)),
                dim(),
            ));
        }
        lines.push(Line::from(spans));
    }
}

fn render_gauge(gauge: &GaugeCard) -> Line<'static> {
    let filled = ((gauge.reading.percentage / 100.0) * GAUGE_BAR_WIDTH as f64).round() as usize;
    let color = hex_color(&gauge.reading.color);
    Line::from(vec![
        Span::styled(format!("{INDENT}{} ({}) ", gauge.title, gauge.label), dim()),
        Span::styled("█".repeat(filled), Style::default().fg(color)),
        Span::styled(
            "░".repeat(GAUGE_BAR_WIDTH.saturating_sub(filled)),
            Style::default().fg(Color::DarkGray),
        ),
        Span::styled(
            format!(" {}%", format::format_number(gauge.reading.percentage.round())),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        ),
    ])
}

fn health_color(health: DayHealth) -> Color {
    match health {
        DayHealth::AllSuccessful => hex_color("#10b981"),
        DayHealth::MostlySuccessful => hex_color("#f97316"),
        DayHealth::MostlyFailed => hex_color("#ef4444"),
    }
}

/// Weekday rows by week columns, oldest week on the left
fn render_calendar(lines: &mut Vec<Line<'static>>, calendar: &CalendarBlock) {
    let grid_start =
        calendar.start - Duration::days(i64::from(calendar.start.weekday().num_days_from_monday()));
    let weeks = (calendar.end - grid_start).num_days() / 7 + 1;

    for weekday in 0..7 {
        let mut spans = vec![Span::raw(INDENT.to_string())];
        for week in 0..weeks {
            let date = grid_start + Duration::days(week * 7 + weekday);
            let span = if date < calendar.start || date > calendar.end {
                Span::raw(" ")
            } else {
                match calendar.day(date) {
                    Some(day) => Span::styled("■", Style::default().fg(health_color(day.health()))),
                    None => Span::styled("·", Style::default().fg(Color::DarkGray)),
                }
            };
            spans.push(span);
        }
        lines.push(Line::from(spans));
    }

    let mut legend = vec![Span::raw(INDENT.to_string())];
    for health in [
        DayHealth::AllSuccessful,
        DayHealth::MostlySuccessful,
        DayHealth::MostlyFailed,
    ] {
        let count = calendar.days.iter().filter(|d| d.health() == health).count();
        legend.push(Span::styled("■ ".to_string(), Style::default().fg(health_color(health))));
        legend.push(Span::styled(format!("{} ({count})  ", health.label()), dim()));
    }
    lines.push(Line::from(legend));
}

/// Pad or truncate `text` to exactly `width` display columns
pub fn fit(text: &str, width: usize) -> String {
    let text = text.replace('\n', " ");
    if text.width() <= width {
        let padding = width - text.width();
        return format!("{text}{}", " ".repeat(padding));
    }

    let mut out = String::new();
    let mut used = 0;
    for ch in text.chars() {
        let w = ch.width().unwrap_or(0);
        if used + w + 1 > width {
            break;
        }
        out.push(ch);
        used += w;
    }
    if width > 0 {
        out.push('…');
        used += 1;
    }
    out.push_str(&" ".repeat(width.saturating_sub(used)));
    out
}

/// `#rrggbb` to an RGB terminal color; anything else resets
pub fn hex_color(hex: &str) -> Color {
    let digits = hex.trim_start_matches('#');
    if digits.len() != 6 {
        return Color::Reset;
    }
    let channel = |range: std::ops::Range<usize>| {
        digits.get(range).and_then(|s| u8::from_str_radix(s, 16).ok())
    };
    match (channel(0..2), channel(2..4), channel(4..6)) {
        (Some(r), Some(g), Some(b)) => Color::Rgb(r, g, b),
        _ => Color::Reset,
    }
}

/// Lines as plain text, styling dropped
pub fn plain_text(lines: &[Line<'_>]) -> String {
    let mut out = String::new();
    for line in lines {
        for span in &line.spans {
            out.push_str(&span.content);
        }
        out.push('\n');
    }
    out
}

fn ansi_color(color: Color) -> Option<AnsiColor> {
    match color {
        Color::Rgb(r, g, b) => Some(AnsiColor::Rgb { r, g, b }),
        Color::Black => Some(AnsiColor::Black),
        Color::Red => Some(AnsiColor::DarkRed),
        Color::Green => Some(AnsiColor::DarkGreen),
        Color::Yellow => Some(AnsiColor::DarkYellow),
        Color::Blue => Some(AnsiColor::DarkBlue),
        Color::Magenta => Some(AnsiColor::DarkMagenta),
        Color::Cyan => Some(AnsiColor::DarkCyan),
        Color::Gray => Some(AnsiColor::Grey),
        Color::DarkGray => Some(AnsiColor::DarkGrey),
        Color::White => Some(AnsiColor::White),
        _ => None,
    }
}

/// Lines as text with ANSI escape sequences, for printing to a terminal
pub fn ansi_text(lines: &[Line<'_>]) -> String {
    let mut out = String::new();
    for line in lines {
        for span in &line.spans {
            let mut styled = span.content.to_string().stylize();
            if let Some(fg) = span.style.fg.and_then(ansi_color) {
                styled = styled.with(fg);
            }
            if let Some(bg) = span.style.bg.and_then(ansi_color) {
                styled = styled.on(bg);
            }
            let modifiers = span.style.add_modifier;
            if modifiers.contains(Modifier::BOLD) {
                styled = styled.bold();
            }
            if modifiers.contains(Modifier::UNDERLINED) {
                styled = styled.underlined();
            }
            if modifiers.contains(Modifier::REVERSED) {
                styled = styled.reverse();
            }
            out.push_str(&styled.to_string());
        }
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use auditview_core::{TableColumn, TableModel};
    use chrono::TimeZone;

    fn report(sections: Vec<Section>) -> Report {
        Report {
            title: "Billing - Web".to_string(),
            description: None,
            generated_at: Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap(),
            origin: "test".to_string(),
            sections,
        }
    }

    #[test]
    fn test_hex_color() {
        assert_eq!(hex_color("#10b981"), Color::Rgb(0x10, 0xb9, 0x81));
        assert_eq!(hex_color("red"), Color::Reset);
        assert_eq!(hex_color("#zzzzzz"), Color::Reset);
    }

    #[test]
    fn test_fit() {
        assert_eq!(fit("abc", 5), "abc  ");
        assert_eq!(fit("abcdef", 4), "abc…");
        assert_eq!(fit("日本語", 4), "日… ");
        assert_eq!(fit("abc", 0), "");
    }

    #[test]
    fn test_empty_table_placeholder() {
        let table = TableBlock::new(TableModel::new(vec![TableColumn::new("Name", "name")]));
        let report = report(vec![Section::new("t", "Things").with(Block::Table(table))]);
        let text = plain_text(&TerminalRenderer::new(80, false).lines(&report, None));
        assert!(text.contains("━━ Things ━━"));
        assert!(text.contains("No data available"));
    }

    #[test]
    fn test_print_badges_use_dot_and_capitalized_text() {
        let report = report(vec![
            Section::new("s", "Status").with(Block::Fields(vec![Field::status("State", "resolved")]))
        ]);
        let screen = plain_text(&TerminalRenderer::new(80, false).lines(&report, None));
        let print = plain_text(&TerminalRenderer::new(80, true).lines(&report, None));
        assert!(screen.contains(" resolved "));
        assert!(print.contains("● Resolved"));
    }

    #[test]
    fn test_sorted_header_and_row_order() {
        let mut model = TableModel::new(vec![TableColumn::new("Name", "name")]);
        model.push_row(vec![Cell::text(Some("zeta"))]);
        model.push_row(vec![Cell::text(Some("alpha"))]);
        let mut table = TableBlock::new(model);
        table.request_sort(0);

        let report = report(vec![Section::new("t", "T").with(Block::Table(table))]);
        let text = plain_text(&TerminalRenderer::new(80, false).lines(&report, None));
        assert!(text.contains("Name ▲"));
        let alpha = text.find("alpha").unwrap();
        let zeta = text.find("zeta").unwrap();
        assert!(alpha < zeta);
    }

    #[test]
    fn test_ansi_text_carries_rgb() {
        let lines = vec![Line::from(Span::styled(
            "x".to_string(),
            Style::default().fg(Color::Rgb(1, 2, 3)),
        ))];
        assert!(ansi_text(&lines).contains("38;2;1;2;3"));
        assert_eq!(plain_text(&lines), "x\n");
    }
}
