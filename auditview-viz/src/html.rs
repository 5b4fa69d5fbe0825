//! HTML rendering.
//!
//! The screen layout mirrors the interactive report; the print layout is
//! what gets rasterized to PDF: A4 landscape, quarter-inch margins, status
//! badges reduced to a colored dot and capitalized text.

use auditview_core::panels::pie;
use auditview_core::stats::DayHealth;
use auditview_core::{format, Cell, GaugeCard, PieChart, StatusTone};
use chrono::{DateTime, Datelike, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

use crate::report::{Block, CalendarBlock, Card, Field, Report, Section, Stat, TableBlock};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HtmlLayout {
    #[default]
    Screen,
    Print,
}

const SCREEN_CSS: &str = "\
body { font-family: -apple-system, 'Segoe UI', Helvetica, Arial, sans-serif; color: #111827; margin: 2rem; }
h1 { margin-bottom: 0.25rem; }
h2 { border-bottom: 1px solid #e5e7eb; padding-bottom: 0.25rem; margin-top: 2rem; }
.meta { color: #6b7280; font-size: 0.85rem; }
.fields { display: grid; grid-template-columns: max-content 1fr; gap: 0.25rem 1rem; }
.fields dt { color: #6b7280; }
.stats, .cards, .charts { display: flex; flex-wrap: wrap; gap: 1rem; margin: 1rem 0; }
.stat, .card, .chart { border: 1px solid #e5e7eb; border-radius: 0.5rem; padding: 0.75rem 1rem; min-width: 10rem; }
.stat .value { font-size: 1.5rem; font-weight: 600; }
.stat .label, .stat .detail, .card .subtitle { color: #6b7280; font-size: 0.85rem; }
table { border-collapse: collapse; width: 100%; margin: 1rem 0; font-size: 0.9rem; }
th, td { text-align: left; padding: 0.4rem 0.6rem; border-bottom: 1px solid #e5e7eb; vertical-align: top; }
th { background: #f9fafb; }
td.empty { text-align: center; color: #6b7280; }
.badge { display: inline-block; padding: 0.1rem 0.5rem; border-radius: 9999px; font-size: 0.8rem; }
.dot { display: inline-block; width: 0.5rem; height: 0.5rem; border-radius: 50%; margin-right: 0.35rem; }
.legend { list-style: none; padding: 0; margin: 0.5rem 0 0; font-size: 0.85rem; }
.swatch { display: inline-block; width: 0.7rem; height: 0.7rem; margin-right: 0.35rem; }
";

const PRINT_CSS: &str = "\
@page { size: A4 landscape; margin: 0.25in; }
body { margin: 0; font-size: 10pt; }
section { break-inside: avoid-page; }
table { font-size: 8.5pt; }
tr { break-inside: avoid; }
";

#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlRenderer {
    layout: HtmlLayout,
}

impl HtmlRenderer {
    /// Create a new renderer for `layout`
    pub const fn new(layout: HtmlLayout) -> Self {
        Self { layout }
    }

    /// Render a complete HTML document
    pub fn render(&self, report: &Report) -> String {
        let mut html = String::from("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n");
        html.push_str(&format!("<title>{}</title>\n", escape(&report.title)));
        html.push_str("<style>\n");
        html.push_str(SCREEN_CSS);
        if self.layout == HtmlLayout::Print {
            html.push_str(PRINT_CSS);
        }
        html.push_str("</style>\n</head>\n");
        html.push_str(&format!(
            "<body class=\"{}\">\n",
            if self.layout == HtmlLayout::Print { "print" } else { "screen" }
        ));

        html.push_str(&format!("<h1>{}</h1>\n", escape(&report.title)));
        if let Some(description) = &report.description {
            html.push_str(&format!("<p>{}</p>\n", escape(description)));
        }
        html.push_str(&format!(
            "<p class=\"meta\">Generated {} from {}</p>\n",
            report.generated_at.format("%Y-%m-%d %H:%M UTC"),
            escape(&report.origin)
        ));

        for section in &report.sections {
            self.render_section(&mut html, section, report.generated_at);
        }

        html.push_str("</body>\n</html>\n");
        html
    }

    fn render_section(&self, html: &mut String, section: &Section, now: DateTime<Utc>) {
        html.push_str(&format!("<section id=\"{}\">\n", escape(&section.id)));
        html.push_str(&format!("<h2>{}</h2>\n", escape(&section.title)));

        for block in &section.blocks {
            match block {
                Block::Fields(fields) => self.render_fields(html, fields),
                Block::Stats(stats) => render_stats(html, stats),
                Block::Numbers(cards) => {
                    html.push_str("<div class=\"stats\">\n");
                    for card in cards {
                        html.push_str(&format!(
                            "<div class=\"stat\"><div class=\"label\">{}</div><div class=\"value\">{}{}</div></div>\n",
                            escape(&card.title),
                            escape(&card.value),
                            escape(card.unit.as_deref().unwrap_or_default())
                        ));
                    }
                    html.push_str("</div>\n");
                }
                Block::Breakdowns(tables) => {
                    for table in tables {
                        html.push_str(&format!("<h3>{}</h3>\n<table>\n", escape(&table.title)));
                        for entry in &table.entries {
                            html.push_str(&format!(
                                "<tr><th>{}</th><td>{}</td></tr>\n",
                                escape(&entry.label),
                                escape(&entry.value)
                            ));
                        }
                        html.push_str("</table>\n");
                    }
                }
                Block::Pies(pies) => {
                    html.push_str("<div class=\"charts\">\n");
                    for chart in pies.iter().filter(|chart| !chart.is_empty()) {
                        render_pie(html, chart);
                    }
                    html.push_str("</div>\n");
                }
                Block::Gauges(gauges) => {
                    html.push_str("<div class=\"charts\">\n");
                    for gauge in gauges {
                        render_gauge(html, gauge);
                    }
                    html.push_str("</div>\n");
                }
                Block::Cards(cards) => {
                    html.push_str("<div class=\"cards\">\n");
                    for card in cards {
                        render_card(html, card);
                    }
                    html.push_str("</div>\n");
                }
                Block::Calendar(calendar) => render_calendar(html, calendar),
                Block::Table(table) => self.render_table(html, table, now),
            }
        }

        html.push_str("</section>\n");
    }

    fn render_fields(&self, html: &mut String, fields: &[Field]) {
        html.push_str("<dl class=\"fields\">\n");
        for field in fields {
            let value = match field.tone {
                Some(tone) => self.badge(&field.value, tone),
                None => escape(&field.value),
            };
            html.push_str(&format!("<dt>{}</dt><dd>{value}</dd>\n", escape(&field.label)));
        }
        html.push_str("</dl>\n");
    }

    /// Pill on screen, dot and capitalized text in print
    fn badge(&self, text: &str, tone: StatusTone) -> String {
        match self.layout {
            HtmlLayout::Screen => format!(
                "<span class=\"badge badge-{}\" style=\"color:{};background:{}\">{}</span>",
                tone.as_str(),
                tone.hex(),
                tone.background_hex(),
                escape(text)
            ),
            HtmlLayout::Print => format!(
                "<span class=\"dot\" style=\"background:{}\"></span>{}",
                tone.hex(),
                escape(&format::capitalize(text))
            ),
        }
    }

    fn render_table(&self, html: &mut String, table: &TableBlock, now: DateTime<Utc>) {
        if let Some(title) = &table.title {
            html.push_str(&format!("<h3>{}</h3>\n", escape(title)));
        }
        html.push_str("<table>\n<thead><tr>");
        for (index, column) in table.model.columns.iter().enumerate() {
            let width = column.width();
            let style = if width.is_fill() {
                format!("min-width:{}px", width.min_px())
            } else {
                format!("width:{}px", width.min_px())
            };
            html.push_str(&format!(
                "<th data-key=\"{}\" style=\"{style}\">{}</th>",
                escape(&column.key),
                escape(&table.header(index))
            ));
        }
        html.push_str("</tr></thead>\n<tbody>\n");

        if table.model.is_empty() {
            html.push_str(&format!(
                "<tr><td class=\"empty\" colspan=\"{}\">{}</td></tr>\n",
                table.model.columns.len().max(1),
                TableBlock::placeholder()
            ));
        }
        for row in table.rows() {
            html.push_str("<tr>");
            for (index, column) in table.model.columns.iter().enumerate() {
                let cell = row.get(index).unwrap_or(&MISSING);
                let text = cell.display(now);
                let content = if column.badge && !cell.is_null() {
                    self.badge(&text, StatusTone::of(&text))
                } else {
                    escape(&text)
                };
                html.push_str(&format!("<td>{content}</td>"));
            }
            html.push_str("</tr>\n");
        }
        html.push_str("</tbody>\n</table>\n");
    }
}

static MISSING: Cell = Cell::Null;

fn render_stats(html: &mut String, stats: &[Stat]) {
    html.push_str("<div class=\"stats\">\n");
    for stat in stats {
        html.push_str(&format!(
            "<div class=\"stat\"><div class=\"label\">{}</div><div class=\"value\">{}</div>",
            escape(&stat.label),
            escape(&stat.value)
        ));
        if let Some(detail) = &stat.detail {
            html.push_str(&format!("<div class=\"detail\">{}</div>", escape(detail)));
        }
        html.push_str("</div>\n");
    }
    html.push_str("</div>\n");
}

fn render_card(html: &mut String, card: &Card) {
    html.push_str(&format!("<div class=\"card\"><strong>{}</strong>", escape(&card.title)));
    if let Some(subtitle) = &card.subtitle {
        html.push_str(&format!(" <span class=\"subtitle\">{}</span>", escape(subtitle)));
    }
    for field in &card.fields {
        html.push_str(&format!(
            "<div><span class=\"subtitle\">{}:</span> {}</div>",
            escape(&field.label),
            escape(&field.value)
        ));
    }
    if let Some(link) = &card.link {
        html.push_str(&format!(
            "<div><a href=\"{0}\" target=\"_blank\" rel=\"noopener\">{0}</a></div>",
            escape(link)
        ));
    }
    html.push_str("</div>\n");
}

/// Point on a circle of radius `r` around (`cx`, `cy`) at `fraction` of a
/// full turn, clockwise from twelve o'clock
fn pie_point(cx: f64, cy: f64, r: f64, fraction: f64) -> (f64, f64) {
    let angle = 2.0 * PI * fraction - PI / 2.0;
    (cx + r * angle.cos(), cy + r * angle.sin())
}

fn render_pie(html: &mut String, chart: &PieChart) {
    const R: f64 = 60.0;
    const C: f64 = 70.0;

    html.push_str(&format!("<div class=\"chart\"><h3>{}</h3>\n", escape(&chart.title)));
    html.push_str("<svg width=\"140\" height=\"140\" viewBox=\"0 0 140 140\">\n");

    let shares = pie::shares(&chart.slices);
    let mut start = 0.0;
    for (share, color) in shares.iter().zip(&chart.colors) {
        let fraction = share / 100.0;
        if fraction <= 0.0 {
            continue;
        }
        if fraction >= 1.0 {
            html.push_str(&format!(
                "<circle cx=\"{C}\" cy=\"{C}\" r=\"{R}\" fill=\"{}\"/>\n",
                escape(color)
            ));
            break;
        }
        let (x1, y1) = pie_point(C, C, R, start);
        let (x2, y2) = pie_point(C, C, R, start + fraction);
        let large_arc = u8::from(fraction > 0.5);
        html.push_str(&format!(
            "<path d=\"M{C} {C} L{x1:.2} {y1:.2} A{R} {R} 0 {large_arc} 1 {x2:.2} {y2:.2} Z\" fill=\"{}\"/>\n",
            escape(color)
        ));
        start += fraction;
    }
    html.push_str("</svg>\n<ul class=\"legend\">\n");

    for ((slice, color), share) in chart.slices.iter().zip(&chart.colors).zip(&shares) {
        html.push_str(&format!(
            "<li><span class=\"swatch\" style=\"background:{}\"></span>{}",
            escape(color),
            escape(&slice.label())
        ));
        if chart.show_labels {
            html.push_str(&format!(
                " {} ({share:.1}%)",
                escape(&format::format_number(slice.value))
            ));
        }
        html.push_str("</li>\n");
    }
    html.push_str("</ul></div>\n");
}

/// Point on the gauge's upper half circle at `percentage` from the left end
fn gauge_point(percentage: f64) -> (f64, f64) {
    let angle = PI * (1.0 - percentage / 100.0);
    (100.0 + 80.0 * angle.cos(), 100.0 - 80.0 * angle.sin())
}

fn gauge_arc(start: f64, end: f64, color: &str, width: u8, opacity: f64) -> String {
    let (x1, y1) = gauge_point(start);
    let (x2, y2) = gauge_point(end);
    format!(
        "<path d=\"M{x1:.2} {y1:.2} A80 80 0 0 1 {x2:.2} {y2:.2}\" fill=\"none\" stroke=\"{}\" stroke-width=\"{width}\" stroke-opacity=\"{opacity}\"/>\n",
        escape(color)
    )
}

fn render_gauge(html: &mut String, gauge: &GaugeCard) {
    html.push_str(&format!(
        "<div class=\"chart gauge\"><h3>{}</h3>\n<svg width=\"200\" height=\"120\" viewBox=\"0 0 200 120\">\n",
        escape(&gauge.title)
    ));
    if gauge.segments.is_empty() {
        html.push_str(&gauge_arc(0.0, 100.0, "#e5e7eb", 14, 1.0));
    }
    for segment in &gauge.segments {
        html.push_str(&gauge_arc(segment.start, segment.end, &segment.color, 14, 0.3));
    }
    if gauge.reading.percentage > 0.0 {
        html.push_str(&gauge_arc(0.0, gauge.reading.percentage, &gauge.reading.color, 14, 1.0));
    }
    html.push_str(&format!(
        "<text x=\"100\" y=\"95\" text-anchor=\"middle\" font-size=\"22\" fill=\"{}\">{}%</text>\n",
        escape(&gauge.reading.color),
        format::format_number(gauge.reading.percentage.round())
    ));
    html.push_str(&format!(
        "<text x=\"100\" y=\"115\" text-anchor=\"middle\" font-size=\"11\" fill=\"#6b7280\">{}</text>\n",
        escape(&gauge.label)
    ));
    html.push_str("</svg></div>\n");
}

const fn health_hex(health: DayHealth) -> &'static str {
    match health {
        DayHealth::AllSuccessful => "#10b981",
        DayHealth::MostlySuccessful => "#f97316",
        DayHealth::MostlyFailed => "#ef4444",
    }
}

fn render_calendar(html: &mut String, calendar: &CalendarBlock) {
    const CELL: i64 = 11;

    let grid_start =
        calendar.start - Duration::days(i64::from(calendar.start.weekday().num_days_from_monday()));
    let weeks = (calendar.end - grid_start).num_days() / 7 + 1;

    html.push_str("<div class=\"chart calendar\"><h3>Backup Calendar</h3>\n");
    html.push_str(&format!(
        "<svg width=\"{0}\" height=\"{1}\" viewBox=\"0 0 {0} {1}\">\n",
        weeks * CELL,
        7 * CELL
    ));
    let mut date = calendar.start;
    while date <= calendar.end {
        let offset = (date - grid_start).num_days();
        let (x, y) = ((offset / 7) * CELL, (offset % 7) * CELL);
        let (fill, title) = calendar.day(date).map_or_else(
            || ("#f3f4f6", format!("{date}: no backups")),
            |day| {
                (
                    health_hex(day.health()),
                    format!("{date}: {} successful, {} failed", day.successful, day.failed),
                )
            },
        );
        html.push_str(&format!(
            "<rect x=\"{x}\" y=\"{y}\" width=\"9\" height=\"9\" rx=\"2\" fill=\"{fill}\"><title>{title}</title></rect>\n"
        ));
        date += Duration::days(1);
    }
    html.push_str("</svg>\n<ul class=\"legend\">\n");
    for health in [
        DayHealth::AllSuccessful,
        DayHealth::MostlySuccessful,
        DayHealth::MostlyFailed,
    ] {
        html.push_str(&format!(
            "<li><span class=\"swatch\" style=\"background:{}\"></span>{}</li>\n",
            health_hex(health),
            health.label()
        ));
    }
    html.push_str("</ul></div>\n");
}

/// Escape text for HTML element content and quoted attributes
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use auditview_core::{GaugeConfig, GaugeReading, PaletteMode, PieSlice, TableColumn, TableModel, Threshold};
    use chrono::TimeZone;

    fn report(sections: Vec<Section>) -> Report {
        Report {
            title: "Billing <Service>".to_string(),
            description: None,
            generated_at: Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap(),
            origin: "test".to_string(),
            sections,
        }
    }

    #[test]
    fn test_escape() {
        assert_eq!(escape("<a href=\"x\">&'"), "&lt;a href=&quot;x&quot;&gt;&amp;&#39;");
    }

    #[test]
    fn test_print_layout_page_setup_and_badges() {
        let mut model = TableModel::new(vec![TableColumn::badge("Status", "status")]);
        model.push_row(vec![Cell::text(Some("failed"))]);
        let report = report(vec![Section::new("t", "T").with(Block::Table(TableBlock::new(model)))]);

        let print = HtmlRenderer::new(HtmlLayout::Print).render(&report);
        assert!(print.contains("size: A4 landscape; margin: 0.25in"));
        assert!(print.contains("<span class=\"dot\" style=\"background:#b91c1c\"></span>Failed"));
        assert!(print.contains("<title>Billing &lt;Service&gt;</title>"));

        let screen = HtmlRenderer::new(HtmlLayout::Screen).render(&report);
        assert!(!screen.contains("@page"));
        assert!(screen.contains("class=\"badge badge-red\""));
    }

    #[test]
    fn test_empty_table_spans_all_columns() {
        let model = TableModel::new(vec![
            TableColumn::new("Name", "name"),
            TableColumn::new("Description", "description"),
        ]);
        let report = report(vec![Section::new("t", "T").with(Block::Table(TableBlock::new(model)))]);
        let html = HtmlRenderer::default().render(&report);
        assert!(html.contains("<td class=\"empty\" colspan=\"2\">No data available</td>"));
        assert!(html.contains("style=\"min-width:200px\""));
        assert!(html.contains("style=\"width:160px\""));
    }

    #[test]
    fn test_gauge_and_pie_svg() {
        let config = GaugeConfig {
            min: 0.0,
            max: 100.0,
            thresholds: vec![Threshold::new(0.0, "#10b981"), Threshold::new(80.0, "#ef4444")],
        };
        let gauge = GaugeCard {
            title: "Load".to_string(),
            description: None,
            label: "Value".to_string(),
            value: 45.0,
            min: 0.0,
            max: 100.0,
            reading: GaugeReading {
                percentage: 45.0,
                color: "#10b981".to_string(),
            },
            segments: config.segments(),
        };
        let chart = PieChart::from_slices(
            "Split",
            vec![PieSlice::new("a", 1.0), PieSlice::new("b", 3.0)],
            PaletteMode::Cyclic,
        );
        let report = report(vec![Section::new("v", "V")
            .with(Block::Gauges(vec![gauge]))
            .with(Block::Pies(vec![chart]))]);

        let html = HtmlRenderer::default().render(&report);
        assert!(html.contains(">45%</text>"));
        assert_eq!(html.matches("<path d=\"M70 70").count(), 2);
        assert!(html.contains("stroke-opacity=\"0.3\""));
    }
}
