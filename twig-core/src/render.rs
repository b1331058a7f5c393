//! Fixed-width table rendering for branch listings
//!
//! Every column is a whole number of 8-column units. Content that does not
//! fit is cut short and ends in `...`; shorter content is left-aligned and
//! padded with spaces.

use serde::{Deserialize, Serialize};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::catalog::{BranchCatalog, FilterCriteria};
use crate::gateway::RepositoryGateway;
use crate::Result;

/// Characters per column unit
pub const UNIT_WIDTH: usize = 8;

const OMISSION: &str = "...";
const PLACEHOLDER: &str = "-";
const CURRENT_MARKER: &str = "* ";
const OTHER_MARKER: &str = "  ";
const BRANCH_HEADER: &str = "  branch";
const BRANCH_UNDERLINE: &str = "  ------";

const ESCAPE_RESET: &str = "\x1b[0m";

/// ANSI foreground colors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Color {
    Black,
    Red,
    Green,
    Yellow,
    Blue,
    Purple,
    Cyan,
    White,
}

impl Color {
    pub fn code(self) -> u8 {
        match self {
            Color::Black => 30,
            Color::Red => 31,
            Color::Green => 32,
            Color::Yellow => 33,
            Color::Blue => 34,
            Color::Purple => 35,
            Color::Cyan => 36,
            Color::White => 37,
        }
    }
}

/// Font weight
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Weight {
    #[default]
    Normal,
    Bold,
}

impl Weight {
    pub fn code(self) -> u8 {
        match self {
            Weight::Normal => 0,
            Weight::Bold => 1,
        }
    }
}

/// Color and weight applied to a piece of text
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Style {
    pub color: Option<Color>,
    pub weight: Weight,
}

impl Style {
    /// No escape codes at all
    pub fn plain() -> Self {
        Self::default()
    }

    pub fn color(color: Color) -> Self {
        Self {
            color: Some(color),
            weight: Weight::Normal,
        }
    }

    pub fn bold() -> Self {
        Self {
            color: None,
            weight: Weight::Bold,
        }
    }

    fn is_plain(&self) -> bool {
        self.color.is_none() && self.weight == Weight::Normal
    }
}

/// Wrap `text` in the escape sequence for `style`
pub fn paint(text: &str, style: Style) -> String {
    if style.is_plain() {
        return text.to_string();
    }

    let mut codes = Vec::with_capacity(2);
    if let Some(color) = style.color {
        codes.push(color.code().to_string());
    }
    if style.weight == Weight::Bold {
        codes.push(style.weight.code().to_string());
    }

    format!("\x1b[{}m{}{}", codes.join(";"), text, ESCAPE_RESET)
}

/// Fit `text` into exactly `width` terminal columns
///
/// Longer text keeps its leading characters and ends in `...`. Widths below
/// the length of the omission marker get a cut-down marker. A double-width
/// character that would straddle the edge is dropped and the gap padded.
pub fn fit_width(text: &str, width: usize) -> String {
    if text.width() <= width {
        return pad_to(text.to_string(), width);
    }
    if width < OMISSION.len() {
        return OMISSION[..width].to_string();
    }

    let budget = width - OMISSION.len();
    let mut fitted = String::with_capacity(width);
    let mut used = 0;
    for c in text.chars() {
        let w = c.width().unwrap_or(0);
        if used + w > budget {
            break;
        }
        fitted.push(c);
        used += w;
    }
    fitted.push_str(OMISSION);
    pad_to(fitted, width)
}

fn pad_to(mut text: String, width: usize) -> String {
    let fill = width.saturating_sub(text.width());
    text.push_str(&" ".repeat(fill));
    text
}

/// Column widths, in units, and the header style
#[derive(Debug, Clone, Copy)]
pub struct Layout {
    pub unit_width: usize,
    pub recency_units: usize,
    pub property_units: usize,
    pub branch_units: usize,
    pub header_style: Style,
}

impl Default for Layout {
    fn default() -> Self {
        Self {
            unit_width: UNIT_WIDTH,
            recency_units: 5,
            property_units: 2,
            branch_units: 1,
            header_style: Style::color(Color::Blue),
        }
    }
}

/// Turns a branch catalog into the listing text
#[derive(Debug, Clone, Default)]
pub struct TableRenderer {
    layout: Layout,
}

impl TableRenderer {
    pub fn new(layout: Layout) -> Self {
        Self { layout }
    }

    /// `text` fitted into `units` column units and styled
    pub fn column(&self, text: &str, units: usize, style: Style) -> String {
        paint(&fit_width(text, units * self.layout.unit_width), style)
    }

    fn header(&self, properties: &[String]) -> String {
        let layout = &self.layout;
        let blank = self.column(" ", layout.recency_units, Style::plain());

        let mut labels = blank.clone();
        let mut underlines = blank;
        for property in properties {
            let underline = "-".repeat(property.width());
            labels.push_str(&self.column(property, layout.property_units, layout.header_style));
            underlines.push_str(&self.column(&underline, layout.property_units, layout.header_style));
        }
        labels.push_str(&self.column(BRANCH_HEADER, layout.branch_units, layout.header_style));
        underlines.push_str(&self.column(BRANCH_UNDERLINE, layout.branch_units, layout.header_style));

        format!("{}\n{}\n", labels, underlines)
    }

    /// Render the listing for every branch in `catalog` that passes `criteria`
    ///
    /// Rows are ordered most recent first and the row for `current_branch`
    /// is drawn in bold.
    pub fn render<G: RepositoryGateway>(
        &self,
        catalog: &mut BranchCatalog<G>,
        criteria: &FilterCriteria,
        current_branch: Option<&str>,
    ) -> Result<String> {
        let properties = catalog.properties()?;
        let now = catalog.now();
        let layout = &self.layout;

        let mut lines = Vec::new();
        for branch in catalog.list_branches(criteria)? {
            let recency = catalog.recency(criteria, &branch)?;
            if criteria.is_too_old(&recency, now) {
                tracing::trace!(branch = %branch, "skipping branch past max age");
                continue;
            }

            let mut line = self.column(&recency.to_string(), layout.recency_units, Style::plain());
            for property in &properties {
                let value = catalog.property_value(&branch, property)?;
                let value = if value.trim().is_empty() {
                    PLACEHOLDER
                } else {
                    value.as_str()
                };
                line.push_str(&self.column(value, layout.property_units, Style::plain()));
            }

            let is_current = current_branch == Some(branch.as_str());
            line.push_str(if is_current { CURRENT_MARKER } else { OTHER_MARKER });
            line.push_str(&branch);
            lines.push(line);
        }

        // Lines start with the zero-padded commit time, so this puts the
        // most recently active branches first
        lines.sort();
        lines.reverse();

        if let Some(current) = current_branch {
            let suffix = format!("{}{}", CURRENT_MARKER, current);
            if let Some(line) = lines.iter_mut().find(|line| line.ends_with(&suffix)) {
                *line = paint(line, Style::bold());
            }
        }

        tracing::debug!(rows = lines.len(), columns = properties.len(), "rendered listing");

        let mut out = String::from("\n");
        out.push_str(&self.header(&properties));
        out.push_str(&lines.join("\n"));
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::CatalogConfig;
    use crate::gateway::MemoryGateway;
    use chrono::{DateTime, Duration, FixedOffset, TimeZone, Utc};
    use pretty_assertions::assert_eq;
    use regex::Regex;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap()
    }

    fn ago(duration: Duration) -> DateTime<FixedOffset> {
        (now() - duration).fixed_offset()
    }

    fn render(gateway: MemoryGateway, criteria: &FilterCriteria, current: Option<&str>) -> String {
        let mut catalog = BranchCatalog::new(gateway, CatalogConfig::default(), now());
        TableRenderer::default()
            .render(&mut catalog, criteria, current)
            .unwrap()
    }

    fn blue(text: &str) -> String {
        format!("\x1b[34m{}\x1b[0m", text)
    }

    #[test]
    fn test_fit_width_truncates_with_ellipsis() {
        assert_eq!(fit_width("abcdefghij", 8), "abcde...");
        assert_eq!(fit_width("abcdefghij", 8).len(), 8);
    }

    #[test]
    fn test_fit_width_pads_left_aligned() {
        assert_eq!(fit_width("ab", 8), "ab      ");
        assert_eq!(fit_width("abcdefgh", 8), "abcdefgh");
        assert_eq!(fit_width("", 3), "   ");
    }

    #[test]
    fn test_fit_width_counts_characters() {
        assert_eq!(fit_width("résumé", 8), "résumé  ");
        assert_eq!(fit_width("ünïcödé-branch", 8), "ünïcö...");
    }

    #[test]
    fn test_fit_width_narrower_than_omission() {
        assert_eq!(fit_width("abcdef", 2), "..");
        assert_eq!(fit_width("abcdef", 0), "");
        assert_eq!(fit_width("ab", 2), "ab");
    }

    #[test]
    fn test_fit_width_counts_display_columns() {
        // Each of these takes two terminal columns
        assert_eq!(fit_width("修正", 8), "修正    ");
        assert_eq!(fit_width("機能追加ブランチ", 8), "機能... ");
        assert_eq!(fit_width("機能追加ブランチ", 8).width(), 8);
    }

    #[test]
    fn test_every_column_keeps_its_width() {
        let renderer = TableRenderer::new(Layout {
            unit_width: 1,
            ..Default::default()
        });
        for text in ["", "x", "abcdef", "機能追加ブランチ"] {
            let cell = renderer.column(text, 2, Style::plain());
            assert_eq!(cell.width(), 2, "{text:?}");
        }
    }

    #[test]
    fn test_paint_codes() {
        assert_eq!(paint("x", Style::plain()), "x");
        assert_eq!(paint("x", Style::color(Color::Blue)), "\x1b[34mx\x1b[0m");
        assert_eq!(paint("x", Style::bold()), "\x1b[1mx\x1b[0m");

        let both = Style {
            color: Some(Color::Red),
            weight: Weight::Bold,
        };
        assert_eq!(paint("x", both), "\x1b[31;1mx\x1b[0m");
    }

    #[test]
    fn test_column_width_in_units() {
        let renderer = TableRenderer::default();
        assert_eq!(renderer.column("status", 2, Style::plain()).len(), 16);
        assert_eq!(renderer.column(" ", 5, Style::plain()).len(), 40);
        assert_eq!(
            renderer.column("a-really-long-branch-value", 2, Style::plain()),
            "a-really-long..."
        );
    }

    #[test]
    fn test_full_listing() {
        let gateway = MemoryGateway::new()
            .with_branch("main", ago(Duration::hours(2)))
            .with_branch("feature/login", ago(Duration::days(3)))
            .with_metadata("feature/login", "status", "in review")
            .with_metadata("main", "remote", "origin")
            .with_current("main");

        let output = render(gateway, &FilterCriteria::default(), Some("main"));

        let expected = [
            String::new(),
            format!(
                "{}{}{}",
                " ".repeat(40),
                blue("status          "),
                blue("  branch")
            ),
            format!(
                "{}{}{}",
                " ".repeat(40),
                blue("------          "),
                blue("  ------")
            ),
            format!(
                "\x1b[1m{}{}* main\x1b[0m",
                "2024-06-15 10:00 +0000 (2h ago)         ",
                "-               "
            ),
            format!(
                "{}{}  feature/login",
                "2024-06-12 12:00 +0000 (3d ago)         ",
                "in review       "
            ),
        ]
        .join("\n");

        assert_eq!(output, expected);
    }

    #[test]
    fn test_rows_sorted_most_recent_first() {
        let gateway = MemoryGateway::new()
            .with_branch("aaa-old", ago(Duration::days(20)))
            .with_branch("zzz-new", ago(Duration::minutes(5)))
            .with_branch("mmm-mid", ago(Duration::days(2)));

        let output = render(gateway, &FilterCriteria::default(), None);
        let rows: Vec<&str> = output.lines().skip(3).collect();

        assert_eq!(rows.len(), 3);
        assert!(rows[0].ends_with("  zzz-new"));
        assert!(rows[1].ends_with("  mmm-mid"));
        assert!(rows[2].ends_with("  aaa-old"));
    }

    #[test]
    fn test_max_age_drops_old_rows() {
        let gateway = MemoryGateway::new()
            .with_branch("fresh", ago(Duration::days(3)))
            .with_branch("stale", ago(Duration::days(4)));
        let criteria = FilterCriteria {
            max_days_old: Some(3.5),
            ..Default::default()
        };

        let output = render(gateway, &criteria, None);
        assert!(output.contains("  fresh"));
        assert!(!output.contains("stale"));
    }

    #[test]
    fn test_name_filters_apply() {
        let gateway = MemoryGateway::new()
            .with_branch("feature/a", ago(Duration::days(1)))
            .with_branch("wip/b", ago(Duration::days(1)));
        let criteria = FilterCriteria {
            name_except: Some(Regex::new("^wip/").unwrap()),
            ..Default::default()
        };

        let output = render(gateway, &criteria, None);
        assert!(output.contains("feature/a"));
        assert!(!output.contains("wip/b"));
    }

    #[test]
    fn test_blank_values_render_placeholder() {
        let gateway = MemoryGateway::new()
            .with_branch("main", ago(Duration::days(1)))
            .with_branch("topic", ago(Duration::days(2)))
            .with_metadata("main", "owner", "   ")
            .with_metadata("topic", "owner", "sam");

        let output = render(gateway, &FilterCriteria::default(), None);
        let main_row = output.lines().find(|l| l.ends_with("  main")).unwrap();
        assert!(main_row.contains(&format!("-{}", " ".repeat(15))));
    }

    #[test]
    fn test_highlight_only_exact_current_branch() {
        let gateway = MemoryGateway::new()
            .with_branch("main", ago(Duration::days(1)))
            .with_branch("old-main", ago(Duration::days(2)))
            .with_current("main");

        let output = render(gateway, &FilterCriteria::default(), Some("main"));
        let bold: Vec<&str> = output.lines().filter(|l| l.starts_with("\x1b[1m")).collect();

        assert_eq!(bold.len(), 1);
        assert!(bold[0].ends_with("* main\x1b[0m"));
    }

    #[test]
    fn test_current_branch_filtered_out_is_not_highlighted() {
        let gateway = MemoryGateway::new()
            .with_branch("main", ago(Duration::days(30)))
            .with_branch("topic", ago(Duration::days(1)));
        let criteria = FilterCriteria {
            max_days_old: Some(7.0),
            ..Default::default()
        };

        let output = render(gateway, &criteria, Some("main"));
        assert!(!output.contains("\x1b[1m"));
    }

    #[test]
    fn test_no_properties_no_branches() {
        let output = render(MemoryGateway::new(), &FilterCriteria::default(), None);
        let expected = format!(
            "\n{blank}{}\n{blank}{}\n",
            blue("  branch"),
            blue("  ------"),
            blank = " ".repeat(40)
        );
        assert_eq!(output, expected);
    }
}
