//! Batch summary of the dataset as ordered page sections, and the text
//! paginator that lays those sections out on pages.

use std::fs;
use std::path::Path;

use derive_setters::Setters;
use tracing::{debug, info};

use crate::aggregate::{
    band_counts, category_frequencies, describe, geographic_extremes, top_n, Extreme,
    NumericField, Summary,
};
use crate::dataset::Dataset;
use crate::domain::AirscopeError;

pub const REPORT_TITLE: &str = "US Airports Data Analysis Report";
pub const REPORT_TOP_N: usize = 10;
pub const REPORT_LATITUDE_BANDS: usize = 5;

const INTRODUCTION: &str = "This report presents a comprehensive analysis of US airports data, \
including their geographic distribution, state-wise distribution, and various visualizations.";

const VISUALIZATIONS: [&str; 5] = [
    "Geographic Distribution of Airports",
    "Top States by Number of Airports",
    "Airport Distribution by Latitude Bands",
    "Airport Distribution by Longitude Bands",
    "Airport Density Heatmap",
];

const CONCLUSION: [&str; 3] = [
    "The analysis reveals that US airports are not evenly distributed across the country. \
There is a higher concentration in the eastern and western coastal regions, as well as in \
states with larger populations or geographic areas. Texas, California, and Alaska have the \
highest number of airports, reflecting their large size and economic importance.",
    "The majority of airports (55.6%) are located between 37.038°N and 54.162°N latitude, \
which corresponds to the northern part of the continental United States. Another significant \
portion (36.0%) falls between 19.914°N and 37.038°N, covering the southern continental US.",
    "The interactive dashboard provides a comprehensive tool for exploring this data further, \
allowing users to visualize the geographic distribution of airports, analyze state-wise \
distribution, and examine the distribution by latitude and longitude.",
];

#[derive(Debug, Clone, PartialEq)]
pub struct PageSection {
    pub heading: String,
    pub body: Vec<String>,
    /// Start the section on a fresh page.
    pub new_page: bool,
}

impl PageSection {
    fn new(heading: impl Into<String>, body: Vec<String>) -> Self {
        PageSection {
            heading: heading.into(),
            body,
            new_page: false,
        }
    }

    fn on_new_page(mut self) -> Self {
        self.new_page = true;
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    pub title: String,
    pub sections: Vec<PageSection>,
}

pub fn compose_report(dataset: &Dataset) -> Result<Report, AirscopeError> {
    let frequencies = category_frequencies(dataset);
    let top = top_n(&frequencies, REPORT_TOP_N)?;
    let extremes = geographic_extremes(dataset)?;
    let latitude = describe(dataset, NumericField::Latitude)?;
    let longitude = describe(dataset, NumericField::Longitude)?;
    let bands = band_counts(dataset, NumericField::Latitude, REPORT_LATITUDE_BANDS)?;
    let total = dataset.len();

    let mut density = vec!["Distribution by latitude bands:".to_string()];
    density.extend(bands.iter().map(|band| {
        format!(
            "({:.3}, {:.3}]: {} airports ({:.1}%)",
            band.lower,
            band.upper,
            band.count,
            band.count as f64 * 100.0 / total as f64
        )
    }));

    let mut visualizations =
        vec!["The following visualizations were created as part of this analysis:".to_string()];
    visualizations.extend(
        VISUALIZATIONS
            .iter()
            .enumerate()
            .map(|(i, name)| format!("{}. {name}", i + 1)),
    );

    let sections = vec![
        PageSection::new("US Airports Data Analysis", vec![INTRODUCTION.to_string()]),
        PageSection::new(
            "Dataset Statistics",
            vec![
                format!("Total number of airports analyzed: {total}"),
                format!(
                    "Number of states/territories with airports: {}",
                    frequencies.distinct()
                ),
            ],
        ),
        PageSection::new(
            format!("Top {REPORT_TOP_N} States by Number of Airports"),
            top.iter()
                .enumerate()
                .map(|(i, c)| format!("{}. {}: {} airports", i + 1, c.category, c.count))
                .collect(),
        ),
        PageSection::new(
            "Geographic Extremes",
            vec![
                extreme_line("Northernmost", &extremes.north),
                extreme_line("Southernmost", &extremes.south),
                extreme_line("Easternmost", &extremes.east),
                extreme_line("Westernmost", &extremes.west),
            ],
        ),
        PageSection::new(
            "Latitude and Longitude Statistics",
            [
                summary_lines("latitude", &latitude),
                vec![String::new()],
                summary_lines("longitude", &longitude),
            ]
            .concat(),
        ),
        PageSection::new("Airport Density Analysis", density),
        PageSection::new("Visualizations", visualizations).on_new_page(),
        PageSection::new(
            "Conclusion",
            CONCLUSION
                .iter()
                .flat_map(|p| [p.to_string(), String::new()])
                .take(CONCLUSION.len() * 2 - 1)
                .collect(),
        )
        .on_new_page(),
    ];

    debug!("Composed report with {} sections", sections.len());
    Ok(Report {
        title: REPORT_TITLE.to_string(),
        sections,
    })
}

fn extreme_line(label: &str, extreme: &Extreme) -> String {
    let r = &extreme.record;
    format!(
        "{label}: {} - {} ({})",
        r.code, r.display_name, r.city_line
    )
}

fn summary_lines(name: &str, summary: &Summary) -> Vec<String> {
    vec![
        format!("Mean {name}: {:.2}°", summary.mean),
        format!("Median {name}: {:.2}°", summary.median),
        format!("Range: {:.2}° to {:.2}°", summary.min, summary.max),
    ]
}

#[derive(Debug, Clone, Setters)]
#[setters(prefix = "with_")]
pub struct PageLayout {
    pub width: usize,
    pub lines_per_page: usize,
}

impl Default for PageLayout {
    fn default() -> Self {
        PageLayout {
            width: 80,
            lines_per_page: 50,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    pub number: usize,
    pub lines: Vec<String>,
}

// Lines every page spends on its header and footer.
const PAGE_FRAME_LINES: usize = 4;

struct Paginator<'a> {
    layout: &'a PageLayout,
    title: &'a str,
    pages: Vec<Page>,
    current: Vec<String>,
}

impl<'a> Paginator<'a> {
    fn new(layout: &'a PageLayout, title: &'a str) -> Self {
        Paginator {
            layout,
            title,
            pages: Vec::new(),
            current: Vec::new(),
        }
    }

    fn body_height(&self) -> usize {
        std::cmp::max(self.layout.lines_per_page.saturating_sub(PAGE_FRAME_LINES), 1)
    }

    fn push(&mut self, line: String) {
        if self.current.len() >= self.body_height() {
            self.break_page();
        }
        self.current.push(line);
    }

    fn break_page(&mut self) {
        let number = self.pages.len() + 1;
        let mut lines = Vec::with_capacity(self.current.len() + PAGE_FRAME_LINES);
        lines.push(center(self.title, self.layout.width));
        lines.push(String::new());
        lines.append(&mut self.current);
        lines.push(String::new());
        lines.push(center(&format!("Page {number}"), self.layout.width));
        self.pages.push(Page { number, lines });
    }

    fn finish(mut self) -> Vec<Page> {
        if !self.current.is_empty() || self.pages.is_empty() {
            self.break_page();
        }
        self.pages
    }
}

pub fn paginate(report: &Report, layout: &PageLayout) -> Vec<Page> {
    let mut paginator = Paginator::new(layout, &report.title);
    for section in report.sections.iter() {
        if section.new_page && !paginator.current.is_empty() {
            paginator.break_page();
        }
        // Keep a heading together with the first line of its body.
        if !paginator.current.is_empty()
            && paginator.current.len() + 2 > paginator.body_height()
        {
            paginator.break_page();
        }
        paginator.push(section.heading.clone());
        for line in section.body.iter() {
            for wrapped in wrap(line, layout.width) {
                paginator.push(wrapped);
            }
        }
        paginator.push(String::new());
    }
    paginator.finish()
}

fn center(text: &str, width: usize) -> String {
    let len = text.chars().count();
    let pad = width.saturating_sub(len) / 2;
    format!("{}{}", " ".repeat(pad), text)
}

fn wrap(line: &str, width: usize) -> Vec<String> {
    if line.is_empty() {
        return vec![String::new()];
    }
    let mut lines = Vec::new();
    let mut current = String::new();
    // Words longer than the line are split into line sized pieces.
    let pieces = line.split_whitespace().flat_map(|word| {
        word.chars()
            .collect::<Vec<char>>()
            .chunks(width.max(1))
            .map(|chunk| chunk.iter().collect::<String>())
            .collect::<Vec<String>>()
    });
    for piece in pieces {
        let needed = if current.is_empty() {
            piece.chars().count()
        } else {
            current.chars().count() + 1 + piece.chars().count()
        };
        if needed > width && !current.is_empty() {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(&piece);
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

pub fn render_pages(pages: &[Page]) -> String {
    pages
        .iter()
        .map(|p| p.lines.join("\n"))
        .collect::<Vec<String>>()
        .join("\n\u{c}\n")
}

pub fn write_report(
    dataset: &Dataset,
    layout: &PageLayout,
    path: &Path,
) -> Result<usize, AirscopeError> {
    let report = compose_report(dataset)?;
    let pages = paginate(&report, layout);
    fs::write(path, render_pages(&pages))?;
    info!("Report with {} pages written to {:?}", pages.len(), path);
    Ok(pages.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::RawAirport;
    use crate::deriver::derive_regions;

    fn dataset() -> Dataset {
        let rows = [
            ("ANC", "Anchorage, AK", 61.17, -149.99),
            ("BRW", "Utqiagvik, AK", 71.29, -156.77),
            ("ADK", "Adak Island, AK", 51.88, -176.65),
            ("HNL", "Honolulu, HI", 21.32, -157.92),
            ("AUS", "Austin, TX", 30.19, -97.67),
            ("DFW", "Dallas/Fort Worth, TX", 32.90, -97.04),
            ("BGR", "Bangor, ME", 44.81, -68.83),
            ("XXX", "Unincorporated Area", 40.0, -100.0),
        ];
        derive_regions(
            rows.iter()
                .map(|&(code, city, latitude, longitude)| RawAirport {
                    code: code.to_string(),
                    display_name: format!("{code} Airport"),
                    city_line: city.to_string(),
                    latitude,
                    longitude,
                })
                .collect(),
        )
    }

    #[test]
    fn sections_are_in_report_order() {
        let report = compose_report(&dataset()).unwrap();
        let headings: Vec<&str> = report.sections.iter().map(|s| s.heading.as_str()).collect();
        assert_eq!(
            headings,
            vec![
                "US Airports Data Analysis",
                "Dataset Statistics",
                "Top 10 States by Number of Airports",
                "Geographic Extremes",
                "Latitude and Longitude Statistics",
                "Airport Density Analysis",
                "Visualizations",
                "Conclusion",
            ]
        );
        let breaks: Vec<bool> = report.sections.iter().map(|s| s.new_page).collect();
        assert_eq!(breaks, vec![false, false, false, false, false, false, true, true]);
    }

    #[test]
    fn numeric_sections_follow_aggregations() {
        let report = compose_report(&dataset()).unwrap();
        let stats = &report.sections[1].body;
        assert_eq!(stats[0], "Total number of airports analyzed: 8");
        assert_eq!(stats[1], "Number of states/territories with airports: 4");

        let top = &report.sections[2].body;
        assert_eq!(
            top,
            &vec![
                "1. AK: 3 airports".to_string(),
                "2. TX: 2 airports".to_string(),
                "3. HI: 1 airports".to_string(),
                "4. ME: 1 airports".to_string(),
            ]
        );

        let extremes = &report.sections[3].body;
        assert_eq!(
            extremes[0],
            "Northernmost: BRW - BRW Airport (Utqiagvik, AK)"
        );
        assert_eq!(extremes[1], "Southernmost: HNL - HNL Airport (Honolulu, HI)");
        assert_eq!(extremes[2], "Easternmost: BGR - BGR Airport (Bangor, ME)");
        assert_eq!(extremes[3], "Westernmost: ADK - ADK Airport (Adak Island, AK)");

        let stats = &report.sections[4].body;
        assert_eq!(stats[2], "Range: 21.32° to 71.29°");
        assert_eq!(stats[3], "");

        let density = &report.sections[5].body;
        assert_eq!(density.len(), 1 + REPORT_LATITUDE_BANDS);
        assert!(density[1].starts_with("(21.320, 31.314]: 1 airports (12.5%)"));
    }

    #[test]
    fn empty_dataset_can_not_be_reported() {
        assert!(matches!(
            compose_report(&Dataset::default()),
            Err(AirscopeError::EmptyInput(_))
        ));
    }

    #[test]
    fn pagination_breaks_before_forced_sections() {
        let report = compose_report(&dataset()).unwrap();
        let pages = paginate(&report, &PageLayout::default());
        assert_eq!(pages.len(), 3);
        assert_eq!(pages[1].lines[2], "Visualizations");
        assert_eq!(pages[2].lines[2], "Conclusion");
        for page in pages.iter() {
            assert_eq!(page.lines[0].trim(), REPORT_TITLE);
            assert_eq!(
                page.lines.last().unwrap().trim(),
                format!("Page {}", page.number)
            );
        }
    }

    #[test]
    fn pagination_respects_page_height_and_width() {
        let report = compose_report(&dataset()).unwrap();
        let layout = PageLayout::default()
            .with_lines_per_page(12)
            .with_width(40);
        let pages = paginate(&report, &layout);
        assert!(pages.len() > 3);
        for page in pages.iter() {
            assert!(page.lines.len() <= 12);
            for line in page.lines.iter() {
                assert!(line.chars().count() <= 40, "too wide: {line}");
            }
        }
    }

    #[test]
    fn wrap_splits_on_words() {
        assert_eq!(
            wrap("one two three four", 9),
            vec!["one two", "three", "four"]
        );
        assert_eq!(wrap("", 9), vec![String::new()]);
    }

    #[test]
    fn wrap_splits_words_longer_than_the_line() {
        assert_eq!(
            wrap("a abcdefghij", 4),
            vec!["a", "abcd", "efgh", "ij"]
        );
        let long = "x".repeat(25);
        assert!(wrap(&long, 10).iter().all(|l| l.chars().count() <= 10));
    }
}
