//! Page layout for feedback reports. All positions are millimetres from the top-left
//! corner of an A4 page.
//!
//! Blocks flow row by row: every page holds the same number of 6mm rows between
//! `TOP_MARGIN` and `PAGE_BOTTOM`, and a block that reaches the bottom continues at the
//! top of the next page. Long lines wrap at the right margin.

use crate::domain::models::FeedbackRecord;
use crate::domain::tags::join_tags;
use crate::domain::view::format_date;
use crate::report::pdf::fits_width;
use crate::report::ReportView;

pub const MARGIN_X: u32 = 10;
pub const TEXT_WIDTH: u32 = 190;
/// The title sits in the header band of the first page.
pub const TITLE_Y: u32 = 10;
/// Offset of the first row on every page.
pub const TOP_MARGIN: u32 = 20;
pub const LINE_HEIGHT: u32 = 6;
/// Blank space between two blocks; one row.
pub const BLOCK_GAP: u32 = LINE_HEIGHT;
/// No row may extend past this offset.
pub const PAGE_BOTTOM: u32 = 290;
pub const PAGE_CAPACITY: u32 = PAGE_BOTTOM - TOP_MARGIN;
const ROWS_PER_PAGE: u32 = PAGE_CAPACITY / LINE_HEIGHT;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlacedLine {
    pub x: u32,
    pub y: u32,
    pub text: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Page {
    pub lines: Vec<PlacedLine>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    pub pages: Vec<Page>,
    /// Page index of each input record, in input order.
    pub placements: Vec<usize>,
}

pub fn block_lines(view: ReportView, index: usize, fb: &FeedbackRecord) -> Vec<String> {
    let mut lines = Vec::with_capacity(7);
    match view {
        ReportView::Manager => lines.push(format!(
            "Name: {}",
            fb.employee_username.as_deref().unwrap_or("Unknown")
        )),
        ReportView::Employee => {
            let content = fb
                .content
                .as_deref()
                .filter(|c| !c.trim().is_empty())
                .unwrap_or("Feedback");
            lines.push(format!("{}. {}", index + 1, content));
        }
    }

    lines.push(format!(
        "Sentiment: {}",
        fb.sentiment.map(|s| s.as_str()).unwrap_or("N/A")
    ));

    if fb.created_at.is_some() {
        lines.push(format!("Date: {}", format_date(fb.created_at)));
    }

    if view == ReportView::Employee {
        if let Some(author) = fb.visible_author() {
            lines.push(format!("From: {author}"));
        }
    }

    if let Some(strengths) = fb.strengths.as_deref().filter(|s| !s.is_empty()) {
        lines.push(format!("Strengths: {strengths}"));
    }
    if let Some(improvements) = fb.improvements.as_deref().filter(|s| !s.is_empty()) {
        lines.push(format!("Improvements: {improvements}"));
    }
    if !fb.tags.is_empty() {
        lines.push(format!("Tags: {}", join_tags(&fb.tags)));
    }
    lines
}

/// Splits `text` into lines that fit the text width, breaking between words where it
/// can and inside a word only when the word alone is too wide.
pub fn wrap(text: &str) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    for word in text.split_whitespace() {
        let candidate = if current.is_empty() {
            word.to_string()
        } else {
            format!("{current} {word}")
        };
        if fits_width(&candidate, TEXT_WIDTH) {
            current = candidate;
            continue;
        }
        if !current.is_empty() {
            lines.push(std::mem::take(&mut current));
        }
        for ch in word.chars() {
            current.push(ch);
            if !fits_width(&current, TEXT_WIDTH) && current.chars().count() > 1 {
                current.pop();
                lines.push(std::mem::take(&mut current));
                current.push(ch);
            }
        }
    }
    if !current.is_empty() || lines.is_empty() {
        lines.push(current);
    }
    lines
}

/// The block's printed rows, after wrapping.
pub fn block_rows(view: ReportView, index: usize, fb: &FeedbackRecord) -> Vec<String> {
    block_lines(view, index, fb)
        .iter()
        .flat_map(|line| wrap(line))
        .collect()
}

pub fn block_height(row_count: usize) -> u32 {
    row_count as u32 * LINE_HEIGHT + BLOCK_GAP
}

/// Height of all blocks stacked, without the gap after the last one. The layout uses
/// exactly `content_height.div_ceil(PAGE_CAPACITY)` pages (at least one).
pub fn content_height(view: ReportView, records: &[FeedbackRecord]) -> u32 {
    let stacked: u32 = records
        .iter()
        .enumerate()
        .map(|(index, fb)| block_height(block_rows(view, index, fb).len()))
        .sum();
    stacked.saturating_sub(BLOCK_GAP)
}

pub fn layout(view: ReportView, records: &[FeedbackRecord]) -> Layout {
    let mut pages = vec![Page {
        lines: vec![PlacedLine {
            x: MARGIN_X,
            y: TITLE_Y,
            text: view.title().to_string(),
        }],
    }];
    let mut placements = Vec::with_capacity(records.len());
    // Rows used so far across all pages; gaps count as rows.
    let mut row = 0u32;

    for (index, fb) in records.iter().enumerate() {
        if index > 0 {
            row += BLOCK_GAP / LINE_HEIGHT;
        }
        for (n, text) in block_rows(view, index, fb).into_iter().enumerate() {
            let page_index = (row / ROWS_PER_PAGE) as usize;
            if pages.len() <= page_index {
                pages.push(Page::default());
            }
            if n == 0 {
                placements.push(page_index);
            }
            pages[page_index].lines.push(PlacedLine {
                x: MARGIN_X,
                y: TOP_MARGIN + (row % ROWS_PER_PAGE) * LINE_HEIGHT,
                text,
            });
            row += 1;
        }
    }

    Layout { pages, placements }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::{OpaqueId, Sentiment};
    use chrono::{TimeZone, Utc};

    fn record(id: i64) -> FeedbackRecord {
        FeedbackRecord {
            id: OpaqueId::from(id),
            employee_id: Some(OpaqueId::from(2)),
            employee_username: Some("bob".into()),
            manager_username: Some("alice".into()),
            content: Some(format!("feedback {id}")),
            strengths: None,
            improvements: None,
            sentiment: Some(Sentiment::Neutral),
            tags: vec![],
            anonymous: false,
            acknowledged: false,
            employee_comments: None,
            created_at: Some(Utc.with_ymd_and_hms(2024, 1, 15, 12, 0, 0).unwrap()),
        }
    }

    #[test]
    fn test_employee_block_lines() {
        let mut fb = record(1);
        fb.strengths = Some("Clear writing".into());
        fb.tags = vec!["docs".into(), "api".into()];
        assert_eq!(
            block_lines(ReportView::Employee, 0, &fb),
            vec![
                "1. feedback 1",
                "Sentiment: neutral",
                "Date: 1/15/2024",
                "From: alice",
                "Strengths: Clear writing",
                "Tags: docs, api",
            ]
        );
    }

    #[test]
    fn test_anonymous_block_has_no_attribution() {
        let mut fb = record(1);
        fb.anonymous = true;
        let lines = block_lines(ReportView::Employee, 0, &fb);
        assert!(lines.iter().all(|l| !l.contains("alice")));
        assert!(!lines.iter().any(|l| l.starts_with("From:")));
    }

    #[test]
    fn test_manager_block_names_subject() {
        let lines = block_lines(ReportView::Manager, 4, &record(5));
        assert_eq!(lines[0], "Name: bob");
        assert!(!lines.iter().any(|l| l.starts_with("From:")));
    }

    fn page_count_matches_height(view: ReportView, records: &[FeedbackRecord]) -> usize {
        let laid_out = layout(view, records);
        let expected = content_height(view, records).div_ceil(PAGE_CAPACITY) as usize;
        assert_eq!(laid_out.pages.len(), expected);
        laid_out.pages.len()
    }

    #[test]
    fn test_pagination_page_count_and_order() {
        // Four rows per block plus a gap row between blocks.
        let records: Vec<_> = (1..=20).map(record).collect();
        assert_eq!(content_height(ReportView::Employee, &records), 594);
        assert_eq!(page_count_matches_height(ReportView::Employee, &records), 3);

        let laid_out = layout(ReportView::Employee, &records);
        assert_eq!(laid_out.placements.len(), records.len());
        assert!(laid_out.placements.windows(2).all(|w| w[0] <= w[1]));

        let headers: Vec<_> = laid_out
            .pages
            .iter()
            .flat_map(|p| p.lines.iter())
            .filter(|l| l.text.contains(". feedback "))
            .map(|l| l.text.clone())
            .collect();
        let expected: Vec<_> = (1..=20).map(|i| format!("{i}. feedback {i}")).collect();
        assert_eq!(headers, expected);
    }

    #[test]
    fn test_pagination_with_uneven_blocks() {
        // Five-row manager blocks (36mm with the gap) do not divide the page.
        let five_rows: Vec<_> = (1..=15)
            .map(|id| {
                let mut fb = record(id);
                fb.created_at = None;
                fb.strengths = Some("Ownership".into());
                fb.improvements = Some("Estimates".into());
                fb.tags = vec!["growth".into()];
                fb
            })
            .collect();
        assert_eq!(block_rows(ReportView::Manager, 0, &five_rows[0]).len(), 5);
        assert_eq!(page_count_matches_height(ReportView::Manager, &five_rows), 2);

        // Mixed heights, seven-row blocks included.
        let mixed: Vec<_> = (1..=90)
            .map(|id| {
                let mut fb = record(id);
                if id % 2 == 0 {
                    fb.strengths = Some("Ownership".into());
                    fb.improvements = Some("Estimates".into());
                    fb.tags = vec!["growth".into()];
                }
                if id % 3 == 0 {
                    fb.created_at = None;
                }
                fb
            })
            .collect();
        page_count_matches_height(ReportView::Employee, &mixed);
        page_count_matches_height(ReportView::Manager, &mixed);
    }

    #[test]
    fn test_lines_stay_on_page() {
        let records: Vec<_> = (1..=50).map(record).collect();
        let laid_out = layout(ReportView::Manager, &records);
        for page in &laid_out.pages {
            assert!(page.lines.iter().all(|l| l.y + LINE_HEIGHT <= PAGE_BOTTOM));
        }
        assert!(laid_out.pages[1].lines[0].y <= TOP_MARGIN + LINE_HEIGHT);
    }

    #[test]
    fn test_long_text_wraps() {
        let mut fb = record(1);
        let long = "keeps the release notes current ".repeat(12);
        fb.strengths = Some(long.clone());
        fb.improvements = Some("x".repeat(300));

        let lines = block_lines(ReportView::Employee, 0, &fb);
        let rows = block_rows(ReportView::Employee, 0, &fb);
        assert!(rows.len() > lines.len() + 2);
        assert!(rows.iter().all(|r| fits_width(r, TEXT_WIDTH)));

        let strengths: Vec<_> = rows
            .iter()
            .skip_while(|r| !r.starts_with("Strengths:"))
            .take_while(|r| !r.starts_with("Improvements:"))
            .cloned()
            .collect();
        assert!(strengths.len() > 1);
        assert_eq!(
            strengths.join(" "),
            format!("Strengths: {}", long.split_whitespace().collect::<Vec<_>>().join(" "))
        );

        let improvements: String = rows
            .iter()
            .skip_while(|r| !r.starts_with("Improvements:"))
            .take_while(|r| !r.starts_with("Tags:"))
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(" ");
        assert_eq!(improvements.matches('x').count(), 300);
    }

    #[test]
    fn test_block_taller_than_a_page_continues() {
        let mut fb = record(1);
        fb.strengths = Some("word ".repeat(2000));
        let records = vec![fb, record(2)];
        let laid_out = layout(ReportView::Employee, &records);

        assert!(laid_out.pages.len() > 1);
        assert_eq!(laid_out.placements[0], 0);
        assert_eq!(laid_out.pages.len(), page_count_matches_height(ReportView::Employee, &records));
        for page in &laid_out.pages {
            assert!(page.lines.iter().all(|l| l.y + LINE_HEIGHT <= PAGE_BOTTOM));
        }
    }

    #[test]
    fn test_empty_report_has_title_page() {
        let laid_out = layout(ReportView::Manager, &[]);
        assert_eq!(laid_out.pages.len(), 1);
        assert_eq!(laid_out.pages[0].lines[0].text, "Feedbacks Given");
    }
}
