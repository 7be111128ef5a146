use crate::domain::models::TeamOverview;
use serde::Serialize;

/// Slice colours, assigned by slice position.
pub const SLICE_COLORS: [&str; 3] = ["#ef5350", "#ffca28", "#66bb6a"];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSlice {
    pub label: &'static str,
    pub value: u64,
    pub color: &'static str,
}

/// One slice per sentiment present in the breakdown, value unchanged.
pub fn sentiment_chart(overview: &TeamOverview) -> Vec<ChartSlice> {
    overview
        .sentiment_breakdown
        .iter()
        .enumerate()
        .map(|(idx, (sentiment, value))| ChartSlice {
            label: sentiment.label(),
            value: *value,
            color: SLICE_COLORS[idx % SLICE_COLORS.len()],
        })
        .collect()
}
