use formats::CategoryDatum;

use crate::analysis::Statistics;

/// Percentage string used for every entry when the total is zero.
pub const ZERO_TOTAL_PERCENTAGE: &str = "0.0%";

#[derive(Debug, Clone, PartialEq)]
pub struct ChartSlice {
    pub label: String,
    pub value: f64,
    pub color: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LegendEntry {
    pub label: String,
    pub color: String,
    /// Share of the total, one decimal place, e.g. `"73.5%"`.
    pub percentage: String,
}

/// Chart series plus the external legend, both in input order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChartModel {
    pub series: Vec<ChartSlice>,
    pub legend: Vec<LegendEntry>,
}

impl ChartModel {
    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    /// Tooltip text for a slice: `"<label>: <percentage>"`.
    pub fn tooltip_label(&self, index: usize) -> Option<String> {
        let entry = self.legend.get(index)?;
        if entry.label.is_empty() {
            return Some(entry.percentage.clone());
        }
        Some(format!("{}: {}", entry.label, entry.percentage))
    }
}

fn format_percentage(share: f64) -> String {
    format!("{share:.1}%")
}

/// Build the chart model for a category collection.
///
/// A zero total is not an error: every legend entry reads `"0.0%"`.
pub fn to_chart_model(categories: &[CategoryDatum]) -> ChartModel {
    let values: Vec<f64> = categories.iter().map(|c| c.value).collect();
    let shares = Statistics::shares_percent(&values);

    let series = categories
        .iter()
        .map(|c| ChartSlice {
            label: c.label.clone(),
            value: c.value,
            color: c.color.clone(),
        })
        .collect();

    let legend = categories
        .iter()
        .enumerate()
        .map(|(i, c)| LegendEntry {
            label: c.label.clone(),
            color: c.color.clone(),
            percentage: match &shares {
                Some(shares) => format_percentage(shares[i]),
                None => ZERO_TOTAL_PERCENTAGE.to_string(),
            },
        })
        .collect();

    ChartModel { series, legend }
}
