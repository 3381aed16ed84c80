use compute::{ChartSlice, LegendEntry};

/// The pie-chart widget plus its external legend target.
pub trait ChartRenderer {
    fn draw_chart(&mut self, series: &[ChartSlice]);
    fn render_legend(&mut self, entries: &[LegendEntry]);
}

#[derive(Debug, Default)]
pub struct RecordingChartRenderer {
    pub chart_draws: u64,
    pub series: Vec<ChartSlice>,
    pub legend: Vec<LegendEntry>,
}

impl RecordingChartRenderer {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ChartRenderer for RecordingChartRenderer {
    fn draw_chart(&mut self, series: &[ChartSlice]) {
        self.chart_draws += 1;
        self.series = series.to_vec();
    }

    fn render_legend(&mut self, entries: &[LegendEntry]) {
        self.legend = entries.to_vec();
    }
}
