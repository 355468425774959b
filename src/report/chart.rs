//! Chart image providers.

use super::data::MonthlyForecast;
use crate::error::Result;
use std::path::{Path, PathBuf};

/// Source of the raster chart drawn on the brands page.
///
/// Implementations write a PNG or JPEG into `dir`, a scratch directory owned
/// by the render, and return its path.
pub trait ChartProvider {
    /// Produce the chart for `series` inside `dir`.
    fn render(&self, series: &[MonthlyForecast], dir: &Path) -> Result<PathBuf>;
}

/// A chart rendered ahead of time, copied into the scratch directory.
#[derive(Debug, Clone)]
pub struct PrerenderedChart {
    source: PathBuf,
}

impl PrerenderedChart {
    /// Use the image at `source`.
    pub fn new(source: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
        }
    }
}

impl ChartProvider for PrerenderedChart {
    fn render(&self, series: &[MonthlyForecast], dir: &Path) -> Result<PathBuf> {
        let ext = self
            .source
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("png");
        let target = dir.join(format!("chart.{}", ext));
        std::fs::copy(&self.source, &target)?;
        log::debug!(
            "Chart for {} months copied from {}",
            series.len(),
            self.source.display()
        );
        Ok(target)
    }
}
