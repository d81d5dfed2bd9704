pub mod ec2;
pub mod ecs;
pub mod rds;
#[cfg(test)]
mod test_support;

use crate::cloud_watch_metrics_client::{FetchMetrics, MetricQuery};
use crate::error::ReportError;
use crate::metric::{column_names, MetricStatistic};
use crate::spreadsheet::{report_file_name, write_workbook, SheetLayout};
use crate::table::{Cell, Row};
use crate::time_range::TimeRange;
use async_trait::async_trait;
use chrono::{DateTime, Local};
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

pub use ec2::Ec2Report;
pub use ecs::EcsReport;
pub use rds::RdsReport;

#[async_trait]
pub trait Report {
    fn name(&self) -> &'static str;

    /// Path of the written workbook, or `None` when there was nothing to report.
    async fn generate(
        &self,
        time_range: &TimeRange,
        now: &DateTime<Local>,
    ) -> Result<Option<PathBuf>, ReportError>;
}

/// Min/Max/Avg cells for every metric of `query`. A failed query fills every cell with the error sentinel.
pub async fn metrics_row<M>(
    fetcher: &M,
    query: &MetricQuery,
    resource_label: &str,
    time_range: &TimeRange,
) -> Row
where
    M: FetchMetrics + Sync + ?Sized,
{
    info!(resource = resource_label, "Fetching CloudWatch metrics");
    let mut row = Row::new();
    match fetcher.fetch_metric_values(query, time_range).await {
        Ok(series) => {
            for metric_name in query.metric_names {
                let values = series.values(metric_name).unwrap_or(&[]);
                let statistic = MetricStatistic::from_values(values);
                push_statistic(&mut row, metric_name, &statistic);
            }
        }
        Err(fetch_error) => {
            warn!(
                resource = resource_label,
                error = %fetch_error,
                "Error fetching metrics"
            );
            for metric_name in query.metric_names {
                push_statistic(&mut row, metric_name, &MetricStatistic::Error);
            }
        }
    }
    row
}

fn push_statistic(row: &mut Row, metric_name: &str, statistic: &MetricStatistic) {
    let columns = column_names(metric_name);
    let cells = statistic.cells(metric_name);
    for (column, cell) in columns.iter().zip(cells.iter()) {
        row.insert(column.as_str(), Cell::text(cell.as_str()));
    }
}

pub fn export(
    layout: &SheetLayout,
    prefix: &str,
    output_dir: &Path,
    now: &DateTime<Local>,
) -> Result<PathBuf, ReportError> {
    let path = output_dir.join(report_file_name(prefix, now));
    write_workbook(&path, layout)?;
    info!(path = %path.display(), "Report generation complete");
    Ok(path)
}

#[derive(Debug, Default, PartialEq)]
pub struct RunSummary {
    pub written: Vec<PathBuf>,
    pub skipped: Vec<&'static str>,
    pub failed: Vec<&'static str>,
}

/// Runs every report in order; one report failing never stops the rest.
pub async fn run_reports(
    reports: &[Box<dyn Report + Send + Sync>],
    time_range: &TimeRange,
    now: &DateTime<Local>,
) -> RunSummary {
    let mut summary = RunSummary::default();
    for report in reports {
        info!(report = report.name(), "Generating report");
        match report.generate(time_range, now).await {
            Ok(Some(path)) => summary.written.push(path),
            Ok(None) => {
                info!(report = report.name(), "No resources found, skipping export");
                summary.skipped.push(report.name());
            }
            Err(report_error) => {
                error!(
                    report = report.name(),
                    error = %report_error,
                    "Error generating report"
                );
                summary.failed.push(report.name());
            }
        }
    }
    summary
}
