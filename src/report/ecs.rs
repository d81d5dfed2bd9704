use crate::cloud_watch_metrics_client::{FetchMetrics, MetricQuery};
use crate::ecs_service_client::EcsService;
use crate::error::ReportError;
use crate::inventory::Describe;
use crate::report::{export, metrics_row, Report};
use crate::spreadsheet::SheetLayout;
use crate::table::{Cell, Row, Table};
use crate::time_range::TimeRange;
use async_trait::async_trait;
use chrono::{DateTime, Local};
use std::path::PathBuf;
use tracing::info;

pub const NAMESPACE: &str = "AWS/ECS";
pub const METRICS: [&str; 2] = ["CPUUtilization", "MemoryUtilization"];
const SHEET_NAME: &str = "Sheet1";
const FILE_PREFIX: &str = "ECS";
const COLUMNS: [&str; 14] = [
    "Cluster",
    "Service Name",
    "ARN",
    "Status",
    "Launch Type",
    "Desired Tasks",
    "Running Tasks",
    "Task Definition",
    "CPUUtilization Min",
    "CPUUtilization Max",
    "CPUUtilization Avg",
    "MemoryUtilization Min",
    "MemoryUtilization Max",
    "MemoryUtilization Avg",
];

pub struct EcsReport<D, M> {
    inventory: D,
    metrics: M,
    output_dir: PathBuf,
}

impl<D, M> EcsReport<D, M>
where
    D: Describe<Resource = EcsService> + Send + Sync,
    M: FetchMetrics + Send + Sync,
{
    pub fn new(inventory: D, metrics: M, output_dir: PathBuf) -> Self {
        EcsReport {
            inventory,
            metrics,
            output_dir,
        }
    }

    /// One table: service details with their metrics appended, in a fixed column order.
    pub async fn build_layout(
        &self,
        time_range: &TimeRange,
    ) -> Result<Option<SheetLayout>, ReportError> {
        let services = self.inventory.describe_all().await?;
        if services.is_empty() {
            info!("No ECS services found");
            return Ok(None);
        }

        let mut rows = Vec::with_capacity(services.len());
        for service in &services {
            let query = MetricQuery {
                namespace: NAMESPACE,
                dimensions: vec![
                    ("ClusterName", service.cluster.clone()),
                    ("ServiceName", service.service_name.clone()),
                ],
                metric_names: &METRICS,
            };
            let metrics =
                metrics_row(&self.metrics, &query, &service.service_name, time_range).await;
            rows.push(detail_row(service).merged(metrics));
        }

        let table = Table::from_rows(&rows).reindex(&COLUMNS);
        Ok(Some(SheetLayout::single(SHEET_NAME, table)))
    }
}

#[async_trait]
impl<D, M> Report for EcsReport<D, M>
where
    D: Describe<Resource = EcsService> + Send + Sync,
    M: FetchMetrics + Send + Sync,
{
    fn name(&self) -> &'static str {
        "ECS"
    }

    async fn generate(
        &self,
        time_range: &TimeRange,
        now: &DateTime<Local>,
    ) -> Result<Option<PathBuf>, ReportError> {
        match self.build_layout(time_range).await? {
            Some(layout) => Ok(Some(export(&layout, FILE_PREFIX, &self.output_dir, now)?)),
            None => Ok(None),
        }
    }
}

fn detail_row(service: &EcsService) -> Row {
    Row::new()
        .with("Cluster", Cell::text(service.cluster.as_str()))
        .with("Service Name", Cell::text(service.service_name.as_str()))
        .with("ARN", service.arn.clone().map_or(Cell::Empty, Cell::Text))
        .with("Status", service.status.clone().map_or(Cell::Empty, Cell::Text))
        .with("Launch Type", Cell::text(service.launch_type.as_str()))
        .with("Desired Tasks", Cell::Number(service.desired_count as f64))
        .with("Running Tasks", Cell::Number(service.running_count as f64))
        .with(
            "Task Definition",
            service.task_definition.clone().map_or(Cell::Empty, Cell::Text),
        )
}
