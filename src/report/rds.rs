use crate::cloud_watch_metrics_client::{FetchMetrics, MetricQuery};
use crate::error::ReportError;
use crate::inventory::Describe;
use crate::rds_instance_client::RdsInstance;
use crate::report::{export, metrics_row, Report};
use crate::spreadsheet::SheetLayout;
use crate::table::{Cell, Row, Table};
use crate::time_range::TimeRange;
use async_trait::async_trait;
use chrono::{DateTime, Local};
use std::path::PathBuf;
use tracing::info;

pub const NAMESPACE: &str = "AWS/RDS";
pub const METRICS: [&str; 16] = [
    "CPUUtilization",
    "FreeableMemory",
    "WriteLatency",
    "ReadLatency",
    "Deadlocks",
    "DiskQueueDepth",
    "DatabaseConnections",
    "DeleteLatency",
    "LoginFailures",
    "SwapUsage",
    "SelectLatency",
    "ReadThroughput",
    "DDLLatency",
    "WriteIOPS",
    "CommitLatency",
    "ReadIOPS",
];
const SHEET_NAME: &str = "RDS_Report";
const FILE_PREFIX: &str = "RDS";

pub struct RdsReport<D, M> {
    inventory: D,
    metrics: M,
    output_dir: PathBuf,
}

impl<D, M> RdsReport<D, M>
where
    D: Describe<Resource = RdsInstance> + Send + Sync,
    M: FetchMetrics + Send + Sync,
{
    pub fn new(inventory: D, metrics: M, output_dir: PathBuf) -> Self {
        RdsReport {
            inventory,
            metrics,
            output_dir,
        }
    }

    pub async fn build_layout(
        &self,
        time_range: &TimeRange,
    ) -> Result<Option<SheetLayout>, ReportError> {
        let db_instances = self.inventory.describe_all().await?;
        if db_instances.is_empty() {
            info!("No RDS instances found");
            return Ok(None);
        }

        let mut metric_rows = Vec::with_capacity(db_instances.len());
        for db in &db_instances {
            let query = MetricQuery {
                namespace: NAMESPACE,
                dimensions: vec![("DBInstanceIdentifier", db.identifier.clone())],
                metric_names: &METRICS,
            };
            let metrics = metrics_row(&self.metrics, &query, &db.identifier, time_range).await;
            metric_rows.push(
                Row::new()
                    .with("Name", Cell::text(db.identifier.as_str()))
                    .merged(metrics),
            );
        }

        let detail_rows: Vec<Row> = db_instances.iter().map(detail_row).collect();
        Ok(Some(SheetLayout::stacked(
            SHEET_NAME,
            Table::from_rows(&detail_rows),
            Table::from_rows(&metric_rows),
        )))
    }
}

#[async_trait]
impl<D, M> Report for RdsReport<D, M>
where
    D: Describe<Resource = RdsInstance> + Send + Sync,
    M: FetchMetrics + Send + Sync,
{
    fn name(&self) -> &'static str {
        "RDS"
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

fn text_or_empty(value: &Option<String>) -> Cell {
    value.clone().map_or(Cell::Empty, Cell::Text)
}

fn detail_row(db: &RdsInstance) -> Row {
    Row::new()
        .with("DBInstanceIdentifier", Cell::text(db.identifier.as_str()))
        .with("DBInstanceClass", text_or_empty(&db.instance_class))
        .with("Engine", text_or_empty(&db.engine))
        .with("DBInstanceStatus", text_or_empty(&db.status))
        .with("MultiAZ", db.multi_az.map_or(Cell::Empty, Cell::Bool))
        .with("AvailabilityZone", text_or_empty(&db.availability_zone))
        .with("StorageType", text_or_empty(&db.storage_type))
        .with(
            "AllocatedStorage",
            db.allocated_storage_gb
                .map_or(Cell::Empty, |size| Cell::text(format!("{} GB", size))),
        )
}
