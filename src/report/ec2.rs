use crate::cloud_watch_metrics_client::{DescribeAlarms, FetchMetrics, MetricQuery};
use crate::ec2_instance_client::Ec2Instance;
use crate::error::ReportError;
use crate::inventory::Describe;
use crate::report::{export, metrics_row, Report};
use crate::spreadsheet::SheetLayout;
use crate::table::{Cell, Row, Table};
use crate::time_range::TimeRange;
use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, Local};
use std::path::PathBuf;
use tracing::{debug, info};

pub const NAMESPACE: &str = "AWS/EC2";
pub const METRICS: [&str; 4] = [
    "CPUCreditUsage",
    "CPUUtilization",
    "MetadataNoToken",
    "CPUCreditBalance",
];
const ALARM_METRIC: &str = "CPUUtilization";
const SHEET_NAME: &str = "EC2_Report";
const FILE_PREFIX: &str = "EC2";
const MISSING: &str = "–";
const DEFAULT_PLATFORM: &str = "Linux/UNIX";
const LAUNCH_TIME_OFFSET_SECONDS: i32 = 5 * 3600 + 30 * 60;

pub struct Ec2Report<D, M> {
    inventory: D,
    metrics: M,
    output_dir: PathBuf,
}

impl<D, M> Ec2Report<D, M>
where
    D: Describe<Resource = Ec2Instance> + Send + Sync,
    M: FetchMetrics + DescribeAlarms + Send + Sync,
{
    pub fn new(inventory: D, metrics: M, output_dir: PathBuf) -> Self {
        Ec2Report {
            inventory,
            metrics,
            output_dir,
        }
    }

    /// Instance table on top, metrics table below it; `None` when there are no instances.
    pub async fn build_layout(
        &self,
        time_range: &TimeRange,
    ) -> Result<Option<SheetLayout>, ReportError> {
        let instances = self.inventory.describe_all().await?;
        if instances.is_empty() {
            info!("No EC2 instances found");
            return Ok(None);
        }

        let mut detail_rows = Vec::with_capacity(instances.len());
        for instance in &instances {
            let has_alarms = self
                .metrics
                .has_alarms(NAMESPACE, ALARM_METRIC, &dimensions(instance))
                .await?;
            detail_rows.push(detail_row(instance, has_alarms));
        }

        let mut metric_rows = Vec::with_capacity(instances.len());
        for instance in &instances {
            let query = MetricQuery {
                namespace: NAMESPACE,
                dimensions: dimensions(instance),
                metric_names: &METRICS,
            };
            let metrics = metrics_row(&self.metrics, &query, &instance.name, time_range).await;
            metric_rows.push(
                Row::new()
                    .with("Name", Cell::text(instance.name.as_str()))
                    .merged(metrics),
            );
        }

        let metrics_table = Table::from_rows(&metric_rows);
        debug!("EC2 metrics (Min, Max, Avg)\n{}", metrics_table.render());
        Ok(Some(SheetLayout::stacked(
            SHEET_NAME,
            Table::from_rows(&detail_rows),
            metrics_table,
        )))
    }
}

#[async_trait]
impl<D, M> Report for Ec2Report<D, M>
where
    D: Describe<Resource = Ec2Instance> + Send + Sync,
    M: FetchMetrics + DescribeAlarms + Send + Sync,
{
    fn name(&self) -> &'static str {
        "EC2"
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

fn dimensions(instance: &Ec2Instance) -> Vec<(&'static str, String)> {
    vec![("InstanceId", instance.instance_id.clone())]
}

fn text_or_missing(value: &Option<String>) -> Cell {
    Cell::optional_text(value.clone(), MISSING)
}

fn text_or_empty(value: &Option<String>) -> Cell {
    value.clone().map_or(Cell::Empty, Cell::Text)
}

fn format_launch_time(raw: &str) -> String {
    match DateTime::parse_from_rfc3339(raw) {
        Ok(launch_time) => launch_time
            .with_timezone(&FixedOffset::east(LAUNCH_TIME_OFFSET_SECONDS))
            .format("%Y/%m/%d %H:%M GMT+5:30")
            .to_string(),
        Err(_) => raw.to_string(),
    }
}

fn detail_row(instance: &Ec2Instance, has_alarms: bool) -> Row {
    Row::new()
        .with("Name", Cell::text(instance.name.as_str()))
        .with("Instance ID", Cell::text(instance.instance_id.as_str()))
        .with("Instance state", text_or_empty(&instance.state))
        .with("Instance type", text_or_empty(&instance.instance_type))
        .with("Status check", Cell::text(instance.status_check.as_str()))
        .with(
            "Alarm status",
            Cell::text(if has_alarms { "View alarms" } else { "No alarms" }),
        )
        .with("Availability Zone", text_or_empty(&instance.availability_zone))
        .with("Public IPv4 DNS", text_or_missing(&instance.public_dns_name))
        .with("Public IPv4 address", text_or_missing(&instance.public_ip_address))
        .with("Elastic IP", text_or_missing(&instance.elastic_ip))
        .with("IPv6 IPs", Cell::text(instance.ipv6_addresses.join(", ")))
        .with("Monitoring", text_or_empty(&instance.monitoring))
        .with(
            "Security group name",
            Cell::text(instance.security_groups.join(", ")),
        )
        .with("Key name", text_or_missing(&instance.key_name))
        .with(
            "Launch time",
            instance
                .launch_time
                .as_deref()
                .map_or(Cell::Empty, |raw| Cell::text(format_launch_time(raw))),
        )
        .with(
            "Platform details",
            Cell::optional_text(instance.platform_details.clone(), DEFAULT_PLATFORM),
        )
        .with("Managed", Cell::text("FALSE"))
        .with("Operator", Cell::text(MISSING))
        .with(
            "Hostname type",
            Cell::text(format!(
                "ip-name: {}",
                instance.private_dns_name.as_deref().unwrap_or("")
            )),
        )
        .with("AWS Compute Optimizer finding", Cell::text("Enable Opt In"))
}
