mod cloud_watch_metrics_client;
mod config;
mod ec2_instance_client;
mod ecs_service_client;
mod error;
mod inventory;
mod metric;
mod rds_instance_client;
mod report;
mod spreadsheet;
mod table;
mod time_range;

use crate::cloud_watch_metrics_client::CloudWatchMetricsClient;
use crate::config::ReportConfig;
use crate::ec2_instance_client::Ec2InstanceClient;
use crate::ecs_service_client::EcsServiceClient;
use crate::rds_instance_client::RdsInstanceClient;
use crate::report::{run_reports, Ec2Report, EcsReport, RdsReport, Report};
use crate::time_range::TimeRange;
use rusoto_cloudwatch::CloudWatchClient;
use rusoto_core::Region;
use rusoto_ec2::Ec2Client;
use rusoto_ecs::EcsClient;
use rusoto_rds::RdsClient;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "fleet_report=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting AWS report generation");
    let config = ReportConfig::load()?;
    let region = config.region()?;
    info!(region = region.name(), days = config.metric_days, "Loaded configuration");

    let now = chrono::Local::now();
    let time_range =
        TimeRange::lookback(now.with_timezone(&chrono::Utc), config.metric_days)?;
    let reports = build_reports(&region, PathBuf::from("."));

    let summary = run_reports(&reports, &time_range, &now).await;
    info!(
        written = summary.written.len(),
        skipped = summary.skipped.len(),
        failed = summary.failed.len(),
        "All reports processed"
    );
    Ok(())
}

fn build_reports(region: &Region, output_dir: PathBuf) -> Vec<Box<dyn Report + Send + Sync>> {
    let cloud_watch =
        || CloudWatchMetricsClient::new_with_client(CloudWatchClient::new(region.clone()));
    vec![
        Box::new(Ec2Report::new(
            Ec2InstanceClient::new_with_client(Ec2Client::new(region.clone())),
            cloud_watch(),
            output_dir.clone(),
        )),
        Box::new(RdsReport::new(
            RdsInstanceClient::new_with_client(RdsClient::new(region.clone())),
            cloud_watch(),
            output_dir.clone(),
        )),
        Box::new(EcsReport::new(
            EcsServiceClient::new_with_client(EcsClient::new(region.clone())),
            cloud_watch(),
            output_dir,
        )),
    ]
}
