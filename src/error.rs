use rusoto_cloudwatch::{DescribeAlarmsForMetricError, GetMetricDataError};
use rusoto_core::region::ParseRegionError;
use rusoto_core::RusotoError;
use rusoto_ec2::{DescribeAddressesError, DescribeInstanceStatusError, DescribeInstancesError};
use rusoto_ecs::{DescribeServicesError, ListClustersError, ListServicesError};
use rusoto_rds::DescribeDBInstancesError;
use std::num::TryFromIntError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("Value is None")]
    NoneValue,

    #[error("Failed to convert bigDecimal to primitive")]
    ToPrimitive,

    #[error("Failed to convert int")]
    TryFromIntError(#[from] TryFromIntError),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Invalid region: {0}")]
    Region(#[from] ParseRegionError),

    #[error("Failed to fetch metric data: {0}")]
    GetMetricData(#[from] RusotoError<GetMetricDataError>),

    #[error("Failed to describe alarms: {0}")]
    DescribeAlarms(#[from] RusotoError<DescribeAlarmsForMetricError>),

    #[error("Failed to describe instances: {0}")]
    DescribeInstances(#[from] RusotoError<DescribeInstancesError>),

    #[error("Failed to describe instance status: {0}")]
    DescribeInstanceStatus(#[from] RusotoError<DescribeInstanceStatusError>),

    #[error("Failed to describe addresses: {0}")]
    DescribeAddresses(#[from] RusotoError<DescribeAddressesError>),

    #[error("Failed to describe db instances: {0}")]
    DescribeDbInstances(#[from] RusotoError<DescribeDBInstancesError>),

    #[error("Failed to list clusters: {0}")]
    ListClusters(#[from] RusotoError<ListClustersError>),

    #[error("Failed to list services: {0}")]
    ListServices(#[from] RusotoError<ListServicesError>),

    #[error("Failed to describe services: {0}")]
    DescribeServices(#[from] RusotoError<DescribeServicesError>),

    #[error("Failed to write spreadsheet: {0}")]
    Spreadsheet(#[from] rust_xlsxwriter::XlsxError),
}

impl From<figment::Error> for ReportError {
    fn from(error: figment::Error) -> ReportError {
        ReportError::Config(error.to_string())
    }
}
