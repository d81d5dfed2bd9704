use crate::error::ReportError;
use crate::time_range::TimeRange;
use async_trait::async_trait;
use rusoto_cloudwatch::{
    CloudWatch, CloudWatchClient, DescribeAlarmsForMetricInput, Dimension, GetMetricDataInput,
    Metric, MetricDataQuery, MetricStat,
};
use tracing::{debug, warn};

const PERIOD_SECONDS: i64 = 300;
const STATISTIC: &str = "Average";
const SCAN_BY: &str = "TimestampAscending";
const QUERY_ID_PREFIX: &str = "m";

/// A batch of metrics sharing one namespace and dimension set.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricQuery {
    pub namespace: &'static str,
    pub dimensions: Vec<(&'static str, String)>,
    pub metric_names: &'static [&'static str],
}

impl MetricQuery {
    fn cloud_watch_dimensions(&self) -> Vec<Dimension> {
        to_dimensions(&self.dimensions)
    }

    fn metric_data_queries(&self) -> Vec<MetricDataQuery> {
        self.metric_names
            .iter()
            .enumerate()
            .map(|(index, metric_name)| MetricDataQuery {
                id: format!("{}{}", QUERY_ID_PREFIX, index),
                metric_stat: Some(MetricStat {
                    metric: Metric {
                        namespace: Some(self.namespace.to_string()),
                        metric_name: Some(metric_name.to_string()),
                        dimensions: Some(self.cloud_watch_dimensions()),
                    },
                    period: PERIOD_SECONDS,
                    stat: STATISTIC.to_string(),
                    ..Default::default()
                }),
                return_data: Some(true),
                ..Default::default()
            })
            .collect()
    }

    fn metric_index(&self, query_id: &str) -> Option<usize> {
        query_id
            .strip_prefix(QUERY_ID_PREFIX)?
            .parse::<usize>()
            .ok()
            .filter(|index| *index < self.metric_names.len())
    }
}

fn to_dimensions(dimensions: &[(&'static str, String)]) -> Vec<Dimension> {
    dimensions
        .iter()
        .map(|(name, value)| Dimension {
            name: name.to_string(),
            value: value.clone(),
        })
        .collect()
}

/// Samples per metric, in the order the metrics were requested.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MetricSeries {
    series: Vec<(&'static str, Vec<f64>)>,
}

impl MetricSeries {
    pub fn empty(metric_names: &[&'static str]) -> Self {
        MetricSeries {
            series: metric_names.iter().map(|name| (*name, Vec::new())).collect(),
        }
    }

    pub fn extend_metric(&mut self, metric_name: &str, values: Vec<f64>) {
        if let Some((_, samples)) = self.series.iter_mut().find(|(name, _)| *name == metric_name) {
            samples.extend(values);
        }
    }

    pub fn values(&self, metric_name: &str) -> Option<&[f64]> {
        self.series
            .iter()
            .find(|(name, _)| *name == metric_name)
            .map(|(_, samples)| samples.as_slice())
    }
}

#[async_trait]
pub trait FetchMetrics {
    async fn fetch_metric_values(
        &self,
        query: &MetricQuery,
        time_range: &TimeRange,
    ) -> Result<MetricSeries, ReportError>;
}

#[async_trait]
pub trait DescribeAlarms {
    async fn has_alarms(
        &self,
        namespace: &str,
        metric_name: &str,
        dimensions: &[(&'static str, String)],
    ) -> Result<bool, ReportError>;
}

pub struct CloudWatchMetricsClient {
    client: CloudWatchClient,
}

#[async_trait]
impl FetchMetrics for CloudWatchMetricsClient {
    async fn fetch_metric_values(
        &self,
        query: &MetricQuery,
        time_range: &TimeRange,
    ) -> Result<MetricSeries, ReportError> {
        let mut series = MetricSeries::empty(query.metric_names);
        let mut next_token: Option<String> = None;
        loop {
            let output = self
                .client
                .get_metric_data(GetMetricDataInput {
                    metric_data_queries: query.metric_data_queries(),
                    start_time: time_range.start_timestamp(),
                    end_time: time_range.end_timestamp(),
                    scan_by: Some(SCAN_BY.to_string()),
                    next_token: next_token.take(),
                    ..Default::default()
                })
                .await?;

            for result in output.metric_data_results.unwrap_or_default() {
                let id = result.id.unwrap_or_default();
                match query.metric_index(&id) {
                    Some(index) => {
                        series.extend_metric(
                            query.metric_names[index],
                            result.values.unwrap_or_default(),
                        );
                    }
                    None => warn!(query_id = %id, "ignoring unexpected metric data result"),
                }
            }

            match output.next_token {
                Some(token) if !token.is_empty() => {
                    debug!(namespace = query.namespace, "fetching next metric data page");
                    next_token = Some(token);
                }
                _ => break,
            }
        }
        Ok(series)
    }
}

#[async_trait]
impl DescribeAlarms for CloudWatchMetricsClient {
    async fn has_alarms(
        &self,
        namespace: &str,
        metric_name: &str,
        dimensions: &[(&'static str, String)],
    ) -> Result<bool, ReportError> {
        let output = self
            .client
            .describe_alarms_for_metric(DescribeAlarmsForMetricInput {
                namespace: namespace.to_string(),
                metric_name: metric_name.to_string(),
                dimensions: Some(to_dimensions(dimensions)),
                ..Default::default()
            })
            .await?;
        Ok(output
            .metric_alarms
            .map_or(false, |alarms| !alarms.is_empty()))
    }
}

impl CloudWatchMetricsClient {
    pub fn new_with_client(client: CloudWatchClient) -> Self {
        CloudWatchMetricsClient { client }
    }
}
