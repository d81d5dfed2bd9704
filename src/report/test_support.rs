use crate::cloud_watch_metrics_client::{DescribeAlarms, FetchMetrics, MetricQuery, MetricSeries};
use crate::error::ReportError;
use crate::inventory::Describe;
use crate::time_range::TimeRange;
use async_trait::async_trait;
use chrono::{DateTime, Local, TimeZone, Utc};
use std::sync::Mutex;

pub fn range() -> TimeRange {
    TimeRange::lookback(Utc.ymd(2024, 5, 6).and_hms(7, 8, 9), 90).unwrap()
}

pub fn now() -> DateTime<Local> {
    Local.ymd(2024, 5, 6).and_hms(7, 8, 9)
}

pub struct FakeInventory<T> {
    resources: Vec<T>,
    fail: bool,
}

impl<T> FakeInventory<T> {
    pub fn new(resources: Vec<T>) -> Self {
        FakeInventory {
            resources,
            fail: false,
        }
    }

    pub fn failing() -> Self {
        FakeInventory {
            resources: Vec::new(),
            fail: true,
        }
    }
}

#[async_trait]
impl<T: Clone + Send + Sync> Describe for FakeInventory<T> {
    type Resource = T;

    async fn describe_all(&self) -> Result<Vec<T>, ReportError> {
        if self.fail {
            return Err(ReportError::NoneValue);
        }
        Ok(self.resources.clone())
    }
}

/// Returns the same series for every resource, except the ones told to fail.
pub struct FakeMetrics {
    series: Vec<(&'static str, Vec<f64>)>,
    failing_resources: Vec<&'static str>,
    alarmed_resources: Vec<&'static str>,
    queries: Mutex<Vec<MetricQuery>>,
}

impl FakeMetrics {
    pub fn with_series(series: Vec<(&'static str, Vec<f64>)>) -> Self {
        FakeMetrics {
            series,
            failing_resources: Vec::new(),
            alarmed_resources: Vec::new(),
            queries: Mutex::new(Vec::new()),
        }
    }

    pub fn failing_for(resources: Vec<&'static str>) -> Self {
        FakeMetrics {
            failing_resources: resources,
            ..FakeMetrics::with_series(Vec::new())
        }
    }

    pub fn with_alarms(mut self, resources: Vec<&'static str>) -> Self {
        self.alarmed_resources = resources;
        self
    }

    pub fn queries(&self) -> Vec<MetricQuery> {
        self.queries.lock().unwrap().clone()
    }
}

#[async_trait]
impl FetchMetrics for FakeMetrics {
    async fn fetch_metric_values(
        &self,
        query: &MetricQuery,
        _time_range: &TimeRange,
    ) -> Result<MetricSeries, ReportError> {
        self.queries.lock().unwrap().push(query.clone());
        let failing = query
            .dimensions
            .iter()
            .any(|(_, value)| self.failing_resources.iter().any(|name| *name == value.as_str()));
        if failing {
            return Err(ReportError::NoneValue);
        }
        let mut series = MetricSeries::empty(query.metric_names);
        for (metric_name, values) in &self.series {
            series.extend_metric(metric_name, values.clone());
        }
        Ok(series)
    }
}

#[async_trait]
impl DescribeAlarms for FakeMetrics {
    async fn has_alarms(
        &self,
        _namespace: &str,
        _metric_name: &str,
        dimensions: &[(&'static str, String)],
    ) -> Result<bool, ReportError> {
        Ok(dimensions
            .iter()
            .any(|(_, value)| self.alarmed_resources.iter().any(|name| *name == value.as_str())))
    }
}
