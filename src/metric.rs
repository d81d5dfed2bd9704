use crate::error::ReportError;
use bigdecimal::BigDecimal;
use std::convert::TryFrom;
use std::ops::{Add, Div};
use std::str::FromStr;

pub const NO_DATA_SENTINEL: &str = "Nil";
pub const ERROR_SENTINEL: &str = "Error";

const PERCENT_METRICS: [&str; 1] = ["Utilization"];
const GIGABYTE_METRICS: [&str; 4] = ["Bytes", "FreeableMemory", "SwapUsage", "Throughput"];

#[derive(Debug, PartialEq, Clone, Copy)]
pub struct AggregatedMetrics {
    pub average: f64,
    pub maximum: f64,
    pub minimum: f64,
}

impl AggregatedMetrics {
    /// Returns `Ok(None)` when there are no samples in the window.
    pub fn from_values(values: &[f64]) -> Result<Option<Self>, ReportError> {
        if values.is_empty() {
            return Ok(None);
        }
        let mut total = BigDecimal::from(0);
        let mut minimum = f64::INFINITY;
        let mut maximum = f64::NEG_INFINITY;
        let length = u32::try_from(values.len())?;
        let count = BigDecimal::from(length);
        for value in values {
            if !value.is_finite() {
                return Err(ReportError::ToPrimitive);
            }
            let decimal = to_decimal(*value)?;
            total = total.add(decimal);

            minimum = minimum.min(*value);
            maximum = maximum.max(*value);
        }

        let decimal_average = total.div(count);
        let average = decimal_average
            .to_string()
            .parse::<f64>()
            .map_err(|_| ReportError::ToPrimitive)?;
        Ok(Some(AggregatedMetrics {
            average,
            maximum,
            minimum,
        }))
    }
}

/// Shortest decimal that reads back as `value`.
fn to_decimal(value: f64) -> Result<BigDecimal, ReportError> {
    BigDecimal::from_str(&value.to_string()).map_err(|_| ReportError::ToPrimitive)
}

/// Outcome of reducing one metric for one resource.
#[derive(Debug, PartialEq, Clone, Copy)]
pub enum MetricStatistic {
    Values(AggregatedMetrics),
    NoData,
    Error,
}

impl MetricStatistic {
    pub fn from_values(values: &[f64]) -> Self {
        match AggregatedMetrics::from_values(values) {
            Ok(Some(aggregated)) => MetricStatistic::Values(aggregated),
            Ok(None) => MetricStatistic::NoData,
            Err(_) => MetricStatistic::Error,
        }
    }

    /// `[Min, Max, Avg]` display strings.
    pub fn cells(&self, metric_name: &str) -> [String; 3] {
        match self {
            MetricStatistic::Values(aggregated) => [
                format_metric_value(aggregated.minimum, metric_name),
                format_metric_value(aggregated.maximum, metric_name),
                format_metric_value(aggregated.average, metric_name),
            ],
            MetricStatistic::NoData => [
                NO_DATA_SENTINEL.to_string(),
                NO_DATA_SENTINEL.to_string(),
                NO_DATA_SENTINEL.to_string(),
            ],
            MetricStatistic::Error => [
                ERROR_SENTINEL.to_string(),
                ERROR_SENTINEL.to_string(),
                ERROR_SENTINEL.to_string(),
            ],
        }
    }
}

pub fn column_names(metric_name: &str) -> [String; 3] {
    [
        format!("{} Min", metric_name),
        format!("{} Max", metric_name),
        format!("{} Avg", metric_name),
    ]
}

pub fn format_metric_value(value: f64, metric_name: &str) -> String {
    if PERCENT_METRICS.iter().any(|part| metric_name.contains(part)) {
        format!("{:.2}%", value)
    } else if GIGABYTE_METRICS.iter().any(|part| metric_name.contains(part)) {
        format!("{:.2} GB", value / 1e9)
    } else {
        format!("{:.2}", value)
    }
}

#[cfg(test)]
mod tests {
    use crate::metric::{
        column_names, format_metric_value, AggregatedMetrics, MetricStatistic, ERROR_SENTINEL,
        NO_DATA_SENTINEL,
    };

    #[test]
    fn test_from_values() {
        let result = AggregatedMetrics::from_values(&[55.5, 28.8, 40.2, 51.3]);
        assert_eq!(
            result.unwrap(),
            Some(AggregatedMetrics {
                average: 43.95,
                maximum: 55.5,
                minimum: 28.8,
            })
        );
    }

    #[test]
    fn test_from_values_when_empty() {
        let result = AggregatedMetrics::from_values(&[]);
        assert_eq!(result.unwrap(), None);
    }

    #[test]
    fn test_negative_values_are_not_clamped() {
        let result = AggregatedMetrics::from_values(&[-4.0, -2.0]).unwrap().unwrap();
        assert_eq!(result.maximum, -2.0);
        assert_eq!(result.minimum, -4.0);
        assert_eq!(result.average, -3.0);
    }

    #[test]
    fn test_constant_series_average_matches_bounds() {
        let result = AggregatedMetrics::from_values(&[1.005, 1.005]).unwrap().unwrap();
        assert_eq!(result.average, 1.005);

        let cells = MetricStatistic::from_values(&[1.005, 1.005]).cells("ReadIOPS");
        assert_eq!(cells, ["1.00", "1.00", "1.00"]);
        let cells = MetricStatistic::from_values(&[2.675, 2.675, 2.675]).cells("ReadIOPS");
        assert_eq!(cells, ["2.67", "2.67", "2.67"]);
    }

    #[test]
    fn test_average_of_fractions() {
        let result = AggregatedMetrics::from_values(&[0.1, 0.2]).unwrap().unwrap();
        assert_eq!(result.average, 0.15);
    }

    #[test]
    fn test_non_finite_value_is_error() {
        assert_eq!(
            MetricStatistic::from_values(&[1.0, f64::NAN]),
            MetricStatistic::Error
        );
    }

    #[test]
    fn test_no_data_cells() {
        let cells = MetricStatistic::from_values(&[]).cells("CPUUtilization");
        assert_eq!(cells, [NO_DATA_SENTINEL, NO_DATA_SENTINEL, NO_DATA_SENTINEL]);
    }

    #[test]
    fn test_error_cells() {
        let cells = MetricStatistic::Error.cells("ReadIOPS");
        assert_eq!(cells, [ERROR_SENTINEL, ERROR_SENTINEL, ERROR_SENTINEL]);
    }

    #[test]
    fn test_value_cells() {
        let cells = MetricStatistic::from_values(&[10.0, 20.0, 30.0]).cells("ReadIOPS");
        assert_eq!(cells, ["10.00", "30.00", "20.00"]);
    }

    #[test]
    fn test_format_utilization() {
        assert_eq!(format_metric_value(42.5, "CPUUtilization"), "42.50%");
        assert_eq!(format_metric_value(7.0, "MemoryUtilization"), "7.00%");
    }

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_metric_value(2147483648.0, "FreeableMemory"), "2.15 GB");
        assert_eq!(format_metric_value(5e8, "NetworkBytesIn"), "0.50 GB");
        assert_eq!(format_metric_value(3e9, "ReadThroughput"), "3.00 GB");
    }

    #[test]
    fn test_format_plain() {
        assert_eq!(format_metric_value(3.14159, "DiskQueueDepth"), "3.14");
    }

    #[test]
    fn test_column_names() {
        assert_eq!(
            column_names("Deadlocks"),
            ["Deadlocks Min", "Deadlocks Max", "Deadlocks Avg"]
        );
    }
}
