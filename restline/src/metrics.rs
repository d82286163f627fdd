//! Application metrics contract and the sink-backed adapter

use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::error::Result;

/// Adapter to track application performance metrics.
///
/// Optional on the [`Service`](crate::service::Service); when absent the
/// record stage is skipped. Failures inside an implementation must stay
/// inside it (log and move on) — they never alter a response.
pub trait Metrics: Send + Sync {
    /// Record an increment of `count` against `stat`.
    fn incr(&self, stat: &str, count: i64);

    /// Record the time taken to complete an operation.
    fn timing(&self, stat: &str, delta: Duration);
}

/// Stopwatch that records into a metrics adapter when explicitly
/// stopped. Dropping it without stopping records nothing.
pub struct Timer<'a> {
    metrics: &'a dyn Metrics,
    stat: String,
    started: Instant,
}

impl<'a> Timer<'a> {
    /// Start a timer for `stat`.
    pub fn new(metrics: &'a dyn Metrics, stat: impl Into<String>) -> Self {
        Self {
            metrics,
            stat: stat.into(),
            started: Instant::now(),
        }
    }

    /// Stop the timer and record the elapsed time.
    pub fn stop(self) {
        self.metrics.timing(&self.stat, self.started.elapsed());
    }
}

/// Raw client a [`ServiceMetrics`] adapter fans out to, in the statsd
/// style: tags annotate every stat, failures are reported to the caller.
pub trait MetricsSink: Send + Sync {
    fn incr(&self, stat: &str, tags: &[String], value: f64) -> Result<()>;
    fn timing(&self, stat: &str, delta: Duration, tags: &[String], rate: f64) -> Result<()>;
}

/// Metrics adapter that forwards to a raw sink, annotating stats with a
/// static tag list and logging sink failures so they never reach the
/// pipeline.
pub struct ServiceMetrics {
    sink: Arc<dyn MetricsSink>,
    tags: Vec<String>,
}

impl ServiceMetrics {
    pub fn new(sink: impl MetricsSink + 'static) -> Self {
        Self {
            sink: Arc::new(sink),
            tags: Vec::new(),
        }
    }

    /// Tags attached to every recorded stat.
    pub fn with_tags(mut self, tags: Vec<String>) -> Self {
        self.tags = tags;
        self
    }
}

impl Metrics for ServiceMetrics {
    fn incr(&self, stat: &str, count: i64) {
        if let Err(err) = self.sink.incr(stat, &self.tags, count as f64) {
            tracing::error!(stat, error = %err, "metrics increment failed");
        }
    }

    fn timing(&self, stat: &str, delta: Duration) {
        if let Err(err) = self.sink.timing(stat, delta, &self.tags, 1.0) {
            tracing::error!(stat, error = %err, "metrics timing failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::error::Error;

    #[derive(Default)]
    struct CollectingSink {
        incrs: Mutex<Vec<(String, f64)>>,
        timings: Mutex<Vec<String>>,
    }

    impl MetricsSink for Arc<CollectingSink> {
        fn incr(&self, stat: &str, _tags: &[String], value: f64) -> Result<()> {
            self.incrs.lock().unwrap().push((stat.to_string(), value));
            Ok(())
        }

        fn timing(&self, stat: &str, _delta: Duration, _tags: &[String], _rate: f64) -> Result<()> {
            self.timings.lock().unwrap().push(stat.to_string());
            Ok(())
        }
    }

    struct FailingSink;

    impl MetricsSink for FailingSink {
        fn incr(&self, _stat: &str, _tags: &[String], _value: f64) -> Result<()> {
            Err(Error::Metrics("sink unavailable".to_string()))
        }

        fn timing(&self, _stat: &str, _delta: Duration, _tags: &[String], _rate: f64) -> Result<()> {
            Err(Error::Metrics("sink unavailable".to_string()))
        }
    }

    #[test]
    fn service_metrics_forwards_to_the_sink() {
        let sink = Arc::new(CollectingSink::default());
        let metrics = ServiceMetrics::new(Arc::clone(&sink)).with_tags(vec!["env:test".to_string()]);

        metrics.incr("widget_insertOne", 1);
        metrics.timing("widget_insertOne", Duration::from_millis(5));

        assert_eq!(
            sink.incrs.lock().unwrap().as_slice(),
            &[("widget_insertOne".to_string(), 1.0)]
        );
        assert_eq!(sink.timings.lock().unwrap().len(), 1);
    }

    #[test]
    fn sink_failures_are_swallowed() {
        let metrics = ServiceMetrics::new(FailingSink);
        metrics.incr("widget_insertOne", 1);
        metrics.timing("widget_insertOne", Duration::from_millis(5));
    }

    #[test]
    fn stopped_timers_record_a_timing() {
        let sink = Arc::new(CollectingSink::default());
        let metrics = ServiceMetrics::new(Arc::clone(&sink));

        let timer = Timer::new(&metrics, "widget_findMany");
        timer.stop();

        assert_eq!(sink.timings.lock().unwrap().as_slice(), &["widget_findMany".to_string()]);
    }

    #[test]
    fn dropped_timers_record_nothing() {
        let sink = Arc::new(CollectingSink::default());
        let metrics = ServiceMetrics::new(Arc::clone(&sink));

        drop(Timer::new(&metrics, "widget_findMany"));

        assert!(sink.timings.lock().unwrap().is_empty());
    }
}
