use anyhow::Result;
use prometheus::{opts, IntCounter, IntCounterVec, IntGauge, Registry};
use strum::AsRefStr;
use tracing::warn;

#[derive(Clone, Copy, PartialEq, Eq, Debug, AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum RequestOutcome {
    // Answered from the cache without launching anything.
    Cached,
    // Attached to a computation that was already in flight.
    Duplicate,
    // Launched from the nearest cached ancestor.
    Rebased,
    // Launched from scratch.
    New,
}

#[derive(Debug)]
pub struct TaskQueueMetrics {
    task_requests: IntCounterVec,
    task_failures: IntCounter,
    cache_size: IntGauge,
    in_flight_tasks: IntGauge,
}

impl TaskQueueMetrics {
    pub fn new(prefix: &str) -> Result<Self> {
        Ok(Self {
            task_requests: IntCounterVec::new(
                opts!(
                    format!("{prefix}_task_requests_total"),
                    "Number of task requests by outcome",
                ),
                &["outcome"],
            )?,

            task_failures: IntCounter::new(
                format!("{prefix}_task_failures_total"),
                "Number of launched tasks that failed or panicked",
            )?,

            cache_size: IntGauge::new(
                format!("{prefix}_cache_size"),
                "Number of completed values held in the cache",
            )?,

            in_flight_tasks: IntGauge::new(
                format!("{prefix}_in_flight_tasks"),
                "Number of computations currently in flight",
            )?,
        })
    }

    pub fn register(&self, registry: &Registry) -> Result<()> {
        registry.register(Box::new(self.task_requests.clone()))?;
        registry.register(Box::new(self.task_failures.clone()))?;
        registry.register(Box::new(self.cache_size.clone()))?;
        registry.register(Box::new(self.in_flight_tasks.clone()))?;

        Ok(())
    }

    pub fn record_request(&self, outcome: RequestOutcome) {
        match self
            .task_requests
            .get_metric_with_label_values(&[outcome.as_ref()])
        {
            Ok(counter) => counter.inc(),
            Err(error) => warn!("unable to record task request ({outcome:?}): {error:?}"),
        }
    }

    pub fn record_failure(&self) {
        self.task_failures.inc();
    }

    pub fn set_sizes(&self, cache_size: usize, in_flight_tasks: usize) {
        self.cache_size
            .set(i64::try_from(cache_size).unwrap_or(i64::MAX));
        self.in_flight_tasks
            .set(i64::try_from(in_flight_tasks).unwrap_or(i64::MAX));
    }

    #[must_use]
    pub fn requests(&self, outcome: RequestOutcome) -> u64 {
        self.task_requests
            .get_metric_with_label_values(&[outcome.as_ref()])
            .map_or(0, |counter| counter.get())
    }

    #[must_use]
    pub fn failures(&self) -> u64 {
        self.task_failures.get()
    }
}

#[cfg(test)]
mod tests {
    use prometheus::TextEncoder;
    use test_case::test_case;

    use super::*;

    #[test_case(RequestOutcome::Cached => "cached")]
    #[test_case(RequestOutcome::Duplicate => "duplicate")]
    #[test_case(RequestOutcome::Rebased => "rebased")]
    #[test_case(RequestOutcome::New => "new")]
    fn test_request_outcome_labels(outcome: RequestOutcome) -> String {
        outcome.as_ref().to_owned()
    }

    #[test]
    fn test_metrics_register_and_count() -> Result<()> {
        let registry = Registry::new();
        let metrics = TaskQueueMetrics::new("state_at_slot")?;

        metrics.register(&registry)?;
        metrics.record_request(RequestOutcome::New);
        metrics.record_request(RequestOutcome::Cached);
        metrics.record_request(RequestOutcome::Cached);
        metrics.record_failure();
        metrics.set_sizes(3, 1);

        assert_eq!(metrics.requests(RequestOutcome::New), 1);
        assert_eq!(metrics.requests(RequestOutcome::Cached), 2);
        assert_eq!(metrics.requests(RequestOutcome::Rebased), 0);
        assert_eq!(metrics.failures(), 1);

        let mut buffer = String::new();

        TextEncoder::new().encode_utf8(registry.gather().as_slice(), &mut buffer)?;

        assert!(buffer.contains("state_at_slot_task_requests_total{outcome=\"cached\"} 2"));
        assert!(buffer.contains("state_at_slot_cache_size 3"));
        assert!(buffer.contains("state_at_slot_in_flight_tasks 1"));

        Ok(())
    }

    #[test]
    fn test_metrics_cannot_be_registered_twice() -> Result<()> {
        let registry = Registry::new();
        let metrics = TaskQueueMetrics::new("checkpoint_states")?;

        metrics.register(&registry)?;

        assert!(metrics.register(&registry).is_err());

        Ok(())
    }
}
