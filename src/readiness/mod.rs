//! Readiness polling
//!
//! [`ReadinessPoller::wait_for`] repeatedly lists the running containers that
//! match a filter, reduces them to distinct services and compares that count
//! against an [`Expectation`]. Every tick issues a fresh listing query and
//! nothing is mutated between ticks.
//!
//! By default a wait never gives up. A [`WaitPolicy`] can bound it by number
//! of attempts or elapsed time, and a [`CancellationToken`] is checked once per
//! tick.

use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;

use crate::abstractions::{ContainerFilter, ContainerObservation, ContainerRuntime};
use crate::display::ProgressDisplay;
use crate::error::{ComposeError, ErrorCode, Result};

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetState {
    Exist,
    NotExist,
}

/// The container population a wait is blocking on
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expectation {
    pub filter: ContainerFilter,
    /// Number of distinct services required for `Exist`
    pub expect: usize,
    pub state: TargetState,
}

impl Expectation {
    /// Exactly one distinct service matching the filter is running
    pub fn exists(filter: ContainerFilter) -> Self {
        Self {
            filter,
            expect: 1,
            state: TargetState::Exist,
        }
    }

    /// No container matching the filter is running
    pub fn vanishes(filter: ContainerFilter) -> Self {
        Self {
            filter,
            expect: 0,
            state: TargetState::NotExist,
        }
    }

    pub fn is_satisfied(&self, distinct: usize) -> bool {
        match self.state {
            TargetState::Exist => distinct == self.expect,
            TargetState::NotExist => distinct == 0,
        }
    }
}

impl fmt::Display for Expectation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.state {
            TargetState::Exist => write!(f, "{} ({} running)", self.filter, self.expect),
            TargetState::NotExist => write!(f, "{} to exit", self.filter),
        }
    }
}

/// Bounds on a single wait
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WaitPolicy {
    pub interval: Duration,
    pub max_attempts: Option<u32>,
    pub timeout: Option<Duration>,
}

impl Default for WaitPolicy {
    fn default() -> Self {
        Self {
            interval: DEFAULT_POLL_INTERVAL,
            max_attempts: None,
            timeout: None,
        }
    }
}

impl WaitPolicy {
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Give up after `attempts` polls. Every wait polls at least once, so 0
    /// behaves like 1.
    pub fn with_max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = Some(attempts);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn is_unbounded(&self) -> bool {
        self.max_attempts.is_none() && self.timeout.is_none()
    }
}

/// What a successful wait took
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitOutcome {
    pub attempts: u32,
    pub elapsed: Duration,
}

/// Strip a trailing `_<digits>` replica index from a container name
pub fn strip_replica_suffix(name: &str) -> &str {
    match name.rsplit_once('_') {
        Some((prefix, index))
            if !prefix.is_empty()
                && !index.is_empty()
                && index.bytes().all(|b| b.is_ascii_digit()) =>
        {
            prefix
        }
        _ => name,
    }
}

/// The service a container belongs to: compose's label, else the name
pub fn service_identity(container: &ContainerObservation) -> &str {
    container
        .compose_service()
        .unwrap_or_else(|| strip_replica_suffix(&container.name))
}

pub fn distinct_service_count(containers: &[ContainerObservation]) -> usize {
    containers
        .iter()
        .map(service_identity)
        .collect::<BTreeSet<_>>()
        .len()
}

pub struct ReadinessPoller {
    runtime: Arc<dyn ContainerRuntime>,
    display: Arc<dyn ProgressDisplay>,
    policy: WaitPolicy,
    cancel: CancellationToken,
}

impl ReadinessPoller {
    pub fn new(runtime: Arc<dyn ContainerRuntime>, display: Arc<dyn ProgressDisplay>) -> Self {
        Self {
            runtime,
            display,
            policy: WaitPolicy::default(),
            cancel: CancellationToken::new(),
        }
    }

    pub fn with_policy(mut self, policy: WaitPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn policy(&self) -> &WaitPolicy {
        &self.policy
    }

    /// Block until the running containers match the expectation
    pub async fn wait_for(&self, expectation: &Expectation) -> Result<WaitOutcome> {
        let started = Instant::now();
        let mut indicator = self
            .display
            .start_wait(&format!("Waiting for {}", expectation));
        let mut attempts = 0u32;

        loop {
            if self.cancel.is_cancelled() {
                indicator.fail("cancelled");
                return Err(self.cancelled(expectation));
            }

            attempts += 1;
            let containers = match self.runtime.list_running(&expectation.filter).await {
                Ok(containers) => containers,
                Err(e) => {
                    indicator.fail("container listing failed");
                    return Err(e);
                }
            };
            let distinct = distinct_service_count(&containers);

            tracing::trace!(
                "Poll {} for {}: {} containers, {} distinct services",
                attempts,
                expectation.filter,
                containers.len(),
                distinct
            );

            if expectation.is_satisfied(distinct) {
                let outcome = WaitOutcome {
                    attempts,
                    elapsed: started.elapsed(),
                };
                indicator.finish(&format!("{} ready", expectation.filter));
                tracing::debug!(
                    "{} satisfied after {} attempts ({:?})",
                    expectation,
                    outcome.attempts,
                    outcome.elapsed
                );
                return Ok(outcome);
            }

            indicator.tick(attempts, distinct);

            if let Some(max) = self.policy.max_attempts {
                if attempts >= max {
                    indicator.fail("gave up");
                    return Err(ComposeError::readiness(
                        ErrorCode::READINESS_ATTEMPTS_EXHAUSTED,
                        format!("condition not met after {} attempts", attempts),
                        Some(expectation.filter.to_string()),
                    ));
                }
            }

            let mut sleep_for = self.policy.interval;
            if let Some(timeout) = self.policy.timeout {
                let elapsed = started.elapsed();
                if elapsed >= timeout {
                    indicator.fail("timed out");
                    return Err(self.timed_out(expectation, timeout));
                }
                sleep_for = sleep_for.min(timeout - elapsed);
            }

            tokio::select! {
                _ = self.cancel.cancelled() => {
                    indicator.fail("cancelled");
                    return Err(self.cancelled(expectation));
                }
                _ = tokio::time::sleep(sleep_for) => {}
            }
        }
    }

    fn cancelled(&self, expectation: &Expectation) -> ComposeError {
        ComposeError::readiness(
            ErrorCode::READINESS_CANCELLED,
            "wait was cancelled",
            Some(expectation.filter.to_string()),
        )
    }

    fn timed_out(&self, expectation: &Expectation, timeout: Duration) -> ComposeError {
        ComposeError::readiness(
            ErrorCode::READINESS_TIMEOUT,
            format!("condition not met within {:?}", timeout),
            Some(expectation.filter.to_string()),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::abstractions::{MockContainerRuntime, COMPOSE_SERVICE_LABEL};
    use crate::display::RecordingDisplay;
    use proptest::prelude::*;

    fn poller(runtime: &MockContainerRuntime) -> ReadinessPoller {
        ReadinessPoller::new(Arc::new(runtime.clone()), Arc::new(RecordingDisplay::new()))
            .with_policy(WaitPolicy::default().with_interval(Duration::from_millis(1)))
    }

    fn observations(names: &[&str]) -> Vec<ContainerObservation> {
        names.iter().map(|n| ContainerObservation::new(*n)).collect()
    }

    #[test]
    fn test_strip_replica_suffix() {
        assert_eq!(strip_replica_suffix("web_1"), "web");
        assert_eq!(strip_replica_suffix("proj_metadata-db_12"), "proj_metadata-db");
        assert_eq!(strip_replica_suffix("redis"), "redis");
        assert_eq!(strip_replica_suffix("web_run_abc"), "web_run_abc");
        assert_eq!(strip_replica_suffix("web_"), "web_");
        assert_eq!(strip_replica_suffix("_1"), "_1");
    }

    #[test]
    fn test_distinct_count_example() {
        assert_eq!(
            distinct_service_count(&observations(&["web_1", "web_2", "worker_1"])),
            2
        );
    }

    #[test]
    fn test_compose_label_wins_over_name() {
        // A service literally named foo_2 must not collapse into foo.
        let containers = vec![
            ContainerObservation::new("proj_foo_1").with_label(COMPOSE_SERVICE_LABEL, "foo"),
            ContainerObservation::new("proj_foo_2_1").with_label(COMPOSE_SERVICE_LABEL, "foo_2"),
        ];
        assert_eq!(distinct_service_count(&containers), 2);
    }

    #[test]
    fn test_expectation_predicates() {
        let exist = Expectation::exists(ContainerFilter::default());
        assert!(!exist.is_satisfied(0));
        assert!(exist.is_satisfied(1));
        assert!(!exist.is_satisfied(2));

        let gone = Expectation::vanishes(ContainerFilter::by_label("dbinit"));
        assert!(gone.is_satisfied(0));
        assert!(!gone.is_satisfied(1));
    }

    #[tokio::test]
    async fn test_exist_keeps_polling_on_zero_and_two() {
        let runtime = MockContainerRuntime::new();
        runtime.push_snapshot(Vec::<String>::new());
        runtime.push_snapshot(["web_1", "worker_1"]);
        runtime.push_snapshot(["web_1"]);

        let outcome = poller(&runtime)
            .wait_for(&Expectation::exists(ContainerFilter::default()))
            .await
            .unwrap();

        assert_eq!(outcome.attempts, 3);
        assert_eq!(runtime.queries().len(), 3);
    }

    #[tokio::test]
    async fn test_replicas_count_as_one_service() {
        let runtime = MockContainerRuntime::new();
        runtime.push_snapshot(["proj_metadata-db_1", "proj_metadata-db_2"]);

        let outcome = poller(&runtime)
            .wait_for(&Expectation::exists(ContainerFilter::by_name("metadata-db")))
            .await
            .unwrap();
        assert_eq!(outcome.attempts, 1);
    }

    #[tokio::test]
    async fn test_not_exist_waits_for_zero() {
        let runtime = MockContainerRuntime::new();
        let dbinit = || {
            vec![ContainerObservation::new("proj_airflow-web_run_1").with_label("dbinit", "")]
        };
        runtime.push_observations(dbinit());
        runtime.push_observations(dbinit());
        runtime.push_observations(vec![ContainerObservation::new("proj_redis_1")]);

        let outcome = poller(&runtime)
            .wait_for(&Expectation::vanishes(ContainerFilter::by_label("dbinit")))
            .await
            .unwrap();

        assert_eq!(outcome.attempts, 3);
        assert!(runtime
            .queries()
            .iter()
            .all(|q| q.label.as_deref() == Some("dbinit")));
    }

    #[tokio::test]
    async fn test_max_attempts_bound() {
        let runtime = MockContainerRuntime::new();
        runtime.push_snapshot(Vec::<String>::new());

        let err = poller(&runtime)
            .with_policy(
                WaitPolicy::default()
                    .with_interval(Duration::from_millis(1))
                    .with_max_attempts(4),
            )
            .wait_for(&Expectation::exists(ContainerFilter::by_name("metadata-db")))
            .await
            .unwrap_err();

        assert_eq!(err.code(), ErrorCode::READINESS_ATTEMPTS_EXHAUSTED);
        assert_eq!(runtime.queries().len(), 4);
    }

    #[tokio::test]
    async fn test_zero_max_attempts_polls_once() {
        let runtime = MockContainerRuntime::new();
        runtime.push_snapshot(["proj_metadata-db_1"]);

        let outcome = poller(&runtime)
            .with_policy(WaitPolicy::default().with_max_attempts(0))
            .wait_for(&Expectation::exists(ContainerFilter::by_name("metadata-db")))
            .await
            .unwrap();
        assert_eq!(outcome.attempts, 1);

        let empty = MockContainerRuntime::new();
        let err = poller(&empty)
            .with_policy(WaitPolicy::default().with_max_attempts(0))
            .wait_for(&Expectation::exists(ContainerFilter::by_name("metadata-db")))
            .await
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::READINESS_ATTEMPTS_EXHAUSTED);
        assert_eq!(empty.queries().len(), 1);
    }

    #[tokio::test]
    async fn test_timeout_bound() {
        let runtime = MockContainerRuntime::new();
        runtime.push_snapshot(Vec::<String>::new());

        let err = poller(&runtime)
            .with_policy(
                WaitPolicy::default()
                    .with_interval(Duration::from_millis(5))
                    .with_timeout(Duration::from_millis(30)),
            )
            .wait_for(&Expectation::exists(ContainerFilter::default()))
            .await
            .unwrap_err();

        assert_eq!(err.code(), ErrorCode::READINESS_TIMEOUT);
        assert!(runtime.queries().len() >= 2);
    }

    #[tokio::test]
    async fn test_cancellation_stops_unbounded_wait() {
        let runtime = MockContainerRuntime::new();
        runtime.push_snapshot(Vec::<String>::new());
        let cancel = CancellationToken::new();

        let poller = poller(&runtime).with_cancellation(cancel.clone());
        assert!(poller.policy().is_unbounded());

        let trigger = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            cancel.cancel();
        });

        let err = poller
            .wait_for(&Expectation::exists(ContainerFilter::default()))
            .await
            .unwrap_err();
        trigger.await.unwrap();

        assert!(err.is_cancelled());
    }

    #[tokio::test]
    async fn test_already_cancelled_never_queries() {
        let runtime = MockContainerRuntime::new();
        let cancel = CancellationToken::new();
        cancel.cancel();

        let err = poller(&runtime)
            .with_cancellation(cancel)
            .wait_for(&Expectation::exists(ContainerFilter::default()))
            .await
            .unwrap_err();

        assert!(err.is_cancelled());
        assert!(runtime.queries().is_empty());
    }

    #[tokio::test]
    async fn test_progress_ticks_reported() {
        let runtime = MockContainerRuntime::new();
        runtime.push_snapshot(Vec::<String>::new());
        runtime.push_snapshot(["web_1"]);
        let display = RecordingDisplay::new();

        ReadinessPoller::new(Arc::new(runtime), Arc::new(display.clone()))
            .with_policy(WaitPolicy::default().with_interval(Duration::from_millis(1)))
            .wait_for(&Expectation::exists(ContainerFilter::by_name("web")))
            .await
            .unwrap();

        let messages = display.messages();
        assert_eq!(messages[0], "WAIT: Waiting for name=web (1 running)");
        assert_eq!(messages[1], "TICK: attempt 1, observed 0");
        assert_eq!(messages[2], "DONE: name=web ready");
    }

    proptest! {
        #[test]
        fn prop_distinct_count_matches_unique_prefixes(
            services in prop::collection::vec("[a-z][a-z-]{0,8}", 1..6),
            replicas in prop::collection::vec(1usize..4, 6),
        ) {
            let mut names = Vec::new();
            for (service, count) in services.iter().zip(replicas.iter()) {
                for index in 1..=*count {
                    names.push(format!("{}_{}", service, index));
                }
            }
            let containers: Vec<_> = names.iter().map(ContainerObservation::new).collect();
            let unique: BTreeSet<_> = services.iter().collect();

            prop_assert_eq!(distinct_service_count(&containers), unique.len());
        }

        #[test]
        fn prop_strip_is_idempotent_on_names_without_index(name in "[a-z-]{1,12}") {
            prop_assert_eq!(strip_replica_suffix(&name), name.as_str());
        }
    }
}
