//! Bounded retry around any query client

use super::{Bindings, QueryClient, QueryError, QueryResult};
use crate::rdf::Graph;
use std::time::Duration;
use tracing::{debug, warn};

/// Default number of attempts per call
pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;

/// Default pause between attempts
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_millis(1000);

/// Fixed-delay retry policy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Attempts per call, including the first one
    pub max_attempts: u32,
    /// Pause between two attempts
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            delay: DEFAULT_RETRY_DELAY,
        }
    }
}

/// Retries failed calls of the wrapped client.
///
/// Only failures are retried; a successful response with zero solutions is
/// returned as is. After `max_attempts` failures the call yields
/// [`QueryError::Unavailable`].
#[derive(Debug)]
pub struct RetryingClient<C> {
    inner: C,
    policy: RetryPolicy,
}

impl<C: QueryClient> RetryingClient<C> {
    pub fn new(inner: C, policy: RetryPolicy) -> Self {
        Self { inner, policy }
    }

    pub fn policy(&self) -> RetryPolicy {
        self.policy
    }

    pub fn inner(&self) -> &C {
        &self.inner
    }

    fn with_retry<T>(&self, op: &str, call: impl Fn(&C) -> QueryResult<T>) -> QueryResult<T> {
        let max_attempts = self.policy.max_attempts.max(1);
        let mut attempt = 1;
        loop {
            debug!("{} via {}: attempt {}/{}", op, self.inner.name(), attempt, max_attempts);
            match call(&self.inner) {
                Ok(value) => return Ok(value),
                Err(e) => {
                    warn!("{} attempt {}/{} failed: {}", op, attempt, max_attempts, e);
                    if attempt >= max_attempts {
                        return Err(QueryError::Unavailable {
                            attempts: attempt,
                            last: Box::new(e),
                        });
                    }
                }
            }
            if !self.policy.delay.is_zero() {
                std::thread::sleep(self.policy.delay);
            }
            attempt += 1;
        }
    }
}

impl<C: QueryClient> QueryClient for RetryingClient<C> {
    fn select(&self, query: &str) -> QueryResult<Vec<Bindings>> {
        self.with_retry("select", |c| c.select(query))
    }

    fn construct(&self, query: &str) -> QueryResult<Graph> {
        self.with_retry("construct", |c| c.construct(query))
    }

    fn name(&self) -> &str {
        self.inner.name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    /// Fails the first `failures` calls, then answers with no solutions
    #[derive(Debug)]
    struct Flaky {
        failures: u32,
        calls: AtomicU32,
    }

    impl Flaky {
        fn new(failures: u32) -> Self {
            Self {
                failures,
                calls: AtomicU32::new(0),
            }
        }
    }

    impl QueryClient for Flaky {
        fn select(&self, _query: &str) -> QueryResult<Vec<Bindings>> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            if n <= self.failures {
                Err(QueryError::Status {
                    status: 503,
                    body: "busy".into(),
                })
            } else {
                Ok(Vec::new())
            }
        }

        fn construct(&self, query: &str) -> QueryResult<Graph> {
            self.select(query).map(|_| Graph::new())
        }

        fn name(&self) -> &str {
            "flaky"
        }
    }

    fn no_delay(max_attempts: u32) -> RetryPolicy {
        RetryPolicy {
            max_attempts,
            delay: Duration::ZERO,
        }
    }

    #[test]
    fn default_policy_is_five_attempts_one_second_apart() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_attempts, 5);
        assert_eq!(policy.delay, Duration::from_millis(1000));
    }

    #[test]
    fn recovers_before_attempts_run_out() {
        let client = RetryingClient::new(Flaky::new(4), no_delay(5));
        assert!(client.select("q").unwrap().is_empty());
        assert_eq!(client.inner().calls.load(Ordering::SeqCst), 5);
    }

    #[test]
    fn gives_up_after_max_attempts() {
        let client = RetryingClient::new(Flaky::new(10), no_delay(5));
        match client.construct("q") {
            Err(QueryError::Unavailable { attempts, last }) => {
                assert_eq!(attempts, 5);
                assert!(matches!(*last, QueryError::Status { status: 503, .. }));
            }
            other => panic!("expected Unavailable, got {:?}", other),
        }
        assert_eq!(client.inner().calls.load(Ordering::SeqCst), 5);
    }

    #[test]
    fn empty_result_is_not_retried() {
        let client = RetryingClient::new(Flaky::new(0), no_delay(5));
        assert_eq!(client.count("q", "num").unwrap(), None);
        assert_eq!(client.inner().calls.load(Ordering::SeqCst), 1);
    }
}
