use std::ops::Deref;
use std::sync::Arc;
use std::time::Duration;

/// Ordered waits between retry attempts.
///
/// The length is the maximum number of attempts. The schedule is shared and
/// never modified once attached to a client.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct RetrySchedule(Arc<[Duration]>);

impl RetrySchedule {
    pub fn new(waits: impl Into<Vec<Duration>>) -> Self {
        let waits: Vec<Duration> = waits.into();
        Self(waits.into())
    }

    /// 1s, 3s, 5s, 10s.
    pub fn canonical() -> Self {
        Self::new([
            Duration::from_secs(1),
            Duration::from_secs(3),
            Duration::from_secs(5),
            Duration::from_secs(10),
        ])
    }

    pub fn as_slice(&self) -> &[Duration] {
        &self.0
    }
}

impl Default for RetrySchedule {
    fn default() -> Self {
        Self::canonical()
    }
}

impl Deref for RetrySchedule {
    type Target = [Duration];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<Vec<Duration>> for RetrySchedule {
    fn from(waits: Vec<Duration>) -> Self {
        Self::new(waits)
    }
}

impl<const N: usize> From<[Duration; N]> for RetrySchedule {
    fn from(waits: [Duration; N]) -> Self {
        Self::new(waits)
    }
}

impl FromIterator<Duration> for RetrySchedule {
    fn from_iter<I: IntoIterator<Item = Duration>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Tuning for the default `reqwest` transport.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TransportOptions {
    /// Total per-request timeout.
    pub timeout: Duration,
    pub connect_timeout: Duration,
    pub tcp_keepalive: Duration,
    pub pool_max_idle_per_host: usize,
    pub pool_idle_timeout: Duration,
}

impl Default for TransportOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(15),
            connect_timeout: Duration::from_secs(15),
            tcp_keepalive: Duration::from_secs(15),
            pool_max_idle_per_host: 10,
            pool_idle_timeout: Duration::from_secs(30),
        }
    }
}

/// Configures retries, default headers and the default transport.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ClientOptions {
    /// Enables the canonical retry schedule when no custom one is set.
    pub with_retry: bool,
    /// Custom schedule; takes precedence over `with_retry`.
    pub retry_schedule: Option<RetrySchedule>,
    /// Headers added to every request, in the order they were set. A later
    /// entry replaces an earlier one with the same name, ignoring case.
    /// Per-call headers override them.
    pub default_headers: Vec<(String, String)>,
    pub transport: TransportOptions,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            with_retry: true,
            retry_schedule: None,
            default_headers: Vec::new(),
            transport: TransportOptions::default(),
        }
    }
}

impl ClientOptions {
    /// The schedule a client built from these options uses, if any.
    pub fn resolved_retry_schedule(&self) -> Option<RetrySchedule> {
        match &self.retry_schedule {
            Some(schedule) => Some(schedule.clone()),
            None if self.with_retry => Some(RetrySchedule::canonical()),
            None => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::{ClientOptions, RetrySchedule};

    #[test]
    fn canonical_schedule() {
        assert_eq!(
            RetrySchedule::canonical().as_slice(),
            &[
                Duration::from_secs(1),
                Duration::from_secs(3),
                Duration::from_secs(5),
                Duration::from_secs(10),
            ]
        );
        assert_eq!(RetrySchedule::default(), RetrySchedule::canonical());
    }

    #[test]
    fn default_options_retry_with_canonical_schedule() {
        let options = ClientOptions::default();
        assert!(options.with_retry);
        assert!(options.default_headers.is_empty());
        assert_eq!(
            options.resolved_retry_schedule(),
            Some(RetrySchedule::canonical())
        );
    }

    #[test]
    fn retry_disabled_resolves_to_none() {
        let options = ClientOptions {
            with_retry: false,
            ..ClientOptions::default()
        };
        assert_eq!(options.resolved_retry_schedule(), None);
    }

    #[test]
    fn custom_schedule_wins_over_flag() {
        let custom = RetrySchedule::new([Duration::from_millis(1), Duration::from_millis(2)]);
        let options = ClientOptions {
            with_retry: false,
            retry_schedule: Some(custom.clone()),
            ..ClientOptions::default()
        };
        assert_eq!(options.resolved_retry_schedule(), Some(custom));
    }

    #[test]
    fn schedule_collects_from_iterator() {
        let schedule: RetrySchedule = (1..=3).map(Duration::from_millis).collect();
        assert_eq!(schedule.len(), 3);
        assert_eq!(schedule[2], Duration::from_millis(3));
    }
}
