use std::cell::Cell;
use std::sync::LazyLock;
use std::time::Duration;

use backon::{BlockingRetryable, ExponentialBuilder};
use regex::Regex;

use crate::UNCHANGED_SENTINEL;

const DEFAULT_MAX_ATTEMPTS: usize = 3;
const DEFAULT_BASE_DELAY: Duration = Duration::from_secs(1);
const DEFAULT_MAX_DELAY: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CorrectionOutcome {
    /// The service judged the text already correct.
    Unchanged,
    Corrected(String),
    Failed(String),
}

/// Text in, decision out. Implementations own retries; a call never panics
/// or errors, failures come back as [`CorrectionOutcome::Failed`].
pub trait CorrectionGateway {
    fn correct(&mut self, text: &str) -> CorrectionOutcome;
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum TransportError {
    #[error("transient: {0}")]
    Transient(String),
    #[error("fatal: {0}")]
    Fatal(String),
}

impl TransportError {
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Transient(_))
    }
}

/// A single raw exchange with the correction service.
pub trait TextCorrector {
    fn correct(&self, text: &str) -> Result<String, TransportError>;
}

static NON_RETRYABLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b40[013]\b|\bunauthori[sz]ed\b|\bforbidden\b|\binvalid[ _-](?:api[ _-])?(?:key|token|request|argument)s?\b",
    )
    .unwrap()
});

/// Classifies a failure message the way provider errors are usually worded:
/// authorization and request errors are not worth retrying. Status codes
/// only count as whole words, so `retry after 400ms` stays retryable.
pub fn is_retryable_error(message: &str) -> bool {
    !NON_RETRYABLE.is_match(message)
}

#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Total calls including the first one.
    pub max_attempts: usize,
    pub base_delay: Duration,
    pub max_delay: Duration,
    pub jitter: bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            base_delay: DEFAULT_BASE_DELAY,
            max_delay: DEFAULT_MAX_DELAY,
            jitter: true,
        }
    }
}

impl RetryPolicy {
    /// No delay between attempts.
    pub fn immediate(max_attempts: usize) -> Self {
        Self {
            max_attempts,
            base_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
            jitter: false,
        }
    }

    pub fn backoff(&self) -> ExponentialBuilder {
        let builder = ExponentialBuilder::default()
            .with_factor(2.0)
            .with_min_delay(self.base_delay)
            .with_max_delay(self.max_delay)
            .with_max_times(self.max_attempts.saturating_sub(1));
        if self.jitter {
            builder.with_jitter()
        } else {
            builder
        }
    }
}

/// Adapts a [`TextCorrector`] into a [`CorrectionGateway`]: retries
/// transient errors with exponential backoff and interprets the reply.
pub struct RetryingGateway<C> {
    corrector: C,
    policy: RetryPolicy,
}

impl<C: TextCorrector> RetryingGateway<C> {
    pub fn new(corrector: C, policy: RetryPolicy) -> Self {
        Self { corrector, policy }
    }

    pub fn corrector(&self) -> &C {
        &self.corrector
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }
}

impl<C: TextCorrector> CorrectionGateway for RetryingGateway<C> {
    fn correct(&mut self, text: &str) -> CorrectionOutcome {
        let attempts = Cell::new(0usize);
        let reply = (|| {
            attempts.set(attempts.get() + 1);
            self.corrector.correct(text)
        })
        .retry(self.policy.backoff())
        .sleep(std::thread::sleep)
        .when(TransportError::is_transient)
        .notify(|err, dur| {
            tracing::warn!(
                attempt = attempts.get(),
                error = %err,
                retry_delay_ms = dur.as_millis(),
                "retrying_correction"
            );
        })
        .call();

        match reply {
            Ok(reply) => interpret_reply(text, &reply),
            Err(err) => {
                tracing::error!(attempts = attempts.get(), error = %err, "correction_failed");
                CorrectionOutcome::Failed(err.to_string())
            }
        }
    }
}

/// Sentinel means unchanged; an empty reply is treated as a no-op so nothing
/// is ever replaced by garbage.
pub fn interpret_reply(original: &str, reply: &str) -> CorrectionOutcome {
    let reply = reply.trim();
    if reply.is_empty() {
        tracing::warn!(chars = original.chars().count(), "empty_correction_reply");
        return CorrectionOutcome::Corrected(original.to_string());
    }
    if reply.eq_ignore_ascii_case(UNCHANGED_SENTINEL) {
        return CorrectionOutcome::Unchanged;
    }
    CorrectionOutcome::Corrected(reply.to_string())
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::Mutex;

    use super::*;

    /// Replays a fixed sequence of replies, then fails transiently.
    struct Scripted {
        replies: Mutex<VecDeque<Result<String, TransportError>>>,
        calls: Cell<usize>,
    }

    impl Scripted {
        fn new(replies: Vec<Result<&str, TransportError>>) -> Self {
            Self {
                replies: Mutex::new(
                    replies
                        .into_iter()
                        .map(|r| r.map(str::to_string))
                        .collect(),
                ),
                calls: Cell::new(0),
            }
        }
    }

    impl TextCorrector for Scripted {
        fn correct(&self, _text: &str) -> Result<String, TransportError> {
            self.calls.set(self.calls.get() + 1);
            self.replies
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(TransportError::Transient("exhausted".into())))
        }
    }

    fn transient() -> Result<&'static str, TransportError> {
        Err(TransportError::Transient("503 Service Unavailable".into()))
    }

    #[test]
    fn transient_errors_are_retried_until_success() {
        let corrector = Scripted::new(vec![transient(), transient(), Ok("Воистину Аллаh велик.")]);
        let mut gateway = RetryingGateway::new(corrector, RetryPolicy::immediate(3));

        assert_eq!(
            gateway.correct("Во истину Аллаh велик."),
            CorrectionOutcome::Corrected("Воистину Аллаh велик.".to_string())
        );
        assert_eq!(gateway.corrector().calls.get(), 3);
    }

    #[test]
    fn attempts_are_capped() {
        let corrector = Scripted::new(vec![transient(), transient(), transient(), Ok("late")]);
        let mut gateway = RetryingGateway::new(corrector, RetryPolicy::immediate(3));

        assert!(matches!(
            gateway.correct("текст"),
            CorrectionOutcome::Failed(reason) if reason.contains("503")
        ));
        assert_eq!(gateway.corrector().calls.get(), 3);
    }

    #[test]
    fn fatal_errors_are_not_retried() {
        let corrector = Scripted::new(vec![
            Err(TransportError::Fatal("401 Unauthorized".into())),
            Ok("never"),
        ]);
        let mut gateway = RetryingGateway::new(corrector, RetryPolicy::immediate(3));

        assert!(matches!(gateway.correct("текст"), CorrectionOutcome::Failed(_)));
        assert_eq!(gateway.corrector().calls.get(), 1);
    }

    #[test]
    fn sentinel_is_case_insensitive_and_trimmed() {
        assert_eq!(interpret_reply("текст", " unchanged\n"), CorrectionOutcome::Unchanged);
        assert_eq!(interpret_reply("текст", "UNCHANGED"), CorrectionOutcome::Unchanged);
        assert_eq!(
            interpret_reply("текст", "UNCHANGED."),
            CorrectionOutcome::Corrected("UNCHANGED.".to_string())
        );
    }

    #[test]
    fn empty_reply_keeps_the_original() {
        assert_eq!(
            interpret_reply("Хвала Аллаху", "  \n"),
            CorrectionOutcome::Corrected("Хвала Аллаху".to_string())
        );
    }

    #[test]
    fn retryable_error_messages() {
        assert!(is_retryable_error("connection reset"));
        assert!(is_retryable_error("HTTP 503"));
        assert!(!is_retryable_error("HTTP 401 Unauthorized"));
        assert!(!is_retryable_error("invalid api key"));
        assert!(!is_retryable_error("status 400: invalid request"));
        assert!(!is_retryable_error("403 Forbidden"));
    }

    #[test]
    fn status_codes_only_match_as_whole_words() {
        assert!(is_retryable_error("rate limited, retry after 400ms"));
        assert!(is_retryable_error("invalid state, connection reset"));
        assert!(is_retryable_error("upstream 4010 timeout"));
    }

    #[test]
    fn default_policy() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_attempts, 3);
        assert_eq!(policy.base_delay, Duration::from_secs(1));
        assert!(policy.jitter);
    }
}
