/// Classification for retry policy.
///
/// Used by the [`RateLimitedExecutor`](crate::executor::RateLimitedExecutor) to
/// decide how long to wait before the next attempt.
///
/// # Behavior Summary
///
/// | Class | Retry? | Wait before retry |
/// |-------|--------|-------------------|
/// | `Cooldown` | Yes | Long rate-limit cooldown |
/// | `Backoff` | Yes | Short retry delay |
/// | `Never` | No | - (fallback still applies) |
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RetryClass {
    /// The provider signalled that its call budget is exhausted (HTTP 429 or
    /// equivalent). Retry only after the flat cooldown.
    Cooldown,

    /// Transient failure: timeout, 5xx, malformed or empty payload.
    /// Retry after the short delay.
    Backoff,

    /// Retrying cannot help, e.g. the credential is missing.
    /// Remaining retries are skipped.
    Never,
}
