/// Admission counter keyed by client address.
///
/// Implementations decide where the counters live; a `false` answer means the
/// caller must reject the request.
pub trait RateLimitStore {
    async fn check_and_increment(&self, key: &str) -> bool;
}
