//! Turning failed best-effort steps into fallback values.

use std::fmt::Display;

use tracing::warn;

use crate::model::Fetched;

/// Short machine-readable label for a failure, e.g. `"rate_limited"`.
pub trait FailureKind {
    fn kind(&self) -> &'static str;
}

/// Resolve `result` to a value, substituting `fallback` on error.
///
/// Every substitution emits exactly one `warn` event carrying the component
/// name, the failure kind and the reason. Callers never see the error.
pub fn degrade_with<T, E, F>(
    component: &'static str,
    result: Result<T, E>,
    fallback: F,
) -> Fetched<T>
where
    E: Display + FailureKind,
    F: FnOnce(&E) -> T,
{
    match result {
        Ok(value) => Fetched::fresh(value),
        Err(err) => {
            let reason = err.to_string();
            warn!(
                component,
                kind = err.kind(),
                reason = %reason,
                "falling back to degraded value"
            );
            Fetched::degraded(fallback(&err), reason)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Freshness;

    #[derive(Debug)]
    struct Boom;

    impl Display for Boom {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.write_str("boom")
        }
    }

    impl FailureKind for Boom {
        fn kind(&self) -> &'static str {
            "boom"
        }
    }

    #[test]
    fn ok_is_fresh() {
        let fetched = degrade_with("test", Ok::<_, Boom>(7), |_| 0);
        assert_eq!(fetched.value, 7);
        assert_eq!(fetched.freshness, Freshness::Fresh);
    }

    #[test]
    fn err_uses_fallback_and_keeps_reason() {
        let fetched = degrade_with("test", Err::<i32, _>(Boom), |_| -1);
        assert_eq!(fetched.value, -1);
        assert_eq!(
            fetched.freshness,
            Freshness::Degraded {
                reason: "boom".into()
            }
        );
        assert!(fetched.is_degraded());
    }
}
