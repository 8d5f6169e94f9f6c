use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Unified error type for the marketdesk workspace.
///
/// Provider adapters surface transport failures, rate limits, and malformed
/// payloads through this type; the orchestrator classifies each variant to
/// decide whether it counts against the provider's circuit breaker before
/// absorbing it into a fallback attempt.
#[derive(Debug, Error, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum DeskError {
    /// The requested capability is not offered by any registered provider.
    #[error("unsupported capability: {capability}")]
    Unsupported {
        /// Capability label describing what was requested (e.g. "quote").
        capability: String,
    },

    /// Issues with the returned or expected data (missing fields, unparseable
    /// numbers, wrong shape).
    #[error("data issue: {0}")]
    Data(String),

    /// Invalid input argument or missing configuration (e.g. an absent API
    /// key environment variable).
    #[error("invalid argument: {0}")]
    InvalidArg(String),

    /// An individual provider call failed (non-2xx status, transport error).
    #[error("{provider} failed: {msg}")]
    Provider {
        /// Provider name that failed.
        provider: String,
        /// Human-readable error message.
        msg: String,
    },

    /// The provider responded with HTTP 429. Treated like any transient
    /// failure for breaker accounting so repeated throttling backs the
    /// provider off for the full open duration.
    #[error("{provider} rate limited")]
    RateLimited {
        /// Provider name that throttled the request.
        provider: String,
    },

    /// An individual provider call exceeded the per-attempt timeout.
    #[error("provider timed out: {capability} via {provider}")]
    ProviderTimeout {
        /// Provider name that timed out.
        provider: String,
        /// Capability label (e.g. "history", "search", "quote").
        capability: String,
    },

    /// The provider's circuit breaker is open; the attempt was skipped
    /// without invoking the adapter.
    #[error("circuit open for {provider}")]
    CircuitOpen {
        /// Provider name whose breaker is open.
        provider: String,
    },

    /// A resource or symbol could not be found. This is a healthy-provider
    /// outcome and never touches the breaker.
    #[error("not found: {what}")]
    NotFound {
        /// Description of the missing resource, e.g. "quote for AAPL".
        what: String,
    },
}

impl DeskError {
    /// Helper: build an `Unsupported` error for a capability string.
    #[must_use]
    pub fn unsupported(capability: impl Into<String>) -> Self {
        Self::Unsupported {
            capability: capability.into(),
        }
    }

    /// Helper: build a `Provider` error with the provider name and message.
    pub fn provider(provider: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Provider {
            provider: provider.into(),
            msg: msg.into(),
        }
    }

    /// Helper: build a `NotFound` error for a description of the missing
    /// resource.
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound { what: what.into() }
    }

    /// Helper: build a `RateLimited` error.
    pub fn rate_limited(provider: impl Into<String>) -> Self {
        Self::RateLimited {
            provider: provider.into(),
        }
    }

    /// Helper: build a `ProviderTimeout` error.
    pub fn provider_timeout(provider: impl Into<String>, capability: impl Into<String>) -> Self {
        Self::ProviderTimeout {
            provider: provider.into(),
            capability: capability.into(),
        }
    }

    /// Helper: build a `CircuitOpen` error.
    pub fn circuit_open(provider: impl Into<String>) -> Self {
        Self::CircuitOpen {
            provider: provider.into(),
        }
    }

    /// Whether this failure counts against the provider's circuit breaker.
    ///
    /// Transient transport errors, timeouts, rate limits, and malformed
    /// payloads do. A `NotFound` means the provider answered and is healthy;
    /// `CircuitOpen` means the adapter was never invoked; `Unsupported` and
    /// `InvalidArg` are caller-side problems.
    #[must_use]
    pub const fn counts_against_breaker(&self) -> bool {
        match self {
            Self::Provider { .. }
            | Self::RateLimited { .. }
            | Self::ProviderTimeout { .. }
            | Self::Data(_) => true,
            Self::NotFound { .. }
            | Self::CircuitOpen { .. }
            | Self::Unsupported { .. }
            | Self::InvalidArg(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn breaker_classification() {
        assert!(DeskError::provider("fmp", "boom").counts_against_breaker());
        assert!(DeskError::rate_limited("fmp").counts_against_breaker());
        assert!(DeskError::provider_timeout("fmp", "quote").counts_against_breaker());
        assert!(DeskError::Data("bad json".into()).counts_against_breaker());

        assert!(!DeskError::not_found("quote for AAPL").counts_against_breaker());
        assert!(!DeskError::circuit_open("fmp").counts_against_breaker());
        assert!(!DeskError::unsupported("quote").counts_against_breaker());
        assert!(!DeskError::InvalidArg("bad symbol".into()).counts_against_breaker());
    }
}
