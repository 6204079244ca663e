//! Provider failure classification.

use super::provider::FailureSignal;

/// Stable taxonomy of generation failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display, strum::AsRefStr)]
pub enum FailureKind {
    /// Missing or invalid credential.
    AuthError,
    /// Quota exhausted or too many requests.
    RateLimit,
    /// Connectivity failure or an unspecified provider-side error.
    Unavailable,
    /// Anything not matched above.
    Unknown,
}

const AUTH_HINTS: &[&str] = &[
    "api key",
    "api_key",
    "apikey",
    "credential",
    "unauthenticated",
    "unauthorized",
    "permission denied",
    "permission_denied",
];

const RATE_LIMIT_HINTS: &[&str] = &[
    "quota",
    "resource_exhausted",
    "resource exhausted",
    "too many requests",
    "rate limit",
    "rate_limit",
];

const UNAVAILABLE_HINTS: &[&str] = &[
    "network",
    "connect",
    "timed out",
    "timeout",
    "unavailable",
    "unreachable",
    "dns",
    "internal error",
];

impl FailureKind {
    /// The fixed message shown to the user in place of a reply.
    pub fn user_message(self) -> &'static str {
        match self {
            FailureKind::AuthError => {
                "The API key is missing or invalid. Select a valid key and try again."
            }
            FailureKind::RateLimit => {
                "Too many requests right now. Wait a moment and try again."
            }
            FailureKind::Unavailable => {
                "Connection problem: the provider could not be reached. Try again shortly."
            }
            FailureKind::Unknown => "Something went wrong while generating a response.",
        }
    }
}

/// Maps a failure signal to its kind.
///
/// A decisive status code (401/403, 429, 5xx) wins over anything the message
/// says. Message hints are consulted, in the fixed order auth, rate limit,
/// unavailable, only for status-less signals and other 4xx responses.
pub fn classify(signal: &FailureSignal) -> FailureKind {
    match signal.status {
        Some(401) | Some(403) => return FailureKind::AuthError,
        Some(429) => return FailureKind::RateLimit,
        Some(status) if status >= 500 => return FailureKind::Unavailable,
        _ => {}
    }

    let message = signal.message.to_lowercase();
    let mentions = |hints: &[&str]| hints.iter().any(|hint| message.contains(hint));

    if mentions(AUTH_HINTS) {
        return FailureKind::AuthError;
    }
    if mentions(RATE_LIMIT_HINTS) {
        return FailureKind::RateLimit;
    }

    let unspecified = signal.status.is_none() && message.trim().is_empty();
    if unspecified || mentions(UNAVAILABLE_HINTS) {
        return FailureKind::Unavailable;
    }

    FailureKind::Unknown
}
