// =============================================================================
// Application Identity
// =============================================================================

/// Application name in lowercase (for paths and identifiers)
pub const APP_NAME_LOWER: &str = "roundscope";

// =============================================================================
// Environment Variables
// =============================================================================

/// Environment variable for log level/filter
pub const ENV_LOG: &str = "ROUNDSCOPE_LOG";

/// Environment variable for the input record file
pub const ENV_INPUT: &str = "ROUNDSCOPE_INPUT";

/// Environment variable for the dialog round cap
pub const ENV_LIMIT: &str = "ROUNDSCOPE_LIMIT";

// =============================================================================
// Domain Sentinels
// =============================================================================

/// Reserved query text the client sends to reset conversation state.
///
/// Not a real user utterance: the API gateway forwards this marker instead of
/// a query when the user clears the dialog context, so downstream consumers
/// must treat it specially. Keep the comparison in [`is_clean_context`] so
/// the literal lives in exactly one place.
pub const CLEAN_CONTEXT_SENTINEL: &str = "...)(%$$)";

/// Whether a query text is the clear-context sentinel rather than a real
/// user utterance.
pub fn is_clean_context(query: &str) -> bool {
    query == CLEAN_CONTEXT_SENTINEL
}
