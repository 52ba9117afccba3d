//! Dialog reconstruction pipeline
//!
//! ```text
//! raw records ─▶ filter ─▶ normalize ─▶ correlate ─▶ rounds ─▶ renderers
//! ```
//!
//! Every stage is fail-open: a malformed record is normalized as far as
//! possible and grouped under the empty trace id rather than aborting the
//! batch.

pub mod correlate;
pub mod filter;
pub mod normalize;
pub mod pipeline;
pub mod rounds;

// ============================================================================
// RECORD FIELD NAMES
// ============================================================================
//
// There is no fixed record schema; the presence of these field names is the
// only contract the pipeline relies on.

pub(crate) mod keys {
    // Envelope
    pub const SOURCE: &str = "_source";
    pub const TIMESTAMP: &str = "@timestamp";

    // Source fields
    pub const MESSAGE: &str = "message";
    pub const SERVICE_NAME: &str = "laname";
    pub const LOCAL_TIME: &str = "ltime";
    pub const TAGS: &str = "tags";

    // Side channels written by the normalizer
    pub const MESSAGE_PREFIX: &str = "message.prefix";
    pub const MESSAGE_POSTFIX: &str = "message.postfix";
    pub const MESSAGE_HEADERS: &str = "message.headers";

    // Trace identity
    pub const TRACE_ID: &str = "trace_id";
    pub const TRACE_ID_CAMEL: &str = "traceId";
    pub const REQUEST_ID: &str = "request_id";
    pub const REQUEST_ID_CAMEL: &str = "requestId";
    pub const TERMINAL_TRACE_ID: &str = "terminalTraceId";

    // Role marker fields (presence classifies the record)
    pub const NLP_REQUEST: &str = "central-nlp-request";
    pub const NLP_RESPONSE: &str = "central-nlp-response";
    pub const LLM_REQUEST: &str = "central-answer-request";
    pub const LLM_RESPONSE: &str = "central-answer-response";
    pub const API_REQUEST: &str = "api-server-request";
    pub const API_RESPONSE: &str = "api-server-response";
    pub const ASR_RESULT: &str = "asr-recognize-result";

    // Nested payload fields
    pub const METADATA: &str = "metadata";
    pub const PAYLOAD: &str = "payload";
    pub const QUERY: &str = "q";

    // Originating service names
    pub const SERVICE_CENTRAL_MANAGER: &str = "central-manager";
    pub const SERVICE_ASR: &str = "asr-server";
    pub const SERVICE_API: &str = "api-server";
}
