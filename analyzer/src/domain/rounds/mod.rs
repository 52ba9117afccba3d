//! Typed conversational aggregates and the bucket reductions that build them.

pub mod aggregate;
pub mod model;

pub use aggregate::{Bucket, RecordGroup, Role, bucket_records, dialog_rounds, flat_groups};
pub use model::{DialogRound, Location, LlmRound, NlpError, NlpIntent, NlpRound, NlpUtterance, OssFile};
