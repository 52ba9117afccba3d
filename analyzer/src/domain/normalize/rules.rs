//! Ordered peel-rule tables for the field normalizer.
//!
//! Each service logs free text with its own evolving conventions; the known
//! conventions live here as immutable ordered tables scanned linearly with
//! early exit. Order encodes precedence: FIRST match wins, not longest.
//! Keep these as plain data so each table stays independently testable.

/// A literal prefix and the tag recorded when it matches.
///
/// The tag is what downstream consumers key on; whitespace variants of the
/// same convention map to one canonical tag.
pub(crate) struct PeelRule {
    pub pattern: &'static str,
    pub tag: &'static str,
}

impl PeelRule {
    const fn new(pattern: &'static str, tag: &'static str) -> Self {
        Self { pattern, tag }
    }
}

/// Prefix rules for the outer `message` field, in precedence order.
pub(crate) const MESSAGE_PREFIX_RULES: &[PeelRule] = &[
    PeelRule::new("receive request:", "receive request:"),
    PeelRule::new("answer request params:", "answer request params"),
    PeelRule::new("answer request params ", "answer request params"),
    PeelRule::new("answers  response:", "answers  response"),
    PeelRule::new("hinter request params:", "hinter request params"),
    PeelRule::new("hinter  response:", "hinter  response:"),
    PeelRule::new("post  body:", "post  body"),
    PeelRule::new("收到数据:", "收到数据"),
    PeelRule::new("合规文本请求:", "合规文本请求"),
    PeelRule::new("合规文本响应:", "合规文本响应"),
    PeelRule::new("合规图片响应:", "合规图片响应"),
    PeelRule::new("可见即可说:", "可见即可说"),
    PeelRule::new("say visible:", "say visible"),
];

/// Infix/postfix markers for the outer `message` field, in precedence order.
///
/// The message is truncated at the first marker found; the removed tail
/// (marker included) goes to the `message.postfix` side field.
pub(crate) const MESSAGE_POSTFIX_MARKERS: &[&str] =
    &[",parameters:", ", cost time:", " trace_id:"];

/// Prefix rules for the inner `msg` field of an already-decoded message.
/// Independent from the outer table; the inner conventions come from the
/// NLP/LLM worker services, not the gateway.
pub(crate) const INNER_PREFIX_RULES: &[PeelRule] = &[
    PeelRule::new("Final answer:", "Final answer"),
    PeelRule::new("answer request, query:", "answer request, query"),
    PeelRule::new("question request:", "question request"),
    PeelRule::new("system_prompt:", "system_prompt"),
    PeelRule::new("pre_subtopic:", "pre_subtopic"),
];

/// Infix/postfix markers for the inner `msg` field, in precedence order.
pub(crate) const INNER_POSTFIX_MARKERS: &[&str] = &[",parameters:", ", cost:"];

/// Inner `msg` text that is already canonical; peeling it would corrupt the
/// request marker the QA workers emit verbatim.
pub(crate) const INNER_PARSE_REQUEST_GUARD: &str = "parse request";

/// Literal reprs of HTTP response objects that leak into the inner `msg`
/// field, replaced by the bare status code before any further decoding.
pub(crate) const HTTP_STATUS_SUBSTITUTIONS: &[(&str, &str)] =
    &[("<Response [200]>", "200"), ("<Response [500]>", "500")];

/// Strip the first matching prefix, returning the remainder and the tag.
pub(crate) fn peel_prefix<'a>(
    text: &'a str,
    rules: &[PeelRule],
) -> Option<(&'a str, &'static str)> {
    for rule in rules {
        if let Some(rest) = text.strip_prefix(rule.pattern) {
            return Some((rest, rule.tag));
        }
    }
    None
}

/// Truncate at the first marker found, returning the head and the removed
/// tail (marker included).
pub(crate) fn peel_postfix<'a>(text: &'a str, markers: &[&str]) -> Option<(&'a str, &'a str)> {
    for marker in markers {
        if let Some(pos) = text.find(marker) {
            return Some((&text[..pos], &text[pos..]));
        }
    }
    None
}

#[cfg(test)]
#[path = "rules_tests.rs"]
mod tests;
