//! Strip markdown code fences from model output.
//!
//! Models are told to answer with bare code but regularly wrap it in
//! ```` ```javascript ```` blocks anyway.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// Opening or closing fence with an optional language tag, up to and
    /// including the end of its line.
    static ref FENCE_LINE: Regex =
        Regex::new(r"```[A-Za-z0-9_+.\-]*[ \t]*(?:\r?\n|$)").expect("fence regex is valid");

    /// Opening fence with a known language tag followed by code on the same
    /// line. Limited to language names so inline code such as ```` ```const a ````
    /// keeps its first word.
    static ref INLINE_TAG: Regex = Regex::new(
        r"(?i)```(?:javascript|js|mjs|jsx|typescript|ts|python|py|json)[ \t]+"
    )
    .expect("inline tag regex is valid");
}

/// Remove every fence marker (with or without a language tag) and trim.
pub fn strip_code_fences(text: &str) -> String {
    let without_tags = INLINE_TAG.replace_all(text, "");
    let without_lines = FENCE_LINE.replace_all(&without_tags, "");
    without_lines.replace("```", "").trim().to_string()
}
