//! Best-effort location of a JSON array inside free-form model output.
//!
//! Models are told to answer with bare JSON but routinely wrap it in a
//! markdown fence or surround it with prose. Two shapes are accepted:
//!
//! 1. a fenced block opened by ```` ```json ```` and closed by the next
//!    ```` ``` ````
//! 2. a bare span from the first `[` to the last `]`
//!
//! The fenced form wins whenever it is present.

use log::trace;

const FENCE: &str = "```";
const JSON_TAG: &str = "json";

/// Find the JSON array payload in `text`, if any.
pub fn extract_json_array(text: &str) -> Option<&str>
{   fenced_json_block(text).or_else(|| bare_array_span(text))
}

/// Body of the first ```` ```json ```` fence, trimmed.
/// An unterminated or empty fence does not count.
pub fn fenced_json_block(text: &str) -> Option<&str>
{   let mut search_from = 0;
    while let Some(offset) = text[search_from..].find(FENCE)
    {   let tag_start = search_from + offset + FENCE.len();
        let rest = &text[tag_start..];
        let is_json = rest
          .get(..JSON_TAG.len())
          .map(|tag| tag.eq_ignore_ascii_case(JSON_TAG))
          .unwrap_or(false);

        if is_json
        {   let body_start = tag_start + JSON_TAG.len();
            let body = &text[body_start..];
            let end = body.find(FENCE)?;
            let block = body[..end].trim();
            trace!("Found fenced json block of {} bytes", block.len());
            return if block.is_empty() { None } else { Some(block) };
        }
        search_from = tag_start;
    }
    None
}

/// Span from the first `[` through the last `]`, inclusive
pub fn bare_array_span(text: &str) -> Option<&str>
{   let start = text.find('[')?;
    let end = text.rfind(']')?;
    if end < start
    {   return None;
    }
    trace!("Found bare array span {}..={}", start, end);
    Some(&text[start..=end])
}
