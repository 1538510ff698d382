use crate::error::{HypeError, Result};
use serde::de::DeserializeOwned;

/// Truncate a string at a safe char boundary, appending "..." if truncated.
pub fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        s.to_string()
    } else {
        let end: String = s.chars().take(max_chars).collect();
        format!("{}...", end)
    }
}

/// Sanitize AI response: remove control characters that break JSON parsing.
/// Inside JSON string values, raw newlines/tabs are invalid, so every control
/// char becomes a space and runs of whitespace collapse.
pub fn sanitize_json(s: &str) -> String {
    let cleaned: String = s
        .chars()
        .map(|c| if c.is_control() { ' ' } else { c })
        .collect();
    cleaned.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Parse a JSON array from AI response, handling markdown code fences and control characters
pub fn parse_json_response<T: DeserializeOwned>(response: &str) -> Result<Vec<T>> {
    let sanitized = sanitize_json(&strip_think_blocks(response));
    let trimmed = sanitized.trim();

    let json_str = if let Some(start) = trimmed.find('[') {
        let end = trimmed.rfind(']').map(|i| i + 1).unwrap_or(trimmed.len());
        if end > start {
            &trimmed[start..end]
        } else {
            &trimmed[start..]
        }
    } else {
        trimmed
    };

    serde_json::from_str(json_str).map_err(|e| {
        HypeError::Parse(format!(
            "failed to parse JSON array: {}; response: {}",
            e,
            truncate(response, 200)
        ))
    })
}

/// Slice from the first '{' to the last '}', if both exist in that order.
pub fn extract_json_object(s: &str) -> Option<&str> {
    let start = s.find('{')?;
    let end = s.rfind('}')?;
    (end > start).then(|| &s[start..=end])
}

/// Remove `<think>...</think>` (and `<thinking>`) reasoning blocks.
/// An unterminated block swallows the rest of the text; a stray closing tag
/// drops everything before it.
pub fn strip_think_blocks(s: &str) -> String {
    // ASCII lowercasing keeps byte offsets aligned with `s`
    let lower = s.to_ascii_lowercase();
    let mut out = String::with_capacity(s.len());
    let mut cursor = 0;

    while let Some(rel) = lower[cursor..].find("<think") {
        let start = cursor + rel;
        out.push_str(&s[cursor..start]);
        cursor = match lower[start..].find("</think") {
            Some(close_rel) => {
                let close = start + close_rel;
                lower[close..].find('>').map(|gt| close + gt + 1).unwrap_or(s.len())
            }
            None => s.len(),
        };
    }
    out.push_str(&s[cursor..]);

    let out_lower = out.to_ascii_lowercase();
    if let Some(close) = out_lower.rfind("</think") {
        if let Some(gt) = out_lower[close..].find('>') {
            return out[close + gt + 1..].to_string();
        }
    }
    out
}

/// Return the body of the first markdown code fence, or the input unchanged.
pub fn strip_code_fence(s: &str) -> String {
    let Some(open) = s.find("```") else {
        return s.to_string();
    };
    let after_open = &s[open + 3..];

    let body = match after_open.find('\n') {
        // ```json / ```sql language tag on its own line
        Some(nl) if after_open[..nl].trim().chars().all(|c| c.is_ascii_alphanumeric()) => {
            &after_open[nl + 1..]
        }
        Some(_) => after_open,
        None => strip_fence_tag(after_open),
    };

    match body.find("```") {
        Some(close) => body[..close].to_string(),
        None => body.to_string(),
    }
}

fn strip_fence_tag(s: &str) -> &str {
    for tag in ["json", "sql"] {
        if s.get(..tag.len()).is_some_and(|head| head.eq_ignore_ascii_case(tag))
            && s[tag.len()..].starts_with(char::is_whitespace)
        {
            return &s[tag.len()..];
        }
    }
    s
}

const CHATTY_OPENERS: &[&str] = &[
    "sure",
    "certainly",
    "of course",
    "okay",
    "ok,",
    "here is",
    "here's",
    "here are",
    "below is",
];

const ANSWER_LABELS: &[&str] = &["sql:", "query:", "answer:", "response:", "output:", "result:"];

/// Drop conversational lead-ins ("Sure, here is the query:") and answer
/// labels ("SQL:") in front of the payload.
pub fn strip_conversational_prefix(s: &str) -> &str {
    let mut rest = s.trim_start();
    loop {
        let before = rest.len();
        let line_end = rest.find('\n').unwrap_or(rest.len());
        let first_line = rest[..line_end].to_ascii_lowercase();

        if CHATTY_OPENERS.iter().any(|p| first_line.starts_with(p)) {
            rest = match first_line.find(':') {
                Some(colon) if !first_line[colon + 1..].trim().is_empty() => &rest[colon + 1..],
                _ => &rest[line_end..],
            };
        } else if let Some(label) = ANSWER_LABELS.iter().find(|l| first_line.starts_with(**l)) {
            rest = &rest[label.len()..];
        }

        rest = rest.trim_start();
        if rest.len() == before {
            return rest;
        }
    }
}

/// Full cleanup pipeline for a free-form completion.
pub fn clean_response(raw: &str) -> String {
    let without_thoughts = strip_think_blocks(raw);
    let unfenced = strip_code_fence(strip_conversational_prefix(&without_thoughts));
    strip_conversational_prefix(&unfenced).trim().to_string()
}
