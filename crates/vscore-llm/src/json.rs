//! Tolerant JSON parsing for model output.
//!
//! Model replies are parsed in three stages: strip markdown fences and
//! surrounding prose, try a strict parse, then try a bracket-balancing repair
//! for truncated output. Anything still invalid is `LlmError::Unparseable`.

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use crate::error::{LlmError, LlmResult};
use crate::metrics;

/// Which stage produced the parsed value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseStage {
    Strict,
    Repaired,
}

/// A parsed model reply.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedJson {
    pub value: Value,
    pub stage: ParseStage,
}

/// Remove a surrounding ```json (or bare ```) fence.
pub fn strip_code_fences(text: &str) -> &str {
    let text = text.trim();
    let text = if let Some(rest) = text.strip_prefix("```") {
        // Drop the language tag on the opening fence line.
        match rest.find('\n') {
            Some(idx) if !rest[..idx].contains('{') && !rest[..idx].contains('[') => &rest[idx + 1..],
            _ => rest.trim_start_matches("json"),
        }
    } else {
        text
    };
    let text = text.trim_end();
    text.strip_suffix("```").unwrap_or(text).trim()
}

/// Parse model output into a JSON value.
///
/// Every `{` or `[` is a possible start, tried in order, so brackets in
/// leading prose do not hide the real payload.
pub fn parse_llm_json(text: &str) -> LlmResult<ParsedJson> {
    let cleaned = strip_code_fences(text);
    let mut starts = cleaned.match_indices(&['{', '['][..]).map(|(idx, _)| idx).peekable();
    let Some(&first) = starts.peek() else {
        return Err(LlmError::unparseable("no JSON object in model output"));
    };

    for start in starts {
        if let Some(parsed) = parse_from(&cleaned[start..]) {
            return Ok(parsed);
        }
    }

    let preview: String = cleaned[first..].chars().take(200).collect();
    Err(LlmError::unparseable(format!("could not repair model JSON: {}", preview)))
}

fn parse_from(body: &str) -> Option<ParsedJson> {
    if let Ok(value) = serde_json::from_str::<Value>(body) {
        return Some(ParsedJson {
            value,
            stage: ParseStage::Strict,
        });
    }

    repair_candidates(body).into_iter().find_map(|candidate| {
        let value = serde_json::from_str::<Value>(&candidate).ok()?;
        debug!(original_chars = body.len(), repaired_chars = candidate.len(), "Repaired model JSON");
        metrics::record_json_repair();
        Some(ParsedJson {
            value,
            stage: ParseStage::Repaired,
        })
    })
}

/// Parse model output straight into a typed value.
pub fn parse_llm_json_as<T: DeserializeOwned>(text: &str) -> LlmResult<T> {
    let parsed = parse_llm_json(text)?;
    serde_json::from_value(parsed.value)
        .map_err(|e| LlmError::unparseable(format!("model JSON has unexpected shape: {}", e)))
}

/// Best single repair of possibly truncated JSON: close any open string,
/// drop a dangling comma, fill a dangling key with `null` and append the
/// missing closers.
pub fn repair_json(text: &str) -> String {
    let scan = Scan::run(text);
    close(&text[..scan.end], &scan.closers, scan.in_string)
}

/// Repairs to attempt, in order.
fn repair_candidates(text: &str) -> Vec<String> {
    let scan = Scan::run(text);
    let mut candidates = vec![close(&text[..scan.end], &scan.closers, scan.in_string)];

    // Fall back to cutting the last incomplete element.
    if let Some((idx, closers)) = scan.last_comma {
        candidates.push(close(&text[..idx], &closers, false));
    }
    candidates
}

/// Scanner state over a JSON prefix.
struct Scan {
    /// Expected closing brackets, innermost last.
    closers: Vec<char>,
    in_string: bool,
    /// End of the meaningful prefix (first top-level value closes here).
    end: usize,
    /// Byte offset of the last structural comma and the closers at that point.
    last_comma: Option<(usize, Vec<char>)>,
}

impl Scan {
    fn run(text: &str) -> Self {
        let mut closers: Vec<char> = Vec::new();
        let mut in_string = false;
        let mut escaped = false;
        let mut last_comma = None;
        let mut end = text.len();

        for (idx, ch) in text.char_indices() {
            if in_string {
                if escaped {
                    escaped = false;
                } else if ch == '\\' {
                    escaped = true;
                } else if ch == '"' {
                    in_string = false;
                }
                continue;
            }

            match ch {
                '"' => in_string = true,
                '{' => closers.push('}'),
                '[' => closers.push(']'),
                '}' | ']' => {
                    if closers.last() == Some(&ch) {
                        closers.pop();
                        if closers.is_empty() {
                            end = idx + ch.len_utf8();
                            break;
                        }
                    }
                }
                ',' => last_comma = Some((idx, closers.clone())),
                _ => {}
            }
        }

        // A dangling backslash inside a string would escape the closing quote.
        if in_string && escaped {
            end = end.saturating_sub(1);
        }

        Self {
            closers,
            in_string,
            end,
            last_comma,
        }
    }
}

fn close(prefix: &str, closers: &[char], in_string: bool) -> String {
    let mut out = prefix.to_string();
    if in_string {
        out.push('"');
    }

    let trimmed_len = out.trim_end().len();
    out.truncate(trimmed_len);
    if out.ends_with(',') {
        out.pop();
    } else if out.ends_with(':') {
        out.push_str("null");
    }

    out.extend(closers.iter().rev());
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[test]
    fn test_strip_fences() {
        assert_eq!(strip_code_fences("```json\n{\"a\":1}\n```"), "{\"a\":1}");
        assert_eq!(strip_code_fences("```\n[1]\n```"), "[1]");
        assert_eq!(strip_code_fences("  {\"a\":1}  "), "{\"a\":1}");
    }

    #[test]
    fn test_strict_parse() {
        let parsed = parse_llm_json("```json\n{\"passed\": true}\n```").unwrap();
        assert_eq!(parsed.stage, ParseStage::Strict);
        assert_eq!(parsed.value, json!({"passed": true}));
    }

    #[test]
    fn test_prose_before_json_is_skipped() {
        let parsed = parse_llm_json("Here you go:\n{\"a\": 1}").unwrap();
        assert_eq!(parsed.value, json!({"a": 1}));
    }

    #[test]
    fn test_bracket_in_prose_does_not_hide_payload() {
        let parsed = parse_llm_json(
            "Here is the evaluation [JSON]:\n{\"partner_safety\": {\"passed\": false}}",
        )
        .unwrap();
        assert_eq!(parsed.stage, ParseStage::Strict);
        assert_eq!(parsed.value, json!({"partner_safety": {"passed": false}}));
    }

    #[test]
    fn test_trailing_prose_after_json() {
        let parsed = parse_llm_json("{\"a\": [1, 2]} hope this helps").unwrap();
        assert_eq!(parsed.stage, ParseStage::Repaired);
        assert_eq!(parsed.value, json!({"a": [1, 2]}));
    }

    #[test]
    fn test_repairs_truncated_array() {
        let parsed = parse_llm_json("{\"a\": 1, \"b\": [1, 2").unwrap();
        assert_eq!(parsed.stage, ParseStage::Repaired);
        assert_eq!(parsed.value, json!({"a": 1, "b": [1, 2]}));
    }

    #[test]
    fn test_repairs_open_string() {
        let parsed = parse_llm_json("{\"reason\": \"cut off mid").unwrap();
        assert_eq!(parsed.value, json!({"reason": "cut off mid"}));
    }

    #[test]
    fn test_repairs_trailing_comma_and_dangling_colon() {
        assert_eq!(parse_llm_json("{\"a\": 1,").unwrap().value, json!({"a": 1}));
        assert_eq!(
            parse_llm_json("{\"a\": 1, \"b\":").unwrap().value,
            json!({"a": 1, "b": null})
        );
    }

    #[test]
    fn test_dangling_key_cut_back_to_last_comma() {
        let parsed = parse_llm_json("{\"a\": 1, \"b\"").unwrap();
        assert_eq!(parsed.value, json!({"a": 1}));
    }

    #[test]
    fn test_escaped_quotes_do_not_confuse_scanner() {
        let parsed = parse_llm_json(r#"{"q": "he said \"hi\" {", "n": [1"#).unwrap();
        assert_eq!(parsed.value, json!({"q": "he said \"hi\" {", "n": [1]}));
    }

    #[test]
    fn test_unparseable() {
        assert!(matches!(parse_llm_json("no json here"), Err(LlmError::Unparseable(_))));
        assert!(matches!(parse_llm_json("{\"a\" 1 2 3}"), Err(LlmError::Unparseable(_))));
    }

    #[test]
    fn test_typed_parse() {
        #[derive(Deserialize)]
        struct Gate {
            passed: bool,
        }
        let gate: Gate = parse_llm_json_as("{\"passed\": false").unwrap();
        assert!(!gate.passed);
    }

    #[test]
    fn test_repair_json_closes_nested() {
        assert_eq!(repair_json("{\"a\": {\"b\": [1"), "{\"a\": {\"b\": [1]}}");
    }
}
