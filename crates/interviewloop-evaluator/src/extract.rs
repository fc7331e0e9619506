//! Best-effort extraction of structured fields from generated text.
//!
//! Nothing here fails: every helper returns `None`/empty when the text does not
//! carry the field. Callers apply the fallback order:
//!
//! 1. the first balanced `{...}` block that parses and carries an expected key
//! 2. pattern heuristics over the raw text (scores, complexity, lists, recommendation)
//! 3. the raw text itself for free-form feedback, then [`FEEDBACK_PLACEHOLDER`]

use lazy_static::lazy_static;
use regex::Regex;
use serde_json::{Map, Value};

use crate::records::{Confidence, HireDecision, Recommendation};

/// Used only when the generated text itself is blank
pub const FEEDBACK_PLACEHOLDER: &str = "No feedback was generated for this evaluation.";

/// How far past a metric keyword a score may appear
const SCORE_WINDOW: usize = 100;

/// Raw complexity sections longer than this are cut
const COMPLEXITY_MAX_CHARS: usize = 100;

lazy_static! {
    static ref SCORE: Regex =
        Regex::new(r"\b(\d{1,2}(?:\.\d+)?)\s*(?:/\s*10\b|out of 10\b)").expect("valid score regex");
    static ref BIG_O: Regex =
        Regex::new(r"O\((?:[^()]|\([^()]*\))*\)").expect("valid big-o regex");
    static ref TIME_SECTION: Regex =
        Regex::new(r"(?i)time[\s_-]+complexity").expect("valid time regex");
    static ref SPACE_SECTION: Regex =
        Regex::new(r"(?i)space[\s_-]+complexity").expect("valid space regex");
    static ref SECTION_END: Regex = Regex::new(r"\n\s*\n|\n\s*[A-Z]").expect("valid end regex");
    static ref BULLET: Regex =
        Regex::new(r"^\s*(?:[-*•]|\d+[.)])\s+(.+?)\s*$").expect("valid bullet regex");
    static ref SUGGESTION_KEYWORD: Regex =
        Regex::new(r"(?i)suggest|improv").expect("valid suggestion regex");
    static ref ADVICE: Regex = Regex::new(r"(?i)\b(?:you could|consider|try|recommend)\b[^.!?\n]*")
        .expect("valid advice regex");
    static ref SENTENCE_SPLIT: Regex = Regex::new(r"[.!?]").expect("valid sentence regex");
    static ref CONFIDENCE_LEVEL: Regex =
        Regex::new(r"\b(high|medium|moderate|low)\b").expect("valid level regex");
}

/// Every balanced `{...}` block in the text, ordered by start position.
///
/// Nested blocks are returned after their enclosing block. Braces inside JSON
/// string literals do not count toward the balance.
pub fn json_blocks(text: &str) -> Vec<&str> {
    let bytes = text.as_bytes();
    let mut blocks = Vec::new();

    for (start, _) in text.match_indices('{') {
        let mut depth = 0usize;
        let mut in_string = false;
        let mut escaped = false;

        for (offset, &byte) in bytes[start..].iter().enumerate() {
            if in_string {
                match byte {
                    _ if escaped => escaped = false,
                    b'\\' => escaped = true,
                    b'"' => in_string = false,
                    _ => {}
                }
                continue;
            }
            match byte {
                b'"' => in_string = true,
                b'{' => depth += 1,
                b'}' => {
                    depth -= 1;
                    if depth == 0 {
                        blocks.push(&text[start..=start + offset]);
                        break;
                    }
                }
                _ => {}
            }
        }
    }

    blocks
}

/// First block that parses as a JSON object containing any of `keys`
pub fn structured_block(text: &str, keys: &[&str]) -> Option<Map<String, Value>> {
    json_blocks(text).into_iter().find_map(|block| {
        match serde_json::from_str::<Value>(block) {
            Ok(Value::Object(map)) if keys.iter().any(|key| map.contains_key(*key)) => Some(map),
            _ => None,
        }
    })
}

/// Lenient score conversion: numbers, "8/10", "8", or `{"score": 8}`.
/// Anything outside 0-10 counts as absent.
pub fn score_value(value: &Value) -> Option<u8> {
    let raw = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => match SCORE.captures(s) {
            Some(caps) => caps[1].parse::<f64>().ok()?,
            None => s.trim().parse::<f64>().ok()?,
        },
        Value::Object(map) => return map.get("score").and_then(score_value),
        _ => return None,
    };
    bounded_score(raw)
}

fn bounded_score(raw: f64) -> Option<u8> {
    let rounded = raw.round();
    (0.0..=10.0).contains(&rounded).then_some(rounded as u8)
}

/// Non-empty text from a string or number value
pub fn text_value(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// A list of strings from an array or a single string
pub fn string_list(value: &Value) -> Vec<String> {
    match value {
        Value::Array(items) => items.iter().filter_map(text_value).collect(),
        other => text_value(other).into_iter().collect(),
    }
}

/// Score for `metric` written as `<n>/10` or `<n> out of 10` shortly after the keyword
pub fn score_near(text: &str, metric: &str) -> Option<u8> {
    let lower = text.to_lowercase();
    let metric = metric.to_lowercase();

    lower.match_indices(&metric).find_map(|(idx, _)| {
        let window = char_window(&lower, idx, SCORE_WINDOW);
        SCORE
            .captures(window)
            .and_then(|caps| caps[1].parse::<f64>().ok())
            .and_then(bounded_score)
    })
}

/// Which complexity section to look for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComplexityKind {
    Time,
    Space,
}

/// Complexity stated after "time/space complexity", preferring Big-O notation
pub fn complexity(text: &str, kind: ComplexityKind) -> Option<String> {
    let heading = match kind {
        ComplexityKind::Time => &*TIME_SECTION,
        ComplexityKind::Space => &*SPACE_SECTION,
    };
    let found = heading.find(text)?;

    let rest = text[found.end()..].trim_start_matches(|c: char| {
        c.is_whitespace() || matches!(c, '*' | ':' | '-' | '=' | '#' | '"' | '_')
    });
    let end = SECTION_END.find(rest).map(|m| m.start()).unwrap_or(rest.len());
    let section = rest[..end].trim();

    if let Some(notation) = BIG_O.find(section) {
        return Some(notation.as_str().to_string());
    }
    if section.is_empty() {
        return None;
    }
    Some(truncate_chars(section, COMPLEXITY_MAX_CHARS))
}

/// Bullet or numbered items in the list block starting at the first `keyword` match
pub fn bullets_after(text: &str, keyword: &Regex) -> Vec<String> {
    let Some(found) = keyword.find(text) else {
        return Vec::new();
    };
    let line_start = text[..found.start()].rfind('\n').map(|i| i + 1).unwrap_or(0);

    let mut items = Vec::new();
    for line in text[line_start..].lines() {
        if let Some(caps) = BULLET.captures(line) {
            items.push(caps[1].trim_matches('*').trim().to_string());
        } else if !items.is_empty() && !line.trim().is_empty() {
            // First non-bullet line after the list closes it
            break;
        }
    }
    items.retain(|item| !item.is_empty());
    items
}

/// Improvement suggestions, at most `limit`
pub fn suggestions(text: &str, limit: usize) -> Vec<String> {
    let mut items = bullets_after(text, &SUGGESTION_KEYWORD);

    if items.is_empty() {
        for found in ADVICE.find_iter(text) {
            let fragment = found.as_str().trim().to_string();
            if !fragment.is_empty() && !items.contains(&fragment) {
                items.push(fragment);
            }
        }
    }

    items.truncate(limit);
    items
}

/// Items of a named section ("strength", "improv"), else its first three substantial sentences
pub fn section_list(text: &str, section: &str) -> Vec<String> {
    let Ok(keyword) = Regex::new(&format!("(?i){}", regex::escape(section))) else {
        return Vec::new();
    };
    let items = bullets_after(text, &keyword);
    if !items.is_empty() {
        return items;
    }

    let Some(found) = keyword.find(text) else {
        return Vec::new();
    };
    SENTENCE_SPLIT
        .split(&text[found.start()..])
        .map(str::trim)
        .filter(|sentence| sentence.chars().count() > 10)
        .take(3)
        .map(String::from)
        .collect()
}

const HIRE_KEYWORDS: [&str; 4] = ["hire", "recommend", "suitable", "qualified"];

const NO_HIRE_KEYWORDS: [&str; 8] = [
    "not hire",
    "do not hire",
    "no hire",
    "no-hire",
    "no_hire",
    "not recommend",
    "unsuitable",
    "not qualified",
];

const CONFIDENCE_KEYWORDS: [&str; 5] = [
    "confident",
    "confidence",
    "strongly",
    "hesitant",
    "uncertain",
];

const NEGATIONS: [&str; 4] = ["not ", "low ", "hesitant", "uncertain"];

/// Hire decision and confidence inferred from prose
///
/// When both hire and no-hire phrases occur, the one whose last occurrence is
/// later in the text wins. Hire keywords embedded in a no-hire phrase
/// ("recommend" inside "not recommend") are not counted as hire signals.
pub fn recommendation(text: &str) -> Recommendation {
    Recommendation {
        decision: hire_decision(text),
        confidence: confidence(text),
    }
}

pub fn hire_decision(text: &str) -> Option<HireDecision> {
    let lower = text.to_lowercase();

    let no_hire_spans: Vec<(usize, usize)> = NO_HIRE_KEYWORDS
        .iter()
        .flat_map(|kw| lower.match_indices(kw).map(|(i, m)| (i, i + m.len())))
        .collect();

    let last_no_hire = no_hire_spans.iter().map(|(start, _)| *start).max();
    let last_hire = HIRE_KEYWORDS
        .iter()
        .flat_map(|kw| lower.match_indices(kw).map(|(i, m)| (i, i + m.len())))
        .filter(|(start, end)| {
            !no_hire_spans
                .iter()
                .any(|(ns, ne)| start >= ns && end <= ne)
        })
        .map(|(start, _)| start)
        .max();

    match (last_hire, last_no_hire) {
        (Some(hire), Some(no_hire)) if no_hire > hire => Some(HireDecision::NoHire),
        (Some(_), _) => Some(HireDecision::Hire),
        (None, Some(_)) => Some(HireDecision::NoHire),
        (None, None) => None,
    }
}

/// Confidence from the first sentence that talks about confidence
pub fn confidence(text: &str) -> Confidence {
    for sentence in SENTENCE_SPLIT.split(text) {
        let lower = sentence.to_lowercase();
        if !CONFIDENCE_KEYWORDS.iter().any(|kw| lower.contains(kw)) {
            continue;
        }
        // A negation outranks any level word in the same sentence
        if NEGATIONS.iter().any(|neg| lower.contains(neg)) {
            return Confidence::Low;
        }
        if let Some(caps) = CONFIDENCE_LEVEL.captures(&lower) {
            return Confidence::from_label(&caps[1]);
        }
        return Confidence::High;
    }
    Confidence::Medium
}

/// Candidate text if non-blank, else the raw text, else the placeholder
pub fn non_empty_feedback(candidate: Option<String>, raw: &str) -> String {
    match candidate {
        Some(text) if !text.trim().is_empty() => text,
        _ if !raw.trim().is_empty() => raw.trim().to_string(),
        _ => FEEDBACK_PLACEHOLDER.to_string(),
    }
}

/// Whitespace-separated word count
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

fn char_window(text: &str, start: usize, len: usize) -> &str {
    let mut end = (start + len).min(text.len());
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[start..end]
}

fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => text[..idx].to_string(),
        None => text.to_string(),
    }
}
