//! Lexical checks on candidate responses. Deterministic and never failing;
//! they are best-effort signals, not parsers.

/// Substrings that mark a response as a code submission
const CODE_INDICATORS: [&str; 18] = [
    "```",
    "def ",
    "function ",
    "class ",
    "import ",
    "from ",
    "#include",
    "public class",
    "int ",
    "const ",
    "let ",
    "var ",
    "for(",
    "for (",
    "while(",
    "if(",
    "else{",
    "return ",
];

/// Returned when no language check matches
pub const UNKNOWN_LANGUAGE: &str = "unknown";

pub fn looks_like_code(text: &str) -> bool {
    CODE_INDICATORS
        .iter()
        .any(|indicator| text.contains(indicator))
}

/// Best-guess language; checks run in order and the first match wins
pub fn detect_language(code: &str) -> &'static str {
    if code.contains("def ") && code.contains(':') {
        "python"
    } else if code.contains("function") && code.contains('{') {
        "javascript"
    } else if code.contains("class") && code.contains("public") {
        "java"
    } else if code.contains("#include") {
        "cpp"
    } else if code.contains("import React") || code.contains("export") {
        "typescript"
    } else {
        UNKNOWN_LANGUAGE
    }
}

/// Language for a source file extension
pub fn language_for_extension(extension: &str) -> Option<&'static str> {
    let language = match extension.to_lowercase().as_str() {
        "py" => "python",
        "js" | "mjs" | "cjs" | "jsx" => "javascript",
        "ts" | "tsx" => "typescript",
        "java" => "java",
        "c" | "h" => "c",
        "cc" | "cpp" | "cxx" | "hpp" => "cpp",
        "rs" => "rust",
        "go" => "go",
        "rb" => "ruby",
        "kt" => "kotlin",
        "cs" => "csharp",
        "swift" => "swift",
        _ => return None,
    };
    Some(language)
}

/// Whether extracted discussion context is a "could not extract" style non-answer
pub fn is_placeholder_context(context: &str) -> bool {
    let lower = context.trim().to_lowercase();
    lower.is_empty() || lower.contains("could not extract") || lower.contains("couldn't extract")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_detection() {
        assert!(looks_like_code("def solve(arr): return sorted(arr)"));
        assert!(looks_like_code("```\nx\n```"));
        assert!(looks_like_code("for (i = 0; i < n; i++)"));
        assert!(!looks_like_code("I would probably use a hash map here."));
        assert!(!looks_like_code("Could you clarify the constraints?"));
    }

    #[test]
    fn test_language_detection_order() {
        assert_eq!(detect_language("def solve(arr): return sorted(arr)"), "python");
        assert_eq!(detect_language("function f(a) { return a; }"), "javascript");
        assert_eq!(
            detect_language("public class Main { }"),
            "java"
        );
        assert_eq!(detect_language("#include <vector>\nint main() { }"), "cpp");
        assert_eq!(detect_language("export const x = 1;"), "typescript");
        assert_eq!(detect_language("let x = 1;"), UNKNOWN_LANGUAGE);
    }

    #[test]
    fn test_extension_mapping() {
        assert_eq!(language_for_extension("PY"), Some("python"));
        assert_eq!(language_for_extension("tsx"), Some("typescript"));
        assert_eq!(language_for_extension("txt"), None);
    }

    #[test]
    fn test_placeholder_context() {
        assert!(is_placeholder_context("I could not extract any topics."));
        assert!(is_placeholder_context("   "));
        assert!(!is_placeholder_context("hash maps"));
    }
}
