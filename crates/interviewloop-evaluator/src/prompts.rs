use interviewloop_agent::Prompt;

const CODE_EVALUATOR_PERSONA: &str = "You are an expert code evaluator specializing in technical assessments. \
Analyze code submissions for correctness, efficiency and style. Be thorough but fair, and give constructive feedback.";

const HIRING_MANAGER_PERSONA: &str = "You are a senior technical hiring manager responsible for final candidate assessments. \
Your evaluation informs hiring decisions. Base it only on evidence from the interview.";

const MAX_CODE_CHARS: usize = 20_000;
const MAX_NOTES_CHARS: usize = 60_000;

/// Prompt templates for the evaluators
pub struct EvaluationPrompts;

impl EvaluationPrompts {
    /// Build the code evaluation prompt
    pub fn code_evaluation(code: &str, problem_statement: &str, language: Option<&str>) -> Prompt {
        let text = format!(
            r#"Evaluate the following solution.

## Problem Statement
{problem}

## Code (language: {language})
```
{code}
```

Cover, in clearly titled sections:
1. Correctness - does the solution work for all cases? Score from 0-10.
2. Time Complexity - what is the Big O notation?
3. Space Complexity - how efficiently is memory used?
4. Code Quality - is the code structured, readable and maintainable? Score from 0-10.
5. Edge Case Handling - are boundary conditions handled?
6. Suggestions - what could be done better?

Start with what the solution does well before discussing improvements.

End your response with a JSON block in this exact format:

```json
{{
  "correctness": 0-10,
  "time_complexity": "O(...)",
  "space_complexity": "O(...)",
  "code_quality": 0-10,
  "feedback": "Overall assessment",
  "suggestions": ["First suggestion", "Second suggestion"]
}}
```
"#,
            problem = problem_statement.trim(),
            language = language.unwrap_or("not specified"),
            code = truncate_output(code, MAX_CODE_CHARS),
        );

        Prompt::new(text).with_system(CODE_EVALUATOR_PERSONA)
    }

    /// Build the final evaluation prompt from the serialized interview notes
    pub fn final_evaluation(interview_notes: &str) -> Prompt {
        let text = format!(
            r#"Review the complete notes from this technical interview:

```json
{notes}
```

Assess the candidate on:
1. Technical Knowledge (score 0-10)
2. Problem-Solving Ability (score 0-10)
3. Communication Skills (score 0-10)
4. Overall Rating (score 0-10)

Also include:
- Strengths: at least 3 specific strengths shown in the interview
- Areas for Improvement: at least 2 areas where the candidate could improve
- Hiring Recommendation: hire or no hire, with a confidence level (high/medium/low)

End your response with a JSON block in this exact format:

```json
{{
  "technical_skill": 0-10,
  "problem_solving": 0-10,
  "communication": 0-10,
  "overall_rating": 0-10,
  "strengths": ["..."],
  "areas_for_improvement": ["..."],
  "recommendation": {{"decision": "hire" | "no_hire", "confidence": "high" | "medium" | "low"}},
  "detailed_feedback": "Comprehensive assessment"
}}
```
"#,
            notes = truncate_output(interview_notes, MAX_NOTES_CHARS),
        );

        Prompt::new(text).with_system(HIRING_MANAGER_PERSONA)
    }
}

/// Truncate output to a maximum length, preferring a line boundary
pub(crate) fn truncate_output(output: &str, max_len: usize) -> &str {
    if output.len() <= max_len {
        return output;
    }
    let mut end = max_len;
    while !output.is_char_boundary(end) {
        end -= 1;
    }
    match output[..end].rfind('\n') {
        Some(pos) => &output[..pos],
        None => &output[..end],
    }
}
