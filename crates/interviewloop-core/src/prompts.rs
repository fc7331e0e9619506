use interviewloop_agent::Prompt;

const INTERVIEWER_PERSONA: &str = r#"You are an experienced technical interviewer with expertise in software development.
Conduct coding interviews professionally and evaluate candidates effectively.
Be friendly and conversational so the interview feels like a discussion rather than an interrogation.
Adapt your questions to the candidate's responses and background, and balance support with challenge.
Use natural transitions between the parts of the interview."#;

/// Prompt templates for the interviewer
pub struct InterviewPrompts;

impl InterviewPrompts {
    fn interviewer(text: String) -> Prompt {
        Prompt::new(text).with_system(INTERVIEWER_PERSONA)
    }

    pub fn introduction(candidate_name: &str) -> Prompt {
        Self::interviewer(format!(
            r#"Start the interview with {name}. Introduce yourself and explain the interview process:
1. Technical background discussion
2. Coding problem solving
3. Follow-up questions and discussion

Be welcoming. Ask open-ended questions about the candidate's background, experience and the projects they have worked on."#,
            name = candidate_name
        ))
    }

    pub fn resume_discussion(resume_text: &str) -> Prompt {
        Self::interviewer(format!(
            r#"The candidate shared their resume:

{resume}

Pick one or two items from it and ask the candidate to walk you through them: what they built, which decisions they made and what they would change. Ask one question at a time."#,
            resume = resume_text.trim()
        ))
    }

    pub fn technical_questions(background: &str, role: &str, difficulty: &str) -> Prompt {
        Self::interviewer(format!(
            r#"The candidate's background: {background}
They are applying for a {role} position.

Ask relevant technical questions at {difficulty} difficulty, covering core concepts in their field, system design considerations, best practices and their problem-solving approach.
Ask one question at a time. Acknowledge the candidate's previous answer before moving on."#,
            background = background.trim(),
            role = role,
            difficulty = difficulty
        ))
    }

    pub fn coding_problem(difficulty: &str, topic: &str, context: Option<&str>) -> Prompt {
        let context_line = context
            .map(|c| format!("\nContext from the previous discussion: {}\n", c.trim()))
            .unwrap_or_default();
        Self::interviewer(format!(
            r#"Move on to a coding exercise.
Difficulty: {difficulty}
Topic: {topic}
{context_line}
Present a Leetcode style problem that does not depend on the candidate's background. Begin with a short natural transition, then write "Problem:" followed by:
1. A clear problem statement
2. Example input/output
3. Constraints or requirements

The problem should be challenging but solvable in a reasonable time. Do not solve it."#,
            difficulty = difficulty,
            topic = topic,
            context_line = context_line
        ))
    }

    pub fn rewrite_intro(context: &str, problem_text: &str) -> Prompt {
        Self::interviewer(format!(
            r#"The candidate and I were just discussing {context}.
I want to transition smoothly to presenting this coding problem:

{problem}

Rewrite only the introduction of this problem (the first 1-2 sentences) so it references our discussion about {context}. Reply with the rewritten introduction only; the problem statement stays unchanged."#,
            context = context.trim(),
            problem = problem_text
        ))
    }

    pub fn coding_hint(response: &str) -> Prompt {
        Self::interviewer(format!(
            r#"The candidate replied to the coding problem without submitting code. Their response was:
"{response}"

Respond helpfully and encouragingly. Answer clarification questions clearly. If they seem stuck, offer a hint, but do not solve the problem for them."#,
            response = response.trim()
        ))
    }

    pub fn background_summary(response: &str) -> Prompt {
        Prompt::new(format!(
            r#"Extract the key background information from this candidate response:
"{response}"

Cover technical skills, experience, projects, education and interests. Reply with a concise summary."#,
            response = response.trim()
        ))
    }

    pub fn topics(conversation: &str) -> Prompt {
        Prompt::new(format!(
            r#"Based on this interview conversation:
{conversation}

Identify 3-4 technical topics that would make good coding problems and match the candidate's background and the discussion so far.
Reply with a comma-separated list only (e.g. "arrays, linked lists, sorting, recursion")."#,
            conversation = conversation
        ))
    }

    pub fn technical_context(recent_conversation: &str) -> Prompt {
        Prompt::new(format!(
            r#"Based on this recent interview conversation:
{conversation}

Extract 1-2 key technical topics or concepts that were discussed and can be referenced when transitioning to a coding problem. Reply with the topics only, not a full sentence."#,
            conversation = recent_conversation
        ))
    }

    pub fn second_problem_transition(topic: &str) -> Prompt {
        Self::interviewer(format!(
            r#"The candidate has finished the first coding problem. Write a short transition to a second problem on {topic}. Acknowledge their previous solution first, then say you'd like to explore another area with a different challenge. Do not present the problem itself."#,
            topic = topic
        ))
    }

    pub fn closing() -> Prompt {
        Self::interviewer(
            r#"The interview is coming to an end. Thank the candidate for their time and conclude the interview naturally. Mention that their performance will be evaluated across technical knowledge, problem-solving approach and communication, and tell them what to expect next."#
                .to_string(),
        )
    }

    pub fn highlights(detailed_feedback: &str) -> Prompt {
        Prompt::new(format!(
            r#"Extract 3-4 key highlights from this detailed evaluation:
{feedback}

Focus on the most important points about the candidate's performance, covering both strengths and areas for improvement. Keep it concise and constructive."#,
            feedback = detailed_feedback
        ))
    }

    /// Forward the candidate's message as-is
    pub fn pass_through(response: &str) -> Prompt {
        Self::interviewer(response.to_string())
    }
}
