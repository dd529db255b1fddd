//! Prompt building and answer extraction for agents.

/// Marker the agent is asked to put before its answer.
pub const FINAL_ANSWER_ACTION: &str = "Final Answer:";

/// System prompt describing the persona.
pub fn role_playing_prompt(role: &str, backstory: &str, goal: &str) -> String {
    format!(
        "You are {}. {}\nYour personal goal is: {}",
        role, backstory, goal
    )
}

/// Format instructions for an agent without tools.
pub const NO_TOOLS_PROMPT: &str = "To give my best complete final answer to the task \
respond using the exact following format:\n\n\
Thought: I now can give a great answer\n\
Final Answer: Your final answer must be the great and the most complete as possible, \
it must be outcome described.\n\n\
I MUST use these formats, my job depends on it!";

/// Append shared context from earlier tasks to a task prompt.
pub fn with_context(task_prompt: &str, context: Option<&str>) -> String {
    match context {
        Some(ctx) if !ctx.trim().is_empty() => format!(
            "{}\n\nThis is the context you're working with:\n{}",
            task_prompt, ctx
        ),
        _ => task_prompt.to_string(),
    }
}

/// Text after the last `Final Answer:` marker, or the whole response.
pub fn extract_final_answer(text: &str) -> String {
    match text.rfind(FINAL_ANSWER_ACTION) {
        Some(idx) => text[idx + FINAL_ANSWER_ACTION.len()..].trim().to_string(),
        None => text.trim().to_string(),
    }
}
