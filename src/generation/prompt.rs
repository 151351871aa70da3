//! Prompts sent to the generation service.
//!
//! Every question prompt asks for the bracketed triple format understood by
//! [`crate::mcq::normalize`].

use crate::models::Difficulty;

pub const MIN_QUESTIONS: i64 = 1;
pub const MAX_QUESTIONS: i64 = 50;
pub const DEFAULT_TOPIC_QUESTIONS: i64 = 10;
pub const DEFAULT_PDF_QUESTIONS: i64 = 5;

/// Longest slice of grounding text included in a topic prompt, in characters.
pub const CONTEXT_LIMIT: usize = 2000;

const TRIPLE_FORMAT: &str =
    r#"["question", ["option1", "option2", "option3", "option4"], correctIndex]"#;

/// Check a requested question count, returning it when in range.
pub fn validate_count(count: i64) -> Option<u32> {
    (MIN_QUESTIONS..=MAX_QUESTIONS)
        .contains(&count)
        .then_some(count as u32)
}

/// Wrap a caller-supplied prompt with the output format instructions.
pub fn mcq_prompt(prompt: &str, count: u32) -> String {
    format!(
        "Generate exactly {count} multiple-choice questions based on:\n{prompt}\n\n\
         Format each as: {TRIPLE_FORMAT}\n\
         Only return a valid JSON array, no other text or markdown."
    )
}

/// Describe a topic for [`mcq_prompt`], optionally grounded in reference text.
pub fn topic_prompt(topic: &str, difficulty: Difficulty, count: u32, context: Option<&str>) -> String {
    let context = context
        .map(|c| {
            let excerpt: String = c.chars().take(CONTEXT_LIMIT).collect();
            format!("Context:\n{excerpt}\n\n")
        })
        .unwrap_or_default();

    format!(
        "Generate exactly {count} multiple-choice questions based on:\n\
         {context}Topic: {topic}\n\
         Difficulty: {difficulty}\n\
         Format each as: {TRIPLE_FORMAT}\n\
         Only return a valid JSON array, no other text or markdown."
    )
}

pub const PDF_TOPICS_PROMPT: &str = r#"
You are helping to build an automated quiz generator.

From this PDF document, identify its main distinct topics or sections.

Return between 5 and 12 topics that:
- Are broad and non-overlapping
- Each correspond to a meaningful section students might revise
- Use clear, human-friendly names

Respond ONLY with a JSON array of objects like:

[
  { "id": "Hadoop Architecture", "title": "Hadoop Architecture and Components" },
  { "id": "MapReduce Programming Model", "title": "MapReduce Programming Model" }
]

Rules:
- "id" MUST be a short phrase that appears exactly or almost exactly in the material
  as a heading or key phrase (this will be used as topic key).
- "title" must be 4-12 words, clearly describing the topic, and user-friendly.
- Do NOT include any other fields.
- Do NOT include any explanation or text outside the JSON array.
"#;

/// Questions about one topic of an uploaded document.
pub fn pdf_mcq_prompt(topic: &str, difficulty: Difficulty, count: u32) -> String {
    format!(
        r#"
You are an exam setter for university-level students.

Using ONLY the attached PDF as the source, generate exactly {count} multiple-choice questions
strictly about the topic: "{topic}".

Rules:
- Do NOT ask about topics that are not clearly covered in that topic section.
- Each question must be fact-based and unambiguous.
- Difficulty: around "{difficulty}" overall.
- Avoid duplicates or near-duplicates.

Format each question EXACTLY as:
{TRIPLE_FORMAT}

Where:
- "question" is a string
- There are exactly 4 options
- correctIndex is 0, 1, 2, or 3

Return ONLY a valid JSON array.
No extra text, no explanations, no markdown.
"#
    )
}
