//! A quiz being taken: answers, navigation and the countdown.

use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};

use crate::mcq::{GeneratedQuestion, OPTION_COUNT};
use crate::models::{AnswerRecord, Difficulty, NOT_ANSWERED, QuizDetail, QuizQuestion};
use crate::protocol::NewTestHistory;

/// Time allowed per question.
pub const SECONDS_PER_QUESTION: u64 = 60;

/// Remaining time at or below which the countdown turns into a warning.
pub const WARNING_SECONDS: u64 = 120;

const MOCK_PREFIX: &str = "Mock Quiz";

#[derive(Debug, Clone)]
pub struct QuizRun {
    pub quiz_id: String,
    pub quiz_name: String,
    pub topic: String,
    pub difficulty: Difficulty,
    pub questions: Vec<QuizQuestion>,
    pub answers: Vec<Option<usize>>,
    pub index: usize,
    pub cursor: usize,
    deadline: Instant,
}

impl QuizRun {
    fn new(
        quiz_id: String,
        quiz_name: String,
        topic: String,
        difficulty: Difficulty,
        questions: Vec<QuizQuestion>,
        now: Instant,
    ) -> Self {
        let allowed = Duration::from_secs(SECONDS_PER_QUESTION * questions.len() as u64);
        Self {
            quiz_id,
            quiz_name,
            topic,
            difficulty,
            answers: vec![None; questions.len()],
            questions,
            index: 0,
            cursor: 0,
            deadline: now + allowed,
        }
    }

    /// Take a saved quiz.
    pub fn saved(quiz: QuizDetail, now: Instant) -> Self {
        Self::new(
            quiz.id.to_string(),
            quiz.name,
            quiz.topic,
            quiz.difficulty,
            quiz.questions,
            now,
        )
    }

    /// Take freshly generated questions without saving them as a quiz.
    pub fn mock(
        topic: String,
        difficulty: Difficulty,
        questions: Vec<GeneratedQuestion>,
        now: Instant,
        date: DateTime<Utc>,
    ) -> Self {
        Self::new(
            format!("mock-{}", date.timestamp_millis()),
            format!("{MOCK_PREFIX}: {topic}"),
            topic,
            difficulty,
            questions.into_iter().map(QuizQuestion::from).collect(),
            now,
        )
    }

    pub fn current(&self) -> Option<&QuizQuestion> {
        self.questions.get(self.index)
    }

    pub fn is_last(&self) -> bool {
        self.index + 1 >= self.questions.len()
    }

    pub fn answered(&self) -> usize {
        self.answers.iter().filter(|a| a.is_some()).count()
    }

    pub fn remaining(&self, now: Instant) -> Duration {
        self.deadline.saturating_duration_since(now)
    }

    pub fn is_warning(&self, now: Instant) -> bool {
        self.remaining(now) <= Duration::from_secs(WARNING_SECONDS)
    }

    pub fn is_expired(&self, now: Instant) -> bool {
        self.remaining(now).is_zero()
    }

    pub fn cursor_down(&mut self) {
        self.cursor = (self.cursor + 1) % OPTION_COUNT;
    }

    pub fn cursor_up(&mut self) {
        self.cursor = (self.cursor + OPTION_COUNT - 1) % OPTION_COUNT;
    }

    /// Record the highlighted option for the current question.
    pub fn choose(&mut self) {
        if let Some(answer) = self.answers.get_mut(self.index) {
            *answer = Some(self.cursor);
        }
    }

    /// Move forward. Returns false when already on the last question.
    pub fn next(&mut self) -> bool {
        if self.is_last() {
            return false;
        }
        self.go_to(self.index + 1);
        true
    }

    pub fn previous(&mut self) {
        if self.index > 0 {
            self.go_to(self.index - 1);
        }
    }

    fn go_to(&mut self, index: usize) {
        self.index = index;
        self.cursor = self.answers[index].unwrap_or(0);
    }

    /// Score the attempt.
    pub fn finish(&self, date: DateTime<Utc>) -> NewTestHistory {
        let answers: Vec<AnswerRecord> = self
            .questions
            .iter()
            .zip(&self.answers)
            .map(|(question, answer)| {
                let selected = answer.map(|i| question.options[i].clone());
                AnswerRecord {
                    question: question.question.clone(),
                    is_correct: selected.as_deref() == Some(question.correct_answer.as_str()),
                    selected: selected.unwrap_or_else(|| NOT_ANSWERED.to_string()),
                    correct: question.correct_answer.clone(),
                }
            })
            .collect();

        NewTestHistory {
            quiz_id: self.quiz_id.clone(),
            quiz_name: self.quiz_name.clone(),
            date,
            score: answers.iter().filter(|a| a.is_correct).count() as u32,
            total: answers.len() as u32,
            topic: self.topic.clone(),
            difficulty: self.difficulty.to_string(),
            answers,
        }
    }
}

/// `mm:ss`
pub fn format_remaining(remaining: Duration) -> String {
    let secs = remaining.as_secs();
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn generated(question: &str, correct: usize) -> GeneratedQuestion {
        let options = ["w", "x", "y", "z"].map(String::from);
        GeneratedQuestion {
            question: question.to_string(),
            correct_answer: options[correct].clone(),
            options,
        }
    }

    fn run(now: Instant) -> QuizRun {
        QuizRun::mock(
            "Rust".to_string(),
            Difficulty::Easy,
            vec![generated("q1", 0), generated("q2", 1), generated("q3", 2)],
            now,
            Utc::now(),
        )
    }

    #[test]
    fn test_mock_naming() {
        let run = run(Instant::now());
        assert_eq!(run.quiz_name, "Mock Quiz: Rust");
        assert!(run.quiz_id.starts_with("mock-"));
        assert!(crate::analytics::is_mock(&run.quiz_name));
    }

    #[test]
    fn test_scoring_with_unanswered() {
        let mut run = run(Instant::now());
        run.choose(); // q1: w, correct
        assert!(run.next());
        run.cursor_down();
        run.cursor_down();
        run.choose(); // q2: y, wrong
        assert!(run.next());
        assert!(!run.next());

        let result = run.finish(Utc::now());
        assert_eq!(result.score, 1);
        assert_eq!(result.total, 3);
        assert_eq!(result.difficulty, "easy");
        assert_eq!(result.answers[1].selected, "y");
        assert_eq!(result.answers[1].correct, "x");
        assert_eq!(result.answers[2].selected, NOT_ANSWERED);
        assert!(!result.answers[2].is_correct);
    }

    #[test]
    fn test_navigation_restores_cursor() {
        let mut run = run(Instant::now());
        run.cursor_up();
        assert_eq!(run.cursor, 3);
        run.choose();
        run.next();
        assert_eq!(run.cursor, 0);
        run.previous();
        assert_eq!(run.cursor, 3);
        run.previous();
        assert_eq!(run.index, 0);
        assert_eq!(run.answered(), 1);
    }

    #[test]
    fn test_countdown() {
        let start = Instant::now();
        let run = run(start);

        assert_eq!(run.remaining(start), Duration::from_secs(180));
        assert!(!run.is_warning(start + Duration::from_secs(59)));
        assert!(run.is_warning(start + Duration::from_secs(60)));
        assert!(!run.is_expired(start + Duration::from_secs(179)));
        assert!(run.is_expired(start + Duration::from_secs(180)));
        assert!(run.is_expired(start + Duration::from_secs(500)));
    }

    #[test]
    fn test_format_remaining() {
        assert_eq!(format_remaining(Duration::from_secs(125)), "02:05");
        assert_eq!(format_remaining(Duration::ZERO), "00:00");
    }
}
