//! Editable forms: login/registration, question generation and review.

use uuid::Uuid;

use crate::generation::prompt::validate_count;
use crate::mcq::GeneratedQuestion;
use crate::mcq::topics::Topic;
use crate::models::{Difficulty, QuestionStatus, QuizDetail, QuizQuestion};
use crate::protocol::{ClientMessage, QuizDraft};

const MAX_INPUT_LENGTH: usize = 200;

#[derive(Debug, Clone)]
pub struct InputField {
    pub label: &'static str,
    pub value: String,
    pub secret: bool,
}

impl InputField {
    fn new(label: &'static str) -> Self {
        Self {
            label,
            value: String::new(),
            secret: false,
        }
    }

    fn secret(label: &'static str) -> Self {
        Self {
            secret: true,
            ..Self::new(label)
        }
    }

    pub fn push(&mut self, c: char) {
        if self.value.chars().count() < MAX_INPUT_LENGTH {
            self.value.push(c);
        }
    }

    pub fn pop(&mut self) {
        self.value.pop();
    }

    /// Text to show, masked for secrets.
    pub fn display(&self) -> String {
        if self.secret {
            "*".repeat(self.value.chars().count())
        } else {
            self.value.clone()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMode {
    Login,
    Register,
}

#[derive(Debug, Clone)]
pub struct AuthForm {
    pub mode: AuthMode,
    pub fields: Vec<InputField>,
    pub focus: usize,
    pub error: Option<String>,
    pub busy: bool,
}

impl AuthForm {
    pub fn new(mode: AuthMode) -> Self {
        let fields = match mode {
            AuthMode::Login => vec![InputField::new("Username"), InputField::secret("Password")],
            AuthMode::Register => vec![
                InputField::new("First name"),
                InputField::new("Last name"),
                InputField::new("Email"),
                InputField::new("Username"),
                InputField::secret("Password"),
            ],
        };
        Self {
            mode,
            fields,
            focus: 0,
            error: None,
            busy: false,
        }
    }

    pub fn toggle_mode(&mut self) {
        let next = match self.mode {
            AuthMode::Login => AuthMode::Register,
            AuthMode::Register => AuthMode::Login,
        };
        *self = Self::new(next);
    }

    pub fn focus_next(&mut self) {
        self.focus = (self.focus + 1) % self.fields.len();
    }

    pub fn focus_previous(&mut self) {
        self.focus = (self.focus + self.fields.len() - 1) % self.fields.len();
    }

    pub fn focused_mut(&mut self) -> &mut InputField {
        &mut self.fields[self.focus]
    }

    fn value(&self, label: &str) -> String {
        self.fields
            .iter()
            .find(|f| f.label == label)
            .map(|f| f.value.trim().to_string())
            .unwrap_or_default()
    }

    /// Build the request, or explain what is missing.
    pub fn submit(&self) -> Result<ClientMessage, String> {
        if self.fields.iter().any(|f| f.value.trim().is_empty()) {
            return Err("All fields are required".to_string());
        }

        Ok(match self.mode {
            AuthMode::Login => ClientMessage::Login {
                username: self.value("Username"),
                password: self.value("Password"),
            },
            AuthMode::Register => ClientMessage::Register {
                first_name: self.value("First name"),
                last_name: self.value("Last name"),
                email: self.value("Email"),
                username: self.value("Username"),
                password: self.value("Password"),
            },
        })
    }
}

/// What generated questions are for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Purpose {
    /// Review and save as a quiz.
    Create,
    /// Take immediately as a mock quiz.
    Mock,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    Topic,
    Pdf,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerateField {
    Source,
    Name,
    Input,
    Difficulty,
    Count,
    Wikipedia,
    PdfTopic,
}

/// Topics detected in an uploaded PDF.
#[derive(Debug, Clone)]
pub struct PdfSelection {
    pub pdf_id: Uuid,
    pub topics: Vec<Topic>,
    pub selected: usize,
}

impl PdfSelection {
    pub fn topic(&self) -> Option<&Topic> {
        self.topics.get(self.selected)
    }
}

/// Follow-up work that has to leave the UI thread.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Optionally fetch Wikipedia context, then request questions.
    GenerateFromTopic {
        topic: String,
        difficulty: Difficulty,
        count: u32,
        wikipedia: bool,
    },
    /// Read a PDF from disk and upload it for topic extraction.
    UploadPdf { path: String },
}

/// The result of submitting the generate form.
#[derive(Debug, Clone, PartialEq)]
pub enum GenerateAction {
    Run(Effect),
    Send(ClientMessage),
}

#[derive(Debug, Clone)]
pub struct GenerateForm {
    pub purpose: Purpose,
    pub source: Source,
    pub name: InputField,
    pub input: InputField,
    pub difficulty: Difficulty,
    pub count: InputField,
    pub wikipedia: bool,
    pub pdf: Option<PdfSelection>,
    pub focus: usize,
    pub busy: bool,
    pub error: Option<String>,
}

impl GenerateForm {
    pub fn new(purpose: Purpose) -> Self {
        let mut count = InputField::new("Questions");
        count.value = "10".to_string();
        Self {
            purpose,
            source: Source::Topic,
            name: InputField::new("Quiz name"),
            input: InputField::new("Topic"),
            difficulty: Difficulty::Medium,
            count,
            wikipedia: true,
            pdf: None,
            focus: 0,
            busy: false,
            error: None,
        }
    }

    /// Fields in display order for the current source.
    pub fn fields(&self) -> Vec<GenerateField> {
        let mut fields = vec![GenerateField::Source];
        if self.purpose == Purpose::Create {
            fields.push(GenerateField::Name);
        }
        fields.extend([GenerateField::Input, GenerateField::Difficulty, GenerateField::Count]);
        match self.source {
            Source::Topic => fields.push(GenerateField::Wikipedia),
            Source::Pdf if self.pdf.is_some() => fields.push(GenerateField::PdfTopic),
            Source::Pdf => {}
        }
        fields
    }

    pub fn focused(&self) -> GenerateField {
        let fields = self.fields();
        fields[self.focus.min(fields.len() - 1)]
    }

    pub fn focus_next(&mut self) {
        self.focus = (self.focus + 1) % self.fields().len();
    }

    pub fn focus_previous(&mut self) {
        let len = self.fields().len();
        self.focus = (self.focus + len - 1) % len;
    }

    pub fn type_char(&mut self, c: char) {
        match self.focused() {
            GenerateField::Name => self.name.push(c),
            GenerateField::Input => {
                self.input.push(c);
                self.pdf = None;
            }
            GenerateField::Count if c.is_ascii_digit() => self.count.push(c),
            _ => {}
        }
    }

    pub fn backspace(&mut self) {
        match self.focused() {
            GenerateField::Name => self.name.pop(),
            GenerateField::Input => {
                self.input.pop();
                self.pdf = None;
            }
            GenerateField::Count => self.count.pop(),
            _ => {}
        }
    }

    /// Cycle the value of a choice field.
    pub fn cycle(&mut self) {
        match self.focused() {
            GenerateField::Source => {
                self.source = match self.source {
                    Source::Topic => Source::Pdf,
                    Source::Pdf => Source::Topic,
                };
                self.input = InputField::new(match self.source {
                    Source::Topic => "Topic",
                    Source::Pdf => "PDF path",
                });
                self.pdf = None;
            }
            GenerateField::Difficulty => self.difficulty = self.difficulty.next(),
            GenerateField::Wikipedia => self.wikipedia = !self.wikipedia,
            GenerateField::PdfTopic => {
                if let Some(pdf) = &mut self.pdf {
                    pdf.selected = (pdf.selected + 1) % pdf.topics.len().max(1);
                }
            }
            _ => {}
        }
    }

    pub fn set_topics(&mut self, pdf_id: Uuid, topics: Vec<Topic>) {
        self.busy = false;
        self.pdf = Some(PdfSelection {
            pdf_id,
            topics,
            selected: 0,
        });
        if let Some(position) = self.fields().iter().position(|f| *f == GenerateField::PdfTopic) {
            self.focus = position;
        }
    }

    /// Topic label used for the resulting quiz.
    pub fn topic_label(&self) -> String {
        match (&self.source, &self.pdf) {
            (Source::Pdf, Some(pdf)) => pdf
                .topic()
                .map(|t| t.title.clone())
                .unwrap_or_else(|| self.input.value.trim().to_string()),
            _ => self.input.value.trim().to_string(),
        }
    }

    pub fn submit(&self) -> Result<GenerateAction, String> {
        let count = self
            .count
            .value
            .parse::<i64>()
            .ok()
            .and_then(validate_count)
            .ok_or("Count must be between 1 and 50")?;
        if self.purpose == Purpose::Create && self.name.value.trim().is_empty() {
            return Err("Quiz name is required".to_string());
        }
        let input = self.input.value.trim();

        match self.source {
            Source::Topic if input.is_empty() => Err("Please enter a topic".to_string()),
            Source::Topic => Ok(GenerateAction::Run(Effect::GenerateFromTopic {
                topic: input.to_string(),
                difficulty: self.difficulty,
                count,
                wikipedia: self.wikipedia,
            })),
            Source::Pdf if input.is_empty() => Err("Enter the path to a PDF file".to_string()),
            Source::Pdf => match &self.pdf {
                None => Ok(GenerateAction::Run(Effect::UploadPdf {
                    path: input.to_string(),
                })),
                Some(pdf) => {
                    let topic = pdf.topic().ok_or("No topic selected")?;
                    Ok(GenerateAction::Send(ClientMessage::GenerateMcqsFromPdf {
                        pdf_id: Some(pdf.pdf_id),
                        topic: topic.id.clone(),
                        count: Some(i64::from(count)),
                        difficulty: Some(self.difficulty),
                    }))
                }
            },
        }
    }
}

/// Generated or existing questions being accepted or rejected.
#[derive(Debug, Clone)]
pub struct Review {
    pub name: String,
    pub topic: String,
    pub difficulty: Difficulty,
    pub questions: Vec<QuizQuestion>,
    pub selected: usize,
    /// Set when revising a saved quiz.
    pub editing: Option<Uuid>,
    pub busy: bool,
    pub error: Option<String>,
}

impl Review {
    pub fn generated(
        name: String,
        topic: String,
        difficulty: Difficulty,
        questions: Vec<GeneratedQuestion>,
    ) -> Self {
        Self {
            name,
            topic,
            difficulty,
            questions: questions.into_iter().map(QuizQuestion::from).collect(),
            selected: 0,
            editing: None,
            busy: false,
            error: None,
        }
    }

    pub fn existing(quiz: QuizDetail) -> Self {
        Self {
            name: quiz.name,
            topic: quiz.topic,
            difficulty: quiz.difficulty,
            questions: quiz.questions,
            selected: 0,
            editing: Some(quiz.id),
            busy: false,
            error: None,
        }
    }

    pub fn select_next(&mut self) {
        if self.selected + 1 < self.questions.len() {
            self.selected += 1;
        }
    }

    pub fn select_previous(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    pub fn mark(&mut self, status: QuestionStatus) {
        if let Some(question) = self.questions.get_mut(self.selected) {
            question.status = status;
        }
        self.select_next();
    }

    pub fn accept_all(&mut self) {
        for question in &mut self.questions {
            question.status = QuestionStatus::Accepted;
        }
    }

    pub fn accepted(&self) -> usize {
        self.questions.iter().filter(|q| q.is_accepted()).count()
    }

    pub fn submit(&self) -> Result<ClientMessage, String> {
        let accepted = self.accepted();
        if accepted == 0 {
            return Err("Accept at least one question".to_string());
        }

        let questions = match self.editing {
            Some(_) => self
                .questions
                .iter()
                .filter(|q| q.is_accepted())
                .cloned()
                .collect(),
            None => self.questions.clone(),
        };
        let quiz = QuizDraft {
            name: self.name.clone(),
            topic: self.topic.clone(),
            difficulty: Some(self.difficulty),
            question_count: accepted as u32,
            questions,
        };

        Ok(match self.editing {
            Some(quiz_id) => ClientMessage::UpdateQuiz { quiz_id, quiz },
            None => ClientMessage::SaveQuiz { quiz },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn generated(n: usize) -> Vec<GeneratedQuestion> {
        (0..n)
            .map(|i| GeneratedQuestion {
                question: format!("q{i}"),
                options: ["a", "b", "c", "d"].map(String::from),
                correct_answer: "a".to_string(),
            })
            .collect()
    }

    #[test]
    fn test_login_submit() {
        let mut form = AuthForm::new(AuthMode::Login);
        assert!(form.submit().is_err());

        "ada".chars().for_each(|c| form.focused_mut().push(c));
        form.focus_next();
        "engine".chars().for_each(|c| form.focused_mut().push(c));

        assert_eq!(form.fields[1].display(), "******");
        let ClientMessage::Login { username, password } = form.submit().unwrap() else {
            panic!("expected login");
        };
        assert_eq!(username, "ada");
        assert_eq!(password, "engine");
    }

    #[test]
    fn test_toggle_mode_resets_fields() {
        let mut form = AuthForm::new(AuthMode::Login);
        form.focused_mut().push('x');
        form.toggle_mode();
        assert_eq!(form.mode, AuthMode::Register);
        assert_eq!(form.fields.len(), 5);
        assert!(form.fields.iter().all(|f| f.value.is_empty()));
        form.focus_previous();
        assert_eq!(form.focus, 4);
    }

    #[test]
    fn test_generate_topic_effect() {
        let mut form = GenerateForm::new(Purpose::Mock);
        assert_eq!(form.submit().unwrap_err(), "Please enter a topic");

        form.focus = 1;
        assert_eq!(form.focused(), GenerateField::Input);
        "Borrowing".chars().for_each(|c| form.type_char(c));
        form.focus_next();
        form.cycle();

        assert_eq!(
            form.submit().unwrap(),
            GenerateAction::Run(Effect::GenerateFromTopic {
                topic: "Borrowing".to_string(),
                difficulty: Difficulty::Hard,
                count: 10,
                wikipedia: true,
            })
        );
    }

    #[test]
    fn test_generate_count_and_name_validation() {
        let mut form = GenerateForm::new(Purpose::Create);
        form.input.value = "Rust".to_string();
        assert_eq!(form.submit().unwrap_err(), "Quiz name is required");

        form.name.value = "My quiz".to_string();
        form.count.value = "51".to_string();
        assert_eq!(form.submit().unwrap_err(), "Count must be between 1 and 50");
        form.count.value = String::new();
        assert!(form.submit().is_err());
    }

    #[test]
    fn test_pdf_flow() {
        let mut form = GenerateForm::new(Purpose::Create);
        form.name.value = "Notes".to_string();
        form.cycle();
        assert_eq!(form.source, Source::Pdf);
        assert!(!form.fields().contains(&GenerateField::Wikipedia));

        form.input.value = "/tmp/notes.pdf".to_string();
        assert_eq!(
            form.submit().unwrap(),
            GenerateAction::Run(Effect::UploadPdf {
                path: "/tmp/notes.pdf".to_string()
            })
        );

        let pdf_id = Uuid::new_v4();
        form.set_topics(
            pdf_id,
            vec![
                Topic {
                    id: "Graphs".to_string(),
                    title: "Graph Theory".to_string(),
                },
                Topic {
                    id: "Trees".to_string(),
                    title: "Trees and Forests".to_string(),
                },
            ],
        );
        assert_eq!(form.focused(), GenerateField::PdfTopic);
        form.cycle();
        assert_eq!(form.topic_label(), "Trees and Forests");

        let GenerateAction::Send(ClientMessage::GenerateMcqsFromPdf { topic, count, .. }) =
            form.submit().unwrap()
        else {
            panic!("expected a request");
        };
        assert_eq!(topic, "Trees");
        assert_eq!(count, Some(10));
    }

    #[test]
    fn test_review_save() {
        let mut review = Review::generated(
            "Quiz".to_string(),
            "Rust".to_string(),
            Difficulty::Easy,
            generated(3),
        );
        assert_eq!(review.submit().unwrap_err(), "Accept at least one question");

        review.mark(QuestionStatus::Accepted);
        review.mark(QuestionStatus::Rejected);
        assert_eq!(review.selected, 2);
        assert_eq!(review.accepted(), 1);

        let ClientMessage::SaveQuiz { quiz } = review.submit().unwrap() else {
            panic!("expected save");
        };
        assert_eq!(quiz.question_count, 1);
        assert_eq!(quiz.questions.len(), 3);
        assert_eq!(quiz.questions[1].status, QuestionStatus::Rejected);
    }
}
