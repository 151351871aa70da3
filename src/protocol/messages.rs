//! Protocol messages for client-server communication.
//!
//! All messages are serialized as JSON over WebSocket. Each request carries an
//! `id` that the matching response echoes, so a client can keep several
//! requests in flight on one connection.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::mcq::GeneratedQuestion;
use crate::mcq::topics::Topic;
use crate::models::{
    AnswerRecord, Difficulty, Profile, QuizDetail, QuizQuestion, QuizSummary, Role, TestHistory,
};

/// Default server port.
pub const DEFAULT_PORT: u16 = 5000;

/// A client request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Request {
    pub id: u64,
    /// Session token from a previous `Session` response.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(flatten)]
    pub message: ClientMessage,
}

/// A server response. `id` is `None` only for unsolicited messages and for
/// requests that could not be parsed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Response {
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(flatten)]
    pub message: ServerMessage,
}

/// Messages sent from client to server.
///
/// Text fields default to empty so that missing fields reach the handlers and
/// are reported as validation errors rather than parse failures.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all_fields = "camelCase")]
pub enum ClientMessage {
    Register {
        #[serde(default)]
        first_name: String,
        #[serde(default)]
        last_name: String,
        #[serde(default)]
        email: String,
        #[serde(default)]
        username: String,
        #[serde(default)]
        password: String,
    },
    Login {
        #[serde(default)]
        username: String,
        #[serde(default)]
        password: String,
    },
    GetProfile,
    UpdateProfile {
        #[serde(default)]
        username: String,
        #[serde(default)]
        email: String,
    },
    ChangePassword {
        #[serde(default)]
        current_password: String,
        #[serde(default)]
        new_password: String,
    },
    SaveQuiz {
        quiz: QuizDraft,
    },
    ListPublicQuizzes,
    ListMyQuizzes,
    GetQuiz {
        quiz_id: Uuid,
    },
    UpdateQuiz {
        quiz_id: Uuid,
        quiz: QuizDraft,
    },
    DeleteQuiz {
        quiz_id: Uuid,
    },
    SaveTestHistory {
        result: NewTestHistory,
    },
    ListTestHistory,
    DeleteTestHistory {
        history_id: Uuid,
    },
    /// Generate questions from a free-form prompt.
    GenerateMcqs {
        #[serde(default)]
        prompt: String,
        #[serde(default)]
        count: Option<i64>,
    },
    /// Upload a PDF (base64 in `data`) and list its topics.
    ExtractPdfTopics {
        #[serde(default)]
        file_name: String,
        #[serde(default)]
        mime_type: Option<String>,
        #[serde(default)]
        data: String,
    },
    /// Generate questions about one topic of a previously uploaded PDF.
    GenerateMcqsFromPdf {
        #[serde(default)]
        pdf_id: Option<Uuid>,
        #[serde(default)]
        topic: String,
        #[serde(default)]
        count: Option<i64>,
        #[serde(default)]
        difficulty: Option<Difficulty>,
    },
}

impl ClientMessage {
    /// Short name for logging.
    pub fn kind(&self) -> &'static str {
        match self {
            ClientMessage::Register { .. } => "register",
            ClientMessage::Login { .. } => "login",
            ClientMessage::GetProfile => "get_profile",
            ClientMessage::UpdateProfile { .. } => "update_profile",
            ClientMessage::ChangePassword { .. } => "change_password",
            ClientMessage::SaveQuiz { .. } => "save_quiz",
            ClientMessage::ListPublicQuizzes => "list_public_quizzes",
            ClientMessage::ListMyQuizzes => "list_my_quizzes",
            ClientMessage::GetQuiz { .. } => "get_quiz",
            ClientMessage::UpdateQuiz { .. } => "update_quiz",
            ClientMessage::DeleteQuiz { .. } => "delete_quiz",
            ClientMessage::SaveTestHistory { .. } => "save_test_history",
            ClientMessage::ListTestHistory => "list_test_history",
            ClientMessage::DeleteTestHistory { .. } => "delete_test_history",
            ClientMessage::GenerateMcqs { .. } => "generate_mcqs",
            ClientMessage::ExtractPdfTopics { .. } => "extract_pdf_topics",
            ClientMessage::GenerateMcqsFromPdf { .. } => "generate_mcqs_from_pdf",
        }
    }
}

/// Messages sent from server to client.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all_fields = "camelCase")]
pub enum ServerMessage {
    /// Sent once after the WebSocket handshake.
    ConnectionAck { service: String, version: String },

    /// Registration, login or profile update succeeded.
    Session { message: String, user: SessionUser },

    Profile { user: Profile },

    /// A request without a payload succeeded.
    Done { message: String },

    QuizSaved { message: String, quiz: QuizDetail },

    PublicQuizzes { quizzes: Vec<QuizSummary> },

    MyQuizzes { quizzes: Vec<QuizDetail> },

    Quiz { quiz: QuizDetail },

    HistorySaved { history: TestHistory },

    History { results: Vec<TestHistory> },

    /// Generated questions, with the topic when generated from a PDF.
    Mcqs {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        topic: Option<String>,
        mcqs: Vec<GeneratedQuestion>,
    },

    PdfTopics { pdf_id: Uuid, topics: Vec<Topic> },

    /// The request failed. `status` follows HTTP status code semantics.
    Error {
        status: u16,
        error: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        details: Option<String>,
    },
}

/// The logged-in user as returned to the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionUser {
    pub id: Uuid,
    pub username: String,
    pub role: Role,
    pub name: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
    pub token: String,
}

/// Quiz fields supplied when saving or updating.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizDraft {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub topic: String,
    #[serde(default)]
    pub difficulty: Option<Difficulty>,
    #[serde(default)]
    pub question_count: u32,
    #[serde(default)]
    pub questions: Vec<QuizQuestion>,
}

/// A finished attempt as submitted by the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTestHistory {
    pub quiz_id: String,
    pub quiz_name: String,
    pub date: DateTime<Utc>,
    pub score: u32,
    pub total: u32,
    pub topic: String,
    pub difficulty: String,
    #[serde(default)]
    pub answers: Vec<AnswerRecord>,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_request_wire_format() {
        let request: Request = serde_json::from_value(json!({
            "id": 7,
            "token": "abc",
            "type": "GenerateMcqsFromPdf",
            "pdfId": "67e55044-10b1-426f-9247-bb680e5fe0c8",
            "topic": "Graphs"
        }))
        .unwrap();

        assert_eq!(request.id, 7);
        assert_eq!(request.token.as_deref(), Some("abc"));
        let ClientMessage::GenerateMcqsFromPdf {
            pdf_id,
            topic,
            count,
            difficulty,
        } = request.message
        else {
            panic!("unexpected message");
        };
        assert!(pdf_id.is_some());
        assert_eq!(topic, "Graphs");
        assert_eq!(count, None);
        assert_eq!(difficulty, None);
    }

    #[test]
    fn test_unit_request_without_token() {
        let request = Request {
            id: 1,
            token: None,
            message: ClientMessage::ListTestHistory,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json, json!({ "id": 1, "type": "ListTestHistory" }));

        let back: Request = serde_json::from_value(json).unwrap();
        assert!(matches!(back.message, ClientMessage::ListTestHistory));
    }

    #[test]
    fn test_missing_register_fields_default_to_empty() {
        let request: Request =
            serde_json::from_value(json!({ "id": 2, "type": "Register", "username": "ada" }))
                .unwrap();
        let ClientMessage::Register {
            username, password, ..
        } = request.message
        else {
            panic!("unexpected message");
        };
        assert_eq!(username, "ada");
        assert!(password.is_empty());
    }

    #[test]
    fn test_error_response_format() {
        let response = Response {
            id: Some(3),
            message: ServerMessage::Error {
                status: 500,
                error: "malformed model response: response is not an array".to_string(),
                details: None,
            },
        };
        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("\"type\":\"Error\""));
        assert!(json.contains("\"status\":500"));
        assert!(!json.contains("details"));
    }

    #[test]
    fn test_camel_case_fields() {
        let message = ServerMessage::PdfTopics {
            pdf_id: Uuid::nil(),
            topics: vec![Topic::fallback()],
        };
        let json = serde_json::to_value(&message).unwrap();
        assert_eq!(json["type"], "PdfTopics");
        assert_eq!(json["pdfId"], Uuid::nil().to_string());
        assert_eq!(json["topics"][0]["id"], "Entire Document");
    }
}
