use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use chrono::Utc;
use uuid::Uuid;

use crate::error::ServiceError;
use crate::generation::prompt::{
    DEFAULT_PDF_QUESTIONS, DEFAULT_TOPIC_QUESTIONS, PDF_TOPICS_PROMPT, mcq_prompt, pdf_mcq_prompt,
    validate_count,
};
use crate::generation::{DocumentUpload, Generator, Part};
use crate::mcq::{self, topics::parse_topics};
use crate::models::{Difficulty, PdfDocument};
use crate::protocol::ServerMessage;
use crate::server::state::AppState;
use crate::store::StoreError;

use super::HandlerResult;

const PDF_MIME: &str = "application/pdf";
const RETRY_HINT: &str = "Failed to process model response. Please try again with a different prompt.";
const TOPICS_FAILED: &str = "Failed to extract topics from PDF";
const PDF_MCQS_FAILED: &str = "Failed to generate MCQs from PDF";

fn count_or(count: Option<i64>, default: i64) -> Result<u32, ServiceError> {
    validate_count(count.unwrap_or(default))
        .ok_or_else(|| ServiceError::bad_request("Count must be between 1 and 50"))
}

pub(super) async fn from_prompt<G: Generator>(
    state: &AppState<G>,
    prompt: String,
    count: Option<i64>,
) -> HandlerResult {
    if prompt.trim().is_empty() {
        return Err(ServiceError::bad_request("Prompt is required"));
    }
    let count = count_or(count, DEFAULT_TOPIC_QUESTIONS)?;

    let retry = |message: String| ServiceError::Internal {
        message,
        details: Some(RETRY_HINT.to_string()),
    };

    let text = state
        .generate(vec![Part::Text(mcq_prompt(prompt.trim(), count))])
        .await
        .map_err(|err| retry(err.to_string()))?;
    let mcqs = mcq::normalize_resolved(&text).map_err(|err| {
        tracing::warn!(violation = %err.violation, raw_len = err.raw.len(), "rejected model response");
        retry(err.to_string())
    })?;

    tracing::info!(requested = count, returned = mcqs.len(), "generated questions");
    Ok(ServerMessage::Mcqs { topic: None, mcqs })
}

pub(super) async fn pdf_topics<G: Generator>(
    state: &AppState<G>,
    file_name: String,
    mime_type: Option<String>,
    data: String,
) -> HandlerResult {
    if data.trim().is_empty() {
        return Err(ServiceError::bad_request("PDF file is required"));
    }
    let bytes = STANDARD
        .decode(data.trim())
        .map_err(|_| ServiceError::bad_request("PDF file is not valid base64"))?;

    let failed = |err: &dyn std::fmt::Display| {
        tracing::warn!(error = %err, "topic extraction failed");
        ServiceError::internal(TOPICS_FAILED)
    };

    let original_name = match file_name.trim() {
        "" => "Uploaded PDF".to_string(),
        name => name.to_string(),
    };
    let mime_type = mime_type.filter(|m| !m.is_empty()).unwrap_or_else(|| PDF_MIME.to_string());

    let file = state
        .upload(DocumentUpload {
            display_name: original_name.clone(),
            mime_type,
            bytes,
        })
        .await
        .map_err(|err| failed(&err))?;

    let text = state
        .generate(vec![
            Part::File {
                uri: file.uri.clone(),
                mime_type: file.mime_type.clone(),
            },
            Part::Text(PDF_TOPICS_PROMPT.to_string()),
        ])
        .await
        .map_err(|err| failed(&err))?;
    let topics = parse_topics(&text);

    let document = PdfDocument {
        id: Uuid::new_v4(),
        original_name,
        file_uri: file.uri,
        file_name: file.name,
        mime_type: file.mime_type,
        topics: topics.clone(),
        created_at: Utc::now(),
    };
    let pdf_id = document.id;

    state
        .store
        .lock()
        .await
        .transaction(|store| {
            store.insert_pdf(document);
            Ok(())
        })
        .map_err(|err: StoreError| failed(&err))?;

    tracing::info!(pdf = %pdf_id, topics = topics.len(), "extracted document topics");
    Ok(ServerMessage::PdfTopics { pdf_id, topics })
}

pub(super) async fn from_pdf<G: Generator>(
    state: &AppState<G>,
    pdf_id: Option<Uuid>,
    topic: String,
    count: Option<i64>,
    difficulty: Option<Difficulty>,
) -> HandlerResult {
    let (Some(pdf_id), false) = (pdf_id, topic.trim().is_empty()) else {
        return Err(ServiceError::bad_request("pdfId and topic are required"));
    };
    let count = count_or(count, DEFAULT_PDF_QUESTIONS)?;

    let (uri, mime_type) = {
        let store = state.store.lock().await;
        let document = store
            .pdf(pdf_id)
            .ok_or_else(|| ServiceError::not_found("PDF session not found. Please upload again."))?;
        (document.file_uri.clone(), document.mime_type.clone())
    };

    let failed = |err: &dyn std::fmt::Display| {
        tracing::warn!(pdf = %pdf_id, error = %err, "document question generation failed");
        ServiceError::internal(PDF_MCQS_FAILED)
    };

    let prompt = pdf_mcq_prompt(topic.trim(), difficulty.unwrap_or_default(), count);
    let text = state
        .generate(vec![Part::File { uri, mime_type }, Part::Text(prompt)])
        .await
        .map_err(|err| failed(&err))?;
    let mcqs = mcq::normalize_resolved(&text).map_err(|err| failed(&err))?;

    Ok(ServerMessage::Mcqs {
        topic: Some(topic),
        mcqs,
    })
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use crate::auth::TokenIssuer;
    use crate::generation::scripted::ScriptedGenerator;
    use crate::protocol::ClientMessage;
    use crate::server::handlers::tests::{call, error_of, status_of};
    use crate::server::state::tests::{SECRET, state};
    use crate::store::Store;

    use super::*;

    const TWO_QUESTIONS: &str = r#"Here you go:
```json
[["2+2?", ["3", "4", "5", "6"], 1], ["Capital of France?", ["Rome", "Paris", "Oslo", "Bern"], 1.0]]
```"#;

    fn generate(prompt: &str, count: Option<i64>) -> ClientMessage {
        ClientMessage::GenerateMcqs {
            prompt: prompt.to_string(),
            count,
        }
    }

    #[tokio::test]
    async fn test_generate_from_prompt() {
        let state = state(ScriptedGenerator::replying([TWO_QUESTIONS]));
        let reply = call(&state, None, generate("arithmetic and geography", Some(2))).await;

        let ServerMessage::Mcqs { topic, mcqs } = reply else {
            panic!("unexpected reply");
        };
        assert!(topic.is_none());
        assert_eq!(mcqs.len(), 2);
        assert_eq!(mcqs[0].correct_answer, "4");
        assert_eq!(mcqs[1].correct_answer, "Paris");

        let requests = state.generator_requests();
        assert_eq!(
            requests[0],
            vec![Part::Text(mcq_prompt("arithmetic and geography", 2))]
        );
    }

    #[tokio::test]
    async fn test_generate_validation() {
        let state = state(ScriptedGenerator::default());

        let blank = call(&state, None, generate("  ", None)).await;
        assert_eq!(error_of(&blank), "Prompt is required");

        for count in [0, 51, -1] {
            let reply = call(&state, None, generate("x", Some(count))).await;
            assert_eq!(error_of(&reply), "Count must be between 1 and 50");
        }
        assert!(state.generator_requests().is_empty());
    }

    #[tokio::test]
    async fn test_default_count_is_ten() {
        let state = state(ScriptedGenerator::replying(["[]"]));
        call(&state, None, generate("rust", None)).await;
        assert_eq!(
            state.generator_requests()[0],
            vec![Part::Text(mcq_prompt("rust", 10))]
        );
    }

    #[tokio::test]
    async fn test_malformed_response() {
        let state = state(ScriptedGenerator::replying([r#"[["q", ["a", "b", "c"], 0]]"#]));
        let reply = call(&state, None, generate("x", None)).await;

        let ServerMessage::Error {
            status,
            error,
            details,
        } = reply
        else {
            panic!("expected an error");
        };
        assert_eq!(status, 500);
        assert!(error.starts_with("malformed model response"));
        assert_eq!(details.as_deref(), Some(RETRY_HINT));
    }

    #[tokio::test]
    async fn test_generation_timeout_is_internal_error() {
        let state = AppState::new(
            Store::in_memory(),
            TokenIssuer::new(SECRET, chrono::Duration::hours(1)),
            ScriptedGenerator::slow(Duration::from_millis(500)),
            Duration::from_millis(20),
        );
        let reply = call(&state, None, generate("x", None)).await;
        assert_eq!(status_of(&reply), Some(500));
    }

    #[tokio::test]
    async fn test_pdf_flow() {
        let state = state(ScriptedGenerator::replying([
            r#"[{"id": "Graphs", "title": "Graph Theory Basics"}, "Trees"]"#,
            r#"[["What is a tree?", ["A cyclic graph", "An acyclic connected graph", "A list", "A set"], 1]]"#,
        ]));

        let reply = call(
            &state,
            None,
            ClientMessage::ExtractPdfTopics {
                file_name: "notes.pdf".to_string(),
                mime_type: None,
                data: STANDARD.encode(b"%PDF-1.4 fake"),
            },
        )
        .await;
        let ServerMessage::PdfTopics { pdf_id, topics } = reply else {
            panic!("unexpected reply");
        };
        assert_eq!(topics.len(), 2);
        assert_eq!(topics[0].title, "Graph Theory Basics");
        assert_eq!(topics[1].id, "Trees");
        assert_eq!(state.generator_uploads(), vec!["notes.pdf".to_string()]);

        let reply = call(
            &state,
            None,
            ClientMessage::GenerateMcqsFromPdf {
                pdf_id: Some(pdf_id),
                topic: "Trees".to_string(),
                count: Some(1),
                difficulty: Some(Difficulty::Easy),
            },
        )
        .await;
        let ServerMessage::Mcqs { topic, mcqs } = reply else {
            panic!("unexpected reply");
        };
        assert_eq!(topic.as_deref(), Some("Trees"));
        assert_eq!(mcqs[0].correct_answer, "An acyclic connected graph");

        let requests = state.generator_requests();
        assert_eq!(
            requests[1][0],
            Part::File {
                uri: "https://files.test/1".to_string(),
                mime_type: PDF_MIME.to_string(),
            }
        );
        assert_eq!(requests[1][1], Part::Text(pdf_mcq_prompt("Trees", Difficulty::Easy, 1)));
    }

    #[tokio::test]
    async fn test_pdf_topics_fall_back() {
        let state = state(ScriptedGenerator::replying(["I could not read this document."]));
        let reply = call(
            &state,
            None,
            ClientMessage::ExtractPdfTopics {
                file_name: String::new(),
                mime_type: None,
                data: STANDARD.encode(b"bytes"),
            },
        )
        .await;
        let ServerMessage::PdfTopics { topics, .. } = reply else {
            panic!("unexpected reply");
        };
        assert_eq!(topics, vec![crate::mcq::topics::Topic::fallback()]);
    }

    #[tokio::test]
    async fn test_pdf_errors() {
        let state = state(ScriptedGenerator::default());

        let missing = call(
            &state,
            None,
            ClientMessage::ExtractPdfTopics {
                file_name: "a.pdf".to_string(),
                mime_type: None,
                data: String::new(),
            },
        )
        .await;
        assert_eq!(error_of(&missing), "PDF file is required");

        // Upload succeeds but the generator has no reply left.
        let failed = call(
            &state,
            None,
            ClientMessage::ExtractPdfTopics {
                file_name: "a.pdf".to_string(),
                mime_type: None,
                data: STANDARD.encode(b"x"),
            },
        )
        .await;
        assert_eq!(status_of(&failed), Some(500));
        assert_eq!(error_of(&failed), TOPICS_FAILED);

        let unknown = call(
            &state,
            None,
            ClientMessage::GenerateMcqsFromPdf {
                pdf_id: Some(Uuid::new_v4()),
                topic: "Trees".to_string(),
                count: None,
                difficulty: None,
            },
        )
        .await;
        assert_eq!(status_of(&unknown), Some(404));
        assert_eq!(error_of(&unknown), "PDF session not found. Please upload again.");

        let no_topic = call(
            &state,
            None,
            ClientMessage::GenerateMcqsFromPdf {
                pdf_id: Some(Uuid::new_v4()),
                topic: " ".to_string(),
                count: None,
                difficulty: None,
            },
        )
        .await;
        assert_eq!(error_of(&no_topic), "pdfId and topic are required");
    }
}
