use chrono::Utc;
use uuid::Uuid;

use crate::error::ServiceError;
use crate::generation::Generator;
use crate::models::Quiz;
use crate::protocol::{QuizDraft, ServerMessage};
use crate::server::state::AppState;

use super::HandlerResult;

fn validate_draft(draft: &QuizDraft) -> Result<(), ServiceError> {
    if draft.name.trim().is_empty() || draft.topic.trim().is_empty() || draft.question_count == 0 {
        return Err(ServiceError::bad_request("Missing required fields"));
    }
    if draft.questions.is_empty() {
        return Err(ServiceError::bad_request("Questions array is required"));
    }
    if let Some(position) = draft.questions.iter().position(|q| q.correct_index().is_none()) {
        return Err(ServiceError::bad_request(format!(
            "Question {} has a correct answer that is not one of its options",
            position + 1
        )));
    }

    Ok(())
}

pub(super) async fn save<G: Generator>(
    state: &AppState<G>,
    token: Option<&str>,
    draft: QuizDraft,
) -> HandlerResult {
    let claims = state.authenticate(token)?;
    validate_draft(&draft)?;

    let questions: Vec<_> = draft
        .questions
        .into_iter()
        .filter(|q| q.is_accepted())
        .collect();
    if questions.is_empty() {
        return Err(ServiceError::bad_request("No accepted questions to save"));
    }

    let quiz = Quiz {
        id: Uuid::new_v4(),
        name: draft.name.trim().to_string(),
        topic: draft.topic.trim().to_string(),
        difficulty: draft.difficulty.unwrap_or_default(),
        question_count: draft.question_count,
        questions,
        created_by: claims.sub,
        created_at: Utc::now(),
        is_active: true,
    };

    let mut store = state.store.lock().await;
    let detail = quiz.detail(store.creator(claims.sub));
    store.transaction(|store| -> Result<(), ServiceError> {
        store.insert_quiz(quiz);
        Ok(())
    })?;

    tracing::info!(quiz = %detail.id, questions = detail.questions.len(), "quiz saved");
    Ok(ServerMessage::QuizSaved {
        message: "Quiz saved successfully".to_string(),
        quiz: detail,
    })
}

pub(super) async fn list_public<G: Generator>(state: &AppState<G>, token: Option<&str>) -> HandlerResult {
    state.authenticate(token)?;
    let store = state.store.lock().await;
    let quizzes = store
        .active_quizzes(None)
        .into_iter()
        .map(|q| q.summary(store.creator(q.created_by)))
        .collect();

    Ok(ServerMessage::PublicQuizzes { quizzes })
}

pub(super) async fn list_mine<G: Generator>(state: &AppState<G>, token: Option<&str>) -> HandlerResult {
    let claims = state.authenticate(token)?;
    let store = state.store.lock().await;
    let creator = store.creator(claims.sub);
    let quizzes = store
        .active_quizzes(Some(claims.sub))
        .into_iter()
        .map(|q| q.detail(creator.clone()))
        .collect();

    Ok(ServerMessage::MyQuizzes { quizzes })
}

pub(super) async fn get<G: Generator>(state: &AppState<G>, token: Option<&str>, id: Uuid) -> HandlerResult {
    state.authenticate(token)?;
    let store = state.store.lock().await;
    let quiz = store
        .quiz(id)
        .ok_or_else(|| ServiceError::not_found("Quiz not found"))?;
    if !quiz.is_active {
        return Err(ServiceError::not_found("Quiz not available"));
    }

    Ok(ServerMessage::Quiz {
        quiz: quiz.detail(store.creator(quiz.created_by)),
    })
}

pub(super) async fn update<G: Generator>(
    state: &AppState<G>,
    token: Option<&str>,
    id: Uuid,
    draft: QuizDraft,
) -> HandlerResult {
    let claims = state.authenticate(token)?;
    validate_draft(&draft)?;

    let mut store = state.store.lock().await;
    let updated = store.transaction(|store| -> Result<Quiz, ServiceError> {
        let quiz = store
            .active_quiz_owned_mut(id, claims.sub)
            .ok_or_else(|| ServiceError::not_found("Quiz not found or not active"))?;
        quiz.name = draft.name.trim().to_string();
        quiz.topic = draft.topic.trim().to_string();
        quiz.difficulty = draft.difficulty.unwrap_or_default();
        quiz.question_count = draft.question_count;
        quiz.questions = draft.questions;
        Ok(quiz.clone())
    })?;
    let detail = updated.detail(store.creator(claims.sub));

    Ok(ServerMessage::QuizSaved {
        message: "Quiz updated successfully".to_string(),
        quiz: detail,
    })
}

pub(super) async fn delete<G: Generator>(state: &AppState<G>, token: Option<&str>, id: Uuid) -> HandlerResult {
    let claims = state.authenticate(token)?;
    state
        .store
        .lock()
        .await
        .transaction(|store| {
            store
                .remove_quiz_owned(id, claims.sub)
                .ok_or_else(|| ServiceError::not_found("Quiz not found"))
        })?;

    tracing::info!(quiz = %id, "quiz deleted");
    Ok(ServerMessage::Done {
        message: "Quiz permanently deleted".to_string(),
    })
}

#[cfg(test)]
mod tests {
    use crate::generation::scripted::ScriptedGenerator;
    use crate::models::{Difficulty, QuestionStatus, QuizQuestion};
    use crate::protocol::ClientMessage;
    use crate::server::handlers::tests::{call, error_of, register, status_of};
    use crate::server::state::tests::state;

    use super::*;

    fn question(text: &str, status: QuestionStatus) -> QuizQuestion {
        QuizQuestion {
            question: text.to_string(),
            options: ["a", "b", "c", "d"].map(String::from),
            correct_answer: "c".to_string(),
            status,
        }
    }

    fn draft(questions: Vec<QuizQuestion>) -> QuizDraft {
        QuizDraft {
            name: "Ownership".to_string(),
            topic: "Rust".to_string(),
            difficulty: None,
            question_count: questions.len() as u32,
            questions,
        }
    }

    async fn save_quiz(
        state: &AppState<ScriptedGenerator>,
        token: &str,
        quiz: QuizDraft,
    ) -> ServerMessage {
        call(state, Some(token), ClientMessage::SaveQuiz { quiz }).await
    }

    #[tokio::test]
    async fn test_save_keeps_only_accepted() {
        let state = state(ScriptedGenerator::default());
        let ada = register(&state, "ada").await;

        let reply = save_quiz(
            &state,
            &ada.token,
            draft(vec![
                question("kept", QuestionStatus::Accepted),
                question("dropped", QuestionStatus::Rejected),
                question("pending", QuestionStatus::Pending),
            ]),
        )
        .await;
        let ServerMessage::QuizSaved { quiz, .. } = reply else {
            panic!("unexpected reply");
        };
        assert_eq!(quiz.questions.len(), 1);
        assert_eq!(quiz.questions[0].question, "kept");
        assert_eq!(quiz.difficulty, Difficulty::Medium);
        assert_eq!(quiz.created_by.unwrap().username, "ada");
    }

    #[tokio::test]
    async fn test_save_validation() {
        let state = state(ScriptedGenerator::default());
        let ada = register(&state, "ada").await;

        let none_accepted = save_quiz(
            &state,
            &ada.token,
            draft(vec![question("q", QuestionStatus::Rejected)]),
        )
        .await;
        assert_eq!(error_of(&none_accepted), "No accepted questions to save");

        let empty = save_quiz(&state, &ada.token, QuizDraft {
            question_count: 3,
            ..draft(Vec::new())
        })
        .await;
        assert_eq!(error_of(&empty), "Questions array is required");

        let unnamed = save_quiz(&state, &ada.token, QuizDraft {
            name: " ".to_string(),
            ..draft(vec![question("q", QuestionStatus::Accepted)])
        })
        .await;
        assert_eq!(error_of(&unnamed), "Missing required fields");

        let mut bad = question("q", QuestionStatus::Accepted);
        bad.correct_answer = "z".to_string();
        let mismatch = save_quiz(&state, &ada.token, draft(vec![bad])).await;
        assert_eq!(status_of(&mismatch), Some(400));
    }

    #[tokio::test]
    async fn test_listing_and_ownership() {
        let state = state(ScriptedGenerator::default());
        let ada = register(&state, "ada").await;
        let grace = register(&state, "grace").await;

        let reply = save_quiz(
            &state,
            &ada.token,
            draft(vec![question("q", QuestionStatus::Accepted)]),
        )
        .await;
        let ServerMessage::QuizSaved { quiz, .. } = reply else {
            panic!("unexpected reply");
        };

        let public = call(&state, Some(&grace.token), ClientMessage::ListPublicQuizzes).await;
        let ServerMessage::PublicQuizzes { quizzes } = public else {
            panic!("unexpected reply");
        };
        assert_eq!(quizzes.len(), 1);
        assert_eq!(quizzes[0].id, quiz.id);

        let mine = call(&state, Some(&grace.token), ClientMessage::ListMyQuizzes).await;
        assert!(matches!(mine, ServerMessage::MyQuizzes { quizzes } if quizzes.is_empty()));

        let update = call(
            &state,
            Some(&grace.token),
            ClientMessage::UpdateQuiz {
                quiz_id: quiz.id,
                quiz: draft(vec![question("q", QuestionStatus::Accepted)]),
            },
        )
        .await;
        assert_eq!(error_of(&update), "Quiz not found or not active");

        let delete = call(
            &state,
            Some(&grace.token),
            ClientMessage::DeleteQuiz { quiz_id: quiz.id },
        )
        .await;
        assert_eq!(status_of(&delete), Some(404));

        let delete = call(
            &state,
            Some(&ada.token),
            ClientMessage::DeleteQuiz { quiz_id: quiz.id },
        )
        .await;
        assert!(matches!(delete, ServerMessage::Done { .. }));

        let gone = call(&state, Some(&ada.token), ClientMessage::GetQuiz { quiz_id: quiz.id }).await;
        assert_eq!(error_of(&gone), "Quiz not found");
    }

    #[tokio::test]
    async fn test_update_and_inactive() {
        let state = state(ScriptedGenerator::default());
        let ada = register(&state, "ada").await;
        let reply = save_quiz(
            &state,
            &ada.token,
            draft(vec![question("q", QuestionStatus::Accepted)]),
        )
        .await;
        let ServerMessage::QuizSaved { quiz, .. } = reply else {
            panic!("unexpected reply");
        };

        let updated = call(
            &state,
            Some(&ada.token),
            ClientMessage::UpdateQuiz {
                quiz_id: quiz.id,
                quiz: QuizDraft {
                    name: "Borrowing".to_string(),
                    difficulty: Some(Difficulty::Hard),
                    ..draft(vec![question("q2", QuestionStatus::Accepted)])
                },
            },
        )
        .await;
        let ServerMessage::QuizSaved { quiz: updated, message } = updated else {
            panic!("unexpected reply");
        };
        assert_eq!(message, "Quiz updated successfully");
        assert_eq!(updated.name, "Borrowing");
        assert_eq!(updated.difficulty, Difficulty::Hard);

        state
            .store
            .lock()
            .await
            .active_quiz_owned_mut(quiz.id, ada.id)
            .unwrap()
            .is_active = false;
        let hidden = call(&state, Some(&ada.token), ClientMessage::GetQuiz { quiz_id: quiz.id }).await;
        assert_eq!(error_of(&hidden), "Quiz not available");
    }
}
