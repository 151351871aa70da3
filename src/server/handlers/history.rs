use uuid::Uuid;

use crate::auth::all_present;
use crate::error::ServiceError;
use crate::generation::Generator;
use crate::models::TestHistory;
use crate::protocol::{NewTestHistory, ServerMessage};
use crate::server::state::AppState;

use super::HandlerResult;

pub(super) async fn save<G: Generator>(
    state: &AppState<G>,
    token: Option<&str>,
    result: NewTestHistory,
) -> HandlerResult {
    let claims = state.authenticate(token)?;
    if !all_present(&[&result.quiz_id, &result.quiz_name, &result.topic, &result.difficulty]) {
        return Err(ServiceError::bad_request("Missing required fields"));
    }
    if result.score > result.total {
        return Err(ServiceError::bad_request("Score cannot exceed total"));
    }

    let history = TestHistory {
        id: Uuid::new_v4(),
        user: claims.sub,
        quiz_id: result.quiz_id,
        quiz_name: result.quiz_name,
        date: result.date,
        score: result.score,
        total: result.total,
        topic: result.topic,
        difficulty: result.difficulty,
        answers: result.answers,
    };

    state
        .store
        .lock()
        .await
        .transaction(|store| -> Result<(), ServiceError> {
            store.insert_history(history.clone());
            Ok(())
        })?;

    Ok(ServerMessage::HistorySaved { history })
}

pub(super) async fn list<G: Generator>(state: &AppState<G>, token: Option<&str>) -> HandlerResult {
    let claims = state.authenticate(token)?;
    let store = state.store.lock().await;
    let results = store.history_for(claims.sub).into_iter().cloned().collect();

    Ok(ServerMessage::History { results })
}

pub(super) async fn delete<G: Generator>(state: &AppState<G>, token: Option<&str>, id: Uuid) -> HandlerResult {
    let claims = state.authenticate(token)?;
    state
        .store
        .lock()
        .await
        .transaction(|store| {
            store
                .remove_history_owned(id, claims.sub)
                .ok_or_else(|| ServiceError::not_found("Test history not found"))
        })?;

    Ok(ServerMessage::Done {
        message: "Test history deleted".to_string(),
    })
}
