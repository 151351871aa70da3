//! Request handlers, one module per resource.

mod account;
mod generate;
mod history;
mod quizzes;

use crate::error::ServiceError;
use crate::generation::Generator;
use crate::protocol::{ClientMessage, Request, Response, ServerMessage};

use super::state::AppState;

/// Route a request to its handler and wrap the outcome in a response.
pub async fn dispatch<G: Generator>(state: &AppState<G>, request: Request) -> Response {
    let Request { id, token, message } = request;
    let kind = message.kind();
    let token = token.as_deref();

    let result = match message {
        ClientMessage::Register {
            first_name,
            last_name,
            email,
            username,
            password,
        } => account::register(state, first_name, last_name, email, username, password).await,
        ClientMessage::Login { username, password } => {
            account::login(state, username, password).await
        }
        ClientMessage::GetProfile => account::get_profile(state, token).await,
        ClientMessage::UpdateProfile { username, email } => {
            account::update_profile(state, token, username, email).await
        }
        ClientMessage::ChangePassword {
            current_password,
            new_password,
        } => account::change_password(state, token, current_password, new_password).await,
        ClientMessage::SaveQuiz { quiz } => quizzes::save(state, token, quiz).await,
        ClientMessage::ListPublicQuizzes => quizzes::list_public(state, token).await,
        ClientMessage::ListMyQuizzes => quizzes::list_mine(state, token).await,
        ClientMessage::GetQuiz { quiz_id } => quizzes::get(state, token, quiz_id).await,
        ClientMessage::UpdateQuiz { quiz_id, quiz } => {
            quizzes::update(state, token, quiz_id, quiz).await
        }
        ClientMessage::DeleteQuiz { quiz_id } => quizzes::delete(state, token, quiz_id).await,
        ClientMessage::SaveTestHistory { result } => history::save(state, token, result).await,
        ClientMessage::ListTestHistory => history::list(state, token).await,
        ClientMessage::DeleteTestHistory { history_id } => {
            history::delete(state, token, history_id).await
        }
        ClientMessage::GenerateMcqs { prompt, count } => {
            generate::from_prompt(state, prompt, count).await
        }
        ClientMessage::ExtractPdfTopics {
            file_name,
            mime_type,
            data,
        } => generate::pdf_topics(state, file_name, mime_type, data).await,
        ClientMessage::GenerateMcqsFromPdf {
            pdf_id,
            topic,
            count,
            difficulty,
        } => generate::from_pdf(state, pdf_id, topic, count, difficulty).await,
    };

    let message = result.unwrap_or_else(|err| {
        if err.status() >= 500 {
            tracing::warn!(request = kind, id, error = %err, "request failed");
        } else {
            tracing::debug!(request = kind, id, status = err.status(), error = %err, "request rejected");
        }
        err.into_message()
    });

    Response {
        id: Some(id),
        message,
    }
}

/// Shorthand for handler results.
type HandlerResult = Result<ServerMessage, ServiceError>;
