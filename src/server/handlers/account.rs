use chrono::Utc;
use uuid::Uuid;

use crate::auth::{AuthError, all_present, hash_password, validate_new_password, verify_password};
use crate::error::ServiceError;
use crate::generation::Generator;
use crate::models::{Role, User};
use crate::protocol::{ServerMessage, SessionUser};
use crate::server::state::AppState;

use super::HandlerResult;

fn session_user(user: &User, token: String) -> SessionUser {
    SessionUser {
        id: user.id,
        username: user.username.clone(),
        role: user.role,
        name: user.display_name(),
        email: user.email.clone(),
        created_at: user.created_at,
        token,
    }
}

// Argon2 runs on the blocking pool, never while the store is locked.
async fn hash_blocking(password: String) -> Result<String, ServiceError> {
    let hash = tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|e| AuthError::Hash(e.to_string()))??;
    Ok(hash)
}

async fn verify_blocking(password: String, hash: String) -> Result<bool, ServiceError> {
    tokio::task::spawn_blocking(move || verify_password(&password, &hash))
        .await
        .map_err(|e| ServiceError::from(AuthError::Hash(e.to_string())))
}

pub(super) async fn register<G: Generator>(
    state: &AppState<G>,
    first_name: String,
    last_name: String,
    email: String,
    username: String,
    password: String,
) -> HandlerResult {
    if !all_present(&[&first_name, &last_name, &email, &username, &password]) {
        return Err(ServiceError::bad_request("All fields are required"));
    }
    let username = username.trim();
    let email = email.trim();
    let password_hash = hash_blocking(password).await?;

    let mut store = state.store.lock().await;
    if store.conflicting_user(username, email, None).is_some() {
        return Err(ServiceError::bad_request(
            "User already exists with this email or username",
        ));
    }

    let user = User {
        id: Uuid::new_v4(),
        first_name: first_name.trim().to_string(),
        last_name: last_name.trim().to_string(),
        email: email.to_string(),
        username: username.to_string(),
        password_hash,
        role: Role::User,
        created_at: Utc::now(),
    };
    let session = session_user(&user, state.tokens.issue(&user)?);

    store.transaction(|store| -> Result<(), ServiceError> {
        store.insert_user(user);
        Ok(())
    })?;

    tracing::info!(username = %session.username, "user registered");
    Ok(ServerMessage::Session {
        message: "User registered successfully".to_string(),
        user: session,
    })
}

pub(super) async fn login<G: Generator>(
    state: &AppState<G>,
    username: String,
    password: String,
) -> HandlerResult {
    if !all_present(&[&username, &password]) {
        return Err(ServiceError::bad_request("Username and password are required"));
    }
    let invalid = || ServiceError::Unauthorized("Invalid credentials".to_string());

    let user = state
        .store
        .lock()
        .await
        .user_by_username(username.trim())
        .cloned()
        .ok_or_else(invalid)?;
    if !verify_blocking(password, user.password_hash.clone()).await? {
        return Err(invalid());
    }

    tracing::info!(username = %user.username, "user logged in");
    Ok(ServerMessage::Session {
        message: "Login successful".to_string(),
        user: session_user(&user, state.tokens.issue(&user)?),
    })
}

pub(super) async fn get_profile<G: Generator>(state: &AppState<G>, token: Option<&str>) -> HandlerResult {
    let claims = state.authenticate(token)?;
    let store = state.store.lock().await;
    let user = store
        .user(claims.sub)
        .ok_or_else(|| ServiceError::not_found("User not found"))?;

    Ok(ServerMessage::Profile {
        user: user.profile(),
    })
}

pub(super) async fn update_profile<G: Generator>(
    state: &AppState<G>,
    token: Option<&str>,
    username: String,
    email: String,
) -> HandlerResult {
    let claims = state.authenticate(token)?;
    if !all_present(&[&username, &email]) {
        return Err(ServiceError::bad_request("Username and email are required"));
    }
    let username = username.trim();
    let email = email.trim();

    let mut store = state.store.lock().await;
    if store
        .conflicting_user(username, email, Some(claims.sub))
        .is_some()
    {
        return Err(ServiceError::bad_request("Username or email already exists"));
    }

    let session = store.transaction(|store| -> Result<SessionUser, ServiceError> {
        let user = store
            .user_mut(claims.sub)
            .ok_or_else(|| ServiceError::not_found("User not found"))?;
        user.username = username.to_string();
        user.email = email.to_string();
        Ok(session_user(user, state.tokens.issue(user)?))
    })?;

    Ok(ServerMessage::Session {
        message: "Profile updated successfully".to_string(),
        user: session,
    })
}

pub(super) async fn change_password<G: Generator>(
    state: &AppState<G>,
    token: Option<&str>,
    current_password: String,
    new_password: String,
) -> HandlerResult {
    let claims = state.authenticate(token)?;
    if current_password.is_empty() || new_password.is_empty() {
        return Err(ServiceError::bad_request(
            "Current password and new password are required",
        ));
    }
    validate_new_password(&new_password).map_err(ServiceError::bad_request)?;

    let current_hash = state
        .store
        .lock()
        .await
        .user(claims.sub)
        .map(|user| user.password_hash.clone())
        .ok_or_else(|| ServiceError::not_found("User not found"))?;
    if !verify_blocking(current_password, current_hash).await? {
        return Err(ServiceError::bad_request("Current password is incorrect"));
    }
    let new_hash = hash_blocking(new_password).await?;

    state
        .store
        .lock()
        .await
        .transaction(|store| -> Result<(), ServiceError> {
            let user = store
                .user_mut(claims.sub)
                .ok_or_else(|| ServiceError::not_found("User not found"))?;
            user.password_hash = new_hash;
            Ok(())
        })?;

    Ok(ServerMessage::Done {
        message: "Password changed successfully".to_string(),
    })
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use crate::auth::TokenIssuer;
    use crate::generation::scripted::ScriptedGenerator;
    use crate::protocol::ClientMessage;
    use crate::server::handlers::tests::{call, error_of, register, status_of};
    use crate::server::state::tests::{SECRET, state};
    use crate::store::Store;

    use super::*;

    fn login_message(username: &str, password: &str) -> ClientMessage {
        ClientMessage::Login {
            username: username.to_string(),
            password: password.to_string(),
        }
    }

    #[tokio::test]
    async fn test_register_and_login() {
        let state = state(ScriptedGenerator::default());
        let session = register(&state, "ada").await;
        assert_eq!(session.name, "Ada Lovelace");
        assert_eq!(session.role, Role::User);
        assert_eq!(state.tokens.verify(&session.token).unwrap().sub, session.id);

        let reply = call(&state, None, login_message("ada", "engine")).await;
        let ServerMessage::Session { message, user } = reply else {
            panic!("login failed");
        };
        assert_eq!(message, "Login successful");
        assert_eq!(user.id, session.id);
    }

    #[tokio::test]
    async fn test_register_rejects_duplicates_and_blanks() {
        let state = state(ScriptedGenerator::default());
        register(&state, "ada").await;

        let reply = call(
            &state,
            None,
            ClientMessage::Register {
                first_name: "Other".to_string(),
                last_name: "Person".to_string(),
                email: "ada@example.com".to_string(),
                username: "someone".to_string(),
                password: "secret".to_string(),
            },
        )
        .await;
        assert_eq!(status_of(&reply), Some(400));
        assert_eq!(error_of(&reply), "User already exists with this email or username");

        let reply = call(
            &state,
            None,
            ClientMessage::Register {
                first_name: "  ".to_string(),
                last_name: "Person".to_string(),
                email: "p@example.com".to_string(),
                username: "p".to_string(),
                password: "secret".to_string(),
            },
        )
        .await;
        assert_eq!(error_of(&reply), "All fields are required");
    }

    #[tokio::test]
    async fn test_login_failures() {
        let state = state(ScriptedGenerator::default());
        register(&state, "ada").await;

        let wrong = call(&state, None, login_message("ada", "wrong")).await;
        assert_eq!(status_of(&wrong), Some(401));
        assert_eq!(error_of(&wrong), "Invalid credentials");

        let unknown = call(&state, None, login_message("bob", "engine")).await;
        assert_eq!(error_of(&unknown), "Invalid credentials");

        let blank = call(&state, None, login_message("", "engine")).await;
        assert_eq!(status_of(&blank), Some(400));
    }

    #[tokio::test]
    async fn test_profile_round_trip() {
        let state = state(ScriptedGenerator::default());
        let session = register(&state, "ada").await;
        let token = Some(session.token.as_str());

        let reply = call(&state, token, ClientMessage::GetProfile).await;
        let ServerMessage::Profile { user } = reply else {
            panic!("unexpected reply");
        };
        assert_eq!(user.username, "ada");

        let reply = call(
            &state,
            token,
            ClientMessage::UpdateProfile {
                username: "countess".to_string(),
                email: "countess@example.com".to_string(),
            },
        )
        .await;
        let ServerMessage::Session { user, .. } = reply else {
            panic!("unexpected reply");
        };
        assert_eq!(user.username, "countess");
        let claims = state.tokens.verify(&user.token).unwrap();
        assert_eq!(claims.email, "countess@example.com");
    }

    #[tokio::test]
    async fn test_update_profile_conflict() {
        let state = state(ScriptedGenerator::default());
        register(&state, "ada").await;
        let grace = register(&state, "grace").await;

        let reply = call(
            &state,
            Some(&grace.token),
            ClientMessage::UpdateProfile {
                username: "ada".to_string(),
                email: "grace@example.com".to_string(),
            },
        )
        .await;
        assert_eq!(error_of(&reply), "Username or email already exists");

        // Keeping one's own details is not a conflict.
        let reply = call(
            &state,
            Some(&grace.token),
            ClientMessage::UpdateProfile {
                username: "grace".to_string(),
                email: "grace@example.com".to_string(),
            },
        )
        .await;
        assert!(matches!(reply, ServerMessage::Session { .. }));
    }

    #[tokio::test]
    async fn test_change_password() {
        let state = state(ScriptedGenerator::default());
        let session = register(&state, "ada").await;
        let token = Some(session.token.as_str());

        let change = |current: &str, new: &str| ClientMessage::ChangePassword {
            current_password: current.to_string(),
            new_password: new.to_string(),
        };

        let short = call(&state, token, change("engine", "abc")).await;
        assert_eq!(error_of(&short), "New password must be at least 6 characters long");

        let wrong = call(&state, token, change("nope", "analytical")).await;
        assert_eq!(error_of(&wrong), "Current password is incorrect");

        let ok = call(&state, token, change("engine", "analytical")).await;
        assert!(matches!(ok, ServerMessage::Done { .. }));

        let old = call(&state, None, login_message("ada", "engine")).await;
        assert_eq!(status_of(&old), Some(401));
        let new = call(&state, None, login_message("ada", "analytical")).await;
        assert!(matches!(new, ServerMessage::Session { .. }));
    }

    #[tokio::test]
    async fn test_profile_requires_token() {
        let state = state(ScriptedGenerator::default());
        let reply = call(&state, None, ClientMessage::GetProfile).await;
        assert_eq!(status_of(&reply), Some(401));

        let reply = call(&state, Some("forged"), ClientMessage::GetProfile).await;
        assert_eq!(status_of(&reply), Some(403));
    }

    #[tokio::test]
    async fn test_unsaved_registration_is_forgotten() {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::open(dir.path().join("missing").join("quizgen.json")).unwrap();
        let state = AppState::new(
            store,
            TokenIssuer::new(SECRET, chrono::Duration::hours(24)),
            ScriptedGenerator::default(),
            Duration::from_secs(5),
        );
        let ada = || ClientMessage::Register {
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            email: "ada@example.com".to_string(),
            username: "ada".to_string(),
            password: "engine".to_string(),
        };

        let first = call(&state, None, ada()).await;
        assert_eq!(status_of(&first), Some(500));
        assert_eq!(error_of(&first), "Internal server error");

        let second = call(&state, None, ada()).await;
        assert_eq!(status_of(&second), Some(500));

        let login = call(&state, None, login_message("ada", "engine")).await;
        assert_eq!(status_of(&login), Some(401));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_store_free_while_hashing() {
        let state = Arc::new(state(ScriptedGenerator::default()));
        let registering = tokio::spawn({
            let state = Arc::clone(&state);
            async move { register(&state, "ada").await }
        });

        let (mut free, mut held) = (0, 0);
        loop {
            match state.store.try_lock() {
                Ok(store) => {
                    assert!(store.active_quizzes(None).is_empty());
                    free += 1;
                }
                Err(_) => held += 1,
            }
            if registering.is_finished() {
                break;
            }
            tokio::time::sleep(Duration::from_micros(200)).await;
        }

        assert_eq!(registering.await.unwrap().username, "ada");
        assert!(free > held, "store locked in {held} of {} polls", free + held);
    }
}
