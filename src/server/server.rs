//! WebSocket server implementation.

use std::net::SocketAddr;
use std::sync::Arc;

use futures_util::{SinkExt, StreamExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;

use crate::auth::TokenIssuer;
use crate::config::ServerConfig;
use crate::generation::{GeminiClient, Generator};
use crate::protocol::{Request, Response, ServerMessage};
use crate::store::Store;

use super::handlers::dispatch;
use super::state::AppState;

/// Shared server state.
type SharedState<G> = Arc<AppState<G>>;

/// Run the quiz service until interrupted.
pub async fn run(config: ServerConfig) -> Result<(), Box<dyn std::error::Error>> {
    let store = match &config.data_path {
        Some(path) => Store::open(path)?,
        None => {
            tracing::warn!("no data file configured, nothing will be persisted");
            Store::in_memory()
        }
    };
    let generator = GeminiClient::new(config.gemini_api_key.clone(), config.gemini_model.clone());
    let model = generator.model().to_string();
    let state = Arc::new(AppState::new(
        store,
        TokenIssuer::new(&config.jwt_secret, config.token_ttl),
        generator,
        config.generation_timeout,
    ));

    let listener = TcpListener::bind(config.addr).await?;
    tracing::info!(addr = %config.addr, %model, "server listening");

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);
    tokio::select! {
        _ = serve(listener, state) => {}
        result = &mut shutdown => {
            result?;
            tracing::info!("shutting down");
        }
    }

    Ok(())
}

/// Accept connections forever.
pub async fn serve<G: Generator>(listener: TcpListener, state: SharedState<G>) {
    loop {
        match listener.accept().await {
            Ok((stream, addr)) => {
                tokio::spawn(handle_connection(stream, addr, Arc::clone(&state)));
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to accept connection");
            }
        }
    }
}

/// Handle a single WebSocket connection.
async fn handle_connection<G: Generator>(stream: TcpStream, addr: SocketAddr, state: SharedState<G>) {
    let ws_stream = match tokio_tungstenite::accept_async(stream).await {
        Ok(ws) => ws,
        Err(e) => {
            tracing::debug!(%addr, error = %e, "websocket handshake failed");
            return;
        }
    };
    tracing::debug!(%addr, "client connected");

    let (mut ws_sender, mut ws_receiver) = ws_stream.split();

    // Responses from concurrently running requests funnel through one writer.
    let (tx, mut rx) = mpsc::unbounded_channel::<Response>();

    let send_task = tokio::spawn(async move {
        while let Some(response) = rx.recv().await {
            let json = match serde_json::to_string(&response) {
                Ok(json) => json,
                Err(e) => {
                    tracing::error!(error = %e, "failed to encode response");
                    continue;
                }
            };
            if ws_sender.send(Message::Text(json.into())).await.is_err() {
                break;
            }
        }
    });

    let _ = tx.send(Response {
        id: None,
        message: ServerMessage::ConnectionAck {
            service: env!("CARGO_PKG_NAME").to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        },
    });

    while let Some(msg) = ws_receiver.next().await {
        let text = match msg {
            Ok(Message::Text(text)) => text.to_string(),
            Ok(Message::Close(_)) => break,
            Err(e) => {
                tracing::debug!(%addr, error = %e, "connection error");
                break;
            }
            _ => continue,
        };

        let request: Request = match serde_json::from_str(&text) {
            Ok(request) => request,
            Err(e) => {
                let _ = tx.send(Response {
                    id: None,
                    message: ServerMessage::Error {
                        status: 400,
                        error: "Malformed request".to_string(),
                        details: Some(e.to_string()),
                    },
                });
                continue;
            }
        };

        let state = Arc::clone(&state);
        let tx = tx.clone();
        tokio::spawn(async move {
            let response = dispatch(&state, request).await;
            let _ = tx.send(response);
        });
    }

    tracing::debug!(%addr, "client disconnected");
    drop(tx);
    // In-flight requests hold their own senders; the writer ends once they finish.
    let _ = send_task.await;
}
