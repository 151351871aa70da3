//! WebSocket client implementation.

use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use chrono::Utc;
use crossterm::event::{self, Event, KeyEventKind};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::{Mutex, mpsc};
use tokio_tungstenite::tungstenite::Message;

use crate::generation::prompt::topic_prompt;
use crate::generation::wikipedia;
use crate::protocol::{ClientMessage, Request, Response};
use crate::terminal::TerminalGuard;

use super::forms::Effect;
use super::input::handle_key;
use super::state::ClientApp;
use super::ui;

const PDF_MIME: &str = "application/pdf";

/// Shared client app state.
type SharedApp = Arc<Mutex<ClientApp>>;

/// Run the quiz client.
pub async fn run(host: String, port: u16) -> Result<(), Box<dyn std::error::Error>> {
    let app = Arc::new(Mutex::new(ClientApp::new(host.clone(), port)));

    let url = format!("ws://{}:{}", host, port);
    tracing::info!(%url, "connecting");

    let (ws_stream, _) = tokio_tungstenite::connect_async(&url)
        .await
        .map_err(|e| format!("Failed to connect to server: {}", e))?;

    let (mut ws_sender, mut ws_receiver) = ws_stream.split();

    let (tx, mut rx) = mpsc::unbounded_channel::<Request>();

    tokio::spawn(async move {
        while let Some(request) = rx.recv().await {
            let Ok(json) = serde_json::to_string(&request) else {
                continue;
            };
            if ws_sender.send(Message::Text(json.into())).await.is_err() {
                break;
            }
        }
    });

    let app_clone = Arc::clone(&app);
    let recv_task = tokio::spawn(async move {
        while let Some(msg) = ws_receiver.next().await {
            let text = match msg {
                Ok(Message::Text(text)) => text,
                Ok(Message::Close(_)) => {
                    app_clone.lock().await.disconnect("Connection closed by server".to_string());
                    return;
                }
                Err(e) => {
                    app_clone.lock().await.disconnect(format!("Connection error: {}", e));
                    return;
                }
                _ => continue,
            };

            let Ok(response) = serde_json::from_str::<Response>(&text) else {
                continue;
            };
            app_clone.lock().await.handle_response(response);
        }
        app_clone.lock().await.disconnect("Connection closed by server".to_string());
    });

    let result = run_tui(app, tx).await;
    recv_task.abort();
    result
}

/// Run the client TUI.
async fn run_tui(
    app: SharedApp,
    tx: mpsc::UnboundedSender<Request>,
) -> Result<(), Box<dyn std::error::Error>> {
    let http = reqwest::Client::new();
    let mut terminal = TerminalGuard::enter()?;

    loop {
        {
            let mut state = app.lock().await;
            state.tick(Instant::now(), Utc::now());

            for request in state.take_outbox() {
                if tx.send(request).is_err() {
                    state.disconnect("Connection lost".to_string());
                    break;
                }
            }
            for effect in state.take_effects() {
                tokio::spawn(run_effect(Arc::clone(&app), http.clone(), effect));
            }

            if state.should_quit {
                break;
            }
            terminal.draw(|frame| ui::render(frame, &state))?;
        }

        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                handle_key(&mut *app.lock().await, key.code);
            }
        }
    }

    Ok(())
}

/// Carry out work that needs the network or the filesystem, then queue the
/// resulting request.
async fn run_effect(app: SharedApp, http: reqwest::Client, effect: Effect) {
    match effect {
        Effect::GenerateFromTopic {
            topic,
            difficulty,
            count,
            wikipedia,
        } => {
            // Generation goes ahead without context when the lookup fails.
            let context = if wikipedia {
                match wikipedia::fetch_intro(&http, &topic).await {
                    Ok(context) => context,
                    Err(e) => {
                        app.lock().await.flash =
                            Some(format!("Wikipedia lookup failed, generating without context: {}", e));
                        None
                    }
                }
            } else {
                None
            };
            let prompt = topic_prompt(&topic, difficulty, count, context.as_deref());
            app.lock().await.send(ClientMessage::GenerateMcqs {
                prompt,
                count: Some(i64::from(count)),
            });
        }
        Effect::UploadPdf { path } => match read_pdf(&path).await {
            Ok(message) => {
                app.lock().await.send(message);
            }
            Err(e) => app.lock().await.effect_failed(e),
        },
    }
}

async fn read_pdf(path: &str) -> Result<ClientMessage, String> {
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| format!("Could not read {}: {}", path, e))?;
    if bytes.is_empty() {
        return Err(format!("{} is empty", path));
    }

    let file_name = Path::new(path)
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("document.pdf")
        .to_string();

    Ok(ClientMessage::ExtractPdfTopics {
        file_name,
        mime_type: Some(PDF_MIME.to_string()),
        data: STANDARD.encode(bytes),
    })
}
