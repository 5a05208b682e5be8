use anyhow::{Context, Result};
use dialoguer::theme::ColorfulTheme;
use dialoguer::{Input, Select};
use std::future::Future;
use tokio::sync::watch;

use super::Session;
use crate::config::AppConfig;
use crate::history::{JsonFileStore, TranscriptStore};
use crate::models::ChatMessage;
use crate::prediction::{PredictError, PredictionResult};
use crate::ui::Output;

/// Quick options offered by `/menu`: (icon, label, query)
pub const MENU_ITEMS: [(&str, &str, &str); 6] = [
    ("🔥", "Top Picks", "What are the top football picks for today?"),
    ("⚽", "Predict Match", "Predict a match for me"),
    ("📊", "Form Analysis", "Show me team form analysis for upcoming big games"),
    ("📉", "Over/Under Tips", "Best over/under 2.5 goals tips for today"),
    ("🏆", "League Standings", "What are the current league leaders in Europe?"),
    ("❓", "Help", "How do I use this bot?"),
];

/// What one line of user input asks for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatInput {
    Empty,
    Query(String),
    Menu,
    History,
    Clear,
    Quit,
}

/// Interpret a line of input. A bare number picks one of `follow_ups` (1-based).
pub fn parse_input(input: &str, follow_ups: &[String]) -> ChatInput {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return ChatInput::Empty;
    }

    match trimmed.to_lowercase().as_str() {
        "/menu" => return ChatInput::Menu,
        "/history" => return ChatInput::History,
        "/clear" => return ChatInput::Clear,
        "/quit" | "/exit" => return ChatInput::Quit,
        _ => {}
    }

    if let Ok(n) = trimmed.parse::<usize>() {
        if let Some(follow_up) = n.checked_sub(1).and_then(|i| follow_ups.get(i)) {
            return ChatInput::Query(follow_up.clone());
        }
    }

    ChatInput::Query(trimmed.to_string())
}

/// Follow-ups of the most recent prediction in the transcript
fn latest_follow_ups(transcript: &[ChatMessage]) -> Vec<String> {
    transcript
        .iter()
        .rev()
        .find_map(|m| m.prediction.as_ref())
        .map(|p| p.suggested_follow_ups.clone())
        .unwrap_or_default()
}

/// Interactive chat session with a persisted transcript
pub async fn chat(api_key: Option<String>, force_local: bool, force_global: bool) -> Result<()> {
    let output = Output::new();
    let session = Session::open(api_key, force_local, force_global)?;
    let store = JsonFileStore::new(session.config.get_history_path());
    let theme = ColorfulTheme::default();

    let mut transcript = store.load()?;
    if transcript.is_empty() {
        transcript.push(ChatMessage::greeting());
        store.save(&transcript)?;
    }

    output.status("Chatting", &format!("with {}", session.predictor.model()));
    output.note("/menu for quick options, /history, /clear, /quit to leave");
    eprintln!();
    output.transcript(&transcript, &session.display);

    loop {
        let line = Input::<String>::with_theme(&theme)
            .with_prompt("Message")
            .allow_empty(true)
            .interact_text()
            .context("Failed to read input")?;

        let query = match parse_input(&line, &latest_follow_ups(&transcript)) {
            ChatInput::Empty => continue,
            ChatInput::Quit => break,
            ChatInput::History => {
                output.transcript(&transcript, &session.display);
                continue;
            }
            ChatInput::Clear => {
                transcript = vec![ChatMessage::greeting()];
                store.save(&transcript)?;
                output.info("Conversation cleared.");
                output.transcript(&transcript, &session.display);
                continue;
            }
            ChatInput::Menu => match pick_menu_item(&theme)? {
                Some(query) => query,
                None => continue,
            },
            ChatInput::Query(query) => query,
        };

        let user_message = ChatMessage::user(query.clone());
        output.message(&user_message, &session.display);
        transcript.push(user_message);
        store.save(&transcript)?;

        // input is not read again until this request settles
        let reply = match request_prediction(&session, &output, &query).await {
            Ok(prediction) => ChatMessage::prediction(prediction),
            Err(e) => {
                tracing::warn!("Prediction failed for '{}': {}", query, e);
                output.error(&e.to_string());
                ChatMessage::apology()
            }
        };

        output.message(&reply, &session.display);
        transcript.push(reply);
        store.save(&transcript)?;
    }

    output.finish("chat session", AppConfig::get_scope_name(force_local, force_global));
    Ok(())
}

fn pick_menu_item(theme: &ColorfulTheme) -> Result<Option<String>> {
    let labels: Vec<String> = MENU_ITEMS
        .iter()
        .map(|(icon, label, _)| format!("{} {}", icon, label))
        .collect();

    let selection = Select::with_theme(theme)
        .with_prompt("Quick Menu")
        .items(&labels)
        .default(0)
        .interact_opt()
        .context("Failed to read menu selection")?;

    Ok(selection.map(|i| MENU_ITEMS[i].2.to_string()))
}

/// First Ctrl-C stops the retry loop before its next attempt; a second one
/// abandons the attempt in flight
async fn request_prediction(
    session: &Session,
    output: &Output,
    query: &str,
) -> Result<PredictionResult, PredictError> {
    output.status("Analyzing", query);

    let (cancel_tx, cancel_rx) = watch::channel(false);
    let request = session
        .predictor
        .get_prediction_with_cancel(query, Some(&cancel_rx));

    until_interrupted(request, ctrl_c, &cancel_tx, output).await
}

/// Drive `request`, reacting to up to two `interrupt`s
async fn until_interrupted<R, I, IFut>(
    request: R,
    mut interrupt: I,
    cancel_tx: &watch::Sender<bool>,
    output: &Output,
) -> Result<PredictionResult, PredictError>
where
    R: Future<Output = Result<PredictionResult, PredictError>>,
    I: FnMut() -> IFut,
    IFut: Future<Output = ()>,
{
    tokio::pin!(request);

    tokio::select! {
        result = &mut request => return result,
        _ = interrupt() => {
            let _ = cancel_tx.send(true);
            output.note("Stopping after the current attempt, Ctrl-C again to abandon it");
        }
    }

    tokio::select! {
        result = &mut request => result,
        _ = interrupt() => {
            output.note("Abandoned the current attempt");
            Err(PredictError::Cancelled)
        }
    }
}

/// Resolves on Ctrl-C; never resolves when the handler cannot be installed
async fn ctrl_c() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
}
