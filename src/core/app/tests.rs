use std::fs;
use std::sync::Arc;
use std::time::Duration;

use tempfile::TempDir;

use super::*;
use crate::core::message::Sender;
use crate::core::providers::ProviderReply;
use crate::utils::test_utils::{create_test_app, RecordingTransport};

const HELLO_REPLY: &str = r#"{"choices":[{"message":{"content":"Hello there"}}]}"#;

fn spawn_params(command: Option<AppCommand>) -> RequestParams {
    match command {
        Some(AppCommand::SpawnRequest(params)) => params,
        _ => panic!("expected a SpawnRequest command"),
    }
}

fn type_to_end(app: &mut App) -> usize {
    for ticks in 1..10_000 {
        if let Some(AppCommand::StopTypewriter) = app.typewriter_tick() {
            return ticks;
        }
    }
    panic!("typewriter never finished");
}

#[test]
fn second_submission_is_ignored_while_request_in_flight() {
    let dir = TempDir::new().unwrap();
    let mut app = create_test_app(dir.path(), Arc::new(RecordingTransport::new()));

    app.input.insert_str("first");
    let params = spawn_params(app.submit_input());
    assert_eq!(params.message, "first");
    assert_eq!(app.phase(), ChatPhase::Sending);

    app.input.insert_str("second");
    assert!(app.submit_input().is_none());
    assert!(app.submit_message("third".to_string()).is_none());
    assert_eq!(app.transcript().len(), 1);
    // Still there for when the input comes back.
    assert_eq!(app.input_text(), "second");
}

#[test]
fn blank_input_is_not_submitted() {
    let dir = TempDir::new().unwrap();
    let mut app = create_test_app(dir.path(), Arc::new(RecordingTransport::new()));

    app.input.insert_str("   ");
    assert!(app.submit_input().is_none());
    assert_eq!(app.phase(), ChatPhase::Idle);
    assert!(app.transcript().is_empty());
}

#[tokio::test]
async fn typed_reply_walks_every_phase_and_persists() {
    let dir = TempDir::new().unwrap();
    let transport = Arc::new(RecordingTransport::new());
    transport.respond(200, HELLO_REPLY);
    let mut app = create_test_app(dir.path(), transport.clone());

    let params = spawn_params(app.submit_message("hi".to_string()));
    app.mark_request_in_flight(params.request_id);
    assert_eq!(app.phase(), ChatPhase::AwaitingResponse);

    let reply = params.client.get_response(&params.message).await;
    let command = app.receive_reply(params.request_id, params.provider, Ok(reply));
    match command {
        Some(AppCommand::StartTypewriter { interval }) => {
            assert_eq!(interval, Duration::from_millis(10));
        }
        _ => panic!("expected the typewriter to start"),
    }
    assert_eq!(app.phase(), ChatPhase::Presenting);

    let ticks = type_to_end(&mut app);
    assert!(ticks >= "Hello there".len());
    assert_eq!(app.phase(), ChatPhase::Idle);

    let last = app.transcript().last().unwrap();
    assert_eq!(last.sender, Sender::Assistant(ProviderId::DeepSeek));
    assert_eq!(last.text, "Hello there");

    let saved = fs::read_to_string(app.store().session_file()).unwrap();
    assert!(saved.contains("You:"));
    assert!(saved.contains("hi"));
    assert!(saved.contains("DeepSeek AI:"));
    assert!(saved.contains("Hello there"));
    assert_eq!(transport.requests().len(), 1);
}

#[tokio::test]
async fn unconfigured_provider_replies_with_error_and_no_network_call() {
    let dir = TempDir::new().unwrap();
    let transport = Arc::new(RecordingTransport::new());
    let mut app = create_test_app(dir.path(), transport.clone());
    app.select_provider(ProviderId::Claude);

    let params = spawn_params(app.submit_message("hi".to_string()));
    let reply = params.client.get_response(&params.message).await;
    assert!(app
        .receive_reply(params.request_id, params.provider, Ok(reply))
        .is_none());

    assert!(transport.requests().is_empty());
    assert_eq!(app.phase(), ChatPhase::Idle);
    let last = app.transcript().last().unwrap();
    assert_eq!(last.sender, Sender::Error);
    assert_eq!(last.text, "Please configure the Claude API key first");
}

#[test]
fn failed_task_is_shown_as_error_without_typing() {
    let dir = TempDir::new().unwrap();
    let mut app = create_test_app(dir.path(), Arc::new(RecordingTransport::new()));

    let params = spawn_params(app.submit_message("hi".to_string()));
    let command = app.receive_reply(
        params.request_id,
        params.provider,
        Err("provider task panicked".to_string()),
    );
    assert!(command.is_none());
    assert_eq!(app.phase(), ChatPhase::Idle);
    assert_eq!(
        app.transcript().last().unwrap().text,
        "Error: provider task panicked"
    );
    assert!(app.store().session_file().exists());

    // Input is accepted again.
    assert!(app.submit_message("again".to_string()).is_some());
}

#[test]
fn stale_reply_is_dropped() {
    let dir = TempDir::new().unwrap();
    let mut app = create_test_app(dir.path(), Arc::new(RecordingTransport::new()));

    let params = spawn_params(app.submit_message("hi".to_string()));
    let stale = params.request_id + 7;
    assert!(app
        .receive_reply(stale, params.provider, Ok(ProviderReply::answer("nope")))
        .is_none());
    assert_eq!(app.phase(), ChatPhase::Sending);
    assert_eq!(app.transcript().len(), 1);
}

#[test]
fn escape_reveals_the_rest_at_once() {
    let dir = TempDir::new().unwrap();
    let mut app = create_test_app(dir.path(), Arc::new(RecordingTransport::new()));

    let params = spawn_params(app.submit_message("hi".to_string()));
    app.receive_reply(
        params.request_id,
        params.provider,
        Ok(ProviderReply::answer("a fairly long answer")),
    );
    assert!(app.typewriter_tick().is_none());

    assert!(matches!(
        app.skip_typewriter(),
        Some(AppCommand::StopTypewriter)
    ));
    assert_eq!(app.phase(), ChatPhase::Idle);
    assert!(app
        .view
        .plain_lines()
        .iter()
        .any(|line| line.contains("a fairly long answer")));
    assert!(app.skip_typewriter().is_none());
}

#[test]
fn typing_disabled_presents_reply_immediately() {
    let dir = TempDir::new().unwrap();
    let mut app = create_test_app(dir.path(), Arc::new(RecordingTransport::new()));
    app.set_typing_effect(false);

    let params = spawn_params(app.submit_message("hi".to_string()));
    let command = app.receive_reply(
        params.request_id,
        params.provider,
        Ok(ProviderReply::answer("done")),
    );
    assert!(command.is_none());
    assert_eq!(app.phase(), ChatPhase::Idle);
    assert!(app.view.plain_lines().iter().any(|line| line.contains("done")));
}

#[test]
fn key_command_saves_and_posts_system_message() {
    let dir = TempDir::new().unwrap();
    let mut app = create_test_app(dir.path(), Arc::new(RecordingTransport::new()));

    app.process_command("/key claude sk-ant-123");
    assert_eq!(
        app.context().config().api_key(ProviderId::Claude),
        Some("sk-ant-123")
    );
    let last = app.transcript().last().unwrap();
    assert_eq!(last.sender, Sender::System);
    assert_eq!(last.text, "Settings updated");

    let saved = fs::read_to_string(dir.path().join("config.toml")).unwrap();
    assert!(saved.contains("sk-ant-123"));

    app.process_command("/key nobody 123");
    assert_eq!(app.status(), Some("Usage: /key <deepseek|openai|claude> <api-key>"));
}

#[test]
fn provider_command_and_cycle() {
    let dir = TempDir::new().unwrap();
    let mut app = create_test_app(dir.path(), Arc::new(RecordingTransport::new()));
    assert_eq!(app.provider(), ProviderId::DeepSeek);

    app.process_command("/provider openai");
    assert_eq!(app.provider(), ProviderId::OpenAi);

    app.cycle_provider();
    assert_eq!(app.provider(), ProviderId::Claude);

    app.process_command("/provider bard");
    assert_eq!(app.provider(), ProviderId::Claude);
    assert!(app.status().is_some());
}

#[test]
fn theme_toggle_is_refused_while_presenting() {
    let dir = TempDir::new().unwrap();
    let mut app = create_test_app(dir.path(), Arc::new(RecordingTransport::new()));

    let params = spawn_params(app.submit_message("hi".to_string()));
    app.receive_reply(
        params.request_id,
        params.provider,
        Ok(ProviderReply::answer("typing...")),
    );
    assert_eq!(app.phase(), ChatPhase::Presenting);

    app.toggle_theme();
    assert_eq!(app.theme().name, "dark");
    assert!(app.status().is_some());

    app.skip_typewriter();
    app.toggle_theme();
    assert_eq!(app.theme().name, "light");
    assert_eq!(app.context().config().theme_name(), "light");
}

#[test]
fn language_toggle_re_presents_transcript() {
    let dir = TempDir::new().unwrap();
    let mut app = create_test_app(dir.path(), Arc::new(RecordingTransport::new()));
    app.post_system("hello");
    assert!(app.view.plain_lines().iter().any(|l| l.contains("System:")));

    app.toggle_language();
    assert_eq!(app.language(), Language::Zh);
    let lines = app.view.plain_lines();
    assert!(lines.iter().any(|l| l.contains("系统:")));
    assert!(!lines.iter().any(|l| l.contains("System:")));
}

#[test]
fn history_overlay_lists_saved_sessions() {
    let dir = TempDir::new().unwrap();
    let mut app = create_test_app(dir.path(), Arc::new(RecordingTransport::new()));

    app.open_history();
    assert_eq!(
        app.overlay(),
        Some(&Overlay::History("No saved chats yet".to_string()))
    );

    app.post_system("saved line");
    app.persist_transcript();
    app.open_history();
    match app.overlay() {
        Some(Overlay::History(text)) => {
            assert!(text.contains("=== 20240101_120000.txt ==="));
            assert!(text.contains("saved line"));
        }
        other => panic!("unexpected overlay {other:?}"),
    }

    app.close_overlay();
    assert!(app.overlay().is_none());
}

#[test]
fn actions_route_to_controller() {
    let dir = TempDir::new().unwrap();
    let mut app = create_test_app(dir.path(), Arc::new(RecordingTransport::new()));

    let commands = apply_actions(
        &mut app,
        [
            AppAction::ShowHelp,
            AppAction::SubmitMessage {
                message: "hi".to_string(),
            },
            AppAction::ProcessCommand {
                input: "/quit".to_string(),
            },
        ],
    );
    assert_eq!(commands.len(), 1);
    assert!(matches!(commands[0], AppCommand::SpawnRequest(_)));
    assert_eq!(app.overlay(), Some(&Overlay::Help));
    assert!(app.exit_requested());
}

#[test]
fn unknown_command_sets_status() {
    let dir = TempDir::new().unwrap();
    let mut app = create_test_app(dir.path(), Arc::new(RecordingTransport::new()));
    app.process_command("/frobnicate");
    assert_eq!(app.status(), Some("Unknown command: /frobnicate"));
    assert!(app.transcript().is_empty());
}
