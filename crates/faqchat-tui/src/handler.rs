use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use faqchat_core::SubmitOutcome;

use crate::app::App;
use crate::tui::AppEvent;

/// Convert a character index to a byte index for UTF-8 safe string operations
fn char_to_byte_index(s: &str, char_idx: usize) -> usize {
    s.char_indices()
        .nth(char_idx)
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}

pub async fn handle_event(app: &mut App, event: AppEvent) -> Result<()> {
    match event {
        AppEvent::Key(key) => handle_key(app, key),
        AppEvent::Resize(_, _) => {}
        AppEvent::Tick => {
            app.tick_animation();
            poll_pending_reply(app).await?;
        }
    }
    Ok(())
}

fn handle_key(app: &mut App, key: KeyEvent) {
    // Global keys
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.should_quit = true;
        return;
    }

    match key.code {
        KeyCode::Esc => {
            app.should_quit = true;
        }

        KeyCode::Enter => submit(app),

        // Chat scrolling
        KeyCode::Up => app.scroll_up(),
        KeyCode::Down => app.scroll_down(),
        KeyCode::PageUp => app.scroll_half_page_up(),
        KeyCode::PageDown => app.scroll_half_page_down(),

        // Input editing (UTF-8 safe, cursor is a char index)
        KeyCode::Backspace => {
            if app.cursor > 0 {
                app.cursor -= 1;
                let byte_pos = char_to_byte_index(&app.session.input, app.cursor);
                app.session.input.remove(byte_pos);
            }
        }
        KeyCode::Delete => {
            let char_count = app.session.input.chars().count();
            if app.cursor < char_count {
                let byte_pos = char_to_byte_index(&app.session.input, app.cursor);
                app.session.input.remove(byte_pos);
            }
        }
        KeyCode::Left => {
            app.cursor = app.cursor.saturating_sub(1);
        }
        KeyCode::Right => {
            let char_count = app.session.input.chars().count();
            app.cursor = (app.cursor + 1).min(char_count);
        }
        KeyCode::Home => {
            app.cursor = 0;
        }
        KeyCode::End => {
            app.cursor = app.session.input.chars().count();
        }
        KeyCode::Char(c) => {
            let byte_pos = char_to_byte_index(&app.session.input, app.cursor);
            app.session.input.insert(byte_pos, c);
            app.cursor += 1;
        }

        _ => {}
    }
}

/// Start a submission cycle. The session itself rejects empty input and
/// overlapping submissions, so a rejected Enter leaves the transcript alone.
fn submit(app: &mut App) {
    // The keypress is the submission trigger
    match app.session.begin_submit(Some(1)) {
        SubmitOutcome::Ignored => {
            // Cleared input leaves the cursor at 0; a kept in-flight draft
            // keeps its cursor
            app.cursor = app.cursor.min(app.session.input.chars().count());
        }
        SubmitOutcome::Submitted(turn) => {
            app.cursor = 0;
            app.scroll_chat_to_bottom();

            // Spawn background task for the single backend call
            let backend = app.backend.clone();
            app.task = Some(tokio::spawn(async move { backend.reply(&turn).await }));
        }
    }
}

/// Fold a finished backend call back into the session and persist the
/// transcript. Called from the tick so the UI keeps animating while waiting.
async fn poll_pending_reply(app: &mut App) -> Result<()> {
    let finished = app
        .task
        .as_ref()
        .map(|task| task.is_finished())
        .unwrap_or(false);
    if !finished {
        return Ok(());
    }

    if let Some(task) = app.task.take() {
        match task.await {
            Ok(result) => app.session.finish_submit(result),
            // A panicked task still closes the turn so the session stays usable
            Err(err) => app.session.finish_submit(Ok(format!("Error: {err}"))),
        }
        app.store.save(&app.session.transcript)?;
        app.scroll_chat_to_bottom();
    }

    Ok(())
}
