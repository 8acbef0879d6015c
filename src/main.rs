use std::io::Write;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::watch;
use tracing::info;

use travel_chat::models::MessageRole;
use travel_chat::{
    ClientConfig, ConversationOptions, ConversationService, ConversationState, HttpBackend, Phase,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present (development convenience)
    dotenvy::dotenv().ok();

    // Logs go to stderr so they don't interleave with the transcript
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "travel_chat=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = ClientConfig::from_env();
    info!("Using travel API at {}", config.base_url());

    let backend = HttpBackend::new(&config)?;
    let mut service = ConversationService::new(backend, ConversationOptions::from(&config));
    let printer = tokio::spawn(print_transcript(service.subscribe()));

    service.start().await;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while service.state().accepts_input() {
        let Some(line) = lines.next_line().await? else {
            break;
        };
        service.submit(&line).await;
    }

    service.shutdown();
    drop(service);
    printer.await?;
    Ok(())
}

/// Prints transcript deltas as snapshots arrive, until the service goes away.
async fn print_transcript(mut updates: watch::Receiver<ConversationState>) {
    let mut printer = TranscriptPrinter::default();
    loop {
        let state = updates.borrow_and_update().clone();
        printer.render(&state);
        if updates.changed().await.is_err() {
            let state = updates.borrow().clone();
            printer.render(&state);
            break;
        }
    }
}

#[derive(Default)]
struct TranscriptPrinter {
    /// Bytes of raw content already printed, per transcript entry.
    printed: Vec<usize>,
    prompted_at: Option<usize>,
    last_error: Option<String>,
}

impl TranscriptPrinter {
    fn render(&mut self, state: &ConversationState) {
        let mut out = std::io::stdout().lock();
        let last = state.transcript.len().saturating_sub(1);

        for (index, message) in state.transcript.iter().enumerate() {
            if index >= self.printed.len() {
                // The user's own input is already on screen.
                if message.role == MessageRole::User {
                    self.printed.push(message.content.len());
                    continue;
                }
                self.printed.push(0);
                let _ = writeln!(out);
            }

            let growing = state.is_loading && index == last;
            let (text, done) = printable_delta(&message.content, self.printed[index], growing);
            if !text.is_empty() {
                let _ = write!(out, "{text}");
            }
            self.printed[index] = done;
        }

        let error = state.last_error.as_ref().map(|e| e.to_string());
        if error != self.last_error {
            if let Some(message) = &error {
                let _ = writeln!(out);
                eprintln!("Something went wrong: {message}");
                if state.phase == Phase::Errored {
                    eprintln!("Restart travel-chat to begin a new conversation.");
                }
            }
            self.last_error = error;
        }

        if state.accepts_input() && self.prompted_at != Some(state.transcript.len()) {
            let _ = write!(out, "\n> ");
            self.prompted_at = Some(state.transcript.len());
        }
        let _ = out.flush();
    }
}

/// Unescaped text of `content[from..]` and the offset printed up to. While the
/// message is still `growing`, a trailing backslash is held back because the
/// next chunk may turn it into a `\n` escape.
fn printable_delta(content: &str, from: usize, growing: bool) -> (String, usize) {
    let mut end = content.len();
    if growing && content.ends_with('\\') {
        end -= 1;
    }
    match content.get(from..end) {
        Some(delta) if !delta.is_empty() => (delta.replace("\\n", "\n"), end),
        _ => (String::new(), from),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escape_split_across_chunks_prints_a_newline() {
        let first = r"你好\";
        let (text, done) = printable_delta(first, 0, true);
        assert_eq!(text, "你好");
        assert_eq!(done, "你好".len());

        let whole = format!("{first}{}", r"n請問要去哪裡？");
        let (text, done) = printable_delta(&whole, done, true);
        assert_eq!(text, "\n請問要去哪裡？");
        assert_eq!(done, whole.len());
    }

    #[test]
    fn trailing_backslash_prints_once_the_message_is_finished() {
        let content = r"C:\";
        let (text, done) = printable_delta(content, 0, true);
        assert_eq!((text.as_str(), done), ("C:", 2));
        let (text, done) = printable_delta(content, done, false);
        assert_eq!((text.as_str(), done), ("\\", 3));
        assert_eq!(printable_delta(content, done, false), (String::new(), 3));
    }
}
