use anyhow::Result;
use tokio::sync::broadcast::error::RecvError;
use tracing::debug;

use pastebox_core::{ClipboardBridge, PasteDisposition, PasteEvent, Placeholders};

use crate::prompt::{next_line, InputLines};

const HELP: &str = "\
Commands:
  type <text>        replace the text
  clear              clear the text
  paste-text, pt     paste text from the clipboard
  paste-image, pi    paste an image from the clipboard (or choose a file)
  paste, v           system paste (images are shown, text is typed)
  show               show the current view
  help               show this help
  quit               exit";

#[derive(Debug, Clone, PartialEq, Eq)]
enum Command {
    Type(String),
    Clear,
    PasteText,
    PasteImage,
    SystemPaste,
    Show,
    Help,
    Quit,
    Empty,
    Unknown(String),
}

impl Command {
    fn parse(line: &str) -> Self {
        let line = line.trim_end_matches(['\r', '\n']);
        let (word, rest) = match line.trim_start().split_once(' ') {
            Some((word, rest)) => (word, rest),
            None => (line.trim(), ""),
        };
        match word {
            "" => Self::Empty,
            "type" | "t" => Self::Type(rest.to_string()),
            "clear" => Self::Clear,
            "paste-text" | "pt" => Self::PasteText,
            "paste-image" | "pi" => Self::PasteImage,
            "paste" | "v" => Self::SystemPaste,
            "show" => Self::Show,
            "help" | "?" => Self::Help,
            "quit" | "exit" | "q" => Self::Quit,
            other => Self::Unknown(other.to_string()),
        }
    }
}

/// The interactive widget: commands in, rendered view out.
pub struct Repl {
    bridge: ClipboardBridge,
    placeholders: Placeholders,
    input: InputLines,
}

impl Repl {
    pub fn new(bridge: ClipboardBridge, placeholders: Placeholders, input: InputLines) -> Self {
        Self {
            bridge,
            placeholders,
            input,
        }
    }

    pub async fn run(self) -> Result<()> {
        let mut events = self.bridge.view().subscribe();

        println!("{}", HELP);
        self.show().await;

        loop {
            tokio::select! {
                line = next_line(&self.input) => {
                    let Some(line) = line? else { break };
                    match Command::parse(&line) {
                        Command::Quit => break,
                        command => self.execute(command).await,
                    }
                }
                event = events.recv() => match event {
                    Ok(event) if event.needs_render() => self.show().await,
                    Ok(event) => debug!("view event: {:?}", event),
                    Err(RecvError::Lagged(_)) => self.show().await,
                    Err(RecvError::Closed) => break,
                },
                _ = tokio::signal::ctrl_c() => break,
            }
        }

        self.shutdown().await;
        Ok(())
    }

    async fn execute(&self, command: Command) {
        let view = self.bridge.view();
        match command {
            Command::Type(text) => view.set_text(text).await,
            Command::Clear => view.clear_text().await,
            Command::PasteText => {
                self.bridge.request_text_paste().await;
            }
            Command::PasteImage => {
                self.bridge.request_image_paste().await;
            }
            Command::SystemPaste => self.system_paste().await,
            Command::Show => self.show().await,
            Command::Help => println!("{}", HELP),
            Command::Empty | Command::Quit => {}
            Command::Unknown(word) => println!("unknown command {:?}, try `help`", word),
        }
    }

    /// A paste keystroke: the clipboard contents arrive as an event, and
    /// whatever the bridge leaves alone gets the default treatment of a
    /// text field, which is to insert the text.
    async fn system_paste(&self) {
        let snapshot = match self.bridge.clipboard().read().await {
            Ok(snapshot) => snapshot,
            Err(e) => {
                debug!("paste event carries no items: {}", e);
                Default::default()
            }
        };
        let event = PasteEvent::from_snapshot(snapshot);

        if self.bridge.on_system_paste(&event).await == PasteDisposition::Default {
            if let Some(text) = event.text() {
                let view = self.bridge.view();
                let current = view.text().await;
                view.set_text(current + &text).await;
            }
        }
    }

    async fn show(&self) {
        let rendered = self.bridge.view().render(&self.placeholders).await;
        println!("----------------------------------------");
        println!("{}", rendered);
        println!("----------------------------------------");
    }

    async fn shutdown(&self) {
        self.bridge.settle().await;
        self.bridge.view().teardown().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_type_keeps_text_verbatim() {
        assert_eq!(
            Command::parse("type  hello  world "),
            Command::Type(" hello  world ".to_string())
        );
        assert_eq!(Command::parse("t x"), Command::Type("x".to_string()));
        assert_eq!(Command::parse("type"), Command::Type(String::new()));
    }

    #[test]
    fn test_parse_commands() {
        assert_eq!(Command::parse("pt"), Command::PasteText);
        assert_eq!(Command::parse("paste-image\r\n"), Command::PasteImage);
        assert_eq!(Command::parse("  v"), Command::SystemPaste);
        assert_eq!(Command::parse("clear"), Command::Clear);
        assert_eq!(Command::parse("q"), Command::Quit);
        assert_eq!(Command::parse("   "), Command::Empty);
        assert_eq!(
            Command::parse("launch rockets"),
            Command::Unknown("launch".to_string())
        );
    }
}
