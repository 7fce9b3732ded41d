use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tokio::sync::Mutex;

use pastebox_core::{FileChooserPort, SelectedFile};

/// Terminal input shared by the command loop and the file chooser.
pub type InputLines = Arc<Mutex<Lines<BufReader<Stdin>>>>;

pub fn stdin_lines() -> InputLines {
    Arc::new(Mutex::new(BufReader::new(tokio::io::stdin()).lines()))
}

/// Read one line; `None` at end of input.
pub async fn next_line(input: &InputLines) -> Result<Option<String>> {
    input
        .lock()
        .await
        .next_line()
        .await
        .context("failed to read input")
}

/// File chooser that asks for a path on the terminal.
pub struct TerminalChooser {
    input: InputLines,
    base_dir: Option<PathBuf>,
}

impl TerminalChooser {
    pub fn new(input: InputLines, base_dir: Option<PathBuf>) -> Self {
        Self { input, base_dir }
    }

    fn resolve(&self, answer: &str) -> PathBuf {
        let path = PathBuf::from(answer);
        match &self.base_dir {
            Some(base) if path.is_relative() => base.join(path),
            _ => path,
        }
    }
}

#[async_trait]
impl FileChooserPort for TerminalChooser {
    async fn choose_image(&self) -> Result<Option<SelectedFile>> {
        print!("No clipboard image. Image file to show (blank to cancel): ");
        std::io::stdout().flush()?;

        let Some(answer) = next_line(&self.input).await? else {
            return Ok(None);
        };
        let answer = answer.trim();
        if answer.is_empty() {
            return Ok(None);
        }

        let file = SelectedFile::load(&self.resolve(answer)).await?;
        Ok(Some(file))
    }
}
