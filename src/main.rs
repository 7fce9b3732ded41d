mod config;
mod prompt;
mod repl;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use pastebox_core::{
    ClipboardBridge, FileSelectionOutcome, SelectedFile, SharedView, SystemClipboard, ViewEvent,
};

use crate::config::{Settings, SettingsStore};
use crate::prompt::TerminalChooser;
use crate::repl::Repl;

#[derive(Parser)]
#[command(name = "pastebox", about = "Pastebox - paste text or an image and see it rendered back")]
struct Cli {
    /// Directory holding settings.json
    #[arg(long, global = true)]
    config_dir: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the interactive view (default)
    Run,
    /// Paste text from the clipboard and print it
    PasteText,
    /// Paste an image from the clipboard, asking for a file if there is none
    PasteImage {
        /// Save the pasted image bytes to this file
        #[arg(short, long)]
        out: Option<PathBuf>,

        /// Also print the image as a data: URL
        #[arg(long)]
        data_url: bool,
    },
    /// Show an image file and copy it to the clipboard as PNG
    Mirror {
        /// Image file to show
        path: PathBuf,
    },
    /// Show settings location and values
    Config {
        /// Write the current settings to disk
        #[arg(long)]
        init: bool,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let store = match &cli.config_dir {
        Some(dir) => SettingsStore::new(dir.clone())?,
        None => SettingsStore::default_location()?,
    };
    let settings = store.load()?;

    let level = config::parse_level(cli.log_level.as_deref().unwrap_or(&settings.log_level))?;
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    let input = prompt::stdin_lines();
    let view = SharedView::new();
    let chooser = TerminalChooser::new(input.clone(), settings.chooser_dir.clone());
    let bridge = ClipboardBridge::new(Arc::new(SystemClipboard), Arc::new(chooser), view.clone());
    let placeholders = settings.placeholders();

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => {
            Repl::new(bridge, placeholders, input).run().await?;
        }

        Commands::PasteText => {
            bridge.request_text_paste().await;
            println!("{}", view.render(&placeholders).await.text);
        }

        Commands::PasteImage { out, data_url } => {
            bridge.request_image_paste().await;
            bridge.settle().await;
            println!("{}", view.render(&placeholders).await.image);

            if let Some(image) = view.image().await {
                if let Some(out) = out {
                    tokio::fs::write(&out, image.bytes())
                        .await
                        .with_context(|| format!("failed to write {:?}", out))?;
                    println!("Saved to {}", out.display());
                }
                if data_url {
                    println!("{}", image.data_url());
                }
            }
            view.teardown().await;
        }

        Commands::Mirror { path } => {
            let mut events = view.subscribe();
            let file = SelectedFile::load(&path).await?;
            let outcome = bridge.handle_file_selection(file).await;
            bridge.settle().await;
            println!("{}", view.render(&placeholders).await.image);

            if let FileSelectionOutcome::Published { .. } = outcome {
                while let Ok(event) = events.try_recv() {
                    if let ViewEvent::MirrorWritten { mime, bytes } = event {
                        println!("Copied to clipboard as {} ({} bytes)", mime, bytes);
                    }
                }
            }
            view.teardown().await;
        }

        Commands::Config { init } => {
            if init {
                store.save(&settings)?;
            }
            print_settings(&store, &settings)?;
        }
    }

    Ok(())
}

fn print_settings(store: &SettingsStore, settings: &Settings) -> Result<()> {
    let path = store.path();
    let state = if path.exists() { "" } else { " (not saved, defaults)" };
    println!("Settings: {}{}", path.display(), state);
    println!("{}", serde_json::to_string_pretty(settings)?);
    Ok(())
}
