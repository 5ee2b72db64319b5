//! palma-chat: terminal front end for the Palma help assistant.
//! Resolves config, then sends a question from the command line or one per
//! stdin line, printing each answer and its sources to stdout.

use clap::Parser;
use palma_chat_lib::cli::Cli;
use palma_chat_lib::Conversation;
use palma_client::{config, logging, ChatClient, Config, FileSessionStore};
use std::io::{self, IsTerminal};
use std::process;
use tracing::{debug, warn};

fn main() {
    let cli = Cli::parse();
    let _ = logging::init(cli.verbose);

    // Configuration errors stop us before any request is made.
    let settings = match cli.settings() {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    };

    if cli.save_config {
        let path = match cli.config_path() {
            Ok(p) => p,
            Err(e) => {
                eprintln!("Error: {}", e);
                process::exit(1);
            }
        };
        if let Err(e) = config::save(&path, &Config::from(&settings)) {
            eprintln!("Error: failed to save config: {}", e);
            process::exit(1);
        }
        eprintln!("Saved config to {}", path.display());
        return;
    }

    if let Some(question) = cli.question.as_deref() {
        if question.trim().is_empty() {
            eprintln!("Error: empty question");
            process::exit(1);
        }
    }

    let client = ChatClient::from_settings(&settings);
    debug!(
        base_url = %settings.base_url,
        mock = client.is_mock(),
        session_file = %settings.session_file.display(),
        "starting chat"
    );

    let store = FileSessionStore::new(&settings.session_file);
    let mut conversation = Conversation::new(client, store);
    if cli.new_session {
        if let Err(e) = conversation.reset_session() {
            eprintln!("Error: failed to clear session: {}", e);
            process::exit(1);
        }
    }

    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap_or_else(|e| {
            eprintln!("Error: failed to create runtime: {}", e);
            process::exit(1);
        });

    let interactive = cli.question.is_none() && io::stdin().is_terminal();
    let result = rt.block_on(async {
        let stdin = tokio::io::BufReader::new(tokio::io::stdin());
        let stdout = io::stdout();
        let mut out = stdout.lock();
        palma_chat_lib::run_session(
            &mut conversation,
            cli.question.as_deref(),
            stdin,
            &mut out,
            interactive,
        )
        .await
    });

    if let Err(e) = result {
        // Broken pipe and friends; the transcript so far was already written.
        warn!(error = %e, "terminal I/O failed");
        process::exit(1);
    }
}
