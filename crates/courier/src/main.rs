// SPDX-FileCopyrightText: 2026 Courier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Courier - outbound message delivery with manual retry.
//!
//! This is the binary entry point: the HTTP gateway plus operator commands.

mod commands;
mod serve;
mod shutdown;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Courier - outbound message delivery with manual retry.
#[derive(Parser, Debug)]
#[command(name = "courier", version, about, long_about = None)]
struct Cli {
    /// Load configuration from this file instead of the XDG hierarchy.
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the HTTP gateway.
    Serve,
    /// Retry delivery of one message.
    Retry {
        /// Id of the message to retry.
        message_id: String,
    },
    /// Inspect or enqueue messages.
    #[command(subcommand)]
    Messages(MessagesCommand),
    /// Manage gateway API keys.
    #[command(subcommand)]
    Keys(KeysCommand),
    /// Validate configuration.
    #[command(subcommand)]
    Config(ConfigCommand),
}

#[derive(Subcommand, Debug)]
enum MessagesCommand {
    /// Enqueue a pending message.
    Add {
        /// Provider code, e.g. `whatsapp_business`.
        #[arg(long)]
        provider: String,
        #[arg(long)]
        recipient: String,
        #[arg(long)]
        text: String,
        /// Message id; generated when omitted.
        #[arg(long)]
        id: Option<String>,
        #[arg(long, default_value_t = 3)]
        max_attempts: u32,
    },
    /// List recent messages, newest first.
    List {
        #[arg(long, default_value_t = 50)]
        limit: u32,
    },
    /// Show one message with its attempt history.
    Show { message_id: String },
}

#[derive(Subcommand, Debug)]
enum KeysCommand {
    /// Create a new active API key.
    Create { name: String },
    /// List API keys.
    List,
    /// Deactivate an API key.
    Revoke { api_key: String },
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Load and validate the configuration, then print it.
    Check,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let loaded = match &cli.config {
        Some(path) => courier_config::load_and_validate_path(path),
        None => courier_config::load_and_validate(),
    };
    let config = match loaded {
        Ok(config) => config,
        Err(errors) => {
            courier_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    serve::init_tracing(&config.service.log_level);

    let result = match cli.command {
        Some(Commands::Serve) => serve::run_serve(config).await,
        Some(Commands::Retry { message_id }) => commands::retry(&config, &message_id).await,
        Some(Commands::Messages(MessagesCommand::Add {
            provider,
            recipient,
            text,
            id,
            max_attempts,
        })) => {
            commands::add_message(&config, id, provider, recipient, text, max_attempts).await
        }
        Some(Commands::Messages(MessagesCommand::List { limit })) => {
            commands::list_messages(&config, limit).await
        }
        Some(Commands::Messages(MessagesCommand::Show { message_id })) => {
            commands::show_message(&config, &message_id).await
        }
        Some(Commands::Keys(KeysCommand::Create { name })) => {
            commands::create_key(&config, &name).await
        }
        Some(Commands::Keys(KeysCommand::List)) => commands::list_keys(&config).await,
        Some(Commands::Keys(KeysCommand::Revoke { api_key })) => {
            commands::revoke_key(&config, &api_key).await
        }
        Some(Commands::Config(ConfigCommand::Check)) => commands::config_check(&config),
        None => {
            println!("courier: use --help for available commands");
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
