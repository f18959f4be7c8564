#![deny(warnings)]

//! Terminal transport: one conversation with the tutor bot over stdin/stdout.
//!
//! Each input line is one reply. A line reading `<non-text>` stands in for a
//! sticker, photo or other event that carries no text. Charts are printed as
//! JSON for an external renderer.

use anyhow::{Context, Result};
use bot_core::ConversationId;
use bot_flow::{Bot, BotConfig, Outbound, Reply, ReplyEvent};
use std::io::{self, BufRead, Write};
use tracing::info;
use tracing_subscriber::EnvFilter;

const NON_TEXT_MARKER: &str = "<non-text>";

fn parse_args() -> (Option<String>, Option<i64>) {
    let mut config: Option<String> = None;
    let mut chat_id: Option<i64> = None;
    let mut it = std::env::args().skip(1);
    while let Some(arg) = it.next() {
        match arg.as_str() {
            "--config" => config = it.next(),
            "--chat-id" => chat_id = it.next().and_then(|s| s.parse().ok()),
            _ => {}
        }
    }
    (config, chat_id)
}

fn event_for(conversation: ConversationId, line: &str) -> ReplyEvent {
    if line.trim() == NON_TEXT_MARKER {
        ReplyEvent::non_text(conversation)
    } else {
        ReplyEvent::text(conversation, line)
    }
}

fn print_outbound(out: &mut impl Write, outbound: &[Outbound]) -> Result<()> {
    for o in outbound {
        match &o.reply {
            Reply::Prompt {
                text,
                quick_replies,
            } => {
                writeln!(out, "bot> {text}")?;
                if !quick_replies.is_empty() {
                    writeln!(out, "     [{}]", quick_replies.join("] ["))?;
                }
            }
            Reply::Result { text } => writeln!(out, "bot> {text}")?,
            Reply::Chart { chart } => {
                writeln!(out, "bot> chart:")?;
                writeln!(out, "{}", serde_json::to_string_pretty(chart)?)?;
            }
        }
    }
    out.flush()?;
    Ok(())
}

fn main() -> Result<()> {
    // Logging goes to stderr; stdout carries the conversation.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    let (config_path, chat_id) = parse_args();
    let config = match &config_path {
        Some(path) => {
            BotConfig::load(path).with_context(|| format!("loading config from {path}"))?
        }
        None => BotConfig::default(),
    };
    let conversation = ConversationId(chat_id.unwrap_or(1));
    info!(
        ?config_path,
        %conversation,
        max_cost_entries = config.max_cost_entries,
        "starting CLI"
    );

    let bot = Bot::new(config);
    let stdout = io::stdout();
    let mut out = stdout.lock();
    print_outbound(&mut out, &bot.handle(&ReplyEvent::text(conversation, "/start")))?;
    for line in io::stdin().lock().lines() {
        let line = line?;
        print_outbound(&mut out, &bot.handle(&event_for(conversation, &line)))?;
    }
    info!("input closed");
    Ok(())
}
