//! Typed call sites built on one [`CompletionClient`].
//!
//! Each operation pairs a system prompt with a fixed budget. The budgets
//! trade creativity against faithfulness:
//!
//! | Operation | max_tokens | temperature | timeout |
//! |-----------|-----------|-------------|---------|
//! | [`draft`] | 2000 | 0.7 | 120s |
//! | [`reformat`] | 2500 | 0.5 | 60s |
//! | [`correct`] | min(2 × chars, 4000) | 0.3 | 60s |
//! | [`suggest_titles`] | 200 | 0.8 | 30s |
//! | [`probe`] | 10 | 0.1 | 15s |

use crate::llm::{CompletionClient, CompletionOptions, LlmError};
use crate::prompt::{self, BlogType, Voice};
use std::time::Duration;
use tracing::info;

pub const DRAFT: CompletionOptions = CompletionOptions {
    max_tokens: 2000,
    temperature: 0.7,
    timeout: Duration::from_secs(120),
};

pub const REFORMAT: CompletionOptions = CompletionOptions {
    max_tokens: 2500,
    temperature: 0.5,
    timeout: Duration::from_secs(60),
};

pub const TITLES: CompletionOptions = CompletionOptions {
    max_tokens: 200,
    temperature: 0.8,
    timeout: Duration::from_secs(30),
};

pub const PROBE: CompletionOptions = CompletionOptions {
    max_tokens: 10,
    temperature: 0.1,
    timeout: Duration::from_secs(15),
};

const CORRECT_MAX_TOKENS: u32 = 4000;
const TITLE_COUNT: usize = 5;

/// Options for a correction pass over `text`.
///
/// The budget is twice the input length in characters, capped at 4000 and
/// never below 1.
pub fn correction_options(text: &str) -> CompletionOptions {
    let chars = u32::try_from(text.chars().count()).unwrap_or(u32::MAX);
    CompletionOptions {
        max_tokens: chars.saturating_mul(2).clamp(1, CORRECT_MAX_TOKENS),
        temperature: 0.3,
        timeout: Duration::from_secs(60),
    }
}

/// Write a new post body from a prepared generation prompt.
pub fn draft(client: &dyn CompletionClient, prompt: &str) -> Result<String, LlmError> {
    info!(prompt_chars = prompt.len(), "generating draft");
    client.complete(prompt::DRAFT_SYSTEM_PROMPT, prompt, &DRAFT)
}

/// Restructure existing content for a post type and voice.
pub fn reformat(
    client: &dyn CompletionClient,
    content: &str,
    blog_type: BlogType,
    voice: Voice,
) -> Result<String, LlmError> {
    info!(%blog_type, %voice, content_chars = content.len(), "reformatting content");
    let user = prompt::build_format_prompt(content, blog_type, voice);
    client.complete(prompt::FORMAT_SYSTEM_PROMPT, &user, &REFORMAT)
}

/// Fix spelling and grammar only.
pub fn correct(client: &dyn CompletionClient, text: &str) -> Result<String, LlmError> {
    let options = correction_options(text);
    info!(max_tokens = options.max_tokens, "correcting spelling and grammar");
    let user = prompt::build_correction_prompt(text);
    client.complete(prompt::CORRECT_SYSTEM_PROMPT, &user, &options)
}

/// Ask for up to five candidate titles for `topic`.
pub fn suggest_titles(client: &dyn CompletionClient, topic: &str) -> Result<Vec<String>, LlmError> {
    info!(topic, "suggesting titles");
    let reply = client.complete(
        prompt::TITLES_SYSTEM_PROMPT,
        &prompt::build_titles_prompt(topic),
        &TITLES,
    )?;
    Ok(parse_titles(&reply))
}

/// One title per non-blank line, first five only.
pub fn parse_titles(reply: &str) -> Vec<String> {
    reply
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .take(TITLE_COUNT)
        .map(String::from)
        .collect()
}

/// Cheapest possible round trip, used to verify the credential and endpoint.
pub fn probe(client: &dyn CompletionClient) -> Result<(), LlmError> {
    client.complete("", prompt::PROBE_PROMPT, &PROBE).map(|_| ())
}
