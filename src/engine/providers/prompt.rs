//! Prompt construction for external providers.

use crate::engine::classify::MessageAnalysis;
use crate::engine::core::config::ProviderSettings;
use crate::engine::core::intent::{Intent, Urgency};
use crate::engine::providers::client::CompletionRequest;

/// Longest user message forwarded to a provider, in characters.
pub const MAX_MESSAGE_CHARS: usize = 4000;

const SYSTEM_PROMPT: &str = "You are a friendly, evidence-based fitness coach. \
Answer in at most three short paragraphs, use plain language, and give concrete numbers \
(sets, reps, grams, minutes) when they help. Never diagnose medical conditions; when a \
question touches pain, injury or illness, tell the user to stop and consult a professional.";

/// Build the completion request for a classified message.
#[must_use]
pub fn build_request(analysis: &MessageAnalysis, settings: &ProviderSettings) -> CompletionRequest {
    let mut system = String::from(SYSTEM_PROMPT);
    system.push_str("\n\nClassified intent: ");
    system.push_str(analysis.intent.as_str());
    if !analysis.topics.is_empty() {
        let topics: Vec<&str> = analysis.topics.iter().map(|t| t.as_str()).collect();
        system.push_str("\nRelated topics: ");
        system.push_str(&topics.join(", "));
    }
    if analysis.urgency == Urgency::High {
        system.push_str("\nUrgency: high. Put safety first.");
    }
    if let Some(focus) = intent_focus(analysis.intent) {
        system.push('\n');
        system.push_str(focus);
    }

    CompletionRequest {
        system,
        prompt: truncate_chars(analysis.original_message.trim(), MAX_MESSAGE_CHARS),
        max_tokens: settings.max_tokens,
        temperature: settings.temperature,
    }
}

const fn intent_focus(intent: Intent) -> Option<&'static str> {
    match intent {
        Intent::Exercise => Some("Focus on technique cues, common mistakes and a sensible starting volume."),
        Intent::Nutrition => Some("Focus on practical food choices and daily targets; avoid extreme diets."),
        Intent::Motivation => Some("Be encouraging and suggest one small action the user can take today."),
        Intent::Planning => Some("Lay out a simple weekly structure the user can follow."),
        Intent::Safety | Intent::General => None,
    }
}

fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => text[..cut].trim_end().to_string(),
        None => text.to_string(),
    }
}
