//! Static responses used when nothing better is available.

use rand::Rng;
use rand::seq::SliceRandom;

use crate::engine::core::intent::{Intent, Urgency};
use crate::engine::core::response::{CoachResponse, ResponseSource};

/// Confidence attached to the capabilities message.
pub const LOCAL_FALLBACK_CONFIDENCE: f64 = 0.3;
/// Confidence attached to the error message.
pub const ERROR_FALLBACK_CONFIDENCE: f64 = 0.1;
/// Confidence attached to the built-in safety protocol.
pub const SAFETY_PROTOCOL_CONFIDENCE: f64 = 0.95;

/// Shown when no provider is reachable and local knowledge was not enough.
pub const LOCAL_FALLBACK: &str = "I don't have a confident answer for that one yet, but here is \
what I can help you with right now:\n\
- Exercise technique: squats, push-ups, deadlifts, planks and more\n\
- Sets, reps, rest and how often to train\n\
- Nutrition basics: protein, meals around workouts, hydration, fat loss\n\
- Motivation and staying consistent\n\
- Beginner plans and weekly training splits\n\
Try asking about one of these, or rephrase your question with more detail.";

/// Shown for any safety-related message that no knowledge entry covers.
pub const SAFETY_PROTOCOL: &str = "Your safety comes first. Stop exercising now and rest. \
If you have chest pain, trouble breathing, fainting, severe pain or sudden swelling, call \
your local emergency number or get medical help immediately. For pain or discomfort that \
persists, see a doctor or physiotherapist before you train again. I can help you plan a \
safe return once you have been cleared.";

/// Rotating lines appended to the error message.
pub const MOTIVATIONAL_QUOTES: &[&str] = &[
    "The only bad workout is the one that didn't happen.",
    "Small steps every day add up to big results.",
    "Strength doesn't come from what you can do. It comes from overcoming what you once couldn't.",
    "Discipline is choosing what you want most over what you want now.",
    "You don't have to be extreme, just consistent.",
    "Progress, not perfection.",
    "Your body can stand almost anything. It's your mind you have to convince.",
];

/// Capabilities message.
#[must_use]
pub fn local_fallback() -> CoachResponse {
    CoachResponse::new(
        LOCAL_FALLBACK,
        ResponseSource::LocalFallback,
        LOCAL_FALLBACK_CONFIDENCE,
    )
}

/// Built-in safety protocol.
#[must_use]
pub fn safety_protocol() -> CoachResponse {
    CoachResponse::new(
        SAFETY_PROTOCOL,
        ResponseSource::SafetyProtocol,
        SAFETY_PROTOCOL_CONFIDENCE,
    )
    .with_classification(Intent::Safety, Urgency::High)
}

/// Error message with a random motivational line.
#[must_use]
pub fn error_fallback() -> CoachResponse {
    error_fallback_with(&mut rand::thread_rng())
}

/// Error message with a motivational line drawn from `rng`.
pub fn error_fallback_with<R: Rng + ?Sized>(rng: &mut R) -> CoachResponse {
    let quote = MOTIVATIONAL_QUOTES
        .choose(rng)
        .copied()
        .unwrap_or("Keep moving forward.");
    let content = format!(
        "Sorry, something went wrong while I was working on your question. \
I'm still here and you can keep chatting with me, so try asking again in a moment.\n\n\
\u{1f4aa} {quote}"
    );
    CoachResponse::new(content, ResponseSource::Error, ERROR_FALLBACK_CONFIDENCE)
}
