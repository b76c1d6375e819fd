//! Keyword families used by the classifier.
//!
//! Coaching families match by plain substring search on the lower-cased
//! message, so stems like `"motivat"` cover several word forms. Safety terms
//! respect word boundaries: `"numb"` must not fire on `"number"`.

use crate::engine::core::intent::Intent;

/// Pain, injury and medical red flags.
///
/// Matched on word boundaries (see [`matches_safety`]). A trailing `*` marks
/// a stem that only has to start a word.
pub const SAFETY: &[&str] = &[
    "pain",
    "pains",
    "painful",
    "hurt*",
    "injur*",
    "dizz*",
    "lightheaded",
    "light-headed",
    "blurred vision",
    "faint*",
    "chest pain",
    "can't breathe",
    "cannot breathe",
    "short of breath",
    "numb",
    "numbness",
    "swelling",
    "swollen",
    "sprain*",
    "bleeding",
    "heart racing",
    "palpitation*",
    "emergency",
    "pulled a muscle",
];

/// Exercise technique and training.
pub const EXERCISE: &[&str] = &[
    "exercise",
    "workout",
    "squat",
    "deadlift",
    "bench press",
    "push-up",
    "pushup",
    "pull-up",
    "pullup",
    "plank",
    "lunge",
    "cardio",
    "stretch",
    "sets",
    "reps",
    "muscle",
    "strength",
    "training",
    "lifting",
    "form",
];

/// Food, hydration and supplements.
pub const NUTRITION: &[&str] = &[
    "protein",
    "diet",
    "calorie",
    "nutrition",
    "meal",
    "food",
    "eating",
    "carb",
    "fat loss",
    "supplement",
    "vitamin",
    "creatine",
    "hydrat",
    "water intake",
    "macros",
];

/// Motivation and consistency.
pub const MOTIVATION: &[&str] = &[
    "motivat",
    "lazy",
    "give up",
    "giving up",
    "quit",
    "discipline",
    "consistent",
    "consistency",
    "no energy",
    "inspire",
    "encourage",
    "bored",
    "stuck",
];

/// Routines, schedules and goals.
pub const PLANNING: &[&str] = &[
    "plan",
    "schedule",
    "routine",
    "program",
    "split",
    "per week",
    "beginner",
    "get started",
    "goal",
    "progress",
];

/// Phrases that call for a longer, explanatory answer.
pub const COMPLEX_TRIGGERS: &[&str] = &[
    "explain how",
    "why does",
    "the mechanism",
    "research shows",
];

/// Coaching keyword families in classifier priority order. Safety is
/// checked first and separately.
pub const FAMILIES: [(Intent, &[&str]); 4] = [
    (Intent::Exercise, EXERCISE),
    (Intent::Nutrition, NUTRITION),
    (Intent::Motivation, MOTIVATION),
    (Intent::Planning, PLANNING),
];

/// Whether any keyword of the family occurs in `lowered`.
#[must_use]
pub fn matches_family(lowered: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|keyword| lowered.contains(keyword))
}

/// Whether any safety term occurs in `lowered` on word boundaries.
#[must_use]
pub fn matches_safety(lowered: &str) -> bool {
    SAFETY.iter().any(|term| contains_term(lowered, term))
}

fn contains_term(lowered: &str, term: &str) -> bool {
    let (needle, stem) = match term.strip_suffix('*') {
        Some(needle) => (needle, true),
        None => (term, false),
    };
    lowered.match_indices(needle).any(|(start, _)| {
        let end = start + needle.len();
        let starts_word = lowered[..start]
            .chars()
            .next_back()
            .is_none_or(|c| !c.is_alphanumeric());
        let ends_word = stem
            || lowered[end..]
                .chars()
                .next()
                .is_none_or(|c| !c.is_alphanumeric());
        starts_word && ends_word
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn safety_terms_need_word_boundaries() {
        assert!(!matches_safety("what number of reps should i do for squats?"));
        assert!(!matches_safety("is spain a good place for a training camp?"));
        assert!(!matches_safety("painting the garage counts as cardio"));
        assert!(matches_safety("my fingers go numb"));
        assert!(matches_safety("pain in my left knee"));
        assert!(matches_safety("the squat feels painful."));
    }

    #[test]
    fn safety_stems_cover_word_forms() {
        assert!(matches_safety("i got injured yesterday"));
        assert!(matches_safety("my ankle hurts"));
        assert!(matches_safety("feeling dizzy and faint"));
        assert!(matches_safety("i sprained my wrist"));
        assert!(!matches_safety("spinach and painted walls"));
    }

    #[test]
    fn coaching_families_use_substrings() {
        assert!(matches_family("what motivates you", MOTIVATION));
        assert!(matches_family("pushups every day", EXERCISE));
        assert!(!matches_family("hello there", NUTRITION));
    }
}
