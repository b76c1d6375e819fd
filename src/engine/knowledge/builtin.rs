//! Built-in coaching knowledge loaded at startup.

use crate::engine::core::intent::Intent;

/// Static description of a built-in entry.
pub struct BuiltinEntry {
    /// Patterns matched against the lower-cased message.
    pub patterns: &'static [&'static str],
    /// Response text.
    pub response: &'static str,
    /// Category.
    pub category: Intent,
    /// Authored confidence.
    pub confidence: f64,
}

/// The built-in table, in store iteration order.
pub const BUILTIN_ENTRIES: &[BuiltinEntry] = &[
    // Safety
    BuiltinEntry {
        patterns: &["chest pain", "heart racing", "palpitation", "can't breathe", "short of breath"],
        response: "STOP exercising now. Chest pain, a racing heart or trouble breathing can signal a \
                   medical emergency. Sit down, stay calm and call your local emergency number if \
                   the symptoms are severe or do not ease within a few minutes. Get cleared by a \
                   doctor before you train again.",
        category: Intent::Safety,
        confidence: 0.95,
    },
    BuiltinEntry {
        patterns: &["dizzy", "faint", "lightheaded", "blurred vision"],
        response: "Stop the session and sit or lie down somewhere safe. Dizziness during exercise \
                   can come from dehydration, low blood sugar or overexertion, but it can also be \
                   a warning sign. Sip water, rest, and see a doctor if it keeps happening or comes \
                   with chest pain or confusion.",
        category: Intent::Safety,
        confidence: 0.9,
    },
    BuiltinEntry {
        patterns: &["knee pain", "back pain", "shoulder pain", "joint pain", "painful", "hurts"],
        response: "Pain is a signal to stop, not to push through. End the exercise that causes it, \
                   rest the area and avoid loading it until it settles. Sharp pain, swelling, \
                   numbness or pain that lasts more than a few days should be checked by a doctor \
                   or physiotherapist before you continue training.",
        category: Intent::Safety,
        confidence: 0.9,
    },
    BuiltinEntry {
        patterns: &["injury", "injured", "sprain", "swelling", "pulled a muscle"],
        response: "For a fresh injury: stop training, protect the area, apply ice wrapped in a \
                   cloth for 15-20 minutes, use light compression and keep it elevated. Do not \
                   train through it. If you cannot bear weight, see deformity, or the swelling is \
                   severe, get medical care right away.",
        category: Intent::Safety,
        confidence: 0.9,
    },
    // Exercise
    BuiltinEntry {
        patterns: &["squat", "proper squat", "squat form", "how to squat"],
        response: "Squat basics: feet shoulder-width apart, toes slightly out. Brace your core, \
                   push your hips back and bend your knees so they track over your toes. Keep \
                   your chest up and your weight over mid-foot, go down until your thighs are at \
                   least parallel if mobility allows, then drive up through the whole foot. Start \
                   with 3 sets of 8-12 bodyweight reps.",
        category: Intent::Exercise,
        confidence: 0.9,
    },
    BuiltinEntry {
        patterns: &["push-up", "pushup", "push up"],
        response: "Push-ups: hands slightly wider than shoulders, body in one straight line from \
                   head to heels. Lower your chest until it nearly touches the floor with elbows \
                   at about 45 degrees, then press back up. Too hard? Elevate your hands on a \
                   bench. Too easy? Slow the descent to three seconds.",
        category: Intent::Exercise,
        confidence: 0.9,
    },
    BuiltinEntry {
        patterns: &["deadlift", "deadlift form", "hinge"],
        response: "Deadlift cues: bar over mid-foot, hip-width stance, grip just outside the legs. \
                   Pull the slack out of the bar, keep a neutral spine, and push the floor away \
                   while the bar stays close to your legs. Lock out with your glutes, not by \
                   leaning back. Learn it light before adding load.",
        category: Intent::Exercise,
        confidence: 0.88,
    },
    BuiltinEntry {
        patterns: &["how many sets", "how many reps", "sets and reps", "rep range"],
        response: "A reliable starting point: 3-4 sets per exercise. Use 3-6 reps for strength, \
                   8-12 reps for muscle growth and 15+ reps for muscular endurance. Rest 2-3 \
                   minutes between heavy sets and 60-90 seconds for lighter work. Stop each set \
                   with one or two good reps left in the tank.",
        category: Intent::Exercise,
        confidence: 0.85,
    },
    BuiltinEntry {
        patterns: &["best exercise", "what exercises", "exercises for beginners", "compound exercises"],
        response: "The best exercises give you the most for your time: squats, hinges (deadlifts, \
                   hip thrusts), pushes (push-ups, bench press), pulls (rows, pull-ups) and loaded \
                   carries. Pick one from each pattern, do them 2-3 times a week, and add a little \
                   weight or a rep each session.",
        category: Intent::Exercise,
        confidence: 0.85,
    },
    BuiltinEntry {
        patterns: &["how often", "train per week", "rest days", "recovery"],
        response: "Train each major muscle group about twice a week. For most people that means 3-4 \
                   sessions a week with at least one rest day between hard sessions for the same \
                   muscles. Sleep 7-9 hours and keep easy movement, like walking, on rest days.",
        category: Intent::Exercise,
        confidence: 0.82,
    },
    BuiltinEntry {
        patterns: &["cardio", "running", "conditioning", "endurance"],
        response: "Aim for about 150 minutes of moderate cardio a week, or 75 minutes of hard \
                   cardio. Most of it should be at a pace where you can still talk. Add one short \
                   interval session a week once you have a base, and build volume by no more than \
                   10% per week.",
        category: Intent::Exercise,
        confidence: 0.82,
    },
    BuiltinEntry {
        patterns: &["stretch", "warm up", "warm-up", "mobility"],
        response: "Warm up with 5-10 minutes of light cardio followed by dynamic moves: leg swings, \
                   arm circles, hip openers and a few light sets of your first exercise. Save long \
                   static stretches for after the session or a separate mobility routine.",
        category: Intent::Exercise,
        confidence: 0.8,
    },
    // Nutrition
    BuiltinEntry {
        patterns: &["protein", "how much protein", "protein intake"],
        response: "For active people, 1.6-2.2 g of protein per kg of body weight per day is a solid \
                   target. Spread it over 3-5 meals with 20-40 g each. Good sources: eggs, dairy, \
                   fish, poultry, lean meat, tofu, tempeh, lentils and beans.",
        category: Intent::Nutrition,
        confidence: 0.88,
    },
    BuiltinEntry {
        patterns: &["before workout", "after workout", "pre-workout meal", "post-workout meal"],
        response: "Eat a balanced meal with carbs and protein 2-3 hours before training, or a small \
                   snack like a banana with yogurt 30-60 minutes before. After training, get \
                   20-40 g of protein and some carbs within a couple of hours.",
        category: Intent::Nutrition,
        confidence: 0.85,
    },
    BuiltinEntry {
        patterns: &["calorie", "lose weight", "fat loss", "weight loss", "diet"],
        response: "Fat loss comes from a sustained calorie deficit. Start around 300-500 kcal below \
                   maintenance, keep protein high, fill half your plate with vegetables and keep \
                   strength training so the weight you lose is mostly fat. Aim for 0.5-1% of body \
                   weight per week.",
        category: Intent::Nutrition,
        confidence: 0.85,
    },
    BuiltinEntry {
        patterns: &["water", "hydration", "hydrated", "water intake"],
        response: "A practical hydration target is about 30-35 ml of water per kg of body weight per \
                   day, plus 400-800 ml per hour of exercise. Pale yellow urine is a good sign. \
                   For sessions over an hour in the heat, add electrolytes.",
        category: Intent::Nutrition,
        confidence: 0.82,
    },
    // Motivation
    BuiltinEntry {
        patterns: &["motivation", "motivated", "lazy", "no energy", "don't feel like"],
        response: "Motivation follows action. Commit to just five minutes: put on your shoes and \
                   start the warm-up. Most days you will keep going. Schedule workouts like \
                   meetings, train with a friend when you can, and track every session so you can \
                   see your progress.",
        category: Intent::Motivation,
        confidence: 0.85,
    },
    BuiltinEntry {
        patterns: &["give up", "giving up", "quit", "consistent", "consistency", "stuck", "plateau"],
        response: "Progress is rarely a straight line. Look at the last month, not the last week. \
                   Keep the habit alive with a minimum version of your plan on hard days, change \
                   one variable (load, reps or rest) when you stall, and celebrate showing up.",
        category: Intent::Motivation,
        confidence: 0.82,
    },
    // Planning
    BuiltinEntry {
        patterns: &["beginner plan", "workout plan", "get started", "beginner", "routine"],
        response: "Beginner plan, three days a week (e.g. Mon/Wed/Fri), full body each day: squat \
                   3x10, push-ups 3x8-12, dumbbell row 3x10 per side, hip hinge 3x10, plank 3x30s. \
                   Add a little weight or a rep each week and take a lighter week every 6-8 weeks.",
        category: Intent::Planning,
        confidence: 0.85,
    },
    BuiltinEntry {
        patterns: &["split", "weekly schedule", "program", "schedule", "per week"],
        response: "Match your split to your schedule. Three days: full body each session. Four \
                   days: upper/lower twice. Five or more: push/pull/legs. Whatever you choose, hit \
                   each muscle group about twice a week and keep at least one full rest day.",
        category: Intent::Planning,
        confidence: 0.82,
    },
    BuiltinEntry {
        patterns: &["goal", "set goals", "track progress", "progress"],
        response: "Set one main goal for the next 8-12 weeks and make it measurable (for example, \
                   squat your body weight or walk 8,000 steps a day). Break it into weekly actions, \
                   log your training, and review every Sunday.",
        category: Intent::Planning,
        confidence: 0.8,
    },
    // General
    BuiltinEntry {
        patterns: &["hello", "hi coach", "what can you do", "help me"],
        response: "Hi! I'm your fitness coach. Ask me about exercise technique, sets and reps, \
                   nutrition, motivation or building a training plan. If something hurts, tell me \
                   and I'll help you stay safe.",
        category: Intent::General,
        confidence: 0.8,
    },
];
