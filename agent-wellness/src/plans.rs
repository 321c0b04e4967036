//! Meal plan and breathing session catalogs.

/// Diet score assumed when the caller does not supply one.
pub const DEFAULT_DIET_SCORE: f64 = 0.5;

/// Stress level assumed when the caller does not supply one.
pub const DEFAULT_STRESS_LEVEL: i64 = 3;

/// Three-day meal plan for a diet score.
#[must_use]
pub fn meal_plan(diet_score: f64) -> &'static str {
    if diet_score < 0.4 {
        "Day 1: Smoothie bowl\nDay 2: Veggie stir-fry\nDay 3: Lentil soup"
    } else if diet_score < 0.7 {
        "Day 1: Grilled chicken salad\nDay 2: Quinoa bowl\nDay 3: Salmon & greens"
    } else {
        "Day 1: Balanced bento box\nDay 2: Turkey wrap\nDay 3: Buddha bowl"
    }
}

/// Breathing exercise for a self-reported stress level.
#[must_use]
pub const fn breathing_session(stress_level: i64) -> &'static str {
    if stress_level >= 4 {
        "Guided 5-min deep breathing with a soothing bell."
    } else {
        "Quick 2-min box breathing (4s inhale, 4s hold, 4s exhale)."
    }
}
