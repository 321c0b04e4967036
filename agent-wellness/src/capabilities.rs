//! Registration of the wellness capabilities.

use agent_primitives::{Capability, FieldType, InputShape, Namespace};
use agent_tools::{CapabilityRegistry, ToolError, ToolResult};
use serde_json::{Value, json};
use tracing::debug;

use crate::plans::{DEFAULT_DIET_SCORE, DEFAULT_STRESS_LEVEL, breathing_session, meal_plan};
use crate::scoring::{DEFAULT_PERSONALITY, Signals, WellnessReport};

/// Name of the scoring capability.
pub const PROCESS_DATASTREAM: &str = "process_datastream";

/// Name of the meal plan capability.
pub const MEAL_PLAN: &str = "suggest_meal_plan";

/// Name of the breathing session capability.
pub const BREATHING_SESSION: &str = "start_breathing_session";

/// Registers the three wellness capabilities under `namespace`.
///
/// # Errors
///
/// Returns [`ToolError::DuplicateCapability`] if any of them is already
/// registered.
pub fn register(registry: &CapabilityRegistry, namespace: &Namespace) -> ToolResult<()> {
    let scoring = Capability::builder(namespace.clone())
        .name(PROCESS_DATASTREAM)?
        .description("Score daily signals and recommend an intervention")?
        .inputs(
            InputShape::new()
                .field("sleepQuality", FieldType::Number)
                .field("dietScore", FieldType::Number)
                .field("activityScore", FieldType::Number)
                .field("calendarBalance", FieldType::Number)
                .field("personality", FieldType::String),
        )
        .build()?;
    registry.register_handler(scoring, process_datastream)?;

    let meals = Capability::builder(namespace.clone())
        .name(MEAL_PLAN)?
        .description("Suggest a three-day meal plan for a diet score")?
        .inputs(InputShape::new().field("dietScore", FieldType::Number))
        .build()?;
    registry.register_handler(meals, suggest_meal_plan)?;

    let breathing = Capability::builder(namespace.clone())
        .name(BREATHING_SESSION)?
        .description("Pick a breathing exercise for a stress level")?
        .inputs(InputShape::new().field("stressLevel", FieldType::Integer))
        .build()?;
    registry.register_handler(breathing, start_breathing_session)?;

    Ok(())
}

async fn process_datastream(args: Value) -> ToolResult<Value> {
    let report = wellness_report(&args)?;
    serde_json::to_value(report).map_err(|err| ToolError::handler(err.to_string()))
}

async fn suggest_meal_plan(args: Value) -> ToolResult<Value> {
    let diet_score = number(&args, "dietScore", DEFAULT_DIET_SCORE)?;
    Ok(json!({ "mealPlan": meal_plan(diet_score) }))
}

async fn start_breathing_session(args: Value) -> ToolResult<Value> {
    let stress_level = integer(&args, "stressLevel", DEFAULT_STRESS_LEVEL)?;
    Ok(json!({ "breathingSession": breathing_session(stress_level) }))
}

/// Builds a [`WellnessReport`] from a raw argument bag.
///
/// Missing numeric fields count as 0; a missing personality falls back to
/// [`DEFAULT_PERSONALITY`].
///
/// # Errors
///
/// Returns [`ToolError::InvalidArguments`] when a field has the wrong type.
pub fn wellness_report(args: &Value) -> ToolResult<WellnessReport> {
    let signals = Signals {
        sleep_quality: number(args, "sleepQuality", 0.0)?,
        diet_score: number(args, "dietScore", 0.0)?,
        activity_score: number(args, "activityScore", 0.0)?,
        calendar_balance: number(args, "calendarBalance", 0.0)?,
    };
    let personality = match args.get("personality") {
        None | Some(Value::Null) => DEFAULT_PERSONALITY,
        Some(Value::String(text)) => text.as_str(),
        Some(_) => return Err(ToolError::invalid_arguments("`personality` must be a string")),
    };

    let report = WellnessReport::assess(&signals, personality);
    debug!(score = report.wellness_score, category = report.category.code(), "wellness assessed");
    Ok(report)
}

fn number(args: &Value, key: &str, default: f64) -> ToolResult<f64> {
    match args.get(key) {
        None | Some(Value::Null) => Ok(default),
        Some(value) => value
            .as_f64()
            .ok_or_else(|| ToolError::invalid_arguments(format!("`{key}` must be a number"))),
    }
}

fn integer(args: &Value, key: &str, default: i64) -> ToolResult<i64> {
    match args.get(key) {
        None | Some(Value::Null) => Ok(default),
        Some(value) => value
            .as_i64()
            .ok_or_else(|| ToolError::invalid_arguments(format!("`{key}` must be an integer"))),
    }
}
