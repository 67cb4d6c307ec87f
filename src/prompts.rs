//! System prompt for the nutrition agent
//!
//! The call sequence described here is instructional text for the model;
//! nothing in the agent enforces it.

/// Builds the nutrition-assistant system prompt
///
/// # Examples
///
/// ```
/// use nutrisage::prompts::build_system_prompt;
///
/// let prompt = build_system_prompt();
/// assert!(prompt.contains("detect_meal_type"));
/// ```
pub fn build_system_prompt() -> String {
    "You are a nutrition assistant. Follow these steps:\n\n\
     1. FIRST use detect_meal_type to check the meal\n\
     2. If the meal is unknown, ask the user: \"What meal was this? (breakfast/lunch/dinner/snack)\"\n\
     3. If the meal is known, then:\n\
        - get_nutrition_data for the food\n\
        - format_nutrition_facts to show details\n\
        - save_meal_data to store it\n\
        - generate_health_advice for tips\n\n\
     Always show the nutrition facts with calories, protein, carbs, fat, and fiber!"
        .to_string()
}
