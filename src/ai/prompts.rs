//! Planner and Mapper prompt construction
//!
//! Prompts are rendered from structured inputs only; nothing in here inspects
//! control flow elsewhere. The Planner prompt lists the short-listed modules
//! and demands a strict-JSON plan; the Mapper prompt embeds the fixed item
//! schema of the target layout.

use crate::llm::ChatMessage;
use crate::model::{Layout, ModuleSummary};

/// Item schema for `horizontal-scrollable-list`.
const SCROLLABLE_LIST_SCHEMA: &str = r#"Array of items:
{
  "id": "string",
  "hero": { "type": "icon" | "image", "value": "string" },
  "title": "string",
  "subtitle": "string (optional)",
  "details": ["string"] (optional),
  "highlight": { "value": "string", "color": "primary" | "danger" | "success" } (optional),
  "actions": [{ "label": "string", "type": "api", "id": "string" }]
}"#;

/// Item schema for `info-display`.
const INFO_DISPLAY_SCHEMA: &str = r#"Array of items:
{
  "title": "string",
  "summary": "string",
  "metadata": [{ "label": "string", "value": "string" }],
  "footer": "string (optional)",
  "link": "string (optional)"
}"#;

/// Item schema for `interactive-action`.
const INTERACTIVE_ACTION_SCHEMA: &str = r#"Array of items:
{
  "icon": "string (emoji)",
  "label": "string",
  "status": "idle" | "running" | "success" | "error",
  "description": "string",
  "primaryAction": { "label": "string", "type": "api", "id": "string" }
}"#;

/// Item schema for `map-view-horizontal`.
const MAP_VIEW_SCHEMA: &str = r#"Array of items:
{
  "location": { "lat": number, "lng": number },
  "title": "string",
  "address": "string",
  "distance": "string",
  "tags": ["string"]
}"#;

/// Persona for the direct knowledge-lookup path (no template data behind it).
pub const GENERAL_ASSISTANT_PROMPT: &str = r#"You are a helpful general-knowledge assistant.
Answer the user's question directly and concisely in plain text.
Prefer concrete facts over hedging. Do not mention that you are an AI model."#;

pub fn layout_schema(layout: Layout) -> &'static str {
    match layout {
        Layout::ScrollableList => SCROLLABLE_LIST_SCHEMA,
        Layout::InfoDisplay => INFO_DISPLAY_SCHEMA,
        Layout::InteractiveAction => INTERACTIVE_ACTION_SCHEMA,
        Layout::MapView => MAP_VIEW_SCHEMA,
    }
}

fn planner_system_prompt(modules: &[ModuleSummary]) -> String {
    let listing = modules
        .iter()
        .map(|m| {
            let mut entry = format!(
                "- {}: {}\n  keywords: {}\n  layout: {}",
                m.id,
                m.description,
                m.keywords.join(", "),
                m.recommended_layout.as_str()
            );
            if let Some(apis) = &m.apis {
                let mut ops: Vec<String> = apis
                    .values()
                    .map(|a| {
                        let mut params: Vec<&str> =
                            a.parameters.keys().map(String::as_str).collect();
                        params.sort_unstable();
                        format!("{} (params: {})", a.id, params.join(", "))
                    })
                    .collect();
                ops.sort_unstable();
                entry.push_str(&format!("\n  operations: {}", ops.join("; ")));
            }
            entry
        })
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        r#"You are the Planner for CardFlow.
Analyze the user's request and produce an execution plan from the available modules.

# Available Modules
{listing}

# Output Format (JSON only)
{{
  "modules": [
    {{
      "targetModuleId": "string",
      "targetLayout": "string",
      "priority": 1,
      "apiCall": {{ "id": "string", "params": {{ "key": "value" }} }},
      "reason": "string"
    }}
  ]
}}

# Rules
1. Detect MULTIPLE intents in the user input and select ALL relevant modules.
2. Proactively recommend contextually related modules even if not explicitly
   requested (e.g. hotels alongside flights for a trip) - UNLESS the user
   explicitly restricts the request to one thing.
3. Assign priority 1 to the primary module; secondary modules get 2 and up.
4. Normalize parameters: resolve relative dates to YYYY-MM-DD, split
   origin/destination cities, split currency pairs. Use reasonable defaults
   when a parameter is missing.
5. Each module entry picks one operation id from that module and extracts its
   parameters independently.
6. Keep each "reason" to one short sentence.
7. Return ONLY JSON. The root object must contain a "modules" array. No prose."#
    )
}

fn mapper_system_prompt(layout: Layout) -> String {
    format!(
        r#"You are the Mapper for CardFlow.
Transform raw JSON data into the UI data structure below.

# Target Layout: {}

# Target UI Schema
{}

# Rules
1. Extract the relevant information from the raw data and map it onto the schema.
2. "hero": prefer an image URL when one exists, otherwise a fitting emoji icon.
3. "highlight": derive a single key metric (formatted price, rating, or score).
4. "actions": synthesize at least one sensible action (e.g. "Book", "View", "Call").
5. Return valid JSON strictly matching the schema.
6. Return ONLY JSON. No prose."#,
        layout.as_str(),
        layout_schema(layout)
    )
}

/// Messages for the Planner stage.
pub fn planner_messages(user_input: &str, modules: &[ModuleSummary]) -> Vec<ChatMessage> {
    vec![
        ChatMessage::system(planner_system_prompt(modules)),
        ChatMessage::user(user_input),
    ]
}

/// Messages for the Mapper stage.
pub fn mapper_messages(raw_data: &serde_json::Value, layout: Layout) -> Vec<ChatMessage> {
    vec![
        ChatMessage::system(mapper_system_prompt(layout)),
        ChatMessage::user(format!("Raw Data: {}", raw_data)),
    ]
}

/// Messages for the direct knowledge-lookup path.
pub fn assistant_messages(query: &str) -> Vec<ChatMessage> {
    vec![
        ChatMessage::system(GENERAL_ASSISTANT_PROMPT),
        ChatMessage::user(query),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Layout;

    fn summary() -> ModuleSummary {
        ModuleSummary {
            id: "flight".to_string(),
            name: "Flight Search".to_string(),
            description: "Search flights between cities".to_string(),
            keywords: vec!["flight".to_string(), "ticket".to_string()],
            recommended_layout: Layout::ScrollableList,
            apis: None,
        }
    }

    #[test]
    fn test_planner_prompt_lists_modules() {
        let messages = planner_messages("book a flight", &[summary()]);
        assert_eq!(messages.len(), 2);
        assert!(messages[0].content.contains("flight: Search flights"));
        assert!(messages[0].content.contains("\"modules\""));
        assert_eq!(messages[1].content, "book a flight");
    }

    #[test]
    fn test_mapper_prompt_embeds_layout_schema() {
        let raw = serde_json::json!({"flights": []});
        let messages = mapper_messages(&raw, Layout::MapView);
        assert!(messages[0].content.contains("map-view-horizontal"));
        assert!(messages[0].content.contains("\"lat\": number"));
        assert!(messages[1].content.starts_with("Raw Data: "));
    }

    #[test]
    fn test_each_layout_has_a_schema() {
        for layout in [
            Layout::ScrollableList,
            Layout::InfoDisplay,
            Layout::InteractiveAction,
            Layout::MapView,
        ] {
            assert!(layout_schema(layout).starts_with("Array of items:"));
        }
    }
}
