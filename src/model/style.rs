//! Presentation style vocabulary
//!
//! `Layout` is the contract between the planner and the renderer: each variant
//! has a fixed item schema that the Mapper stage targets. The remaining types
//! are cosmetic hints the frontend is free to interpret.

use serde::{Deserialize, Serialize};

/// Fixed presentation schemas a module instance can render into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Layout {
    /// Horizontally scrollable card list (flights, shopping, restaurants...).
    #[serde(rename = "horizontal-scrollable-list")]
    ScrollableList,
    /// Static informational card (weather, encyclopedia answers).
    #[serde(rename = "info-display")]
    InfoDisplay,
    /// Action-oriented card with a primary button per item.
    #[serde(rename = "interactive-action")]
    InteractiveAction,
    /// Horizontal map/POI view.
    #[serde(rename = "map-view-horizontal")]
    MapView,
}

impl Layout {
    pub fn as_str(&self) -> &'static str {
        match self {
            Layout::ScrollableList => "horizontal-scrollable-list",
            Layout::InfoDisplay => "info-display",
            Layout::InteractiveAction => "interactive-action",
            Layout::MapView => "map-view-horizontal",
        }
    }
}

impl Default for Layout {
    fn default() -> Self {
        Layout::ScrollableList
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CardStyle {
    Elevated,
    Flat,
    Outlined,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorScheme {
    Auto,
    Primary,
    Blue,
    Green,
    Yellow,
    Red,
    Gray,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Density {
    Comfortable,
    Compact,
    Spacious,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    Dark,
    Auto,
}

/// Per-module style descriptor carried on every plan entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleStyle {
    pub layout: Layout,
    pub card_style: CardStyle,
    pub color_scheme: ColorScheme,
    pub density: Density,
}

impl ModuleStyle {
    /// Primary modules render elevated, the rest flat.
    pub fn for_priority(layout: Layout, priority: u32) -> Self {
        Self {
            layout,
            card_style: if priority == 1 {
                CardStyle::Elevated
            } else {
                CardStyle::Flat
            },
            color_scheme: ColorScheme::Auto,
            density: Density::Comfortable,
        }
    }
}

/// Page-level style applied to the whole response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GlobalStyle {
    pub theme: Theme,
    pub accent_color: String,
    pub page_layout: String,
}

impl Default for GlobalStyle {
    fn default() -> Self {
        Self {
            theme: Theme::Light,
            accent_color: "blue".to_string(),
            page_layout: "vertical".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_serde_names() {
        let json = serde_json::to_string(&Layout::ScrollableList).unwrap();
        assert_eq!(json, "\"horizontal-scrollable-list\"");
        let back: Layout = serde_json::from_str("\"map-view-horizontal\"").unwrap();
        assert_eq!(back, Layout::MapView);
    }

    #[test]
    fn test_module_style_priority_defaults() {
        let primary = ModuleStyle::for_priority(Layout::InfoDisplay, 1);
        assert_eq!(primary.card_style, CardStyle::Elevated);
        let secondary = ModuleStyle::for_priority(Layout::InfoDisplay, 3);
        assert_eq!(secondary.card_style, CardStyle::Flat);
    }
}
