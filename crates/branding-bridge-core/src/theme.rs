//! Visual theme descriptor and the fallback used for unconfigured tenants.

use std::borrow::Cow;

use serde::{Deserialize, Serialize};

/// String slot of a theme. Borrowed for the built-in default, owned once decoded.
pub type StyleValue = Cow<'static, str>;

const fn style(value: &'static str) -> StyleValue {
    Cow::Borrowed(value)
}

/// Visual style of the login widget and page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ThemeDescriptor {
    /// Assigned by the remote service on creation.
    #[serde(rename = "themeId", default, skip_serializing_if = "Option::is_none")]
    pub theme_id: Option<String>,
    #[serde(rename = "displayName", default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default)]
    pub borders: ThemeBorders,
    #[serde(default)]
    pub colors: ThemeColors,
    #[serde(default)]
    pub fonts: ThemeFonts,
    #[serde(default)]
    pub page_background: ThemePageBackground,
    #[serde(default)]
    pub widget: ThemeWidget,
}

impl ThemeDescriptor {
    /// Strip the remote identity so the theme can be sent as a create or update body.
    #[must_use]
    pub fn without_id(mut self) -> Self {
        self.theme_id = None;
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThemeBorders {
    pub button_border_radius: f64,
    pub button_border_weight: f64,
    pub buttons_style: StyleValue,
    pub input_border_radius: f64,
    pub input_border_weight: f64,
    pub inputs_style: StyleValue,
    pub show_widget_shadow: bool,
    pub widget_border_weight: f64,
    pub widget_corner_radius: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThemeColors {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_focus_color: Option<StyleValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_hover_color: Option<StyleValue>,
    pub body_text: StyleValue,
    pub error: StyleValue,
    pub header: StyleValue,
    pub icons: StyleValue,
    pub input_background: StyleValue,
    pub input_border: StyleValue,
    pub input_filled_text: StyleValue,
    pub input_labels_placeholders: StyleValue,
    pub links_focused_components: StyleValue,
    pub primary_button: StyleValue,
    pub primary_button_label: StyleValue,
    pub secondary_button_border: StyleValue,
    pub secondary_button_label: StyleValue,
    pub success: StyleValue,
    pub widget_background: StyleValue,
    pub widget_border: StyleValue,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThemeFonts {
    pub body_text: ThemeText,
    pub buttons_text: ThemeText,
    pub font_url: StyleValue,
    pub input_labels: ThemeText,
    pub links: ThemeText,
    pub links_style: StyleValue,
    pub reference_text_size: f64,
    pub subtitle: ThemeText,
    pub title: ThemeText,
}

/// Weight and relative size (percent) of one text role.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThemeText {
    pub bold: bool,
    pub size: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThemePageBackground {
    pub background_color: StyleValue,
    pub background_image_url: StyleValue,
    pub page_layout: StyleValue,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThemeWidget {
    pub header_text_alignment: StyleValue,
    pub logo_height: f64,
    pub logo_position: StyleValue,
    pub logo_url: StyleValue,
    pub social_buttons_layout: StyleValue,
}

/// Theme substituted whenever the tenant has no theme configured.
pub const DEFAULT_THEME: ThemeDescriptor = ThemeDescriptor {
    theme_id: None,
    display_name: None,
    borders: ThemeBorders {
        button_border_radius: 3.0,
        button_border_weight: 1.0,
        buttons_style: style("rounded"),
        input_border_radius: 3.0,
        input_border_weight: 1.0,
        inputs_style: style("rounded"),
        show_widget_shadow: true,
        widget_border_weight: 0.0,
        widget_corner_radius: 5.0,
    },
    colors: ThemeColors {
        base_focus_color: Some(style("#635dff")),
        base_hover_color: Some(style("#000000")),
        body_text: style("#1e212a"),
        error: style("#d03c38"),
        header: style("#1e212a"),
        icons: style("#65676e"),
        input_background: style("#ffffff"),
        input_border: style("#c9cace"),
        input_filled_text: style("#000000"),
        input_labels_placeholders: style("#65676e"),
        links_focused_components: style("#635dff"),
        primary_button: style("#635dff"),
        primary_button_label: style("#ffffff"),
        secondary_button_border: style("#c9cace"),
        secondary_button_label: style("#1e212a"),
        success: style("#13a688"),
        widget_background: style("#ffffff"),
        widget_border: style("#c9cace"),
    },
    fonts: ThemeFonts {
        body_text: ThemeText { bold: false, size: 87.5 },
        buttons_text: ThemeText { bold: false, size: 100.0 },
        font_url: style(""),
        input_labels: ThemeText { bold: false, size: 100.0 },
        links: ThemeText { bold: true, size: 87.5 },
        links_style: style("normal"),
        reference_text_size: 16.0,
        subtitle: ThemeText { bold: false, size: 87.5 },
        title: ThemeText { bold: false, size: 150.0 },
    },
    page_background: ThemePageBackground {
        background_color: style("#000000"),
        background_image_url: style(""),
        page_layout: style("center"),
    },
    widget: ThemeWidget {
        header_text_alignment: style("center"),
        logo_height: 52.0,
        logo_position: style("center"),
        logo_url: style(""),
        social_buttons_layout: style("bottom"),
    },
};
