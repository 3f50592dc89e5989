use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::OnceLock;

use crate::error::{MarkupError, MarkupResult};

pub const DEFAULT_LOGO_URL: &str = "https://imgs.search.brave.com/LjbDTmdGnNX11RCeGZ7kTPdUMKtCgccfW9IV2GmuQWY/rs:fit:860:0:0:0/g:ce/aHR0cHM6Ly90My5m/dGNkbi5uZXQvanBn/LzAxLzMyLzY3LzU0/LzM2MF9GXzEzMjY3/NTQ1Nl8ySTFUMlFv/MGcxZmQzbzVwVXBQ/djU5UlVyQ0g1c2JX/bC5qcGc";

/// Brand and style settings for the widget. Read-only to the renderers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ThemeConfig {
    /// Tailwind gradient stops, e.g. `from-blue-600 via-purple-600 to-indigo-700`
    pub primary_gradient: String,
    pub secondary_gradient: String,
    /// Tailwind color token, e.g. `blue-500`
    pub accent_color: String,
    /// Bot avatar; also stands in for product images that are missing
    pub logo_url: String,
    pub brand_name: String,
    pub welcome_message: String,
    pub quick_actions: Vec<String>,
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self {
            primary_gradient: "from-blue-600 via-purple-600 to-indigo-700".to_string(),
            secondary_gradient: "from-blue-800 to-indigo-800".to_string(),
            accent_color: "blue-500".to_string(),
            logo_url: DEFAULT_LOGO_URL.to_string(),
            brand_name: "AI Assistant".to_string(),
            welcome_message: "How can we help you today?".to_string(),
            quick_actions: vec![
                "Ask a question".to_string(),
                "Track my order".to_string(),
                "New arrivals".to_string(),
                "Get support".to_string(),
            ],
        }
    }
}

/// Partial update; `None` leaves the field as is.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThemePatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub primary_gradient: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secondary_gradient: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accent_color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logo_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brand_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub welcome_message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quick_actions: Option<Vec<String>>,
}

impl ThemeConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy with every `Some` field of `patch` applied.
    pub fn apply(&self, patch: ThemePatch) -> Self {
        let mut next = self.clone();
        if let Some(v) = patch.primary_gradient {
            next.primary_gradient = v;
        }
        if let Some(v) = patch.secondary_gradient {
            next.secondary_gradient = v;
        }
        if let Some(v) = patch.accent_color {
            next.accent_color = v;
        }
        if let Some(v) = patch.logo_url {
            next.logo_url = v;
        }
        if let Some(v) = patch.brand_name {
            next.brand_name = v;
        }
        if let Some(v) = patch.welcome_message {
            next.welcome_message = v;
        }
        if let Some(v) = patch.quick_actions {
            next.quick_actions = v;
        }
        next
    }

    /// Class-valued fields end up inside `class="…"`, the logo inside `src="…"`.
    pub fn validate(&self) -> MarkupResult<()> {
        validate_classes("primaryGradient", &self.primary_gradient)?;
        validate_classes("secondaryGradient", &self.secondary_gradient)?;
        validate_classes("accentColor", &self.accent_color)?;
        validate_image_url("logoUrl", &self.logo_url)
    }

    /// Pretty JSON, the export format.
    pub fn to_json_pretty(&self) -> MarkupResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse JSON; absent fields take their default values.
    pub fn from_json(json: &str) -> MarkupResult<Self> {
        let theme: Self = serde_json::from_str(json)?;
        theme.validate()?;
        Ok(theme)
    }

    pub fn from_yaml(yaml: &str) -> MarkupResult<Self> {
        let theme: Self = serde_yaml::from_str(yaml)?;
        theme.validate()?;
        Ok(theme)
    }

    /// Load a theme file; `.yaml`/`.yml` are read as YAML, anything else as JSON.
    pub fn load_file(path: &Path) -> MarkupResult<Self> {
        let content = std::fs::read_to_string(path)?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("yaml") | Some("yml") => Self::from_yaml(&content),
            _ => Self::from_json(&content),
        }
    }
}

fn validate_classes(field: &str, value: &str) -> MarkupResult<()> {
    static CLASSES_REGEX: OnceLock<Regex> = OnceLock::new();
    let re = CLASSES_REGEX.get_or_init(|| Regex::new(r"^[a-zA-Z0-9_\-\s:./\[\]#]*$").unwrap());
    if !re.is_match(value) {
        return Err(MarkupError::InvalidThemeField {
            field: field.to_string(),
            reason: "must contain only safe class characters (alphanumeric, spaces, -, _, :, /, ., #, [, ])".to_string(),
        });
    }
    Ok(())
}

fn validate_image_url(field: &str, value: &str) -> MarkupResult<()> {
    static URL_REGEX: OnceLock<Regex> = OnceLock::new();
    let re = URL_REGEX.get_or_init(|| Regex::new(r"^(https?://\S+|data:image/[a-zA-Z0-9.+-]+;base64,[A-Za-z0-9+/=]+)$").unwrap());
    if !value.is_empty() && !re.is_match(value) {
        return Err(MarkupError::InvalidThemeField {
            field: field.to_string(),
            reason: "must be empty, an http(s) URL or a base64 image data URI".to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_default_theme_is_valid() {
        let theme = ThemeConfig::default();
        assert!(theme.validate().is_ok());
        assert_eq!(theme.brand_name, "AI Assistant");
        assert_eq!(theme.quick_actions.len(), 4);
    }

    #[test]
    fn test_apply_patch_only_touches_set_fields() {
        let theme = ThemeConfig::default().apply(ThemePatch {
            brand_name: Some("Plum".to_string()),
            ..Default::default()
        });
        assert_eq!(theme.brand_name, "Plum");
        assert_eq!(theme.accent_color, "blue-500");
    }

    #[test]
    fn test_from_json_merges_over_defaults() {
        let theme = ThemeConfig::from_json(r#"{"brandName":"Plum","accentColor":"green-500"}"#).unwrap();
        assert_eq!(theme.brand_name, "Plum");
        assert_eq!(theme.accent_color, "green-500");
        assert_eq!(theme.welcome_message, ThemeConfig::default().welcome_message);
    }

    #[test]
    fn test_from_yaml() {
        let yaml = "brandName: Plum\nquickActions:\n  - Hi\n  - Bye\n";
        let theme = ThemeConfig::from_yaml(yaml).unwrap();
        assert_eq!(theme.quick_actions, vec!["Hi", "Bye"]);
    }

    #[test]
    fn test_export_round_trips() {
        let theme = ThemeConfig::default();
        let json = theme.to_json_pretty().unwrap();
        assert!(json.contains("\"primaryGradient\""));
        assert_eq!(ThemeConfig::from_json(&json).unwrap(), theme);
    }

    #[test]
    fn test_rejects_unsafe_gradient() {
        let result = ThemeConfig::from_json(r#"{"primaryGradient":"x\" onload=\"alert(1)"}"#);
        assert!(matches!(result, Err(MarkupError::InvalidThemeField { .. })));
    }

    #[test]
    fn test_rejects_script_logo() {
        let result = ThemeConfig::from_json(r#"{"logoUrl":"javascript:alert(1)"}"#);
        assert!(matches!(result, Err(MarkupError::InvalidThemeField { .. })));
    }

    #[test]
    fn test_malformed_json() {
        assert!(matches!(
            ThemeConfig::from_json("{not json"),
            Err(MarkupError::Json(_))
        ));
    }
}
