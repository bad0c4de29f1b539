use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::Write;
use std::sync::OnceLock;

/// Rendering mode for the token set. Dark mode only flips the emitted
/// `color-scheme`; the concrete values live in the token maps either way.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemeMode {
    #[default]
    Light,
    Dark,
}

/// Typography scale: one family plus named size/weight/line-height steps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Typography {
    pub font_family: String,
    pub font_sizes: BTreeMap<String, String>,
    pub font_weights: BTreeMap<String, String>,
    pub line_heights: BTreeMap<String, String>,
}

impl Default for Typography {
    fn default() -> Self {
        Typography {
            font_family: "Inter, system-ui, sans-serif".to_string(),
            font_sizes: scale(&[
                ("xs", "0.75rem"),
                ("sm", "0.875rem"),
                ("base", "1rem"),
                ("lg", "1.125rem"),
                ("xl", "1.25rem"),
                ("2xl", "1.5rem"),
                ("3xl", "1.875rem"),
            ]),
            font_weights: scale(&[
                ("normal", "400"),
                ("medium", "500"),
                ("semibold", "600"),
                ("bold", "700"),
            ]),
            line_heights: scale(&[
                ("tight", "1.25"),
                ("normal", "1.5"),
                ("relaxed", "1.75"),
            ]),
        }
    }
}

/// Design token set driving both generated component styles and the
/// document's base styling. Replaced wholesale by the host; never mutated
/// by the engine. Maps are ordered so emitted CSS is deterministic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DesignTokenSet {
    pub colors: BTreeMap<String, String>,
    pub typography: Typography,
    pub spacing: BTreeMap<String, String>,
    pub border_radius: BTreeMap<String, String>,
    pub mode: ThemeMode,
}

impl Default for DesignTokenSet {
    fn default() -> Self {
        DesignTokenSet {
            colors: scale(&[
                ("primary", "#7c3aed"),
                ("secondary", "#64748b"),
                ("accent", "#f59e0b"),
                ("background", "#ffffff"),
                ("foreground", "#0f172a"),
                ("muted", "#f1f5f9"),
                ("destructive", "#dc2626"),
                ("border", "#e2e8f0"),
            ]),
            typography: Typography::default(),
            spacing: scale(&[
                ("xs", "0.25rem"),
                ("sm", "0.5rem"),
                ("md", "1rem"),
                ("lg", "1.5rem"),
                ("xl", "2rem"),
                ("2xl", "3rem"),
            ]),
            border_radius: scale(&[
                ("sm", "0.25rem"),
                ("md", "0.5rem"),
                ("lg", "0.75rem"),
                ("full", "9999px"),
            ]),
            mode: ThemeMode::Light,
        }
    }
}

fn scale(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

impl DesignTokenSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flatten the five token groups into `--group-key` variable names.
    pub fn flatten(&self) -> BTreeMap<String, String> {
        let mut vars = BTreeMap::new();
        for (k, v) in &self.colors {
            vars.insert(format!("--color-{}", k), v.clone());
        }
        vars.insert(
            "--font-family".to_string(),
            self.typography.font_family.clone(),
        );
        for (k, v) in &self.typography.font_sizes {
            vars.insert(format!("--font-size-{}", k), v.clone());
        }
        for (k, v) in &self.typography.font_weights {
            vars.insert(format!("--font-weight-{}", k), v.clone());
        }
        for (k, v) in &self.typography.line_heights {
            vars.insert(format!("--line-height-{}", k), v.clone());
        }
        for (k, v) in &self.spacing {
            vars.insert(format!("--spacing-{}", k), v.clone());
        }
        for (k, v) in &self.border_radius {
            vars.insert(format!("--radius-{}", k), v.clone());
        }
        vars
    }

    /// Resolve a direct token reference (e.g. "$tokens.colors.primary").
    pub fn resolve(&self, reference: &str) -> Option<String> {
        if !Self::is_token_reference(reference) {
            return None;
        }

        let parts: Vec<&str> = reference.trim_start_matches("$tokens.").split('.').collect();
        if parts.len() != 2 {
            return None;
        }

        match parts[0] {
            "colors" => self.colors.get(parts[1]).cloned(),
            "spacing" => self.spacing.get(parts[1]).cloned(),
            "borderRadius" => self.border_radius.get(parts[1]).cloned(),
            "fontSizes" => self.typography.font_sizes.get(parts[1]).cloned(),
            "fontWeights" => self.typography.font_weights.get(parts[1]).cloned(),
            "lineHeights" => self.typography.line_heights.get(parts[1]).cloned(),
            _ => None,
        }
    }

    /// Check if a string is a direct token reference.
    pub fn is_token_reference(value: &str) -> bool {
        value.starts_with("$tokens.")
    }

    /// Substitute token references in a CSS fragment.
    ///
    /// Handles, in order: the legacy `hsl(var(--key))` form, `var(--key)`,
    /// and direct `$tokens.group.key` references. Unknown keys pass through
    /// unresolved; applying twice yields the same output as applying once.
    pub fn apply(&self, css: &str) -> String {
        static HSL_VAR: OnceLock<Regex> = OnceLock::new();
        static VAR: OnceLock<Regex> = OnceLock::new();
        static DIRECT: OnceLock<Regex> = OnceLock::new();

        let hsl_var = HSL_VAR
            .get_or_init(|| Regex::new(r"hsl\(\s*var\(\s*(--[A-Za-z0-9-]+)\s*\)\s*\)").unwrap());
        let var = VAR.get_or_init(|| Regex::new(r"var\(\s*(--[A-Za-z0-9-]+)\s*\)").unwrap());
        let direct =
            DIRECT.get_or_init(|| Regex::new(r"\$tokens\.[A-Za-z]+\.[A-Za-z0-9-]+").unwrap());

        let vars = self.flatten();

        let out = hsl_var.replace_all(css, |caps: &regex::Captures| {
            match vars.get(&caps[1]) {
                // Values that are already complete colors drop the hsl() shell;
                // raw triples like "222 47% 11%" keep it.
                Some(v) if v.starts_with('#') || v.starts_with("hsl(") || v.starts_with("rgb") => {
                    v.clone()
                }
                Some(v) => format!("hsl({})", v),
                None => caps[0].to_string(),
            }
        });

        let out = var.replace_all(&out, |caps: &regex::Captures| match vars.get(&caps[1]) {
            Some(v) => v.clone(),
            None => caps[0].to_string(),
        });

        let out = direct.replace_all(&out, |caps: &regex::Captures| {
            self.resolve(&caps[0]).unwrap_or_else(|| caps[0].to_string())
        });

        out.into_owned()
    }

    /// Render the flattened variables as a `:root` block for the document head.
    pub fn root_css(&self) -> String {
        let mut css = String::from(":root{");
        let _ = write!(
            css,
            "color-scheme:{};",
            match self.mode {
                ThemeMode::Light => "light",
                ThemeMode::Dark => "dark",
            }
        );
        for (name, value) in self.flatten() {
            let _ = write!(css, "{}:{};", name, value);
        }
        css.push('}');
        css
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens() -> DesignTokenSet {
        DesignTokenSet::default()
    }

    #[test]
    fn test_flatten_names() {
        let vars = tokens().flatten();
        assert_eq!(vars.get("--color-primary").map(String::as_str), Some("#7c3aed"));
        assert_eq!(vars.get("--spacing-md").map(String::as_str), Some("1rem"));
        assert_eq!(vars.get("--radius-full").map(String::as_str), Some("9999px"));
        assert!(vars.contains_key("--font-family"));
    }

    #[test]
    fn test_apply_var_substitution() {
        let css = ".btn{color:var(--color-primary);padding:var(--spacing-sm);}";
        let out = tokens().apply(css);
        assert_eq!(out, ".btn{color:#7c3aed;padding:0.5rem;}");
    }

    #[test]
    fn test_apply_legacy_hsl_form() {
        let mut t = tokens();
        t.colors.insert("ink".to_string(), "222 47% 11%".to_string());
        let out = t.apply(".x{color:hsl(var(--color-ink));background:hsl(var(--color-primary));}");
        assert_eq!(out, ".x{color:hsl(222 47% 11%);background:#7c3aed;}");
    }

    #[test]
    fn test_apply_direct_reference() {
        let out = tokens().apply("border-color:$tokens.colors.border;");
        assert_eq!(out, "border-color:#e2e8f0;");
    }

    #[test]
    fn test_unknown_keys_pass_through() {
        let css = ".x{color:var(--color-nope);gap:$tokens.spacing.nope;}";
        assert_eq!(tokens().apply(css), css);
    }

    #[test]
    fn test_apply_is_idempotent() {
        let t = tokens();
        let css = ".x{color:var(--color-primary);gap:var(--spacing-huge);b:hsl(var(--color-accent));}";
        let once = t.apply(css);
        assert_eq!(t.apply(&once), once);
    }

    #[test]
    fn test_root_css_contains_mode_and_vars() {
        let css = tokens().root_css();
        assert!(css.starts_with(":root{color-scheme:light;"));
        assert!(css.contains("--color-primary:#7c3aed;"));
        assert!(css.ends_with('}'));
    }

    #[test]
    fn test_resolve_reference() {
        let t = tokens();
        assert_eq!(t.resolve("$tokens.colors.primary"), Some("#7c3aed".to_string()));
        assert_eq!(t.resolve("$tokens.borderRadius.md"), Some("0.5rem".to_string()));
        assert_eq!(t.resolve("$tokens.colors.unknown"), None);
        assert_eq!(t.resolve("#fff"), None);
    }
}
