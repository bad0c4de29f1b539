use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::OnceLock;

use crate::definition::{ComponentDefinition, PropValue};
use crate::error::EngineResult;
use crate::registry::ComponentRegistry;
use crate::tokens::DesignTokenSet;

/// Generated code bundle for one component instance. A pure function of
/// (definition, props, variant, tokens): identical inputs yield identical
/// output, which re-render and caching rely on.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedCode {
    pub html: String,
    pub css: String,
    pub js: String,
}

/// Generate the html/css/js bundle for a component.
///
/// Unknown variants are silently skipped (the instance falls back to base
/// styling); unknown `{{placeholders}}` pass through untouched.
pub fn generate(
    registry: &ComponentRegistry,
    component_id: &str,
    props: &BTreeMap<String, PropValue>,
    variant: Option<&str>,
    tokens: &DesignTokenSet,
) -> EngineResult<GeneratedCode> {
    let definition = registry.get(component_id)?;
    let effective = effective_props(definition, props, variant);

    let html = substitute(&definition.template.html, &effective, true);

    let mut css = definition.styles.base.clone();
    if let Some(v) = variant.and_then(|name| definition.variant(name)) {
        css.push_str(&v.style);
    }
    css.push_str(&definition.styles.responsive);
    css.push_str(&definition.styles.dark_mode);
    let css = tokens.apply(&substitute(&css, &effective, false));

    let js = substitute(&definition.template.js, &effective, false);

    Ok(GeneratedCode {
        html: minify(&html),
        css: minify(&css),
        js: minify(&js),
    })
}

/// Merge schema defaults, variant overrides, and caller props, in that
/// order of increasing precedence.
pub fn effective_props(
    definition: &ComponentDefinition,
    props: &BTreeMap<String, PropValue>,
    variant: Option<&str>,
) -> BTreeMap<String, PropValue> {
    let mut merged: BTreeMap<String, PropValue> = BTreeMap::new();
    for spec in &definition.props {
        if let Some(default) = &spec.default {
            merged.insert(spec.name.clone(), default.clone());
        }
    }
    if let Some(v) = variant.and_then(|name| definition.variant(name)) {
        for (k, value) in &v.prop_overrides {
            merged.insert(k.clone(), value.clone());
        }
    }
    for (k, value) in props {
        merged.insert(k.clone(), value.clone());
    }
    merged
}

/// Replace `{{name}}` placeholders in one pass over the template text.
/// Substituted values are never rescanned, so prop values containing `{{`
/// cannot inject further placeholders.
fn substitute(template: &str, props: &BTreeMap<String, PropValue>, escape: bool) -> String {
    static PLACEHOLDER: OnceLock<Regex> = OnceLock::new();
    let placeholder =
        PLACEHOLDER.get_or_init(|| Regex::new(r"\{\{\s*([A-Za-z_][A-Za-z0-9_]*)\s*\}\}").unwrap());

    placeholder
        .replace_all(template, |caps: &regex::Captures| match props.get(&caps[1]) {
            Some(value) => {
                let rendered = value.render();
                if escape {
                    escape_html(&rendered)
                } else {
                    rendered
                }
            }
            None => caps[0].to_string(),
        })
        .into_owned()
}

pub fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Collapse whitespace around structural punctuation. Rough but stable:
/// the same input always minifies to the same output.
pub fn minify(text: &str) -> String {
    static RUNS: OnceLock<Regex> = OnceLock::new();
    static AROUND: OnceLock<Regex> = OnceLock::new();

    let runs = RUNS.get_or_init(|| Regex::new(r"\s+").unwrap());
    let around = AROUND.get_or_init(|| Regex::new(r"\s*([{};:,>])\s*").unwrap());

    let collapsed = runs.replace_all(text.trim(), " ");
    around.replace_all(&collapsed, "$1").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::builtin_registry;

    fn props(pairs: &[(&str, PropValue)]) -> BTreeMap<String, PropValue> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn test_generate_unknown_component() {
        let reg = builtin_registry();
        let out = generate(
            &reg,
            "nope",
            &BTreeMap::new(),
            None,
            &DesignTokenSet::default(),
        );
        assert!(matches!(
            out,
            Err(crate::error::EngineError::ComponentNotFound { .. })
        ));
    }

    #[test]
    fn test_generate_substitutes_and_resolves_tokens() {
        let reg = builtin_registry();
        let tokens = DesignTokenSet::default();
        let code = generate(
            &reg,
            "button",
            &props(&[("children", PropValue::String("Click me".into()))]),
            None,
            &tokens,
        )
        .unwrap();

        assert!(code.html.contains("Click me"));
        assert!(!code.html.contains("{{"));
        assert!(code.css.contains("#7c3aed"));
        assert!(!code.css.contains("var(--color-primary)"));
    }

    #[test]
    fn test_unknown_variant_falls_back_to_base() {
        let reg = builtin_registry();
        let tokens = DesignTokenSet::default();
        let base = generate(
            &reg,
            "button",
            &props(&[("children", PropValue::String("x".into()))]),
            None,
            &tokens,
        )
        .unwrap();
        let with_unknown = generate(
            &reg,
            "button",
            &props(&[("children", PropValue::String("x".into()))]),
            Some("ghost-mode"),
            &tokens,
        )
        .unwrap();
        assert_eq!(base, with_unknown);
    }

    #[test]
    fn test_generate_is_deterministic() {
        let reg = builtin_registry();
        let tokens = DesignTokenSet::default();
        let p = props(&[("children", PropValue::String("Go".into()))]);
        let a = generate(&reg, "button", &p, Some("destructive"), &tokens).unwrap();
        let b = generate(&reg, "button", &p, Some("destructive"), &tokens).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_html_props_are_escaped() {
        let reg = builtin_registry();
        let code = generate(
            &reg,
            "button",
            &props(&[(
                "children",
                PropValue::String("<script>alert(1)</script>".into()),
            )]),
            None,
            &DesignTokenSet::default(),
        )
        .unwrap();
        assert!(code.html.contains("&lt;script&gt;"));
        assert!(!code.html.contains("<script>"));
    }

    #[test]
    fn test_placeholder_in_prop_value_is_inert() {
        let reg = builtin_registry();
        let code = generate(
            &reg,
            "button",
            &props(&[("children", PropValue::String("{{size}}".into()))]),
            None,
            &DesignTokenSet::default(),
        )
        .unwrap();
        // The literal braces survive; they are not re-expanded to "md".
        assert!(code.html.contains("{{size}}"));
    }

    #[test]
    fn test_minify_collapses_structural_whitespace() {
        let css = ".a {\n  color : red ;\n}\n.b { margin : 0 }";
        assert_eq!(minify(css), ".a{color:red;}.b{margin:0}");
    }
}
