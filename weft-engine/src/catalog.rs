//! Starter component catalog.
//!
//! A small set of ready-to-insert definitions so a fresh registry is usable
//! without the host loading its own catalog first. Styles reference design
//! tokens through `var(--...)` names resolved at generation time.

use std::collections::BTreeMap;

use crate::definition::{
    ComponentDefinition, DefinitionMeta, PropKind, PropSpec, PropValue, StyleSheet, Template,
    VariantSpec,
};
use crate::registry::ComponentRegistry;

/// Identifiers of the built-in definitions, in registration order.
pub const BUILTIN_COMPONENTS: &[&str] = &["button", "card", "input", "badge", "navbar", "hero"];

/// Build a registry pre-loaded with the starter catalog.
pub fn builtin_registry() -> ComponentRegistry {
    let mut registry = ComponentRegistry::new();
    for definition in builtin_catalog() {
        registry.register(definition);
    }
    registry
}

/// The starter definitions themselves.
pub fn builtin_catalog() -> Vec<ComponentDefinition> {
    vec![button(), card(), input(), badge(), navbar(), hero()]
}

fn meta(category: &str, tags: &[&str]) -> DefinitionMeta {
    DefinitionMeta {
        category: category.to_string(),
        tags: tags.iter().map(|t| t.to_string()).collect(),
        dependencies: vec![],
    }
}

fn overrides(pairs: &[(&str, PropValue)]) -> BTreeMap<String, PropValue> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.clone()))
        .collect()
}

fn button() -> ComponentDefinition {
    ComponentDefinition {
        id: "button".to_string(),
        name: "Button".to_string(),
        description: "Clickable action button".to_string(),
        props: vec![
            PropSpec::required("children", PropKind::String),
            PropSpec::optional("size", PropKind::String, PropValue::String("md".into()))
                .with_pattern("^(sm|md|lg)$"),
        ],
        variants: vec![
            VariantSpec {
                name: "outline".to_string(),
                prop_overrides: overrides(&[]),
                style: ".wf-button{background:transparent;color:var(--color-primary);border:1px solid var(--color-primary);}".to_string(),
            },
            VariantSpec {
                name: "destructive".to_string(),
                prop_overrides: overrides(&[]),
                style: ".wf-button{background:var(--color-destructive);}".to_string(),
            },
        ],
        styles: StyleSheet {
            base: ".wf-button{display:inline-flex;align-items:center;justify-content:center;padding:var(--spacing-sm) var(--spacing-md);border:none;border-radius:var(--radius-md);background:var(--color-primary);color:#ffffff;font-family:var(--font-family);font-size:var(--font-size-sm);font-weight:var(--font-weight-medium);cursor:pointer;}.wf-button:hover{opacity:0.9;}".to_string(),
            responsive: "@media (max-width:640px){.wf-button{width:100%;}}".to_string(),
            dark_mode: String::new(),
        },
        template: Template {
            html: r#"<button class="wf-button" type="button">{{children}}</button>"#.to_string(),
            js: String::new(),
        },
        meta: meta("form", &["action", "cta"]),
    }
}

fn card() -> ComponentDefinition {
    ComponentDefinition {
        id: "card".to_string(),
        name: "Card".to_string(),
        description: "Content surface with title and body".to_string(),
        props: vec![
            PropSpec::required("title", PropKind::String),
            PropSpec::optional("body", PropKind::String, PropValue::String(String::new())),
        ],
        variants: vec![VariantSpec {
            name: "elevated".to_string(),
            prop_overrides: overrides(&[]),
            style: ".wf-card{box-shadow:0 10px 15px rgba(0,0,0,0.1);border:none;}".to_string(),
        }],
        styles: StyleSheet {
            base: ".wf-card{padding:var(--spacing-lg);border:1px solid var(--color-border);border-radius:var(--radius-lg);background:var(--color-background);font-family:var(--font-family);}.wf-card h3{margin:0 0 var(--spacing-sm);font-size:var(--font-size-lg);color:var(--color-foreground);}.wf-card p{margin:0;font-size:var(--font-size-sm);color:var(--color-secondary);line-height:var(--line-height-normal);}".to_string(),
            responsive: String::new(),
            dark_mode: String::new(),
        },
        template: Template {
            html: r#"<div class="wf-card"><h3>{{title}}</h3><p>{{body}}</p></div>"#.to_string(),
            js: String::new(),
        },
        meta: meta("layout", &["surface", "container"]),
    }
}

fn input() -> ComponentDefinition {
    ComponentDefinition {
        id: "input".to_string(),
        name: "Input".to_string(),
        description: "Single-line text input with label".to_string(),
        props: vec![
            PropSpec::required("label", PropKind::String),
            PropSpec::optional(
                "placeholder",
                PropKind::String,
                PropValue::String(String::new()),
            ),
        ],
        variants: vec![],
        styles: StyleSheet {
            base: ".wf-input{display:flex;flex-direction:column;gap:var(--spacing-xs);font-family:var(--font-family);}.wf-input label{font-size:var(--font-size-sm);font-weight:var(--font-weight-medium);color:var(--color-foreground);}.wf-input input{padding:var(--spacing-sm);border:1px solid var(--color-border);border-radius:var(--radius-md);font-size:var(--font-size-sm);}.wf-input input:focus{outline:2px solid var(--color-primary);border-color:transparent;}".to_string(),
            responsive: String::new(),
            dark_mode: String::new(),
        },
        template: Template {
            html: r#"<div class="wf-input"><label>{{label}}</label><input type="text" placeholder="{{placeholder}}"></div>"#.to_string(),
            js: String::new(),
        },
        meta: meta("form", &["field", "text"]),
    }
}

fn badge() -> ComponentDefinition {
    ComponentDefinition {
        id: "badge".to_string(),
        name: "Badge".to_string(),
        description: "Small status label".to_string(),
        props: vec![PropSpec::required("text", PropKind::String)],
        variants: vec![
            VariantSpec {
                name: "success".to_string(),
                prop_overrides: overrides(&[]),
                style: ".wf-badge{background:#16a34a;}".to_string(),
            },
            VariantSpec {
                name: "warning".to_string(),
                prop_overrides: overrides(&[]),
                style: ".wf-badge{background:var(--color-accent);}".to_string(),
            },
        ],
        styles: StyleSheet {
            base: ".wf-badge{display:inline-block;padding:2px var(--spacing-sm);border-radius:var(--radius-full);background:var(--color-secondary);color:#ffffff;font-family:var(--font-family);font-size:var(--font-size-xs);font-weight:var(--font-weight-semibold);}".to_string(),
            responsive: String::new(),
            dark_mode: String::new(),
        },
        template: Template {
            html: r#"<span class="wf-badge">{{text}}</span>"#.to_string(),
            js: String::new(),
        },
        meta: meta("display", &["status", "label"]),
    }
}

fn navbar() -> ComponentDefinition {
    ComponentDefinition {
        id: "navbar".to_string(),
        name: "Navbar".to_string(),
        description: "Top navigation bar with brand and links".to_string(),
        props: vec![
            PropSpec::required("brand", PropKind::String),
            PropSpec::optional(
                "links",
                PropKind::Object,
                PropValue::Json(serde_json::json!(["Home", "About"])),
            ),
        ],
        variants: vec![],
        styles: StyleSheet {
            base: ".wf-navbar{display:flex;align-items:center;justify-content:space-between;padding:var(--spacing-md) var(--spacing-lg);background:var(--color-background);border-bottom:1px solid var(--color-border);font-family:var(--font-family);}.wf-navbar .brand{font-size:var(--font-size-lg);font-weight:var(--font-weight-bold);color:var(--color-foreground);}.wf-navbar nav{display:flex;gap:var(--spacing-md);font-size:var(--font-size-sm);color:var(--color-secondary);}".to_string(),
            responsive: "@media (max-width:640px){.wf-navbar nav{display:none;}}".to_string(),
            dark_mode: String::new(),
        },
        template: Template {
            html: r#"<header class="wf-navbar"><span class="brand">{{brand}}</span><nav data-links="{{links}}"></nav></header>"#.to_string(),
            js: r#"(function(){var nav=document.querySelector('.wf-navbar nav');if(!nav)return;var links=[];try{links=JSON.parse(nav.getAttribute('data-links')||'[]')}catch(e){}links.forEach(function(l){var a=document.createElement('a');a.textContent=l;a.href='#';nav.appendChild(a)})})();"#.to_string(),
        },
        meta: meta("navigation", &["header", "menu"]),
    }
}

fn hero() -> ComponentDefinition {
    ComponentDefinition {
        id: "hero".to_string(),
        name: "Hero".to_string(),
        description: "Large heading section with call to action".to_string(),
        props: vec![
            PropSpec::required("heading", PropKind::String),
            PropSpec::optional(
                "subheading",
                PropKind::String,
                PropValue::String(String::new()),
            ),
            PropSpec::optional("cta", PropKind::String, PropValue::String("Get started".into())),
        ],
        variants: vec![VariantSpec {
            name: "centered".to_string(),
            prop_overrides: overrides(&[]),
            style: ".wf-hero{text-align:center;align-items:center;}".to_string(),
        }],
        styles: StyleSheet {
            base: ".wf-hero{display:flex;flex-direction:column;gap:var(--spacing-md);padding:var(--spacing-2xl) var(--spacing-lg);font-family:var(--font-family);}.wf-hero h1{margin:0;font-size:var(--font-size-3xl);line-height:var(--line-height-tight);color:var(--color-foreground);}.wf-hero p{margin:0;font-size:var(--font-size-lg);color:var(--color-secondary);}.wf-hero a{align-self:flex-start;padding:var(--spacing-sm) var(--spacing-lg);border-radius:var(--radius-md);background:var(--color-primary);color:#ffffff;text-decoration:none;font-weight:var(--font-weight-semibold);}".to_string(),
            responsive: "@media (max-width:640px){.wf-hero h1{font-size:var(--font-size-2xl);}}".to_string(),
            dark_mode: String::new(),
        },
        template: Template {
            html: r##"<section class="wf-hero"><h1>{{heading}}</h1><p>{{subheading}}</p><a href="#">{{cta}}</a></section>"##.to_string(),
            js: String::new(),
        },
        meta: meta("marketing", &["landing", "header"]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_registry_has_all_ids() {
        let reg = builtin_registry();
        for id in BUILTIN_COMPONENTS {
            assert!(reg.contains(id), "missing builtin '{}'", id);
        }
        assert_eq!(reg.len(), BUILTIN_COMPONENTS.len());
    }

    #[test]
    fn test_button_declares_required_children() {
        let reg = builtin_registry();
        let button = reg.get("button").unwrap();
        let children = button.prop("children").unwrap();
        assert!(children.required);
        assert!(button.variant("destructive").is_some());
    }
}
