//! Sandbox document assembly.
//!
//! Builds the complete HTML document the renderer executes: resolved
//! token CSS, the user's CSS, the user's HTML, the projected live
//! instances, the interaction runtime, and finally the user's own script.
//! The document is a disposable projection; the authoritative state stays
//! on the host side.

use std::fmt::Write;

use serde::{Deserialize, Serialize};

use weft_engine::{escape_html, script_id, style_id, DesignTokenSet, LiveInstanceMap, MARKER_CLASS};

use crate::runtime::{interaction_runtime, RuntimeOptions, RUNTIME_STYLES};

/// Base document styles; everything else comes from tokens and user CSS.
pub const BASE_STYLES: &str =
    "html,body{margin:0;min-height:100vh;background:var(--color-background);\
color:var(--color-foreground);font-family:var(--font-family);}\
*{box-sizing:border-box;}";

/// The user-authored document triple.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DocumentSource {
    pub title: String,
    pub html: String,
    pub css: String,
    pub js: String,
}

impl DocumentSource {
    pub fn new(html: &str, css: &str, js: &str) -> Self {
        DocumentSource {
            title: "Preview".to_string(),
            html: html.to_string(),
            css: css.to_string(),
            js: js.to_string(),
        }
    }
}

/// Assemble the full sandbox document for one renderer identity.
pub fn build_document(
    source: &DocumentSource,
    tokens: &DesignTokenSet,
    live: &LiveInstanceMap,
    sender: &str,
    options: &RuntimeOptions,
) -> String {
    let token_css = tokens.root_css();
    let base_css = tokens.apply(BASE_STYLES);
    let runtime = interaction_runtime(sender, options);

    let mut instances_html = String::new();
    let mut instances_css = String::new();
    let mut instances_js = String::new();
    // BTreeMap iteration gives a stable id order; z-order is per-wrapper
    // inline style, so emission order only matters for determinism.
    for instance in live.values() {
        let mut wrapper_style = String::new();
        if let Some(p) = instance.position {
            let _ = write!(wrapper_style, "position:absolute;left:{}px;top:{}px;", p.x, p.y);
        }
        if let Some(z) = instance.z_index {
            let _ = write!(wrapper_style, "z-index:{};", z);
        }
        if !instance.visible {
            wrapper_style.push_str("display:none;");
        }

        let _ = write!(
            instances_html,
            r#"<div id="{id}" class="{marker}" data-weft-instance="{id}" data-weft-locked="{locked}""#,
            id = escape_html(&instance.instance_id),
            marker = MARKER_CLASS,
            locked = instance.locked,
        );
        if wrapper_style.is_empty() {
            instances_html.push('>');
        } else {
            let _ = write!(instances_html, r#" style="{}">"#, wrapper_style);
        }
        instances_html.push_str(&instance.code.html);
        instances_html.push_str("</div>");

        if !instance.code.css.is_empty() {
            let _ = write!(
                instances_css,
                r#"<style id="{}">{}</style>"#,
                style_id(&instance.instance_id),
                instance.code.css
            );
        }
        if !instance.code.js.is_empty() {
            let _ = write!(
                instances_js,
                r#"<script id="{}">{}</script>"#,
                script_id(&instance.instance_id),
                instance.code.js
            );
        }
    }

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="UTF-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{title}</title>
<style id="weft-tokens">{token_css}</style>
<style id="weft-base">{base_css}</style>
<style id="weft-runtime-styles">{runtime_styles}</style>
<style id="weft-user">{user_css}</style>
{instances_css}
</head>
<body>
{user_html}
{instances_html}
<script id="weft-runtime">{runtime}</script>
{instances_js}
<script id="weft-user-script">{user_js}</script>
</body>
</html>
"#,
        title = escape_html(&source.title),
        token_css = token_css,
        base_css = base_css,
        runtime_styles = RUNTIME_STYLES,
        user_css = source.css,
        instances_css = instances_css,
        user_html = source.html,
        instances_html = instances_html,
        runtime = runtime,
        instances_js = instances_js,
        user_js = source.js,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use weft_engine::{
        builtin_registry, ComponentInsertionOptions, InsertionEngine, PropValue,
    };

    #[test]
    fn test_document_embeds_sections_in_order() {
        let source = DocumentSource::new("<main>hello</main>", ".x{color:red}", "console.log(1)");
        let tokens = DesignTokenSet::default();
        let doc = build_document(
            &source,
            &tokens,
            &LiveInstanceMap::new(),
            "renderer-1",
            &RuntimeOptions::default(),
        );

        let tokens_at = doc.find("weft-tokens").unwrap();
        let user_css_at = doc.find(".x{color:red}").unwrap();
        let html_at = doc.find("<main>hello</main>").unwrap();
        let runtime_at = doc.find("var SENDER='renderer-1'").unwrap();
        let user_js_at = doc.find("console.log(1)").unwrap();

        assert!(tokens_at < user_css_at);
        assert!(user_css_at < html_at);
        assert!(html_at < runtime_at);
        assert!(runtime_at < user_js_at);
    }

    #[test]
    fn test_document_projects_live_instances() {
        let mut engine = InsertionEngine::new(builtin_registry());
        let tokens = DesignTokenSet::default();
        let mut live = LiveInstanceMap::new();
        let inserted = engine
            .insert(
                &ComponentInsertionOptions::new("button")
                    .with_prop("children", PropValue::String("Hi".into()))
                    .at(30.0, 40.0),
                &tokens,
                &mut live,
            )
            .unwrap();

        let doc = build_document(
            &DocumentSource::default(),
            &tokens,
            &live,
            "r",
            &RuntimeOptions::default(),
        );
        assert!(doc.contains(&format!("data-weft-instance=\"{}\"", inserted.instance_id)));
        assert!(doc.contains("left:30px;top:40px;"));
        assert!(doc.contains(&format!("style-{}", inserted.instance_id)));
    }

    #[test]
    fn test_base_styles_resolve_tokens() {
        let doc = build_document(
            &DocumentSource::default(),
            &DesignTokenSet::default(),
            &LiveInstanceMap::new(),
            "r",
            &RuntimeOptions::default(),
        );
        assert!(doc.contains("background:#ffffff"));
    }
}
