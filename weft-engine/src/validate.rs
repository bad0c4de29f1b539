use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::OnceLock;

use crate::codegen::effective_props;
use crate::definition::{ComponentDefinition, PropKind, PropValue};
use crate::instance::LiveComponentInstance;
use crate::options::{ComponentInsertionOptions, Placement};
use crate::registry::ComponentRegistry;

/// Co-existing instances of one component id beyond which a warning fires.
const INSTANCE_COUNT_WARNING: usize = 5;

/// Outcome of validating an insertion request. Errors block the operation;
/// warnings and suggestions are advisory and never do.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationReport {
    pub is_valid: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    pub suggestions: Vec<String>,
}

impl ValidationReport {
    fn finish(mut self) -> Self {
        self.is_valid = self.errors.is_empty();
        self
    }
}

/// Validate an insertion request against the registry and the current live
/// map. Pure: never mutates state, callable repeatedly.
pub fn validate(
    registry: &ComponentRegistry,
    options: &ComponentInsertionOptions,
    live: &BTreeMap<String, LiveComponentInstance>,
) -> ValidationReport {
    let mut report = ValidationReport::default();

    let definition = match registry.get(&options.component_id) {
        Ok(d) => d,
        Err(_) => {
            report
                .errors
                .push(format!("Unknown component '{}'", options.component_id));
            return report.finish();
        }
    };

    validate_props(definition, options, &mut report);

    let existing = live
        .values()
        .filter(|i| i.component_id == options.component_id)
        .count();
    if existing >= INSTANCE_COUNT_WARNING {
        report.warnings.push(format!(
            "{} instances of '{}' already exist",
            existing, options.component_id
        ));
        report.suggestions.push(format!(
            "Consider grouping the '{}' instances to move them together",
            options.component_id
        ));
    }

    if let Some(p) = options.insertion_point {
        if p.x < 0.0 || p.y < 0.0 {
            report.warnings.push(format!(
                "Insertion point ({}, {}) is outside the visible canvas",
                p.x, p.y
            ));
        }
    }

    if options.placement == Placement::Cursor && options.insertion_point.is_none() {
        report
            .suggestions
            .push("Cursor placement without a pointer location falls back to append".to_string());
    }

    report.finish()
}

fn validate_props(
    definition: &ComponentDefinition,
    options: &ComponentInsertionOptions,
    report: &mut ValidationReport,
) {
    let effective = effective_props(definition, &options.props, options.variant.as_deref());

    for spec in &definition.props {
        let value = match effective.get(&spec.name) {
            Some(v) => v,
            None => {
                if spec.required {
                    report.errors.push(format!(
                        "Missing required prop '{}' for component '{}'",
                        spec.name, definition.id
                    ));
                }
                continue;
            }
        };

        if !value.matches_kind(spec.kind) {
            // A numeric string where a number is declared is advisory only.
            let coercible = spec.kind == PropKind::Number
                && value.as_str().is_some_and(|s| s.parse::<f64>().is_ok());
            if coercible {
                report.warnings.push(format!(
                    "Prop '{}' of '{}' is a numeric string; expected a number",
                    spec.name, definition.id
                ));
            } else {
                report.errors.push(format!(
                    "Prop '{}' of '{}' has the wrong type (expected {:?})",
                    spec.name, definition.id, spec.kind
                ));
                continue;
            }
        }

        if let Some(n) = coerced_number(value) {
            if let Some(min) = spec.min {
                if n < min {
                    report.errors.push(format!(
                        "Prop '{}' of '{}' is {} but the minimum is {}",
                        spec.name, definition.id, n, min
                    ));
                }
            }
            if let Some(max) = spec.max {
                if n > max {
                    report.errors.push(format!(
                        "Prop '{}' of '{}' is {} but the maximum is {}",
                        spec.name, definition.id, n, max
                    ));
                }
            }
        }

        if let Some(pattern) = &spec.pattern {
            match Regex::new(pattern) {
                Ok(re) => {
                    if !re.is_match(&value.render()) {
                        report.errors.push(format!(
                            "Prop '{}' of '{}' does not match pattern '{}'",
                            spec.name, definition.id, pattern
                        ));
                    }
                }
                Err(_) => {
                    report.errors.push(format!(
                        "Prop '{}' of '{}' declares an invalid pattern '{}'",
                        spec.name, definition.id, pattern
                    ));
                }
            }
        }

        if spec.kind == PropKind::Color {
            if let Some(s) = value.as_str() {
                if !is_css_color(s) {
                    report.warnings.push(format!(
                        "Prop '{}' of '{}' does not look like a CSS color: '{}'",
                        spec.name, definition.id, s
                    ));
                }
            }
        }
    }

    for name in options.props.keys() {
        if definition.prop(name).is_none() {
            report.warnings.push(format!(
                "Prop '{}' is not declared by component '{}'",
                name, definition.id
            ));
        }
    }
}

fn coerced_number(value: &PropValue) -> Option<f64> {
    value
        .as_number()
        .or_else(|| value.as_str().and_then(|s| s.parse::<f64>().ok()))
}

fn is_css_color(value: &str) -> bool {
    static HEX: OnceLock<Regex> = OnceLock::new();
    let hex = HEX.get_or_init(|| Regex::new(r"^#(?:[0-9a-fA-F]{3}|[0-9a-fA-F]{6})$").unwrap());
    hex.is_match(value)
        || value.starts_with("hsl(")
        || value.starts_with("rgb")
        || value.starts_with("var(--")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::builtin_registry;

    fn live() -> BTreeMap<String, LiveComponentInstance> {
        BTreeMap::new()
    }

    #[test]
    fn test_unknown_component_is_fatal() {
        let reg = builtin_registry();
        let report = validate(&reg, &ComponentInsertionOptions::new("mystery"), &live());
        assert!(!report.is_valid);
        assert_eq!(report.errors.len(), 1);
    }

    #[test]
    fn test_missing_required_prop_is_fatal() {
        let reg = builtin_registry();
        let report = validate(&reg, &ComponentInsertionOptions::new("button"), &live());
        assert!(!report.is_valid);
        assert!(report.errors[0].contains("children"));
    }

    #[test]
    fn test_pattern_violation_is_fatal() {
        let reg = builtin_registry();
        let options = ComponentInsertionOptions::new("button")
            .with_prop("children", PropValue::String("Go".into()))
            .with_prop("size", PropValue::String("gigantic".into()));
        let report = validate(&reg, &options, &live());
        assert!(!report.is_valid);
        assert!(report.errors[0].contains("pattern"));
    }

    #[test]
    fn test_numeric_string_is_advisory() {
        let mut reg = builtin_registry();
        let mut definition = reg.get("badge").unwrap().clone();
        definition
            .props
            .push(crate::definition::PropSpec::optional(
                "count",
                PropKind::Number,
                PropValue::Number(0.0),
            ));
        reg.register(definition);

        let options = ComponentInsertionOptions::new("badge")
            .with_prop("text", PropValue::String("New".into()))
            .with_prop("count", PropValue::String("3".into()));
        let report = validate(&reg, &options, &live());
        assert!(report.is_valid);
        assert_eq!(report.warnings.len(), 1);
    }

    #[test]
    fn test_negative_coordinates_warn() {
        let reg = builtin_registry();
        let options = ComponentInsertionOptions::new("button")
            .with_prop("children", PropValue::String("Go".into()))
            .at(-10.0, 5.0);
        let report = validate(&reg, &options, &live());
        assert!(report.is_valid);
        assert!(report.warnings[0].contains("visible canvas"));
    }

    #[test]
    fn test_crowding_warns_and_suggests() {
        let reg = builtin_registry();
        let mut map = live();
        for _ in 0..5 {
            let inst = LiveComponentInstance::new("button");
            map.insert(inst.instance_id.clone(), inst);
        }
        let options = ComponentInsertionOptions::new("button")
            .with_prop("children", PropValue::String("Go".into()));
        let report = validate(&reg, &options, &map);
        assert!(report.is_valid);
        assert!(!report.warnings.is_empty());
        assert!(!report.suggestions.is_empty());
    }

    #[test]
    fn test_validate_is_repeatable() {
        let reg = builtin_registry();
        let options = ComponentInsertionOptions::new("button")
            .with_prop("children", PropValue::String("Go".into()));
        let map = live();
        let a = validate(&reg, &options, &map);
        let b = validate(&reg, &options, &map);
        assert_eq!(a, b);
        assert!(a.is_valid);
    }
}
