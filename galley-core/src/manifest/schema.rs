//! Structural checks over the raw manifest JSON.
//!
//! Each violation becomes one message prefixed with its field path, e.g.
//! `variant.fields[1].type: expected string`.

use serde_json::{Map, Value};

#[derive(Clone, Copy)]
enum Kind {
    String,
    Number,
    Bool,
    Object,
    List(&'static [Rule]),
    Record(&'static [Rule]),
}

impl Kind {
    fn describe(&self) -> &'static str {
        match self {
            Kind::String => "string",
            Kind::Number => "number",
            Kind::Bool => "boolean",
            Kind::Object | Kind::Record(_) => "object",
            Kind::List(_) => "array",
        }
    }
}

struct Rule {
    field: &'static str,
    kind: Kind,
    required: bool,
}

const fn required(field: &'static str, kind: Kind) -> Rule {
    Rule {
        field,
        kind,
        required: true,
    }
}

const fn optional(field: &'static str, kind: Kind) -> Rule {
    Rule {
        field,
        kind,
        required: false,
    }
}

const METADATA: &[Rule] = &[
    required("name", Kind::String),
    optional("description", Kind::String),
    optional("version", Kind::String),
    optional("type", Kind::String),
];

const FONT: &[Rule] = &[required("name", Kind::String), optional("weight", Kind::String)];

const COLORS: &[Rule] = &[
    optional("body_color", Kind::String),
    optional("primary_color", Kind::String),
    optional("secondary_color", Kind::String),
    optional("heading_color", Kind::String),
];

const THEME: &[Rule] = &[
    required("name", Kind::String),
    optional("fonts", Kind::List(FONT)),
    optional("colors", Kind::Record(COLORS)),
    optional("typescale", Kind::Object),
];

const LAYOUT: &[Rule] = &[
    required("name", Kind::String),
    required("slug", Kind::String),
    optional("description", Kind::String),
    optional("engine", Kind::String),
    optional("width", Kind::Number),
    optional("height", Kind::Number),
    optional("unit", Kind::String),
    optional("margin", Kind::Object),
];

const FLOW: &[Rule] = &[required("name", Kind::String), optional("controlled", Kind::Bool)];

const FRAME: &[Rule] = &[
    required("name", Kind::String),
    optional("description", Kind::String),
    optional("type", Kind::String),
];

const FIELD: &[Rule] = &[
    required("name", Kind::String),
    required("type", Kind::String),
    optional("required", Kind::Bool),
    optional("description", Kind::String),
];

const VARIANT: &[Rule] = &[
    required("name", Kind::String),
    required("prefix", Kind::String),
    optional("description", Kind::String),
    optional("color", Kind::String),
    optional("fields", Kind::List(FIELD)),
];

const DATA_TEMPLATE: &[Rule] = &[
    required("title", Kind::String),
    optional("title_template", Kind::String),
];

const SECTIONS: &[Rule] = &[
    optional("metadata", Kind::Record(METADATA)),
    optional("theme", Kind::Record(THEME)),
    optional("layout", Kind::Record(LAYOUT)),
    optional("flow", Kind::Record(FLOW)),
    optional("frame", Kind::Record(FRAME)),
    optional("variant", Kind::Record(VARIANT)),
    optional("data_template", Kind::Record(DATA_TEMPLATE)),
];

const FRAME_TYPES: &[&str] = &["latex", "typst"];

/// Every schema violation in `manifest`, in document order.
pub fn check(manifest: &Value) -> Vec<String> {
    let mut messages = Vec::new();
    match manifest.as_object() {
        Some(object) => check_record(object, SECTIONS, "", &mut messages),
        None => messages.push("manifest: expected object".to_string()),
    }

    if let Some(frame_type) = manifest.pointer("/frame/type").and_then(Value::as_str) {
        if !FRAME_TYPES.contains(&frame_type) {
            messages.push(format!(
                "frame.type: expected one of {}, got '{}'",
                FRAME_TYPES.join(", "),
                frame_type
            ));
        }
    }
    messages
}

fn check_record(object: &Map<String, Value>, rules: &[Rule], path: &str, messages: &mut Vec<String>) {
    for rule in rules {
        let field_path = if path.is_empty() {
            rule.field.to_string()
        } else {
            format!("{}.{}", path, rule.field)
        };
        match object.get(rule.field) {
            None | Some(Value::Null) => {
                if rule.required {
                    messages.push(format!("{}: is required", field_path));
                }
            }
            Some(value) => check_value(value, rule.kind, &field_path, messages),
        }
    }
}

fn check_value(value: &Value, kind: Kind, path: &str, messages: &mut Vec<String>) {
    let matches = match kind {
        Kind::String => value.is_string(),
        Kind::Number => value.is_number(),
        Kind::Bool => value.is_boolean(),
        Kind::Object => value.is_object(),
        Kind::Record(rules) => match value.as_object() {
            Some(object) => {
                check_record(object, rules, path, messages);
                true
            }
            None => false,
        },
        Kind::List(rules) => match value.as_array() {
            Some(items) => {
                for (index, item) in items.iter().enumerate() {
                    let item_path = format!("{}[{}]", path, index);
                    match item.as_object() {
                        Some(object) => check_record(object, rules, &item_path, messages),
                        None => messages.push(format!("{}: expected object", item_path)),
                    }
                }
                true
            }
            None => false,
        },
    };
    if !matches {
        messages.push(format!("{}: expected {}", path, kind.describe()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn valid_manifest_has_no_messages() {
        let manifest = json!({
            "theme": { "name": "Corporate", "fonts": [{ "name": "theme/Inter-Regular.ttf" }] },
            "layout": { "name": "A4", "slug": "a4", "width": 210 },
            "flow": { "name": "Review", "controlled": true },
            "variant": { "name": "Report", "prefix": "RPT", "fields": [{ "name": "Author", "type": "string" }] }
        });
        assert!(check(&manifest).is_empty());
    }

    #[test]
    fn collects_every_violation_with_paths() {
        let manifest = json!({
            "theme": { "name": 7 },
            "layout": { "name": "A4" },
            "variant": {
                "name": "Report",
                "prefix": "RPT",
                "fields": [{ "name": "Author", "type": "string" }, { "name": "Due", "type": 3 }, "bad"]
            }
        });
        assert_eq!(
            check(&manifest),
            vec![
                "theme.name: expected string",
                "layout.slug: is required",
                "variant.fields[1].type: expected string",
                "variant.fields[2]: expected object",
            ]
        );
    }

    #[test]
    fn non_object_manifest_and_sections() {
        assert_eq!(check(&json!([1, 2])), vec!["manifest: expected object"]);
        assert_eq!(check(&json!({ "flow": "Review" })), vec!["flow: expected object"]);
    }

    #[test]
    fn rejects_unknown_frame_type() {
        let messages = check(&json!({ "frame": { "name": "F", "type": "groff" } }));
        assert_eq!(
            messages,
            vec!["frame.type: expected one of latex, typst, got 'groff'"]
        );
    }
}
