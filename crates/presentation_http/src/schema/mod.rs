//! Schema-driven request validation
//!
//! Validation contracts are data, not code: a [`Schema`] is a tree of typed
//! nodes interpreted by one recursive validator. Applying a schema to
//! conforming input yields a normalized value with every declared default
//! filled in and every declared coercion applied; non-conforming input
//! yields every violation found, each located by a dotted/indexed path
//! (`articles[0].title`).
//!
//! Input sourced from query strings or path parameters is string-typed, so
//! numeric and boolean fields are coerced before bounds-checking when
//! validated with [`Coerce::Strings`]. JSON bodies are validated with
//! [`Coerce::Json`], where a string `"25"` for a numeric field is a type
//! error.
//!
//! The named contract catalog lives in [`catalog`].

pub mod catalog;

use chrono::DateTime;
use regex::Regex;
use serde_json::{Map, Value};
use validator::ValidateEmail;

/// One schema violation, located by a dotted/indexed field path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    /// Path to the offending field, e.g. `articles[0].title`
    pub path: String,
    /// Human-readable description of the violation
    pub message: String,
}

/// How to treat string-typed input for non-string fields
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Coerce {
    /// Input is arbitrary JSON (request bodies); no string coercion
    Json,
    /// Input is string-valued (query strings, path parameters); numeric and
    /// boolean fields are parsed from strings before bounds-checking
    Strings,
}

/// A regex constraint on a string field
#[derive(Debug, Clone)]
pub struct Pattern {
    regex: Regex,
    description: &'static str,
}

impl Pattern {
    /// Compile a pattern constraint
    ///
    /// `description` completes the sentence "must ...", e.g.
    /// "be a valid UPI address".
    // Patterns are authored alongside the catalog; a bad one is a
    // programming error caught by the catalog tests.
    #[allow(clippy::expect_used)]
    pub fn new(regex: &str, description: &'static str) -> Self {
        Self {
            regex: Regex::new(regex).expect("invalid schema pattern"),
            description,
        }
    }
}

/// A named field inside an object schema
#[derive(Debug, Clone)]
pub struct Field {
    name: &'static str,
    schema: Schema,
    required: bool,
    default: Option<Value>,
}

impl Field {
    /// A field that must be present
    pub fn required(name: &'static str, schema: Schema) -> Self {
        Self {
            name,
            schema,
            required: true,
            default: None,
        }
    }

    /// A field that may be absent
    pub fn optional(name: &'static str, schema: Schema) -> Self {
        Self {
            name,
            schema,
            required: false,
            default: None,
        }
    }

    /// An optional field populated with `default` when absent
    pub fn with_default(name: &'static str, schema: Schema, default: Value) -> Self {
        Self {
            name,
            schema,
            required: false,
            default: Some(default),
        }
    }
}

/// A validation contract over a value shape
///
/// Built once (the catalog holds them in `LazyLock` statics) and immutable
/// thereafter. Validation itself is a pure function over the input.
#[derive(Debug, Clone)]
pub enum Schema {
    /// A JSON object with declared fields
    Object {
        fields: Vec<Field>,
        /// When true, undeclared fields are violations instead of ignored
        strict: bool,
    },
    /// A homogeneous array
    Array {
        item: Box<Schema>,
        min_items: Option<usize>,
        max_items: Option<usize>,
    },
    /// A string with optional length/pattern bounds
    String {
        min_len: Option<usize>,
        max_len: Option<usize>,
        pattern: Option<Pattern>,
    },
    /// A number with optional bounds; `integer` additionally rejects fractions
    Number {
        min: Option<f64>,
        max: Option<f64>,
        gt: Option<f64>,
        integer: bool,
    },
    /// A boolean
    Bool,
    /// A closed set of string variants
    Enum { variants: Vec<&'static str> },
    /// An RFC 5322 e-mail address
    Email,
    /// An RFC 3339 / ISO 8601 datetime string
    DateTime,
}

impl Schema {
    /// An object accepting (and ignoring) undeclared fields
    pub fn object(fields: Vec<Field>) -> Self {
        Self::Object {
            fields,
            strict: false,
        }
    }

    /// An object rejecting undeclared fields
    pub fn strict_object(fields: Vec<Field>) -> Self {
        Self::Object {
            fields,
            strict: true,
        }
    }

    /// An array of `item`
    pub fn array(item: Self) -> Self {
        Self::Array {
            item: Box::new(item),
            min_items: None,
            max_items: None,
        }
    }

    /// An unconstrained string
    pub fn string() -> Self {
        Self::String {
            min_len: None,
            max_len: None,
            pattern: None,
        }
    }

    /// An unconstrained number
    pub fn number() -> Self {
        Self::Number {
            min: None,
            max: None,
            gt: None,
            integer: false,
        }
    }

    /// A whole number
    pub fn integer() -> Self {
        Self::Number {
            min: None,
            max: None,
            gt: None,
            integer: true,
        }
    }

    /// A boolean
    pub fn boolean() -> Self {
        Self::Bool
    }

    /// One of a closed set of string variants
    pub fn one_of(variants: &[&'static str]) -> Self {
        Self::Enum {
            variants: variants.to_vec(),
        }
    }

    /// An e-mail address
    pub fn email() -> Self {
        Self::Email
    }

    /// An ISO 8601 datetime string
    pub fn datetime() -> Self {
        Self::DateTime
    }

    /// Set the minimum string length (string schemas only)
    #[must_use]
    pub fn min_len(mut self, n: usize) -> Self {
        if let Self::String { min_len, .. } = &mut self {
            *min_len = Some(n);
        }
        self
    }

    /// Set the maximum string length (string schemas only)
    #[must_use]
    pub fn max_len(mut self, n: usize) -> Self {
        if let Self::String { max_len, .. } = &mut self {
            *max_len = Some(n);
        }
        self
    }

    /// Constrain a string schema to a pattern
    #[must_use]
    pub fn matching(mut self, p: Pattern) -> Self {
        if let Self::String { pattern, .. } = &mut self {
            *pattern = Some(p);
        }
        self
    }

    /// Set the inclusive minimum (number schemas only)
    #[must_use]
    pub fn min(mut self, value: f64) -> Self {
        if let Self::Number { min, .. } = &mut self {
            *min = Some(value);
        }
        self
    }

    /// Set the inclusive maximum (number schemas only)
    #[must_use]
    pub fn max(mut self, value: f64) -> Self {
        if let Self::Number { max, .. } = &mut self {
            *max = Some(value);
        }
        self
    }

    /// Require the number to be strictly greater than `value`
    #[must_use]
    pub fn greater_than(mut self, value: f64) -> Self {
        if let Self::Number { gt, .. } = &mut self {
            *gt = Some(value);
        }
        self
    }

    /// Set the minimum element count (array schemas only)
    #[must_use]
    pub fn min_items(mut self, n: usize) -> Self {
        if let Self::Array { min_items, .. } = &mut self {
            *min_items = Some(n);
        }
        self
    }

    /// Set the maximum element count (array schemas only)
    #[must_use]
    pub fn max_items(mut self, n: usize) -> Self {
        if let Self::Array { max_items, .. } = &mut self {
            *max_items = Some(n);
        }
        self
    }

    /// Apply the schema to a value
    ///
    /// Returns the normalized value (defaults filled, coercions applied,
    /// undeclared fields dropped) or every violation found. Pure: neither
    /// the schema nor the input is mutated.
    pub fn validate(&self, value: &Value, coerce: Coerce) -> Result<Value, Vec<FieldError>> {
        let mut errors = Vec::new();
        let normalized = self.check(value, "", coerce, &mut errors);
        if errors.is_empty() {
            Ok(normalized)
        } else {
            Err(errors)
        }
    }

    fn check(&self, value: &Value, path: &str, coerce: Coerce, errors: &mut Vec<FieldError>) -> Value {
        match self {
            Self::Object { fields, strict } => {
                check_object(fields, *strict, value, path, coerce, errors)
            },
            Self::Array {
                item,
                min_items,
                max_items,
            } => check_array(item, *min_items, *max_items, value, path, coerce, errors),
            Self::String {
                min_len,
                max_len,
                pattern,
            } => check_string(*min_len, *max_len, pattern.as_ref(), value, path, errors),
            Self::Number {
                min,
                max,
                gt,
                integer,
            } => check_number(*min, *max, *gt, *integer, value, path, coerce, errors),
            Self::Bool => check_bool(value, path, coerce, errors),
            Self::Enum { variants } => check_enum(variants, value, path, errors),
            Self::Email => check_email(value, path, errors),
            Self::DateTime => check_datetime(value, path, errors),
        }
    }
}

fn push(errors: &mut Vec<FieldError>, path: &str, message: impl Into<String>) {
    errors.push(FieldError {
        path: path.to_string(),
        message: message.into(),
    });
}

fn join(path: &str, name: &str) -> String {
    if path.is_empty() {
        name.to_string()
    } else {
        format!("{path}.{name}")
    }
}

fn check_object(
    fields: &[Field],
    strict: bool,
    value: &Value,
    path: &str,
    coerce: Coerce,
    errors: &mut Vec<FieldError>,
) -> Value {
    let Some(map) = value.as_object() else {
        push(errors, path, "must be an object");
        return Value::Null;
    };

    let mut out = Map::new();
    for field in fields {
        let field_path = join(path, field.name);
        match map.get(field.name) {
            None | Some(Value::Null) => {
                if let Some(default) = &field.default {
                    out.insert(field.name.to_string(), default.clone());
                } else if field.required {
                    push(errors, &field_path, "is required");
                }
            },
            Some(present) => {
                let normalized = field.schema.check(present, &field_path, coerce, errors);
                out.insert(field.name.to_string(), normalized);
            },
        }
    }

    if strict {
        for key in map.keys() {
            if !fields.iter().any(|f| f.name == key) {
                push(errors, &join(path, key), "is not an allowed field");
            }
        }
    }

    Value::Object(out)
}

fn check_array(
    item: &Schema,
    min_items: Option<usize>,
    max_items: Option<usize>,
    value: &Value,
    path: &str,
    coerce: Coerce,
    errors: &mut Vec<FieldError>,
) -> Value {
    let Some(items) = value.as_array() else {
        push(errors, path, "must be an array");
        return Value::Null;
    };

    if let Some(min) = min_items {
        if items.len() < min {
            let noun = if min == 1 { "item" } else { "items" };
            push(errors, path, format!("must contain at least {min} {noun}"));
        }
    }
    if let Some(max) = max_items {
        if items.len() > max {
            push(errors, path, format!("must contain at most {max} items"));
        }
    }

    let normalized = items
        .iter()
        .enumerate()
        .map(|(i, element)| item.check(element, &format!("{path}[{i}]"), coerce, errors))
        .collect();
    Value::Array(normalized)
}

fn check_string(
    min_len: Option<usize>,
    max_len: Option<usize>,
    pattern: Option<&Pattern>,
    value: &Value,
    path: &str,
    errors: &mut Vec<FieldError>,
) -> Value {
    let Some(s) = value.as_str() else {
        push(errors, path, "must be a string");
        return Value::Null;
    };

    let chars = s.chars().count();
    if let Some(min) = min_len {
        if chars < min {
            let noun = if min == 1 { "character" } else { "characters" };
            push(errors, path, format!("must be at least {min} {noun}"));
        }
    }
    if let Some(max) = max_len {
        if chars > max {
            push(errors, path, format!("must be at most {max} characters"));
        }
    }
    if let Some(p) = pattern {
        if !p.regex.is_match(s) {
            push(errors, path, format!("must {}", p.description));
        }
    }

    Value::String(s.to_string())
}

// The f64 -> i64 cast is exact here: the fraction is checked to be zero
#[allow(clippy::too_many_arguments, clippy::cast_possible_truncation)]
fn check_number(
    min: Option<f64>,
    max: Option<f64>,
    gt: Option<f64>,
    integer: bool,
    value: &Value,
    path: &str,
    coerce: Coerce,
    errors: &mut Vec<FieldError>,
) -> Value {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) if coerce == Coerce::Strings => s.trim().parse::<f64>().ok(),
        _ => None,
    };

    let type_name = if integer { "an integer" } else { "a number" };
    let Some(n) = parsed else {
        push(errors, path, format!("must be {type_name}"));
        return Value::Null;
    };

    if integer && n.fract() != 0.0 {
        push(errors, path, "must be an integer");
        return Value::Null;
    }

    if let Some(bound) = gt {
        if n <= bound {
            push(errors, path, format!("must be greater than {bound}"));
        }
    }
    if let Some(bound) = min {
        if n < bound {
            push(errors, path, format!("must be at least {bound}"));
        }
    }
    if let Some(bound) = max {
        if n > bound {
            push(errors, path, format!("must be at most {bound}"));
        }
    }

    if integer {
        Value::from(n as i64)
    } else {
        serde_json::Number::from_f64(n).map_or(Value::Null, Value::Number)
    }
}

fn check_bool(value: &Value, path: &str, coerce: Coerce, errors: &mut Vec<FieldError>) -> Value {
    match value {
        Value::Bool(b) => Value::Bool(*b),
        Value::String(s) if coerce == Coerce::Strings && s == "true" => Value::Bool(true),
        Value::String(s) if coerce == Coerce::Strings && s == "false" => Value::Bool(false),
        _ => {
            push(errors, path, "must be a boolean");
            Value::Null
        },
    }
}

fn check_enum(
    variants: &[&'static str],
    value: &Value,
    path: &str,
    errors: &mut Vec<FieldError>,
) -> Value {
    if let Some(s) = value.as_str() {
        if variants.iter().any(|v| *v == s) {
            return Value::String(s.to_string());
        }
    }
    push(
        errors,
        path,
        format!("must be one of: {}", variants.join(", ")),
    );
    Value::Null
}

fn check_email(value: &Value, path: &str, errors: &mut Vec<FieldError>) -> Value {
    match value.as_str() {
        Some(s) if s.validate_email() => Value::String(s.to_string()),
        _ => {
            push(errors, path, "must be a valid email address");
            Value::Null
        },
    }
}

fn check_datetime(value: &Value, path: &str, errors: &mut Vec<FieldError>) -> Value {
    match value.as_str() {
        Some(s) if DateTime::parse_from_rfc3339(s).is_ok() => Value::String(s.to_string()),
        _ => {
            push(errors, path, "must be a valid ISO 8601 datetime");
            Value::Null
        },
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use serde_json::json;

    use super::*;

    fn pagination_like() -> Schema {
        Schema::object(vec![
            Field::with_default("page", Schema::integer().min(1.0), json!(1)),
            Field::with_default("limit", Schema::integer().min(1.0).max(100.0), json!(10)),
        ])
    }

    #[test]
    fn defaults_fill_absent_fields() {
        let normalized = pagination_like().validate(&json!({}), Coerce::Strings).unwrap();
        assert_eq!(normalized, json!({"page": 1, "limit": 10}));
    }

    #[test]
    fn present_input_overrides_defaults() {
        let normalized = pagination_like()
            .validate(&json!({"page": "3"}), Coerce::Strings)
            .unwrap();
        assert_eq!(normalized, json!({"page": 3, "limit": 10}));
    }

    #[test]
    fn string_coercion_applies_before_bounds() {
        let schema = Schema::object(vec![Field::required(
            "limit",
            Schema::integer().min(1.0).max(100.0),
        )]);

        let err = schema
            .validate(&json!({"limit": "250"}), Coerce::Strings)
            .unwrap_err();
        assert_eq!(err.len(), 1);
        assert_eq!(err[0].path, "limit");
        assert_eq!(err[0].message, "must be at most 100");
    }

    #[test]
    fn json_mode_rejects_stringified_numbers() {
        let schema = Schema::object(vec![Field::required("amount", Schema::number())]);
        let err = schema
            .validate(&json!({"amount": "25"}), Coerce::Json)
            .unwrap_err();
        assert_eq!(err[0].message, "must be a number");
    }

    #[test]
    fn coercion_is_idempotent() {
        let schema = pagination_like();
        let first = schema
            .validate(&json!({"page": "25", "limit": "50"}), Coerce::Strings)
            .unwrap();
        let second = schema.validate(&first, Coerce::Strings).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn every_violation_is_reported() {
        let schema = Schema::object(vec![
            Field::required("email", Schema::email()),
            Field::required("password", Schema::string().min_len(8)),
            Field::required("fullName", Schema::string().min_len(2)),
        ]);

        let err = schema
            .validate(
                &json!({"email": "invalid-email", "password": "short", "fullName": "J"}),
                Coerce::Json,
            )
            .unwrap_err();

        assert_eq!(err.len(), 3);
        // Errors preserve field declaration order
        assert_eq!(err[0].path, "email");
        assert_eq!(err[1].path, "password");
        assert_eq!(err[2].path, "fullName");
    }

    #[test]
    fn nested_array_paths_use_indices() {
        let schema = Schema::object(vec![Field::required(
            "articles",
            Schema::array(Schema::object(vec![
                Field::required("title", Schema::string().min_len(3)),
                Field::required("content", Schema::string().min_len(6)),
            ]))
            .min_items(1),
        )]);

        let err = schema
            .validate(
                &json!({"articles": [{"title": "ok title", "content": "long enough"}, {"title": "x"}]}),
                Coerce::Json,
            )
            .unwrap_err();

        assert_eq!(err.len(), 2);
        assert_eq!(err[0].path, "articles[1].title");
        assert_eq!(err[1].path, "articles[1].content");
        assert_eq!(err[1].message, "is required");
    }

    #[test]
    fn empty_array_violates_min_items() {
        let schema = Schema::object(vec![Field::required(
            "articles",
            Schema::array(Schema::string()).min_items(1),
        )]);

        let err = schema
            .validate(&json!({"articles": []}), Coerce::Json)
            .unwrap_err();
        assert_eq!(err.len(), 1);
        assert_eq!(err[0].path, "articles");
        assert_eq!(err[0].message, "must contain at least 1 item");
    }

    #[test]
    fn unknown_fields_are_dropped_when_not_strict() {
        let schema = Schema::object(vec![Field::required("name", Schema::string())]);
        let normalized = schema
            .validate(&json!({"name": "a", "extra": 1}), Coerce::Json)
            .unwrap();
        assert_eq!(normalized, json!({"name": "a"}));
    }

    #[test]
    fn strict_object_rejects_unknown_fields() {
        let schema = Schema::strict_object(vec![Field::required("name", Schema::string())]);
        let err = schema
            .validate(&json!({"name": "a", "extra": 1}), Coerce::Json)
            .unwrap_err();
        assert_eq!(err[0].path, "extra");
        assert_eq!(err[0].message, "is not an allowed field");
    }

    #[test]
    fn enum_rejects_unknown_variants() {
        let schema = Schema::object(vec![Field::with_default(
            "type",
            Schema::one_of(&["news", "social"]),
            json!("news"),
        )]);

        let err = schema
            .validate(&json!({"type": "gossip"}), Coerce::Json)
            .unwrap_err();
        assert_eq!(err[0].message, "must be one of: news, social");

        let normalized = schema.validate(&json!({}), Coerce::Json).unwrap();
        assert_eq!(normalized, json!({"type": "news"}));
    }

    #[test]
    fn boolean_coerces_from_strings_only_in_string_mode() {
        let schema = Schema::object(vec![Field::required("flag", Schema::boolean())]);

        let normalized = schema
            .validate(&json!({"flag": "true"}), Coerce::Strings)
            .unwrap();
        assert_eq!(normalized, json!({"flag": true}));

        assert!(schema.validate(&json!({"flag": "true"}), Coerce::Json).is_err());
        assert!(schema.validate(&json!({"flag": "yes"}), Coerce::Strings).is_err());
    }

    #[test]
    fn datetime_accepts_rfc3339_only() {
        let schema = Schema::object(vec![Field::optional("from", Schema::datetime())]);

        assert!(
            schema
                .validate(&json!({"from": "2026-01-15T09:30:00Z"}), Coerce::Strings)
                .is_ok()
        );
        let err = schema
            .validate(&json!({"from": "yesterday"}), Coerce::Strings)
            .unwrap_err();
        assert_eq!(err[0].message, "must be a valid ISO 8601 datetime");
    }

    #[test]
    fn pattern_violation_reads_naturally() {
        let schema = Schema::object(vec![Field::required(
            "vpa",
            Schema::string().matching(Pattern::new(
                r"^[A-Za-z0-9._-]{2,256}@[A-Za-z]{2,64}$",
                "be a valid UPI address",
            )),
        )]);

        let err = schema
            .validate(&json!({"vpa": "no-handle"}), Coerce::Json)
            .unwrap_err();
        assert_eq!(err[0].message, "must be a valid UPI address");
    }

    #[test]
    fn non_object_input_is_a_single_violation() {
        let schema = Schema::object(vec![Field::required("name", Schema::string())]);
        let err = schema.validate(&json!([1, 2]), Coerce::Json).unwrap_err();
        assert_eq!(err.len(), 1);
        assert_eq!(err[0].message, "must be an object");
    }

    #[test]
    fn null_field_with_default_takes_default() {
        let normalized = pagination_like()
            .validate(&json!({"page": null}), Coerce::Json)
            .unwrap();
        assert_eq!(normalized, json!({"page": 1, "limit": 10}));
    }

    #[test]
    fn greater_than_bound_is_strict() {
        let schema = Schema::object(vec![Field::required(
            "amount",
            Schema::number().greater_than(0.0),
        )]);

        assert!(schema.validate(&json!({"amount": 0.01}), Coerce::Json).is_ok());
        let err = schema
            .validate(&json!({"amount": 0}), Coerce::Json)
            .unwrap_err();
        assert_eq!(err[0].message, "must be greater than 0");
    }

    proptest! {
        #[test]
        fn numeric_string_coercion_is_idempotent(n in -1_000_000i64..1_000_000i64) {
            let schema = Schema::object(vec![Field::required("n", Schema::integer())]);
            let first = schema
                .validate(&json!({"n": n.to_string()}), Coerce::Strings)
                .unwrap();
            let second = schema.validate(&first, Coerce::Strings).unwrap();
            prop_assert_eq!(first.clone(), second);
            prop_assert_eq!(first, json!({"n": n}));
        }
    }
}
