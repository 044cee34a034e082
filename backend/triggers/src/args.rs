/// Command argument tokenizing and option-schema validation.
///
/// `tokenize_args` splits on spaces outside quotes. When a command declares an
/// option schema the tokens are then matched against it: `--key value`,
/// `--key=value`, `-k value` for aliases, grouped boolean shorts `-abc`,
/// `--no-flag`, and `--` to stop option parsing.
use std::collections::BTreeMap;

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Declared options of a command, in declaration order.
pub type OptionSchema = IndexMap<String, OptionSpec>;

// ---------------------------------------------------------------------------
// Schema
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OptionType {
    #[default]
    String,
    Number,
    Boolean,
    Array,
}

/// Declarative spec for one named option.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptionSpec {
    #[serde(rename = "type", default)]
    pub kind: OptionType,
    #[serde(default, deserialize_with = "one_or_many")]
    pub alias: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, alias = "demandOption")]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<ArgValue>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub choices: Vec<String>,
}

fn one_or_many<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(String),
        Many(Vec<String>),
    }

    Ok(match OneOrMany::deserialize(deserializer)? {
        OneOrMany::One(alias) => vec![alias],
        OneOrMany::Many(aliases) => aliases,
    })
}

impl OptionSpec {
    pub fn of(kind: OptionType) -> Self {
        Self { kind, ..Default::default() }
    }

    pub fn string() -> Self {
        Self::of(OptionType::String)
    }

    pub fn number() -> Self {
        Self::of(OptionType::Number)
    }

    pub fn boolean() -> Self {
        Self::of(OptionType::Boolean)
    }

    pub fn array() -> Self {
        Self::of(OptionType::Array)
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.alias.push(alias.into());
        self
    }

    pub fn default_value(mut self, value: ArgValue) -> Self {
        self.default = Some(value);
        self
    }

    pub fn choices<I, S>(mut self, choices: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.choices = choices.into_iter().map(Into::into).collect();
        self
    }
}

// ---------------------------------------------------------------------------
// Parsed values
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ArgValue {
    Bool(bool),
    Number(f64),
    String(String),
    List(Vec<String>),
}

impl ArgValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }
}

/// Named options keyed by their declared name, plus positional leftovers.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NamedArgs {
    #[serde(flatten)]
    pub values: BTreeMap<String, ArgValue>,
    #[serde(rename = "_")]
    pub positional: Vec<String>,
}

/// Arguments handed to a command action.
#[derive(Debug, Clone, PartialEq)]
pub enum CommandArgs {
    /// No schema declared: the raw token list.
    Tokens(Vec<String>),
    /// Schema declared: validated named options.
    Named(NamedArgs),
}

impl Default for CommandArgs {
    fn default() -> Self {
        Self::Tokens(Vec::new())
    }
}

impl CommandArgs {
    pub fn get(&self, key: &str) -> Option<&ArgValue> {
        match self {
            Self::Tokens(_) => None,
            Self::Named(named) => named.values.get(key),
        }
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(ArgValue::as_str)
    }

    pub fn get_f64(&self, key: &str) -> Option<f64> {
        self.get(key).and_then(ArgValue::as_f64)
    }

    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.get(key).and_then(ArgValue::as_bool)
    }

    /// Positional tokens: every token without a schema, leftovers with one.
    pub fn positional(&self) -> &[String] {
        match self {
            Self::Tokens(tokens) => tokens,
            Self::Named(named) => &named.positional,
        }
    }

    /// JSON view: an array of tokens, or an object with a `_` array.
    pub fn to_json(&self) -> Value {
        match self {
            Self::Tokens(tokens) => serde_json::json!(tokens),
            Self::Named(named) => serde_json::to_value(named).unwrap_or(Value::Null),
        }
    }
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ArgError {
    #[error("Missing required option{}: {}", plural(.0), .0.join(", "))]
    MissingRequired(Vec<String>),

    #[error("Unknown argument{}: {}", plural(.0), .0.join(", "))]
    UnknownOptions(Vec<String>),

    #[error("Option --{0} expects a value")]
    MissingValue(String),

    #[error("Option --{key} expects a number, got '{value}'")]
    InvalidNumber { key: String, value: String },

    #[error("Option --{key} expects true or false, got '{value}'")]
    InvalidBoolean { key: String, value: String },

    #[error("Invalid value '{value}' for --{key}; expected one of: {}", .choices.join(", "))]
    InvalidChoice {
        key: String,
        value: String,
        choices: Vec<String>,
    },
}

fn plural(items: &[String]) -> &'static str {
    if items.len() == 1 { "" } else { "s" }
}

// ---------------------------------------------------------------------------
// Tokenizer
// ---------------------------------------------------------------------------

/// Split on spaces outside quotes. A quote opens with `'` or `"` and closes
/// only on the same character; an unclosed quote swallows the rest of the
/// input into the current token. Quote characters are dropped.
pub fn tokenize_args(input: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut quote: Option<char> = None;

    for c in input.chars() {
        match quote {
            None if c == '"' || c == '\'' => quote = Some(c),
            Some(open) if c == open => quote = None,
            None if c == ' ' => push_token(&mut tokens, &mut current),
            _ => current.push(c),
        }
    }
    push_token(&mut tokens, &mut current);

    tokens
}

fn push_token(tokens: &mut Vec<String>, current: &mut String) {
    let token = current.trim();
    if !token.is_empty() {
        tokens.push(token.to_string());
    }
    current.clear();
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Tokenize `args_string` and, when a schema is given, validate it.
pub fn parse_command_args(
    args_string: &str,
    schema: Option<&OptionSchema>,
    strict: bool,
) -> Result<CommandArgs, ArgError> {
    let tokens = tokenize_args(args_string);
    match schema {
        None => Ok(CommandArgs::Tokens(tokens)),
        Some(schema) => parse_options(&tokens, schema, strict).map(CommandArgs::Named),
    }
}

/// Match tokens against `schema`. Value errors surface first, then missing
/// required options, then unknown options.
pub fn parse_options(tokens: &[String], schema: &OptionSchema, strict: bool) -> Result<NamedArgs, ArgError> {
    let mut parsed = NamedArgs::default();
    let mut unknown: Vec<String> = Vec::new();
    let mut index = 0;

    while index < tokens.len() {
        let token = &tokens[index];
        index += 1;

        if token == "--" {
            parsed.positional.extend(tokens[index..].iter().cloned());
            break;
        }

        if let Some(body) = token.strip_prefix("--") {
            let (name, inline) = match body.split_once('=') {
                Some((name, value)) => (name, Some(value.to_string())),
                None => (body, None),
            };

            if let Some((key, spec)) = resolve(schema, name) {
                index = apply_option(&mut parsed, key, spec, inline, tokens, index)?;
            } else if let Some((key, _)) = negated_boolean(schema, name).filter(|_| inline.is_none()) {
                parsed.values.insert(key.to_string(), ArgValue::Bool(false));
            } else {
                keep_unknown(&mut parsed, &mut unknown, name, inline, strict);
            }
            continue;
        }

        if let Some(body) = token.strip_prefix('-').filter(|b| !b.is_empty() && !looks_numeric(token)) {
            let (name, inline) = match body.split_once('=') {
                Some((name, value)) => (name, Some(value.to_string())),
                None => (body, None),
            };

            if let Some((key, spec)) = resolve(schema, name) {
                index = apply_option(&mut parsed, key, spec, inline, tokens, index)?;
            } else if inline.is_none() && is_boolean_group(schema, name) {
                for short in name.chars() {
                    if let Some((key, _)) = resolve(schema, &short.to_string()) {
                        parsed.values.insert(key.to_string(), ArgValue::Bool(true));
                    }
                }
            } else {
                keep_unknown(&mut parsed, &mut unknown, name, inline, strict);
            }
            continue;
        }

        parsed.positional.push(token.clone());
    }

    for (key, spec) in schema {
        if !parsed.values.contains_key(key) {
            if let Some(default) = &spec.default {
                parsed.values.insert(key.clone(), default.clone());
            }
        }
    }

    let missing: Vec<String> = schema
        .iter()
        .filter(|(key, spec)| spec.required && !parsed.values.contains_key(*key))
        .map(|(key, _)| key.clone())
        .collect();
    if !missing.is_empty() {
        return Err(ArgError::MissingRequired(missing));
    }

    if !unknown.is_empty() {
        return Err(ArgError::UnknownOptions(unknown));
    }

    Ok(parsed)
}

fn resolve<'a>(schema: &'a OptionSchema, name: &str) -> Option<(&'a str, &'a OptionSpec)> {
    if let Some((key, spec)) = schema.get_key_value(name) {
        return Some((key.as_str(), spec));
    }
    schema
        .iter()
        .find(|(_, spec)| spec.alias.iter().any(|alias| alias == name))
        .map(|(key, spec)| (key.as_str(), spec))
}

fn negated_boolean<'a>(schema: &'a OptionSchema, name: &str) -> Option<(&'a str, &'a OptionSpec)> {
    let name = name.strip_prefix("no-")?;
    resolve(schema, name).filter(|(_, spec)| spec.kind == OptionType::Boolean)
}

fn is_boolean_group(schema: &OptionSchema, name: &str) -> bool {
    name.chars().count() > 1
        && name.chars().all(|c| {
            resolve(schema, &c.to_string()).is_some_and(|(_, spec)| spec.kind == OptionType::Boolean)
        })
}

fn looks_numeric(token: &str) -> bool {
    token.parse::<f64>().is_ok()
}

fn is_option_token(token: &str) -> bool {
    token.len() > 1 && token.starts_with('-') && !looks_numeric(token)
}

fn keep_unknown(parsed: &mut NamedArgs, unknown: &mut Vec<String>, name: &str, inline: Option<String>, strict: bool) {
    if strict {
        unknown.push(name.to_string());
        return;
    }
    let value = inline.map(ArgValue::String).unwrap_or(ArgValue::Bool(true));
    parsed.values.insert(name.to_string(), value);
}

/// Store one option's value, consuming following tokens as needed.
/// Returns the index of the next unconsumed token.
fn apply_option(
    parsed: &mut NamedArgs,
    key: &str,
    spec: &OptionSpec,
    inline: Option<String>,
    tokens: &[String],
    mut index: usize,
) -> Result<usize, ArgError> {
    let value = match spec.kind {
        OptionType::Boolean => {
            let raw = match inline {
                Some(raw) => Some(raw),
                None => match tokens.get(index).map(String::as_str) {
                    Some(next @ ("true" | "false")) => {
                        index += 1;
                        Some(next.to_string())
                    }
                    _ => None,
                },
            };
            match raw.as_deref() {
                None | Some("true") => ArgValue::Bool(true),
                Some("false") => ArgValue::Bool(false),
                Some(other) => {
                    return Err(ArgError::InvalidBoolean { key: key.to_string(), value: other.to_string() });
                }
            }
        }
        OptionType::Array => {
            let mut items = match parsed.values.remove(key) {
                Some(ArgValue::List(items)) => items,
                _ => Vec::new(),
            };
            if let Some(raw) = inline {
                items.push(raw);
            }
            while let Some(next) = tokens.get(index).filter(|t| !is_option_token(t) && t.as_str() != "--") {
                items.push(next.clone());
                index += 1;
            }
            for item in &items {
                check_choice(key, spec, item)?;
            }
            ArgValue::List(items)
        }
        OptionType::String | OptionType::Number => {
            let raw = match inline {
                Some(raw) => raw,
                None => match tokens.get(index).filter(|t| !is_option_token(t) && t.as_str() != "--") {
                    Some(next) => {
                        index += 1;
                        next.clone()
                    }
                    None => return Err(ArgError::MissingValue(key.to_string())),
                },
            };
            check_choice(key, spec, &raw)?;
            if spec.kind == OptionType::Number {
                let number = raw
                    .parse::<f64>()
                    .map_err(|_| ArgError::InvalidNumber { key: key.to_string(), value: raw.clone() })?;
                ArgValue::Number(number)
            } else {
                ArgValue::String(raw)
            }
        }
    };

    parsed.values.insert(key.to_string(), value);
    Ok(index)
}

fn check_choice(key: &str, spec: &OptionSpec, value: &str) -> Result<(), ArgError> {
    if spec.choices.is_empty() || spec.choices.iter().any(|c| c == value) {
        return Ok(());
    }
    Err(ArgError::InvalidChoice {
        key: key.to_string(),
        value: value.to_string(),
        choices: spec.choices.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schema(entries: &[(&str, OptionSpec)]) -> OptionSchema {
        entries.iter().map(|(k, s)| (k.to_string(), s.clone())).collect()
    }

    fn tokens(input: &str) -> Vec<String> {
        tokenize_args(input)
    }

    #[test]
    fn tokenizer_honors_quotes() {
        assert_eq!(tokens(r#"alpha "beta gamma" delta"#), vec!["alpha", "beta gamma", "delta"]);
        assert_eq!(tokens(r#"say 'it is' "a b""#), vec!["say", "it is", "a b"]);
        assert_eq!(tokens(r#"'he said "hi there"'"#), vec![r#"he said "hi there""#]);
        assert_eq!(tokens("  one    two  "), vec!["one", "two"]);
        assert!(tokens("").is_empty());
    }

    #[test]
    fn tokenizer_unclosed_quote_absorbs_rest() {
        assert_eq!(tokens(r#"a "b c d"#), vec!["a", "b c d"]);
    }

    #[test]
    fn tokenizer_joins_quoted_and_bare_segments() {
        assert_eq!(tokens(r#"--name="John Smith" x"#), vec!["--name=John Smith", "x"]);
    }

    #[test]
    fn no_schema_returns_tokens() {
        let args = parse_command_args("a 'b c'", None, true).unwrap();
        assert_eq!(args, CommandArgs::Tokens(vec!["a".into(), "b c".into()]));
        assert_eq!(args.positional(), ["a", "b c"]);
        assert_eq!(args.to_json(), serde_json::json!(["a", "b c"]));
    }

    #[test]
    fn required_option_missing() {
        let s = schema(&[("name", OptionSpec::string().required())]);
        let err = parse_command_args("", Some(&s), true).unwrap_err();
        assert_eq!(err, ArgError::MissingRequired(vec!["name".into()]));
        assert_eq!(err.to_string(), "Missing required option: name");

        let s = schema(&[("a", OptionSpec::string().required()), ("b", OptionSpec::number().required())]);
        let err = parse_command_args("", Some(&s), true).unwrap_err();
        assert_eq!(err.to_string(), "Missing required options: a, b");
    }

    #[test]
    fn string_option_forms() {
        let s = schema(&[("name", OptionSpec::string().alias("n"))]);
        for input in ["--name World", "--name=World", "-n World", "-n=World"] {
            let args = parse_command_args(input, Some(&s), true).unwrap();
            assert_eq!(args.get_str("name"), Some("World"), "input: {input}");
        }
        let args = parse_command_args(r#"--name "Big World" rest"#, Some(&s), true).unwrap();
        assert_eq!(args.get_str("name"), Some("Big World"));
        assert_eq!(args.positional(), ["rest"]);
    }

    #[test]
    fn option_without_value_is_an_error() {
        let s = schema(&[("name", OptionSpec::string()), ("loud", OptionSpec::boolean())]);
        let err = parse_command_args("--name --loud", Some(&s), true).unwrap_err();
        assert_eq!(err, ArgError::MissingValue("name".into()));
        assert_eq!(err.to_string(), "Option --name expects a value");
    }

    #[test]
    fn number_coercion() {
        let s = schema(&[("count", OptionSpec::number().alias("c"))]);
        let args = parse_command_args("-c 3", Some(&s), true).unwrap();
        assert_eq!(args.get_f64("count"), Some(3.0));
        let args = parse_command_args("--count -2.5", Some(&s), true).unwrap();
        assert_eq!(args.get_f64("count"), Some(-2.5));
        let err = parse_command_args("--count many", Some(&s), true).unwrap_err();
        assert_eq!(err.to_string(), "Option --count expects a number, got 'many'");
    }

    #[test]
    fn boolean_flags() {
        let s = schema(&[
            ("verbose", OptionSpec::boolean().alias("v")),
            ("quiet", OptionSpec::boolean().alias("q")),
        ]);
        let args = parse_command_args("--verbose", Some(&s), true).unwrap();
        assert_eq!(args.get_bool("verbose"), Some(true));
        let args = parse_command_args("--verbose false", Some(&s), true).unwrap();
        assert_eq!(args.get_bool("verbose"), Some(false));
        let args = parse_command_args("--no-verbose", Some(&s), true).unwrap();
        assert_eq!(args.get_bool("verbose"), Some(false));
        let args = parse_command_args("-vq file", Some(&s), true).unwrap();
        assert_eq!(args.get_bool("verbose"), Some(true));
        assert_eq!(args.get_bool("quiet"), Some(true));
        assert_eq!(args.positional(), ["file"]);
        let err = parse_command_args("--verbose=maybe", Some(&s), true).unwrap_err();
        assert!(matches!(err, ArgError::InvalidBoolean { .. }));
    }

    #[test]
    fn array_collects_until_next_option() {
        let s = schema(&[("tag", OptionSpec::array()), ("x", OptionSpec::boolean())]);
        let args = parse_command_args("--tag a b --x --tag c", Some(&s), true).unwrap();
        assert_eq!(args.get("tag").and_then(ArgValue::as_list), Some(&["a".to_string(), "b".into(), "c".into()][..]));
    }

    #[test]
    fn unknown_options_rejected_when_strict() {
        let s = schema(&[("name", OptionSpec::string())]);
        let err = parse_command_args("--nmae x --other", Some(&s), true).unwrap_err();
        assert_eq!(err, ArgError::UnknownOptions(vec!["nmae".into(), "other".into()]));
        assert_eq!(err.to_string(), "Unknown arguments: nmae, other");

        let args = parse_command_args("--nmae=x --other", Some(&s), false).unwrap();
        assert_eq!(args.get_str("nmae"), Some("x"));
        assert_eq!(args.get_bool("other"), Some(true));
    }

    #[test]
    fn missing_required_reported_before_unknown() {
        let s = schema(&[("name", OptionSpec::string().required())]);
        let err = parse_command_args("--nmae World", Some(&s), true).unwrap_err();
        assert_eq!(err, ArgError::MissingRequired(vec!["name".into()]));
    }

    #[test]
    fn defaults_fill_absent_options() {
        let s = schema(&[(
            "level",
            OptionSpec::string().required().default_value(ArgValue::String("medium".into())),
        )]);
        let args = parse_command_args("", Some(&s), true).unwrap();
        assert_eq!(args.get_str("level"), Some("medium"));
    }

    #[test]
    fn choices_restrict_values() {
        let s = schema(&[("mode", OptionSpec::string().choices(["on", "off"]))]);
        assert!(parse_command_args("--mode on", Some(&s), true).is_ok());
        let err = parse_command_args("--mode loud", Some(&s), true).unwrap_err();
        assert_eq!(err.to_string(), "Invalid value 'loud' for --mode; expected one of: on, off");
    }

    #[test]
    fn double_dash_stops_option_parsing() {
        let s = schema(&[("name", OptionSpec::string())]);
        let args = parse_command_args("a -- --name b", Some(&s), true).unwrap();
        assert_eq!(args.get_str("name"), None);
        assert_eq!(args.positional(), ["a", "--name", "b"]);
    }

    #[test]
    fn negative_number_is_positional() {
        let s = schema(&[("name", OptionSpec::string())]);
        let args = parse_command_args("-5 x", Some(&s), true).unwrap();
        assert_eq!(args.positional(), ["-5", "x"]);
    }

    #[test]
    fn named_json_view_has_underscore() {
        let s = schema(&[("name", OptionSpec::string())]);
        let args = parse_command_args("--name World extra", Some(&s), true).unwrap();
        assert_eq!(args.to_json(), serde_json::json!({ "name": "World", "_": ["extra"] }));
    }

    #[test]
    fn spec_deserializes_from_yaml_like_json() {
        let spec: OptionSpec = serde_json::from_value(serde_json::json!({
            "type": "number",
            "alias": ["c"],
            "demandOption": true,
            "default": 2
        }))
        .unwrap();
        assert_eq!(spec.kind, OptionType::Number);
        assert!(spec.required);
        assert_eq!(spec.default, Some(ArgValue::Number(2.0)));

        let spec: OptionSpec = serde_json::from_value(serde_json::json!({ "alias": "n" })).unwrap();
        assert_eq!(spec.kind, OptionType::String);
        assert_eq!(spec.alias, vec!["n"]);
    }
}
