//! Keyword lookup and argument binding.

use serde::Serialize;
use serde_json::{json, Map, Value};

use super::WinRmLibrary;
use crate::error::WinRmError;
use crate::Result;

/// Keywords provided by the library.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Keyword {
    CreateSession,
    RunCmd,
    RunPs,
    DeleteAllSessions,
}

/// Name, arguments and documentation of one keyword.
#[derive(Debug, Serialize)]
pub struct KeywordSpec {
    /// Display name.
    pub name: &'static str,
    /// Argument names in positional order.
    pub args: &'static [&'static str],
    /// Number of leading arguments that must be given.
    pub required: usize,
    /// One-line documentation.
    pub doc: &'static str,
    #[serde(skip)]
    pub keyword: Keyword,
}

/// Every keyword the library exposes.
pub const KEYWORDS: &[KeywordSpec] = &[
    KeywordSpec {
        name: "Create Session",
        args: &["alias", "hostname", "login", "password"],
        required: 4,
        doc: "Create session with windows host. Does not support domain authentication. Returns the session index.",
        keyword: Keyword::CreateSession,
    },
    KeywordSpec {
        name: "Run Cmd",
        args: &["alias", "command", "params"],
        required: 2,
        doc: "Execute command on remote machine. Returns an object with status_code, std_out and std_err.",
        keyword: Keyword::RunCmd,
    },
    KeywordSpec {
        name: "Run Ps",
        args: &["alias", "script"],
        required: 2,
        doc: "Run power shell script on remote machine. Returns an object with status_code, std_out and std_err.",
        keyword: Keyword::RunPs,
    },
    KeywordSpec {
        name: "Delete All Sessions",
        args: &[],
        required: 0,
        doc: "Removes all sessions with windows hosts.",
        keyword: Keyword::DeleteAllSessions,
    },
];

/// Normalize a keyword name: lowercase, spaces and underscores removed.
pub fn normalize_name(name: &str) -> String {
    name.chars()
        .filter(|c| !c.is_whitespace() && *c != '_')
        .flat_map(char::to_lowercase)
        .collect()
}

/// Find a keyword by name.
pub fn find(name: &str) -> Option<&'static KeywordSpec> {
    let wanted = normalize_name(name);
    KEYWORDS.iter().find(|spec| normalize_name(spec.name) == wanted)
}

/// Arguments bound to a keyword's parameters.
#[derive(Debug)]
pub struct BoundArgs {
    spec: &'static KeywordSpec,
    values: Vec<Option<Value>>,
}

/// Bind positional and named arguments to `spec`'s parameters.
pub fn bind(spec: &'static KeywordSpec, args: Vec<Value>, kwargs: Map<String, Value>) -> Result<BoundArgs> {
    if args.len() > spec.args.len() {
        return Err(WinRmError::InvalidArguments(format!(
            "keyword '{}' expects at most {} arguments, got {}",
            spec.name,
            spec.args.len(),
            args.len()
        )));
    }

    let mut values: Vec<Option<Value>> = vec![None; spec.args.len()];
    for (slot, value) in values.iter_mut().zip(args) {
        *slot = Some(value);
    }

    for (name, value) in kwargs {
        let position = spec
            .args
            .iter()
            .position(|arg| *arg == name)
            .ok_or_else(|| {
                WinRmError::InvalidArguments(format!(
                    "keyword '{}' got unexpected named argument '{}'",
                    spec.name, name
                ))
            })?;
        if values[position].is_some() {
            return Err(WinRmError::InvalidArguments(format!(
                "keyword '{}' got multiple values for argument '{}'",
                spec.name, name
            )));
        }
        values[position] = Some(value);
    }

    if let Some(missing) = (0..spec.required).find(|i| values[*i].is_none()) {
        return Err(WinRmError::InvalidArguments(format!(
            "keyword '{}' missing value for argument '{}'",
            spec.name, spec.args[missing]
        )));
    }

    Ok(BoundArgs { spec, values })
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

impl BoundArgs {
    fn invalid(&self, index: usize, expected: &str) -> WinRmError {
        WinRmError::InvalidArguments(format!(
            "argument '{}' of keyword '{}' must be {}",
            self.spec.args[index], self.spec.name, expected
        ))
    }

    /// Get a required string argument.
    pub fn string(&self, index: usize) -> Result<String> {
        self.values
            .get(index)
            .and_then(|v| v.as_ref())
            .and_then(scalar_to_string)
            .ok_or_else(|| self.invalid(index, "a string"))
    }

    /// Get an optional list-of-strings argument.
    pub fn string_list(&self, index: usize) -> Result<Option<Vec<String>>> {
        match self.values.get(index).and_then(|v| v.as_ref()) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::Array(items)) => items
                .iter()
                .map(|item| scalar_to_string(item).ok_or_else(|| self.invalid(index, "a list of strings")))
                .collect::<Result<Vec<_>>>()
                .map(Some),
            Some(_) => Err(self.invalid(index, "a list of strings")),
        }
    }
}

impl WinRmLibrary {
    /// Names and documentation of every keyword.
    pub fn keywords(&self) -> &'static [KeywordSpec] {
        KEYWORDS
    }

    /// Run a keyword by name.
    ///
    /// Returns the session index for `Create Session`, a
    /// `{status_code, std_out, std_err}` object for `Run Cmd` and `Run Ps`,
    /// and null for `Delete All Sessions`.
    pub async fn run_keyword(&self, name: &str, args: Vec<Value>, kwargs: Map<String, Value>) -> Result<Value> {
        let spec = find(name).ok_or_else(|| WinRmError::UnknownKeyword(name.to_string()))?;
        let bound = bind(spec, args, kwargs)?;

        match spec.keyword {
            Keyword::CreateSession => {
                let index = self.create_session(
                    &bound.string(0)?,
                    &bound.string(1)?,
                    &bound.string(2)?,
                    &bound.string(3)?,
                )?;
                Ok(Value::from(index))
            }
            Keyword::RunCmd => {
                let params = bound.string_list(2)?;
                let output = self
                    .run_cmd(&bound.string(0)?, &bound.string(1)?, params.as_deref())
                    .await?;
                Ok(json!(output))
            }
            Keyword::RunPs => {
                let output = self.run_ps(&bound.string(0)?, &bound.string(1)?).await?;
                Ok(json!(output))
            }
            Keyword::DeleteAllSessions => {
                self.delete_all_sessions()?;
                Ok(Value::Null)
            }
        }
    }
}
