//! Wire contract with the execution service and the terminal error taxonomy
//! for a run.

use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// Insertion-ordered map of input variable name to supplied value.
///
/// Append-only across one run: entries are stored in the order the service
/// first requested each variable, and that order is resent verbatim on every
/// subsequent attempt.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InputMap {
    entries: Vec<(String, String)>,
}

impl InputMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[allow(dead_code)]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|(k, _)| k == name)
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Append a new entry. Returns false, changing nothing, if the name is
    /// already present.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) -> bool {
        let name = name.into();
        if self.contains(&name) {
            return false;
        }
        self.entries.push((name, value.into()));
        true
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for InputMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::default();
        for (k, v) in iter {
            map.insert(k, v);
        }
        map
    }
}

impl Serialize for InputMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (k, v) in self.iter() {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for InputMap {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct InputMapVisitor;

        impl<'de> Visitor<'de> for InputMapVisitor {
            type Value = InputMap;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of input names to string values")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<InputMap, A::Error> {
                let mut inputs = InputMap::default();
                while let Some((name, value)) = access.next_entry::<String, String>()? {
                    // A repeated key keeps its original position; last value wins.
                    match inputs.entries.iter_mut().find(|(k, _)| *k == name) {
                        Some(slot) => slot.1 = value,
                        None => inputs.entries.push((name, value)),
                    }
                }
                Ok(inputs)
            }
        }

        deserializer.deserialize_map(InputMapVisitor)
    }
}

/// One execution attempt: the complete source plus every input supplied so
/// far. Sent on every round, including the first (empty map).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionRequest {
    // a request without a code key runs an empty program
    #[serde(rename = "code", default)]
    pub source: String,
    #[serde(default)]
    pub inputs: InputMap,
}

/// The three well-formed service answers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecutionResponse {
    Output(String),
    Error(String),
    InputRequested(String),
}

/// Presence-based JSON shape of a `/run` response. Both sides of the wire go
/// through this type: the service builds it from an [`ExecutionResponse`],
/// the client parses it and classifies via [`WireResponse::classify`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WireResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input_requested: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variable_name: Option<String>,
}

impl WireResponse {
    /// Map the wire shape onto exactly one response tag.
    ///
    /// Absence of all three tags is success with no output. An explicit
    /// `input_requested: false` counts as absent. Anything else that fits no
    /// single tag is malformed and terminates the run as a transport failure.
    pub fn classify(self) -> Result<ExecutionResponse, RunError> {
        if self.input_requested == Some(true) {
            if self.output.is_some() || self.error.is_some() {
                return Err(RunError::Transport(
                    "malformed response: more than one tag present".into(),
                ));
            }
            return match self.variable_name {
                Some(variable) => Ok(ExecutionResponse::InputRequested(variable)),
                None => Err(RunError::Transport(
                    "malformed response: input_requested without variable_name".into(),
                )),
            };
        }
        match (self.output, self.error) {
            (Some(_), Some(_)) => Err(RunError::Transport(
                "malformed response: more than one tag present".into(),
            )),
            (Some(text), None) => Ok(ExecutionResponse::Output(text)),
            (None, Some(message)) => Ok(ExecutionResponse::Error(message)),
            (None, None) => Ok(ExecutionResponse::Output(String::new())),
        }
    }
}

impl From<ExecutionResponse> for WireResponse {
    fn from(resp: ExecutionResponse) -> Self {
        match resp {
            ExecutionResponse::Output(text) => WireResponse {
                output: Some(text),
                ..Default::default()
            },
            ExecutionResponse::Error(message) => WireResponse {
                error: Some(message),
                ..Default::default()
            },
            ExecutionResponse::InputRequested(variable) => WireResponse {
                input_requested: Some(true),
                variable_name: Some(variable),
                ..Default::default()
            },
        }
    }
}

/// Body of `GET /examples/{name}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExampleResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Terminal failure classes for one run. Every variant ends the run; none is
/// retried.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RunError {
    /// Network failure, unreadable body, or a body fitting no wire tag.
    #[error("transport failure: {0}")]
    Transport(String),
    /// The service reported an error in the submitted program. Surfaced
    /// verbatim.
    #[error("{0}")]
    Execution(String),
    /// The service re-requested a variable it was already given; replay can
    /// never make progress past it.
    #[error("protocol violation: input '{0}' was already supplied")]
    Protocol(String),
}
