//! Model output with populated-field tracking.
//!
//! A transcript records only what the model actually produced. Plain
//! `Option` fields cannot tell "the model returned `null`" apart from "the
//! model never mentioned this field", so [`AgentOutput`] keeps the set of
//! populated fields next to the values and serializes exactly that set, in
//! declaration order.

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};
use std::collections::BTreeSet;

/// Fields of an [`AgentOutput`], in serialization order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum OutputField {
    Thinking,
    EvaluationPreviousGoal,
    Memory,
    NextGoal,
    Action,
}

impl OutputField {
    pub const ALL: [OutputField; 5] = [
        OutputField::Thinking,
        OutputField::EvaluationPreviousGoal,
        OutputField::Memory,
        OutputField::NextGoal,
        OutputField::Action,
    ];

    /// Wire name of the field.
    pub fn name(self) -> &'static str {
        match self {
            OutputField::Thinking => "thinking",
            OutputField::EvaluationPreviousGoal => "evaluation_previous_goal",
            OutputField::Memory => "memory",
            OutputField::NextGoal => "next_goal",
            OutputField::Action => "action",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|field| field.name() == name)
    }
}

/// Structured output of one agent step.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(try_from = "Map<String, Value>")]
pub struct AgentOutput {
    thinking: Option<String>,
    evaluation_previous_goal: Option<String>,
    memory: Option<String>,
    next_goal: Option<String>,
    action: Vec<Value>,
    populated: BTreeSet<OutputField>,
}

impl AgentOutput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_thinking(mut self, thinking: impl Into<String>) -> Self {
        self.thinking = Some(thinking.into());
        self.populated.insert(OutputField::Thinking);
        self
    }

    pub fn with_evaluation(mut self, evaluation: impl Into<String>) -> Self {
        self.evaluation_previous_goal = Some(evaluation.into());
        self.populated.insert(OutputField::EvaluationPreviousGoal);
        self
    }

    pub fn with_memory(mut self, memory: impl Into<String>) -> Self {
        self.memory = Some(memory.into());
        self.populated.insert(OutputField::Memory);
        self
    }

    pub fn with_next_goal(mut self, next_goal: impl Into<String>) -> Self {
        self.next_goal = Some(next_goal.into());
        self.populated.insert(OutputField::NextGoal);
        self
    }

    pub fn with_actions(mut self, actions: Vec<Value>) -> Self {
        self.action = actions;
        self.populated.insert(OutputField::Action);
        self
    }

    /// Populate `field` with its empty value: `null` for text fields, `[]`
    /// for actions. The field is then emitted even though it holds nothing.
    pub fn with_default(mut self, field: OutputField) -> Self {
        match field {
            OutputField::Thinking => self.thinking = None,
            OutputField::EvaluationPreviousGoal => self.evaluation_previous_goal = None,
            OutputField::Memory => self.memory = None,
            OutputField::NextGoal => self.next_goal = None,
            OutputField::Action => self.action.clear(),
        }
        self.populated.insert(field);
        self
    }

    pub fn thinking(&self) -> Option<&str> {
        self.thinking.as_deref()
    }

    pub fn evaluation_previous_goal(&self) -> Option<&str> {
        self.evaluation_previous_goal.as_deref()
    }

    pub fn memory(&self) -> Option<&str> {
        self.memory.as_deref()
    }

    pub fn next_goal(&self) -> Option<&str> {
        self.next_goal.as_deref()
    }

    pub fn actions(&self) -> &[Value] {
        &self.action
    }

    pub fn is_populated(&self, field: OutputField) -> bool {
        self.populated.contains(&field)
    }

    /// Populated fields in serialization order.
    pub fn populated_fields(&self) -> impl Iterator<Item = OutputField> + '_ {
        self.populated.iter().copied()
    }

    fn text_field(&self, field: OutputField) -> Option<&str> {
        match field {
            OutputField::Thinking => self.thinking(),
            OutputField::EvaluationPreviousGoal => self.evaluation_previous_goal(),
            OutputField::Memory => self.memory(),
            OutputField::NextGoal => self.next_goal(),
            OutputField::Action => None,
        }
    }
}

impl Serialize for AgentOutput {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.populated.len()))?;
        for field in &self.populated {
            match field {
                OutputField::Action => map.serialize_entry(field.name(), &self.action)?,
                text => map.serialize_entry(text.name(), &self.text_field(*text))?,
            }
        }
        map.end()
    }
}

impl TryFrom<Map<String, Value>> for AgentOutput {
    type Error = String;

    /// Keys present in the map become populated; unknown keys are ignored.
    fn try_from(map: Map<String, Value>) -> Result<Self, Self::Error> {
        let mut output = AgentOutput::default();
        for (key, value) in map {
            let Some(field) = OutputField::from_name(&key) else {
                continue;
            };
            match field {
                OutputField::Action => {
                    output.action = match value {
                        Value::Null => Vec::new(),
                        Value::Array(items) => items,
                        other => return Err(format!("action must be a list, got {other}")),
                    };
                }
                OutputField::Thinking => output.thinking = text_value(field, value)?,
                OutputField::EvaluationPreviousGoal => {
                    output.evaluation_previous_goal = text_value(field, value)?
                }
                OutputField::Memory => output.memory = text_value(field, value)?,
                OutputField::NextGoal => output.next_goal = text_value(field, value)?,
            }
            output.populated.insert(field);
        }
        Ok(output)
    }
}

fn text_value(field: OutputField, value: Value) -> Result<Option<String>, String> {
    match value {
        Value::Null => Ok(None),
        Value::String(s) => Ok(Some(s)),
        other => Err(format!("{} must be a string, got {other}", field.name())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn only_populated_fields_serialize() {
        let output = AgentOutput::new()
            .with_memory("m")
            .with_actions(vec![json!({"click": {"index": 3}})]);
        let value = serde_json::to_value(&output).unwrap();
        assert_eq!(
            value,
            json!({"memory": "m", "action": [{"click": {"index": 3}}]})
        );
    }

    #[test]
    fn declaration_order_is_kept() {
        let output = AgentOutput::new()
            .with_next_goal("c")
            .with_thinking("a")
            .with_memory("b");
        let text = serde_json::to_string(&output).unwrap();
        assert_eq!(text, r#"{"thinking":"a","memory":"b","next_goal":"c"}"#);
    }

    #[test]
    fn explicit_default_is_emitted() {
        let output = AgentOutput::new()
            .with_default(OutputField::Thinking)
            .with_default(OutputField::Action);
        let text = serde_json::to_string(&output).unwrap();
        assert_eq!(text, r#"{"thinking":null,"action":[]}"#);
    }

    #[test]
    fn empty_output_serializes_to_empty_object() {
        assert_eq!(serde_json::to_string(&AgentOutput::new()).unwrap(), "{}");
    }

    #[test]
    fn deserialization_tracks_present_keys() {
        let output: AgentOutput =
            serde_json::from_str(r#"{"memory": null, "next_goal": "go", "extra": 1}"#).unwrap();
        assert!(output.is_populated(OutputField::Memory));
        assert!(output.is_populated(OutputField::NextGoal));
        assert!(!output.is_populated(OutputField::Thinking));
        assert_eq!(output.memory(), None);
        assert_eq!(output.next_goal(), Some("go"));

        let back = serde_json::to_string(&output).unwrap();
        assert_eq!(back, r#"{"memory":null,"next_goal":"go"}"#);
    }

    #[test]
    fn deserialization_rejects_wrong_types() {
        assert!(serde_json::from_str::<AgentOutput>(r#"{"memory": 5}"#).is_err());
        assert!(serde_json::from_str::<AgentOutput>(r#"{"action": "click"}"#).is_err());
    }
}
