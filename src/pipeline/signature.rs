//! Typed input/output contracts for predictors

use serde::{Deserialize, Serialize};

/// A named field with an optional description for the prompt
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Field {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
        }
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Declares which fields a predictor consumes and produces
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signature {
    pub inputs: Vec<Field>,
    pub outputs: Vec<Field>,
    pub instructions: String,
}

impl Signature {
    /// Create a signature with instructions derived from the field names
    #[must_use]
    pub fn new(inputs: Vec<Field>, outputs: Vec<Field>) -> Self {
        let instructions = format!(
            "Given the fields {}, produce the fields {}.",
            quoted_names(&inputs),
            quoted_names(&outputs)
        );
        Self {
            inputs,
            outputs,
            instructions,
        }
    }

    /// `question -> answer`
    #[must_use]
    pub fn retrieval_generation() -> Self {
        Self::new(vec![Field::new("question")], vec![Field::new("answer")])
    }

    #[must_use]
    pub fn with_instructions(mut self, instructions: impl Into<String>) -> Self {
        self.instructions = instructions.into();
        self
    }

    /// Insert an output field ahead of the existing ones
    #[must_use]
    pub fn prepend_output(mut self, field: Field) -> Self {
        self.outputs.insert(0, field);
        self
    }

    pub fn input_names(&self) -> impl Iterator<Item = &str> {
        self.inputs.iter().map(|f| f.name.as_str())
    }

    pub fn output_names(&self) -> impl Iterator<Item = &str> {
        self.outputs.iter().map(|f| f.name.as_str())
    }
}

fn quoted_names(fields: &[Field]) -> String {
    fields
        .iter()
        .map(|f| format!("`{}`", f.name))
        .collect::<Vec<_>>()
        .join(", ")
}
