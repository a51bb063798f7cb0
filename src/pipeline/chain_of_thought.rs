//! Chain-of-thought predictor
//!
//! Renders a [`Signature`] into a chat prompt where every field is framed by
//! a `[[ ## name ## ]]` header, asks the model for a `reasoning` field ahead
//! of the declared outputs, and parses the sections back out of the reply.

use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::Regex;

use super::{
    signature::{Field, Signature},
    Prediction,
};
use crate::{
    error::{RagError, Result},
    messages::{Message, Prompt},
    services::{GenerationParams, LanguageModel},
};

/// Name of the field the model reasons in
pub const REASONING_FIELD: &str = "reasoning";

const COMPLETED_MARKER: &str = "completed";

static FIELD_HEADER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[\[ ## (\w+) ## \]\]").expect("field header pattern is valid"));

/// Predictor that reasons step by step before producing its outputs
#[derive(Debug, Clone)]
pub struct ChainOfThought {
    signature: Signature,
}

impl ChainOfThought {
    #[must_use]
    pub fn new(signature: Signature) -> Self {
        let prefix = signature
            .outputs
            .iter()
            .map(|f| format!("`{}`", f.name))
            .collect::<Vec<_>>()
            .join(", ");
        let reasoning = Field::new(REASONING_FIELD)
            .with_description(format!("Let's think step by step in order to produce the {prefix}"));
        Self {
            signature: signature.prepend_output(reasoning),
        }
    }

    /// The signature including the reasoning field
    #[must_use]
    pub const fn signature(&self) -> &Signature {
        &self.signature
    }

    /// Run the predictor against `lm`
    ///
    /// # Errors
    ///
    /// Returns [`RagError::InvalidInput`] if an input field is missing,
    /// [`RagError::Parse`] if the reply lacks an output field, and any error
    /// from the language model
    pub async fn forward<L>(&self, lm: &mut L, inputs: &IndexMap<String, String>) -> Result<Prediction>
    where
        L: LanguageModel + ?Sized,
    {
        let messages = self.format_messages(inputs)?;
        tracing::debug!(model = lm.model(), outputs = self.signature.outputs.len(), "running chain of thought");

        let completions = lm
            .generate(Prompt::Messages(messages), GenerationParams::new())
            .await?;
        let reply = completions
            .first()
            .ok_or_else(|| RagError::Parse("language model returned no completions".to_string()))?;

        self.parse(reply)
    }

    /// Build the system and user messages for `inputs`
    ///
    /// # Errors
    ///
    /// Returns [`RagError::InvalidInput`] if an input field has no value
    pub fn format_messages(&self, inputs: &IndexMap<String, String>) -> Result<Vec<Message>> {
        let mut user = String::new();
        for name in self.signature.input_names() {
            let value = inputs
                .get(name)
                .ok_or_else(|| RagError::InvalidInput(format!("missing input field `{name}`")))?;
            user.push_str(&format!("[[ ## {name} ## ]]\n{value}\n\n"));
        }

        let outputs: Vec<_> = self
            .signature
            .output_names()
            .map(|name| format!("`[[ ## {name} ## ]]`"))
            .collect();
        user.push_str(&format!(
            "Respond with the corresponding output fields, starting with the field {}, and then ending with the marker for `[[ ## {COMPLETED_MARKER} ## ]]`.",
            outputs.join(", then ")
        ));

        Ok(vec![Message::system(self.system_prompt()), Message::user(user)])
    }

    fn system_prompt(&self) -> String {
        let mut prompt = String::from("Your input fields are:\n");
        push_field_list(&mut prompt, &self.signature.inputs);
        prompt.push_str("Your output fields are:\n");
        push_field_list(&mut prompt, &self.signature.outputs);

        prompt.push_str(
            "\nAll interactions will be structured in the following way, with the appropriate values filled in.\n\n",
        );
        for field in self.signature.inputs.iter().chain(&self.signature.outputs) {
            prompt.push_str(&format!("[[ ## {0} ## ]]\n{{{0}}}\n\n", field.name));
        }
        prompt.push_str(&format!("[[ ## {COMPLETED_MARKER} ## ]]\n\n"));
        prompt.push_str("In adhering to this structure, your objective is: \n        ");
        prompt.push_str(&self.signature.instructions);
        prompt
    }

    /// Extract the output fields from a model reply
    ///
    /// # Errors
    ///
    /// Returns [`RagError::Parse`] if any output field is missing
    pub fn parse(&self, reply: &str) -> Result<Prediction> {
        let mut sections: IndexMap<&str, String> = IndexMap::new();
        let headers: Vec<_> = FIELD_HEADER.captures_iter(reply).collect();

        for (i, caps) in headers.iter().enumerate() {
            let (Some(whole), Some(name)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            let end = headers
                .get(i + 1)
                .and_then(|next| next.get(0))
                .map_or(reply.len(), |m| m.start());
            let name = name.as_str();
            if name == COMPLETED_MARKER || sections.contains_key(name) {
                continue;
            }
            sections.insert(name, reply[whole.end()..end].trim().to_string());
        }

        let mut fields = IndexMap::new();
        for name in self.signature.output_names() {
            let value = sections.swap_remove(name).ok_or_else(|| {
                RagError::Parse(format!("expected field `{name}` in model output"))
            })?;
            fields.insert(name.to_string(), value);
        }
        Ok(Prediction::new(fields))
    }
}

fn push_field_list(out: &mut String, fields: &[Field]) {
    for (i, field) in fields.iter().enumerate() {
        match &field.description {
            Some(description) => {
                out.push_str(&format!("{}. `{}`: {description}\n", i + 1, field.name));
            }
            None => out.push_str(&format!("{}. `{}`\n", i + 1, field.name)),
        }
    }
}
