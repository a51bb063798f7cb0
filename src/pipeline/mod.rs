//! Question answering over slides
//!
//! [`SlidesRag`] pairs a `question -> answer` signature with a
//! [`ChainOfThought`] predictor and the language model it is given at
//! construction.

pub mod chain_of_thought;
pub mod signature;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

pub use self::{
    chain_of_thought::{ChainOfThought, REASONING_FIELD},
    signature::{Field, Signature},
};
use crate::{error::Result, services::LanguageModel};

/// Output fields produced by a predictor, in signature order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Prediction {
    fields: IndexMap<String, String>,
}

impl Prediction {
    #[must_use]
    pub const fn new(fields: IndexMap<String, String>) -> Self {
        Self { fields }
    }

    #[must_use]
    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields.get(field).map(String::as_str)
    }

    #[must_use]
    pub fn answer(&self) -> Option<&str> {
        self.get("answer")
    }

    /// Intermediate reasoning trace, when the predictor produced one
    #[must_use]
    pub fn reasoning(&self) -> Option<&str> {
        self.get(REASONING_FIELD)
    }

    #[must_use]
    pub const fn fields(&self) -> &IndexMap<String, String> {
        &self.fields
    }
}

/// Retrieval-augmented question answering pipeline
pub struct SlidesRag<L> {
    generate_answer: ChainOfThought,
    lm: L,
}

impl<L: LanguageModel> SlidesRag<L> {
    /// Create a pipeline driving `lm`
    pub fn new(lm: L) -> Self {
        Self {
            generate_answer: ChainOfThought::new(Signature::retrieval_generation()),
            lm,
        }
    }

    /// Answer `question`
    ///
    /// # Errors
    ///
    /// Returns any error from the language model, or a parse error if its
    /// reply lacks the answer
    pub async fn forward(&mut self, question: &str) -> Result<Prediction> {
        let inputs = IndexMap::from([("question".to_string(), question.to_string())]);
        let prediction = self.generate_answer.forward(&mut self.lm, &inputs).await?;
        tracing::info!(model = self.lm.model(), "answered question");
        Ok(prediction)
    }

    /// The language model, e.g. to inspect its history
    pub fn lm(&self) -> &L {
        &self.lm
    }

    /// Consume the pipeline, returning its language model
    pub fn into_inner(self) -> L {
        self.lm
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        error::RagError,
        messages::{Prompt, Role},
        services::{CallRecord, GenerationParams},
    };
    use async_trait::async_trait;
    use std::collections::VecDeque;

    /// Replays canned replies and records what it was asked
    struct ScriptedLm {
        replies: VecDeque<String>,
        prompts: Vec<Prompt>,
        history: Vec<CallRecord>,
    }

    impl ScriptedLm {
        fn new(replies: &[&str]) -> Self {
            Self {
                replies: replies.iter().map(|r| (*r).to_string()).collect(),
                prompts: Vec::new(),
                history: Vec::new(),
            }
        }
    }

    #[async_trait]
    impl LanguageModel for ScriptedLm {
        fn model(&self) -> &str {
            "scripted"
        }

        async fn generate(&mut self, prompt: Prompt, _params: GenerationParams) -> Result<Vec<String>> {
            self.prompts.push(prompt);
            let reply = self
                .replies
                .pop_front()
                .ok_or_else(|| RagError::Api {
                    status: 503,
                    message: "script exhausted".into(),
                })?;
            Ok(vec![reply])
        }

        fn history(&self) -> &[CallRecord] {
            &self.history
        }
    }

    #[tokio::test]
    async fn test_forward_returns_answer_and_reasoning() {
        let lm = ScriptedLm::new(&[
            "[[ ## reasoning ## ]]\nThe slides define RAG.\n\n[[ ## answer ## ]]\nRetrieval-augmented generation\n\n[[ ## completed ## ]]",
        ]);
        let mut rag = SlidesRag::new(lm);

        let prediction = rag.forward("What does RAG stand for?").await.unwrap();
        assert_eq!(prediction.answer(), Some("Retrieval-augmented generation"));
        assert_eq!(prediction.reasoning(), Some("The slides define RAG."));

        let lm = rag.into_inner();
        assert_eq!(lm.prompts.len(), 1);
        let Prompt::Messages(messages) = &lm.prompts[0] else {
            panic!("expected a message list");
        };
        assert_eq!(messages[0].role, Role::System);
        assert!(messages[1].content.contains("What does RAG stand for?"));
    }

    #[tokio::test]
    async fn test_forward_surfaces_parse_error() {
        let mut rag = SlidesRag::new(ScriptedLm::new(&["just an answer without headers"]));
        let err = rag.forward("q").await.unwrap_err();
        assert!(matches!(err, RagError::Parse(_)));
    }

    #[tokio::test]
    async fn test_forward_propagates_model_error() {
        let mut rag = SlidesRag::new(ScriptedLm::new(&[]));
        let err = rag.forward("q").await.unwrap_err();
        assert!(err.is_upstream());
    }

    #[tokio::test]
    async fn test_independent_pipelines_use_their_own_models() {
        let answer = |a: &str| format!("[[ ## reasoning ## ]] r [[ ## answer ## ]] {a}");
        let mut first = SlidesRag::new(ScriptedLm::new(&[answer("one").as_str()]));
        let mut second = SlidesRag::new(ScriptedLm::new(&[answer("two").as_str()]));

        assert_eq!(first.forward("q").await.unwrap().answer(), Some("one"));
        assert_eq!(second.forward("q").await.unwrap().answer(), Some("two"));
        assert_eq!(first.lm().prompts.len(), 1);
        assert_eq!(second.lm().prompts.len(), 1);
    }

    #[test]
    fn test_prediction_accessors() {
        let prediction = Prediction::new(IndexMap::from([
            ("reasoning".to_string(), "r".to_string()),
            ("answer".to_string(), "a".to_string()),
        ]));
        assert_eq!(prediction.fields().len(), 2);
        assert_eq!(prediction.get("missing"), None);
    }
}
