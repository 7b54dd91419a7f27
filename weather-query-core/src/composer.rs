use std::{sync::Arc, time::Duration};

use tracing::{Span, debug, instrument};

use crate::{
    degrade::degrade_with,
    error::CompletionError,
    llm::LanguageModel,
    model::Fetched,
};

/// Rephrases raw weather reports into friendlier answers.
///
/// One model call per answer, no retries. Any failure, including a timeout,
/// yields the raw report unchanged.
#[derive(Debug, Clone)]
pub struct ResponseComposer {
    model: Option<Arc<dyn LanguageModel>>,
    timeout: Duration,
}

impl ResponseComposer {
    pub fn new(model: Arc<dyn LanguageModel>, timeout: Duration) -> Self {
        Self {
            model: Some(model),
            timeout,
        }
    }

    /// A composer that never calls a model and always returns the raw report.
    pub fn disabled() -> Self {
        Self {
            model: None,
            timeout: Duration::ZERO,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.model.is_some()
    }

    pub fn build_prompt(raw_report: &str, original_query: &str) -> String {
        format!(
            "You are a weather assistant. Rephrase the following weather info into a short, \
             friendly answer. Do not mention tools, agents, or steps.\n\n\
             User question: {original_query}\n\
             Weather info: {raw_report}"
        )
    }

    #[instrument(skip(self, raw_report), fields(model))]
    pub async fn compose(&self, raw_report: &str, original_query: &str) -> Fetched<String> {
        let Some(model) = &self.model else {
            debug!("no language model configured, returning raw report");
            return Fetched::degraded(raw_report.to_string(), "language model disabled");
        };
        Span::current().record("model", model.model());

        let prompt = Self::build_prompt(raw_report, original_query);
        let call = tokio::time::timeout(self.timeout, model.complete(&prompt));

        let result = match call.await {
            Ok(result) => result,
            Err(_) => Err(CompletionError::Timeout(self.timeout)),
        };

        let result = result.and_then(|text| {
            if text.trim().is_empty() {
                Err(CompletionError::Empty)
            } else {
                Ok(text)
            }
        });

        degrade_with("composer", result, |_| raw_report.to_string())
    }
}
