//! Request-to-reply pipeline.
//!
//! One request runs to completion:
//!
//! ```text
//! Received -> Validated -> Translated(fwd) -> Generated -> Cleaned -> Translated(bwd) -> Delivered
//!     \-> RejectedEarly                 any error after Validated -> Errored
//! ```
//!
//! The query counter is bumped on entry to `Validated` and never rolled
//! back, so failed attempts still count.

use std::sync::Arc;

use tracing::{debug, error, info};

use crate::relay::cleaner::clean_result;
use crate::relay::generator::{GenerateError, GenerationInvoker};
use crate::relay::language::Language;
use crate::relay::prompt::build_prompt;
use crate::relay::session::{CallerId, SessionStore};
use crate::relay::translate::{Translated, TranslationGateway};
use crate::relay::validator::{ValidationError, validate};

/// One incoming message.
#[derive(Debug, Clone)]
pub struct Request {
    pub raw_text: String,
    pub caller_id: CallerId,
}

impl Request {
    pub fn new(raw_text: impl Into<String>, caller_id: CallerId) -> Self {
        Self {
            raw_text: raw_text.into(),
            caller_id,
        }
    }
}

/// How a request ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Delivered {
        /// Forward translation failed; the prompt used the original text.
        forward_fallback: bool,
        /// Model output was degenerate and replaced by the canned message.
        cleaned_fallback: bool,
        /// Backward translation failed; the reply is in English.
        backward_fallback: bool,
    },
    RejectedEarly,
    Errored,
}

/// Text for the delivery channel plus how it was produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub text: String,
    pub outcome: Outcome,
}

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("generation failed: {0}")]
    Generate(#[from] GenerateError),
}

/// Sequences validation, translation, generation and cleaning.
pub struct Pipeline {
    session: Arc<SessionStore>,
    translator: TranslationGateway,
    generator: GenerationInvoker,
}

impl Pipeline {
    pub fn new(session: Arc<SessionStore>, translator: TranslationGateway, generator: GenerationInvoker) -> Self {
        Self {
            session,
            translator,
            generator,
        }
    }

    pub fn session(&self) -> &Arc<SessionStore> {
        &self.session
    }

    /// Produce the reply for one request. Never fails: errors become the
    /// apology message in the caller's language.
    pub async fn handle(&self, request: &Request) -> Reply {
        let language = self.session.get_language(request.caller_id);

        if let Err(ValidationError::TooLong { length, limit }) = validate(&request.raw_text) {
            info!("✋ Rejected message from {}: {length} chars (limit {limit})", request.caller_id);
            return Reply {
                text: language.too_long(limit),
                outcome: Outcome::RejectedEarly,
            };
        }

        let count = self.session.increment_query_count();
        debug!("Query #{count} from {} ({language})", request.caller_id);

        match self.run(&request.raw_text, language).await {
            Ok(reply) => reply,
            Err(e) => {
                error!("Pipeline error for {}: {e}", request.caller_id);
                Reply {
                    text: language.apology().to_string(),
                    outcome: Outcome::Errored,
                }
            }
        }
    }

    async fn run(&self, raw_text: &str, language: Language) -> Result<Reply, PipelineError> {
        let forward = self.translator.to_english(raw_text).await;

        let prompt = build_prompt(&forward.text);
        let raw_output = self.generator.generate(&prompt).await?;

        let result = clean_result(&raw_output, &prompt, language);
        debug!(
            "Generated {} chars, cleaned to {} (fallback: {})",
            result.raw_output.chars().count(),
            result.cleaned_output.chars().count(),
            result.is_fallback
        );

        // The fallback message is already in the caller's language.
        let backward = if result.is_fallback {
            Translated {
                text: result.cleaned_output,
                used_fallback: false,
            }
        } else {
            self.translator.from_english(&result.cleaned_output, language).await
        };

        let outcome = Outcome::Delivered {
            forward_fallback: forward.used_fallback,
            cleaned_fallback: result.is_fallback,
            backward_fallback: backward.used_fallback,
        };
        info!("✅ Reply ready: {outcome:?}");

        Ok(Reply {
            text: backward.text,
            outcome,
        })
    }
}
