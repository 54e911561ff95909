//! Relay module - translates user text to English, asks the model, and
//! translates the cleaned answer back.

pub mod cleaner;
pub mod generator;
pub mod language;
pub mod pipeline;
pub mod prompt;
pub mod session;
pub mod telegram;
pub mod translate;
pub mod validator;

pub use generator::{GenerationInvoker, HuggingFaceClient};
pub use language::Language;
pub use pipeline::{Outcome, Pipeline, Request};
pub use session::SessionStore;
pub use telegram::TelegramClient;
pub use translate::{GoogleTranslateClient, TranslationGateway};
