//! HTTP adapters for the translation and speech services

pub mod openai;

pub use openai::{ChatTranslator, OpenAiClient, SpeechClient};
