//! Collaborators outside the core: language backends and speech output

pub mod backend;
pub mod openai;
pub mod schema;
pub mod speech;

#[cfg(test)]
pub(crate) mod testing;

pub use backend::{BackendError, BackendRequest, Evaluator, Generator};
pub use openai::OpenAiBackend;
pub use speech::{speaker_from_config, spoken_form, CommandSpeaker, SilentSpeaker, Speaker, SpeechError};
