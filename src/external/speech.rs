//! Speech output. Playback blocks until the utterance finished; failures are
//! reported to the caller, which carries on without audio.

use std::process::Command;
use std::sync::OnceLock;

use regex::Regex;
use thiserror::Error;

use crate::config::SpeechConfig;

#[derive(Error, Debug)]
pub enum SpeechError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Speech command failed: {0}")]
    Failed(String),
}

pub trait Speaker: Send + Sync {
    fn speak(&self, text: &str, language: &str) -> Result<(), SpeechError>;
}

/// Speaker that plays nothing
pub struct SilentSpeaker;

impl Speaker for SilentSpeaker {
    fn speak(&self, _text: &str, _language: &str) -> Result<(), SpeechError> {
        Ok(())
    }
}

/// Runs an external TTS program once per utterance
pub struct CommandSpeaker {
    program: String,
    args: Vec<String>,
}

impl CommandSpeaker {
    pub fn new(program: String, args: Vec<String>) -> Self {
        Self { program, args }
    }

    fn expand_args(&self, text: &str, language: &str) -> Vec<String> {
        self.args
            .iter()
            .map(|arg| arg.replace("{lang}", language).replace("{text}", text))
            .collect()
    }
}

impl Speaker for CommandSpeaker {
    fn speak(&self, text: &str, language: &str) -> Result<(), SpeechError> {
        let text = spoken_form(text);
        if text.is_empty() {
            return Ok(());
        }
        let status = Command::new(&self.program)
            .args(self.expand_args(&text, language))
            .status()?;
        if status.success() {
            Ok(())
        } else {
            Err(SpeechError::Failed(format!("{} exited with {}", self.program, status)))
        }
    }
}

/// Build the speaker described by the config
pub fn speaker_from_config(config: &SpeechConfig) -> Box<dyn Speaker> {
    if config.enabled {
        Box::new(CommandSpeaker::new(config.command.clone(), config.args.clone()))
    } else {
        Box::new(SilentSpeaker)
    }
}

/// Text as it should be spoken: parenthesized parts such as articles in
/// `"(le) livre"` are dropped and whitespace is collapsed.
pub fn spoken_form(text: &str) -> String {
    static PARENS: OnceLock<Regex> = OnceLock::new();
    let re = PARENS.get_or_init(|| Regex::new(r"\([^)]*\)").expect("valid parenthesis regex"));
    re.replace_all(text, " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}
