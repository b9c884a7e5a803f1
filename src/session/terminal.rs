//! Line-based learner over any reader/writer pair (stdin/stdout in the CLI)

use std::io::{self, BufRead, Write};
use std::sync::Arc;

use super::{Learner, LearnerAction, SessionEvent};
use crate::i18n::{self, Localization};

pub struct TerminalLearner<R, W> {
    input: R,
    output: W,
    localization: Arc<Localization>,
}

impl<R: BufRead, W: Write> TerminalLearner<R, W> {
    pub fn new(input: R, output: W, localization: Arc<Localization>) -> Self {
        Self {
            input,
            output,
            localization,
        }
    }

    pub fn into_output(self) -> W {
        self.output
    }

    fn render(&self, event: &SessionEvent) -> i18n::Result<String> {
        let l10n = &self.localization;
        match event {
            SessionEvent::CardStarted { index, total } => l10n.render_args(
                "drill.card_header",
                &[("index", index.to_string().as_str()), ("total", total.to_string().as_str())],
            ),
            SessionEvent::Prompt { target_language } => {
                l10n.render_args("drill.menu", &[("target_language", target_language.as_str())])
            }
            SessionEvent::Hint { sentence: Some(sentence) } => Ok(sentence.clone()),
            SessionEvent::Hint { sentence: None } => Ok(l10n.text("drill.no_hint")),
            SessionEvent::Reveal { word } => l10n.render_args("drill.reveal", &[("word", word.as_str())]),
            SessionEvent::Skipped { expected } => Ok(format!(
                "{}\n{}",
                l10n.text("drill.skipped"),
                l10n.render_args("drill.expected", &[("word", expected.as_str())])?
            )),
            SessionEvent::Evaluated { score, hints, expected } => Ok(format!(
                "{}\n{}",
                l10n.render_args(
                    "drill.result",
                    &[("score", score.to_string().as_str()), ("hints", hints.as_str())]
                )?,
                l10n.render_args("drill.expected", &[("word", expected.as_str())])?
            )),
            SessionEvent::CardAborted { error } => l10n.render_args("drill.card_aborted", &[("error", error.as_str())]),
            SessionEvent::EmptyPool => Ok(l10n.text("drill.empty_pool")),
            SessionEvent::Finished { count, average } => {
                let average = average.map(|a| format!("{:.1}", a)).unwrap_or_else(|| "-".to_string());
                l10n.render_args("drill.summary", &[("count", count.to_string().as_str()), ("average", average.as_str())])
            }
        }
    }
}

impl<R: BufRead, W: Write> Learner for TerminalLearner<R, W> {
    /// End of input counts as quitting.
    fn next_action(&mut self) -> io::Result<LearnerAction> {
        write!(self.output, "> ")?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(LearnerAction::Quit);
        }
        Ok(LearnerAction::parse(&line))
    }

    fn notify(&mut self, event: SessionEvent) {
        let text = match self.render(&event) {
            Ok(text) => text,
            Err(e) => {
                log::warn!("Cannot render {:?}: {}", event, e);
                return;
            }
        };
        if let Err(e) = writeln!(self.output, "{}", text) {
            log::warn!("Failed to write to terminal: {}", e);
        }
    }
}
