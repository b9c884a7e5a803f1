//! One card of a drill: pose, let the learner explore, evaluate, record.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{Learner, Result, SessionEvent};
use crate::external::schema::rating_schema;
use crate::external::{BackendRequest, Evaluator, Speaker};
use crate::performance::{AttemptRecord, Direction, PerformanceLedger};
use crate::vocabulary::{EntryStore, LearningCard, VocabEntry};

pub const EVALUATE_PROMPT: &str = "vocab_learning_unit.evaluate_translation";

/// Score reported for a skipped card; the ledger stores `SKIPPED_RATING` instead
pub const SKIPPED_SCORE: i32 = 0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CardState {
    Posed,
    Repeating,
    HintRequested,
    RevealRequested,
    Answered,
    Skipped,
    Evaluated,
    Recorded,
}

/// What the learner did at the prompt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LearnerAction {
    Repeat,
    Hint,
    Reveal,
    Answer(String),
    Skip,
    Quit,
}

impl LearnerAction {
    /// Menu parsing: `1` repeat, `2` example sentence, `3` written form,
    /// `q` quit, empty input skips, anything else is an answer.
    pub fn parse(input: &str) -> Self {
        match input.trim() {
            "" => Self::Skip,
            "1" => Self::Repeat,
            "2" => Self::Hint,
            "3" => Self::Reveal,
            "q" | "Q" => Self::Quit,
            answer => Self::Answer(answer.to_string()),
        }
    }
}

/// The evaluator's verdict on one answer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Evaluation {
    pub score: i32,
    pub hints: String,
}

impl Evaluation {
    /// Read `{"score": int, "hints": string}`; the score is clamped to 0..=100.
    pub fn from_reply(reply: &Value) -> std::result::Result<Self, String> {
        let object = reply
            .as_object()
            .ok_or_else(|| format!("expected an object, got {}", reply))?;
        let score = object
            .get("score")
            .and_then(|s| s.as_i64().or_else(|| s.as_f64().map(|f| f.round() as i64)))
            .ok_or_else(|| "reply has no numeric score".to_string())?;
        let hints = object
            .get("hints")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();

        Ok(Self {
            score: score.clamp(0, 100) as i32,
            hints,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeStatus {
    Evaluated,
    Skipped,
    /// Evaluation or recording failed; nothing was written to the ledger
    Aborted,
}

/// Result of one card, as it appears in the session report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardOutcome {
    pub meaning_en: String,
    pub source_language: String,
    pub source_word: String,
    pub target_language: String,
    pub target_word: String,
    pub direction: Direction,
    pub user_input: String,
    pub score: i32,
    pub hints: String,
    pub status: OutcomeStatus,
    pub states: Vec<CardState>,
}

pub enum CardResult {
    Completed(CardOutcome),
    Quit,
}

/// Collaborators a card needs while it runs
pub struct CardEnv<'a> {
    pub store: &'a EntryStore,
    pub speaker: &'a dyn Speaker,
    pub evaluator: &'a dyn Evaluator,
}

pub struct LearningUnit<'a> {
    card: &'a LearningCard,
    direction: Direction,
    states: Vec<CardState>,
    /// Picks the example sentence for hints
    rng: StdRng,
}

impl<'a> LearningUnit<'a> {
    pub fn new(card: &'a LearningCard, direction: Direction) -> Self {
        Self {
            card,
            direction,
            states: Vec::new(),
            rng: StdRng::from_entropy(),
        }
    }

    /// Make hint choices reproducible
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    /// The entry shown to the learner
    pub fn posed(&self) -> &'a VocabEntry {
        match self.direction {
            Direction::Source => &self.card.source,
            Direction::Translation => &self.card.target,
        }
    }

    /// The entry the learner should produce
    pub fn expected(&self) -> &'a VocabEntry {
        match self.direction {
            Direction::Source => &self.card.target,
            Direction::Translation => &self.card.source,
        }
    }

    pub fn states(&self) -> &[CardState] {
        &self.states
    }

    fn speak(&self, env: &CardEnv<'_>, text: &str, language: &str) {
        if let Err(e) = env.speaker.speak(text, language) {
            log::warn!("Speech output failed for '{}': {}", text, e);
        }
    }

    fn random_sentence(&mut self, env: &CardEnv<'_>) -> Option<VocabEntry> {
        let sentences = env.store.resolve_linked_sentences(self.posed());
        sentences.choose(&mut self.rng).cloned()
    }

    /// Drive the card to completion. Only learner I/O failures are errors;
    /// a failed evaluation or ledger write aborts this card alone.
    pub async fn run(
        &mut self,
        env: &CardEnv<'_>,
        ledger: &mut PerformanceLedger,
        learner: &mut dyn Learner,
    ) -> Result<CardResult> {
        let posed = self.posed();
        let expected = self.expected();

        self.states.push(CardState::Posed);
        self.speak(env, &posed.word, posed.language());

        let answer = loop {
            learner.notify(SessionEvent::Prompt {
                target_language: expected.language().to_string(),
            });

            match learner.next_action()? {
                LearnerAction::Repeat => {
                    self.states.push(CardState::Repeating);
                    self.speak(env, &posed.word, posed.language());
                }
                LearnerAction::Hint => {
                    self.states.push(CardState::HintRequested);
                    let sentence = self.random_sentence(env);
                    if let Some(sentence) = &sentence {
                        self.speak(env, &sentence.word, sentence.language());
                    }
                    learner.notify(SessionEvent::Hint {
                        sentence: sentence.map(|s| s.word),
                    });
                }
                LearnerAction::Reveal => {
                    self.states.push(CardState::RevealRequested);
                    learner.notify(SessionEvent::Reveal {
                        word: posed.word.clone(),
                    });
                }
                LearnerAction::Quit => return Ok(CardResult::Quit),
                LearnerAction::Skip => break None,
                LearnerAction::Answer(text) => break Some(text),
            }
        };

        let (source_word, translation_word) = (&self.card.source.word, &self.card.target.word);

        let Some(user_input) = answer else {
            self.states.push(CardState::Skipped);
            learner.notify(SessionEvent::Skipped {
                expected: expected.word.clone(),
            });

            let record = AttemptRecord::skipped(source_word, translation_word, self.direction);
            let status = match ledger.record(record) {
                Ok(()) => {
                    self.states.push(CardState::Recorded);
                    OutcomeStatus::Skipped
                }
                Err(e) => {
                    log::warn!("Dropping skipped result for '{}': {}", self.card.meaning_en(), e);
                    OutcomeStatus::Aborted
                }
            };
            return Ok(CardResult::Completed(self.outcome(String::new(), SKIPPED_SCORE, String::new(), status)));
        };

        self.states.push(CardState::Answered);
        let request = BackendRequest::new(EVALUATE_PROMPT, rating_schema())
            .param("from_language", posed.language())
            .param("to_language", expected.language())
            .param("source_word", &posed.word)
            .param("meaning_en", self.card.meaning_en())
            .param("user_translation", &user_input);

        let evaluation = match env.evaluator.evaluate(request).await {
            Ok(reply) => Evaluation::from_reply(&reply),
            Err(e) => Err(e.to_string()),
        };
        let evaluation = match evaluation {
            Ok(evaluation) => evaluation,
            Err(error) => {
                log::warn!("Evaluation of '{}' failed: {}", self.card.meaning_en(), error);
                learner.notify(SessionEvent::CardAborted { error });
                return Ok(CardResult::Completed(self.outcome(user_input, 0, String::new(), OutcomeStatus::Aborted)));
            }
        };

        self.states.push(CardState::Evaluated);
        learner.notify(SessionEvent::Evaluated {
            score: evaluation.score,
            hints: evaluation.hints.clone(),
            expected: expected.word.clone(),
        });

        let record = AttemptRecord::new(
            source_word,
            translation_word,
            self.direction,
            &user_input,
            evaluation.score,
            &evaluation.hints,
        );
        let status = match ledger.record(record) {
            Ok(()) => {
                self.states.push(CardState::Recorded);
                OutcomeStatus::Evaluated
            }
            Err(e) => {
                log::warn!("Dropping result for '{}': {}", self.card.meaning_en(), e);
                learner.notify(SessionEvent::CardAborted { error: e.to_string() });
                OutcomeStatus::Aborted
            }
        };

        Ok(CardResult::Completed(self.outcome(
            user_input,
            evaluation.score,
            evaluation.hints,
            status,
        )))
    }

    fn outcome(&self, user_input: String, score: i32, hints: String, status: OutcomeStatus) -> CardOutcome {
        CardOutcome {
            meaning_en: self.card.meaning_en().to_string(),
            source_language: self.card.source.language().to_string(),
            source_word: self.card.source.word.clone(),
            target_language: self.card.target.language().to_string(),
            target_word: self.card.target.word.clone(),
            direction: self.direction,
            user_input,
            score,
            hints,
            status,
            states: self.states.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::external::testing::{CountingEvaluator, RecordingSpeaker};
    use crate::performance::SKIPPED_RATING;
    use crate::session::testing::ScriptedLearner;
    use crate::vocabulary::link_example_sentence;
    use serde_json::json;
    use tempfile::TempDir;

    fn noun(meaning: &str, language: &str, word: &str) -> VocabEntry {
        VocabEntry::new(meaning, language, vec!["noun".into()])
            .unwrap()
            .with_word(word)
    }

    fn card() -> LearningCard {
        LearningCard::new(noun("dog", "fr", "(le) chien"), noun("dog", "de", "(der) Hund")).unwrap()
    }

    fn store() -> (EntryStore, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        (EntryStore::new(temp_dir.path().join("vocabulary")), temp_dir)
    }

    #[test]
    fn test_parse_actions() {
        assert_eq!(LearnerAction::parse(""), LearnerAction::Skip);
        assert_eq!(LearnerAction::parse("  "), LearnerAction::Skip);
        assert_eq!(LearnerAction::parse("1"), LearnerAction::Repeat);
        assert_eq!(LearnerAction::parse("2"), LearnerAction::Hint);
        assert_eq!(LearnerAction::parse("3"), LearnerAction::Reveal);
        assert_eq!(LearnerAction::parse("q"), LearnerAction::Quit);
        assert_eq!(LearnerAction::parse(" Hund "), LearnerAction::Answer("Hund".into()));
    }

    #[test]
    fn test_evaluation_from_reply() {
        let ok = Evaluation::from_reply(&json!({ "score": 130, "hints": "perfect" })).unwrap();
        assert_eq!(ok, Evaluation { score: 100, hints: "perfect".into() });

        let float = Evaluation::from_reply(&json!({ "score": 72.6 })).unwrap();
        assert_eq!(float.score, 73);
        assert_eq!(float.hints, "");

        assert!(Evaluation::from_reply(&json!({ "hints": "no score" })).is_err());
        assert!(Evaluation::from_reply(&json!("90")).is_err());
    }

    #[tokio::test]
    async fn test_skip_records_sentinel_without_evaluation() {
        let (store, _temp_dir) = store();
        let speaker = RecordingSpeaker::default();
        let evaluator = CountingEvaluator::scoring(90, "good");
        let env = CardEnv { store: &store, speaker: &speaker, evaluator: &evaluator };
        let mut ledger = PerformanceLedger::in_memory();
        let mut learner = ScriptedLearner::new(&[""]);
        let card = card();

        let mut unit = LearningUnit::new(&card, Direction::Source);
        let CardResult::Completed(outcome) = unit.run(&env, &mut ledger, &mut learner).await.unwrap() else {
            panic!("card should complete");
        };

        assert_eq!(evaluator.calls(), 0);
        assert_eq!(outcome.status, OutcomeStatus::Skipped);
        assert_eq!(outcome.score, SKIPPED_SCORE);
        assert_eq!(ledger.records()[0].rating, SKIPPED_RATING);
        assert_eq!(outcome.states, vec![CardState::Posed, CardState::Skipped, CardState::Recorded]);
    }

    #[tokio::test]
    async fn test_explore_then_answer() {
        let (mut store, _temp_dir) = store();
        let mut base = noun("dog", "fr", "(le) chien");
        let mut sentence = VocabEntry::new("The dog sleeps.", "fr", vec!["phrase".into()])
            .unwrap()
            .with_word("Le chien dort.");
        link_example_sentence(&mut base, &mut sentence);
        store.add(sentence, false).unwrap();
        let card = LearningCard::new(base, noun("dog", "de", "(der) Hund")).unwrap();

        let speaker = RecordingSpeaker::default();
        let evaluator = CountingEvaluator::scoring(80, "Add the article.");
        let env = CardEnv { store: &store, speaker: &speaker, evaluator: &evaluator };
        let mut ledger = PerformanceLedger::in_memory();
        let mut learner = ScriptedLearner::new(&["1", "2", "3", "Hund"]);

        let mut unit = LearningUnit::new(&card, Direction::Source);
        let CardResult::Completed(outcome) = unit.run(&env, &mut ledger, &mut learner).await.unwrap() else {
            panic!("card should complete");
        };

        assert_eq!(evaluator.calls(), 1);
        let params = &evaluator.requests()[0].params;
        assert_eq!(params["source_word"], "(le) chien");
        assert_eq!(params["user_translation"], "Hund");
        assert_eq!(params["to_language"], "de");

        assert_eq!(
            speaker.spoken(),
            vec![
                ("(le) chien".to_string(), "fr".to_string()),
                ("(le) chien".to_string(), "fr".to_string()),
                ("Le chien dort.".to_string(), "fr".to_string()),
            ]
        );
        assert!(learner.events().contains(&SessionEvent::Reveal { word: "(le) chien".into() }));
        assert!(learner.events().contains(&SessionEvent::Hint { sentence: Some("Le chien dort.".into()) }));

        assert_eq!(outcome.score, 80);
        assert_eq!(
            outcome.states,
            vec![
                CardState::Posed,
                CardState::Repeating,
                CardState::HintRequested,
                CardState::RevealRequested,
                CardState::Answered,
                CardState::Evaluated,
                CardState::Recorded,
            ]
        );

        let record = &ledger.records()[0];
        assert_eq!((record.source_word.as_str(), record.translation_word.as_str()), ("(le) chien", "(der) Hund"));
        assert_eq!(record.rating, 80);
        assert_eq!(record.hint, "Add the article.");
    }

    #[tokio::test]
    async fn test_translation_direction_poses_target() {
        let (store, _temp_dir) = store();
        let speaker = RecordingSpeaker::default();
        let evaluator = CountingEvaluator::scoring(100, "");
        let env = CardEnv { store: &store, speaker: &speaker, evaluator: &evaluator };
        let mut ledger = PerformanceLedger::in_memory();
        let mut learner = ScriptedLearner::new(&["chien"]);
        let card = card();

        let mut unit = LearningUnit::new(&card, Direction::Translation);
        unit.run(&env, &mut ledger, &mut learner).await.unwrap();

        assert_eq!(speaker.spoken()[0].1, "de");
        assert_eq!(evaluator.requests()[0].params["to_language"], "fr");
        let record = &ledger.records()[0];
        assert_eq!(record.source_word, "(le) chien");
        assert_eq!(record.direction, Direction::Translation);
    }

    #[tokio::test]
    async fn test_malformed_evaluation_aborts_card() {
        let (store, _temp_dir) = store();
        let speaker = RecordingSpeaker::default();
        let evaluator = CountingEvaluator::new(json!({ "rating": "great" }));
        let env = CardEnv { store: &store, speaker: &speaker, evaluator: &evaluator };
        let mut ledger = PerformanceLedger::in_memory();
        let mut learner = ScriptedLearner::new(&["Hund"]);
        let card = card();

        let mut unit = LearningUnit::new(&card, Direction::Source);
        let CardResult::Completed(outcome) = unit.run(&env, &mut ledger, &mut learner).await.unwrap() else {
            panic!("card should complete");
        };

        assert_eq!(outcome.status, OutcomeStatus::Aborted);
        assert!(ledger.is_empty());
        assert!(matches!(learner.events().last(), Some(SessionEvent::CardAborted { .. })));
    }

    #[tokio::test]
    async fn test_quit_records_nothing() {
        let (store, _temp_dir) = store();
        let speaker = RecordingSpeaker::default();
        let evaluator = CountingEvaluator::scoring(100, "");
        let env = CardEnv { store: &store, speaker: &speaker, evaluator: &evaluator };
        let mut ledger = PerformanceLedger::in_memory();
        let mut learner = ScriptedLearner::new(&["3", "q"]);
        let card = card();

        let mut unit = LearningUnit::new(&card, Direction::Source);
        let result = unit.run(&env, &mut ledger, &mut learner).await.unwrap();

        assert!(matches!(result, CardResult::Quit));
        assert!(ledger.is_empty());
    }

    #[tokio::test]
    async fn test_seeded_hints_are_reproducible() {
        let (mut store, _temp_dir) = store();
        let mut base = noun("dog", "fr", "(le) chien");
        for (meaning, word) in [
            ("The dog sleeps.", "Le chien dort."),
            ("The dog barks.", "Le chien aboie."),
            ("The dog eats.", "Le chien mange."),
            ("The dog runs.", "Le chien court."),
        ] {
            let mut sentence = VocabEntry::new(meaning, "fr", vec!["phrase".into()])
                .unwrap()
                .with_word(word);
            link_example_sentence(&mut base, &mut sentence);
            store.add(sentence, false).unwrap();
        }
        let card = LearningCard::new(base, noun("dog", "de", "(der) Hund")).unwrap();

        let hints_for = |seed: u64| {
            let store = &store;
            let card = &card;
            async move {
                let speaker = RecordingSpeaker::default();
                let evaluator = CountingEvaluator::scoring(50, "");
                let env = CardEnv { store, speaker: &speaker, evaluator: &evaluator };
                let mut ledger = PerformanceLedger::in_memory();
                let mut learner = ScriptedLearner::new(&["2", "2", "2", "2", "2", "2", ""]);

                let mut unit = LearningUnit::new(card, Direction::Source).with_seed(seed);
                unit.run(&env, &mut ledger, &mut learner).await.unwrap();
                learner
                    .events()
                    .iter()
                    .filter_map(|event| match event {
                        SessionEvent::Hint { sentence } => sentence.clone(),
                        _ => None,
                    })
                    .collect::<Vec<_>>()
            }
        };

        let first = hints_for(42).await;
        assert_eq!(first.len(), 6);
        assert_eq!(first, hints_for(42).await);
    }
}
