//! Question model and the page-supplied input format.

use crate::time::QuestionTime;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// The `correct` field of the input format: a choice index or accepted text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CorrectAnswer {
    Index(usize),
    Text(String),
}

/// One question as written by the embedding page:
/// `{ time: number | "MM:SS", question: string, answers: string[], correct: number | string }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionInput {
    pub time: QuestionTime,
    pub question: String,
    #[serde(default)]
    pub answers: Vec<String>,
    pub correct: CorrectAnswer,
}

#[derive(Debug, Clone, PartialEq)]
pub enum QuestionKind {
    /// One radio input per choice; `correct` indexes into `choices`
    MultipleChoice { choices: Vec<String>, correct: usize },
    /// Free text input; always judged correct, `answer` is revealed afterwards
    FillInBlank { answer: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Question {
    time: QuestionTime,
    // `time` resolved once at construction
    trigger: f64,
    pub prompt: String,
    pub kind: QuestionKind,
    /// Set once, when the question is first displayed
    pub completed: bool,
}

impl Question {
    pub fn multiple_choice(
        time: impl Into<QuestionTime>,
        prompt: impl Into<String>,
        choices: Vec<String>,
        correct: usize,
    ) -> Result<Self> {
        if correct >= choices.len() {
            return Err(Error::InvalidQuestion {
                index: 0,
                reason: format!(
                    "correct answer {} is out of range for {} choices",
                    correct,
                    choices.len()
                ),
            });
        }
        Ok(Self::build(
            time.into(),
            prompt.into(),
            QuestionKind::MultipleChoice { choices, correct },
        ))
    }

    pub fn fill_in_blank(
        time: impl Into<QuestionTime>,
        prompt: impl Into<String>,
        answer: impl Into<String>,
    ) -> Self {
        Self::build(
            time.into(),
            prompt.into(),
            QuestionKind::FillInBlank { answer: answer.into() },
        )
    }

    fn build(time: QuestionTime, prompt: String, kind: QuestionKind) -> Self {
        Self {
            trigger: time.resolve(),
            time,
            prompt,
            kind,
            completed: false,
        }
    }

    /// Convert page input, validating the answer against the question kind.
    /// `index` is the position in the page's list and only feeds error messages.
    pub fn from_input(index: usize, input: QuestionInput) -> Result<Self> {
        let invalid = |reason: String| Error::InvalidQuestion { index, reason };

        let kind = if input.answers.is_empty() {
            let answer = match input.correct {
                CorrectAnswer::Text(text) => text,
                CorrectAnswer::Index(n) => n.to_string(),
            };
            QuestionKind::FillInBlank { answer }
        } else {
            let correct = match input.correct {
                CorrectAnswer::Index(n) => n,
                CorrectAnswer::Text(text) => {
                    return Err(invalid(format!(
                        "multiple-choice answer must be an index, got {:?}",
                        text
                    )))
                }
            };
            if correct >= input.answers.len() {
                return Err(invalid(format!(
                    "correct answer {} is out of range for {} choices",
                    correct,
                    input.answers.len()
                )));
            }
            QuestionKind::MultipleChoice {
                choices: input.answers,
                correct,
            }
        };

        Ok(Self::build(input.time, input.question, kind))
    }

    /// Trigger time as supplied by the page
    pub fn time(&self) -> &QuestionTime {
        &self.time
    }

    /// Trigger time in seconds (`NaN` for malformed or negative times).
    pub fn resolved_time(&self) -> f64 {
        self.trigger
    }

    pub fn is_multiple_choice(&self) -> bool {
        matches!(self.kind, QuestionKind::MultipleChoice { .. })
    }

    /// Whether this question should fire at `position` seconds.
    pub fn is_due(&self, position: f64) -> bool {
        !self.completed && position >= self.resolved_time()
    }
}

/// Convert a list of page inputs, failing on the first invalid entry.
pub fn from_inputs(inputs: Vec<QuestionInput>) -> Result<Vec<Question>> {
    inputs
        .into_iter()
        .enumerate()
        .map(|(i, input)| Question::from_input(i, input))
        .collect()
}

/// Parse a JSON array in the page input format.
pub fn parse_questions(json: &str) -> Result<Vec<Question>> {
    let inputs: Vec<QuestionInput> = serde_json::from_str(json)?;
    from_inputs(inputs)
}

/// Index of the first question, in list order, that is due at `position`.
///
/// List order wins over nearest time: after a seek past several thresholds the
/// earliest-listed pending question fires first.
pub fn select_due(questions: &[Question], position: f64) -> Option<usize> {
    questions.iter().position(|q| q.is_due(position))
}
