//! Question presentation: renders a question form and judges submissions.

use crate::question::{Question, QuestionKind};
use crate::render::{escape_html, ElementIds, RenderTarget};
use crate::{Error, Result};
use log::{debug, warn};

/// What the viewer submitted
#[derive(Debug, Clone, PartialEq)]
pub enum Submission {
    /// Index of the selected radio input
    Choice(usize),
    /// Free text (fill-in-the-blank)
    Text(String),
}

/// Outcome of one submission
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Judgement {
    Correct,
    Incorrect,
    /// Fill-in-the-blank: always accepted, answer revealed
    Thanks,
}

impl Judgement {
    /// Feedback shown on the submit control
    pub fn feedback(self) -> &'static str {
        match self {
            Judgement::Correct => "Correct!",
            Judgement::Incorrect => "Try again",
            Judgement::Thanks => "Thanks!",
        }
    }

    /// Whether the submit control stays disabled from now on
    pub fn is_final(self) -> bool {
        !matches!(self, Judgement::Incorrect)
    }
}

/// A rendered question awaiting answers and the Continue click.
#[derive(Debug, Clone)]
pub struct QuestionForm {
    ids: ElementIds,
    index: usize,
    kind: QuestionKind,
    submit_enabled: bool,
    finished: bool,
    attempts: usize,
}

impl QuestionForm {
    /// Render `question` into the widget's question container.
    ///
    /// Fails with `MissingElement` when the container is absent; nothing is
    /// rendered in that case.
    pub fn render(
        target: &dyn RenderTarget,
        ids: &ElementIds,
        index: usize,
        question: &Question,
    ) -> Result<Self> {
        if !target.has_element(&ids.question) {
            return Err(Error::MissingElement(ids.question.clone()));
        }
        target.set_inner_html(&ids.question, &form_html(ids, question))?;
        debug!("Rendered question {} into #{}", index, ids.question);

        Ok(Self {
            ids: ids.clone(),
            index,
            kind: question.kind.clone(),
            submit_enabled: false,
            finished: false,
            attempts: 0,
        })
    }

    /// Position of the question in the controller's list
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn submit_enabled(&self) -> bool {
        self.submit_enabled
    }

    /// A final judgement was reached; submit stays disabled
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn attempts(&self) -> usize {
        self.attempts
    }

    /// Change/input event anywhere in the form: enables Submit until the
    /// question is finished. Returns whether Submit is enabled afterwards.
    pub fn on_input(&mut self, target: &dyn RenderTarget) -> bool {
        if self.finished {
            return false;
        }
        if !self.submit_enabled {
            self.submit_enabled = true;
            log_failure(target.set_disabled(&self.ids.submit, false));
        }
        true
    }

    /// Judge a submission. Returns `None` when the submission is ignored
    /// (Submit disabled, or no usable choice for a multiple-choice question).
    pub fn submit(&mut self, target: &dyn RenderTarget, submission: Submission) -> Option<Judgement> {
        if !self.submit_enabled || self.finished {
            debug!("Ignoring submission for question {} while submit is disabled", self.index);
            return None;
        }

        let judgement = match &self.kind {
            QuestionKind::FillInBlank { answer } => {
                log_failure(target.set_text(&self.ids.solution, answer));
                Judgement::Thanks
            }
            QuestionKind::MultipleChoice { choices, correct } => {
                let chosen = match submission {
                    Submission::Choice(i) if i < choices.len() => i,
                    Submission::Text(ref text) => match text.trim().parse::<usize>() {
                        Ok(i) if i < choices.len() => i,
                        _ => return None,
                    },
                    Submission::Choice(_) => return None,
                };
                let right = chosen == *correct;
                log_failure(target.set_attribute(
                    &self.ids.choice_label(chosen),
                    "class",
                    if right { "correct" } else { "incorrect" },
                ));
                log_failure(target.set_attribute(
                    &self.ids.choice(chosen),
                    "aria-invalid",
                    if right { "false" } else { "true" },
                ));
                if right {
                    Judgement::Correct
                } else {
                    Judgement::Incorrect
                }
            }
        };

        self.attempts += 1;
        if judgement.is_final() {
            self.finished = true;
            self.submit_enabled = false;
            log_failure(target.set_disabled(&self.ids.submit, true));
        }
        log_failure(target.set_text(&self.ids.submit, judgement.feedback()));
        Some(judgement)
    }
}

fn log_failure(res: Result<()>) {
    if let Err(e) = res {
        warn!("Question form update skipped: {}", e);
    }
}

fn form_html(ids: &ElementIds, question: &Question) -> String {
    let inputs = match &question.kind {
        QuestionKind::MultipleChoice { choices, .. } => choices
            .iter()
            .enumerate()
            .map(|(i, choice)| {
                format!(
                    r#"<label id="{label}" for="{input}"><input type="radio" id="{input}" name="answer" value="{i}">{text}</label>"#,
                    label = ids.choice_label(i),
                    input = ids.choice(i),
                    i = i,
                    text = escape_html(choice),
                )
            })
            .collect::<String>(),
        QuestionKind::FillInBlank { .. } => format!(
            r#"<input type="text" id="{}" name="answer"><div id="{}"></div>"#,
            ids.answer_input, ids.solution
        ),
    };

    format!(
        concat!(
            r#"<form id="{form}"><fieldset>"#,
            r#"<div id="{prompt_id}">{prompt}</div>"#,
            r#"<div>{inputs}</div>"#,
            r#"<div><button id="{submit}" type="submit" disabled>Submit</button>"#,
            r#"<button id="{cont}" type="button" class="secondary">Continue</button></div>"#,
            r#"</fieldset></form>"#
        ),
        form = ids.form,
        prompt_id = ids.prompt,
        prompt = escape_html(&question.prompt),
        inputs = inputs,
        submit = ids.submit,
        cont = ids.continue_button,
    )
}
