//! Quiz-taking state machine.
//!
//! A [`QuizSession`] walks a question list one question at a time: the
//! learner selects an option, moves forward or back, optionally reveals a
//! hint, and lands on a result summary once the last question is answered.
//! The session is ephemeral per visit; nothing here persists.

use lilt_content::Question;

/// Validation produced when the learner tries to advance without answering.
///
/// This is a user-visible message, not a fault: the session state is
/// unchanged and the learner simply has to pick an option.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("Please select an answer before proceeding")]
pub struct AnswerRequired;

/// Where [`QuizSession::next`] landed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuizStep {
    /// Moved to the question at this index.
    Advanced {
        /// 0-based index of the now-current question.
        question_index: usize,
    },
    /// The last question was answered; the session shows the result summary.
    Finished,
}

/// One row of the result summary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionReview {
    /// The question text.
    pub prompt: String,

    /// What the learner chose, or `None` for an explicit no-answer row.
    pub selection: Option<SelectedAnswer>,

    /// Label of the authoritative correct option (first flagged correct in
    /// declaration order), or `None` when the data flags nothing.
    pub correct_label: Option<String>,
}

/// A learner's recorded choice for one question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedAnswer {
    /// 0-based option index.
    pub option_index: usize,

    /// The chosen option's label.
    pub label: String,

    /// Whether the chosen option is flagged correct.
    pub is_correct: bool,
}

/// Sequential quiz flow over a fixed question list.
///
/// States are `Answering(i)` for `i` in `0..questions.len()`, plus the
/// terminal result view. Answers are sparse: a question the learner never
/// reached simply has no recorded selection and scores zero.
#[derive(Debug, Clone)]
pub struct QuizSession {
    questions: Vec<Question>,
    current: usize,
    answers: Vec<Option<usize>>,
    show_result: bool,
    show_hint: bool,
}

impl QuizSession {
    /// Starts a session at the first question with no recorded answers.
    #[must_use]
    pub fn new(questions: Vec<Question>) -> Self {
        let answers = vec![None; questions.len()];
        Self {
            questions,
            current: 0,
            answers,
            show_result: false,
            show_hint: false,
        }
    }

    /// Number of questions in this quiz.
    #[must_use]
    pub fn question_count(&self) -> usize {
        self.questions.len()
    }

    /// 0-based index of the question currently presented.
    #[must_use]
    pub const fn current_index(&self) -> usize {
        self.current
    }

    /// The question currently presented, if any exist.
    #[must_use]
    pub fn current_question(&self) -> Option<&Question> {
        self.questions.get(self.current)
    }

    /// The recorded option index for the current question.
    #[must_use]
    pub fn current_selection(&self) -> Option<usize> {
        self.answers.get(self.current).copied().flatten()
    }

    /// The recorded option index for an arbitrary question.
    #[must_use]
    pub fn selection_for(&self, question_index: usize) -> Option<usize> {
        self.answers.get(question_index).copied().flatten()
    }

    /// Whether the result summary is showing.
    #[must_use]
    pub const fn is_finished(&self) -> bool {
        self.show_result
    }

    /// Whether the current question's hint is revealed.
    #[must_use]
    pub const fn is_hint_shown(&self) -> bool {
        self.show_hint
    }

    /// Records `option_index` as the answer for the current question,
    /// overwriting any prior selection.
    ///
    /// Option indexes are produced by the view from the question's own
    /// option list, so no range validation happens here.
    pub fn select_option(&mut self, option_index: usize) {
        if let Some(slot) = self.answers.get_mut(self.current) {
            *slot = Some(option_index);
        }
    }

    /// Advances to the next question, or to the result summary from the
    /// last one.
    ///
    /// Moving on requires an answer for the current question; without one
    /// the state is unchanged and [`AnswerRequired`] is returned for the
    /// view to display inline. Advancing hides the hint again.
    pub fn next(&mut self) -> Result<QuizStep, AnswerRequired> {
        if self.show_result {
            return Ok(QuizStep::Finished);
        }
        if self.current_selection().is_none() {
            return Err(AnswerRequired);
        }

        if self.current + 1 < self.questions.len() {
            self.current += 1;
            self.show_hint = false;
            Ok(QuizStep::Advanced {
                question_index: self.current,
            })
        } else {
            self.show_result = true;
            self.show_hint = false;
            Ok(QuizStep::Finished)
        }
    }

    /// Steps back one question; a no-op at the first.
    ///
    /// Never clears a recorded answer. Hides the hint. Returns whether the
    /// index moved.
    pub fn previous(&mut self) -> bool {
        if self.current == 0 {
            return false;
        }
        self.current -= 1;
        self.show_hint = false;
        true
    }

    /// Flips hint visibility for the current question. Scoring ignores it.
    pub fn toggle_hint(&mut self) {
        self.show_hint = !self.show_hint;
    }

    /// Resets to the initial state: first question, no answers, no result,
    /// no hint.
    pub fn retry(&mut self) {
        self.current = 0;
        self.answers = vec![None; self.questions.len()];
        self.show_result = false;
        self.show_hint = false;
    }

    /// Number of questions whose recorded answer is flagged correct.
    #[must_use]
    pub fn correct_count(&self) -> usize {
        self.questions
            .iter()
            .zip(&self.answers)
            .filter(|(question, answer)| {
                answer
                    .and_then(|index| question.options.get(index))
                    .is_some_and(|option| option.is_correct)
            })
            .count()
    }

    /// Score as a percentage rounded to one decimal place.
    ///
    /// Unanswered questions score zero. An empty question list scores `0.0`
    /// rather than dividing by zero (the renderer refuses empty quizzes
    /// upstream, but the arithmetic holds on its own).
    #[must_use]
    pub fn score(&self) -> f64 {
        if self.questions.is_empty() {
            return 0.0;
        }
        #[allow(clippy::cast_precision_loss)] // question counts are tiny
        let raw = self.correct_count() as f64 / self.questions.len() as f64 * 100.0;
        (raw * 10.0).round() / 10.0
    }

    /// Builds the result summary: one row per question with the learner's
    /// choice (or an explicit no-answer) and the correct option's label.
    #[must_use]
    pub fn review(&self) -> Vec<QuestionReview> {
        self.questions
            .iter()
            .zip(&self.answers)
            .map(|(question, answer)| {
                let selection = answer.and_then(|index| {
                    question.options.get(index).map(|option| SelectedAnswer {
                        option_index: index,
                        label: option.label.clone(),
                        is_correct: option.is_correct,
                    })
                });
                QuestionReview {
                    prompt: question.prompt.clone(),
                    selection,
                    correct_label: question
                        .correct_option()
                        .map(|(_, option)| option.label.clone()),
                }
            })
            .collect()
    }
}

// ============================================================================
// Tests
// ============================================================================
