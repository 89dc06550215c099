//! Quizzes, their questions and answer choices.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::learning_module::{storage_enum, validate_title};
use super::auth::normalise_optional;
use super::{Error, UserId};

/// Default pass threshold in percent.
pub const DEFAULT_PASSING_SCORE: i32 = 60;

/// Perceived difficulty of a quiz.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum QuizDifficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

storage_enum!(QuizDifficulty, "quiz difficulty", {
    Easy => "easy",
    Medium => "medium",
    Hard => "hard",
});

/// Shape of a question's answer set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum QuestionType {
    /// Two or more choices, exactly one correct.
    #[default]
    MultipleChoice,
    /// Exactly two choices, exactly one correct.
    TrueFalse,
}

storage_enum!(QuestionType, "question type", {
    MultipleChoice => "multiple_choice",
    TrueFalse => "true_false",
});

/// Stored quiz header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Quiz {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub module_id: Uuid,
    pub created_by: Option<UserId>,
    pub settings: QuizSettings,
    pub total_questions: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Author-controlled quiz behaviour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuizSettings {
    pub difficulty: QuizDifficulty,
    /// Pass threshold in percent, `0..=100`.
    pub passing_score: i32,
    /// Advisory time limit in minutes; not enforced on submission.
    pub time_limit_minutes: Option<i32>,
    pub is_published: bool,
    pub shuffle_questions: bool,
    pub show_answers: bool,
    /// `None` means unlimited attempts.
    pub max_attempts: Option<i32>,
}

impl Default for QuizSettings {
    fn default() -> Self {
        Self {
            difficulty: QuizDifficulty::default(),
            passing_score: DEFAULT_PASSING_SCORE,
            time_limit_minutes: None,
            is_published: false,
            shuffle_questions: true,
            show_answers: true,
            max_attempts: None,
        }
    }
}

impl Quiz {
    /// Build a new quiz with no questions.
    pub fn create(fields: QuizFields, author: UserId, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: fields.title,
            description: fields.description,
            module_id: fields.module_id,
            created_by: Some(author),
            settings: fields.settings,
            total_questions: 0,
            created_at: now,
            updated_at: now,
        }
    }

    /// Replace editable fields.
    pub fn apply(&mut self, fields: QuizFields, now: DateTime<Utc>) {
        self.title = fields.title;
        self.description = fields.description;
        self.module_id = fields.module_id;
        self.settings = fields.settings;
        self.updated_at = now;
    }

    /// Whether the quiz is visible to learners.
    pub fn is_published(&self) -> bool {
        self.settings.is_published
    }

    /// Whether `attempts_used` exhausts the attempt allowance.
    pub fn attempts_exhausted(&self, attempts_used: u64) -> bool {
        self.settings
            .max_attempts
            .and_then(|limit| u64::try_from(limit).ok())
            .is_some_and(|limit| attempts_used >= limit)
    }

    /// Whether `viewer` may read the quiz.
    pub fn visible_to(&self, viewer: Option<&super::User>) -> bool {
        self.is_published()
            || viewer.is_some_and(|user| user.can_manage(self.created_by.as_ref()))
    }
}

/// Raw author input for a quiz.
#[derive(Debug, Clone, Default)]
pub struct QuizForm {
    pub title: String,
    pub description: String,
    pub module_id: Uuid,
    pub difficulty: Option<QuizDifficulty>,
    pub passing_score: Option<i32>,
    pub time_limit_minutes: Option<i32>,
    pub is_published: Option<bool>,
    pub shuffle_questions: Option<bool>,
    pub show_answers: Option<bool>,
    pub max_attempts: Option<i32>,
}

/// Validated quiz fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizFields {
    pub title: String,
    pub description: String,
    pub module_id: Uuid,
    pub settings: QuizSettings,
}

impl TryFrom<QuizForm> for QuizFields {
    type Error = Error;

    fn try_from(form: QuizForm) -> Result<Self, Self::Error> {
        let defaults = QuizSettings::default();
        let passing_score = form.passing_score.unwrap_or(defaults.passing_score);
        if !(0..=100).contains(&passing_score) {
            return Err(Error::invalid_field(
                "passingScore",
                "passing_score_out_of_range",
                "passing score must be between 0 and 100",
            ));
        }
        if form.time_limit_minutes.is_some_and(|minutes| minutes < 1) {
            return Err(Error::invalid_field(
                "timeLimitMinutes",
                "invalid_time_limit",
                "time limit must be at least one minute",
            ));
        }
        if form.max_attempts.is_some_and(|limit| limit < 1) {
            return Err(Error::invalid_field(
                "maxAttempts",
                "invalid_max_attempts",
                "max attempts must be at least 1",
            ));
        }
        Ok(Self {
            title: validate_title(&form.title)?,
            description: form.description.trim().to_owned(),
            module_id: form.module_id,
            settings: QuizSettings {
                difficulty: form.difficulty.unwrap_or(defaults.difficulty),
                passing_score,
                time_limit_minutes: form.time_limit_minutes,
                is_published: form.is_published.unwrap_or(defaults.is_published),
                shuffle_questions: form.shuffle_questions.unwrap_or(defaults.shuffle_questions),
                show_answers: form.show_answers.unwrap_or(defaults.show_answers),
                max_attempts: form.max_attempts,
            },
        })
    }
}

/// Answer choice belonging to a question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Choice {
    pub id: Uuid,
    pub question_id: Uuid,
    pub text: String,
    pub is_correct: bool,
    pub order: i32,
}

/// Largest number of points a single question may carry.
pub const POINTS_MAX: i32 = 1000;

/// Question with its choices, ordered by `order`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    pub id: Uuid,
    pub quiz_id: Uuid,
    pub text: String,
    pub question_type: QuestionType,
    pub order: i32,
    pub explanation: Option<String>,
    pub points: i32,
    pub choices: Vec<Choice>,
}

impl Question {
    /// The choice flagged correct, if any.
    pub fn correct_choice(&self) -> Option<&Choice> {
        self.choices.iter().find(|choice| choice.is_correct)
    }

    /// Look up one of this question's choices.
    pub fn choice(&self, choice_id: &Uuid) -> Option<&Choice> {
        self.choices.iter().find(|choice| &choice.id == choice_id)
    }
}

/// Raw choice input.
#[derive(Debug, Clone, Default)]
pub struct ChoiceForm {
    pub text: String,
    pub is_correct: bool,
}

/// Raw question input with inline choices.
#[derive(Debug, Clone, Default)]
pub struct QuestionForm {
    pub text: String,
    pub question_type: Option<QuestionType>,
    pub order: Option<i32>,
    pub explanation: Option<String>,
    pub points: Option<i32>,
    pub choices: Vec<ChoiceForm>,
}

impl QuestionForm {
    /// Validate the form and materialise a question for `quiz_id`.
    ///
    /// `next_order` is used when the form omits an explicit order.
    pub fn into_question(self, quiz_id: Uuid, next_order: i32) -> Result<Question, Error> {
        let text = self.text.trim().to_owned();
        if text.is_empty() {
            return Err(Error::invalid_field(
                "text",
                "empty_question",
                "question text must not be empty",
            ));
        }
        let points = self.points.unwrap_or(1);
        if !(1..=POINTS_MAX).contains(&points) {
            return Err(Error::invalid_field(
                "points",
                "invalid_points",
                format!("points must be between 1 and {POINTS_MAX}"),
            ));
        }
        let question_type = self.question_type.unwrap_or_default();
        validate_choice_set(question_type, &self.choices)?;

        let question_id = Uuid::new_v4();
        let choices = self
            .choices
            .into_iter()
            .zip(0_i32..)
            .map(|(choice, order)| Choice {
                id: Uuid::new_v4(),
                question_id,
                text: choice.text.trim().to_owned(),
                is_correct: choice.is_correct,
                order,
            })
            .collect();

        Ok(Question {
            id: question_id,
            quiz_id,
            text,
            question_type,
            order: self.order.unwrap_or(next_order),
            explanation: normalise_optional(self.explanation),
            points,
            choices,
        })
    }
}

fn validate_choice_set(question_type: QuestionType, choices: &[ChoiceForm]) -> Result<(), Error> {
    let count_ok = match question_type {
        QuestionType::MultipleChoice => choices.len() >= 2,
        QuestionType::TrueFalse => choices.len() == 2,
    };
    if !count_ok {
        let message = match question_type {
            QuestionType::MultipleChoice => "multiple choice questions need at least two choices",
            QuestionType::TrueFalse => "true/false questions need exactly two choices",
        };
        return Err(Error::invalid_field("choices", "invalid_choice_count", message));
    }
    if choices.iter().any(|choice| choice.text.trim().is_empty()) {
        return Err(Error::invalid_field(
            "choices",
            "empty_choice",
            "choice text must not be empty",
        ));
    }
    let correct = choices.iter().filter(|choice| choice.is_correct).count();
    if correct != 1 {
        return Err(Error::invalid_field(
            "choices",
            "invalid_correct_count",
            format!("exactly one choice must be correct, found {correct}"),
        ));
    }
    Ok(())
}
