//! Learning modules: the unit of published educational content.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::auth::normalise_optional;
use super::{Error, Slug, SlugError, UserId};

/// Maximum title length shared by modules, quizzes and threads.
pub const TITLE_MAX: usize = 255;
/// Default reading time in minutes.
pub const DEFAULT_ESTIMATED_MINUTES: i32 = 15;

/// Publication state of a module.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ModuleStatus {
    /// Visible to its author and admins only.
    #[default]
    Draft,
    /// Visible to everyone.
    Published,
    /// Retired; hidden from listings.
    Archived,
}

/// Intended audience level of a module.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum DifficultyLevel {
    #[default]
    Beginner,
    Intermediate,
    Advanced,
}

macro_rules! storage_enum {
    ($name:ident, $label:literal, { $($variant:ident => $text:literal),+ $(,)? }) => {
        impl $name {
            /// Stable storage representation.
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $text,)+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok(Self::$variant),)+
                    other => Err(Error::invalid_request(format!(
                        concat!("unknown ", $label, ": {}"),
                        other
                    ))),
                }
            }
        }
    };
}

pub(crate) use storage_enum;

storage_enum!(ModuleStatus, "module status", {
    Draft => "draft",
    Published => "published",
    Archived => "archived",
});

storage_enum!(DifficultyLevel, "difficulty level", {
    Beginner => "beginner",
    Intermediate => "intermediate",
    Advanced => "advanced",
});

/// Stored learning module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LearningModule {
    pub id: Uuid,
    pub title: String,
    pub slug: Slug,
    pub description: String,
    pub content: String,
    pub created_by: Option<UserId>,
    pub status: ModuleStatus,
    pub order: i32,
    pub image_url: Option<String>,
    pub attachment_url: Option<String>,
    pub difficulty_level: DifficultyLevel,
    pub estimated_minutes: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub published_at: Option<DateTime<Utc>>,
}

impl LearningModule {
    /// Whether the module is publicly visible.
    pub fn is_published(&self) -> bool {
        self.status == ModuleStatus::Published
    }

    /// Build a new module from validated fields.
    pub fn create(
        fields: ModuleFields,
        author: UserId,
        now: DateTime<Utc>,
    ) -> Self {
        let mut module = Self {
            id: Uuid::new_v4(),
            title: fields.title,
            slug: fields.slug,
            description: fields.description,
            content: fields.content,
            created_by: Some(author),
            status: ModuleStatus::Draft,
            order: fields.order,
            image_url: fields.image_url,
            attachment_url: fields.attachment_url,
            difficulty_level: fields.difficulty_level,
            estimated_minutes: fields.estimated_minutes,
            created_at: now,
            updated_at: now,
            published_at: None,
        };
        module.set_status(fields.status, now);
        module
    }

    /// Replace editable fields; the author and creation time are preserved.
    pub fn apply(&mut self, fields: ModuleFields, now: DateTime<Utc>) {
        self.title = fields.title;
        self.slug = fields.slug;
        self.description = fields.description;
        self.content = fields.content;
        self.order = fields.order;
        self.image_url = fields.image_url;
        self.attachment_url = fields.attachment_url;
        self.difficulty_level = fields.difficulty_level;
        self.estimated_minutes = fields.estimated_minutes;
        self.updated_at = now;
        self.set_status(fields.status, now);
    }

    /// Change status, stamping `published_at` the first time it is published.
    pub fn set_status(&mut self, status: ModuleStatus, now: DateTime<Utc>) {
        self.status = status;
        if status == ModuleStatus::Published && self.published_at.is_none() {
            self.published_at = Some(now);
        }
    }

    /// Whether `viewer` may read the module.
    pub fn visible_to(&self, viewer: Option<&super::User>) -> bool {
        self.is_published()
            || viewer.is_some_and(|user| user.can_manage(self.created_by.as_ref()))
    }
}

/// Raw author input for creating or editing a module.
#[derive(Debug, Clone, Default)]
pub struct ModuleForm {
    pub title: String,
    pub slug: Option<String>,
    pub description: String,
    pub content: String,
    pub status: Option<ModuleStatus>,
    pub order: Option<i32>,
    pub image_url: Option<String>,
    pub attachment_url: Option<String>,
    pub difficulty_level: Option<DifficultyLevel>,
    pub estimated_minutes: Option<i32>,
}

/// Validated module fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleFields {
    pub title: String,
    pub slug: Slug,
    pub description: String,
    pub content: String,
    pub status: ModuleStatus,
    pub order: i32,
    pub image_url: Option<String>,
    pub attachment_url: Option<String>,
    pub difficulty_level: DifficultyLevel,
    pub estimated_minutes: i32,
}

/// Validate a title shared by modules, quizzes and threads.
pub fn validate_title(raw: &str) -> Result<String, Error> {
    let title = raw.trim();
    if title.is_empty() {
        return Err(Error::invalid_field("title", "empty_title", "title must not be empty"));
    }
    if title.chars().count() > TITLE_MAX {
        return Err(Error::invalid_field(
            "title",
            "title_too_long",
            format!("title must be at most {TITLE_MAX} characters"),
        ));
    }
    Ok(title.to_owned())
}

fn slug_error(err: &SlugError) -> Error {
    Error::invalid_field("slug", "invalid_slug", err.to_string())
}

impl TryFrom<ModuleForm> for ModuleFields {
    type Error = Error;

    fn try_from(form: ModuleForm) -> Result<Self, Self::Error> {
        let title = validate_title(&form.title)?;
        let slug = match normalise_optional(form.slug) {
            Some(explicit) => Slug::new(explicit),
            None => Slug::from_title(&title),
        }
        .map_err(|err| slug_error(&err))?;
        let description = form.description.trim().to_owned();
        if description.is_empty() {
            return Err(Error::invalid_field(
                "description",
                "empty_description",
                "description must not be empty",
            ));
        }
        let order = form.order.unwrap_or(0);
        if order < 0 {
            return Err(Error::invalid_field("order", "negative_order", "order must not be negative"));
        }
        let estimated_minutes = form.estimated_minutes.unwrap_or(DEFAULT_ESTIMATED_MINUTES);
        if estimated_minutes < 1 {
            return Err(Error::invalid_field(
                "estimatedMinutes",
                "invalid_estimated_time",
                "estimated time must be at least one minute",
            ));
        }
        Ok(Self {
            title,
            slug,
            description,
            content: form.content,
            status: form.status.unwrap_or_default(),
            order,
            image_url: normalise_optional(form.image_url),
            attachment_url: normalise_optional(form.attachment_url),
            difficulty_level: form.difficulty_level.unwrap_or_default(),
            estimated_minutes,
        })
    }
}

/// Filters for the published module catalogue.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModuleFilter {
    pub difficulty: Option<DifficultyLevel>,
    /// Case-insensitive substring matched against title or description.
    pub search: Option<String>,
}

impl ModuleFilter {
    /// Whether `module` satisfies the filter, ignoring publication state.
    pub fn matches(&self, module: &LearningModule) -> bool {
        let difficulty_ok = self
            .difficulty
            .is_none_or(|level| module.difficulty_level == level);
        let search_ok = self.search.as_deref().is_none_or(|needle| {
            let needle = needle.to_lowercase();
            module.title.to_lowercase().contains(&needle)
                || module.description.to_lowercase().contains(&needle)
        });
        difficulty_ok && search_ok
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use crate::domain::ErrorCode;
    use rstest::{fixture, rstest};

    fn sample_form() -> ModuleForm {
        ModuleForm {
            title: "Understanding Local Elections".to_owned(),
            description: "How councils are chosen".to_owned(),
            content: "Long form content".to_owned(),
            ..ModuleForm::default()
        }
    }

    #[fixture]
    fn form() -> ModuleForm {
        sample_form()
    }

    #[rstest]
    fn defaults_follow_catalogue_conventions(form: ModuleForm) {
        let fields = ModuleFields::try_from(form).expect("valid form");
        assert_eq!(fields.slug.as_ref(), "understanding-local-elections");
        assert_eq!(fields.status, ModuleStatus::Draft);
        assert_eq!(fields.difficulty_level, DifficultyLevel::Beginner);
        assert_eq!(fields.estimated_minutes, DEFAULT_ESTIMATED_MINUTES);
        assert_eq!(fields.order, 0);
    }

    #[rstest]
    #[case::blank_title(ModuleForm { title: "  ".to_owned(), ..sample_form() }, "title")]
    #[case::bad_slug(ModuleForm { slug: Some("Not A Slug".to_owned()), ..sample_form() }, "slug")]
    #[case::negative_order(ModuleForm { order: Some(-1), ..sample_form() }, "order")]
    #[case::zero_minutes(ModuleForm { estimated_minutes: Some(0), ..sample_form() }, "estimatedMinutes")]
    #[case::blank_description(ModuleForm { description: String::new(), ..sample_form() }, "description")]
    fn rejects_invalid_fields(#[case] input: ModuleForm, #[case] field: &str) {
        let err = ModuleFields::try_from(input).expect_err("invalid form");
        assert_eq!(err.code(), ErrorCode::InvalidRequest);
        assert_eq!(
            err.details().and_then(|d| d.get("field")).and_then(|v| v.as_str()),
            Some(field)
        );
    }

    #[rstest]
    fn publishing_stamps_once(form: ModuleForm) {
        let created = Utc::now();
        let fields = ModuleFields::try_from(form).expect("valid form");
        let mut module = LearningModule::create(fields, UserId::random(), created);
        assert!(module.published_at.is_none());

        let first = created + chrono::Duration::minutes(5);
        module.set_status(ModuleStatus::Published, first);
        assert_eq!(module.published_at, Some(first));

        module.set_status(ModuleStatus::Draft, first + chrono::Duration::minutes(5));
        module.set_status(ModuleStatus::Published, first + chrono::Duration::minutes(10));
        assert_eq!(module.published_at, Some(first));
    }

    #[rstest]
    #[case(None, Some("ELECTIONS"), true)]
    #[case(None, Some("councils"), true)]
    #[case(None, Some("taxes"), false)]
    #[case(Some(DifficultyLevel::Beginner), None, true)]
    #[case(Some(DifficultyLevel::Advanced), None, false)]
    fn filter_matches_title_description_and_level(
        form: ModuleForm,
        #[case] difficulty: Option<DifficultyLevel>,
        #[case] search: Option<&str>,
        #[case] expected: bool,
    ) {
        let fields = ModuleFields::try_from(form).expect("valid form");
        let module = LearningModule::create(fields, UserId::random(), Utc::now());
        let filter = ModuleFilter {
            difficulty,
            search: search.map(str::to_owned),
        };
        assert_eq!(filter.matches(&module), expected);
    }

    #[rstest]
    fn storage_names_round_trip() {
        for status in [ModuleStatus::Draft, ModuleStatus::Published, ModuleStatus::Archived] {
            assert_eq!(status.as_str().parse::<ModuleStatus>().expect("known"), status);
        }
        assert!("retired".parse::<ModuleStatus>().is_err());
    }
}
