//! Quiz authoring and browsing service.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use pagination::{Page, PageRequest};
use tracing::info;
use uuid::Uuid;

use crate::domain::ports::{
    AttemptRepository, ModuleRepository, QuizDetail, QuizRepository, Quizzes, ViewerProgress,
};
use crate::domain::{Error, Question, QuestionForm, Quiz, QuizFields, QuizForm, Role, User};

pub(crate) fn quiz_not_found(quiz_id: &Uuid) -> Error {
    Error::not_found(format!("quiz {quiz_id} not found"))
}

/// Quiz service over module, quiz and attempt repositories.
#[derive(Clone)]
pub struct QuizService<M, Q, A> {
    modules: Arc<M>,
    quizzes: Arc<Q>,
    attempts: Arc<A>,
    clock: Arc<dyn Clock>,
}

impl<M, Q, A> QuizService<M, Q, A> {
    /// Create the service.
    pub fn new(modules: Arc<M>, quizzes: Arc<Q>, attempts: Arc<A>, clock: Arc<dyn Clock>) -> Self {
        Self {
            modules,
            quizzes,
            attempts,
            clock,
        }
    }
}

impl<M, Q, A> QuizService<M, Q, A>
where
    M: ModuleRepository,
    Q: QuizRepository,
    A: AttemptRepository,
{
    async fn validated_fields(&self, form: QuizForm) -> Result<QuizFields, Error> {
        let fields = QuizFields::try_from(form)?;
        if self.modules.find_by_id(&fields.module_id).await?.is_none() {
            return Err(Error::invalid_field(
                "moduleId",
                "unknown_module",
                format!("module {} does not exist", fields.module_id),
            ));
        }
        Ok(fields)
    }

    /// Load a quiz the actor may edit.
    async fn managed_quiz(&self, actor: &User, quiz_id: &Uuid) -> Result<Quiz, Error> {
        let quiz = self
            .quizzes
            .find_by_id(quiz_id)
            .await?
            .ok_or_else(|| quiz_not_found(quiz_id))?;
        if actor.can_manage(quiz.created_by.as_ref()) {
            Ok(quiz)
        } else {
            Err(Error::forbidden("only the quiz author or an admin may edit it"))
        }
    }

    async fn progress(&self, viewer: &User, quiz: &Quiz) -> Result<ViewerProgress, Error> {
        let attempts_used = self.attempts.count_for_quiz(&viewer.id, &quiz.id).await?;
        let best_attempt = self.attempts.best_passed(&viewer.id, &quiz.id).await?;
        let can_attempt = viewer.is_citizen()
            && (!quiz.attempts_exhausted(attempts_used)
                || self.attempts.find_open(&viewer.id, &quiz.id).await?.is_some());
        Ok(ViewerProgress {
            attempts_used,
            best_attempt,
            can_attempt,
        })
    }
}

#[async_trait]
impl<M, Q, A> Quizzes for QuizService<M, Q, A>
where
    M: ModuleRepository,
    Q: QuizRepository,
    A: AttemptRepository,
{
    async fn list_published(&self, page: PageRequest) -> Result<Page<Quiz>, Error> {
        Ok(self.quizzes.list_published(page).await?)
    }

    async fn get(&self, viewer: Option<User>, quiz_id: Uuid) -> Result<QuizDetail, Error> {
        let quiz = self
            .quizzes
            .find_by_id(&quiz_id)
            .await?
            .filter(|quiz| quiz.visible_to(viewer.as_ref()))
            .ok_or_else(|| quiz_not_found(&quiz_id))?;
        let Some(viewer) = viewer else {
            return Ok(QuizDetail {
                quiz,
                progress: None,
                questions: None,
            });
        };
        let progress = Some(self.progress(&viewer, &quiz).await?);
        let questions = if viewer.can_manage(quiz.created_by.as_ref()) {
            Some(self.quizzes.questions(&quiz.id).await?)
        } else {
            None
        };
        Ok(QuizDetail {
            quiz,
            progress,
            questions,
        })
    }

    async fn create(&self, actor: &User, form: QuizForm) -> Result<Quiz, Error> {
        actor.require_role(Role::Educator, "create quizzes")?;
        let fields = self.validated_fields(form).await?;
        let quiz = Quiz::create(fields, actor.id, self.clock.utc());
        self.quizzes.insert(&quiz).await?;
        info!(quiz_id = %quiz.id, module_id = %quiz.module_id, "created quiz");
        Ok(quiz)
    }

    async fn update(&self, actor: &User, quiz_id: Uuid, form: QuizForm) -> Result<Quiz, Error> {
        let mut quiz = self.managed_quiz(actor, &quiz_id).await?;
        let fields = self.validated_fields(form).await?;
        quiz.apply(fields, self.clock.utc());
        self.quizzes.update(&quiz).await?;
        Ok(quiz)
    }

    async fn add_question(
        &self,
        actor: &User,
        quiz_id: Uuid,
        form: QuestionForm,
    ) -> Result<Question, Error> {
        let quiz = self.managed_quiz(actor, &quiz_id).await?;
        let next_order = self
            .quizzes
            .questions(&quiz.id)
            .await?
            .iter()
            .map(|question| question.order + 1)
            .max()
            .unwrap_or(0);
        let question = form.into_question(quiz.id, next_order)?;
        let total = self.quizzes.add_question(&question).await?;
        info!(quiz_id = %quiz.id, question_id = %question.id, total, "added question");
        Ok(question)
    }

    async fn remove_question(
        &self,
        actor: &User,
        quiz_id: Uuid,
        question_id: Uuid,
    ) -> Result<(), Error> {
        let quiz = self.managed_quiz(actor, &quiz_id).await?;
        let total = self
            .quizzes
            .remove_question(&quiz.id, &question_id)
            .await?
            .ok_or_else(|| Error::not_found(format!("question {question_id} not found")))?;
        info!(quiz_id = %quiz.id, %question_id, total, "removed question");
        Ok(())
    }
}
