//! In-memory `QuizRepository`.

use std::cmp::Reverse;

use async_trait::async_trait;
use pagination::{Page, PageRequest};
use uuid::Uuid;

use crate::domain::ports::{QuizRepository, QuizRepositoryError};
use crate::domain::{Question, Quiz, UserId};

use super::{MemoryStore, Tables, to_count};

fn newest_first(quizzes: &mut [Quiz]) {
    quizzes.sort_by_key(|quiz| (Reverse(quiz.created_at), quiz.id));
}

/// Recount the questions of `quiz_id` and store the total on the quiz.
fn refresh_total(tables: &mut Tables, quiz_id: Uuid) -> i32 {
    let total = tables
        .questions
        .iter()
        .filter(|question| question.quiz_id == quiz_id)
        .count();
    let total = i32::try_from(total).unwrap_or(i32::MAX);
    if let Some(quiz) = tables.quizzes.iter_mut().find(|quiz| quiz.id == quiz_id) {
        quiz.total_questions = total;
    }
    total
}

#[async_trait]
impl QuizRepository for MemoryStore {
    async fn insert(&self, quiz: &Quiz) -> Result<(), QuizRepositoryError> {
        let mut tables = self.lock(QuizRepositoryError::connection)?;
        if !tables.modules.iter().any(|module| module.id == quiz.module_id) {
            return Err(QuizRepositoryError::conflict("referenced module does not exist"));
        }
        tables.quizzes.push(quiz.clone());
        Ok(())
    }

    async fn update(&self, quiz: &Quiz) -> Result<(), QuizRepositoryError> {
        let mut tables = self.lock(QuizRepositoryError::connection)?;
        if let Some(row) = tables.quizzes.iter_mut().find(|row| row.id == quiz.id) {
            let total_questions = row.total_questions;
            *row = Quiz {
                total_questions,
                ..quiz.clone()
            };
        }
        Ok(())
    }

    async fn find_by_id(&self, id: &Uuid) -> Result<Option<Quiz>, QuizRepositoryError> {
        let tables = self.lock(QuizRepositoryError::connection)?;
        Ok(tables.quizzes.iter().find(|row| row.id == *id).cloned())
    }

    async fn list_published(&self, page: PageRequest) -> Result<Page<Quiz>, QuizRepositoryError> {
        let tables = self.lock(QuizRepositoryError::connection)?;
        let mut published: Vec<Quiz> = tables
            .quizzes
            .iter()
            .filter(|row| row.settings.is_published)
            .cloned()
            .collect();
        newest_first(&mut published);
        Ok(Page::new(page.slice(&published), page, to_count(published.len())))
    }

    async fn published_for_module(
        &self,
        module_id: &Uuid,
    ) -> Result<Vec<Quiz>, QuizRepositoryError> {
        let tables = self.lock(QuizRepositoryError::connection)?;
        let mut published: Vec<Quiz> = tables
            .quizzes
            .iter()
            .filter(|row| row.module_id == *module_id && row.settings.is_published)
            .cloned()
            .collect();
        newest_first(&mut published);
        Ok(published)
    }

    async fn list_by_author(&self, author: &UserId) -> Result<Vec<Quiz>, QuizRepositoryError> {
        let tables = self.lock(QuizRepositoryError::connection)?;
        let mut authored: Vec<Quiz> = tables
            .quizzes
            .iter()
            .filter(|row| row.created_by.as_ref() == Some(author))
            .cloned()
            .collect();
        newest_first(&mut authored);
        Ok(authored)
    }

    async fn count(&self) -> Result<u64, QuizRepositoryError> {
        let tables = self.lock(QuizRepositoryError::connection)?;
        Ok(to_count(tables.quizzes.len()))
    }

    async fn questions(&self, quiz_id: &Uuid) -> Result<Vec<Question>, QuizRepositoryError> {
        let tables = self.lock(QuizRepositoryError::connection)?;
        let mut questions: Vec<Question> = tables
            .questions
            .iter()
            .filter(|question| question.quiz_id == *quiz_id)
            .cloned()
            .collect();
        questions.sort_by_key(|question| (question.order, question.id));
        for question in &mut questions {
            question.choices.sort_by_key(|choice| (choice.order, choice.id));
        }
        Ok(questions)
    }

    async fn add_question(&self, question: &Question) -> Result<i32, QuizRepositoryError> {
        let mut tables = self.lock(QuizRepositoryError::connection)?;
        if !tables.quizzes.iter().any(|quiz| quiz.id == question.quiz_id) {
            return Err(QuizRepositoryError::conflict("referenced quiz does not exist"));
        }
        tables.questions.push(question.clone());
        Ok(refresh_total(&mut tables, question.quiz_id))
    }

    async fn remove_question(
        &self,
        quiz_id: &Uuid,
        question_id: &Uuid,
    ) -> Result<Option<i32>, QuizRepositoryError> {
        let mut tables = self.lock(QuizRepositoryError::connection)?;
        let before = tables.questions.len();
        tables
            .questions
            .retain(|question| !(question.id == *question_id && question.quiz_id == *quiz_id));
        if tables.questions.len() == before {
            return Ok(None);
        }
        Ok(Some(refresh_total(&mut tables, *quiz_id)))
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;
    use crate::domain::{
        ChoiceForm, LearningModule, ModuleFields, ModuleForm, QuestionForm, QuizFields, QuizForm,
    };
    use crate::test_support::fixture_now;

    async fn seeded_quiz(store: &MemoryStore) -> Quiz {
        let module_fields = ModuleFields::try_from(ModuleForm {
            title: "Elections".to_owned(),
            description: "How voting works".to_owned(),
            content: "Body".to_owned(),
            ..ModuleForm::default()
        })
        .expect("valid module");
        let module = LearningModule::create(module_fields, UserId::random(), fixture_now());
        crate::domain::ports::ModuleRepository::insert(store, &module)
            .await
            .expect("module insert");

        let fields = QuizFields::try_from(QuizForm {
            title: "Elections check".to_owned(),
            description: String::new(),
            module_id: module.id,
            ..QuizForm::default()
        })
        .expect("valid quiz");
        let quiz = Quiz::create(fields, UserId::random(), fixture_now());
        store.insert(&quiz).await.expect("quiz insert");
        quiz
    }

    fn question(quiz_id: Uuid, text: &str, order: i32) -> Question {
        QuestionForm {
            text: text.to_owned(),
            order: Some(order),
            choices: vec![
                ChoiceForm {
                    text: "Yes".to_owned(),
                    is_correct: true,
                },
                ChoiceForm {
                    text: "No".to_owned(),
                    is_correct: false,
                },
            ],
            ..QuestionForm::default()
        }
        .into_question(quiz_id, order)
        .expect("valid question")
    }

    #[rstest]
    #[tokio::test]
    async fn question_totals_follow_adds_and_removals() {
        let store = MemoryStore::new();
        let quiz = seeded_quiz(&store).await;
        let first = question(quiz.id, "Is voting secret?", 1);
        let second = question(quiz.id, "Can you vote twice?", 0);

        assert_eq!(store.add_question(&first).await.expect("add"), 1);
        assert_eq!(store.add_question(&second).await.expect("add"), 2);

        let texts: Vec<String> = store
            .questions(&quiz.id)
            .await
            .expect("questions")
            .into_iter()
            .map(|question| question.text)
            .collect();
        assert_eq!(texts, ["Can you vote twice?", "Is voting secret?"]);

        let remaining = store
            .remove_question(&quiz.id, &second.id)
            .await
            .expect("remove");
        assert_eq!(remaining, Some(1));
        let stored = store
            .find_by_id(&quiz.id)
            .await
            .expect("lookup")
            .expect("present");
        assert_eq!(stored.total_questions, 1);
    }

    #[rstest]
    #[tokio::test]
    async fn removing_a_foreign_question_reports_none() {
        let store = MemoryStore::new();
        let quiz = seeded_quiz(&store).await;
        let removed = store
            .remove_question(&quiz.id, &Uuid::new_v4())
            .await
            .expect("remove");
        assert_eq!(removed, None);
    }
}
