//! Shared setup for the Diesel repository suites.
//!
//! Each test gets its own embedded cluster and a freshly migrated database,
//! reset over a plain `postgres` connection so `DROP DATABASE` runs outside
//! any transaction. Seeding goes through the Diesel repositories themselves.

use chrono::{DateTime, TimeDelta, Utc};
use learning_backend::domain::ports::{ModuleRepository, QuizRepository, UserRepository};
use learning_backend::domain::{
    ChoiceForm, LearningModule, ModuleFields, ModuleForm, ModuleStatus, PasswordHash, Question,
    QuestionForm, QuestionType, Quiz, QuizFields, QuizForm, Role, User,
};
use learning_backend::outbound::persistence::{
    DbPool, DieselModuleRepository, DieselQuizRepository, DieselUserRepository, PoolConfig,
    run_migrations,
};
use learning_backend::test_support::{fixture_now, user_with_role};
use pg_embedded_setup_unpriv::TestCluster;
use postgres::{Client, NoTls};
use tokio::runtime::Runtime;
use uuid::Uuid;

use super::pg_embed::{handle_cluster_setup_failure, test_cluster};

const STORED_HASH: &str = "$argon2id$v=19$m=19456,t=2,p=1$c2FsdHNhbHQ$aGFzaGhhc2hoYXNoaGFzaA";

/// Render a `postgres` error with its SQLSTATE and detail.
pub fn format_postgres_error(error: &postgres::Error) -> String {
    let Some(db_error) = error.as_db_error() else {
        return error.to_string();
    };
    let mut summary = format!(
        "postgres error {:?}: {}",
        db_error.code(),
        db_error.message()
    );
    if let Some(detail) = db_error.detail() {
        summary.push_str("; detail: ");
        summary.push_str(detail);
    }
    summary
}

/// Drop and recreate `name` on the cluster's maintenance database.
pub fn reset_database(cluster: &TestCluster, name: &str) -> Result<(), String> {
    let url = cluster.connection().database_url("postgres");
    let mut client = Client::connect(&url, NoTls).map_err(|err| format_postgres_error(&err))?;
    client
        .batch_execute(&format!(
            "DROP DATABASE IF EXISTS \"{name}\" WITH (FORCE); CREATE DATABASE \"{name}\";"
        ))
        .map_err(|err| format_postgres_error(&err))
}

/// A migrated database with a pool and a runtime to drive it.
pub struct DieselContext {
    pub runtime: Runtime,
    pub pool: DbPool,
    pub database_url: String,
    _cluster: TestCluster,
}

impl DieselContext {
    fn build(database: &str) -> Result<Self, String> {
        let runtime = Runtime::new().map_err(|err| err.to_string())?;
        let cluster = test_cluster()?;
        reset_database(&cluster, database)?;
        let database_url = cluster.connection().database_url(database);
        let pool = runtime.block_on(async {
            run_migrations(&database_url)
                .await
                .map_err(|err| err.to_string())?;
            DbPool::new(PoolConfig::new(database_url.as_str()).with_max_size(4))
                .await
                .map_err(|err| err.to_string())
        })?;
        Ok(Self {
            runtime,
            pool,
            database_url,
            _cluster: cluster,
        })
    }

    /// Provision `database`, or `None` when the cluster is unavailable.
    pub fn provision(database: &str) -> Option<Self> {
        match Self::build(database) {
            Ok(context) => Some(context),
            Err(reason) => handle_cluster_setup_failure(reason),
        }
    }

    pub fn users(&self) -> DieselUserRepository {
        DieselUserRepository::new(self.pool.clone())
    }

    pub fn modules(&self) -> DieselModuleRepository {
        DieselModuleRepository::new(self.pool.clone())
    }

    pub fn quizzes(&self) -> DieselQuizRepository {
        DieselQuizRepository::new(self.pool.clone())
    }

    /// Store a user with a placeholder password hash.
    pub fn seed_user(&self, username: &str, role: Role) -> User {
        let user = user_with_role(username, role);
        self.runtime
            .block_on(self.users().insert(&user, &PasswordHash::from_stored(STORED_HASH)))
            .expect("seed user");
        user
    }

    /// Store a module titled `title`, created `offset_minutes` after the
    /// fixture instant.
    pub fn seed_module(
        &self,
        author: &User,
        title: &str,
        description: &str,
        status: ModuleStatus,
        offset_minutes: i64,
    ) -> LearningModule {
        let fields = ModuleFields::try_from(ModuleForm {
            title: title.to_owned(),
            description: description.to_owned(),
            content: "Body".to_owned(),
            status: Some(status),
            ..ModuleForm::default()
        })
        .expect("valid module");
        let module = LearningModule::create(fields, author.id, minutes_after(offset_minutes));
        self.runtime
            .block_on(self.modules().insert(&module))
            .expect("seed module");
        module
    }

    /// Store a published quiz on `module`.
    pub fn seed_quiz(&self, author: &User, module: &LearningModule, title: &str) -> Quiz {
        let fields = QuizFields::try_from(QuizForm {
            title: title.to_owned(),
            module_id: module.id,
            is_published: Some(true),
            passing_score: Some(60),
            ..QuizForm::default()
        })
        .expect("valid quiz");
        let quiz = Quiz::create(fields, author.id, fixture_now());
        self.runtime
            .block_on(self.quizzes().insert(&quiz))
            .expect("seed quiz");
        quiz
    }

    /// Store a true/false question worth `points` on `quiz`.
    pub fn seed_question(&self, quiz: &Quiz, order: i32, points: i32) -> Question {
        let question = true_false(quiz.id, order, points);
        self.runtime
            .block_on(self.quizzes().add_question(&question))
            .expect("seed question");
        question
    }
}

/// A true/false question whose first choice is correct.
pub fn true_false(quiz_id: Uuid, order: i32, points: i32) -> Question {
    QuestionForm {
        text: format!("Statement {order}"),
        question_type: Some(QuestionType::TrueFalse),
        points: Some(points),
        choices: vec![
            ChoiceForm {
                text: "True".to_owned(),
                is_correct: true,
            },
            ChoiceForm {
                text: "False".to_owned(),
                is_correct: false,
            },
        ],
        ..QuestionForm::default()
    }
    .into_question(quiz_id, order)
    .expect("valid question")
}

/// The fixture instant shifted by `minutes`.
pub fn minutes_after(minutes: i64) -> DateTime<Utc> {
    fixture_now() + TimeDelta::minutes(minutes)
}
