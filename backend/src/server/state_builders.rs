//! Builders selecting repository adapters for the HTTP state.

use std::sync::Arc;

use actix_web::web;
use mockable::{Clock, DefaultClock};
use tracing::warn;

use learning_backend::inbound::http::state::{HttpState, Repositories};
use learning_backend::outbound::memory::MemoryStore;
use learning_backend::outbound::persistence::{
    DbPool, DieselAttemptRepository, DieselDiscussionRepository, DieselModuleRepository,
    DieselQuizRepository, DieselUserRepository,
};

use super::{ServerConfig, Storage};

type DieselRepositories = Repositories<
    DieselUserRepository,
    DieselModuleRepository,
    DieselQuizRepository,
    DieselAttemptRepository,
    DieselDiscussionRepository,
>;

fn diesel_repositories(pool: &DbPool) -> DieselRepositories {
    Repositories {
        users: Arc::new(DieselUserRepository::new(pool.clone())),
        modules: Arc::new(DieselModuleRepository::new(pool.clone())),
        quizzes: Arc::new(DieselQuizRepository::new(pool.clone())),
        attempts: Arc::new(DieselAttemptRepository::new(pool.clone())),
        discussions: Arc::new(DieselDiscussionRepository::new(pool.clone())),
    }
}

fn state_for_storage(storage: &Storage, clock: Arc<dyn Clock>) -> HttpState {
    match storage {
        Storage::Postgres(pool) => HttpState::from_repositories(diesel_repositories(pool), clock),
        Storage::Memory => {
            warn!("no database configured; data is kept in memory and lost on restart");
            HttpState::from_repositories(Repositories::shared(Arc::new(MemoryStore::new())), clock)
        }
    }
}

/// Build the shared HTTP state for the configured storage.
pub(super) fn build_http_state(config: &ServerConfig) -> web::Data<HttpState> {
    web::Data::new(state_for_storage(&config.storage, Arc::new(DefaultClock)))
}
