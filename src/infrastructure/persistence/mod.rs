mod pg_pool;
mod repositories;

pub use repositories::{
    InMemoryConversationRepository, InMemoryPatientRepository, InMemoryUserRepository,
    PgConversationRepository, PgPatientRepository, PgUserRepository,
};

pub use pg_pool::{create_pool, run_migrations};
