// Generated dummy profiles: normalization and persistence.

pub mod handlers;
pub mod models;
pub mod normalizer;
pub mod seeder;
pub mod store;
