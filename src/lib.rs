pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::{CliConfig, Command};

pub use adapters::quizlet::{QuizletParser, QuizletSettings};
pub use adapters::storage::{JsonFileModuleStore, MemoryModuleStore};
pub use app::App;
pub use config::AppConfig;
pub use core::{
    import_work::{CsvImportWork, QuizletImportWork},
    modules::ModulesUseCase,
    worker_pool::{PoolState, WorkerPool},
};
pub use utils::error::{CardsError, Result};
