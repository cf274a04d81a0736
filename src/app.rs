use crate::config::toml_config::AppConfig;
use crate::core::modules::{CsvImportWorkerPool, ModulesUseCase, QuizletImportWorkerPool};
use crate::core::worker_pool::WorkerPool;
use crate::domain::ports::{ModuleStore, QuizletModuleParser};
use std::sync::Arc;

/// Wires the import pools to the modules use case and owns their lifecycle.
pub struct App {
    modules: ModulesUseCase,
    quizlet_import_pool: Arc<QuizletImportWorkerPool>,
    csv_import_pool: Arc<CsvImportWorkerPool>,
}

impl App {
    pub fn new(
        config: &AppConfig,
        store: Arc<dyn ModuleStore>,
        quizlet_parser: Arc<dyn QuizletModuleParser>,
    ) -> Self {
        let quizlet_import_pool = Arc::new(WorkerPool::with_capacity(
            "quizlet_import",
            config.workers.quizlet_workers,
            config.workers.quizlet_queue_capacity,
        ));
        let csv_import_pool = Arc::new(WorkerPool::with_capacity(
            "csv_import",
            config.workers.csv_workers,
            config.workers.csv_queue_capacity,
        ));

        let modules = ModulesUseCase::new(
            store,
            quizlet_parser,
            Arc::clone(&quizlet_import_pool),
            Arc::clone(&csv_import_pool),
        )
        .with_csv_max_bytes(config.import.csv_max_bytes);

        Self {
            modules,
            quizlet_import_pool,
            csv_import_pool,
        }
    }

    pub fn modules(&self) -> &ModulesUseCase {
        &self.modules
    }

    pub fn start(&self) {
        self.quizlet_import_pool.process_queue();
        self.csv_import_pool.process_queue();
    }

    /// Cooperative shutdown: running imports see the cancellation, queued ones are dropped.
    pub fn close(&self) {
        self.quizlet_import_pool.close();
        self.csv_import_pool.close();
    }

    pub async fn wait(&self) {
        tokio::join!(self.quizlet_import_pool.wait(), self.csv_import_pool.wait());
    }

    /// Graceful shutdown: every queued import runs before this returns.
    pub async fn drain(&self) {
        tokio::join!(self.quizlet_import_pool.drain(), self.csv_import_pool.drain());
    }
}
