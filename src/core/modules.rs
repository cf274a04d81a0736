use crate::core::import_work::{CsvImportWork, QuizletImportWork, DEFAULT_CSV_MAX_BYTES};
use crate::core::worker_pool::WorkerPool;
use crate::domain::model::{Module, ModuleDraft, StoredModule};
use crate::domain::ports::{ModuleStore, QuizletModuleParser};
use crate::utils::error::Result;
use std::io::Read;
use std::sync::Arc;
use uuid::Uuid;

pub type QuizletImportWorkerPool = WorkerPool<QuizletImportWork>;
pub type CsvImportWorkerPool = WorkerPool<CsvImportWork>;

/// Entry point for module operations.
///
/// Imports are queued and answered right away; the job runs later on the
/// matching worker pool and reports only through logs.
pub struct ModulesUseCase {
    store: Arc<dyn ModuleStore>,
    quizlet_parser: Arc<dyn QuizletModuleParser>,
    quizlet_import_pool: Arc<QuizletImportWorkerPool>,
    csv_import_pool: Arc<CsvImportWorkerPool>,
    csv_max_bytes: u64,
}

impl ModulesUseCase {
    pub fn new(
        store: Arc<dyn ModuleStore>,
        quizlet_parser: Arc<dyn QuizletModuleParser>,
        quizlet_import_pool: Arc<QuizletImportWorkerPool>,
        csv_import_pool: Arc<CsvImportWorkerPool>,
    ) -> Self {
        Self {
            store,
            quizlet_parser,
            quizlet_import_pool,
            csv_import_pool,
            csv_max_bytes: DEFAULT_CSV_MAX_BYTES,
        }
    }

    pub fn with_csv_max_bytes(mut self, csv_max_bytes: u64) -> Self {
        self.csv_max_bytes = csv_max_bytes;
        self
    }

    pub async fn list_modules(&self, user_uuid: Uuid) -> Result<Vec<Module>> {
        self.store.list_modules(user_uuid).await
    }

    pub async fn get_module_with_cards(
        &self,
        user_uuid: Uuid,
        module_uuid: Uuid,
    ) -> Result<StoredModule> {
        self.store.get_module_with_cards(user_uuid, module_uuid).await
    }

    /// Fails only when the Quizlet pool is already closed. Waits while the queue is full.
    pub async fn queue_quizlet_module_import(
        &self,
        module: ModuleDraft,
        quizlet_module_id: &str,
    ) -> Result<()> {
        let span = tracing::info_span!(
            "quizlet_import",
            quizlet_module_id = %quizlet_module_id,
            user_uuid = %module.user_uuid,
            module = %module.name,
        );

        let work = QuizletImportWork::new(
            Arc::clone(&self.store),
            Arc::clone(&self.quizlet_parser),
            span,
            module,
            quizlet_module_id,
        );

        tracing::debug!(
            pool = self.quizlet_import_pool.name(),
            quizlet_module_id = work.quizlet_module_id(),
            "queueing quizlet import"
        );
        self.quizlet_import_pool.queue_work(work).await
    }

    /// Fails only when the CSV pool is already closed. Waits while the queue is full.
    /// The reader belongs to the job from here on and is dropped when it finishes.
    pub async fn queue_csv_module_import<R>(&self, module: ModuleDraft, reader: R) -> Result<()>
    where
        R: Read + Send + 'static,
    {
        let span = tracing::info_span!(
            "csv_import",
            user_uuid = %module.user_uuid,
            module = %module.name,
        );

        let work = CsvImportWork::new(
            Arc::clone(&self.store),
            span,
            module,
            Box::new(reader),
            self.csv_max_bytes,
        );

        tracing::debug!(pool = self.csv_import_pool.name(), "queueing csv import");
        self.csv_import_pool.queue_work(work).await
    }
}
