use crate::domain::model::{Module, ModuleWithCards, QuizletCard, StoredModule};
use crate::utils::error::Result;
use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

/// Storage for modules and their cards.
#[async_trait]
pub trait ModuleStore: Send + Sync {
    /// Inserts the module and every card in a single all-or-nothing write.
    /// Identities of the module and its cards are assigned here.
    async fn create_new_module_with_cards(&self, module_with_cards: ModuleWithCards)
        -> Result<Module>;

    async fn get_module_with_cards(&self, user_uuid: Uuid, module_uuid: Uuid)
        -> Result<StoredModule>;

    async fn list_modules(&self, user_uuid: Uuid) -> Result<Vec<Module>>;
}

/// Fetches a public Quizlet set and flattens it into cards.
#[async_trait]
pub trait QuizletModuleParser: Send + Sync {
    async fn parse(&self, module_id: &str, cancel: &CancellationToken) -> Result<Vec<QuizletCard>>;
}

/// A unit of background work run by a worker pool.
///
/// The work is consumed by `execute`; failures are logged by the work itself
/// because nobody is waiting for a result.
pub trait Work: Send + 'static {
    fn execute(self, cancel: CancellationToken) -> impl std::future::Future<Output = ()> + Send;
}
