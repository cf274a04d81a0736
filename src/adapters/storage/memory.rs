use super::assign_identities;
use crate::domain::model::{Module, ModuleWithCards, StoredModule};
use crate::domain::ports::ModuleStore;
use crate::utils::error::{CardsError, Result};
use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Process-local store. Every write happens under one lock, so readers see
/// either the whole module with all its cards or nothing.
#[derive(Debug, Default)]
pub struct MemoryModuleStore {
    modules: RwLock<Vec<StoredModule>>,
}

impl MemoryModuleStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn card_count(&self) -> usize {
        self.modules.read().await.iter().map(|m| m.cards.len()).sum()
    }
}

#[async_trait]
impl ModuleStore for MemoryModuleStore {
    async fn create_new_module_with_cards(
        &self,
        module_with_cards: ModuleWithCards,
    ) -> Result<Module> {
        let stored = assign_identities(module_with_cards)?;
        let module = stored.module.clone();

        self.modules.write().await.push(stored);

        Ok(module)
    }

    async fn get_module_with_cards(
        &self,
        user_uuid: Uuid,
        module_uuid: Uuid,
    ) -> Result<StoredModule> {
        self.modules
            .read()
            .await
            .iter()
            .find(|m| m.module.uuid == module_uuid && m.module.user_uuid == user_uuid)
            .cloned()
            .ok_or(CardsError::ModuleNotFound { uuid: module_uuid })
    }

    async fn list_modules(&self, user_uuid: Uuid) -> Result<Vec<Module>> {
        Ok(self
            .modules
            .read()
            .await
            .iter()
            .filter(|m| m.module.user_uuid == user_uuid)
            .map(|m| m.module.clone())
            .collect())
    }
}
