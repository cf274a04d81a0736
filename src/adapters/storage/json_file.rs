use super::assign_identities;
use crate::domain::model::{Card, Module, ModuleWithCards, StoredModule};
use crate::domain::ports::ModuleStore;
use crate::utils::error::{CardsError, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// On-disk shape of one module: `<base>/<user_uuid>/<module_uuid>.json`.
#[derive(Debug, Serialize, Deserialize)]
struct ModuleDocument {
    module: Module,
    cards: Vec<Card>,
    created_at: DateTime<Utc>,
}

/// Stores every module as a single JSON document. The document is written to
/// a temporary file and renamed into place, so a module appears with all of
/// its cards or not at all.
#[derive(Debug, Clone)]
pub struct JsonFileModuleStore {
    base_path: PathBuf,
}

impl JsonFileModuleStore {
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    fn user_dir(&self, user_uuid: Uuid) -> PathBuf {
        self.base_path.join(user_uuid.to_string())
    }

    fn module_path(&self, user_uuid: Uuid, module_uuid: Uuid) -> PathBuf {
        self.user_dir(user_uuid).join(format!("{}.json", module_uuid))
    }

    async fn read_document(path: &Path) -> Result<ModuleDocument> {
        let data = tokio::fs::read(path).await?;
        Ok(serde_json::from_slice(&data)?)
    }
}

#[async_trait]
impl ModuleStore for JsonFileModuleStore {
    async fn create_new_module_with_cards(
        &self,
        module_with_cards: ModuleWithCards,
    ) -> Result<Module> {
        let StoredModule { module, cards } = assign_identities(module_with_cards)?;

        let dir = self.user_dir(module.user_uuid);
        tokio::fs::create_dir_all(&dir).await?;

        let final_path = self.module_path(module.user_uuid, module.uuid);
        let temp_path = dir.join(format!(".{}.json.tmp", module.uuid));

        let document = ModuleDocument {
            module: module.clone(),
            cards,
            created_at: Utc::now(),
        };
        let data = serde_json::to_vec_pretty(&document)?;

        tracing::debug!(path = %final_path.display(), bytes = data.len(), "writing module document");

        if let Err(e) = tokio::fs::write(&temp_path, &data).await {
            let _ = tokio::fs::remove_file(&temp_path).await;
            return Err(e.into());
        }
        if let Err(e) = tokio::fs::rename(&temp_path, &final_path).await {
            let _ = tokio::fs::remove_file(&temp_path).await;
            return Err(e.into());
        }

        Ok(module)
    }

    async fn get_module_with_cards(
        &self,
        user_uuid: Uuid,
        module_uuid: Uuid,
    ) -> Result<StoredModule> {
        let path = self.module_path(user_uuid, module_uuid);

        match Self::read_document(&path).await {
            Ok(document) => Ok(StoredModule {
                module: document.module,
                cards: document.cards,
            }),
            Err(CardsError::IoError(e)) if e.kind() == ErrorKind::NotFound => {
                Err(CardsError::ModuleNotFound { uuid: module_uuid })
            }
            Err(e) => Err(e),
        }
    }

    async fn list_modules(&self, user_uuid: Uuid) -> Result<Vec<Module>> {
        let dir = self.user_dir(user_uuid);

        let mut entries = match tokio::fs::read_dir(&dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut documents = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            // 略過暫存檔與其他檔案
            let is_document = path.extension().is_some_and(|ext| ext == "json")
                && !entry.file_name().to_string_lossy().starts_with('.');
            if !is_document {
                continue;
            }

            documents.push(Self::read_document(&path).await?);
        }

        documents.sort_by(|a, b| a.created_at.cmp(&b.created_at));

        Ok(documents.into_iter().map(|d| d.module).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{CardDraft, ModuleDraft};
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_write_and_read_back() {
        let temp_dir = TempDir::new().unwrap();
        let store = JsonFileModuleStore::new(temp_dir.path());
        let user = Uuid::new_v4();

        let module = store
            .create_new_module_with_cards(ModuleWithCards {
                module: ModuleDraft::new("Colors", user),
                cards: vec![CardDraft::new("red", "rojo"), CardDraft::new("blue", "azul")],
            })
            .await
            .unwrap();

        let path = temp_dir
            .path()
            .join(user.to_string())
            .join(format!("{}.json", module.uuid));
        assert!(path.exists());

        let stored = store.get_module_with_cards(user, module.uuid).await.unwrap();
        assert_eq!(stored.module, module);
        assert_eq!(
            stored.cards.iter().map(|c| c.term.as_str()).collect::<Vec<_>>(),
            vec!["red", "blue"]
        );

        let listed = store.list_modules(user).await.unwrap();
        assert_eq!(listed, vec![module]);
    }

    #[tokio::test]
    async fn test_rejected_write_leaves_no_files() {
        let temp_dir = TempDir::new().unwrap();
        let store = JsonFileModuleStore::new(temp_dir.path());
        let user = Uuid::new_v4();

        let result = store
            .create_new_module_with_cards(ModuleWithCards {
                module: ModuleDraft::new("Broken", user),
                cards: vec![CardDraft::new("ok", "bien"), CardDraft::new("", "vacío")],
            })
            .await;

        assert!(matches!(result, Err(CardsError::InvalidCard { index: 1, .. })));
        assert!(!temp_dir.path().join(user.to_string()).exists());
        assert!(store.list_modules(user).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_missing_module() {
        let temp_dir = TempDir::new().unwrap();
        let store = JsonFileModuleStore::new(temp_dir.path());
        let missing = Uuid::new_v4();

        let result = store.get_module_with_cards(Uuid::new_v4(), missing).await;
        assert!(matches!(result, Err(CardsError::ModuleNotFound { uuid }) if uuid == missing));
    }
}
