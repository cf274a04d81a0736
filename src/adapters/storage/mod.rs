pub mod json_file;
pub mod memory;

pub use json_file::JsonFileModuleStore;
pub use memory::MemoryModuleStore;

use crate::domain::model::{Card, Module, ModuleWithCards, StoredModule};
use crate::utils::error::{CardsError, Result};
use uuid::Uuid;

/// Validates the envelope and assigns identities to the module and its cards.
/// Nothing is written here; a failure leaves the store untouched.
pub(crate) fn assign_identities(module_with_cards: ModuleWithCards) -> Result<StoredModule> {
    let ModuleWithCards { module, cards } = module_with_cards;

    if module.name.trim().is_empty() {
        return Err(CardsError::InvalidModule {
            reason: "name must not be empty".to_string(),
        });
    }

    let module = Module {
        uuid: Uuid::new_v4(),
        name: module.name,
        user_uuid: module.user_uuid,
    };

    let cards = cards
        .into_iter()
        .enumerate()
        .map(|(index, card)| {
            if !card.is_complete() {
                return Err(CardsError::InvalidCard {
                    index,
                    reason: "term and meaning must not be empty".to_string(),
                });
            }

            Ok(Card {
                uuid: Uuid::new_v4(),
                module_uuid: module.uuid,
                term: card.term,
                meaning: card.meaning,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(StoredModule { module, cards })
}
