pub mod import_work;
pub mod modules;
pub mod worker_pool;

pub use crate::domain::model::{
    Card, CardDraft, Module, ModuleDraft, ModuleWithCards, QuizletCard, StoredModule,
};
pub use crate::domain::ports::{ModuleStore, QuizletModuleParser, Work};
pub use crate::utils::error::Result;
