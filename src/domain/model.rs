use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Skeleton of a module that has not been stored yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleDraft {
    pub name: String,
    pub user_uuid: Uuid,
}

impl ModuleDraft {
    pub fn new(name: impl Into<String>, user_uuid: Uuid) -> Self {
        Self {
            name: name.into(),
            user_uuid,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Module {
    pub uuid: Uuid,
    pub name: String,
    pub user_uuid: Uuid,
}

/// A term/meaning pair waiting for its identity and owning module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardDraft {
    pub term: String,
    pub meaning: String,
}

impl CardDraft {
    pub fn new(term: impl Into<String>, meaning: impl Into<String>) -> Self {
        Self {
            term: term.into(),
            meaning: meaning.into(),
        }
    }

    /// Trims both sides and keeps the card only when neither is empty.
    pub fn trimmed(term: &str, meaning: &str) -> Option<Self> {
        let term = term.trim();
        let meaning = meaning.trim();

        if term.is_empty() || meaning.is_empty() {
            return None;
        }

        Some(Self::new(term, meaning))
    }

    pub fn is_complete(&self) -> bool {
        !self.term.trim().is_empty() && !self.meaning.trim().is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    pub uuid: Uuid,
    pub module_uuid: Uuid,
    pub term: String,
    pub meaning: String,
}

/// Write envelope: a module and all of its cards, stored in one atomic call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleWithCards {
    pub module: ModuleDraft,
    pub cards: Vec<CardDraft>,
}

/// A stored module together with its cards, in insertion order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredModule {
    pub module: Module,
    pub cards: Vec<Card>,
}

/// One flashcard as scraped from Quizlet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizletCard {
    pub front: String,
    pub back: String,
}

impl From<QuizletCard> for CardDraft {
    fn from(card: QuizletCard) -> Self {
        CardDraft::new(card.front, card.back)
    }
}
