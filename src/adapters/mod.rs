// Adapters layer: concrete implementations for external systems (Quizlet, storage).

pub mod quizlet;
pub mod storage;
