//! Background import jobs.
//!
//! Both jobs follow the same shape: collect every card in memory, then store
//! the module and its cards with one atomic call. Nothing is written when the
//! source fails midway. Failures are only logged; the caller that queued the
//! job has already been answered.

use crate::domain::model::{CardDraft, ModuleDraft, ModuleWithCards};
use crate::domain::ports::{ModuleStore, QuizletModuleParser, Work};
use crate::utils::error::CardsError;
use std::future::Future;
use std::io::{self, Read};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, Span};

pub const CSV_RECORD_MIN_LENGTH: usize = 2;
pub const DEFAULT_CSV_MAX_BYTES: u64 = 1 << 20;

async fn store_module(
    store: &dyn ModuleStore,
    module: ModuleDraft,
    cards: Vec<CardDraft>,
    source: &str,
) {
    let card_count = cards.len();

    match store
        .create_new_module_with_cards(ModuleWithCards { module, cards })
        .await
    {
        Ok(stored) => tracing::info!(
            module_uuid = %stored.uuid,
            cards = card_count,
            "✅ module from {} imported",
            source
        ),
        Err(e) => tracing::error!(error = %e, "module from {} storing failed", source),
    }
}

/// Imports a public Quizlet set as a new module.
pub struct QuizletImportWork {
    store: Arc<dyn ModuleStore>,
    parser: Arc<dyn QuizletModuleParser>,
    span: Span,
    module: ModuleDraft,
    quizlet_module_id: String,
}

impl QuizletImportWork {
    pub fn new(
        store: Arc<dyn ModuleStore>,
        parser: Arc<dyn QuizletModuleParser>,
        span: Span,
        module: ModuleDraft,
        quizlet_module_id: impl Into<String>,
    ) -> Self {
        Self {
            store,
            parser,
            span,
            module,
            quizlet_module_id: quizlet_module_id.into(),
        }
    }

    pub fn quizlet_module_id(&self) -> &str {
        &self.quizlet_module_id
    }

    async fn run(self, cancel: CancellationToken) {
        let quizlet_cards = match self.parser.parse(&self.quizlet_module_id, &cancel).await {
            Ok(cards) => cards,
            Err(CardsError::Cancelled) => {
                tracing::warn!("import work has been interrupted");
                return;
            }
            Err(e) => {
                tracing::error!(
                    error = %e,
                    transient = e.is_transient(),
                    "quizlet module parsing failed"
                );
                return;
            }
        };

        let parsed = quizlet_cards.len();
        let cards: Vec<CardDraft> = quizlet_cards
            .into_iter()
            .map(CardDraft::from)
            .filter(CardDraft::is_complete)
            .collect();
        if cards.len() < parsed {
            tracing::debug!(skipped = parsed - cards.len(), "blank quizlet cards skipped");
        }

        // 空的模組視為沒有東西可匯入
        if cards.is_empty() {
            tracing::debug!("quizlet module has no complete cards, nothing to import");
            return;
        }

        tracing::info!(
            cards = cards.len(),
            "quizlet module \"{}\" parsed",
            self.quizlet_module_id
        );

        store_module(self.store.as_ref(), self.module, cards, "quizlet").await;
    }
}

impl Work for QuizletImportWork {
    fn execute(self, cancel: CancellationToken) -> impl Future<Output = ()> + Send {
        let span = self.span.clone();
        self.run(cancel).instrument(span)
    }
}

/// Imports an uploaded CSV (`term,meaning` per row) as a new module.
pub struct CsvImportWork {
    store: Arc<dyn ModuleStore>,
    span: Span,
    module: ModuleDraft,
    reader: Box<dyn Read + Send>,
    max_bytes: u64,
}

impl CsvImportWork {
    pub fn new(
        store: Arc<dyn ModuleStore>,
        span: Span,
        module: ModuleDraft,
        reader: Box<dyn Read + Send>,
        max_bytes: u64,
    ) -> Self {
        Self {
            store,
            span,
            module,
            reader,
            max_bytes,
        }
    }

    async fn run(self, cancel: CancellationToken) {
        let CsvImportWork {
            store,
            module,
            reader,
            max_bytes,
            ..
        } = self;

        // reader 的所有權移進 blocking task，任何結束路徑都會 drop（關閉）它
        let reader = LimitedReader::new(reader, max_bytes);
        let token = cancel.clone();
        let outcome = tokio::task::spawn_blocking(move || read_csv_cards(reader, &token)).await;

        let cards = match outcome {
            Ok(CsvReadOutcome::Completed(cards)) => cards,
            Ok(CsvReadOutcome::Interrupted) => {
                tracing::warn!("import work has been interrupted");
                return;
            }
            Ok(CsvReadOutcome::Failed(e)) => {
                tracing::error!(error = %e, "csv reading error");
                return;
            }
            Err(e) => {
                tracing::error!(error = %e, "csv reading task failed");
                return;
            }
        };

        tracing::info!(cards = cards.len(), "csv parsed");
        store_module(store.as_ref(), module, cards, "csv").await;
    }
}

impl Work for CsvImportWork {
    fn execute(self, cancel: CancellationToken) -> impl Future<Output = ()> + Send {
        let span = self.span.clone();
        self.run(cancel).instrument(span)
    }
}

#[derive(Debug)]
pub enum CsvReadOutcome {
    Completed(Vec<CardDraft>),
    Interrupted,
    Failed(CardsError),
}

/// Reads `term,meaning` records until end of input.
///
/// Rows with fewer than two fields, or with an empty term or meaning after
/// trimming, are skipped. Invalid UTF-8 is replaced rather than rejected.
/// Cancellation is checked before every record.
pub fn read_csv_cards<R: Read>(reader: R, cancel: &CancellationToken) -> CsvReadOutcome {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(reader);
    let mut record = csv::ByteRecord::new();
    let mut cards = Vec::new();

    loop {
        if cancel.is_cancelled() {
            return CsvReadOutcome::Interrupted;
        }

        match csv_reader.read_byte_record(&mut record) {
            Ok(true) => {}
            Ok(false) => return CsvReadOutcome::Completed(cards),
            Err(e) => return CsvReadOutcome::Failed(e.into()),
        }

        if record.len() < CSV_RECORD_MIN_LENGTH {
            continue;
        }

        let term = String::from_utf8_lossy(&record[0]);
        let meaning = String::from_utf8_lossy(&record[1]);
        if let Some(card) = CardDraft::trimmed(&term, &meaning) {
            cards.push(card);
        }
    }
}

/// Fails with `InvalidData` once more than `limit` bytes are read.
pub struct LimitedReader<R> {
    inner: R,
    remaining: u64,
    limit: u64,
}

impl<R: Read> LimitedReader<R> {
    pub fn new(inner: R, limit: u64) -> Self {
        Self {
            inner,
            remaining: limit,
            limit,
        }
    }
}

impl<R: Read> Read for LimitedReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }

        if self.remaining == 0 {
            // 剛好讀到上限時還要確認後面是否真的沒有資料
            let mut probe = [0u8; 1];
            return match self.inner.read(&mut probe)? {
                0 => Ok(0),
                _ => Err(io::Error::new(
                    io::ErrorKind::InvalidData,
                    format!("input exceeds {} bytes", self.limit),
                )),
            };
        }

        let max = usize::try_from(self.remaining)
            .unwrap_or(usize::MAX)
            .min(buf.len());
        let read = self.inner.read(&mut buf[..max])?;
        self.remaining -= read as u64;

        Ok(read)
    }
}
