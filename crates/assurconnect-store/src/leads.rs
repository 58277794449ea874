use crate::blob::{BlobStorage, MemoryBlobStorage, SqliteBlobStorage};
use crate::error::{Result, StoreError};
use assurconnect_core::time::now_utc;
use assurconnect_core::{CoreError, Lead, LeadCategory, LeadSink, Payload, QuoteForm};
use serde_json::Value;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Key of the blob holding every lead, most recent first.
pub const LEADS_KEY: &str = "assur_compar_leads";

/// Result of [`LeadStore::append`].
///
/// The lead is always built and handed to the sink. `persist_error` is set
/// when writing it locally failed.
#[derive(Debug)]
pub struct Appended {
    pub lead: Lead,
    pub persist_error: Option<StoreError>,
}

impl Appended {
    pub fn is_persisted(&self) -> bool {
        self.persist_error.is_none()
    }
}

/// Append-only, locally persisted record of captured leads.
///
/// Build one per process and pass it by reference to whatever collects
/// leads. Every new lead is forwarded to the sink exactly once.
pub struct LeadStore {
    storage: Box<dyn BlobStorage>,
    sink: Arc<dyn LeadSink>,
}

impl LeadStore {
    pub fn new(storage: impl BlobStorage + 'static, sink: Arc<dyn LeadSink>) -> Self {
        Self {
            storage: Box::new(storage),
            sink,
        }
    }

    pub fn open(path: &Path, sink: Arc<dyn LeadSink>) -> Result<Self> {
        Ok(Self::new(SqliteBlobStorage::open(path)?, sink))
    }

    pub fn in_memory(sink: Arc<dyn LeadSink>) -> Self {
        Self::new(MemoryBlobStorage::new(), sink)
    }

    /// Every persisted lead, most recent first.
    ///
    /// Unreadable storage or a blob that is not a JSON array reads as an
    /// empty store. Records that do not decode as a [`Lead`] are skipped
    /// here but stay in storage.
    pub fn list_all(&self) -> Vec<Lead> {
        let records = match self.load() {
            Ok(records) => records,
            Err(err) => {
                warn!(key = LEADS_KEY, error = %err, "failed to read leads, treating store as empty");
                return Vec::new();
            }
        };
        records
            .into_iter()
            .enumerate()
            .filter_map(|(index, record)| match serde_json::from_value::<Lead>(record) {
                Ok(lead) => Some(lead),
                Err(err) => {
                    warn!(key = LEADS_KEY, index, error = %err, "skipping unreadable lead record");
                    None
                }
            })
            .collect()
    }

    pub fn list_by_category(&self, category: LeadCategory) -> Vec<Lead> {
        self.list_all()
            .into_iter()
            .filter(|lead| lead.category == category)
            .collect()
    }

    /// Records a new lead and forwards it to the sink.
    ///
    /// The write and the hand-off are independent: a failed write is logged
    /// and reported in [`Appended::persist_error`], and the sink still gets
    /// the lead. Existing records are carried over untouched, including ones
    /// this version cannot decode. When the current blob cannot be read at
    /// all, nothing is written.
    pub fn append(&self, category: LeadCategory, payload: Payload) -> Appended {
        let lead = Lead::new(category, payload, now_utc());

        let saved = self
            .load()
            .and_then(|records| self.prepend(&lead, records));
        let persist_error = match saved {
            Ok(total) => {
                debug!(id = %lead.id, category = %category, total, "lead saved");
                None
            }
            Err(err) => {
                error!(id = %lead.id, category = %category, error = %err, "failed to save lead");
                Some(err)
            }
        };

        info!(
            event = "generate_lead",
            event_category = "engagement",
            event_label = %category,
            "lead generated"
        );

        self.sink.dispatch(&lead);

        Appended {
            lead,
            persist_error,
        }
    }

    /// Validates a typed quote form and appends it under the form's category.
    pub fn append_form<F: QuoteForm>(&self, form: &F) -> std::result::Result<Appended, CoreError> {
        let payload = form.to_payload()?;
        Ok(self.append(F::CATEGORY, payload))
    }

    /// Raw stored records. A blob that is not a JSON array counts as empty
    /// and is replaced on the next append; storage errors propagate.
    fn load(&self) -> Result<Vec<Value>> {
        let Some(raw) = self.storage.get(LEADS_KEY)? else {
            return Ok(Vec::new());
        };
        match serde_json::from_str(&raw) {
            Ok(records) => Ok(records),
            Err(err) => {
                warn!(key = LEADS_KEY, error = %err, "stored leads are not a JSON array, starting over");
                Ok(Vec::new())
            }
        }
    }

    fn prepend(&self, lead: &Lead, mut records: Vec<Value>) -> Result<usize> {
        records.insert(0, serde_json::to_value(lead)?);
        let raw = serde_json::to_string(&records)?;
        self.storage.set(LEADS_KEY, &raw)?;
        Ok(records.len())
    }
}
