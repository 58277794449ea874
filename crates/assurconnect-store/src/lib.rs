pub mod blob;
pub mod error;
pub mod export;
pub mod leads;
pub mod migrate;
pub mod paths;

pub use blob::{BlobStorage, MemoryBlobStorage, SqliteBlobStorage, UnavailableBlobStorage};
pub use error::{Result, StoreError, StoreErrorKind};
pub use export::{export_filename, export_to_csv, render_csv, write_csv};
pub use leads::{Appended, LeadStore, LEADS_KEY};
