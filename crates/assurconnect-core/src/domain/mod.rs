pub mod category;
pub mod ids;
pub mod lead;
pub mod payload;
pub mod status;

pub use category::LeadCategory;
pub use ids::LeadId;
pub use lead::Lead;
pub use payload::Payload;
pub use status::LeadStatus;
