mod error;
mod log_record;
mod multimap;

pub use error::RecordError;
pub use log_record::{ExchangeData, LogRecord, RecordKind};
pub use multimap::MultiValueMap;

pub(crate) use log_record::titlecase;
