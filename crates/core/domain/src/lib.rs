pub mod data;

pub use data::{DecodedPayload, MeasurementRecord, RawEvent, UNKNOWN_DEVICE};
