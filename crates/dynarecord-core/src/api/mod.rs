//! Public API: records, lifecycle operations and request synthesis.

pub mod builders;
pub mod options;
pub mod record;
pub mod request;

pub use builders::{apply_read_response, build_delete_request, build_read_request, build_write_request};
pub use options::{DeleteOptions, ReadOptions, WriteOptions};
pub use record::{Record, RecordKey, RecordState};
pub use request::{
    DeleteOutcome, DeleteRequest, DeleteResponse, Expectation, Expected, GetResponse, PreparedWrite,
    PutResponse, ReadRequest, WriteOutcome, WriteRequest,
};
