//! Store client boundary.
//!
//! The record engine never talks to a network itself. A [`StoreClient`]
//! executes the synthesized requests and reports failures as
//! [`StoreError`]s, keeping conditional-check failures distinct from
//! everything else. [`MemoryStore`] is an in-process implementation.

pub mod memory;

use std::future::Future;

use crate::api::{DeleteRequest, DeleteResponse, GetResponse, PutResponse, ReadRequest, WriteRequest};
use crate::error::StoreError;

pub use memory::{MemoryStore, MemoryTableBuilder};

/// Executes single-item requests against a hash/range-keyed store.
///
/// Each call completes exactly once; retries, timeouts and cancellation are
/// the implementation's concern.
pub trait StoreClient {
    /// Upsert one item, honoring the request's expectation clause.
    fn put(&self, request: &WriteRequest) -> impl Future<Output = Result<PutResponse, StoreError>> + Send;

    /// Delete one item, honoring the request's expectation clause.
    fn delete(
        &self,
        request: &DeleteRequest,
    ) -> impl Future<Output = Result<DeleteResponse, StoreError>> + Send;

    /// Point lookup by key. A missing item is `Ok` with `item: None`.
    fn get(&self, request: &ReadRequest) -> impl Future<Output = Result<GetResponse, StoreError>> + Send;
}

impl<T: StoreClient + Sync> StoreClient for &T {
    fn put(&self, request: &WriteRequest) -> impl Future<Output = Result<PutResponse, StoreError>> + Send {
        (**self).put(request)
    }

    fn delete(
        &self,
        request: &DeleteRequest,
    ) -> impl Future<Output = Result<DeleteResponse, StoreError>> + Send {
        (**self).delete(request)
    }

    fn get(&self, request: &ReadRequest) -> impl Future<Output = Result<GetResponse, StoreError>> + Send {
        (**self).get(request)
    }
}
