//! Structured-config adapter abstraction.
//!
//! `StructuredConfig` is implemented by `RestconfClient` and `NetconfClient`
//! (plus `MockStructuredConfig` in `mock.rs`). Implementations report plain
//! prose from `crate::messages`; a returned `Err` means the device could
//! not be asked at all.

use async_trait::async_trait;
use nb_protocol::MethodKind;

use crate::error::DeviceResult;
use crate::types::DeviceTarget;

/// Loopback lifecycle operations over one structured transport.
#[async_trait]
pub trait StructuredConfig: Send + Sync {
    /// Which method this adapter implements.
    fn method(&self) -> MethodKind;

    async fn create(&self, target: &DeviceTarget) -> DeviceResult<String>;

    async fn delete(&self, target: &DeviceTarget) -> DeviceResult<String>;

    async fn enable(&self, target: &DeviceTarget) -> DeviceResult<String>;

    async fn disable(&self, target: &DeviceTarget) -> DeviceResult<String>;

    /// Enabled/disabled report for the loopback.
    async fn status(&self, target: &DeviceTarget) -> DeviceResult<String>;
}
