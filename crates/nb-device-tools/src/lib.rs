//! Device transport adapters for netbot.
//!
//! Every backend the dispatcher talks to sits behind a trait so it can be
//! swapped for a mock in tests:
//! - `StructuredConfig`: loopback lifecycle over RESTCONF or NETCONF
//! - `CliScrape`: banner and interface reads over SSH exec
//! - `BatchRunner`: Ansible-driven config dumps and banner writes
//!
//! The target device is always a call argument (`DeviceTarget`); adapters
//! hold no per-device state.

pub mod batch;
pub mod cli;
pub mod error;
pub mod messages;
pub mod mock;
pub mod netconf;
pub mod restconf;
pub mod ssh;
pub mod structured;
pub mod types;

pub use batch::{AnsibleConfig, AnsibleRunner, BatchOutcome, BatchRunner};
pub use cli::{CliScrape, CliScraper, CliTransport};
pub use error::{DeviceError, DeviceResult};
pub use mock::{BatchCall, MockBatchRunner, MockCliTransport, MockNetconfTransport, MockStructuredConfig};
pub use netconf::{NetconfClient, NetconfTransport};
pub use restconf::{RestconfClient, RestconfConfig};
pub use ssh::{SshCliTransport, SshNetconfTransport};
pub use structured::StructuredConfig;
pub use types::{Credentials, DeviceTarget, LoopbackSpec};
