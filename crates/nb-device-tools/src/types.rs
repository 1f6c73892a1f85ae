//! Per-call device addressing and the loopback every structured operation
//! acts on.

use std::fmt;

use nb_protocol::DeviceAddr;
use serde::Deserialize;

/// Login used for RESTCONF basic auth and SSH password auth.
#[derive(Clone, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

// Keep passwords out of logs and panic messages.
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// The device a single adapter call is aimed at.
#[derive(Debug, Clone)]
pub struct DeviceTarget {
    pub host: String,
    pub credentials: Credentials,
}

impl DeviceTarget {
    pub fn new(host: impl Into<String>, credentials: Credentials) -> Self {
        Self {
            host: host.into(),
            credentials,
        }
    }

    /// Target for an address parsed out of a chat command.
    pub fn for_addr(addr: &DeviceAddr, credentials: &Credentials) -> Self {
        Self::new(addr.as_str(), credentials.clone())
    }
}

/// The student's loopback interface: `Loopback<id>` with address
/// `172.<d1>.<d2d3>.1/24` taken from the last three digits of the id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoopbackSpec {
    pub student_id: String,
    pub name: String,
    pub address: String,
    pub netmask: String,
}

impl LoopbackSpec {
    pub fn for_student(student_id: &str) -> Self {
        Self {
            student_id: student_id.to_string(),
            name: format!("Loopback{student_id}"),
            address: loopback_address(student_id),
            netmask: "255.255.255.0".to_string(),
        }
    }

    pub fn description(&self) -> String {
        format!("Loopback for student {}", self.student_id)
    }
}

fn loopback_address(student_id: &str) -> String {
    let digits: Vec<u32> = student_id.chars().filter_map(|c| c.to_digit(10)).collect();
    let ends_in_digits = student_id
        .chars()
        .rev()
        .take(3)
        .all(|c| c.is_ascii_digit());

    match digits.as_slice() {
        [.., a, b, c] if ends_in_digits => format!("172.{a}.{}.1", b * 10 + c),
        _ => "172.0.0.1".to_string(),
    }
}
