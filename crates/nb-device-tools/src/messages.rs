//! Prose both structured adapters report back.
//!
//! The dispatcher sniffs these strings ("successfully", "cannot"), so the
//! wording is part of the adapter contract.

/// Loopback mutation kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopbackOp {
    Create,
    Delete,
    Enable,
    Disable,
}

impl LoopbackOp {
    /// Verb used in the failure form ("Cannot shutdown: ...").
    pub fn verb(self) -> &'static str {
        match self {
            LoopbackOp::Create => "create",
            LoopbackOp::Delete => "delete",
            LoopbackOp::Enable => "enable",
            LoopbackOp::Disable => "shutdown",
        }
    }

    /// Participle used in the success form ("... is shutdowned successfully").
    pub fn participle(self) -> &'static str {
        match self {
            LoopbackOp::Create => "created",
            LoopbackOp::Delete => "deleted",
            LoopbackOp::Enable => "enabled",
            LoopbackOp::Disable => "shutdowned",
        }
    }
}

pub fn succeeded(op: LoopbackOp, student_id: &str) -> String {
    format!(
        "Interface loopback {student_id} is {} successfully",
        op.participle()
    )
}

pub fn cannot(op: LoopbackOp, student_id: &str) -> String {
    format!("Cannot {}: Interface loopback {student_id}", op.verb())
}

pub fn enabled(student_id: &str) -> String {
    format!("Interface loopback {student_id} is enabled")
}

pub fn disabled(student_id: &str) -> String {
    format!("Interface loopback {student_id} is disabled")
}

pub fn not_found(student_id: &str) -> String {
    format!("No Interface loopback {student_id}")
}
