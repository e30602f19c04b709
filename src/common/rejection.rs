use serde::Serialize;
use std::fmt;

/// Why a payload was dropped instead of reaching the transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum RejectionReason {
    MalformedPayload,
    InvalidAccountId,
    UnmappableFields,
    ConstructionFailed,
    PublishFailed,
}

impl RejectionReason {
    pub const ALL: [RejectionReason; 5] = [
        RejectionReason::MalformedPayload,
        RejectionReason::InvalidAccountId,
        RejectionReason::UnmappableFields,
        RejectionReason::ConstructionFailed,
        RejectionReason::PublishFailed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RejectionReason::MalformedPayload => "MalformedPayload",
            RejectionReason::InvalidAccountId => "InvalidAccountId",
            RejectionReason::UnmappableFields => "UnmappableFields",
            RejectionReason::ConstructionFailed => "ConstructionFailed",
            RejectionReason::PublishFailed => "PublishFailed",
        }
    }

    pub(crate) fn index(&self) -> usize {
        match self {
            RejectionReason::MalformedPayload => 0,
            RejectionReason::InvalidAccountId => 1,
            RejectionReason::UnmappableFields => 2,
            RejectionReason::ConstructionFailed => 3,
            RejectionReason::PublishFailed => 4,
        }
    }
}

impl fmt::Display for RejectionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
