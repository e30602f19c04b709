use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use uuid::Uuid;

/// Origin feed tag carried by every internal account event.
pub const SOURCE_SYSTEM: &str = "Salesforce";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AccountEventType {
    Created,
    Updated,
    Deleted,
}

/// Coarse business section touched by a change.
///
/// `Ord` follows declaration order, which is the order `ChangedBlocks`
/// serializes in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum AccountChangedBlock {
    BillingAddress,
    DeliveryAddress,
    BillingInfo,
    PrimaryContact,
}

impl AccountChangedBlock {
    pub const ALL: [AccountChangedBlock; 4] = [
        AccountChangedBlock::BillingAddress,
        AccountChangedBlock::DeliveryAddress,
        AccountChangedBlock::BillingInfo,
        AccountChangedBlock::PrimaryContact,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AccountChangedBlock::BillingAddress => "BillingAddress",
            AccountChangedBlock::DeliveryAddress => "DeliveryAddress",
            AccountChangedBlock::BillingInfo => "BillingInfo",
            AccountChangedBlock::PrimaryContact => "PrimaryContact",
        }
    }
}

impl fmt::Display for AccountChangedBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for AccountEventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AccountEventType::Created => "Created",
            AccountEventType::Updated => "Updated",
            AccountEventType::Deleted => "Deleted",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct BillingAddress {
    pub street: String,
    pub city: String,
    pub postal_code: String,
    pub country: String,
    pub invoice_email: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct DeliveryAddress {
    pub street: String,
    pub city: String,
    pub postal_code: String,
    pub country: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct BillingInfo {
    pub vat_id: String,
    pub payment_method: String,
    pub payment_terms: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct ContactPerson {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
}

/// Validated account change, the contract handed to downstream consumers.
///
/// Built only by the translator; fields are read through accessors so an
/// event cannot be altered once it leaves translation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct InternalAccountEvent {
    account_id: Uuid,
    account_name: String,
    account_type: String,
    replay_id: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    billing_address: Option<BillingAddress>,
    #[serde(skip_serializing_if = "Option::is_none")]
    delivery_address: Option<DeliveryAddress>,
    #[serde(skip_serializing_if = "Option::is_none")]
    billing_info: Option<BillingInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    primary_contact: Option<ContactPerson>,

    event_type: AccountEventType,
    changed_blocks: BTreeSet<AccountChangedBlock>,
    last_modified_utc: DateTime<Utc>,

    correlation_id: String,
    trace_id: String,
    source_system: String,
    event_producer: String,
}

/// Field set for [`InternalAccountEvent::new`].
pub(crate) struct AccountEventParts {
    pub account_id: Uuid,
    pub account_name: String,
    pub account_type: String,
    pub replay_id: String,
    pub billing_address: Option<BillingAddress>,
    pub delivery_address: Option<DeliveryAddress>,
    pub billing_info: Option<BillingInfo>,
    pub primary_contact: Option<ContactPerson>,
    pub event_type: AccountEventType,
    pub changed_blocks: BTreeSet<AccountChangedBlock>,
    pub last_modified_utc: DateTime<Utc>,
    pub correlation_id: String,
    pub trace_id: String,
    pub event_producer: String,
}

impl InternalAccountEvent {
    pub(crate) fn new(parts: AccountEventParts) -> Self {
        let AccountEventParts {
            account_id,
            account_name,
            account_type,
            replay_id,
            billing_address,
            delivery_address,
            billing_info,
            primary_contact,
            event_type,
            changed_blocks,
            last_modified_utc,
            correlation_id,
            trace_id,
            event_producer,
        } = parts;

        Self {
            account_id,
            account_name,
            account_type,
            replay_id,
            billing_address,
            delivery_address,
            billing_info,
            primary_contact,
            event_type,
            changed_blocks,
            last_modified_utc,
            correlation_id,
            trace_id,
            source_system: SOURCE_SYSTEM.to_string(),
            event_producer,
        }
    }

    pub fn account_id(&self) -> Uuid {
        self.account_id
    }

    pub fn account_name(&self) -> &str {
        &self.account_name
    }

    pub fn account_type(&self) -> &str {
        &self.account_type
    }

    pub fn replay_id(&self) -> &str {
        &self.replay_id
    }

    pub fn billing_address(&self) -> Option<&BillingAddress> {
        self.billing_address.as_ref()
    }

    pub fn delivery_address(&self) -> Option<&DeliveryAddress> {
        self.delivery_address.as_ref()
    }

    pub fn billing_info(&self) -> Option<&BillingInfo> {
        self.billing_info.as_ref()
    }

    pub fn primary_contact(&self) -> Option<&ContactPerson> {
        self.primary_contact.as_ref()
    }

    pub fn event_type(&self) -> AccountEventType {
        self.event_type
    }

    pub fn changed_blocks(&self) -> &BTreeSet<AccountChangedBlock> {
        &self.changed_blocks
    }

    pub fn last_modified_utc(&self) -> DateTime<Utc> {
        self.last_modified_utc
    }

    pub fn correlation_id(&self) -> &str {
        &self.correlation_id
    }

    pub fn trace_id(&self) -> &str {
        &self.trace_id
    }

    pub fn source_system(&self) -> &str {
        &self.source_system
    }

    pub fn event_producer(&self) -> &str {
        &self.event_producer
    }
}
