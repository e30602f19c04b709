use std::collections::BTreeSet;

use crate::common::events::{AccountChangedBlock, AccountEventType};

const EVENT_TYPES: &[(&str, AccountEventType)] = &[
    ("created", AccountEventType::Created),
    ("updated", AccountEventType::Updated),
    ("deleted", AccountEventType::Deleted),
];

pub(crate) const FIELD_PREFIXES: &[(&str, AccountChangedBlock)] = &[
    ("BillingAddress.", AccountChangedBlock::BillingAddress),
    ("DeliveryAddress.", AccountChangedBlock::DeliveryAddress),
    ("BillingInfo.", AccountChangedBlock::BillingInfo),
    ("PrimaryContact.", AccountChangedBlock::PrimaryContact),
];

/// Case-insensitive exact lookup of the feed's event type vocabulary.
pub fn normalize_event_type(raw: &str) -> Option<AccountEventType> {
    EVENT_TYPES
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(raw))
        .map(|(_, event_type)| *event_type)
}

/// Maps a dot-qualified field path such as `BillingAddress.Street` to the
/// block it belongs to.
pub fn classify_field(field: &str) -> Option<AccountChangedBlock> {
    FIELD_PREFIXES
        .iter()
        .find(|(prefix, _)| starts_with_ignore_case(field, prefix))
        .map(|(_, block)| *block)
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct Classification<'a> {
    pub blocks: BTreeSet<AccountChangedBlock>,
    pub unmatched: Vec<&'a str>,
}

pub fn classify_fields<'a, I>(fields: I) -> Classification<'a>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut classification = Classification::default();
    for field in fields {
        match classify_field(field) {
            Some(block) => {
                classification.blocks.insert(block);
            }
            None => classification.unmatched.push(field),
        }
    }
    classification
}

fn starts_with_ignore_case(value: &str, prefix: &str) -> bool {
    value.len() >= prefix.len()
        && value.as_bytes()[..prefix.len()].eq_ignore_ascii_case(prefix.as_bytes())
}
