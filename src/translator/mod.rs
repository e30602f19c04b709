//! CDC account payload → [`InternalAccountEvent`].
//!
//! Steps, each one short-circuiting:
//! - parse: guard limits, then JSON into [`RawChangeEvent`]
//! - identity: `AccountId` must be a UUID
//! - classification: changed field paths → changed blocks
//! - normalization: free-text event type → [`AccountEventType`]
//! - gate: no block or no event type means nothing actionable
//! - construction: copy the validated values and the operation context
//!
//! A failed step is logged, counted and returned as a [`RejectionReason`];
//! nothing is retried here.

pub mod raw;
pub mod vocabulary;

use std::collections::BTreeSet;
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

use crate::common::events::{
    AccountChangedBlock, AccountEventParts, AccountEventType, InternalAccountEvent,
};
use crate::common::json_guard::JsonLimits;
use crate::common::rejection::RejectionReason;
use crate::observability::{OperationContext, RejectionStats, StructuredLogger, Tracer};

pub use raw::{ParseError, RawChangeEvent};
pub use vocabulary::{classify_field, classify_fields, normalize_event_type, Classification};

const SOURCE: &str = "AccountTranslator";
const OPERATION: &str = "translate";

/// Value written to `EventProducer` on every translated event.
pub const EVENT_PRODUCER: &str = "AccountTranslator.translate";

const MAX_LOGGED_PAYLOAD_BYTES: usize = 512;

#[derive(Debug, Error, PartialEq, Eq)]
enum ConstructionError {
    #[error("operation context has no correlation id")]
    MissingCorrelationId,
    #[error("operation context has no trace id")]
    MissingTraceId,
    #[error("payload has no LastModifiedDate")]
    MissingLastModified,
}

pub struct Translator {
    logger: Arc<dyn StructuredLogger>,
    tracer: Arc<dyn Tracer>,
    stats: Arc<RejectionStats>,
    limits: JsonLimits,
}

impl Translator {
    pub fn new(
        logger: Arc<dyn StructuredLogger>,
        tracer: Arc<dyn Tracer>,
        stats: Arc<RejectionStats>,
        limits: JsonLimits,
    ) -> Self {
        Self {
            logger,
            tracer,
            stats,
            limits,
        }
    }

    pub fn translate(
        &self,
        ctx: &OperationContext,
        payload: &[u8],
    ) -> Result<InternalAccountEvent, RejectionReason> {
        let span = self.tracer.start_span(EVENT_PRODUCER);
        span.record("correlation_id", ctx.correlation_id());
        span.record("trace_id", ctx.trace_id());
        let _entered = span.enter();

        let raw = match raw::parse(payload, self.limits) {
            Ok(raw) => raw,
            Err(err) => {
                let message = format!(
                    "Failed to parse payload: {}",
                    payload_fragment(payload)
                );
                return Err(self.reject(RejectionReason::MalformedPayload, &message, Some(&err)));
            }
        };

        let account_id = match Uuid::parse_str(raw.account_id.trim()) {
            Ok(id) => id,
            Err(err) => {
                let message = format!("Invalid AccountId: '{}'", raw.account_id);
                return Err(self.reject(RejectionReason::InvalidAccountId, &message, Some(&err)));
            }
        };

        let classification = classify_fields(raw.changed_fields.iter().map(String::as_str));
        for field in &classification.unmatched {
            self.logger.warn(
                SOURCE,
                OPERATION,
                &format!("Unsupported changed field '{}' for AccountId={}", field, account_id),
            );
        }

        let event_type = normalize_event_type(&raw.event_type);
        if event_type.is_none() {
            self.logger.warn(
                SOURCE,
                OPERATION,
                &format!(
                    "Unsupported event type '{}' for AccountId={}",
                    raw.event_type, account_id
                ),
            );
        }

        let event_type = match event_type {
            Some(event_type) if !classification.blocks.is_empty() => event_type,
            _ => {
                let message = format!(
                    "Nothing mappable for AccountId={}: event type '{}', {} changed field(s), {} recognized block(s)",
                    account_id,
                    raw.event_type,
                    raw.changed_fields.len(),
                    classification.blocks.len()
                );
                return Err(self.reject(RejectionReason::UnmappableFields, &message, None));
            }
        };

        match build_event(ctx, account_id, event_type, classification.blocks, raw) {
            Ok(event) => {
                tracing::debug!(
                    "[{}] AccountId={} translated as {} {:?}",
                    SOURCE,
                    event.account_id(),
                    event.event_type(),
                    event.changed_blocks()
                );
                Ok(event)
            }
            Err(err) => {
                let message = format!(
                    "Error while building event for AccountId={}",
                    account_id
                );
                Err(self.reject(RejectionReason::ConstructionFailed, &message, Some(&err)))
            }
        }
    }

    fn reject(
        &self,
        reason: RejectionReason,
        message: &str,
        error: Option<&(dyn std::error::Error + 'static)>,
    ) -> RejectionReason {
        let count = self.stats.record(reason);
        self.logger.error(
            SOURCE,
            OPERATION,
            &format!("{} (#{}): {}", reason, count, message),
            error,
        );
        reason
    }
}

fn build_event(
    ctx: &OperationContext,
    account_id: Uuid,
    event_type: AccountEventType,
    blocks: BTreeSet<AccountChangedBlock>,
    raw: RawChangeEvent,
) -> Result<InternalAccountEvent, ConstructionError> {
    let correlation_id = ctx
        .correlation_id()
        .ok_or(ConstructionError::MissingCorrelationId)?;
    let trace_id = ctx.trace_id().ok_or(ConstructionError::MissingTraceId)?;
    let last_modified_utc = raw
        .last_modified_date
        .ok_or(ConstructionError::MissingLastModified)?;

    // sections ride along only when their block actually changed
    let has = |block: AccountChangedBlock| blocks.contains(&block);
    let billing_address = raw
        .billing_address
        .filter(|_| has(AccountChangedBlock::BillingAddress));
    let delivery_address = raw
        .delivery_address
        .filter(|_| has(AccountChangedBlock::DeliveryAddress));
    let billing_info = raw
        .billing_info
        .filter(|_| has(AccountChangedBlock::BillingInfo));
    let primary_contact = raw
        .primary_contact
        .filter(|_| has(AccountChangedBlock::PrimaryContact));

    Ok(InternalAccountEvent::new(AccountEventParts {
        account_id,
        account_name: raw.account_name,
        account_type: raw.account_type,
        replay_id: raw.replay_id,
        billing_address,
        delivery_address,
        billing_info,
        primary_contact,
        event_type,
        changed_blocks: blocks,
        last_modified_utc,
        correlation_id: correlation_id.to_string(),
        trace_id: trace_id.to_string(),
        event_producer: EVENT_PRODUCER.to_string(),
    }))
}

fn payload_fragment(payload: &[u8]) -> String {
    let end = payload.len().min(MAX_LOGGED_PAYLOAD_BYTES);
    let mut fragment = String::from_utf8_lossy(&payload[..end]).into_owned();
    if payload.len() > end {
        fragment.push_str("...");
    }
    fragment
}
