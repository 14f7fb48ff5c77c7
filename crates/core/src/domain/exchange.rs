use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::listing::{Listing, ListingId};
use crate::errors::DomainError;

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ExchangeId(pub String);

impl ExchangeId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExchangeStatus {
    Pending,
    Accepted,
    Rejected,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ExchangeRequest {
    pub id: ExchangeId,
    pub sender_id: String,
    pub receiver_id: String,
    pub listing_id: ListingId,
    pub listing_title: String,
    pub status: ExchangeStatus,
    pub message: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl ExchangeRequest {
    /// Opens a pending request from `sender_id` for someone else's listing.
    pub fn open(
        sender_id: impl Into<String>,
        listing: &Listing,
        message: Option<String>,
    ) -> Result<Self, DomainError> {
        let sender_id = sender_id.into();
        if sender_id.trim().is_empty() {
            return Err(DomainError::InvalidArgument("sender id must not be empty".to_owned()));
        }
        if listing.owner_id.trim().is_empty() {
            return Err(DomainError::InvariantViolation(format!(
                "listing `{}` has no owner to receive the request",
                listing.id
            )));
        }
        if listing.owner_id == sender_id {
            return Err(DomainError::InvariantViolation(format!(
                "user `{sender_id}` cannot request their own listing `{}`",
                listing.id
            )));
        }

        Ok(Self {
            id: ExchangeId::generate(),
            sender_id,
            receiver_id: listing.owner_id.clone(),
            listing_id: listing.id.clone(),
            listing_title: listing.title.clone(),
            status: ExchangeStatus::Pending,
            message: message.filter(|text| !text.trim().is_empty()),
            created_at: Utc::now(),
            updated_at: None,
        })
    }

    pub fn can_transition_to(&self, next: ExchangeStatus) -> bool {
        matches!(
            (self.status, next),
            (ExchangeStatus::Pending, ExchangeStatus::Accepted)
                | (ExchangeStatus::Pending, ExchangeStatus::Rejected)
        )
    }

    /// Records the owner's answer. Only the receiver may respond, and only once.
    pub fn respond(&mut self, actor_id: &str, next: ExchangeStatus) -> Result<(), DomainError> {
        if actor_id != self.receiver_id {
            return Err(DomainError::InvariantViolation(format!(
                "only the listing owner can respond to exchange `{}`",
                self.id.0
            )));
        }
        if !self.can_transition_to(next) {
            return Err(DomainError::InvalidExchangeTransition { from: self.status, to: next });
        }

        self.status = next;
        self.updated_at = Some(Utc::now());
        Ok(())
    }
}

/// Snapshot of exchange requests with the per-user views the dashboard needs.
#[derive(Clone, Debug, Default)]
pub struct ExchangeLedger {
    requests: Vec<ExchangeRequest>,
}

impl ExchangeLedger {
    pub fn new(requests: Vec<ExchangeRequest>) -> Self {
        Self { requests }
    }

    pub fn record(&mut self, request: ExchangeRequest) {
        self.requests.push(request);
    }

    pub fn get_mut(&mut self, id: &ExchangeId) -> Option<&mut ExchangeRequest> {
        self.requests.iter_mut().find(|request| &request.id == id)
    }

    pub fn sent_by(&self, user_id: &str) -> Vec<&ExchangeRequest> {
        self.newest_first(|request| request.sender_id == user_id)
    }

    pub fn received_by(&self, user_id: &str) -> Vec<&ExchangeRequest> {
        self.newest_first(|request| request.receiver_id == user_id)
    }

    pub fn for_listing(&self, listing_id: &ListingId) -> Vec<&ExchangeRequest> {
        self.newest_first(|request| &request.listing_id == listing_id)
    }

    pub fn pending_count(&self, user_id: &str) -> usize {
        self.requests
            .iter()
            .filter(|request| {
                request.receiver_id == user_id && request.status == ExchangeStatus::Pending
            })
            .count()
    }

    fn newest_first(&self, keep: impl Fn(&ExchangeRequest) -> bool) -> Vec<&ExchangeRequest> {
        let mut matches: Vec<&ExchangeRequest> =
            self.requests.iter().filter(|request| keep(request)).collect();
        matches.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        matches
    }
}
