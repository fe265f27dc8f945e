use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::bin::Bin;
use crate::models::deposit::Transaction;
use crate::models::event::BinEvent;
use crate::models::policy::ScoringPolicy;
use crate::models::product::{Product, Redemption};
use crate::models::profile::Profile;
use crate::models::quiz::{Quiz, QuizCompletion};
use crate::models::station::Station;
use crate::observability::metrics::Metrics;

pub struct AppState {
    pub stations: DashMap<Uuid, Station>,
    pub bins: DashMap<Uuid, Bin>,
    pub profiles: DashMap<Uuid, Profile>,
    /// Lower-cased email to profile id; the single point where emails are claimed.
    pub emails: DashMap<String, Uuid>,
    pub transactions: DashMap<Uuid, Transaction>,
    pub products: DashMap<Uuid, Product>,
    pub redemptions: DashMap<Uuid, Redemption>,
    pub quizzes: DashMap<Uuid, Quiz>,
    /// Keyed by `(user_id, quiz_id)`.
    pub quiz_completions: DashMap<(Uuid, Uuid), QuizCompletion>,
    pub bin_events_tx: broadcast::Sender<BinEvent>,
    pub policy: ScoringPolicy,
    pub max_capacity_kg: f64,
    pub metrics: Metrics,
}

impl AppState {
    pub fn new(policy: ScoringPolicy, max_capacity_kg: f64, event_buffer_size: usize) -> Self {
        let (bin_events_tx, _unused_rx) = broadcast::channel(event_buffer_size);

        Self {
            stations: DashMap::new(),
            bins: DashMap::new(),
            profiles: DashMap::new(),
            emails: DashMap::new(),
            transactions: DashMap::new(),
            products: DashMap::new(),
            redemptions: DashMap::new(),
            quizzes: DashMap::new(),
            quiz_completions: DashMap::new(),
            bin_events_tx,
            policy,
            max_capacity_kg,
            metrics: Metrics::new(),
        }
    }

    pub fn find_bin_by_qr(&self, qr_code: &str) -> Option<Bin> {
        self.bins
            .iter()
            .find(|entry| entry.value().qr_code == qr_code)
            .map(|entry| entry.value().clone())
    }

    /// Reserves `email` for `profile_id`, failing if another profile holds it.
    pub fn claim_email(&self, email: &str, profile_id: Uuid) -> Result<(), AppError> {
        match self.emails.entry(email.to_string()) {
            Entry::Occupied(_) => Err(AppError::Conflict(format!(
                "email {email} already registered"
            ))),
            Entry::Vacant(slot) => {
                slot.insert(profile_id);
                Ok(())
            }
        }
    }

    pub fn publish(&self, event: BinEvent) {
        // No subscribers is not an error.
        let _ = self.bin_events_tx.send(event);
    }
}
