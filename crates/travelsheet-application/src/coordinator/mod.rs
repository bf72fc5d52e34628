//! Optimistic mutation coordinator.
//!
//! Owns the normalized snapshot. Every mutation is applied to the snapshot
//! first, then persisted; a successful write is followed by a full refetch
//! and a failed one restores the record's previous value.
//!
//! Rapid wish edits (done flags, checklist ticks) are coalesced: each edit
//! joins a pending set and restarts a single debounce timer. When the timer
//! fires the set is taken in one step and persisted sequentially. While a
//! batch is pending or in flight, full refreshes are deferred until it clears
//! so stale remote data never overwrites unsent edits.

mod debounce;
mod state;

pub use debounce::Debouncer;
pub use state::{RecordKey, SyncState};

use crate::notice::{Notice, NoticeSender};
use crate::session::SessionContext;
use state::SyncStates;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::sync::{Mutex, RwLock};
use travelsheet_core::TravelError;
use travelsheet_core::api::{SheetApi, WriteRequest};
use travelsheet_core::cache::SnapshotCache;
use travelsheet_core::checklist::toggle_checklist_line;
use travelsheet_core::error::Result;
use travelsheet_core::model::{ItineraryRow, Record, Settings, SheetKind, Snapshot, WishItem};
use travelsheet_core::view::{self, ExpenseLedger};
use uuid::Uuid;

/// Prefix of the local id given to records added but not yet stored.
pub const PROVISIONAL_ID_PREFIX: &str = "local-";

/// Result of a refresh request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// The snapshot was replaced with fresh remote data.
    Applied,
    /// A wish batch is pending or in flight; the refresh runs once it clears.
    Deferred,
}

#[derive(Debug, Default)]
struct PendingBatch {
    /// Insertion-ordered, deduplicated.
    ids: Vec<String>,
    /// Value of each wish before the first edit of this batch.
    baselines: HashMap<String, WishItem>,
}

impl PendingBatch {
    fn add(&mut self, id: String, baseline: WishItem) {
        if !self.ids.contains(&id) {
            self.ids.push(id.clone());
        }
        self.baselines.entry(id).or_insert(baseline);
    }

    fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

struct CoordinatorInner {
    api: Arc<dyn SheetApi>,
    cache: Option<Arc<dyn SnapshotCache>>,
    session: Arc<SessionContext>,
    notices: NoticeSender,
    snapshot: RwLock<Snapshot>,
    states: Mutex<SyncStates>,
    batch: Mutex<PendingBatch>,
    /// Serializes batch flushes.
    flush_lock: Mutex<()>,
    in_flight: AtomicUsize,
    refresh_deferred: AtomicBool,
    debouncer: Debouncer,
}

impl CoordinatorInner {
    async fn set_state(&self, key: RecordKey, state: SyncState) {
        self.states.lock().await.set(key, state);
    }

    async fn batch_busy(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst) > 0 || !self.batch.lock().await.is_empty()
    }

    async fn refresh(&self) -> Result<RefreshOutcome> {
        if self.batch_busy().await {
            self.refresh_deferred.store(true, Ordering::SeqCst);
            tracing::debug!("[Coordinator] Refresh deferred until the wish batch clears");
            return Ok(RefreshOutcome::Deferred);
        }

        let key = self.session.key().await;
        let raw = match self.api.fetch_all(key.as_deref()).await {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!("[Coordinator] Fetch failed: {}", e);
                self.notices.report_failure(&self.session, &e).await;
                return Err(e);
            }
        };

        {
            // Staging holds the snapshot lock while joining the batch, so this
            // check cannot race an edit that is about to be queued.
            let mut snapshot = self.snapshot.write().await;
            if self.batch_busy().await {
                self.refresh_deferred.store(true, Ordering::SeqCst);
                tracing::debug!("[Coordinator] Discarding fetch that raced a wish edit");
                return Ok(RefreshOutcome::Deferred);
            }
            *snapshot = Snapshot::from_raw(&raw);
        }

        if let Some(cache) = &self.cache {
            if let Err(e) = cache.store(self.session.trip_id(), &raw).await {
                tracing::warn!("[Coordinator] Failed to update cache: {}", e);
            }
        }

        tracing::info!("[Coordinator] Snapshot refreshed");
        Ok(RefreshOutcome::Applied)
    }

    /// Refetch after a successful write. Failures were already reported.
    async fn refresh_after_write(&self) {
        if let Err(e) = self.refresh().await {
            tracing::debug!("[Coordinator] Post-write refresh failed: {}", e);
        }
    }

    /// Reverts a wish whose write failed.
    ///
    /// When the wish was edited again while the write was in flight, the newer
    /// edit stays in place and goes out with the next batch; it inherits the
    /// older baseline so a second failure reverts to the last stored value.
    async fn rollback_wish(&self, id: &str, baseline: Option<WishItem>) {
        {
            let mut snapshot = self.snapshot.write().await;
            let mut batch = self.batch.lock().await;
            if batch.ids.iter().any(|pending| pending == id) {
                if let Some(baseline) = baseline {
                    batch.baselines.insert(id.to_string(), baseline);
                }
                tracing::debug!(
                    "[Coordinator] Wish '{}' has a newer edit queued, keeping it",
                    id
                );
                return;
            }
            drop(batch);
            if let Some(baseline) = baseline {
                snapshot.put(Record::Wish(baseline));
            }
        }
        self.set_state(RecordKey::new(SheetKind::Wishes, id), SyncState::RolledBack)
            .await;
    }

    async fn flush_batch(&self) {
        let _serial = self.flush_lock.lock().await;

        let PendingBatch { ids, mut baselines } = {
            let mut batch = self.batch.lock().await;
            self.in_flight.fetch_add(1, Ordering::SeqCst);
            std::mem::take(&mut *batch)
        };

        if !ids.is_empty() {
            tracing::info!("[Coordinator] Persisting {} wish edit(s)", ids.len());
        }

        let key = self.session.key().await;
        let mut remaining = ids.into_iter();
        while let Some(id) = remaining.next() {
            let record_key = RecordKey::new(SheetKind::Wishes, id.clone());
            let current = self.snapshot.read().await.find_wish(&id).cloned();
            let Some(wish) = current else {
                tracing::debug!("[Coordinator] Wish '{}' vanished before sync, skipping", id);
                baselines.remove(&id);
                self.states.lock().await.forget(&record_key);
                continue;
            };

            self.set_state(record_key.clone(), SyncState::InFlight).await;
            let request = WriteRequest::upsert(&Record::Wish(wish), key.as_deref());
            match self.api.post(&request).await {
                Ok(_) => {
                    let requeued = self.batch.lock().await.ids.contains(&id);
                    if !requeued {
                        self.set_state(record_key, SyncState::Clean).await;
                    }
                }
                Err(e) => {
                    tracing::warn!("[Coordinator] Wish '{}' failed to sync: {}", id, e);
                    self.rollback_wish(&id, baselines.remove(&id)).await;
                    self.notices.report_failure(&self.session, &e).await;

                    if e.is_authorization() {
                        for rest in remaining.by_ref() {
                            self.rollback_wish(&rest, baselines.remove(&rest)).await;
                        }
                        break;
                    }
                }
            }
        }

        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if !self.batch_busy().await && self.refresh_deferred.swap(false, Ordering::SeqCst) {
            tracing::debug!("[Coordinator] Running deferred refresh");
            self.refresh_after_write().await;
        }
    }
}

/// Applies mutations optimistically and reconciles them with the backend.
///
/// Cheap to clone; clones share the same snapshot and batch.
#[derive(Clone)]
pub struct MutationCoordinator {
    inner: Arc<CoordinatorInner>,
}

impl MutationCoordinator {
    /// Creates a coordinator with an empty snapshot.
    ///
    /// Returns the receiving end of the notice channel alongside it.
    pub fn new(
        api: Arc<dyn SheetApi>,
        cache: Option<Arc<dyn SnapshotCache>>,
        session: Arc<SessionContext>,
        debounce: Duration,
    ) -> (Self, UnboundedReceiver<Notice>) {
        let (notices, rx) = NoticeSender::channel();
        let inner = CoordinatorInner {
            api,
            cache,
            session,
            notices,
            snapshot: RwLock::new(Snapshot::default()),
            states: Mutex::new(SyncStates::default()),
            batch: Mutex::new(PendingBatch::default()),
            flush_lock: Mutex::new(()),
            in_flight: AtomicUsize::new(0),
            refresh_deferred: AtomicBool::new(false),
            debouncer: Debouncer::new(debounce),
        };
        (
            Self {
                inner: Arc::new(inner),
            },
            rx,
        )
    }

    pub fn session(&self) -> &Arc<SessionContext> {
        &self.inner.session
    }

    /// A sender for collaborators that report into the same notice stream.
    pub fn notices(&self) -> NoticeSender {
        self.inner.notices.clone()
    }

    /// Loads the cached snapshot, if any, then fetches fresh data.
    ///
    /// A fetch failure leaves the cached snapshot in place.
    pub async fn init(&self) -> Result<RefreshOutcome> {
        if let Some(cache) = &self.inner.cache {
            match cache.load(self.inner.session.trip_id()).await {
                Ok(Some(raw)) => {
                    *self.inner.snapshot.write().await = Snapshot::from_raw(&raw);
                    tracing::info!("[Coordinator] Loaded cached snapshot");
                }
                Ok(None) => tracing::debug!("[Coordinator] No cached snapshot"),
                Err(e) => tracing::warn!("[Coordinator] Cache unreadable: {}", e),
            }
        }
        self.refresh().await
    }

    /// Cancels the pending debounce timer. Unsent wish edits are abandoned.
    pub async fn shutdown(&self) {
        if self.inner.debouncer.cancel() {
            let abandoned = self.inner.batch.lock().await.ids.len();
            tracing::warn!("[Coordinator] Shutdown abandoned {} pending wish edit(s)", abandoned);
        }
    }

    /// A copy of the current snapshot.
    pub async fn snapshot(&self) -> Snapshot {
        self.inner.snapshot.read().await.clone()
    }

    pub async fn sync_state(&self, sheet: SheetKind, id: &str) -> SyncState {
        self.inner
            .states
            .lock()
            .await
            .get(&RecordKey::new(sheet, id))
    }

    /// Whether wish edits are waiting for, or undergoing, persistence.
    pub async fn has_pending_sync(&self) -> bool {
        self.inner.batch_busy().await
    }

    /// Fetches the full dataset and replaces the snapshot.
    pub async fn refresh(&self) -> Result<RefreshOutcome> {
        self.inner.refresh().await
    }

    /// Inserts or updates a record.
    ///
    /// Records without an id are added under a provisional local id until the
    /// post-write refetch brings in the stored row. Expenses get their home
    /// currency amount computed here from the current rate table.
    pub async fn upsert(&self, mut record: Record) -> Result<()> {
        if let Record::Expense(expense) = &mut record {
            let rates = self.inner.snapshot.read().await.settings.rates.clone();
            expense.twd = expense.compute_twd(&rates);
        }

        let sheet = record.sheet();
        let is_new = record.id().is_none();
        let local_id = match record.id() {
            Some(id) => id.to_string(),
            None => format!("{}{}", PROVISIONAL_ID_PREFIX, Uuid::new_v4()),
        };
        let state_key = RecordKey::new(sheet, local_id.clone());

        let prior = {
            let mut snapshot = self.inner.snapshot.write().await;
            let prior = snapshot.find(sheet, &local_id);
            let mut local = record.clone();
            local.set_id(Some(local_id.clone()));
            snapshot.put(local);
            prior
        };
        self.inner
            .set_state(state_key.clone(), SyncState::PendingLocal)
            .await;

        let key = self.inner.session.key().await;
        let request = WriteRequest::upsert(&record, key.as_deref());
        self.inner
            .set_state(state_key.clone(), SyncState::InFlight)
            .await;

        match self.inner.api.post(&request).await {
            Ok(_) => {
                if is_new {
                    self.inner.states.lock().await.forget(&state_key);
                } else {
                    self.inner.set_state(state_key, SyncState::Clean).await;
                }
                tracing::info!("[Coordinator] {} record saved", sheet);
                self.inner
                    .notices
                    .success(if is_new { "Saved" } else { "Updated" });
                self.inner.refresh_after_write().await;
                Ok(())
            }
            Err(e) => {
                {
                    let mut snapshot = self.inner.snapshot.write().await;
                    match prior {
                        Some(prior) => snapshot.put(prior),
                        None => {
                            snapshot.remove(sheet, &local_id);
                        }
                    }
                }
                self.inner
                    .set_state(state_key, SyncState::RolledBack)
                    .await;
                tracing::warn!("[Coordinator] {} save rolled back: {}", sheet, e);
                self.inner.notices.report_failure(&self.inner.session, &e).await;
                Err(e)
            }
        }
    }

    /// Deletes a record. Does nothing unless the user `confirmed` it.
    pub async fn remove(&self, sheet: SheetKind, id: &str, confirmed: bool) -> Result<()> {
        if !confirmed {
            tracing::debug!("[Coordinator] Delete of {} '{}' not confirmed", sheet, id);
            return Ok(());
        }

        let removed = self.inner.snapshot.write().await.remove(sheet, id);
        let state_key = RecordKey::new(sheet, id);
        self.inner
            .set_state(state_key.clone(), SyncState::InFlight)
            .await;

        let key = self.inner.session.key().await;
        let request = WriteRequest::delete(sheet, id, key.as_deref());
        match self.inner.api.post(&request).await {
            Ok(_) => {
                self.inner.states.lock().await.forget(&state_key);
                tracing::info!("[Coordinator] {} '{}' deleted", sheet, id);
                self.inner.notices.success("Deleted");
                self.inner.refresh_after_write().await;
                Ok(())
            }
            Err(e) => {
                if let Some((index, record)) = removed {
                    self.inner.snapshot.write().await.restore_at(index, record);
                }
                self.inner
                    .set_state(state_key, SyncState::RolledBack)
                    .await;
                self.inner.notices.report_failure(&self.inner.session, &e).await;
                Err(e)
            }
        }
    }

    /// Applies `mutator` to a copy of the record and upserts the copy.
    pub async fn toggle_field<F>(&self, sheet: SheetKind, id: &str, mutator: F) -> Result<()>
    where
        F: FnOnce(&mut Record) + Send,
    {
        self.require_privilege().await?;
        let mut record = self
            .inner
            .snapshot
            .read()
            .await
            .find(sheet, id)
            .ok_or_else(|| TravelError::not_found(sheet.as_str(), id))?;
        mutator(&mut record);
        self.upsert(record).await
    }

    /// Applies `mutator` to a wish locally and queues it for the next batch.
    pub async fn stage_wish_mutation<F>(&self, id: &str, mutator: F) -> Result<()>
    where
        F: FnOnce(&mut WishItem) + Send,
    {
        self.require_privilege().await?;

        {
            let mut snapshot = self.inner.snapshot.write().await;
            let current = snapshot
                .find_wish(id)
                .cloned()
                .ok_or_else(|| TravelError::not_found("wish", id))?;
            let mut updated = current.clone();
            mutator(&mut updated);
            snapshot.put(Record::Wish(updated));
            self.inner.batch.lock().await.add(id.to_string(), current);
        }

        self.inner
            .set_state(RecordKey::new(SheetKind::Wishes, id), SyncState::PendingLocal)
            .await;

        let inner = Arc::clone(&self.inner);
        self.inner
            .debouncer
            .schedule(move || async move { inner.flush_batch().await });
        Ok(())
    }

    pub async fn toggle_wish_done(&self, id: &str) -> Result<()> {
        self.stage_wish_mutation(id, |wish| wish.is_done = !wish.is_done)
            .await
    }

    /// Ticks or unticks the checklist marker on `line_index` of a wish.
    pub async fn toggle_checklist_item(&self, id: &str, line_index: usize) -> Result<()> {
        self.require_privilege().await?;
        let content = self
            .inner
            .snapshot
            .read()
            .await
            .find_wish(id)
            .map(|wish| wish.content.clone())
            .ok_or_else(|| TravelError::not_found("wish", id))?;
        if toggle_checklist_line(&content, line_index).is_none() {
            return Err(TravelError::not_found(
                "checklist line",
                format!("{}:{}", id, line_index),
            ));
        }

        self.stage_wish_mutation(id, move |wish| {
            if let Some(updated) = toggle_checklist_line(&wish.content, line_index) {
                wish.content = updated;
            }
        })
        .await
    }

    /// Cancels the debounce timer and persists pending wish edits now.
    pub async fn flush_now(&self) {
        self.inner.debouncer.cancel();
        self.inner.flush_batch().await;
    }

    pub async fn save_settings(&self, settings: Settings) -> Result<()> {
        let prior = {
            let mut snapshot = self.inner.snapshot.write().await;
            std::mem::replace(&mut snapshot.settings, settings.clone())
        };

        let key = self.inner.session.key().await;
        let request = WriteRequest::update_settings(&settings, key.as_deref());
        match self.inner.api.post(&request).await {
            Ok(_) => {
                self.inner.notices.success("Settings saved");
                self.inner.refresh_after_write().await;
                Ok(())
            }
            Err(e) => {
                self.inner.snapshot.write().await.settings = prior;
                self.inner.notices.report_failure(&self.inner.session, &e).await;
                Err(e)
            }
        }
    }

    pub async fn itinerary_view(&self, date_filter: Option<&str>) -> Vec<ItineraryRow> {
        view::compute_itinerary_view(&self.inner.snapshot.read().await.itinerary, date_filter)
    }

    pub async fn expense_view(&self, payer_filter: &str, debtor_filter: &str) -> ExpenseLedger {
        view::compute_expense_view(
            &self.inner.snapshot.read().await.expenses,
            payer_filter,
            debtor_filter,
        )
    }

    pub async fn wish_view(&self, tag_filters: &[String], search_query: &str) -> Vec<WishItem> {
        view::compute_wish_view(&self.inner.snapshot.read().await.wishes, tag_filters, search_query)
    }

    pub async fn available_dates(&self) -> Vec<String> {
        view::available_dates(&self.inner.snapshot.read().await.itinerary)
    }

    async fn require_privilege(&self) -> Result<()> {
        if self.inner.session.is_privileged().await {
            return Ok(());
        }
        let err = TravelError::Unauthorized("permission insufficient".to_string());
        self.inner.notices.send(Notice::for_error(&err));
        Err(err)
    }
}
