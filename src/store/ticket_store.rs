// src/store/ticket_store.rs
use std::sync::Arc;

use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{
    db::storage::KeyValueStorage,
    dtos::ticketdtos::TicketDraft,
    models::ticket::{Ticket, TicketStatus},
    store::error::{LoadOutcome, StoreError},
    utils::{ids::new_ticket_id, time::now_utc},
};

#[derive(Default)]
struct TicketState {
    tickets: Vec<Ticket>,
    is_loaded: bool,
}

/// The single authoritative ticket collection, resident in memory and backed
/// by one serialized entry in the key-value medium. Every mutation persists
/// the whole collection before committing it to memory, so a failed write
/// leaves the resident state untouched.
///
/// Ordering invariant: newest-created ticket first; reads and filters
/// preserve collection order verbatim.
pub struct TicketStore {
    storage: Arc<dyn KeyValueStorage>,
    key: String,
    state: RwLock<TicketState>,
}

impl std::fmt::Debug for TicketStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TicketStore")
            .field("key", &self.key)
            .finish()
    }
}

impl TicketStore {
    pub fn new(storage: Arc<dyn KeyValueStorage>, key: impl Into<String>) -> Self {
        Self {
            storage,
            key: key.into(),
            state: RwLock::new(TicketState::default()),
        }
    }

    /// Reads the persisted collection into memory. Absent or unreadable data
    /// defaults to an empty collection; the failure is logged, not surfaced,
    /// and the outcome value says which case occurred. Marks the store
    /// loaded either way.
    pub async fn load(&self) -> LoadOutcome {
        let mut state = self.state.write().await;
        let outcome = match self.storage.get(&self.key).await {
            Ok(Some(raw)) => match serde_json::from_str::<Vec<Ticket>>(&raw) {
                Ok(tickets) => {
                    let count = tickets.len();
                    state.tickets = tickets;
                    LoadOutcome::Loaded(count)
                }
                Err(err) => {
                    tracing::warn!("ticket collection failed to parse, starting empty: {err}");
                    state.tickets = Vec::new();
                    LoadOutcome::Recovered
                }
            },
            Ok(None) => {
                state.tickets = Vec::new();
                LoadOutcome::Empty
            }
            Err(err) => {
                tracing::warn!("ticket collection unreadable, starting empty: {err}");
                state.tickets = Vec::new();
                LoadOutcome::Recovered
            }
        };
        state.is_loaded = true;
        outcome
    }

    /// Re-reads storage and overwrites the resident collection,
    /// last-write-wins. Exposed as the pull-to-refresh affordance.
    pub async fn refresh(&self) -> LoadOutcome {
        self.load().await
    }

    /// Creates a ticket from a draft. The draft is taken as-is; field
    /// validation happens in the caller before this point. The new ticket
    /// starts `new` with identical created/updated timestamps and is
    /// prepended to the collection.
    pub async fn create(&self, draft: TicketDraft) -> Result<Ticket, StoreError> {
        let now = now_utc();
        let ticket = Ticket {
            id: new_ticket_id(),
            user_id: draft.user_id,
            user_name: draft.user_name,
            user_role: draft.user_role,
            block_type: draft.block_type,
            sub_block: draft.sub_block,
            work_type: draft.work_type,
            description: draft.description,
            floor_no: draft.floor_no,
            wing: draft.wing,
            status: TicketStatus::New,
            assigned_worker: None,
            resolved_photo: None,
            review: None,
            created_at: now,
            updated_at: now,
        };

        let mut state = self.state.write().await;
        let mut updated = Vec::with_capacity(state.tickets.len() + 1);
        updated.push(ticket.clone());
        updated.extend(state.tickets.iter().cloned());
        self.persist(&updated).await?;
        state.tickets = updated;

        tracing::info!(ticket_id = %ticket.id, "ticket created");
        Ok(ticket)
    }

    /// Assigns a worker and moves the ticket to `pending`. Allowed from
    /// `new`, or from `pending` to change the assigned worker; a closed
    /// ticket cannot be reopened this way.
    pub async fn assign_worker(
        &self,
        ticket_id: Uuid,
        worker: &str,
    ) -> Result<Ticket, StoreError> {
        self.mutate(ticket_id, TicketStatus::Pending, |ticket| {
            ticket.assigned_worker = Some(worker.to_string());
        })
        .await
    }

    /// Closes a `pending` ticket, recording the resolution photo reference
    /// and review. Closing a never-assigned ticket goes through
    /// [`set_status`] instead.
    ///
    /// [`set_status`]: TicketStore::set_status
    pub async fn close(
        &self,
        ticket_id: Uuid,
        photo: &str,
        review: &str,
    ) -> Result<Ticket, StoreError> {
        let mut state = self.state.write().await;
        let idx = Self::position(&state.tickets, ticket_id)?;
        let from = state.tickets[idx].status;
        if from != TicketStatus::Pending {
            return Err(StoreError::InvalidTransition {
                from,
                to: TicketStatus::Closed,
            });
        }

        let mut updated = state.tickets.clone();
        let entry = &mut updated[idx];
        entry.status = TicketStatus::Closed;
        entry.resolved_photo = Some(photo.to_string());
        entry.review = Some(review.to_string());
        entry.updated_at = now_utc();
        let ticket = entry.clone();

        self.persist(&updated).await?;
        state.tickets = updated;

        tracing::info!(ticket_id = %ticket.id, "ticket closed");
        Ok(ticket)
    }

    /// Generic status overwrite, used from the administrative detail view.
    /// This is the escape hatch around the assign/close paths: any strictly
    /// forward move is accepted, including `new` directly to `closed`.
    /// Backward and same-status moves are rejected.
    pub async fn set_status(
        &self,
        ticket_id: Uuid,
        status: TicketStatus,
    ) -> Result<Ticket, StoreError> {
        let mut state = self.state.write().await;
        let idx = Self::position(&state.tickets, ticket_id)?;
        let from = state.tickets[idx].status;
        if !from.can_advance_to(status) {
            return Err(StoreError::InvalidTransition { from, to: status });
        }

        let mut updated = state.tickets.clone();
        let entry = &mut updated[idx];
        entry.status = status;
        entry.updated_at = now_utc();
        let ticket = entry.clone();

        self.persist(&updated).await?;
        state.tickets = updated;

        tracing::info!(ticket_id = %ticket.id, status = ?status, "ticket status updated");
        Ok(ticket)
    }

    /// All tickets raised by `user_id`, newest first.
    pub async fn tickets_by_user(&self, user_id: &str) -> Vec<Ticket> {
        let state = self.state.read().await;
        state
            .tickets
            .iter()
            .filter(|t| t.user_id == user_id)
            .cloned()
            .collect()
    }

    /// All tickets currently in `status`, newest first.
    pub async fn tickets_by_status(&self, status: TicketStatus) -> Vec<Ticket> {
        let state = self.state.read().await;
        state
            .tickets
            .iter()
            .filter(|t| t.status == status)
            .cloned()
            .collect()
    }

    /// Snapshot of the whole collection, newest first.
    pub async fn tickets(&self) -> Vec<Ticket> {
        self.state.read().await.tickets.clone()
    }

    /// True once the startup load attempt (successful or not) has run.
    pub async fn is_loaded(&self) -> bool {
        self.state.read().await.is_loaded
    }

    async fn mutate(
        &self,
        ticket_id: Uuid,
        to: TicketStatus,
        apply: impl FnOnce(&mut Ticket),
    ) -> Result<Ticket, StoreError> {
        let mut state = self.state.write().await;
        let idx = Self::position(&state.tickets, ticket_id)?;
        let from = state.tickets[idx].status;
        // Same-status is allowed here so a pending ticket can be reassigned.
        if from != to && !from.can_advance_to(to) {
            return Err(StoreError::InvalidTransition { from, to });
        }

        let mut updated = state.tickets.clone();
        let entry = &mut updated[idx];
        apply(entry);
        entry.status = to;
        entry.updated_at = now_utc();
        let ticket = entry.clone();

        self.persist(&updated).await?;
        state.tickets = updated;

        tracing::info!(ticket_id = %ticket.id, status = ?to, "ticket updated");
        Ok(ticket)
    }

    fn position(tickets: &[Ticket], ticket_id: Uuid) -> Result<usize, StoreError> {
        tickets
            .iter()
            .position(|t| t.id == ticket_id)
            .ok_or(StoreError::TicketNotFound(ticket_id))
    }

    async fn persist(&self, tickets: &[Ticket]) -> Result<(), StoreError> {
        let blob = serde_json::to_string(tickets)?;
        self.storage.set(&self.key, &blob).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::storage::MemoryStorage;
    use crate::models::ticket::{BlockType, ReporterRole, SubBlock, WorkType};
    use async_trait::async_trait;
    use std::io;
    use std::time::Duration;

    const KEY: &str = "campusfix_tickets";

    fn store() -> (Arc<MemoryStorage>, TicketStore) {
        let storage = Arc::new(MemoryStorage::new());
        let store = TicketStore::new(storage.clone(), KEY);
        (storage, store)
    }

    fn fan_draft() -> TicketDraft {
        TicketDraft {
            user_id: "stu-7".to_string(),
            user_name: "Anil".to_string(),
            user_role: ReporterRole::Student,
            block_type: BlockType::Academic,
            sub_block: Some(SubBlock::Ab1),
            work_type: WorkType::Electrical,
            description: "fan not working".to_string(),
            floor_no: "2".to_string(),
            wing: "A".to_string(),
        }
    }

    fn hostel_draft(user_id: &str) -> TicketDraft {
        TicketDraft {
            user_id: user_id.to_string(),
            user_name: "Meera".to_string(),
            user_role: ReporterRole::Staff,
            block_type: BlockType::Hostel,
            sub_block: None,
            work_type: WorkType::Plumbing,
            description: "leaking tap".to_string(),
            floor_no: "1".to_string(),
            wing: "B".to_string(),
        }
    }

    #[tokio::test]
    async fn create_yields_new_ticket_with_equal_timestamps() {
        let (_, store) = store();
        let ticket = store.create(fan_draft()).await.unwrap();

        assert_eq!(ticket.status, TicketStatus::New);
        assert_eq!(ticket.created_at, ticket.updated_at);
        assert_eq!(ticket.assigned_worker, None);

        let other = store.create(hostel_draft("stf-3")).await.unwrap();
        assert_ne!(ticket.id, other.id);
    }

    #[tokio::test]
    async fn full_lifecycle_new_pending_closed() {
        let (_, store) = store();
        let ticket = store.create(fan_draft()).await.unwrap();
        assert_eq!(ticket.status, TicketStatus::New);

        tokio::time::sleep(Duration::from_millis(2)).await;
        let assigned = store
            .assign_worker(ticket.id, "Rajesh Kumar")
            .await
            .unwrap();
        assert_eq!(assigned.status, TicketStatus::Pending);
        assert_eq!(assigned.assigned_worker.as_deref(), Some("Rajesh Kumar"));
        assert!(assigned.updated_at > ticket.updated_at);
        assert_eq!(assigned.description, ticket.description);
        assert_eq!(assigned.created_at, ticket.created_at);

        tokio::time::sleep(Duration::from_millis(2)).await;
        let closed = store
            .close(ticket.id, "photo-ref-1", "Fixed the fan")
            .await
            .unwrap();
        assert_eq!(closed.status, TicketStatus::Closed);
        assert_eq!(closed.resolved_photo.as_deref(), Some("photo-ref-1"));
        assert_eq!(closed.review.as_deref(), Some("Fixed the fan"));
        assert!(closed.updated_at > assigned.updated_at);

        let by_closed = store.tickets_by_status(TicketStatus::Closed).await;
        assert!(by_closed.iter().any(|t| t.id == ticket.id));
        assert!(store.tickets_by_status(TicketStatus::New).await.is_empty());
        assert!(store
            .tickets_by_status(TicketStatus::Pending)
            .await
            .is_empty());
    }

    #[tokio::test]
    async fn newest_ticket_comes_first() {
        let (_, store) = store();
        let first = store.create(fan_draft()).await.unwrap();
        let second = store.create(hostel_draft("stf-3")).await.unwrap();
        let third = store.create(fan_draft()).await.unwrap();

        let ids: Vec<Uuid> = store.tickets().await.iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![third.id, second.id, first.id]);
    }

    #[tokio::test]
    async fn queries_return_exact_subsets_in_collection_order() {
        let (_, store) = store();
        let a = store.create(fan_draft()).await.unwrap();
        let b = store.create(hostel_draft("stf-3")).await.unwrap();
        let c = store.create(fan_draft()).await.unwrap();

        let mine = store.tickets_by_user("stu-7").await;
        assert_eq!(
            mine.iter().map(|t| t.id).collect::<Vec<_>>(),
            vec![c.id, a.id]
        );

        store.assign_worker(b.id, "Suresh").await.unwrap();
        let pending = store.tickets_by_status(TicketStatus::Pending).await;
        assert_eq!(pending.iter().map(|t| t.id).collect::<Vec<_>>(), vec![b.id]);
        let fresh = store.tickets_by_status(TicketStatus::New).await;
        assert_eq!(
            fresh.iter().map(|t| t.id).collect::<Vec<_>>(),
            vec![c.id, a.id]
        );
    }

    #[tokio::test]
    async fn unknown_id_errors_and_leaves_collection_unchanged() {
        let (_, store) = store();
        store.create(fan_draft()).await.unwrap();
        let before = store.tickets().await;

        let missing = Uuid::new_v4();
        assert!(matches!(
            store.assign_worker(missing, "Rajesh").await,
            Err(StoreError::TicketNotFound(id)) if id == missing
        ));
        assert!(matches!(
            store.close(missing, "p", "r").await,
            Err(StoreError::TicketNotFound(_))
        ));
        assert!(matches!(
            store.set_status(missing, TicketStatus::Closed).await,
            Err(StoreError::TicketNotFound(_))
        ));

        assert_eq!(store.tickets().await, before);
    }

    #[tokio::test]
    async fn close_requires_pending_status() {
        let (_, store) = store();
        let ticket = store.create(fan_draft()).await.unwrap();

        assert!(matches!(
            store.close(ticket.id, "p", "r").await,
            Err(StoreError::InvalidTransition {
                from: TicketStatus::New,
                to: TicketStatus::Closed,
            })
        ));
    }

    #[tokio::test]
    async fn closed_tickets_cannot_move_backward() {
        let (_, store) = store();
        let ticket = store.create(fan_draft()).await.unwrap();
        store.assign_worker(ticket.id, "Rajesh").await.unwrap();
        store.close(ticket.id, "p", "done").await.unwrap();

        assert!(store.assign_worker(ticket.id, "Suresh").await.is_err());
        assert!(store
            .set_status(ticket.id, TicketStatus::Pending)
            .await
            .is_err());
        assert!(store
            .set_status(ticket.id, TicketStatus::Closed)
            .await
            .is_err());
    }

    #[tokio::test]
    async fn reassignment_while_pending_overwrites_worker() {
        let (_, store) = store();
        let ticket = store.create(fan_draft()).await.unwrap();
        store.assign_worker(ticket.id, "Rajesh").await.unwrap();
        let reassigned = store.assign_worker(ticket.id, "Suresh").await.unwrap();

        assert_eq!(reassigned.status, TicketStatus::Pending);
        assert_eq!(reassigned.assigned_worker.as_deref(), Some("Suresh"));
    }

    #[tokio::test]
    async fn set_status_allows_direct_close_of_new_ticket() {
        let (_, store) = store();
        let ticket = store.create(fan_draft()).await.unwrap();

        let closed = store
            .set_status(ticket.id, TicketStatus::Closed)
            .await
            .unwrap();
        assert_eq!(closed.status, TicketStatus::Closed);
        // No resolution metadata through this path.
        assert_eq!(closed.resolved_photo, None);
        assert_eq!(closed.review, None);
    }

    #[tokio::test]
    async fn persisted_collection_reloads_deep_equal() {
        let (storage, store) = store();
        store.create(fan_draft()).await.unwrap();
        let ticket = store.create(hostel_draft("stf-3")).await.unwrap();
        store.assign_worker(ticket.id, "Rajesh").await.unwrap();
        let before = store.tickets().await;

        let reopened = TicketStore::new(storage, KEY);
        assert_eq!(reopened.load().await, LoadOutcome::Loaded(2));
        assert_eq!(reopened.tickets().await, before);
    }

    #[tokio::test]
    async fn load_with_no_entry_is_empty() {
        let (_, store) = store();
        assert!(!store.is_loaded().await);
        assert_eq!(store.load().await, LoadOutcome::Empty);
        assert!(store.is_loaded().await);
        assert!(store.tickets().await.is_empty());
    }

    #[tokio::test]
    async fn corrupt_entry_recovers_to_empty() {
        let (storage, store) = store();
        storage.set(KEY, "not valid json").await.unwrap();

        assert_eq!(store.load().await, LoadOutcome::Recovered);
        assert!(store.is_loaded().await);
        assert!(store.tickets().await.is_empty());
    }

    #[tokio::test]
    async fn refresh_overwrites_memory_from_storage() {
        let (storage, store) = store();
        let writer = TicketStore::new(storage.clone(), KEY);

        store.load().await;
        writer.create(fan_draft()).await.unwrap();
        assert!(store.tickets().await.is_empty());

        assert_eq!(store.refresh().await, LoadOutcome::Loaded(1));
        assert_eq!(store.tickets().await.len(), 1);
    }

    struct FailingStorage;

    #[async_trait]
    impl KeyValueStorage for FailingStorage {
        async fn get(&self, _key: &str) -> io::Result<Option<String>> {
            Ok(None)
        }

        async fn set(&self, _key: &str, _value: &str) -> io::Result<()> {
            Err(io::Error::new(io::ErrorKind::Other, "disk full"))
        }

        async fn remove(&self, _key: &str) -> io::Result<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn failed_write_leaves_memory_unchanged() {
        let store = TicketStore::new(Arc::new(FailingStorage), KEY);
        store.load().await;

        let result = store.create(fan_draft()).await;
        assert!(matches!(result, Err(StoreError::Storage(_))));
        assert!(store.tickets().await.is_empty());
    }
}
