/// Change notifications
///
/// Every successful mutation publishes a [`TodoChange`] on the [`ChangeHub`].
/// Subscribers register for one owner and only see that owner's changes;
/// the SSE endpoint uses this to push a fresh list and stats snapshot to
/// every open client of the user.
///
/// The hub is a bounded `tokio::sync::broadcast` channel. A subscriber that
/// falls behind loses individual changes and receives a single
/// [`ChangeKind::Resync`] instead, telling it to reload everything.
///
/// # Example
///
/// ```
/// use todoflow_shared::events::{ChangeHub, ChangeKind, TodoChange};
/// use uuid::Uuid;
///
/// # async fn example() {
/// let hub = ChangeHub::new(16);
/// let owner_id = Uuid::new_v4();
/// let mut subscription = hub.subscribe(owner_id);
///
/// hub.publish(TodoChange::new(owner_id, Uuid::new_v4(), ChangeKind::Created));
///
/// let change = subscription.next().await.unwrap();
/// assert_eq!(change.kind, ChangeKind::Created);
/// # }
/// ```

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast::{self, error::RecvError};
use uuid::Uuid;

/// Default channel capacity
pub const DEFAULT_CAPACITY: usize = 256;

/// What happened to a todo
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    Created,
    Updated,
    Toggled,
    Deleted,
    /// Changes were dropped; reload the full state
    Resync,
}

/// One change to one owner's todos
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodoChange {
    pub owner_id: Uuid,

    /// Affected todo, absent for `Resync`
    pub todo_id: Option<Uuid>,

    pub kind: ChangeKind,
}

impl TodoChange {
    pub fn new(owner_id: Uuid, todo_id: Uuid, kind: ChangeKind) -> Self {
        Self {
            owner_id,
            todo_id: Some(todo_id),
            kind,
        }
    }

    pub fn resync(owner_id: Uuid) -> Self {
        Self {
            owner_id,
            todo_id: None,
            kind: ChangeKind::Resync,
        }
    }
}

/// Fan-out point for todo changes
#[derive(Debug, Clone)]
pub struct ChangeHub {
    sender: broadcast::Sender<TodoChange>,
}

impl Default for ChangeHub {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl ChangeHub {
    /// Creates a hub buffering up to `capacity` changes per subscriber
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Publishes a change; returns how many subscriptions received it
    ///
    /// Having no subscribers is normal and not an error.
    pub fn publish(&self, change: TodoChange) -> usize {
        match self.sender.send(change) {
            Ok(receivers) => receivers,
            Err(_) => 0,
        }
    }

    /// Subscribes to one owner's changes
    pub fn subscribe(&self, owner_id: Uuid) -> ChangeSubscription {
        ChangeSubscription {
            owner_id,
            receiver: self.sender.subscribe(),
        }
    }

    /// Number of open subscriptions across all owners
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

/// Receiving end for one owner
#[derive(Debug)]
pub struct ChangeSubscription {
    owner_id: Uuid,
    receiver: broadcast::Receiver<TodoChange>,
}

impl ChangeSubscription {
    pub fn owner_id(&self) -> Uuid {
        self.owner_id
    }

    /// Waits for the next change of this owner
    ///
    /// Returns `None` once the hub is gone.
    pub async fn next(&mut self) -> Option<TodoChange> {
        loop {
            match self.receiver.recv().await {
                Ok(change) if change.owner_id == self.owner_id => return Some(change),
                Ok(_) => continue,
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(
                        user_id = %self.owner_id,
                        skipped,
                        "Change subscriber lagged, requesting resync"
                    );
                    return Some(TodoChange::resync(self.owner_id));
                }
                Err(RecvError::Closed) => return None,
            }
        }
    }
}
