//! Chat session state machine

use std::collections::HashSet;

use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use crate::entities::SenderRole;
use crate::events::{MessageEvent, MessageRecord};

/// How far apart an optimistic message and its server row may be created
/// and still be treated as the same message
pub const DEFAULT_MATCH_WINDOW_SECS: i64 = 10;

/// Realtime subscription state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionState {
    #[default]
    Disconnected,
    Connecting,
    Subscribed,
}

/// Delivery state of a displayed message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryStatus {
    /// Optimistic; waiting for the server
    Sending,
    Confirmed,
    Failed,
}

/// One displayed message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatEntry {
    /// `temp-N` id for optimistic messages
    pub local_id: Option<String>,
    /// Server id once confirmed
    pub id: Option<Uuid>,
    pub thread_id: Uuid,
    pub sender_role: SenderRole,
    pub content: String,
    pub read_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub status: EntryStatus,
}

impl ChatEntry {
    fn confirmed(record: &MessageRecord) -> Self {
        Self {
            local_id: None,
            id: Some(record.id),
            thread_id: record.thread_id,
            sender_role: record.sender_role,
            content: record.content.clone(),
            read_at: record.read_at,
            created_at: record.created_at,
            status: EntryStatus::Confirmed,
        }
    }

    fn absorb(&mut self, record: &MessageRecord) {
        self.id = Some(record.id);
        self.content.clone_from(&record.content);
        self.read_at = record.read_at;
        self.created_at = record.created_at;
        self.status = EntryStatus::Confirmed;
    }
}

/// What `apply` did with an event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Applied {
    /// New message appended
    Inserted,
    /// An optimistic message was matched and confirmed
    Replaced { local_id: String },
    /// Existing message updated in place
    Updated,
    /// Already processed
    Duplicate,
    /// Event for another thread
    Ignored,
}

/// Reconciling view of one thread
#[derive(Debug, Clone)]
pub struct ChatSession {
    thread_id: Uuid,
    role: SenderRole,
    state: ConnectionState,
    entries: Vec<ChatEntry>,
    processed: HashSet<Uuid>,
    next_temp: u64,
    match_window: Duration,
}

impl ChatSession {
    /// Create a session for `thread_id`, sending as `role`
    pub fn new(thread_id: Uuid, role: SenderRole) -> Self {
        Self {
            thread_id,
            role,
            state: ConnectionState::Disconnected,
            entries: Vec::new(),
            processed: HashSet::new(),
            next_temp: 0,
            match_window: Duration::seconds(DEFAULT_MATCH_WINDOW_SECS),
        }
    }

    pub fn with_match_window(mut self, window: Duration) -> Self {
        self.match_window = window;
        self
    }

    #[inline]
    pub fn thread_id(&self) -> Uuid {
        self.thread_id
    }

    #[inline]
    pub fn connection_state(&self) -> ConnectionState {
        self.state
    }

    /// Start subscribing; returns false when already connecting or subscribed
    pub fn begin_connect(&mut self) -> bool {
        if self.state != ConnectionState::Disconnected {
            return false;
        }
        self.state = ConnectionState::Connecting;
        true
    }

    pub fn mark_subscribed(&mut self) {
        self.state = ConnectionState::Subscribed;
    }

    pub fn mark_disconnected(&mut self) {
        self.state = ConnectionState::Disconnected;
    }

    /// Displayed messages, oldest first
    pub fn messages(&self) -> &[ChatEntry] {
        &self.entries
    }

    /// Optimistic messages not yet confirmed
    pub fn pending_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| e.status == EntryStatus::Sending)
            .count()
    }

    /// Unread messages written by the other side
    pub fn unread_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| e.sender_role != self.role && e.read_at.is_none())
            .count()
    }

    /// Replace confirmed messages with fetched history. Optimistic entries
    /// survive so an in-flight send is not lost on reconnect.
    pub fn load_history(&mut self, records: &[MessageRecord]) {
        self.entries.retain(|e| e.status != EntryStatus::Confirmed);
        for record in records.iter().filter(|r| r.thread_id == self.thread_id) {
            if self.processed.insert(record.id) || !self.contains_id(record.id) {
                self.entries.push(ChatEntry::confirmed(record));
            }
        }
        self.sort();
    }

    /// Echo an outgoing message locally; returns its temporary id
    pub fn send_optimistic(&mut self, content: &str, now: DateTime<Utc>) -> String {
        self.next_temp += 1;
        let local_id = format!("temp-{}", self.next_temp);
        self.entries.push(ChatEntry {
            local_id: Some(local_id.clone()),
            id: None,
            thread_id: self.thread_id,
            sender_role: self.role,
            content: content.to_string(),
            read_at: None,
            created_at: now,
            status: EntryStatus::Sending,
        });
        local_id
    }

    /// The REST call returned the stored row for `local_id`
    pub fn confirm_sent(&mut self, local_id: &str, record: &MessageRecord) {
        let temp_pos = self.position_of_local(local_id);

        if !self.processed.insert(record.id) {
            // Realtime delivered this row first; drop the leftover temp entry.
            if let Some(pos) = temp_pos {
                if self.entries[pos].id.is_none() {
                    self.entries.remove(pos);
                }
            }
            return;
        }

        // A realtime row with the same content may already have claimed this
        // temp entry; it keeps that row and this one is shown on its own.
        match temp_pos {
            Some(pos) if self.entries[pos].id.is_none() => self.entries[pos].absorb(record),
            _ => self.entries.push(ChatEntry::confirmed(record)),
        }
        self.sort();
    }

    /// The REST call failed
    pub fn fail_send(&mut self, local_id: &str) {
        if let Some(pos) = self.position_of_local(local_id) {
            if self.entries[pos].status == EntryStatus::Sending {
                self.entries[pos].status = EntryStatus::Failed;
            }
        }
    }

    /// Merge a realtime event
    pub fn apply(&mut self, event: &MessageEvent) -> Applied {
        let record = event.record();
        if record.thread_id != self.thread_id {
            return Applied::Ignored;
        }

        match event {
            MessageEvent::Insert(_) => self.apply_insert(record),
            MessageEvent::Update(_) => {
                if let Some(entry) = self.entries.iter_mut().find(|e| e.id == Some(record.id)) {
                    entry.absorb(record);
                    self.sort();
                    Applied::Updated
                } else {
                    self.apply_insert(record)
                }
            }
        }
    }

    fn apply_insert(&mut self, record: &MessageRecord) -> Applied {
        if self.processed.contains(&record.id) {
            return Applied::Duplicate;
        }
        self.processed.insert(record.id);

        if let Some(pos) = self.find_optimistic_match(record) {
            let local_id = self.entries[pos].local_id.clone().unwrap_or_default();
            self.entries[pos].absorb(record);
            self.sort();
            return Applied::Replaced { local_id };
        }

        self.entries.push(ChatEntry::confirmed(record));
        self.sort();
        Applied::Inserted
    }

    fn find_optimistic_match(&self, record: &MessageRecord) -> Option<usize> {
        if record.sender_role != self.role {
            return None;
        }
        self.entries.iter().position(|e| {
            e.status != EntryStatus::Confirmed
                && e.id.is_none()
                && e.thread_id == record.thread_id
                && e.sender_role == record.sender_role
                && e.content == record.content
                && (e.created_at - record.created_at).abs() <= self.match_window
        })
    }

    fn position_of_local(&self, local_id: &str) -> Option<usize> {
        self.entries
            .iter()
            .position(|e| e.local_id.as_deref() == Some(local_id))
    }

    fn contains_id(&self, id: Uuid) -> bool {
        self.entries.iter().any(|e| e.id == Some(id))
    }

    fn sort(&mut self) {
        self.entries.sort_by_key(|e| e.created_at);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(thread: Uuid, role: SenderRole, content: &str, at: DateTime<Utc>) -> MessageRecord {
        MessageRecord {
            id: Uuid::new_v4(),
            thread_id: thread,
            sender_role: role,
            sender_id: None,
            content: content.to_string(),
            scheduled_message_id: None,
            read_at: None,
            created_at: at,
            updated_at: at,
        }
    }

    fn session() -> (ChatSession, Uuid) {
        let thread = Uuid::new_v4();
        (ChatSession::new(thread, SenderRole::Guest), thread)
    }

    #[test]
    fn test_connection_states() {
        let (mut s, _) = session();
        assert_eq!(s.connection_state(), ConnectionState::Disconnected);
        assert!(s.begin_connect());
        assert!(!s.begin_connect());
        assert_eq!(s.connection_state(), ConnectionState::Connecting);
        s.mark_subscribed();
        assert_eq!(s.connection_state(), ConnectionState::Subscribed);
        s.mark_disconnected();
        assert!(s.begin_connect());
    }

    #[test]
    fn test_rest_confirmation_replaces_temp_by_id() {
        let (mut s, thread) = session();
        let now = Utc::now();
        let temp = s.send_optimistic("Hello", now);
        assert_eq!(s.pending_count(), 1);

        let stored = record(thread, SenderRole::Guest, "Hello", now + Duration::seconds(1));
        s.confirm_sent(&temp, &stored);

        assert_eq!(s.messages().len(), 1);
        assert_eq!(s.messages()[0].id, Some(stored.id));
        assert_eq!(s.pending_count(), 0);

        // Realtime echo of the same row afterwards is a duplicate
        assert_eq!(s.apply(&MessageEvent::Insert(stored)), Applied::Duplicate);
        assert_eq!(s.messages().len(), 1);
    }

    #[test]
    fn test_realtime_first_matches_fuzzily() {
        let (mut s, thread) = session();
        let now = Utc::now();
        let temp = s.send_optimistic("Where is the key box?", now);

        let stored = record(
            thread,
            SenderRole::Guest,
            "Where is the key box?",
            now + Duration::seconds(2),
        );
        let applied = s.apply(&MessageEvent::Insert(stored.clone()));
        assert_eq!(applied, Applied::Replaced { local_id: temp.clone() });
        assert_eq!(s.messages().len(), 1);

        // REST response lands later; no second copy appears
        s.confirm_sent(&temp, &stored);
        assert_eq!(s.messages().len(), 1);
        assert_eq!(s.messages()[0].status, EntryStatus::Confirmed);
    }

    #[test]
    fn test_fuzzy_match_respects_window_content_and_role() {
        let (mut s, thread) = session();
        let now = Utc::now();
        s.send_optimistic("Hi", now);

        let late = record(thread, SenderRole::Guest, "Hi", now + Duration::seconds(30));
        assert_eq!(s.apply(&MessageEvent::Insert(late)), Applied::Inserted);

        let other_text = record(thread, SenderRole::Guest, "Hi!", now);
        assert_eq!(s.apply(&MessageEvent::Insert(other_text)), Applied::Inserted);

        let from_host = record(thread, SenderRole::Host, "Hi", now);
        assert_eq!(s.apply(&MessageEvent::Insert(from_host)), Applied::Inserted);

        assert_eq!(s.pending_count(), 1);
        assert_eq!(s.messages().len(), 4);
    }

    #[test]
    fn test_realtime_first_without_match_then_rest_removes_temp() {
        let (mut s, thread) = session();
        let now = Utc::now();
        let temp = s.send_optimistic("Hello", now);

        // Server clock far off: realtime insert does not match the temp entry
        let stored = record(thread, SenderRole::Guest, "Hello", now + Duration::minutes(5));
        assert_eq!(s.apply(&MessageEvent::Insert(stored.clone())), Applied::Inserted);
        assert_eq!(s.messages().len(), 2);

        s.confirm_sent(&temp, &stored);
        assert_eq!(s.messages().len(), 1);
        assert_eq!(s.messages()[0].id, Some(stored.id));
    }

    #[test]
    fn test_update_and_unread() {
        let (mut s, thread) = session();
        let now = Utc::now();
        let mut incoming = record(thread, SenderRole::Host, "Welcome!", now);
        s.apply(&MessageEvent::Insert(incoming.clone()));
        assert_eq!(s.unread_count(), 1);

        incoming.read_at = Some(now + Duration::seconds(5));
        assert_eq!(s.apply(&MessageEvent::Update(incoming)), Applied::Updated);
        assert_eq!(s.unread_count(), 0);
    }

    #[test]
    fn test_other_thread_ignored() {
        let (mut s, _) = session();
        let foreign = record(Uuid::new_v4(), SenderRole::Host, "x", Utc::now());
        assert_eq!(s.apply(&MessageEvent::Insert(foreign)), Applied::Ignored);
        assert!(s.messages().is_empty());
    }

    #[test]
    fn test_fail_send_and_history_keeps_pending() {
        let (mut s, thread) = session();
        let now = Utc::now();
        let failed = s.send_optimistic("first", now);
        s.fail_send(&failed);
        s.send_optimistic("second", now + Duration::seconds(1));

        let history = vec![
            record(thread, SenderRole::Host, "older", now - Duration::hours(1)),
            record(thread, SenderRole::Host, "old", now - Duration::minutes(30)),
        ];
        s.load_history(&history);
        s.load_history(&history);

        let contents: Vec<&str> = s.messages().iter().map(|e| e.content.as_str()).collect();
        assert_eq!(contents, vec!["older", "old", "first", "second"]);
        assert_eq!(s.messages()[2].status, EntryStatus::Failed);
        assert_eq!(s.pending_count(), 1);
    }

    #[test]
    fn test_messages_sorted_by_time() {
        let (mut s, thread) = session();
        let now = Utc::now();
        s.apply(&MessageEvent::Insert(record(thread, SenderRole::Host, "b", now)));
        s.apply(&MessageEvent::Insert(record(
            thread,
            SenderRole::Host,
            "a",
            now - Duration::seconds(10),
        )));
        assert_eq!(s.messages()[0].content, "a");
    }

    #[test]
    fn test_repeated_text_keeps_both_stored_rows() {
        let (mut s, thread) = session();
        let now = Utc::now();
        let first = s.send_optimistic("hi", now);
        let second = s.send_optimistic("hi", now);
        let a = record(thread, SenderRole::Guest, "hi", now);
        let b = record(thread, SenderRole::Guest, "hi", now + Duration::seconds(1));

        // The second row arrives over realtime first and claims the first echo
        assert_eq!(
            s.apply(&MessageEvent::Insert(b.clone())),
            Applied::Replaced { local_id: first.clone() }
        );
        s.confirm_sent(&first, &a);
        s.confirm_sent(&second, &b);
        assert_eq!(s.apply(&MessageEvent::Insert(a.clone())), Applied::Duplicate);

        let mut ids: Vec<Option<Uuid>> = s.messages().iter().map(|e| e.id).collect();
        ids.sort();
        let mut expected = vec![Some(a.id), Some(b.id)];
        expected.sort();
        assert_eq!(ids, expected);
        assert_eq!(s.pending_count(), 0);
    }
}
