//! Direct messages between users.

use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::models::{Message, MessageDetail, SendMessageRequest};
use crate::pagination::{paginate, Page};
use crate::store::Store;
use crate::{ClinicError, ClinicResult};

pub struct MessageService {
    store: Arc<Store>,
}

impl MessageService {
    pub fn new(store: Arc<Store>) -> Self {
        Self { store }
    }

    pub fn send(&self, sender_id: Uuid, req: SendMessageRequest) -> ClinicResult<MessageDetail> {
        self.store
            .users
            .get(req.receiver_id)?
            .ok_or(ClinicError::NotFound("User"))?;
        if req.subject.trim().is_empty() || req.message.trim().is_empty() {
            return Err(ClinicError::InvalidInput(
                "subject and message are required".into(),
            ));
        }

        let now = Utc::now();
        let message = Message {
            id: Uuid::new_v4(),
            sender_id,
            receiver_id: req.receiver_id,
            subject: req.subject,
            message: req.message,
            read: false,
            read_at: None,
            message_type: req.message_type.unwrap_or_default(),
            priority: req.priority.unwrap_or_default(),
            created_at: now,
            updated_at: now,
        };
        self.store.messages.insert(message.clone())?;

        super::message_detail(&self.store, message)
    }

    /// Messages received by a user, newest first. `unread_only` narrows to
    /// messages not yet marked read.
    pub fn inbox(
        &self,
        user_id: Uuid,
        unread_only: bool,
        page: Option<u64>,
        limit: Option<u64>,
    ) -> ClinicResult<Page<MessageDetail>> {
        self.list_where(
            |m| m.receiver_id == user_id && (!unread_only || !m.read),
            page,
            limit,
        )
    }

    /// Messages sent by a user, newest first.
    pub fn sent(
        &self,
        user_id: Uuid,
        page: Option<u64>,
        limit: Option<u64>,
    ) -> ClinicResult<Page<MessageDetail>> {
        self.list_where(|m| m.sender_id == user_id, page, limit)
    }

    /// Both directions of traffic between two users.
    ///
    /// Pagination walks backwards from the newest message, but each returned
    /// page is ordered oldest-first so it reads top to bottom.
    pub fn conversation(
        &self,
        user_id: Uuid,
        other_id: Uuid,
        page: Option<u64>,
        limit: Option<u64>,
    ) -> ClinicResult<Page<MessageDetail>> {
        let mut result = self.list_where(
            |m| {
                (m.sender_id == user_id && m.receiver_id == other_id)
                    || (m.sender_id == other_id && m.receiver_id == user_id)
            },
            page,
            limit,
        )?;
        result.items.reverse();
        Ok(result)
    }

    fn list_where<F>(
        &self,
        pred: F,
        page: Option<u64>,
        limit: Option<u64>,
    ) -> ClinicResult<Page<MessageDetail>>
    where
        F: Fn(&Message) -> bool,
    {
        let mut messages = self.store.messages.find(pred)?;
        messages.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        let page = paginate(messages, page, limit);
        let mut items = Vec::with_capacity(page.items.len());
        for message in page.items {
            items.push(super::message_detail(&self.store, message)?);
        }

        Ok(Page {
            items,
            total: page.total,
            total_pages: page.total_pages,
            current_page: page.current_page,
        })
    }

    /// Marks one message read. Only the receiver may do this.
    pub fn mark_read(&self, user_id: Uuid, id: Uuid) -> ClinicResult<MessageDetail> {
        let message = self
            .store
            .messages
            .get(id)?
            .ok_or(ClinicError::NotFound("Message"))?;
        if message.receiver_id != user_id {
            return Err(ClinicError::Forbidden("Access denied".into()));
        }

        let updated = self
            .store
            .messages
            .update(id, |m| {
                if !m.read {
                    m.read = true;
                    m.read_at = Some(Utc::now());
                }
                m.updated_at = Utc::now();
            })?
            .ok_or(ClinicError::NotFound("Message"))?;

        super::message_detail(&self.store, updated)
    }

    /// Marks every unread received message read. Returns how many changed.
    pub fn mark_all_read(&self, user_id: Uuid) -> ClinicResult<u64> {
        let now = Utc::now();
        self.store.messages.update_where(
            |m| m.receiver_id == user_id && !m.read,
            |m| {
                m.read = true;
                m.read_at = Some(now);
                m.updated_at = now;
            },
        )
    }

    pub fn unread_count(&self, user_id: Uuid) -> ClinicResult<u64> {
        self.store
            .messages
            .count(|m| m.receiver_id == user_id && !m.read)
    }

    /// Deletes a message. Only the sender may do this.
    pub fn delete(&self, user_id: Uuid, id: Uuid) -> ClinicResult<()> {
        let message = self
            .store
            .messages
            .get(id)?
            .ok_or(ClinicError::NotFound("Message"))?;
        if message.sender_id != user_id {
            return Err(ClinicError::Forbidden("Access denied".into()));
        }
        self.store.messages.remove(id)?;
        Ok(())
    }
}
