//! crates/afrilead_core/src/conversations.rs
//!
//! Groups a user's direct messages into per-partner conversations.

use std::collections::HashMap;
use uuid::Uuid;

use crate::domain::{Conversation, Message};

/// Groups every message `user_id` sent or received by the other participant.
///
/// Messages not involving `user_id` are ignored. Only unread messages
/// *received* by `user_id` count towards `unread_count`. The result is
/// ordered by the latest message, newest first.
pub fn group_conversations<I>(user_id: Uuid, messages: I) -> Vec<Conversation>
where
    I: IntoIterator<Item = Message>,
{
    let mut by_partner: HashMap<Uuid, Conversation> = HashMap::new();

    for message in messages {
        let other = if message.sender_id == user_id {
            message.receiver_id
        } else if message.receiver_id == user_id {
            message.sender_id
        } else {
            continue;
        };
        let unread = u64::from(message.receiver_id == user_id && !message.read);

        match by_partner.get_mut(&other) {
            Some(conversation) => {
                conversation.unread_count += unread;
                if message.created_at > conversation.last_message.created_at {
                    conversation.last_message = message;
                }
            }
            None => {
                by_partner.insert(
                    other,
                    Conversation {
                        other_user_id: other,
                        last_message: message,
                        unread_count: unread,
                    },
                );
            }
        }
    }

    let mut conversations: Vec<Conversation> = by_partner.into_values().collect();
    conversations.sort_by(|a, b| b.last_message.created_at.cmp(&a.last_message.created_at));
    conversations
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn message(from: Uuid, to: Uuid, minutes_ago: i64, read: bool) -> Message {
        let at = Utc::now() - Duration::minutes(minutes_ago);
        Message {
            id: Uuid::new_v4(),
            sender_id: from,
            receiver_id: to,
            content: format!("sent {minutes_ago} minutes ago"),
            read,
            read_at: None,
            created_at: at,
            updated_at: at,
        }
    }

    #[test]
    fn groups_by_other_participant() {
        let me = Uuid::new_v4();
        let amara = Uuid::new_v4();
        let kofi = Uuid::new_v4();

        let messages = vec![
            message(amara, me, 30, false),
            message(me, amara, 20, false),
            message(amara, me, 10, false),
            message(kofi, me, 5, true),
            message(me, kofi, 50, false),
        ];

        let conversations = group_conversations(me, messages);
        assert_eq!(conversations.len(), 2);

        assert_eq!(conversations[0].other_user_id, kofi);
        assert_eq!(conversations[0].unread_count, 0);

        assert_eq!(conversations[1].other_user_id, amara);
        assert_eq!(conversations[1].unread_count, 2);
        assert_eq!(conversations[1].last_message.content, "sent 10 minutes ago");
    }

    #[test]
    fn own_unread_messages_are_not_counted() {
        let me = Uuid::new_v4();
        let other = Uuid::new_v4();
        let conversations = group_conversations(me, vec![message(me, other, 1, false)]);
        assert_eq!(conversations[0].unread_count, 0);
    }

    #[test]
    fn unrelated_messages_are_ignored() {
        let me = Uuid::new_v4();
        let conversations =
            group_conversations(me, vec![message(Uuid::new_v4(), Uuid::new_v4(), 1, false)]);
        assert!(conversations.is_empty());
    }
}
