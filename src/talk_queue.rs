use std::collections::VecDeque;

use crate::agent::Agent;
use crate::content::{Content, Subject, Topic};

// Pending utterances of one channel for the current day; one is spoken per turn.
#[derive(Debug, Clone, Default)]
pub struct TalkQueue {
    queue: VecDeque<Content>,
}

impl TalkQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enqueue(&mut self, content: Content, me: Agent) {
        let content = if content.subject() == Subject::Unspecified {
            content.with_subject(me)
        } else {
            content
        };
        self.queue.push_back(content);
    }

    // The next utterance as text. Our own subject is implicit on the wire.
    pub fn dequeue(&mut self, me: Agent) -> String {
        match self.queue.pop_front() {
            None => Content::skip().to_string(),
            Some(content) if content.subject() == Subject::Agent(me) => {
                content.without_subject().to_string()
            }
            Some(content) => content.to_string(),
        }
    }

    /// Withdraws queued utterances superseded by `content`.
    ///
    /// Exact matches always go. A VOTE withdraws every queued VOTE; a COMINGOUT,
    /// ESTIMATE, DIVINED or IDENTIFIED withdraws queued items of the same topic
    /// about the same target.
    pub fn cancel(&mut self, content: &Content) {
        let topic = content.topic();
        self.queue.retain(|queued| {
            if queued == content {
                return false;
            }
            if queued.topic() != topic {
                return true;
            }
            match topic {
                Topic::Vote => false,
                Topic::Comingout | Topic::Estimate | Topic::Divined | Topic::Identified => {
                    queued.target() != content.target()
                }
                _ => true,
            }
        });
    }

    pub fn clear(&mut self) {
        self.queue.clear();
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Content> {
        self.queue.iter()
    }
}
