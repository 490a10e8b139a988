use std::collections::BTreeMap;

use crate::agent::Agent;
use crate::content::{Body, Content, Topic};

// Counts `REQUEST <target> (VOTE <agent>)` by requested agent; only the latest
// request of each requester counts.
#[derive(Debug, Clone, Default)]
pub struct VoteRequestCounter {
    requests: Vec<Content>,
    request_map: BTreeMap<Agent, Agent>,
    counts: BTreeMap<Agent, usize>,
    ordered: Vec<Agent>,
    changed: bool,
}

impl VoteRequestCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, content: &Content) -> bool {
        let Body::Request { content: inner, .. } = content.body() else {
            return false;
        };
        if inner.topic() != Topic::Vote {
            return false;
        }
        let (Some(requester), Some(requested)) = (content.subject().agent(), inner.target_agent())
        else {
            return false;
        };
        self.requests.push(content.clone());
        if self.request_map.get(&requester) != Some(&requested) {
            self.changed = true;
            self.request_map.insert(requester, requested);
            self.recount();
        }
        true
    }

    fn recount(&mut self) {
        self.counts.clear();
        for requested in self.request_map.values() {
            *self.counts.entry(*requested).or_default() += 1;
        }
        self.ordered = self.counts.keys().copied().collect();
        self.ordered.sort_by(|a, b| self.counts[b].cmp(&self.counts[a]));
    }

    pub fn request_map(&self) -> &BTreeMap<Agent, Agent> {
        &self.request_map
    }

    pub fn requests(&self) -> &[Content] {
        &self.requests
    }

    pub fn count(&self, agent: Agent) -> usize {
        self.counts.get(&agent).copied().unwrap_or(0)
    }

    // Requested agents by descending count.
    pub fn ordered_agents(&self) -> &[Agent] {
        &self.ordered
    }

    pub fn top_agents(&self) -> Vec<Agent> {
        let Some(first) = self.ordered.first() else {
            return Vec::new();
        };
        let max = self.count(*first);
        self.ordered
            .iter()
            .copied()
            .take_while(|a| self.count(*a) == max)
            .collect()
    }

    pub fn is_changed(&mut self) -> bool {
        std::mem::take(&mut self.changed)
    }

    pub fn len(&self) -> usize {
        self.requests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.requests.is_empty()
    }

    pub fn clear(&mut self) {
        self.requests.clear();
        self.request_map.clear();
        self.counts.clear();
        self.ordered.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::{Subject, Target};

    fn request(requester: u8, voted: u8) -> Content {
        Content::request(
            Agent(requester),
            Target::Any,
            Content::vote(Subject::Any, Agent(voted)),
        )
    }

    #[test]
    fn latest_request_per_requester_counts() {
        let mut counter = VoteRequestCounter::new();
        assert!(counter.add(&request(1, 5)));
        assert!(counter.add(&request(2, 5)));
        assert!(counter.add(&request(3, 6)));
        assert_eq!(counter.ordered_agents(), &[Agent(5), Agent(6)]);
        assert_eq!(counter.top_agents(), vec![Agent(5)]);

        assert!(counter.add(&request(2, 6)));
        assert_eq!(counter.count(Agent(5)), 1);
        assert_eq!(counter.count(Agent(6)), 2);
        assert_eq!(counter.top_agents(), vec![Agent(6)]);
        assert_eq!(counter.len(), 4);
    }

    #[test]
    fn change_flag_only_for_new_targets() {
        let mut counter = VoteRequestCounter::new();
        counter.add(&request(1, 5));
        assert!(counter.is_changed());
        counter.add(&request(1, 5));
        assert!(!counter.is_changed());
        assert_eq!(counter.len(), 2);
    }

    #[test]
    fn rejects_other_requests() {
        let mut counter = VoteRequestCounter::new();
        let guard = Content::request(Agent(1), Target::Any, Content::guard(Subject::Any, Agent(2)));
        assert!(!counter.add(&guard));
        assert!(!counter.add(&Content::vote(Agent(1), Agent(2))));
        assert!(counter.is_empty());
        assert!(counter.top_agents().is_empty());
    }
}
