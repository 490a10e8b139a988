//! Declared votes (or, on the whisper channel, declared attack votes) with their reasons.
use crate::agent::Agent;
use crate::content::{Body, Content, Topic};

// Which declaration a map aggregates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VoteKind {
    #[default]
    Vote,
    Attack,
}

impl VoteKind {
    fn topic(self) -> Topic {
        match self {
            VoteKind::Vote => Topic::Vote,
            VoteKind::Attack => Topic::Attack,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Ballot {
    voter: Agent,
    target: Agent,
    reason: Option<Content>,
}

#[derive(Debug, Clone, Default)]
pub struct VoteReasonMap {
    kind: VoteKind,
    // One ballot per voter, in the order voters first declared.
    ballots: Vec<Ballot>,
    // Targets in order of first appearance among the ballots.
    counts: Vec<(Agent, usize)>,
    changed: bool,
}

impl VoteReasonMap {
    pub fn new(kind: VoteKind) -> Self {
        Self {
            kind,
            ..Self::default()
        }
    }

    pub fn attack() -> Self {
        Self::new(VoteKind::Attack)
    }

    // A map seeded from actual ballots, e.g. the latest vote list on a revote.
    pub fn from_ballots(ballots: impl IntoIterator<Item = (Agent, Agent)>) -> Self {
        let mut map = Self::default();
        for (voter, target) in ballots {
            map.put(voter, Some(target), None);
        }
        map
    }

    pub fn kind(&self) -> VoteKind {
        self.kind
    }

    fn recount(&mut self) {
        self.counts.clear();
        for ballot in &self.ballots {
            match self.counts.iter_mut().find(|(t, _)| *t == ballot.target) {
                Some((_, count)) => *count += 1,
                None => self.counts.push((ballot.target, 1)),
            }
        }
    }

    /// Records that `voter` declared `target`; `None` withdraws the voter's declaration.
    ///
    /// The change flag is raised only when the voter's target differs from the one
    /// recorded before. Returns false when there was nothing to withdraw.
    pub fn put(&mut self, voter: Agent, target: Option<Agent>, reason: Option<Content>) -> bool {
        let position = self.ballots.iter().position(|b| b.voter == voter);
        let Some(target) = target else {
            return match position {
                Some(index) => {
                    self.ballots.remove(index);
                    self.recount();
                    true
                }
                None => false,
            };
        };
        match position {
            Some(index) => {
                let ballot = &mut self.ballots[index];
                if ballot.target != target {
                    self.changed = true;
                }
                ballot.target = target;
                ballot.reason = reason;
            }
            None => {
                self.changed = true;
                self.ballots.push(Ballot {
                    voter,
                    target,
                    reason,
                });
            }
        }
        self.recount();
        true
    }

    // Registers a VOTE (ATTACK for the attack flavour), bare or as the action of a BECAUSE.
    pub fn put_content(&mut self, content: &Content) -> bool {
        let topic = self.kind.topic();
        let (declaration, reason) = match content.body() {
            Body::Because { reason, action } if action.topic() == topic => {
                (action.as_ref(), Some(reason.as_ref().clone()))
            }
            _ if content.topic() == topic => (content, None),
            _ => return false,
        };
        match (declaration.subject().agent(), declaration.target_agent()) {
            (Some(voter), Some(target)) => self.put(voter, Some(target), reason),
            _ => false,
        }
    }

    pub fn cancel(&mut self, voter: Agent) -> bool {
        self.put(voter, None, None)
    }

    pub fn vote_count(&self, target: Agent) -> usize {
        self.counts
            .iter()
            .find(|(t, _)| *t == target)
            .map_or(0, |(_, count)| *count)
    }

    pub fn total_votes(&self) -> usize {
        self.counts.iter().map(|(_, count)| count).sum()
    }

    // Targets tied at the highest count; empty when nobody has declared.
    pub fn winners(&self) -> Vec<Agent> {
        let max = self.counts.iter().map(|(_, count)| *count).max().unwrap_or(0);
        self.counts
            .iter()
            .filter(|(_, count)| *count == max)
            .map(|(target, _)| *target)
            .collect()
    }

    pub fn is_winner(&self, agent: Agent) -> bool {
        self.winners().contains(&agent)
    }

    // Targets by descending count, ties kept in order of first appearance.
    pub fn ordered_list(&self, excludes: &[Agent]) -> Vec<Agent> {
        let mut ordered: Vec<_> = self
            .counts
            .iter()
            .filter(|(target, _)| !excludes.contains(target))
            .copied()
            .collect();
        ordered.sort_by(|a, b| b.1.cmp(&a.1));
        ordered.into_iter().map(|(target, _)| target).collect()
    }

    pub fn top(&self, excludes: &[Agent]) -> Option<Agent> {
        self.ordered_list(excludes).first().copied()
    }

    pub fn target(&self, voter: Agent) -> Option<Agent> {
        self.ballot(voter).map(|b| b.target)
    }

    pub fn reason(&self, voter: Agent) -> Option<&Content> {
        self.ballot(voter)?.reason.as_ref()
    }

    // The voter's reason, provided it still votes for `target`.
    pub fn reason_for(&self, voter: Agent, target: Agent) -> Option<&Content> {
        if self.target(voter) == Some(target) {
            self.reason(voter)
        } else {
            None
        }
    }

    pub fn voters(&self) -> impl Iterator<Item = Agent> + '_ {
        self.ballots.iter().map(|b| b.voter)
    }

    fn ballot(&self, voter: Agent) -> Option<&Ballot> {
        self.ballots.iter().find(|b| b.voter == voter)
    }

    // Reads and clears the change flag.
    pub fn is_changed(&mut self) -> bool {
        std::mem::take(&mut self.changed)
    }

    pub fn clear(&mut self) {
        self.ballots.clear();
        self.counts.clear();
    }

    // A copy without `voter`'s ballot; the change flag of `self` is untouched.
    pub fn excluding_voter(&self, voter: Agent) -> VoteReasonMap {
        let mut copy = self.clone();
        copy.cancel(voter);
        copy
    }
}
