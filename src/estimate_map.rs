//! Who estimates whom as what, as declared in the talk so far.
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::agent::{Agent, Role};
use crate::content::{Body, Content};
use crate::estimate::Estimate;

// How a new estimate is folded into the row of its estimator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EstimatePolicy {
    // Upsert per (estimator, estimated) pair; earlier targets stay.
    #[default]
    Merge,
    // The estimator's whole row is replaced by the newest estimate.
    Replace,
}

#[derive(Debug, Clone, Default)]
pub struct EstimateReasonMap {
    policy: EstimatePolicy,
    rows: BTreeMap<Agent, BTreeMap<Agent, Estimate>>,
}

impl EstimateReasonMap {
    pub fn new(policy: EstimatePolicy) -> Self {
        Self {
            policy,
            rows: BTreeMap::new(),
        }
    }

    pub fn policy(&self) -> EstimatePolicy {
        self.policy
    }

    pub fn put(&mut self, estimate: Estimate) {
        let row = self.rows.entry(estimate.estimator()).or_default();
        if self.policy == EstimatePolicy::Replace {
            row.clear();
        }
        row.insert(estimate.estimated(), estimate);
    }

    // Registers every complete estimate found in `content`. False when there was
    // none, or when one of them lacked a concrete estimator or target.
    pub fn put_content(&mut self, content: &Content) -> bool {
        let Some(topics) = Estimate::parse_topics(content) else {
            return false;
        };
        let mut complete = true;
        for topic in topics {
            match topic {
                Some(estimate) => self.put(estimate),
                None => complete = false,
            }
        }
        complete
    }

    pub fn estimate(&self, estimator: Agent, estimated: Agent) -> Option<&Estimate> {
        self.rows.get(&estimator)?.get(&estimated)
    }

    pub fn estimate_mut(&mut self, estimator: Agent, estimated: Agent) -> Option<&mut Estimate> {
        self.rows.get_mut(&estimator)?.get_mut(&estimated)
    }

    pub fn content(&self, estimator: Agent, estimated: Agent) -> Option<Content> {
        self.estimate(estimator, estimated)?.to_content()
    }

    // The reason part of the estimate, if it is spoken as BECAUSE.
    pub fn reason(&self, estimator: Agent, estimated: Agent) -> Option<Content> {
        match self.content(estimator, estimated)?.body() {
            Body::Because { reason, .. } => Some(reason.as_ref().clone()),
            _ => None,
        }
    }

    // Agents the estimator thinks may be `role`, in seat order.
    pub fn estimated(&self, estimator: Agent, role: Role) -> Vec<Agent> {
        self.rows
            .get(&estimator)
            .map(|row| {
                row.values()
                    .filter(|e| e.has_role(role))
                    .map(Estimate::estimated)
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn is_estimated(&self, estimator: Agent, estimated: Agent, role: Role) -> bool {
        self.estimate(estimator, estimated)
            .is_some_and(|e| e.has_role(role))
    }

    pub fn remove(&mut self, estimator: Agent, estimated: Agent) -> Option<Estimate> {
        self.rows.get_mut(&estimator)?.remove(&estimated)
    }

    pub fn clear(&mut self) {
        self.rows.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::Species;
    use crate::content::{Subject, Target};

    #[test]
    fn decoded_estimate_is_registered() {
        let content: Content = "Agent[01] ESTIMATE Agent[02] WEREWOLF".parse().expect("valid");
        let mut map = EstimateReasonMap::default();
        assert!(map.put_content(&content));
        assert_eq!(map.estimated(Agent(1), Role::Werewolf), vec![Agent(2)]);
        assert!(map.is_estimated(Agent(1), Agent(2), Role::Werewolf));
        assert!(!map.is_estimated(Agent(1), Agent(2), Role::Seer));
    }

    #[test]
    fn non_estimates_are_rejected() {
        let mut map = EstimateReasonMap::default();
        assert!(!map.put_content(&Content::vote(Agent(1), Agent(2))));
        assert!(map.estimated(Agent(1), Role::Werewolf).is_empty());
    }

    #[test]
    fn partial_estimate_fails_the_whole_utterance() {
        let mut map = EstimateReasonMap::default();
        let any_target = Content::estimate(Agent(1), Target::Any, Role::Werewolf);
        assert!(!map.put_content(&any_target));

        // the complete sibling is still registered
        let mixed = Content::and(
            Agent(1),
            vec![
                Content::estimate(Agent(1), Agent(2), Role::Werewolf),
                Content::estimate(Subject::Any, Agent(3), Role::Possessed),
            ],
        )
        .expect("non-empty");
        assert!(!map.put_content(&mixed));
        assert_eq!(map.estimated(Agent(1), Role::Werewolf), vec![Agent(2)]);
        assert!(map.estimated(Agent(1), Role::Possessed).is_empty());
    }

    #[test]
    fn merge_policy_keeps_other_targets() {
        let mut map = EstimateReasonMap::new(EstimatePolicy::Merge);
        map.put(Estimate::new(Agent(1), Agent(2), Role::Werewolf));
        map.put(Estimate::new(Agent(1), Agent(3), Role::Werewolf));
        assert_eq!(map.estimated(Agent(1), Role::Werewolf), vec![Agent(2), Agent(3)]);

        // a later estimate of the same pair replaces that pair only
        map.put(Estimate::new(Agent(1), Agent(2), Role::Seer));
        assert_eq!(map.estimated(Agent(1), Role::Werewolf), vec![Agent(3)]);
        assert_eq!(map.estimated(Agent(1), Role::Seer), vec![Agent(2)]);
    }

    #[test]
    fn replace_policy_keeps_only_the_latest_target() {
        let mut map = EstimateReasonMap::new(EstimatePolicy::Replace);
        map.put(Estimate::new(Agent(1), Agent(2), Role::Werewolf));
        map.put(Estimate::new(Agent(1), Agent(3), Role::Werewolf));
        assert_eq!(map.estimated(Agent(1), Role::Werewolf), vec![Agent(3)]);
        assert!(map.estimate(Agent(1), Agent(2)).is_none());
    }

    #[test]
    fn reason_comes_from_because_form() {
        let reason = Content::identified(Agent(4), Agent(5), Species::Werewolf);
        let content = Content::because(
            Agent(4),
            reason.clone(),
            Content::estimate(Agent(4), Agent(6), Role::Possessed),
        );
        let mut map = EstimateReasonMap::default();
        assert!(map.put_content(&content));
        assert_eq!(map.reason(Agent(4), Agent(6)), Some(reason));
        assert_eq!(map.content(Agent(4), Agent(6)), Some(content));

        assert!(map.remove(Agent(4), Agent(6)).is_some());
        assert_eq!(map.reason(Agent(4), Agent(6)), None);
    }
}
