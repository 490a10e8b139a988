//! A belief of one agent about the role of another, with its supporting reasons.
use crate::agent::{Agent, Role};
use crate::content::{Body, Content};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Estimate {
    estimator: Agent,
    estimated: Agent,
    roles: Vec<Role>,
    reasons: Vec<Content>,
}

impl Estimate {
    pub fn new(estimator: Agent, estimated: Agent, role: Role) -> Self {
        Self {
            estimator,
            estimated,
            roles: vec![role],
            reasons: Vec::new(),
        }
    }

    pub fn with_reason(estimator: Agent, estimated: Agent, role: Role, reason: Content) -> Self {
        let mut estimate = Self::new(estimator, estimated, role);
        estimate.add_reason(reason);
        estimate
    }

    /// Extracts every estimate reachable from `content`.
    ///
    /// * a bare `ESTIMATE` gives one estimate;
    /// * `AND`, `OR` and `XOR` give the estimates of their `ESTIMATE` children,
    ///   other children are ignored here;
    /// * `BECAUSE` gives the estimates of its action, each carrying the reason.
    ///
    /// Estimates whose subject or target is not a concrete agent are dropped.
    /// Returns `None` when nothing is left.
    pub fn parse_content(content: &Content) -> Option<Vec<Estimate>> {
        let estimates: Vec<_> = Self::parse_topics(content)?
            .into_iter()
            .flatten()
            .collect();
        (!estimates.is_empty()).then_some(estimates)
    }

    // One entry per ESTIMATE topic found, `None` for those missing a concrete
    // estimator or target. `None` overall when there is no ESTIMATE topic.
    pub(crate) fn parse_topics(content: &Content) -> Option<Vec<Option<Estimate>>> {
        let topics = match content.body() {
            Body::Estimate { .. } => vec![Self::from_topic(content)],
            Body::And(list) | Body::Or(list) => list
                .iter()
                .filter(|c| matches!(c.body(), Body::Estimate { .. }))
                .map(Self::from_topic)
                .collect(),
            Body::Xor(first, second) => [first.as_ref(), second.as_ref()]
                .into_iter()
                .filter(|c| matches!(c.body(), Body::Estimate { .. }))
                .map(Self::from_topic)
                .collect(),
            Body::Because { reason, action } => {
                let mut topics = Self::parse_topics(action)?;
                for estimate in topics.iter_mut().flatten() {
                    estimate.add_reason(reason.as_ref().clone());
                }
                topics
            }
            _ => Vec::new(),
        };
        (!topics.is_empty()).then_some(topics)
    }

    fn from_topic(content: &Content) -> Option<Estimate> {
        match content.body() {
            Body::Estimate { target, role } => Some(Self::new(
                content.subject().agent()?,
                target.agent()?,
                *role,
            )),
            _ => None,
        }
    }

    pub fn estimator(&self) -> Agent {
        self.estimator
    }

    pub fn estimated(&self) -> Agent {
        self.estimated
    }

    pub fn roles(&self) -> &[Role] {
        &self.roles
    }

    pub fn reasons(&self) -> &[Content] {
        &self.reasons
    }

    pub fn add_role(&mut self, role: Role) {
        if !self.roles.contains(&role) {
            self.roles.push(role);
        }
    }

    pub fn reset_role(&mut self, role: Role) {
        self.roles.clear();
        self.roles.push(role);
    }

    pub fn add_reason(&mut self, reason: Content) {
        if !self.reasons.contains(&reason) {
            self.reasons.push(reason);
        }
    }

    pub fn has_role(&self, role: Role) -> bool {
        self.roles.contains(&role)
    }

    pub fn has_reason(&self, reason: &Content) -> bool {
        self.reasons.contains(reason)
    }

    // XOR is binary on the wire, so only the first two roles are spoken.
    pub fn estimate_content(&self) -> Option<Content> {
        let mut contents = self
            .roles
            .iter()
            .map(|role| Content::estimate(self.estimator, self.estimated, *role));
        let first = contents.next()?;
        match contents.next() {
            None => Some(first),
            Some(second) => Some(Content::xor(self.estimator, first, second)),
        }
    }

    pub fn reason_content(&self) -> Option<Content> {
        match self.reasons.as_slice() {
            [] => None,
            [single] => Some(single.clone()),
            many => Content::and(self.estimator, many.to_vec()),
        }
    }

    pub fn to_content(&self) -> Option<Content> {
        let estimate = self.estimate_content()?;
        match self.reason_content() {
            Some(reason) => Some(Content::because(self.estimator, reason, estimate)),
            None => Some(estimate),
        }
    }
}
