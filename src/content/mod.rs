//! The tagged speech-act grammar.
//!
//! A [`Content`] is an immutable tree: a subject (who asserts it) and a body
//! (what is asserted). Leaves are topics such as `VOTE` or `ESTIMATE`,
//! inner nodes are operators such as `AND` or `BECAUSE`. The canonical text form
//! lives in [`codec`].

pub mod codec;

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, EnumString};

use crate::agent::{Agent, Role, Species, TalkType};

// Who asserts a content. `Unspecified` is resolved to the speaker on ingestion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Subject {
    #[default]
    Unspecified,
    Any,
    Agent(Agent),
}

impl Subject {
    pub fn agent(self) -> Option<Agent> {
        match self {
            Subject::Agent(agent) => Some(agent),
            _ => None,
        }
    }
}

impl From<Agent> for Subject {
    fn from(agent: Agent) -> Self {
        Subject::Agent(agent)
    }
}

// The agent a topic is about; `Any` is the wildcard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Target {
    Any,
    Agent(Agent),
}

impl Target {
    pub fn agent(self) -> Option<Agent> {
        match self {
            Target::Agent(agent) => Some(agent),
            Target::Any => None,
        }
    }
}

impl From<Agent> for Target {
    fn from(agent: Agent) -> Self {
        Target::Agent(agent)
    }
}

// A missing agent becomes the wildcard.
impl From<Option<Agent>> for Target {
    fn from(agent: Option<Agent>) -> Self {
        agent.map_or(Target::Any, Target::Agent)
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display, EnumString, AsRefStr,
)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum Topic {
    Skip,
    Over,
    Vote,
    Voted,
    Estimate,
    Comingout,
    Divination,
    Divined,
    Identified,
    Guard,
    Guarded,
    Attack,
    Attacked,
    Agree,
    Disagree,
    Operator,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display, EnumString, AsRefStr,
)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum Operator {
    And,
    Or,
    Xor,
    Not,
    Day,
    Because,
    Request,
    Inquire,
}

// Points at an earlier utterance, for AGREE and DISAGREE.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TalkRef {
    pub talk_type: TalkType,
    pub day: u32,
    pub id: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Body {
    Skip,
    Over,
    Estimate { target: Target, role: Role },
    Comingout { target: Target, role: Role },
    Divination { target: Target },
    Divined { target: Target, result: Species },
    Identified { target: Target, result: Species },
    Guard { target: Target },
    Guarded { target: Target },
    Vote { target: Target },
    Voted { target: Target },
    Attack { target: Target },
    Attacked { target: Target },
    Agree(TalkRef),
    Disagree(TalkRef),
    And(Vec<Content>),
    Or(Vec<Content>),
    Xor(Box<Content>, Box<Content>),
    Not(Box<Content>),
    Day { day: u32, content: Box<Content> },
    Because { reason: Box<Content>, action: Box<Content> },
    Request { target: Target, content: Box<Content> },
    Inquire { target: Target, content: Box<Content> },
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Content {
    subject: Subject,
    body: Body,
}

impl Content {
    pub fn new(subject: impl Into<Subject>, body: Body) -> Self {
        Self {
            subject: subject.into(),
            body,
        }
    }

    pub fn skip() -> Self {
        Self::new(Subject::Unspecified, Body::Skip)
    }

    pub fn over() -> Self {
        Self::new(Subject::Unspecified, Body::Over)
    }

    pub fn estimate(subject: impl Into<Subject>, target: impl Into<Target>, role: Role) -> Self {
        Self::new(
            subject,
            Body::Estimate {
                target: target.into(),
                role,
            },
        )
    }

    pub fn comingout(subject: impl Into<Subject>, target: impl Into<Target>, role: Role) -> Self {
        Self::new(
            subject,
            Body::Comingout {
                target: target.into(),
                role,
            },
        )
    }

    pub fn divination(subject: impl Into<Subject>, target: impl Into<Target>) -> Self {
        Self::new(
            subject,
            Body::Divination {
                target: target.into(),
            },
        )
    }

    pub fn divined(subject: impl Into<Subject>, target: impl Into<Target>, result: Species) -> Self {
        Self::new(
            subject,
            Body::Divined {
                target: target.into(),
                result,
            },
        )
    }

    pub fn identified(
        subject: impl Into<Subject>,
        target: impl Into<Target>,
        result: Species,
    ) -> Self {
        Self::new(
            subject,
            Body::Identified {
                target: target.into(),
                result,
            },
        )
    }

    pub fn guard(subject: impl Into<Subject>, target: impl Into<Target>) -> Self {
        Self::new(
            subject,
            Body::Guard {
                target: target.into(),
            },
        )
    }

    pub fn guarded(subject: impl Into<Subject>, target: impl Into<Target>) -> Self {
        Self::new(
            subject,
            Body::Guarded {
                target: target.into(),
            },
        )
    }

    pub fn vote(subject: impl Into<Subject>, target: impl Into<Target>) -> Self {
        Self::new(
            subject,
            Body::Vote {
                target: target.into(),
            },
        )
    }

    pub fn voted(subject: impl Into<Subject>, target: impl Into<Target>) -> Self {
        Self::new(
            subject,
            Body::Voted {
                target: target.into(),
            },
        )
    }

    pub fn attack(subject: impl Into<Subject>, target: impl Into<Target>) -> Self {
        Self::new(
            subject,
            Body::Attack {
                target: target.into(),
            },
        )
    }

    pub fn attacked(subject: impl Into<Subject>, target: impl Into<Target>) -> Self {
        Self::new(
            subject,
            Body::Attacked {
                target: target.into(),
            },
        )
    }

    pub fn agree(subject: impl Into<Subject>, talk_type: TalkType, day: u32, id: u32) -> Self {
        Self::new(subject, Body::Agree(TalkRef { talk_type, day, id }))
    }

    pub fn disagree(subject: impl Into<Subject>, talk_type: TalkType, day: u32, id: u32) -> Self {
        Self::new(subject, Body::Disagree(TalkRef { talk_type, day, id }))
    }

    // AND needs at least one operand.
    pub fn and(subject: impl Into<Subject>, contents: Vec<Content>) -> Option<Self> {
        (!contents.is_empty()).then(|| Self::new(subject, Body::And(contents)))
    }

    // OR needs at least one operand.
    pub fn or(subject: impl Into<Subject>, contents: Vec<Content>) -> Option<Self> {
        (!contents.is_empty()).then(|| Self::new(subject, Body::Or(contents)))
    }

    pub fn xor(subject: impl Into<Subject>, first: Content, second: Content) -> Self {
        Self::new(subject, Body::Xor(Box::new(first), Box::new(second)))
    }

    pub fn not(subject: impl Into<Subject>, content: Content) -> Self {
        Self::new(subject, Body::Not(Box::new(content)))
    }

    pub fn day(subject: impl Into<Subject>, day: u32, content: Content) -> Self {
        Self::new(
            subject,
            Body::Day {
                day,
                content: Box::new(content),
            },
        )
    }

    pub fn because(subject: impl Into<Subject>, reason: Content, action: Content) -> Self {
        Self::new(
            subject,
            Body::Because {
                reason: Box::new(reason),
                action: Box::new(action),
            },
        )
    }

    pub fn request(
        subject: impl Into<Subject>,
        target: impl Into<Target>,
        content: Content,
    ) -> Self {
        Self::new(
            subject,
            Body::Request {
                target: target.into(),
                content: Box::new(content),
            },
        )
    }

    pub fn inquire(
        subject: impl Into<Subject>,
        target: impl Into<Target>,
        content: Content,
    ) -> Self {
        Self::new(
            subject,
            Body::Inquire {
                target: target.into(),
                content: Box::new(content),
            },
        )
    }

    pub fn subject(&self) -> Subject {
        self.subject
    }

    pub fn body(&self) -> &Body {
        &self.body
    }

    pub fn topic(&self) -> Topic {
        match &self.body {
            Body::Skip => Topic::Skip,
            Body::Over => Topic::Over,
            Body::Estimate { .. } => Topic::Estimate,
            Body::Comingout { .. } => Topic::Comingout,
            Body::Divination { .. } => Topic::Divination,
            Body::Divined { .. } => Topic::Divined,
            Body::Identified { .. } => Topic::Identified,
            Body::Guard { .. } => Topic::Guard,
            Body::Guarded { .. } => Topic::Guarded,
            Body::Vote { .. } => Topic::Vote,
            Body::Voted { .. } => Topic::Voted,
            Body::Attack { .. } => Topic::Attack,
            Body::Attacked { .. } => Topic::Attacked,
            Body::Agree(_) => Topic::Agree,
            Body::Disagree(_) => Topic::Disagree,
            _ => Topic::Operator,
        }
    }

    pub fn operator(&self) -> Option<Operator> {
        match &self.body {
            Body::And(_) => Some(Operator::And),
            Body::Or(_) => Some(Operator::Or),
            Body::Xor(..) => Some(Operator::Xor),
            Body::Not(_) => Some(Operator::Not),
            Body::Day { .. } => Some(Operator::Day),
            Body::Because { .. } => Some(Operator::Because),
            Body::Request { .. } => Some(Operator::Request),
            Body::Inquire { .. } => Some(Operator::Inquire),
            _ => None,
        }
    }

    // The target of a topic, or of a REQUEST / INQUIRE.
    pub fn target(&self) -> Option<Target> {
        match &self.body {
            Body::Estimate { target, .. }
            | Body::Comingout { target, .. }
            | Body::Divination { target }
            | Body::Divined { target, .. }
            | Body::Identified { target, .. }
            | Body::Guard { target }
            | Body::Guarded { target }
            | Body::Vote { target }
            | Body::Voted { target }
            | Body::Attack { target }
            | Body::Attacked { target }
            | Body::Request { target, .. }
            | Body::Inquire { target, .. } => Some(*target),
            _ => None,
        }
    }

    pub fn target_agent(&self) -> Option<Agent> {
        self.target().and_then(Target::agent)
    }

    pub fn role(&self) -> Option<Role> {
        match &self.body {
            Body::Estimate { role, .. } | Body::Comingout { role, .. } => Some(*role),
            _ => None,
        }
    }

    pub fn result(&self) -> Option<Species> {
        match &self.body {
            Body::Divined { result, .. } | Body::Identified { result, .. } => Some(*result),
            _ => None,
        }
    }

    pub fn talk_ref(&self) -> Option<TalkRef> {
        match &self.body {
            Body::Agree(talk) | Body::Disagree(talk) => Some(*talk),
            _ => None,
        }
    }

    // The day number of a DAY operator.
    pub fn day_number(&self) -> Option<u32> {
        match &self.body {
            Body::Day { day, .. } => Some(*day),
            _ => None,
        }
    }

    // Operands in wire order. BECAUSE yields reason then action.
    pub fn children(&self) -> Vec<&Content> {
        match &self.body {
            Body::And(list) | Body::Or(list) => list.iter().collect(),
            Body::Xor(first, second) => vec![first.as_ref(), second.as_ref()],
            Body::Because { reason, action } => vec![reason.as_ref(), action.as_ref()],
            Body::Not(content)
            | Body::Day { content, .. }
            | Body::Request { content, .. }
            | Body::Inquire { content, .. } => vec![content.as_ref()],
            _ => Vec::new(),
        }
    }

    pub fn is_marker(&self) -> bool {
        matches!(self.body, Body::Skip | Body::Over)
    }

    // Replaces the outermost subject. SKIP and OVER are speech-act markers and stay as they are.
    pub fn with_subject(&self, subject: impl Into<Subject>) -> Content {
        if self.is_marker() {
            return self.clone();
        }
        Content {
            subject: subject.into(),
            body: self.body.clone(),
        }
    }

    pub fn without_subject(&self) -> Content {
        self.with_subject(Subject::Unspecified)
    }
}
