// Canonical text form of a Content.
//
// Encoding is `Display`, decoding is `FromStr`. Every content the grammar can build
// encodes to text that decodes back to an equal tree.
use std::fmt;
use std::str::FromStr;

use super::{Body, Content, Operator, Subject, Target};
use crate::agent::{Agent, Role, Species, TalkType};
use crate::error::ContentError;

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Target::Any => write!(f, "ANY"),
            Target::Agent(agent) => write!(f, "{agent}"),
        }
    }
}

impl fmt::Display for Content {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.subject {
            Subject::Unspecified => {}
            Subject::Any => write!(f, "ANY ")?,
            Subject::Agent(agent) => write!(f, "{agent} ")?,
        }
        write!(f, "{}", self.body)
    }
}

fn write_operands(f: &mut fmt::Formatter<'_>, operands: &[&Content]) -> fmt::Result {
    for operand in operands {
        write!(f, " ({operand})")?;
    }
    Ok(())
}

impl fmt::Display for Body {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Body::Skip => write!(f, "Skip"),
            Body::Over => write!(f, "Over"),
            Body::Estimate { target, role } => write!(f, "ESTIMATE {target} {role}"),
            Body::Comingout { target, role } => write!(f, "COMINGOUT {target} {role}"),
            Body::Divination { target } => write!(f, "DIVINATION {target}"),
            Body::Divined { target, result } => write!(f, "DIVINED {target} {result}"),
            Body::Identified { target, result } => write!(f, "IDENTIFIED {target} {result}"),
            Body::Guard { target } => write!(f, "GUARD {target}"),
            Body::Guarded { target } => write!(f, "GUARDED {target}"),
            Body::Vote { target } => write!(f, "VOTE {target}"),
            Body::Voted { target } => write!(f, "VOTED {target}"),
            Body::Attack { target } => write!(f, "ATTACK {target}"),
            Body::Attacked { target } => write!(f, "ATTACKED {target}"),
            Body::Agree(talk) => write!(f, "AGREE {} day{} ID:{}", talk.talk_type, talk.day, talk.id),
            Body::Disagree(talk) => {
                write!(f, "DISAGREE {} day{} ID:{}", talk.talk_type, talk.day, talk.id)
            }
            Body::And(list) => {
                write!(f, "AND")?;
                write_operands(f, &list.iter().collect::<Vec<_>>())
            }
            Body::Or(list) => {
                write!(f, "OR")?;
                write_operands(f, &list.iter().collect::<Vec<_>>())
            }
            Body::Xor(first, second) => {
                write!(f, "XOR")?;
                write_operands(f, &[first, second])
            }
            Body::Not(content) => write!(f, "NOT ({content})"),
            Body::Day { day, content } => write!(f, "DAY {day} ({content})"),
            Body::Because { reason, action } => write!(f, "BECAUSE ({reason}) ({action})"),
            Body::Request { target, content } => write!(f, "REQUEST {target} ({content})"),
            Body::Inquire { target, content } => write!(f, "INQUIRE {target} ({content})"),
        }
    }
}

impl FromStr for Content {
    type Err = ContentError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let mut parser = Parser::new(text);
        parser.skip_ws();
        if parser.at_end() {
            return Err(ContentError::Empty);
        }
        let content = parser.content()?;
        parser.skip_ws();
        if !parser.at_end() {
            return Err(ContentError::Trailing(parser.rest().to_string()));
        }
        Ok(content)
    }
}

// Deepest operand nesting a decoded utterance may have.
const MAX_DEPTH: usize = 64;

// Recursive descent over the utterance text.
struct Parser<'a> {
    src: &'a str,
    pos: usize,
    depth: usize,
}

impl<'a> Parser<'a> {
    fn new(src: &'a str) -> Self {
        Self { src, pos: 0, depth: 0 }
    }

    fn rest(&self) -> &'a str {
        &self.src[self.pos..]
    }

    fn at_end(&self) -> bool {
        self.pos >= self.src.len()
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn skip_ws(&mut self) {
        let rest = self.rest();
        let trimmed = rest.trim_start();
        self.pos += rest.len() - trimmed.len();
    }

    // A run of characters up to whitespace or a parenthesis.
    fn word(&mut self) -> Result<&'a str, ContentError> {
        self.skip_ws();
        let rest = self.rest();
        let end = rest
            .find(|c: char| c.is_whitespace() || c == '(' || c == ')')
            .unwrap_or(rest.len());
        if end == 0 {
            return Err(ContentError::UnexpectedEnd);
        }
        self.pos += end;
        Ok(&rest[..end])
    }

    fn content(&mut self) -> Result<Content, ContentError> {
        let first = self.word()?;
        let (subject, keyword) = if first == "ANY" {
            (Subject::Any, self.word()?)
        } else if first.starts_with("Agent[") {
            (Subject::Agent(first.parse()?), self.word()?)
        } else {
            (Subject::Unspecified, first)
        };
        let body = self.body(keyword)?;
        Ok(Content { subject, body })
    }

    fn body(&mut self, keyword: &str) -> Result<Body, ContentError> {
        let body = match keyword {
            "Skip" => Body::Skip,
            "Over" => Body::Over,
            "ESTIMATE" => Body::Estimate {
                target: self.target()?,
                role: self.role()?,
            },
            "COMINGOUT" => Body::Comingout {
                target: self.target()?,
                role: self.role()?,
            },
            "DIVINATION" => Body::Divination {
                target: self.target()?,
            },
            "DIVINED" => Body::Divined {
                target: self.target()?,
                result: self.species()?,
            },
            "IDENTIFIED" => Body::Identified {
                target: self.target()?,
                result: self.species()?,
            },
            "GUARD" => Body::Guard {
                target: self.target()?,
            },
            "GUARDED" => Body::Guarded {
                target: self.target()?,
            },
            "VOTE" => Body::Vote {
                target: self.target()?,
            },
            "VOTED" => Body::Voted {
                target: self.target()?,
            },
            "ATTACK" => Body::Attack {
                target: self.target()?,
            },
            "ATTACKED" => Body::Attacked {
                target: self.target()?,
            },
            "AGREE" => Body::Agree(self.talk_ref()?),
            "DISAGREE" => Body::Disagree(self.talk_ref()?),
            other => {
                let operator = other
                    .parse::<Operator>()
                    .map_err(|_| ContentError::UnknownKeyword(other.to_string()))?;
                self.operator(operator)?
            }
        };
        Ok(body)
    }

    fn operator(&mut self, operator: Operator) -> Result<Body, ContentError> {
        let body = match operator {
            Operator::And => Body::And(self.operands_at_least("AND", 1)?),
            Operator::Or => Body::Or(self.operands_at_least("OR", 1)?),
            Operator::Xor => {
                let [first, second] = self.operands_exactly::<2>("XOR", "2")?;
                Body::Xor(Box::new(first), Box::new(second))
            }
            Operator::Not => {
                let [content] = self.operands_exactly::<1>("NOT", "1")?;
                Body::Not(Box::new(content))
            }
            Operator::Day => {
                let day = self.number("day")?;
                let [content] = self.operands_exactly::<1>("DAY", "1")?;
                Body::Day {
                    day,
                    content: Box::new(content),
                }
            }
            Operator::Because => {
                let [reason, action] = self.operands_exactly::<2>("BECAUSE", "2")?;
                Body::Because {
                    reason: Box::new(reason),
                    action: Box::new(action),
                }
            }
            Operator::Request => {
                let target = self.target()?;
                let [content] = self.operands_exactly::<1>("REQUEST", "1")?;
                Body::Request {
                    target,
                    content: Box::new(content),
                }
            }
            Operator::Inquire => {
                let target = self.target()?;
                let [content] = self.operands_exactly::<1>("INQUIRE", "1")?;
                Body::Inquire {
                    target,
                    content: Box::new(content),
                }
            }
        };
        Ok(body)
    }

    // Parenthesised operands until something else shows up.
    fn operands(&mut self) -> Result<Vec<Content>, ContentError> {
        let mut operands = Vec::new();
        loop {
            self.skip_ws();
            if self.peek() != Some('(') {
                return Ok(operands);
            }
            let open = self.pos;
            if self.depth >= MAX_DEPTH {
                return Err(ContentError::TooDeep(MAX_DEPTH));
            }
            self.pos += 1;
            self.depth += 1;
            let content = self.content()?;
            self.depth -= 1;
            self.skip_ws();
            if self.peek() != Some(')') {
                return Err(ContentError::Unbalanced(open));
            }
            self.pos += 1;
            operands.push(content);
        }
    }

    fn operands_at_least(
        &mut self,
        operator: &'static str,
        min: usize,
    ) -> Result<Vec<Content>, ContentError> {
        let operands = self.operands()?;
        if operands.len() < min {
            return Err(ContentError::Arity {
                operator,
                expected: "at least 1",
                found: operands.len(),
            });
        }
        Ok(operands)
    }

    fn operands_exactly<const N: usize>(
        &mut self,
        operator: &'static str,
        expected: &'static str,
    ) -> Result<[Content; N], ContentError> {
        let operands = self.operands()?;
        let found = operands.len();
        operands.try_into().map_err(|_| ContentError::Arity {
            operator,
            expected,
            found,
        })
    }

    fn target(&mut self) -> Result<Target, ContentError> {
        let token = self.word()?;
        if token == "ANY" {
            return Ok(Target::Any);
        }
        token.parse::<Agent>().map(Target::Agent)
    }

    fn role(&mut self) -> Result<Role, ContentError> {
        let token = self.word()?;
        token.parse().map_err(|_| ContentError::InvalidToken {
            kind: "role",
            token: token.to_string(),
        })
    }

    fn species(&mut self) -> Result<Species, ContentError> {
        let token = self.word()?;
        token.parse().map_err(|_| ContentError::InvalidToken {
            kind: "species",
            token: token.to_string(),
        })
    }

    fn number(&mut self, kind: &'static str) -> Result<u32, ContentError> {
        let token = self.word()?;
        token.parse().map_err(|_| ContentError::InvalidToken {
            kind,
            token: token.to_string(),
        })
    }

    // `TALK day2 ID:13`
    fn talk_ref(&mut self) -> Result<super::TalkRef, ContentError> {
        let kind = self.word()?;
        let talk_type = kind
            .parse::<TalkType>()
            .map_err(|_| ContentError::InvalidToken {
                kind: "talk type",
                token: kind.to_string(),
            })?;
        let day_token = self.word()?;
        let day = day_token
            .strip_prefix("day")
            .and_then(|d| d.parse().ok())
            .ok_or_else(|| ContentError::InvalidToken {
                kind: "talk day",
                token: day_token.to_string(),
            })?;
        let id_token = self.word()?;
        let id = id_token
            .strip_prefix("ID:")
            .and_then(|d| d.parse().ok())
            .ok_or_else(|| ContentError::InvalidToken {
                kind: "talk id",
                token: id_token.to_string(),
            })?;
        Ok(super::TalkRef { talk_type, day, id })
    }
}
