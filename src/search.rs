//! Search expressions and sort keys
//!
//! A [`SearchExpression`] is an ordered list of [`Condition`]s that
//! renders to an IMAP SEARCH query. Conditions are ANDed by the server.

use chrono::NaiveDate;
use std::fmt;

/// One SEARCH key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Condition {
    All,
    Seen,
    Unseen,
    Flagged,
    Unflagged,
    Answered,
    Unanswered,
    Deleted,
    Undeleted,
    From(String),
    To(String),
    Cc(String),
    Subject(String),
    Body(String),
    Text(String),
    Keyword(String),
    /// Internal date on or after the given day.
    Since(NaiveDate),
    /// Internal date strictly before the given day.
    Before(NaiveDate),
    On(NaiveDate),
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => f.write_str("ALL"),
            Self::Seen => f.write_str("SEEN"),
            Self::Unseen => f.write_str("UNSEEN"),
            Self::Flagged => f.write_str("FLAGGED"),
            Self::Unflagged => f.write_str("UNFLAGGED"),
            Self::Answered => f.write_str("ANSWERED"),
            Self::Unanswered => f.write_str("UNANSWERED"),
            Self::Deleted => f.write_str("DELETED"),
            Self::Undeleted => f.write_str("UNDELETED"),
            Self::From(s) => write!(f, "FROM {}", quote(s)),
            Self::To(s) => write!(f, "TO {}", quote(s)),
            Self::Cc(s) => write!(f, "CC {}", quote(s)),
            Self::Subject(s) => write!(f, "SUBJECT {}", quote(s)),
            Self::Body(s) => write!(f, "BODY {}", quote(s)),
            Self::Text(s) => write!(f, "TEXT {}", quote(s)),
            // Keywords are atoms, never quoted.
            Self::Keyword(s) => write!(f, "KEYWORD {s}"),
            Self::Since(d) => write!(f, "SINCE {}", imap_date(*d)),
            Self::Before(d) => write!(f, "BEFORE {}", imap_date(*d)),
            Self::On(d) => write!(f, "ON {}", imap_date(*d)),
        }
    }
}

/// A SEARCH query. The empty expression matches every message.
///
/// # Examples
///
/// ```
/// use imap_mailbox::{Condition, SearchExpression};
///
/// let search = SearchExpression::new()
///     .and(Condition::Unseen)
///     .and(Condition::From("alice@example.com".into()));
/// assert_eq!(search.to_string(), "UNSEEN FROM \"alice@example.com\"");
/// assert_eq!(SearchExpression::new().to_string(), "ALL");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchExpression {
    conditions: Vec<Condition>,
}

impl SearchExpression {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            conditions: Vec::new(),
        }
    }

    /// Add a condition to the expression.
    #[must_use]
    pub fn and(mut self, condition: Condition) -> Self {
        self.conditions.push(condition);
        self
    }

    pub fn push(&mut self, condition: Condition) {
        self.conditions.push(condition);
    }

    #[must_use]
    pub fn conditions(&self) -> &[Condition] {
        &self.conditions
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    /// Render an optional expression; absence means "match everything".
    #[must_use]
    pub fn query(search: Option<&Self>) -> String {
        search.map_or_else(|| Condition::All.to_string(), ToString::to_string)
    }
}

impl From<Condition> for SearchExpression {
    fn from(condition: Condition) -> Self {
        Self::new().and(condition)
    }
}

impl fmt::Display for SearchExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.conditions.is_empty() {
            return f.write_str("ALL");
        }
        for (i, condition) in self.conditions.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{condition}")?;
        }
        Ok(())
    }
}

/// Sort criterion for `UID SORT` (RFC 5256).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum SortKey {
    #[default]
    Arrival,
    Date,
    From,
    Subject,
    To,
    Cc,
    Size,
}

impl SortKey {
    #[must_use]
    pub const fn as_imap_str(self) -> &'static str {
        match self {
            Self::Arrival => "ARRIVAL",
            Self::Date => "DATE",
            Self::From => "FROM",
            Self::Subject => "SUBJECT",
            Self::To => "TO",
            Self::Cc => "CC",
            Self::Size => "SIZE",
        }
    }

    /// The parenthesized sort program, e.g. `(REVERSE DATE)`.
    #[must_use]
    pub fn criteria(self, reverse: bool) -> String {
        if reverse {
            format!("(REVERSE {})", self.as_imap_str())
        } else {
            format!("({})", self.as_imap_str())
        }
    }
}

impl std::str::FromStr for SortKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "arrival" => Ok(Self::Arrival),
            "date" => Ok(Self::Date),
            "from" => Ok(Self::From),
            "subject" => Ok(Self::Subject),
            "to" => Ok(Self::To),
            "cc" => Ok(Self::Cc),
            "size" => Ok(Self::Size),
            other => Err(format!("unknown sort key '{other}'")),
        }
    }
}

/// IMAP `date` production: `1-Feb-2024`.
fn imap_date(date: NaiveDate) -> String {
    date.format("%-d-%b-%Y").to_string()
}

/// IMAP quoted string.
pub(crate) fn quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        if c == '"' || c == '\\' {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('"');
    out
}
