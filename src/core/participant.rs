use crate::core::errors::{InvalidInput, SettlementError};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A participant in a shared-expense group.
///
/// Identity is the name itself: two participants with the same name are the
/// same person. Names are compared exactly, without trimming.
///
/// # Examples
///
/// ```
/// use split_settle::core::participant::Participant;
///
/// let alice = Participant::new("Alice");
/// let bob = Participant::new("Bob");
/// assert_ne!(alice, bob);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Participant(String);

impl Participant {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Returns the participant's name.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True if the name is empty or whitespace only.
    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Display for Participant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Participant {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Ordered list of unique participants.
///
/// Insertion order is preserved and determines the row order of the
/// settlement output. Deserialization goes through the same checks as
/// [`Roster::add`], so a restored roster never holds duplicates or blank
/// names.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Participant>", into = "Vec<Participant>")]
pub struct Roster {
    members: Vec<Participant>,
}

impl Roster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a participant, rejecting blank or already-present names.
    pub fn add(&mut self, participant: Participant) -> Result<(), SettlementError> {
        if participant.is_blank() {
            return Err(InvalidInput::BlankParticipantName.into());
        }
        if self.contains(&participant) {
            return Err(InvalidInput::DuplicateParticipant(participant).into());
        }
        self.members.push(participant);
        Ok(())
    }

    /// Remove a participant, returning whether it was present.
    pub fn remove(&mut self, participant: &Participant) -> bool {
        let before = self.members.len();
        self.members.retain(|p| p != participant);
        self.members.len() != before
    }

    pub fn contains(&self, participant: &Participant) -> bool {
        self.members.iter().any(|p| p == participant)
    }

    /// Position of a participant in roster order.
    pub fn index_of(&self, participant: &Participant) -> Option<usize> {
        self.members.iter().position(|p| p == participant)
    }

    pub fn members(&self) -> &[Participant] {
        &self.members
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Participant> {
        self.members.iter()
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

impl TryFrom<Vec<Participant>> for Roster {
    type Error = SettlementError;

    fn try_from(members: Vec<Participant>) -> Result<Self, Self::Error> {
        let mut roster = Roster::new();
        for member in members {
            roster.add(member)?;
        }
        Ok(roster)
    }
}

impl From<Roster> for Vec<Participant> {
    fn from(roster: Roster) -> Self {
        roster.members
    }
}

impl<'a> IntoIterator for &'a Roster {
    type Item = &'a Participant;
    type IntoIter = std::slice::Iter<'a, Participant>;

    fn into_iter(self) -> Self::IntoIter {
        self.members.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_participant_equality() {
        let a = Participant::new("Alice");
        let b = Participant::new("Alice");
        let c = Participant::new("Bob");
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_participant_display() {
        let p = Participant::new("Carol");
        assert_eq!(format!("{}", p), "Carol");
    }

    #[test]
    fn test_blank_names() {
        assert!(Participant::new("").is_blank());
        assert!(Participant::new("  \t").is_blank());
        assert!(!Participant::new(" Dan ").is_blank());
    }

    #[test]
    fn test_roster_preserves_order() {
        let mut roster = Roster::new();
        for name in ["Carol", "Alice", "Bob"] {
            roster.add(Participant::new(name)).unwrap();
        }
        let names: Vec<&str> = roster.iter().map(|p| p.as_str()).collect();
        assert_eq!(names, vec!["Carol", "Alice", "Bob"]);
        assert_eq!(roster.index_of(&Participant::new("Bob")), Some(2));
    }

    #[test]
    fn test_roster_rejects_duplicate() {
        let mut roster = Roster::new();
        roster.add(Participant::new("Alice")).unwrap();
        let err = roster.add(Participant::new("Alice")).unwrap_err();
        assert_eq!(
            err,
            SettlementError::InvalidInput(InvalidInput::DuplicateParticipant(Participant::new(
                "Alice"
            )))
        );
        assert_eq!(roster.len(), 1);
    }

    #[test]
    fn test_roster_rejects_blank() {
        let mut roster = Roster::new();
        let err = roster.add(Participant::new("   ")).unwrap_err();
        assert_eq!(
            err,
            SettlementError::InvalidInput(InvalidInput::BlankParticipantName)
        );
        assert!(roster.is_empty());
    }

    #[test]
    fn test_roster_remove() {
        let mut roster = Roster::new();
        roster.add(Participant::new("Alice")).unwrap();
        roster.add(Participant::new("Bob")).unwrap();
        assert!(roster.remove(&Participant::new("Alice")));
        assert!(!roster.remove(&Participant::new("Alice")));
        assert_eq!(roster.members(), &[Participant::new("Bob")]);
    }

    #[test]
    fn test_roster_deserialize_rejects_duplicates() {
        let result: Result<Roster, _> = serde_json::from_str(r#"["Alice", "Bob", "Alice"]"#);
        assert!(result.is_err());

        let roster: Roster = serde_json::from_str(r#"["Alice", "Bob"]"#).unwrap();
        assert_eq!(roster.len(), 2);
    }
}
