//! Resolving a free-form participant reference to a [`PlayerId`].
//!
//! Rule engines receive participant references from chat commands, menu
//! selections, and saved records. [`IdentityResolver`] turns such a token
//! into an id using a fixed policy, tried in order:
//!
//! 1. exact numeric id,
//! 2. exact name, ignoring case,
//! 3. the single participant whose name contains the token, ignoring case.
//!
//! Two or more substring hits are ambiguous and resolve to nothing.

use kinship_types::PlayerId;

/// A participant known to the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Participant {
    /// Unique id.
    pub id: PlayerId,
    /// Display name.
    pub name: String,
}

impl Participant {
    /// Create a participant entry.
    pub fn new(id: PlayerId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

/// Source of currently known participants.
pub trait ParticipantDirectory {
    /// Every known participant.
    fn participants(&self) -> Vec<Participant>;
}

/// Fixed participant list.
#[derive(Debug, Clone, Default)]
pub struct StaticDirectory {
    participants: Vec<Participant>,
}

impl StaticDirectory {
    /// Create a directory from a list of participants.
    pub const fn new(participants: Vec<Participant>) -> Self {
        Self { participants }
    }

    /// Add or rename a participant.
    pub fn insert(&mut self, participant: Participant) {
        if let Some(existing) = self
            .participants
            .iter_mut()
            .find(|p| p.id == participant.id)
        {
            existing.name = participant.name;
        } else {
            self.participants.push(participant);
        }
    }

    /// Drop a participant.
    pub fn remove(&mut self, id: PlayerId) {
        self.participants.retain(|p| p.id != id);
    }
}

impl ParticipantDirectory for StaticDirectory {
    fn participants(&self) -> Vec<Participant> {
        self.participants.clone()
    }
}

/// Which policy step produced a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchKind {
    /// The token was the participant's numeric id.
    Id,
    /// The token equals the participant's name, ignoring case.
    ExactName,
    /// The token is part of exactly one participant's name.
    UniqueSubstring,
}

/// Resolves participant tokens against a [`ParticipantDirectory`].
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityResolver;

impl IdentityResolver {
    /// Resolve `token` to a participant id.
    pub fn resolve(directory: &dyn ParticipantDirectory, token: &str) -> Option<PlayerId> {
        Self::resolve_with_kind(directory, token).map(|(id, _)| id)
    }

    /// Resolve `token`, also reporting which policy step matched.
    pub fn resolve_with_kind(
        directory: &dyn ParticipantDirectory,
        token: &str,
    ) -> Option<(PlayerId, MatchKind)> {
        let token = token.trim();
        if token.is_empty() {
            return None;
        }
        let participants = directory.participants();

        if let Ok(id) = token.parse::<PlayerId>()
            && participants.iter().any(|p| p.id == id)
        {
            return Some((id, MatchKind::Id));
        }

        let needle = token.to_lowercase();
        if let Some(p) = participants
            .iter()
            .find(|p| p.name.to_lowercase() == needle)
        {
            return Some((p.id, MatchKind::ExactName));
        }

        let mut hits = participants
            .iter()
            .filter(|p| p.name.to_lowercase().contains(&needle));
        match (hits.next(), hits.next()) {
            (Some(p), None) => Some((p.id, MatchKind::UniqueSubstring)),
            (Some(_), Some(_)) => {
                tracing::debug!(token, "Participant reference is ambiguous");
                None
            }
            (None, _) => {
                tracing::debug!(token, "Participant not found");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn directory() -> StaticDirectory {
        StaticDirectory::new(vec![
            Participant::new(PlayerId(100), "Abigail"),
            Participant::new(PlayerId(200), "Abby"),
            Participant::new(PlayerId(300), "Sebastian"),
            Participant::new(PlayerId(400), "300"),
        ])
    }

    #[test]
    fn numeric_id_wins_over_names() {
        let dir = directory();
        assert_eq!(
            IdentityResolver::resolve_with_kind(&dir, "300"),
            Some((PlayerId(300), MatchKind::Id))
        );
    }

    #[test]
    fn unknown_numeric_id_falls_through_to_name() {
        let dir = StaticDirectory::new(vec![Participant::new(PlayerId(7), "42")]);
        assert_eq!(
            IdentityResolver::resolve_with_kind(&dir, "42"),
            Some((PlayerId(7), MatchKind::ExactName))
        );
    }

    #[test]
    fn exact_name_ignores_case() {
        let dir = directory();
        assert_eq!(
            IdentityResolver::resolve_with_kind(&dir, "abby"),
            Some((PlayerId(200), MatchKind::ExactName))
        );
    }

    #[test]
    fn exact_name_beats_substring_ambiguity() {
        let dir = directory();
        assert_eq!(IdentityResolver::resolve(&dir, "ABBY"), Some(PlayerId(200)));
    }

    #[test]
    fn unique_substring_resolves() {
        let dir = directory();
        assert_eq!(
            IdentityResolver::resolve_with_kind(&dir, "bast"),
            Some((PlayerId(300), MatchKind::UniqueSubstring))
        );
    }

    #[test]
    fn ambiguous_substring_is_none() {
        let dir = directory();
        assert_eq!(IdentityResolver::resolve(&dir, "ab"), None);
    }

    #[test]
    fn missing_and_blank_are_none() {
        let dir = directory();
        assert_eq!(IdentityResolver::resolve(&dir, "Haley"), None);
        assert_eq!(IdentityResolver::resolve(&dir, "   "), None);
    }

    #[test]
    fn insert_renames_existing() {
        let mut dir = directory();
        dir.insert(Participant::new(PlayerId(300), "Seb"));
        assert_eq!(IdentityResolver::resolve(&dir, "seb"), Some(PlayerId(300)));
        assert_eq!(dir.participants().len(), 4);
        dir.remove(PlayerId(300));
        assert_eq!(IdentityResolver::resolve(&dir, "seb"), None);
    }
}
