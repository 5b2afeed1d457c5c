pub const MIN_PLAYERS: usize = 2;

/// Player name slots being edited. Never shorter than [`MIN_PLAYERS`]; empty
/// strings are unfilled slots.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Roster {
    names: Vec<String>,
}

impl Default for Roster {
    fn default() -> Self {
        Self {
            names: vec![String::new(); MIN_PLAYERS],
        }
    }
}

impl Roster {
    /// Restores a stored roster; one that is too short starts over with empty slots.
    pub fn from_stored(names: Vec<String>) -> Self {
        if names.len() >= MIN_PLAYERS {
            Self { names }
        } else {
            Self::default()
        }
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn set_name(&mut self, index: usize, value: impl Into<String>) -> bool {
        match self.names.get_mut(index) {
            Some(slot) => {
                *slot = value.into();
                true
            }
            None => false,
        }
    }

    pub fn name_mut(&mut self, index: usize) -> Option<&mut String> {
        self.names.get_mut(index)
    }

    pub fn add_player(&mut self) -> usize {
        self.names.push(String::new());
        self.names.len() - 1
    }

    pub fn remove_player(&mut self, index: usize) -> bool {
        if self.names.len() <= MIN_PLAYERS || index >= self.names.len() {
            return false;
        }
        self.names.remove(index);
        true
    }

    pub fn filled(&self) -> impl Iterator<Item = &str> + '_ {
        self.names
            .iter()
            .map(|name| name.trim())
            .filter(|name| !name.is_empty())
    }

    pub fn filled_count(&self) -> usize {
        self.filled().count()
    }

    pub fn can_start(&self) -> bool {
        self.filled_count() >= MIN_PLAYERS
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_stored_roster_is_replaced() {
        let roster = Roster::from_stored(vec!["Ana".to_string()]);
        assert_eq!(roster, Roster::default());
        assert_eq!(roster.len(), MIN_PLAYERS);
    }

    #[test]
    fn cannot_remove_below_minimum() {
        let mut roster = Roster::default();
        assert!(!roster.remove_player(0));
        let added = roster.add_player();
        assert_eq!(added, 2);
        assert!(roster.remove_player(0));
        assert!(!roster.remove_player(1));
        assert!(!roster.remove_player(7));
    }

    #[test]
    fn start_needs_two_filled_names() {
        let mut roster = Roster::default();
        roster.set_name(0, "Ana");
        roster.set_name(1, "   ");
        assert!(!roster.can_start());
        roster.set_name(1, "Ben");
        assert!(roster.can_start());
        assert_eq!(roster.filled().collect::<Vec<_>>(), vec!["Ana", "Ben"]);
        assert!(!roster.set_name(5, "Cy"));
    }
}
