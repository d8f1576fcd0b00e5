/// Shared types used across the codebase

use serde::{Deserialize, Serialize};

/// Fixed user roles. Ids match the seeded `roles` table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Teacher,
    Student,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::Admin, Role::Teacher, Role::Student];

    pub fn id(self) -> i32 {
        match self {
            Role::Admin => 1,
            Role::Teacher => 2,
            Role::Student => 3,
        }
    }

    pub fn from_id(id: i32) -> Option<Self> {
        Self::ALL.into_iter().find(|r| r.id() == id)
    }

    pub fn name(self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Teacher => "teacher",
            Role::Student => "student",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// The two kinds of translatable vocabulary entries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    Noun,
    Verb,
}

impl EntryKind {
    pub fn label(self) -> &'static str {
        match self {
            EntryKind::Noun => "Noun",
            EntryKind::Verb => "Verb",
        }
    }

    pub fn table(self) -> &'static str {
        match self {
            EntryKind::Noun => "nouns",
            EntryKind::Verb => "verbs",
        }
    }

    pub fn group_table(self) -> &'static str {
        match self {
            EntryKind::Noun => "noun_groups",
            EntryKind::Verb => "verb_groups",
        }
    }

    /// Column matched by the substring name filter; also the unique key
    pub fn name_column(self) -> &'static str {
        match self {
            EntryKind::Noun => "noun",
            EntryKind::Verb => "verb_pair_id",
        }
    }

    /// Column matched exactly by the enum filter
    pub fn enum_column(self) -> &'static str {
        match self {
            EntryKind::Noun => "gender",
            EntryKind::Verb => "conjugation_type",
        }
    }

    /// Link table and its entry column
    pub fn link_table(self) -> (&'static str, &'static str) {
        match self {
            EntryKind::Noun => ("noun_group_nouns", "id_noun"),
            EntryKind::Verb => ("verb_group_verbs", "id_verb"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_ids_round_trip() {
        for role in Role::ALL {
            assert_eq!(Role::from_id(role.id()), Some(role));
        }
        assert_eq!(Role::from_id(9), None);
        assert_eq!(Role::Teacher.to_string(), "teacher");
    }
}
