use serde::{Deserialize, Serialize};

/// Between one and three user-supplied habit names, order preserved.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HabitList(Vec<String>);

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum HabitError {
    #[error("no habits provided")]
    Empty,
    #[error("too many habits: {0} (expected at most {max})", max = HabitList::MAX)]
    TooMany(usize),
}

impl HabitList {
    pub const MAX: usize = 3;

    /// Trims every entry and drops the empty ones before validating.
    pub fn new(raw: impl IntoIterator<Item = String>) -> Result<Self, HabitError> {
        let habits: Vec<String> = raw
            .into_iter()
            .map(|h| h.trim().to_string())
            .filter(|h| !h.is_empty())
            .collect();

        if habits.is_empty() {
            return Err(HabitError::Empty);
        }
        if habits.len() > Self::MAX {
            return Err(HabitError::TooMany(habits.len()));
        }
        Ok(Self(habits))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, String> {
        self.0.iter()
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn to_vec(&self) -> Vec<String> {
        self.0.clone()
    }

    /// Comma-separated phrase used in prompts and the plan overview.
    pub fn joined(&self) -> String {
        self.0.join(", ")
    }
}
