use serde::{Deserialize, Serialize};

/// One habit's assignment for a single day.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HabitEntry {
    pub habit: String,
    pub task: String,
    pub motivation: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DayPlan {
    pub day: u8,
    pub date_label: String,
    pub habits: Vec<HabitEntry>,
    pub daily_tip: String,
}

/// The 7-day coaching plan. Built once per submission and read-only after.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Plan {
    pub overview: String,
    pub days: Vec<DayPlan>,
}

pub const PLAN_DAYS: usize = 7;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum PlanShapeError {
    #[error("expected {PLAN_DAYS} days, got {0}")]
    DayCount(usize),
    #[error("day {index} is numbered {found}, expected {expected}")]
    DayNumber { index: usize, found: u8, expected: u8 },
    #[error("day {day} has {found} habit entries, expected {expected}")]
    HabitCount { day: u8, found: usize, expected: usize },
}

impl Plan {
    /// Checks the invariants a well-formed plan must hold: exactly seven
    /// days numbered 1..7 in order, one habit entry per submitted habit.
    pub fn validate(&self, habit_count: usize) -> Result<(), PlanShapeError> {
        if self.days.len() != PLAN_DAYS {
            return Err(PlanShapeError::DayCount(self.days.len()));
        }
        for (index, day) in self.days.iter().enumerate() {
            let expected = (index + 1) as u8;
            if day.day != expected {
                return Err(PlanShapeError::DayNumber {
                    index,
                    found: day.day,
                    expected,
                });
            }
            if day.habits.len() != habit_count {
                return Err(PlanShapeError::HabitCount {
                    day: day.day,
                    found: day.habits.len(),
                    expected: habit_count,
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::fallback::generate_fallback;
    use crate::domain::habits::HabitList;

    fn habits(names: &[&str]) -> HabitList {
        HabitList::new(names.iter().map(|s| s.to_string())).unwrap()
    }

    #[test]
    fn test_fallback_plan_passes_validation() {
        let list = habits(&["Read", "Walk"]);
        let plan = generate_fallback(&list);
        assert!(plan.validate(list.len()).is_ok());
    }

    #[test]
    fn test_rejects_wrong_day_count() {
        let list = habits(&["Read"]);
        let mut plan = generate_fallback(&list);
        plan.days.pop();
        assert_eq!(plan.validate(1), Err(PlanShapeError::DayCount(6)));
    }

    #[test]
    fn test_rejects_out_of_order_days() {
        let list = habits(&["Read"]);
        let mut plan = generate_fallback(&list);
        plan.days[2].day = 5;
        assert_eq!(
            plan.validate(1),
            Err(PlanShapeError::DayNumber {
                index: 2,
                found: 5,
                expected: 3
            })
        );
    }

    #[test]
    fn test_rejects_habit_count_mismatch() {
        let list = habits(&["Read", "Walk"]);
        let mut plan = generate_fallback(&list);
        plan.days[6].habits.pop();
        assert_eq!(
            plan.validate(2),
            Err(PlanShapeError::HabitCount {
                day: 7,
                found: 1,
                expected: 2
            })
        );
    }
}
