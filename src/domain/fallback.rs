//! Deterministic plan generation used whenever the remote coach is
//! unavailable or returns something unusable. Pure and infallible.

use crate::domain::habits::HabitList;
use crate::domain::plan::{DayPlan, HabitEntry, Plan, PLAN_DAYS};

/// One tip per day, rotated by day index regardless of habit content.
const DAILY_TIPS: [&str; PLAN_DAYS] = [
    "Start small, think big! Every journey begins with a single step.",
    "Consistency beats perfection. Focus on showing up every day.",
    "Your future self will thank you for the habits you build today.",
    "Progress, not perfection. Celebrate small wins along the way.",
    "Habits are the compound interest of self-improvement.",
    "The best time to start was yesterday. The second best time is now.",
    "You're building a better version of yourself, one day at a time.",
];

/// A keyword category and its per-day task progression. Categories are
/// checked in declaration order; the first match wins.
struct TaskProgression {
    keywords: &'static [&'static str],
    tasks: [&'static str; PLAN_DAYS],
}

const PROGRESSIONS: [TaskProgression; 3] = [
    TaskProgression {
        keywords: &["water"],
        tasks: [
            "Drink 2 glasses of water",
            "Carry a water bottle",
            "Set hourly water reminders",
            "Drink water before meals",
            "Track your intake",
            "Try infused water",
            "Celebrate your hydration success",
        ],
    },
    TaskProgression {
        keywords: &["walk", "exercise"],
        tasks: [
            "Take a 10-minute walk",
            "Walk for 15 minutes",
            "Try a 20-minute walk",
            "Walk 25 minutes today",
            "Go for a 30-minute walk",
            "Add some hills or stairs",
            "Reflect on your progress",
        ],
    },
    TaskProgression {
        keywords: &["sleep"],
        tasks: [
            "Set a bedtime alarm",
            "Create a wind-down routine",
            "Put devices away 1 hour early",
            "Try reading before bed",
            "Practice deep breathing",
            "Keep your room cool and dark",
            "Review your sleep improvements",
        ],
    },
];

/// Case-insensitive substring match against the category tables, falling
/// back to a generic progression that interpolates the habit name.
fn task_for(habit: &str, day: usize) -> String {
    let lowered = habit.to_lowercase();
    let matched = PROGRESSIONS
        .iter()
        .find(|p| p.keywords.iter().any(|k| lowered.contains(k)));

    match matched {
        Some(progression) => progression
            .tasks
            .get(day - 1)
            .map(|task| (*task).to_string())
            .unwrap_or_else(|| format!("Continue practicing {habit}")),
        None => generic_task(habit, day),
    }
}

fn generic_task(habit: &str, day: usize) -> String {
    match day {
        1 => format!("Practice {habit} for 5 minutes"),
        2 => format!("Spend 10 minutes on {habit}"),
        3 => format!("Dedicate 15 minutes to {habit}"),
        4 => format!("Work on {habit} for 20 minutes"),
        5 => format!("Focus on {habit} for 25 minutes"),
        6 => format!("Spend 30 minutes with {habit}"),
        _ => format!("Reflect on your {habit} journey"),
    }
}

pub fn generate_fallback(habits: &HabitList) -> Plan {
    let days = (1..=PLAN_DAYS)
        .map(|day| DayPlan {
            day: day as u8,
            date_label: format!("Day {day}"),
            habits: habits
                .iter()
                .map(|habit| HabitEntry {
                    habit: habit.clone(),
                    task: task_for(habit, day),
                    motivation: format!("You're doing great with {habit}! Keep it up!"),
                })
                .collect(),
            daily_tip: DAILY_TIPS[day - 1].to_string(),
        })
        .collect();

    Plan {
        overview: format!(
            "Your personalized 7-day plan to build these amazing habits: {}. \
             Remember, consistency is key!",
            habits.joined()
        ),
        days,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn habits(names: &[&str]) -> HabitList {
        HabitList::new(names.iter().map(|s| s.to_string())).unwrap()
    }

    #[test]
    fn test_always_seven_days_with_matching_habit_rows() {
        for names in [
            vec!["Drink more water"],
            vec!["Read", "Walk"],
            vec!["Read", "Walk", "Sleep better"],
        ] {
            let list = habits(&names);
            let plan = generate_fallback(&list);
            assert_eq!(plan.days.len(), 7);
            for (index, day) in plan.days.iter().enumerate() {
                assert_eq!(day.day as usize, index + 1);
                assert_eq!(day.date_label, format!("Day {}", index + 1));
                assert_eq!(day.habits.len(), names.len());
                for (entry, name) in day.habits.iter().zip(&names) {
                    assert_eq!(entry.habit, *name);
                }
            }
        }
    }

    #[test]
    fn test_deterministic() {
        let list = habits(&["Journaling", "Evening walk"]);
        assert_eq!(generate_fallback(&list), generate_fallback(&list));
    }

    #[test]
    fn test_water_progression() {
        let plan = generate_fallback(&habits(&["Drink more water"]));
        assert_eq!(plan.days[0].habits[0].task, "Drink 2 glasses of water");
    }

    #[test]
    fn test_walk_progression_day_three() {
        let plan = generate_fallback(&habits(&["Evening walk"]));
        assert_eq!(plan.days[2].habits[0].task, "Try a 20-minute walk");
    }

    #[test]
    fn test_exercise_matches_walk_category() {
        let plan = generate_fallback(&habits(&["Morning exercise"]));
        assert_eq!(plan.days[0].habits[0].task, "Take a 10-minute walk");
    }

    #[test]
    fn test_sleep_progression() {
        let plan = generate_fallback(&habits(&["Better sleep"]));
        assert_eq!(plan.days[0].habits[0].task, "Set a bedtime alarm");
    }

    #[test]
    fn test_generic_progression_interpolates_habit() {
        let plan = generate_fallback(&habits(&["Journaling"]));
        let task = &plan.days[1].habits[0].task;
        assert!(task.contains("10 minutes"));
        assert!(task.contains("Journaling"));
    }

    #[test]
    fn test_water_wins_priority_tie() {
        let plan = generate_fallback(&habits(&["walk to get water"]));
        assert_eq!(plan.days[0].habits[0].task, "Drink 2 glasses of water");
    }

    #[test]
    fn test_matching_is_case_insensitive() {
        let plan = generate_fallback(&habits(&["MORE WATER"]));
        assert_eq!(plan.days[0].habits[0].task, "Drink 2 glasses of water");
    }

    #[test]
    fn test_daily_tips_independent_of_habits() {
        let a = generate_fallback(&habits(&["X"]));
        let b = generate_fallback(&habits(&["Y"]));
        let tips_a: Vec<_> = a.days.iter().map(|d| &d.daily_tip).collect();
        let tips_b: Vec<_> = b.days.iter().map(|d| &d.daily_tip).collect();
        assert_eq!(tips_a, tips_b);
        assert_eq!(*tips_a[0], DAILY_TIPS[0]);
        assert_eq!(*tips_a[6], DAILY_TIPS[6]);
    }

    #[test]
    fn test_motivation_names_the_habit() {
        let plan = generate_fallback(&habits(&["Stretching"]));
        assert_eq!(
            plan.days[4].habits[0].motivation,
            "You're doing great with Stretching! Keep it up!"
        );
    }

    #[test]
    fn test_overview_lists_all_habits() {
        let plan = generate_fallback(&habits(&["Read", "Walk"]));
        assert!(plan.overview.contains("Read, Walk"));
    }
}
