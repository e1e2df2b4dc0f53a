// Task record and partition types

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Date format used for the `date` column
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// A single to-do entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: i64,
    pub done: bool,
    pub value: String,
    pub date: String,
}

impl Task {
    /// Which partition this task currently belongs to
    pub fn status(&self) -> Status {
        Status::from(self.done)
    }

    /// Parsed creation date, if the stored string is well formed
    pub fn created_on(&self) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(&self.date, DATE_FORMAT).ok()
    }
}

/// The two disjoint partitions a task can live in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Pending,
    Completed,
}

impl Status {
    pub fn is_done(self) -> bool {
        matches!(self, Status::Completed)
    }
}

impl From<bool> for Status {
    fn from(done: bool) -> Self {
        if done { Status::Completed } else { Status::Pending }
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Status::Pending => write!(f, "pending"),
            Status::Completed => write!(f, "completed"),
        }
    }
}

/// Both partitions read from the same snapshot
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Partitions {
    pub pending: Vec<Task>,
    pub completed: Vec<Task>,
}

impl Partitions {
    pub fn len(&self) -> usize {
        self.pending.len() + self.completed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty() && self.completed.is_empty()
    }

    /// Find a task by id in either partition
    pub fn find(&self, id: i64) -> Option<&Task> {
        self.pending.iter().chain(self.completed.iter()).find(|t| t.id == id)
    }
}

/// Today's UTC calendar date formatted as `YYYY-MM-DD`
pub fn today() -> String {
    Utc::now().date_naive().format(DATE_FORMAT).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task(id: i64, done: bool) -> Task {
        Task {
            id,
            done,
            value: format!("task {}", id),
            date: "2024-03-09".to_string(),
        }
    }

    #[test]
    fn test_status_from_done_flag() {
        assert_eq!(Status::from(false), Status::Pending);
        assert_eq!(Status::from(true), Status::Completed);
        assert!(Status::Completed.is_done());
        assert!(!Status::Pending.is_done());
        assert_eq!(task(1, true).status(), Status::Completed);
    }

    #[test]
    fn test_status_display_and_serialization() {
        assert_eq!(Status::Pending.to_string(), "pending");
        assert_eq!(serde_json::to_string(&Status::Completed).unwrap(), "\"completed\"");
    }

    #[test]
    fn test_today_format() {
        let date = today();
        assert_eq!(date.len(), 10);
        assert!(NaiveDate::parse_from_str(&date, DATE_FORMAT).is_ok());
    }

    #[test]
    fn test_created_on() {
        let t = task(1, false);
        assert_eq!(t.created_on(), NaiveDate::from_ymd_opt(2024, 3, 9));

        let bad = Task {
            date: "yesterday".to_string(),
            ..t
        };
        assert!(bad.created_on().is_none());
    }

    #[test]
    fn test_partitions_find() {
        let parts = Partitions {
            pending: vec![task(1, false)],
            completed: vec![task(2, true)],
        };

        assert_eq!(parts.len(), 2);
        assert!(!parts.is_empty());
        assert_eq!(parts.find(2).map(|t| t.done), Some(true));
        assert!(parts.find(3).is_none());
        assert!(Partitions::default().is_empty());
    }

    #[test]
    fn test_task_serialization() {
        let t = task(7, false);
        let json = serde_json::to_string(&t).unwrap();
        assert_eq!(json, r#"{"id":7,"done":false,"value":"task 7","date":"2024-03-09"}"#);
    }
}
