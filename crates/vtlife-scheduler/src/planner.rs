//! Planning collaborator: supplies the unordered task list for a day.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::Deserialize;
use vtlife_core::{Result, VtlifeError};

use crate::tasks::Task;

/// Source of a day's tasks. Failures are the planner's own business: the
/// scheduler logs them and runs the day with an empty schedule.
pub trait Planner: Send {
    fn plan(&mut self, date: NaiveDate) -> Result<Vec<Task>>;
}

impl<F> Planner for F
where
    F: FnMut(NaiveDate) -> Result<Vec<Task>> + Send,
{
    fn plan(&mut self, date: NaiveDate) -> Result<Vec<Task>> {
        self(date)
    }
}

/// Reads `<dir>/<YYYY-MM-DD>.json`, one pre-generated todo list per day.
pub struct TodoListPlanner {
    dir: PathBuf,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum TodoList {
    Wrapped { tasks: Vec<Task> },
    Bare(Vec<Task>),
}

impl TodoListPlanner {
    pub fn new(dir: &Path) -> Self {
        Self {
            dir: dir.to_path_buf(),
        }
    }

    pub fn path_for(&self, date: NaiveDate) -> PathBuf {
        self.dir.join(format!("{}.json", date.format("%Y-%m-%d")))
    }
}

impl Planner for TodoListPlanner {
    fn plan(&mut self, date: NaiveDate) -> Result<Vec<Task>> {
        let path = self.path_for(date);
        let json = std::fs::read_to_string(&path)
            .map_err(|e| VtlifeError::Planner(format!("todo list {}: {e}", path.display())))?;
        let list: TodoList = serde_json::from_str(&json)
            .map_err(|e| VtlifeError::Planner(format!("todo list {}: {e}", path.display())))?;
        let tasks = match list {
            TodoList::Wrapped { tasks } | TodoList::Bare(tasks) => tasks,
        };
        tracing::info!("📋 Loaded {} tasks for {}", tasks.len(), date);
        Ok(tasks)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2077, 1, 1).unwrap()
    }

    #[test]
    fn test_reads_wrapped_todo_list() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("2077-01-01.json"),
            r#"{"tasks":[{"type":"tweet","category":"preview","start_time":"09:00","end_time":"09:10","content":"hi"}]}"#,
        )
        .unwrap();
        let mut planner = TodoListPlanner::new(dir.path());
        let tasks = planner.plan(date()).unwrap();
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].category, "preview");
    }

    #[test]
    fn test_reads_bare_array() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("2077-01-01.json"),
            r#"[{"type":"stream","start_time":"20:00","end_time":"22:00"}]"#,
        )
        .unwrap();
        let mut planner = TodoListPlanner::new(dir.path());
        assert_eq!(planner.plan(date()).unwrap().len(), 1);
    }

    #[test]
    fn test_missing_or_corrupt_is_planner_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut planner = TodoListPlanner::new(dir.path());
        assert!(matches!(planner.plan(date()), Err(VtlifeError::Planner(_))));

        std::fs::write(dir.path().join("2077-01-01.json"), "{{{").unwrap();
        assert!(matches!(planner.plan(date()), Err(VtlifeError::Planner(_))));
    }
}
