//! Task-directory bookkeeping
//!
//! A task groups one review cycle: its own input, intermediate, and final
//! folders under the task root, tracked in a single `index.json`. Status
//! transitions are coarse ({created, running, completed, failed}) and only
//! meaningful to humans inspecting the index.

use crate::error::{CliError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

/// One extraction/review cycle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    /// Short random identifier
    pub id: String,
    /// Human-readable label
    pub name: String,
    /// Party treated as "us" for this task
    pub my_party: String,
    /// RFC 3339 creation timestamp
    pub created_at: String,
    /// Coarse lifecycle status
    pub status: String,
    /// Last status detail, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Contracts to process
    pub input_dir: PathBuf,
    /// Per-document records
    pub intermediate_dir: PathBuf,
    /// Aggregated tables
    pub final_dir: PathBuf,
}

/// Manages tasks under one root directory
pub struct TaskManager {
    root: PathBuf,
    index_path: PathBuf,
}

impl TaskManager {
    /// Open (creating if needed) a task root
    pub fn new(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        let index_path = root.join("index.json");
        Ok(Self { root, index_path })
    }

    fn load_index(&self) -> Result<HashMap<String, Task>> {
        if !self.index_path.exists() {
            return Ok(HashMap::new());
        }
        let payload = fs::read_to_string(&self.index_path)?;
        Ok(serde_json::from_str(&payload)?)
    }

    fn save_index(&self, index: &HashMap<String, Task>) -> Result<()> {
        let payload = serde_json::to_string_pretty(index)?;
        fs::write(&self.index_path, payload)?;
        Ok(())
    }

    /// Create a task with its folder skeleton
    pub fn create_task(&self, name: &str, my_party: &str) -> Result<Task> {
        let mut index = self.load_index()?;
        let id = uuid::Uuid::new_v4().simple().to_string()[..8].to_string();
        let task_dir = self.root.join(&id);
        let input_dir = task_dir.join("input");
        let intermediate_dir = task_dir.join("intermediate");
        let final_dir = task_dir.join("final");
        for dir in [&input_dir, &intermediate_dir, &final_dir] {
            fs::create_dir_all(dir)?;
        }

        let task = Task {
            id: id.clone(),
            name: name.to_string(),
            my_party: my_party.to_string(),
            created_at: chrono::Utc::now().to_rfc3339(),
            status: "created".to_string(),
            message: None,
            input_dir,
            intermediate_dir,
            final_dir,
        };
        index.insert(id, task.clone());
        self.save_index(&index)?;
        Ok(task)
    }

    /// All tasks, oldest first
    pub fn list_tasks(&self) -> Result<Vec<Task>> {
        let mut tasks: Vec<Task> = self.load_index()?.into_values().collect();
        tasks.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(tasks)
    }

    /// Look up one task
    pub fn get_task(&self, task_id: &str) -> Result<Task> {
        self.load_index()?
            .remove(task_id)
            .ok_or_else(|| CliError::TaskNotFound(task_id.to_string()))
    }

    /// Record a status transition
    pub fn update_status(
        &self,
        task_id: &str,
        status: &str,
        message: Option<String>,
    ) -> Result<Task> {
        let mut index = self.load_index()?;
        let task = index
            .get_mut(task_id)
            .ok_or_else(|| CliError::TaskNotFound(task_id.to_string()))?;
        task.status = status.to_string();
        task.message = message;
        let updated = task.clone();
        self.save_index(&index)?;
        Ok(updated)
    }
}

/// Default task root relative to the working directory
pub fn default_task_root() -> &'static Path {
    Path::new("tasks")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_builds_folder_skeleton() {
        let dir = tempfile::tempdir().unwrap();
        let manager = TaskManager::new(dir.path().join("tasks")).unwrap();
        let task = manager.create_task("六月批次", "上海玄霆").unwrap();

        assert_eq!(task.id.len(), 8);
        assert_eq!(task.status, "created");
        assert!(task.input_dir.is_dir());
        assert!(task.intermediate_dir.is_dir());
        assert!(task.final_dir.is_dir());
    }

    #[test]
    fn index_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("tasks");
        let id = {
            let manager = TaskManager::new(&root).unwrap();
            manager.create_task("batch", "party").unwrap().id
        };

        let manager = TaskManager::new(&root).unwrap();
        let task = manager.get_task(&id).unwrap();
        assert_eq!(task.name, "batch");
        assert_eq!(manager.list_tasks().unwrap().len(), 1);
    }

    #[test]
    fn update_status_records_message() {
        let dir = tempfile::tempdir().unwrap();
        let manager = TaskManager::new(dir.path().join("tasks")).unwrap();
        let task = manager.create_task("batch", "party").unwrap();

        let updated = manager
            .update_status(&task.id, "failed", Some("gateway timeout".to_string()))
            .unwrap();
        assert_eq!(updated.status, "failed");
        assert_eq!(updated.message.as_deref(), Some("gateway timeout"));

        assert!(matches!(
            manager.get_task("missing"),
            Err(CliError::TaskNotFound(_))
        ));
    }
}
