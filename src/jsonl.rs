// JSONL export and import of task lists

use crate::models::{Task, TaskId};
use eyre::{Context, Result};
use fs2::FileExt;
use std::collections::HashSet;
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;
use tracing::{info, warn};

/// Write `tasks` to `path`, one JSON object per line
///
/// Replaces any existing file content. Returns the number of tasks written.
pub fn export_jsonl(path: &Path, tasks: &[Task]) -> Result<usize> {
    let file = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(false)
        .open(path)
        .with_context(|| format!("Failed to open {} for export", path.display()))?;

    // Truncate only once the lock is held
    file.lock_exclusive().context("Failed to acquire file lock")?;
    file.set_len(0).context("Failed to truncate export file")?;

    let mut writer = BufWriter::new(&file);
    for task in tasks {
        let json = serde_json::to_string(task)?;
        writeln!(writer, "{}", json)?;
    }
    writer.flush()?;
    drop(writer);

    file.sync_all()?;

    info!(file = ?path, count = tasks.len(), "Exported tasks");
    Ok(tasks.len())
}

/// Read tasks from a JSONL file in file order
///
/// Blank lines are ignored. Lines that fail to parse, and lines repeating an
/// id already seen, are skipped with a warning.
pub fn read_jsonl(path: &Path) -> Result<Vec<Task>> {
    let file = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    let reader = BufReader::new(file);

    let mut tasks = Vec::new();
    let mut seen: HashSet<TaskId> = HashSet::new();

    for (line_num, line) in reader.lines().enumerate() {
        let line = match line {
            Ok(l) => l,
            Err(e) => {
                warn!(
                    file = ?path,
                    line = line_num + 1,
                    error = ?e,
                    "Failed to read line, skipping"
                );
                continue;
            }
        };

        if line.trim().is_empty() {
            continue;
        }

        let task: Task = match serde_json::from_str(&line) {
            Ok(t) => t,
            Err(e) => {
                warn!(
                    file = ?path,
                    line = line_num + 1,
                    error = ?e,
                    "Failed to parse task, skipping"
                );
                continue;
            }
        };

        if !seen.insert(task.id) {
            warn!(file = ?path, line = line_num + 1, id = task.id, "Repeated task id, skipping");
            continue;
        }

        tasks.push(task);
    }

    info!(file = ?path, count = tasks.len(), "Read tasks from JSONL");

    Ok(tasks)
}
