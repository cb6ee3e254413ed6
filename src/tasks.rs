//! Task list state machine
//!
//! An ordered list of tasks with a cursor (`current_index`). The cursor is a
//! plain value re-clamped after every structural change, never a reference
//! into the list. When the list is empty the cursor is held at zero and means
//! "no current task".
//!
//! Every command is total. Out-of-range indices and commands on an empty list
//! leave the state untouched.

use crate::context::MainContext;
use crate::observable::{Observable, Subscription, lock};
use chrono::{Local, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};

/// Title reported when there is no current task
pub const NO_TASKS_TITLE: &str = "No tasks available";

/// Tasks a fresh list starts with
pub const DEFAULT_SEED_TITLES: [&str; 4] = [
    "Email triage",
    "Spec doc review",
    "Prototype create",
    "Break",
];

/// A single unit of work
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub title: String,
    pub is_completed: bool,
    /// Local time the task was created
    pub created_at: NaiveDateTime,
}

impl Task {
    /// Create an incomplete task
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            is_completed: false,
            created_at: Local::now().naive_local(),
        }
    }
}

#[derive(Debug, Clone, Default)]
struct TaskListState {
    tasks: Vec<Task>,
    current_index: usize,
}

impl TaskListState {
    fn from_seed(seed: &[String]) -> Self {
        Self {
            tasks: seed.iter().map(Task::new).collect(),
            current_index: 0,
        }
    }

    /// Convert a signed index into a position within the list
    fn position(&self, index: i64) -> Option<usize> {
        usize::try_from(index)
            .ok()
            .filter(|&position| position < self.tasks.len())
    }

    fn clamp_index(&mut self) {
        self.current_index = self
            .current_index
            .min(self.tasks.len().saturating_sub(1));
    }

    fn has_next(&self) -> bool {
        self.current_index + 1 < self.tasks.len()
    }
}

/// The ordered task list
///
/// Cloning yields another handle to the same list. Commands must be issued
/// from the designated execution context.
#[derive(Clone)]
pub struct TaskList {
    inner: Arc<TaskListInner>,
}

struct TaskListInner {
    seed: Vec<String>,
    state: Mutex<TaskListState>,
    tasks: Observable<Vec<Task>>,
    current_index: Observable<usize>,
}

impl TaskList {
    /// Create a list seeded with [`DEFAULT_SEED_TITLES`]
    pub fn new(context: MainContext) -> Self {
        let seed = DEFAULT_SEED_TITLES.iter().map(|t| t.to_string()).collect();
        Self::with_seed(context, seed)
    }

    /// Create a list seeded with `seed`; `reset_tasks()` restores it
    pub fn with_seed(context: MainContext, seed: Vec<String>) -> Self {
        let state = TaskListState::from_seed(&seed);
        let inner = TaskListInner {
            tasks: Observable::new(context.clone(), state.tasks.clone()),
            current_index: Observable::new(context, state.current_index),
            state: Mutex::new(state),
            seed,
        };
        Self {
            inner: Arc::new(inner),
        }
    }

    /// Apply `f` to the state and publish whatever changed
    fn mutate<R>(&self, f: impl FnOnce(&mut TaskListState) -> R) -> R {
        let mut state = lock(&self.inner.state);
        let result = f(&mut *state);
        self.inner.tasks.set_from(&state.tasks);
        self.inner.current_index.set(state.current_index);
        result
    }

    fn read<R>(&self, f: impl FnOnce(&TaskListState) -> R) -> R {
        f(&*lock(&self.inner.state))
    }

    // ---- navigation ----

    /// Move to the next task; ignored at the end of the list
    pub fn next_task(&self) {
        self.mutate(|state| {
            if state.has_next() {
                state.current_index += 1;
            }
        });
    }

    /// Move to the previous task; ignored at the start of the list
    pub fn previous_task(&self) {
        self.mutate(|state| {
            if state.current_index > 0 {
                state.current_index -= 1;
            }
        });
    }

    /// Jump to `index`; ignored unless `0 <= index < len`
    pub fn go_to_task(&self, index: i64) {
        self.mutate(|state| {
            if let Some(position) = state.position(index) {
                state.current_index = position;
            }
        });
    }

    // ---- structure ----

    /// Append an incomplete task; the cursor does not move
    pub fn add_task(&self, title: impl Into<String>) {
        let task = Task::new(title);
        tracing::debug!(title = %task.title, "task added");
        self.mutate(|state| state.tasks.push(task));
    }

    /// Remove the task at `index`; ignored when out of range
    ///
    /// The cursor follows the task it pointed at when an earlier task is
    /// removed. Removing the current task leaves the cursor on the task that
    /// slid into its place, or on the new last task.
    pub fn remove_task(&self, index: i64) {
        self.mutate(|state| {
            let Some(position) = state.position(index) else {
                return;
            };
            let removed = state.tasks.remove(position);
            if position < state.current_index {
                state.current_index -= 1;
            }
            state.clamp_index();
            tracing::debug!(title = %removed.title, remaining = state.tasks.len(), "task removed");
        });
    }

    /// Restore the seed tasks, all incomplete, with the cursor at the start
    pub fn reset_tasks(&self) {
        let seed = &self.inner.seed;
        self.mutate(|state| *state = TaskListState::from_seed(seed));
        tracing::debug!(task_count = seed.len(), "tasks reset");
    }

    // ---- completion ----

    /// Complete the current task and advance when a next task exists
    pub fn mark_current_task_completed(&self) {
        self.mutate(|state| {
            let index = state.current_index;
            let Some(task) = state.tasks.get_mut(index) else {
                return;
            };
            task.is_completed = true;
            if state.has_next() {
                state.current_index += 1;
            }
        });
    }

    /// Clear the completion flag on the current task
    pub fn mark_current_task_incomplete(&self) {
        self.mutate(|state| {
            let index = state.current_index;
            if let Some(task) = state.tasks.get_mut(index) {
                task.is_completed = false;
            }
        });
    }

    /// Flip the completion flag on the current task without advancing
    pub fn toggle_current_task_completion(&self) {
        self.mutate(|state| {
            let index = state.current_index;
            if let Some(task) = state.tasks.get_mut(index) {
                task.is_completed = !task.is_completed;
            }
        });
    }

    // ---- observation ----

    pub fn tasks(&self) -> Vec<Task> {
        self.read(|state| state.tasks.clone())
    }

    pub fn current_index(&self) -> usize {
        self.read(|state| state.current_index)
    }

    pub fn len(&self) -> usize {
        self.read(|state| state.tasks.len())
    }

    pub fn is_empty(&self) -> bool {
        self.read(|state| state.tasks.is_empty())
    }

    pub fn current_task(&self) -> Option<Task> {
        self.read(|state| state.tasks.get(state.current_index).cloned())
    }

    /// Title of the current task, or [`NO_TASKS_TITLE`]
    pub fn current_task_title(&self) -> String {
        self.current_task()
            .map(|task| task.title)
            .unwrap_or_else(|| NO_TASKS_TITLE.to_string())
    }

    pub fn has_next_task(&self) -> bool {
        self.read(TaskListState::has_next)
    }

    pub fn has_previous_task(&self) -> bool {
        self.read(|state| !state.tasks.is_empty() && state.current_index > 0)
    }

    pub fn completed_tasks_count(&self) -> usize {
        self.read(|state| state.tasks.iter().filter(|t| t.is_completed).count())
    }

    /// Completed share of the list; `0.0` when empty
    pub fn progress(&self) -> f64 {
        self.read(|state| {
            if state.tasks.is_empty() {
                return 0.0;
            }
            let completed = state.tasks.iter().filter(|t| t.is_completed).count();
            completed as f64 / state.tasks.len() as f64
        })
    }

    pub fn all_task_titles(&self) -> Vec<String> {
        self.titles_where(|_| true)
    }

    pub fn completed_task_titles(&self) -> Vec<String> {
        self.titles_where(|task| task.is_completed)
    }

    pub fn incomplete_task_titles(&self) -> Vec<String> {
        self.titles_where(|task| !task.is_completed)
    }

    fn titles_where(&self, keep: impl Fn(&Task) -> bool) -> Vec<String> {
        self.read(|state| {
            state
                .tasks
                .iter()
                .filter(|&task| keep(task))
                .map(|task| task.title.clone())
                .collect()
        })
    }

    pub fn subscribe_tasks<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&Vec<Task>) + Send + Sync + 'static,
    {
        self.inner.tasks.subscribe(callback)
    }

    pub fn subscribe_current_index<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&usize) + Send + Sync + 'static,
    {
        self.inner.current_index.subscribe(callback)
    }
}
