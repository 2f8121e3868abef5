//! Task management commands for CLI.

use busybee_core::{NewTask, Priority, TaskFilter, TaskSort};
use clap::Subcommand;

use super::{open_store, parse_instant};

#[derive(Subcommand)]
pub enum TaskAction {
    /// Create a new task
    Add {
        /// Task name
        name: String,
        /// Free-text notes
        #[arg(long)]
        notes: Option<String>,
        /// Priority: low, medium, or high (default: low)
        #[arg(long)]
        priority: Option<String>,
        /// Due date/time (YYYY-MM-DD[THH:MM])
        #[arg(long)]
        due: Option<String>,
        /// Comma-separated category names, created on demand
        #[arg(long)]
        categories: Option<String>,
    },
    /// List tasks
    List {
        /// Sort by: due, priority, or category (default: due)
        #[arg(long, default_value = "due")]
        sort: String,
        /// Filter by exact due date/time
        #[arg(long)]
        due: Option<String>,
        /// Filter by priority
        #[arg(long)]
        priority: Option<String>,
        /// Filter by category name
        #[arg(long)]
        category: Option<String>,
    },
    /// Get task details
    Get {
        /// Task ID
        id: String,
    },
    /// Update a task
    Update {
        /// Task ID
        id: String,
        /// New name
        name: String,
        #[arg(long)]
        notes: Option<String>,
        #[arg(long)]
        priority: Option<String>,
        #[arg(long)]
        due: Option<String>,
        #[arg(long)]
        categories: Option<String>,
    },
    /// Mark a task complete
    Done {
        /// Task ID
        id: String,
    },
    /// Mark a task not complete
    Reopen {
        /// Task ID
        id: String,
    },
    /// Delete a task
    Delete {
        /// Task ID
        id: String,
    },
}

fn parse_sort(raw: &str) -> Result<TaskSort, Box<dyn std::error::Error>> {
    match raw {
        "due" => Ok(TaskSort::DueDate),
        "priority" => Ok(TaskSort::Priority),
        "category" => Ok(TaskSort::Category),
        other => Err(format!("unknown sort '{other}' (expected due, priority, or category)").into()),
    }
}

/// Resolve comma-separated category names into ids, creating missing ones.
fn resolve_categories(
    store: &busybee_core::ScheduleStore,
    raw: Option<String>,
) -> Result<Vec<String>, Box<dyn std::error::Error>> {
    let mut ids = Vec::new();
    if let Some(raw) = raw {
        for name in raw.split(',').map(str::trim).filter(|n| !n.is_empty()) {
            ids.push(store.find_or_create_category(name, None)?.id);
        }
    }
    Ok(ids)
}

fn build_new_task(
    store: &busybee_core::ScheduleStore,
    name: String,
    notes: Option<String>,
    priority: Option<String>,
    due: Option<String>,
    categories: Option<String>,
) -> Result<NewTask, Box<dyn std::error::Error>> {
    Ok(NewTask {
        name,
        notes,
        priority: priority.as_deref().map(Priority::parse).transpose()?,
        due: due.as_deref().map(parse_instant).transpose()?,
        category_ids: resolve_categories(store, categories)?,
    })
}

pub fn run(action: TaskAction) -> Result<(), Box<dyn std::error::Error>> {
    let store = open_store()?;

    match action {
        TaskAction::Add {
            name,
            notes,
            priority,
            due,
            categories,
        } => {
            let new = build_new_task(&store, name, notes, priority, due, categories)?;
            let id = store.save_task(&new)?;
            println!("Task created: {id}");
        }
        TaskAction::List {
            sort,
            due,
            priority,
            category,
        } => {
            let filter = TaskFilter {
                due: due.as_deref().map(parse_instant).transpose()?,
                priority: priority.as_deref().map(Priority::parse).transpose()?,
                category,
            };
            let tasks = store.list_tasks(parse_sort(&sort)?, &filter)?;
            println!("{}", serde_json::to_string_pretty(&tasks)?);
        }
        TaskAction::Get { id } => match store.get_task(&id)? {
            Some(task) => println!("{}", serde_json::to_string_pretty(&task)?),
            None => println!("Task not found: {id}"),
        },
        TaskAction::Update {
            id,
            name,
            notes,
            priority,
            due,
            categories,
        } => {
            let new = build_new_task(&store, name, notes, priority, due, categories)?;
            store.update_task(&id, &new)?;
            println!("Task updated: {id}");
        }
        TaskAction::Done { id } => {
            store.toggle_task_complete(&id, true)?;
            println!("Task completed: {id}");
        }
        TaskAction::Reopen { id } => {
            store.toggle_task_complete(&id, false)?;
            println!("Task reopened: {id}");
        }
        TaskAction::Delete { id } => {
            store.delete_item(&id)?;
            println!("Task deleted: {id}");
        }
    }

    Ok(())
}
