//! SQLite-based storage for events, tasks, recurrences, and categories.
//!
//! All write operations that touch more than one row run inside a single
//! transaction: either every row commits or none do. Queries return fully
//! materialized, ordered vectors.

use std::path::Path;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use rusqlite::{params, params_from_iter, Connection, OptionalExtension};
use uuid::Uuid;

use super::migrations;
use crate::error::{CoreError, Result, StorageError, ValidationError};
use crate::item::{Category, Event, Frequency, NewEvent, NewTask, Priority, Recurrence, Task};
use crate::recurrence::expand;

/// Stored text form of occurrence and due instants. Zero-padded, so
/// lexicographic order in SQL matches chronological order.
const INSTANT_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

fn format_instant(instant: NaiveDateTime) -> String {
    instant.format(INSTANT_FORMAT).to_string()
}

fn parse_instant(col: usize, raw: &str) -> Result<NaiveDateTime, rusqlite::Error> {
    NaiveDateTime::parse_from_str(raw, INSTANT_FORMAT).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(col, rusqlite::types::Type::Text, Box::new(e))
    })
}

/// Parse an audit timestamp from its RFC3339 string, falling back to the
/// current time on malformed data.
fn parse_timestamp_fallback(raw: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}

/// Sorting criteria for task listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskSort {
    /// Ascending by due date; tasks without one sort last.
    DueDate,
    /// High, then Medium, then Low.
    Priority,
    /// Ascending by the alphabetically-first associated category name;
    /// tasks without a category sort first (empty-string key).
    Category,
}

/// Filters for task listings. All present fields must match (logical AND).
#[derive(Debug, Clone, Default)]
pub struct TaskFilter {
    pub due: Option<NaiveDateTime>,
    pub priority: Option<Priority>,
    /// Matches tasks associated with a category of this name.
    pub category: Option<String>,
}

/// SQLite store for the BusyBee schedule.
///
/// Owns persistence of events, tasks, recurrences, and category links, and
/// answers queries with defined sort/filter semantics.
pub struct ScheduleStore {
    conn: Connection,
}

impl ScheduleStore {
    /// Open the store at the given database path.
    ///
    /// Creates the database file and schema if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let conn = Connection::open(path).map_err(|source| StorageError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        let store = Self { conn };
        store.migrate()?;
        Ok(store)
    }

    /// Open an in-memory store (for tests and throwaway sessions).
    ///
    /// # Errors
    /// Returns an error if the schema cannot be created.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(StorageError::from)?;
        let store = Self { conn };
        store.migrate()?;
        Ok(store)
    }

    /// Get a reference to the underlying SQLite connection.
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    fn migrate(&self) -> Result<()> {
        migrations::migrate(&self.conn)
            .map_err(|e| StorageError::MigrationFailed(e.to_string()))?;
        Ok(())
    }

    /// Run `work` inside a single transaction, rolling back on error.
    fn transaction<T>(
        &self,
        work: impl FnOnce() -> Result<T, rusqlite::Error>,
    ) -> Result<T> {
        self.conn.execute_batch("BEGIN IMMEDIATE TRANSACTION;")?;
        match work() {
            Ok(value) => {
                self.conn.execute_batch("COMMIT;")?;
                Ok(value)
            }
            Err(err) => {
                let _ = self.conn.execute_batch("ROLLBACK;");
                Err(err.into())
            }
        }
    }

    // === Events ===

    /// Save an event, fanning out into one row per occurrence when it
    /// repeats.
    ///
    /// With no repeat rule (or a single occurrence) exactly one event row is
    /// written and no recurrence record is created. Otherwise one recurrence
    /// row plus `times` event rows are written atomically, and the returned
    /// ids are in chronological order of their start instants.
    ///
    /// # Errors
    /// Returns a validation error for a blank name or a zero occurrence
    /// count, before anything is persisted.
    pub fn save_recurring_event(&self, new: &NewEvent) -> Result<Vec<String>> {
        if new.name.trim().is_empty() {
            return Err(ValidationError::EmptyField("name").into());
        }

        let series = match &new.repeat {
            Some(rule) if rule.times == 0 => return Err(ValidationError::ZeroOccurrences.into()),
            Some(rule) if rule.times > 1 => {
                Some((*rule, expand(new.start, rule.frequency, rule.times)?))
            }
            _ => None,
        };

        self.transaction(|| match &series {
            None => {
                let id = self.insert_event(new, new.start, None)?;
                Ok(vec![id])
            }
            Some((rule, instants)) => {
                // The recurrence row must exist before any event references it.
                let recurrence_id = Uuid::new_v4().to_string();
                self.conn.execute(
                    "INSERT INTO recurrences (id, frequency, times) VALUES (?1, ?2, ?3)",
                    params![recurrence_id, rule.frequency.as_str(), rule.times],
                )?;
                let mut ids = Vec::with_capacity(instants.len());
                for instant in instants {
                    ids.push(self.insert_event(new, *instant, Some(&recurrence_id))?);
                }
                Ok(ids)
            }
        })
    }

    fn insert_event(
        &self,
        new: &NewEvent,
        start: NaiveDateTime,
        recurrence_id: Option<&str>,
    ) -> Result<String, rusqlite::Error> {
        let id = Uuid::new_v4().to_string();
        let now = Utc::now().to_rfc3339();
        self.conn.execute(
            "INSERT INTO items (id, kind, name, notes, created_at, updated_at)
             VALUES (?1, 'EVENT', ?2, ?3, ?4, ?4)",
            params![id, new.name, new.notes, now],
        )?;
        self.conn.execute(
            "INSERT INTO events (item_id, place, start_time, recurrence_id)
             VALUES (?1, ?2, ?3, ?4)",
            params![id, new.place, format_instant(start), recurrence_id],
        )?;
        Ok(id)
    }

    /// Update a single event occurrence in place.
    ///
    /// The recurrence link is left untouched; any repeat rule on `new` is
    /// ignored here.
    ///
    /// # Errors
    /// Returns a not-found error for an unknown id.
    pub fn update_event(&self, id: &str, new: &NewEvent) -> Result<()> {
        if new.name.trim().is_empty() {
            return Err(ValidationError::EmptyField("name").into());
        }
        if self.get_event(id)?.is_none() {
            return Err(CoreError::NotFound {
                entity: "event",
                id: id.to_string(),
            });
        }

        self.transaction(|| {
            let now = Utc::now().to_rfc3339();
            self.conn.execute(
                "UPDATE items SET name = ?2, notes = ?3, updated_at = ?4 WHERE id = ?1",
                params![id, new.name, new.notes, now],
            )?;
            self.conn.execute(
                "UPDATE events SET place = ?2, start_time = ?3 WHERE item_id = ?1",
                params![id, new.place, format_instant(new.start)],
            )?;
            Ok(())
        })
    }

    /// Get an event by id.
    pub fn get_event(&self, id: &str) -> Result<Option<Event>> {
        let event = self
            .conn
            .query_row(
                "SELECT e.item_id, i.name, i.notes, e.place, e.start_time, e.recurrence_id,
                        i.created_at, i.updated_at
                 FROM events e JOIN items i ON i.id = e.item_id
                 WHERE e.item_id = ?1",
                params![id],
                row_to_event,
            )
            .optional()?;
        Ok(event)
    }

    /// List events whose start instant falls within the given month,
    /// ascending by start time.
    ///
    /// # Errors
    /// Returns an invalid-argument error for an out-of-range month.
    pub fn list_events_for_month(&self, year: i32, month: u32) -> Result<Vec<Event>> {
        let first = NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(|| {
            CoreError::InvalidArgument {
                field: "month",
                message: format!("{year}-{month} is not a valid month"),
            }
        })?;
        let next = if month == 12 {
            NaiveDate::from_ymd_opt(year + 1, 1, 1)
        } else {
            NaiveDate::from_ymd_opt(year, month + 1, 1)
        }
        .ok_or_else(|| CoreError::InvalidArgument {
            field: "month",
            message: format!("{year}-{month} has no following month"),
        })?;

        self.events_in_range(
            first.and_hms_opt(0, 0, 0).unwrap_or_default(),
            next.and_hms_opt(0, 0, 0).unwrap_or_default(),
        )
    }

    /// List events whose start instant falls on the given day, ascending by
    /// start time.
    pub fn list_events_for_day(&self, date: NaiveDate) -> Result<Vec<Event>> {
        let next = date.succ_opt().ok_or_else(|| CoreError::InvalidArgument {
            field: "date",
            message: format!("{date} has no following day"),
        })?;
        self.events_in_range(
            date.and_hms_opt(0, 0, 0).unwrap_or_default(),
            next.and_hms_opt(0, 0, 0).unwrap_or_default(),
        )
    }

    fn events_in_range(&self, start: NaiveDateTime, end: NaiveDateTime) -> Result<Vec<Event>> {
        let mut stmt = self.conn.prepare(
            "SELECT e.item_id, i.name, i.notes, e.place, e.start_time, e.recurrence_id,
                    i.created_at, i.updated_at
             FROM events e JOIN items i ON i.id = e.item_id
             WHERE e.start_time >= ?1 AND e.start_time < ?2
             ORDER BY e.start_time ASC",
        )?;
        let rows = stmt.query_map(
            params![format_instant(start), format_instant(end)],
            row_to_event,
        )?;
        let mut events = Vec::new();
        for row in rows {
            events.push(row?);
        }
        Ok(events)
    }

    /// All sibling occurrences of a recurrence, in chronological order.
    pub fn events_for_recurrence(&self, recurrence_id: &str) -> Result<Vec<Event>> {
        let mut stmt = self.conn.prepare(
            "SELECT e.item_id, i.name, i.notes, e.place, e.start_time, e.recurrence_id,
                    i.created_at, i.updated_at
             FROM events e JOIN items i ON i.id = e.item_id
             WHERE e.recurrence_id = ?1
             ORDER BY e.start_time ASC",
        )?;
        let rows = stmt.query_map(params![recurrence_id], row_to_event)?;
        let mut events = Vec::new();
        for row in rows {
            events.push(row?);
        }
        Ok(events)
    }

    /// Get a recurrence record by id.
    pub fn get_recurrence(&self, id: &str) -> Result<Option<Recurrence>> {
        let row = self
            .conn
            .query_row(
                "SELECT id, frequency, times FROM recurrences WHERE id = ?1",
                params![id],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, u32>(2)?,
                    ))
                },
            )
            .optional()?;
        match row {
            None => Ok(None),
            Some((id, frequency, times)) => Ok(Some(Recurrence {
                id,
                frequency: Frequency::parse(&frequency)?,
                times,
            })),
        }
    }

    // === Tasks ===

    /// Save a new task with its category associations.
    ///
    /// Priority defaults to low when unspecified.
    ///
    /// # Errors
    /// Returns a validation error for a blank name, before anything is
    /// persisted.
    pub fn save_task(&self, new: &NewTask) -> Result<String> {
        if new.name.trim().is_empty() {
            return Err(ValidationError::EmptyField("name").into());
        }

        let id = Uuid::new_v4().to_string();
        self.transaction(|| {
            let now = Utc::now().to_rfc3339();
            self.conn.execute(
                "INSERT INTO items (id, kind, name, notes, created_at, updated_at)
                 VALUES (?1, 'TASK', ?2, ?3, ?4, ?4)",
                params![id, new.name, new.notes, now],
            )?;
            self.conn.execute(
                "INSERT INTO tasks (item_id, complete, priority, due_date)
                 VALUES (?1, 0, ?2, ?3)",
                params![
                    id,
                    new.priority.unwrap_or_default().as_str(),
                    new.due.map(format_instant),
                ],
            )?;
            self.set_item_categories(&id, &new.category_ids)?;
            Ok(())
        })?;
        Ok(id)
    }

    /// Update a task in place, replacing its category association set.
    ///
    /// The completion flag is not touched here; use
    /// [`ScheduleStore::toggle_task_complete`].
    ///
    /// # Errors
    /// Returns a not-found error for an unknown id.
    pub fn update_task(&self, id: &str, new: &NewTask) -> Result<()> {
        if new.name.trim().is_empty() {
            return Err(ValidationError::EmptyField("name").into());
        }
        if self.get_task(id)?.is_none() {
            return Err(CoreError::NotFound {
                entity: "task",
                id: id.to_string(),
            });
        }

        self.transaction(|| {
            let now = Utc::now().to_rfc3339();
            self.conn.execute(
                "UPDATE items SET name = ?2, notes = ?3, updated_at = ?4 WHERE id = ?1",
                params![id, new.name, new.notes, now],
            )?;
            self.conn.execute(
                "UPDATE tasks SET priority = ?2, due_date = ?3 WHERE item_id = ?1",
                params![
                    id,
                    new.priority.unwrap_or_default().as_str(),
                    new.due.map(format_instant),
                ],
            )?;
            self.set_item_categories(id, &new.category_ids)?;
            Ok(())
        })
    }

    /// Get a task by id, including its category id set.
    pub fn get_task(&self, id: &str) -> Result<Option<Task>> {
        let task = self
            .conn
            .query_row(
                "SELECT t.item_id, i.name, i.notes, t.complete, t.priority, t.due_date,
                        i.created_at, i.updated_at
                 FROM tasks t JOIN items i ON i.id = t.item_id
                 WHERE t.item_id = ?1",
                params![id],
                row_to_task,
            )
            .optional()?;
        match task {
            None => Ok(None),
            Some(mut task) => {
                task.category_ids = self.load_item_categories(id)?;
                Ok(Some(task))
            }
        }
    }

    /// Set the completion flag of a task. Touches no other column.
    ///
    /// # Errors
    /// Returns a not-found error if the task does not exist.
    pub fn toggle_task_complete(&self, id: &str, complete: bool) -> Result<()> {
        let changed = self.conn.execute(
            "UPDATE tasks SET complete = ?2 WHERE item_id = ?1",
            params![id, complete],
        )?;
        if changed == 0 {
            return Err(CoreError::NotFound {
                entity: "task",
                id: id.to_string(),
            });
        }
        Ok(())
    }

    /// List tasks sorted by `sort`, narrowed by `filter` (all present
    /// filter fields must match).
    pub fn list_tasks(&self, sort: TaskSort, filter: &TaskFilter) -> Result<Vec<Task>> {
        let mut sql = String::from(
            "SELECT t.item_id, i.name, i.notes, t.complete, t.priority, t.due_date,
                    i.created_at, i.updated_at
             FROM tasks t JOIN items i ON i.id = t.item_id",
        );

        let mut clauses: Vec<&str> = Vec::new();
        let mut values: Vec<String> = Vec::new();
        if let Some(due) = filter.due {
            clauses.push("t.due_date = ?");
            values.push(format_instant(due));
        }
        if let Some(priority) = filter.priority {
            clauses.push("t.priority = ?");
            values.push(priority.as_str().to_string());
        }
        if let Some(category) = &filter.category {
            clauses.push(
                "EXISTS (SELECT 1 FROM item_categories ic
                         JOIN categories c ON c.id = ic.category_id
                         WHERE ic.item_id = t.item_id AND c.name = ?)",
            );
            values.push(category.clone());
        }
        if !clauses.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&clauses.join(" AND "));
        }

        sql.push_str(match sort {
            TaskSort::DueDate => " ORDER BY t.due_date IS NULL, t.due_date ASC",
            TaskSort::Priority => {
                " ORDER BY CASE t.priority
                     WHEN 'HIGH' THEN 1 WHEN 'MEDIUM' THEN 2 WHEN 'LOW' THEN 3 ELSE 4
                   END"
            }
            TaskSort::Category => {
                " ORDER BY COALESCE((SELECT MIN(c.name) FROM item_categories ic
                                     JOIN categories c ON c.id = ic.category_id
                                     WHERE ic.item_id = t.item_id), '') ASC"
            }
        });

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params_from_iter(values.iter()), row_to_task)?;
        let mut tasks = Vec::new();
        for row in rows {
            tasks.push(row?);
        }
        for task in &mut tasks {
            task.category_ids = self.load_item_categories(&task.id)?;
        }
        Ok(tasks)
    }

    // === Items ===

    /// Delete an event or task by id, including its category links.
    ///
    /// A recurrence row is never cascade-deleted here, even when its last
    /// occurrence goes away.
    ///
    /// # Errors
    /// Returns a not-found error for an unknown id.
    pub fn delete_item(&self, id: &str) -> Result<()> {
        let exists: Option<String> = self
            .conn
            .query_row(
                "SELECT kind FROM items WHERE id = ?1",
                params![id],
                |row| row.get(0),
            )
            .optional()?;
        if exists.is_none() {
            return Err(CoreError::NotFound {
                entity: "item",
                id: id.to_string(),
            });
        }

        self.transaction(|| {
            self.conn.execute(
                "DELETE FROM item_categories WHERE item_id = ?1",
                params![id],
            )?;
            self.conn
                .execute("DELETE FROM events WHERE item_id = ?1", params![id])?;
            self.conn
                .execute("DELETE FROM tasks WHERE item_id = ?1", params![id])?;
            self.conn
                .execute("DELETE FROM items WHERE id = ?1", params![id])?;
            Ok(())
        })
    }

    // === Categories ===

    /// Find a category by exact name, creating it on demand.
    ///
    /// Categories are never auto-deleted when unused.
    ///
    /// # Errors
    /// Returns a validation error for a blank name.
    pub fn find_or_create_category(
        &self,
        name: &str,
        color_hex: Option<&str>,
    ) -> Result<Category> {
        if name.trim().is_empty() {
            return Err(ValidationError::EmptyField("name").into());
        }

        let existing = self
            .conn
            .query_row(
                "SELECT id, name, color_hex, created_at, updated_at
                 FROM categories WHERE name = ?1",
                params![name],
                row_to_category,
            )
            .optional()?;
        if let Some(category) = existing {
            return Ok(category);
        }

        let id = Uuid::new_v4().to_string();
        let now = Utc::now();
        let color = color_hex.unwrap_or("FFFFFF");
        self.conn.execute(
            "INSERT INTO categories (id, name, color_hex, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?4)",
            params![id, name, color, now.to_rfc3339()],
        )?;
        Ok(Category {
            id,
            name: name.to_string(),
            color_hex: color.to_string(),
            created_at: now,
            updated_at: now,
        })
    }

    /// List all categories, ascending by name.
    pub fn list_categories(&self) -> Result<Vec<Category>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, color_hex, created_at, updated_at
             FROM categories ORDER BY name ASC",
        )?;
        let rows = stmt.query_map([], row_to_category)?;
        let mut categories = Vec::new();
        for row in rows {
            categories.push(row?);
        }
        Ok(categories)
    }

    /// Categories associated with an item, ascending by name.
    pub fn categories_for_item(&self, item_id: &str) -> Result<Vec<Category>> {
        let mut stmt = self.conn.prepare(
            "SELECT c.id, c.name, c.color_hex, c.created_at, c.updated_at
             FROM categories c
             JOIN item_categories ic ON ic.category_id = c.id
             WHERE ic.item_id = ?1
             ORDER BY c.name ASC",
        )?;
        let rows = stmt.query_map(params![item_id], row_to_category)?;
        let mut categories = Vec::new();
        for row in rows {
            categories.push(row?);
        }
        Ok(categories)
    }

    fn set_item_categories(
        &self,
        item_id: &str,
        category_ids: &[String],
    ) -> Result<(), rusqlite::Error> {
        self.conn.execute(
            "DELETE FROM item_categories WHERE item_id = ?1",
            params![item_id],
        )?;
        for category_id in category_ids {
            self.conn.execute(
                "INSERT OR IGNORE INTO item_categories (item_id, category_id) VALUES (?1, ?2)",
                params![item_id, category_id],
            )?;
        }
        Ok(())
    }

    fn load_item_categories(&self, item_id: &str) -> Result<Vec<String>, rusqlite::Error> {
        let mut stmt = self.conn.prepare(
            "SELECT ic.category_id FROM item_categories ic
             JOIN categories c ON c.id = ic.category_id
             WHERE ic.item_id = ?1
             ORDER BY c.name ASC",
        )?;
        let mut rows = stmt.query(params![item_id])?;
        let mut ids = Vec::new();
        while let Some(row) = rows.next()? {
            ids.push(row.get(0)?);
        }
        Ok(ids)
    }
}

/// Build an Event from a joined events/items row.
fn row_to_event(row: &rusqlite::Row) -> Result<Event, rusqlite::Error> {
    let start_raw: String = row.get(4)?;
    Ok(Event {
        id: row.get(0)?,
        name: row.get(1)?,
        notes: row.get(2)?,
        place: row.get(3)?,
        start: parse_instant(4, &start_raw)?,
        recurrence_id: row.get(5)?,
        created_at: parse_timestamp_fallback(&row.get::<_, String>(6)?),
        updated_at: parse_timestamp_fallback(&row.get::<_, String>(7)?),
    })
}

/// Build a Task from a joined tasks/items row. Category ids are loaded
/// separately.
fn row_to_task(row: &rusqlite::Row) -> Result<Task, rusqlite::Error> {
    let priority_raw: String = row.get(4)?;
    let priority = Priority::parse(&priority_raw).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(
            4,
            rusqlite::types::Type::Text,
            format!("{e}").into(),
        )
    })?;
    let due_raw: Option<String> = row.get(5)?;
    let due = match due_raw {
        Some(raw) => Some(parse_instant(5, &raw)?),
        None => None,
    };
    Ok(Task {
        id: row.get(0)?,
        name: row.get(1)?,
        notes: row.get(2)?,
        complete: row.get(3)?,
        priority,
        due,
        category_ids: Vec::new(),
        created_at: parse_timestamp_fallback(&row.get::<_, String>(6)?),
        updated_at: parse_timestamp_fallback(&row.get::<_, String>(7)?),
    })
}

fn row_to_category(row: &rusqlite::Row) -> Result<Category, rusqlite::Error> {
    Ok(Category {
        id: row.get(0)?,
        name: row.get(1)?,
        color_hex: row.get(2)?,
        created_at: parse_timestamp_fallback(&row.get::<_, String>(3)?),
        updated_at: parse_timestamp_fallback(&row.get::<_, String>(4)?),
    })
}
