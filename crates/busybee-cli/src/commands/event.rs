//! Calendar event commands for CLI.

use busybee_core::{Frequency, NewEvent, RecurrenceRule};
use chrono::NaiveDate;
use clap::Subcommand;

use super::{open_store, parse_instant};

#[derive(Subcommand)]
pub enum EventAction {
    /// Create an event, optionally repeating
    Add {
        /// Event name
        name: String,
        /// Start date/time (YYYY-MM-DD[THH:MM])
        start: String,
        /// Free-text notes
        #[arg(long)]
        notes: Option<String>,
        /// Place of the event
        #[arg(long)]
        place: Option<String>,
        /// Repeat frequency: daily, weekly, monthly, or yearly
        #[arg(long)]
        repeat: Option<String>,
        /// Total number of occurrences, including the first
        #[arg(long, default_value = "1")]
        times: u32,
    },
    /// List events in a month
    Month {
        year: i32,
        month: u32,
    },
    /// List events on a day (YYYY-MM-DD)
    Day {
        date: String,
    },
    /// Get event details
    Get {
        /// Event ID
        id: String,
    },
    /// Update a single event occurrence
    Update {
        /// Event ID
        id: String,
        /// New name
        name: String,
        /// New start date/time (YYYY-MM-DD[THH:MM])
        start: String,
        #[arg(long)]
        notes: Option<String>,
        #[arg(long)]
        place: Option<String>,
    },
    /// Show all occurrences of a repeating series
    Series {
        /// Recurrence ID (from an event's recurrence_id)
        id: String,
    },
    /// Delete an event occurrence
    Delete {
        /// Event ID
        id: String,
    },
}

pub fn run(action: EventAction) -> Result<(), Box<dyn std::error::Error>> {
    let store = open_store()?;

    match action {
        EventAction::Add {
            name,
            start,
            notes,
            place,
            repeat,
            times,
        } => {
            let repeat = match repeat {
                Some(raw) => Some(RecurrenceRule {
                    frequency: Frequency::parse(&raw)?,
                    times,
                }),
                None => None,
            };
            let ids = store.save_recurring_event(&NewEvent {
                name,
                notes,
                place,
                start: parse_instant(&start)?,
                repeat,
            })?;
            println!("Created {} event(s):", ids.len());
            for id in ids {
                println!("{id}");
            }
        }
        EventAction::Month { year, month } => {
            let events = store.list_events_for_month(year, month)?;
            println!("{}", serde_json::to_string_pretty(&events)?);
        }
        EventAction::Day { date } => {
            let date = NaiveDate::parse_from_str(&date, "%Y-%m-%d")?;
            let events = store.list_events_for_day(date)?;
            println!("{}", serde_json::to_string_pretty(&events)?);
        }
        EventAction::Get { id } => match store.get_event(&id)? {
            Some(event) => println!("{}", serde_json::to_string_pretty(&event)?),
            None => println!("Event not found: {id}"),
        },
        EventAction::Update {
            id,
            name,
            start,
            notes,
            place,
        } => {
            store.update_event(
                &id,
                &NewEvent {
                    name,
                    notes,
                    place,
                    start: parse_instant(&start)?,
                    repeat: None,
                },
            )?;
            println!("Event updated: {id}");
        }
        EventAction::Series { id } => {
            let events = store.events_for_recurrence(&id)?;
            println!("{}", serde_json::to_string_pretty(&events)?);
        }
        EventAction::Delete { id } => {
            store.delete_item(&id)?;
            println!("Event deleted: {id}");
        }
    }

    Ok(())
}
