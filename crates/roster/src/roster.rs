//! Roster loading and lookup.

use std::collections::{BTreeMap, HashMap};
use std::io::Read;
use std::path::Path;

use checkin_common::config::RosterConfig;
use checkin_common::error::{CheckinError, CheckinResult};
use serde::{Deserialize, Serialize};

use crate::identifier::Identifier;

/// One registrant row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attendee {
    /// Line number in the source file (header is line 1).
    pub row: u64,

    /// Order identifier exactly as exported.
    pub order_id: String,

    /// Truncated lookup key derived from `order_id`.
    pub id: Identifier,

    pub first_name: String,
    pub last_name: String,

    /// Ticket type as exported.
    pub ticket_type: Option<String>,

    /// Badge label after label rewriting.
    pub category: Option<String>,
}

/// The loaded attendee table. Immutable after load.
#[derive(Debug, Clone, Default)]
pub struct Roster {
    attendees: Vec<Attendee>,
    index: HashMap<Identifier, usize>,
    duplicates: Vec<Identifier>,
}

struct ColumnIndexes {
    order_id: usize,
    first_name: usize,
    last_name: usize,
    ticket_type: Option<usize>,
}

impl Roster {
    /// Load the roster from a CSV file.
    ///
    /// Fails if the file is missing, malformed, or lacks a configured column.
    pub fn load(path: &Path, config: &RosterConfig) -> CheckinResult<Self> {
        if !path.exists() {
            return Err(CheckinError::file_not_found(path));
        }
        let file = std::fs::File::open(path)?;
        let roster = Self::from_reader(file, config)?;

        tracing::info!(
            path = %path.display(),
            attendees = roster.len(),
            duplicates = roster.duplicates.len(),
            "Roster loaded"
        );
        Ok(roster)
    }

    /// Load the roster from any CSV byte source.
    pub fn from_reader<R: Read>(reader: R, config: &RosterConfig) -> CheckinResult<Self> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(reader);

        let headers = csv_reader
            .headers()
            .map_err(|e| CheckinError::roster(format!("Failed to read header row: {e}")))?
            .clone();
        let columns = resolve_columns(&headers, config)?;

        let mut roster = Roster::default();
        for record in csv_reader.records() {
            let record =
                record.map_err(|e| CheckinError::roster(format!("Malformed roster row: {e}")))?;
            let row = record.position().map(|p| p.line()).unwrap_or_default();

            let order_id = record.get(columns.order_id).unwrap_or_default().to_string();
            let id = Identifier::new(&order_id);
            if id.is_empty() {
                tracing::warn!(row, "Skipping roster row without an order identifier");
                continue;
            }

            let ticket_type = columns
                .ticket_type
                .and_then(|idx| record.get(idx))
                .filter(|t| !t.is_empty())
                .map(str::to_string);
            let category = ticket_type
                .as_deref()
                .map(|t| rewrite_label(t, &config.label_map));

            roster.push(Attendee {
                row,
                order_id,
                id,
                first_name: record
                    .get(columns.first_name)
                    .unwrap_or_default()
                    .to_string(),
                last_name: record
                    .get(columns.last_name)
                    .unwrap_or_default()
                    .to_string(),
                ticket_type,
                category,
            });
        }

        if !roster.duplicates.is_empty() {
            tracing::warn!(
                count = roster.duplicates.len(),
                "Roster contains duplicate identifiers; the first row wins on lookup"
            );
        }

        Ok(roster)
    }

    fn push(&mut self, attendee: Attendee) {
        let position = self.attendees.len();
        if self.index.contains_key(&attendee.id) {
            tracing::debug!(id = %attendee.id, row = attendee.row, "Duplicate identifier");
            if !self.duplicates.contains(&attendee.id) {
                self.duplicates.push(attendee.id.clone());
            }
        } else {
            self.index.insert(attendee.id.clone(), position);
        }
        self.attendees.push(attendee);
    }

    /// Find the first attendee whose identifier matches.
    pub fn lookup(&self, id: &Identifier) -> Option<&Attendee> {
        self.index.get(id).map(|&idx| &self.attendees[idx])
    }

    pub fn len(&self) -> usize {
        self.attendees.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attendees.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Attendee> {
        self.attendees.iter()
    }

    /// Identifiers shared by more than one row, in first-seen order.
    pub fn duplicate_ids(&self) -> &[Identifier] {
        &self.duplicates
    }

    /// Number of attendees per badge label. Rows without a label count
    /// under `"-"`.
    pub fn category_counts(&self) -> BTreeMap<String, usize> {
        let mut counts = BTreeMap::new();
        for attendee in &self.attendees {
            let key = attendee.category.clone().unwrap_or_else(|| "-".to_string());
            *counts.entry(key).or_insert(0) += 1;
        }
        counts
    }
}

fn resolve_columns(
    headers: &csv::StringRecord,
    config: &RosterConfig,
) -> CheckinResult<ColumnIndexes> {
    let find = |name: &str| -> CheckinResult<usize> {
        headers
            .iter()
            .position(|h| h.trim_start_matches('\u{feff}') == name)
            .ok_or_else(|| CheckinError::MissingColumn {
                column: name.to_string(),
            })
    };

    Ok(ColumnIndexes {
        order_id: find(&config.order_id_column)?,
        first_name: find(&config.first_name_column)?,
        last_name: find(&config.last_name_column)?,
        ticket_type: config
            .ticket_type_column
            .as_deref()
            .map(find)
            .transpose()?,
    })
}

fn rewrite_label(ticket_type: &str, label_map: &BTreeMap<String, String>) -> String {
    label_map
        .get(ticket_type)
        .cloned()
        .unwrap_or_else(|| ticket_type.to_string())
}
