use std::cmp::Ordering;
use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};
use ulid::Ulid;

#[derive(Debug, Clone, Copy, thiserror::Error, Eq, PartialEq)]
pub enum DirectoryError {
    #[error("Directory is empty!")]
    EmptyDirectory,
    #[error("No current record; please select record first")]
    NoCurrentSelection,
    #[error("No matching record found!")]
    NoMatch,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct RecordId(pub Ulid);

impl RecordId {
    #[must_use]
    pub fn new() -> Self {
        Self(Ulid::new())
    }
}

impl Default for RecordId {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for RecordId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One directory entry. Field contents are not validated; empty strings and
/// duplicates are legal, and two records may compare equal under
/// [`Record::cmp`] while remaining distinct entries.
#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
pub struct Record {
    id: RecordId,
    first_name: String,
    last_name: String,
    phone_number: String,
}

impl Record {
    #[must_use]
    pub fn new(
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        phone_number: impl Into<String>,
    ) -> Self {
        Self {
            id: RecordId::new(),
            first_name: first_name.into(),
            last_name: last_name.into(),
            phone_number: phone_number.into(),
        }
    }

    #[must_use]
    pub fn id(&self) -> RecordId {
        self.id
    }

    #[must_use]
    pub fn first_name(&self) -> &str {
        &self.first_name
    }

    #[must_use]
    pub fn last_name(&self) -> &str {
        &self.last_name
    }

    #[must_use]
    pub fn phone_number(&self) -> &str {
        &self.phone_number
    }

    pub fn set_first_name(&mut self, first_name: impl Into<String>) {
        self.first_name = first_name.into();
    }

    pub fn set_last_name(&mut self, last_name: impl Into<String>) {
        self.last_name = last_name.into();
    }

    pub fn set_phone_number(&mut self, phone_number: impl Into<String>) {
        self.phone_number = phone_number.into();
    }

    /// Canonical display form: the three fields joined by single spaces.
    #[must_use]
    pub fn describe(&self) -> String {
        format!("{} {} {}", self.first_name, self.last_name, self.phone_number)
    }

    /// Total order used to keep the directory sorted: last name, then first
    /// name, then phone number, each compared case-sensitively by code point.
    /// Selection lookup is case-insensitive; the two rules are independent.
    #[must_use]
    pub fn cmp(lhs: &Self, rhs: &Self) -> Ordering {
        lhs.last_name
            .cmp(&rhs.last_name)
            .then_with(|| lhs.first_name.cmp(&rhs.first_name))
            .then_with(|| lhs.phone_number.cmp(&rhs.phone_number))
    }
}

impl Display for Record {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.describe())
    }
}

/// One session command, already parsed by the dispatcher. Field values arrive
/// as plain strings read from the user.
#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
pub enum Command {
    ShowAll,
    ShowCurrent,
    Add { first_name: String, last_name: String, phone_number: String },
    Delete,
    ChangeFirstName { first_name: String },
    ChangeLastName { last_name: String },
    ChangePhoneNumber { phone_number: String },
    Select { first_name: String, last_name: String },
}

/// Structured result of one executed command: a success flag plus the report
/// lines in the order they should be shown.
#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
pub struct CommandOutcome {
    pub success: bool,
    pub lines: Vec<String>,
}

impl CommandOutcome {
    fn succeeded(lines: Vec<String>) -> Self {
        Self { success: true, lines }
    }

    fn failed(lines: Vec<String>) -> Self {
        Self { success: false, lines }
    }
}

fn eq_ignore_case(lhs: &str, rhs: &str) -> bool {
    lhs.to_lowercase() == rhs.to_lowercase()
}

/// The record store plus the current-selection state machine.
///
/// Two invariants hold whenever control returns to the caller: the records are
/// non-decreasing under [`Record::cmp`], and the selection is either empty or
/// names a record that is present in the store. The selection tracks a
/// [`RecordId`] rather than a position, so it survives the re-sort that every
/// mutation triggers.
#[derive(Debug, Clone, Default)]
pub struct Directory {
    records: Vec<Record>,
    current: Option<RecordId>,
}

impl Directory {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// All records, in sort order.
    #[must_use]
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// The selected record, if any. The selection can only name a stored
    /// record, so this resolves whenever a selection exists.
    #[must_use]
    pub fn current(&self) -> Option<&Record> {
        let current_id = self.current?;
        self.records.iter().find(|record| record.id() == current_id)
    }

    /// One-line report of the selection state, shown after most commands.
    #[must_use]
    pub fn show_current(&self) -> String {
        match self.current() {
            Some(record) => format!("Current record: {}", record.describe()),
            None => "No current record selected".to_string(),
        }
    }

    /// Enumerate every record in sort order. Each call re-asserts the sort
    /// order and hands back a fresh iterator, so the sequence is restartable.
    ///
    /// # Errors
    /// Returns [`DirectoryError::EmptyDirectory`] when there is nothing to
    /// list.
    pub fn list(&mut self) -> Result<impl Iterator<Item = &Record>, DirectoryError> {
        if self.records.is_empty() {
            return Err(DirectoryError::EmptyDirectory);
        }
        self.sort_records();
        Ok(self.records.iter())
    }

    /// Insert a new record and make it the selection. Never fails.
    pub fn add(
        &mut self,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        phone_number: impl Into<String>,
    ) -> RecordId {
        let record = Record::new(first_name, last_name, phone_number);
        let id = record.id();
        self.records.push(record);
        self.sort_records();
        self.current = Some(id);
        id
    }

    /// Remove the selected record and clear the selection.
    ///
    /// # Errors
    /// Returns [`DirectoryError::EmptyDirectory`] when no record is selected.
    /// An unselected delete and a delete against an empty store are the same
    /// condition to the caller; there is one error for both.
    pub fn delete(&mut self) -> Result<Record, DirectoryError> {
        let current_id = self.current.ok_or(DirectoryError::EmptyDirectory)?;
        let Some(index) = self.records.iter().position(|record| record.id() == current_id) else {
            // the selection only ever names a stored record
            return Err(DirectoryError::EmptyDirectory);
        };
        let removed = self.records.remove(index);
        self.current = None;
        self.sort_records();
        Ok(removed)
    }

    /// # Errors
    /// Returns [`DirectoryError::NoCurrentSelection`] when no record is
    /// selected; nothing is mutated in that case.
    pub fn change_first_name(
        &mut self,
        first_name: impl Into<String>,
    ) -> Result<(), DirectoryError> {
        let first_name = first_name.into();
        self.change_current(|record| record.set_first_name(first_name))
    }

    /// # Errors
    /// Returns [`DirectoryError::NoCurrentSelection`] when no record is
    /// selected; nothing is mutated in that case.
    pub fn change_last_name(&mut self, last_name: impl Into<String>) -> Result<(), DirectoryError> {
        let last_name = last_name.into();
        self.change_current(|record| record.set_last_name(last_name))
    }

    /// # Errors
    /// Returns [`DirectoryError::NoCurrentSelection`] when no record is
    /// selected; nothing is mutated in that case.
    pub fn change_phone_number(
        &mut self,
        phone_number: impl Into<String>,
    ) -> Result<(), DirectoryError> {
        let phone_number = phone_number.into();
        self.change_current(|record| record.set_phone_number(phone_number))
    }

    /// Select the record whose names match case-insensitively. The scan visits
    /// every record in sort order and overwrites the candidate on each match,
    /// so the last match in scan order wins.
    ///
    /// # Errors
    /// Returns [`DirectoryError::EmptyDirectory`] when the store is empty and
    /// [`DirectoryError::NoMatch`] when no record matches; the previous
    /// selection is kept in both cases.
    pub fn select(&mut self, first_name: &str, last_name: &str) -> Result<(), DirectoryError> {
        if self.records.is_empty() {
            return Err(DirectoryError::EmptyDirectory);
        }

        let mut selected: Option<RecordId> = None;
        for record in &self.records {
            if eq_ignore_case(record.first_name(), first_name)
                && eq_ignore_case(record.last_name(), last_name)
            {
                selected = Some(record.id());
            }
        }

        match selected {
            Some(id) => {
                self.current = Some(id);
                Ok(())
            }
            None => Err(DirectoryError::NoMatch),
        }
    }

    /// Execute one dispatcher command and report the outcome. Every error of
    /// [`DirectoryError`] is absorbed here and turned into report lines;
    /// nothing propagates past this boundary.
    pub fn execute(&mut self, command: Command) -> CommandOutcome {
        match command {
            Command::ShowAll => {
                let listed = self
                    .list()
                    .map(|records| records.map(Record::describe).collect::<Vec<String>>());
                match listed {
                    Ok(mut lines) => {
                        lines.push(self.show_current());
                        CommandOutcome::succeeded(lines)
                    }
                    Err(err) => CommandOutcome::failed(vec![err.to_string()]),
                }
            }
            Command::ShowCurrent => CommandOutcome::succeeded(vec![self.show_current()]),
            Command::Add { first_name, last_name, phone_number } => {
                self.add(first_name, last_name, phone_number);
                CommandOutcome::succeeded(vec![self.show_current()])
            }
            Command::Delete => match self.delete() {
                Ok(removed) => CommandOutcome::succeeded(vec![
                    format!("Deleted: {}", removed.describe()),
                    self.show_current(),
                ]),
                Err(err) => CommandOutcome::failed(vec![err.to_string()]),
            },
            Command::ChangeFirstName { first_name } => {
                let result = self.change_first_name(first_name);
                self.report_change(result)
            }
            Command::ChangeLastName { last_name } => {
                let result = self.change_last_name(last_name);
                self.report_change(result)
            }
            Command::ChangePhoneNumber { phone_number } => {
                let result = self.change_phone_number(phone_number);
                self.report_change(result)
            }
            Command::Select { first_name, last_name } => {
                match self.select(&first_name, &last_name) {
                    Ok(()) => CommandOutcome::succeeded(vec![self.show_current()]),
                    Err(DirectoryError::NoMatch) => CommandOutcome::failed(vec![
                        DirectoryError::NoMatch.to_string(),
                        self.show_current(),
                    ]),
                    Err(err) => CommandOutcome::failed(vec![err.to_string()]),
                }
            }
        }
    }

    fn report_change(&mut self, result: Result<(), DirectoryError>) -> CommandOutcome {
        match result {
            Ok(()) => CommandOutcome::succeeded(vec![self.show_current()]),
            Err(err) => CommandOutcome::failed(vec![err.to_string()]),
        }
    }

    fn change_current(&mut self, apply: impl FnOnce(&mut Record)) -> Result<(), DirectoryError> {
        let current_id = self.current.ok_or(DirectoryError::NoCurrentSelection)?;
        let Some(record) = self.records.iter_mut().find(|record| record.id() == current_id)
        else {
            return Err(DirectoryError::NoCurrentSelection);
        };
        apply(record);
        self.sort_records();
        Ok(())
    }

    fn sort_records(&mut self) {
        self.records.sort_by(Record::cmp);
    }
}
