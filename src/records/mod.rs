//! Flat record parsing
//!
//! The selection core is fed by four comma-separated record streams: item
//! attributes, item locations, job task lists and historical outcome labels.
//! Field order is the compatibility contract; the surrounding file format is
//! not. Blank rows are skipped; any row that fails to parse aborts the read
//! with a `MalformedRecord` carrying its 1-based line number.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::str::FromStr;

use crate::types::{ItemId, JobId, Outcome};
use crate::{Result, SelectionError};

const FIELD_SEPARATOR: char = ',';

/// Item attribute row: `id,reward,weight`
#[derive(Debug, Clone, PartialEq)]
pub struct ItemRecord {
    pub id: ItemId,
    pub reward: f64,
    pub weight: f64,
}

/// Item location row: `x,y[,id]`, aligned by position with the item rows
///
/// Some producers append the item id as a third field; it is ignored here
/// since pairing is positional.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocationRecord {
    pub x: i32,
    pub y: i32,
}

/// Job row: `id,item,qty,item,qty,...,<terminator>`
///
/// The final field is a terminator token and is discarded; the fields in
/// between must pair up into (item, quantity) tasks.
#[derive(Debug, Clone, PartialEq)]
pub struct JobRecord {
    pub id: JobId,
    pub tasks: Vec<(ItemId, u32)>,
}

/// Outcome label row: `id,flag`, aligned by position with the training rows
#[derive(Debug, Clone, PartialEq)]
pub struct LabelRecord {
    pub id: JobId,
    pub outcome: Outcome,
}

fn malformed(line: usize, reason: impl Into<String>) -> SelectionError {
    SelectionError::MalformedRecord {
        line,
        reason: reason.into(),
    }
}

fn parse_field<T>(raw: &str, line: usize, what: &str) -> Result<T>
where
    T: FromStr,
{
    raw.trim()
        .parse()
        .map_err(|_| malformed(line, format!("cannot parse {what} from '{}'", raw.trim())))
}

fn split_fields(row: &str) -> Vec<&str> {
    row.split(FIELD_SEPARATOR).map(str::trim).collect()
}

/// Parse one item attribute row
pub fn parse_item_record(row: &str, line: usize) -> Result<ItemRecord> {
    let fields = split_fields(row);
    if fields.len() != 3 {
        return Err(malformed(
            line,
            format!("expected 3 item fields, found {}", fields.len()),
        ));
    }
    if fields[0].is_empty() {
        return Err(malformed(line, "empty item identifier"));
    }

    Ok(ItemRecord {
        id: ItemId::new(fields[0]),
        reward: parse_field(fields[1], line, "reward")?,
        weight: parse_field(fields[2], line, "weight")?,
    })
}

/// Parse one location row
pub fn parse_location_record(row: &str, line: usize) -> Result<LocationRecord> {
    let fields = split_fields(row);
    if fields.len() != 2 && fields.len() != 3 {
        return Err(malformed(
            line,
            format!("expected 2 or 3 location fields, found {}", fields.len()),
        ));
    }

    Ok(LocationRecord {
        x: parse_field(fields[0], line, "x coordinate")?,
        y: parse_field(fields[1], line, "y coordinate")?,
    })
}

/// Parse one job row
pub fn parse_job_record(row: &str, line: usize) -> Result<JobRecord> {
    let fields = split_fields(row);
    if fields.len() < 2 {
        return Err(malformed(line, "job row is missing its terminator field"));
    }
    if fields[0].is_empty() {
        return Err(malformed(line, "empty job identifier"));
    }

    // Everything between the id and the trailing terminator pairs up.
    let pairs = &fields[1..fields.len() - 1];
    if pairs.len() % 2 != 0 {
        return Err(malformed(line, "unpaired item/quantity fields"));
    }

    let mut tasks = Vec::with_capacity(pairs.len() / 2);
    for pair in pairs.chunks_exact(2) {
        if pair[0].is_empty() {
            return Err(malformed(line, "empty item identifier in task pair"));
        }
        let quantity = parse_field(pair[1], line, "quantity")?;
        tasks.push((ItemId::new(pair[0]), quantity));
    }

    Ok(JobRecord {
        id: JobId::new(fields[0]),
        tasks,
    })
}

/// Parse one outcome label row
pub fn parse_label_record(row: &str, line: usize) -> Result<LabelRecord> {
    let fields = split_fields(row);
    if fields.len() != 2 {
        return Err(malformed(
            line,
            format!("expected 2 label fields, found {}", fields.len()),
        ));
    }

    let flag: u8 = parse_field(fields[1], line, "cancellation flag")?;
    let outcome = Outcome::from_flag(flag)
        .ok_or_else(|| malformed(line, format!("cancellation flag must be 0 or 1, got {flag}")))?;

    Ok(LabelRecord {
        id: JobId::new(fields[0]),
        outcome,
    })
}

fn read_records<T>(
    reader: impl BufRead,
    parse: impl Fn(&str, usize) -> Result<T>,
) -> Result<Vec<T>> {
    let mut records = Vec::new();
    for (index, row) in reader.lines().enumerate() {
        let row = row?;
        if row.trim().is_empty() {
            continue;
        }
        records.push(parse(&row, index + 1)?);
    }
    Ok(records)
}

pub fn read_item_records(reader: impl BufRead) -> Result<Vec<ItemRecord>> {
    read_records(reader, parse_item_record)
}

pub fn read_location_records(reader: impl BufRead) -> Result<Vec<LocationRecord>> {
    read_records(reader, parse_location_record)
}

pub fn read_job_records(reader: impl BufRead) -> Result<Vec<JobRecord>> {
    read_records(reader, parse_job_record)
}

pub fn read_label_records(reader: impl BufRead) -> Result<Vec<LabelRecord>> {
    read_records(reader, parse_label_record)
}

pub fn read_item_records_from_path(path: impl AsRef<Path>) -> Result<Vec<ItemRecord>> {
    read_item_records(BufReader::new(File::open(path)?))
}

pub fn read_location_records_from_path(path: impl AsRef<Path>) -> Result<Vec<LocationRecord>> {
    read_location_records(BufReader::new(File::open(path)?))
}

pub fn read_job_records_from_path(path: impl AsRef<Path>) -> Result<Vec<JobRecord>> {
    read_job_records(BufReader::new(File::open(path)?))
}

pub fn read_label_records_from_path(path: impl AsRef<Path>) -> Result<Vec<LabelRecord>> {
    read_label_records(BufReader::new(File::open(path)?))
}
