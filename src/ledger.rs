//! The request ledger: every request for a run, sorted into arrival order.

use std::{fs::File, io, path::Path};

use tracing::{debug, warn};

use crate::{
    config::ServerCount,
    error::{Field, SimError, SimResult},
    Request,
};

/// Fields per well-formed input row: timestamp, label, process time.
const FIELDS_PER_ROW: usize = 3;

/// Requests sorted by arrival timestamp, ascending.
///
/// The sort is stable, so requests arriving at the same time keep their input order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Ledger {
    requests: Vec<Request>,
}

impl Ledger {
    /// Build a ledger from requests in any order.
    pub fn new(mut requests: Vec<Request>) -> Self {
        requests.sort_by_key(Request::arrival);
        Self { requests }
    }

    /// Read a headerless CSV file of `timestamp,label,process_time` rows.
    pub fn from_path(path: impl AsRef<Path>) -> SimResult<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| SimError::InputAccess {
            path: path.to_path_buf(),
            source,
        })?;

        let ledger = Self::from_reader(file)?;
        debug!(path = %path.display(), requests = ledger.len(), "Loaded ledger");

        Ok(ledger)
    }

    /// Read headerless CSV rows from any reader.
    ///
    /// Rows without exactly three fields are skipped with a warning. A bad numeric field in an
    /// otherwise well-formed row fails the whole read.
    pub fn from_reader(reader: impl io::Read) -> SimResult<Self> {
        let mut rows = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(reader);

        let mut requests = Vec::new();
        for (idx, record) in rows.records().enumerate() {
            let record = record?;
            let row = record
                .position()
                .map_or(idx + 1, |pos| pos.line() as usize);
            let fields: Vec<&str> = record.iter().collect();

            if let Some(request) = parse_row(row, &fields)? {
                requests.push(request);
            }
        }

        Ok(Self::new(requests))
    }

    /// Build a ledger from already-split rows. Row numbers are 1-based positions in `rows`.
    pub fn from_rows<I, R, S>(rows: I) -> SimResult<Self>
    where
        I: IntoIterator<Item = R>,
        R: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut requests = Vec::new();
        for (idx, row) in rows.into_iter().enumerate() {
            let owned: Vec<S> = row.into_iter().collect();
            let fields: Vec<&str> = owned.iter().map(|field| field.as_ref()).collect();

            if let Some(request) = parse_row(idx + 1, &fields)? {
                requests.push(request);
            }
        }

        Ok(Self::new(requests))
    }

    /// The sorted requests.
    pub fn requests(&self) -> &[Request] {
        &self.requests
    }

    /// Number of requests.
    pub fn len(&self) -> usize {
        self.requests.len()
    }

    /// Whether there are no requests at all.
    pub fn is_empty(&self) -> bool {
        self.requests.is_empty()
    }

    /// Split into one sub-sequence per server, assigning the i-th request to server `i mod N`.
    ///
    /// Every partition stays in arrival order. Servers beyond the number of requests get an
    /// empty partition.
    pub fn into_partitions(self, servers: ServerCount) -> Vec<Vec<Request>> {
        let n = servers.get();
        let mut partitions: Vec<Vec<Request>> = (0..n)
            .map(|_| Vec::with_capacity(self.requests.len() / n + 1))
            .collect();

        for (idx, request) in self.requests.into_iter().enumerate() {
            partitions[idx % n].push(request);
        }

        partitions
    }
}

impl IntoIterator for Ledger {
    type Item = Request;
    type IntoIter = std::vec::IntoIter<Request>;

    fn into_iter(self) -> Self::IntoIter {
        self.requests.into_iter()
    }
}

impl FromIterator<Request> for Ledger {
    fn from_iter<T: IntoIterator<Item = Request>>(iter: T) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

/// `Ok(None)` means the row was skipped for having the wrong number of fields.
fn parse_row(row: usize, fields: &[&str]) -> SimResult<Option<Request>> {
    let [timestamp, label, service] = fields else {
        warn!(
            row,
            fields = fields.len(),
            "Skipping row: expected {FIELDS_PER_ROW} fields"
        );
        return Ok(None);
    };

    let arrival = parse_number(row, Field::Timestamp, timestamp)?;
    let service = parse_number(row, Field::ServiceDuration, service)?;

    Ok(Some(Request::new(arrival, *label, service)))
}

fn parse_number(row: usize, field: Field, value: &str) -> SimResult<u64> {
    value.trim().parse().map_err(|_| SimError::RowParse {
        row,
        field,
        value: value.to_string(),
    })
}
