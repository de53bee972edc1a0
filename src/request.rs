/// A single timestamped request waiting to be served.
///
/// Immutable once parsed. Each request is replayed by exactly one server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    arrival: u64,
    label: String,
    service: u64,
}

impl Request {
    /// Create a request arriving at `arrival` which takes `service` time units to process.
    pub fn new(arrival: u64, label: impl Into<String>, service: u64) -> Self {
        Self {
            arrival,
            label: label.into(),
            service,
        }
    }

    /// When the request arrives.
    pub fn arrival(&self) -> u64 {
        self.arrival
    }

    /// Carried through the simulation, never used in the computation.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// How long the request occupies a server once started.
    pub fn service(&self) -> u64 {
        self.service
    }
}
