pub mod csv;

pub use csv::{load_attendees, CsvOptions};

/// One attendee row: who receives a certificate and where it is mailed.
///
/// The 1-based position in the loaded list is the attendee's identity for the
/// run; it names the output file and tags log lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attendee {
    pub fullname: String,
    pub email: String,
}

impl Attendee {
    pub fn new(fullname: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            fullname: fullname.into(),
            email: email.into(),
        }
    }

    /// Field name/value pairs available to `$field` substitution in email bodies.
    pub fn fields(&self) -> [(&'static str, &str); 2] {
        [("fullname", &self.fullname), ("email", &self.email)]
    }
}
