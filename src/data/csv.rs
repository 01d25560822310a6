use std::path::Path;

use crate::data::Attendee;

#[derive(Debug, Clone, Default)]
pub struct CsvOptions {
    pub separator: Option<u8>,
    pub encoding: Option<String>,
    /// Skip the first row. Off by default: every row is an attendee.
    pub has_header: bool,
}

impl CsvOptions {
    /// Convert a user-supplied separator; the CSV reader only splits on one ASCII byte.
    pub fn separator_byte(separator: char) -> crate::Result<u8> {
        u8::try_from(separator)
            .ok()
            .filter(u8::is_ascii)
            .ok_or_else(|| crate::CertsendError::InvalidArgument {
                message: format!("separator '{separator}' must be a single ASCII character"),
            })
    }
}

pub fn decode_bytes(bytes: &[u8], hint: Option<&str>) -> String {
    if let Some(label) = hint {
        let encoding =
            encoding_rs::Encoding::for_label(label.as_bytes()).unwrap_or(encoding_rs::WINDOWS_1252);
        let (decoded, _, _) = encoding.decode(bytes);
        return decoded.into_owned();
    }

    match String::from_utf8(bytes.to_vec()) {
        Ok(s) => s,
        Err(_) => {
            let (decoded, _, _) = encoding_rs::WINDOWS_1252.decode(bytes);
            decoded.into_owned()
        }
    }
}

/// Read `(full name, email)` rows from a delimited file, in file order.
///
/// A row with fewer than two columns aborts the load with
/// [`CertsendError::MalformedAttendeeRow`](crate::CertsendError::MalformedAttendeeRow).
pub fn load_attendees(path: &Path, opts: &CsvOptions) -> crate::Result<Vec<Attendee>> {
    let bytes = std::fs::read(path).map_err(|source| crate::CertsendError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let content = decode_bytes(&bytes, opts.encoding.as_deref());

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(opts.separator.unwrap_or(b','))
        .has_headers(opts.has_header)
        .flexible(true)
        .from_reader(content.as_bytes());

    let first_row = if opts.has_header { 2 } else { 1 };
    let mut attendees = Vec::new();
    for (offset, result) in reader.records().enumerate() {
        let record = result.map_err(|source| crate::CertsendError::CsvParse {
            path: path.to_path_buf(),
            source,
        })?;
        let (Some(fullname), Some(email)) = (record.get(0), record.get(1)) else {
            return Err(crate::CertsendError::MalformedAttendeeRow {
                path: path.to_path_buf(),
                row: first_row + offset,
                found: record.len(),
            });
        };
        attendees.push(Attendee::new(fullname.trim(), email.trim()));
    }

    Ok(attendees)
}
