#[derive(Debug, thiserror::Error)]
pub enum CertsendError {
    #[error("I/O error reading {path}: {source}")]
    Io {
        path: std::path::PathBuf,
        source: std::io::Error,
    },

    #[error("unsupported file format: '{extension}'")]
    UnsupportedFormat { extension: String },

    #[error("JSON parse error in {path}: {source}")]
    JsonParse {
        path: std::path::PathBuf,
        source: serde_json::Error,
    },

    #[error("YAML parse error in {path}: {source}")]
    YamlParse {
        path: std::path::PathBuf,
        source: serde_yaml::Error,
    },

    #[error("TOML parse error in {path}: {source}")]
    TomlParse {
        path: std::path::PathBuf,
        source: toml::de::Error,
    },

    #[error("CSV parse error in {path}: {source}")]
    CsvParse {
        path: std::path::PathBuf,
        source: csv::Error,
    },

    #[error("row {row} of {path} has {found} column(s), expected full name and email")]
    MalformedAttendeeRow {
        path: std::path::PathBuf,
        row: usize,
        found: usize,
    },

    #[error("{message}")]
    FileFormat { message: String },

    #[error("invalid font size {size} (expected a number above 0 and at most {max})")]
    InvalidFontSize { size: f32, max: f32 },

    #[error("invalid fill color '{value}'")]
    InvalidColor { value: String },

    #[error("failed to load font {path}: {reason}")]
    FontLoad {
        path: std::path::PathBuf,
        reason: String,
    },

    #[error("failed to decode template image {path}: {source}")]
    ImageDecode {
        path: std::path::PathBuf,
        source: image::ImageError,
    },

    #[error("failed to write certificate {path}: {source}")]
    ImageEncode {
        path: std::path::PathBuf,
        source: image::ImageError,
    },

    #[error("unknown action '{action}' (expected preview, save or send)")]
    ActionSelection { action: String },

    #[error("SMTP connection error: {reason}")]
    SmtpConnect { reason: String },

    #[error("SMTP send error for attendee {entry_index}: {reason}")]
    SmtpSend { entry_index: usize, reason: String },

    #[error("keyring error: {reason}")]
    Keyring { reason: String },

    #[error("no SMTP password configured for {sender}")]
    MissingCredential { sender: String },

    #[error("invalid command-line argument: {message}")]
    InvalidArgument { message: String },

    #[error("preview was requested but this build has no preview window support")]
    PreviewUnavailable,

    #[error("preview window error: {reason}")]
    Preview { reason: String },
}
