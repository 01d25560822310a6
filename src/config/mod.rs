mod format;
mod parse;
mod types;
mod validate;

pub use format::{detect_format, ConfigFormat};
pub use parse::{load_config, parse_config_str};
pub use types::{EmailSection, RunConfig, SenderCredentials, TemplateSection, TextStyle};
pub use validate::{validate_config, validate_font_size, MAX_FONT_SIZE};
