pub mod emoji;
pub mod entities;
pub mod language;
pub mod numbers;

pub use emoji::{EmojiAnalysis, analyze_emojis, extract_emojis, remove_emojis};
pub use entities::{SocialText, SocialTextEntities, parse_social_text, sanitize_username};
pub use language::detect_language;
pub use numbers::{NumberParseError, parse_engagement_number, parse_engagement_number_with_locale};
