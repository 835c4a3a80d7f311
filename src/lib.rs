pub mod bolna;
pub mod bolna_types;
pub mod config;
pub mod db_types;
pub mod dispatch;
pub mod error;
pub mod extract;
pub mod groq_types;
pub mod handlers;
pub mod msg91;
pub mod msg91_types;
pub mod pg_store;
pub mod pipeline;
pub mod store;
pub mod types;
pub mod utils;

pub mod consts {
    pub const SOURCE_TAG: &str = "bolna-ai";
    pub const MIN_TRANSCRIPT_CHARS: usize = 50;
    pub const SHORT_TRANSCRIPT_SUMMARY: &str = "Call too short or no transcript available";
    pub const FAILED_EXTRACTION_SUMMARY: &str = "Extraction failed";
    pub const DEFAULT_COUNTRY_CODE: &str = "91";
    pub const MIN_DIALABLE_DIGITS: usize = 10;
    pub const INTER_RECORD_DELAY_MILLIS: u64 = 500;
    pub const INTER_SEND_DELAY_MILLIS: u64 = 2_000;
    pub const DISPLAY_PLACEHOLDER: &str = "N/A";
}
