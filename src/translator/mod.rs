mod auth;
mod google;
mod interface;

pub use auth::TokenSource;
pub use google::GoogleTranslator;
pub use interface::{LanguageDescriptor, TranslateRequest, TranslateResponse, TranslationBackend};
