pub mod common;

mod consent_and_errors;
mod key_normalization;
mod token_provider;
