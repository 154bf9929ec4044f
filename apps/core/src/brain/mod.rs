//! # Brain Module
//!
//! Fast, deterministic analysis system for MailTriage.
//! Scores email content WITHOUT calling the remote model, and produces the
//! suggested reply for the rule-based path.
//!
//! ## Components
//! - `lexicon`: weighted keyword tables for both triage classes
//! - `scorer`: keyword/pattern/structure scorer (rule-based path)
//! - `responder`: fixed-priority suggested-reply templates

pub mod lexicon;
pub mod responder;
pub mod scorer;

pub use lexicon::validate_lexicon;
pub use responder::synthesize;
pub use scorer::RuleScorer;
