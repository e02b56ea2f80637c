//! Pattern answer bank: an ordered cascade of matchers that answer known
//! question shapes without a model call.

pub mod algorithms;
mod assignment;
pub mod error;
pub mod expr;
mod extract;
mod general;
pub mod literals;
pub mod matcher;
mod topical;

pub use error::MatchError;
pub use matcher::{Matcher, PatternBank, Predicate, Question};
