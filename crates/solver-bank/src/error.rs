/// Failure inside a single matcher. Never leaves the bank: the cascade logs it
/// and moves on to the next matcher.
#[derive(Debug, thiserror::Error)]
pub enum MatchError {
    #[error("could not parse {what} from {input:?}")]
    Parse { what: &'static str, input: String },

    #[error("{what} overflowed")]
    Overflow { what: &'static str },

    #[error("missing {0}")]
    Missing(&'static str),

    #[error("evaluation failed: {0}")]
    Eval(String),
}
