/// Emission errors. The grammar only produces `Identifier`/`Member`
/// assignment targets in practice, but
/// `target = value` is parsed at expression precedence, so a literal or
/// call can reach this position syntactically; the emitter rejects it
/// rather than guessing.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum EmitError {
    #[error("assignment target must be an identifier or member expression")]
    InvalidAssignmentTarget,
}
