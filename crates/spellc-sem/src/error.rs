/// Semantic/type errors. Like the parser, the checker aborts on
/// the first error — there is no partial result and no warning channel.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum TypeError {
    #[error("Cannot assign {source} to {target}")]
    CannotAssign { source: String, target: String },

    #[error("Function {name} returns {actual} but declared {declared}")]
    ReturnMismatch {
        name: String,
        actual: String,
        declared: String,
    },

    #[error("await can only be used in async functions")]
    AwaitOutsideAsync,

    #[error("for await…of requires an async iterable (Promise<T[]>)")]
    ForAwaitRequiresAsyncIterable,
}
