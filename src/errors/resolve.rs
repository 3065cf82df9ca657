// src/errors/resolve.rs
//! Call-site rewriting errors (E3xxx user-visible, E9xxx internal).

use miette::{Diagnostic, SourceSpan};
use thiserror::Error;

#[derive(Error, Debug, Diagnostic, Clone)]
pub enum ResolveError {
    #[error("error resolving a cast from {from} to {to}")]
    #[diagnostic(code(E3001))]
    CastResolutionFailed {
        from: String,
        to: String,
        #[label("cast required by this call")]
        span: SourceSpan,
        #[label("the troublesome function is here")]
        target: SourceSpan,
    },

    #[error("internal error: coercion of actual {actual_index} did not converge after {limit} steps")]
    #[diagnostic(code(E9001))]
    CoercionLimit {
        actual_index: usize,
        limit: u32,
        #[label("while rewriting this call")]
        span: SourceSpan,
    },

    #[error("internal error: promotion index '{name}' has no definition in the generated loop")]
    #[diagnostic(code(E9002))]
    PromotionIndexUnresolved {
        name: String,
        #[label("while promoting this call")]
        span: SourceSpan,
    },

    #[error("internal error: promoted formal '{name}' mapped to a non-collection substitution")]
    #[diagnostic(code(E9003))]
    MalformedPromotion {
        name: String,
        #[label("while promoting this call")]
        span: SourceSpan,
    },
}

impl ResolveError {
    /// Internal invariant violations are not recoverable; the driver
    /// reports them as internal compiler errors.
    pub fn is_internal(&self) -> bool {
        matches!(
            self,
            ResolveError::CoercionLimit { .. }
                | ResolveError::PromotionIndexUnresolved { .. }
                | ResolveError::MalformedPromotion { .. }
        )
    }
}
