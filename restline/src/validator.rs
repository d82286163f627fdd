//! Input validation contract

use async_trait::async_trait;

use crate::context::Context;
use crate::error::Result;

/// Request validator bound to a resource.
///
/// On rejection the implementation must set a client-error status and a
/// human-readable message on `ctx.response` before returning `Err`; the
/// message is the one part of error detail that is intentionally
/// caller-authored and safe to echo to the client. On acceptance it
/// returns `Ok` and must leave the response untouched.
#[async_trait]
pub trait Validator<T>: Send + Sync {
    async fn validate(&self, ctx: &mut Context<T>) -> Result<()>;
}

/// Validator that accepts every request. The default for resources that
/// do all of their checking in storage.
#[derive(Debug, Clone, Copy, Default)]
pub struct AcceptAll;

#[async_trait]
impl<T: Send + 'static> Validator<T> for AcceptAll {
    async fn validate(&self, _ctx: &mut Context<T>) -> Result<()> {
        Ok(())
    }
}
