//! Storage execution contract

use async_trait::async_trait;

use crate::context::Context;
use crate::error::Result;

/// Persistence operations for one resource.
///
/// Implementations perform the side effect (or read) using
/// `ctx.input` and the request URL, then write the outcome into
/// `ctx.response` on both paths:
///
/// - `Ok(())` means the attempt succeeded and the response already
///   carries the canonical success status: 201 for inserts, 200 for
///   finds and upsert, 204 for update and remove.
/// - `Err` means the attempt failed and the response already carries a
///   server-error status.
///
/// Implementations are shared across requests and must be stateless
/// apart from their backing store handle.
#[async_trait]
pub trait Storage<T>: Send + Sync {
    async fn insert_one(&self, ctx: &mut Context<T>) -> Result<()>;
    async fn insert_many(&self, ctx: &mut Context<T>) -> Result<()>;
    async fn update(&self, ctx: &mut Context<T>) -> Result<()>;
    async fn upsert(&self, ctx: &mut Context<T>) -> Result<()>;
    async fn find_one(&self, ctx: &mut Context<T>) -> Result<()>;
    async fn find_many(&self, ctx: &mut Context<T>) -> Result<()>;
    async fn remove(&self, ctx: &mut Context<T>) -> Result<()>;
}
