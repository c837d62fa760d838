//! Trace pinning.
//!
//! A pinned trace has its TTL raised to the configured pin duration;
//! unpinning restores the service's default data TTL.

use std::sync::Arc;

use crate::handlers::{trace_id_at, WebContext};
use crate::http::error::WebError;
use crate::http::request::WebRequest;
use crate::pipeline::HandlerResult;
use crate::query::TraceId;
use crate::render::Renderer;

/// Current TTL of a trace, in seconds.
pub async fn is_pinned(ctx: Arc<WebContext>, req: WebRequest) -> HandlerResult {
    let trace_id = trace_id_at(&req, 3)?;
    Ok(Renderer::json(&ctx.resolver.pin_ttl(trace_id).await?)?)
}

/// `/api/pin/<id>/<true|false>`. Wrong shape or ID is NotFound, a bad
/// state token is BadRequest.
pub async fn toggle(ctx: Arc<WebContext>, req: WebRequest) -> HandlerResult {
    let (trace_id, pinned) = parse_toggle(&req)?;

    let pin_ttl = u32::try_from(ctx.ui.pin_ttl_secs())
        .map_err(|_| WebError::internal("pin TTL does not fit in u32 seconds"))?;

    let state = ctx.resolver.toggle_pin(trace_id, pinned, pin_ttl).await?;
    Ok(Renderer::json(&state)?)
}

fn parse_toggle(req: &WebRequest) -> Result<(TraceId, bool), WebError> {
    let segments = req.segments();
    let [_, _, _, id, state] = segments.as_slice() else {
        return Err(WebError::NotFound);
    };

    let trace_id = id.parse().map_err(|_| WebError::NotFound)?;
    let pinned = match *state {
        "true" => true,
        "false" => false,
        _ => return Err(WebError::bad_request("Must be true or false")),
    };
    Ok((trace_id, pinned))
}
