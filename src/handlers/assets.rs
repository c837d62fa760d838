//! Static assets under `/public`.

use std::sync::Arc;

use crate::handlers::WebContext;
use crate::http::error::WebError;
use crate::http::request::WebRequest;
use crate::pipeline::HandlerResult;
use crate::render::Renderer;

pub async fn asset(ctx: Arc<WebContext>, req: WebRequest) -> HandlerResult {
    match ctx.assets.get(req.path()).await? {
        Some(renderer) => Ok(Renderer::Static(renderer)),
        None => Err(WebError::NotFound),
    }
}
