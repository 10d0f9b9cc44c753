//! Handlers whose inputs come (mostly) from the request path.

use serde_json::{json, Value};

use crate::binding::BoundArgs;
use crate::catalog::BumBumModel;
use crate::handlers::{HandlerContext, HandlerError};

const ARCHIVE_WARNING: &str = "IN THE BUMBUM ARCHIVE SHALT NOT ENTER THOSE WHO KNOW NO BUMBUM";

pub fn root(_args: &BoundArgs, _ctx: &HandlerContext<'_>) -> Result<Value, HandlerError> {
    Ok(json!({ "message": "Hello BumBum" }))
}

pub fn current_bumbum(_args: &BoundArgs, _ctx: &HandlerContext<'_>) -> Result<Value, HandlerError> {
    Ok(json!({ "message": "Current BumBum for you" }))
}

pub fn bumbum_by_id(args: &BoundArgs, _ctx: &HandlerContext<'_>) -> Result<Value, HandlerError> {
    Ok(json!({ "bumbum_id": args.integer("bumbum_id")? }))
}

pub fn bumbum_model(args: &BoundArgs, _ctx: &HandlerContext<'_>) -> Result<Value, HandlerError> {
    let raw = args.str("model_name")?;
    let model: BumBumModel = raw.parse().map_err(|_| HandlerError::UnknownLiteral {
        kind: "bumbum model",
        value: raw.to_string(),
    })?;

    Ok(json!({
        "model_name": model.as_str(),
        "message": model.message(),
    }))
}

/// The captured path is echoed verbatim, leading slash included.
pub fn bumbum_archive(args: &BoundArgs, _ctx: &HandlerContext<'_>) -> Result<Value, HandlerError> {
    Ok(json!({
        "WARNING": ARCHIVE_WARNING,
        "file_path": args.str("file_path")?,
    }))
}

pub fn titled_path(args: &BoundArgs, _ctx: &HandlerContext<'_>) -> Result<Value, HandlerError> {
    Ok(json!({ "path_id": args.integer("path_id")? }))
}

pub fn path_then_query(args: &BoundArgs, _ctx: &HandlerContext<'_>) -> Result<Value, HandlerError> {
    Ok(json!({
        "item_id": args.integer("item_id")?,
        "q": args.str("q")?,
    }))
}

pub fn bounded_path(args: &BoundArgs, _ctx: &HandlerContext<'_>) -> Result<Value, HandlerError> {
    Ok(json!({ "item_id": args.integer("item_id")? }))
}
