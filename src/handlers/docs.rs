//! Machine-readable listing of the registered routes.

use serde_json::Value;

use crate::binding::BoundArgs;
use crate::handlers::{HandlerContext, HandlerError};
use crate::routing::RouteSpec;

pub fn route_catalogue(_args: &BoundArgs, ctx: &HandlerContext<'_>) -> Result<Value, HandlerError> {
    Ok(Value::Array(ctx.routes.iter().map(RouteSpec::describe).collect()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Picker;
    use crate::handlers::route_table;

    #[test]
    fn test_catalogue_lists_every_route_in_order() {
        let routes = route_table().unwrap();
        let picker = Picker::default();
        let ctx = HandlerContext { picker: &picker, routes: &routes };

        let body = route_catalogue(&BoundArgs::default(), &ctx).unwrap();
        let entries = body.as_array().unwrap();
        assert_eq!(entries.len(), routes.len());
        assert_eq!(entries[0]["path"], "/");
        assert_eq!(entries[0]["method"], "GET");

        let bounded = entries
            .iter()
            .find(|e| e["path"] == "/path-num-validation/{item_id}")
            .unwrap();
        assert_eq!(bounded["parameters"][0]["name"], "item_id");
    }
}
