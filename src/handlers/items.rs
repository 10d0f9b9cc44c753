//! Structured-body endpoint.

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::binding::{BoundArgs, FieldSpec, ObjectSchema, ParamKind};
use crate::handlers::{HandlerContext, HandlerError};

/// Shape of the `POST /items/{item_id}` body. Field order is the response
/// order.
pub static ITEM_SCHEMA: ObjectSchema = ObjectSchema {
    name: "Item",
    fields: &[
        FieldSpec::required("name", ParamKind::Str),
        FieldSpec::optional("description", ParamKind::Str),
        FieldSpec::required("price", ParamKind::Float),
        FieldSpec::optional("tax", ParamKind::Float),
    ],
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub name: String,
    pub description: Option<String>,
    pub price: f64,
    pub tax: Option<f64>,
}

impl Item {
    /// `None` when no tax was given. A zero tax still yields a total.
    pub fn price_with_tax(&self) -> Option<f64> {
        self.tax.map(|tax| self.price + tax)
    }
}

pub fn update_item(args: &BoundArgs, _ctx: &HandlerContext<'_>) -> Result<Value, HandlerError> {
    let item: Item = serde_json::from_value(Value::Object(args.object("item")?.clone()))?;

    let mut out = Map::new();
    out.insert("item_id".into(), json!(args.integer("item_id")?));
    if let Value::Object(fields) = serde_json::to_value(&item)? {
        out.extend(fields);
    }
    if let Some(total) = item.price_with_tax() {
        out.insert("price_with_tax".into(), json!(total));
    }
    if let Some(q) = args.opt_str("q")?.filter(|q| !q.is_empty()) {
        out.insert("q".into(), json!(q));
    }
    Ok(Value::Object(out))
}
