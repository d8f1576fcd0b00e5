//! Wire shapes for study groups. A group detail carries its members under the
//! entry kind's plural key (`nouns` or `verbs`); list responses omit members.

use serde_json::{Map, Value};

use crate::database::models::Entry;
use crate::services::GroupDetail;

pub fn group_detail_value<E: Entry>(detail: &GroupDetail<E>) -> Result<Value, serde_json::Error> {
    let mut obj = match serde_json::to_value(&detail.group)? {
        Value::Object(map) => map,
        _ => Map::new(),
    };
    obj.insert(E::KIND.table().to_string(), serde_json::to_value(&detail.members)?);
    Ok(Value::Object(obj))
}
