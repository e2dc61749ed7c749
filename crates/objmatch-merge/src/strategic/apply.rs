use serde_json::{Map, Value};

use crate::error::{MergeError, MergeResult};
use crate::schema::{FieldStrategy, Schema};

use super::{
    child_path, has_directive, keyed, DELETE_FROM_PRIMITIVE_LIST_PREFIX, PATCH_DIRECTIVE,
    SET_ELEMENT_ORDER_PREFIX,
};

/// Apply a strategic patch map to `original`, rooted at `path`.
pub(crate) fn merge_map(
    mut original: Map<String, Value>,
    patch: &Map<String, Value>,
    schema: &Schema,
    path: &str,
) -> MergeResult<Map<String, Value>> {
    match patch.get(PATCH_DIRECTIVE) {
        None => {}
        Some(Value::String(directive)) => match directive.as_str() {
            "merge" => {}
            "replace" => {
                let mut replacement = patch.clone();
                replacement.remove(PATCH_DIRECTIVE);
                return merge_map(Map::new(), &replacement, schema, path);
            }
            "delete" => return Ok(Map::new()),
            other => {
                return Err(MergeError::directive(
                    path,
                    format!("unknown {PATCH_DIRECTIVE} value '{other}'"),
                ))
            }
        },
        Some(other) => {
            return Err(MergeError::directive(
                path,
                format!("{PATCH_DIRECTIVE} must be a string, got {other}"),
            ))
        }
    }

    for (key, value) in patch {
        let Some(field) = key.strip_prefix(DELETE_FROM_PRIMITIVE_LIST_PREFIX) else {
            continue;
        };
        let Value::Array(removals) = value else {
            return Err(MergeError::directive(path, format!("{key} must be a list")));
        };
        if let Some(Value::Array(items)) = original.get_mut(field) {
            items.retain(|item| !removals.contains(item));
        }
    }

    for (key, value) in patch {
        if key == PATCH_DIRECTIVE
            || key.starts_with(DELETE_FROM_PRIMITIVE_LIST_PREFIX)
            || key.starts_with(SET_ELEMENT_ORDER_PREFIX)
        {
            continue;
        }
        let field_path = child_path(path, key);
        match value {
            Value::Null => {
                original.remove(key);
            }
            Value::Object(nested) if has_directive(nested, "delete") => {
                original.remove(key);
            }
            Value::Object(nested) => {
                let existing = match original.remove(key) {
                    Some(Value::Object(existing)) => existing,
                    _ => Map::new(),
                };
                let merged = merge_map(existing, nested, schema, &field_path)?;
                original.insert(key.clone(), Value::Object(merged));
            }
            Value::Array(items) => match schema.merge_strategy(&field_path) {
                Some(strategy) => {
                    let existing = match original.remove(key) {
                        Some(Value::Array(existing)) => existing,
                        _ => Vec::new(),
                    };
                    let merged = merge_list(existing, items, strategy, schema, &field_path)?;
                    original.insert(key.clone(), Value::Array(merged));
                }
                None => {
                    original.insert(key.clone(), value.clone());
                }
            },
            scalar => {
                original.insert(key.clone(), scalar.clone());
            }
        }
    }

    for (key, value) in patch {
        let Some(field) = key.strip_prefix(SET_ELEMENT_ORDER_PREFIX) else {
            continue;
        };
        let Value::Array(order) = value else {
            return Err(MergeError::directive(path, format!("{key} must be a list")));
        };
        let field_path = child_path(path, field);
        let Some(strategy) = schema.merge_strategy(&field_path) else {
            continue;
        };
        if let Some(Value::Array(items)) = original.remove(field) {
            let items = reorder(items, order, strategy.merge_key.as_deref());
            original.insert(field.to_string(), Value::Array(items));
        }
    }

    Ok(original)
}

fn merge_list(
    mut existing: Vec<Value>,
    patch: &[Value],
    strategy: &FieldStrategy,
    schema: &Schema,
    path: &str,
) -> MergeResult<Vec<Value>> {
    let replace_marker = |item: &Value| matches!(item, Value::Object(map) if has_directive(map, "replace"));
    if patch.iter().any(replace_marker) {
        return Ok(patch.iter().filter(|item| !replace_marker(item)).cloned().collect());
    }

    let Some(merge_key) = strategy.merge_key.as_deref() else {
        for item in patch {
            if !existing.contains(item) {
                existing.push(item.clone());
            }
        }
        return Ok(existing);
    };

    for item in patch {
        let (id, fields) = keyed(item, merge_key, path)?;
        let position = existing
            .iter()
            .position(|candidate| candidate.get(merge_key) == Some(id));

        if has_directive(fields, "delete") {
            if let Some(index) = position {
                existing.remove(index);
            }
            continue;
        }

        match position {
            Some(index) => {
                let current = match std::mem::take(&mut existing[index]) {
                    Value::Object(current) => current,
                    _ => Map::new(),
                };
                existing[index] = Value::Object(merge_map(current, fields, schema, path)?);
            }
            None => existing.push(Value::Object(merge_map(Map::new(), fields, schema, path)?)),
        }
    }
    Ok(existing)
}

/// Sort the items named in `order` into order sequence.
///
/// Named items only trade places among the slots they already occupy, so
/// items the order does not mention keep their position.
fn reorder(items: Vec<Value>, order: &[Value], merge_key: Option<&str>) -> Vec<Value> {
    let identity = |item: &Value| match merge_key {
        Some(merge_key) => item.get(merge_key).cloned(),
        None => Some(item.clone()),
    };
    let order: Vec<Option<Value>> = order.iter().map(identity).collect();
    let rank = |item: &Value| {
        let id = identity(item)?;
        order.iter().position(|entry| entry.as_ref() == Some(&id))
    };

    let mut slots = Vec::new();
    let mut ranked = Vec::new();
    let mut result = Vec::with_capacity(items.len());
    for (index, item) in items.into_iter().enumerate() {
        match rank(&item) {
            Some(position) => {
                slots.push(index);
                ranked.push((position, item));
                result.push(None);
            }
            None => result.push(Some(item)),
        }
    }

    ranked.sort_by_key(|(position, _)| *position);
    for (slot, (_, item)) in slots.into_iter().zip(ranked) {
        result[slot] = Some(item);
    }
    result.into_iter().flatten().collect()
}
