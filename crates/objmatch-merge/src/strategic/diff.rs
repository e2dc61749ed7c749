use serde_json::{Map, Value};

use crate::error::MergeResult;
use crate::schema::{FieldStrategy, Schema};

use super::{
    child_path, keyed, DELETE_FROM_PRIMITIVE_LIST_PREFIX, PATCH_DIRECTIVE, SET_ELEMENT_ORDER_PREFIX,
};

/// Which kinds of change a diff reports.
#[derive(Clone, Copy, Debug)]
pub(crate) struct DiffOptions {
    pub ignore_deletions: bool,
    pub ignore_changes_and_additions: bool,
}

impl DiffOptions {
    pub const ALL: Self = Self {
        ignore_deletions: false,
        ignore_changes_and_additions: false,
    };
    pub const IGNORE_DELETIONS: Self = Self {
        ignore_deletions: true,
        ignore_changes_and_additions: false,
    };
    pub const IGNORE_CHANGES_AND_ADDITIONS: Self = Self {
        ignore_deletions: false,
        ignore_changes_and_additions: true,
    };
}

/// Strategic patch turning `original` into `modified`, rooted at `path`.
pub(crate) fn diff_maps(
    original: &Map<String, Value>,
    modified: &Map<String, Value>,
    schema: &Schema,
    path: &str,
    options: DiffOptions,
) -> MergeResult<Map<String, Value>> {
    Differ { schema, options }.maps(original, modified, path)
}

struct Differ<'a> {
    schema: &'a Schema,
    options: DiffOptions,
}

impl Differ<'_> {
    fn maps(
        &self,
        original: &Map<String, Value>,
        modified: &Map<String, Value>,
        path: &str,
    ) -> MergeResult<Map<String, Value>> {
        let mut patch = Map::new();

        for (key, new) in modified {
            let Some(old) = original.get(key) else {
                if !self.options.ignore_changes_and_additions {
                    patch.insert(key.clone(), new.clone());
                }
                continue;
            };
            if old == new {
                continue;
            }

            let field_path = child_path(path, key);
            match (old, new) {
                (Value::Object(old), Value::Object(new)) => {
                    let nested = self.maps(old, new, &field_path)?;
                    if !nested.is_empty() {
                        patch.insert(key.clone(), Value::Object(nested));
                    }
                }
                (Value::Array(old), Value::Array(new)) => {
                    match self.schema.merge_strategy(&field_path) {
                        Some(field) => {
                            self.merging_list(&mut patch, key, old, new, field, &field_path)?
                        }
                        None => {
                            if !self.options.ignore_changes_and_additions {
                                patch.insert(key.clone(), Value::Array(new.clone()));
                            }
                        }
                    }
                }
                _ => {
                    if !self.options.ignore_changes_and_additions {
                        patch.insert(key.clone(), new.clone());
                    }
                }
            }
        }

        if !self.options.ignore_deletions {
            for key in original.keys() {
                if !modified.contains_key(key) {
                    patch.insert(key.clone(), Value::Null);
                }
            }
        }

        Ok(patch)
    }

    /// Diff two differing lists of a merge-strategy field into `patch`.
    fn merging_list(
        &self,
        patch: &mut Map<String, Value>,
        key: &str,
        old: &[Value],
        new: &[Value],
        field: &FieldStrategy,
        path: &str,
    ) -> MergeResult<()> {
        let (had_deletions, order) = match field.merge_key.as_deref() {
            Some(merge_key) => {
                let (mut items, deletions) = self.keyed_items(old, new, merge_key, path)?;
                let had_deletions = !deletions.is_empty();
                items.extend(deletions);
                if !items.is_empty() {
                    patch.insert(key.to_string(), Value::Array(items));
                }
                let order = new
                    .iter()
                    .map(|item| keyed(item, merge_key, path).map(|(id, _)| key_entry(merge_key, id)))
                    .collect::<MergeResult<Vec<_>>>()?;
                (had_deletions, order)
            }
            None => {
                let additions: Vec<Value> = if self.options.ignore_changes_and_additions {
                    Vec::new()
                } else {
                    new.iter().filter(|item| !old.contains(item)).cloned().collect()
                };
                let removals: Vec<Value> = if self.options.ignore_deletions {
                    Vec::new()
                } else {
                    old.iter().filter(|item| !new.contains(item)).cloned().collect()
                };
                if !additions.is_empty() {
                    patch.insert(key.to_string(), Value::Array(additions));
                }
                let had_deletions = !removals.is_empty();
                if had_deletions {
                    patch.insert(
                        format!("{DELETE_FROM_PRIMITIVE_LIST_PREFIX}{key}"),
                        Value::Array(removals),
                    );
                }
                (had_deletions, new.to_vec())
            }
        };

        // Callers only get here for lists that differ.
        if had_deletions || !self.options.ignore_changes_and_additions {
            patch.insert(format!("{SET_ELEMENT_ORDER_PREFIX}{key}"), Value::Array(order));
        }
        Ok(())
    }

    /// Per-item changes and deletions of a keyed list.
    fn keyed_items(
        &self,
        old: &[Value],
        new: &[Value],
        merge_key: &str,
        path: &str,
    ) -> MergeResult<(Vec<Value>, Vec<Value>)> {
        let old_items = old
            .iter()
            .map(|item| keyed(item, merge_key, path))
            .collect::<MergeResult<Vec<_>>>()?;

        let mut changes = Vec::new();
        let mut seen = Vec::with_capacity(new.len());
        for item in new {
            let (id, fields) = keyed(item, merge_key, path)?;
            seen.push(id);
            match old_items.iter().find(|(old_id, _)| *old_id == id) {
                Some((_, old_fields)) => {
                    if *old_fields == fields {
                        continue;
                    }
                    let mut delta = self.maps(old_fields, fields, path)?;
                    if !delta.is_empty() {
                        delta.insert(merge_key.to_string(), id.clone());
                        changes.push(Value::Object(delta));
                    }
                }
                None => {
                    if !self.options.ignore_changes_and_additions {
                        changes.push(item.clone());
                    }
                }
            }
        }

        let mut deletions = Vec::new();
        if !self.options.ignore_deletions {
            for (id, _) in &old_items {
                if !seen.contains(id) {
                    let mut entry = key_entry_map(merge_key, id);
                    entry.insert(PATCH_DIRECTIVE.to_string(), Value::String("delete".into()));
                    deletions.push(Value::Object(entry));
                }
            }
        }

        Ok((changes, deletions))
    }
}

/// Merge two patches over the same document; `overlay` wins on conflicts.
///
/// Keyed list patches are merged per item so that deletion entries from one
/// side and change entries from the other both survive.
pub(crate) fn combine_patches(
    mut base: Map<String, Value>,
    overlay: Map<String, Value>,
    schema: &Schema,
    path: &str,
) -> Map<String, Value> {
    for (key, value) in overlay {
        let field_path = child_path(path, &key);
        let combined = match (base.remove(&key), value) {
            (Some(Value::Object(ours)), Value::Object(theirs)) => {
                Value::Object(combine_patches(ours, theirs, schema, &field_path))
            }
            (Some(Value::Array(ours)), Value::Array(theirs)) if !key.starts_with('$') => {
                match schema.merge_strategy(&field_path) {
                    Some(field) => Value::Array(combine_lists(ours, theirs, field, schema, &field_path)),
                    None => Value::Array(theirs),
                }
            }
            (_, value) => value,
        };
        base.insert(key, combined);
    }
    base
}

fn combine_lists(
    mut ours: Vec<Value>,
    theirs: Vec<Value>,
    field: &FieldStrategy,
    schema: &Schema,
    path: &str,
) -> Vec<Value> {
    for item in theirs {
        let id = field
            .merge_key
            .as_deref()
            .and_then(|merge_key| item.get(merge_key).map(|id| (merge_key, id.clone())));
        let position = match &id {
            Some((merge_key, id)) => ours.iter().position(|existing| existing.get(*merge_key) == Some(id)),
            None => ours.iter().position(|existing| *existing == item),
        };
        match (position, item) {
            (Some(index), Value::Object(theirs)) => {
                if let Value::Object(existing) = std::mem::take(&mut ours[index]) {
                    ours[index] = Value::Object(combine_patches(existing, theirs, schema, path));
                } else {
                    ours[index] = Value::Object(theirs);
                }
            }
            (Some(_), _) => {}
            (None, item) => ours.push(item),
        }
    }
    ours
}

fn key_entry_map(merge_key: &str, id: &Value) -> Map<String, Value> {
    let mut entry = Map::new();
    entry.insert(merge_key.to_string(), id.clone());
    entry
}

fn key_entry(merge_key: &str, id: &Value) -> Value {
    Value::Object(key_entry_map(merge_key, id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn schema() -> Schema {
        Schema::new()
            .with_field("containers", FieldStrategy::merge_by("name"))
            .with_field("containers.ports", FieldStrategy::merge_by("containerPort"))
            .with_field("tags", FieldStrategy::merge_set())
    }

    fn diff(original: Value, modified: Value, options: DiffOptions) -> Value {
        let patch = diff_maps(
            original.as_object().unwrap(),
            modified.as_object().unwrap(),
            &schema(),
            "",
            options,
        )
        .unwrap();
        Value::Object(patch)
    }

    #[test]
    fn nested_keyed_lists_use_item_paths() {
        let original = json!({"containers": [
            {"name": "app", "ports": [{"containerPort": 80}]}
        ]});
        let modified = json!({"containers": [
            {"name": "app", "ports": [{"containerPort": 80}, {"containerPort": 81}]}
        ]});
        assert_eq!(
            diff(original, modified, DiffOptions::ALL),
            json!({
                "$setElementOrder/containers": [{"name": "app"}],
                "containers": [{
                    "name": "app",
                    "$setElementOrder/ports": [{"containerPort": 80}, {"containerPort": 81}],
                    "ports": [{"containerPort": 81}]
                }]
            })
        );
    }

    #[test]
    fn ignore_deletions_skips_removed_items_and_fields() {
        let original = json!({"containers": [{"name": "a", "image": "x"}, {"name": "b"}], "gone": 1});
        let modified = json!({"containers": [{"name": "a"}]});
        assert_eq!(
            diff(original, modified, DiffOptions::IGNORE_DELETIONS),
            json!({"$setElementOrder/containers": [{"name": "a"}]})
        );
    }

    #[test]
    fn ignore_changes_keeps_only_deletions() {
        let original = json!({"containers": [{"name": "a", "image": "x"}, {"name": "b"}], "tags": ["t1", "t2"], "v": 1});
        let modified = json!({"containers": [{"name": "a", "image": "y"}], "tags": ["t1", "t3"], "v": 2});
        assert_eq!(
            diff(original, modified, DiffOptions::IGNORE_CHANGES_AND_ADDITIONS),
            json!({
                "$setElementOrder/containers": [{"name": "a"}],
                "containers": [{"name": "b", "$patch": "delete"}],
                "$deleteFromPrimitiveList/tags": ["t2"],
                "$setElementOrder/tags": ["t1", "t3"]
            })
        );
    }

    #[test]
    fn combine_merges_keyed_items() {
        let schema = schema();
        let base = json!({"containers": [{"name": "a", "image": null}, {"name": "b", "$patch": "delete"}]});
        let overlay = json!({"containers": [{"name": "a", "tag": "1"}, {"name": "c"}]});
        let combined = combine_patches(
            base.as_object().unwrap().clone(),
            overlay.as_object().unwrap().clone(),
            &schema,
            "",
        );
        assert_eq!(
            Value::Object(combined),
            json!({"containers": [
                {"name": "a", "image": null, "tag": "1"},
                {"name": "b", "$patch": "delete"},
                {"name": "c"}
            ]})
        );
    }

    #[test]
    fn combine_lets_overlay_win_for_scalars_and_directives() {
        let schema = schema();
        let base = json!({"v": null, "$setElementOrder/tags": ["a"]});
        let overlay = json!({"v": 2, "$setElementOrder/tags": ["b"]});
        let combined = combine_patches(
            base.as_object().unwrap().clone(),
            overlay.as_object().unwrap().clone(),
            &schema,
            "",
        );
        assert_eq!(Value::Object(combined), json!({"v": 2, "$setElementOrder/tags": ["b"]}));
    }
}
