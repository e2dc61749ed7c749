use crate::error::OptionResult;
use crate::option::{edit_documents, get_path, kind_of, remove_path, CalculateOption};

const SELECTOR: [&str; 2] = ["spec", "selector"];

/// Removes `spec.selector` from both sides of a pod disruption budget when
/// the two selectors are equal.
///
/// Other kinds pass through unchanged, and so do budgets whose selectors
/// differ: a real selector change must still produce a patch.
#[derive(Clone, Copy, Debug, Default)]
pub struct IgnorePdbSelector;

impl CalculateOption for IgnorePdbSelector {
    fn name(&self) -> &str {
        "ignore-pdb-selector"
    }

    fn apply(&self, current: Vec<u8>, modified: Vec<u8>) -> OptionResult<(Vec<u8>, Vec<u8>)> {
        edit_documents(&current, &modified, |current, modified| {
            let is_pdb = [&*current, &*modified]
                .into_iter()
                .any(|document| kind_of(document) == Some("PodDisruptionBudget"));
            if !is_pdb {
                return;
            }
            let current_selector = get_path(current, &SELECTOR).cloned();
            if current_selector.is_some() && current_selector.as_ref() == get_path(modified, &SELECTOR) {
                remove_path(current, &SELECTOR);
                remove_path(modified, &SELECTOR);
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn pdb(selector: Value) -> Value {
        json!({
            "apiVersion": "policy/v1",
            "kind": "PodDisruptionBudget",
            "metadata": {"name": "pdb", "namespace": "default"},
            "spec": {"maxUnavailable": 1, "selector": selector}
        })
    }

    fn run(current: Value, modified: Value) -> (Value, Value) {
        let (current, modified) = IgnorePdbSelector
            .apply(
                serde_json::to_vec(&current).unwrap(),
                serde_json::to_vec(&modified).unwrap(),
            )
            .unwrap();
        (
            serde_json::from_slice(&current).unwrap(),
            serde_json::from_slice(&modified).unwrap(),
        )
    }

    #[test]
    fn equal_selectors_are_removed() {
        let selector = json!({"matchLabels": {"app": "test", "env": "test"}});
        let (current, modified) = run(pdb(selector.clone()), pdb(selector));
        assert!(current["spec"].get("selector").is_none());
        assert!(modified["spec"].get("selector").is_none());
        assert_eq!(current["spec"]["maxUnavailable"], json!(1));
    }

    #[test]
    fn differing_selectors_are_kept() {
        let (current, modified) = run(
            pdb(json!({"matchLabels": {"app": "test"}})),
            pdb(json!({"matchLabels": {"app": "other"}})),
        );
        assert_eq!(current["spec"]["selector"], json!({"matchLabels": {"app": "test"}}));
        assert_eq!(modified["spec"]["selector"], json!({"matchLabels": {"app": "other"}}));
    }

    #[test]
    fn other_kinds_pass_through() {
        let service = json!({"kind": "Service", "spec": {"selector": {"app": "x"}}});
        let (current, modified) = run(service.clone(), service.clone());
        assert_eq!(current, service);
        assert_eq!(modified, service);
    }
}
