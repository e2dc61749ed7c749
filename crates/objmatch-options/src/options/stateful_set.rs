use serde_json::{Map, Value};

use crate::error::OptionResult;
use crate::option::{edit_documents, kind_of, CalculateOption};

/// Removes `apiVersion`, `kind` and `status` from every entry of a stateful
/// set's `spec.volumeClaimTemplates`.
///
/// The store fills these in on the embedded claims, while clients usually
/// leave them out.
#[derive(Clone, Copy, Debug, Default)]
pub struct IgnoreVolumeClaimTemplateTypeMetaAndStatus;

impl CalculateOption for IgnoreVolumeClaimTemplateTypeMetaAndStatus {
    fn name(&self) -> &str {
        "ignore-volume-claim-template-type-meta-and-status"
    }

    fn apply(&self, current: Vec<u8>, modified: Vec<u8>) -> OptionResult<(Vec<u8>, Vec<u8>)> {
        edit_documents(&current, &modified, |current, modified| {
            strip_claim_templates(current);
            strip_claim_templates(modified);
        })
    }
}

fn strip_claim_templates(document: &mut Map<String, Value>) {
    if kind_of(document) != Some("StatefulSet") {
        return;
    }
    let Some(Value::Array(templates)) = document
        .get_mut("spec")
        .and_then(Value::as_object_mut)
        .and_then(|spec| spec.get_mut("volumeClaimTemplates"))
    else {
        return;
    };
    for template in templates.iter_mut().filter_map(Value::as_object_mut) {
        template.remove("apiVersion");
        template.remove("kind");
        template.remove("status");
    }
}
