use crate::model::ObjectPosition;
use serde_json::Value;
use tracing::trace;

/// Filters parsed elements down to well-formed position triplets: exactly
/// three components, every component a finite number. A `null` left behind by
/// NaN substitution fails the check and drops the whole triplet; triplets are
/// never patched.
pub fn validate_positions(elements: &[Value]) -> Vec<ObjectPosition> {
    elements
        .iter()
        .filter_map(|element| {
            let triplet = as_finite_triplet(element);
            if triplet.is_none() {
                trace!(element = %element, "dropping malformed position record");
            }
            triplet
        })
        .collect()
}

fn as_finite_triplet(element: &Value) -> Option<ObjectPosition> {
    let items = element.as_array()?;
    if items.len() != 3 {
        return None;
    }
    let mut components = [0.0f64; 3];
    for (slot, item) in components.iter_mut().zip(items) {
        let number = item.as_f64()?;
        if !number.is_finite() {
            return None;
        }
        *slot = number;
    }
    Some(ObjectPosition::from(components))
}
