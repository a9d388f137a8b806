//! Tree mutation for replacement targets
//!
//! [`update_field`] walks a document tree along a parsed [`PathPlan`] and
//! writes the replacement value at the addressed location. Traversal is a
//! recursive match on the node variant:
//!
//! - mappings descend by field name, creating missing intermediate mappings
//!   on the way (sequences are never grown - an absent element is an error)
//! - sequences select an element either by `[key=value]` filter or by
//!   numeric index, bounds-checked against `[0, len)`
//! - reaching a scalar or null before the path is exhausted is a type
//!   mismatch
//!
//! A terminal substring pattern turns the final write into a partial string
//! substitution: the pattern must match somewhere in the current string
//! value, and every occurrence is replaced with the stringified replacement
//! while the rest of the string is preserved.
//!
//! [`read_field`] is the read-only counterpart used for source extraction:
//! same traversal, no auto-vivification, no writes.

use regex::Regex;
use serde_yaml::{Mapping, Value};

use super::error::ReplacementError;
use super::path::{ElementFilter, PathPlan, PathStep};

/// Write `replacement` at the location `plan` addresses in `node`
pub fn update_field(
    node: &mut Value,
    plan: &PathPlan,
    replacement: &Value,
) -> Result<(), ReplacementError> {
    update_node(node, &plan.steps, plan.substring.as_deref(), replacement)
}

/// Read the value at the location `plan` addresses in `node`
///
/// Traversal only: missing fields are reported, nothing is created, and
/// substring patterns are rejected since they only make sense on writes.
pub fn read_field<'a>(node: &'a Value, plan: &PathPlan) -> Result<&'a Value, ReplacementError> {
    if plan.substring.is_some() {
        return Err(ReplacementError::pattern_substring(
            "substring patterns cannot be used when reading a source field",
        ));
    }
    read_node(node, &plan.steps)
}

fn update_node(
    node: &mut Value,
    steps: &[PathStep],
    substring: Option<&str>,
    replacement: &Value,
) -> Result<(), ReplacementError> {
    let Some(step) = steps.first() else {
        return Ok(());
    };
    match node {
        Value::Mapping(map) => update_mapping(map, steps, substring, replacement),
        Value::Sequence(seq) => update_sequence(seq, steps, substring, replacement),
        _ => Err(ReplacementError::type_mismatch(format!(
            "segment '{step}' cannot descend into a scalar node"
        ))),
    }
}

fn update_mapping(
    map: &mut Mapping,
    steps: &[PathStep],
    substring: Option<&str>,
    replacement: &Value,
) -> Result<(), ReplacementError> {
    let Some(step) = steps.first() else {
        return Ok(());
    };

    // Missing intermediate structure grows as empty mappings. This is the
    // one place the tree is created rather than matched; sequences never
    // get the same treatment.
    let current = map
        .entry(Value::String(step.field.clone()))
        .or_insert_with(|| Value::Mapping(Mapping::new()));

    if current.is_null() {
        return Err(ReplacementError::type_mismatch(format!(
            "field '{}' holds a null value",
            step.field
        )));
    }

    if steps.len() == 1 {
        return match &step.filter {
            None => {
                let rendered = apply_substring_pattern(current, substring, replacement)?;
                *current = rendered;
                Ok(())
            }
            // Terminal filter: the whole matched element is replaced.
            Some(filter) => {
                let Value::Sequence(elements) = current else {
                    return Err(ReplacementError::type_mismatch(format!(
                        "field '{}' is not a sequence, cannot filter by {}={}",
                        step.field, filter.key, filter.value
                    )));
                };
                for element in elements.iter_mut() {
                    if element_matches(element, filter)? {
                        *element = replacement.clone();
                        return Ok(());
                    }
                }
                Err(ReplacementError::map_not_found(
                    &filter.key,
                    &filter.value,
                    &step.field,
                ))
            }
        };
    }

    match &step.filter {
        // The filter stays attached: the consumed field named the sequence,
        // and the filter resolves against it one level down.
        Some(filter) => match current {
            Value::Sequence(_) => update_node(current, steps, substring, replacement),
            _ => Err(ReplacementError::type_mismatch(format!(
                "field '{}' is not a sequence, cannot filter by {}={}",
                step.field, filter.key, filter.value
            ))),
        },
        None => update_node(current, &steps[1..], substring, replacement),
    }
}

fn update_sequence(
    seq: &mut [Value],
    steps: &[PathStep],
    substring: Option<&str>,
    replacement: &Value,
) -> Result<(), ReplacementError> {
    let Some(step) = steps.first() else {
        return Ok(());
    };

    if let Some(filter) = &step.filter {
        for element in seq.iter_mut() {
            if element_matches(element, filter)? {
                return update_node(element, &steps[1..], substring, replacement);
            }
        }
        return Err(ReplacementError::map_not_found(
            &filter.key,
            &filter.value,
            &step.field,
        ));
    }

    let index = parse_index(&step.field, seq.len())?;
    if steps.len() == 1 {
        let rendered = apply_substring_pattern(&seq[index], substring, replacement)?;
        seq[index] = rendered;
        return Ok(());
    }
    update_node(&mut seq[index], &steps[1..], substring, replacement)
}

fn read_node<'a>(node: &'a Value, steps: &[PathStep]) -> Result<&'a Value, ReplacementError> {
    let Some(step) = steps.first() else {
        return Ok(node);
    };
    match node {
        Value::Mapping(map) => {
            let child = map
                .get(step.field.as_str())
                .ok_or_else(|| ReplacementError::field_not_found(&step.field))?;
            match &step.filter {
                Some(filter) => match child {
                    Value::Sequence(_) => read_node(child, steps),
                    _ => Err(ReplacementError::type_mismatch(format!(
                        "field '{}' is not a sequence, cannot filter by {}={}",
                        step.field, filter.key, filter.value
                    ))),
                },
                None => read_node(child, &steps[1..]),
            }
        }
        Value::Sequence(seq) => {
            if let Some(filter) = &step.filter {
                for element in seq {
                    if element_matches(element, filter)? {
                        return read_node(element, &steps[1..]);
                    }
                }
                return Err(ReplacementError::map_not_found(
                    &filter.key,
                    &filter.value,
                    &step.field,
                ));
            }
            let index = parse_index(&step.field, seq.len())?;
            read_node(&seq[index], &steps[1..])
        }
        _ => Err(ReplacementError::type_mismatch(format!(
            "segment '{step}' cannot descend into a scalar node"
        ))),
    }
}

/// Whether a sequence element satisfies a `[key=value]` filter
///
/// Elements must be mappings; scalar element values are compared against the
/// filter value through their string form, so `port=8080` matches a numeric
/// `8080` field.
fn element_matches(element: &Value, filter: &ElementFilter) -> Result<bool, ReplacementError> {
    let Value::Mapping(fields) = element else {
        return Err(ReplacementError::type_mismatch(format!(
            "sequence element is not a mapping, cannot filter by {}={}",
            filter.key, filter.value
        )));
    };
    Ok(fields
        .get(filter.key.as_str())
        .is_some_and(|actual| scalar_matches(actual, &filter.value)))
}

fn scalar_matches(actual: &Value, expected: &str) -> bool {
    match actual {
        Value::String(s) => s == expected,
        Value::Number(n) => n.to_string() == expected,
        Value::Bool(b) => b.to_string() == expected,
        _ => false,
    }
}

fn parse_index(field: &str, length: usize) -> Result<usize, ReplacementError> {
    let index: i64 = field.parse().map_err(|_| {
        ReplacementError::type_mismatch(format!(
            "segment '{field}' addresses a sequence but is not a numeric index"
        ))
    })?;
    if index < 0 || index as usize >= length {
        return Err(ReplacementError::IndexOutOfBound { index, length });
    }
    Ok(index as usize)
}

/// Render the value to write at a terminal position
///
/// Without a pattern this is the replacement itself. With a pattern, the
/// current value must be a string containing at least one pattern match, the
/// replacement must stringify (string, number, or boolean), and every match
/// is substituted while the rest of the string is preserved.
fn apply_substring_pattern(
    current: &Value,
    substring: Option<&str>,
    replacement: &Value,
) -> Result<Value, ReplacementError> {
    let Some(pattern) = substring else {
        return Ok(replacement.clone());
    };

    let replacement_text = match replacement {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => {
            return Err(ReplacementError::pattern_substring(
                "pattern-based substitution requires a string, numeric, or boolean replacement value",
            ))
        }
    };

    let Value::String(target) = current else {
        return Err(ReplacementError::pattern_substring(
            "pattern-based substitution can only be applied to string target fields",
        ));
    };

    let regex = Regex::new(pattern).map_err(|err| {
        ReplacementError::pattern_substring(format!("invalid pattern '{pattern}': {err}"))
    })?;
    if !regex.is_match(target) {
        return Err(ReplacementError::pattern_substring(format!(
            "pattern '{pattern}' not found in target value '{target}'"
        )));
    }
    Ok(Value::String(
        regex.replace_all(target, replacement_text.as_str()).into_owned(),
    ))
}
