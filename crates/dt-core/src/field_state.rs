//! Field display names
//!
//! Raw field names are ambiguous once several frames are combined, so
//! consumers key configuration on the display name computed here.

use ahash::AHashSet;

use crate::frame::{DataFrame, Field, Labels};
use crate::value::FieldType;

/// Raw name used by data sources for an unlabelled value column
pub const VALUE_FIELD_NAME: &str = "Value";

/// Resolves the display name of a field within a frame collection
pub trait FieldNameResolver: Send + Sync {
    /// `None` (or an empty name) means the field cannot be addressed
    fn resolve(&self, field: &Field, frame: &DataFrame, frames: &[DataFrame]) -> Option<String>;
}

/// Standard display name resolution
#[derive(Debug, Clone, Copy, Default)]
pub struct DisplayNameResolver;

impl FieldNameResolver for DisplayNameResolver {
    fn resolve(&self, field: &Field, frame: &DataFrame, frames: &[DataFrame]) -> Option<String> {
        get_field_display_name(field, Some(frame), frames)
    }
}

/// Display name of `field`, or `None` for an unnamed field.
///
/// `frame` is the owning frame and `frames` the whole collection it
/// belongs to (may be empty when resolving a standalone frame).
pub fn get_field_display_name(field: &Field, frame: Option<&DataFrame>, frames: &[DataFrame]) -> Option<String> {
    if let Some(name) = non_empty(field.config.display_name.as_deref()) {
        return Some(name.to_string());
    }
    if let Some(name) = non_empty(field.state.display_name()) {
        return Some(name.to_string());
    }
    if let Some(name) = non_empty(field.config.display_name_from_ds.as_deref()) {
        return Some(name.to_string());
    }
    if field.name.is_empty() {
        return None;
    }

    // Time columns keep their raw name unless they carry labels
    if field.field_type == FieldType::Time && field.labels.is_none() {
        return Some(field.name.clone());
    }

    let frame_name = frame.and_then(|f| non_empty(f.name.as_deref()));
    let mut parts: Vec<String> = Vec::new();
    let mut frame_name_added = false;
    let mut labels_added = false;

    if frame_names_differ(frames) {
        if let Some(name) = frame_name {
            parts.push(name.to_string());
            frame_name_added = true;
        }
    }

    if field.name != VALUE_FIELD_NAME {
        parts.push(field.name.clone());
    }

    if let (Some(labels), Some(frame)) = (field.labels.as_ref(), frame) {
        let single = if frames.is_empty() {
            single_label_name(std::slice::from_ref(frame))
        } else {
            single_label_name(frames)
        };
        match single {
            Some(key) => {
                if let Some(v) = labels.get(&key) {
                    parts.push(v.clone());
                    labels_added = true;
                }
            }
            None => {
                let formatted = format_labels(labels);
                if !formatted.is_empty() {
                    parts.push(formatted);
                    labels_added = true;
                }
            }
        }
    }

    // A bare "Value" column is only identifiable through its frame
    if !frame_name_added && !labels_added && field.name == VALUE_FIELD_NAME {
        if let Some(name) = frame_name {
            parts.push(name.to_string());
        }
    }

    let display_name = if parts.is_empty() {
        field.name.clone()
    } else {
        parts.join(" ")
    };

    if display_name == field.name {
        if let Some(frame) = frame {
            return Some(unique_field_name(field, frame));
        }
    }
    Some(display_name)
}

/// Distinct display names across all frames, in first-seen order
pub fn all_field_display_names(frames: &[DataFrame]) -> Vec<String> {
    let mut seen = AHashSet::new();
    let mut names = Vec::new();
    for frame in frames {
        for field in &frame.fields {
            if let Some(name) = get_field_display_name(field, Some(frame), frames) {
                if seen.insert(name.clone()) {
                    names.push(name);
                }
            }
        }
    }
    names
}

/// Render labels as `{k="v", ...}`
pub fn format_labels(labels: &Labels) -> String {
    if labels.is_empty() {
        return String::new();
    }
    let inner = labels
        .iter()
        .map(|(k, v)| format!("{}=\"{}\"", k, v))
        .collect::<Vec<_>>()
        .join(", ");
    format!("{{{}}}", inner)
}

fn non_empty(s: Option<&str>) -> Option<&str> {
    s.filter(|s| !s.is_empty())
}

fn frame_names_differ(frames: &[DataFrame]) -> bool {
    frames.windows(2).any(|w| w[0].name != w[1].name)
}

/// The label key shared by every labelled field, if each carries exactly one
fn single_label_name(frames: &[DataFrame]) -> Option<String> {
    let mut single: Option<&String> = None;
    for field in frames.iter().flat_map(|f| f.fields.iter()) {
        let Some(labels) = field.labels.as_ref().filter(|l| !l.is_empty()) else {
            continue;
        };
        if labels.len() != 1 {
            return None;
        }
        let key = labels.keys().next()?;
        match single {
            None => single = Some(key),
            Some(existing) if existing != key => return None,
            Some(_) => {}
        }
    }
    single.cloned()
}

/// Raw name, suffixed with a 1-based ordinal when the frame repeats it
fn unique_field_name(field: &Field, frame: &DataFrame) -> String {
    let same_name: Vec<usize> = frame.fields
        .iter()
        .enumerate()
        .filter(|(_, f)| f.name == field.name)
        .map(|(i, _)| i)
        .collect();
    if same_name.len() < 2 {
        return field.name.clone();
    }

    let position = same_name
        .iter()
        .position(|&i| std::ptr::eq(&frame.fields[i], field))
        .unwrap_or(0);
    format!("{} {}", field.name, position + 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(pairs: &[(&str, &str)]) -> Labels {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn test_plain_field_uses_raw_name() {
        let frame = DataFrame::new(vec![Field::numbers("value", [1.0])]);
        let frames = vec![frame];
        let name = get_field_display_name(&frames[0].fields[0], Some(&frames[0]), &frames);
        assert_eq!(name.as_deref(), Some("value"));
    }

    #[test]
    fn test_configured_display_name_wins() {
        let field = Field::numbers("value", [1.0]).with_display_name("Temperature");
        let frame = DataFrame::new(vec![field]);
        let frames = vec![frame];
        let name = get_field_display_name(&frames[0].fields[0], Some(&frames[0]), &frames);
        assert_eq!(name.as_deref(), Some("Temperature"));
    }

    #[test]
    fn test_cached_display_name_is_used() {
        let mut field = Field::numbers("value", [1.0]);
        field.state.set_display_name("cached");
        assert_eq!(get_field_display_name(&field, None, &[]).as_deref(), Some("cached"));
    }

    #[test]
    fn test_unnamed_field_has_no_display_name() {
        let frame = DataFrame::new(vec![Field::numbers("", [1.0])]);
        assert_eq!(get_field_display_name(&frame.fields[0], Some(&frame), &[]), None);
    }

    #[test]
    fn test_duplicate_names_get_ordinals() {
        let frame = DataFrame::new(vec![
            Field::numbers("value", [1.0]),
            Field::numbers("value", [2.0]),
        ]);
        let frames = vec![frame];
        let frame = &frames[0];
        let first = get_field_display_name(&frame.fields[0], Some(frame), &frames);
        let second = get_field_display_name(&frame.fields[1], Some(frame), &frames);
        assert_eq!(first.as_deref(), Some("value 1"));
        assert_eq!(second.as_deref(), Some("value 2"));
    }

    #[test]
    fn test_time_field_keeps_raw_name() {
        let frame = DataFrame::new(vec![
            Field::times("time", [1, 2]),
            Field::times("time", [1, 2]),
        ]);
        let name = get_field_display_name(&frame.fields[1], Some(&frame), &[]);
        assert_eq!(name.as_deref(), Some("time"));
    }

    #[test]
    fn test_differing_frame_names_prefix_field() {
        let frames = vec![
            DataFrame::new(vec![Field::numbers("cpu", [1.0])]).with_name("A"),
            DataFrame::new(vec![Field::numbers("cpu", [1.0])]).with_name("B"),
        ];
        let name = get_field_display_name(&frames[1].fields[0], Some(&frames[1]), &frames);
        assert_eq!(name.as_deref(), Some("B cpu"));
    }

    #[test]
    fn test_single_shared_label_uses_label_value() {
        let frames = vec![DataFrame::new(vec![
            Field::numbers("Value", [1.0]).with_labels(labels(&[("host", "a")])),
            Field::numbers("Value", [1.0]).with_labels(labels(&[("host", "b")])),
        ])];
        let name = get_field_display_name(&frames[0].fields[1], Some(&frames[0]), &frames);
        assert_eq!(name.as_deref(), Some("b"));
    }

    #[test]
    fn test_empty_label_sets_do_not_block_single_label() {
        let frames = vec![DataFrame::new(vec![
            Field::numbers("Value", [1.0]).with_labels(labels(&[("host", "a")])),
            Field::numbers("Value", [1.0]).with_labels(Labels::new()),
        ])];
        let name = get_field_display_name(&frames[0].fields[0], Some(&frames[0]), &frames);
        assert_eq!(name.as_deref(), Some("a"));
    }

    #[test]
    fn test_multiple_labels_are_formatted() {
        let frames = vec![DataFrame::new(vec![
            Field::numbers("cpu", [1.0]).with_labels(labels(&[("host", "a"), ("dc", "eu")])),
        ])];
        let name = get_field_display_name(&frames[0].fields[0], Some(&frames[0]), &frames);
        assert_eq!(name.as_deref(), Some("cpu {host=\"a\", dc=\"eu\"}"));
    }

    #[test]
    fn test_bare_value_field_takes_frame_name() {
        let frames = vec![DataFrame::new(vec![Field::numbers("Value", [1.0])]).with_name("requests")];
        let name = get_field_display_name(&frames[0].fields[0], Some(&frames[0]), &frames);
        assert_eq!(name.as_deref(), Some("requests"));
    }

    #[test]
    fn test_all_field_display_names_are_distinct() {
        let frames = vec![
            DataFrame::new(vec![Field::times("time", [1]), Field::numbers("cpu", [1.0])]),
            DataFrame::new(vec![Field::times("time", [1]), Field::numbers("mem", [1.0]), Field::numbers("", [1.0])]),
        ];
        assert_eq!(all_field_display_names(&frames), vec!["time", "cpu", "mem"]);
    }
}
