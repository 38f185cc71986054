//! JSON form of an element collection.

use crate::element::Element;
use std::collections::HashSet;
use thiserror::Error;

/// Scene (de)serialization errors.
#[derive(Debug, Error)]
pub enum SceneError {
    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Expected an array of elements")]
    NotAnArray,
    #[error("Duplicate element id: {0}")]
    DuplicateId(String),
}

/// Result type for scene operations.
pub type SceneResult<T> = Result<T, SceneError>;

/// Serialize a collection as a pretty-printed JSON array.
pub fn serialize(elements: &[Element]) -> SceneResult<String> {
    Ok(serde_json::to_string_pretty(elements)?)
}

/// Parse a collection. Anything but an array of elements is rejected.
pub fn deserialize(json: &str) -> SceneResult<Vec<Element>> {
    let value: serde_json::Value = serde_json::from_str(json)?;
    if !value.is_array() {
        return Err(SceneError::NotAnArray);
    }
    let elements: Vec<Element> = serde_json::from_value(value)?;
    ensure_unique_ids(&elements)?;
    Ok(elements)
}

/// Reject collections in which two elements share an id.
pub fn ensure_unique_ids(elements: &[Element]) -> SceneResult<()> {
    let mut seen = HashSet::new();
    for element in elements {
        if !seen.insert(element.id.as_str()) {
            return Err(SceneError::DuplicateId(element.id.clone()));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::{ElementKind, ElementPatch, ElementType};
    use kurbo::Point;

    fn sample() -> Vec<Element> {
        let mut pencil = Element::new("p", ElementType::Pencil.into());
        pencil.push_point(Point::new(1.5, 2.5));
        pencil.push_point(Point::new(10.0, 20.0));
        vec![
            Element::create(
                "r",
                ElementKind::Rectangle,
                &ElementPatch::new().with_position(Point::new(1.0, 2.0)).with_size(3.0, 4.0).with_angle(0.25),
            ),
            pencil,
            Element::create("t", ElementType::Text.into(), &ElementPatch::new().with_text("hello")),
            Element::create("i", ElementType::Image.into(), &ElementPatch::new().with_image("data:image/png;base64,AAAA")),
        ]
    }

    #[test]
    fn test_roundtrip_preserves_collection() {
        let elements = sample();
        let json = serialize(&elements).unwrap();
        assert!(json.contains("[\n"));
        let parsed = deserialize(&json).unwrap();
        assert_eq!(parsed, elements);
    }

    #[test]
    fn test_rejects_non_array() {
        let result = deserialize(r#"{"id": "a", "type": "rectangle"}"#);
        assert!(matches!(result, Err(SceneError::NotAnArray)));
    }

    #[test]
    fn test_rejects_garbage() {
        assert!(matches!(deserialize("not json"), Err(SceneError::Json(_))));
        assert!(matches!(deserialize(r#"[{"id": "a", "type": "hexagon"}]"#), Err(SceneError::Json(_))));
    }

    #[test]
    fn test_rejects_duplicate_ids() {
        let json = r#"[{"id": "a", "type": "rectangle"}, {"id": "a", "type": "ellipse"}]"#;
        assert!(matches!(deserialize(json), Err(SceneError::DuplicateId(id)) if id == "a"));
    }

    #[test]
    fn test_empty_array() {
        assert!(deserialize("[]").unwrap().is_empty());
    }
}
