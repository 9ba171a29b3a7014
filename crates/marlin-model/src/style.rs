//! Style maps and typed accessors.
//!
//! Styles are opaque key/value maps; cascade resolution lives outside this crate. The model
//! only reads a handful of well-known keys for capability flags and swimlane metrics.

use indexmap::IndexMap;

/// Opaque key/value style map with deterministic iteration order.
pub type Style = IndexMap<String, String>;

pub mod keys {
    pub const MOVABLE: &str = "movable";
    pub const RESIZABLE: &str = "resizable";
    pub const BENDABLE: &str = "bendable";
    pub const CLONEABLE: &str = "cloneable";
    pub const DELETABLE: &str = "deletable";
    pub const ROTATABLE: &str = "rotatable";
    pub const AUTOSIZE: &str = "autosize";
    pub const ROTATION: &str = "rotation";
    pub const SHAPE: &str = "shape";
    pub const HORIZONTAL: &str = "horizontal";
    pub const STARTSIZE: &str = "startSize";
    pub const STROKEWIDTH: &str = "strokeWidth";
    pub const ASPECT: &str = "aspect";
    pub const NO_EDGE_STYLE: &str = "noEdgeStyle";
}

pub const SHAPE_SWIMLANE: &str = "swimlane";
pub const DEFAULT_STARTSIZE: f64 = 40.0;

pub fn get_f64(style: &Style, key: &str, default: f64) -> f64 {
    style
        .get(key)
        .and_then(|v| v.parse::<f64>().ok())
        .unwrap_or(default)
}

pub fn get_bool(style: &Style, key: &str, default: bool) -> bool {
    match style.get(key).map(String::as_str) {
        Some("0") | Some("false") => false,
        Some("1") | Some("true") => true,
        _ => default,
    }
}

pub fn get_str<'a>(style: &'a Style, key: &str) -> Option<&'a str> {
    style.get(key).map(String::as_str)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn typed_getters_fall_back_to_defaults() {
        let mut style = Style::default();
        style.insert(keys::MOVABLE.to_string(), "0".to_string());
        style.insert(keys::ROTATION.to_string(), "45".to_string());

        assert!(!get_bool(&style, keys::MOVABLE, true));
        assert!(get_bool(&style, keys::RESIZABLE, true));
        assert_eq!(get_f64(&style, keys::ROTATION, 0.0), 45.0);
        assert_eq!(get_f64(&style, keys::STARTSIZE, DEFAULT_STARTSIZE), 40.0);
    }
}
