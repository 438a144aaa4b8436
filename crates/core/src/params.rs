//! Lenient extraction of typed parameters from a flat `serde_json::Value` object.
//!
//! Every helper takes the params object, a key and a default. Missing keys and
//! values of the wrong JSON type fall back to the default, so a partial params
//! object always yields a complete configuration. Domain validation happens
//! afterwards, on the typed config.

use glam::Vec3;
use serde_json::Value;

/// Extracts an `f32` from `params[name]`, returning `default` if missing or wrong type.
///
/// Integers are accepted and converted.
pub fn param_f32(params: &Value, name: &str, default: f32) -> f32 {
    params
        .get(name)
        .and_then(Value::as_f64)
        .map(|v| v as f32)
        .unwrap_or(default)
}

/// Extracts a `usize` from `params[name]`.
///
/// Only non-negative integers are accepted; floats and negatives yield `default`.
pub fn param_usize(params: &Value, name: &str, default: usize) -> usize {
    params
        .get(name)
        .and_then(Value::as_u64)
        .map(|v| v as usize)
        .unwrap_or(default)
}

/// Extracts a `u32` from `params[name]`. Values above `u32::MAX` yield `default`.
pub fn param_u32(params: &Value, name: &str, default: u32) -> u32 {
    params
        .get(name)
        .and_then(Value::as_u64)
        .and_then(|v| u32::try_from(v).ok())
        .unwrap_or(default)
}

/// Extracts a `bool` from `params[name]`.
pub fn param_bool(params: &Value, name: &str, default: bool) -> bool {
    params.get(name).and_then(Value::as_bool).unwrap_or(default)
}

/// Extracts a `String` from `params[name]`.
pub fn param_string(params: &Value, name: &str, default: &str) -> String {
    params
        .get(name)
        .and_then(Value::as_str)
        .map(String::from)
        .unwrap_or_else(|| default.to_owned())
}

/// Extracts a 3-vector from a JSON array `[x, y, z]`.
///
/// Anything other than an array of exactly three numbers yields `default`.
pub fn param_vec3(params: &Value, name: &str, default: Vec3) -> Vec3 {
    match params.get(name).and_then(Value::as_array) {
        Some(items) if items.len() == 3 => {
            let parsed: Option<Vec<f32>> =
                items.iter().map(|v| v.as_f64().map(|f| f as f32)).collect();
            parsed.map(|v| Vec3::new(v[0], v[1], v[2])).unwrap_or(default)
        }
        _ => default,
    }
}

/// Extracts a grid extent from a JSON array of three non-negative integers.
pub fn param_extent(params: &Value, name: &str, default: [usize; 3]) -> [usize; 3] {
    match params.get(name).and_then(Value::as_array) {
        Some(items) if items.len() == 3 => {
            let parsed: Option<Vec<usize>> =
                items.iter().map(|v| v.as_u64().map(|n| n as usize)).collect();
            parsed.map(|v| [v[0], v[1], v[2]]).unwrap_or(default)
        }
        _ => default,
    }
}

/// Extracts a `[min, max]` pair, as used by the modulation ranges.
pub fn param_range(params: &Value, name: &str, default: (f32, f32)) -> (f32, f32) {
    match params.get(name).and_then(Value::as_array) {
        Some(items) if items.len() == 2 => match (items[0].as_f64(), items[1].as_f64()) {
            (Some(lo), Some(hi)) => (lo as f32, hi as f32),
            _ => default,
        },
        _ => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn param_f32_extracts_float_and_integer() {
        let params = json!({"speed": 2.5, "count": 10});
        assert!((param_f32(&params, "speed", 0.0) - 2.5).abs() < f32::EPSILON);
        assert!((param_f32(&params, "count", 0.0) - 10.0).abs() < f32::EPSILON);
    }

    #[test]
    fn param_f32_falls_back_on_wrong_type_or_missing_key() {
        let params = json!({"speed": "fast"});
        assert_eq!(param_f32(&params, "speed", 1.5), 1.5);
        assert_eq!(param_f32(&params, "other", 3.0), 3.0);
        assert_eq!(param_f32(&json!(null), "speed", 7.0), 7.0);
    }

    #[test]
    fn param_usize_rejects_negative_and_float() {
        let params = json!({"a": 42, "b": -1, "c": 2.5});
        assert_eq!(param_usize(&params, "a", 0), 42);
        assert_eq!(param_usize(&params, "b", 5), 5);
        assert_eq!(param_usize(&params, "c", 9), 9);
    }

    #[test]
    fn param_u32_rejects_overflow() {
        let params = json!({"seed": 1337, "huge": u64::MAX});
        assert_eq!(param_u32(&params, "seed", 0), 1337);
        assert_eq!(param_u32(&params, "huge", 4), 4);
    }

    #[test]
    fn param_bool_and_string() {
        let params = json!({"on": true, "name": "simplex", "n": 1});
        assert!(param_bool(&params, "on", false));
        assert!(!param_bool(&params, "n", false));
        assert_eq!(param_string(&params, "name", "perlin"), "simplex");
        assert_eq!(param_string(&params, "n", "perlin"), "perlin");
    }

    #[test]
    fn param_vec3_parses_three_numbers() {
        let params = json!({"rate": [1.0, 2, -0.5]});
        assert_eq!(
            param_vec3(&params, "rate", Vec3::ZERO),
            Vec3::new(1.0, 2.0, -0.5)
        );
    }

    #[test]
    fn param_vec3_falls_back_on_bad_shape() {
        let params = json!({"short": [1.0, 2.0], "mixed": [1.0, "a", 3.0], "scalar": 4.0});
        assert_eq!(param_vec3(&params, "short", Vec3::ONE), Vec3::ONE);
        assert_eq!(param_vec3(&params, "mixed", Vec3::ONE), Vec3::ONE);
        assert_eq!(param_vec3(&params, "scalar", Vec3::ONE), Vec3::ONE);
    }

    #[test]
    fn param_extent_requires_non_negative_integers() {
        let params = json!({"ok": [2, 3, 4], "neg": [2, -3, 4], "float": [2, 3.5, 4]});
        assert_eq!(param_extent(&params, "ok", [1, 1, 1]), [2, 3, 4]);
        assert_eq!(param_extent(&params, "neg", [1, 1, 1]), [1, 1, 1]);
        assert_eq!(param_extent(&params, "float", [1, 1, 1]), [1, 1, 1]);
    }

    #[test]
    fn param_range_parses_pairs() {
        let params = json!({"speed": [0, 50], "bad": [1]});
        assert_eq!(param_range(&params, "speed", (1.0, 2.0)), (0.0, 50.0));
        assert_eq!(param_range(&params, "bad", (1.0, 2.0)), (1.0, 2.0));
    }
}
