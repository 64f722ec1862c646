// ============================================================================
// JSON HELPERS - Lectura tolerante de payloads dinámicos del backend
// ============================================================================
// El backend mezcla snake_case/camelCase y anida datos en `data`/`details`
// según la acción. Estos helpers concentran los fallbacks de nombres de campo
// para que las vistas no tengan que adivinar.
// ============================================================================

use serde_json::Value;

/// Busca el primer path (notación punto, p.ej. "data.on_hand") que exista.
pub fn pick<'a>(value: &'a Value, paths: &[&str]) -> Option<&'a Value> {
    for path in paths {
        let mut current = value;
        let mut found = true;
        for segment in path.split('.') {
            match current.get(segment) {
                Some(next) => current = next,
                None => {
                    found = false;
                    break;
                }
            }
        }
        if found && !current.is_null() {
            return Some(current);
        }
    }
    None
}

/// Primer path que resuelva a string (no vacío se respeta tal cual).
pub fn pick_str(value: &Value, paths: &[&str]) -> Option<String> {
    pick(value, paths).and_then(|v| v.as_str().map(|s| s.to_string()))
}

/// Primer path que resuelva a número; acepta números serializados como string
/// (el backend a veces devuelve "3" en lugar de 3).
pub fn pick_f64(value: &Value, paths: &[&str]) -> Option<f64> {
    let v = pick(value, paths)?;
    match v {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

pub fn pick_bool(value: &Value, paths: &[&str]) -> Option<bool> {
    pick(value, paths).and_then(|v| v.as_bool())
}

/// Primer path que resuelva a array (clonado).
pub fn pick_array(value: &Value, paths: &[&str]) -> Vec<Value> {
    pick(value, paths)
        .and_then(|v| v.as_array().cloned())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn pick_prefers_earlier_paths() {
        let v = json!({ "a": 1, "data": { "a": 2 } });
        assert_eq!(pick(&v, &["a", "data.a"]).unwrap(), &json!(1));
        assert_eq!(pick(&v, &["missing", "data.a"]).unwrap(), &json!(2));
    }

    #[test]
    fn pick_skips_nulls() {
        let v = json!({ "a": null, "b": "x" });
        assert_eq!(pick_str(&v, &["a", "b"]).as_deref(), Some("x"));
    }

    #[test]
    fn on_hand_fallback_chain() {
        // INSUFFICIENT_STOCK puede traer on_hand en cualquiera de estas rutas
        let paths = &["on_hand", "details.on_hand", "data.on_hand", "data.onHand"];
        let top = json!({ "on_hand": 3 });
        let details = json!({ "details": { "on_hand": 3 } });
        let data = json!({ "data": { "on_hand": 3 } });
        let camel = json!({ "data": { "onHand": "3" } });
        for v in [top, details, data, camel] {
            assert_eq!(pick_f64(&v, paths), Some(3.0), "payload: {}", v);
        }
    }

    #[test]
    fn pick_array_falls_back() {
        let v = json!({ "data": { "rows": [1, 2] } });
        assert_eq!(pick_array(&v, &["rows", "data.rows"]).len(), 2);
        assert!(pick_array(&v, &["nope"]).is_empty());
    }
}
