// ============================================================================
// FORMAT - Formateo de números y fechas para la UI
// ============================================================================

use chrono::{DateTime, Local};

/// Formatea un número con separador de miles; NaN/None se muestran como "-".
pub fn fmt_number(n: Option<f64>) -> String {
    let x = match n {
        Some(x) if x.is_finite() => x,
        _ => return "-".to_string(),
    };

    // redondeo único a 2 decimales antes de separar parte entera y fracción;
    // si se redondea la fracción aparte, el acarreo de 12.999 no llega al 13
    let rounded = format!("{:.2}", x.abs());
    let (whole, frac) = rounded.split_once('.').unwrap_or((rounded.as_str(), ""));
    let frac = frac.trim_end_matches('0');

    let mut digits = whole.to_string();
    let mut grouped = String::new();
    while digits.len() > 3 {
        let rest = digits.split_off(digits.len() - 3);
        grouped = format!(",{}{}", rest, grouped);
    }
    let mut out = format!("{}{}", digits, grouped);

    if !frac.is_empty() {
        out.push('.');
        out.push_str(frac);
    }
    if x < 0.0 && out != "0" {
        out.insert(0, '-');
    }
    out
}

/// Formatea un timestamp ISO del backend a hora local; valores raros se
/// devuelven tal cual (mejor mostrar algo que ocultar el dato).
pub fn fmt_datetime(raw: Option<&str>) -> String {
    let raw = match raw {
        Some(s) if !s.is_empty() => s,
        _ => return "-".to_string(),
    };
    match DateTime::parse_from_rfc3339(raw) {
        Ok(dt) => dt
            .with_timezone(&Local)
            .format("%d/%m/%Y %H:%M")
            .to_string(),
        Err(_) => raw.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fmt_number_groups_thousands() {
        assert_eq!(fmt_number(Some(1_234_567.0)), "1,234,567");
        assert_eq!(fmt_number(Some(999.0)), "999");
        assert_eq!(fmt_number(Some(-1500.0)), "-1,500");
    }

    #[test]
    fn fmt_number_handles_missing() {
        assert_eq!(fmt_number(None), "-");
        assert_eq!(fmt_number(Some(f64::NAN)), "-");
    }

    #[test]
    fn fmt_number_keeps_fraction() {
        assert_eq!(fmt_number(Some(12.5)), "12.5");
        assert_eq!(fmt_number(Some(0.25)), "0.25");
    }

    #[test]
    fn fmt_number_carries_rounding_into_whole_part() {
        assert_eq!(fmt_number(Some(12.999)), "13");
        assert_eq!(fmt_number(Some(1999.999)), "2,000");
        assert_eq!(fmt_number(Some(-12.999)), "-13");
        // un residuo que redondea a cero no deja "-0"
        assert_eq!(fmt_number(Some(-0.001)), "0");
    }

    #[test]
    fn fmt_datetime_passes_through_unparseable() {
        assert_eq!(fmt_datetime(Some("ayer")), "ayer");
        assert_eq!(fmt_datetime(None), "-");
    }
}
