use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// An extracted recommendation as it appears in the input table.
///
/// Every field is optional on the wire. Scalars of the wrong type are coerced where a sensible
/// reading exists (numbers as strings, numeric strings as years) and dropped otherwise.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawRecommendation {
    #[serde(
        default,
        deserialize_with = "opt_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub id: Option<String>,

    #[serde(
        default,
        deserialize_with = "opt_year",
        skip_serializing_if = "Option::is_none"
    )]
    pub year: Option<i32>,

    #[serde(default, deserialize_with = "string")]
    pub sector: String,

    #[serde(default, alias = "source_report", deserialize_with = "string")]
    pub report: String,

    #[serde(default, alias = "text", deserialize_with = "string")]
    pub recommendation: String,

    #[serde(
        default,
        deserialize_with = "opt_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub category: Option<String>,

    /// `savings`, `neutral`, `low_cost` or `capex_heavy`.
    #[serde(
        default,
        deserialize_with = "opt_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub fiscal_impact: Option<String>,

    /// `high`, `medium` or `low`.
    #[serde(
        default,
        deserialize_with = "opt_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub evidence_confidence: Option<String>,

    #[serde(
        default,
        deserialize_with = "opt_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub blocker_type: Option<String>,
}

fn scalar_to_string(v: Value) -> Option<String> {
    match v {
        Value::String(s) => {
            let t = s.trim();
            (!t.is_empty()).then(|| t.to_string())
        }
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

fn opt_string<'de, D>(d: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(scalar_to_string(Value::deserialize(d)?))
}

fn string<'de, D>(d: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(scalar_to_string(Value::deserialize(d)?).unwrap_or_default())
}

fn opt_year<'de, D>(d: D) -> Result<Option<i32>, D::Error>
where
    D: Deserializer<'de>,
{
    let year = match Value::deserialize(d)? {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64)),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    };
    Ok(year.and_then(|y| i32::try_from(y).ok()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn accepts_text_alias_and_numeric_id() {
        let r: RawRecommendation = serde_json::from_str(
            r#"{"id": 17, "year": "2023", "sector": "energy", "text": "Report quarterly."}"#,
        )
        .expect("parse");
        assert_eq!(r.id.as_deref(), Some("17"));
        assert_eq!(r.year, Some(2023));
        assert_eq!(r.recommendation, "Report quarterly.");
    }

    #[test]
    fn coerces_bad_scalars_to_defaults() {
        let r: RawRecommendation = serde_json::from_str(
            r#"{"year": "soon", "sector": null, "recommendation": ["x"], "category": ""}"#,
        )
        .expect("parse");
        assert_eq!(r.year, None);
        assert_eq!(r.sector, "");
        assert_eq!(r.recommendation, "");
        assert_eq!(r.category, None);
    }

    #[test]
    fn ignores_unknown_fields() {
        let r: RawRecommendation =
            serde_json::from_str(r#"{"sector": "health", "page": 12, "source_report": "a.pdf"}"#)
                .expect("parse");
        assert_eq!(r.sector, "health");
        assert_eq!(r.report, "a.pdf");
    }

    #[test]
    fn float_year_with_fraction_is_dropped() {
        let r: RawRecommendation = serde_json::from_str(r#"{"year": 2021.5}"#).expect("parse");
        assert_eq!(r.year, None);
        let r: RawRecommendation = serde_json::from_str(r#"{"year": 2021.0}"#).expect("parse");
        assert_eq!(r.year, Some(2021));
    }
}
