use chrono::{Local, Utc};
use serde_json::{Map, Value};

use crate::config::Config;
use crate::event::{interpolate, EnrichedRecord, Event};

// The chain order is fixed: context merge, level, logger name,
// timestamp, then interpolation. Every step only adds or overwrites
// keys, and interpolation must see everything the earlier steps wrote.
// Runs once per event no matter how many sinks render it.
pub(crate) fn enrich(event: Event, bound: &Map<String, Value>, config: &Config) -> EnrichedRecord {
    let mut fields = bound.clone();
    // Call-site bindings win over bound context.
    for (key, value) in event.fields {
        fields.insert(key, value);
    }

    fields.insert(
        "level".to_string(),
        Value::String(event.level.as_str().to_string()),
    );
    fields.insert(
        "logger_name".to_string(),
        Value::String(event.logger_name.clone()),
    );

    let captured_at = Utc::now();
    let timestamp = if config.use_utc {
        captured_at.format(&config.timestamp_format).to_string()
    } else {
        captured_at
            .with_timezone(&Local)
            .format(&config.timestamp_format)
            .to_string()
    };
    fields.insert("timestamp".to_string(), Value::String(timestamp.clone()));

    // An unresolved placeholder degrades to the raw template text. The
    // caller must never see a formatting failure.
    let message = match interpolate(&event.template, &fields) {
        Ok(message) => message,
        Err(_) => event.template.clone(),
    };
    fields.insert("message".to_string(), Value::String(message.clone()));

    EnrichedRecord {
        level: event.level,
        logger_name: event.logger_name,
        message,
        timestamp,
        captured_at,
        exc_text: event.exc_text,
        fields,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::Level;
    use serde_json::json;

    fn event(template: &str, fields: &[(&str, Value)]) -> Event {
        Event {
            template: template.to_string(),
            level: Level::Info,
            logger_name: "app.worker".to_string(),
            fields: fields
                .iter()
                .map(|(k, v)| (k.to_string(), v.clone()))
                .collect(),
            exc_text: None,
        }
    }

    fn utc_config() -> Config {
        Config {
            use_utc: true,
            ..Config::new()
        }
    }

    #[test]
    fn stamps_reserved_fields() {
        let record = enrich(event("started", &[]), &Map::new(), &utc_config());

        assert_eq!(record.fields["level"], json!("INFO"));
        assert_eq!(record.fields["logger_name"], json!("app.worker"));
        assert_eq!(record.fields["message"], json!("started"));
        assert!(record.fields.contains_key("timestamp"));
    }

    #[test]
    fn timestamp_uses_configured_format() {
        let record = enrich(event("x", &[]), &Map::new(), &utc_config());

        // Default format is second resolution: YYYY-MM-DD HH:MM:SS.
        assert_eq!(record.timestamp.len(), 19);
        assert_eq!(&record.timestamp[4..5], "-");
        assert_eq!(&record.timestamp[10..11], " ");
        assert_eq!(record.timestamp, record.fields["timestamp"].as_str().unwrap());
    }

    #[test]
    fn call_site_fields_win_over_bound_context() {
        let mut bound = Map::new();
        bound.insert("execution_id".to_string(), json!(999));
        bound.insert("region".to_string(), json!("eu"));

        let record = enrich(
            event("run {execution_id} in {region}", &[("region", json!("us"))]),
            &bound,
            &utc_config(),
        );

        assert_eq!(record.message, "run 999 in us");
    }

    #[test]
    fn enrichment_overwrites_reserved_keys_last() {
        let record = enrich(
            event("x", &[("level", json!("bogus")), ("message", json!("bogus"))]),
            &Map::new(),
            &utc_config(),
        );

        assert_eq!(record.fields["level"], json!("INFO"));
        assert_eq!(record.fields["message"], json!("x"));
    }

    #[test]
    fn unresolved_placeholder_degrades_to_raw_template() {
        let record = enrich(event("value is {missing}", &[]), &Map::new(), &utc_config());

        assert_eq!(record.message, "value is {missing}");
        assert_eq!(record.fields["message"], json!("value is {missing}"));
    }

    #[test]
    fn template_may_reference_enriched_fields() {
        let record = enrich(event("level was {level}", &[]), &Map::new(), &utc_config());

        assert_eq!(record.message, "level was INFO");
    }
}
