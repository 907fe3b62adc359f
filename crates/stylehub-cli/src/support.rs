use crate::config::Settings;
use chrono::{FixedOffset, NaiveDateTime};
use serde::Serialize;
use serde_json::Value;
use std::fmt::Display;
use std::path::PathBuf;
use std::str::FromStr;
use stylehub_kernel::{Salon, SalonError};
use stylehub_store::{AtomicStoreMutationError, MemoryStore, mutate_store_jsonl};

/// Wall-clock format accepted on the command line.
pub const LOCAL_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M";

/// Resolved invocation state shared by every command.
#[derive(Debug, Clone)]
pub struct Context {
    pub store_path: PathBuf,
    pub zone: FixedOffset,
    pub json: bool,
}

impl Context {
    pub fn new(settings: Settings, json: bool) -> Self {
        Self {
            store_path: settings.store_path,
            zone: settings.zone,
            json,
        }
    }

    pub fn store_display(&self) -> String {
        self.store_path.display().to_string()
    }
}

/// Load the snapshot; a missing file is an empty salon.
pub fn load_store_or_exit(ctx: &Context) -> MemoryStore {
    MemoryStore::load_jsonl(&ctx.store_path).unwrap_or_else(|e| {
        eprintln!("error: failed to load {}: {e}", ctx.store_path.display());
        std::process::exit(1);
    })
}

/// Run one engine operation under the store lock and persist it on success.
pub fn mutate_salon_or_exit<T>(
    ctx: &Context,
    mutation: impl FnOnce(&mut Salon<'_, MemoryStore>) -> Result<T, SalonError>,
) -> T {
    mutate_store_jsonl::<T, SalonError, _>(&ctx.store_path, |store| {
        let mut salon = Salon::new(store, ctx.zone);
        mutation(&mut salon).map(|value| (value, true))
    })
    .unwrap_or_else(|error| {
        match error {
            AtomicStoreMutationError::Mutation(err) => eprintln!("error: {err}"),
            other => eprintln!("error: {other}"),
        }
        std::process::exit(1);
    })
}

pub fn exit_with_error(err: impl Display) -> ! {
    eprintln!("error: {err}");
    std::process::exit(1);
}

pub fn parse_local_time_or_exit(raw: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(raw.trim(), LOCAL_TIME_FORMAT).unwrap_or_else(|e| {
        eprintln!("error: invalid local time '{raw}' (expected YYYY-MM-DDTHH:MM): {e}");
        std::process::exit(1);
    })
}

/// Split `LINE=VALUE` as used by the per-line edit flags.
pub fn parse_line_assignment<V>(raw: &str) -> Result<(u32, V), String>
where
    V: FromStr,
    V::Err: Display,
{
    let (line, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected LINE=VALUE, got '{raw}'"))?;
    let line = line
        .trim()
        .parse::<u32>()
        .map_err(|e| format!("invalid line id in '{raw}': {e}"))?;
    let value = value
        .trim()
        .parse::<V>()
        .map_err(|e| format!("invalid value in '{raw}': {e}"))?;
    Ok((line, value))
}

pub fn parse_line_assignment_or_exit<V>(raw: &str) -> (u32, V)
where
    V: FromStr,
    V::Err: Display,
{
    parse_line_assignment(raw).unwrap_or_else(|e| exit_with_error(e))
}

pub fn to_value_or_exit<T: Serialize>(value: &T) -> Value {
    serde_json::to_value(value).unwrap_or_else(|e| {
        eprintln!("error: failed to serialize payload: {e}");
        std::process::exit(2);
    })
}

pub fn print_json_or_exit(payload: &Value) {
    let rendered = serde_json::to_string_pretty(payload).unwrap_or_else(|e| {
        eprintln!("error: failed to render payload: {e}");
        std::process::exit(2);
    });
    println!("{rendered}");
}

pub fn yes_no(ok: bool) -> &'static str {
    if ok { "yes" } else { "no" }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_assignment_splits_id_and_value() {
        let (line, price) = parse_line_assignment::<f64>("2=35.5").expect("valid assignment");
        assert_eq!(line, 2);
        assert_eq!(price, 35.5);

        let (line, service) =
            parse_line_assignment::<String>(" 1 = svc-3 ").expect("valid assignment");
        assert_eq!((line, service.as_str()), (1, "svc-3"));
    }

    #[test]
    fn line_assignment_rejects_malformed_input() {
        assert!(parse_line_assignment::<f64>("2:35").is_err());
        assert!(parse_line_assignment::<f64>("x=35").is_err());
        assert!(parse_line_assignment::<f64>("2=abc").is_err());
    }
}
