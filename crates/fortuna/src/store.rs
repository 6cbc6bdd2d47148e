use std::path::{Path, PathBuf};

use serde_json::Value;
use thiserror::Error;

use crate::config;
use crate::wheel::{Label, SEGMENT_CAP, WheelState, sanitize_labels};

pub const SNAPSHOT_FILE: &str = "wof.state";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to determine data directory")]
    DataDirNotFound,
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Snapshot persistence for the wheel. Every failure mode here is soft: a
/// missing or mangled snapshot loads as `None`, and a failed write is logged
/// and swallowed, leaving the in-memory state authoritative for the session.
#[derive(Debug, Clone)]
pub struct Store {
    path: PathBuf,
}

impl Store {
    pub fn at(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn at_default_location() -> Result<Self, StoreError> {
        let dirs = config::project_dirs().ok_or(StoreError::DataDirNotFound)?;
        Ok(Self {
            path: dirs.data_dir().join(SNAPSHOT_FILE),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Restore the persisted snapshot, if there is a usable one.
    ///
    /// Shape-checks instead of strict deserialization so a half-mangled
    /// document degrades: non-string label entries are dropped (untrimmed),
    /// the list is capped, and an empty result means no snapshot. A rotation
    /// that is not a finite number falls back to 0.
    pub fn load(&self) -> Option<WheelState> {
        let raw = fs_err::read_to_string(&self.path).ok()?;
        parse_snapshot(&raw)
    }

    pub fn save(&self, state: &WheelState) {
        if let Err(e) = self.try_save(state) {
            log::warn!("Failed to persist wheel state: {}", e);
        }
    }

    fn try_save(&self, state: &WheelState) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            fs_err::create_dir_all(parent)?;
        }
        fs_err::write(&self.path, serde_json::to_string(state)?)?;
        Ok(())
    }

    pub fn clear(&self) {
        if self.path.exists()
            && let Err(e) = fs_err::remove_file(&self.path)
        {
            log::warn!("Failed to clear persisted wheel state: {}", e);
        }
    }
}

fn parse_snapshot(raw: &str) -> Option<WheelState> {
    let doc: Value = serde_json::from_str(raw).ok()?;
    let obj = doc.as_object()?;
    let labels: Vec<Label> = obj
        .get("labels")?
        .as_array()?
        .iter()
        .filter_map(Value::as_str)
        .take(SEGMENT_CAP)
        .map(Label::new)
        .collect();
    if labels.is_empty() {
        return None;
    }
    let rotation = obj
        .get("rotation")
        .and_then(Value::as_f64)
        .filter(|r| r.is_finite())
        .unwrap_or(0.0);
    Some(WheelState { labels, rotation })
}

/// An external override of the persisted state, parsed from query-like
/// key/value pairs. Overrides always start the wheel at rotation 0, and an
/// explicit label list that sanitizes to nothing is honored as the empty
/// wheel rather than falling back to defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Override {
    Replace(Vec<Label>),
    Defaults,
}

impl Override {
    pub fn from_pairs<'a, I>(pairs: I) -> Option<Self>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut labels = None;
        let mut reset = false;
        for (key, value) in pairs {
            match key {
                "labels" => labels = Some(value),
                "reset" => reset = true,
                _ => {}
            }
        }
        if let Some(value) = labels {
            return Some(Override::Replace(parse_label_list(value)));
        }
        if reset {
            return Some(Override::Defaults);
        }
        None
    }

    pub fn into_state(self) -> WheelState {
        match self {
            Override::Replace(labels) => WheelState {
                labels,
                rotation: 0.0,
            },
            Override::Defaults => WheelState::defaults(),
        }
    }
}

/// `labels` override values come in two syntaxes: a JSON array of strings
/// (non-string entries dropped), or comma-separated text. Anything that does
/// not parse as a JSON array is treated as the latter.
fn parse_label_list(value: &str) -> Vec<Label> {
    if value.trim_start().starts_with('[')
        && let Ok(Value::Array(entries)) = serde_json::from_str(value.trim())
    {
        return sanitize_labels(entries.iter().filter_map(Value::as_str).map(str::to_owned));
    }
    sanitize_labels(value.split(',').map(str::to_owned))
}

/// Starting state precedence: external override, then persisted snapshot,
/// then the twelve default labels.
pub fn initial(external: Option<Override>, store: &Store) -> WheelState {
    external
        .map(Override::into_state)
        .or_else(|| store.load())
        .unwrap_or_else(WheelState::defaults)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store_in(dir: &TempDir) -> Store {
        Store::at(dir.path().join(SNAPSHOT_FILE))
    }

    fn write_raw(store: &Store, raw: &str) {
        fs_err::create_dir_all(store.path().parent().unwrap()).unwrap();
        fs_err::write(store.path(), raw).unwrap();
    }

    #[test]
    fn save_then_load_round_trips_exactly() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        let state = WheelState {
            labels: vec![Label::new("  padded  "), Label::new("B"), Label::new("B")],
            rotation: 1.234_567_890_123_456_7,
        };
        store.save(&state);
        assert_eq!(store.load(), Some(state));
    }

    #[test]
    fn load_fails_soft_on_missing_or_mangled_snapshots() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        assert_eq!(store.load(), None);

        for raw in [
            "not json",
            "42",
            "[]",
            r#"{"rotation": 1.0}"#,
            r#"{"labels": "nope", "rotation": 1.0}"#,
            r#"{"labels": [], "rotation": 1.0}"#,
            r#"{"labels": [1, 2, 3], "rotation": 1.0}"#,
        ] {
            write_raw(&store, raw);
            assert_eq!(store.load(), None, "raw: {raw}");
        }
    }

    #[test]
    fn load_filters_non_strings_without_trimming() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        write_raw(&store, r#"{"labels": ["  a  ", 42, "b", null], "rotation": 2.5}"#);
        let state = store.load().unwrap();
        assert_eq!(state.labels, vec![Label::new("  a  "), Label::new("b")]);
        assert_eq!(state.rotation, 2.5);
    }

    #[test]
    fn load_caps_labels_and_defaults_bad_rotation() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);

        let labels: Vec<String> = (0..70).map(|i| format!("\"L{i}\"")).collect();
        write_raw(
            &store,
            &format!(r#"{{"labels": [{}], "rotation": "sideways"}}"#, labels.join(",")),
        );
        let state = store.load().unwrap();
        assert_eq!(state.labels.len(), SEGMENT_CAP);
        assert_eq!(state.rotation, 0.0);

        write_raw(&store, r#"{"labels": ["a"]}"#);
        assert_eq!(store.load().unwrap().rotation, 0.0);
    }

    #[test]
    fn clear_removes_the_snapshot() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        store.save(&WheelState::defaults());
        assert!(store.load().is_some());
        store.clear();
        assert_eq!(store.load(), None);
        store.clear(); // second wipe is a no-op
    }

    #[test]
    fn override_parses_json_arrays() {
        let ov = Override::from_pairs([("labels", r#"[" Alice ", "", "Bob", 42]"#)]).unwrap();
        assert_eq!(
            ov,
            Override::Replace(vec![Label::new("Alice"), Label::new("Bob")])
        );
    }

    #[test]
    fn override_parses_comma_separated_text() {
        let ov = Override::from_pairs([("labels", "a, b ,,c")]).unwrap();
        assert_eq!(
            ov,
            Override::Replace(vec![Label::new("a"), Label::new("b"), Label::new("c")])
        );
    }

    #[test]
    fn override_honors_an_empty_label_list() {
        let ov = Override::from_pairs([("labels", "")]).unwrap();
        assert_eq!(ov, Override::Replace(vec![]));
        let state = ov.into_state();
        assert!(state.labels.is_empty());
        assert_eq!(state.rotation, 0.0);
    }

    #[test]
    fn override_reset_forces_defaults() {
        let ov = Override::from_pairs([("reset", "")]).unwrap();
        assert_eq!(ov, Override::Defaults);
        assert_eq!(ov.into_state(), WheelState::defaults());
    }

    #[test]
    fn override_labels_win_over_reset() {
        let ov = Override::from_pairs([("reset", ""), ("labels", "x")]).unwrap();
        assert_eq!(ov, Override::Replace(vec![Label::new("x")]));
    }

    #[test]
    fn override_ignores_unrelated_keys() {
        assert_eq!(Override::from_pairs([("theme", "dark")]), None);
        assert_eq!(Override::from_pairs(std::iter::empty::<(&str, &str)>()), None);
    }

    #[test]
    fn unparseable_json_falls_back_to_text() {
        let ov = Override::from_pairs([("labels", "[oops")]).unwrap();
        assert_eq!(ov, Override::Replace(vec![Label::new("[oops")]));
    }

    #[test]
    fn initial_prefers_override_then_snapshot_then_defaults() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);

        assert_eq!(initial(None, &store), WheelState::defaults());

        let persisted = WheelState {
            labels: vec![Label::new("saved")],
            rotation: 0.5,
        };
        store.save(&persisted);
        assert_eq!(initial(None, &store), persisted);

        let ov = Override::from_pairs([("labels", "cli")]);
        let state = initial(ov, &store);
        assert_eq!(state.labels, vec![Label::new("cli")]);
        assert_eq!(state.rotation, 0.0);
    }

    #[test]
    fn sanitization_property_from_mixed_input() {
        let mut entries: Vec<String> = vec![
            "\"  Alice \"".into(),
            "\"\"".into(),
            "\"Bob\"".into(),
            "42".into(),
            format!("\"{}\"", "C".repeat(100)),
        ];
        entries.extend((0..65).map(|i| format!("\"E{i}\"")));
        let json = format!("[{}]", entries.join(","));

        let Override::Replace(labels) =
            Override::from_pairs([("labels", json.as_str())]).unwrap()
        else {
            panic!("expected a replacement list");
        };
        assert_eq!(labels.len(), SEGMENT_CAP);
        assert_eq!(labels[0], Label::new("Alice"));
        assert_eq!(labels[1], Label::new("Bob"));
        assert_eq!(labels[2], Label::new("C".repeat(100)));
        assert!(labels.iter().all(|l| !l.as_str().is_empty()));
    }
}
