//! Glass model assembly: resolves the parameters, records the slider
//! values, builds the body and base, and reports each parameter's range.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize, Serializer};
use tracing::{error, info, warn};

use crate::config::{GlassConfig, ParamSpec};
use crate::glass::{create_glass_base, create_glass_body, ErrorChain, Frame, GlassFrames};
use crate::params::{self, GlassParams, Resolution, SliderValues, BODY_HEIGHT, BODY_RADIUS};
use crate::slider_log::SliderLog;
use crate::topology::{SolidId, TopologyStore};

/// Values the host injects into a run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HostScope {
    /// Slider values by name, or `None` when the host supplied none.
    pub sliders_value: Option<SliderValues>,
}

impl HostScope {
    /// A scope carrying the given slider values.
    #[must_use]
    pub fn with_sliders(sliders: SliderValues) -> Self {
        Self {
            sliders_value: Some(sliders),
        }
    }
}

/// A parameter's reported range and resolved value.
///
/// Serializes as the host's `[min, max, value]` triple.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParamEntry {
    /// Lower end of the reported range.
    pub min: i64,
    /// Upper end of the reported range.
    pub max: i64,
    /// Resolved value.
    pub value: i64,
}

impl ParamEntry {
    fn new(spec: &ParamSpec, value: i64) -> Self {
        Self {
            min: spec.min,
            max: spec.max,
            value,
        }
    }
}

impl Serialize for ParamEntry {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        [self.min, self.max, self.value].serialize(serializer)
    }
}

/// Parameter name to `[min, max, value]`, in name order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ParameterTable(BTreeMap<String, ParamEntry>);

impl ParameterTable {
    fn from_params(params: GlassParams, config: &GlassConfig) -> Self {
        let mut table = BTreeMap::new();
        table.insert(
            BODY_HEIGHT.to_owned(),
            ParamEntry::new(&config.body_height, params.body_height),
        );
        table.insert(
            BODY_RADIUS.to_owned(),
            ParamEntry::new(&config.body_radius, params.body_radius),
        );
        Self(table)
    }

    /// Entry for the named parameter.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ParamEntry> {
        self.0.get(name)
    }

    /// Entries in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParamEntry)> {
        self.0.iter().map(|(name, entry)| (name.as_str(), entry))
    }

    /// Number of parameters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if the table has no parameters.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Result of one run, handed to the host.
///
/// `solids` holds the body then the base; a failed construction is `None`.
#[derive(Debug)]
pub struct GlassModel {
    /// Store owning the built bodies.
    pub store: TopologyStore,
    /// Body and base, in that order.
    pub solids: [Option<SolidId>; 2],
    /// Reported parameter ranges and values.
    pub parameters: ParameterTable,
    /// How the parameters were resolved.
    pub resolution: Resolution,
}

impl GlassModel {
    /// Runs with the default configuration.
    #[must_use]
    pub fn run(scope: &HostScope) -> Self {
        Self::build(scope, &GlassConfig::default())
    }

    /// Resolves the parameters from `scope`, appends the slider values to
    /// the configured log, and builds the body and base on the world XY
    /// frame.
    ///
    /// Never fails: construction and log failures are logged and the
    /// affected output is left empty.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn build(scope: &HostScope, config: &GlassConfig) -> Self {
        let sliders = scope.sliders_value.as_ref();
        let resolution = params::resolve(sliders, config);
        if let Some(reason) = resolution.default_reason() {
            warn!(%reason, "using default glass parameters");
        }
        let params = resolution.params();
        info!(
            body_radius = params.body_radius,
            body_height = params.body_height,
            "resolved glass parameters"
        );

        let log = SliderLog::new(&config.log_path);
        if let Err(err) = log.append(sliders) {
            error!(error = %ErrorChain(&err), "slider log not updated");
        }

        let frames = GlassFrames::shared(Frame::world_xy());
        let radius = params.body_radius as f64;
        let height = params.body_height as f64;

        let mut store = TopologyStore::new();
        let body = create_glass_body(&mut store, frames.body(), radius, height).ok();
        let base = create_glass_base(&mut store, frames.base(), radius).ok();

        Self {
            store,
            solids: [body, base],
            parameters: ParameterTable::from_params(params, config),
            resolution,
        }
    }

    /// The glass body, if it was built.
    #[must_use]
    pub fn body(&self) -> Option<SolidId> {
        self.solids[0]
    }

    /// The glass base, if it was built.
    #[must_use]
    pub fn base(&self) -> Option<SolidId> {
        self.solids[1]
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::test_support::capture_logs;
    use serde_json::json;

    fn config(name: &str) -> GlassConfig {
        let path = std::env::temp_dir().join(format!(
            "vitrum-model-{name}-{}.log",
            std::process::id()
        ));
        let _ = std::fs::remove_file(&path);
        GlassConfig::default().with_log_path(path)
    }

    #[test]
    fn param_entry_serializes_as_triple() {
        let entry = ParamEntry {
            min: 1,
            max: 300,
            value: 80,
        };
        assert_eq!(serde_json::to_value(entry).unwrap(), json!([1, 300, 80]));
    }

    #[test]
    fn table_uses_config_ranges() {
        let mut config = GlassConfig::default();
        config.body_radius = ParamSpec::new(5, 2, 9);
        let table = ParameterTable::from_params(
            GlassParams {
                body_radius: 4,
                body_height: 11,
            },
            &config,
        );
        assert_eq!(table.len(), 2);
        assert_eq!(
            serde_json::to_string(&table).unwrap(),
            r#"{"body_height":[10,500,11],"body_radius":[2,9,4]}"#
        );
        let names: Vec<_> = table.iter().map(|(name, _)| name).collect();
        assert_eq!(names, [BODY_HEIGHT, BODY_RADIUS]);
    }

    #[test]
    fn host_scope_deserializes_with_or_without_sliders() {
        let scope: HostScope =
            serde_json::from_str(r#"{"sliders_value": {"body_radius": 3}}"#).unwrap();
        assert_eq!(scope.sliders_value.unwrap()["body_radius"], json!(3));
        let empty: HostScope = serde_json::from_str("{}").unwrap();
        assert_eq!(empty, HostScope::default());
    }

    #[test]
    fn out_of_range_values_are_reported_not_clamped() {
        let config = config("range");
        let sliders =
            serde_json::from_value(json!({"body_radius": 400, "body_height": 5})).unwrap();
        let model = GlassModel::build(&HostScope::with_sliders(sliders), &config);
        assert_eq!(model.parameters.get(BODY_RADIUS).unwrap().value, 400);
        assert_eq!(model.parameters.get(BODY_HEIGHT).unwrap().value, 5);
        assert!(model.body().is_some());
        assert!(model.base().is_some());
        std::fs::remove_file(&config.log_path).unwrap();
    }

    #[test]
    fn degenerate_dimensions_leave_empty_slots() {
        let config = config("degenerate");
        let sliders = serde_json::from_value(json!({"body_radius": 0, "body_height": 0})).unwrap();
        let model = GlassModel::build(&HostScope::with_sliders(sliders), &config);
        assert_eq!(model.solids, [None, None]);
        assert_eq!(model.store.solid_count(), 0);
        assert_eq!(model.parameters.get(BODY_RADIUS).unwrap().value, 0);
        std::fs::remove_file(&config.log_path).unwrap();
    }

    #[test]
    fn fallback_is_logged_with_its_reason() {
        let config = config("fallback");
        let sliders = serde_json::from_value(json!({"body_radius": 120})).unwrap();
        let scope = HostScope::with_sliders(sliders);
        let logs = capture_logs(|| {
            let model = GlassModel::build(&scope, &config);
            assert_eq!(model.parameters.get(BODY_RADIUS).unwrap().value, 80);
        });

        let warning = logs
            .lines()
            .find(|l| l.contains("WARN"))
            .unwrap_or_else(|| panic!("no warning in {logs}"));
        assert!(warning.contains("using default glass parameters"), "{warning}");
        assert!(warning.contains("slider `body_height` is missing"), "{warning}");
        std::fs::remove_file(&config.log_path).unwrap();
    }

    #[test]
    fn resolved_sliders_log_no_warning() {
        let config = config("resolved");
        let sliders =
            serde_json::from_value(json!({"body_radius": 12, "body_height": 30})).unwrap();
        let scope = HostScope::with_sliders(sliders);
        let logs = capture_logs(|| {
            let _ = GlassModel::build(&scope, &config);
        });
        assert!(!logs.contains("WARN"), "{logs}");
        assert!(logs.contains("resolved glass parameters"), "{logs}");
        std::fs::remove_file(&config.log_path).unwrap();
    }

    #[test]
    fn log_failure_does_not_block_the_model() {
        let missing = std::env::temp_dir()
            .join(format!("vitrum-model-no-dir-{}", std::process::id()))
            .join("glass.log");
        let config = GlassConfig::default().with_log_path(missing);
        let model = GlassModel::build(&HostScope::default(), &config);
        assert!(model.body().is_some());
        assert!(model.base().is_some());
    }
}
