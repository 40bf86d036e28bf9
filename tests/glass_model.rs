#![allow(clippy::unwrap_used)]

use std::f64::consts::PI;
use std::fs;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};

use approx::assert_relative_eq;
use serde_json::json;
use tracing_subscriber::EnvFilter;
use vitrum::operations::query::{Area, BoundingBox, IsValid, NakedEdges};
use vitrum::params::DefaultReason;
use vitrum::{GlassConfig, GlassModel, HostScope, Resolution, SliderValues};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn temp_log() -> PathBuf {
    static NEXT: AtomicUsize = AtomicUsize::new(0);
    let path = std::env::temp_dir().join(format!(
        "vitrum-it-{}-{}.log",
        std::process::id(),
        NEXT.fetch_add(1, Ordering::Relaxed)
    ));
    let _ = fs::remove_file(&path);
    path
}

fn scope(value: serde_json::Value) -> HostScope {
    let sliders: SliderValues = serde_json::from_value(value).unwrap();
    HostScope::with_sliders(sliders)
}

#[test]
fn default_glass_end_to_end() {
    init_tracing();
    let log = temp_log();
    let config = GlassConfig::default().with_log_path(&log);
    let model = GlassModel::build(&scope(json!({"body_radius": 80, "body_height": 300})), &config);

    assert!(matches!(model.resolution, Resolution::Resolved(_)));
    let body = model.body().unwrap();
    let base = model.base().unwrap();
    assert_eq!(
        serde_json::to_value(&model.parameters).unwrap(),
        json!({"body_height": [10, 500, 300], "body_radius": [1, 300, 80]})
    );

    assert!(IsValid::new(body).execute(&model.store));
    assert!(IsValid::new(base).execute(&model.store));
    assert_eq!(NakedEdges::new(body).execute(&model.store).unwrap().len(), 2);
    assert_eq!(NakedEdges::new(base).execute(&model.store).unwrap().len(), 1);

    let lateral = Area::new(body).execute(&model.store).unwrap();
    assert_relative_eq!(lateral, 2.0 * PI * 80.0 * 300.0, max_relative = 0.01);
    let disk = Area::new(base).execute(&model.store).unwrap();
    assert_relative_eq!(disk, PI * 80.0 * 80.0, max_relative = 0.01);

    let bbox = BoundingBox::new(body).execute(&model.store).unwrap();
    assert_relative_eq!(bbox.min.z, 0.0, epsilon = 1e-9);
    assert_relative_eq!(bbox.max.z, 300.0, epsilon = 1e-9);
    assert_relative_eq!(bbox.size().x, 160.0, max_relative = 0.01);

    let base_box = BoundingBox::new(base).execute(&model.store).unwrap();
    assert_relative_eq!(base_box.size().z, 0.0, epsilon = 1e-9);

    fs::remove_file(&log).unwrap();
}

#[test]
fn absent_sliders_build_the_default_glass() {
    init_tracing();
    let log = temp_log();
    let config = GlassConfig::default().with_log_path(&log);
    let model = GlassModel::build(&HostScope::default(), &config);

    assert_eq!(model.resolution.default_reason(), Some(&DefaultReason::NoSliders));
    assert_eq!(
        serde_json::to_value(&model.parameters).unwrap(),
        json!({"body_height": [10, 500, 300], "body_radius": [1, 300, 80]})
    );
    assert!(model.solids.iter().all(Option::is_some));
    assert_eq!(fs::read_to_string(&log).unwrap(), "None\n");

    fs::remove_file(&log).unwrap();
}

#[test]
fn string_sliders_resize_the_glass() {
    let log = temp_log();
    let config = GlassConfig::default().with_log_path(&log);
    let model = GlassModel::build(
        &scope(json!({"body_radius": "100", "body_height": "250"})),
        &config,
    );

    assert_eq!(
        serde_json::to_value(&model.parameters).unwrap(),
        json!({"body_height": [10, 500, 250], "body_radius": [1, 300, 100]})
    );
    let bbox = BoundingBox::new(model.body().unwrap())
        .execute(&model.store)
        .unwrap();
    assert_relative_eq!(bbox.max.z - bbox.min.z, 250.0, epsilon = 1e-9);
    assert_relative_eq!(bbox.size().y, 200.0, max_relative = 0.01);

    fs::remove_file(&log).unwrap();
}

#[test]
fn bad_sliders_fall_back_to_defaults_for_both() {
    let log = temp_log();
    let config = GlassConfig::default().with_log_path(&log);

    let missing = GlassModel::build(&scope(json!({"body_height": 120})), &config);
    assert_eq!(
        missing.resolution.default_reason(),
        Some(&DefaultReason::MissingKey("body_radius"))
    );

    let malformed = GlassModel::build(
        &scope(json!({"body_radius": 50, "body_height": [1, 2]})),
        &config,
    );
    assert!(matches!(
        malformed.resolution.default_reason(),
        Some(DefaultReason::Malformed { name: "body_height", .. })
    ));

    for model in [&missing, &malformed] {
        assert_eq!(
            serde_json::to_value(&model.parameters).unwrap(),
            json!({"body_height": [10, 500, 300], "body_radius": [1, 300, 80]})
        );
    }

    let lines: Vec<_> = fs::read_to_string(&log)
        .unwrap()
        .lines()
        .map(str::to_owned)
        .collect();
    assert_eq!(
        lines,
        [
            r#"{"body_height":120}"#,
            r#"{"body_height":[1,2],"body_radius":50}"#
        ]
    );

    fs::remove_file(&log).unwrap();
}

#[test]
fn repeated_runs_are_congruent_and_append_one_line_each() {
    let log = temp_log();
    let config = GlassConfig::default().with_log_path(&log);
    let host = scope(json!({"body_radius": 42, "body_height": 99}));

    let mut previous_log = String::new();
    let mut reference = None;
    for run in 1..=3 {
        let model = GlassModel::build(&host, &config);
        let measure = |solid| {
            let area = Area::new(solid).execute(&model.store).unwrap();
            let bbox = BoundingBox::new(solid).execute(&model.store).unwrap();
            (area, bbox)
        };
        let measured = [
            measure(model.body().unwrap()),
            measure(model.base().unwrap()),
        ];
        match &reference {
            None => reference = Some(measured),
            Some(first) => assert_eq!(first, &measured),
        }

        let text = fs::read_to_string(&log).unwrap();
        assert!(text.starts_with(&previous_log), "earlier lines changed");
        assert_eq!(text.lines().count(), run);
        assert_eq!(
            text.lines().last().unwrap(),
            r#"{"body_height":99,"body_radius":42}"#
        );
        previous_log = text;
    }

    fs::remove_file(&log).unwrap();
}

#[test]
fn config_file_drives_ranges_and_log_location() {
    let log = temp_log();
    let config_path = log.with_extension("json");
    fs::write(
        &config_path,
        json!({
            "body_radius": {"default": 20, "min": 5, "max": 50},
            "log_path": log,
        })
        .to_string(),
    )
    .unwrap();

    let config = GlassConfig::load(&config_path).unwrap();
    let model = GlassModel::build(&HostScope::default(), &config);
    assert_eq!(
        serde_json::to_value(&model.parameters).unwrap(),
        json!({"body_height": [10, 500, 300], "body_radius": [5, 50, 20]})
    );
    assert!(log.exists());

    fs::remove_file(&log).unwrap();
    fs::remove_file(&config_path).unwrap();
}
