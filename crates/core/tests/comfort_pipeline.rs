//! End-to-end tests of the spatial comfort pipeline
//!
//! A three-point sensor grid on the x axis (0 m, 5 m and 10 m) with sky view
//! 0%, 50% and 100%, run through the full matrix chain and the cache.

use approx::assert_relative_eq;
use comfort_sim_core::cache::CachePolicy;
use comfort_sim_core::config::{PlumeConfig, SpatialConfig};
use comfort_sim_core::core_types::units::{Degrees, MetersPerSecond};
use comfort_sim_core::core_types::Point2;
use comfort_sim_core::moisture::{plume_effectiveness, MOISTURE_SOURCES_FILE};
use comfort_sim_core::spatial::SpatialComfort;
use comfort_sim_core::typology::{evaluate_typologies, TypologyCatalog};
use comfort_sim_core::weather::{constant_boundary, AnalysisPeriod, WindState, HOURS_PER_YEAR};
use comfort_sim_core::ComfortError;
use std::fs;
use std::path::Path;

#[ctor::ctor]
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn write(path: &Path, contents: &str) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, contents).unwrap();
}

fn simulation(root: &Path) {
    write(
        &root.join("sky_view/model/grid/grid.pts"),
        "0 0 1 0 0 1\n5 0 1 0 0 1\n10 0 1 0 0 1\n",
    );
    write(&root.join("sky_view/results/grid.res"), "0\n50\n100\n");
    write(&root.join("annual_irradiance/results/total/sun-up-hours.txt"), "12\n");
    write(&root.join("annual_irradiance/results/total/grid.ill"), "0\n0\n0\n");
}

fn config(policy: CachePolicy) -> SpatialConfig {
    SpatialConfig {
        cache_policy: policy,
        ..SpatialConfig::default()
    }
}

#[test]
fn night_mrt_interpolates_by_sky_view() {
    let dir = tempfile::tempdir().unwrap();
    simulation(dir.path());
    let boundary = constant_boundary(20.0, 50.0, 1.0, 20.0, 40.0, 0.0).unwrap();
    let result = SpatialComfort::new(dir.path(), boundary, SpatialConfig::default())
        .unwrap()
        .into_result();

    let mrt = result.mean_radiant_temperature().unwrap();
    assert_eq!(mrt.rows(), HOURS_PER_YEAR);
    assert_eq!(mrt.cols(), 3);
    assert_eq!(mrt.column(1).len(), HOURS_PER_YEAR);
    for (p, expected) in [20.0, 30.0, 40.0].into_iter().enumerate() {
        assert_relative_eq!(mrt.get(4000, p), expected, epsilon = 1e-4);
    }
    assert_eq!(result.sky_view_percent().unwrap(), vec![0.0, 50.0, 100.0]);
}

#[test]
fn utci_for_mild_still_air() {
    let dir = tempfile::tempdir().unwrap();
    simulation(dir.path());
    let boundary = constant_boundary(20.0, 50.0, 1.0, 20.0, 20.0, 0.0).unwrap();
    let result = SpatialComfort::new(dir.path(), boundary, SpatialConfig::default())
        .unwrap()
        .into_result();

    let utci = result.universal_thermal_climate_index().unwrap();
    for p in 0..3 {
        assert_relative_eq!(utci.get(0, p), 19.40, epsilon = 0.1);
    }

    let summer = AnalysisPeriod::new(6, 8, 9, 17).unwrap();
    let comfortable = result.comfortable_hours(&summer, false).unwrap();
    assert_eq!(comfortable[0], summer.hours_of_year().len() as f64);
}

#[test]
fn calm_moisture_source_wets_only_its_own_point() {
    let dir = tempfile::tempdir().unwrap();
    simulation(dir.path());
    write(
        &dir.path().join(MOISTURE_SOURCES_FILE),
        r#"[{"identifier": "pond", "magnitude": 0.5,
             "geometry": {"type": "point", "location": [0, 0]}}]"#,
    );
    let boundary = constant_boundary(30.0, 30.0, 0.0, 30.0, 30.0, 0.0).unwrap();
    let result = SpatialComfort::new(dir.path(), boundary, SpatialConfig::default())
        .unwrap()
        .into_result();

    let moisture = result.moisture().unwrap();
    assert_relative_eq!(moisture.get(0, 0), 0.5);
    assert_eq!(moisture.get(0, 1), 0.0);
    assert_eq!(moisture.get(0, 2), 0.0);
    assert!(dir.path().join("moisture_pond.cache").is_file());

    assert!(result.dry_bulb_temperature().unwrap().get(0, 0) < 30.0);
    assert_eq!(result.dry_bulb_temperature().unwrap().get(0, 1), 30.0);
}

#[test]
fn malformed_moisture_sidecar_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    simulation(dir.path());
    write(&dir.path().join(MOISTURE_SOURCES_FILE), "[]");
    let boundary = constant_boundary(30.0, 30.0, 0.0, 30.0, 30.0, 0.0).unwrap();
    let err = SpatialComfort::new(dir.path(), boundary, SpatialConfig::default())
        .err()
        .unwrap();
    assert!(matches!(err, ComfortError::MalformedMoistureSources { .. }));
}

#[test]
fn cache_policy_controls_reuse() {
    let dir = tempfile::tempdir().unwrap();
    simulation(dir.path());

    let first = constant_boundary(20.0, 50.0, 1.0, 20.0, 40.0, 0.0).unwrap();
    let result = SpatialComfort::new(dir.path(), first, config(CachePolicy::Validate))
        .unwrap()
        .into_result();
    assert_relative_eq!(result.mean_radiant_temperature().unwrap().get(0, 2), 40.0, epsilon = 1e-4);
    drop(result);

    // a trusted cache keeps the stored matrix even though the inputs changed
    let second = constant_boundary(20.0, 50.0, 1.0, 20.0, 60.0, 0.0).unwrap();
    let trusted = SpatialComfort::new(dir.path(), second.clone(), config(CachePolicy::Trust))
        .unwrap()
        .into_result();
    assert_relative_eq!(trusted.mean_radiant_temperature().unwrap().get(0, 2), 40.0, epsilon = 1e-4);
    drop(trusted);

    let validated = SpatialComfort::new(dir.path(), second, config(CachePolicy::Validate))
        .unwrap()
        .into_result();
    assert_relative_eq!(validated.mean_radiant_temperature().unwrap().get(0, 2), 60.0, epsilon = 1e-4);
}

#[test]
fn corrupt_cache_entry_is_recomputed() {
    let dir = tempfile::tempdir().unwrap();
    simulation(dir.path());
    fs::write(dir.path().join("mean_radiant_temperature_matrix.cache"), b"not a matrix").unwrap();

    let boundary = constant_boundary(20.0, 50.0, 1.0, 20.0, 40.0, 0.0).unwrap();
    let result = SpatialComfort::new(dir.path(), boundary, config(CachePolicy::Trust))
        .unwrap()
        .into_result();
    assert_relative_eq!(result.mean_radiant_temperature().unwrap().get(0, 1), 30.0, epsilon = 1e-4);
}

#[test]
fn plume_is_gated_downwind() {
    let plume = PlumeConfig::default();
    let emitter = Point2::new(0.0, 0.0);
    // wind from the north at 1 m/s reaches 10 m to the south
    let northerly = WindState {
        speed: MetersPerSecond::new(1.0),
        direction: Degrees::new(0.0),
    };

    let south = plume_effectiveness(emitter, Point2::new(0.0, -5.0), 1.0, northerly, &plume);
    assert_relative_eq!(south, 0.75, epsilon = 1e-12);
    assert_eq!(plume_effectiveness(emitter, Point2::new(0.0, 5.0), 1.0, northerly, &plume), 0.0);
    assert_eq!(plume_effectiveness(emitter, Point2::new(5.0, 0.0), 1.0, northerly, &plume), 0.0);
    assert_eq!(plume_effectiveness(emitter, Point2::new(0.0, -11.0), 1.0, northerly, &plume), 0.0);
    assert_eq!(plume_effectiveness(emitter, emitter, 1.0, northerly, &plume), 1.0);

    let calm = WindState {
        speed: MetersPerSecond::new(0.0),
        direction: Degrees::new(0.0),
    };
    for point in [Point2::new(0.0, 2.5), Point2::new(-2.5, 0.0)] {
        assert_relative_eq!(plume_effectiveness(emitter, point, 1.0, calm, &plume), 0.75, epsilon = 1e-12);
    }
}

#[test]
fn typologies_fan_out_in_order() {
    let boundary = constant_boundary(28.0, 40.0, 1.0, 28.0, 50.0, 0.0).unwrap();
    let catalog = TypologyCatalog::presets().unwrap();
    let config = SpatialConfig {
        worker_threads: 2,
        ..SpatialConfig::default()
    };

    let results = evaluate_typologies(catalog.typologies(), &boundary, &config).unwrap();
    assert_eq!(results.len(), catalog.len());
    for (result, typology) in results.iter().zip(catalog.typologies()) {
        assert_eq!(result.typology.name, typology.name);
    }

    let open = &results[0];
    let enclosed = &results[1];
    assert!(enclosed.universal_thermal_climate_index[0] < open.universal_thermal_climate_index[0]);
    let summary = enclosed.summary(&AnalysisPeriod::whole_year(), &config).unwrap();
    assert_eq!(summary.hours, HOURS_PER_YEAR);
}
