use evac_rust::common::is_contiguous;
use evac_rust::config::Config;
use evac_rust::diagnosis::Blockage;
use evac_rust::simulation::{Simulation, StepOutcome};

fn corridor_config() -> Config {
    let content = std::fs::read_to_string("map_file/test/config.yaml").unwrap();
    let config = Config::from_yaml_str(&content).unwrap();
    config.validate().unwrap();
    config
}

#[test]
fn test_corridor_replay() {
    let mut simulation = Simulation::from_config(corridor_config()).unwrap();
    let report = simulation.run().unwrap();

    assert_eq!(report.start, (1, 2));
    assert_eq!(report.exit, (6, 2));
    assert_eq!(report.max_time, 4);
    assert_eq!(
        report.reference_path,
        vec![(1, 2), (2, 2), (3, 2), (4, 2), (5, 2), (6, 2)]
    );

    for step in &report.steps[..3] {
        match &step.outcome {
            StepOutcome::Reachable { path } => {
                assert!(is_contiguous(path));
                assert_eq!(path.first(), Some(&(1, 2)));
                assert_eq!(path.last(), Some(&(6, 2)));
            }
            other => panic!("t{} should be reachable, got {other:?}", step.time),
        }
    }

    // Agent 0 parks on the only cell in front of the exit.
    for step in &report.steps[3..] {
        assert_eq!(
            step.outcome,
            StepOutcome::Blocked {
                diagnosis: Blockage::Direct {
                    agent: Some(0),
                    cell: (5, 2)
                },
                visualization: None,
            }
        );
    }

    let last = report.last_success.unwrap();
    assert_eq!(last.time, 2);
    assert_eq!(report.stats.searches, 6);
}

#[test]
fn test_corridor_with_artifacts() {
    let dir = tempfile::tempdir().unwrap();
    let visualization_dir = dir.path().join("visualizations_paths");
    let report_path = dir.path().join("report.json");
    let config = Config {
        visualization_dir: Some(visualization_dir.to_str().unwrap().to_string()),
        report_path: Some(report_path.to_str().unwrap().to_string()),
        ..corridor_config()
    };

    let mut simulation = Simulation::from_config(config).unwrap();
    let report = simulation.run().unwrap();
    report.write_json(report_path.to_str().unwrap()).unwrap();

    assert!(visualization_dir.join("BLOCKED_viz_t03.map").exists());
    assert!(visualization_dir.join("BLOCKED_viz_t04.map").exists());
    assert!(visualization_dir.join("path_viz_t02.map").exists());
    assert!(!visualization_dir.join("BLOCKED_viz_t02.map").exists());

    let blocked = std::fs::read_to_string(visualization_dir.join("BLOCKED_viz_t03.map")).unwrap();
    let rows: Vec<&str> = blocked.lines().skip(4).collect();
    assert_eq!(rows[2], "@!+++RX");
    assert!(report_path.exists());
}
