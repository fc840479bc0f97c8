//! Integration tests for the wave field solver.

use waveframe_waves::{StencilCoefficients, WaveConfig, WaveError, WaveField};

const EPS: f32 = 1e-5;

fn unit_config(rows: usize, cols: usize) -> WaveConfig {
    WaveConfig {
        rows,
        cols,
        spatial_step: 1.0,
        time_step: 0.1,
        speed: 1.0,
        damping: 0.0,
    }
}

fn boundary_heights(field: &WaveField) -> Vec<f32> {
    let (rows, cols) = (field.row_count(), field.column_count());
    (0..rows)
        .flat_map(|i| (0..cols).map(move |j| (i, j)))
        .filter(|&(i, j)| i == 0 || j == 0 || i == rows - 1 || j == cols - 1)
        .map(|(i, j)| field.height(i, j).unwrap())
        .collect()
}

#[test]
fn test_single_step_matches_stencil() {
    let mut field = WaveField::new(unit_config(5, 5)).unwrap();
    let StencilCoefficients { k1, k2, k3 } = field.coefficients();
    assert!((k1 + 1.0).abs() < EPS);
    assert!((k2 - 1.96).abs() < EPS);
    assert!((k3 - 0.01).abs() < EPS);

    field.disturb(2, 2, 1.0).unwrap();
    assert!(field.update(0.1));

    // hPrev = 0, hCurr = 1, neighbours sum to 2
    let expected = k1 * 0.0 + k2 * 1.0 + k3 * 2.0;
    assert!((field.height(2, 2).unwrap() - expected).abs() < EPS);
    assert!((field.height(2, 2).unwrap() - 1.98).abs() < EPS);

    // hCurr = 0.5, neighbours: centre 1.0 plus three flat cells
    assert!((field.height(1, 2).unwrap() - 0.99).abs() < EPS);
    assert!((field.height(2, 1).unwrap() - 0.99).abs() < EPS);
}

#[test]
fn test_four_by_four_has_no_disturbable_cell() {
    let mut field = WaveField::new(unit_config(4, 4)).unwrap();
    for i in 0..4 {
        for j in 0..4 {
            assert!(matches!(
                field.disturb(i, j, 1.0),
                Err(WaveError::OutOfBounds { rows: 4, cols: 4, .. })
            ));
        }
    }
    assert!(field.positions().iter().all(|p| p.y == 0.0));
}

#[test]
fn test_disturb_weights() {
    let mut field = WaveField::new(unit_config(8, 8)).unwrap();
    field.disturb(3, 4, 0.8).unwrap();
    assert_eq!(field.height(3, 4), Some(0.8));
    for (i, j) in [(2, 4), (4, 4), (3, 3), (3, 5)] {
        assert_eq!(field.height(i, j), Some(0.4));
    }
    assert_eq!(field.height(2, 3), Some(0.0));

    // Stacks on top of existing heights.
    field.disturb(3, 4, 0.8).unwrap();
    assert_eq!(field.height(3, 4), Some(1.6));
}

#[test]
fn test_disturb_rejects_edge_band() {
    let mut field = WaveField::new(unit_config(10, 10)).unwrap();
    for (i, j) in [(1, 5), (5, 1), (8, 5), (5, 8), (0, 0), (9, 9), (50, 5)] {
        assert_eq!(
            field.disturb(i, j, 1.0),
            Err(WaveError::OutOfBounds {
                row: i,
                col: j,
                rows: 10,
                cols: 10
            })
        );
    }
    field.disturb(2, 2, 1.0).unwrap();
    field.disturb(7, 7, 1.0).unwrap();
}

#[test]
fn test_sub_threshold_updates_accumulate() {
    let mut field = WaveField::new(unit_config(6, 6)).unwrap();
    field.disturb(2, 2, 1.0).unwrap();
    let before: Vec<f32> = field.positions().iter().map(|p| p.y).collect();

    assert!(!field.update(0.03));
    assert!(!field.update(0.03));
    assert!(!field.update(0.03));
    assert_eq!(field.steps_taken(), 0);
    let after: Vec<f32> = field.positions().iter().map(|p| p.y).collect();
    assert_eq!(before, after);

    assert!(field.update(0.03));
    assert_eq!(field.steps_taken(), 1);
    assert_eq!(field.accumulated_time(), 0.0);
}

#[test]
fn test_large_dt_runs_one_step() {
    let mut field = WaveField::new(unit_config(6, 6)).unwrap();
    assert!(field.update(5.0));
    assert_eq!(field.steps_taken(), 1);
    assert_eq!(field.accumulated_time(), 0.0);
}

#[test]
fn test_boundary_never_moves() {
    let mut field = WaveField::new(WaveConfig {
        rows: 16,
        cols: 12,
        ..WaveConfig::default()
    })
    .unwrap();
    field.disturb(2, 2, 2.0).unwrap();
    field.disturb(13, 9, 1.0).unwrap();
    let boundary = boundary_heights(&field);

    for _ in 0..200 {
        field.update(field.time_step());
    }
    assert_eq!(boundary_heights(&field), boundary);
}

#[test]
fn test_normals_and_tangents_stay_unit() {
    let mut field = WaveField::new(unit_config(12, 12)).unwrap();
    field.disturb(5, 6, 1.0).unwrap();
    for _ in 0..20 {
        field.update(0.1);
    }
    for (n, t) in field.normals().iter().zip(field.tangents()) {
        assert!((n.length() - 1.0).abs() < 1e-4);
        assert!((t.length() - 1.0).abs() < 1e-4);
        assert!(n.y > 0.0);
    }
}

#[test]
fn test_flat_field_stays_flat() {
    let mut field = WaveField::new(unit_config(9, 9)).unwrap();
    for _ in 0..10 {
        field.update(0.1);
    }
    assert!(field.positions().iter().all(|p| p.y == 0.0));
    assert!(field.normals().iter().all(|n| *n == glam::Vec3::Y));
}

#[test]
fn test_degenerate_construction_fails() {
    assert!(matches!(
        WaveField::new(unit_config(2, 10)),
        Err(WaveError::InvalidConfig(_))
    ));
    assert!(matches!(
        WaveField::new(WaveConfig {
            spatial_step: 0.0,
            ..unit_config(8, 8)
        }),
        Err(WaveError::InvalidConfig(_))
    ));
    assert!(matches!(
        WaveField::new(WaveConfig {
            speed: 10.0,
            ..unit_config(8, 8)
        }),
        Err(WaveError::Unstable { .. })
    ));
}

#[test]
fn test_accessors_match_grid() {
    let field = WaveField::new(WaveConfig {
        rows: 4,
        cols: 3,
        spatial_step: 0.5,
        ..WaveConfig::default()
    })
    .unwrap();
    assert_eq!(field.row_count(), 4);
    assert_eq!(field.column_count(), 3);
    assert_eq!(field.vertex_count(), 12);
    assert_eq!(field.triangle_count(), 12);
    assert_eq!(field.width(), 1.5);
    assert_eq!(field.depth(), 2.0);
    assert_eq!(field.position(0).x, -0.5);
    assert_eq!(field.position(0).z, 0.75);
    assert_eq!(field.height(4, 0), None);
}
