use std::f64::consts::{FRAC_PI_4, PI};

use approx::{assert_abs_diff_eq, assert_relative_eq};
use ase_core::{AseError, GeomContext, Tolerance};
use ase_geometry::batch::{closest_points, evaluate_grid};
use ase_geometry::persist::{restore_text, save_text, CURRENT_VERSION};
use ase_geometry::{AnalyticSurface, Cone, Ellipse, FootQuality, Plane, Sphere, Surface, Torus, TorusShape};
use ase_math::{DVec2, DVec3, Interval, ParamBox, Transform};

fn ctx() -> GeomContext {
    GeomContext::default()
}

#[test]
fn test_sphere_radius_five() {
    let sphere = Sphere::new(DVec3::ZERO, 5.0);

    let p = sphere.eval_position(DVec2::ZERO);
    assert_abs_diff_eq!((p - 5.0 * sphere.uv_oridir).length(), 0.0, epsilon = 1e-12);

    let a = sphere.closest_point(DVec3::ZERO, None, &ctx());
    let b = sphere.closest_point(DVec3::ZERO, None, &ctx());
    assert_eq!(a.param, b.param);
    assert_relative_eq!(a.distance, 5.0, epsilon = 1e-12);

    for uv in [DVec2::new(0.0, 0.0), DVec2::new(1.2, -2.0), DVec2::new(-0.7, 3.0)] {
        let pc = sphere.eval_curvature(uv, &ctx());
        assert_relative_eq!(pc.k1, 0.2, epsilon = 1e-12);
        assert_relative_eq!(pc.k2, 0.2, epsilon = 1e-12);
    }
}

#[test]
fn test_doughnut_and_apple_ranges() {
    let doughnut = Torus::new(DVec3::ZERO, DVec3::Z, 10.0, 3.0);
    assert_eq!(doughnut.shape(&Tolerance::default()), TorusShape::Doughnut);
    assert!(doughnut.periodic_u(&ctx()));
    let range = doughnut.param_range_u(None, &ctx());
    assert_relative_eq!(range.lo, -PI);
    assert_relative_eq!(range.hi, PI);

    let apple = Torus::new(DVec3::ZERO, DVec3::Z, 1.0, 3.0);
    assert_eq!(apple.shape(&Tolerance::default()), TorusShape::Apple);
    assert!(!apple.periodic_u(&ctx()));
    let big_u = (-1.0f64 / 3.0).acos();
    let range = apple.param_range_u(None, &ctx());
    assert_relative_eq!(range.lo, -big_u, epsilon = 1e-12);
    assert_relative_eq!(range.hi, big_u, epsilon = 1e-12);
    assert!(apple.singular_u(big_u, &ctx()));
}

#[test]
fn test_cone_apex_and_cylinder() {
    let tol = Tolerance::default();
    let cone = Cone::circular(DVec3::ZERO, DVec3::Z, DVec3::X, 1.0, FRAC_PI_4);
    assert!(!cone.cylinder(&tol));
    let apex = cone.apex(&tol).unwrap();
    let fp = cone.closest_point(apex, None, &ctx());
    assert_abs_diff_eq!((fp.foot - apex).length(), 0.0, epsilon = 1e-12);

    let cylinder = Cone::cylinder_from(DVec3::ZERO, DVec3::Z, DVec3::X, 2.0);
    assert!(cylinder.cylinder(&tol));
    assert!(cylinder.apex(&tol).is_none());
    assert!(cylinder.param_range_u(None, &ctx()).is_infinite());

    let nearly = Cone::circular(DVec3::ZERO, DVec3::Z, DVec3::X, 1.0, 1e-12);
    assert!(nearly.cylinder(&tol));
}

#[test]
fn test_elliptical_cone_reports_solver_quality() {
    let base = Ellipse::new(DVec3::ZERO, DVec3::Z, DVec3::new(3.0, 0.0, 0.0), 0.4);
    let cone = Cone::new(base, 0.2, 0.98f64.sqrt());
    let fp = cone.closest_point(DVec3::new(1.0, 4.0, 2.0), None, &ctx());
    assert!(fp.quality.is_converged());
    assert!(!matches!(fp.quality, FootQuality::Exact));
    assert_abs_diff_eq!((cone.eval_position(fp.param) - fp.foot).length(), 0.0, epsilon = 1e-12);
}

#[test]
fn test_similarity_only_for_round_surfaces() {
    let stretch = Transform::from_non_uniform_scale(DVec3::new(1.0, 2.0, 1.0));
    let mut sphere = Sphere::new(DVec3::ZERO, 1.0);
    assert!(matches!(sphere.transform(&stretch), Err(AseError::Transform(_))));
    let mut torus = Torus::new(DVec3::ZERO, DVec3::Z, 3.0, 1.0);
    assert!(torus.transform(&stretch).is_err());

    let mut plane = Plane::xy();
    assert!(plane.transform(&stretch).is_ok());
    assert!(plane.transform(&Transform::from_scale(0.0)).is_err());
}

#[test]
fn test_persistence_across_versions() {
    let mut torus = Torus::new(DVec3::new(1.0, 0.0, 0.0), DVec3::Y, 4.0, 1.5);
    torus.limit(&ParamBox::new(Interval::new(-1.0, 2.0), Interval::infinite()), &ctx());
    let surface: AnalyticSurface = torus.into();

    let text = save_text(&surface, CURRENT_VERSION).unwrap();
    let back = restore_text(&text, CURRENT_VERSION).unwrap();
    assert!(back.approx_eq(&surface, &Tolerance::default()));
    assert!(back.is_subsetted());

    // Before subset ranges were recorded the trim box is dropped.
    let text = save_text(&surface, 300).unwrap();
    let back = restore_text(&text, 300).unwrap();
    assert!(!back.is_subsetted());
    let mut unlimited = surface.clone();
    unlimited.unlimit();
    assert!(back.approx_eq(&unlimited, &Tolerance::default()));
}

#[test]
fn test_batch_queries_on_mixed_surfaces() {
    let surfaces: Vec<AnalyticSurface> = vec![
        Plane::xy().into(),
        Sphere::new(DVec3::ZERO, 2.0).into(),
        Torus::new(DVec3::ZERO, DVec3::Z, 5.0, 1.0).into(),
        Cone::circular(DVec3::ZERO, DVec3::Z, DVec3::X, 1.0, 0.4).into(),
    ];
    let queries: Vec<DVec3> = (0..40)
        .map(|i| {
            let a = i as f64 * 0.37;
            DVec3::new(6.0 * a.cos(), 6.0 * a.sin(), 0.5 * a - 3.0)
        })
        .collect();
    for s in &surfaces {
        let feet = closest_points(s, &queries, &ctx());
        for (q, fp) in queries.iter().zip(&feet) {
            assert_abs_diff_eq!((*q - fp.foot).length(), fp.distance, epsilon = 1e-9);
        }
    }

    let pbox = ParamBox::new(Interval::new(-0.5, 0.5), Interval::new(-1.0, 1.0));
    let grid = evaluate_grid(&surfaces[2], &pbox, 3, 3, &ctx()).unwrap();
    assert_eq!(grid.len(), 9);
    assert!(grid.iter().all(|ev| ev.derivs[0].len() == 2));
}
