use fiducial_registration::wizard::{STATUS_OUTPUT_MISSING, STATUS_SUCCESS};
use fiducial_registration::*;
use nalgebra::{Matrix3, Rotation3, Vector3};

fn reference_list() -> FiducialList {
    FiducialList::from_points(
        "From",
        &[
            Point::new(10.0, 0.0, 0.0),
            Point::new(0.0, 10.0, 0.0),
            Point::new(0.0, 0.0, 10.0),
            Point::new(-10.0, -10.0, 0.0),
        ],
    )
}

fn moved_list(transform: &Transform) -> FiducialList {
    let points: Vec<Point> = reference_list()
        .to_point_set()
        .iter()
        .map(|p| transform.transform_point(p))
        .collect();
    FiducialList::from_points("To", &points)
}

fn known_transform(scale: f64) -> Transform {
    Transform::from_parts(
        scale,
        &Rotation3::from_euler_angles(0.5, 0.1, -0.3).into_inner(),
        &Vector3::new(5.0, -5.0, 20.0),
    )
}

#[test]
fn test_missing_list_status() {
    let mut wizard = RegistrationWizard::new();
    let mut node = LinearTransformNode::new("Out");
    let list = reference_list();

    assert_eq!(
        wizard.calculate_transform(None, Some(&list), Some(&mut node), "RigidBody"),
        "One or more fiducial lists not defined."
    );
    assert_eq!(
        wizard.calculate_transform(Some(&list), None, Some(&mut node), "RigidBody"),
        "One or more fiducial lists not defined."
    );
    assert_eq!(node.matrix_to_parent, Transform::identity());
}

#[test]
fn test_missing_output_status() {
    let mut wizard = RegistrationWizard::new();
    let list = reference_list();
    assert_eq!(
        wizard.calculate_transform(Some(&list), Some(&list), None, "RigidBody"),
        STATUS_OUTPUT_MISSING
    );
}

#[test]
fn test_too_few_and_unequal_status() {
    let mut wizard = RegistrationWizard::new();
    let mut node = LinearTransformNode::new("Out");
    let full = reference_list();
    let short = FiducialList::from_points("Short", &[Point::origin(), Point::new(1.0, 0.0, 0.0)]);
    let mut three = reference_list();
    three.fiducials.pop();

    assert_eq!(
        wizard.calculate_transform(Some(&short), Some(&full), Some(&mut node), "RigidBody"),
        "One or more fiducial lists has too few fiducials."
    );
    assert_eq!(
        wizard.calculate_transform(Some(&three), Some(&full), Some(&mut node), "RigidBody"),
        "Fiducial lists have unequal number of fiducials."
    );
    assert_eq!(node.matrix_to_parent, Transform::identity());
    assert!(wizard.last_registration_error().is_none());
}

#[test]
fn test_similarity_written_to_output() {
    let mut wizard = RegistrationWizard::new();
    let mut node = LinearTransformNode::new("Out");
    let truth = known_transform(3.0);

    let status = wizard.calculate_transform(
        Some(&reference_list()),
        Some(&moved_list(&truth)),
        Some(&mut node),
        "Similarity",
    );

    assert_eq!(status, STATUS_SUCCESS);
    assert!((node.matrix_to_parent.matrix() - truth.matrix()).norm() < 1e-9);
    assert!(wizard.last_registration_error().unwrap() < 1e-9);
}

#[test]
fn test_unknown_mode_falls_back_to_rigid() {
    let mut wizard = RegistrationWizard::new();
    let mut node = LinearTransformNode::new("Out");
    let truth = known_transform(2.0);

    let status = wizard.calculate_transform(
        Some(&reference_list()),
        Some(&moved_list(&truth)),
        Some(&mut node),
        "Similarty",
    );

    assert_eq!(status, STATUS_SUCCESS);
    assert!((node.matrix_to_parent.scale() - 1.0).abs() < 1e-12);
    assert!(wizard.last_registration_error().unwrap() > 1.0);
}

#[test]
fn test_probe_captures_build_registrable_list() {
    let mut wizard = RegistrationWizard::new();
    wizard.set_active_list(FiducialList::new("Probe"));
    let truth = known_transform(1.0);

    for point in reference_list().to_point_set() {
        let tip = truth.transform_point(&point);
        // Probe orientation varies between captures; only the tip position is stored
        let pose = Transform::from_parts(1.0, &Rotation3::from_euler_angles(tip.x, 0.0, 0.0).into_inner(), &tip.coords);
        wizard.add_fiducial(Some(&pose));
    }

    let probe_list = wizard.take_active_list().unwrap();
    assert_eq!(probe_list.len(), 4);
    assert_eq!(probe_list.fiducials[3].label, "Probe-4");

    let mut node = LinearTransformNode::new("ImageToProbe");
    let status = wizard.calculate_transform(Some(&reference_list()), Some(&probe_list), Some(&mut node), "RigidBody");
    assert_eq!(status, STATUS_SUCCESS);
    assert!((node.matrix_to_parent.rotation() - truth.rotation()).norm() < 1e-9);
    assert!(node.matrix_to_parent.rotation() != Matrix3::identity());
}
