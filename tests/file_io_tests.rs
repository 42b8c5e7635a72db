use fiducial_registration::*;
use nalgebra::{Matrix3, Vector3};
use tempfile::tempdir;

#[test]
fn test_fiducial_list_json_round_trip() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("from.json");
    let list = FiducialList::from_points(
        "F",
        &[Point::new(1.0, 2.0, 3.0), Point::new(-4.0, 5.5, 0.0), Point::new(0.0, 0.0, 9.0)],
    );

    save_fiducial_list(&list, &path).unwrap();
    let loaded = load_fiducial_list(&path).unwrap();
    assert_eq!(loaded, list);
}

#[test]
fn test_fiducial_list_from_toml() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("to.toml");
    std::fs::write(
        &path,
        r#"
name = "T"

[[fiducials]]
label = "nasion"
position = [0.0, 90.0, 10.0]

[[fiducials]]
label = "left-ear"
position = [-75.0, 0.0, 0.0]
"#,
    )
    .unwrap();

    let list = load_fiducial_list(&path).unwrap();
    assert_eq!(list.name, "T");
    assert_eq!(list.fiducials[1].label, "left-ear");
    assert_eq!(list.to_point_set()[0], Point::new(0.0, 90.0, 10.0));
    assert!(validate_fiducial_count(&list, 3).is_err());
    assert!(validate_fiducial_count(&list, 2).is_ok());
}

#[test]
fn test_transform_file_round_trip() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("transform.json");
    let transform = Transform::from_parts(1.25, &Matrix3::identity(), &Vector3::new(1.0, -2.0, 3.0));

    save_transform(&transform, &path).unwrap();
    assert_eq!(load_transform(&path).unwrap(), transform);
}

#[test]
fn test_missing_file_reports_path() {
    let err = load_fiducial_list("/nonexistent/list.json").unwrap_err();
    assert!(err.to_string().contains("list.json"));
}
