use super::transform::{Point, PointSet, Transform};
use serde::{Deserialize, Serialize};

/// A labelled landmark marker
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fiducial {
    pub label: String,
    #[serde(with = "point_array")]
    pub position: Point,
}

/// Named, ordered list of fiducials
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FiducialList {
    pub name: String,
    #[serde(default)]
    pub fiducials: Vec<Fiducial>,
}

impl FiducialList {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            fiducials: Vec::new(),
        }
    }

    /// Build a list from bare positions, labelling them in order
    pub fn from_points(name: &str, points: &[Point]) -> Self {
        let mut list = Self::new(name);
        for point in points {
            list.add_fiducial(*point);
        }
        list
    }

    pub fn len(&self) -> usize {
        self.fiducials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fiducials.is_empty()
    }

    pub fn nth_position(&self, index: usize) -> Option<Point> {
        self.fiducials.get(index).map(|f| f.position)
    }

    /// Append a fiducial labelled `<name>-<n>` (1-based) and return its index
    pub fn add_fiducial(&mut self, position: Point) -> usize {
        let index = self.fiducials.len();
        self.fiducials.push(Fiducial {
            label: format!("{}-{}", self.name, index + 1),
            position,
        });
        index
    }

    pub fn add_fiducial_from_array(&mut self, coords: [f64; 3]) -> usize {
        self.add_fiducial(Point::new(coords[0], coords[1], coords[2]))
    }

    /// Flatten to an ordered point set, preserving list order
    pub fn to_point_set(&self) -> PointSet {
        self.fiducials.iter().map(|f| f.position).collect()
    }
}

/// Output holder for a computed registration, stored relative to its parent frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearTransformNode {
    pub name: String,
    pub matrix_to_parent: Transform,
}

impl LinearTransformNode {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            matrix_to_parent: Transform::identity(),
        }
    }

    pub fn set_matrix_transform_to_parent(&mut self, transform: Transform) {
        self.matrix_to_parent = transform;
    }
}

mod point_array {
    use super::Point;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S: Serializer>(point: &Point, serializer: S) -> Result<S::Ok, S::Error> {
        [point.x, point.y, point.z].serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Point, D::Error> {
        let [x, y, z] = <[f64; 3]>::deserialize(deserializer)?;
        Ok(Point::new(x, y, z))
    }
}
