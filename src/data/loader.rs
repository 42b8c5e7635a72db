use super::fiducials::FiducialList;
use super::transform::Transform;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::path::Path;

fn parse_by_content<T: DeserializeOwned>(content: &str) -> crate::Result<T> {
    if content.trim_start().starts_with('{') {
        Ok(serde_json::from_str(content)?)
    } else {
        Ok(toml::from_str(content)?)
    }
}

fn write_json<T: Serialize, P: AsRef<Path>>(value: &T, path: P) -> crate::Result<()> {
    fs::write(path, serde_json::to_string_pretty(value)?)?;
    Ok(())
}

/// Load a fiducial list from JSON or TOML, picked by file content
pub fn load_fiducial_list<P: AsRef<Path>>(path: P) -> crate::Result<FiducialList> {
    let path = path.as_ref();
    let content = fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Failed to read fiducial list {:?}: {}", path, e))?;
    let list: FiducialList = parse_by_content(&content)?;
    tracing::debug!(path = ?path, name = %list.name, count = list.len(), "Loaded fiducial list");
    Ok(list)
}

pub fn save_fiducial_list<P: AsRef<Path>>(list: &FiducialList, path: P) -> crate::Result<()> {
    write_json(list, path)
}

/// Load a 4x4 transform (`{"matrix": [[..], ..]}`), JSON or TOML
pub fn load_transform<P: AsRef<Path>>(path: P) -> crate::Result<Transform> {
    let path = path.as_ref();
    let content = fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Failed to read transform {:?}: {}", path, e))?;
    parse_by_content(&content)
}

pub fn save_transform<P: AsRef<Path>>(transform: &Transform, path: P) -> crate::Result<()> {
    write_json(transform, path)
}

pub fn validate_fiducial_count(list: &FiducialList, min_count: usize) -> crate::Result<()> {
    if list.len() < min_count {
        return Err(anyhow::anyhow!(
            "Fiducial list '{}' has {} fiducials, minimum: {}",
            list.name,
            list.len(),
            min_count
        ));
    }
    Ok(())
}
