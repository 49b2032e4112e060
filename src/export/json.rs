//! Compact JSON rendering of the document.

use crate::document::BabylonScene;
use crate::error::Result;
use std::path::Path;

/// Render the document as compact JSON.
pub fn to_json_bytes(scene: &BabylonScene) -> Result<Vec<u8>> {
    Ok(serde_json::to_vec(scene)?)
}

/// Render and write the document. Returns the number of bytes written.
pub fn write_document(scene: &BabylonScene, path: &Path) -> Result<usize> {
    let bytes = to_json_bytes(scene)?;
    std::fs::write(path, &bytes)?;
    Ok(bytes.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::BabylonMaterial;

    #[test]
    fn test_output_is_compact() {
        let mut scene = BabylonScene::new("/tmp");
        scene.materials.push(BabylonMaterial::new("material-0001", "Red"));
        let text = String::from_utf8(to_json_bytes(&scene).unwrap()).unwrap();

        assert!(!text.contains('\n'));
        assert!(!text.contains(": "));
        assert!(text.starts_with("{\"producer\":"));
        assert!(text.contains("\"materials\":[{\"name\":\"Red\",\"id\":\"material-0001\""));
    }
}
