//! Texture export.
//!
//! Textures are embedded in materials by file name. The file itself is copied
//! next to the document at most once per source path, converting formats the
//! runtime cannot load. Two sources with the same file name get distinct
//! output names when copied, so neither overwrites the other.

use super::ExportContext;
use crate::document::BabylonTexture;
use crate::error::{ExportError, Result};
use crate::host::HostTexture;
use crate::registry::{TextureRecord, TextureStatus};
use std::path::Path;

/// Extensions the runtime loads directly.
const NATIVE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "bmp", "gif", "dds", "tga"];

/// Extensions converted to PNG when copied.
const CONVERTED_EXTENSIONS: &[&str] = &["tif", "tiff"];

/// Build the texture entity for one material slot.
///
/// Problems are reported as warnings on `ctx` and yield `None`; a broken
/// texture never fails the material that uses it. Each source path is
/// reported at most once per export.
pub fn export_texture(texture: &HostTexture, ctx: &mut ExportContext) -> Option<BabylonTexture> {
    let record = match ctx.textures.get(&texture.path) {
        Some(TextureStatus::Exported(record)) => record.clone(),
        Some(TextureStatus::Failed) => return None,
        None => match first_sighting(texture, ctx) {
            Ok(record) => {
                ctx.textures.insert(&texture.path, record.clone());
                record
            }
            Err(e) => {
                ctx.textures.mark_failed(&texture.path);
                ctx.warn(e.to_string(), 2);
                return None;
            }
        },
    };

    Some(BabylonTexture {
        name: record.output_name,
        level: texture.level,
        has_alpha: texture.has_alpha.unwrap_or(record.has_alpha),
        coordinates_mode: 0,
        coordinates_index: texture.coordinates_index,
        u_offset: texture.u_offset,
        v_offset: texture.v_offset,
        u_scale: texture.u_scale,
        v_scale: texture.v_scale,
        wrap_u: texture.wrap_u as u32,
        wrap_v: texture.wrap_v as u32,
    })
}

fn first_sighting(texture: &HostTexture, ctx: &mut ExportContext) -> Result<TextureRecord> {
    let path = &texture.path;
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| ExportError::Texture(format!("Invalid texture path {:?}", path)))?;
    let extension = extension_of(path);

    let convert = CONVERTED_EXTENSIONS.contains(&extension.as_str());
    if !convert && !NATIVE_EXTENSIONS.contains(&extension.as_str()) {
        return Err(ExportError::Texture(format!(
            "Texture format not supported: {}",
            file_name
        )));
    }
    if !path.is_file() {
        return Err(ExportError::Texture(format!(
            "Texture not found: {}",
            path.display()
        )));
    }

    let output_name = if convert {
        Path::new(file_name)
            .with_extension("png")
            .to_string_lossy()
            .into_owned()
    } else {
        file_name.to_string()
    };
    let output_name = resolve_name_clash(path, output_name, ctx);

    // An explicit flag from the host spares decoding the bitmap.
    let has_alpha = match texture.has_alpha {
        Some(flag) => flag,
        None => detect_alpha(path, &extension)?,
    };

    if ctx.options.copy_textures_to_output {
        let destination = ctx.scene.output_path.join(&output_name);
        if destination != *path {
            if convert {
                image::open(path)?.save_with_format(&destination, image::ImageFormat::Png)?;
            } else {
                std::fs::copy(path, &destination)?;
            }
            ctx.textures_copied += 1;
        }
    }

    Ok(TextureRecord {
        output_name,
        has_alpha,
    })
}

/// Keep `output_name` unless another source already claimed it. When files
/// are copied the newcomer is renamed; otherwise both share the name and a
/// warning says so.
fn resolve_name_clash(path: &Path, output_name: String, ctx: &mut ExportContext) -> String {
    let other = match ctx.textures.claimant(&output_name) {
        Some(other) if other != path => other.to_path_buf(),
        _ => return output_name,
    };

    if ctx.options.copy_textures_to_output {
        let renamed = ctx.textures.unique_name(&output_name);
        ctx.warn(
            format!(
                "Texture {} copied as {} because {} already uses {}",
                path.display(),
                renamed,
                other.display(),
                output_name
            ),
            2,
        );
        renamed
    } else {
        ctx.warn(
            format!(
                "Textures {} and {} share the file name {}",
                other.display(),
                path.display(),
                output_name
            ),
            2,
        );
        output_name
    }
}

fn extension_of(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default()
}

/// Whether any pixel is not fully opaque. Formats we cannot decode are
/// assumed opaque.
fn detect_alpha(path: &Path, extension: &str) -> Result<bool> {
    if !matches!(extension, "png" | "tif" | "tiff") {
        return Ok(false);
    }
    let img = image::open(path)?;
    if !img.color().has_alpha() {
        return Ok(false);
    }
    Ok(img.to_rgba8().pixels().any(|p| p[3] < 255))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::BabylonScene;
    use crate::pipeline::ExportOptions;
    use image::{Rgba, RgbaImage};

    fn write_png(path: &Path, alpha: u8) {
        let img = RgbaImage::from_pixel(2, 2, Rgba([255, 0, 0, alpha]));
        img.save(path).unwrap();
    }

    fn context_in(dir: &Path, copy: bool) -> ExportContext {
        let options = ExportOptions::default().with_copy_textures(copy);
        ExportContext::new(BabylonScene::new(dir), options)
    }

    #[test]
    fn test_texture_copied_once() {
        let source = tempfile::tempdir().unwrap();
        let output = tempfile::tempdir().unwrap();
        let path = source.path().join("wood.png");
        write_png(&path, 255);

        let mut ctx = context_in(output.path(), true);
        let texture = HostTexture::new(&path);
        let first = export_texture(&texture, &mut ctx).unwrap();
        let second = export_texture(&texture, &mut ctx).unwrap();

        assert_eq!(first, second);
        assert_eq!(first.name, "wood.png");
        assert!(!first.has_alpha);
        assert_eq!(ctx.textures_copied, 1);
        assert!(output.path().join("wood.png").is_file());
    }

    #[test]
    fn test_alpha_detected_from_pixels() {
        let source = tempfile::tempdir().unwrap();
        let path = source.path().join("leaves.png");
        write_png(&path, 128);

        let mut ctx = context_in(source.path(), false);
        let texture = export_texture(&HostTexture::new(&path), &mut ctx).unwrap();
        assert!(texture.has_alpha);
        assert_eq!(ctx.textures_copied, 0);
    }

    #[test]
    fn test_tiff_converted_to_png() {
        let source = tempfile::tempdir().unwrap();
        let output = tempfile::tempdir().unwrap();
        let path = source.path().join("stone.tif");
        RgbaImage::from_pixel(2, 2, Rgba([10, 20, 30, 255]))
            .save_with_format(&path, image::ImageFormat::Tiff)
            .unwrap();

        let mut ctx = context_in(output.path(), true);
        let texture = export_texture(&HostTexture::new(&path), &mut ctx).unwrap();
        assert_eq!(texture.name, "stone.png");
        assert!(output.path().join("stone.png").is_file());
    }

    #[test]
    fn test_missing_texture_is_a_warning() {
        let mut ctx = context_in(Path::new("/tmp"), false);
        let texture = HostTexture::new("/definitely/not/here.png");

        assert!(export_texture(&texture, &mut ctx).is_none());
        let notes = ctx.take_notes();
        assert_eq!(notes.len(), 1);
        assert!(notes[0].text.contains("Texture not found"));
    }

    #[test]
    fn test_same_file_name_from_two_folders() {
        let source = tempfile::tempdir().unwrap();
        let output = tempfile::tempdir().unwrap();
        std::fs::create_dir(source.path().join("a")).unwrap();
        std::fs::create_dir(source.path().join("b")).unwrap();
        let red = source.path().join("a").join("wood.png");
        let blue = source.path().join("b").join("wood.png");
        RgbaImage::from_pixel(1, 1, Rgba([255, 0, 0, 255])).save(&red).unwrap();
        RgbaImage::from_pixel(1, 1, Rgba([0, 0, 255, 255])).save(&blue).unwrap();

        let mut ctx = context_in(output.path(), true);
        let first = export_texture(&HostTexture::new(&red), &mut ctx).unwrap();
        let second = export_texture(&HostTexture::new(&blue), &mut ctx).unwrap();

        assert_eq!(first.name, "wood.png");
        assert_eq!(second.name, "wood_1.png");
        assert_eq!(ctx.textures_copied, 2);
        assert_eq!(ctx.take_notes().len(), 1);

        let kept = image::open(output.path().join("wood.png")).unwrap().to_rgba8();
        assert_eq!(kept.get_pixel(0, 0), &Rgba([255, 0, 0, 255]));
        let renamed = image::open(output.path().join("wood_1.png")).unwrap().to_rgba8();
        assert_eq!(renamed.get_pixel(0, 0), &Rgba([0, 0, 255, 255]));
    }

    #[test]
    fn test_shared_file_name_without_copy_warns() {
        let source = tempfile::tempdir().unwrap();
        std::fs::create_dir(source.path().join("a")).unwrap();
        std::fs::create_dir(source.path().join("b")).unwrap();
        let first = source.path().join("a").join("wood.png");
        let second = source.path().join("b").join("wood.png");
        write_png(&first, 255);
        write_png(&second, 255);

        let mut ctx = context_in(source.path(), false);
        export_texture(&HostTexture::new(&first), &mut ctx).unwrap();
        let texture = export_texture(&HostTexture::new(&second), &mut ctx).unwrap();

        assert_eq!(texture.name, "wood.png");
        let notes = ctx.take_notes();
        assert_eq!(notes.len(), 1);
        assert!(notes[0].text.contains("share the file name"));
    }

    #[test]
    fn test_missing_texture_reported_once() {
        let mut ctx = context_in(Path::new("/tmp"), false);
        let texture = HostTexture::new("/definitely/not/here.png");

        assert!(export_texture(&texture, &mut ctx).is_none());
        assert!(export_texture(&texture, &mut ctx).is_none());
        assert_eq!(ctx.take_notes().len(), 1);
        assert_eq!(ctx.textures.get(&texture.path), Some(&TextureStatus::Failed));
    }

    #[test]
    fn test_unsupported_format() {
        let mut ctx = context_in(Path::new("/tmp"), false);
        let texture = HostTexture::new("maps/scene.psd");

        assert!(export_texture(&texture, &mut ctx).is_none());
        assert!(ctx.take_notes()[0].text.contains("not supported"));
    }
}
