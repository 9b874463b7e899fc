#![allow(clippy::float_cmp)]

use super::*;

fn raw(width: &str, height: &str, quality: &str, format: &str, background: &str, color: &str) -> RawExportSettings {
    RawExportSettings {
        width: width.to_owned(),
        height: height.to_owned(),
        quality: quality.to_owned(),
        format: format.to_owned(),
        background: background.to_owned(),
        background_color: color.to_owned(),
    }
}

// =============================================================
// Settings
// =============================================================

#[test]
fn defaults() {
    let s = ExportSettings::default();
    assert_eq!((s.width, s.height), (1920, 1080));
    assert_eq!(s.quality, 0.9);
    assert_eq!(s.background, Background::Scene);
    assert_eq!(s.format, ImageFormat::Png);
    assert!(s.watermark);
}

#[test]
fn from_raw_parses_values() {
    let s = ExportSettings::from_raw(&raw("800", "600", "0.5", "jpeg", "custom", "#102030"));
    assert_eq!((s.width, s.height), (800, 600));
    assert_eq!(s.quality, 0.5);
    assert_eq!(s.format, ImageFormat::Jpeg);
    assert_eq!(s.background, Background::Custom(Rgb::new(0x10, 0x20, 0x30)));
}

#[test]
fn from_raw_rejects_zero_and_garbage_dimensions() {
    let s = ExportSettings::from_raw(&raw("0", "tall", "", "", "", ""));
    assert_eq!((s.width, s.height), (1920, 1080));
    assert_eq!(s.quality, 0.9);
    assert_eq!(s.format, ImageFormat::Png);
    assert_eq!(s.background, Background::Scene);
}

#[test]
fn from_raw_clamps_quality() {
    assert_eq!(ExportSettings::from_raw(&raw("", "", "3", "", "", "")).quality, 1.0);
    assert_eq!(ExportSettings::from_raw(&raw("", "", "-1", "", "", "")).quality, 0.0);
}

#[test]
fn bad_custom_color_falls_back_to_scene() {
    assert_eq!(Background::from_parts("custom", "nope"), Background::Scene);
    assert_eq!(Background::from_parts("transparent", ""), Background::Transparent);
    assert_eq!(Background::from_parts("sparkles", ""), Background::Scene);
}

#[test]
fn raw_settings_deserialize_with_missing_fields() {
    let parsed: Result<RawExportSettings, _> = serde_json::from_str(r#"{"width":"640","format":"webp"}"#);
    let Ok(parsed) = parsed else {
        panic!("parse failed");
    };
    let s = ExportSettings::from_raw(&parsed);
    assert_eq!(s.width, 640);
    assert_eq!(s.height, 1080);
    assert_eq!(s.format, ImageFormat::Webp);
}

// =============================================================
// Background resolution
// =============================================================

#[test]
fn transparent_only_for_png() {
    let mut s = ExportSettings { background: Background::Transparent, ..Default::default() };
    assert_eq!(s.resolved_background(), None);
    s.format = ImageFormat::Jpeg;
    assert_eq!(s.resolved_background(), Some(Rgb::from_hex(0x0024_2424)));
}

#[test]
fn scene_and_custom_backgrounds() {
    let mut s = ExportSettings::default();
    assert_eq!(s.resolved_background(), Some(Rgb::from_hex(0x0024_2424)));
    s.background = Background::Custom(Rgb::new(1, 2, 3));
    assert_eq!(s.resolved_background(), Some(Rgb::new(1, 2, 3)));
}

// =============================================================
// Sizing and naming
// =============================================================

#[test]
fn preview_is_quarter_size_capped() {
    assert_eq!(preview_size(1920, 1080), (480, 270));
    assert_eq!(preview_size(4000, 4000), (500, 300));
    assert_eq!(preview_size(2, 2), (1, 1));
}

#[test]
fn output_size_depends_on_preview_flag() {
    let s = ExportSettings::default();
    assert_eq!(s.output_size(false), (1920, 1080));
    assert_eq!(s.output_size(true), (480, 270));
}

#[test]
fn file_name_uses_format_extension_and_safe_timestamp() {
    let name = file_name("2024-05-01T12:30:45.123Z", ImageFormat::Png);
    assert_eq!(name, "render_2024-05-01T12-30-45-123Z.png");
    assert!(file_name("t", ImageFormat::Jpeg).ends_with(".jpeg"));
    assert!(file_name("t", ImageFormat::Webp).ends_with(".webp"));
}

#[test]
fn rendered_image_is_named_after_its_encoded_format() {
    let mut settings = ExportSettings::default();
    let image = RenderedImage { data_url: "data:image/png;base64,AAAA".to_owned(), format: settings.format };
    settings.format = ImageFormat::Jpeg;
    assert_eq!(image.file_name("t"), "render_t.png");
    assert_ne!(image.file_name("t"), file_name("t", settings.format));
}

#[test]
fn format_mime_types() {
    assert_eq!(ImageFormat::Png.mime(), "image/png");
    assert_eq!(ImageFormat::Jpeg.mime(), "image/jpeg");
    assert_eq!(ImageFormat::Webp.mime(), "image/webp");
    assert_eq!(ImageFormat::from_name("JPG"), Some(ImageFormat::Jpeg));
    assert_eq!(ImageFormat::from_name("gif"), None);
}

#[test]
fn watermark_is_bottom_right() {
    let w = watermark_layout(1920.0, 1080.0);
    assert_eq!(w.font_px, 36.0);
    assert_eq!((w.x, w.y), (1900.0, 1060.0));
}

// =============================================================
// Fallback chain
// =============================================================

#[test]
fn chain_stops_at_first_success() {
    let mut tried = Vec::new();
    let stage = run_fallback_chain(|s| {
        tried.push(s);
        Ok(())
    });
    assert_eq!(stage, ExportStage::Primary);
    assert_eq!(tried, [ExportStage::Primary]);
}

#[test]
fn chain_falls_back_to_snapshot() {
    let mut tried = Vec::new();
    let stage = run_fallback_chain(|s| {
        tried.push(s);
        if s == ExportStage::Primary { Err(ExportError::NoContext) } else { Ok(()) }
    });
    assert_eq!(stage, ExportStage::Snapshot);
    assert_eq!(tried, [ExportStage::Primary, ExportStage::Snapshot]);
}

#[test]
fn chain_reaches_placeholder() {
    let mut tried = Vec::new();
    let stage = run_fallback_chain(|s| {
        tried.push(s);
        match s {
            ExportStage::Placeholder => Ok(()),
            _ => Err(ExportError::NoViewport),
        }
    });
    assert_eq!(stage, ExportStage::Placeholder);
    assert_eq!(tried, ExportStage::CHAIN);
}

#[test]
fn chain_never_fails_even_if_placeholder_does() {
    let stage = run_fallback_chain(|_| Err(ExportError::Canvas("boom".to_owned())));
    assert_eq!(stage, ExportStage::Placeholder);
}

#[test]
fn error_messages() {
    assert_eq!(ExportError::NoContext.to_string(), "2d context unavailable");
    assert_eq!(ExportError::Canvas("x".to_owned()).to_string(), "canvas call failed: x");
}
