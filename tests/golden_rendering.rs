use std::fs;
use std::path::PathBuf;

use litepaint::{EngineKind, RenderConfig, RenderSession, Screenshot, Viewport};
use sha2::{Digest, Sha256};

fn golden_path(name: &str) -> PathBuf {
    let mut p = PathBuf::from("tests/goldens/expected");
    p.push(name);
    p
}

fn render_fixture(name: &str, width: u32, height: u32) -> Screenshot {
    let trace = fs::read(format!("tests/goldens/pages/{}", name)).expect("read fixture");
    let config = RenderConfig {
        viewport: Viewport { width, height },
        ..Default::default()
    };
    let mut session = RenderSession::open(EngineKind::Trace, config).expect("open session");
    session.render(&trace).expect("render fixture")
}

/// Hex SHA-256 of the decoded RGBA pixels, independent of PNG compression settings.
fn pixel_digest(shot: &Screenshot) -> String {
    let decoder = png::Decoder::new(&shot.png_data[..]);
    let mut reader = decoder.read_info().expect("decode");
    let mut buf = vec![0; reader.output_buffer_size()];
    let info = reader.next_frame(&mut buf).expect("frame");
    assert_eq!(info.color_type, png::ColorType::Rgba);
    assert_eq!(info.bit_depth, png::BitDepth::Eight);
    hex::encode(Sha256::digest(&buf[..info.buffer_size()]))
}

#[test]
fn golden_raster_matches_fixture() {
    // Opaque, pixel-aligned fills only, so the pixels are exact and font independent
    let screenshot = render_fixture("frames.trace.json", 64, 48);
    assert_eq!((screenshot.width, screenshot.height), (64, 48));
    let digest = pixel_digest(&screenshot);

    let expected_path = golden_path("frames.rgba.sha256");
    if std::env::var("UPDATE_GOLDENS").is_ok() {
        fs::create_dir_all("tests/goldens/expected").ok();
        fs::write(&expected_path, format!("{}\n", digest)).expect("write golden");
        println!("Updated golden: {:?}", expected_path);
        return;
    }

    let expected = fs::read_to_string(&expected_path).expect("unable to read golden");
    assert_eq!(digest, expected.trim());
}

#[test]
fn identical_traces_render_identically() {
    let first = render_fixture("boxes.trace.json", 256, 128);
    let second = render_fixture("boxes.trace.json", 256, 128);
    assert_eq!(first.digest(), second.digest());
}
