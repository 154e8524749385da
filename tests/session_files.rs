use std::fs;

use litepaint::rendering::paint::{parse_trace, save_trace, PaintOp};
use litepaint::{EngineKind, Error, RenderConfig, RenderSession, Viewport};

const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a];

fn small() -> RenderConfig {
    RenderConfig {
        viewport: Viewport { width: 32, height: 32 },
        ..Default::default()
    }
}

#[test]
fn render_file_writes_png_next_to_input() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("page.trace.json");
    fs::write(&input, r#"[{"op": "drawBackground", "x": 0, "y": 0, "w": 4, "h": 4, "color": 255}]"#).unwrap();

    let mut session = RenderSession::open(EngineKind::Trace, small()).unwrap();
    let (out, shot) = session.render_file(&input).unwrap();

    assert_eq!(out, dir.path().join("page.trace.json.png"));
    let written = fs::read(&out).unwrap();
    assert_eq!(written[..8], PNG_SIGNATURE);
    assert_eq!(written, shot.png_data);
    session.close().unwrap();
}

#[test]
fn missing_input_is_an_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let mut session = RenderSession::open(EngineKind::Trace, small()).unwrap();
    let err = session.render_file(dir.path().join("absent.json")).unwrap_err();
    assert!(matches!(err, Error::Io(_)));
}

#[test]
fn recorded_trace_replays_to_the_same_image() {
    let dir = tempfile::tempdir().unwrap();
    let trace = br#"[
        {"op": "drawBackground", "x": 2, "y": 2, "w": 20, "h": 10, "color": 16711935},
        {"op": "drawMarker", "x": 4, "y": 16, "w": 6, "h": 6, "mt": 3, "color": 255}
    ]"#;

    let mut session = RenderSession::open(EngineKind::Trace, small()).unwrap();
    session.set_recording(true);
    let first = session.render(trace).unwrap();
    assert_eq!(session.trace().len(), 2);

    let saved = dir.path().join("saved.trace.json");
    save_trace(session.trace(), &saved).unwrap();
    let reloaded = parse_trace(&fs::read(&saved).unwrap()).unwrap();
    assert!(matches!(reloaded[1], PaintOp::DrawMarker { mt: 3, .. }));

    let (_, second) = session.render_file(&saved).unwrap();
    assert_eq!(first.digest(), second.digest());
}

#[test]
fn config_file_overrides_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.json");
    fs::write(&path, r#"{"viewport": {"width": 64, "height": 48}, "ppi": 72}"#).unwrap();

    let config = RenderConfig::from_json_file(&path).unwrap();
    assert_eq!(config.viewport, Viewport { width: 64, height: 48 });
    assert_eq!(config.ppi, 72);
    assert_eq!(config.default_face, "Times New Roman");

    fs::write(&path, r#"{"ppi": 0}"#).unwrap();
    assert!(matches!(RenderConfig::from_json_file(&path), Err(Error::ConfigError(_))));
}
