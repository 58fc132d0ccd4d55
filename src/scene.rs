use std::convert::TryFrom;
use std::path::Path;
use std::time::Duration;

use serde::{ Serialize, Deserialize };

use crate::command::Parameters;
use crate::consts::*;
use crate::geometry::TorusShape;
use crate::glyph::GlyphRamp;
use crate::screen::{ BackFaces, ScreenConfig, VerticalScale };
use crate::tuple::Vector3;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    NotFound(String),

    #[error("Failed to read configuration file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse configuration: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Everything needed to start rendering, validated.
#[derive(Clone, Debug, PartialEq)]
pub struct Scene {
    pub torus: TorusShape,
    pub screen: ScreenConfig,

    /// The starting values of the adjustable parameters.
    pub parameters: Parameters,

    /// Wall-clock time between frame ticks.
    pub frame_interval: Duration,
}

/// The on-disk form of a `Scene`.
///
/// Every field is optional in the JSON file; missing ones take the built-in
/// defaults. Vectors are plain `[x, y, z]` arrays. For example:
///
/// ```json
/// {
///     "tube_radius": 1.0,
///     "ring_radius": 2.0,
///     "light": [0.0, 1.0, -1.0],
///     "back_faces": "retain"
/// }
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SceneJson {
    pub tube_radius: f64,
    pub ring_radius: f64,
    pub theta_step: f64,
    pub phi_step: f64,

    pub speed1: f64,
    pub speed2: f64,

    pub width: usize,
    pub height: usize,
    pub perspective_scale: f64,
    pub viewer_distance: f64,
    pub glyph_ramp: String,
    pub back_faces: BackFaces,
    pub vertical_scale: VerticalScale,

    pub light: [f64; 3],
    pub frame_interval_ms: u64,
}

impl Default for SceneJson {
    fn default() -> SceneJson {
        SceneJson {
            tube_radius: TUBE_RADIUS,
            ring_radius: RING_RADIUS,
            theta_step: THETA_STEP,
            phi_step: PHI_STEP,

            speed1: SPEED1,
            speed2: SPEED2,

            width: SCREEN_WIDTH,
            height: SCREEN_HEIGHT,
            perspective_scale: PERSPECTIVE_SCALE,
            viewer_distance: VIEWER_DISTANCE,
            glyph_ramp: GLYPH_RAMP.into(),
            back_faces: BackFaces::Discard,
            vertical_scale: VerticalScale::Aspect,

            light: LIGHT_DIRECTION,
            frame_interval_ms: FRAME_INTERVAL_MS,
        }
    }
}

impl TryFrom<SceneJson> for Scene {
    type Error = ConfigError;

    fn try_from(json: SceneJson) -> Result<Scene, ConfigError> {
        let torus = TorusShape::new(json.tube_radius, json.ring_radius,
            json.theta_step, json.phi_step)?;

        let glyphs = GlyphRamp::new(&json.glyph_ramp)?;
        let screen = ScreenConfig::new(json.width, json.height, glyphs,
            json.back_faces)?.with_vertical_scale(json.vertical_scale);

        check_finite("speed1", json.speed1)?;
        check_finite("speed2", json.speed2)?;
        check_finite("perspective_scale", json.perspective_scale)?;
        check_finite("viewer_distance", json.viewer_distance)?;

        let light: Vector3 = json.light.into();
        if !light.is_finite() {
            return Err(ConfigError::Invalid(
                format!("light must be finite, got {:?}", json.light)
            ));
        }

        if json.frame_interval_ms == 0 {
            return Err(ConfigError::Invalid(
                "frame_interval_ms must be at least 1".into()
            ));
        }

        let parameters = Parameters {
            speed1: json.speed1,
            speed2: json.speed2,
            k1: json.perspective_scale,
            k2: json.viewer_distance,
            light,
            paused: false,
        };

        Ok(Scene {
            torus,
            screen,
            parameters,
            frame_interval: Duration::from_millis(json.frame_interval_ms),
        })
    }
}

fn check_finite(name: &str, value: f64) -> Result<(), ConfigError> {
    if !value.is_finite() {
        return Err(ConfigError::Invalid(
            format!("{} must be finite, got {}", name, value)
        ));
    }

    Ok(())
}

/// Loads a scene description from a JSON file.
pub fn load_scene<P: AsRef<Path>>(path: P) -> Result<SceneJson, ConfigError> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(ConfigError::NotFound(path.display().to_string()));
    }

    let content = std::fs::read_to_string(path)?;
    let json: SceneJson = serde_json::from_str(&content)?;

    Ok(json)
}

#[test]
fn default_scene_is_valid() {
    let scene = Scene::try_from(SceneJson::default()).expect("valid defaults");

    assert_eq!(scene.screen.width, SCREEN_WIDTH);
    assert_eq!(scene.screen.height, SCREEN_HEIGHT);
    assert_eq!(scene.screen.back_faces, BackFaces::Discard);
    assert_eq!(scene.screen.vertical_scale, VerticalScale::Aspect);
    assert_eq!(scene.parameters.k1, PERSPECTIVE_SCALE);
    assert_eq!(scene.parameters.k2, VIEWER_DISTANCE);
    assert!(!scene.parameters.paused);
    assert_eq!(scene.frame_interval, Duration::from_millis(FRAME_INTERVAL_MS));
}

#[test]
fn partial_json_takes_defaults() {
    let json: SceneJson = serde_json::from_str(r#"{
        "width": 40,
        "light": [0.0, 0.0, 2.0],
        "back_faces": "retain",
        "vertical_scale": "perspective"
    }"#).expect("valid JSON");

    assert_eq!(json.width, 40);
    assert_eq!(json.height, SCREEN_HEIGHT);
    assert_eq!(json.light, [0.0, 0.0, 2.0]);
    assert_eq!(json.back_faces, BackFaces::Retain);
    assert_eq!(json.vertical_scale, VerticalScale::Perspective);
    assert_eq!(json.tube_radius, TUBE_RADIUS);

    let scene = Scene::try_from(json).expect("valid scene");
    assert_eq!(scene.screen.vertical_scale, VerticalScale::Perspective);
}

#[test]
fn unknown_field_is_rejected() {
    let res: Result<SceneJson, _> = serde_json::from_str(r#"{ "widht": 40 }"#);

    assert!(res.is_err());
}

#[test]
fn reject_out_of_range() {
    let bad = |f: fn(&mut SceneJson)| {
        let mut json = SceneJson::default();
        f(&mut json);
        Scene::try_from(json)
    };

    assert!(matches!(bad(|j| j.width = 0), Err(ConfigError::Invalid(_))));
    assert!(matches!(bad(|j| j.height = 0), Err(ConfigError::Invalid(_))));
    assert!(matches!(bad(|j| j.tube_radius = -1.0),
        Err(ConfigError::Invalid(_))));
    assert!(matches!(bad(|j| j.ring_radius = 0.0),
        Err(ConfigError::Invalid(_))));
    assert!(matches!(bad(|j| j.theta_step = 0.0),
        Err(ConfigError::Invalid(_))));
    assert!(matches!(bad(|j| j.phi_step = f64::NAN),
        Err(ConfigError::Invalid(_))));
    assert!(matches!(bad(|j| j.glyph_ramp = String::new()),
        Err(ConfigError::Invalid(_))));
    assert!(matches!(bad(|j| j.frame_interval_ms = 0),
        Err(ConfigError::Invalid(_))));
    assert!(matches!(bad(|j| j.light = [0.0, f64::INFINITY, 0.0]),
        Err(ConfigError::Invalid(_))));
    assert!(matches!(bad(|j| j.viewer_distance = f64::NAN),
        Err(ConfigError::Invalid(_))));
}

#[test]
fn load_missing_scene() {
    let res = load_scene("/nonexistent/scene.json");

    assert!(matches!(res, Err(ConfigError::NotFound(_))));
}

#[test]
fn load_invalid_scene() {
    let path = std::env::temp_dir().join("ascii_donut_invalid_scene.json");
    std::fs::write(&path, "{ \"width\": ").unwrap();

    let res = load_scene(&path);
    assert!(matches!(res, Err(ConfigError::Parse(_))));

    let _ = std::fs::remove_file(&path);
}

#[test]
fn load_valid_scene() {
    let path = std::env::temp_dir().join("ascii_donut_valid_scene.json");
    std::fs::write(&path, r#"{
        "tube_radius": 0.5,
        "ring_radius": 1.5,
        "speed1": 0.1,
        "perspective_scale": 20.0,
        "glyph_ramp": " .oO@",
        "frame_interval_ms": 100
    }"#).unwrap();

    let scene = Scene::try_from(load_scene(&path).expect("loadable scene"))
        .expect("valid scene");
    assert_eq!(scene.torus.tube_radius(), 0.5);
    assert_eq!(scene.torus.ring_radius(), 1.5);
    assert_eq!(scene.parameters.speed1, 0.1);
    assert_eq!(scene.parameters.speed2, SPEED2);
    assert_eq!(scene.parameters.k1, 20.0);
    assert_eq!(scene.screen.glyphs.len(), 5);
    assert_eq!(scene.frame_interval, Duration::from_millis(100));

    let _ = std::fs::remove_file(&path);
}
