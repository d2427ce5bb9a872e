use serde::Deserialize;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    pub model_path: String,
    pub device: String,
    pub input_size: [i64; 2],
    pub conf_threshold: f32,
    pub nms_threshold: f32,
    pub window_name: String,
    /// Milliseconds to wait for a keypress between frames.
    pub key_poll_ms: i32,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            model_path: "yolov8s.torchscript".to_string(),
            device: "cpu".to_string(),
            input_size: [640, 640],
            conf_threshold: 0.25,
            nms_threshold: 0.45,
            window_name: "Object Detection".to_string(),
            key_poll_ms: 1,
        }
    }
}

impl Config {
    /// Load from a JSON file. Fields absent from the file keep their defaults.
    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let data = fs::read_to_string(path)?;
        let cfg: Config = serde_json::from_str(&data)?;
        Ok(cfg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cfg = Config::default();
        assert_eq!(cfg.model_path, "yolov8s.torchscript");
        assert_eq!(cfg.device, "cpu");
        assert_eq!(cfg.input_size, [640, 640]);
        assert_eq!(cfg.key_poll_ms, 1);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let cfg: Config =
            serde_json::from_str(r#"{"model_path": "custom.torchscript"}"#).unwrap();
        assert_eq!(cfg.model_path, "custom.torchscript");
        assert_eq!(cfg.window_name, "Object Detection");
        assert_eq!(cfg.input_size, [640, 640]);
    }
}
