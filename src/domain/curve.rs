// Curve domain model - one named value column of a stream
use serde::Deserialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineStyle {
    #[default]
    Solid,
    Dashed,
    Dotted,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CurveStyle {
    #[serde(default = "default_color")]
    pub color: String,
    #[serde(default = "default_width")]
    pub width: f32,
    #[serde(default)]
    pub line_style: LineStyle,
}

fn default_color() -> String {
    "#1f77b4".to_string()
}

fn default_width() -> f32 {
    1.0
}

impl Default for CurveStyle {
    fn default() -> Self {
        Self {
            color: default_color(),
            width: default_width(),
            line_style: LineStyle::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Deserialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum ScalePolicy {
    #[default]
    Auto,
    Fixed { min: f64, max: f64 },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Curve {
    pub id: String,
    pub mnemonic: String,
    pub display_name: String,
    pub stream_id: String,
    pub style: CurveStyle,
    pub scale: ScalePolicy,
    pub visible: bool,
}

impl Curve {
    pub fn new(stream_id: &str, mnemonic: &str) -> Self {
        Self {
            id: format!("{}:{}", stream_id, mnemonic),
            mnemonic: mnemonic.to_string(),
            display_name: mnemonic.to_string(),
            stream_id: stream_id.to_string(),
            style: CurveStyle::default(),
            scale: ScalePolicy::default(),
            visible: true,
        }
    }
}
