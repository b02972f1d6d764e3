use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct CreepageConfig {
    // Slots narrower than this do not count as creepage channels (mm).
    #[serde(default = "default_min_groove_width")]
    pub min_groove_width: f64,

    #[serde(default = "default_tolerance")]
    pub tolerance: f64,

    // Extra search margin on top of the required clearance (mm).
    #[serde(default = "default_budget_slack")]
    pub budget_slack: f64,

    #[serde(default)]
    pub debug_images: bool,

    #[serde(default = "default_debug_image_dir")]
    pub debug_image_dir: String,
}

impl Default for CreepageConfig {
    fn default() -> Self {
        Self {
            min_groove_width: default_min_groove_width(),
            tolerance: default_tolerance(),
            budget_slack: default_budget_slack(),
            debug_images: false,
            debug_image_dir: default_debug_image_dir(),
        }
    }
}

fn default_min_groove_width() -> f64 {
    0.0
}

fn default_tolerance() -> f64 {
    1e-4
}

fn default_budget_slack() -> f64 {
    0.5
}

fn default_debug_image_dir() -> String {
    "output".to_string()
}
