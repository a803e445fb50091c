use serde::{Deserialize, Serialize};

#[derive(Debug, Default, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

serde_plain::derive_display_from_serialize!(Theme);
serde_plain::derive_fromstr_from_deserialize!(Theme);

#[derive(
    Debug, Default, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum FontSize {
    Sm,
    #[default]
    Base,
    Lg,
}

serde_plain::derive_display_from_serialize!(FontSize);
serde_plain::derive_fromstr_from_deserialize!(FontSize);

/// Display preferences and the first-run flag.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Preferences {
    #[serde(default)]
    pub(crate) theme: Theme,
    #[serde(default)]
    pub(crate) font_size: FontSize,
    /// True until the first run has seeded (or declined to seed) sample data.
    #[serde(default = "first_run_default")]
    pub(crate) first_run: bool,
}

fn first_run_default() -> bool {
    true
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            theme: Theme::default(),
            font_size: FontSize::default(),
            first_run: first_run_default(),
        }
    }
}

impl Preferences {
    pub fn theme(&self) -> Theme {
        self.theme
    }

    pub fn font_size(&self) -> FontSize {
        self.font_size
    }

    pub fn first_run(&self) -> bool {
        self.first_run
    }

    pub fn toggle_theme(&mut self) {
        self.theme = match self.theme {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }

    pub fn set_font_size(&mut self, font_size: FontSize) {
        self.font_size = font_size;
    }
}
