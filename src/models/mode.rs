use serde::{Deserialize, Serialize};

/// Game mode: how many images are revealed and whether answering is timed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
pub enum Mode {
    #[default]
    Basic,
    TwoImage,
    FourImage,
    Timed,
}

impl Mode {
    pub const ALL: [Mode; 4] = [Mode::Basic, Mode::TwoImage, Mode::FourImage, Mode::Timed];

    /// Number of images shown during the reveal window.
    pub fn image_count(self) -> usize {
        match self {
            Mode::Basic | Mode::Timed => 1,
            Mode::TwoImage => 2,
            Mode::FourImage => 4,
        }
    }

    /// Whether an answering countdown runs in this mode.
    pub fn is_timed(self) -> bool {
        matches!(self, Mode::Timed)
    }

    pub fn label(self) -> &'static str {
        match self {
            Mode::Basic => "Basic Mode",
            Mode::TwoImage => "2-Images",
            Mode::FourImage => "4-Images",
            Mode::Timed => "Timed Mode",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Mode::Basic => "A standard game where you see one image and answer questions about it.",
            Mode::TwoImage => "Memorize two images before answering questions!",
            Mode::FourImage => "A challenging mode where you must remember four images.",
            Mode::Timed => "Answer as many questions as you can before the timer runs out!",
        }
    }

    pub fn rules(self) -> [&'static str; 3] {
        match self {
            Mode::Basic => [
                "You will see one image.",
                "After that, answer AI-generated questions based on the image.",
                "Score is based on correct answers.",
            ],
            Mode::TwoImage => [
                "You will see two images, one after the other.",
                "Then, answer questions based on both images.",
                "Score is based on correct answers.",
            ],
            Mode::FourImage => [
                "You will see four images, one after the other.",
                "Answer AI-generated questions covering all images.",
                "Score is based on correct answers.",
            ],
            Mode::Timed => [
                "You will see one image.",
                "Answer as many questions as possible in a limited time.",
                "Your final score depends on correct answers before time runs out.",
            ],
        }
    }

    pub fn next(self) -> Mode {
        let index = Mode::ALL.iter().position(|m| *m == self).unwrap_or(0);
        Mode::ALL[(index + 1) % Mode::ALL.len()]
    }

    pub fn previous(self) -> Mode {
        let index = Mode::ALL.iter().position(|m| *m == self).unwrap_or(0);
        Mode::ALL[(index + Mode::ALL.len() - 1) % Mode::ALL.len()]
    }
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}
