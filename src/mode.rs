#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    #[default]
    Normal,
    /// Editing the grid filter text
    Filter,
    /// Typing a question for the analysis panel
    Ask,
    /// Typing a path to open
    Open,
}

impl Mode {
    pub fn display_name(&self) -> &'static str {
        match self {
            Mode::Normal => "NORMAL",
            Mode::Filter => "FILTER",
            Mode::Ask => "ASK",
            Mode::Open => "OPEN",
        }
    }
}
