use std::{fmt, process::ExitCode};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Info,
    Warning,
    Critical,
}

/// What the user gets told after an action, the terminal's take on a message box.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: Level,
    pub title: String,
    pub message: String,
}

impl Notice {
    pub fn info(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(Level::Info, title, message)
    }

    pub fn warning(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(Level::Warning, title, message)
    }

    pub fn critical(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(Level::Critical, title, message)
    }

    fn new(level: Level, title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            level,
            title: title.into(),
            message: message.into(),
        }
    }

    pub fn show(&self) {
        match self.level {
            Level::Info => println!("{self}"),
            Level::Warning | Level::Critical => eprintln!("{self}"),
        }
    }

    pub fn exit_code(&self) -> ExitCode {
        match self.level {
            Level::Info => ExitCode::SUCCESS,
            Level::Warning | Level::Critical => ExitCode::FAILURE,
        }
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.title.is_empty() {
            write!(f, "{}", self.message)
        } else {
            write!(f, "{}: {}", self.title, self.message)
        }
    }
}
