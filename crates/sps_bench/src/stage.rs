use crate::error::BenchmarkError;
use std::fmt;
use std::str::FromStr;

/// One step of the signature lifecycle, in execution order.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum Stage {
    Setup,
    KeyGen,
    Sign,
    Verify,
}

impl Stage {
    pub const ALL: [Stage; 4] =
        [Self::Setup, Self::KeyGen, Self::Sign, Self::Verify];

    /// Bucket name used to attribute counted operations.
    pub const fn bucket(self) -> &'static str {
        match self {
            Self::Setup => "setup",
            Self::KeyGen => "keyGen",
            Self::Sign => "sign",
            Self::Verify => "verify",
        }
    }

    pub const fn title(self) -> &'static str {
        match self {
            Self::Setup => "Setup",
            Self::KeyGen => "KeyGen",
            Self::Sign => "Sign",
            Self::Verify => "Verify",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.bucket())
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum BenchmarkMode {
    Timing,
    Counting,
}

impl BenchmarkMode {
    pub const ALL: [BenchmarkMode; 2] = [Self::Timing, Self::Counting];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Timing => "Time",
            Self::Counting => "Counting",
        }
    }

    pub const fn console_tag(self) -> &'static str {
        match self {
            Self::Timing => "[Timer]",
            Self::Counting => "[Counting]",
        }
    }
}

impl fmt::Display for BenchmarkMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for BenchmarkMode {
    type Err = BenchmarkError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "time" | "timing" | "timer" => Ok(Self::Timing),
            "count" | "counting" => Ok(Self::Counting),
            _ => Err(BenchmarkError::UnsupportedMode(value.to_owned())),
        }
    }
}
