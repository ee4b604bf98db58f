use serde::{Deserialize, Serialize};

/// A package ecosystem whose lock files depinspect can read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Ecosystem {
    /// Bundler `Gemfile.lock` files.
    Ruby,
    /// Yarn `yarn.lock` files.
    Js,
}

impl Ecosystem {
    pub fn as_str(&self) -> &'static str {
        match self {
            Ecosystem::Ruby => "ruby",
            Ecosystem::Js => "js",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Ecosystem::Ruby => "Ruby (Gemfile.lock)",
            Ecosystem::Js => "JavaScript (yarn.lock)",
        }
    }
}

impl std::fmt::Display for Ecosystem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

impl std::str::FromStr for Ecosystem {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "ruby" | "gem" | "bundler" => Ok(Ecosystem::Ruby),
            "js" | "javascript" | "yarn" => Ok(Ecosystem::Js),
            _ => Err(format!("Unknown ecosystem: {}. Use 'ruby' or 'js'", s)),
        }
    }
}
