use serde::{Deserialize, Serialize};
use std::fmt;

/// Every target language the generator knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Python,
    CSharp,
    C,
    Cpp,
    Java,
}

impl Language {
    pub const ALL: [Language; 5] = [
        Language::Python,
        Language::CSharp,
        Language::C,
        Language::Cpp,
        Language::Java,
    ];

    /// Resolves a language identifier such as `"python"` or `"csharp"`.
    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|l| l.id() == id)
    }

    pub fn id(&self) -> &'static str {
        match self {
            Language::Python => "python",
            Language::CSharp => "csharp",
            Language::C => "c",
            Language::Cpp => "cpp",
            Language::Java => "java",
        }
    }

    /// Whether the backend renders complete, runnable programs.
    pub fn is_complete(&self) -> bool {
        matches!(self, Language::Python | Language::CSharp)
    }

    pub fn extension(&self) -> &'static str {
        match self {
            Language::Python => "py",
            Language::CSharp => "cs",
            Language::C => "c",
            Language::Cpp => "cpp",
            Language::Java => "java",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// File extension for a language id; unknown ids map to `txt`.
pub fn file_extension(language_id: &str) -> &'static str {
    Language::from_id(language_id).map_or("txt", |l| l.extension())
}
