use serde::{Deserialize, Serialize};

use crate::host::VariableType;

/// Top-level token category. Only these three are imported.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Size,
    Color,
    Content,
}

impl Category {
    pub const ALL: [Category; 3] = [Category::Size, Category::Color, Category::Content];

    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.as_str() == name)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Category::Size => "size",
            Category::Color => "color",
            Category::Content => "content",
        }
    }

    /// `size, color, content`
    pub fn allowed_list() -> String {
        Self::ALL.map(Category::as_str).join(", ")
    }

    /// Host variable type that tokens of this category materialize as.
    pub fn variable_type(self) -> VariableType {
        match self {
            Category::Size => VariableType::Float,
            Category::Color => VariableType::Color,
            Category::Content => VariableType::String,
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
