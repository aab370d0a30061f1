//! Token filters. Case conversions are `heck`'s: any character that is not
//! alphanumeric separates words, so `"My App (v2)"` snakes to `my_app_v2`.

use std::fmt;
use std::str::FromStr;

use heck::{ToKebabCase, ToPascalCase, ToSnakeCase, ToTitleCase};

/// A transformation applied to a token value: `{{ project_name | snake }}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Filter {
    Lower,
    Upper,
    Snake,
    Kebab,
    Pascal,
    Title,
}

impl Filter {
    pub const ALL: [Filter; 6] = [
        Self::Lower,
        Self::Upper,
        Self::Snake,
        Self::Kebab,
        Self::Pascal,
        Self::Title,
    ];

    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Lower => "lower",
            Self::Upper => "upper",
            Self::Snake => "snake",
            Self::Kebab => "kebab",
            Self::Pascal => "pascal",
            Self::Title => "title",
        }
    }

    pub fn apply(&self, input: &str) -> String {
        match self {
            Self::Lower => input.to_lowercase(),
            Self::Upper => input.to_uppercase(),
            Self::Snake => input.to_snake_case(),
            Self::Kebab => input.to_kebab_case(),
            Self::Pascal => input.to_pascal_case(),
            Self::Title => input.to_title_case(),
        }
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Filter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|f| f.as_str() == s)
            .ok_or_else(|| {
                let known: Vec<_> = Self::ALL.iter().map(Filter::as_str).collect();
                format!("unknown filter '{s}' (expected one of: {})", known.join(", "))
            })
    }
}
