use serde::{Deserialize, Serialize};
use std::str::FromStr;

#[derive(Copy, Clone, Debug, Ord, PartialOrd, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    Fr,
    Ar,
}

impl Locale {
    pub fn as_str(&self) -> &'static str {
        match self {
            Locale::Fr => "fr",
            Locale::Ar => "ar",
        }
    }

    pub fn other(&self) -> Locale {
        match self {
            Locale::Fr => Locale::Ar,
            Locale::Ar => Locale::Fr,
        }
    }
}

impl FromStr for Locale {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fr" => Ok(Locale::Fr),
            "ar" => Ok(Locale::Ar),
            other => Err(format!("unsupported locale `{other}`")),
        }
    }
}

/// A translatable attribute, one optional value per supported locale.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bilingual {
    pub fr: Option<String>,
    pub ar: Option<String>,
}

impl Bilingual {
    pub fn new(fr: Option<String>, ar: Option<String>) -> Self {
        Bilingual { fr, ar }
    }

    /// Value for `locale` only, empty strings count as missing.
    pub fn exact(&self, locale: Locale) -> Option<&str> {
        let value = match locale {
            Locale::Fr => self.fr.as_deref(),
            Locale::Ar => self.ar.as_deref(),
        };
        value.filter(|v| !v.trim().is_empty())
    }

    /// Value for `locale`, falling back to the other locale when empty.
    pub fn get(&self, locale: Locale) -> Option<&str> {
        self.exact(locale).or_else(|| self.exact(locale.other()))
    }

    pub fn is_empty(&self) -> bool {
        self.exact(Locale::Fr).is_none() && self.exact(Locale::Ar).is_none()
    }

    pub fn into_parts(self) -> (Option<String>, Option<String>) {
        (self.fr, self.ar)
    }
}
