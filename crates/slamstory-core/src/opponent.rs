use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::StoryError;

/// The fixed set of finalists the user can face.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Opponent {
    #[default]
    CarlosAlcaraz,
    JannikSinner,
    NovakDjokovic,
    DaniilMedvedev,
    AlexanderZverev,
    TaylorFritz,
}

impl Opponent {
    /// All opponents in selector order.
    pub fn all() -> &'static [Opponent] {
        &[
            Opponent::CarlosAlcaraz,
            Opponent::JannikSinner,
            Opponent::NovakDjokovic,
            Opponent::DaniilMedvedev,
            Opponent::AlexanderZverev,
            Opponent::TaylorFritz,
        ]
    }

    /// The name substituted into prompts.
    pub fn name(&self) -> &'static str {
        match self {
            Opponent::CarlosAlcaraz => "Carlos Alcaraz",
            Opponent::JannikSinner => "Jannik Sinner",
            Opponent::NovakDjokovic => "Novak Djokovic",
            Opponent::DaniilMedvedev => "Daniil Medvedev",
            Opponent::AlexanderZverev => "Alexander Zverev",
            Opponent::TaylorFritz => "Taylor Fritz",
        }
    }

    fn index(&self) -> usize {
        Self::all()
            .iter()
            .position(|o| o == self)
            .unwrap_or_default()
    }

    /// Next opponent in the selector, wrapping around.
    pub fn next(&self) -> Opponent {
        let all = Self::all();
        all[(self.index() + 1) % all.len()]
    }

    /// Previous opponent in the selector, wrapping around.
    pub fn prev(&self) -> Opponent {
        let all = Self::all();
        all[(self.index() + all.len() - 1) % all.len()]
    }
}

impl fmt::Display for Opponent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Opponent {
    type Err = StoryError;

    /// Accepts the full name or the surname, case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Self::all()
            .iter()
            .copied()
            .find(|o| {
                let name = o.name().to_lowercase();
                name == wanted || name.rsplit(' ').next() == Some(wanted.as_str())
            })
            .ok_or_else(|| {
                let names: Vec<&str> = Self::all().iter().map(|o| o.name()).collect();
                StoryError::Config(format!(
                    "Unknown opponent '{}'. Choose one of: {}",
                    s,
                    names.join(", ")
                ))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selector_wraps_in_both_directions() {
        assert_eq!(Opponent::TaylorFritz.next(), Opponent::CarlosAlcaraz);
        assert_eq!(Opponent::CarlosAlcaraz.prev(), Opponent::TaylorFritz);
        assert_eq!(Opponent::JannikSinner.prev().next(), Opponent::JannikSinner);
    }

    #[test]
    fn parses_full_name_and_surname() {
        assert_eq!("novak djokovic".parse::<Opponent>().unwrap(), Opponent::NovakDjokovic);
        assert_eq!("Sinner".parse::<Opponent>().unwrap(), Opponent::JannikSinner);
        assert!("Roger Federer".parse::<Opponent>().is_err());
    }
}
