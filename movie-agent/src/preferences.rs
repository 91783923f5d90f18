use std::fmt;
use std::str::FromStr;

use crate::error::AgentError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Genre {
    Action,
    Adventure,
    Animation,
    Comedy,
    Crime,
    Documentary,
    Drama,
    Fantasy,
    Horror,
    Mystery,
    Romance,
    SciFi,
    Thriller,
}

impl Genre {
    pub const ALL: [Genre; 13] = [
        Genre::Action,
        Genre::Adventure,
        Genre::Animation,
        Genre::Comedy,
        Genre::Crime,
        Genre::Documentary,
        Genre::Drama,
        Genre::Fantasy,
        Genre::Horror,
        Genre::Mystery,
        Genre::Romance,
        Genre::SciFi,
        Genre::Thriller,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Genre::Action => "Action",
            Genre::Adventure => "Adventure",
            Genre::Animation => "Animation",
            Genre::Comedy => "Comedy",
            Genre::Crime => "Crime",
            Genre::Documentary => "Documentary",
            Genre::Drama => "Drama",
            Genre::Fantasy => "Fantasy",
            Genre::Horror => "Horror",
            Genre::Mystery => "Mystery",
            Genre::Romance => "Romance",
            Genre::SciFi => "Sci-Fi",
            Genre::Thriller => "Thriller",
        }
    }
}

impl fmt::Display for Genre {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Genre {
    type Err = AgentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Genre::ALL
            .into_iter()
            .find(|genre| genre.label() == s)
            .ok_or_else(|| AgentError::InvalidInput(format!("unknown genre '{}'", s)))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Mood {
    #[default]
    Any,
    Happy,
    Thoughtful,
    Excited,
    Relaxed,
    Nostalgic,
    Inspired,
}

impl Mood {
    pub const ALL: [Mood; 7] = [
        Mood::Any,
        Mood::Happy,
        Mood::Thoughtful,
        Mood::Excited,
        Mood::Relaxed,
        Mood::Nostalgic,
        Mood::Inspired,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Mood::Any => "Any",
            Mood::Happy => "Happy",
            Mood::Thoughtful => "Thoughtful",
            Mood::Excited => "Excited",
            Mood::Relaxed => "Relaxed",
            Mood::Nostalgic => "Nostalgic",
            Mood::Inspired => "Inspired",
        }
    }
}

impl fmt::Display for Mood {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Mood {
    type Err = AgentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Mood::ALL
            .into_iter()
            .find(|mood| mood.label() == s)
            .ok_or_else(|| AgentError::InvalidInput(format!("unknown mood '{}'", s)))
    }
}

/// A preferred release decade, 1920s through 2020s.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Decade {
    #[default]
    Any,
    /// First year of the decade, e.g. `1990` for the 1990s
    Of(u16),
}

impl Decade {
    pub const FIRST: u16 = 1920;
    pub const LAST: u16 = 2020;

    /// "Any" followed by every decade in ascending order.
    pub fn all() -> Vec<Decade> {
        std::iter::once(Decade::Any)
            .chain((Self::FIRST..=Self::LAST).step_by(10).map(Decade::Of))
            .collect()
    }

    pub fn label(&self) -> String {
        match self {
            Decade::Any => "Any".to_string(),
            Decade::Of(year) => format!("{}s", year),
        }
    }
}

impl fmt::Display for Decade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

impl FromStr for Decade {
    type Err = AgentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "Any" {
            return Ok(Decade::Any);
        }
        s.strip_suffix('s')
            .and_then(|year| year.parse::<u16>().ok())
            .filter(|year| (Self::FIRST..=Self::LAST).contains(year) && year % 10 == 0)
            .map(Decade::Of)
            .ok_or_else(|| AgentError::InvalidInput(format!("unknown decade '{}'", s)))
    }
}

/// Structured movie preferences gathered for a single request.
///
/// Every field is optional. The set is built fresh per request and dropped
/// once the query has been built from it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PreferenceSet {
    /// Favourite titles, free text, usually comma separated
    pub favorites: String,
    pub genres: Vec<Genre>,
    pub mood: Mood,
    pub decade: Decade,
    /// Free-form notes appended to the query verbatim
    pub notes: String,
}

impl PreferenceSet {
    /// Whether the form flow may send this set to the agent.
    ///
    /// Mood and decade alone are not enough to ask for recommendations.
    pub fn is_submittable(&self) -> bool {
        !self.favorites.trim().is_empty()
            || !self.genres.is_empty()
            || !self.notes.trim().is_empty()
    }

    /// True when no field would contribute a clause to the query.
    pub fn is_empty(&self) -> bool {
        !self.is_submittable() && self.mood == Mood::Any && self.decade == Decade::Any
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn genre_labels_round_trip_through_from_str() {
        for genre in Genre::ALL {
            assert_eq!(genre.label().parse::<Genre>().unwrap(), genre);
        }
        assert!(matches!(
            "Western".parse::<Genre>(),
            Err(AgentError::InvalidInput(_))
        ));
    }

    #[test]
    fn sci_fi_uses_hyphenated_label() {
        assert_eq!(Genre::SciFi.to_string(), "Sci-Fi");
        assert_eq!("Sci-Fi".parse::<Genre>().unwrap(), Genre::SciFi);
    }

    #[test]
    fn decades_span_1920s_to_2020s() {
        let labels: Vec<String> = Decade::all().iter().map(Decade::label).collect();
        assert_eq!(labels.len(), 12);
        assert_eq!(labels.first().unwrap(), "Any");
        assert_eq!(labels[1], "1920s");
        assert_eq!(labels.last().unwrap(), "2020s");
    }

    #[test]
    fn decade_parsing_rejects_out_of_range_values() {
        assert_eq!("1990s".parse::<Decade>().unwrap(), Decade::Of(1990));
        assert_eq!("Any".parse::<Decade>().unwrap(), Decade::Any);
        assert!("1910s".parse::<Decade>().is_err());
        assert!("2030s".parse::<Decade>().is_err());
        assert!("1995s".parse::<Decade>().is_err());
        assert!("90s".parse::<Decade>().is_err());
    }

    #[test]
    fn mood_and_decade_alone_are_not_submittable() {
        let prefs = PreferenceSet {
            mood: Mood::Happy,
            decade: Decade::Of(1980),
            ..Default::default()
        };
        assert!(!prefs.is_submittable());
        assert!(!prefs.is_empty());
    }

    #[test]
    fn whitespace_only_text_counts_as_empty() {
        let prefs = PreferenceSet {
            favorites: "   ".to_string(),
            notes: "\n\t".to_string(),
            ..Default::default()
        };
        assert!(!prefs.is_submittable());
        assert!(prefs.is_empty());
    }
}
