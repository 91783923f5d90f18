use movie_agent::{Credentials, Decade, Genre, ModelName, Mood, PreferenceSet, Result};

/// Raw values of the preference form, in the shape the browser sends them.
///
/// Genres arrive as repeated `genres` keys, so the body is read as a list of
/// pairs rather than a struct.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormValues {
    pub exa_api_key: String,
    pub groq_api_key: String,
    pub model: Option<String>,
    pub favorites: String,
    pub genres: Vec<String>,
    pub mood: Option<String>,
    pub decade: Option<String>,
    pub notes: String,
}

impl FormValues {
    pub fn from_pairs(pairs: Vec<(String, String)>) -> Self {
        let mut form = FormValues::default();
        for (key, value) in pairs {
            match key.as_str() {
                "exa_api_key" => form.exa_api_key = value,
                "groq_api_key" => form.groq_api_key = value,
                "model" => form.model = Some(value),
                "favorites" => form.favorites = value,
                "genres" => form.genres.push(value),
                "mood" => form.mood = Some(value),
                "decade" => form.decade = Some(value),
                "notes" => form.notes = value,
                _ => {}
            }
        }
        form
    }

    pub fn credentials(&self) -> Credentials {
        Credentials {
            search_api_key: Some(self.exa_api_key.clone()),
            llm_api_key: Some(self.groq_api_key.clone()),
        }
    }

    pub fn model(&self) -> Result<ModelName> {
        match self.model.as_deref() {
            Some(id) => id.parse(),
            None => Ok(ModelName::default()),
        }
    }

    /// Parse the selections; unknown labels are `InvalidInput`.
    pub fn preferences(&self) -> Result<PreferenceSet> {
        let genres = self
            .genres
            .iter()
            .map(|label| label.parse::<Genre>())
            .collect::<Result<Vec<_>>>()?;
        let mood = match self.mood.as_deref() {
            Some(label) => label.parse::<Mood>()?,
            None => Mood::Any,
        };
        let decade = match self.decade.as_deref() {
            Some(label) => label.parse::<Decade>()?,
            None => Decade::Any,
        };

        Ok(PreferenceSet {
            favorites: self.favorites.clone(),
            genres,
            mood,
            decade,
            notes: self.notes.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use movie_agent::AgentError;

    fn pairs(items: &[(&str, &str)]) -> Vec<(String, String)> {
        items
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn repeated_genres_are_collected_in_order() {
        let form = FormValues::from_pairs(pairs(&[
            ("genres", "Horror"),
            ("favorites", "The Thing"),
            ("genres", "Sci-Fi"),
        ]));
        let prefs = form.preferences().unwrap();
        assert_eq!(prefs.genres, vec![Genre::Horror, Genre::SciFi]);
        assert_eq!(prefs.favorites, "The Thing");
        assert_eq!(prefs.mood, Mood::Any);
    }

    #[test]
    fn selects_are_parsed() {
        let form = FormValues::from_pairs(pairs(&[
            ("mood", "Inspired"),
            ("decade", "2010s"),
            ("model", "mixtral-8x7b-32768"),
        ]));
        let prefs = form.preferences().unwrap();
        assert_eq!(prefs.mood, Mood::Inspired);
        assert_eq!(prefs.decade, Decade::Of(2010));
        assert_eq!(form.model().unwrap(), ModelName::Mixtral8x7b);
    }

    #[test]
    fn unknown_labels_are_invalid_input() {
        let form = FormValues::from_pairs(pairs(&[("decade", "1850s")]));
        assert!(matches!(form.preferences(), Err(AgentError::InvalidInput(_))));

        let form = FormValues::from_pairs(pairs(&[("model", "gpt-5")]));
        assert!(matches!(form.model(), Err(AgentError::InvalidInput(_))));
    }

    #[test]
    fn credentials_come_from_the_sidebar_fields() {
        let form = FormValues::from_pairs(pairs(&[
            ("exa_api_key", "exa-key"),
            ("groq_api_key", ""),
        ]));
        let creds = form.credentials();
        assert_eq!(creds.search_api_key.as_deref(), Some("exa-key"));
        assert!(creds.validate().is_err());
    }
}
