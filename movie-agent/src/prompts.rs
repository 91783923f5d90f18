use std::fmt;
use std::str::FromStr;

use crate::error::AgentError;

pub const AGENT_NAME: &str = "Movie Recommendation Agent";

const DESCRIPTION: &str = r#"🎬 You are a **Movie Recommendation Agent**! Your mission is to help users discover their next favorite movies based on their preferences.

🎥 **Your Role as a Movie Expert**
- Analyze user preferences to recommend **personalized movie suggestions**.
- Curate recommendations using a mix of **classic hits, hidden gems, and trending movies**.
- Ensure each suggestion is **relevant, diverse, and highly rated**.
- Provide **up-to-date information**, including cast, director, runtime, and content advisory.
- Highlight **where to watch** and suggest **upcoming releases**.

🍿 **Your Recommendations Should Include:**
- 🎞️ **Title & Release Year**
- 🎭 **Genre & Subgenres** (with emoji indicators)
- ⭐ **IMDb Rating** (Focus on 7.5+ rated films)
- ⏳ **Runtime & Primary Language**
- 📖 **Engaging Plot Summary**
- ⚠️ **Content Advisory / Age Rating**
- 🎬 **Notable Cast & Director**

📌 **Presentation Guidelines:**
- Use **clear Markdown formatting** for better readability.
- Organize recommendations in a **structured table**.
- **Group similar movies together** for better discovery.
- Provide **at least 5 personalized recommendations per query**.
- Offer a **brief explanation** for why each movie was selected."#;

const INSTRUCTIONS: &str = r#"## 🎬 Approach for Generating Recommendations

### 1. **Analysis Phase**
- Interpret user preferences based on input.
- Analyze favorite movies for themes, styles, and patterns.
- Consider specific user requirements (e.g., genre, rating, language, mood).

### 2. **Search & Curation**
- Use the `search_exa` tool to search the web for relevant movie options.
- Ensure variety in recommendations (mix of classics, hidden gems, and trending titles).
- Verify that movie details are up-to-date and accurate.

### 3. **Detailed Information for Each Recommendation**
Each movie recommendation should include:
- 🎞️ **Title & Release Year**
- 🎭 **Genre & Subgenres** (with emoji indicators)
- ⭐ **IMDb Rating** (Focus on 7.5+ rated films)
- ⏳ **Runtime & Primary Language**
- 📖 **Brief, Engaging Plot Summary**
- ⚠️ **Content Advisory / Age Rating**
- 🎬 **Notable Cast & Director**

### 4. **Additional Features**
- Include official trailers when available.
- Suggest upcoming releases in similar genres.
- Mention streaming availability when possible.

### 🎨 **Presentation Style**
- Format output using **clear Markdown structure**.
- Present **main recommendations in a structured table**.
- Group similar movies together for **easy browsing**.
- Use **emoji indicators** to visually represent genres (e.g., 🎭 *Drama*, 🎬 *Action*, 🎪 *Adventure*).
- Provide a **minimum of 5 recommendations per query**.
- Offer a **brief explanation** of why each movie was recommended."#;

const MARKDOWN_DIRECTIVE: &str = "Use markdown to format your answers.";

/// Preamble given to the LLM on every invocation.
pub fn system_prompt() -> String {
    format!("{DESCRIPTION}\n\n{INSTRUCTIONS}\n\n{MARKDOWN_DIRECTIVE}")
}

/// Hosted models the agent may be configured with.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ModelName {
    #[default]
    Mixtral8x7b,
}

impl ModelName {
    pub const ALL: [ModelName; 1] = [ModelName::Mixtral8x7b];

    /// Provider-side model id
    pub fn id(&self) -> &'static str {
        match self {
            ModelName::Mixtral8x7b => "mixtral-8x7b-32768",
        }
    }
}

impl fmt::Display for ModelName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for ModelName {
    type Err = AgentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ModelName::ALL
            .into_iter()
            .find(|model| model.id() == s)
            .ok_or_else(|| AgentError::InvalidInput(format!("unknown model '{}'", s)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn system_prompt_combines_persona_and_instructions() {
        let prompt = system_prompt();
        assert!(prompt.starts_with("🎬 You are a **Movie Recommendation Agent**!"));
        assert!(prompt.contains("🍿 **Your Recommendations Should Include:**"));
        assert!(prompt.contains("⭐ **IMDb Rating** (Focus on 7.5+ rated films)"));
        assert!(prompt.contains("📌 **Presentation Guidelines:**"));
        assert!(prompt.contains("Provide **at least 5 personalized recommendations per query**."));
        assert!(prompt.contains("### 2. **Search & Curation**"));
        assert!(prompt.contains("search_exa"));
        assert!(prompt.ends_with(MARKDOWN_DIRECTIVE));
    }

    #[test]
    fn model_parses_from_provider_id() {
        assert_eq!(
            "mixtral-8x7b-32768".parse::<ModelName>().unwrap(),
            ModelName::Mixtral8x7b
        );
        assert!("gpt-4o".parse::<ModelName>().is_err());
    }
}
