use tracing::{info, warn};

use crate::agent::{RecommendationAgent, RecommendationText};
use crate::config::Credentials;
use crate::error::{AgentError, Result};
use crate::preferences::PreferenceSet;
use crate::query::{QueryString, build_query};

/// Outcome of one form submission
#[derive(Debug, Clone)]
pub struct Recommendation {
    pub query: QueryString,
    pub text: RecommendationText,
}

/// Run the form flow: check preferences, build the query, call the agent.
///
/// Nothing reaches the agent unless favorites, genres or notes are filled in.
pub async fn recommend(
    agent: &dyn RecommendationAgent,
    prefs: &PreferenceSet,
    credentials: &Credentials,
) -> Result<Recommendation> {
    if !prefs.is_submittable() {
        warn!("rejecting submission without preferences");
        return Err(AgentError::EmptyPreferences);
    }

    let query = build_query(prefs)?;
    info!(query = %query, "searching for recommendations");

    let text = agent.invoke(&query, credentials).await?;
    info!("recommendations ready");

    Ok(Recommendation { query, text })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canned::CannedAgent;
    use crate::preferences::{Decade, Genre, Mood};

    fn creds() -> Credentials {
        Credentials::new("exa", "groq")
    }

    #[tokio::test]
    async fn empty_preferences_never_reach_the_agent() {
        let agent = CannedAgent::new("unused");
        let err = recommend(&agent, &PreferenceSet::default(), &creds())
            .await
            .unwrap_err();
        assert!(matches!(err, AgentError::EmptyPreferences));
        assert_eq!(agent.invocations(), 0);
    }

    #[tokio::test]
    async fn mood_and_decade_alone_are_rejected() {
        let agent = CannedAgent::new("unused");
        let prefs = PreferenceSet {
            mood: Mood::Excited,
            decade: Decade::Of(2000),
            ..Default::default()
        };
        let err = recommend(&agent, &prefs, &creds()).await.unwrap_err();
        assert!(matches!(err, AgentError::EmptyPreferences));
        assert_eq!(agent.invocations(), 0);
    }

    #[tokio::test]
    async fn built_query_is_sent_to_the_agent() {
        let agent = CannedAgent::new("## Your picks");
        let prefs = PreferenceSet {
            favorites: "Inception".to_string(),
            genres: vec![Genre::SciFi],
            ..Default::default()
        };
        let result = recommend(&agent, &prefs, &creds()).await.unwrap();
        assert_eq!(result.text.as_str(), "## Your picks");
        assert_eq!(
            agent.queries(),
            vec![
                "Recommend movies based on these preferences: \
                 I like movies such as Inception. I prefer Sci-Fi genres."
                    .to_string()
            ]
        );
        assert_eq!(result.query.as_str(), agent.queries()[0]);
    }

    #[tokio::test]
    async fn missing_credentials_propagate() {
        let agent = CannedAgent::new("unused");
        let prefs = PreferenceSet {
            notes: "anything by Villeneuve".to_string(),
            ..Default::default()
        };
        let err = recommend(&agent, &prefs, &Credentials::default())
            .await
            .unwrap_err();
        assert!(matches!(err, AgentError::MissingCredentials(_)));
        assert_eq!(agent.invocations(), 0);
    }
}
