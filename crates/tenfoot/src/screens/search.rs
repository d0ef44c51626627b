//! Search screen and its genre grid.

use super::{descend_into, Screen};
use crate::config::SearchSelectors;
use crate::driver::{Driver, ElementSnapshot};
use crate::focus::FocusedItem;
use crate::result::{TenfootError, TenfootResult};
use crate::scanner::{MatchMode, ScanPlan, Target};
use crate::selector::SelectorChain;
use crate::session::Session;
use crate::wait::TimeoutTier;
use async_trait::async_trait;
use rand::Rng;
use url::Url;

/// Query parameter carrying the selected genre
pub const GENRE_QUERY_PARAM: &str = "q";

const MAX_DESCENT: usize = 3;

/// Search screen
#[derive(Debug)]
pub struct SearchScreen<'s, D: Driver> {
    session: &'s Session<D>,
}

#[async_trait]
impl<D: Driver> Screen for SearchScreen<'_, D> {
    type Driver = D;

    const NAME: &'static str = "search";

    fn session(&self) -> &Session<D> {
        self.session
    }

    fn ready_marker(&self) -> &SelectorChain {
        &self.selectors().genres_grid
    }

    fn url_fragment(&self) -> Option<&str> {
        Some(&self.session.settings().paths.search)
    }
}

impl<'s, D: Driver> SearchScreen<'s, D> {
    /// Search screen of `session`
    pub const fn new(session: &'s Session<D>) -> Self {
        Self { session }
    }

    fn selectors(&self) -> &'s SearchSelectors {
        &self.session.settings().selectors.search
    }

    /// Wait for the genre grid within the long tier
    pub async fn wait_for_genres_grid(&self) -> TenfootResult<ElementSnapshot> {
        self.session
            .wait_for_element(&self.selectors().genres_grid, TimeoutTier::Long)
            .await
    }

    /// Genre names in grid order
    pub async fn available_genres(&self) -> TenfootResult<Vec<String>> {
        let selectors = self.selectors();
        let items = selectors
            .genre_item
            .query(self.session.driver(), Some(&selectors.genres_grid))
            .await?;
        Ok(items
            .into_iter()
            .filter(ElementSnapshot::is_rendered)
            .map(|item| item.text.trim().to_string())
            .filter(|name| !name.is_empty())
            .collect())
    }

    /// Move focus from the menu into the genre grid
    pub async fn enter_grid(&self) -> TenfootResult<FocusedItem> {
        descend_into(self.session, &self.selectors().genres_grid, MAX_DESCENT).await
    }

    /// Sweep the grid for `name` and press OK on it
    pub async fn select_genre(&self, name: &str) -> TenfootResult<FocusedItem> {
        let _ = self.enter_grid().await?;
        let outcome = self
            .session
            .scanner()
            .within(&self.selectors().genres_grid)
            .scan(&Target::one(name, MatchMode::IgnoreCase), &ScanPlan::genre_grid())
            .await?;
        let item = outcome.item.ok_or_else(|| TenfootError::SearchExhausted {
            target: name.to_string(),
            attempts: outcome.attempts,
        })?;
        tracing::info!(genre = %item.label, attempts = outcome.attempts, "selecting genre");
        self.session.remote().ok().await?;
        Ok(item)
    }

    /// Pick a genre uniformly at random and select it
    pub async fn select_random_genre<R: Rng>(&self, rng: &mut R) -> TenfootResult<String> {
        let genres = self.available_genres().await?;
        if genres.is_empty() {
            return Err(TenfootError::precondition(
                "at least one genre",
                self.session.timeout_ms(TimeoutTier::Long),
            ));
        }
        let genre = genres[rng.random_range(0..genres.len())].clone();
        let _ = self.select_genre(&genre).await?;
        Ok(genre)
    }

    /// Percent-decoded `q` parameter of the current URL
    pub async fn selected_genre_from_url(&self) -> TenfootResult<Option<String>> {
        let url = Url::parse(&self.session.current_url().await?)?;
        Ok(url
            .query_pairs()
            .find(|(key, _)| key == GENRE_QUERY_PARAM)
            .map(|(_, value)| value.into_owned()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;
    use crate::sim::SimulatedTv;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    async fn search_session(tv: SimulatedTv) -> Session<SimulatedTv> {
        let session = Session::new(tv, Settings::for_simulation());
        session.navigate("/search").await.unwrap();
        session
    }

    #[tokio::test]
    async fn test_available_genres() {
        let session = search_session(SimulatedTv::new()).await;
        let search = SearchScreen::new(&session);
        search.wait_for_genres_grid().await.unwrap();
        let genres = search.available_genres().await.unwrap();
        assert_eq!(genres.len(), 12);
        assert_eq!(genres[0], "Action");
        assert_eq!(search.selected_genre_from_url().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_select_genre_on_third_row() {
        let session = search_session(SimulatedTv::new()).await;
        let search = SearchScreen::new(&session);
        let item = search.select_genre("sci-fi").await.unwrap();
        assert_eq!(item.label, "Sci-Fi");
        assert_eq!(
            search.selected_genre_from_url().await.unwrap().as_deref(),
            Some("Sci-Fi")
        );
    }

    #[tokio::test]
    async fn test_select_random_genre_is_reproducible() {
        let session = search_session(SimulatedTv::new()).await;
        let search = SearchScreen::new(&session);
        let mut rng = StdRng::seed_from_u64(7);
        let genre = search.select_random_genre(&mut rng).await.unwrap();
        let from_url = search.selected_genre_from_url().await.unwrap().unwrap();
        assert!(from_url.eq_ignore_ascii_case(&genre));
    }

    #[tokio::test]
    async fn test_genre_with_spaces_is_decoded() {
        let tv = SimulatedTv::new().with_genres(&["Film Noir", "Stand Up"]);
        let session = search_session(tv).await;
        let search = SearchScreen::new(&session);
        let _ = search.select_genre("Stand Up").await.unwrap();
        assert_eq!(
            search.selected_genre_from_url().await.unwrap().as_deref(),
            Some("Stand Up")
        );
    }

    #[tokio::test]
    async fn test_no_genres() {
        let tv = SimulatedTv::new().with_genres(&[]);
        let session = search_session(tv).await;
        let mut rng = StdRng::seed_from_u64(1);
        let err = SearchScreen::new(&session)
            .select_random_genre(&mut rng)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), crate::result::FailureKind::Precondition);
    }
}
