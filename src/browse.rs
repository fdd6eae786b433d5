// 🔎 Browse State - search, type chips, paging and the armed target slot
//
// Pure presentation state. The only team mutation it can trigger is a
// place into the armed slot, and it does that through `PendingPick::apply`.

use futures::future::join_all;
use thiserror::Error;

use crate::catalog::CatalogClient;
use crate::models::{Pokemon, TEAM_SIZE};
use crate::team::TeamStore;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PickError {
    #[error("Please select a team slot first!")]
    NoSlotSelected,
}

/// A place that has been armed by the user and is ready to run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingPick {
    pub name: String,
    pub slot: usize,
}

impl PendingPick {
    pub async fn apply(self, store: &TeamStore) -> bool {
        // Slot indices come from `select_slot`, so they are always in range
        store.place(self.name, self.slot).await.unwrap_or(false)
    }
}

#[derive(Debug, Clone, Default)]
pub struct BrowseState {
    all_names: Vec<String>,
    loaded: Vec<Pokemon>,
    query: String,
    selected_types: Vec<String>,
    page: usize,
    page_size: usize,
    selected_slot: Option<usize>,
    loading: bool,
}

impl BrowseState {
    /// `page_size` of 0 shows every matching name on one page.
    pub fn new(page_size: usize) -> Self {
        BrowseState {
            page_size,
            ..Default::default()
        }
    }

    pub fn set_names(&mut self, names: Vec<String>) {
        self.all_names = names;
        self.page = 0;
    }

    pub fn all_names(&self) -> &[String] {
        &self.all_names
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn set_query(&mut self, query: impl Into<String>) {
        self.query = query.into();
        self.page = 0;
    }

    pub fn push_query_char(&mut self, c: char) {
        self.query.push(c);
        self.page = 0;
    }

    pub fn pop_query_char(&mut self) {
        self.query.pop();
        self.page = 0;
    }

    /// Names containing the query, case-insensitively. An empty query
    /// matches everything.
    pub fn matching_names(&self) -> Vec<&str> {
        let query = self.query.to_lowercase();
        self.all_names
            .iter()
            .filter(|name| name.to_lowercase().contains(&query))
            .map(String::as_str)
            .collect()
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn page_count(&self) -> usize {
        let matching = self.matching_names().len();
        if self.page_size == 0 {
            return 1;
        }
        matching.div_ceil(self.page_size).max(1)
    }

    /// Names on the current page, in catalog order.
    pub fn current_page_names(&self) -> Vec<String> {
        let matching = self.matching_names();
        let names: Vec<&str> = if self.page_size == 0 {
            matching
        } else {
            matching
                .into_iter()
                .skip(self.page * self.page_size)
                .take(self.page_size)
                .collect()
        };
        names.into_iter().map(String::from).collect()
    }

    pub fn next_page(&mut self) -> bool {
        if self.page + 1 < self.page_count() {
            self.page += 1;
            true
        } else {
            false
        }
    }

    pub fn prev_page(&mut self) -> bool {
        if self.page > 0 {
            self.page -= 1;
            true
        } else {
            false
        }
    }

    // ------------------------------------------------------------------------
    // Type chips
    // ------------------------------------------------------------------------

    pub fn selected_types(&self) -> &[String] {
        &self.selected_types
    }

    pub fn is_type_selected(&self, type_name: &str) -> bool {
        self.selected_types.iter().any(|t| t == type_name)
    }

    pub fn toggle_type(&mut self, type_name: &str) {
        if let Some(i) = self.selected_types.iter().position(|t| t == type_name) {
            self.selected_types.remove(i);
        } else {
            self.selected_types.push(type_name.to_string());
        }
    }

    pub fn has_filters(&self) -> bool {
        !self.selected_types.is_empty() || !self.query.is_empty()
    }

    /// Reset query and chips. The shared error is not touched.
    pub fn clear_filters(&mut self) {
        self.selected_types.clear();
        self.query.clear();
        self.page = 0;
    }

    // ------------------------------------------------------------------------
    // Loaded details
    // ------------------------------------------------------------------------

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn begin_load(&mut self) {
        self.loading = true;
        self.loaded.clear();
    }

    /// Store a loaded page. Results land whenever they arrive, even if the
    /// query moved on in the meantime.
    pub fn finish_load(&mut self, pokemon: Vec<Pokemon>) {
        self.loaded = pokemon;
        self.loading = false;
    }

    /// Loaded Pokemon matching any selected type chip.
    pub fn displayed(&self) -> Vec<&Pokemon> {
        self.loaded
            .iter()
            .filter(|p| {
                self.selected_types.is_empty()
                    || p.types.iter().any(|t| self.is_type_selected(&t.name))
            })
            .collect()
    }

    // ------------------------------------------------------------------------
    // Target slot
    // ------------------------------------------------------------------------

    pub fn selected_slot(&self) -> Option<usize> {
        self.selected_slot
    }

    /// Arm `slot`, or disarm it if it is already armed.
    pub fn select_slot(&mut self, slot: usize) {
        if slot >= TEAM_SIZE {
            return;
        }
        self.selected_slot = if self.selected_slot == Some(slot) { None } else { Some(slot) };
    }

    /// Consume the armed slot for `name`.
    pub fn pick(&mut self, name: &str) -> Result<PendingPick, PickError> {
        let slot = self.selected_slot.take().ok_or(PickError::NoSlotSelected)?;
        Ok(PendingPick { name: name.to_string(), slot })
    }
}

/// Fetch details for `names` concurrently, dropping the ones that fail.
pub async fn fetch_details(client: &CatalogClient, names: &[String]) -> Vec<Pokemon> {
    let fetches = names.iter().map(|name| client.fetch_by_name_or_id(name));
    join_all(fetches).await.into_iter().flatten().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::tests::{client_for, mount_detail};
    use crate::models::tests::pokemon;
    use crate::models::TYPE_UNIVERSE;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_query_matches_case_insensitive_substring() {
        let mut browse = BrowseState::new(0);
        browse.set_names(names(&["pikachu", "raichu", "charmander"]));

        browse.set_query("CHU");

        assert_eq!(browse.matching_names(), vec!["pikachu", "raichu"]);
    }

    #[test]
    fn test_pagination() {
        let mut browse = BrowseState::new(2);
        browse.set_names(names(&["a1", "a2", "a3", "a4", "a5"]));

        assert_eq!(browse.page_count(), 3);
        assert_eq!(browse.current_page_names(), names(&["a1", "a2"]));

        assert!(browse.next_page());
        assert!(browse.next_page());
        assert_eq!(browse.current_page_names(), names(&["a5"]));
        assert!(!browse.next_page());

        assert!(browse.prev_page());
        assert_eq!(browse.current_page_names(), names(&["a3", "a4"]));
    }

    #[test]
    fn test_query_change_resets_page() {
        let mut browse = BrowseState::new(1);
        browse.set_names(names(&["abra", "kadabra", "alakazam"]));
        browse.next_page();

        browse.push_query_char('a');

        assert_eq!(browse.page(), 0);
    }

    #[test]
    fn test_zero_page_size_disables_paging() {
        let mut browse = BrowseState::new(0);
        browse.set_names(names(&["a", "b", "c"]));

        assert_eq!(browse.page_count(), 1);
        assert_eq!(browse.current_page_names().len(), 3);
    }

    #[test]
    fn test_empty_catalog_has_one_page() {
        let browse = BrowseState::new(20);
        assert_eq!(browse.page_count(), 1);
        assert!(browse.current_page_names().is_empty());
    }

    #[test]
    fn test_type_chips_filter_loaded_details() {
        let mut browse = BrowseState::new(0);
        browse.finish_load(vec![
            pokemon(4, "charmander", &["fire"]),
            pokemon(7, "squirtle", &["water"]),
            pokemon(6, "charizard", &["fire", "flying"]),
        ]);

        browse.toggle_type("flying");
        browse.toggle_type("water");
        let shown: Vec<_> = browse.displayed().iter().map(|p| p.name.as_str()).collect();
        assert_eq!(shown, vec!["squirtle", "charizard"]);

        browse.toggle_type("water");
        assert_eq!(browse.displayed().len(), 1);
    }

    #[test]
    fn test_clear_filters() {
        let mut browse = BrowseState::new(0);
        browse.set_query("char");
        browse.toggle_type("fire");
        assert!(browse.has_filters());

        browse.clear_filters();

        assert!(!browse.has_filters());
        assert!(browse.selected_types().is_empty());
    }

    #[test]
    fn test_select_slot_toggles() {
        let mut browse = BrowseState::new(0);

        browse.select_slot(2);
        assert_eq!(browse.selected_slot(), Some(2));

        browse.select_slot(4);
        assert_eq!(browse.selected_slot(), Some(4));

        browse.select_slot(4);
        assert_eq!(browse.selected_slot(), None);

        browse.select_slot(TEAM_SIZE);
        assert_eq!(browse.selected_slot(), None);
    }

    #[test]
    fn test_pick_requires_armed_slot() {
        let mut browse = BrowseState::new(0);

        let err = browse.pick("pikachu").unwrap_err();
        assert_eq!(err.to_string(), "Please select a team slot first!");

        browse.select_slot(3);
        let pick = browse.pick("pikachu").unwrap();
        assert_eq!(pick, PendingPick { name: "pikachu".to_string(), slot: 3 });
        assert_eq!(browse.selected_slot(), None);
    }

    #[tokio::test]
    async fn test_pick_apply_places_into_team() {
        let server = MockServer::start().await;
        mount_detail(&server, 25, "pikachu", &["electric"]).await;
        let store = TeamStore::new(client_for(&server), TYPE_UNIVERSE);
        let mut browse = BrowseState::new(0);
        browse.select_slot(5);

        let pick = browse.pick("pikachu").unwrap();
        assert!(pick.apply(&store).await);

        assert_eq!(store.team().slot(5).unwrap().name, "pikachu");
    }

    #[tokio::test]
    async fn test_fetch_details_drops_failures() {
        let server = MockServer::start().await;
        mount_detail(&server, 1, "bulbasaur", &["grass", "poison"]).await;
        mount_detail(&server, 4, "charmander", &["fire"]).await;
        Mock::given(method("GET"))
            .and(path("/pokemon/ghostmon"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;
        let client = client_for(&server);

        let details = fetch_details(&client, &names(&["bulbasaur", "ghostmon", "charmander"])).await;

        let loaded: Vec<_> = details.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(loaded, vec!["bulbasaur", "charmander"]);
    }

    // Clearing filters never clears the shared error
    #[tokio::test]
    async fn test_clear_filters_keeps_shared_error() {
        let server = MockServer::start().await;
        let store = TeamStore::new(client_for(&server), TYPE_UNIVERSE);
        store.status().set_error("Pokemon not found");
        let mut browse = BrowseState::new(0);
        browse.set_query("zzz");

        browse.clear_filters();

        assert_eq!(store.status().error().as_deref(), Some("Pokemon not found"));
    }
}
