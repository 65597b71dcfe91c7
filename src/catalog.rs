//! Channel catalog: owns the loaded records and answers read queries.
//!
//! The catalog is empty until [`ChannelCatalog::load`] (or
//! [`ChannelCatalog::load_records`]) runs, and every query is well defined on an
//! empty catalog. A failed fetch leaves it empty but loaded.

use std::collections::{BTreeSet, HashSet};

use crate::loader::PlaylistLoader;
use crate::m3u_parser;
use crate::models::ChannelRecord;

/// Category value meaning "no filter"
pub const ALL_CATEGORIES: &str = "all";

#[derive(Debug, Default)]
pub struct ChannelCatalog {
    channels: Vec<ChannelRecord>,
    loaded: bool,
    guide_url: Option<String>,
    load_error: Option<String>,
}

impl ChannelCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetch and parse the playlist on first call; cached afterwards
    pub fn load(&mut self, loader: &dyn PlaylistLoader) -> &[ChannelRecord] {
        if !self.loaded {
            let channels = match loader.fetch() {
                Ok(text) => {
                    let playlist = m3u_parser::parse_playlist_document(&text);
                    self.guide_url = playlist.epg_url;
                    playlist.channels
                }
                Err(e) => {
                    tracing::warn!(source = %loader.describe(), error = %e, "playlist load failed, continuing with no channels");
                    self.load_error = Some(e.to_string());
                    Vec::new()
                }
            };
            self.populate(channels);
        }
        &self.channels
    }

    /// Populate from an inline seed list (offline mode)
    pub fn load_records(&mut self, records: Vec<ChannelRecord>) -> &[ChannelRecord] {
        if !self.loaded {
            self.populate(records);
        }
        &self.channels
    }

    fn populate(&mut self, channels: Vec<ChannelRecord>) {
        let mut seen = HashSet::new();
        for record in &channels {
            if !seen.insert(record.id.as_str()) {
                tracing::warn!(id = %record.id, "duplicate channel id, lookups resolve to the first entry");
            }
        }

        tracing::info!(
            channels = channels.len(),
            active = channels.iter().filter(|c| c.is_active()).count(),
            "catalog loaded"
        );

        self.channels = channels;
        self.loaded = true;
    }

    /// Forget the loaded records so the next load fetches again
    pub fn reset(&mut self) {
        self.channels.clear();
        self.loaded = false;
        self.guide_url = None;
        self.load_error = None;
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// Guide URL from the playlist header of the last load
    pub fn guide_url(&self) -> Option<&str> {
        self.guide_url.as_deref()
    }

    /// Why the last load came up empty, if the fetch failed
    pub fn load_error(&self) -> Option<&str> {
        self.load_error.as_deref()
    }

    pub fn get_all(&self) -> &[ChannelRecord] {
        &self.channels
    }

    /// Distinct categories in lexicographic order
    pub fn get_categories(&self) -> Vec<String> {
        self.channels
            .iter()
            .filter_map(|c| c.category.as_deref())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .map(str::to_string)
            .collect()
    }

    /// Records in the given category; [`ALL_CATEGORIES`] returns everything
    pub fn get_by_category(&self, category: &str) -> Vec<&ChannelRecord> {
        if category == ALL_CATEGORIES {
            return self.channels.iter().collect();
        }
        self.channels
            .iter()
            .filter(|c| c.category.as_deref() == Some(category))
            .collect()
    }

    pub fn get_by_id(&self, id: &str) -> Option<&ChannelRecord> {
        self.channels.iter().find(|c| c.id == id)
    }

    /// Playable records (non-empty stream URL or an embed URL)
    pub fn get_active(&self) -> Vec<&ChannelRecord> {
        self.channels.iter().filter(|c| c.is_active()).collect()
    }

    pub fn count(&self) -> usize {
        self.channels.len()
    }

    pub fn active_count(&self) -> usize {
        self.channels.iter().filter(|c| c.is_active()).count()
    }

    /// Startup selection: deep link, then configured default, then first active
    pub fn select_initial(&self, deep_link: Option<&str>, default_id: Option<&str>) -> Option<&ChannelRecord> {
        let playable = |id: Option<&str>| {
            id.and_then(|id| self.get_by_id(id))
                .filter(|record| record.is_active())
        };

        playable(deep_link)
            .or_else(|| playable(default_id))
            .or_else(|| self.channels.iter().find(|c| c.is_active()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Error, Result};
    use std::cell::Cell;

    const SCENARIO: &str = r#"#EXTINF:-1 tvg-id="c1" tvg-name="Channel One" group-title="News",Channel One
http://example.test/c1.m3u8
#EXTINF:-1 tvg-id="c2" tvg-name="Channel Two" group-title="News",Channel Two
"#;

    /// Counts fetches and optionally fails
    struct CountingLoader {
        text: Option<String>,
        calls: Cell<usize>,
    }

    impl CountingLoader {
        fn ok(text: &str) -> Self {
            Self { text: Some(text.to_string()), calls: Cell::new(0) }
        }

        fn failing() -> Self {
            Self { text: None, calls: Cell::new(0) }
        }
    }

    impl PlaylistLoader for CountingLoader {
        fn fetch(&self) -> Result<String> {
            self.calls.set(self.calls.get() + 1);
            self.text
                .clone()
                .ok_or_else(|| Error::Io(std::io::Error::new(std::io::ErrorKind::NotFound, "no playlist")))
        }

        fn describe(&self) -> String {
            "test".to_string()
        }
    }

    fn seeded() -> ChannelCatalog {
        let mut catalog = ChannelCatalog::new();
        catalog.load_records(vec![
            ChannelRecord::new("s1", "Sport One").with_category("Sports").with_stream("http://example.test/s1"),
            ChannelRecord::new("n1", "News One").with_category("News").with_stream("http://example.test/n1"),
            ChannelRecord::new("p1", "Placeholder").with_category("News"),
            ChannelRecord::new("e1", "Embedded").with_category("Movies").with_embed("https://player.example.test/e1"),
            ChannelRecord::new("x1", "Empty Stream").with_category("Sports").with_stream(""),
            ChannelRecord::new("u1", "Uncategorized").with_stream("http://example.test/u1"),
        ]);
        catalog
    }

    #[test]
    fn test_unloaded_catalog_is_empty() {
        let catalog = ChannelCatalog::new();
        assert!(!catalog.is_loaded());
        assert!(catalog.get_all().is_empty());
        assert!(catalog.get_categories().is_empty());
        assert!(catalog.get_by_category(ALL_CATEGORIES).is_empty());
        assert!(catalog.get_active().is_empty());
        assert_eq!(catalog.count(), 0);
        assert_eq!(catalog.active_count(), 0);
        assert!(catalog.get_by_id("missing").is_none());
        assert!(catalog.select_initial(Some("c1"), Some("c2")).is_none());
    }

    #[test]
    fn test_scenario_entry_without_url() {
        let mut catalog = ChannelCatalog::new();
        let loader = CountingLoader::ok(SCENARIO);
        assert_eq!(catalog.load(&loader).len(), 1);
        assert_eq!(catalog.get_all().len(), 1);
        assert_eq!(catalog.get_active().len(), 1);
        assert_eq!(catalog.get_categories(), vec!["News".to_string()]);
        assert_eq!(catalog.get_all()[0].id, "c1");
    }

    #[test]
    fn test_scenario_empty_input() {
        let mut catalog = ChannelCatalog::new();
        catalog.load(&CountingLoader::ok(""));
        assert!(catalog.is_loaded());
        assert_eq!(catalog.get_all().len(), 0);
        assert_eq!(catalog.get_categories().len(), 0);
    }

    #[test]
    fn test_load_is_cached() {
        let mut catalog = ChannelCatalog::new();
        let loader = CountingLoader::ok(SCENARIO);
        catalog.load(&loader);
        catalog.load(&loader);
        catalog.load(&CountingLoader::ok(""));
        assert_eq!(loader.calls.get(), 1);
        assert_eq!(catalog.count(), 1);
    }

    #[test]
    fn test_load_failure_is_fail_open() {
        let mut catalog = ChannelCatalog::new();
        let loader = CountingLoader::failing();
        assert!(catalog.load(&loader).is_empty());
        assert!(catalog.is_loaded());
        catalog.load(&loader);
        assert_eq!(loader.calls.get(), 1);
    }

    #[test]
    fn test_reset_allows_reload() {
        let mut catalog = ChannelCatalog::new();
        catalog.load(&CountingLoader::failing());
        catalog.reset();
        assert!(!catalog.is_loaded());

        let loader = CountingLoader::ok(SCENARIO);
        catalog.load(&loader);
        assert_eq!(loader.calls.get(), 1);
        assert_eq!(catalog.count(), 1);
    }

    #[test]
    fn test_load_records_is_cached() {
        let mut catalog = ChannelCatalog::new();
        catalog.load_records(m3u_parser::parse_playlist(SCENARIO));
        assert_eq!(catalog.count(), 1);
        catalog.load_records(Vec::new());
        assert_eq!(catalog.count(), 1);
        assert_eq!(catalog.guide_url(), None);
    }

    #[test]
    fn test_load_keeps_guide_url_and_error() {
        let mut catalog = ChannelCatalog::new();
        let header = format!("#EXTM3U x-tvg-url=\"http://example.test/epg.xml\"\n{}", SCENARIO);
        catalog.load(&CountingLoader::ok(&header));
        assert_eq!(catalog.count(), 1);
        assert_eq!(catalog.guide_url(), Some("http://example.test/epg.xml"));
        assert_eq!(catalog.load_error(), None);

        catalog.reset();
        assert_eq!(catalog.guide_url(), None);
        catalog.load(&CountingLoader::failing());
        assert!(catalog.is_loaded());
        assert_eq!(catalog.guide_url(), None);
        assert!(catalog.load_error().is_some_and(|e| e.contains("no playlist")));
    }

    #[test]
    fn test_categories_sorted_and_unique() {
        let catalog = seeded();
        assert_eq!(catalog.get_categories(), vec!["Movies", "News", "Sports"]);
    }

    #[test]
    fn test_categories_byte_order() {
        let mut catalog = ChannelCatalog::new();
        catalog.load_records(vec![
            ChannelRecord::new("a", "A").with_category("news"),
            ChannelRecord::new("b", "B").with_category("News"),
            ChannelRecord::new("c", "C").with_category("Éire"),
            ChannelRecord::new("d", "D").with_category("News"),
        ]);
        assert_eq!(catalog.get_categories(), vec!["News", "news", "Éire"]);
    }

    #[test]
    fn test_all_equals_get_all() {
        let catalog = seeded();
        let all: Vec<&ChannelRecord> = catalog.get_all().iter().collect();
        assert_eq!(catalog.get_by_category(ALL_CATEGORIES), all);
    }

    #[test]
    fn test_by_category_preserves_order() {
        let catalog = seeded();
        let ids: Vec<&str> = catalog.get_by_category("News").iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["n1", "p1"]);
        assert!(catalog.get_by_category("Unknown").is_empty());
    }

    #[test]
    fn test_active_filter() {
        let catalog = seeded();
        let ids: Vec<&str> = catalog.get_active().iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["s1", "n1", "e1", "u1"]);
        assert_eq!(catalog.active_count(), catalog.get_active().len());
        assert_eq!(catalog.count(), catalog.get_all().len());
        for record in catalog.get_active() {
            assert!(catalog.get_all().contains(record));
        }
    }

    #[test]
    fn test_get_by_id() {
        let catalog = seeded();
        assert_eq!(catalog.get_by_id("e1").map(|c| c.name.as_str()), Some("Embedded"));
        assert!(catalog.get_by_id("missing").is_none());
    }

    #[test]
    fn test_duplicate_ids_first_wins_for_lookup() {
        let mut catalog = ChannelCatalog::new();
        catalog.load_records(vec![
            ChannelRecord::new("dup", "First").with_stream("http://example.test/1"),
            ChannelRecord::new("dup", "Second").with_stream("http://example.test/2"),
        ]);
        assert_eq!(catalog.count(), 2);
        assert_eq!(catalog.active_count(), 2);
        assert_eq!(catalog.get_by_id("dup").map(|c| c.name.as_str()), Some("First"));
    }

    #[test]
    fn test_select_initial_priority() {
        let catalog = seeded();
        let pick = |deep: Option<&str>, default: Option<&str>| {
            catalog.select_initial(deep, default).map(|c| c.id.clone())
        };

        assert_eq!(pick(Some("e1"), Some("n1")), Some("e1".to_string()));
        // unresolvable deep link
        assert_eq!(pick(Some("missing"), Some("n1")), Some("n1".to_string()));
        // non-playable deep link and default
        assert_eq!(pick(Some("p1"), Some("x1")), Some("s1".to_string()));
        assert_eq!(pick(None, None), Some("s1".to_string()));
    }

    #[test]
    fn test_select_initial_without_active_records() {
        let mut catalog = ChannelCatalog::new();
        catalog.load_records(vec![ChannelRecord::new("p1", "Placeholder")]);
        assert!(catalog.select_initial(Some("p1"), None).is_none());
    }
}
