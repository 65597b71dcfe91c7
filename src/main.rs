//! Channel Guide
//! Browse, filter and play live channels from an M3U playlist or an inline list

// Hide console window on Windows release builds
#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

// Use mimalloc for faster memory allocation (Linux, macOS)
#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

use eframe::egui;
use std::sync::mpsc::{channel, Receiver, Sender};
use std::time::Duration;

mod catalog;
mod config;
mod deeplink;
mod error;
mod favorites;
mod loader;
mod m3u_parser;
mod models;
mod navigation;
mod player;
mod storage;
mod theme;

use catalog::{ChannelCatalog, ALL_CATEGORIES};
use config::AppConfig;
use error::Error;
use favorites::FavoritesStore;
use models::{ChannelRecord, PlaylistSource};
use navigation::{KeyAction, NavCommand, Navigator};
use player::{PlayTarget, Player};
use storage::{JsonFileStorage, MemoryStorage, Storage};
use theme::Theme;

/// Case-insensitive substring check without allocation
fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    if needle.is_empty() { return true; }
    if needle.len() > haystack.len() { return false; }

    haystack.as_bytes()
        .windows(needle.len())
        .any(|window| window.eq_ignore_ascii_case(needle.as_bytes()))
}

/// Get current time as HH:MM:SS (UTC)
fn timestamp_now() -> String {
    let now = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs();
    let secs = now % 86400;
    format!("{:02}:{:02}:{:02}", secs / 3600, (secs % 3600) / 60, secs % 60)
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "channel_guide=info".into());
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

/// Command line: `channel-guide [SOURCE] [--channel ID | channel=ID | scheme://...?channel=ID]`
///
/// http(s) arguments are always the playlist source.
#[derive(Debug, Default, PartialEq)]
struct StartupArgs {
    source: Option<PlaylistSource>,
    deep_link: Option<String>,
}

fn parse_args<I: IntoIterator<Item = String>>(args: I) -> StartupArgs {
    let mut startup = StartupArgs::default();
    let mut args = args.into_iter();

    while let Some(arg) = args.next() {
        if arg == "--channel" {
            startup.deep_link = args.next().filter(|id| !id.is_empty());
        } else if let Some(id) = arg.strip_prefix("--channel=") {
            startup.deep_link = Some(id.to_string()).filter(|id| !id.is_empty());
        } else if matches!(PlaylistSource::from_arg(&arg), PlaylistSource::Url(_)) {
            // Provider playlist URLs may carry their own `channel` parameter
            if startup.source.is_none() {
                startup.source = Some(PlaylistSource::from_arg(&arg));
            }
        } else if let Some(id) = deeplink::channel_from_arg(&arg) {
            startup.deep_link = Some(id);
        } else if startup.source.is_none() {
            startup.source = Some(PlaylistSource::from_arg(&arg));
        }
    }

    startup
}

fn main() -> Result<(), eframe::Error> {
    init_tracing();

    let startup = parse_args(std::env::args().skip(1));
    let mut config = AppConfig::load();
    if let Some(source) = startup.source {
        config.source = source;
    }

    let storage: Box<dyn Storage> = match JsonFileStorage::open_default() {
        Ok(storage) => Box::new(storage),
        Err(e) => {
            tracing::warn!(error = %e, "state will not persist");
            Box::new(MemoryStorage::default())
        }
    };

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1000.0, 650.0])
            .with_min_inner_size([640.0, 400.0]),
        vsync: true,
        ..Default::default()
    };

    eframe::run_native(
        "Channel Guide",
        options,
        Box::new(move |cc| {
            let app = ChannelGuideApp::new(config, storage, startup.deep_link);
            cc.egui_ctx.set_visuals(app.theme.visuals());
            Ok(Box::new(app))
        }),
    )
}

/// Background task messages
enum TaskResult {
    CatalogLoaded {
        catalog: ChannelCatalog,
        source: String,
    },
}

struct ChannelGuideApp {
    config: AppConfig,
    storage: Box<dyn Storage>,
    catalog: ChannelCatalog,
    favorites: FavoritesStore,
    theme: Theme,
    player: Player,

    // Background task channel
    task_receiver: Receiver<TaskResult>,
    task_sender: Sender<TaskResult>,
    loading: bool,

    // Browsing state
    categories: Vec<String>,
    category_idx: usize, // 0 = all
    favorites_only: bool,
    search_query: String,
    focus_search: bool,
    navigator: Navigator,
    scroll_to_selected: bool,
    deep_link: Option<String>,
    now_playing: Option<String>,

    status_message: String,
    show_console: bool,
    console_log: Vec<String>,
}

impl ChannelGuideApp {
    fn new(config: AppConfig, storage: Box<dyn Storage>, deep_link: Option<String>) -> Self {
        let (task_sender, task_receiver) = channel();
        let favorites = FavoritesStore::load(storage.as_ref());
        let theme = Theme::load(storage.as_ref());
        let player = Player::new(&config.external_player, config.single_window_mode);

        let mut app = Self {
            config,
            storage,
            catalog: ChannelCatalog::new(),
            favorites,
            theme,
            player,
            task_receiver,
            task_sender,
            loading: false,
            categories: Vec::new(),
            category_idx: 0,
            favorites_only: false,
            search_query: String::new(),
            focus_search: false,
            navigator: Navigator::default(),
            scroll_to_selected: false,
            deep_link,
            now_playing: None,
            status_message: String::new(),
            show_console: false,
            console_log: Vec::new(),
        };
        app.start_load();
        app
    }

    fn log(&mut self, message: &str) {
        tracing::debug!(target: "channel_guide::console", "{}", message);
        let timestamp = timestamp_now();
        self.console_log.push(format!("[{}] {}", timestamp, message));
        // Keep last 500 lines
        if self.console_log.len() > 500 {
            self.console_log.remove(0);
        }
    }

    /// Populate the catalog from the configured source
    fn start_load(&mut self) {
        if self.catalog.is_loaded() || self.loading {
            return;
        }

        let Some(loader) = self.config.loader() else {
            if let PlaylistSource::Inline(records) = &self.config.source {
                let records = records.clone();
                self.catalog.load_records(records);
                self.log(&format!("[INFO] Loaded inline list with {} channels", self.catalog.count()));
                self.on_catalog_loaded();
            }
            return;
        };

        let source = loader.describe();
        let sender = self.task_sender.clone();
        self.loading = true;
        self.status_message = format!("Loading {}...", source);
        self.log(&format!("[INFO] Loading playlist: {}", source));

        std::thread::spawn(move || {
            let mut catalog = ChannelCatalog::new();
            catalog.load(loader.as_ref());
            let _ = sender.send(TaskResult::CatalogLoaded { catalog, source });
        });
    }

    fn reload(&mut self) {
        if self.loading {
            return;
        }
        self.catalog.reset();
        self.navigator.select(None);
        self.start_load();
    }

    fn process_tasks(&mut self) {
        while let Ok(result) = self.task_receiver.try_recv() {
            self.loading = false;
            match result {
                TaskResult::CatalogLoaded { catalog, source } => {
                    let message = match catalog.load_error() {
                        Some(error) => format!("[WARN] Failed to load {}: {}", source, error),
                        None => format!("[INFO] Loaded {} with {} channels", source, catalog.count()),
                    };
                    self.catalog = catalog;
                    self.log(&message);
                    self.on_catalog_loaded();
                }
            }
        }
    }

    fn on_catalog_loaded(&mut self) {
        self.categories = self.catalog.get_categories();
        self.category_idx = 0;
        self.status_message = format!(
            "{} channels, {} playable",
            self.catalog.count(),
            self.catalog.active_count()
        );

        let initial = self
            .catalog
            .select_initial(self.deep_link.as_deref(), self.config.default_channel.as_deref())
            .map(|record| (record.id.clone(), record.name.clone()));

        let fallback_warning = match (self.deep_link.as_deref(), initial.as_ref()) {
            (Some(link), Some((id, _))) if id == link => None,
            (Some(link), _) => Some(format!("[WARN] Deep link channel '{}' not playable, using fallback", link)),
            _ => None,
        };
        if let Some(message) = fallback_warning {
            self.log(&message);
        }

        if let Some((id, name)) = initial {
            let idx = self.visible_channels().iter().position(|c| c.id == id);
            self.navigator.select(idx);
            self.scroll_to_selected = true;
            self.log(&format!("[INFO] Selected {}", name));
        }
    }

    fn current_category(&self) -> &str {
        match self.category_idx {
            0 => ALL_CATEGORIES,
            idx => self.categories.get(idx - 1).map(String::as_str).unwrap_or(ALL_CATEGORIES),
        }
    }

    /// Channels shown in the list after category, favorites and search filters
    fn visible_channels(&self) -> Vec<ChannelRecord> {
        let base = if self.favorites_only {
            self.favorites.resolve(&self.catalog)
        } else {
            self.catalog.get_by_category(self.current_category())
        };

        base.into_iter()
            .filter(|c| contains_ignore_case(&c.name, self.search_query.trim()))
            .cloned()
            .collect()
    }

    fn set_category(&mut self, idx: usize) {
        self.category_idx = idx;
        self.favorites_only = false;
        self.navigator.select(None);
    }

    fn play(&mut self, record: &ChannelRecord) {
        match self.player.play(record) {
            Ok(target) => {
                let via = match target {
                    PlayTarget::Stream(_) => self.player.command.clone(),
                    PlayTarget::Embed(_) => "browser".to_string(),
                };
                self.log(&format!("[PLAY] {} | {} | {}", record.name, via, target.url()));
                self.status_message = format!("Playing {}", record.name);
                self.now_playing = Some(record.id.clone());
            }
            Err(Error::StreamUnavailable(_)) => {
                self.log(&format!("[WARN] Stream unavailable: {}", record.name));
                self.status_message = format!("Stream unavailable: {}", record.name);
            }
            Err(e) => {
                self.log(&format!("[ERROR] {}", e));
                self.status_message = e.to_string();
            }
        }
    }

    fn toggle_favorite(&mut self, record: &ChannelRecord) {
        self.status_message = if self.favorites.toggle(&record.id) {
            format!("Added '{}' to favorites", record.name)
        } else {
            format!("Removed '{}' from favorites", record.name)
        };
        if let Err(e) = self.favorites.save(self.storage.as_mut()) {
            self.log(&format!("[ERROR] Failed to save favorites: {}", e));
        }
    }

    fn toggle_theme(&mut self, ctx: &egui::Context) {
        self.theme = self.theme.toggle();
        ctx.set_visuals(self.theme.visuals());
        if let Err(e) = self.theme.save(self.storage.as_mut()) {
            self.log(&format!("[ERROR] Failed to save theme: {}", e));
        }
    }

    /// Copy a share link, or the raw address when no share base is configured
    fn copy_link(&mut self, ctx: &egui::Context, record: &ChannelRecord) {
        let link = if self.config.share_base_url.is_empty() {
            player::playable_address(record).map(|target| target.url().to_string())
        } else {
            match deeplink::share_link(&self.config.share_base_url, &record.id) {
                Ok(link) => Some(link),
                Err(e) => {
                    self.log(&format!("[WARN] Invalid share base URL: {}", e));
                    player::playable_address(record).map(|target| target.url().to_string())
                }
            }
        };

        match link {
            Some(link) => {
                ctx.copy_text(link.clone());
                self.status_message = format!("Copied {}", link);
            }
            None => self.status_message = format!("Nothing to copy for {}", record.name),
        }
    }

    fn handle_keyboard(&mut self, ctx: &egui::Context) {
        // Typing in the search box
        if ctx.wants_keyboard_input() {
            return;
        }

        let actions: Vec<KeyAction> = ctx.input(|i| {
            i.events
                .iter()
                .filter_map(|event| match event {
                    egui::Event::Key { key, pressed: true, modifiers, .. } if !modifiers.ctrl && !modifiers.alt => {
                        KeyAction::from_key(*key)
                    }
                    _ => None,
                })
                .collect()
        });

        for action in actions {
            let visible = self.visible_channels();
            match self.navigator.apply(action, visible.len()) {
                NavCommand::None => {}
                NavCommand::Select(_) => self.scroll_to_selected = true,
                NavCommand::Play(idx) => self.play(&visible[idx]),
                NavCommand::ToggleFavorite(idx) => self.toggle_favorite(&visible[idx]),
                NavCommand::CopyLink(idx) => self.copy_link(ctx, &visible[idx]),
                NavCommand::ShiftCategory(step) => {
                    let idx = navigation::shift_category(self.category_idx, step, self.categories.len() + 1);
                    self.set_category(idx);
                }
                NavCommand::ToggleTheme => self.toggle_theme(ctx),
                NavCommand::FocusSearch => self.focus_search = true,
            }
        }
    }
}

impl eframe::App for ChannelGuideApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.process_tasks();
        if self.loading {
            ctx.request_repaint_after(Duration::from_millis(100));
        }

        self.handle_keyboard(ctx);

        // Top panel - Controls
        egui::TopBottomPanel::top("top_panel").show(ctx, |ui| {
            ui.add_space(5.0);
            ui.horizontal(|ui| {
                ui.heading("📺 Channel Guide");
                ui.separator();

                if ui.add_enabled(!self.loading, egui::Button::new("⟳ Reload"))
                    .on_hover_text(self.config.source.describe())
                    .clicked()
                {
                    self.reload();
                }

                let theme_label = match self.theme {
                    Theme::Dark => "☀ Light",
                    Theme::Light => "🌙 Dark",
                };
                if ui.button(theme_label).on_hover_text("Toggle theme (T)").clicked() {
                    self.toggle_theme(ui.ctx());
                }

                ui.separator();

                let search = ui.add(
                    egui::TextEdit::singleline(&mut self.search_query)
                        .hint_text("Search channels ( / )")
                        .desired_width(220.0),
                );
                if self.focus_search {
                    search.request_focus();
                    self.focus_search = false;
                }
                if search.changed() {
                    self.navigator.select(None);
                }

                ui.separator();
                ui.checkbox(&mut self.show_console, "Console");
            });
            ui.add_space(5.0);
        });

        // Bottom panel - Status
        egui::TopBottomPanel::bottom("bottom_panel").show(ctx, |ui| {
            ui.horizontal(|ui| {
                if self.loading {
                    ui.spinner();
                }
                ui.label(&self.status_message);
                if let Some(epg) = self.catalog.guide_url() {
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        ui.label(egui::RichText::new(format!("EPG: {}", epg)).weak());
                    });
                }
            });
        });

        if self.show_console {
            egui::TopBottomPanel::bottom("console_panel")
                .resizable(true)
                .default_height(150.0)
                .show(ctx, |ui| {
                    ui.horizontal(|ui| {
                        ui.strong("Console Log");
                        if ui.button("🗑 Clear").clicked() {
                            self.console_log.clear();
                        }
                    });
                    egui::ScrollArea::vertical()
                        .auto_shrink([false, false])
                        .stick_to_bottom(true)
                        .show(ui, |ui| {
                            for line in &self.console_log {
                                let color = if line.contains("[ERROR]") {
                                    egui::Color32::RED
                                } else if line.contains("[WARN]") {
                                    egui::Color32::YELLOW
                                } else if line.contains("[PLAY]") {
                                    egui::Color32::GREEN
                                } else {
                                    egui::Color32::LIGHT_BLUE
                                };
                                ui.label(egui::RichText::new(line).monospace().color(color));
                            }
                        });
                });
        }

        // Categories
        let mut clicked_category: Option<usize> = None;
        let mut show_favorites = false;
        egui::SidePanel::left("categories_panel")
            .resizable(true)
            .default_width(180.0)
            .show(ctx, |ui| {
                egui::ScrollArea::vertical().show(ui, |ui| {
                    let fav_label = format!("★ Favorites ({})", self.favorites.ids().len());
                    if ui.selectable_label(self.favorites_only, fav_label).clicked() {
                        show_favorites = true;
                    }
                    ui.separator();

                    let all_label = format!("All ({})", self.catalog.count());
                    if ui.selectable_label(!self.favorites_only && self.category_idx == 0, all_label).clicked() {
                        clicked_category = Some(0);
                    }
                    for (i, category) in self.categories.iter().enumerate() {
                        let selected = !self.favorites_only && self.category_idx == i + 1;
                        if ui.selectable_label(selected, category.as_str()).clicked() {
                            clicked_category = Some(i + 1);
                        }
                    }
                });
            });

        if let Some(idx) = clicked_category {
            self.set_category(idx);
        }
        if show_favorites {
            self.favorites_only = true;
            self.navigator.select(None);
        }

        // Channel list
        let visible = self.visible_channels();
        let selected = self.navigator.selected();
        let scroll_to_selected = std::mem::take(&mut self.scroll_to_selected);
        let mut to_play: Option<ChannelRecord> = None;
        let mut toggle_fav: Option<ChannelRecord> = None;
        let mut select: Option<usize> = None;

        egui::CentralPanel::default().show(ctx, |ui| {
            if visible.is_empty() {
                ui.vertical_centered(|ui| {
                    ui.add_space(80.0);
                    let message = if self.loading || !self.catalog.is_loaded() {
                        "Loading channels..."
                    } else if self.favorites_only {
                        "No favorites yet - press F on a channel to add it"
                    } else if self.catalog.count() == 0 {
                        "No channels available"
                    } else {
                        "No channels match the current filter"
                    };
                    ui.label(message);
                });
                return;
            }

            egui::ScrollArea::vertical()
                .auto_shrink([false, false])
                .show(ui, |ui| {
                    for (idx, channel) in visible.iter().enumerate() {
                        let is_fav = self.favorites.is_favorite(&channel.id);
                        let is_selected = selected == Some(idx);
                        let active = channel.is_active();

                        let row = ui.horizontal(|ui| {
                            let fav_text = if is_fav {
                                egui::RichText::new("★").size(18.0).color(egui::Color32::GOLD)
                            } else {
                                egui::RichText::new("☆").size(18.0).color(egui::Color32::GRAY)
                            };
                            if ui.button(fav_text)
                                .on_hover_text(if is_fav { "Remove from favorites" } else { "Add to favorites" })
                                .clicked()
                            {
                                toggle_fav = Some(channel.clone());
                            }

                            if ui.add_enabled(active, egui::Button::new("▶")).clicked() {
                                to_play = Some(channel.clone());
                            }

                            let mut name = egui::RichText::new(&channel.name).strong();
                            if self.now_playing.as_deref() == Some(channel.id.as_str()) {
                                name = name.color(egui::Color32::from_rgb(100, 149, 237));
                            }
                            let label = ui.selectable_label(is_selected, name);
                            if label.clicked() {
                                select = Some(idx);
                            }
                            if label.double_clicked() {
                                to_play = Some(channel.clone());
                            }

                            if let Some(category) = &channel.category {
                                ui.label(egui::RichText::new(category).weak());
                            }
                            if !active {
                                ui.label(egui::RichText::new("(unavailable)").weak().italics());
                            }
                        });

                        if is_selected && scroll_to_selected {
                            row.response.scroll_to_me(Some(egui::Align::Center));
                        }
                    }
                });
        });

        if let Some(idx) = select {
            self.navigator.select(Some(idx));
        }
        if let Some(channel) = to_play {
            self.play(&channel);
        }
        if let Some(channel) = toggle_fav {
            self.toggle_favorite(&channel);
        }
    }
}
