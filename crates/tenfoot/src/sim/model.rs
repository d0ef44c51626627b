//! Behavioral model of the TV application.

use super::dom::{Dom, El};
use crate::event::Key;
use url::{form_urlencoded, Url};

pub(crate) const APP_COLUMNS: usize = 5;
pub(crate) const GENRE_COLUMNS: usize = 4;
pub(crate) const CHANNEL_COLUMNS: usize = 4;

const MENU: [&str; 5] = ["Search", "Home", "TV Guide", "Channels", "Apps"];
const MENU_SEARCH: usize = 0;
const MENU_HOME: usize = 1;
const MENU_TV_GUIDE: usize = 2;
const MENU_CHANNELS: usize = 3;
const MENU_APPS: usize = 4;

const FEATURED: [&str; 3] = ["Movie Night", "Top Series", "Live Sports"];
const DETAILS_BUTTONS: [&str; 3] = ["app-open-button", "app-fav-button", "app-info-button"];
const FAVORITE_BUTTON: usize = 1;

/// An installed application
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimApp {
    /// `data-testid`
    pub id: String,
    /// Display name
    pub name: String,
}

impl SimApp {
    /// App whose id is derived from its name (`"Disney+"` -> `disney-plus`)
    #[must_use]
    pub fn named(name: &str) -> Self {
        Self {
            id: slug(name),
            name: name.to_string(),
        }
    }
}

pub(crate) fn slug(name: &str) -> String {
    let mut out = String::new();
    for c in name.replace('+', " plus").to_lowercase().chars() {
        if c.is_alphanumeric() {
            out.push(c);
        } else if !out.ends_with('-') && !out.is_empty() {
            out.push('-');
        }
    }
    out.trim_end_matches('-').to_string()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Screen {
    Home,
    Apps,
    Details { app: usize, picking: bool },
    Search { query: Option<String> },
    Channels,
    TvGuide,
    NotFound(String),
}

impl Screen {
    const fn menu_index(&self) -> Option<usize> {
        match self {
            Self::Search { .. } => Some(MENU_SEARCH),
            Self::Home => Some(MENU_HOME),
            Self::TvGuide => Some(MENU_TV_GUIDE),
            Self::Channels => Some(MENU_CHANNELS),
            Self::Apps => Some(MENU_APPS),
            Self::Details { .. } | Self::NotFound(_) => None,
        }
    }

    pub const fn name(&self) -> &'static str {
        match self {
            Self::Home => "home",
            Self::Apps => "apps",
            Self::Details { .. } => "app-details",
            Self::Search { .. } => "search",
            Self::Channels => "channels",
            Self::TvGuide => "tv-guide",
            Self::NotFound(_) => "not-found",
        }
    }

    fn from_menu(index: usize) -> Self {
        match index {
            MENU_SEARCH => Self::Search { query: None },
            MENU_HOME => Self::Home,
            MENU_TV_GUIDE => Self::TvGuide,
            MENU_CHANNELS => Self::Channels,
            _ => Self::Apps,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Focus {
    Menu(usize),
    Featured(usize),
    Favorite { index: usize, on_delete: bool },
    Tile(usize),
    Genre(usize),
    Channel(usize),
    Button(usize),
    Nothing,
}

#[derive(Debug, Clone)]
struct Favorite {
    app: SimApp,
    ghost: bool,
}

enum GridMove {
    Stay,
    To(usize),
    ExitUp,
}

fn grid_move(index: usize, len: usize, columns: usize, key: Key) -> GridMove {
    match key {
        Key::Right if (index + 1) % columns != 0 && index + 1 < len => GridMove::To(index + 1),
        Key::Left if index % columns != 0 => GridMove::To(index - 1),
        Key::Up if index >= columns => GridMove::To(index - columns),
        Key::Up => GridMove::ExitUp,
        Key::Down if index - index % columns + columns < len => {
            GridMove::To((index + columns).min(len - 1))
        }
        _ => GridMove::Stay,
    }
}

/// Rendered page plus the focus targets inside it
#[derive(Debug)]
pub(crate) struct Rendered {
    pub dom: Dom,
    pub active: Option<usize>,
    pub targets: Vec<(usize, Focus)>,
}

impl Rendered {
    pub fn focus_of(&self, node: usize) -> Option<Focus> {
        self.targets
            .iter()
            .find(|(index, _)| *index == node)
            .map(|(_, focus)| *focus)
    }
}

#[derive(Debug, Clone)]
pub(crate) struct TvModel {
    /// Scheme, host and port without a trailing slash
    origin: String,
    pub screen: Screen,
    focus: Focus,
    catalog: Vec<SimApp>,
    favorites: Vec<Favorite>,
    protected: Vec<String>,
    genres: Vec<String>,
    channels: Vec<String>,
    pub delete_mode: bool,
    /// Remove buttons respond but nothing is removed
    pub sticky_favorites: bool,
    return_tile: usize,
}

impl TvModel {
    pub fn new(origin: String) -> Self {
        let catalog = [
            "Netflix",
            "YouTube",
            "Prime Video",
            "Disney+",
            "Spotify",
            "Twitch",
            "Deezer",
            "Rakuten TV",
            "Pluto TV",
            "DAZN",
            "Euronews",
            "Red Bull TV",
            "Arte",
            "Plex",
        ]
        .into_iter()
        .map(SimApp::named)
        .collect();
        let genres = [
            "Action",
            "Comedy",
            "Drama",
            "Documentary",
            "Kids",
            "Music",
            "News",
            "Sports",
            "Horror",
            "Romance",
            "Sci-Fi",
            "Thriller",
        ]
        .into_iter()
        .map(str::to_string)
        .collect();
        let channels = ["TF1", "France 2", "BBC One", "RTL", "Rai 1", "ZDF", "La 1", "NPO 1"]
            .into_iter()
            .map(str::to_string)
            .collect();
        let mut model = Self {
            origin,
            screen: Screen::Home,
            focus: Focus::Nothing,
            catalog,
            favorites: Vec::new(),
            protected: vec!["watch-tv".to_string()],
            genres,
            channels,
            delete_mode: false,
            sticky_favorites: false,
            return_tile: 0,
        };
        model.set_favorites(
            ["Watch TV", "Netflix", "YouTube", "Spotify"]
                .into_iter()
                .map(SimApp::named)
                .collect(),
        );
        model
    }

    pub fn set_favorites(&mut self, apps: Vec<SimApp>) {
        self.favorites = apps
            .into_iter()
            .map(|app| Favorite { app, ghost: false })
            .collect();
        self.open(self.screen.clone());
    }

    pub fn set_genres(&mut self, genres: Vec<String>) {
        self.genres = genres;
    }

    pub fn set_catalog(&mut self, catalog: Vec<SimApp>) {
        self.catalog = catalog;
    }

    pub fn live_favorites(&self) -> Vec<&SimApp> {
        self.favorites
            .iter()
            .filter(|f| !f.ghost)
            .map(|f| &f.app)
            .collect()
    }

    fn live_count(&self) -> usize {
        self.favorites.iter().filter(|f| !f.ghost).count()
    }

    fn is_deletable(&self, app: &SimApp) -> bool {
        !self.protected.contains(&app.id)
    }

    fn is_favorite(&self, app: &SimApp) -> bool {
        self.live_favorites().iter().any(|f| f.id == app.id)
    }

    fn landing_focus(&self) -> Focus {
        match &self.screen {
            Screen::Home if self.live_count() > 0 => Focus::Favorite {
                index: 0,
                on_delete: false,
            },
            Screen::Home => Focus::Featured(0),
            Screen::Details { .. } => Focus::Button(0),
            other => other.menu_index().map_or(Focus::Nothing, Focus::Menu),
        }
    }

    fn first_content_focus(&self) -> Option<Focus> {
        match &self.screen {
            Screen::Home => Some(Focus::Featured(0)),
            Screen::Apps if !self.catalog.is_empty() => Some(Focus::Tile(0)),
            Screen::Search { .. } if !self.genres.is_empty() => Some(Focus::Genre(0)),
            Screen::Channels if !self.channels.is_empty() => Some(Focus::Channel(0)),
            _ => None,
        }
    }

    fn open(&mut self, screen: Screen) {
        self.favorites.retain(|f| !f.ghost);
        self.delete_mode = false;
        self.screen = screen;
        self.focus = self.landing_focus();
    }

    /// Route a URL by path; the host is kept for later URLs
    pub fn goto(&mut self, url: &Url) {
        self.origin = url.origin().ascii_serialization();

        let path = url.path().trim_matches('/');
        let screen = match path {
            "" => Screen::Home,
            "page/499" => Screen::Apps,
            "search" => Screen::Search {
                query: url
                    .query_pairs()
                    .find(|(k, _)| k == "q")
                    .map(|(_, v)| v.into_owned()),
            },
            "channels" => Screen::Channels,
            "tv-guide" => Screen::TvGuide,
            other => match other
                .strip_prefix("details/")
                .and_then(|id| self.catalog.iter().position(|a| a.id == id))
            {
                Some(app) => Screen::Details {
                    app,
                    picking: false,
                },
                None => Screen::NotFound(format!("/{other}")),
            },
        };
        self.open(screen);
    }

    pub fn url(&self) -> String {
        let path = match &self.screen {
            Screen::Home => "/".to_string(),
            Screen::Apps => "/page/499".to_string(),
            Screen::Details { app, .. } => format!("/details/{}", self.catalog[*app].id),
            Screen::Search { .. } => "/search".to_string(),
            Screen::Channels => "/channels".to_string(),
            Screen::TvGuide => "/tv-guide".to_string(),
            Screen::NotFound(path) => path.clone(),
        };
        match &self.screen {
            Screen::Search { query: Some(q) } => {
                let query = form_urlencoded::Serializer::new(String::new())
                    .append_pair("q", q)
                    .finish();
                format!("{}{path}?{query}", self.origin)
            }
            _ => format!("{}{path}", self.origin),
        }
    }

    pub fn title(&self) -> String {
        format!("Titan TV - {}", self.screen.name())
    }

    /// Apply a key; returns true when the screen changed
    pub fn press(&mut self, key: Key) -> bool {
        match self.focus {
            Focus::Menu(i) => match key {
                Key::Left => self.focus = Focus::Menu(i.saturating_sub(1)),
                Key::Right => self.focus = Focus::Menu((i + 1).min(MENU.len() - 1)),
                Key::Down => {
                    if let Some(focus) = self.first_content_focus() {
                        self.focus = focus;
                    }
                }
                Key::Enter => {
                    self.open(Screen::from_menu(i));
                    return true;
                }
                _ => {}
            },
            Focus::Featured(i) => match key {
                Key::Left => self.focus = Focus::Featured(i.saturating_sub(1)),
                Key::Right => self.focus = Focus::Featured((i + 1).min(FEATURED.len() - 1)),
                Key::Up => self.focus = Focus::Menu(MENU_HOME),
                Key::Down if self.live_count() > 0 => {
                    self.focus = Focus::Favorite {
                        index: i.min(self.live_count() - 1),
                        on_delete: false,
                    };
                }
                _ => {}
            },
            Focus::Favorite { index, on_delete } => self.press_favorite(key, index, on_delete),
            Focus::Tile(i) => match grid_move(i, self.catalog.len(), APP_COLUMNS, key) {
                GridMove::To(next) => self.focus = Focus::Tile(next),
                GridMove::ExitUp => self.focus = Focus::Menu(MENU_APPS),
                GridMove::Stay if key == Key::Enter => {
                    self.return_tile = i;
                    self.open(Screen::Details {
                        app: i,
                        picking: false,
                    });
                    return true;
                }
                GridMove::Stay => {}
            },
            Focus::Genre(i) => match grid_move(i, self.genres.len(), GENRE_COLUMNS, key) {
                GridMove::To(next) => self.focus = Focus::Genre(next),
                GridMove::ExitUp => self.focus = Focus::Menu(MENU_SEARCH),
                GridMove::Stay if key == Key::Enter => {
                    let genre = self.genres[i].clone();
                    if let Screen::Search { query } = &mut self.screen {
                        *query = Some(genre);
                    }
                }
                GridMove::Stay => {}
            },
            Focus::Channel(i) => match grid_move(i, self.channels.len(), CHANNEL_COLUMNS, key) {
                GridMove::To(next) => self.focus = Focus::Channel(next),
                GridMove::ExitUp => self.focus = Focus::Menu(MENU_CHANNELS),
                GridMove::Stay => {}
            },
            Focus::Button(b) => return self.press_details(key, b),
            Focus::Nothing => {}
        }
        false
    }

    fn press_favorite(&mut self, key: Key, index: usize, on_delete: bool) {
        let live = self.live_count();
        let at = |index: usize| Focus::Favorite {
            index,
            on_delete: false,
        };
        match key {
            Key::Left => self.focus = at(index.saturating_sub(1)),
            Key::Right => self.focus = at((index + 1).min(live.saturating_sub(1))),
            Key::Up if on_delete => self.focus = at(index),
            Key::Up => self.focus = Focus::Featured(0),
            Key::Down if !on_delete && self.delete_mode => {
                let deletable = self
                    .live_favorites()
                    .get(index)
                    .is_some_and(|app| self.is_deletable(app));
                if deletable {
                    self.focus = Focus::Favorite {
                        index,
                        on_delete: true,
                    };
                }
            }
            Key::Enter if on_delete => {
                self.delete_live(index);
                let live = self.live_count();
                self.focus = if live == 0 {
                    Focus::Featured(0)
                } else {
                    at(index.min(live - 1))
                };
            }
            Key::Escape | Key::Backspace => {
                self.delete_mode = false;
                self.focus = at(index);
            }
            _ => {}
        }
    }

    fn press_details(&mut self, key: Key, button: usize) -> bool {
        let Screen::Details { app, picking } = self.screen.clone() else {
            return false;
        };
        match key {
            Key::Left => self.focus = Focus::Button(button.saturating_sub(1)),
            Key::Right => self.focus = Focus::Button((button + 1).min(DETAILS_BUTTONS.len() - 1)),
            Key::Enter if picking => {
                let chosen = self.catalog[app].clone();
                if !self.is_favorite(&chosen) {
                    self.favorites.push(Favorite {
                        app: chosen,
                        ghost: false,
                    });
                }
                self.set_picking(false);
            }
            Key::Enter if button == FAVORITE_BUTTON && !self.is_favorite(&self.catalog[app]) => {
                self.set_picking(true);
            }
            Key::Escape | Key::Backspace if picking => self.set_picking(false),
            Key::Escape | Key::Backspace => {
                let tile = self.return_tile;
                self.open(Screen::Apps);
                self.focus = Focus::Tile(tile);
                return true;
            }
            _ => {}
        }
        false
    }

    fn set_picking(&mut self, value: bool) {
        if let Screen::Details { picking, .. } = &mut self.screen {
            *picking = value;
        }
    }

    fn delete_live(&mut self, index: usize) {
        if self.sticky_favorites {
            return;
        }
        let slot = self
            .favorites
            .iter()
            .enumerate()
            .filter(|(_, f)| !f.ghost)
            .nth(index)
            .map(|(slot, _)| slot);
        if let Some(slot) = slot {
            if self.is_deletable(&self.favorites[slot].app) {
                self.favorites[slot].ghost = true;
            }
        }
    }

    /// A held Enter on the favorites row
    pub fn long_press(&mut self) {
        if self.screen != Screen::Home {
            return;
        }
        self.delete_mode = true;
        if !matches!(self.focus, Focus::Favorite { .. }) && self.live_count() > 0 {
            self.focus = Focus::Favorite {
                index: 0,
                on_delete: false,
            };
        }
    }

    /// Focus `target` and press Enter on it
    pub fn activate(&mut self, target: Focus) -> bool {
        self.focus = target;
        self.press(Key::Enter)
    }

    // =========================================================================
    // RENDERING
    // =========================================================================

    pub fn render(&self, loading: bool) -> Rendered {
        let mut out = Rendered {
            dom: Dom::new(),
            active: None,
            targets: Vec::new(),
        };
        if loading {
            let _ = out.dom.append(
                Dom::BODY,
                El::new("div")
                    .class("loading")
                    .class("spinner")
                    .attr("data-loading", "true"),
            );
            return out;
        }
        if self.screen.menu_index().is_some() {
            self.render_menu(&mut out);
        }
        match &self.screen {
            Screen::Home => self.render_home(&mut out),
            Screen::Apps => self.render_apps(&mut out),
            Screen::Details { app, picking } => self.render_details(&mut out, *app, *picking),
            Screen::Search { query } => self.render_search(&mut out, query.as_deref()),
            Screen::Channels => self.render_channels(&mut out),
            Screen::TvGuide => {
                let _ = out.dom.append(
                    Dom::BODY,
                    El::new("main").test_id("tv-guide").text("Programme guide"),
                );
            }
            Screen::NotFound(_) => {
                let _ = out.dom.append(
                    Dom::BODY,
                    El::new("main").test_id("not-found").text("Page not found"),
                );
            }
        }
        out
    }

    fn focusable(&self, out: &mut Rendered, parent: usize, el: El, focus: Focus) -> usize {
        let index = out.dom.append(parent, el);
        out.targets.push((index, focus));
        if self.focus == focus {
            out.active = Some(index);
        }
        index
    }

    fn render_menu(&self, out: &mut Rendered) {
        let nav = out.dom.append(
            Dom::BODY,
            El::new("nav")
                .test_id("main-menu")
                .class("_mainMenu_3kd8a_1"),
        );
        for (i, label) in MENU.iter().enumerate() {
            let focus = Focus::Menu(i);
            let el = El::new("a")
                .class("_menuItem_3kd8a_9")
                .class_if(self.focus == focus, "focused")
                .test_id(&format!("main-menu-item-{i}"))
                .attr("aria-label", label)
                .text(label);
            let _ = self.focusable(out, nav, el, focus);
        }
    }

    fn render_home(&self, out: &mut Rendered) {
        let main = out
            .dom
            .append(Dom::BODY, El::new("main").test_id("home-page"));
        let featured = out
            .dom
            .append(main, El::new("section").test_id("featured-row"));
        for (i, title) in FEATURED.iter().enumerate() {
            let focus = Focus::Featured(i);
            let el = El::new("div")
                .class("_featuredItem_8xk2p_4")
                .test_id(&format!("featured-{i}"))
                .attr("data-is-focused", flag(self.focus == focus))
                .text(title);
            let _ = self.focusable(out, featured, el, focus);
        }

        let user_apps = out
            .dom
            .append(main, El::new("section").test_id("user-apps"));
        let row = out.dom.append(
            user_apps,
            El::new("div")
                .id("favourite-apps")
                .class("_favAppsList_tcq1v_712"),
        );
        let mut live = 0;
        for favorite in &self.favorites {
            let app = &favorite.app;
            let item = El::new("div").class("_favAppItem_10v6y_173").test_id(&app.id);
            let title = El::new("span").class("_itemTitle_10v6y_138").text(&app.name);
            if favorite.ghost {
                let ghost = out
                    .dom
                    .append(row, item.attr("data-focused", "false").opacity(0.0));
                let _ = out.dom.append(ghost, title);
                continue;
            }
            let item_focus = Focus::Favorite {
                index: live,
                on_delete: false,
            };
            let button_focus = Focus::Favorite {
                index: live,
                on_delete: true,
            };
            let node = self.focusable(
                out,
                row,
                item.attr("data-focused", flag(self.focus == item_focus)),
                item_focus,
            );
            let _ = out.dom.append(node, title);
            if self.delete_mode && self.is_deletable(app) {
                let button = El::new("button")
                    .test_id("editmode-remove-app")
                    .class("delete-button")
                    .attr("aria-label", &format!("Remove {}", app.name))
                    .attr("data-focused", flag(self.focus == button_focus));
                let _ = self.focusable(out, node, button, button_focus);
            }
            live += 1;
        }
        let _ = out.dom.append(
            main,
            El::new("div")
                .class("_overlay_15ypj_1")
                .class("edit-overlay")
                .hidden_if(!self.delete_mode),
        );
    }

    fn render_apps(&self, out: &mut Rendered) {
        let main = out
            .dom
            .append(Dom::BODY, El::new("main").test_id("apps-page"));
        if let Some(first) = self.catalog.first() {
            let _ = out.dom.append(
                main,
                El::new("div")
                    .test_id("hero-banner")
                    .class("banner")
                    .text(&format!("Featured: {}", first.name)),
            );
        }
        let container = out
            .dom
            .append(main, El::new("div").test_id("lists-container"));
        for (i, app) in self.catalog.iter().enumerate() {
            let focus = Focus::Tile(i);
            let marker = if self.focus == focus { "focused" } else { "na" };
            let el = El::new("div")
                .class("_listItem_10v6y_73")
                .test_id(&app.id)
                .attr("data-focused", marker);
            let tile = self.focusable(out, container, el, focus);
            let _ = out.dom.append(
                tile,
                El::new("span")
                    .class("_itemTitle_10v6y_138")
                    .text(&app.name),
            );
        }
    }

    fn render_details(&self, out: &mut Rendered, app: usize, picking: bool) {
        let app = &self.catalog[app];
        let main = out.dom.append(
            Dom::BODY,
            El::new("main").id("app-details").test_id("app-details"),
        );
        let _ = out
            .dom
            .append(main, El::new("h1").class("app-title").text(&app.name));
        let favorite_label = if self.is_favorite(app) {
            "In Favourites"
        } else {
            "Add to Favourites"
        };
        for (i, id) in DETAILS_BUTTONS.iter().enumerate() {
            let label = match i {
                0 => "Open",
                FAVORITE_BUTTON => favorite_label,
                _ => "More Info",
            };
            let _ = self.focusable(
                out,
                main,
                El::new("button").id(id).text(label),
                Focus::Button(i),
            );
        }
        if picking {
            let _ = out.dom.append(
                main,
                El::new("div")
                    .test_id("position-picker")
                    .class("modal")
                    .text("Choose a position"),
            );
        }
    }

    fn render_search(&self, out: &mut Rendered, query: Option<&str>) {
        let main = out
            .dom
            .append(Dom::BODY, El::new("main").test_id("search-page"));
        let _ = out.dom.append(
            main,
            El::new("input")
                .test_id("search-input")
                .attr("value", query.unwrap_or("")),
        );
        let grid = out.dom.append(
            main,
            El::new("div").id("search-genres").attr("role", "list"),
        );
        for (i, genre) in self.genres.iter().enumerate() {
            let focus = Focus::Genre(i);
            let el = El::new("div")
                .attr("role", "listitem")
                .test_id(&format!("genre-{}", slug(genre)))
                .attr("data-focused", flag(self.focus == focus))
                .text(genre);
            let _ = self.focusable(out, grid, el, focus);
        }
        if let Some(query) = query {
            let _ = out.dom.append(
                main,
                El::new("div")
                    .test_id("search-results")
                    .text(&format!("Results for {query}")),
            );
        }
    }

    fn render_channels(&self, out: &mut Rendered) {
        let main = out
            .dom
            .append(Dom::BODY, El::new("main").test_id("channels-page"));
        let grid = out.dom.append(
            main,
            El::new("div")
                .test_id("channel-grid")
                .class("channel-grid"),
        );
        for (i, name) in self.channels.iter().enumerate() {
            let focus = Focus::Channel(i);
            let el = El::new("div")
                .class("channel-item")
                .class_if(self.focus == focus, "focused")
                .test_id(&format!("channel-item-{i}"))
                .text(name);
            let _ = self.focusable(out, grid, el, focus);
        }
    }
}

const fn flag(value: bool) -> &'static str {
    if value {
        "true"
    } else {
        "false"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn model() -> TvModel {
        TvModel::new("http://tv.test".to_string())
    }

    mod navigation_tests {
        use super::*;

        #[test]
        fn test_slug() {
            assert_eq!(slug("Disney+"), "disney-plus");
            assert_eq!(slug("Watch TV"), "watch-tv");
            assert_eq!(slug("Sci-Fi"), "sci-fi");
        }

        #[test]
        fn test_menu_enter_opens_screen() {
            let mut tv = model();
            assert!(!tv.press(Key::Up));
            assert!(!tv.press(Key::Up));
            assert_eq!(tv.focus, Focus::Menu(MENU_HOME));
            assert!(!tv.press(Key::Right));
            assert!(!tv.press(Key::Right));
            assert!(!tv.press(Key::Right));
            assert!(!tv.press(Key::Right));
            assert_eq!(tv.focus, Focus::Menu(MENU_APPS));
            assert!(tv.press(Key::Enter));
            assert_eq!(tv.screen, Screen::Apps);
            assert_eq!(tv.url(), "http://tv.test/page/499");
        }

        #[test]
        fn test_apps_grid_does_not_wrap() {
            let mut tv = model();
            tv.goto(&Url::parse("http://tv.test/page/499").unwrap());
            let _ = tv.press(Key::Down);
            assert_eq!(tv.focus, Focus::Tile(0));
            for _ in 0..10 {
                let _ = tv.press(Key::Right);
            }
            assert_eq!(tv.focus, Focus::Tile(APP_COLUMNS - 1));
            let _ = tv.press(Key::Down);
            assert_eq!(tv.focus, Focus::Tile(2 * APP_COLUMNS - 1));
            let _ = tv.press(Key::Down);
            assert_eq!(tv.focus, Focus::Tile(13));
        }

        #[test]
        fn test_genre_enter_sets_query() {
            let mut tv = model();
            tv.goto(&Url::parse("http://tv.test/search").unwrap());
            let _ = tv.press(Key::Down);
            let _ = tv.press(Key::Right);
            let _ = tv.press(Key::Enter);
            assert_eq!(tv.url(), "http://tv.test/search?q=Comedy");
        }

        #[test]
        fn test_goto_reads_query_and_unknown_paths() {
            let mut tv = model();
            tv.goto(&Url::parse("http://tv.test/search?q=Sci-Fi").unwrap());
            assert_eq!(
                tv.screen,
                Screen::Search {
                    query: Some("Sci-Fi".into())
                }
            );
            tv.goto(&Url::parse("http://tv.test/nowhere").unwrap());
            assert_eq!(tv.screen, Screen::NotFound("/nowhere".into()));
        }
    }

    mod favorites_tests {
        use super::*;

        #[test]
        fn test_add_via_details_requires_confirmation() {
            let mut tv = model();
            tv.goto(&Url::parse("http://tv.test/page/499").unwrap());
            let _ = tv.press(Key::Down);
            let _ = tv.press(Key::Right);
            let _ = tv.press(Key::Right);
            assert!(tv.press(Key::Enter));
            let _ = tv.press(Key::Right);
            let _ = tv.press(Key::Enter);
            assert_eq!(tv.live_count(), 4);
            let _ = tv.press(Key::Enter);
            assert_eq!(tv.live_count(), 5);
            assert!(tv.press(Key::Backspace));
            assert_eq!(tv.focus, Focus::Tile(2));
        }

        #[test]
        fn test_delete_leaves_ghost_until_screen_change() {
            let mut tv = model();
            tv.long_press();
            let _ = tv.press(Key::Right);
            let _ = tv.press(Key::Down);
            let _ = tv.press(Key::Enter);
            assert_eq!(tv.live_count(), 3);
            assert_eq!(tv.favorites.len(), 4);
            tv.open(Screen::Home);
            assert_eq!(tv.favorites.len(), 3);
        }

        #[test]
        fn test_protected_app_has_no_delete_button() {
            let mut tv = model();
            tv.long_press();
            let _ = tv.press(Key::Down);
            assert_eq!(
                tv.focus,
                Focus::Favorite {
                    index: 0,
                    on_delete: false
                }
            );
            let _ = tv.press(Key::Enter);
            assert_eq!(tv.live_count(), 4);
        }

        #[test]
        fn test_render_marks_exactly_one_focus() {
            let tv = model();
            let rendered = tv.render(false);
            let focused = rendered
                .dom
                .all()
                .into_iter()
                .filter(|&i| {
                    let node = rendered.dom.node(i);
                    matches!(node.attr("data-focused"), Some("true" | "focused"))
                        || node.attr("data-is-focused") == Some("true")
                        || node.classes().any(|c| c == "focused")
                })
                .count();
            assert_eq!(focused, 1);
            assert!(rendered.active.is_some());
        }
    }
}
