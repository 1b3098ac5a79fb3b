use lazy_static::lazy_static;
use reqwest::Client;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, info};

use crate::{
    aggregator::fan_out,
    env::ScraperConfig,
    error::SameRustError,
    handle_error,
    model::{
        HomeInfo, LatestEpisode, LatestPage, MovieProject, ScheduleEntry, ScheduleResult,
        TopTenAnime, Weekday, NOT_AVAILABLE,
    },
    utils::{attr_or_na, element_text, get_curl, get_json, last_number, text_or_na},
};

lazy_static! {
    static ref PAGINATION_SELECTOR: Selector =
        Selector::parse("div.pagination > span:first-child").unwrap();
    static ref LATEST_ITEM_SELECTOR: Selector = Selector::parse("div.post-show li").unwrap();
    static ref LATEST_TITLE_SELECTOR: Selector = Selector::parse("h2.entry-title a").unwrap();
    static ref LATEST_COVER_SELECTOR: Selector = Selector::parse("img.npws").unwrap();
    static ref LATEST_INFO_SELECTOR: Selector = Selector::parse("div.dtla > span").unwrap();
    static ref AUTHOR_SELECTOR: Selector = Selector::parse("author").unwrap();
    static ref TOP_10_ITEM_SELECTOR: Selector = Selector::parse(".topten-animesu ul li").unwrap();
    static ref TOP_10_LINK_SELECTOR: Selector = Selector::parse("a.series").unwrap();
    static ref TOP_10_TITLE_SELECTOR: Selector = Selector::parse(".judul").unwrap();
    static ref TOP_10_RANK_SELECTOR: Selector = Selector::parse(".is-topten > b:last-child").unwrap();
    static ref TOP_10_SCORE_SELECTOR: Selector = Selector::parse(".rating").unwrap();
    static ref WIDGETS_SELECTOR: Selector = Selector::parse("div.widgets").unwrap();
    static ref WIDGET_HEADING_SELECTOR: Selector = Selector::parse("h3").unwrap();
    static ref SIDEBAR_SERIES_SELECTOR: Selector = Selector::parse("#sidebar .widgetseries").unwrap();
    static ref SERIES_ITEM_SELECTOR: Selector = Selector::parse(".widgetseries ul > li").unwrap();
    static ref SERIES_ITEM_IN_WIDGET_SELECTOR: Selector = Selector::parse("ul > li").unwrap();
    static ref MOVIE_TITLE_SELECTOR: Selector = Selector::parse("h2 a").unwrap();
    static ref SPAN_SELECTOR: Selector = Selector::parse("span").unwrap();
    static ref ANCHOR_SELECTOR: Selector = Selector::parse("a").unwrap();
    static ref IMG_SELECTOR: Selector = Selector::parse("img").unwrap();
}

const MOVIE_WIDGET_HEADING: &str = "Project Movie";
const RELEASED_ON_PREFIX: &str = "Released on:";

/// Scraper for one Samehadaku mirror.
///
/// Cloning is cheap: the HTTP client is reference counted, so every worker in
/// a batch shares the same connection pool and default headers.
#[derive(Debug, Clone)]
pub struct SamehadakuRust {
    config: ScraperConfig,
    client: Client,
}

impl SamehadakuRust {
    pub fn new(config: ScraperConfig) -> Result<Self, SameRustError> {
        let client = config.build_client()?;
        Ok(SamehadakuRust { config, client })
    }

    /// Builds a scraper from `.env` / process environment settings.
    pub fn from_env() -> Result<Self, SameRustError> {
        SamehadakuRust::new(ScraperConfig::from_env())
    }

    pub fn config(&self) -> &ScraperConfig {
        &self.config
    }

    pub fn schedule_url(&self, day: Weekday) -> String {
        format!(
            "{}/wp-json/custom/v1/all-schedule?perpage={}&day={}",
            self.config.base_url,
            self.config.schedule_per_page,
            day.as_query()
        )
    }

    pub fn latest_page_url(&self, page: u32) -> String {
        if page <= 1 {
            format!("{}/anime-terbaru/", self.config.base_url)
        } else {
            format!("{}/anime-terbaru/page/{}/", self.config.base_url, page)
        }
    }

    pub fn home_url(&self) -> String {
        format!("{}/", self.config.base_url)
    }

    /// Fetches one day of the release schedule.
    ///
    /// Any failure is logged and reported, and the day comes back empty.
    pub async fn fetch_schedule_for_day(&self, day: Weekday) -> (Weekday, Vec<ScheduleEntry>) {
        let url = self.schedule_url(day);

        let entries = match handle_error!(
            get_json(&self.client, &url, self.config.max_attempts).await,
            &self.config
        ) {
            Ok(payload) => ScheduleEntry::from_payload(&payload),
            Err(_) => {
                debug!(day = day.name(), "schedule unavailable, returning empty day");
                Vec::new()
            }
        };

        debug!(day = day.name(), entries = entries.len(), "schedule fetched");
        (day, entries)
    }

    /// Full week, Monday through Sunday, fetched concurrently.
    pub async fn scrape_schedule(&self) -> ScheduleResult {
        self.scrape_schedule_for(&Weekday::ALL).await
    }

    /// Schedule for the given days, keyed in the order they were asked for.
    pub async fn scrape_schedule_for(&self, days: &[Weekday]) -> ScheduleResult {
        let this = self.clone();
        let days = fan_out(days.to_vec(), self.config.max_workers, move |day| {
            let this = this.clone();
            async move { this.fetch_schedule_for_day(day).await }
        })
        .await;

        let filled = days.iter().filter(|(_, entries)| !entries.is_empty()).count();
        info!(days = days.len(), filled, "schedule batch complete");

        ScheduleResult::from(days)
    }

    /// Number of pages in the latest-episode listing, `1` when unknown.
    pub async fn get_max_page(&self) -> u32 {
        let url = self.latest_page_url(1);

        match handle_error!(
            get_curl(&self.client, &url, self.config.max_attempts).await,
            &self.config
        ) {
            Ok(curl) => extract_max_page(&Html::parse_document(&curl)),
            Err(_) => 1,
        }
    }

    /// One page of the latest-episode listing, empty on failure.
    pub async fn scrape_latest_page(&self, page: u32) -> Vec<LatestEpisode> {
        let url = self.latest_page_url(page);

        match handle_error!(
            get_curl(&self.client, &url, self.config.max_attempts).await,
            &self.config
        ) {
            Ok(curl) => extract_latest_episodes(&Html::parse_document(&curl)),
            Err(_) => {
                debug!(page, "listing page unavailable, returning empty page");
                Vec::new()
            }
        }
    }

    /// Several listing pages fetched concurrently, returned in input order.
    pub async fn scrape_latest_pages(&self, pages: &[u32]) -> Vec<LatestPage> {
        let this = self.clone();
        let pages = fan_out(pages.to_vec(), self.config.max_workers, move |page| {
            let this = this.clone();
            async move { (page, this.scrape_latest_page(page).await) }
        })
        .await;

        info!(pages = pages.len(), "listing batch complete");

        pages
            .into_iter()
            .map(|(page, episodes)| LatestPage { page, episodes })
            .collect()
    }

    /// Probes the page count, then fetches pages `1..=min(count, limit)`.
    pub async fn scrape_latest_pages_up_to(&self, limit: u32) -> Vec<LatestPage> {
        let last = self.get_max_page().await.min(limit);
        let pages: Vec<u32> = (1..=last).collect();
        self.scrape_latest_pages(&pages).await
    }

    pub async fn scrape_home(&self) -> Result<HomeInfo, SameRustError> {
        let url = self.home_url();
        let curl = handle_error!(
            get_curl(&self.client, &url, self.config.max_attempts).await,
            &self.config
        )?;

        let document = Html::parse_document(&curl);

        Ok(HomeInfo {
            top_10: extract_top_10(&document),
            latest_episodes: extract_latest_episodes(&document),
            movie_projects: extract_movie_projects(&document),
        })
    }

    pub async fn scrape_top_10(&self) -> Vec<TopTenAnime> {
        self.scrape_home()
            .await
            .map(|home| home.top_10)
            .unwrap_or_default()
    }

    pub async fn scrape_movie_projects(&self) -> Vec<MovieProject> {
        self.scrape_home()
            .await
            .map(|home| home.movie_projects)
            .unwrap_or_default()
    }
}

fn extract_max_page(document: &Html) -> u32 {
    document
        .select(&PAGINATION_SELECTOR)
        .next()
        .map(element_text)
        .and_then(|text| last_number(&text))
        .filter(|pages| *pages > 0)
        .unwrap_or(1)
}

fn extract_latest_episodes(document: &Html) -> Vec<LatestEpisode> {
    document
        .select(&LATEST_ITEM_SELECTOR)
        .map(|element| {
            let title_tag = element.select(&LATEST_TITLE_SELECTOR).next();
            let spans: Vec<ElementRef> = element.select(&LATEST_INFO_SELECTOR).collect();

            let author_in = |idx: usize| {
                text_or_na(
                    spans
                        .get(idx)
                        .and_then(|span| span.select(&AUTHOR_SELECTOR).next()),
                )
            };

            let release_time = spans
                .get(2)
                .map(|span| {
                    span.text()
                        .collect::<String>()
                        .replace(RELEASED_ON_PREFIX, "")
                        .trim()
                        .to_string()
                })
                .unwrap_or_else(|| NOT_AVAILABLE.to_string());

            LatestEpisode {
                title: text_or_na(title_tag),
                episode: author_in(0),
                uploader: author_in(1),
                release_time,
                url: attr_or_na(title_tag, "href"),
                cover_url: attr_or_na(element.select(&LATEST_COVER_SELECTOR).next(), "src"),
            }
        })
        .collect()
}

fn extract_top_10(document: &Html) -> Vec<TopTenAnime> {
    let mut top_10: Vec<TopTenAnime> = document
        .select(&TOP_10_ITEM_SELECTOR)
        .filter_map(|element| {
            let link = element.select(&TOP_10_LINK_SELECTOR).next()?;

            let rank = link
                .select(&TOP_10_RANK_SELECTOR)
                .next()
                .map(element_text)
                .and_then(|rank| rank.parse::<u32>().ok());

            Some(TopTenAnime {
                rank,
                title: text_or_na(link.select(&TOP_10_TITLE_SELECTOR).next()),
                score: text_or_na(link.select(&TOP_10_SCORE_SELECTOR).next()),
                url: attr_or_na(Some(link), "href"),
                cover_url: attr_or_na(link.select(&IMG_SELECTOR).next(), "src"),
            })
        })
        .collect();

    // Stable: unranked entries keep their page order after the ranked ones.
    top_10.sort_by_key(|anime| anime.rank.unwrap_or(u32::MAX));
    top_10
}

fn find_movie_widget(document: &Html) -> Option<ElementRef<'_>> {
    document
        .select(&WIDGETS_SELECTOR)
        .find(|widget| {
            widget
                .select(&WIDGET_HEADING_SELECTOR)
                .next()
                .map(|h3| element_text(h3).contains(MOVIE_WIDGET_HEADING))
                .unwrap_or(false)
        })
        .or_else(|| document.select(&SIDEBAR_SERIES_SELECTOR).next())
}

fn extract_movie_projects(document: &Html) -> Vec<MovieProject> {
    let Some(widget) = find_movie_widget(document) else {
        return Vec::new();
    };

    let in_widget_series = widget.select(&SERIES_ITEM_SELECTOR).next().is_some();
    let items: Vec<ElementRef> = if in_widget_series {
        widget.select(&SERIES_ITEM_SELECTOR).collect()
    } else {
        widget.select(&SERIES_ITEM_IN_WIDGET_SELECTOR).collect()
    };

    items
        .into_iter()
        .map(|element| {
            let title_tag = element.select(&MOVIE_TITLE_SELECTOR).next();
            let spans: Vec<ElementRef> = element.select(&SPAN_SELECTOR).collect();

            let genres: Vec<String> = spans
                .first()
                .map(|span| span.select(&ANCHOR_SELECTOR).map(element_text).collect())
                .unwrap_or_default();

            MovieProject {
                title: text_or_na(title_tag),
                url: attr_or_na(title_tag, "href"),
                release_date: text_or_na(spans.last().copied()),
                genres,
                cover_url: attr_or_na(element.select(&IMG_SELECTOR).next(), "src"),
            }
        })
        .collect()
}
