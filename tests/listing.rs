use samescraper::{SameRust, SameRustError, SamehadakuRust, ScraperConfig, NOT_AVAILABLE};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn scraper_for(server: &MockServer) -> SamehadakuRust {
    SamehadakuRust::new(ScraperConfig::default().with_base_url(&server.uri())).unwrap()
}

fn listing_html(title: &str, pages: u32) -> String {
    format!(
        r#"<html><body>
        <div class="post-show"><ul>
            <li>
                <img class="npws" src="https://cdn/{title}.jpg">
                <h2 class="entry-title"><a href="https://site/{title}/">{title}</a></h2>
                <div class="dtla">
                    <span>Episode <author>3</author></span>
                    <span>Posted by <author>Uploader</author></span>
                    <span>Released on: 1 day ago</span>
                </div>
            </li>
        </ul></div>
        <div class="pagination"><span>Page 1 of {pages}</span></div>
        </body></html>"#
    )
}

async fn mount_html(server: &MockServer, at: &str, body: String) {
    Mock::given(method("GET"))
        .and(path(at))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(server)
        .await;
}

#[tokio::test]
async fn max_page_is_read_from_pagination() {
    let server = MockServer::start().await;
    mount_html(&server, "/anime-terbaru/", listing_html("first", 649)).await;

    assert_eq!(scraper_for(&server).get_max_page().await, 649);
}

#[tokio::test]
async fn max_page_defaults_to_one_when_listing_fails() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/anime-terbaru/"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    assert_eq!(scraper_for(&server).get_max_page().await, 1);
}

#[tokio::test]
async fn later_pages_use_paged_path() {
    let server = MockServer::start().await;
    mount_html(&server, "/anime-terbaru/page/3/", listing_html("third", 10)).await;

    let episodes = scraper_for(&server).scrape_latest_page(3).await;

    assert_eq!(episodes.len(), 1);
    assert_eq!(episodes[0].title, "third");
    assert_eq!(episodes[0].episode, "3");
    assert_eq!(episodes[0].uploader, "Uploader");
    assert_eq!(episodes[0].release_time, "1 day ago");
    assert_eq!(episodes[0].url, "https://site/third/");
    assert_eq!(episodes[0].cover_url, "https://cdn/third.jpg");
}

#[tokio::test]
async fn missing_page_is_empty() {
    let server = MockServer::start().await;

    assert!(scraper_for(&server).scrape_latest_page(99).await.is_empty());
}

#[tokio::test]
async fn pages_are_capped_and_ordered() {
    let server = MockServer::start().await;
    mount_html(&server, "/anime-terbaru/", listing_html("p1", 649)).await;
    mount_html(&server, "/anime-terbaru/page/2/", listing_html("p2", 649)).await;
    Mock::given(method("GET"))
        .and(path("/anime-terbaru/page/3/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(listing_html("p3", 649)))
        .expect(0)
        .mount(&server)
        .await;

    let pages = scraper_for(&server).scrape_latest_pages_up_to(2).await;

    let numbers: Vec<u32> = pages.iter().map(|p| p.page).collect();
    assert_eq!(numbers, vec![1, 2]);
    assert_eq!(pages[0].episodes[0].title, "p1");
    assert_eq!(pages[1].episodes[0].title, "p2");
}

#[tokio::test]
async fn failed_page_keeps_its_slot() {
    let server = MockServer::start().await;
    mount_html(&server, "/anime-terbaru/", listing_html("p1", 3)).await;
    mount_html(&server, "/anime-terbaru/page/3/", listing_html("p3", 3)).await;

    let pages = scraper_for(&server).scrape_latest_pages(&[3, 2, 1]).await;

    let numbers: Vec<u32> = pages.iter().map(|p| p.page).collect();
    assert_eq!(numbers, vec![3, 2, 1]);
    assert_eq!(pages[0].episodes.len(), 1);
    assert!(pages[1].episodes.is_empty());
    assert_eq!(pages[2].episodes[0].title, "p1");
}

#[tokio::test]
async fn home_sections_are_extracted() {
    let server = MockServer::start().await;
    let body = r#"<html><body>
        <div class="topten-animesu"><ul>
            <li><a class="series" href="/b/"><div class="is-topten"><b>TOP</b><b>2</b></div><span class="judul">B</span></a></li>
            <li><a class="series" href="/a/"><div class="is-topten"><b>TOP</b><b>1</b></div><span class="judul">A</span><span class="rating">9</span></a></li>
        </ul></div>
        <div class="post-show"><ul>
            <li><h2 class="entry-title"><a href="/ep/">Ep</a></h2></li>
        </ul></div>
        <div id="sidebar"><div class="widgets">
            <h3>Project Movie Samehadaku</h3>
            <div class="widgetseries"><ul>
                <li><h2><a class="series" href="/movie/">Movie</a></h2><span><a>Action</a></span><span>2025</span></li>
            </ul></div>
        </div></div>
        </body></html>"#;
    mount_html(&server, "/", body.to_string()).await;

    let scraper = SameRust::with_config(ScraperConfig::default().with_base_url(&server.uri()))
        .unwrap()
        .samehadaku;
    let home = scraper.scrape_home().await.unwrap();

    assert_eq!(home.top_10.len(), 2);
    assert_eq!(home.top_10[0].title, "A");
    assert_eq!(home.top_10[0].score, "9");
    assert_eq!(home.top_10[1].score, NOT_AVAILABLE);
    assert_eq!(home.latest_episodes[0].title, "Ep");
    assert_eq!(home.latest_episodes[0].episode, NOT_AVAILABLE);
    assert_eq!(home.movie_projects[0].genres, vec!["Action".to_string()]);
    assert_eq!(home.movie_projects[0].release_date, "2025");

    assert_eq!(scraper.scrape_top_10().await.len(), 2);
    assert_eq!(scraper.scrape_movie_projects().await.len(), 1);
}

#[tokio::test]
async fn home_failure_is_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;
    let scraper = scraper_for(&server);

    let err = scraper.scrape_home().await.unwrap_err();

    assert!(matches!(err, SameRustError::HttpStatus { status, .. } if status.as_u16() == 503));
    assert!(scraper.scrape_top_10().await.is_empty());
    assert!(scraper.scrape_movie_projects().await.is_empty());
}
