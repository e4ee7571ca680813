//! Website → React project conversion.
//!
//! Renders a page in headless Chrome, partitions it into header / main /
//! footer regions, rewrites the markup into JSX, and emits a scaffolded
//! React project next to a reference screenshot and the site's CSS.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig, HeadlessMode};
use chromiumoxide::cdp::browser_protocol::page::CaptureScreenshotFormat;
use chromiumoxide::page::ScreenshotParams;
use futures::StreamExt;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use serde::Deserialize;
use serde_json::Value;
use url::Url;

use super::scaffold::{render_index_html, render_package_json, vite_config};
use super::Tool;

pub(super) fn tools() -> Vec<Arc<dyn Tool>> {
    vec![Arc::new(ScrapeWebsite)]
}

/// Upper bound on downloaded images per scrape.
const MAX_ASSETS: usize = 10;

const HEADER_SELECTORS: &str = "header, nav, .header, .navbar";
const MAIN_SELECTORS: &str = "main, .main, .content, #content";
const FOOTER_SELECTORS: &str = "footer, .footer";

const SCRAPED_MAIN_JSX: &str = r#"import React from 'react';
import ReactDOM from 'react-dom/client';
import App from './App';

ReactDOM.createRoot(document.getElementById('root')).render(
  <React.StrictMode>
    <App />
  </React.StrictMode>
);
"#;

const SCRAPED_APP_JSX: &str = r#"import React from 'react';
import Header from './components/Header';
import Main from './components/Main';
import Footer from './components/Footer';
import './App.css';

function App() {
  return (
    <div className="App">
      <Header />
      <Main />
      <Footer />
    </div>
  );
}

export default App;
"#;

/// Clone a website into a React project directory.
pub struct ScrapeWebsite;

#[derive(Deserialize)]
struct ScrapeWebsiteArgs {
    url: String,
    #[serde(default)]
    project_name: Option<String>,
    #[serde(default = "default_include_assets")]
    include_assets: bool,
}

fn default_include_assets() -> bool {
    true
}

#[async_trait]
impl Tool for ScrapeWebsite {
    fn name(&self) -> &str {
        "scrape_website"
    }

    fn description(&self) -> &str {
        "Clone a website: render it in a headless browser, convert its header/main/footer into React components, download its CSS and images, and emit a ready-to-run project. Input: { url, project_name?, include_assets? }."
    }

    async fn execute(&self, args: Value, workspace: &Path) -> anyhow::Result<String> {
        let args: ScrapeWebsiteArgs =
            serde_json::from_value(args).map_err(|e| anyhow::anyhow!("invalid arguments for scrape_website: {}", e))?;

        let page_url = Url::parse(&args.url)
            .with_context(|| format!("invalid URL: {}", args.url))?;
        if page_url.scheme() != "http" && page_url.scheme() != "https" {
            anyhow::bail!("unsupported URL scheme: {}", page_url.scheme());
        }

        tracing::info!(url = %page_url, "scraping website");
        let rendered = render_page(page_url.as_str()).await?;

        let project_name = args
            .project_name
            .filter(|name| !name.trim().is_empty())
            .unwrap_or_else(|| default_project_name(&page_url));
        let project_dir = workspace.join(&project_name);

        let components_dir = project_dir.join("src/components");
        let assets_dir = project_dir.join("src/assets");
        tokio::fs::create_dir_all(&components_dir).await?;
        tokio::fs::create_dir_all(&assets_dir).await?;
        tokio::fs::create_dir_all(project_dir.join("public")).await?;

        tokio::fs::write(
            project_dir.join("reference-screenshot.png"),
            &rendered.screenshot,
        )
        .await
        .context("failed to save reference screenshot")?;

        let http = reqwest::Client::builder()
            .user_agent("Mozilla/5.0 (compatible; CodexAI/1.0)")
            .timeout(Duration::from_secs(30))
            .build()?;

        // Same-origin stylesheets, concatenated into one App.css.
        let css = fetch_stylesheets(&rendered.html, &page_url, &http).await;

        let regions = extract_regions(&rendered.html);
        let components = [
            ("Header.jsx", regions.header),
            ("Main.jsx", regions.main),
            ("Footer.jsx", regions.footer),
        ];
        for (file, region) in components {
            let jsx = region
                .map(|html| to_component(&html, &page_url))
                .unwrap_or_else(placeholder_component);
            tokio::fs::write(components_dir.join(file), jsx).await?;
        }

        tokio::fs::write(project_dir.join("src/App.jsx"), SCRAPED_APP_JSX).await?;
        tokio::fs::write(project_dir.join("src/App.css"), css).await?;
        tokio::fs::write(project_dir.join("src/main.jsx"), SCRAPED_MAIN_JSX).await?;
        tokio::fs::write(
            project_dir.join("package.json"),
            render_package_json(&project_name),
        )
        .await?;
        tokio::fs::write(project_dir.join("vite.config.js"), vite_config()).await?;
        tokio::fs::write(
            project_dir.join("index.html"),
            render_index_html(&project_name),
        )
        .await?;
        tokio::fs::write(
            project_dir.join("README.md"),
            format!(
                "# {}\n\nReact conversion of {}.\n\nThe original page is captured in `reference-screenshot.png`.\n\n```\nnpm install\nnpm run dev\n```\n",
                project_name, page_url
            ),
        )
        .await?;

        let downloaded = if args.include_assets {
            download_assets(&rendered.html, &page_url, &assets_dir, &http).await
        } else {
            0
        };

        Ok(format!(
            "Successfully scraped and converted {} into {}/\n\n\
             Project structure:\n\
             ├── src/\n\
             │   ├── components/\n\
             │   │   ├── Header.jsx\n\
             │   │   ├── Main.jsx\n\
             │   │   └── Footer.jsx\n\
             │   ├── assets/ ({} images)\n\
             │   ├── App.jsx\n\
             │   ├── App.css\n\
             │   └── main.jsx\n\
             ├── package.json\n\
             └── reference-screenshot.png\n\n\
             To run the project:\n\
             cd {}\n\
             npm install\n\
             npm run dev",
            page_url, project_name, downloaded, project_name
        ))
    }
}

struct RenderedPage {
    html: String,
    screenshot: Vec<u8>,
}

/// Render a page in headless Chrome and capture its final markup plus a
/// full-page screenshot.
async fn render_page(url: &str) -> anyhow::Result<RenderedPage> {
    let config = BrowserConfig::builder()
        .no_sandbox()
        .headless_mode(HeadlessMode::True)
        .window_size(1920, 1080)
        .arg("--disable-gpu")
        .build()
        .map_err(|e| anyhow::anyhow!("failed to configure browser: {}", e))?;

    let (mut browser, mut handler) =
        tokio::time::timeout(Duration::from_secs(30), Browser::launch(config))
            .await
            .map_err(|_| anyhow::anyhow!("browser launch timed out after 30 seconds"))?
            .context("failed to launch headless browser (is Chrome/Chromium installed?)")?;

    // chromiumoxide requires the event handler to be polled for the
    // browser connection to make progress.
    let events = tokio::spawn(async move { while handler.next().await.is_some() {} });

    let result = tokio::time::timeout(Duration::from_secs(60), async {
        let page = browser
            .new_page(url)
            .await
            .context("failed to open page")?;

        // Give client-side rendering a moment to settle.
        tokio::time::sleep(Duration::from_secs(2)).await;

        let html = page
            .content()
            .await
            .context("failed to read page content")?;
        let screenshot = page
            .screenshot(
                ScreenshotParams::builder()
                    .format(CaptureScreenshotFormat::Png)
                    .full_page(true)
                    .build(),
            )
            .await
            .context("failed to capture screenshot")?;

        Ok::<_, anyhow::Error>(RenderedPage { html, screenshot })
    })
    .await;

    let _ = browser.close().await;
    events.abort();

    match result {
        Ok(page) => page,
        Err(_) => Err(anyhow::anyhow!("page load timed out after 60 seconds")),
    }
}

fn default_project_name(url: &Url) -> String {
    format!("scraped-{}", url.host_str().unwrap_or("site"))
}

struct PageRegions {
    header: Option<String>,
    main: Option<String>,
    footer: Option<String>,
}

/// Partition a document into header / main / footer markup by selector
/// heuristics, falling back to the body's non-chrome children for main.
fn extract_regions(html: &str) -> PageRegions {
    let doc = Html::parse_document(html);
    let header = select_inner(&doc, HEADER_SELECTORS);
    let main = select_inner(&doc, MAIN_SELECTORS).or_else(|| body_without_chrome(&doc));
    let footer = select_inner(&doc, FOOTER_SELECTORS);
    PageRegions {
        header,
        main,
        footer,
    }
}

fn select_inner(doc: &Html, selectors: &str) -> Option<String> {
    let selector = Selector::parse(selectors).ok()?;
    doc.select(&selector)
        .next()
        .map(|el| el.inner_html())
        .filter(|html| !html.trim().is_empty())
}

/// The body's element children minus header/nav/footer chrome.
fn body_without_chrome(doc: &Html) -> Option<String> {
    let selector = Selector::parse("body").ok()?;
    let body = doc.select(&selector).next()?;
    let chunks: Vec<String> = body
        .children()
        .filter_map(ElementRef::wrap)
        .filter(|el| {
            !matches!(
                el.value().name(),
                "header" | "nav" | "footer" | "script" | "style" | "noscript"
            )
        })
        .map(|el| el.html())
        .collect();
    if chunks.is_empty() {
        None
    } else {
        Some(chunks.join("\n"))
    }
}

/// Convert one extracted region into a React component file.
fn to_component(html: &str, base: &Url) -> String {
    let cleaned = strip_noise(html);
    let absolute = absolutize_urls(&cleaned, base);
    let jsx = html_to_jsx(&absolute);
    let indented = jsx
        .trim()
        .lines()
        .map(|line| format!("      {}", line))
        .collect::<Vec<_>>()
        .join("\n");
    format!(
        "import React from 'react';\n\nexport default function Component() {{\n  return (\n    <div>\n{}\n    </div>\n  );\n}}\n",
        indented
    )
}

fn placeholder_component() -> String {
    "import React from 'react';\n\nexport default function Component() {\n  return <div>Component content here</div>;\n}\n"
        .to_string()
}

/// Drop scripts, embedded frames, and comments from a markup fragment.
fn strip_noise(html: &str) -> String {
    let mut text = html.to_string();
    for pattern in [
        r"(?is)<script\b.*?</script>",
        r"(?is)<noscript\b.*?</noscript>",
        r"(?is)<iframe\b.*?</iframe>",
        r"(?is)<style\b.*?</style>",
        r"(?s)<!--.*?-->",
    ] {
        // The patterns are literals; compilation cannot fail.
        if let Ok(re) = Regex::new(pattern) {
            text = re.replace_all(&text, "").into_owned();
        }
    }
    text
}

/// Rewrite relative `src`/`href` attributes against the page URL.
fn absolutize_urls(html: &str, base: &Url) -> String {
    let Ok(re) = Regex::new(r#"(?i)\b(src|href)\s*=\s*"([^"]*)""#) else {
        return html.to_string();
    };
    re.replace_all(html, |caps: &regex::Captures| {
        let attr = &caps[1];
        let value = &caps[2];
        if value.starts_with("http://")
            || value.starts_with("https://")
            || value.starts_with("//")
            || value.starts_with('#')
            || value.starts_with("data:")
            || value.starts_with("mailto:")
        {
            caps[0].to_string()
        } else {
            match base.join(value) {
                Ok(absolute) => format!("{}=\"{}\"", attr, absolute),
                Err(_) => caps[0].to_string(),
            }
        }
    })
    .into_owned()
}

/// Rewrite an HTML fragment into JSX-compatible markup.
fn html_to_jsx(html: &str) -> String {
    let mut jsx = html
        .replace("class=", "className=")
        .replace("for=", "htmlFor=")
        .replace("<br>", "<br />")
        .replace("<hr>", "<hr />");

    // Self-close img tags that are not already closed.
    if let Ok(img_re) = Regex::new(r"(?is)<img([^>]*?)>") {
        jsx = img_re
            .replace_all(&jsx, |caps: &regex::Captures| {
                let attrs = caps[1].trim_end();
                if attrs.ends_with('/') {
                    caps[0].to_string()
                } else {
                    format!("<img{} />", attrs)
                }
            })
            .into_owned();
    }

    // Inline style strings become JSX style objects.
    if let Ok(style_re) = Regex::new(r#"style="([^"]*)""#) {
        jsx = style_re
            .replace_all(&jsx, |caps: &regex::Captures| {
                format!("style={{{{{}}}}}", style_to_object(&caps[1]))
            })
            .into_owned();
    }

    jsx
}

/// `color: red; font-size: 10px` → `color: 'red', fontSize: '10px'`.
fn style_to_object(style: &str) -> String {
    style
        .split(';')
        .filter_map(|declaration| {
            let mut parts = declaration.splitn(2, ':');
            let key = parts.next()?.trim();
            let value = parts.next()?.trim();
            if key.is_empty() || value.is_empty() {
                return None;
            }
            Some(format!("{}: '{}'", camel_case(key), value))
        })
        .collect::<Vec<_>>()
        .join(", ")
}

fn camel_case(property: &str) -> String {
    let mut out = String::with_capacity(property.len());
    let mut upper_next = false;
    for c in property.chars() {
        if c == '-' {
            upper_next = true;
        } else if upper_next {
            out.extend(c.to_uppercase());
            upper_next = false;
        } else {
            out.push(c);
        }
    }
    out
}

/// Same-origin stylesheet URLs referenced by the document.
fn stylesheet_urls(html: &str, base: &Url) -> Vec<Url> {
    let doc = Html::parse_document(html);
    let Ok(selector) = Selector::parse(r#"link[rel="stylesheet"]"#) else {
        return Vec::new();
    };
    doc.select(&selector)
        .filter_map(|el| el.value().attr("href"))
        .filter_map(|href| base.join(href).ok())
        .filter(|candidate| candidate.host_str() == base.host_str())
        .collect()
}

async fn fetch_stylesheets(html: &str, base: &Url, http: &reqwest::Client) -> String {
    let urls = stylesheet_urls(html, base);
    let mut combined = String::new();
    for url in urls {
        match http.get(url.as_str()).send().await {
            Ok(response) if response.status().is_success() => match response.text().await {
                Ok(css) => {
                    combined.push_str(&format!("/* From: {} */\n{}\n\n", url, css));
                }
                Err(e) => tracing::warn!(url = %url, error = %e, "could not read stylesheet"),
            },
            _ => tracing::warn!(url = %url, "could not fetch stylesheet"),
        }
    }
    if combined.is_empty() {
        combined.push_str("/* No same-origin stylesheets found */\n");
    }
    combined
}

/// Image URLs in the document, absolutized, capped at `MAX_ASSETS`.
fn image_urls(html: &str, base: &Url) -> Vec<Url> {
    let doc = Html::parse_document(html);
    let Ok(selector) = Selector::parse("img[src]") else {
        return Vec::new();
    };
    doc.select(&selector)
        .filter_map(|el| el.value().attr("src"))
        .filter(|src| !src.starts_with("data:"))
        .filter_map(|src| base.join(src).ok())
        .filter(|candidate| candidate.scheme() == "http" || candidate.scheme() == "https")
        .take(MAX_ASSETS)
        .collect()
}

async fn download_assets(
    html: &str,
    base: &Url,
    assets_dir: &Path,
    http: &reqwest::Client,
) -> usize {
    let urls = image_urls(html, base);
    let mut saved = 0;
    for (index, url) in urls.iter().enumerate() {
        let bytes = match http.get(url.as_str()).send().await {
            Ok(response) if response.status().is_success() => match response.bytes().await {
                Ok(bytes) => bytes,
                Err(e) => {
                    tracing::warn!(url = %url, error = %e, "could not read image");
                    continue;
                }
            },
            _ => {
                tracing::warn!(url = %url, "could not download image");
                continue;
            }
        };

        let filename = url
            .path_segments()
            .and_then(|segments| segments.last())
            .filter(|name| !name.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| format!("image-{}.jpg", index));

        if tokio::fs::write(assets_dir.join(&filename), &bytes).await.is_ok() {
            saved += 1;
        }
    }
    saved
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Url {
        Url::parse("https://example.com/blog/post").expect("valid url")
    }

    #[test]
    fn class_and_for_become_jsx_attributes() {
        let jsx = html_to_jsx(r#"<label class="big" for="name">Name</label>"#);
        assert_eq!(jsx, r#"<label className="big" htmlFor="name">Name</label>"#);
    }

    #[test]
    fn void_elements_are_self_closed() {
        let jsx = html_to_jsx(r#"<p>a<br>b<hr></p><img src="x.png">"#);
        assert!(jsx.contains("<br />"));
        assert!(jsx.contains("<hr />"));
        assert!(jsx.contains(r#"<img src="x.png" />"#));
    }

    #[test]
    fn already_closed_imgs_stay_untouched() {
        let jsx = html_to_jsx(r#"<img src="x.png" />"#);
        assert_eq!(jsx, r#"<img src="x.png" />"#);
    }

    #[test]
    fn inline_styles_become_objects() {
        let jsx = html_to_jsx(r#"<div style="color: red; font-size: 10px">x</div>"#);
        assert!(jsx.contains("style={{color: 'red', fontSize: '10px'}}"));
    }

    #[test]
    fn style_values_with_colons_survive() {
        assert_eq!(
            style_to_object("background-image: url(https://a/b.png)"),
            "backgroundImage: 'url(https://a/b.png)'"
        );
    }

    #[test]
    fn noise_is_stripped() {
        let html = "<div><script>alert(1)</script><!-- hidden -->keep</div>";
        let cleaned = strip_noise(html);
        assert!(!cleaned.contains("script"));
        assert!(!cleaned.contains("hidden"));
        assert!(cleaned.contains("keep"));
    }

    #[test]
    fn relative_urls_are_absolutized() {
        let html = r#"<a href="/about">x</a><img src="img/logo.png">"#;
        let out = absolutize_urls(html, &base());
        assert!(out.contains(r#"href="https://example.com/about""#));
        assert!(out.contains(r#"src="https://example.com/blog/img/logo.png""#));
    }

    #[test]
    fn absolute_and_anchor_urls_are_left_alone() {
        let html = r##"<a href="https://other.org/x">x</a><a href="#top">y</a>"##;
        assert_eq!(absolutize_urls(html, &base()), html);
    }

    #[test]
    fn regions_are_extracted_by_selector() {
        let html = r#"<html><body>
            <nav><a href="/">home</a></nav>
            <main><h1>Hello</h1></main>
            <footer><p>bye</p></footer>
        </body></html>"#;
        let regions = extract_regions(html);
        assert!(regions.header.expect("header").contains("home"));
        assert!(regions.main.expect("main").contains("Hello"));
        assert!(regions.footer.expect("footer").contains("bye"));
    }

    #[test]
    fn main_falls_back_to_body_children() {
        let html = r#"<html><body>
            <nav>chrome</nav>
            <section><p>real content</p></section>
            <footer>chrome</footer>
        </body></html>"#;
        let regions = extract_regions(html);
        let main = regions.main.expect("fallback main");
        assert!(main.contains("real content"));
        assert!(!main.contains("chrome"));
    }

    #[test]
    fn image_urls_are_capped_and_absolutized() {
        let imgs: String = (0..20)
            .map(|i| format!(r#"<img src="/i/{}.png">"#, i))
            .collect();
        let urls = image_urls(&format!("<body>{}</body>", imgs), &base());
        assert_eq!(urls.len(), MAX_ASSETS);
        assert_eq!(urls[0].as_str(), "https://example.com/i/0.png");
    }

    #[test]
    fn stylesheets_are_same_origin_only() {
        let html = r#"
            <link rel="stylesheet" href="/main.css">
            <link rel="stylesheet" href="https://cdn.other.com/lib.css">
        "#;
        let urls = stylesheet_urls(html, &base());
        assert_eq!(urls.len(), 1);
        assert_eq!(urls[0].as_str(), "https://example.com/main.css");
    }

    #[test]
    fn default_names_come_from_the_host() {
        assert_eq!(default_project_name(&base()), "scraped-example.com");
    }

    #[test]
    fn empty_regions_get_a_placeholder_component() {
        let component = placeholder_component();
        assert!(component.contains("Component content here"));
    }

    #[test]
    fn components_wrap_converted_markup() {
        let component = to_component(r#"<p class="x">hi</p>"#, &base());
        assert!(component.starts_with("import React"));
        assert!(component.contains(r#"<p className="x">hi</p>"#));
    }
}
