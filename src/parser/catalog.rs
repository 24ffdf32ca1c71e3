use scraper::{ElementRef, Html};
use tracing::warn;
use url::Url;

use crate::common::models::{CourseListing, WorkoutCategory};

use super::errors::ParseError;
use super::utils::{selector, text_content};

/// 分类页上的难度分区，class 必须完全一致
pub const COURSE_LEVELS: [&str; 3] = ["beginner", "advanced", "expert"];

/// /workouts 页面上的全部分类
pub fn parse_workout_categories(html: &str) -> Result<Vec<WorkoutCategory>, ParseError> {
    let document = Html::parse_document(html);
    let anchors = selector(r#"a[class*="mr-category-item"]"#)?;
    let image = selector("img")?;

    let mut categories = Vec::new();
    for anchor in document.select(&anchors) {
        let href = anchor.value().attr("href").unwrap_or_default();
        let url_title = href.replace("workouts", "").replace('/', "");
        let title = anchor
            .select(&image)
            .next()
            .and_then(|img| img.value().attr("alt"))
            .map(|alt| alt.trim().to_string());

        match title {
            Some(title) if !url_title.is_empty() => {
                categories.push(WorkoutCategory { url_title, title })
            }
            _ => warn!("跳过无法识别的分类链接: {:?}", href),
        }
    }

    Ok(categories)
}

/// 一个分类下按难度分区列出的课程
pub fn parse_workout_courses(html: &str, base: &Url) -> Result<Vec<CourseListing>, ParseError> {
    let document = Html::parse_document(html);
    let cards = selector(".ok-content-col-8-4")?;

    let mut courses = Vec::new();
    for level in COURSE_LEVELS {
        let section_sel = selector(&format!(r#"div[class="{}"]"#, level))?;
        let Some(section) = document.select(&section_sel).next() else {
            warn!("分类页中没有 {} 分区", level);
            continue;
        };

        for card in section.select(&cards) {
            match parse_course_card(card, level, base)? {
                Some(course) => courses.push(course),
                None => warn!("跳过缺少链接的课程卡片 ({})", level),
            }
        }
    }

    Ok(courses)
}

fn parse_course_card(
    card: ElementRef<'_>,
    level: &str,
    base: &Url,
) -> Result<Option<CourseListing>, ParseError> {
    let link = selector("h3 a[href]")?;
    let heading = selector("h3")?;
    let description = selector(".ok-generic-box-middle-text")?;

    let Some(href) = card.select(&link).next().and_then(|a| a.value().attr("href")) else {
        return Ok(None);
    };

    Ok(Some(CourseListing {
        url: base.join(href.trim())?.to_string(),
        title: card.select(&heading).next().map(text_content).unwrap_or_default(),
        description: card
            .select(&description)
            .next()
            .map(text_content)
            .unwrap_or_default(),
        level: level.to_string(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_categories() {
        let html = r#"
            <a class="mr-category-item active" href="/workouts/yoga/"><img alt="Yoga"></a>
            <a class="mr-category-item" href="/workouts/pilates"><img alt=" Pilates "></a>
            <a class="mr-category-item" href="/workouts/broken/"></a>
        "#;
        let categories = parse_workout_categories(html).unwrap();
        assert_eq!(
            categories,
            vec![
                WorkoutCategory { url_title: "yoga".into(), title: "Yoga".into() },
                WorkoutCategory { url_title: "pilates".into(), title: "Pilates".into() },
            ]
        );
    }

    #[test]
    fn parses_courses_per_level() {
        let html = r#"
            <div class="beginner">
              <div class="ok-content-col-8-4">
                <h3><a href="/workouts/yoga/balance-yoga">Balance Yoga</a></h3>
                <div class="ok-generic-box-middle-text"> Ruhig starten </div>
              </div>
              <div class="ok-content-col-8-4"><h3>Ohne Link</h3></div>
            </div>
            <div class="expert">
              <div class="ok-content-col-8-4">
                <h3><a href="https://www.newmoove.com/workouts/yoga/power">Power</a></h3>
              </div>
            </div>
        "#;
        let base = Url::parse("https://www.newmoove.com").unwrap();
        let courses = parse_workout_courses(html, &base).unwrap();

        assert_eq!(courses.len(), 2);
        assert_eq!(courses[0].url, "https://www.newmoove.com/workouts/yoga/balance-yoga");
        assert_eq!(courses[0].title, "Balance Yoga");
        assert_eq!(courses[0].description, "Ruhig starten");
        assert_eq!(courses[0].level, "beginner");
        assert_eq!(courses[1].level, "expert");
        assert_eq!(courses[1].description, "");
    }
}
