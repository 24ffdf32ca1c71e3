// 页面模板，`{{name}}` 占位符由 render 替换，值需事先转义

use lazy_static::lazy_static;
use regex::{Captures, Regex};

pub const STYLE: &str = r#"
body { font-family: sans-serif; max-width: 960px; margin: 0 auto; padding: 1em; color: #222; }
h1, h2 { color: #3a7d44; }
a { color: #3a7d44; }
.course_listing_table table { width: 100%; border-collapse: collapse; margin-bottom: 1.5em; }
.course_listing_table td { padding: 0.2em 0.5em; vertical-align: top; }
.course_listing_table td:first-child { width: 10em; font-weight: bold; }
.course_video { margin-bottom: 2em; }
footer { margin-top: 3em; font-size: 0.8em; color: #888; }
"#;

pub const MAIN_PAGE: &str = r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="utf-8">
    <title>Workouts</title>
    <style>{{style}}</style>
</head>
<body>
    <h1>Workouts</h1>
    <ul>{{links}}
    </ul>
    <footer>{{generated}}</footer>
</body>
</html>
"#;

pub const CATEGORY_LINK: &str = r#"
        <li><a href="{{href}}/index.html">{{title}} ({{count}} Kurse)</a></li>"#;

pub const LISTING_PAGE: &str = r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="utf-8">
    <title>{{title}}</title>
    <style>{{style}}</style>
</head>
<body>
    <p><a href="../index.html">Zurück</a></p>
    <h1>{{title}}</h1>
    {{body}}
    <footer>{{generated}}</footer>
</body>
</html>
"#;

pub const COURSE_ROW: &str = r#"
    <div class="course_listing_table">
        <table>
            <tr><td>Titel: </td><td><a href="{{href}}/index.html">{{title}}</a></td></tr>
            <tr><td>Beschreibung: </td><td>{{description}}</td></tr>
            <tr><td>Dauer: </td><td>{{duration}}</td></tr>
            <tr><td>Kalorien: </td><td>{{calories}}</td></tr>
            <tr><td>Körperbereich: </td><td>{{body_area}}</td></tr>
            <tr><td>Material: </td><td>{{material}}</td></tr>
        </table>
    </div>"#;

pub const COURSE_PAGE: &str = r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="utf-8">
    <title>{{title}}</title>
    <style>{{style}}</style>
</head>
<body>
    <p><a href="../index.html">Zurück</a></p>
    <h1>{{title}}</h1>
    <p>{{description}}</p>
    <p>Dauer: {{duration}} | Kalorien: {{calories}} | Level: {{level}} | Körperbereich: {{body_area}} | Material: {{material}} | Bonuspunkte: {{bonus_points}}</p>
    {{videos}}
    <footer>{{generated}}</footer>
</body>
</html>
"#;

pub const VIDEO_BLOCK: &str = r#"
    <div class="course_video">
        <video width="100%" controls="controls" onclick="this.paused ? this.play() : this.pause();" preload="metadata">
            <source src="{{file}}" type="video/mp4">
            Your browser does not support the video tag.
        </video>
        <p>{{description}}</p>
    </div>"#;

/// 一次扫描替换全部占位符，插入的值不会再被展开；没有对应值的占位符原样保留
pub fn render(template: &str, values: &[(&str, &str)]) -> String {
    lazy_static! {
        static ref PLACEHOLDER: Regex = Regex::new(r"\{\{(\w+)\}\}").unwrap();
    }

    PLACEHOLDER
        .replace_all(template, |caps: &Captures| {
            values
                .iter()
                .find(|(key, _)| *key == &caps[1])
                .map(|(_, value)| value.to_string())
                .unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}

pub fn escape_html(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
