use anyhow::Context;
use clap::Parser;
use colored::Colorize;
use tracing::{debug, error, info};

use newmoove_downloader::auth::{AuthError, AuthManager, Credentials};
use newmoove_downloader::common::client::client::NewMooveClient;
use newmoove_downloader::common::config::SiteConfig;
use newmoove_downloader::common::logger::PrettyLogger;
use newmoove_downloader::pipeline::{Pipeline, RunSummary};
use newmoove_downloader::{log_error, log_step, log_success, log_warning, site};

mod cli;

use cli::{AuthArgs, Cli, Command, HttpArgs};

/// 根据命令行参数创建客户端
fn build_client(http: &HttpArgs) -> anyhow::Result<NewMooveClient> {
    let config = SiteConfig::new(&http.base_url, &http.user_agent, http.timeout, http.concurrency)
        .context("站点配置无效")?;
    debug!("站点配置: {:?}", config);
    Ok(NewMooveClient::new(config)?)
}

/// 处理用户认证
async fn handle_auth(client: &NewMooveClient, args: &AuthArgs) -> anyhow::Result<()> {
    let credentials = match (&args.email, &args.password) {
        (Some(email), Some(password)) => Some(Credentials {
            email: email.clone(),
            password: password.clone(),
        }),
        _ => None,
    };

    let auth_manager = AuthManager::new(client.clone());
    match auth_manager
        .authenticate(credentials.as_ref(), args.cookie_file.as_deref())
        .await
    {
        Ok(()) => Ok(()),
        Err(AuthError::MissingCredentials) => {
            PrettyLogger::warning("未提供登录信息，可能无法下载受限内容");
            Ok(())
        }
        Err(e) => {
            error!("登录失败: {}", e);
            Err(e.into())
        }
    }
}

fn print_summary(summary: &RunSummary) {
    PrettyLogger::completion_summary(vec![
        format!("课程: {}", summary.courses.len()),
        format!("已下载: {} 集", summary.episodes_downloaded()),
        format!("已跳过: {} 集", summary.episodes_skipped()),
        format!("失败: {} 集", summary.episodes_failed()),
        format!("无法获取剧集列表的课程: {}", summary.courses_without_episodes()),
    ]);

    for (name, reason) in &summary.failures {
        log_error!("{}: {}", name, reason);
    }

    let failed = summary.episodes_failed();
    if failed > 0 {
        log_warning!("有 {} 集下载失败，重新运行同一命令会只下载缺失的集", failed);
    } else if summary.failures.is_empty() {
        log_success!("全部课程已下载");
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 解析命令行参数
    let args = Cli::parse();

    // 初始化日志
    let level = if args.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt().with_max_level(level).init();

    match args.command {
        Command::GenerateHtml { root } => {
            log_step!("生成离线页面: {}", root.display());
            let report = site::generate_html(&root)
                .await
                .with_context(|| format!("无法生成 {} 下的页面", root.display()))?;
            PrettyLogger::success(format!(
                "已生成 {} 个分类、{} 门课程的页面",
                report.categories, report.courses
            ));
        }

        Command::ListWorkouts { auth } => {
            let client = build_client(&args.http)?;
            handle_auth(&client, &auth).await?;

            let pipeline = Pipeline::new(&client);
            let categories = pipeline.parser().list_workout_categories().await?;
            PrettyLogger::title("Workouts");
            for category in &categories {
                PrettyLogger::category(&category.url_title, &category.title);
            }
            PrettyLogger::separator();
            PrettyLogger::info(format!("共 {} 个分类", categories.len()));
        }

        Command::DownloadCourse { course, root, auth } => {
            let client = build_client(&args.http)?;
            handle_auth(&client, &auth).await?;

            log_step!("开始下载 {} 门课程", course.len());
            let pipeline = Pipeline::new(&client);
            let summary = pipeline.download_courses(&course, &root).await?;
            print_summary(&summary);
        }

        Command::DownloadWorkout { workout, root, auth } => {
            let client = build_client(&args.http)?;
            handle_auth(&client, &auth).await?;

            log_step!("开始下载分类: {}", workout);
            PrettyLogger::file_info("根目录", root.display().to_string());
            let pipeline = Pipeline::new(&client);
            let summary = pipeline.download_workouts(&root, &workout).await?;
            print_summary(&summary);
        }
    }

    info!("{}", "完成！".green());
    Ok(())
}
