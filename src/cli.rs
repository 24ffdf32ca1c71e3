use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use newmoove_downloader::common::config::{DEFAULT_BASE_URL, DEFAULT_USER_AGENT};

/// newmoove 课程下载器
#[derive(Parser, Debug)]
#[command(name = "nmdl")]
#[command(version = "1.0")]
#[command(author = "rpeng252@gmail.com")]
#[command(about = "下载 newmoove.com 的健身课程视频并生成离线页面", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[command(flatten)]
    pub http: HttpArgs,

    /// 输出调试日志
    #[arg(long, short, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// 列出所有健身分类
    ListWorkouts {
        #[command(flatten)]
        auth: AuthArgs,
    },

    /// 下载单个或多个课程
    DownloadCourse {
        /// 课程页面URL
        #[arg(required = true, value_hint = clap::ValueHint::Url)]
        course: Vec<String>,

        /// 课程目录的上级目录
        #[arg(long, value_name = "DIR", default_value = ".")]
        #[arg(value_hint = clap::ValueHint::DirPath)]
        root: PathBuf,

        #[command(flatten)]
        auth: AuthArgs,
    },

    /// 下载整个分类的全部课程
    DownloadWorkout {
        /// 逗号分隔的分类列表，`all` 表示全部分类
        workout: String,

        /// 根目录
        #[arg(long, value_name = "DIR", default_value = ".")]
        #[arg(value_hint = clap::ValueHint::DirPath)]
        root: PathBuf,

        #[command(flatten)]
        auth: AuthArgs,
    },

    /// 根据已下载的课程生成离线 HTML 页面
    GenerateHtml {
        /// 根目录
        #[arg(long, value_name = "DIR", default_value = ".")]
        #[arg(value_hint = clap::ValueHint::DirPath)]
        root: PathBuf,
    },
}

#[derive(Args, Debug, Clone)]
pub struct AuthArgs {
    /// 登录邮箱
    #[arg(long, requires = "password")]
    pub email: Option<String>,

    /// 登录密码
    #[arg(long, requires = "email")]
    pub password: Option<String>,

    /// 保存/恢复登录状态的 Cookie 文件
    #[arg(long, value_name = "FILE")]
    #[arg(value_hint = clap::ValueHint::FilePath)]
    pub cookie_file: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
#[command(next_help_heading = "advanced")]
pub struct HttpArgs {
    /// HTTP 请求使用的 User-Agent
    #[arg(long, global = true, default_value = DEFAULT_USER_AGENT)]
    pub user_agent: String,

    /// 站点地址
    #[arg(long, global = true, default_value = DEFAULT_BASE_URL)]
    #[arg(value_hint = clap::ValueHint::Url)]
    pub base_url: String,

    /// 单个请求的超时秒数
    #[arg(long, global = true, default_value_t = 30)]
    #[arg(value_parser = clap::value_parser!(u64).range(1..))]
    pub timeout: u64,

    /// 同一课程内同时下载的集数
    #[arg(long, global = true, default_value_t = 1)]
    pub concurrency: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_timeout_is_rejected() {
        assert!(Cli::try_parse_from(["nmdl", "--timeout", "0", "generate-html"]).is_err());
    }

    #[test]
    fn global_options_follow_subcommand() {
        let cli = Cli::try_parse_from([
            "nmdl",
            "download-workout",
            "yoga,pilates",
            "--root",
            "/data",
            "--timeout",
            "5",
            "--concurrency",
            "3",
        ])
        .unwrap();

        assert_eq!(cli.http.timeout, 5);
        assert_eq!(cli.http.concurrency, 3);
        match cli.command {
            Command::DownloadWorkout { workout, root, auth } => {
                assert_eq!(workout, "yoga,pilates");
                assert_eq!(root, PathBuf::from("/data"));
                assert!(auth.email.is_none());
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn email_requires_password() {
        assert!(Cli::try_parse_from(["nmdl", "list-workouts", "--email", "a@b.de"]).is_err());
    }
}
