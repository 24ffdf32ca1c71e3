mod errors;

use std::path::Path;

use colored::Colorize;
use scraper::Html;
use tracing::{debug, info, warn};

pub use errors::{AuthError, Result};

use crate::common::client::client::NewMooveClient;
use crate::parser::utils::selector;
use crate::parser::video_resolver::collect_form_fields;

/// 登录凭据
#[derive(Debug, Clone)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

// 登录状态管理，操作的是调用方传入的客户端，Cookie 保存在客户端共享的存储里
#[derive(Debug)]
pub struct AuthManager {
    client: NewMooveClient,
}

impl AuthManager {
    pub fn new(client: NewMooveClient) -> Self {
        Self { client }
    }

    /// 有凭据时登录（并在给出 cookie 文件时保存），否则尝试从 cookie 文件恢复
    pub async fn authenticate(
        &self,
        credentials: Option<&Credentials>,
        cookie_file: Option<&Path>,
    ) -> Result<()> {
        if let Some(credentials) = credentials {
            self.login(&credentials.email, &credentials.password).await?;
            if let Some(path) = cookie_file {
                if let Err(e) = self.client.save_cookies_to_local(path) {
                    warn!("保存 Cookie 失败: {}", e);
                }
            }
            return Ok(());
        }

        match cookie_file {
            Some(path) if path.exists() => {
                self.client.load_cookies_from_local(path)?;
                info!("{}: {} 个 Cookie", "已从文件恢复登录状态".green(), self.client.cookie_count());
                Ok(())
            }
            _ => Err(AuthError::MissingCredentials),
        }
    }

    // 登录：复制登录页的全部 input，覆盖用户名和密码后提交回去
    pub async fn login(&self, email: &str, password: &str) -> Result<()> {
        let login_url = self.client.config().login_url()?;
        let page = self.client.get_text(login_url.as_str()).await?;

        let mut form = collect_form_fields(&Html::parse_document(&page))?;
        form.set("username", email);
        form.set("password", password);
        debug!("登录表单字段: {:?}", form.keys().collect::<Vec<_>>());

        let response = self
            .client
            .post_form_text(login_url.as_str(), form.as_pairs())
            .await?;

        if login_form_present(&response)? {
            return Err(AuthError::Rejected);
        }

        info!("{}", "登录成功".green());
        Ok(())
    }
}

/// 返回页里仍有密码框说明停留在登录页
pub fn login_form_present(
    html: &str,
) -> std::result::Result<bool, crate::parser::errors::ParseError> {
    let document = Html::parse_document(html);
    let password = selector(r#"input[type="password"], input[name="password"]"#)?;
    Ok(document.select(&password).next().is_some())
}
