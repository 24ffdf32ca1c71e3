use indicatif::{MultiProgress, ProgressBar, ProgressStyle};

/// 并行下载时多个进度条共用一个 MultiProgress
#[derive(Debug, Clone)]
pub struct DownloadProgress {
    multi_pb: MultiProgress,
}

impl DownloadProgress {
    pub fn new() -> Self {
        Self {
            multi_pb: MultiProgress::new(),
        }
    }

    /// 大小未知时不显示进度条
    pub fn transfer_bar(&self, total_size: u64, name: &str) -> Option<ProgressBar> {
        if total_size == 0 {
            return None;
        }

        let style = ProgressStyle::with_template(
            "{spinner:.green} {msg} [{elapsed_precise}] [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({eta})",
        )
        .ok()?
        .progress_chars("#>-");

        let pb = self.multi_pb.add(ProgressBar::new(total_size));
        pb.set_style(style);
        pb.set_message(name.to_string());
        Some(pb)
    }
}

impl Default for DownloadProgress {
    fn default() -> Self {
        Self::new()
    }
}
