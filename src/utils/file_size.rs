pub struct FileSizeUtils;

impl FileSizeUtils {
    pub fn format_size(size: u64) -> String {
        const KB: u64 = 1024;
        const MB: u64 = 1024 * 1024;

        if size < KB {
            format!("{} bytes", size)
        } else if size < MB {
            format!("{:.1} KB", size as f64 / KB as f64)
        } else {
            format!("{:.1} MB", size as f64 / MB as f64)
        }
    }
}
