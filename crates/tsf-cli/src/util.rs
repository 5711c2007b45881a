//! Shared utilities for commands and the language server.

use std::path::Path;
use std::sync::LazyLock;

use anyhow::Context;
use chrono::Local;
use regex::Regex;
use tsf_core::Day;
use url::Url;

/// `YYYY/MM/DD.tsf` at the end of a path.
static DAY_FILE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:^|/)(\d{4})/(\d{2})/(\d{2})\.tsf$").unwrap());

/// Date encoded in a day file path.
///
/// With a project root the file must live under it.
pub fn day_from_path(path: &Path, root: Option<&Path>) -> anyhow::Result<Day> {
    if let Some(root) = root {
        if !path.starts_with(root) {
            anyhow::bail!("{} is outside project root {}", path.display(), root.display());
        }
    }
    let text = path.to_string_lossy().replace('\\', "/");
    let Some(caps) = DAY_FILE_RE.captures(&text) else {
        anyhow::bail!("{} is not a YYYY/MM/DD.tsf day file", path.display());
    };
    let date = format!("{}-{}-{}", &caps[1], &caps[2], &caps[3]);
    Day::parse(&date).with_context(|| format!("invalid date in {}", path.display()))
}

/// Date encoded in a `file://` document URI.
///
/// The URI is percent-decoded before the path is matched.
pub fn day_from_uri(uri: &str, root: Option<&Path>) -> anyhow::Result<Day> {
    let url = Url::parse(uri).with_context(|| format!("invalid document URI {uri}"))?;
    let path = url
        .to_file_path()
        .map_err(|()| anyhow::anyhow!("{uri} is not a local file URI"))?;
    day_from_path(&path, root)
}

/// Explicit `--date`, else the file's path, else today.
pub fn resolve_day(date: Option<&str>, file: Option<&Path>, root: Option<&Path>) -> anyhow::Result<Day> {
    if let Some(date) = date {
        return Day::parse(date).context("invalid --date");
    }
    if let Some(file) = file {
        return day_from_path(file, root);
    }
    Ok(Day::new(Local::now().date_naive()))
}
