//! INI inventory store
//!
//! Manages an Ansible-style INI inventory file: hosts live under
//! `[section]` headers, one `name key=value ...` line per host. Upserts are
//! exclusive per (section, host name): an existing record is replaced in
//! place, never duplicated. Unrelated sections and lines are preserved
//! verbatim, and the previous file content is kept as a `.backup` next to
//! the inventory before each rewrite.

use crate::error::{InventoryError, Result};
use std::path::{Path, PathBuf};
use tokio::fs;

/// Connection variable used for the host address
const HOST_VAR: &str = "ansible_host";

/// Inventory store bound to one INI file
pub struct InventoryStore {
    path: PathBuf,
}

impl InventoryStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn backup_path(&self) -> PathBuf {
        let mut name = self.path.as_os_str().to_os_string();
        name.push(".backup");
        PathBuf::from(name)
    }

    /// Upsert `host ansible_host=address` under `[section]`
    ///
    /// Creates the file and the section as needed. A host line with the
    /// same name inside the section is replaced; the rest of the file is
    /// left untouched.
    pub async fn upsert_host(&self, section: &str, host: &str, address: &str) -> Result<()> {
        if host.chars().any(char::is_whitespace) {
            return Err(InventoryError::InvalidHostName(host.to_string()));
        }

        let content = if self.path.exists() {
            fs::read_to_string(&self.path).await?
        } else {
            String::new()
        };

        let record = format!("{} {}={}", host, HOST_VAR, address);
        let updated = upsert_line(&content, section, host, &record);

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent).await?;
            }
        }
        if self.path.exists() {
            fs::copy(&self.path, self.backup_path()).await?;
        }
        fs::write(&self.path, updated).await?;

        tracing::info!(section = %section, host = %host, address = %address, "Inventory updated");
        Ok(())
    }

    /// Address registered for a host, if present
    pub async fn lookup_host(&self, section: &str, host: &str) -> Result<Option<String>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(&self.path).await?;
        Ok(find_host_address(&content, section, host))
    }
}

/// Replace or insert a host line within a section, creating the section at
/// the end of the file when absent
fn upsert_line(content: &str, section: &str, host: &str, record: &str) -> String {
    let header = format!("[{}]", section);
    let mut lines: Vec<String> = content.lines().map(str::to_string).collect();

    let section_start = lines.iter().position(|l| l.trim() == header);
    let Some(start) = section_start else {
        if !lines.is_empty() && !lines.last().is_some_and(|l| l.is_empty()) {
            lines.push(String::new());
        }
        lines.push(header);
        lines.push(record.to_string());
        lines.push(String::new());
        return lines.join("\n");
    };

    let section_end = lines[start + 1..]
        .iter()
        .position(|l| is_section_header(l))
        .map(|offset| start + 1 + offset)
        .unwrap_or(lines.len());

    for line in &mut lines[start + 1..section_end] {
        if first_token(line) == Some(host) {
            *line = record.to_string();
            let mut out = lines.join("\n");
            if !out.ends_with('\n') {
                out.push('\n');
            }
            return out;
        }
    }

    // No record for this host yet: insert before the next section, after the
    // last non-empty line of this one
    let mut insert_at = section_end;
    while insert_at > start + 1 && lines[insert_at - 1].trim().is_empty() {
        insert_at -= 1;
    }
    lines.insert(insert_at, record.to_string());

    let mut out = lines.join("\n");
    if !out.ends_with('\n') {
        out.push('\n');
    }
    out
}

fn find_host_address(content: &str, section: &str, host: &str) -> Option<String> {
    let header = format!("[{}]", section);
    let mut in_section = false;
    for line in content.lines() {
        let trimmed = line.trim();
        if is_section_header(trimmed) {
            in_section = trimmed == header;
            continue;
        }
        if in_section && first_token(line) == Some(host) {
            return line.split_whitespace().find_map(|token| {
                token
                    .strip_prefix(HOST_VAR)
                    .and_then(|rest| rest.strip_prefix('='))
                    .map(str::to_string)
            });
        }
    }
    None
}

fn is_section_header(line: &str) -> bool {
    let trimmed = line.trim();
    trimmed.starts_with('[') && trimmed.ends_with(']')
}

fn first_token(line: &str) -> Option<&str> {
    line.split_whitespace().next()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn creates_file_and_section() {
        let dir = tempdir().unwrap();
        let store = InventoryStore::new(dir.path().join("hosts.ini"));

        store
            .upsert_host("datalake", "dl-01", "198.51.100.7")
            .await
            .unwrap();

        let content = std::fs::read_to_string(store.path()).unwrap();
        assert!(content.contains("[datalake]"));
        assert!(content.contains("dl-01 ansible_host=198.51.100.7"));
    }

    #[tokio::test]
    async fn upsert_replaces_not_duplicates() {
        let dir = tempdir().unwrap();
        let store = InventoryStore::new(dir.path().join("hosts.ini"));

        store
            .upsert_host("datalake", "dl-01", "198.51.100.7")
            .await
            .unwrap();
        store
            .upsert_host("datalake", "dl-01", "203.0.113.9")
            .await
            .unwrap();

        let content = std::fs::read_to_string(store.path()).unwrap();
        let matches: Vec<_> = content
            .lines()
            .filter(|l| l.starts_with("dl-01 "))
            .collect();
        assert_eq!(matches, vec!["dl-01 ansible_host=203.0.113.9"]);
    }

    #[tokio::test]
    async fn other_sections_are_preserved() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("hosts.ini");
        std::fs::write(
            &path,
            "[web]\nweb-01 ansible_host=10.0.0.1\n\n[datalake]\ndl-01 ansible_host=10.0.0.2\n",
        )
        .unwrap();

        let store = InventoryStore::new(&path);
        store
            .upsert_host("datalake", "dl-02", "10.0.0.3")
            .await
            .unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("web-01 ansible_host=10.0.0.1"));
        assert!(content.contains("dl-01 ansible_host=10.0.0.2"));
        assert!(content.contains("dl-02 ansible_host=10.0.0.3"));
        // dl-02 must land inside [datalake], not [web]
        let web_pos = content.find("[web]").unwrap();
        let dl_pos = content.find("[datalake]").unwrap();
        let new_pos = content.find("dl-02").unwrap();
        assert!(new_pos > dl_pos && dl_pos > web_pos);
    }

    #[tokio::test]
    async fn lookup_finds_the_latest_address() {
        let dir = tempdir().unwrap();
        let store = InventoryStore::new(dir.path().join("hosts.ini"));

        assert_eq!(store.lookup_host("datalake", "dl-01").await.unwrap(), None);

        store
            .upsert_host("datalake", "dl-01", "198.51.100.7")
            .await
            .unwrap();
        store
            .upsert_host("datalake", "dl-01", "203.0.113.9")
            .await
            .unwrap();

        assert_eq!(
            store.lookup_host("datalake", "dl-01").await.unwrap(),
            Some("203.0.113.9".to_string())
        );
    }

    #[tokio::test]
    async fn whitespace_in_host_name_is_rejected() {
        let dir = tempdir().unwrap();
        let store = InventoryStore::new(dir.path().join("hosts.ini"));
        let err = store
            .upsert_host("datalake", "bad name", "10.0.0.1")
            .await
            .unwrap_err();
        assert!(matches!(err, InventoryError::InvalidHostName(_)));
    }

    #[tokio::test]
    async fn backup_is_written_before_rewrite() {
        let dir = tempdir().unwrap();
        let store = InventoryStore::new(dir.path().join("hosts.ini"));

        store
            .upsert_host("datalake", "dl-01", "198.51.100.7")
            .await
            .unwrap();
        store
            .upsert_host("datalake", "dl-01", "203.0.113.9")
            .await
            .unwrap();

        let backup = std::fs::read_to_string(dir.path().join("hosts.ini.backup")).unwrap();
        assert!(backup.contains("198.51.100.7"));
    }
}
