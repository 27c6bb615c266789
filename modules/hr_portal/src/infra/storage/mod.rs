pub mod entity;
pub mod file;
pub mod mapper;
pub mod memory;
pub mod snapshot;

use anyhow::bail;
use std::collections::BTreeMap;

/// Fails when the slots would occupy more than `quota` bytes after writing `value`
/// under `key`.
fn check_quota(
    slots: &BTreeMap<String, String>,
    key: &str,
    value: &str,
    quota: Option<usize>,
) -> anyhow::Result<()> {
    let Some(quota) = quota else {
        return Ok(());
    };
    let used: usize = slots
        .iter()
        .filter(|(k, _)| k.as_str() != key)
        .map(|(k, v)| k.len() + v.len())
        .sum();
    let needed = used + key.len() + value.len();
    if needed > quota {
        bail!("storage quota exceeded: {needed} bytes needed, {quota} allowed");
    }
    Ok(())
}
