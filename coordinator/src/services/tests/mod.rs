//! Service tests against real temporary store directories


use shared::StoreLayout;
use tempfile::TempDir;

/// Fresh store directory that lives as long as the returned guard
pub fn temp_layout() -> (StoreLayout, TempDir) {
    let temp_dir = TempDir::new().unwrap();
    let layout = StoreLayout::new(temp_dir.path());
    (layout, temp_dir)
}
