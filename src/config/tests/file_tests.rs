// Copyright 2025 Eric Jingryd (tidynest@proton.me)
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use super::super::*;
use std::fs;
use tempfile::TempDir;

#[test]
fn test_load_keymap_file() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("keymap.conf");
    fs::write(&path, "set settle_delay = 25\nbind = g i, Inbox\n").unwrap();

    let file = KeymapFile::new(path.clone()).unwrap();
    assert_eq!(file.path(), path.as_path());

    let keymap = file.load().unwrap();
    assert_eq!(keymap.settings.settle_delay_ms, 25);
    assert_eq!(keymap.entries.len(), 1);
    assert_eq!(keymap.entries[0].name, "Inbox");
}

#[test]
fn test_missing_file() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("absent.conf");

    let err = KeymapFile::new(path.clone()).unwrap_err();
    assert!(matches!(err, ConfigError::NotFound(p) if p == path));
}

#[test]
fn test_load_picks_up_edits() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("keymap.conf");
    fs::write(&path, "bind = a, A\n").unwrap();

    let file = KeymapFile::new(path.clone()).unwrap();
    assert_eq!(file.load().unwrap().entries.len(), 1);

    fs::write(&path, "bind = a, A\nbind = b, B\n").unwrap();
    assert_eq!(file.load().unwrap().entries.len(), 2);
}

#[test]
fn test_load_reports_parse_errors() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("keymap.conf");
    fs::write(&path, "bind = a, A\nnonsense\n").unwrap();

    let file = KeymapFile::new(path).unwrap();
    assert!(matches!(
        file.load(),
        Err(ConfigError::InvalidSyntax { line: 2, .. })
    ));
}
